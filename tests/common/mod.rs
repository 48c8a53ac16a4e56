// Shared fakes for the pipeline tests
#![allow(dead_code)]

use image::DynamicImage;
use lopdf::{dictionary, Document, Object, Stream};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scansplit::pdf_extraction::{PageCollector, PageRasterizer, TextRecognizer};
use scansplit::{Result, SplitError};

pub const ACME: &str = "12.345.678/0001-90 Acme Corp";

/// OCR text of a page carrying both identifier lines.
pub fn payslip(company_line: &str, collaborator_line: &str) -> String {
    format!("DEMONSTRATIVO DE PAGAMENTO\n{company_line}\nCompetencia 03/2024\n{collaborator_line}\nSalario base 1.234,56\n")
}

/// Page counts by file name; renders tiny blank images.
#[derive(Default)]
pub struct FakeRasterizer {
    pages: HashMap<String, u32>,
    failing: HashSet<(String, u32)>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(mut self, file_name: &str, pages: u32) -> Self {
        self.pages.insert(file_name.to_string(), pages);
        self
    }

    /// Make rendering of `page_index` (0-based) fail.
    pub fn failing_page(mut self, file_name: &str, page_index: u32) -> Self {
        self.failing.insert((file_name.to_string(), page_index));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl PageRasterizer for FakeRasterizer {
    fn page_count(&self, pdf_path: &Path) -> Result<u32> {
        self.pages
            .get(&Self::name(pdf_path))
            .copied()
            .ok_or_else(|| SplitError::PdfOpen {
                path: pdf_path.to_path_buf(),
                reason: "not a PDF".to_string(),
            })
    }

    fn render_page(&self, pdf_path: &Path, page_index: u32) -> Result<DynamicImage> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&(Self::name(pdf_path), page_index)) {
            return Err(SplitError::Render {
                path: pdf_path.to_path_buf(),
                page: page_index + 1,
                reason: "scanner noise".to_string(),
            });
        }
        Ok(DynamicImage::new_rgb8(2, 2))
    }
}

/// Answers with canned text keyed by artifact file name (`<stem>_<page>.png`).
#[derive(Default)]
pub struct ScriptedOcr {
    texts: HashMap<String, String>,
    pub seen: Arc<Mutex<Vec<String>>>,
}

impl ScriptedOcr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, artifact: &str, text: impl Into<String>) -> Self {
        self.texts.insert(artifact.to_string(), text.into());
        self
    }
}

impl TextRecognizer for ScriptedOcr {
    fn recognize(&mut self, image_path: &Path) -> Result<String> {
        if !image_path.exists() {
            return Err(SplitError::Ocr {
                path: image_path.to_path_buf(),
                reason: "artifact missing".to_string(),
            });
        }
        let name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.seen.lock().unwrap().push(name.clone());
        Ok(self.texts.get(&name).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub pages: Vec<u32>,
}

/// Records every collection request instead of writing PDFs.
#[derive(Default, Clone)]
pub struct RecordingCollector {
    pub calls: Arc<Mutex<Vec<Collected>>>,
    pub fail_for_key: Option<String>,
}

impl PageCollector for RecordingCollector {
    fn collect_pages(&self, source: &Path, dest: &Path, pages: &[u32]) -> Result<()> {
        if let Some(key) = &self.fail_for_key {
            if dest.file_stem().map_or(false, |stem| stem == key.as_str()) {
                return Err(SplitError::Collect {
                    source_file: source.to_path_buf(),
                    dest: dest.to_path_buf(),
                    pages: pages.to_vec(),
                    reason: "disk full".to_string(),
                });
            }
        }
        self.calls.lock().unwrap().push(Collected {
            source: source.to_path_buf(),
            dest: dest.to_path_buf(),
            pages: pages.to_vec(),
        });
        Ok(())
    }
}

/// Write a minimal `pages`-page PDF to `path`.
pub fn write_blank_pdf(path: &Path, pages: u32) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}
