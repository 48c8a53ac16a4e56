// Driver - discovery, worker pool, writer hand-off and teardown
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use walkdir::WalkDir;

use crate::config::{SplitConfig, GROUP_CHANNEL_CAPACITY, PDF_EXT};
use crate::pdf_extraction::{
    LopdfCollector, PageCollector, PageRasterizer, PdftoppmRasterizer, SharedRecognizer,
    TesseractEngine,
};
use crate::progress::Progress;
use crate::types::{Result, SplitError};
use crate::worker::{DocumentOutcome, DocumentWorker};
use crate::writer::{GroupWriter, WriteStats};

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub discovery_errors: usize,
    pub documents_found: usize,
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub pages_grouped: u64,
    pub pages_skipped: u64,
    pub groups_written: usize,
    pub groups_failed: usize,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        self.discovery_errors > 0
            || self.documents_failed > 0
            || self.pages_skipped > 0
            || self.groups_failed > 0
    }

    fn add_document(&mut self, outcome: &DocumentOutcome) {
        if outcome.opened {
            self.documents_processed += 1;
        } else {
            self.documents_failed += 1;
        }
        self.pages_grouped += u64::from(outcome.pages_grouped);
        self.pages_skipped += u64::from(outcome.pages_skipped);
    }

    fn add_writes(&mut self, stats: &WriteStats) {
        self.groups_written += stats.groups_written;
        self.groups_failed += stats.groups_failed;
    }
}

/// Input files found under a root, plus how many paths could not be read.
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<PathBuf>,
    pub errors: usize,
}

/// Recursively list files with the `pdf` extension under `root`. A root that is
/// itself a PDF file is returned as the only match.
///
/// Directories in `skip` are not descended into. Unreadable entries are logged
/// and counted; only a missing root is an error.
pub fn discover_pdfs(root: &Path, skip: &[PathBuf]) -> Result<Discovery> {
    fs::metadata(root).map_err(|e| SplitError::Discovery {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;

    let skip: Vec<PathBuf> = skip.iter().filter_map(|dir| dir.canonicalize().ok()).collect();
    let mut discovery = Discovery::default();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        if entry.depth() == 0 || !entry.file_type().is_dir() || skip.is_empty() {
            return true;
        }
        entry
            .path()
            .canonicalize()
            .map(|dir| !skip.contains(&dir))
            .unwrap_or(true)
    });

    for entry in walker {
        match entry {
            Ok(entry) => {
                let is_pdf = entry.path().extension().map_or(false, |ext| ext == PDF_EXT);
                if is_pdf && !entry.file_type().is_dir() {
                    discovery.files.push(entry.into_path());
                }
            }
            Err(e) => {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                tracing::warn!("[Driver] cannot access {path}: {e}");
                discovery.errors += 1;
            }
        }
    }

    discovery.files.sort();
    Ok(discovery)
}

/// One full run: every discovered document through the worker pool, every
/// group through the single writer.
pub struct Pipeline {
    config: SplitConfig,
    rasterizer: Arc<dyn PageRasterizer>,
    ocr: SharedRecognizer,
    collector: Arc<dyn PageCollector>,
    progress: Arc<Progress>,
}

impl Pipeline {
    pub fn new(
        config: SplitConfig,
        rasterizer: Arc<dyn PageRasterizer>,
        ocr: SharedRecognizer,
        collector: Arc<dyn PageCollector>,
    ) -> Self {
        Self {
            config,
            rasterizer,
            ocr,
            collector,
            progress: Arc::new(Progress::disabled()),
        }
    }

    /// pdftoppm for rendering, tesseract for OCR, lopdf for writing.
    pub fn from_config(config: SplitConfig) -> Self {
        let rasterizer = PdftoppmRasterizer::new(&config.pdftoppm_bin, config.dpi);
        if !rasterizer.is_available() {
            tracing::warn!(
                "[Driver] {} not found - install poppler-utils",
                config.pdftoppm_bin.display()
            );
        }

        let engine = TesseractEngine::new(&config.tesseract_bin, &config.language);
        if !engine.is_available() {
            tracing::warn!(
                "[Driver] {} not found - install tesseract-ocr",
                config.tesseract_bin.display()
            );
        }
        let ocr = SharedRecognizer::new(engine).with_timeout(config.page_timeout);

        Self::new(config, Arc::new(rasterizer), ocr, Arc::new(LopdfCollector))
    }

    pub fn with_progress(mut self, progress: Arc<Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub async fn run(self) -> Result<RunReport> {
        let config = &self.config;
        for dir in [&config.tmp_dir, &config.output_dir] {
            if let Err(e) = fs::create_dir_all(dir) {
                tracing::warn!("[Driver] cannot create {}: {e}", dir.display());
            }
        }

        let skip = [config.tmp_dir.clone(), config.output_dir.clone()];
        let discovery = discover_pdfs(&config.root_dir, &skip)?;
        let mut report = RunReport {
            discovery_errors: discovery.errors,
            documents_found: discovery.files.len(),
            ..Default::default()
        };
        if discovery.files.is_empty() {
            tracing::info!("[Driver] no PDF files found under {}", config.root_dir.display());
        }

        // The writer is listening before the first worker starts
        let (group_tx, group_rx) = mpsc::channel(GROUP_CHANNEL_CAPACITY);
        let writer = GroupWriter::new(&config.output_dir, Arc::clone(&self.collector));
        let writer_task = tokio::spawn(writer.run(group_rx));

        let pool = Arc::new(Semaphore::new(config.workers.max(1)));
        let mut workers = JoinSet::new();

        for (seq, file) in discovery.files.into_iter().enumerate() {
            let permit = match Arc::clone(&pool).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::warn!("[Driver] worker pool closed: {e}");
                    break;
                }
            };

            let worker = DocumentWorker::new(
                Arc::clone(&self.rasterizer),
                self.ocr.clone(),
                config.tmp_dir.join(seq.to_string()),
            )
            .with_progress(Arc::clone(&self.progress))
            .with_page_timeout(config.page_timeout);
            let group_tx = group_tx.clone();

            workers.spawn(async move {
                let outcome = worker.process(file, group_tx).await;
                drop(permit);
                outcome
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(outcome) => report.add_document(&outcome),
                Err(e) => {
                    tracing::warn!("[Driver] worker crashed: {e}");
                    report.documents_failed += 1;
                }
            }
        }

        // Closing the channel is what ends the writer
        drop(group_tx);
        match writer_task.await {
            Ok(stats) => report.add_writes(&stats),
            Err(e) => tracing::warn!("[Driver] writer crashed: {e}"),
        }

        self.progress.finish();
        self.ocr.close().await;
        if let Err(e) = fs::remove_dir_all(&config.tmp_dir) {
            tracing::warn!("[Driver] cannot remove {}: {e}", config.tmp_dir.display());
        }

        tracing::info!("[Driver] run finished: {report:?}");
        Ok(report)
    }
}
