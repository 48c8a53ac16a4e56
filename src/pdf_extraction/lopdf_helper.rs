// lopdf helper - Pure Rust PDF operations
use lopdf::Document;
use std::collections::BTreeSet;
use std::path::Path;

use crate::types::{Result, SplitError};

/// Load a PDF document using lopdf
pub fn load_pdf(path: &Path) -> Result<Document> {
    Document::load(path).map_err(|e| SplitError::PdfOpen {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Execute an operation with a PDF document
pub fn with_pdf<F, R>(path: &Path, f: F) -> Result<R>
where
    F: FnOnce(&mut Document) -> Result<R>,
{
    let mut document = load_pdf(path)?;
    f(&mut document)
}

pub fn page_count(path: &Path) -> Result<u32> {
    with_pdf(path, |document| Ok(document.get_pages().len() as u32))
}

/// Writes a new PDF holding selected pages of a source PDF.
pub trait PageCollector: Send + Sync {
    /// `pages` are 1-based and kept in source order.
    fn collect_pages(&self, source: &Path, dest: &Path, pages: &[u32]) -> Result<()>;
}

/// Collects pages by deleting every other page from a copy of the source.
#[derive(Debug, Clone, Default)]
pub struct LopdfCollector;

impl PageCollector for LopdfCollector {
    fn collect_pages(&self, source: &Path, dest: &Path, pages: &[u32]) -> Result<()> {
        let collect_err = |reason: String| SplitError::Collect {
            source_file: source.to_path_buf(),
            dest: dest.to_path_buf(),
            pages: pages.to_vec(),
            reason,
        };

        if pages.is_empty() {
            return Err(collect_err("no pages selected".to_string()));
        }

        with_pdf(source, |document| {
            let existing = document.get_pages();
            let wanted: BTreeSet<u32> = pages.iter().copied().collect();

            if let Some(missing) = wanted.iter().find(|page| !existing.contains_key(page)) {
                return Err(collect_err(format!(
                    "page {missing} out of range (document has {} pages)",
                    existing.len()
                )));
            }

            let unwanted: Vec<u32> = existing
                .keys()
                .copied()
                .filter(|page| !wanted.contains(page))
                .collect();

            document.delete_pages(&unwanted);
            document.prune_objects();
            document.renumber_objects();
            document.compress();
            document.save(dest).map_err(|e| collect_err(e.to_string()))?;
            Ok(())
        })
    }
}
