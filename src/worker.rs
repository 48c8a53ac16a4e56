// Document worker - render, OCR, parse and group every page of one PDF
use image::ImageFormat;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::blocking::run_blocking;
use crate::config::ARTIFACT_EXT;
use crate::grouping::PageGrouper;
use crate::pdf_extraction::{parse_page, PageRasterizer, SharedRecognizer};
use crate::progress::Progress;
use crate::types::{PageGroup, Result, SplitError};

/// What happened to one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOutcome {
    pub source_file: PathBuf,
    pub opened: bool,
    pub pages_total: u32,
    pub pages_grouped: u32,
    pub pages_skipped: u32,
    pub groups_emitted: usize,
}

pub struct DocumentWorker {
    rasterizer: Arc<dyn PageRasterizer>,
    ocr: SharedRecognizer,
    artifact_dir: PathBuf,
    progress: Arc<Progress>,
    page_timeout: Option<Duration>,
}

impl DocumentWorker {
    /// `artifact_dir` receives this document's page images and must not be
    /// shared with another worker.
    pub fn new(
        rasterizer: Arc<dyn PageRasterizer>,
        ocr: SharedRecognizer,
        artifact_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            rasterizer,
            ocr,
            artifact_dir: artifact_dir.into(),
            progress: Arc::new(Progress::disabled()),
            page_timeout: None,
        }
    }

    pub fn with_progress(mut self, progress: Arc<Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_page_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.page_timeout = timeout;
        self
    }

    /// Walk every page in order and send each closed group down `groups`.
    /// The trailing group is sent before this returns.
    ///
    /// Page failures are logged and the page is left out; an unreadable
    /// document is logged and produces no groups.
    pub async fn process(&self, source: PathBuf, groups: mpsc::Sender<PageGroup>) -> DocumentOutcome {
        let mut outcome = DocumentOutcome {
            source_file: source.clone(),
            ..Default::default()
        };

        let rasterizer = Arc::clone(&self.rasterizer);
        let counted = {
            let source = source.clone();
            run_blocking("page count".to_string(), None, move || rasterizer.page_count(&source)).await
        };
        let total = match counted {
            Ok(total) => total,
            Err(e) => {
                tracing::warn!("[Worker] skipping {}: {e}", source.display());
                return outcome;
            }
        };
        outcome.opened = true;
        outcome.pages_total = total;

        if let Err(e) = std::fs::create_dir_all(&self.artifact_dir) {
            tracing::warn!(
                "[Worker] cannot create {} for {}: {e}",
                self.artifact_dir.display(),
                source.display()
            );
            outcome.pages_skipped = total;
            return outcome;
        }

        tracing::info!("[Worker] {} has {} page(s)", source.display(), total);

        let mut grouper = PageGrouper::new(source.clone());
        for page_index in 0..total {
            let page_number = page_index + 1;

            let text = match self.read_page(&source, page_index).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("[Worker] page {page_number} of {} skipped: {e}", source.display());
                    outcome.pages_skipped += 1;
                    continue;
                }
            };

            let recognized = parse_page(&text);
            tracing::debug!(
                "[Worker] {} page {page_number}: company={:?} collaborator={:?}",
                source.display(),
                recognized.company,
                recognized.collaborator_key
            );

            if let Some(closed) = grouper.push(page_number, &recognized) {
                send_group(&groups, closed, &mut outcome).await;
            }
            outcome.pages_grouped += 1;
            self.progress.page_done(&source, page_number, total);
        }

        send_group(&groups, grouper.finish(), &mut outcome).await;
        outcome
    }

    /// Render one page to an image file, then OCR it.
    async fn read_page(&self, source: &Path, page_index: u32) -> Result<String> {
        let page_number = page_index + 1;
        let artifact = self.artifact_dir.join(artifact_name(source, page_number));

        let rasterizer = Arc::clone(&self.rasterizer);
        let pdf_path = source.to_path_buf();
        let image_path = artifact.clone();
        let what = format!("rendering page {page_number} of {}", source.display());
        run_blocking(what, self.page_timeout, move || {
            let image = rasterizer.render_page(&pdf_path, page_index)?;
            image
                .save_with_format(&image_path, ImageFormat::Png)
                .map_err(|source| SplitError::Encode {
                    path: image_path.clone(),
                    source,
                })
        })
        .await?;

        self.ocr.recognize(artifact).await
    }
}

/// File name up to its first dot.
pub fn source_stem(source: &Path) -> String {
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    file_name.split('.').next().unwrap_or_default().to_string()
}

/// `<stem>_<page>.png`
pub fn artifact_name(source: &Path, page_number: u32) -> String {
    format!("{}_{page_number}.{ARTIFACT_EXT}", source_stem(source))
}

async fn send_group(groups: &mpsc::Sender<PageGroup>, group: PageGroup, outcome: &mut DocumentOutcome) {
    if group.is_empty() {
        // Every page of the document failed
        return;
    }
    match groups.send(group).await {
        Ok(()) => outcome.groups_emitted += 1,
        Err(mpsc::error::SendError(group)) => tracing::warn!(
            "[Worker] writer gone, dropping group {:?} of {}",
            group.key(),
            group.source_file().display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_name_uses_stem_before_first_dot() {
        assert_eq!(artifact_name(Path::new("in/folha.2024.pdf"), 3), "folha_3.png");
        assert_eq!(artifact_name(Path::new("batch.pdf"), 12), "batch_12.png");
    }

    #[test]
    fn stem_of_dotless_name() {
        assert_eq!(source_stem(Path::new("scans/README")), "README");
        assert_eq!(source_stem(Path::new("")), "");
    }
}
