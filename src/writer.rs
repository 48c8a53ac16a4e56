// Group writer - single consumer turning page groups into PDF files
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::PDF_EXT;
use crate::pdf_extraction::PageCollector;
use crate::types::{PageGroup, Result, SplitError};
use crate::worker::source_stem;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub groups_received: usize,
    pub groups_written: usize,
    pub groups_failed: usize,
}

#[derive(Clone)]
pub struct GroupWriter {
    output_root: PathBuf,
    collector: Arc<dyn PageCollector>,
}

impl GroupWriter {
    pub fn new(output_root: impl Into<PathBuf>, collector: Arc<dyn PageCollector>) -> Self {
        Self {
            output_root: output_root.into(),
            collector,
        }
    }

    /// `<output_root>/<company>/<collaborator>.pdf`
    ///
    /// An empty company puts the file straight under the root and an empty
    /// collaborator falls back to the source file's stem.
    pub fn output_path(&self, group: &PageGroup) -> PathBuf {
        let mut path = self.output_root.clone();
        let sub_path = path_segment(group.sub_path());
        if !sub_path.is_empty() {
            path.push(sub_path);
        }

        let mut file_stem = path_segment(group.key());
        if file_stem.is_empty() {
            file_stem = path_segment(&source_stem(group.source_file()));
        }
        path.push(format!("{file_stem}.{PDF_EXT}"));
        path
    }

    /// Write one group to disk. Blocking.
    pub fn write(&self, group: &PageGroup) -> Result<PathBuf> {
        let out_file = self.output_path(group);
        if let Some(parent) = out_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.collector
            .collect_pages(group.source_file(), &out_file, group.pages())?;
        Ok(out_file)
    }

    /// Drain `groups` in arrival order until every sender is gone.
    pub async fn run(self, mut groups: mpsc::Receiver<PageGroup>) -> WriteStats {
        let mut stats = WriteStats::default();

        while let Some(group) = groups.recv().await {
            stats.groups_received += 1;

            let writer = self.clone();
            let written = tokio::task::spawn_blocking(move || {
                let result = writer.write(&group);
                (group, result)
            })
            .await;

            match written {
                Ok((group, Ok(out_file))) => {
                    stats.groups_written += 1;
                    tracing::info!(
                        "[Writer] {} pages {:?} -> {}",
                        group.source_file().display(),
                        group.pages(),
                        out_file.display()
                    );
                }
                Ok((group, Err(e))) => {
                    stats.groups_failed += 1;
                    tracing::warn!(
                        "[Writer] cannot write {:?} from {}: {e}",
                        group.key(),
                        group.source_file().display()
                    );
                }
                Err(e) => {
                    stats.groups_failed += 1;
                    tracing::warn!("[Writer] {}", SplitError::Join(e.to_string()));
                }
            }
        }

        stats
    }
}

/// One path component: separators become `_` and dot-only names are refused.
fn path_segment(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c == '/' || c == '\\' || c == '\0' { '_' } else { c })
        .collect();
    if cleaned == "." || cleaned == ".." {
        return "_".repeat(cleaned.len());
    }
    cleaned
}
