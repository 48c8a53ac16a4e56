// Page rasterizer using pdftoppm
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use super::lopdf_helper;
use crate::types::{Result, SplitError};

/// Turns PDF pages into bitmaps. Page indices are 0-based.
pub trait PageRasterizer: Send + Sync {
    fn page_count(&self, pdf_path: &Path) -> Result<u32>;

    fn render_page(&self, pdf_path: &Path, page_index: u32) -> Result<DynamicImage>;
}

#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    bin: PathBuf,
    dpi: u32,
}

impl PdftoppmRasterizer {
    pub fn new(bin: impl Into<PathBuf>, dpi: u32) -> Self {
        Self {
            bin: bin.into(),
            dpi,
        }
    }

    /// True when the binary runs at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.bin).arg("-v").output().is_ok()
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn page_count(&self, pdf_path: &Path) -> Result<u32> {
        lopdf_helper::page_count(pdf_path)
    }

    fn render_page(&self, pdf_path: &Path, page_index: u32) -> Result<DynamicImage> {
        // pdftoppm uses 1-based page numbers
        let page = page_index + 1;
        let render_err = |reason: String| SplitError::Render {
            path: pdf_path.to_path_buf(),
            page,
            reason,
        };

        let temp_dir = TempDir::new()?;
        let output_prefix = temp_dir.path().join("page");

        tracing::debug!("[Render] {} page {} at {} dpi", pdf_path.display(), page, self.dpi);

        let output = Command::new(&self.bin)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg("-singlefile")
            .arg(pdf_path)
            .arg(&output_prefix)
            .output()
            .map_err(|e| render_err(format!("failed to run {}: {e}", self.bin.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(render_err(format!("pdftoppm failed: {}", stderr.trim())));
        }

        // -singlefile writes `<prefix>.png` without a page suffix
        let output_file = output_prefix.with_extension("png");
        image::open(&output_file).map_err(|e| render_err(format!("unreadable output: {e}")))
    }
}
