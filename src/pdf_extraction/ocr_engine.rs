// OCR engine - tesseract behind a process-wide lock
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::blocking::run_blocking;
use crate::types::{Result, SplitError};

/// Reads text out of a page image on disk.
///
/// Engines are not expected to be reentrant, hence `&mut self`; share one
/// through [`SharedRecognizer`].
pub trait TextRecognizer: Send {
    fn recognize(&mut self, image_path: &Path) -> Result<String>;

    /// Release whatever the engine holds. Called once at the end of a run.
    fn close(&mut self) {}
}

#[derive(Debug, Clone)]
pub struct TesseractEngine {
    bin: PathBuf,
    lang: String,
}

impl TesseractEngine {
    pub fn new(bin: impl Into<PathBuf>, lang: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            lang: lang.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        Command::new(&self.bin).arg("--version").output().is_ok()
    }
}

impl TextRecognizer for TesseractEngine {
    fn recognize(&mut self, image_path: &Path) -> Result<String> {
        let ocr_err = |reason: String| SplitError::Ocr {
            path: image_path.to_path_buf(),
            reason,
        };

        let output = Command::new(&self.bin)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .output()
            .map_err(|e| ocr_err(format!("failed to run {}: {e}", self.bin.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ocr_err(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// The one OCR engine of a run, shared by every worker.
///
/// Calls are serialized by a mutex, so OCR invocations form a total order
/// across the process while rendering and file IO stay parallel.
#[derive(Clone)]
pub struct SharedRecognizer {
    engine: Arc<Mutex<Box<dyn TextRecognizer>>>,
    timeout: Option<Duration>,
}

impl SharedRecognizer {
    pub fn new(engine: impl TextRecognizer + 'static) -> Self {
        Self {
            engine: Arc::new(Mutex::new(Box::new(engine))),
            timeout: None,
        }
    }

    /// Bound each call. The clock starts once the engine is ours, so time
    /// spent queued behind other callers does not count. An expired call keeps
    /// the engine until it finishes; only the caller gives up on it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn recognize(&self, image_path: PathBuf) -> Result<String> {
        let mut engine = Arc::clone(&self.engine).lock_owned().await;
        let what = format!("OCR of {}", image_path.display());
        run_blocking(what, self.timeout, move || engine.recognize(&image_path)).await
    }

    /// Shut the engine down. Waits for any in-flight call to finish first.
    pub async fn close(&self) {
        self.engine.lock().await.close();
    }
}
