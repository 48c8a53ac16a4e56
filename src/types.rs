// Core types for scansplit
use std::path::{Path, PathBuf};

/// Company and collaborator recovered from one page of OCR text.
/// Either field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognizedPage {
    pub company: String,
    pub collaborator_key: String,
}

impl RecognizedPage {
    pub fn new(company: impl Into<String>, collaborator_key: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            collaborator_key: collaborator_key.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.company.is_empty() && self.collaborator_key.is_empty()
    }
}

/// A contiguous run of pages from one source document sharing one collaborator key.
///
/// Groups are built by [`crate::grouping::PageGrouper`] and moved to the writer
/// once closed; nothing mutates them after that hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGroup {
    source_file: PathBuf,
    key: String,
    sub_path: String,
    pages: Vec<u32>,
}

impl PageGroup {
    pub fn new(source_file: impl Into<PathBuf>) -> Self {
        Self {
            source_file: source_file.into(),
            key: String::new(),
            sub_path: String::new(),
            pages: Vec::new(),
        }
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn sub_path(&self) -> &str {
        &self.sub_path
    }

    /// 1-based page numbers, strictly increasing.
    pub fn pages(&self) -> &[u32] {
        &self.pages
    }

    pub fn is_keyed(&self) -> bool {
        !self.key.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    // Only the grouper builds groups; the key is write-once.
    pub(crate) fn set_key(&mut self, key: &str) {
        if self.key.is_empty() {
            self.key = key.to_string();
        }
    }

    pub(crate) fn set_sub_path(&mut self, sub_path: &str) {
        self.sub_path = sub_path.to_string();
    }

    pub(crate) fn push_page(&mut self, page_number: u32) {
        debug_assert!(self.pages.last().map_or(true, |last| *last < page_number));
        self.pages.push(page_number);
    }
}

// Error types
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error("cannot open PDF {path}: {reason}")]
    PdfOpen { path: PathBuf, reason: String },

    #[error("cannot render page {page} of {path}: {reason}")]
    Render {
        path: PathBuf,
        page: u32,
        reason: String,
    },

    #[error("cannot encode page image {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("OCR failed for {path}: {reason}")]
    Ocr { path: PathBuf, reason: String },

    #[error("cannot collect pages {pages:?} from {source_file} into {dest}: {reason}")]
    Collect {
        source_file: PathBuf,
        dest: PathBuf,
        pages: Vec<u32>,
        reason: String,
    },

    #[error("cannot scan {path}: {reason}")]
    Discovery { path: PathBuf, reason: String },

    #[error("{what} timed out after {secs}s")]
    Timeout { what: String, secs: u64 },

    #[error("background task failed: {0}")]
    Join(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SplitError>;
