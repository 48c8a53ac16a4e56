// Configuration constants for scansplit
use std::env;
use std::path::PathBuf;
use std::time::Duration;

// Filesystem layout
pub const TMP_DIR: &str = "./tmp";
pub const OUTPUT_DIR: &str = "./processed";
pub const PDF_EXT: &str = "pdf";
pub const ARTIFACT_EXT: &str = "png";

// Pipeline settings
pub const DEFAULT_WORKERS: usize = 5;
pub const GROUP_CHANNEL_CAPACITY: usize = 1;
pub const DEFAULT_LANGUAGE: &str = "eng";
pub const DEFAULT_DPI: u32 = 300;

// External tools
pub const PDFTOPPM_BIN: &str = "pdftoppm";
pub const TESSERACT_BIN: &str = "tesseract";

/// Everything one run needs, resolved from flags, environment and the defaults above.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub root_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tmp_dir: PathBuf,
    pub workers: usize,
    pub language: String,
    pub dpi: u32,
    pub page_timeout: Option<Duration>,
    pub pdftoppm_bin: PathBuf,
    pub tesseract_bin: PathBuf,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            output_dir: PathBuf::from(OUTPUT_DIR),
            tmp_dir: PathBuf::from(TMP_DIR),
            workers: DEFAULT_WORKERS,
            language: DEFAULT_LANGUAGE.to_string(),
            dpi: DEFAULT_DPI,
            page_timeout: None,
            pdftoppm_bin: PathBuf::from(PDFTOPPM_BIN),
            tesseract_bin: PathBuf::from(TESSERACT_BIN),
        }
    }
}

impl SplitConfig {
    /// Defaults with the `SCANSPLIT_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(dir) = var("SCANSPLIT_TMP_DIR") {
            config.tmp_dir = dir.into();
        }
        if let Some(dir) = var("SCANSPLIT_OUTPUT_DIR") {
            config.output_dir = dir.into();
        }
        if let Some(lang) = var("SCANSPLIT_LANG") {
            config.language = lang;
        }
        if let Some(bin) = var("SCANSPLIT_TESSERACT") {
            config.tesseract_bin = bin.into();
        }
        if let Some(bin) = var("SCANSPLIT_PDFTOPPM") {
            config.pdftoppm_bin = bin.into();
        }
        config
    }
}
