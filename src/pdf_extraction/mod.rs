// PDF extraction module - external capabilities the pipeline drives
pub mod identifier;
pub mod lopdf_helper;
pub mod ocr_engine;
pub mod renderer;

pub use identifier::parse_page;
pub use lopdf_helper::{page_count, LopdfCollector, PageCollector};
pub use ocr_engine::{SharedRecognizer, TesseractEngine, TextRecognizer};
pub use renderer::{PageRasterizer, PdftoppmRasterizer};
