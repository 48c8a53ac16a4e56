// scansplit - split scanned PDF batches into one file per collaborator
mod blocking;
pub mod config;
pub mod driver;
pub mod grouping;
pub mod pdf_extraction;
pub mod progress;
pub mod types;
pub mod worker;
pub mod writer;

pub use config::SplitConfig;
pub use driver::{discover_pdfs, Pipeline, RunReport};
pub use grouping::{GrouperState, PageGrouper};
pub use types::{PageGroup, RecognizedPage, Result, SplitError};
pub use worker::{DocumentOutcome, DocumentWorker};
pub use writer::{GroupWriter, WriteStats};
