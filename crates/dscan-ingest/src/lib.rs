//! Candidate file discovery for batch scanning.

pub mod discovery;
pub mod error;

pub use discovery::list_files;
pub use error::{IngestError, Result};
