// Public modules
pub mod convert;
pub mod error;
pub mod files;
pub mod imports;
pub mod regions;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
