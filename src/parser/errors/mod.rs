//! Parser error handling module
//!
//! - Categorized error codes for filtering
//! - Location-tagged errors collected during recovery

mod codes;
mod error;

pub use codes::ErrorCode;
pub use error::ParseError;
