use thiserror::Error;

mod domain_types;
mod ids;
mod records;

pub use domain_types::*;
pub use ids::*;
pub use records::*;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid OSF GUID format: {0}")]
    InvalidId(String),

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("Value out of bounds: {value}, expected {min}..={max}")]
    OutOfBounds { value: usize, min: usize, max: usize },

    #[error("Invalid API token format: {reason}")]
    InvalidApiToken { reason: String },
}
