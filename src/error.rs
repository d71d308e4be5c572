//! Error taxonomy for the readings pipeline.
//!
//! Extraction has no error type on purpose: a page that does not match the
//! expected template yields empty fields, not a failure.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LecturasError>;

/// Failures that end a pipeline invocation.
#[derive(Debug, Error)]
pub enum LecturasError {
    /// The requested date is not a real `YYYY-MM-DD` calendar date.
    #[error("Formato de fecha inválido '{input}' ({reason}). Use YYYY-MM-DD")]
    InvalidDate { input: String, reason: String },

    /// Neither the remote backend nor a local browser could be obtained.
    #[error("No se pudo obtener un navegador: {message}")]
    Session { message: String },

    /// The page did not settle within the navigation budget.
    #[error("La página {url} no terminó de cargar: {reason}")]
    Navigation { url: String, reason: String },
}

/// Failures reported by a browser backend (connect, launch, page operations).
#[derive(Debug, Clone, Error)]
pub enum BrowserError {
    #[error("remote connect failed: {0}")]
    Connect(String),

    #[error("local launch failed: {0}")]
    Launch(String),

    #[error("page error: {0}")]
    Page(String),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        BrowserError::Page(err.to_string())
    }
}
