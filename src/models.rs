//! Data models for the extracted readings and the per-request outcome.
//!
//! This module defines the structures that leave the pipeline:
//! - [`Reading`]: a scripture citation plus the concatenated reading text
//! - [`Lecturas`]: the three fields extracted from one day's page
//! - [`Outcome`]: the success/failure record returned for every request
//!
//! Field names follow the public JSON contract (Spanish, camelCase), hence the
//! `serde(rename)` attributes.

use crate::error::LecturasError;
use serde::Serialize;

/// A citation and body pair, used for both the first reading and the gospel.
///
/// Both fields are independently optional: the page may carry a citation line
/// without any body paragraphs, and a section missing entirely leaves both null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reading {
    /// The short scripture reference (e.g. `"Isaías 25, 6-10"`).
    pub cita: Option<String>,
    /// The reading text, paragraphs joined by a single space.
    pub lectura: Option<String>,
}

/// Everything extracted from a single day's readings page.
///
/// Absent fields mean "not found on the page", never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Lecturas {
    /// The liturgical season / celebration label shown above the readings.
    #[serde(rename = "indicazioneLiturgica")]
    pub indicazione_liturgica: Option<String>,
    /// The first reading of the day.
    #[serde(rename = "primeraLectura")]
    pub primera_lectura: Reading,
    /// The gospel of the day.
    pub evangelio: Reading,
}

impl Lecturas {
    /// True when the page matched none of the expected anchors.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Classification of a failed request, echoed as `kind` in the JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidDate,
    SessionError,
    NavigationError,
}

impl From<&LecturasError> for FailureKind {
    fn from(err: &LecturasError) -> Self {
        match err {
            LecturasError::InvalidDate { .. } => FailureKind::InvalidDate,
            LecturasError::Session { .. } => FailureKind::SessionError,
            LecturasError::Navigation { .. } => FailureKind::NavigationError,
        }
    }
}

/// Body of a successful request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Success {
    success: bool,
    pub fecha: String,
    pub url: String,
    pub lecturas: Lecturas,
}

/// Body of a failed request.
///
/// Besides the error itself it carries enough diagnostic context for an
/// operator to spot a misconfigured credential without ever seeing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    success: bool,
    pub error: String,
    pub fecha: String,
    pub kind: FailureKind,
    #[serde(rename = "browserlessToken")]
    pub browserless_token: String,
    pub hint: String,
}

/// The single record produced for every pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Success(Success),
    Failure(Failure),
}

impl Outcome {
    pub fn success(fecha: impl Into<String>, url: impl Into<String>, lecturas: Lecturas) -> Self {
        Outcome::Success(Success {
            success: true,
            fecha: fecha.into(),
            url: url.into(),
            lecturas,
        })
    }

    pub fn failure(
        fecha: impl Into<String>,
        err: &LecturasError,
        browserless_token: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Outcome::Failure(Failure {
            success: false,
            error: err.to_string(),
            fecha: fecha.into(),
            kind: FailureKind::from(err),
            browserless_token: browserless_token.into(),
            hint: hint.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn fecha(&self) -> &str {
        match self {
            Outcome::Success(s) => &s.fecha,
            Outcome::Failure(f) => &f.fecha,
        }
    }
}
