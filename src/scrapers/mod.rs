//! Page extractors for the readings sites.
//!
//! Each extractor is a pure function from rendered HTML to [`crate::models::Lecturas`].
//! Fetching is handled by [`crate::browser`]; extractors never touch the network.
//!
//! # Supported Sources
//!
//! | Source | Module | Anchors |
//! |--------|--------|---------|
//! | Vatican News (es) | [`vaticannews`] | `indicazioneLiturgica` class, `section.section--evidence` titles |

pub mod vaticannews;
