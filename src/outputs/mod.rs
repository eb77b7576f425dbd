//! Output generation.
//!
//! The single deliverable of a run is a JSON file holding the
//! [`NoticiaBatch`](crate::models::NoticiaBatch); see [`json`].

pub mod json;
