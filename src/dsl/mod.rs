//! Core DSL conversion module
//!
//! - `types`: error type, shared models and the DSL tag vocabulary
//! - `format`: source loading, DSL writing and resource packaging
//! - `aggregate`: grouping of raw blocks under canonical headwords
//! - `markup`: translation of HTML bodies into a raw DSL tag stream
//! - `postprocess`: normalisation passes over the raw tag stream
//! - `converter`: end-to-end orchestration

pub mod aggregate;
pub mod converter;
pub mod format;
pub mod markup;
pub mod postprocess;
pub mod types;
pub mod utils;

pub use aggregate::{Aggregator, aggregate};
pub use converter::{ConversionReport, ConvertOptions, Converter, LayoutChoice, render_group};
pub use markup::MarkupEngine;
pub use types::error::{DslError, Result};
