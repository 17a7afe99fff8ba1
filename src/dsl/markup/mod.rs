//! HTML-subset to DSL translation.

pub mod elements;
pub mod engine;
pub mod tokenizer;

pub use engine::MarkupEngine;
