//! Foundational data structures, error types, and the DSL tag vocabulary.

pub mod error;
pub mod models;
pub mod vocabulary;
