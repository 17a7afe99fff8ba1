//! # lingvo-dsl
//!
//! Converts dictionaries with HTML-subset bodies, stored as tab-separated
//! text or MTXT blocks, into ABBYY Lingvo DSL.
//!
//! Entries sharing a headword are merged and `@@@LINK=` records become
//! aliases of their target. Media referenced by the bodies can be packaged
//! into the `.files.zip` archive Lingvo reads alongside the dictionary.
pub mod dsl;

// Re-export the main types for convenience
pub use dsl::{
    Converter,
    ConvertOptions,
    ConversionReport,
    DslError,
    LayoutChoice,
    MarkupEngine,
    Result,
    types::models::{
        DictionaryHeader,
        EntryGroup,
        OutputEncoding,
        RawBlock,
        RenderedEntry,
        SourceLayout,
    },
};
