//! Conversion orchestration: load, aggregate, translate, write, package.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, trace, warn};

use super::aggregate::Aggregator;
use super::format::resources::{archive_path, default_resources_dir, package_resources};
use super::format::{DslWriter, load_source};
use super::markup::MarkupEngine;
use super::postprocess;
use super::types::error::{DslError, Result};
use super::types::models::{
    DictionaryHeader, EntryGroup, OutputEncoding, RawBlock, RenderedEntry, SourceLayout,
    SourceMetadata,
};
use super::utils::parse_encoding;

const DEFAULT_INDEX_LANGUAGE: &str = "ENGLISH";
const DEFAULT_CONTENTS_LANGUAGE: &str = "ARABIC";

/// How the source layout is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutChoice {
    /// Detect from extension and content.
    #[default]
    Auto,
    Tabular,
    Blocks,
}

impl LayoutChoice {
    fn forced(self) -> Option<SourceLayout> {
        match self {
            LayoutChoice::Auto => None,
            LayoutChoice::Tabular => Some(SourceLayout::Tabular),
            LayoutChoice::Blocks => Some(SourceLayout::Blocks),
        }
    }
}

/// Every knob of a conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub layout: LayoutChoice,
    /// Input encoding label; BOM detection and raw UTF-8 apply when `None`.
    pub encoding: Option<String>,
    pub output_encoding: OutputEncoding,
    /// Output file; `<name>.dsl` in the working directory when `None`.
    pub output: Option<PathBuf>,
    pub name: Option<String>,
    pub index_language: Option<String>,
    pub contents_language: Option<String>,
    pub package_resources: bool,
    /// Media folder; `<input>_res` when `None`.
    pub resources_dir: Option<PathBuf>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            layout: LayoutChoice::Auto,
            encoding: None,
            output_encoding: OutputEncoding::default(),
            output: None,
            name: None,
            index_language: None,
            contents_language: None,
            package_resources: true,
            resources_dir: None,
        }
    }
}

/// Outcome of a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub entries_written: usize,
    pub headword_lines: usize,
    /// Malformed source records plus blocks aggregation could not place.
    pub dropped_blocks: usize,
    /// Entries skipped because translation failed: `(headword, message)`.
    pub failed: Vec<(String, String)>,
    pub output: Option<PathBuf>,
    /// Files stored in the resource archive, if one was written.
    pub archived_resources: Option<usize>,
}

impl ConversionReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Translates one entry group into DSL.
///
/// A group without body content, or whose body translates to nothing, gets
/// `body: None` so the writer emits the fallback body line.
///
/// # Errors
/// Returns [`DslError::Entry`] naming the canonical headword when the merged
/// body is not valid UTF-8.
pub fn render_group(group: &EntryGroup) -> Result<RenderedEntry> {
    let body = if group.has_body() {
        let raw = MarkupEngine::translate(&group.merged_body).map_err(|e| DslError::Entry {
            headword: group.canonical.clone(),
            source: Box::new(e),
        })?;
        let processed = postprocess::run(&raw);
        (!processed.trim().is_empty()).then_some(processed)
    } else {
        None
    };

    Ok(RenderedEntry {
        headwords: group.aliases.clone(),
        body,
    })
}

/// Drives a whole conversion with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Converts a source file into a DSL file and packages its resources.
    pub fn convert_file(&self, input: impl AsRef<Path>) -> Result<ConversionReport> {
        let input = input.as_ref();
        let encoding = self
            .options
            .encoding
            .as_deref()
            .map(parse_encoding)
            .transpose()?;

        let source = load_source(input, self.options.layout.forced(), encoding)?;
        let header = self.resolve_header(input, &source.metadata);
        let output = self.output_path(&header);
        info!("Writing '{}' to {}", header.name, output.display());

        let file = BufWriter::new(File::create(&output)?);
        let mut report = self.convert_blocks(&header, source.blocks, file)?;
        report.dropped_blocks += source.dropped;

        if self.options.package_resources {
            let dir = self
                .options
                .resources_dir
                .clone()
                .unwrap_or_else(|| default_resources_dir(input));
            report.archived_resources = package_resources(&dir, &archive_path(&output))?;
        }
        report.output = Some(output);
        Ok(report)
    }

    /// Aggregates `blocks` and writes the resulting dictionary to `out`.
    ///
    /// Entries that fail to translate are logged, recorded in the report and
    /// skipped; everything else is still written.
    pub fn convert_blocks<W: Write>(
        &self,
        header: &DictionaryHeader,
        blocks: impl IntoIterator<Item = RawBlock>,
        out: W,
    ) -> Result<ConversionReport> {
        let mut aggregator = Aggregator::new();
        for block in blocks {
            aggregator.push(block);
        }
        let dropped = aggregator.dropped();
        let groups = aggregator.finish();

        let mut writer = DslWriter::new(out, self.options.output_encoding)?;
        writer.write_header(header)?;

        let mut failed = Vec::new();
        for group in &groups {
            match render_group(group) {
                Ok(entry) => {
                    trace!("Writing '{}' ({} headwords)", group.canonical, entry.headwords.len());
                    writer.write_entry(&entry)?;
                }
                Err(err) => {
                    warn!("Skipping entry: {}", err);
                    failed.push((group.canonical.clone(), err.to_string()));
                }
            }
        }

        let report = ConversionReport {
            entries_written: writer.entries(),
            headword_lines: writer.headword_lines(),
            dropped_blocks: dropped,
            failed,
            ..ConversionReport::default()
        };
        writer.finish()?;
        info!(
            "Wrote {} entries, {} headword lines, {} failed",
            report.entries_written,
            report.headword_lines,
            report.failed.len()
        );
        Ok(report)
    }

    /// Picks name and languages: explicit options, then source metadata,
    /// then the input file stem and the default language pair.
    pub fn resolve_header(&self, input: &Path, metadata: &SourceMetadata) -> DictionaryHeader {
        let name = self
            .options
            .name
            .clone()
            .or_else(|| metadata.name.clone())
            .unwrap_or_else(|| {
                input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "dictionary".to_string())
            });
        let index_language = self
            .options
            .index_language
            .as_deref()
            .or(metadata.source_language.as_deref())
            .unwrap_or(DEFAULT_INDEX_LANGUAGE)
            .to_uppercase();
        let contents_language = self
            .options
            .contents_language
            .as_deref()
            .or(metadata.target_language.as_deref())
            .unwrap_or(DEFAULT_CONTENTS_LANGUAGE)
            .to_uppercase();

        debug!(
            "Header: name='{}', index={}, contents={}",
            name, index_language, contents_language
        );
        DictionaryHeader {
            name,
            index_language,
            contents_language,
        }
    }

    fn output_path(&self, header: &DictionaryHeader) -> PathBuf {
        self.options
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.dsl", header.name)))
    }
}
