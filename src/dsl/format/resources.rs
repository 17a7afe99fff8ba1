//! Packaging of media resources next to the DSL file.
//!
//! Lingvo looks for sound and image files in `<dictionary>.dsl.files.zip`.

use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::dsl::types::error::Result;

/// Conventional resource directory for a source: `<input>_res`.
pub fn default_resources_dir(input: &Path) -> PathBuf {
    append_to_path(input, "_res")
}

/// Archive path Lingvo expects for a DSL file: `<output>.files.zip`.
pub fn archive_path(output: &Path) -> PathBuf {
    append_to_path(output, ".files.zip")
}

/// Zips every file below `dir` into `archive`, using paths relative to `dir`.
///
/// Returns `Ok(None)` without creating anything when `dir` does not exist,
/// otherwise the number of files archived.
pub fn package_resources(dir: &Path, archive: &Path) -> Result<Option<usize>> {
    if !dir.is_dir() {
        info!("No resource directory at {}, skipping packaging", dir.display());
        return Ok(None);
    }

    let mut zip = ZipWriter::new(File::create(archive)?);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut count = 0;
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = archive_name(dir, entry.path());
        zip.start_file(name, options)?;
        io::copy(&mut File::open(entry.path())?, &mut zip)?;
        count += 1;
    }
    zip.finish()?;

    info!("Archived {} resource files into {}", count, archive.display());
    Ok(Some(count))
}

fn archive_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn append_to_path(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}
