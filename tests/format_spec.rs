use std::fs;
use std::path::{Path, PathBuf};

use lingvo_dsl::dsl::format::resources::{archive_path, default_resources_dir, package_resources};
use lingvo_dsl::dsl::format::{detect_layout, load_source, parse_source};
use lingvo_dsl::dsl::types::models::{BlockContent, SourceMetadata};
use lingvo_dsl::{DslError, RawBlock, SourceLayout};

fn fixture_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("tests");
    p.push("fixtures");
    p.push(name);
    p
}

/// (file name, content, expected layout; `None` means undetectable)
const DETECTION_CASES: &[(&str, &str, Option<SourceLayout>)] = &[
    ("a.mtxt", "word\tbody\n", Some(SourceLayout::Blocks)),
    ("a.txt", "word\n<b>x</b>\n</>\n", Some(SourceLayout::Blocks)),
    ("a.txt", "no tabs at all\n", Some(SourceLayout::Tabular)),
    ("a.dat", "word\tbody\n", Some(SourceLayout::Tabular)),
    ("a.dat", "word\nbody\n  </>  \n", Some(SourceLayout::Blocks)),
    ("a.dat", "##name\tOnly header\nplain\n", None),
];

#[test]
fn layout_detection() {
    for (name, content, expected) in DETECTION_CASES {
        let result = detect_layout(Path::new(name), content.as_bytes());
        match expected {
            Some(layout) => assert_eq!(
                result.expect("layout should be detected"),
                *layout,
                "layout of {} with {:?}",
                name,
                content
            ),
            None => assert!(
                matches!(result, Err(DslError::UndetectedLayout(_))),
                "expected undetected layout for {:?}",
                content
            ),
        }
    }
}

#[test]
fn detection_only_looks_at_leading_lines() {
    let mut content = "plain\n".repeat(200);
    content.push_str("late\ttab\n");
    let result = detect_layout(Path::new("late.dat"), content.as_bytes());
    assert!(matches!(result, Err(DslError::UndetectedLayout(_))));
}

#[test]
fn mtxt_fixture_blocks_and_metadata() {
    let source = load_source(&fixture_path("sample.mtxt"), None, None).expect("load mtxt");
    assert_eq!(source.layout, SourceLayout::Blocks);
    assert_eq!(
        source.metadata,
        SourceMetadata {
            name: Some("Sample Dictionary".to_string()),
            source_language: Some("English".to_string()),
            target_language: Some("Arabic".to_string()),
        }
    );
    assert_eq!(source.dropped, 0);
    assert_eq!(
        source.blocks,
        vec![
            RawBlock::body("cat", "<b>Feline</b><br><br><i>animal</i>"),
            RawBlock::link("kitty", "cat"),
            RawBlock::body("run|running", "<p>to move fast</p>"),
            RawBlock::body("run", "<p>to operate</p>"),
        ]
    );
}

#[test]
fn tabular_fixture_blocks() {
    let source = load_source(&fixture_path("sample.txt"), None, None).expect("load txt");
    assert_eq!(source.layout, SourceLayout::Tabular);
    assert_eq!(source.dropped, 1, "line without a tab is dropped");
    assert_eq!(
        source.blocks,
        vec![
            RawBlock::body("cat", "<b>Feline</b>"),
            RawBlock::link("kitty", "cat"),
            RawBlock::body("dog", "<i class=\"ex\">canine</i> &amp; friend"),
        ]
    );
}

#[test]
fn mtxt_lines_are_cleaned() {
    let data = b"cat\r\n  first\\nline  \r\n\r\nsecond\r\n</>\r\nbare headword\r\n</>\r\n";
    let source = parse_source(data, SourceLayout::Blocks);
    assert_eq!(
        source.blocks,
        vec![
            RawBlock::body("cat", "firstline\nsecond"),
            RawBlock::body("bare headword", ""),
        ]
    );
}

#[test]
fn mtxt_malformed_blocks_are_dropped() {
    let data = b"alias\n@@@LINK=   \n</>\n\xff\xfe\nbody\n</>\nok\nbody\n</>\n";
    let source = parse_source(data, SourceLayout::Blocks);
    assert_eq!(source.dropped, 2, "empty link target and non-UTF-8 headword");
    assert_eq!(source.blocks, vec![RawBlock::body("ok", "body")]);
}

#[test]
fn tabular_keeps_invalid_utf8_bodies_raw() {
    let source = parse_source(b"word\t<b>\xff</b>\n", SourceLayout::Tabular);
    assert_eq!(source.blocks.len(), 1);
    assert_eq!(
        source.blocks[0].content,
        BlockContent::Body(b"<b>\xff</b>".to_vec()),
        "bytes reach the engine untouched"
    );
}

#[test]
fn utf16_source_is_decoded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("utf16.txt");
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "mot\t<b>écrit</b>\n".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    fs::write(&path, bytes).expect("write source");

    let source = load_source(&path, None, None).expect("load utf-16");
    assert_eq!(source.blocks, vec![RawBlock::body("mot", "<b>écrit</b>")]);
}

#[test]
fn explicit_encoding_is_applied() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cp1251.txt");
    let (encoded, _, _) = encoding_rs::WINDOWS_1251.encode("кот\tживотное\n");
    fs::write(&path, &encoded[..]).expect("write source");

    let source = load_source(&path, Some(SourceLayout::Tabular), Some(encoding_rs::WINDOWS_1251))
        .expect("load cp1251");
    assert_eq!(source.blocks, vec![RawBlock::body("кот", "животное")]);
}

#[test]
fn resource_folder_is_zipped_recursively() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("dict.mtxt");
    let res = default_resources_dir(&input);
    assert_eq!(res, dir.path().join("dict.mtxt_res"));

    fs::create_dir_all(res.join("sound")).expect("create resource dirs");
    fs::write(res.join("sound").join("cat.wav"), b"RIFF").expect("write wav");
    fs::write(res.join("cat.png"), b"\x89PNG").expect("write png");

    let output = dir.path().join("dict.dsl");
    let archive = archive_path(&output);
    assert_eq!(archive, dir.path().join("dict.dsl.files.zip"));

    let count = package_resources(&res, &archive).expect("package");
    assert_eq!(count, Some(2));

    let file = fs::File::open(&archive).expect("open archive");
    let mut zip = zip::ZipArchive::new(file).expect("read archive");
    assert_eq!(zip.len(), 2);
    assert!(zip.by_name("sound/cat.wav").is_ok(), "nested file keeps its relative path");
    assert!(zip.by_name("cat.png").is_ok());
}

#[test]
fn missing_resource_folder_is_not_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let archive = dir.path().join("none.dsl.files.zip");
    let count = package_resources(&dir.path().join("absent_res"), &archive).expect("package");
    assert_eq!(count, None);
    assert!(!archive.exists(), "no archive without resources");
}
