use std::fs;
use std::path::PathBuf;

use lingvo_dsl::dsl::render_group;
use lingvo_dsl::{
    ConvertOptions, Converter, DictionaryHeader, EntryGroup, LayoutChoice, OutputEncoding,
    RawBlock,
};

const HEADER: &str = "#NAME \"Test\"\n#INDEX_LANGUAGE \"ENGLISH\"\n#CONTENTS_LANGUAGE \"ARABIC\"\n\n";

const SAMPLE_MTXT_DSL: &str = "#NAME \"Sample Dictionary\"\n\
#INDEX_LANGUAGE \"ENGLISH\"\n\
#CONTENTS_LANGUAGE \"ARABIC\"\n\
\n\
cat\n\
kitty\n\
\t[m1][b]Feline[/b][/m]\n\
\t[m1]\\ [/m]\n\
\t[m1][b][i]animal[/i][/b][/m]\n\
\n\
run\n\
running\n\
\t[m1]to move fast[/m]\n\
\t[m1]\\ [/m]\n\
\t[m1]to operate[/m]\n\
\n";

const SAMPLE_TXT_DSL: &str = "#NAME \"sample\"\n\
#INDEX_LANGUAGE \"ENGLISH\"\n\
#CONTENTS_LANGUAGE \"ARABIC\"\n\
\n\
cat\n\
kitty\n\
\t[m1][b]Feline[/b][/m]\n\
\n\
dog\n\
\t[m1][i]canine[/i] & friend[/m]\n\
\n";

fn fixture_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("tests");
    p.push("fixtures");
    p.push(name);
    p
}

fn header() -> DictionaryHeader {
    DictionaryHeader {
        name: "Test".to_string(),
        index_language: "ENGLISH".to_string(),
        contents_language: "ARABIC".to_string(),
    }
}

fn utf8_converter() -> Converter {
    Converter::new(ConvertOptions {
        output_encoding: OutputEncoding::Utf8,
        package_resources: false,
        ..ConvertOptions::default()
    })
}

fn convert_to_string(blocks: Vec<RawBlock>) -> String {
    let mut out = Vec::new();
    utf8_converter()
        .convert_blocks(&header(), blocks, &mut out)
        .expect("conversion");
    String::from_utf8(out).expect("utf-8 output")
}

#[test]
fn cat_entry_end_to_end() {
    let dsl = convert_to_string(vec![RawBlock::body(
        "cat",
        "<b>Feline</b><br><br><i>animal</i>",
    )]);
    assert_eq!(
        dsl,
        format!(
            "{}cat\n\t[m1][b]Feline[/b][/m]\n\t[m1]\\ [/m]\n\t[m1][b][i]animal[/i][/b][/m]\n\n",
            HEADER
        )
    );
}

#[test]
fn link_only_group_gets_fallback_body() {
    let dsl = convert_to_string(vec![RawBlock::link("alt", "run")]);
    assert_eq!(dsl, format!("{}run\nalt\n\t[m1][/m]\n\n", HEADER));
}

#[test]
fn body_that_translates_to_nothing_gets_fallback() {
    let mut group = EntryGroup::new("empty");
    group.append_body(b"<span></span>");
    let entry = render_group(&group).expect("render");
    assert_eq!(entry.headwords, vec!["empty".to_string()]);
    assert_eq!(entry.body, None);
}

#[test]
fn invalid_utf8_fails_only_its_entry() {
    let mut out = Vec::new();
    let report = utf8_converter()
        .convert_blocks(
            &header(),
            vec![
                RawBlock::body("good", "<b>ok</b>"),
                RawBlock::body("bad", b"<b>\xff</b>".to_vec()),
                RawBlock::body("after", "fine"),
            ],
            &mut out,
        )
        .expect("conversion continues past a bad entry");

    assert_eq!(report.entries_written, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "bad");
    assert!(
        report.failed[0].1.contains("byte 3"),
        "message names the offset: {}",
        report.failed[0].1
    );
    assert!(!report.is_clean());

    let dsl = String::from_utf8(out).expect("utf-8 output");
    assert_eq!(
        dsl,
        format!(
            "{}good\n\t[m1][b]ok[/b][/m]\n\nafter\n\t[m1]fine[/m]\n\n",
            HEADER
        )
    );
}

#[test]
fn report_counts_headwords_and_drops() {
    let mut out = Vec::new();
    let report = utf8_converter()
        .convert_blocks(
            &header(),
            vec![
                RawBlock::body("run|ran", "A"),
                RawBlock::link("runs", "run"),
                RawBlock::body("  ", "lost"),
                RawBlock::body("walk", "B"),
            ],
            &mut out,
        )
        .expect("conversion");
    assert_eq!(report.entries_written, 2);
    assert_eq!(report.headword_lines, 4);
    assert_eq!(report.dropped_blocks, 1);
    assert!(report.is_clean());
}

#[test]
fn mtxt_file_conversion() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("sample.dsl");
    let converter = Converter::new(ConvertOptions {
        output_encoding: OutputEncoding::Utf8,
        output: Some(output.clone()),
        ..ConvertOptions::default()
    });

    let report = converter
        .convert_file(fixture_path("sample.mtxt"))
        .expect("convert mtxt");
    assert_eq!(report.output.as_deref(), Some(output.as_path()));
    assert_eq!(report.entries_written, 2);
    assert_eq!(report.headword_lines, 4);
    assert_eq!(report.archived_resources, None, "fixture has no resource folder");

    let dsl = fs::read_to_string(&output).expect("read output");
    assert_eq!(dsl, SAMPLE_MTXT_DSL);
}

#[test]
fn tabular_file_conversion_uses_file_stem_and_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("out.dsl");
    let converter = Converter::new(ConvertOptions {
        layout: LayoutChoice::Tabular,
        output_encoding: OutputEncoding::Utf8,
        output: Some(output.clone()),
        package_resources: false,
        ..ConvertOptions::default()
    });

    let report = converter
        .convert_file(fixture_path("sample.txt"))
        .expect("convert txt");
    assert_eq!(report.dropped_blocks, 1, "malformed source line");

    let dsl = fs::read_to_string(&output).expect("read output");
    assert_eq!(dsl, SAMPLE_TXT_DSL);
}

#[test]
fn options_override_source_metadata() {
    let converter = Converter::new(ConvertOptions {
        name: Some("Override".to_string()),
        contents_language: Some("French".to_string()),
        ..ConvertOptions::default()
    });
    let metadata = lingvo_dsl::dsl::types::models::SourceMetadata {
        name: Some("From File".to_string()),
        source_language: Some("German".to_string()),
        target_language: Some("Arabic".to_string()),
    };
    let header = converter.resolve_header(std::path::Path::new("dict.mtxt"), &metadata);
    assert_eq!(header.name, "Override");
    assert_eq!(header.index_language, "GERMAN");
    assert_eq!(header.contents_language, "FRENCH");
}

#[test]
fn utf16_output_with_resources() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("pics.txt");
    fs::write(&input, "pic\t<img src=\"a.png\">\n").expect("write source");
    let res = dir.path().join("pics.txt_res");
    fs::create_dir_all(&res).expect("create res");
    fs::write(res.join("a.png"), b"\x89PNG").expect("write png");

    let output = dir.path().join("pics.dsl");
    let converter = Converter::new(ConvertOptions {
        output: Some(output.clone()),
        ..ConvertOptions::default()
    });
    let report = converter.convert_file(&input).expect("convert");
    assert_eq!(report.archived_resources, Some(1));
    assert!(dir.path().join("pics.dsl.files.zip").exists());

    let bytes = fs::read(&output).expect("read output");
    assert_eq!(&bytes[..2], &[0xFF, 0xFE], "UTF-16LE byte order mark");
    let (text, _, had_errors) = encoding_rs::UTF_16LE.decode(&bytes);
    assert!(!had_errors);
    assert!(
        text.contains("pic\n\t[m1][s]a.png[/s][/m]\n"),
        "unexpected body in {:?}",
        text
    );
}
