//! DSL file writer.
//!
//! A DSL file starts with three `#` directives and a blank line, followed by
//! one block per entry: every headword on its own unindented line, then the
//! tab-indented body lines, then a blank line.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::dsl::types::error::Result;
use crate::dsl::types::models::{
    DictionaryHeader, EMPTY_BODY_LINE, OutputEncoding, RenderedEntry,
};

/// Streams a DSL dictionary into any writer.
pub struct DslWriter<W: Write> {
    out: W,
    encoding: OutputEncoding,
    entries: usize,
    headword_lines: usize,
}

impl<W: Write> DslWriter<W> {
    /// Wraps `out`, writing a byte order mark first when the encoding needs one.
    pub fn new(mut out: W, encoding: OutputEncoding) -> Result<Self> {
        if encoding == OutputEncoding::Utf16Le {
            out.write_u16::<LittleEndian>(0xFEFF)?;
        }
        Ok(Self {
            out,
            encoding,
            entries: 0,
            headword_lines: 0,
        })
    }

    pub fn write_header(&mut self, header: &DictionaryHeader) -> Result<()> {
        let text = format!(
            "#NAME \"{}\"\n#INDEX_LANGUAGE \"{}\"\n#CONTENTS_LANGUAGE \"{}\"\n\n",
            header.name, header.index_language, header.contents_language
        );
        self.write_str(&text)
    }

    /// Writes one entry block. An entry without a body gets the empty body line.
    pub fn write_entry(&mut self, entry: &RenderedEntry) -> Result<()> {
        let mut text = String::new();
        for headword in &entry.headwords {
            text.push_str(headword);
            text.push('\n');
        }
        text.push_str(entry.body.as_deref().unwrap_or(EMPTY_BODY_LINE));
        text.push_str("\n\n");

        self.write_str(&text)?;
        self.entries += 1;
        self.headword_lines += entry.headwords.len();
        Ok(())
    }

    /// Number of entry blocks written so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Number of headword lines written so far.
    pub fn headword_lines(&self) -> usize {
        self.headword_lines
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_str(&mut self, text: &str) -> Result<()> {
        match self.encoding {
            OutputEncoding::Utf8 => self.out.write_all(text.as_bytes())?,
            OutputEncoding::Utf16Le => {
                for unit in text.encode_utf16() {
                    self.out.write_u16::<LittleEndian>(unit)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> DictionaryHeader {
        DictionaryHeader {
            name: "Test".to_string(),
            index_language: "ENGLISH".to_string(),
            contents_language: "ARABIC".to_string(),
        }
    }

    #[test]
    fn utf8_layout() {
        let mut writer = DslWriter::new(Vec::new(), OutputEncoding::Utf8).unwrap();
        writer.write_header(&header()).unwrap();
        writer
            .write_entry(&RenderedEntry {
                headwords: vec!["cat".to_string(), "kitty".to_string()],
                body: Some("\t[m1]feline[/m]".to_string()),
            })
            .unwrap();
        writer
            .write_entry(&RenderedEntry {
                headwords: vec!["dog".to_string()],
                body: None,
            })
            .unwrap();
        assert_eq!(writer.entries(), 2);
        assert_eq!(writer.headword_lines(), 3);

        let bytes = writer.finish().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "#NAME \"Test\"\n#INDEX_LANGUAGE \"ENGLISH\"\n#CONTENTS_LANGUAGE \"ARABIC\"\n\n\
             cat\nkitty\n\t[m1]feline[/m]\n\n\
             dog\n\t[m1][/m]\n\n"
        );
    }

    #[test]
    fn utf16_has_bom_and_little_endian_units() {
        let mut writer = DslWriter::new(Vec::new(), OutputEncoding::Utf16Le).unwrap();
        writer
            .write_entry(&RenderedEntry {
                headwords: vec!["é".to_string()],
                body: None,
            })
            .unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(&bytes[..4], &[0xFF, 0xFE, 0xE9, 0x00]);
        assert_eq!(bytes.len() % 2, 0);
    }
}
