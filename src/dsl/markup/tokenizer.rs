//! Lenient tokenizer for the HTML subset found in dictionary bodies.
//!
//! Tags, comments and attributes are read with `quick_xml`'s [`Reader`] in a
//! permissive configuration: end names are not checked against start names
//! and unmatched end tags are allowed. Text is kept as raw bytes so that
//! invalid UTF-8 is reported with a byte offset instead of being replaced.
//!
//! Malformed markup never fails the fragment. A `<` that does not start a
//! named tag, or a tag without a closing `>`, is returned as text and reading
//! resumes at the next `<`. Comments, doctypes and processing instructions
//! are skipped.

use std::borrow::Cow;
use std::collections::HashMap;

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::dsl::types::error::{DslError, Result};

/// Attribute map of a start tag. Names are lower-cased, values entity-decoded.
pub type Attributes = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Start {
        name: String,
        attributes: Attributes,
        self_closing: bool,
    },
    End {
        name: String,
    },
    /// Undecoded text bytes and their offset in the fragment.
    Text { bytes: &'a [u8], offset: usize },
}

const CDATA_OPEN: &[u8] = b"<![CDATA[";
const CDATA_CLOSE: &[u8] = b"]]>";

/// Iterator over the tokens of one markup fragment.
pub struct Tokenizer<'a> {
    input: &'a [u8],
    reader: Reader<&'a [u8]>,
    /// Offset of `reader`'s first byte in `input`.
    base: usize,
    /// Offset where the next event starts.
    cursor: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            reader: lenient_reader(input),
            base: 0,
            cursor: 0,
        }
    }

    /// Restarts reading at `pos` after markup the reader could not handle.
    fn resume_at(&mut self, pos: usize) {
        self.base = pos;
        self.cursor = pos;
        let input = self.input;
        self.reader = lenient_reader(&input[pos..]);
    }

    /// Handles a bad construct starting at `start`.
    ///
    /// An unfinished comment swallows the rest of the fragment and a broken
    /// `<!...>` or `<?...>` is skipped up to its `>`. Anything else becomes
    /// text up to the next `<`.
    fn recover(&mut self, start: usize) -> Option<Token<'a>> {
        let input = self.input;
        let rest = &input[start..];
        if matches!(rest.get(1), Some(b'!' | b'?')) {
            let skip = if rest.starts_with(b"<!--") {
                rest.len()
            } else {
                rest.iter().position(|&b| b == b'>').map_or(rest.len(), |i| i + 1)
            };
            self.resume_at(start + skip);
            return None;
        }

        let end = rest[1..]
            .iter()
            .position(|&b| b == b'<')
            .map_or(input.len(), |i| start + 1 + i);
        self.resume_at(end);
        Some(Token::Text {
            bytes: &input[start..end],
            offset: start,
        })
    }

    /// Builds a start tag token, or falls back to text for a nameless tag.
    fn start_tag(
        &mut self,
        tag: &BytesStart<'_>,
        start: usize,
        self_closing: bool,
    ) -> Option<Result<Token<'a>>> {
        let Some(name) = element_name(tag.name().as_ref()) else {
            return self.recover(start).map(Ok);
        };
        let raw = &self.input[start..self.cursor];
        Some(parse_attributes(tag, raw, start).map(|attributes| Token::Start {
            name,
            attributes,
            self_closing,
        }))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.input;
        loop {
            let start = self.cursor;
            if start >= input.len() {
                return None;
            }

            let event = self.reader.read_event();
            let consumed = self.base + self.reader.buffer_position() as usize;
            let token = match event {
                Ok(Event::Text(text)) => {
                    // The `<` that ended the text may already be consumed.
                    let end = if input[..consumed].ends_with(b"<") {
                        consumed - 1
                    } else {
                        consumed
                    };
                    let begin = end.saturating_sub(text.len());
                    self.cursor = end;
                    (begin < end).then(|| {
                        Ok(Token::Text {
                            bytes: &input[begin..end],
                            offset: begin,
                        })
                    })
                }
                Ok(Event::Start(tag)) => {
                    self.cursor = consumed;
                    self.start_tag(&tag, start, false)
                }
                Ok(Event::Empty(tag)) => {
                    self.cursor = consumed;
                    self.start_tag(&tag, start, true)
                }
                Ok(Event::End(tag)) => {
                    self.cursor = consumed;
                    match element_name(tag.name().as_ref()) {
                        Some(name) => Some(Ok(Token::End { name })),
                        None => self.recover(start).map(Ok),
                    }
                }
                Ok(Event::CData(_)) => {
                    self.cursor = consumed;
                    let inner_start = start + CDATA_OPEN.len();
                    let inner_end = consumed.saturating_sub(CDATA_CLOSE.len());
                    (inner_start < inner_end).then(|| {
                        Ok(Token::Text {
                            bytes: &input[inner_start..inner_end],
                            offset: inner_start,
                        })
                    })
                }
                // A lone `<` at the very end.
                Ok(Event::Eof) => self.recover(start).map(Ok),
                Ok(_) => {
                    self.cursor = consumed;
                    None
                }
                Err(_) => self.recover(start).map(Ok),
            };
            if token.is_some() {
                return token;
            }
        }
    }
}

/// A reader that accepts the loose nesting of dictionary markup.
fn lenient_reader(input: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(input);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.check_comments = false;
    reader
}

/// Decodes character and entity references. Unknown or malformed references stay literal.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    if let Ok(decoded) = unescape_with(text, resolve_html5_entity) {
        return decoded;
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let candidate = rest
            .find(';')
            .map(|semi| &rest[..=semi])
            .filter(|c| c.len() > 2 && !c[1..].contains(['&', ' ', '<']));
        match candidate.and_then(|c| unescape_with(c, resolve_html5_entity).ok()) {
            Some(decoded) => {
                out.push_str(&decoded);
                rest = &rest[candidate.map_or(1, str::len)..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

/// Lower-cased element name, cut at the first non-name byte.
/// `None` when the name does not start with a letter.
fn element_name(raw: &[u8]) -> Option<String> {
    if !raw.first().is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }
    let len = raw.iter().take_while(|&&b| is_name_char(b)).count();
    Some(String::from_utf8_lossy(&raw[..len]).to_ascii_lowercase())
}

/// Collects the attributes of `tag` in HTML mode: unquoted values and bare
/// names are accepted, and the first of duplicated names wins.
///
/// `raw` is the tag's source text at `offset`, used to place encoding errors.
fn parse_attributes(tag: &BytesStart<'_>, raw: &[u8], offset: usize) -> Result<Attributes> {
    let mut attributes = Attributes::new();
    let mut iter = tag.html_attributes();
    iter.with_checks(false);

    for attr in iter {
        let Ok(attr) = attr else {
            break;
        };
        let name = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let value = std::str::from_utf8(&attr.value).map_err(|e| DslError::Encoding {
            offset: offset + find(raw, &attr.value).unwrap_or(0) + e.valid_up_to(),
        })?;
        attributes
            .entry(name)
            .or_insert_with(|| decode_entities(value).into_owned());
    }

    Ok(attributes)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Tokenizer::new(input.as_bytes())
            .collect::<Result<Vec<_>>>()
            .expect("tokenize")
    }

    #[test]
    fn parses_quoted_unquoted_and_bare_attributes() {
        let toks = tokens(r#"<FONT Color=#ff0000 face='x y' data-flag>"#);
        let Token::Start { name, attributes, self_closing } = &toks[0] else {
            panic!("expected start tag, got {:?}", toks[0]);
        };
        assert_eq!(name, "font");
        assert!(!self_closing);
        assert_eq!(attributes["color"], "#ff0000");
        assert_eq!(attributes["face"], "x y");
        assert_eq!(attributes["data-flag"], "");
    }

    #[test]
    fn stray_angle_brackets_stay_text() {
        let toks = tokens("a < b <br/> c <unterminated");
        let texts: Vec<&[u8]> = toks
            .iter()
            .filter_map(|t| match t {
                Token::Text { bytes, .. } => Some(*bytes),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec![&b"a "[..], &b"< b "[..], &b" c "[..], &b"<unterminated"[..]]);
        assert!(matches!(&toks[2], Token::Start { name, self_closing: true, .. } if name == "br"));
    }

    #[test]
    fn quoted_angle_bracket_and_duplicate_attributes() {
        let toks = tokens(r#"<a title="x>y" HREF=first href="second">go</A>"#);
        let Token::Start { attributes, .. } = &toks[0] else {
            panic!("expected start tag, got {:?}", toks[0]);
        };
        assert_eq!(attributes["title"], "x>y");
        assert_eq!(attributes["href"], "first", "first duplicate wins");
        assert_eq!(toks[1], Token::Text { bytes: b"go", offset: 40 });
        assert_eq!(toks[2], Token::End { name: "a".to_string() });
    }

    #[test]
    fn mismatched_end_tags_are_still_reported() {
        let toks = tokens("<b><i>x</b></i></u>");
        let ends: Vec<&str> = toks
            .iter()
            .filter_map(|t| match t {
                Token::End { name } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ends, vec!["b", "i", "u"]);
    }

    #[test]
    fn comments_are_skipped() {
        let toks = tokens("x<!-- <b> -->y");
        assert_eq!(toks.len(), 2);
        let toks = tokens("x<!-- never closed <b>y");
        assert_eq!(toks, vec![Token::Text { bytes: b"x", offset: 0 }]);
    }

    #[test]
    fn entities_decode_leniently() {
        assert_eq!(decode_entities("a&nbsp;b"), "a\u{a0}b");
        assert_eq!(decode_entities("AT&T &amp; co &#65;"), "AT&T & co A");
        assert_eq!(decode_entities("&bogus; &lt;"), "&bogus; <");
    }
}
