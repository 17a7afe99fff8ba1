//! Stack-based translation of one markup fragment into a raw DSL tag stream.
//!
//! The engine keeps a stack of [`ElementFrame`]s and an append-only output
//! buffer. End tags close the most recent frame of the same family even when
//! unrelated frames sit above it; those stay open until the fragment ends and
//! are then force-closed innermost first.
//!
//! The output is not yet line-normalised: see [`crate::dsl::postprocess`].

use log::trace;

use super::elements::{AUDIO_SCHEME, CloseAction, ElementFamily, ElementFrame, ElementKind};
use super::tokenizer::{Attributes, Token, Tokenizer, decode_entities};
use crate::dsl::types::error::{DslError, Result};
use crate::dsl::types::models::BLANK_PARAGRAPH;

/// Escaped space emitted for a non-breaking space.
const SPACE_ESCAPE: &str = "\\ ";

/// A literal backslash in text or a file name.
const BACKSLASH_ESCAPE: &str = "\\\\";

/// Characters after which a new word needs no separating space.
const GLUE_SAFE: &[char] = &['[', ']', '{', '}', '(', ')', '<', '>', '/', '-', '\\', '"', '\''];

/// Characters that attach to the preceding word.
const PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '»', '…', '%'];

/// Where the output cursor stands with respect to lines and breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// At the start of a line that was not opened by a `<br>`.
    LineStart,
    /// In the middle of a line.
    Inline,
    /// Right after a single line break.
    AfterBreak,
    /// Right after a blank-paragraph line; further breaks are absorbed.
    AfterBlank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParagraphState {
    Idle,
    Open,
}

/// Translates one markup fragment. Create one per fragment.
#[derive(Debug)]
pub struct MarkupEngine {
    out: String,
    stack: Vec<ElementFrame>,
    flow: Flow,
    paragraph: ParagraphState,
    /// Counter for list items outside any ordered list.
    loose_items: usize,
}

impl Default for MarkupEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupEngine {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            stack: Vec::new(),
            flow: Flow::LineStart,
            paragraph: ParagraphState::Idle,
            loose_items: 0,
        }
    }

    /// Translates a whole fragment and force-closes whatever is left open.
    pub fn translate(fragment: &[u8]) -> Result<String> {
        let mut engine = Self::new();
        engine.feed(fragment)?;
        Ok(engine.finish())
    }

    /// Processes every token of `fragment`.
    ///
    /// # Errors
    /// Returns [`DslError::Encoding`] if the fragment contains invalid UTF-8.
    pub fn feed(&mut self, fragment: &[u8]) -> Result<()> {
        for token in Tokenizer::new(fragment) {
            match token? {
                Token::Start {
                    name,
                    attributes,
                    self_closing,
                } => {
                    let Some(family) = ElementFamily::of(&name) else {
                        trace!("Ignoring unrecognised element <{}>", name);
                        continue;
                    };
                    let kind = family.classify(&attributes);
                    self.open(kind, attributes);
                    if self_closing && !kind.is_void() {
                        self.close(family);
                    }
                }
                Token::End { name } => {
                    if let Some(family) = ElementFamily::of(&name) {
                        self.close(family);
                    }
                }
                Token::Text { bytes, offset } => {
                    let text = std::str::from_utf8(bytes).map_err(|e| DslError::Encoding {
                        offset: offset + e.valid_up_to(),
                    })?;
                    self.text(&decode_entities(text));
                }
            }
        }
        Ok(())
    }

    /// Force-closes all open frames, innermost first, and returns the tag stream.
    pub fn finish(mut self) -> String {
        while let Some(frame) = self.stack.pop() {
            trace!("Force-closing {:?}", frame.kind);
            self.apply_close(&frame);
        }
        self.out
    }

    fn open(&mut self, kind: ElementKind, attributes: Attributes) {
        let mut frame = ElementFrame::new(kind, attributes);
        match kind {
            ElementKind::Resource => {
                let file = frame
                    .attributes
                    .get("data")
                    .or_else(|| frame.attributes.get("src"))
                    .filter(|f| !f.is_empty());
                if let Some(file) = file {
                    let tag = format!("[s]{}[/s]", file.replace('\\', BACKSLASH_ESCAPE));
                    self.push_inline(&tag);
                }
            }
            ElementKind::LineBreak => self.line_break(),
            ElementKind::Paragraph => {
                if self.paragraph == ParagraphState::Open {
                    self.blank_paragraph();
                }
                let depth = paragraph_depth(&frame.attributes);
                self.open_block(&format!("[m{}]", depth));
                self.paragraph = ParagraphState::Open;
            }
            ElementKind::StructuralParagraph => self.push_inline("[p]"),
            ElementKind::PlainSpan => {}
            ElementKind::OrderedList => frame.counter = 0,
            ElementKind::ListItem => {
                let depth = self
                    .stack
                    .iter()
                    .filter(|f| f.kind == ElementKind::OrderedList)
                    .count()
                    .clamp(1, 9);
                let number = match self
                    .stack
                    .iter_mut()
                    .rev()
                    .find(|f| f.kind == ElementKind::OrderedList)
                {
                    Some(list) => {
                        list.counter += 1;
                        list.counter
                    }
                    None => {
                        self.loose_items += 1;
                        self.loose_items
                    }
                };
                self.open_block(&format!("[m{}]{}. ", depth, number));
            }
            ElementKind::Color => {
                let tag = match frame.attributes.get("color") {
                    Some(color) if !color.trim().is_empty() => {
                        let clean: String = color
                            .trim()
                            .trim_start_matches('#')
                            .chars()
                            .filter(|c| !matches!(c, '[' | ']' | '\\'))
                            .collect();
                        format!("[c {}]", clean)
                    }
                    _ => "[c]".to_string(),
                };
                self.push_inline(&tag);
            }
            ElementKind::Bold => self.push_inline("[b]"),
            ElementKind::PartOfSpeech => {
                self.blank_paragraph();
                self.open_block("[m1][b][i]");
            }
            ElementKind::Italic => self.push_inline("[i]"),
            ElementKind::Underline => self.push_inline("[u]"),
            ElementKind::AudioLink => {
                let href = frame.attributes.get("href").map(String::as_str).unwrap_or("");
                let file = href.strip_prefix(AUDIO_SCHEME).unwrap_or(href);
                if !file.is_empty() {
                    let tag = format!("[m1][s]{}[/s][/m]", file.replace('\\', BACKSLASH_ESCAPE));
                    self.push_inline(&tag);
                }
            }
            ElementKind::Reference => self.push_inline("[ref]"),
        }

        if !kind.is_void() {
            self.stack.push(frame);
        }
    }

    /// Closes the most recent frame of `family`, leaving frames above it open.
    fn close(&mut self, family: ElementFamily) {
        let Some(idx) = self.stack.iter().rposition(|f| f.kind.family() == family) else {
            trace!("No open frame for end tag of {:?}", family);
            return;
        };
        let frame = self.stack.remove(idx);
        self.apply_close(&frame);
    }

    fn apply_close(&mut self, frame: &ElementFrame) {
        if frame.kind == ElementKind::Paragraph {
            self.paragraph = ParagraphState::Idle;
        }
        match frame.close_action() {
            CloseAction::Nothing => {}
            CloseAction::Inline(tag) => self.push_inline(tag),
            CloseAction::EndBlock(tag) => {
                self.out.push_str(tag);
                self.out.push('\n');
                self.flow = Flow::LineStart;
            }
        }
    }

    fn line_break(&mut self) {
        match self.flow {
            Flow::Inline | Flow::LineStart => {
                self.out.push_str("\n\t");
                self.flow = Flow::AfterBreak;
            }
            Flow::AfterBreak => {
                if self.has_content() {
                    self.out.push_str(BLANK_PARAGRAPH);
                    self.out.push_str("\n\t");
                }
                self.flow = Flow::AfterBlank;
            }
            Flow::AfterBlank => {}
        }
    }

    /// Emits a blank-paragraph line unless one was just emitted or nothing precedes it.
    fn blank_paragraph(&mut self) {
        if !self.has_content() {
            return;
        }
        match self.flow {
            Flow::AfterBlank => return,
            Flow::Inline => self.out.push('\n'),
            Flow::LineStart | Flow::AfterBreak => {}
        }
        self.out.push_str(BLANK_PARAGRAPH);
        self.out.push('\n');
        self.flow = Flow::AfterBlank;
    }

    fn has_content(&self) -> bool {
        !self.out.trim().is_empty()
    }

    /// Starts a margin block on a fresh line.
    fn open_block(&mut self, tags: &str) {
        if self.flow == Flow::Inline {
            self.out.push('\n');
        }
        self.out.push_str(tags);
        self.flow = Flow::Inline;
    }

    fn push_inline(&mut self, tags: &str) {
        self.out.push_str(tags);
        self.flow = Flow::Inline;
    }

    fn text(&mut self, text: &str) {
        for (i, piece) in text.split(BLANK_PARAGRAPH).enumerate() {
            if i > 0 {
                self.blank_paragraph();
            }
            for (j, segment) in piece.split('\u{a0}').enumerate() {
                if j > 0 {
                    self.push_inline(SPACE_ESCAPE);
                }
                self.plain_text(segment);
            }
        }
    }

    fn plain_text(&mut self, segment: &str) {
        let collapsed = collapse_whitespace(segment).replace('\\', BACKSLASH_ESCAPE);
        if collapsed.is_empty() {
            return;
        }
        if collapsed == " " {
            if self.flow == Flow::Inline && !self.out.ends_with(char::is_whitespace) {
                self.out.push(' ');
            }
            return;
        }

        let body = if self.flow == Flow::Inline && !self.out.ends_with(char::is_whitespace) {
            collapsed.as_str()
        } else {
            collapsed.trim_start()
        };
        if let (Some(prev), Some(next)) = (self.out.chars().last(), body.chars().next())
            && self.flow == Flow::Inline
            && needs_separator(prev, next)
        {
            self.out.push(' ');
        }
        self.out.push_str(body);
        self.flow = Flow::Inline;
    }
}

/// Margin depth for a paragraph: 2 when it carries a left inset of two or more em.
fn paragraph_depth(attributes: &Attributes) -> u8 {
    let Some(style) = attributes.get("style") else {
        return 1;
    };
    let inset = style.split(';').find_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        let prop = prop.trim().to_ascii_lowercase();
        if prop != "margin-left" && prop != "padding-left" {
            return None;
        }
        value.trim().strip_suffix("em")?.trim().parse::<f32>().ok()
    });
    match inset {
        Some(em) if em >= 2.0 => 2,
        _ => 1,
    }
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Whether two adjacent characters would glue two words together.
fn needs_separator(prev: char, next: char) -> bool {
    !(prev.is_whitespace()
        || GLUE_SAFE.contains(&prev)
        || next.is_whitespace()
        || PUNCTUATION.contains(&next))
}
