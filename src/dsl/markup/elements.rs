//! Element dispatch table.
//!
//! Every recognised HTML element name belongs to one [`ElementFamily`]; the
//! family picks the concrete [`ElementKind`] from the start tag's attributes.
//! End tags are resolved by family, so `</em>` closes a frame opened by `<i>`.
//! Adding an element is a new table row plus, for a new kind, one arm in
//! [`ElementKind::close_action`] and in the engine's open handler.

use super::tokenizer::Attributes;

/// Groups of element names that open and close each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementFamily {
    Resource,
    Break,
    Paragraph,
    Span,
    OrderedList,
    ListItem,
    Font,
    Bold,
    Italic,
    Underline,
    Anchor,
}

/// Concrete behaviour selected for one start tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `img`/`object`: inline sound or picture file.
    Resource,
    LineBreak,
    Paragraph,
    /// `span class="p"`: DSL label span.
    StructuralParagraph,
    /// Any other `span`; silent, kept only so end tags pair up.
    PlainSpan,
    OrderedList,
    ListItem,
    Color,
    Bold,
    /// Italic without a class: a part-of-speech header line.
    PartOfSpeech,
    Italic,
    Underline,
    /// `a href="sound://..."`.
    AudioLink,
    Reference,
}

/// What closing a frame emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    Nothing,
    /// Inline closing tags.
    Inline(&'static str),
    /// Closing tags that end a margin block; the line ends after them.
    EndBlock(&'static str),
}

struct ElementRule {
    names: &'static [&'static str],
    family: ElementFamily,
}

static DISPATCH: &[ElementRule] = &[
    ElementRule { names: &["img", "object"], family: ElementFamily::Resource },
    ElementRule { names: &["br"], family: ElementFamily::Break },
    ElementRule { names: &["p"], family: ElementFamily::Paragraph },
    ElementRule { names: &["span"], family: ElementFamily::Span },
    ElementRule { names: &["ol"], family: ElementFamily::OrderedList },
    ElementRule { names: &["li"], family: ElementFamily::ListItem },
    ElementRule { names: &["font"], family: ElementFamily::Font },
    ElementRule { names: &["b", "strong"], family: ElementFamily::Bold },
    ElementRule { names: &["i", "em"], family: ElementFamily::Italic },
    ElementRule { names: &["u"], family: ElementFamily::Underline },
    ElementRule { names: &["a"], family: ElementFamily::Anchor },
];

/// URL scheme of links that point at a sound file.
pub const AUDIO_SCHEME: &str = "sound://";

impl ElementFamily {
    /// Looks up the family of a lower-cased element name.
    pub fn of(name: &str) -> Option<Self> {
        DISPATCH
            .iter()
            .find(|rule| rule.names.contains(&name))
            .map(|rule| rule.family)
    }

    /// Selects the element kind for a start tag of this family.
    pub fn classify(self, attributes: &Attributes) -> ElementKind {
        match self {
            ElementFamily::Resource => ElementKind::Resource,
            ElementFamily::Break => ElementKind::LineBreak,
            ElementFamily::Paragraph => ElementKind::Paragraph,
            ElementFamily::Span => {
                if has_class(attributes, "p") {
                    ElementKind::StructuralParagraph
                } else {
                    ElementKind::PlainSpan
                }
            }
            ElementFamily::OrderedList => ElementKind::OrderedList,
            ElementFamily::ListItem => ElementKind::ListItem,
            ElementFamily::Font => ElementKind::Color,
            ElementFamily::Bold => ElementKind::Bold,
            ElementFamily::Italic => {
                if attributes.contains_key("class") {
                    ElementKind::Italic
                } else {
                    ElementKind::PartOfSpeech
                }
            }
            ElementFamily::Underline => ElementKind::Underline,
            ElementFamily::Anchor => {
                let href = attributes.get("href").map(String::as_str).unwrap_or("");
                if href.starts_with(AUDIO_SCHEME) {
                    ElementKind::AudioLink
                } else {
                    ElementKind::Reference
                }
            }
        }
    }
}

impl ElementKind {
    pub fn family(self) -> ElementFamily {
        match self {
            ElementKind::Resource => ElementFamily::Resource,
            ElementKind::LineBreak => ElementFamily::Break,
            ElementKind::Paragraph => ElementFamily::Paragraph,
            ElementKind::StructuralParagraph | ElementKind::PlainSpan => ElementFamily::Span,
            ElementKind::OrderedList => ElementFamily::OrderedList,
            ElementKind::ListItem => ElementFamily::ListItem,
            ElementKind::Color => ElementFamily::Font,
            ElementKind::Bold => ElementFamily::Bold,
            ElementKind::PartOfSpeech | ElementKind::Italic => ElementFamily::Italic,
            ElementKind::Underline => ElementFamily::Underline,
            ElementKind::AudioLink | ElementKind::Reference => ElementFamily::Anchor,
        }
    }

    /// Void kinds emit everything on open and never sit on the frame stack.
    pub fn is_void(self) -> bool {
        matches!(self, ElementKind::Resource | ElementKind::LineBreak)
    }

    pub fn close_action(self) -> CloseAction {
        match self {
            ElementKind::Paragraph | ElementKind::ListItem => CloseAction::EndBlock("[/m]"),
            ElementKind::PartOfSpeech => CloseAction::EndBlock("[/i][/b][/m]"),
            ElementKind::StructuralParagraph => CloseAction::Inline("[/p]"),
            ElementKind::Color => CloseAction::Inline("[/c]"),
            ElementKind::Bold => CloseAction::Inline("[/b]"),
            ElementKind::Italic => CloseAction::Inline("[/i]"),
            ElementKind::Underline => CloseAction::Inline("[/u]"),
            ElementKind::Reference => CloseAction::Inline("[/ref]"),
            ElementKind::Resource
            | ElementKind::LineBreak
            | ElementKind::PlainSpan
            | ElementKind::OrderedList
            | ElementKind::AudioLink => CloseAction::Nothing,
        }
    }
}

/// One open element on the engine's stack.
#[derive(Debug, Clone)]
pub struct ElementFrame {
    pub kind: ElementKind,
    pub attributes: Attributes,
    /// Items numbered so far; only used by ordered lists.
    pub(crate) counter: usize,
}

impl ElementFrame {
    pub fn new(kind: ElementKind, attributes: Attributes) -> Self {
        Self {
            kind,
            attributes,
            counter: 0,
        }
    }

    pub fn close_action(&self) -> CloseAction {
        self.kind.close_action()
    }
}

fn has_class(attributes: &Attributes, class: &str) -> bool {
    attributes
        .get("class")
        .is_some_and(|value| value.split_whitespace().any(|c| c == class))
}
