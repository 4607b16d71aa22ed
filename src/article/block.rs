/// A piece of text in the source language together with its translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BilingualText {
    /// Text as scraped from the page
    pub original: String,

    /// Translated text (equal to `original` when translation fell back)
    pub translated: String,
}

impl BilingualText {
    pub fn new(original: impl Into<String>, translated: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            translated: translated.into(),
        }
    }

    /// Returns true if the translation differs from the source text
    pub fn is_translated(&self) -> bool {
        self.original != self.translated
    }
}

/// Structural kind of a content block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// A body paragraph (`<p>`)
    Paragraph,

    /// A first-level section heading inside the body (`<h2>`)
    Heading1,

    /// A second-level section heading inside the body (`<h3>`, `<h4>`)
    Heading2,

    /// An item of an unordered list
    BulletItem,

    /// An item of an ordered list with its 1-based running index
    NumberedItem(usize),
}

impl BlockKind {
    /// Returns true for list item kinds
    pub fn is_list_item(&self) -> bool {
        matches!(self, Self::BulletItem | Self::NumberedItem(_))
    }
}

/// One structural unit of article body content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    pub kind: BlockKind,
    pub text: BilingualText,
}

impl ContentBlock {
    pub fn new(kind: BlockKind, text: BilingualText) -> Self {
        Self { kind, text }
    }
}
