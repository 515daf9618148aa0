/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(Vec<Span>),
    Italic(Vec<Span>),
    /// Kept unescaped; escaping happens at render time.
    Code(String),
    Link { url: String, content: Vec<Span> },
    Image(Image),
    Math(String),
}

/// An image reference, either a standalone figure or inline in running text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub alt: String,
    pub url: String,
    pub caption: String,
    /// Category used to label and number the figure, e.g. "Image" or "Figure".
    pub figure_type: String,
}

pub const DEFAULT_FIGURE_TYPE: &str = "Image";

impl Image {
    /// Build an image from its alt text. Alt text of the form `Type: caption`
    /// selects the figure type; otherwise the type is [`DEFAULT_FIGURE_TYPE`]
    /// and the whole alt text is the caption.
    pub fn from_alt(alt: &str, url: &str) -> Self {
        let (figure_type, caption) = match alt.split_once(':') {
            Some((kind, caption)) => (kind.trim().to_string(), caption.trim().to_string()),
            None => (DEFAULT_FIGURE_TYPE.to_string(), alt.to_string()),
        };
        Self {
            alt: alt.to_string(),
            url: url.to_string(),
            caption,
            figure_type,
        }
    }

    /// The last path component of the URL, which is how the asset is
    /// referenced next to the generated output.
    pub fn file_name(&self) -> &str {
        self.url
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.url.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Numbered,
}

/// A single list item, which can own nested lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub content: Vec<Span>,
    /// Deeper-indented lists that belong to this item, in source order.
    pub nested: Vec<List>,
}

/// A list (bullet or numbered). All items share the list's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

/// Block-level elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        content: Vec<Span>,
    },
    Rule,
    List(List),
    BlankLine,
    IndentedText(String),
    ForcedBreak(usize),
    Figure(Image),
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    Math(String),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        caption: Option<String>,
    },
    PageBreak,
    TableOfContents,
}

/// Root of the tree. Block order is render order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alt_with_type_prefix() {
        let image = Image::from_alt("Figure: A cat on a mat", "img/cat.png");
        assert_eq!(image.figure_type, "Figure");
        assert_eq!(image.caption, "A cat on a mat");
        assert_eq!(image.alt, "Figure: A cat on a mat");
    }

    #[test]
    fn alt_without_type_prefix() {
        let image = Image::from_alt("A cat", "cat.png");
        assert_eq!(image.figure_type, DEFAULT_FIGURE_TYPE);
        assert_eq!(image.caption, "A cat");
    }

    #[test]
    fn only_first_colon_splits() {
        let image = Image::from_alt("Chart: ratio 1:2", "c.png");
        assert_eq!(image.figure_type, "Chart");
        assert_eq!(image.caption, "ratio 1:2");
    }

    #[test]
    fn file_name_strips_directories() {
        assert_eq!(Image::from_alt("", "assets/img/cat.png").file_name(), "cat.png");
        assert_eq!(Image::from_alt("", "assets\\dog.jpg").file_name(), "dog.jpg");
        assert_eq!(Image::from_alt("", "plain.png").file_name(), "plain.png");
    }
}
