/// The closed set of lexical units produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Heading,
    BulletItem,
    NumberedItem,
    HorizontalRule,
    IndentedText,
    Paragraph,
    BlankLine,
    Image,
    CodeBlock,
    BlockMath,
    Table,
    PageBreak,
    TableOfContents,
    EndOfInput,
}

impl TokenKind {
    pub fn is_list_item(self) -> bool {
        matches!(self, TokenKind::BulletItem | TokenKind::NumberedItem)
    }
}

/// Token payload. Most kinds carry a line of text; images and code blocks
/// carry their parts already split out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    #[default]
    None,
    Text(String),
    Image {
        alt: String,
        url: String,
    },
    Code {
        language: Option<String>,
        content: String,
    },
}

/// A classified line (or multi-line block) of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub payload: Payload,
    /// Heading level, 1 to 3. Zero for every other kind.
    pub level: u8,
    /// Leading space count. Only recorded for list items.
    pub indent: usize,
}

impl Token {
    pub fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            payload: Payload::None,
            level: 0,
            indent: 0,
        }
    }

    pub fn text(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            payload: Payload::Text(text.into()),
            ..Self::new(kind)
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self {
            level,
            ..Self::text(TokenKind::Heading, text)
        }
    }

    pub fn list_item(kind: TokenKind, text: impl Into<String>, indent: usize) -> Self {
        Self {
            indent,
            ..Self::text(kind, text)
        }
    }

    pub fn image(alt: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            payload: Payload::Image {
                alt: alt.into(),
                url: url.into(),
            },
            ..Self::new(TokenKind::Image)
        }
    }

    pub fn code_block(language: Option<String>, content: impl Into<String>) -> Self {
        Self {
            payload: Payload::Code {
                language,
                content: content.into(),
            },
            ..Self::new(TokenKind::CodeBlock)
        }
    }

    /// The text payload, or an empty string for structured and empty payloads.
    pub fn text_value(&self) -> &str {
        match &self.payload {
            Payload::Text(text) => text,
            _ => "",
        }
    }
}
