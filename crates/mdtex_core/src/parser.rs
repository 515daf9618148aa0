use tracing::debug;

use crate::block::{Block, Document, Image, List, ListItem, ListKind, Span};
use crate::inline;
use crate::token::{Payload, Token, TokenKind};

/// Parse a token sequence into a document. Never fails: tokens that cannot
/// start a block are skipped, and parsing stops at `EndOfInput` or when the
/// tokens run out.
pub fn parse(tokens: &[Token]) -> Document {
    let mut parser = Parser { tokens, pos: 0 };
    let document = parser.parse_document();
    debug!(blocks = document.blocks.len(), "parsed document");
    document
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    fn parse_document(&mut self) -> Document {
        let mut blocks = Vec::new();
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::EndOfInput {
                break;
            }
            if let Some(block) = self.parse_block(token) {
                blocks.push(block);
            }
        }
        Document { blocks }
    }

    /// Build the block starting at `token`. Always consumes at least one token.
    fn parse_block(&mut self, token: &'t Token) -> Option<Block> {
        match token.kind {
            TokenKind::Heading => {
                self.advance();
                Some(Block::Heading {
                    level: token.level,
                    text: token.text_value().to_string(),
                })
            }
            TokenKind::BulletItem | TokenKind::NumberedItem => {
                Some(Block::List(self.parse_list(token.indent, list_kind(token.kind))))
            }
            TokenKind::HorizontalRule => {
                self.advance();
                Some(Block::Rule)
            }
            TokenKind::IndentedText => {
                self.advance();
                Some(Block::IndentedText(token.text_value().to_string()))
            }
            TokenKind::Paragraph => Some(self.parse_paragraph()),
            TokenKind::BlankLine => Some(self.parse_blank_lines()),
            TokenKind::Image => {
                self.advance();
                match &token.payload {
                    Payload::Image { alt, url } => Some(Block::Figure(Image::from_alt(alt, url))),
                    _ => None,
                }
            }
            TokenKind::CodeBlock => {
                self.advance();
                match &token.payload {
                    Payload::Code { language, content } => Some(Block::CodeBlock {
                        language: language.clone(),
                        content: content.clone(),
                    }),
                    _ => None,
                }
            }
            TokenKind::BlockMath => {
                self.advance();
                Some(Block::Math(token.text_value().to_string()))
            }
            TokenKind::Table => {
                self.advance();
                Some(parse_table(token.text_value()))
            }
            TokenKind::PageBreak => {
                self.advance();
                Some(Block::PageBreak)
            }
            TokenKind::TableOfContents => {
                self.advance();
                Some(Block::TableOfContents)
            }
            TokenKind::EndOfInput => {
                self.advance();
                None
            }
        }
    }

    /// Consume list items at `base` indentation. A deeper item starts a
    /// nested list owned by the most recent item; a shallower item, an item
    /// of the other kind at this depth, or any non-item token ends the list.
    fn parse_list(&mut self, base: usize, kind: ListKind) -> List {
        let mut items: Vec<ListItem> = Vec::new();

        while let Some(token) = self.peek() {
            if !token.kind.is_list_item() || token.indent < base {
                break;
            }

            if token.indent > base {
                match items.last_mut() {
                    Some(parent) => {
                        let nested = self.parse_list(token.indent, list_kind(token.kind));
                        parent.nested.push(nested);
                        continue;
                    }
                    None => break,
                }
            }

            if list_kind(token.kind) != kind {
                break;
            }

            self.advance();
            items.push(ListItem {
                content: inline::scan(token.text_value()),
                nested: Vec::new(),
            });
        }

        List { kind, items }
    }

    /// Merge consecutive paragraph lines, separated by newline text spans.
    fn parse_paragraph(&mut self) -> Block {
        let mut content: Vec<Span> = Vec::new();
        while self.peek_kind() == Some(TokenKind::Paragraph) {
            let Some(token) = self.advance() else { break };
            if !content.is_empty() {
                content.push(Span::Text("\n".to_string()));
            }
            content.extend(inline::scan(token.text_value()));
        }
        Block::Paragraph { content }
    }

    /// Two blank lines collapse into a forced break; a lone one stays blank.
    fn parse_blank_lines(&mut self) -> Block {
        self.advance();
        if self.peek_kind() == Some(TokenKind::BlankLine) {
            self.advance();
            Block::ForcedBreak(1)
        } else {
            Block::BlankLine
        }
    }
}

fn list_kind(kind: TokenKind) -> ListKind {
    match kind {
        TokenKind::NumberedItem => ListKind::Numbered,
        _ => ListKind::Bullet,
    }
}

/// Table block content: `key: value` lines without pipes are metadata, the
/// first data line is the header row, the second is the separator, the rest
/// are rows.
fn parse_table(content: &str) -> Block {
    let mut caption = None;
    let mut data_lines = Vec::new();

    for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if line.contains(':') && !line.contains('|') {
            if let Some((key, value)) = line.split_once(':') {
                if key.trim().eq_ignore_ascii_case("caption") {
                    caption = Some(value.trim().to_string());
                }
            }
        } else {
            data_lines.push(line);
        }
    }

    let mut data = data_lines.into_iter();
    let headers = data.next().map(split_row).unwrap_or_default();
    data.next();
    let rows = data.map(split_row).collect();

    Block::Table {
        headers,
        rows,
        caption,
    }
}

fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(|cell| cell.trim().to_string()).collect()
}
