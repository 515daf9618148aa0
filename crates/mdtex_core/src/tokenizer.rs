use tracing::debug;

use crate::token::{Token, TokenKind};

const CODE_FENCE: &str = "```";
const MATH_FENCE: &str = "$$";
const TABLE_OPEN: &str = ":::";
const TABLE_CLOSE: &str = ":::";
const TOC_MARKER: &str = "[TOC]";
const PAGE_BREAK_MARKER: &str = "---pagebreak---";
const RULE_MARKER: &str = "---";
const TAB_WIDTH: usize = 4;

/// Split input text into tokens. Always ends with `EndOfInput`.
pub fn tokenize(text: &str) -> Vec<Token> {
    let lines: Vec<&str> = text.lines().collect();
    let mut tokens = Vec::with_capacity(lines.len() + 1);
    let mut pos = 0;

    while pos < lines.len() {
        let line = lines[pos];

        if let Some(opener) = BlockOpener::detect(line) {
            let (content, next) = capture_block(&lines, pos + 1, &opener);
            tokens.push(opener.into_token(content));
            pos = next;
            continue;
        }

        tokens.push(tokenize_line(line));
        pos += 1;
    }

    tokens.push(Token::new(TokenKind::EndOfInput));
    debug!(lines = lines.len(), tokens = tokens.len(), "tokenized input");
    tokens
}

/// Multi-line block openers, checked before the single-line rules.
enum BlockOpener {
    Code(Option<String>),
    Math,
    Table,
}

impl BlockOpener {
    fn detect(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix(CODE_FENCE) {
            let language = rest.trim();
            let language = if language.is_empty() {
                None
            } else {
                Some(language.to_string())
            };
            return Some(BlockOpener::Code(language));
        }
        if trimmed == MATH_FENCE {
            return Some(BlockOpener::Math);
        }
        if let Some(rest) = trimmed.strip_prefix(TABLE_OPEN) {
            if rest.trim_start() == "table" {
                return Some(BlockOpener::Table);
            }
        }
        None
    }

    fn is_closer(&self, line: &str) -> bool {
        let trimmed = line.trim();
        match self {
            BlockOpener::Code(_) => trimmed == CODE_FENCE,
            BlockOpener::Math => trimmed == MATH_FENCE,
            BlockOpener::Table => trimmed == TABLE_CLOSE,
        }
    }

    fn into_token(self, content: String) -> Token {
        match self {
            BlockOpener::Code(language) => Token::code_block(language, content),
            BlockOpener::Math => Token::text(TokenKind::BlockMath, content),
            BlockOpener::Table => Token::text(TokenKind::Table, content),
        }
    }
}

/// Collect lines verbatim up to the closer. Returns the content and the index
/// just past the closer, or the end of input when the block is never closed.
fn capture_block(lines: &[&str], start: usize, opener: &BlockOpener) -> (String, usize) {
    let mut end = start;
    while end < lines.len() && !opener.is_closer(lines[end]) {
        end += 1;
    }
    let content = lines[start..end].join("\n");
    let next = if end < lines.len() { end + 1 } else { end };
    (content, next)
}

fn tokenize_line(line: &str) -> Token {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Token::new(TokenKind::BlankLine);
    }

    if trimmed == TOC_MARKER {
        return Token::new(TokenKind::TableOfContents);
    }
    if trimmed == PAGE_BREAK_MARKER {
        return Token::new(TokenKind::PageBreak);
    }
    if let Some((level, text)) = match_heading(trimmed) {
        return Token::heading(level, text);
    }
    if let Some((alt, url)) = match_image(trimmed) {
        return Token::image(alt, url);
    }
    if let Some(text) = match_bullet(trimmed) {
        return Token::list_item(TokenKind::BulletItem, text, indent_width(line));
    }
    if let Some(text) = match_numbered(trimmed) {
        return Token::list_item(TokenKind::NumberedItem, text, indent_width(line));
    }
    if trimmed == RULE_MARKER {
        return Token::new(TokenKind::HorizontalRule);
    }
    if let Some(text) = match_indented(trimmed) {
        return Token::text(TokenKind::IndentedText, text);
    }

    Token::text(TokenKind::Paragraph, line)
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

/// Strip `marker` and require at least one whitespace character after it.
fn after_marker<'a>(trimmed: &'a str, marker: &str) -> Option<&'a str> {
    let rest = trimmed.strip_prefix(marker)?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn match_heading(trimmed: &str) -> Option<(u8, &str)> {
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if !(1..=3).contains(&hashes) {
        return None;
    }
    Some((hashes as u8, trimmed[hashes..].trim()))
}

/// Whole-line `![alt](url)`.
fn match_image(trimmed: &str) -> Option<(&str, &str)> {
    let inner = trimmed.strip_prefix("![")?.strip_suffix(')')?;
    let (alt, url) = inner.split_once("](")?;
    if alt.contains(']') || url.is_empty() || url.contains(')') {
        return None;
    }
    Some((alt, url))
}

fn match_bullet(trimmed: &str) -> Option<&str> {
    after_marker(trimmed, "-")
}

fn match_numbered(trimmed: &str) -> Option<&str> {
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    after_marker(&trimmed[digits..], ".")
}

fn match_indented(trimmed: &str) -> Option<&str> {
    after_marker(trimmed, ">>")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::token::Payload;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input_is_just_end_of_input() {
        assert_eq!(kinds(""), vec![TokenKind::EndOfInput]);
    }

    #[rstest]
    #[case("# Title", 1, "Title")]
    #[case("## Section", 2, "Section")]
    #[case("### Sub section", 3, "Sub section")]
    #[case("## ", 2, "")]
    #[case("  # Indented", 1, "Indented")]
    fn headings(#[case] line: &str, #[case] level: u8, #[case] text: &str) {
        let tokens = tokenize(line);
        assert_eq!(tokens[0], Token::heading(level, text));
    }

    #[rstest]
    #[case("#### Too deep")]
    #[case("#####")]
    fn heading_lookalikes_are_paragraphs(#[case] line: &str) {
        let tokens = tokenize(line);
        assert_eq!(tokens[0], Token::text(TokenKind::Paragraph, line));
    }

    #[rstest]
    #[case("#Title", 1, "Title")]
    #[case("##Title", 2, "Title")]
    #[case("###  Spaced  ", 3, "Spaced")]
    fn heading_space_is_optional(#[case] line: &str, #[case] level: u8, #[case] text: &str) {
        assert_eq!(tokenize(line)[0], Token::heading(level, text));
    }

    #[test]
    fn whitespace_only_line_is_blank() {
        assert_eq!(
            kinds("   \n\t"),
            vec![
                TokenKind::BlankLine,
                TokenKind::BlankLine,
                TokenKind::EndOfInput
            ]
        );
    }

    #[test]
    fn list_items_record_indentation() {
        let tokens = tokenize("- A\n  - B\n    1. C");
        assert_eq!(tokens[0], Token::list_item(TokenKind::BulletItem, "A", 0));
        assert_eq!(tokens[1], Token::list_item(TokenKind::BulletItem, "B", 2));
        assert_eq!(tokens[2], Token::list_item(TokenKind::NumberedItem, "C", 4));
    }

    #[test]
    fn tab_counts_as_four_spaces() {
        let tokens = tokenize("- A\n\t- B\n \t1. C");
        assert_eq!(tokens[1], Token::list_item(TokenKind::BulletItem, "B", 4));
        assert_eq!(tokens[2], Token::list_item(TokenKind::NumberedItem, "C", 5));
    }

    #[test]
    fn dash_without_space_is_not_a_bullet() {
        assert_eq!(tokenize("-A")[0].kind, TokenKind::Paragraph);
        assert_eq!(tokenize("-")[0].kind, TokenKind::Paragraph);
    }

    #[test]
    fn markers() {
        assert_eq!(
            kinds("[TOC]\n---pagebreak---\n---\n>> quoted"),
            vec![
                TokenKind::TableOfContents,
                TokenKind::PageBreak,
                TokenKind::HorizontalRule,
                TokenKind::IndentedText,
                TokenKind::EndOfInput
            ]
        );
        assert_eq!(tokenize(">> quoted")[0].text_value(), "quoted");
    }

    #[test]
    fn image_must_span_whole_line() {
        assert_eq!(
            tokenize("![Figure: A cat](img/cat.png)")[0],
            Token::image("Figure: A cat", "img/cat.png")
        );
        assert_eq!(
            tokenize("See ![cat](cat.png) here")[0].kind,
            TokenKind::Paragraph
        );
    }

    #[test]
    fn paragraph_keeps_raw_line() {
        assert_eq!(
            tokenize("  some *text*")[0],
            Token::text(TokenKind::Paragraph, "  some *text*")
        );
    }

    #[test]
    fn fenced_code_captures_language_and_content() {
        let tokens = tokenize("```rust\nlet x = 1;\n\nlet y = 2;\n```\nafter");
        assert_eq!(
            tokens[0],
            Token::code_block(Some("rust".to_string()), "let x = 1;\n\nlet y = 2;")
        );
        assert_eq!(tokens[1], Token::text(TokenKind::Paragraph, "after"));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn fence_without_language() {
        let tokens = tokenize("```\n# not a heading\n```");
        assert_eq!(tokens[0], Token::code_block(None, "# not a heading"));
    }

    #[test]
    fn unclosed_fence_consumes_to_end() {
        let tokens = tokenize("```python\nprint(1)\n- not a list");
        assert_eq!(tokens.len(), 2);
        assert_eq!(
            tokens[0].payload,
            Payload::Code {
                language: Some("python".to_string()),
                content: "print(1)\n- not a list".to_string(),
            }
        );
        assert_eq!(tokens[1].kind, TokenKind::EndOfInput);
    }

    #[test]
    fn empty_unclosed_fence() {
        let tokens = tokenize("```");
        assert_eq!(tokens[0], Token::code_block(None, ""));
    }

    #[test]
    fn block_math() {
        let tokens = tokenize("$$\nE = mc^2\n$$");
        assert_eq!(tokens[0], Token::text(TokenKind::BlockMath, "E = mc^2"));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn table_block() {
        let tokens = tokenize(":::table\ncaption: Results\nA|B\n-|-\n1|2\n:::\n");
        assert_eq!(
            tokens[0],
            Token::text(TokenKind::Table, "caption: Results\nA|B\n-|-\n1|2")
        );
        assert_eq!(tokenize("::: table\n:::")[0].kind, TokenKind::Table);
    }
}
