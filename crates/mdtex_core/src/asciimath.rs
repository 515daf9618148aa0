//! Translation of ASCII math notation (`x^2 + alpha/2`, `sqrt(a+b)`) into
//! LaTeX math.

use std::collections::HashMap;

/// Turns a math notation into LaTeX math markup, delimiters included.
pub trait MathTranslator {
    /// `display` selects block style over inline style. Returns `None` when
    /// the source cannot be translated.
    fn translate(&self, source: &str, display: bool) -> Option<String>;
}

/// Deepest nesting of groups and unary commands before giving up.
const MAX_DEPTH: usize = 64;

/// Multi-character symbols, longest first so prefixes never shadow them.
const OPERATORS: &[(&str, &str)] = &[
    ("<=>", "\\Leftrightarrow"),
    ("|->", "\\mapsto"),
    ("...", "\\ldots"),
    ("<=", "\\le"),
    (">=", "\\ge"),
    ("!=", "\\ne"),
    ("->", "\\to"),
    ("=>", "\\Rightarrow"),
    ("+-", "\\pm"),
    ("**", "\\ast"),
    ("~~", "\\approx"),
    ("-=", "\\equiv"),
    ("*", "\\cdot"),
];

const WORDS: &[(&str, &str)] = &[
    ("alpha", "\\alpha"),
    ("beta", "\\beta"),
    ("gamma", "\\gamma"),
    ("Gamma", "\\Gamma"),
    ("delta", "\\delta"),
    ("Delta", "\\Delta"),
    ("epsilon", "\\epsilon"),
    ("zeta", "\\zeta"),
    ("eta", "\\eta"),
    ("theta", "\\theta"),
    ("Theta", "\\Theta"),
    ("iota", "\\iota"),
    ("kappa", "\\kappa"),
    ("lambda", "\\lambda"),
    ("Lambda", "\\Lambda"),
    ("mu", "\\mu"),
    ("nu", "\\nu"),
    ("xi", "\\xi"),
    ("Xi", "\\Xi"),
    ("pi", "\\pi"),
    ("Pi", "\\Pi"),
    ("rho", "\\rho"),
    ("sigma", "\\sigma"),
    ("Sigma", "\\Sigma"),
    ("tau", "\\tau"),
    ("upsilon", "\\upsilon"),
    ("phi", "\\phi"),
    ("Phi", "\\Phi"),
    ("chi", "\\chi"),
    ("psi", "\\psi"),
    ("Psi", "\\Psi"),
    ("omega", "\\omega"),
    ("Omega", "\\Omega"),
    ("xx", "\\times"),
    ("div", "\\div"),
    ("cdot", "\\cdot"),
    ("oo", "\\infty"),
    ("sum", "\\sum"),
    ("prod", "\\prod"),
    ("int", "\\int"),
    ("oint", "\\oint"),
    ("lim", "\\lim"),
    ("in", "\\in"),
    ("sub", "\\subset"),
    ("sube", "\\subseteq"),
    ("sup", "\\supset"),
    ("supe", "\\supseteq"),
    ("cup", "\\cup"),
    ("cap", "\\cap"),
    ("AA", "\\forall"),
    ("EE", "\\exists"),
    ("del", "\\partial"),
    ("grad", "\\nabla"),
    ("NN", "\\mathbb{N}"),
    ("ZZ", "\\mathbb{Z}"),
    ("QQ", "\\mathbb{Q}"),
    ("RR", "\\mathbb{R}"),
    ("CC", "\\mathbb{C}"),
    ("sin", "\\sin"),
    ("cos", "\\cos"),
    ("tan", "\\tan"),
    ("sec", "\\sec"),
    ("csc", "\\csc"),
    ("cot", "\\cot"),
    ("log", "\\log"),
    ("ln", "\\ln"),
    ("exp", "\\exp"),
    ("det", "\\det"),
    ("max", "\\max"),
    ("min", "\\min"),
];

/// Commands taking one argument.
const UNARY: &[(&str, &str)] = &[
    ("sqrt", "\\sqrt"),
    ("hat", "\\hat"),
    ("bar", "\\overline"),
    ("vec", "\\vec"),
    ("dot", "\\dot"),
    ("ul", "\\underline"),
];

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Atom(String),
    Unary(&'static str),
    Open(char),
    Close(char),
    Frac,
    Sub,
    Sup,
}

/// The bundled translator. Construction builds its symbol tables.
#[derive(Debug)]
pub struct AsciiMathTranslator {
    words: HashMap<&'static str, Tok>,
    longest_word: usize,
}

impl Default for AsciiMathTranslator {
    fn default() -> Self {
        let mut words = HashMap::new();
        for (name, latex) in WORDS {
            words.insert(*name, Tok::Atom((*latex).to_string()));
        }
        for (name, latex) in UNARY {
            words.insert(*name, Tok::Unary(*latex));
        }
        let longest_word = words.keys().map(|k| k.len()).max().unwrap_or(0);
        Self {
            words,
            longest_word,
        }
    }
}

impl MathTranslator for AsciiMathTranslator {
    fn translate(&self, source: &str, display: bool) -> Option<String> {
        let source = source.trim();
        if source.is_empty() {
            return None;
        }
        let tokens = self.lex(source);
        let mut parser = MathParser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let body = parser.expression(None)?;
        if parser.pos < parser.tokens.len() {
            return None;
        }
        if display {
            Some(format!("\\[\n{body}\n\\]"))
        } else {
            Some(format!("${body}$"))
        }
    }
}

impl AsciiMathTranslator {
    fn lex(&self, source: &str) -> Vec<Tok> {
        let mut tokens = Vec::new();
        let mut rest = source;

        while let Some(c) = rest.chars().next() {
            if c.is_whitespace() {
                rest = &rest[c.len_utf8()..];
                continue;
            }
            if c.is_ascii_alphabetic() {
                let run = rest
                    .find(|ch: char| !ch.is_ascii_alphabetic())
                    .unwrap_or(rest.len());
                self.lex_word(&rest[..run], &mut tokens);
                rest = &rest[run..];
                continue;
            }
            if c.is_ascii_digit() {
                let run = rest
                    .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
                    .unwrap_or(rest.len());
                tokens.push(Tok::Atom(rest[..run].to_string()));
                rest = &rest[run..];
                continue;
            }
            if let Some((op, latex)) = OPERATORS.iter().find(|(op, _)| rest.starts_with(op)) {
                tokens.push(Tok::Atom((*latex).to_string()));
                rest = &rest[op.len()..];
                continue;
            }
            tokens.push(match c {
                '(' | '[' | '{' => Tok::Open(c),
                ')' | ']' | '}' => Tok::Close(c),
                '/' => Tok::Frac,
                '_' => Tok::Sub,
                '^' => Tok::Sup,
                '%' | '#' | '&' | '$' => Tok::Atom(format!("\\{c}")),
                '\\' => Tok::Atom("\\backslash".to_string()),
                '~' => Tok::Atom("\\sim".to_string()),
                _ => Tok::Atom(c.to_string()),
            });
            rest = &rest[c.len_utf8()..];
        }
        tokens
    }

    /// Split a letter run into known words (longest prefix first) and
    /// single-letter identifiers.
    fn lex_word(&self, word: &str, tokens: &mut Vec<Tok>) {
        let mut pos = 0;
        while pos < word.len() {
            let remaining = &word[pos..];
            let max = remaining.len().min(self.longest_word);
            let known = (1..=max)
                .rev()
                .find_map(|len| self.words.get(&remaining[..len]).map(|tok| (len, tok)));
            match known {
                Some((len, tok)) => {
                    tokens.push(tok.clone());
                    pos += len;
                }
                None => {
                    tokens.push(Tok::Atom(remaining[..1].to_string()));
                    pos += 1;
                }
            }
        }
    }
}

/// A translated piece. `inner` is the form used as an argument: groups lose
/// their brackets there.
struct Piece {
    latex: String,
    inner: String,
}

impl Piece {
    fn plain(latex: String) -> Self {
        Self {
            inner: latex.clone(),
            latex,
        }
    }
}

struct MathParser {
    tokens: Vec<Tok>,
    pos: usize,
    depth: usize,
}

impl MathParser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    /// Parse until the end of input, or until the close bracket matching
    /// `open`. The close bracket is left for the caller.
    fn expression(&mut self, open: Option<char>) -> Option<String> {
        let mut pieces = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return if open.is_none() {
                        Some(pieces.join(" "))
                    } else {
                        None
                    };
                }
                Some(Tok::Close(_)) => {
                    return if open.is_some() {
                        Some(pieces.join(" "))
                    } else {
                        None
                    };
                }
                Some(_) => {}
            }

            let numerator = self.intermediate()?;
            if self.peek() == Some(&Tok::Frac) {
                self.pos += 1;
                let denominator = self.intermediate()?;
                pieces.push(format!(
                    "\\frac{{{}}}{{{}}}",
                    numerator.inner, denominator.inner
                ));
            } else {
                pieces.push(numerator.latex);
            }
        }
    }

    fn intermediate(&mut self) -> Option<Piece> {
        let mut piece = self.simple()?;
        if self.peek() == Some(&Tok::Sub) {
            self.pos += 1;
            let sub = self.simple()?;
            piece = Piece::plain(format!("{}_{{{}}}", piece.latex, sub.inner));
        }
        if self.peek() == Some(&Tok::Sup) {
            self.pos += 1;
            let sup = self.simple()?;
            piece = Piece::plain(format!("{}^{{{}}}", piece.latex, sup.inner));
        }
        Some(piece)
    }

    fn simple(&mut self) -> Option<Piece> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let piece = self.simple_inner();
        self.depth -= 1;
        piece
    }

    fn simple_inner(&mut self) -> Option<Piece> {
        match self.next()? {
            Tok::Atom(atom) => Some(Piece::plain(atom)),
            Tok::Unary(command) => {
                let argument = self.simple()?;
                Some(Piece::plain(format!("{command}{{{}}}", argument.inner)))
            }
            Tok::Open(open) => {
                let inner = self.expression(Some(open))?;
                match self.next()? {
                    Tok::Close(close) if close == closing(open) => {}
                    _ => return None,
                }
                let (left, right) = match open {
                    '(' => ("(", ")"),
                    '[' => ("[", "]"),
                    _ => ("\\{", "\\}"),
                };
                Some(Piece {
                    latex: format!("\\left{left} {inner} \\right{right}"),
                    inner,
                })
            }
            Tok::Close(_) => None,
            Tok::Frac => Some(Piece::plain("/".to_string())),
            Tok::Sub => Some(Piece::plain("\\_".to_string())),
            Tok::Sup => Some(Piece::plain("\\hat{}".to_string())),
        }
    }
}

fn closing(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}
