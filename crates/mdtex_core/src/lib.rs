pub mod asciimath;
pub mod assets;
mod block;
pub mod compile;
mod config;
mod error;
mod inline;
pub mod latex;
pub mod metadata;
pub mod parser;
mod pipeline;
mod token;
pub mod tokenizer;

pub use block::{Block, Document, Image, List, ListItem, ListKind, Span};
pub use compile::{CompileError, Pdflatex, TexCompiler};
pub use config::{Config, MathMode};
pub use error::Error;
pub use metadata::Metadata;
pub use pipeline::{Job, Report};
pub use token::{Payload, Token, TokenKind};

use tracing::debug;

/// Everything produced by converting one Markdown text.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub metadata: Metadata,
    pub document: Document,
    pub latex: String,
}

/// Parse markdown text into a document. Leading metadata lines are dropped.
pub fn parse(markdown: &str) -> Document {
    let (_, content) = metadata::extract(markdown);
    parser::parse(&tokenizer::tokenize(&content))
}

/// Run the whole text pipeline: metadata, tokens, document, LaTeX.
pub fn convert(markdown: &str, config: &Config) -> Conversion {
    let (metadata, content) = metadata::extract(markdown);
    let tokens = tokenizer::tokenize(&content);
    let document = parser::parse(&tokens);
    let latex = latex::render_with_config(&document, &metadata, config);
    debug!(
        metadata = metadata.len(),
        tokens = tokens.len(),
        blocks = document.blocks.len(),
        "converted markdown"
    );
    Conversion {
        metadata,
        document,
        latex,
    }
}

/// Convert markdown to a LaTeX document using default config.
pub fn markdown_to_latex(markdown: &str) -> String {
    markdown_to_latex_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to a LaTeX document with custom config.
pub fn markdown_to_latex_with_config(markdown: &str, config: &Config) -> String {
    convert(markdown, config).latex
}
