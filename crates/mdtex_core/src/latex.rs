use std::collections::HashMap;

use once_cell::unsync::OnceCell;
use tracing::debug;

use crate::asciimath::{AsciiMathTranslator, MathTranslator};
use crate::block::{Block, Document, Image, List, ListKind, Span};
use crate::config::{Config, MathMode};
use crate::metadata::Metadata;

/// Render a document with the bundled configuration.
pub fn render(document: &Document, metadata: &Metadata) -> String {
    render_with_config(document, metadata, &Config::compiled_default())
}

/// Render a complete LaTeX document: preamble, body and closing.
pub fn render_with_config(document: &Document, metadata: &Metadata, config: &Config) -> String {
    Renderer::<AsciiMathTranslator>::new(metadata, config).render(document)
}

/// Render-time state for one conversion.
///
/// The math translator is only built when a math node is rendered in
/// [`MathMode::Ascii`], and at most once per renderer. Figure counters are
/// reset at the start of every [`Renderer::render`] call.
pub struct Renderer<'c, T = AsciiMathTranslator> {
    config: &'c Config,
    metadata: Metadata,
    math_mode: MathMode,
    translator: OnceCell<T>,
    figure_counters: HashMap<String, usize>,
}

impl<'c, T: MathTranslator + Default> Renderer<'c, T> {
    /// Document metadata wins over the config's default metadata; the `math`
    /// key wins over the config's math mode.
    pub fn new(metadata: &Metadata, config: &'c Config) -> Self {
        let metadata = config.metadata.merged_with(metadata);
        let math_mode = metadata
            .get("math")
            .and_then(MathMode::from_name)
            .unwrap_or(config.math.mode);
        Self {
            config,
            metadata,
            math_mode,
            translator: OnceCell::new(),
            figure_counters: HashMap::new(),
        }
    }

    pub fn math_mode(&self) -> MathMode {
        self.math_mode
    }

    /// Whether the math translator has been constructed.
    pub fn translator_loaded(&self) -> bool {
        self.translator.get().is_some()
    }

    pub fn render(&mut self, document: &Document) -> String {
        let mut out = self.preamble();
        out.push_str("\\begin{document}\n");
        out.push_str("\\maketitle\n\n");
        if document.blocks.is_empty() {
            out.push_str("No content provided.\n");
        } else {
            out.push_str(&self.render_body(document));
        }
        out.push_str("\\end{document}\n");
        out
    }

    /// Only the content between `\begin{document}` and `\end{document}`.
    pub fn render_body(&mut self, document: &Document) -> String {
        self.figure_counters.clear();
        let mut out = String::new();
        for block in &document.blocks {
            self.emit_block(block, &mut out);
        }
        debug!(bytes = out.len(), math_mode = ?self.math_mode, "rendered body");
        out
    }

    /// Document class, packages and title block.
    pub fn preamble(&self) -> String {
        let mut out = String::new();
        match &self.config.document.font_size {
            Some(size) => out.push_str(&format!(
                "\\documentclass[{}]{{{}}}\n",
                size, self.config.document.class
            )),
            None => out.push_str(&format!(
                "\\documentclass{{{}}}\n",
                self.config.document.class
            )),
        }
        out.push_str("\\usepackage[utf8]{inputenc}\n");
        out.push_str("\\usepackage[T1]{fontenc}\n");
        out.push_str("\\usepackage{parskip}\n");
        if let Some(geometry) = self.geometry() {
            out.push_str(&format!("\\usepackage[{geometry}]{{geometry}}\n"));
        }
        for package in [
            "graphicx", "float", "caption", "amsmath", "amssymb", "array", "listings", "xcolor",
            "hyperref",
        ] {
            out.push_str(&format!("\\usepackage{{{package}}}\n"));
        }
        let color = &self.config.links.color;
        out.push_str(&format!(
            "\\hypersetup{{colorlinks=true, linkcolor={color}, urlcolor={color}, citecolor={color}}}\n"
        ));
        out.push_str(&format!(
            "\\lstset{{basicstyle={}, frame={}, breaklines=true, columns=fullflexible}}\n\n",
            self.config.listings.basic_style, self.config.listings.frame
        ));
        out.push_str(&format!("\\title{{\\textbf{{{}}}}}\n", self.metadata.title()));
        out.push_str(&format!("\\author{{{}}}\n", self.metadata.author()));
        out.push_str(&format!("\\date{{{}}}\n\n", self.metadata.date()));
        out
    }

    fn geometry(&self) -> Option<String> {
        if let Some(geometry) = self.metadata.get("geometry") {
            return Some(geometry.to_string());
        }
        self.metadata
            .get("margin")
            .map(|margin| format!("margin={margin}"))
    }

    fn emit_block(&mut self, block: &Block, out: &mut String) {
        match block {
            Block::Heading { level, text } => {
                let command = match level {
                    1 => "section",
                    2 => "subsection",
                    _ => "subsubsection",
                };
                out.push_str(&format!("\\{command}{{{text}}}\n\n"));
            }
            Block::Paragraph { content } => {
                self.spans(content, out);
                out.push('\n');
            }
            Block::Rule => {
                out.push_str("\\vspace{1em}\n");
                out.push_str("\\noindent\\rule{\\linewidth}{0.4pt}\n");
                out.push_str("\\vspace{1em}\n");
            }
            Block::List(list) => {
                self.list(list, out);
                out.push('\n');
            }
            Block::BlankLine => out.push('\n'),
            Block::IndentedText(text) => {
                out.push_str(&format!("\\hspace*{{2em}}{{{text}}}\n"));
            }
            Block::ForcedBreak(lines) => {
                out.push_str(&format!("\\vspace{{{lines}\\baselineskip}}\n"));
            }
            Block::Figure(image) => {
                self.figure(image, out);
                out.push('\n');
            }
            Block::CodeBlock { language, content } => {
                match language {
                    Some(lang) => {
                        out.push_str(&format!("\\begin{{lstlisting}}[language={lang}]\n"))
                    }
                    None => out.push_str("\\begin{lstlisting}\n"),
                }
                out.push_str(content);
                if !content.is_empty() && !content.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str("\\end{lstlisting}\n\n");
            }
            Block::Math(content) => {
                let math = self.math(content, true);
                out.push_str(&math);
                if !math.is_empty() {
                    out.push('\n');
                }
                out.push('\n');
            }
            Block::Table {
                headers,
                rows,
                caption,
            } => {
                if headers.is_empty() {
                    return;
                }
                table(headers, rows, caption.as_deref(), &self.config.figures.placement, out);
                out.push('\n');
            }
            Block::PageBreak => out.push_str("\\newpage\n"),
            Block::TableOfContents => {
                out.push_str("\\tableofcontents\n");
                out.push_str("\\newpage\n");
            }
        }
    }

    fn list(&self, list: &List, out: &mut String) {
        let environment = match list.kind {
            ListKind::Bullet => "itemize",
            ListKind::Numbered => "enumerate",
        };
        out.push_str(&format!("\\begin{{{environment}}}\n"));
        for item in &list.items {
            out.push_str("\\item ");
            self.spans(&item.content, out);
            out.push('\n');
            for nested in &item.nested {
                self.list(nested, out);
            }
        }
        out.push_str(&format!("\\end{{{environment}}}\n"));
    }

    /// Figures of each type are numbered on their own: the shared float
    /// counter is set from the per-type count before captioning.
    fn figure(&mut self, image: &Image, out: &mut String) {
        let counter = self
            .figure_counters
            .entry(image.figure_type.clone())
            .or_insert(0);
        *counter += 1;
        let number = *counter;

        out.push_str(&format!(
            "\\begin{{figure}}[{}]\n",
            self.config.figures.placement
        ));
        out.push_str("\\centering\n");
        out.push_str(&format!(
            "\\includegraphics[width={}]{{{}}}\n",
            self.config.figures.width,
            image.file_name()
        ));
        out.push_str(&format!("\\captionsetup{{name={}}}\n", image.figure_type));
        out.push_str(&format!("\\setcounter{{figure}}{{{}}}\n", number - 1));
        out.push_str(&format!("\\caption{{{}}}\n", image.caption));
        out.push_str("\\end{figure}\n");
    }

    fn spans(&self, spans: &[Span], out: &mut String) {
        for span in spans {
            self.span(span, out);
        }
    }

    fn span(&self, span: &Span, out: &mut String) {
        match span {
            Span::Text(text) => out.push_str(text),
            Span::Bold(inner) => {
                out.push_str("\\textbf{");
                self.spans(inner, out);
                out.push('}');
            }
            Span::Italic(inner) => {
                out.push_str("\\textit{");
                self.spans(inner, out);
                out.push('}');
            }
            Span::Code(text) => {
                out.push_str("\\texttt{");
                out.push_str(&escape_code(text));
                out.push('}');
            }
            Span::Link { url, content } => {
                out.push_str(&format!("\\href{{{}}}{{", escape_url(url)));
                self.spans(content, out);
                out.push('}');
            }
            Span::Image(image) => {
                out.push_str(&format!(
                    "\\includegraphics[height=\\baselineskip]{{{}}}",
                    image.file_name()
                ));
            }
            Span::Math(content) => out.push_str(&self.math(content, false)),
        }
    }

    fn math(&self, content: &str, display: bool) -> String {
        match self.math_mode {
            MathMode::Literal if display => format!("\\[\n{content}\n\\]"),
            MathMode::Literal => format!("${content}$"),
            MathMode::Ascii => self
                .translator
                .get_or_init(T::default)
                .translate(content, display)
                .unwrap_or_default(),
        }
    }
}

fn table(
    headers: &[String],
    rows: &[Vec<String>],
    caption: Option<&str>,
    placement: &str,
    out: &mut String,
) {
    let columns = headers.len();
    out.push_str(&format!("\\begin{{table}}[{placement}]\n"));
    out.push_str("\\centering\n");
    out.push_str(&format!("\\begin{{tabular}}{{|{}}}\n", "c|".repeat(columns)));
    out.push_str("\\hline\n");

    let header_cells: Vec<String> = headers
        .iter()
        .map(|header| format!("\\textbf{{{header}}}"))
        .collect();
    out.push_str(&header_cells.join(" & "));
    out.push_str(" \\\\\n");
    out.push_str("\\hline\n");

    for row in rows {
        out.push_str(&normalize_row(row, columns).join(" & "));
        out.push_str(" \\\\\n");
    }
    if !rows.is_empty() {
        out.push_str("\\hline\n");
    }

    out.push_str("\\end{tabular}\n");
    if let Some(caption) = caption {
        out.push_str(&format!("\\caption{{{caption}}}\n"));
    }
    out.push_str("\\end{table}\n");
}

/// Pad short rows with empty cells and drop cells past the header count.
fn normalize_row(row: &[String], columns: usize) -> Vec<&str> {
    let mut cells: Vec<&str> = row.iter().take(columns).map(String::as_str).collect();
    cells.resize(columns, "");
    cells
}

/// Escape characters that are significant to LaTeX in text mode.
pub fn escape_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '_' | '{' | '}' | '&' | '%' | '#' | '$' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

fn escape_url(url: &str) -> String {
    url.replace('%', "\\%").replace('#', "\\#")
}
