//! Whole-pipeline properties over arbitrary input.

use mdtex_core::{Block, Config, Metadata, TokenKind, convert, markdown_to_latex};
use mdtex_core::{latex, metadata, parser, tokenizer};
use proptest::prelude::*;

/// Lines built from the constructs the tokenizer recognizes, so generated
/// documents hit every rule rather than only paragraphs.
fn markdown_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z *`$\\[\\]()!:|#-]{0,30}",
        "#{1,4} [a-z ]{0,10}",
        " {0,6}- [a-z*]{0,10}",
        " {0,6}[0-9]{1,2}\\. [a-z]{0,10}",
        Just("```rust".to_string()),
        Just("```".to_string()),
        Just("$$".to_string()),
        Just(":::table".to_string()),
        Just(":::".to_string()),
        Just("a|b".to_string()),
        Just("---".to_string()),
        Just("---pagebreak---".to_string()),
        Just("[TOC]".to_string()),
        Just(String::new()),
        "!\\[[A-Za-z: ]{0,10}\\]\\([a-z/.]{1,10}\\)",
        "@[a-z]{1,6}: [a-z]{0,6}",
        ">> [a-z]{0,10}",
    ]
}

fn markdown() -> impl Strategy<Value = String> {
    prop::collection::vec(markdown_line(), 0..40).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn tokenizer_always_terminates_with_end_of_input(text in any::<String>()) {
        let tokens = tokenizer::tokenize(&text);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndOfInput));
        prop_assert_eq!(
            tokens.iter().filter(|t| t.kind == TokenKind::EndOfInput).count(),
            1
        );
    }

    #[test]
    fn arbitrary_text_converts(text in any::<String>()) {
        let latex = markdown_to_latex(&text);
        prop_assert!(latex.starts_with("\\documentclass"));
        prop_assert!(latex.ends_with("\\end{document}\n"), "assertion failed");
    }

    #[test]
    fn structured_markdown_converts(text in markdown()) {
        let conversion = convert(&text, &Config::compiled_default());
        prop_assert!(conversion.latex.contains("\\begin{document}\n\\maketitle\n\n"), "assertion failed");
        prop_assert!(conversion.latex.ends_with("\\end{document}\n"), "assertion failed");
        prop_assert_eq!(conversion.latex.matches("\\begin{document}").count(), 1);
    }

    #[test]
    fn conversion_is_deterministic(text in markdown()) {
        prop_assert_eq!(markdown_to_latex(&text), markdown_to_latex(&text));
    }

    #[test]
    fn headings_never_exceed_level_three(text in markdown()) {
        let (_, content) = metadata::extract(&text);
        let document = parser::parse(&tokenizer::tokenize(&content));
        for block in &document.blocks {
            if let Block::Heading { level, .. } = block {
                prop_assert!((1..=3).contains(level));
            }
        }
    }

    #[test]
    fn list_environments_balance(text in markdown()) {
        let latex = markdown_to_latex(&text);
        prop_assert_eq!(
            latex.matches("\\begin{itemize}").count(),
            latex.matches("\\end{itemize}").count()
        );
        prop_assert_eq!(
            latex.matches("\\begin{enumerate}").count(),
            latex.matches("\\end{enumerate}").count()
        );
    }
}

#[test]
fn sample_document_end_to_end() {
    let markdown = "\
@title: Quarterly Report
@author: Finance
@datetoday

# Summary

Revenue grew **12%** this quarter.

- North
  - Coastal
- South

![Figure: Revenue by region](charts/revenue.png)

:::table
caption: Totals
Region|Total
-|-
North|10
:::

[TOC]
";
    let latex = markdown_to_latex(markdown);

    assert!(latex.contains(
        "\\title{\\textbf{Quarterly Report}}\n\\author{Finance}\n\\date{\\today}\n"
    ));
    assert!(latex.contains("\\section{Summary}\n"));
    assert!(latex.contains("Revenue grew \\textbf{12%} this quarter.\n"));
    assert!(latex.contains(
        "\\begin{itemize}\n\\item North\n\\begin{itemize}\n\\item Coastal\n\\end{itemize}\n\\item South\n\\end{itemize}\n"
    ));
    assert!(latex.contains("\\includegraphics[width=0.8\\textwidth]{revenue.png}\n"));
    assert!(latex.contains("\\caption{Revenue by region}\n"));
    assert!(latex.contains("\\textbf{Region} & \\textbf{Total} \\\\\n"));
    assert!(latex.contains("North & 10 \\\\\n"));
    assert!(latex.contains("\\caption{Totals}\n"));
    assert!(latex.contains("\\tableofcontents\n\\newpage\n"));
}

#[test]
fn renderer_can_be_used_directly() {
    let document = mdtex_core::parse("## Notes\n\n---pagebreak---");
    let out = latex::render(&document, &Metadata::from_iter([("title", "Direct")]));
    assert!(out.contains("\\title{\\textbf{Direct}}"));
    assert!(out.contains("\\subsection{Notes}\n\n\n\\newpage\n"));
}
