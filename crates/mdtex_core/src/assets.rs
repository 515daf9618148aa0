//! Image files referenced by a document.
//!
//! The generated LaTeX refers to every image by its bare file name, so the
//! files have to sit next to the `.tex` output before `pdflatex` runs.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::block::{Block, Document, Image, List, Span};
use crate::error::Error;

/// Every image URL in the document, in first-appearance order, without
/// duplicates.
pub fn image_paths(document: &Document) -> Vec<&str> {
    let mut images = Vec::new();
    for block in &document.blocks {
        match block {
            Block::Figure(image) => images.push(image),
            Block::Paragraph { content } => collect_spans(content, &mut images),
            Block::List(list) => collect_list(list, &mut images),
            _ => {}
        }
    }

    let mut urls: Vec<&str> = Vec::new();
    for image in images {
        if !urls.contains(&image.url.as_str()) {
            urls.push(&image.url);
        }
    }
    urls
}

fn collect_list<'d>(list: &'d List, out: &mut Vec<&'d Image>) {
    for item in &list.items {
        collect_spans(&item.content, out);
        for nested in &item.nested {
            collect_list(nested, out);
        }
    }
}

fn collect_spans<'d>(spans: &'d [Span], out: &mut Vec<&'d Image>) {
    for span in spans {
        match span {
            Span::Image(image) => out.push(image),
            Span::Bold(inner) | Span::Italic(inner) => collect_spans(inner, out),
            Span::Link { content, .. } => collect_spans(content, out),
            Span::Text(_) | Span::Code(_) | Span::Math(_) => {}
        }
    }
}

fn is_remote(url: &str) -> bool {
    url.contains("://") || url.starts_with("data:")
}

fn file_name(url: &str) -> &str {
    url.rsplit(['/', '\\']).next().unwrap_or(url)
}

/// Copy local images into `output_dir`, resolving relative URLs against
/// `input_dir`. Remote URLs are skipped; missing files are logged and
/// skipped. Returns the destination paths that now exist.
pub fn copy_assets(
    document: &Document,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, Error> {
    let mut copied = Vec::new();

    for url in image_paths(document) {
        if is_remote(url) {
            debug!(url, "skipping remote image");
            continue;
        }
        let source = input_dir.join(url);
        if !source.is_file() {
            warn!(path = %source.display(), "image not found, skipping");
            continue;
        }
        let target = output_dir.join(file_name(url));
        if same_file(&source, &target) {
            copied.push(target);
            continue;
        }
        fs::copy(&source, &target).map_err(|source_err| Error::CopyAsset {
            from: source.clone(),
            to: target.clone(),
            source: source_err,
        })?;
        debug!(from = %source.display(), to = %target.display(), "copied image");
        copied.push(target);
    }

    Ok(copied)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
