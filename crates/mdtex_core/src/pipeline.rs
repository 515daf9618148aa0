//! File-level conversion: read Markdown, write LaTeX, gather images and
//! optionally hand the result to a [`TexCompiler`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::assets::copy_assets;
use crate::compile::TexCompiler;
use crate::config::Config;
use crate::error::Error;

/// One Markdown file to convert.
#[derive(Debug, Clone)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
    pub pdf: bool,
}

/// What a finished [`Job`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub tex: PathBuf,
    pub assets: Vec<PathBuf>,
    pub pdf: Option<PathBuf>,
}

impl Job {
    /// Convert `input` to `output` without generating a PDF.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            pdf: false,
        }
    }

    pub fn with_pdf(mut self, pdf: bool) -> Self {
        self.pdf = pdf;
        self
    }

    pub fn run(&self, config: &Config, compiler: &dyn TexCompiler) -> Result<Report, Error> {
        let markdown = fs::read_to_string(&self.input).map_err(|source| Error::Read {
            path: self.input.clone(),
            source,
        })?;
        debug!(input = %self.input.display(), bytes = markdown.len(), "read markdown");

        let conversion = crate::convert(&markdown, config);

        let output_dir = parent_dir(&self.output);
        if !output_dir.as_os_str().is_empty() && !output_dir.exists() {
            fs::create_dir_all(output_dir).map_err(|source| Error::Write {
                path: output_dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.output, &conversion.latex).map_err(|source| Error::Write {
            path: self.output.clone(),
            source,
        })?;
        info!(output = %self.output.display(), "wrote LaTeX");

        let assets = copy_assets(
            &conversion.document,
            parent_dir(&self.input),
            parent_dir(&self.output),
        )?;

        let pdf = if self.pdf {
            Some(compiler.compile(&self.output)?)
        } else {
            None
        };

        Ok(Report {
            tex: self.output.clone(),
            assets,
            pdf,
        })
    }
}

/// The directory holding `path`; the empty path stands for the current one.
fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new(""))
}
