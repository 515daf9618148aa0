//! Errors from the file-level pipeline. Tokenizing, parsing and rendering
//! cannot fail; only reading, writing, copying and compiling can.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::compile::CompileError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("cannot copy asset {} to {}: {source}", .from.display(), .to.display())]
    CopyAsset {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("PDF generation failed: {0}")]
    Compile(#[from] CompileError),
}
