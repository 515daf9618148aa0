//! PDF generation through an external LaTeX toolchain.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info, warn};
use which::which;

use crate::config::PdfConfig;

const AUX_EXTENSIONS: &[&str] = &["aux", "log", "out", "toc"];
const LOG_TAIL_LINES: usize = 20;

/// Turns a `.tex` file into a PDF next to it.
pub trait TexCompiler {
    /// Returns the path of the generated PDF.
    fn compile(&self, tex_path: &Path) -> Result<PathBuf, CompileError>;
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("{command} is not installed or not found in PATH")]
    ToolNotFound { command: String },

    #[error("failed to launch {command}: {source}")]
    Launch { command: String, source: io::Error },

    #[error("{command} exited with {status}:\n{log}")]
    Failed {
        command: String,
        status: String,
        log: String,
    },
}

/// Runs `pdflatex` (or a compatible command) in the directory of the input.
#[derive(Debug, Clone)]
pub struct Pdflatex {
    command: String,
    passes: u32,
    clean_aux: bool,
}

impl Pdflatex {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            passes: 1,
            clean_aux: true,
        }
    }

    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            command: config.command.clone(),
            passes: config.passes.max(1),
            clean_aux: config.clean_aux,
        }
    }

    fn clean(&self, tex_path: &Path) {
        for ext in AUX_EXTENSIONS {
            let aux = tex_path.with_extension(ext);
            if aux.exists() {
                if let Err(e) = fs::remove_file(&aux) {
                    warn!(path = %aux.display(), error = %e, "could not remove auxiliary file");
                }
            }
        }
    }
}

impl TexCompiler for Pdflatex {
    fn compile(&self, tex_path: &Path) -> Result<PathBuf, CompileError> {
        if !tex_path.is_file() {
            return Err(CompileError::MissingInput(tex_path.to_path_buf()));
        }
        let program = which(&self.command).map_err(|_| CompileError::ToolNotFound {
            command: self.command.clone(),
        })?;

        let dir = tex_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let file_name = tex_path
            .file_name()
            .ok_or_else(|| CompileError::MissingInput(tex_path.to_path_buf()))?;

        info!(input = %tex_path.display(), command = %self.command, "generating PDF");

        let mut last = None;
        for pass in 1..=self.passes {
            debug!(pass, "running LaTeX");
            let output = Command::new(&program)
                .arg("-interaction=nonstopmode")
                .arg(file_name)
                .current_dir(dir)
                .output()
                .map_err(|source| CompileError::Launch {
                    command: self.command.clone(),
                    source,
                })?;
            let failed = !output.status.success();
            last = Some(output);
            if failed {
                break;
            }
        }

        if self.clean_aux {
            self.clean(tex_path);
        }

        let pdf = tex_path.with_extension("pdf");
        match last {
            Some(output) if output.status.success() && pdf.is_file() => {
                info!(output = %pdf.display(), "PDF generated");
                Ok(pdf)
            }
            Some(output) => Err(CompileError::Failed {
                command: self.command.clone(),
                status: output.status.to_string(),
                log: log_tail(&output.stdout, &output.stderr),
            }),
            None => Err(CompileError::Failed {
                command: self.command.clone(),
                status: "no passes run".to_string(),
                log: String::new(),
            }),
        }
    }
}

/// LaTeX reports errors on stdout; keep the end of it plus anything on stderr.
fn log_tail(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    let start = lines.len().saturating_sub(LOG_TAIL_LINES);
    let mut log = lines[start..].join("\n");
    let stderr = String::from_utf8_lossy(stderr);
    if !stderr.trim().is_empty() {
        if !log.is_empty() {
            log.push('\n');
        }
        log.push_str(stderr.trim_end());
    }
    log
}
