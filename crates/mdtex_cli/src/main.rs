use std::fs;
use std::path::PathBuf;

use clap::Parser;
use mdtex_core::{Config, Job, MathMode, Pdflatex};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mdtex")]
#[command(about = "Convert Markdown files to LaTeX and PDF")]
struct Cli {
    /// Input Markdown file
    input: PathBuf,

    /// Output LaTeX file (defaults to input name with .tex extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also run pdflatex on the generated file
    #[arg(long, conflicts_with = "stdout")]
    pdf: bool,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Default math mode: literal or ascii. A document's `@math:` line still wins.
    #[arg(long, value_name = "MODE", value_parser = parse_math_mode)]
    math: Option<MathMode>,

    /// Print the LaTeX to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    stdout: bool,
}

fn parse_math_mode(value: &str) -> Result<MathMode, String> {
    MathMode::from_name(value).ok_or_else(|| format!("unknown math mode '{value}'"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mdtex=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::compiled_default(),
    };
    if let Some(mode) = cli.math {
        config.math.mode = mode;
    }

    if cli.stdout {
        let markdown = match fs::read_to_string(&cli.input) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", cli.input.display(), e);
                std::process::exit(1);
            }
        };
        print!("{}", mdtex_core::markdown_to_latex_with_config(&markdown, &config));
        return;
    }

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("tex"));
    let compiler = Pdflatex::from_config(&config.pdf);

    let report = match Job::new(&cli.input, &output)
        .with_pdf(cli.pdf)
        .run(&config, &compiler)
    {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("Created {}", report.tex.display());
    if let Some(pdf) = report.pdf {
        println!("Created {}", pdf.display());
    }
}
