//! rstexport CLI - reStructuredText export tool
//!
//! A command-line front end to the export controller: save a document,
//! render previews, export to HTML/XML/LaTeX/DVI/PDF and clean up stale
//! outputs.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use rstexport::{CleanupMode, ExportController, ExportFormat, ExportOptions, ExportOutcome, ExportSelection};

/// reStructuredText export to HTML, XML, LaTeX, DVI and PDF
#[derive(Parser)]
#[command(
    name = "rstexport",
    version,
    about = "Export reStructuredText documents",
    long_about = "rstexport - save, preview and export reStructuredText documents.\n\n\
                  Converts with the docutils front ends and the LaTeX toolchain, and\n\
                  removes outputs of formats that are no longer wanted."
)]
struct Cli {
    /// JSON file with export options
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save content to a document and render a preview
    Save {
        /// Document path
        document: PathBuf,

        /// Read content from this file (default: stdin)
        #[arg(short, long)]
        from: Option<PathBuf>,

        #[command(flatten)]
        selection: SelectionArgs,

        /// The save is part of an export; skip cleanup
        #[arg(long)]
        during_export: bool,
    },

    /// Render an HTML preview next to the document
    Preview {
        /// Document path
        document: PathBuf,
    },

    /// Export a document
    Export {
        /// Document path
        document: PathBuf,

        /// Output format
        #[arg(short, long)]
        format: FormatArg,

        /// Remove every other output of the document afterwards
        #[arg(short, long)]
        explicit: bool,
    },

    /// Remove stale outputs of a document
    Cleanup {
        /// Document path
        document: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Keep only this format's output (explicit-export cleanup)
        #[arg(long, conflicts_with_all = ["select", "selection_file"])]
        keep: Option<FormatArg>,
    },

    /// Show version information
    Version,
}

#[derive(clap::Args)]
struct SelectionArgs {
    /// Wanted formats, comma separated
    #[arg(short, long, value_delimiter = ',')]
    select: Vec<FormatArg>,

    /// JSON file with the selection, e.g. {"html": true, "pdf": true}
    #[arg(long, conflicts_with = "select")]
    selection_file: Option<PathBuf>,
}

impl SelectionArgs {
    fn resolve(&self) -> Result<ExportSelection, Box<dyn std::error::Error>> {
        if let Some(ref file) = self.selection_file {
            let text = fs::read_to_string(file)?;
            return Ok(serde_json::from_str(&text)?);
        }
        let formats: Vec<ExportFormat> = self.select.iter().map(|f| (*f).into()).collect();
        Ok(ExportSelection::of(&formats))
    }
}

/// Export format
#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Html,
    Xml,
    Latex,
    Dvi,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Html => ExportFormat::Html,
            FormatArg::Xml => ExportFormat::Xml,
            FormatArg::Latex => ExportFormat::Latex,
            FormatArg::Dvi => ExportFormat::Dvi,
            FormatArg::Pdf => ExportFormat::Pdf,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_options(config: Option<&Path>) -> Result<ExportOptions, Box<dyn std::error::Error>> {
    match config {
        Some(path) => Ok(ExportOptions::from_json_file(path)?),
        None => Ok(ExportOptions::default()),
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = load_options(cli.config.as_deref())?;
    let controller = ExportController::new(options);

    match cli.command {
        Commands::Save {
            document,
            from,
            selection,
            during_export,
        } => {
            let content = read_content(from.as_deref())?;
            let selection = selection.resolve()?;

            let pb = create_spinner("Saving document...");
            let preview = controller.save(&document, &content, during_export, &selection)?;
            pb.finish_and_clear();

            println!("{} Saved {}", "✓".green().bold(), document.display());
            if let Some(preview) = preview {
                println!("{}: {}", "Preview".bold(), preview.display());
            }
        }

        Commands::Preview { document } => {
            let pb = create_spinner("Rendering preview...");
            let preview = controller.render_preview(&document)?;
            pb.finish_and_clear();

            if let Some(preview) = preview {
                println!("{}", preview.display());
            }
        }

        Commands::Export {
            document,
            format,
            explicit,
        } => {
            let format: ExportFormat = format.into();
            let pb = create_spinner(&format!("Exporting to {}...", format));
            let outcome = controller.export_as(&document, format, explicit)?;
            pb.finish_and_clear();

            match outcome {
                ExportOutcome::Written(output) => {
                    println!(
                        "{} Exported {}: {}",
                        "✓".green().bold(),
                        format,
                        output.display()
                    );
                }
                ExportOutcome::ToolchainUnavailable { program } => {
                    println!(
                        "{} Could not run `{}`; is a LaTeX distribution installed?",
                        "!".yellow().bold(),
                        program
                    );
                    std::process::exit(2);
                }
            }
        }

        Commands::Cleanup {
            document,
            selection,
            keep,
        } => {
            let mode = match keep {
                Some(keep) => CleanupMode::AfterExplicitExport { keep: keep.into() },
                None => CleanupMode::AfterSave(selection.resolve()?),
            };
            let removed = controller.cleanup(&document, mode);

            if removed.is_empty() {
                println!("{} Nothing to remove", "!".yellow().bold());
            } else {
                for path in &removed {
                    println!("{} Removed {}", "✓".green().bold(), path.display());
                }
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_version() {
    println!("{} {}", "rstexport".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("reStructuredText export and cleanup");
    println!();
    println!("Output formats: HTML, XML, LaTeX, DVI, PDF");
}

fn read_content(from: Option<&Path>) -> io::Result<String> {
    match from {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut content = String::new();
            io::stdin().lock().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
