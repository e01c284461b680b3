//! # rstexport
//!
//! Export reStructuredText documents to HTML, DocBook/XML, LaTeX, DVI and PDF.
//!
//! The library is the file-handling half of a reST editor: it saves the
//! buffer, renders previews, produces export files through the docutils
//! front ends and the LaTeX toolchain, and removes outputs the user no
//! longer wants.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rstexport::{CleanupMode, ExportController, ExportFormat, ExportSelection};
//!
//! let controller = ExportController::default();
//!
//! // Save and get a preview rendering
//! let preview = controller.persist("notes.txt", "Notes\n=====\n")?;
//!
//! // Export as HTML only, removing every other output of notes.txt
//! controller.export_as("notes.txt", ExportFormat::Html, true)?;
//!
//! // Retire outputs of formats the user has deselected
//! let selection = ExportSelection::of(&[ExportFormat::Html, ExportFormat::Pdf]);
//! controller.cleanup("notes.txt", CleanupMode::AfterSave(selection));
//! # Ok::<(), rstexport::Error>(())
//! ```
//!
//! ## Features
//!
//! - `ffi`: C-ABI bindings for editors written in other languages

pub mod controller;
pub mod convert;
pub mod document;
pub mod error;
pub mod format;
pub mod options;
pub mod process;
pub mod toolchain;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-exports
pub use controller::{CleanupMode, ExportController, ExportOutcome};
pub use convert::{Converter, DocutilsConverter, OutputKind};
pub use document::TextEncoding;
pub use error::{Error, Result};
pub use format::{ExportFormat, ExportSelection, AUXILIARY_EXTENSIONS};
pub use options::{ConverterOptions, ExportOptions, ToolCommand, ToolchainOptions};

use std::path::Path;

/// Export a document with default options.
///
/// # Example
///
/// ```no_run
/// use rstexport::{export_file, ExportFormat};
///
/// let outcome = export_file("README.txt", ExportFormat::Xml)?;
/// assert!(outcome.succeeded());
/// # Ok::<(), rstexport::Error>(())
/// ```
pub fn export_file(path: impl AsRef<Path>, format: ExportFormat) -> Result<ExportOutcome> {
    ExportController::default().export_as(path, format, false)
}
