//! The export controller: save, preview, export and clean up a document.

use std::fs;
use std::path::{Path, PathBuf};

use crate::convert::{Converter, DocutilsConverter, OutputKind};
use crate::document::{self, create_preview_file, fill_preview, is_unsaved, read_text, write_text};
use crate::error::{Error, Result};
use crate::format::{ExportFormat, ExportSelection};
use crate::options::ExportOptions;
use crate::toolchain::{remove_auxiliary_files, LatexToolchain, ToolchainRun};

/// Result of [`ExportController::export_as`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The export finished; the path is where the format's output belongs.
    Written(PathBuf),
    /// The LaTeX program for DVI/PDF output could not be started.
    /// The intermediate `.tex` file is left in place.
    ToolchainUnavailable { program: String },
}

impl ExportOutcome {
    /// Whether the export went through.
    pub fn succeeded(&self) -> bool {
        matches!(self, ExportOutcome::Written(_))
    }
}

/// Which stale outputs [`ExportController::cleanup`] removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupMode {
    /// After an ordinary save: remove outputs of every format the
    /// selection does not want, plus LaTeX by-products.
    AfterSave(ExportSelection),
    /// After an explicit single-format export: remove every output
    /// and by-product except the one for `keep`.
    AfterExplicitExport { keep: ExportFormat },
}

/// Saves reST documents and turns them into derivative files.
///
/// The controller keeps no record of what it has written; every call looks
/// at the filesystem afresh.
///
/// # Example
///
/// ```no_run
/// use rstexport::{ExportController, ExportFormat, ExportOptions, ExportSelection};
///
/// let controller = ExportController::new(ExportOptions::default());
/// let selection = ExportSelection::of(&[ExportFormat::Html]);
///
/// let preview = controller.save("notes/intro.txt", "Intro\n=====\n", false, &selection)?;
/// let outcome = controller.export_as("notes/intro.txt", ExportFormat::Pdf, true)?;
/// if !outcome.succeeded() {
///     eprintln!("pdflatex is not installed");
/// }
/// # Ok::<(), rstexport::Error>(())
/// ```
#[derive(Debug)]
pub struct ExportController<C = DocutilsConverter> {
    options: ExportOptions,
    converter: C,
    toolchain: LatexToolchain,
}

impl ExportController<DocutilsConverter> {
    /// Create a controller that converts with the docutils front ends.
    pub fn new(options: ExportOptions) -> Self {
        let converter = DocutilsConverter::new(options.converter.clone());
        Self::with_converter(options, converter)
    }
}

impl Default for ExportController<DocutilsConverter> {
    fn default() -> Self {
        Self::new(ExportOptions::default())
    }
}

impl<C: Converter> ExportController<C> {
    /// Create a controller with a custom converter.
    pub fn with_converter(options: ExportOptions, converter: C) -> Self {
        let toolchain = LatexToolchain::new(options.toolchain.clone());
        Self {
            options,
            converter,
            toolchain,
        }
    }

    /// Options this controller was built with.
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Read the document's content back.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<String> {
        read_text(path.as_ref(), self.options.encoding)
    }

    /// Save `content` the way the editor does.
    ///
    /// Unless the save is part of an export, outputs of formats the
    /// selection no longer wants are removed first. Returns the preview
    /// path, or `None` for an unsaved document.
    pub fn save(
        &self,
        path: impl AsRef<Path>,
        content: &str,
        during_export: bool,
        selection: &ExportSelection,
    ) -> Result<Option<PathBuf>> {
        let path = path.as_ref();
        if !during_export {
            self.cleanup(path, CleanupMode::AfterSave(*selection));
        }
        self.persist(path, content)
    }

    /// Overwrite the document with `content` and render a fresh preview.
    ///
    /// An empty path is an unsaved document: nothing is written and `None`
    /// is returned.
    pub fn persist(&self, path: impl AsRef<Path>, content: &str) -> Result<Option<PathBuf>> {
        let path = path.as_ref();
        if is_unsaved(path) {
            tracing::debug!("no file name given, document not saved");
            return Ok(None);
        }
        write_text(path, content, self.options.encoding)?;
        self.render_preview(path)
    }

    /// Render the document as HTML into a new preview file beside it.
    ///
    /// Each call creates a distinct file; removing old previews is up to
    /// the caller.
    pub fn render_preview(&self, path: impl AsRef<Path>) -> Result<Option<PathBuf>> {
        let path = path.as_ref();
        if is_unsaved(path) {
            return Ok(None);
        }
        let source = read_text(path, self.options.encoding)?;
        let html = self.converter.convert(&source, OutputKind::Html)?;

        let (preview, file) = create_preview_file(path, &self.options.preview_prefix)?;
        fill_preview(&preview, file, &html)?;
        tracing::debug!(preview = %preview.display(), "rendered preview");
        Ok(Some(preview))
    }

    /// Export the document as `format` next to the source file.
    ///
    /// DVI and PDF go through an intermediate `.tex` file and the LaTeX
    /// toolchain; the LaTeX by-products are removed afterwards. With
    /// `explicit`, every other output of this document is removed so only
    /// `format` remains.
    pub fn export_as(
        &self,
        path: impl AsRef<Path>,
        format: ExportFormat,
        explicit: bool,
    ) -> Result<ExportOutcome> {
        let path = path.as_ref();
        if is_unsaved(path) {
            return Err(Error::InvalidPath(
                "document must be saved before exporting".to_string(),
            ));
        }

        let mut targets = vec![format.sibling(path)];
        if format.needs_toolchain() {
            targets.push(ExportFormat::Latex.sibling(path));
        }
        if targets.iter().any(|target| target == path) {
            return Err(Error::InvalidPath(format!(
                "{} export would overwrite the document {}",
                format,
                path.display()
            )));
        }

        let source = read_text(path, self.options.encoding)?;
        let rendering = self.converter.convert(&source, format.output_kind())?;

        let output = match self.toolchain.command(format) {
            None => {
                let output = format.sibling(path);
                fs::write(&output, rendering)?;
                output
            }
            Some(command) => {
                let tex = ExportFormat::Latex.sibling(path);
                fs::write(&tex, rendering)?;

                if let ToolchainRun::NotLaunched { program, error } =
                    self.toolchain.run(command, &tex)?
                {
                    tracing::warn!(%program, %error, format = %format, "LaTeX toolchain not available");
                    return Ok(ExportOutcome::ToolchainUnavailable { program });
                }
                remove_auxiliary_files(path);
                format.sibling(path)
            }
        };

        tracing::info!(format = %format, output = %output.display(), explicit, "exported document");

        if explicit {
            self.cleanup(path, CleanupMode::AfterExplicitExport { keep: format });
        }
        Ok(ExportOutcome::Written(output))
    }

    /// Remove stale outputs of the document. Never fails; returns the files
    /// that were actually removed.
    pub fn cleanup(&self, path: impl AsRef<Path>, mode: CleanupMode) -> Vec<PathBuf> {
        let path = path.as_ref();
        if is_unsaved(path) {
            return Vec::new();
        }

        let stale: Vec<ExportFormat> = match mode {
            CleanupMode::AfterSave(selection) => selection.deselected().collect(),
            CleanupMode::AfterExplicitExport { keep } => ExportFormat::ALL
                .into_iter()
                .filter(|format| *format != keep)
                .collect(),
        };

        let mut removed: Vec<PathBuf> = stale
            .iter()
            .map(|format| format.sibling(path))
            .filter(|output| output != path && document::remove_quietly(output))
            .collect();
        removed.extend(remove_auxiliary_files(path));

        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), document = %path.display(), "removed stale outputs");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Tagging;

    impl Converter for Tagging {
        fn convert(&self, source: &str, kind: OutputKind) -> Result<String> {
            Ok(format!("[{}]{}", kind, source))
        }
    }

    fn controller() -> ExportController<Tagging> {
        ExportController::with_converter(ExportOptions::default(), Tagging)
    }

    #[test]
    fn test_outcome_succeeded() {
        assert!(ExportOutcome::Written(PathBuf::from("a.pdf")).succeeded());
        let missing = ExportOutcome::ToolchainUnavailable {
            program: "pdflatex".to_string(),
        };
        assert!(!missing.succeeded());
    }

    #[test]
    fn test_persist_unsaved() {
        assert_eq!(controller().persist("", "text").unwrap(), None);
        assert_eq!(controller().render_preview("").unwrap(), None);
    }

    #[test]
    fn test_export_unsaved_is_rejected() {
        let err = controller().export_as("", ExportFormat::Html, false).unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
    }

    #[test]
    fn test_export_latex_writes_rendering() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("doc.txt");
        fs::write(&doc, "body").unwrap();

        let outcome = controller().export_as(&doc, ExportFormat::Latex, false).unwrap();
        let tex = dir.path().join("doc.tex");
        assert_eq!(outcome, ExportOutcome::Written(tex.clone()));
        assert_eq!(fs::read_to_string(tex).unwrap(), "[latex]body");
    }

    #[test]
    fn test_cleanup_unsaved_is_noop() {
        assert!(controller()
            .cleanup("", CleanupMode::AfterExplicitExport { keep: ExportFormat::Html })
            .is_empty());
    }

    #[test]
    fn test_export_onto_source_is_rejected() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("page.html");
        fs::write(&doc, "source").unwrap();

        let err = controller().export_as(&doc, ExportFormat::Html, false).unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
        assert_eq!(fs::read_to_string(&doc).unwrap(), "source");
    }

    #[test]
    fn test_export_missing_source_propagates() {
        let dir = TempDir::new().unwrap();
        let err = controller()
            .export_as(dir.path().join("missing.txt"), ExportFormat::Html, false)
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
