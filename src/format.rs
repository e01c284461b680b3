//! Export formats and the sibling files they produce.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::convert::OutputKind;

/// Extensions of the by-products left behind by a LaTeX run.
pub const AUXILIARY_EXTENSIONS: [&str; 3] = ["out", "log", "aux"];

/// A persistent export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// HTML page (.html)
    Html,
    /// DocBook/XML (.xml)
    Xml,
    /// LaTeX source (.tex)
    Latex,
    /// LaTeX device-independent output (.dvi)
    Dvi,
    /// Portable Document Format (.pdf)
    Pdf,
}

impl ExportFormat {
    /// All formats, in the order they are offered to the user.
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Html,
        ExportFormat::Xml,
        ExportFormat::Latex,
        ExportFormat::Dvi,
        ExportFormat::Pdf,
    ];

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Xml => "xml",
            ExportFormat::Latex => "tex",
            ExportFormat::Dvi => "dvi",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Html => "HTML",
            ExportFormat::Xml => "XML",
            ExportFormat::Latex => "LaTeX",
            ExportFormat::Dvi => "DVI",
            ExportFormat::Pdf => "PDF",
        }
    }

    /// The converter output this format is built from.
    ///
    /// DVI and PDF are produced by running the LaTeX toolchain over
    /// the LaTeX rendering.
    pub fn output_kind(&self) -> OutputKind {
        match self {
            ExportFormat::Html => OutputKind::Html,
            ExportFormat::Xml => OutputKind::Xml,
            ExportFormat::Latex | ExportFormat::Dvi | ExportFormat::Pdf => OutputKind::Latex,
        }
    }

    /// Whether this format needs an external LaTeX run.
    pub fn needs_toolchain(&self) -> bool {
        matches!(self, ExportFormat::Dvi | ExportFormat::Pdf)
    }

    /// Path of this format's output next to `document`.
    pub fn sibling(&self, document: &Path) -> PathBuf {
        sibling_path(document, self.extension())
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Replace the extension of `document` with `extension`.
pub fn sibling_path(document: &Path, extension: &str) -> PathBuf {
    document.with_extension(extension)
}

/// Which formats the user currently wants kept on disk.
///
/// Missing fields deserialize as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSelection {
    pub html: bool,
    pub xml: bool,
    pub latex: bool,
    pub dvi: bool,
    pub pdf: bool,
}

impl ExportSelection {
    /// A selection with no format wanted.
    pub fn none() -> Self {
        Self::default()
    }

    /// A selection with only the given formats wanted.
    pub fn of(formats: &[ExportFormat]) -> Self {
        let mut selection = Self::none();
        for format in formats {
            selection.set(*format, true);
        }
        selection
    }

    /// Whether `format` is wanted.
    pub fn is_selected(&self, format: ExportFormat) -> bool {
        match format {
            ExportFormat::Html => self.html,
            ExportFormat::Xml => self.xml,
            ExportFormat::Latex => self.latex,
            ExportFormat::Dvi => self.dvi,
            ExportFormat::Pdf => self.pdf,
        }
    }

    /// Mark `format` as wanted or not.
    pub fn set(&mut self, format: ExportFormat, wanted: bool) {
        let slot = match format {
            ExportFormat::Html => &mut self.html,
            ExportFormat::Xml => &mut self.xml,
            ExportFormat::Latex => &mut self.latex,
            ExportFormat::Dvi => &mut self.dvi,
            ExportFormat::Pdf => &mut self.pdf,
        };
        *slot = wanted;
    }

    /// Builder form of [`ExportSelection::set`].
    pub fn with(mut self, format: ExportFormat, wanted: bool) -> Self {
        self.set(format, wanted);
        self
    }

    /// Formats currently wanted.
    pub fn selected(&self) -> impl Iterator<Item = ExportFormat> + '_ {
        ExportFormat::ALL
            .into_iter()
            .filter(move |f| self.is_selected(*f))
    }

    /// Formats currently not wanted.
    pub fn deselected(&self) -> impl Iterator<Item = ExportFormat> + '_ {
        ExportFormat::ALL
            .into_iter()
            .filter(move |f| !self.is_selected(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_replaces_extension() {
        let doc = Path::new("/notes/chapter.one/readme.txt");
        assert_eq!(
            ExportFormat::Latex.sibling(doc),
            PathBuf::from("/notes/chapter.one/readme.tex")
        );
        assert_eq!(
            ExportFormat::Html.sibling(doc),
            PathBuf::from("/notes/chapter.one/readme.html")
        );
    }

    #[test]
    fn test_sibling_without_extension() {
        let doc = Path::new("notes/README");
        assert_eq!(ExportFormat::Pdf.sibling(doc), PathBuf::from("notes/README.pdf"));
    }

    #[test]
    fn test_sibling_with_long_extension() {
        let doc = Path::new("manual.rest");
        assert_eq!(ExportFormat::Xml.sibling(doc), PathBuf::from("manual.xml"));
    }

    #[test]
    fn test_output_kind() {
        assert_eq!(ExportFormat::Html.output_kind(), OutputKind::Html);
        assert_eq!(ExportFormat::Xml.output_kind(), OutputKind::Xml);
        assert_eq!(ExportFormat::Dvi.output_kind(), OutputKind::Latex);
        assert_eq!(ExportFormat::Pdf.output_kind(), OutputKind::Latex);
        assert!(ExportFormat::Pdf.needs_toolchain());
        assert!(!ExportFormat::Latex.needs_toolchain());
    }

    #[test]
    fn test_selection_lookup() {
        let selection = ExportSelection::of(&[ExportFormat::Xml, ExportFormat::Pdf]);
        assert!(selection.is_selected(ExportFormat::Xml));
        assert!(selection.is_selected(ExportFormat::Pdf));
        assert!(!selection.is_selected(ExportFormat::Html));

        let deselected: Vec<_> = selection.deselected().collect();
        assert_eq!(
            deselected,
            vec![ExportFormat::Html, ExportFormat::Latex, ExportFormat::Dvi]
        );
    }

    #[test]
    fn test_selection_json_defaults() {
        let selection: ExportSelection = serde_json::from_str(r#"{"html": true}"#).unwrap();
        assert_eq!(selection, ExportSelection::none().with(ExportFormat::Html, true));
    }

    #[test]
    fn test_format_display() {
        assert_eq!(ExportFormat::Latex.to_string(), "LaTeX");
        let json = serde_json::to_string(&ExportFormat::Dvi).unwrap();
        assert_eq!(json, "\"dvi\"");
    }
}
