//! Export options configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::document::TextEncoding;
use crate::error::{Error, Result};

/// Default file name prefix for preview renderings.
pub const DEFAULT_PREVIEW_PREFIX: &str = "reSTtempFile";

/// Programs used to render reST source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterOptions {
    /// Program producing HTML from reST on stdin
    pub html_program: String,

    /// Program producing XML from reST on stdin
    pub xml_program: String,

    /// Program producing LaTeX from reST on stdin
    pub latex_program: String,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            html_program: "rst2html".to_string(),
            xml_program: "rst2xml".to_string(),
            latex_program: "rst2latex".to_string(),
        }
    }
}

/// One external command: program plus leading arguments.
///
/// The input file name is appended after `args` when the command runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    /// A command with no leading arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add leading arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// LaTeX programs used for DVI and PDF output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainOptions {
    pub dvi: ToolCommand,
    pub pdf: ToolCommand,
}

impl Default for ToolchainOptions {
    fn default() -> Self {
        Self {
            dvi: ToolCommand::new("latex"),
            pdf: ToolCommand::new("pdflatex"),
        }
    }
}

/// Options for saving and exporting documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Encoding of the source document on disk
    pub encoding: TextEncoding,

    /// File name prefix for preview renderings
    pub preview_prefix: String,

    /// reST conversion programs
    pub converter: ConverterOptions,

    /// LaTeX toolchain programs
    pub toolchain: ToolchainOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::Utf8,
            preview_prefix: DEFAULT_PREVIEW_PREFIX.to_string(),
            converter: ConverterOptions::default(),
            toolchain: ToolchainOptions::default(),
        }
    }
}

impl ExportOptions {
    /// Create new export options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// Parse options from a JSON string.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Set the document encoding.
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the preview file name prefix.
    pub fn with_preview_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.preview_prefix = prefix.into();
        self
    }

    /// Set the conversion programs.
    pub fn with_converter(mut self, converter: ConverterOptions) -> Self {
        self.converter = converter;
        self
    }

    /// Set the command used for DVI output.
    pub fn with_dvi_command(mut self, command: ToolCommand) -> Self {
        self.toolchain.dvi = command;
        self
    }

    /// Set the command used for PDF output.
    pub fn with_pdf_command(mut self, command: ToolCommand) -> Self {
        self.toolchain.pdf = command;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = ExportOptions::default();
        assert_eq!(opts.encoding, TextEncoding::Utf8);
        assert_eq!(opts.preview_prefix, "reSTtempFile");
        assert_eq!(opts.converter.html_program, "rst2html");
        assert_eq!(opts.toolchain.dvi.program, "latex");
        assert_eq!(opts.toolchain.pdf.program, "pdflatex");
    }

    #[test]
    fn test_builder_pattern() {
        let opts = ExportOptions::new()
            .with_encoding(TextEncoding::Latin1)
            .with_preview_prefix("preview")
            .with_pdf_command(ToolCommand::new("xelatex").with_args(["-interaction=nonstopmode"]));

        assert_eq!(opts.encoding, TextEncoding::Latin1);
        assert_eq!(opts.preview_prefix, "preview");
        assert_eq!(opts.toolchain.pdf.program, "xelatex");
        assert_eq!(opts.toolchain.pdf.args, vec!["-interaction=nonstopmode"]);
        assert_eq!(opts.toolchain.dvi.program, "latex");
    }

    #[test]
    fn test_partial_json() {
        let opts = ExportOptions::from_json(
            r#"{"encoding": "latin1", "toolchain": {"pdf": {"program": "lualatex"}}}"#,
        )
        .unwrap();
        assert_eq!(opts.encoding, TextEncoding::Latin1);
        assert_eq!(opts.toolchain.pdf, ToolCommand::new("lualatex"));
        assert_eq!(opts.toolchain.dvi, ToolCommand::new("latex"));
        assert_eq!(opts.converter, ConverterOptions::default());
    }

    #[test]
    fn test_malformed_json() {
        let err = ExportOptions::from_json("{\"encoding\": 3").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
