//! reStructuredText conversion.
//!
//! The controller never interprets reST itself. It hands the source text to
//! a [`Converter`] and writes whatever comes back. [`DocutilsConverter`]
//! drives the docutils front-end programs; tests and embedders can plug in
//! any other implementation.
//!
//! # Example
//!
//! ```no_run
//! use rstexport::convert::{Converter, DocutilsConverter, OutputKind};
//!
//! let converter = DocutilsConverter::default();
//! let html = converter.convert("Title\n=====\n\nHello.", OutputKind::Html)?;
//! # Ok::<(), rstexport::Error>(())
//! ```

mod docutils;

pub use docutils::DocutilsConverter;

use crate::error::Result;

/// Rendering produced by a converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// HTML page
    Html,
    /// DocBook/XML document
    Xml,
    /// LaTeX source
    Latex,
}

impl OutputKind {
    /// Short lowercase name, as used in log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Html => "html",
            OutputKind::Xml => "xml",
            OutputKind::Latex => "latex",
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns reST source text into a rendering of the requested kind.
pub trait Converter: Send + Sync {
    /// Render `source` as `kind`.
    fn convert(&self, source: &str, kind: OutputKind) -> Result<String>;
}

impl<C: Converter + ?Sized> Converter for Box<C> {
    fn convert(&self, source: &str, kind: OutputKind) -> Result<String> {
        (**self).convert(source, kind)
    }
}

impl<C: Converter + ?Sized> Converter for &C {
    fn convert(&self, source: &str, kind: OutputKind) -> Result<String> {
        (**self).convert(source, kind)
    }
}
