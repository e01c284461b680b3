//! External LaTeX toolchain for DVI and PDF output.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::document::{document_dir, remove_quietly};
use crate::error::{Error, Result};
use crate::format::{sibling_path, ExportFormat, AUXILIARY_EXTENSIONS};
use crate::options::{ToolCommand, ToolchainOptions};
use crate::process::silent;

/// How a toolchain invocation ended.
#[derive(Debug)]
pub enum ToolchainRun {
    /// The program ran to completion. Its exit status is informational.
    Finished(ExitStatus),
    /// The program could not be started.
    NotLaunched { program: String, error: io::Error },
}

/// Runs `latex`/`pdflatex` (or configured replacements) over a `.tex` file.
#[derive(Debug, Clone, Default)]
pub struct LatexToolchain {
    options: ToolchainOptions,
}

impl LatexToolchain {
    pub fn new(options: ToolchainOptions) -> Self {
        Self { options }
    }

    /// The command that builds `format`, if it is a toolchain format.
    pub fn command(&self, format: ExportFormat) -> Option<&ToolCommand> {
        match format {
            ExportFormat::Dvi => Some(&self.options.dvi),
            ExportFormat::Pdf => Some(&self.options.pdf),
            ExportFormat::Html | ExportFormat::Xml | ExportFormat::Latex => None,
        }
    }

    /// Run `command` on `tex` inside the file's directory and wait for it.
    ///
    /// The file name is passed as the last argument. Standard streams are
    /// detached, so a LaTeX error ends the run instead of waiting for input.
    pub fn run(&self, command: &ToolCommand, tex: &Path) -> Result<ToolchainRun> {
        let file_name = tex
            .file_name()
            .ok_or_else(|| Error::InvalidPath(tex.display().to_string()))?;

        let mut process = Command::new(&command.program);
        process
            .args(&command.args)
            .arg(file_name)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let dir = document_dir(tex);
        if !dir.as_os_str().is_empty() {
            process.current_dir(dir);
        }

        tracing::debug!(program = %command.program, tex = %tex.display(), "running toolchain");

        let mut child = match silent(&mut process).spawn() {
            Ok(child) => child,
            Err(error) => {
                return Ok(ToolchainRun::NotLaunched {
                    program: command.program.clone(),
                    error,
                })
            }
        };

        let status = child.wait()?;
        if !status.success() {
            tracing::warn!(program = %command.program, %status, "toolchain exited unsuccessfully");
        }
        Ok(ToolchainRun::Finished(status))
    }
}

/// Remove the `.out`, `.log` and `.aux` files next to `document`.
/// The document itself is never removed, whatever its extension.
pub fn remove_auxiliary_files(document: &Path) -> Vec<PathBuf> {
    AUXILIARY_EXTENSIONS
        .iter()
        .map(|ext| sibling_path(document, ext))
        .filter(|path| path != document && remove_quietly(path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_command_per_format() {
        let toolchain = LatexToolchain::default();
        assert_eq!(toolchain.command(ExportFormat::Dvi).unwrap().program, "latex");
        assert_eq!(toolchain.command(ExportFormat::Pdf).unwrap().program, "pdflatex");
        assert!(toolchain.command(ExportFormat::Html).is_none());
        assert!(toolchain.command(ExportFormat::Latex).is_none());
    }

    #[test]
    fn test_missing_program() {
        let dir = TempDir::new().unwrap();
        let tex = dir.path().join("doc.tex");
        fs::write(&tex, "\\documentclass{article}").unwrap();

        let toolchain = LatexToolchain::default();
        let run = toolchain
            .run(&ToolCommand::new("rstexport-no-such-latex"), &tex)
            .unwrap();
        assert!(matches!(run, ToolchainRun::NotLaunched { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_in_document_dir() {
        let dir = TempDir::new().unwrap();
        let tex = dir.path().join("doc.tex");
        fs::write(&tex, "").unwrap();

        let command = ToolCommand::new("sh").with_args(["-c", "touch \"${0%.tex}.dvi\""]);
        let run = LatexToolchain::default().run(&command, &tex).unwrap();

        assert!(matches!(run, ToolchainRun::Finished(status) if status.success()));
        assert!(dir.path().join("doc.dvi").exists());
    }

    #[test]
    fn test_auxiliary_cleanup_spares_document() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("build.log");
        fs::write(&doc, "text").unwrap();

        assert!(remove_auxiliary_files(&doc).is_empty());
        assert!(doc.exists());
    }

    #[test]
    fn test_remove_auxiliary_files() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("doc.txt");
        fs::write(dir.path().join("doc.log"), "").unwrap();
        fs::write(dir.path().join("doc.aux"), "").unwrap();

        let removed = remove_auxiliary_files(&doc);
        assert_eq!(removed.len(), 2);
        assert!(!dir.path().join("doc.log").exists());
        assert!(!dir.path().join("doc.aux").exists());
    }
}
