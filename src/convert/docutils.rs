//! Converter backed by the docutils command-line front ends.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use super::{Converter, OutputKind};
use crate::error::{Error, Result};
use crate::options::ConverterOptions;
use crate::process::silent;

/// Runs `rst2html`, `rst2xml` or `rst2latex` with the source on stdin and
/// takes the rendering from stdout.
#[derive(Debug, Clone, Default)]
pub struct DocutilsConverter {
    programs: ConverterOptions,
}

impl DocutilsConverter {
    /// Create a converter using the given program names.
    pub fn new(programs: ConverterOptions) -> Self {
        Self { programs }
    }

    /// Program used for `kind`.
    pub fn program(&self, kind: OutputKind) -> &str {
        match kind {
            OutputKind::Html => &self.programs.html_program,
            OutputKind::Xml => &self.programs.xml_program,
            OutputKind::Latex => &self.programs.latex_program,
        }
    }
}

impl Converter for DocutilsConverter {
    fn convert(&self, source: &str, kind: OutputKind) -> Result<String> {
        let program = self.program(kind);

        let mut command = Command::new(program);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = silent(&mut command)
            .spawn()
            .map_err(|err| Error::ConverterLaunch {
                program: program.to_string(),
                source: err,
            })?;

        // Feed stdin from another thread so a large rendering cannot block
        // the child on a full stdout pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = source.to_string();
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child.wait_with_output()?;
        let write_result = writer.map(|w| w.join().unwrap_or(Ok(()))).unwrap_or(Ok(()));

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Render(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }
        // A converter may finish without draining stdin; its output still stands.
        match write_result {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e.into()),
            _ => {}
        }

        tracing::debug!(program, kind = %kind, bytes = output.stdout.len(), "converted document");

        String::from_utf8(output.stdout)
            .map_err(|e| Error::Encoding(format!("{} produced invalid UTF-8: {}", program, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_selection() {
        let converter = DocutilsConverter::default();
        assert_eq!(converter.program(OutputKind::Html), "rst2html");
        assert_eq!(converter.program(OutputKind::Xml), "rst2xml");
        assert_eq!(converter.program(OutputKind::Latex), "rst2latex");
    }

    #[test]
    fn test_missing_program() {
        let converter = DocutilsConverter::new(ConverterOptions {
            html_program: "rstexport-no-such-converter".to_string(),
            ..Default::default()
        });
        let err = converter.convert("text", OutputKind::Html).unwrap_err();
        assert!(matches!(err, Error::ConverterLaunch { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_stdin_to_stdout() {
        // `cat` echoes the source back, standing in for a real writer.
        let converter = DocutilsConverter::new(ConverterOptions {
            latex_program: "cat".to_string(),
            ..Default::default()
        });
        let out = converter.convert("Hello *world*\n", OutputKind::Latex).unwrap();
        assert_eq!(out, "Hello *world*\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_output_kept_when_stdin_unread() {
        // `true` exits without reading stdin; a source larger than the pipe
        // buffer makes the writer hit a closed pipe.
        let converter = DocutilsConverter::new(ConverterOptions {
            html_program: "true".to_string(),
            ..Default::default()
        });
        let source = "x".repeat(1 << 20);
        let out = converter.convert(&source, OutputKind::Html).unwrap();
        assert_eq!(out, "");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program() {
        let converter = DocutilsConverter::new(ConverterOptions {
            xml_program: "false".to_string(),
            ..Default::default()
        });
        let err = converter.convert("text", OutputKind::Xml).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }
}
