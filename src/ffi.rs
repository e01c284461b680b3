//! C-ABI Foreign Function Interface for rstexport.
//!
//! Lets an editor written in C, C++, C#, Python or any language with C FFI
//! support drive the export controller with default options.
//!
//! # Memory Management
//!
//! All strings returned by this library must be freed using
//! `rstexport_free_string`.
//!
//! # Error Handling
//!
//! Functions that can fail return a null pointer or `-1`. Use
//! `rstexport_last_error` to retrieve the error message; it is null when the
//! last call did not fail.
//!
//! # Example (C)
//!
//! ```c
//! #include <stdio.h>
//! #include "rstexport.h"
//!
//! int main() {
//!     int wanted = RSTEXPORT_SELECT_HTML | RSTEXPORT_SELECT_PDF;
//!     char* preview = rstexport_save("notes.txt", "Notes\n=====\n", 0, wanted);
//!     if (!preview && rstexport_last_error()) {
//!         fprintf(stderr, "Error: %s\n", rstexport_last_error());
//!         return 1;
//!     }
//!     rstexport_free_string(preview);
//!
//!     if (rstexport_export("notes.txt", RSTEXPORT_FORMAT_PDF, 1) == 0) {
//!         fprintf(stderr, "pdflatex is not installed\n");
//!     }
//!     return 0;
//! }
//! ```

use std::cell::RefCell;
use std::ffi::{c_char, c_int, CStr, CString};
use std::panic::catch_unwind;
use std::ptr;

use crate::controller::{CleanupMode, ExportController};
use crate::format::{ExportFormat, ExportSelection};

// Thread-local storage for the last error message.
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = RefCell::new(None);
}

/// Set the last error message.
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message.
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Format codes accepted by `rstexport_export` and `rstexport_cleanup_explicit`.
pub const RSTEXPORT_FORMAT_HTML: c_int = 0;
pub const RSTEXPORT_FORMAT_XML: c_int = 1;
pub const RSTEXPORT_FORMAT_LATEX: c_int = 2;
pub const RSTEXPORT_FORMAT_DVI: c_int = 3;
pub const RSTEXPORT_FORMAT_PDF: c_int = 4;

/// Selection bits: `1 << format code`.
pub const RSTEXPORT_SELECT_HTML: c_int = 1 << RSTEXPORT_FORMAT_HTML;
pub const RSTEXPORT_SELECT_XML: c_int = 1 << RSTEXPORT_FORMAT_XML;
pub const RSTEXPORT_SELECT_LATEX: c_int = 1 << RSTEXPORT_FORMAT_LATEX;
pub const RSTEXPORT_SELECT_DVI: c_int = 1 << RSTEXPORT_FORMAT_DVI;
pub const RSTEXPORT_SELECT_PDF: c_int = 1 << RSTEXPORT_FORMAT_PDF;

fn format_from_code(code: c_int) -> Option<ExportFormat> {
    match code {
        RSTEXPORT_FORMAT_HTML => Some(ExportFormat::Html),
        RSTEXPORT_FORMAT_XML => Some(ExportFormat::Xml),
        RSTEXPORT_FORMAT_LATEX => Some(ExportFormat::Latex),
        RSTEXPORT_FORMAT_DVI => Some(ExportFormat::Dvi),
        RSTEXPORT_FORMAT_PDF => Some(ExportFormat::Pdf),
        _ => None,
    }
}

fn selection_from_flags(flags: c_int) -> ExportSelection {
    let mut selection = ExportSelection::none();
    for (code, format) in ExportFormat::ALL.into_iter().enumerate() {
        selection.set(format, flags & (1 << code) != 0);
    }
    selection
}

/// Borrow a C string argument as UTF-8.
///
/// # Safety
///
/// `ptr` must be null or a valid null-terminated string.
unsafe fn str_arg<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, String> {
    if ptr.is_null() {
        return Err(format!("{} is null", name));
    }
    CStr::from_ptr(ptr).to_str().map_err(|e| e.to_string())
}

/// Get the version of the library.
///
/// # Safety
///
/// Returns a static string that must not be freed.
#[no_mangle]
pub extern "C" fn rstexport_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Get the last error message.
///
/// # Safety
///
/// Returns a pointer to a thread-local error string, or null. The pointer is
/// valid until the next call to any rstexport function on the same thread.
#[no_mangle]
pub extern "C" fn rstexport_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Save a document and render a preview.
///
/// # Safety
///
/// - `path` and `content` must be valid null-terminated UTF-8 strings.
///   An empty `path` means the document has no file yet.
/// - `selection` is a bitwise OR of `RSTEXPORT_SELECT_*` constants.
/// - Returns the preview path, or null. Null with no last error means the
///   document was unsaved.
/// - The returned string must be freed with `rstexport_free_string`.
#[no_mangle]
pub unsafe extern "C" fn rstexport_save(
    path: *const c_char,
    content: *const c_char,
    during_export: c_int,
    selection: c_int,
) -> *mut c_char {
    clear_last_error();

    let result = catch_unwind(|| {
        let path = str_arg(path, "path")?;
        let content = str_arg(content, "content")?;
        let selection = selection_from_flags(selection);

        ExportController::default()
            .save(path, content, during_export != 0, &selection)
            .map_err(|e| e.to_string())
    });

    match result {
        Ok(Ok(Some(preview))) => match CString::new(preview.to_string_lossy().into_owned()) {
            Ok(s) => s.into_raw(),
            Err(_) => {
                set_last_error("preview path contains null byte");
                ptr::null_mut()
            }
        },
        Ok(Ok(None)) => ptr::null_mut(),
        Ok(Err(e)) => {
            set_last_error(&e);
            ptr::null_mut()
        }
        Err(_) => {
            set_last_error("panic occurred during save");
            ptr::null_mut()
        }
    }
}

/// Export a document.
///
/// # Safety
///
/// - `path` must be a valid null-terminated UTF-8 string.
/// - `format` is one of the `RSTEXPORT_FORMAT_*` constants.
/// - Returns 1 on success, 0 if the LaTeX toolchain could not be started,
///   -1 on error.
#[no_mangle]
pub unsafe extern "C" fn rstexport_export(
    path: *const c_char,
    format: c_int,
    explicit: c_int,
) -> c_int {
    clear_last_error();

    let result = catch_unwind(|| {
        let path = str_arg(path, "path")?;
        let format = format_from_code(format).ok_or_else(|| format!("unknown format {}", format))?;

        ExportController::default()
            .export_as(path, format, explicit != 0)
            .map_err(|e| e.to_string())
    });

    match result {
        Ok(Ok(outcome)) => c_int::from(outcome.succeeded()),
        Ok(Err(e)) => {
            set_last_error(&e);
            -1
        }
        Err(_) => {
            set_last_error("panic occurred during export");
            -1
        }
    }
}

/// Remove outputs of formats not in `selection`, plus LaTeX by-products.
///
/// # Safety
///
/// - `path` must be a valid null-terminated UTF-8 string.
/// - Returns the number of files removed, or -1 on error.
#[no_mangle]
pub unsafe extern "C" fn rstexport_cleanup_after_save(
    path: *const c_char,
    selection: c_int,
) -> c_int {
    clear_last_error();

    let result = catch_unwind(|| {
        let path = str_arg(path, "path")?;
        let mode = CleanupMode::AfterSave(selection_from_flags(selection));
        Ok::<_, String>(ExportController::default().cleanup(path, mode).len() as c_int)
    });

    match result {
        Ok(Ok(count)) => count,
        Ok(Err(e)) => {
            set_last_error(&e);
            -1
        }
        Err(_) => {
            set_last_error("panic occurred during cleanup");
            -1
        }
    }
}

/// Remove every output of the document except the one for `keep`.
///
/// # Safety
///
/// - `path` must be a valid null-terminated UTF-8 string.
/// - `keep` is one of the `RSTEXPORT_FORMAT_*` constants.
/// - Returns the number of files removed, or -1 on error.
#[no_mangle]
pub unsafe extern "C" fn rstexport_cleanup_explicit(path: *const c_char, keep: c_int) -> c_int {
    clear_last_error();

    let result = catch_unwind(|| {
        let path = str_arg(path, "path")?;
        let keep = format_from_code(keep).ok_or_else(|| format!("unknown format {}", keep))?;
        let mode = CleanupMode::AfterExplicitExport { keep };
        Ok::<_, String>(ExportController::default().cleanup(path, mode).len() as c_int)
    });

    match result {
        Ok(Ok(count)) => count,
        Ok(Err(e)) => {
            set_last_error(&e);
            -1
        }
        Err(_) => {
            set_last_error("panic occurred during cleanup");
            -1
        }
    }
}

/// Free a string allocated by this library.
///
/// # Safety
///
/// - `s` must be a pointer returned by an rstexport function, or null.
/// - After calling this function, the pointer is invalid and must not be used.
#[no_mangle]
pub unsafe extern "C" fn rstexport_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_version() {
        let version = rstexport_version();
        assert!(!version.is_null());
        let version_str = unsafe { CStr::from_ptr(version) }.to_str().unwrap();
        assert!(!version_str.is_empty());
    }

    #[test]
    fn test_selection_flags() {
        let selection = selection_from_flags(RSTEXPORT_SELECT_XML | RSTEXPORT_SELECT_PDF);
        assert_eq!(
            selection,
            ExportSelection::of(&[ExportFormat::Xml, ExportFormat::Pdf])
        );
        assert_eq!(format_from_code(RSTEXPORT_FORMAT_DVI), Some(ExportFormat::Dvi));
        assert_eq!(format_from_code(9), None);
    }

    #[test]
    fn test_save_unsaved_document() {
        let path = CString::new("").unwrap();
        let content = CString::new("text").unwrap();
        let preview = unsafe { rstexport_save(path.as_ptr(), content.as_ptr(), 0, 0) };
        assert!(preview.is_null());
        assert!(rstexport_last_error().is_null());
    }

    #[test]
    fn test_null_arguments() {
        let preview = unsafe { rstexport_save(ptr::null(), ptr::null(), 0, 0) };
        assert!(preview.is_null());
        assert!(!rstexport_last_error().is_null());

        let status = unsafe { rstexport_export(ptr::null(), RSTEXPORT_FORMAT_HTML, 0) };
        assert_eq!(status, -1);

        let count = unsafe { rstexport_cleanup_after_save(ptr::null(), 0) };
        assert_eq!(count, -1);
    }

    #[test]
    fn test_unknown_format() {
        let path = CString::new("doc.txt").unwrap();
        let status = unsafe { rstexport_export(path.as_ptr(), 42, 0) };
        assert_eq!(status, -1);
        assert!(!rstexport_last_error().is_null());
    }

    #[test]
    fn test_cleanup_explicit() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("doc.txt");
        fs::write(dir.path().join("doc.html"), "").unwrap();
        fs::write(dir.path().join("doc.pdf"), "").unwrap();

        let path = CString::new(doc.to_str().unwrap()).unwrap();
        let count = unsafe { rstexport_cleanup_explicit(path.as_ptr(), RSTEXPORT_FORMAT_PDF) };
        assert_eq!(count, 1);
        assert!(dir.path().join("doc.pdf").exists());
        assert!(!dir.path().join("doc.html").exists());
    }

    #[test]
    fn test_free_null() {
        // Should not crash
        unsafe {
            rstexport_free_string(ptr::null_mut());
        }
    }
}
