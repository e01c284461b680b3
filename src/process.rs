//! Launching external programs without a visible console.

use std::process::Command;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Configure `command` so starting it does not pop up a console window.
#[cfg(windows)]
pub fn silent(command: &mut Command) -> &mut Command {
    use std::os::windows::process::CommandExt;
    command.creation_flags(CREATE_NO_WINDOW)
}

/// Configure `command` so starting it does not pop up a console window.
#[cfg(not(windows))]
pub fn silent(command: &mut Command) -> &mut Command {
    command
}
