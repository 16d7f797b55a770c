//! Explorer context-menu integration via generated `.reg` files.
//!
//! Entries live under the per-user `SystemFileAssociations` key, so neither
//! file needs administrator rights. Under WSL the menu runs the Linux binary
//! through `wsl.exe`; Windows paths passed as `%1` are translated by the tool itself.

use crate::paths::wsl_to_windows;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub const INSTALL_FILE: &str = "pdfile-install.reg";
pub const UNINSTALL_FILE: &str = "pdfile-uninstall.reg";

const REG_HEADER: &str = "Windows Registry Editor Version 5.00";
const CLASSES_ROOT: &str = r"HKEY_CURRENT_USER\Software\Classes\SystemFileAssociations";
const MENU_KEY: &str = "PDFile";

/// How Explorer starts the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launcher {
    /// A native Windows executable.
    Native(String),
    /// A Linux binary inside WSL, started with `wsl.exe -e`.
    Wsl(String),
}

impl Launcher {
    /// Pick the launcher for the running binary.
    pub fn current() -> Result<Self> {
        let exe = std::env::current_exe()?.display().to_string();
        Ok(if cfg!(windows) {
            Launcher::Native(exe)
        } else {
            Launcher::Wsl(exe)
        })
    }

    fn command_line(&self, args: &[&str]) -> String {
        let args = args.join(" ");
        match self {
            Launcher::Native(exe) => format!("\"{}\" {}", exe, args),
            Launcher::Wsl(exe) => format!("wsl.exe -e \"{}\" {}", exe, args),
        }
    }
}

struct MenuEntry {
    key: &'static str,
    label: &'static str,
    extensions: &'static [&'static str],
    args: &'static [&'static str],
}

const ENTRIES: &[MenuEntry] = &[
    MenuEntry {
        key: "ToWord",
        label: "Convert to Word",
        extensions: &[".pdf"],
        args: &["to-word", "\"%1\"", "--yes"],
    },
    MenuEntry {
        key: "InsertDate",
        label: "Insert today's date",
        extensions: &[".pdf"],
        args: &["insert-date", "\"%1\"", "--yes"],
    },
    MenuEntry {
        key: "RemoveBackground",
        label: "Remove background",
        extensions: &[".png", ".jpg", ".jpeg", ".gif", ".webp"],
        args: &["remove-bg", "\"%1\"", "--yes"],
    },
];

/// Quote a value for a `.reg` file string.
fn reg_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', r"\\").replace('"', "\\\""))
}

fn extensions() -> Vec<&'static str> {
    let mut all: Vec<&'static str> = ENTRIES
        .iter()
        .flat_map(|entry| entry.extensions.iter().copied())
        .collect();
    all.sort_unstable();
    all.dedup();
    all
}

/// Registry script adding a "PDFile" submenu for each supported file type.
pub fn install_script(launcher: &Launcher) -> String {
    let mut out = format!("{}\r\n", REG_HEADER);

    for ext in extensions() {
        let menu = format!(r"{}\{}\shell\{}", CLASSES_ROOT, ext, MENU_KEY);
        out.push_str(&format!("\r\n[{}]\r\n", menu));
        out.push_str(&format!("\"MUIVerb\"={}\r\n", reg_string("PDFile")));
        out.push_str("\"SubCommands\"=\"\"\r\n");

        for entry in ENTRIES.iter().filter(|e| e.extensions.contains(&ext)) {
            let key = format!(r"{}\shell\{}", menu, entry.key);
            out.push_str(&format!("\r\n[{}]\r\n@={}\r\n", key, reg_string(entry.label)));
            out.push_str(&format!(
                "\r\n[{}\\command]\r\n@={}\r\n",
                key,
                reg_string(&launcher.command_line(entry.args))
            ));
        }
    }
    out
}

/// Registry script deleting everything `install_script` added.
pub fn uninstall_script() -> String {
    let mut out = format!("{}\r\n", REG_HEADER);
    for ext in extensions() {
        out.push_str(&format!(
            "\r\n[-{}\\{}\\shell\\{}]\r\n",
            CLASSES_ROOT, ext, MENU_KEY
        ));
    }
    out
}

/// Default place for the generated files: next to the config file.
pub fn default_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pdfile")
}

/// How to refer to a generated file from the Windows side.
pub fn display_for_windows(path: &Path) -> String {
    let text = path.display().to_string();
    wsl_to_windows(&text).unwrap_or(text)
}
