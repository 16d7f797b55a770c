//! `install` and `uninstall`: write the registry scripts for Explorer integration.

use crate::install::{
    default_dir, display_for_windows, install_script, uninstall_script, Launcher, INSTALL_FILE,
    UNINSTALL_FILE,
};
use crate::paths::{normalize_path, write_atomic};
use anyhow::Result;
use std::path::{Path, PathBuf};

fn target_dir(dir: Option<&Path>) -> PathBuf {
    dir.map(normalize_path).unwrap_or_else(default_dir)
}

pub fn install(dir: Option<&Path>) -> Result<String> {
    install_with(dir, &Launcher::current()?)
}

fn install_with(dir: Option<&Path>, launcher: &Launcher) -> Result<String> {
    let dir = target_dir(dir);
    let install = dir.join(INSTALL_FILE);
    let uninstall = dir.join(UNINSTALL_FILE);

    write_atomic(&install, install_script(launcher).as_bytes())?;
    write_atomic(&uninstall, uninstall_script().as_bytes())?;

    tracing::info!(dir = %dir.display(), ?launcher, "wrote registry scripts");
    Ok(format!(
        "Wrote {}\nOpen it from Windows to add the PDFile context menu.\nTo remove it later, open {}",
        display_for_windows(&install),
        display_for_windows(&uninstall)
    ))
}

pub fn uninstall(dir: Option<&Path>) -> Result<String> {
    let path = target_dir(dir).join(UNINSTALL_FILE);
    write_atomic(&path, uninstall_script().as_bytes())?;
    Ok(format!(
        "Wrote {}\nOpen it from Windows to remove the PDFile context menu.",
        display_for_windows(&path)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_writes_both_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Launcher::Wsl("/opt/pdfile".to_string());
        install_with(Some(dir.path()), &launcher).unwrap();

        let script = std::fs::read_to_string(dir.path().join(INSTALL_FILE)).unwrap();
        assert!(script.contains("/opt/pdfile"));
        assert!(dir.path().join(UNINSTALL_FILE).exists());
    }

    #[test]
    fn test_uninstall_writes_removal_script() {
        let dir = tempfile::tempdir().unwrap();
        uninstall(Some(dir.path())).unwrap();
        let script = std::fs::read_to_string(dir.path().join(UNINSTALL_FILE)).unwrap();
        assert!(script.contains("[-HKEY_CURRENT_USER"));
    }
}
