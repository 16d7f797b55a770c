use crate::config::OutputConfig;
use crate::error::PdfileError;
use anyhow::{Context, Result};
use regex::Regex;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn drive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Za-z]):(?:[\\/](.*))?$").unwrap())
}

fn mount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^/mnt/([a-z])(?:/(.*))?$").unwrap())
}

/// The pieces of an input path that output naming is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParts {
    pub dirname: PathBuf,
    pub basename: String,
    pub filename: String,
    pub extension: String,
}

impl PathParts {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let lossy = |s: Option<&std::ffi::OsStr>| {
            s.map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
        };
        PathParts {
            dirname: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            basename: lossy(path.file_name()),
            filename: lossy(path.file_stem()),
            extension: lossy(path.extension()),
        }
    }
}

/// Translate `C:\Users\me` (or `C:/Users/me`) into `/mnt/c/Users/me`.
///
/// Anything that is not a drive-letter path, including `/mnt/x/...`, comes back unchanged.
pub fn windows_to_wsl(path: &str) -> String {
    match drive_pattern().captures(path) {
        Some(caps) => {
            let drive = caps[1].to_ascii_lowercase();
            match caps.get(2) {
                Some(rest) => format!("/mnt/{}/{}", drive, rest.as_str().replace('\\', "/")),
                None => format!("/mnt/{}", drive),
            }
        }
        None => path.to_string(),
    }
}

/// Translate `/mnt/c/Users/me` back into `C:\Users\me`.
pub fn wsl_to_windows(path: &str) -> Option<String> {
    let caps = mount_pattern().captures(path)?;
    let drive = caps[1].to_ascii_uppercase();
    Some(match caps.get(2) {
        Some(rest) => format!("{}:\\{}", drive, rest.as_str().replace('/', "\\")),
        None => format!("{}:", drive),
    })
}

/// Make a user-supplied path usable from this process.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let text = path.to_string_lossy();

    if !cfg!(windows) && drive_pattern().is_match(&text) {
        return PathBuf::from(windows_to_wsl(&text));
    }

    if path.is_absolute() {
        return path.to_path_buf();
    }

    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Directory results for `input` go into.
///
/// With a subdirectory configured this is a sibling folder of the input, unless
/// the input already lives inside a folder of that name.
pub fn output_dir<P: AsRef<Path>>(input: P, config: &OutputConfig) -> PathBuf {
    let parent = PathParts::new(input).dirname;

    if !config.use_subdirectory {
        return parent;
    }

    let already_inside = parent
        .file_name()
        .map(|name| name == config.subdirectory_name.as_str())
        .unwrap_or(false);

    if already_inside {
        parent
    } else {
        parent.join(&config.subdirectory_name)
    }
}

/// `<output dir>/<stem><suffix>.<ext>`, keeping the input's extension unless overridden.
pub fn output_path<P: AsRef<Path>>(
    input: P,
    suffix: &str,
    new_extension: Option<&str>,
    config: &OutputConfig,
) -> PathBuf {
    let parts = PathParts::new(&input);
    let extension = new_extension.unwrap_or(&parts.extension);
    let name = if extension.is_empty() {
        format!("{}{}", parts.filename, suffix)
    } else {
        format!("{}{}.{}", parts.filename, suffix, extension)
    };
    tracing::debug!(input = %parts.basename, output = %name, "derived output name");
    output_dir(&input, config).join(name)
}

pub fn ensure_output_dir<P: AsRef<Path>>(dir: P) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

pub fn require_extension<P: AsRef<Path>>(
    path: P,
    expected: &[&'static str],
) -> Result<(), PdfileError> {
    let path = path.as_ref();
    let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| expected.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false);

    if matches {
        Ok(())
    } else {
        Err(PdfileError::InvalidExtension {
            path: path.to_path_buf(),
            expected: expected.to_vec(),
        })
    }
}

pub fn check_overwrite<P: AsRef<Path>>(output: P, overwrite: bool) -> Result<(), PdfileError> {
    let output = output.as_ref();
    if output.exists() && !overwrite {
        Err(PdfileError::OutputExists(output.to_path_buf()))
    } else {
        Ok(())
    }
}

fn output_parent(output: &Path) -> Result<&Path> {
    let dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    ensure_output_dir(dir)?;
    Ok(dir)
}

/// A temporary file in `dir` created with the mode a plain create would get.
fn temp_file_in(dir: &Path, suffix: &str) -> Result<tempfile::NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".pdfile-").suffix(suffix);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Masked by the umask, like `File::create`.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))
}

/// Rename `tmp` over `output`, keeping the permissions of a file being replaced.
fn persist(tmp: tempfile::NamedTempFile, output: &Path) -> Result<()> {
    if let Ok(existing) = fs::metadata(output) {
        fs::set_permissions(tmp.path(), existing.permissions())
            .with_context(|| format!("Failed to set permissions on {}", tmp.path().display()))?;
    }
    tmp.persist(output)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

/// Write `output` via a temporary file in the same directory, renamed into place on success.
pub fn write_atomic_with<P, F>(output: P, write: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut File) -> Result<()>,
{
    let output = output.as_ref();
    let mut tmp = temp_file_in(output_parent(output)?, "")?;
    write(tmp.as_file_mut())?;
    tmp.as_file_mut().flush()?;
    persist(tmp, output)?;

    tracing::debug!(path = %output.display(), "wrote output");
    Ok(())
}

pub fn write_atomic<P: AsRef<Path>>(output: P, bytes: &[u8]) -> Result<()> {
    write_atomic_with(output, |file| Ok(file.write_all(bytes)?))
}

/// An empty temporary file next to `output` with the same extension.
///
/// For external tools that write by path and pick the format from the extension;
/// hand it to [`commit_staged`] once the tool succeeds.
pub fn staging_file<P: AsRef<Path>>(output: P) -> Result<tempfile::NamedTempFile> {
    let output = output.as_ref();
    let suffix = output
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    temp_file_in(output_parent(output)?, &suffix)
}

pub fn commit_staged<P: AsRef<Path>>(staged: tempfile::NamedTempFile, output: P) -> Result<()> {
    persist(staged, output.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OutputConfig {
        OutputConfig::default()
    }

    #[test]
    fn test_windows_to_wsl() {
        assert_eq!(windows_to_wsl(r"C:\Users\me\a.pdf"), "/mnt/c/Users/me/a.pdf");
        assert_eq!(windows_to_wsl("D:/docs/b.pdf"), "/mnt/d/docs/b.pdf");
        assert_eq!(windows_to_wsl("E:"), "/mnt/e");
    }

    #[test]
    fn test_mount_paths_are_untouched() {
        for p in ["/mnt/c/Users/me/a.pdf", "/mnt/d", "/home/me/a.pdf", "rel/a.pdf"] {
            assert_eq!(windows_to_wsl(p), p);
        }
    }

    #[test]
    fn test_wsl_round_trip() {
        for p in ["/mnt/c/Users/me/a.pdf", "/mnt/z", "/mnt/c/", "/mnt/d/x//y/"] {
            let windows = wsl_to_windows(p).unwrap();
            assert_eq!(windows_to_wsl(&windows), p, "via {}", windows);
        }
        assert_eq!(wsl_to_windows("/mnt/c/a/b").unwrap(), r"C:\a\b");
        assert_eq!(wsl_to_windows("/home/me"), None);
    }

    #[test]
    fn test_normalize_relative() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(normalize_path("x/y.pdf"), cwd.join("x/y.pdf"));
        assert_eq!(normalize_path("/abs/y.pdf"), PathBuf::from("/abs/y.pdf"));
    }

    #[test]
    fn test_path_parts() {
        let parts = PathParts::new("/docs/report.final.pdf");
        assert_eq!(parts.dirname, PathBuf::from("/docs"));
        assert_eq!(parts.basename, "report.final.pdf");
        assert_eq!(parts.filename, "report.final");
        assert_eq!(parts.extension, "pdf");
    }

    #[test]
    fn test_output_dir_sibling() {
        assert_eq!(
            output_dir("/docs/a.pdf", &config()),
            PathBuf::from("/docs/PDFile")
        );
    }

    #[test]
    fn test_output_dir_no_double_nesting() {
        let dir = output_dir("/docs/PDFile/a_merged.pdf", &config());
        assert_eq!(dir, PathBuf::from("/docs/PDFile"));
        assert!(!dir.ends_with("PDFile/PDFile"));
    }

    #[test]
    fn test_output_dir_without_subdirectory() {
        let config = OutputConfig {
            use_subdirectory: false,
            ..OutputConfig::default()
        };
        assert_eq!(output_dir("/docs/a.pdf", &config), PathBuf::from("/docs"));
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path("/docs/a.pdf", "_signed", None, &config()),
            PathBuf::from("/docs/PDFile/a_signed.pdf")
        );
        assert_eq!(
            output_path("/docs/a.pdf", "", Some("docx"), &config()),
            PathBuf::from("/docs/PDFile/a.docx")
        );
    }

    #[test]
    fn test_require_extension() {
        assert!(require_extension("a.PDF", &["pdf"]).is_ok());
        assert!(require_extension("a.png", &["pdf"]).is_err());
        assert!(require_extension("noext", &["pdf"]).is_err());
    }

    #[test]
    fn test_write_atomic_creates_dirs_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out.bin");

        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"second");
        let leftovers = std::fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_staging_keeps_extension() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out").join("sig_nobg.png");

        let staged = staging_file(&target).unwrap();
        assert_eq!(staged.path().extension().unwrap(), "png");
        assert_eq!(staged.path().parent(), target.parent());

        std::fs::write(staged.path(), b"image").unwrap();
        commit_staged(staged, &target).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"image");
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn test_new_output_gets_default_mode() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.bin");
        let atomic = dir.path().join("atomic.bin");
        std::fs::write(&plain, b"x").unwrap();
        write_atomic(&atomic, b"x").unwrap();

        assert_eq!(mode(&atomic), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_replaced_output_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        std::fs::write(&target, b"old").unwrap();
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&target, b"new").unwrap();
        assert_eq!(mode(&target), 0o640);

        let staged = staging_file(&target).unwrap();
        std::fs::write(staged.path(), b"newer").unwrap();
        commit_staged(staged, &target).unwrap();
        assert_eq!(mode(&target), 0o640);
        assert_eq!(std::fs::read(&target).unwrap(), b"newer");
    }

    #[test]
    fn test_ensure_output_dir_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("PDFile");
        ensure_output_dir(&out).unwrap();
        ensure_output_dir(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_check_overwrite() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(check_overwrite(file.path(), false).is_err());
        assert!(check_overwrite(file.path(), true).is_ok());
    }
}
