use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::buddy::BuddyKind;
use crate::error::SettingsError;

/// How often a scan cycle runs after the startup one.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub const DEFAULT_THRESHOLD_DAYS: u32 = 30;

/// Bounds offered by the settings form.
pub const MIN_THRESHOLD_DAYS: u32 = 7;
pub const MAX_THRESHOLD_DAYS: u32 = 365;

/// File types never offered for deletion unless the user edits the list.
const DEFAULT_IGNORED: &[&str] = &[".lnk", ".ini", ".dll", ".exe"];

/// Everything one scan needs. Replaced as a whole when settings change;
/// a running cycle keeps its own copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    pub roots: Vec<PathBuf>,
    pub age_threshold_days: u32,
    ignored_extensions: Vec<String>,
    pub auto_delete: bool,
}

impl ScanConfig {
    pub fn new<I, S>(
        roots: Vec<PathBuf>,
        age_threshold_days: u32,
        ignored_extensions: I,
        auto_delete: bool,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            roots,
            age_threshold_days,
            ignored_extensions: normalize_extensions(ignored_extensions),
            auto_delete,
        }
    }

    /// Lowercased, trimmed, non-empty, unique suffixes.
    pub fn ignored_extensions(&self) -> &[String] {
        &self.ignored_extensions
    }

    /// True when `file_name` ends with one of the ignored suffixes,
    /// ignoring case.
    pub fn is_ignored(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.ignored_extensions
            .iter()
            .any(|ext| lower.ends_with(ext.as_str()))
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(
            default_roots(),
            DEFAULT_THRESHOLD_DAYS,
            DEFAULT_IGNORED.iter().copied(),
            false,
        )
    }
}

/// In-memory application settings. Nothing here is written to disk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    pub scan: ScanConfig,
    pub buddy: BuddyKind,
}

fn normalize_extensions<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for ext in raw {
        let ext = ext.as_ref().trim().to_lowercase();
        if ext.is_empty() || out.contains(&ext) {
            continue;
        }
        out.push(ext);
    }
    out
}

/// Split the comma-separated text typed in the settings form.
pub fn parse_ignored_list(text: &str) -> Vec<String> {
    normalize_extensions(text.split(','))
}

/// Inverse of `parse_ignored_list`, for pre-filling the form.
pub fn format_ignored_list(extensions: &[String]) -> String {
    extensions.join(", ")
}

pub fn validate_threshold(days: u32) -> Result<u32, SettingsError> {
    if (MIN_THRESHOLD_DAYS..=MAX_THRESHOLD_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(SettingsError::ThresholdOutOfRange {
            value: days,
            min: MIN_THRESHOLD_DAYS,
            max: MAX_THRESHOLD_DAYS,
        })
    }
}

/// Check a folder typed into the settings form before adding it.
pub fn validate_new_root(existing: &[PathBuf], candidate: &str) -> Result<PathBuf, SettingsError> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return Err(SettingsError::EmptyRoot);
    }
    let path = PathBuf::from(trimmed);
    if existing.iter().any(|p| same_root(p, &path)) {
        return Err(SettingsError::DuplicateRoot(path));
    }
    Ok(path)
}

fn same_root(a: &Path, b: &Path) -> bool {
    a.components().eq(b.components())
}

/// Downloads, Desktop, the temp dir, and the Windows system temp dir.
fn default_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    roots.extend(dirs::download_dir());
    roots.extend(dirs::desktop_dir());
    roots.push(std::env::temp_dir());
    if cfg!(windows) {
        if let Some(windir) = std::env::var_os("WINDIR") {
            roots.push(PathBuf::from(windir).join("Temp"));
        }
    }
    let mut unique: Vec<PathBuf> = Vec::with_capacity(roots.len());
    for root in roots {
        if !unique.iter().any(|p| same_root(p, &root)) {
            unique.push(root);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.scan.age_threshold_days, 30);
        assert!(!settings.scan.auto_delete);
        assert_eq!(
            settings.scan.ignored_extensions(),
            &[".lnk", ".ini", ".dll", ".exe"]
        );
        assert!(settings.scan.roots.contains(&std::env::temp_dir()));
        assert_eq!(settings.buddy, BuddyKind::Cat);
    }

    #[test]
    fn test_extensions_are_normalized() {
        let config = ScanConfig::new(vec![], 1, [" .DLL", "", ".dll", "  ", ".Log"], false);
        assert_eq!(config.ignored_extensions(), &[".dll", ".log"]);
    }

    #[test]
    fn test_is_ignored_case_insensitive() {
        let config = ScanConfig::new(vec![], 1, [".dll"], false);
        assert!(config.is_ignored("SKIP.DLL"));
        assert!(config.is_ignored("skip.dll"));
        assert!(!config.is_ignored("skip.dll.txt"));
    }

    #[test]
    fn test_empty_ignore_list_ignores_nothing() {
        let config = ScanConfig::new(vec![], 1, Vec::<String>::new(), false);
        assert!(!config.is_ignored("anything.txt"));
    }

    #[test]
    fn test_parse_and_format_ignored_list() {
        let parsed = parse_ignored_list(".lnk, .INI,, .log ");
        assert_eq!(parsed, vec![".lnk", ".ini", ".log"]);
        assert_eq!(format_ignored_list(&parsed), ".lnk, .ini, .log");
    }

    #[test]
    fn test_validate_threshold() {
        assert_eq!(validate_threshold(7), Ok(7));
        assert_eq!(validate_threshold(365), Ok(365));
        assert!(matches!(
            validate_threshold(6),
            Err(SettingsError::ThresholdOutOfRange { value: 6, .. })
        ));
        assert!(validate_threshold(366).is_err());
    }

    #[test]
    fn test_validate_new_root() {
        let existing = vec![PathBuf::from("/home/me/Downloads")];
        assert_eq!(validate_new_root(&existing, "  "), Err(SettingsError::EmptyRoot));
        assert_eq!(
            validate_new_root(&existing, "/home/me/Downloads/"),
            Err(SettingsError::DuplicateRoot(PathBuf::from("/home/me/Downloads/")))
        );
        assert_eq!(
            validate_new_root(&existing, " /srv/drop "),
            Ok(PathBuf::from("/srv/drop"))
        );
    }
}
