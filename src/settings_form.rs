use std::path::PathBuf;

use crate::buddy::BuddyKind;
use crate::config::{self, ScanConfig, Settings};
use crate::error::SettingsError;

/// Editable copy of the settings shown in the settings window. Nothing
/// changes in the running app until `to_settings` succeeds and the caller
/// swaps the result in.
#[derive(Debug)]
pub struct SettingsForm {
    pub threshold_days: u32,
    pub roots: Vec<PathBuf>,
    /// Parallel to `roots`.
    pub selected: Vec<bool>,
    pub new_root: String,
    pub auto_delete: bool,
    pub ignored_text: String,
    pub buddy: BuddyKind,
    pub error: Option<String>,
}

impl SettingsForm {
    pub fn from_settings(settings: &Settings) -> Self {
        let scan = &settings.scan;
        Self {
            threshold_days: scan.age_threshold_days,
            roots: scan.roots.clone(),
            selected: vec![false; scan.roots.len()],
            new_root: String::new(),
            auto_delete: scan.auto_delete,
            ignored_text: config::format_ignored_list(scan.ignored_extensions()),
            buddy: settings.buddy,
            error: None,
        }
    }

    /// Add the typed folder unless it is empty or already listed.
    pub fn add_root(&mut self) {
        match config::validate_new_root(&self.roots, &self.new_root) {
            Ok(path) => {
                self.roots.push(path);
                self.selected.push(false);
                self.new_root.clear();
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    pub fn remove_selected(&mut self) {
        let mut keep = self.selected.iter().map(|s| !*s);
        self.roots.retain(|_| keep.next().unwrap_or(true));
        self.selected = vec![false; self.roots.len()];
    }

    pub fn to_settings(&self) -> Result<Settings, SettingsError> {
        let days = config::validate_threshold(self.threshold_days)?;
        Ok(Settings {
            scan: ScanConfig::new(
                self.roots.clone(),
                days,
                config::parse_ignored_list(&self.ignored_text),
                self.auto_delete,
            ),
            buddy: self.buddy,
        })
    }
}
