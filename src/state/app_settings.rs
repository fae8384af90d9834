use log::{LevelFilter, warn};
use padel_core::LayoutConstants;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_PAGE_SIZE: usize = 10;
const DEFAULT_REFRESH_SECS: u64 = 30;

/// Settings file contents. Every field is optional so a partial file works.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    full_screen: Option<bool>,
    log_level: Option<String>,
    box_height: Option<u16>,
    base_gap: Option<u16>,
    page_size: Option<usize>,
    refresh_secs: Option<u64>,
    data_json: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// Match card height in rows. Never below 3.
    pub box_height: u16,
    /// Blank rows between first-round cards.
    pub base_gap: u16,
    pub page_size: usize,
    pub refresh_secs: u64,
    pub data_json: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            box_height: 3,
            base_gap: 1,
            page_size: DEFAULT_PAGE_SIZE,
            refresh_secs: DEFAULT_REFRESH_SECS,
            data_json: None,
        }
    }
}

impl AppSettings {
    /// Defaults, then `settings.json` from the config dir, then environment.
    pub fn load() -> Self {
        let mut settings = Self::default();
        if let Some(file) = read_settings_file() {
            settings.apply_file(file);
        }
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    pub fn layout_constants(&self) -> LayoutConstants {
        LayoutConstants::new(f64::from(self.box_height), f64::from(self.base_gap))
    }

    fn apply_file(&mut self, file: SettingsFile) {
        if let Some(full_screen) = file.full_screen {
            self.full_screen = full_screen;
        }
        if let Some(level) = file.log_level {
            self.set_log_level(&level);
        }
        if let Some(h) = file.box_height {
            self.box_height = h.max(3);
        }
        if let Some(g) = file.base_gap {
            self.base_gap = g.max(1);
        }
        if let Some(n) = file.page_size {
            self.page_size = n.max(1);
        }
        if let Some(secs) = file.refresh_secs {
            self.refresh_secs = secs.max(1);
        }
        if file.data_json.is_some() {
            self.data_json = file.data_json;
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(level) = var("PADELTUI_LOG_LEVEL") {
            self.set_log_level(&level);
        }
        if let Some(h) = parse_var::<u16>(&var, "PADELTUI_BOX_HEIGHT") {
            self.box_height = h.max(3);
        }
        if let Some(g) = parse_var::<u16>(&var, "PADELTUI_BASE_GAP") {
            self.base_gap = g.max(1);
        }
        if let Some(n) = parse_var::<usize>(&var, "PADELTUI_PAGE_SIZE") {
            self.page_size = n.max(1);
        }
        if let Some(path) = var("PADELTUI_DATA_JSON").filter(|p| !p.trim().is_empty()) {
            self.data_json = Some(PathBuf::from(path));
        }
    }

    fn set_log_level(&mut self, level: &str) {
        match LevelFilter::from_str(level.trim()) {
            Ok(level) => self.log_level = Some(level),
            Err(_) => warn!("ignoring unknown log level {level:?}"),
        }
    }
}

fn parse_var<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = var(key)?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        warn!("ignoring {key}={raw:?}: not a number");
    }
    parsed
}

fn read_settings_file() -> Option<SettingsFile> {
    let path = settings_path()?;
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(file) => Some(file),
        Err(e) => {
            warn!("ignoring {}: {e}", path.display());
            None
        }
    }
}

fn settings_path() -> Option<PathBuf> {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return Some(PathBuf::from(config_dir).join("padeltui").join("settings.json"));
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return Some(
            PathBuf::from(home)
                .join(".config")
                .join("padeltui")
                .join("settings.json"),
        );
    }
    None
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_defaults() {
        let mut settings = AppSettings::default();
        settings.apply_env(env(&[
            ("PADELTUI_LOG_LEVEL", "debug"),
            ("PADELTUI_BOX_HEIGHT", "5"),
            ("PADELTUI_PAGE_SIZE", "25"),
            ("PADELTUI_DATA_JSON", "/tmp/club.json"),
        ]));
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
        assert_eq!(settings.box_height, 5);
        assert_eq!(settings.base_gap, 1);
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.data_json, Some(PathBuf::from("/tmp/club.json")));
    }

    #[test]
    fn test_bad_values_are_ignored_or_clamped() {
        let mut settings = AppSettings::default();
        settings.apply_env(env(&[
            ("PADELTUI_LOG_LEVEL", "loud"),
            ("PADELTUI_BOX_HEIGHT", "1"),
            ("PADELTUI_BASE_GAP", "wide"),
            ("PADELTUI_PAGE_SIZE", "0"),
        ]));
        assert_eq!(settings.log_level, None);
        assert_eq!(settings.box_height, 3);
        assert_eq!(settings.base_gap, 1);
        assert_eq!(settings.page_size, 1);
    }

    #[test]
    fn test_partial_settings_file() {
        let file: SettingsFile =
            serde_json::from_str(r#"{ "full_screen": true, "base_gap": 2 }"#).unwrap();
        let mut settings = AppSettings::default();
        settings.apply_file(file);
        assert!(settings.full_screen);
        assert_eq!(settings.layout_constants(), LayoutConstants::new(3.0, 2.0));
        assert_eq!(settings.refresh_secs, DEFAULT_REFRESH_SECS);
    }
}
