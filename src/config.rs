use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ListingError, ListingResult};
use crate::modal::OpenPolicy;
use crate::render::DEFAULT_PLAYER_BASE;

/// Tunables shared by every listing section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ListingSettings {
    /// Used when the backend omits `numRanks`.
    pub results_per_page: u32,
    pub pagination_range: u32,
    pub modal_policy: OpenPolicy,
    pub request_timeout_ms: u64,
    pub user_agent: String,
    pub player_base_url: String,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            results_per_page: 10,
            pagination_range: 5,
            modal_policy: OpenPolicy::CloseOthers,
            request_timeout_ms: 15_000,
            user_agent: concat!("newsroom-cards/", env!("CARGO_PKG_VERSION")).to_string(),
            player_base_url: DEFAULT_PLAYER_BASE.to_string(),
        }
    }
}

impl ListingSettings {
    /// Explicit file, else `settings.toml` in the user config dir if present, else defaults.
    /// `NEWSROOM_*` environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> ListingResult<Self> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_settings_path().filter(|p| p.is_file()) {
                Some(p) => Self::from_file(&p)?,
                None => Self::default(),
            },
        };
        settings.apply_env();
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> ListingResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ListingError::Settings(format!("{}: {e}", path.display())))?;
        let settings: Self = toml::from_str(&raw)
            .map_err(|e| ListingError::Settings(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded listing settings");
        Ok(settings)
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_parse("NEWSROOM_RESULTS_PER_PAGE") {
            self.results_per_page = v;
        }
        if let Some(v) = env_parse("NEWSROOM_PAGINATION_RANGE") {
            self.pagination_range = v;
        }
        if let Some(v) = env_parse("NEWSROOM_REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = v;
        }
    }
}

pub fn default_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("edu", "newsroom", "newsroom-cards")
        .map(|d| d.config_dir().join("settings.toml"))
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pagination-range = 7\nmodal-policy = \"keep-others\"").unwrap();
        let settings = ListingSettings::from_file(file.path()).unwrap();
        assert_eq!(settings.pagination_range, 7);
        assert_eq!(settings.modal_policy, OpenPolicy::KeepOthers);
        assert_eq!(settings.results_per_page, 10);
        assert_eq!(settings.player_base_url, DEFAULT_PLAYER_BASE);
    }

    #[test]
    fn bad_file_is_a_settings_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pagination-range = \"wide\"").unwrap();
        assert!(matches!(
            ListingSettings::from_file(file.path()),
            Err(ListingError::Settings(_))
        ));
        assert!(matches!(
            ListingSettings::from_file(Path::new("/nonexistent/settings.toml")),
            Err(ListingError::Settings(_))
        ));
    }
}
