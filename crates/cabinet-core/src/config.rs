use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Portal the reports are published on.
pub const DEFAULT_ORIGIN: &str = "https://cabinet.miccedu.ru";

/// Which report/year a run downloads. Passed explicitly to every component that
/// names files or folders after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSelection {
    /// Report form code, e.g. `oo1`.
    pub report: String,
    /// Reporting year, e.g. `2023`.
    pub year: String,
}

impl ReportSelection {
    pub fn new(report: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            report: report.into(),
            year: year.into(),
        }
    }

    /// Output folder name: `{report}_{year}`.
    pub fn folder_name(&self) -> String {
        format!("{}_{}", self.report, self.year)
    }
}

/// Global configuration loaded from `~/.config/cabinet/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CabinetConfig {
    /// Portal origin every request is resolved against.
    pub origin: String,
    /// Directory the `{report}_{year}` folder is created in.
    pub output_dir: PathBuf,
    /// Connect timeout per request, in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout, in seconds. Downloads are whole-file GETs, so keep this generous.
    pub request_timeout_secs: u64,
    /// Optional `User-Agent` header.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Capacity of the download link channel. Discovery blocks when it is full.
    #[serde(default = "default_link_buffer")]
    pub link_buffer: usize,
    /// Log a SHA-256 of every saved file.
    #[serde(default)]
    pub verify_checksums: bool,
}

fn default_link_buffer() -> usize {
    1
}

impl Default for CabinetConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            output_dir: PathBuf::from("."),
            connect_timeout_secs: 15,
            request_timeout_secs: 300,
            user_agent: None,
            link_buffer: default_link_buffer(),
            verify_checksums: false,
        }
    }
}

impl CabinetConfig {
    /// `{output_dir}/{report}_{year}`.
    pub fn output_folder(&self, selection: &ReportSelection) -> PathBuf {
        self.output_dir.join(crate::url_model::report_folder_name(selection))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("cabinet")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CabinetConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] but for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<CabinetConfig> {
    if !path.exists() {
        let default_cfg = CabinetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: CabinetConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = CabinetConfig::default();
        assert_eq!(cfg.origin, DEFAULT_ORIGIN);
        assert_eq!(cfg.output_dir, PathBuf::from("."));
        assert_eq!(cfg.link_buffer, 1);
        assert!(!cfg.verify_checksums);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = CabinetConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: CabinetConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.origin, cfg.origin);
        assert_eq!(parsed.request_timeout_secs, cfg.request_timeout_secs);
        assert_eq!(parsed.link_buffer, cfg.link_buffer);
    }

    #[test]
    fn config_toml_optional_fields_default() {
        let toml = r#"
            origin = "http://127.0.0.1:8080"
            output_dir = "/srv/reports"
            connect_timeout_secs = 5
            request_timeout_secs = 60
        "#;
        let cfg: CabinetConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.origin, "http://127.0.0.1:8080");
        assert_eq!(cfg.connect_timeout_secs, 5);
        assert!(cfg.user_agent.is_none());
        assert_eq!(cfg.link_buffer, 1);
        assert!(!cfg.verify_checksums);
    }

    #[test]
    fn output_folder_is_report_underscore_year() {
        let cfg = CabinetConfig {
            output_dir: PathBuf::from("/tmp/out"),
            ..CabinetConfig::default()
        };
        let selection = ReportSelection::new("oo2", "2021");
        assert_eq!(selection.folder_name(), "oo2_2021");
        assert_eq!(cfg.output_folder(&selection), PathBuf::from("/tmp/out/oo2_2021"));
    }

    #[test]
    fn load_or_init_at_creates_then_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let created = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.origin, DEFAULT_ORIGIN);

        fs::write(
            &path,
            "origin = \"http://portal.test\"\noutput_dir = \"out\"\nconnect_timeout_secs = 1\nrequest_timeout_secs = 2\nverify_checksums = true\n",
        )
        .unwrap();
        let loaded = load_or_init_at(&path).unwrap();
        assert_eq!(loaded.origin, "http://portal.test");
        assert!(loaded.verify_checksums);
    }
}
