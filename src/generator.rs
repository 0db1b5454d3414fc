//! Configuration generation
//!
//! Resolves the platform, builds the template context from the settings,
//! switches off features the platform cannot express and renders the
//! platform template behind a comment header.
//!
//! ```
//! use chrono::NaiveDate;
//! use nacforge::generator::ConfigGenerator;
//! use nacforge::settings::DeploymentSettings;
//!
//! let mut settings = DeploymentSettings::default();
//! settings.radius.primary_server = "10.1.1.10".into();
//!
//! let config = ConfigGenerator::new(settings)
//!     .date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
//!     .generate()?;
//!
//! assert_eq!(config.filename, "cisco-ios-xe-dot1x-config-2024-03-01.txt");
//! assert!(config.content.contains("10.1.1.10"));
//! # Ok::<(), nacforge::generator::GeneratorError>(())
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::settings::{DeploymentSettings, HostMode, PolicyMode};
use crate::template::{Context, Template, TemplateError};
use crate::vendor::{self, Platform};

/// Errors raised while generating or writing a configuration
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("unknown platform '{platform}' for vendor '{vendor}'")]
    UnknownPlatform { vendor: String, platform: String },

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Builder for a single configuration render
#[derive(Debug, Clone)]
pub struct ConfigGenerator {
    settings: DeploymentSettings,
    date: Option<NaiveDate>,
    template: Option<Template>,
}

impl ConfigGenerator {
    pub fn new(settings: DeploymentSettings) -> Self {
        Self {
            settings,
            date: None,
            template: None,
        }
    }

    /// Date used in the header and filename (default: today)
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Render with a custom template instead of the platform's own
    pub fn template(mut self, template: Template) -> Self {
        self.template = Some(template);
        self
    }

    pub fn generate(&self) -> Result<GeneratedConfig> {
        let s = &self.settings;
        let (vendor, platform) =
            vendor::find(&s.vendor, &s.platform).ok_or_else(|| GeneratorError::UnknownPlatform {
                vendor: s.vendor.clone(),
                platform: s.platform.clone(),
            })?;
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());

        let mut context = s.to_context();
        context.insert("vendor", vendor.id);
        context.insert("platform", platform.id);
        if s.interfaces.trim().is_empty() {
            context.insert("interfaces", platform.default_interfaces);
        }
        let warnings = gate_features(s, platform, &mut context);

        let body = match self.template {
            Some(ref custom) => {
                debug!("rendering with custom template");
                custom.render(&context)
            }
            None => Template::parse(platform.template)?.render(&context),
        };

        let mut content = header(s, platform, date);
        content.push_str(&body);
        if !content.ends_with('\n') {
            content.push('\n');
        }

        let config = GeneratedConfig {
            vendor: vendor.id.to_string(),
            platform: platform.id.to_string(),
            filename: filename(vendor.id, platform.id, date),
            hash: sha256_hex(&content),
            content,
            warnings,
        };

        info!(
            vendor = %config.vendor,
            platform = %config.platform,
            bytes = config.content.len(),
            warnings = config.warnings.len(),
            "generated configuration"
        );
        Ok(config)
    }
}

/// A rendered configuration and its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedConfig {
    pub vendor: String,
    pub platform: String,
    pub content: String,

    /// `{vendor}-{platform}-dot1x-config-{YYYY-MM-DD}.txt`
    pub filename: String,

    /// SHA-256 of `content`, lowercase hex
    pub hash: String,

    /// Requested features the platform could not express
    pub warnings: Vec<String>,
}

impl GeneratedConfig {
    /// Where [`write`](Self::write) puts the file
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.filename)
    }

    /// Write the configuration into `dir`, creating it if needed
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|source| GeneratorError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = self.path_in(dir);
        fs::write(&path, &self.content).map_err(|source| GeneratorError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "wrote configuration");
        Ok(path)
    }

    /// Whether the file in `dir` has exactly this content
    ///
    /// A missing file counts as drift.
    pub fn matches_disk(&self, dir: &Path) -> Result<bool> {
        let path = self.path_in(dir);
        match fs::read(&path) {
            Ok(bytes) => Ok(sha256_hex(&bytes) == self.hash),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(GeneratorError::Io { path, source }),
        }
    }
}

/// Output filename for a vendor, platform and date
pub fn filename(vendor: &str, platform: &str, date: NaiveDate) -> String {
    format!("{}-{}-dot1x-config-{}.txt", vendor, platform, date.format("%Y-%m-%d"))
}

/// Most recent generated file for a vendor and platform in `dir`
///
/// Returns the path and the date encoded in its name.
pub fn latest_in(dir: &Path, vendor: &str, platform: &str) -> Result<Option<(PathBuf, NaiveDate)>> {
    let io_err = |source| GeneratorError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(e)),
    };

    let prefix = format!("{}-{}-dot1x-config-", vendor, platform);
    let mut latest: Option<(PathBuf, NaiveDate)> = None;
    for entry in entries {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name();
        let Some(date) = name
            .to_str()
            .and_then(|n| n.strip_prefix(&prefix))
            .and_then(|rest| rest.strip_suffix(".txt"))
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };
        if latest.as_ref().map_or(true, |(_, best)| date > *best) {
            latest = Some((entry.path(), date));
        }
    }
    Ok(latest)
}

pub(crate) fn sha256_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(data.as_ref()))
}

fn header(s: &DeploymentSettings, platform: &Platform, date: NaiveDate) -> String {
    let c = platform.comment;
    let mut lines = vec![
        format!("{} 802.1X / MAB configuration for {}", c, platform.name),
        format!("{} Generated by nacforge {} on {}", c, env!("CARGO_PKG_VERSION"), date),
    ];
    if let Some(ref hostname) = s.hostname {
        lines.push(format!("{} Device: {}", c, hostname));
    }
    lines.push(format!(
        "{} Method: {}, mode: {}, host mode: {}",
        c, s.auth.method, s.auth.mode, s.auth.host_mode
    ));
    lines.push(format!("{} Review before applying to production switches", c));
    lines.push(c.to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Switch off requested features the platform lacks
///
/// Returns one warning per feature switched off.
fn gate_features(s: &DeploymentSettings, platform: &Platform, ctx: &mut Context) -> Vec<String> {
    let caps = &platform.capabilities;
    let mut warnings = Vec::new();
    let mut off = |requested: bool, supported: bool, key: &str, what: &str| {
        if requested && !supported {
            ctx.insert(key, false);
            let message = format!("{} is not supported on {}; omitted", what, platform.name);
            warn!(platform = platform.id, "{}", message);
            warnings.push(message);
        }
    };

    off(
        s.auth.policy_mode == PolicyMode::Ibns2,
        caps.ibns2,
        "is_ibns2",
        "IBNS 2.0 policy syntax",
    );
    off(s.radius.radsec, caps.radsec, "radsec", "RadSec");
    off(s.radius.coa, caps.coa, "coa", "Change of Authorization");
    off(s.auth.dacl, caps.dacl, "dacl", "Downloadable ACLs");
    off(
        s.auth.critical_auth,
        caps.critical_auth,
        "critical_auth",
        "Critical authentication",
    );
    off(
        s.auth.device_tracking,
        caps.device_tracking,
        "device_tracking",
        "Device tracking",
    );
    off(s.tacacs.enabled, caps.tacacs, "tacacs", "TACACS+");
    off(
        s.auth.host_mode == HostMode::MultiDomain,
        caps.multi_domain,
        "is_multi_domain",
        "Multi-domain host mode",
    );

    // Multi-domain falls back to multi-auth so the port still gets a host mode
    if s.auth.host_mode == HostMode::MultiDomain && !caps.multi_domain {
        ctx.insert("is_multi_auth", true);
        ctx.insert("host_mode", HostMode::MultiAuth.id());
    }
    if !ctx.is_truthy("critical_auth") {
        ctx.remove("critical_vlan");
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::AuthMode;

    fn settings() -> DeploymentSettings {
        let mut s = DeploymentSettings::default();
        s.radius.primary_server = "10.1.1.10".into();
        s.radius.secondary_server = "10.1.1.11".into();
        s.radius.shared_secret = "Str0ng-Shared-Secret!".into();
        s.vlans.voice = Some(20);
        s.vlans.critical = Some(30);
        s
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = ConfigGenerator::new(settings()).date(day()).generate().unwrap();
        let b = ConfigGenerator::new(settings()).date(day()).generate().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hash.len(), 64);
    }

    #[test]
    fn test_filename_pattern() {
        let mut s = settings();
        s.vendor = "Juniper".into();
        s.platform = "JUNOS".into();
        let config = ConfigGenerator::new(s).date(day()).generate().unwrap();
        assert_eq!(config.filename, "juniper-junos-dot1x-config-2024-03-01.txt");
    }

    #[test]
    fn test_header_uses_platform_comment() {
        let mut s = settings();
        s.vendor = "aruba".into();
        s.platform = "aos-switch".into();
        s.hostname = Some("edge-sw1".into());
        let config = ConfigGenerator::new(s).date(day()).generate().unwrap();
        let first = config.content.lines().next().unwrap();
        assert_eq!(
            first,
            "; 802.1X / MAB configuration for Aruba AOS-Switch (ProVision)"
        );
        assert!(config.content.contains("; Device: edge-sw1"));
    }

    #[test]
    fn test_unknown_platform() {
        let mut s = settings();
        s.platform = "eos".into();
        let err = ConfigGenerator::new(s).generate().unwrap_err();
        assert!(matches!(err, GeneratorError::UnknownPlatform { .. }));
    }

    #[test]
    fn test_platform_default_interfaces() {
        let config = ConfigGenerator::new(settings()).date(day()).generate().unwrap();
        assert!(config.content.contains("GigabitEthernet1/0/1-48"));

        let mut s = settings();
        s.interfaces = "GigabitEthernet2/0/1-24".into();
        let config = ConfigGenerator::new(s).date(day()).generate().unwrap();
        assert!(config.content.contains("GigabitEthernet2/0/1-24"));
    }

    #[test]
    fn test_unsupported_features_are_gated() {
        let mut s = settings();
        s.platform = "ios".into();
        s.auth.policy_mode = PolicyMode::Ibns2;
        s.radius.radsec = true;

        let config = ConfigGenerator::new(s).date(day()).generate().unwrap();
        assert_eq!(config.warnings.len(), 2);
        assert!(config.warnings[0].contains("IBNS 2.0"));
        assert!(config.warnings[1].contains("RadSec"));
        assert!(!config.content.contains("policy-map type control subscriber"));
    }

    #[test]
    fn test_supported_features_render() {
        let mut s = settings();
        s.auth.policy_mode = PolicyMode::Ibns2;
        s.auth.mode = AuthMode::Closed;

        let config = ConfigGenerator::new(s).date(day()).generate().unwrap();
        assert!(config.warnings.is_empty());
        assert!(config.content.contains("policy-map type control subscriber"));
    }

    #[test]
    fn test_custom_template() {
        let template = Template::parse("radius {{primary_server}} on {{interfaces}}\n").unwrap();
        let config = ConfigGenerator::new(settings())
            .date(day())
            .template(template)
            .generate()
            .unwrap();
        assert!(config
            .content
            .ends_with("radius 10.1.1.10 on GigabitEthernet1/0/1-48\n"));
    }

    #[test]
    fn test_write_and_drift() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigGenerator::new(settings()).date(day()).generate().unwrap();

        assert!(!config.matches_disk(dir.path()).unwrap());
        let path = config.write(dir.path()).unwrap();
        assert!(path.ends_with(&config.filename));
        assert!(config.matches_disk(dir.path()).unwrap());

        fs::write(&path, "hand edited\n").unwrap();
        assert!(!config.matches_disk(dir.path()).unwrap());
    }

    #[test]
    fn test_latest_in_picks_newest_date() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "cisco-ios-xe-dot1x-config-2024-01-05.txt",
            "cisco-ios-xe-dot1x-config-2024-02-01.txt",
            "cisco-ios-dot1x-config-2025-01-01.txt",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), "x").unwrap();
        }

        let (path, date) = latest_in(dir.path(), "cisco", "ios-xe").unwrap().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert!(path.ends_with("cisco-ios-xe-dot1x-config-2024-02-01.txt"));

        assert!(latest_in(&dir.path().join("missing"), "cisco", "ios-xe")
            .unwrap()
            .is_none());
    }
}
