//! Deployment settings
//!
//! [`DeploymentSettings`] is the one value that flows through every step:
//! the question schema produces it, the generator renders it and the
//! compliance engine scores it. Every field has a default, so a partially
//! filled `nacforge.toml` still loads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parse::normalize_id;
use crate::template::Context;

/// Implements string conversions shared by the settings enums
///
/// The enum provides `parse(&str) -> Option<Self>` and `id(&self) -> &'static str`.
macro_rules! id_enum {
    ($ty:ident, $what:literal) => {
        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s).ok_or_else(|| Error::InvalidSetting {
                    field: $what,
                    value: s.to_string(),
                })
            }
        }

        impl TryFrom<String> for $ty {
            type Error = Error;

            fn try_from(s: String) -> Result<Self> {
                s.parse()
            }
        }

        impl From<$ty> for String {
            fn from(v: $ty) -> Self {
                v.id().to_string()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.id())
            }
        }
    };
}

/// Which authentication methods run on access ports, and in what order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AuthMethod {
    /// 802.1X only
    Dot1x,
    /// MAC Authentication Bypass only
    Mab,
    /// 802.1X first, MAB as fallback
    #[default]
    Dot1xThenMab,
    /// MAB first, 802.1X afterwards
    MabThenDot1x,
}

impl AuthMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_id(s).as_str() {
            "dot1x" | "8021x" => Some(Self::Dot1x),
            "mab" => Some(Self::Mab),
            "dot1xmab" | "8021xmab" | "dot1xthenmab" => Some(Self::Dot1xThenMab),
            "mabdot1x" | "mab8021x" | "mabthendot1x" => Some(Self::MabThenDot1x),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Dot1x => "dot1x",
            Self::Mab => "mab",
            Self::Dot1xThenMab => "dot1x-mab",
            Self::MabThenDot1x => "mab-dot1x",
        }
    }

    pub fn uses_dot1x(&self) -> bool {
        !matches!(self, Self::Mab)
    }

    pub fn uses_mab(&self) -> bool {
        !matches!(self, Self::Dot1x)
    }

    pub fn all() -> &'static [Self] {
        &[Self::Dot1x, Self::Mab, Self::Dot1xThenMab, Self::MabThenDot1x]
    }
}

id_enum!(AuthMethod, "auth.method");

/// Enforcement stage of the rollout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AuthMode {
    /// Open access, authentication results only logged
    Monitor,
    /// Pre-auth ACL limits traffic until authentication succeeds
    #[default]
    LowImpact,
    /// No traffic until authenticated
    Closed,
}

impl AuthMode {
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_id(s).as_str() {
            "monitor" | "open" | "monitormode" => Some(Self::Monitor),
            "lowimpact" | "low" => Some(Self::LowImpact),
            "closed" | "closedmode" => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Monitor => "monitor",
            Self::LowImpact => "low-impact",
            Self::Closed => "closed",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Monitor, Self::LowImpact, Self::Closed]
    }
}

id_enum!(AuthMode, "auth.mode");

/// How many endpoints may authenticate on one port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HostMode {
    SingleHost,
    /// First endpoint authenticates, everyone else rides along
    MultiHost,
    #[default]
    MultiAuth,
    /// One data and one voice endpoint
    MultiDomain,
}

impl HostMode {
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_id(s).as_str() {
            "singlehost" | "single" => Some(Self::SingleHost),
            "multihost" => Some(Self::MultiHost),
            "multiauth" | "multi" => Some(Self::MultiAuth),
            "multidomain" | "mda" => Some(Self::MultiDomain),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::SingleHost => "single-host",
            Self::MultiHost => "multi-host",
            Self::MultiAuth => "multi-auth",
            Self::MultiDomain => "multi-domain",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::SingleHost,
            Self::MultiHost,
            Self::MultiAuth,
            Self::MultiDomain,
        ]
    }
}

id_enum!(HostMode, "auth.host_mode");

/// Access-session policy syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PolicyMode {
    /// Legacy `authentication ...` interface commands
    #[default]
    Classic,
    /// Cisco IBNS 2.0 class-map / policy-map access sessions
    Ibns2,
}

impl PolicyMode {
    /// `ibns2` and `ibns2.0` spellings both resolve to [`PolicyMode::Ibns2`]
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_id(s).as_str() {
            "classic" | "legacy" | "ibns1" => Some(Self::Classic),
            "ibns2" | "ibns20" | "ibnsv2" | "cpl" => Some(Self::Ibns2),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Ibns2 => "ibns2",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Classic, Self::Ibns2]
    }
}

id_enum!(PolicyMode, "auth.policy_mode");

/// Complete deployment description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentSettings {
    /// Vendor id from the catalog (e.g., "cisco", "aruba", "juniper")
    pub vendor: String,

    /// Platform id within the vendor (e.g., "ios-xe", "aos-cx", "junos")
    pub platform: String,

    /// Optional device hostname, used in the output header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Access port range in the platform's interface syntax; empty selects
    /// the platform default
    pub interfaces: String,

    pub radius: RadiusSettings,
    pub tacacs: TacacsSettings,
    pub auth: AuthSettings,
    pub vlans: VlanSettings,
}

impl Default for DeploymentSettings {
    fn default() -> Self {
        Self {
            vendor: "cisco".to_string(),
            platform: "ios-xe".to_string(),
            hostname: None,
            interfaces: String::new(),
            radius: RadiusSettings::default(),
            tacacs: TacacsSettings::default(),
            auth: AuthSettings::default(),
            vlans: VlanSettings::default(),
        }
    }
}

/// RADIUS server group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiusSettings {
    /// Primary server address; empty when not configured
    pub primary_server: String,

    /// Secondary server address; empty when not configured
    pub secondary_server: String,

    pub shared_secret: String,
    pub auth_port: u16,
    pub acct_port: u16,
    pub group_name: String,
    pub timeout_secs: u32,
    pub retransmit: u32,

    /// Minutes a non-responding server is skipped
    pub deadtime_mins: u32,

    pub accounting: bool,

    /// Change of Authorization (RFC 5176)
    pub coa: bool,
    pub coa_port: u16,

    /// RADIUS over TLS
    pub radsec: bool,
}

impl Default for RadiusSettings {
    fn default() -> Self {
        Self {
            primary_server: String::new(),
            secondary_server: String::new(),
            shared_secret: String::new(),
            auth_port: 1812,
            acct_port: 1813,
            group_name: "RADIUS-SERVERS".to_string(),
            timeout_secs: 5,
            retransmit: 3,
            deadtime_mins: 15,
            accounting: true,
            coa: true,
            coa_port: 3799,
            radsec: false,
        }
    }
}

impl RadiusSettings {
    pub fn has_primary(&self) -> bool {
        !self.primary_server.trim().is_empty()
    }

    pub fn has_secondary(&self) -> bool {
        !self.secondary_server.trim().is_empty()
    }
}

/// TACACS+ for device administration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacacsSettings {
    pub enabled: bool,
    pub primary_server: String,
    pub secondary_server: String,
    pub shared_secret: String,
    pub group_name: String,
}

impl Default for TacacsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            primary_server: String::new(),
            secondary_server: String::new(),
            shared_secret: String::new(),
            group_name: "TACACS-SERVERS".to_string(),
        }
    }
}

/// Port authentication behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub method: AuthMethod,
    pub mode: AuthMode,
    pub host_mode: HostMode,
    pub policy_mode: PolicyMode,
    pub reauth_enabled: bool,

    /// Seconds between periodic reauthentication
    pub reauth_period: u32,

    /// Seconds between EAPOL identity requests
    pub tx_period: u32,
    pub max_reauth_req: u32,

    /// Seconds a port stays quiet after a failed attempt
    pub quiet_period: u32,

    /// Authorize endpoints into the critical VLAN when all servers are dead
    pub critical_auth: bool,

    /// Accept downloadable ACLs from the RADIUS server
    pub dacl: bool,
    pub device_tracking: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            method: AuthMethod::default(),
            mode: AuthMode::default(),
            host_mode: HostMode::default(),
            policy_mode: PolicyMode::default(),
            reauth_enabled: true,
            reauth_period: 3600,
            tx_period: 10,
            max_reauth_req: 2,
            quiet_period: 60,
            critical_auth: true,
            dacl: false,
            device_tracking: true,
        }
    }
}

/// VLAN assignments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VlanSettings {
    pub data: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_fail: Option<u16>,
}

impl Default for VlanSettings {
    fn default() -> Self {
        Self {
            data: 10,
            voice: None,
            guest: None,
            critical: None,
            auth_fail: None,
        }
    }
}

impl VlanSettings {
    /// Every configured VLAN with its role name
    pub fn assigned(&self) -> Vec<(&'static str, u16)> {
        let mut out = vec![("data", self.data)];
        let optional = [
            ("voice", self.voice),
            ("guest", self.guest),
            ("critical", self.critical),
            ("auth_fail", self.auth_fail),
        ];
        out.extend(optional.into_iter().filter_map(|(role, id)| id.map(|v| (role, v))));
        out
    }
}

impl DeploymentSettings {
    /// Parse from TOML
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Parse {
            format: "TOML",
            message: e.to_string(),
        })
    }

    /// Parse from JSON
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Parse {
            format: "JSON",
            message: e.to_string(),
        })
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Serialize(e.to_string()))
    }

    /// Flatten into template values
    ///
    /// Alongside the raw fields this adds derived flags (`has_secondary`,
    /// `use_mab`, `is_closed`, ...) so templates never need comparisons.
    pub fn to_context(&self) -> Context {
        let mut ctx = Context::new();
        let r = &self.radius;
        let t = &self.tacacs;
        let a = &self.auth;
        let v = &self.vlans;

        ctx.insert("vendor", self.vendor.as_str());
        ctx.insert("platform", self.platform.as_str());
        ctx.insert_opt("hostname", self.hostname.clone());
        ctx.insert("interfaces", self.interfaces.as_str());

        // RADIUS
        ctx.insert("radius_group", r.group_name.as_str());
        ctx.insert("primary_server", r.primary_server.trim());
        ctx.insert("secondary_server", r.secondary_server.trim());
        ctx.insert("has_primary", r.has_primary());
        ctx.insert("has_secondary", r.has_secondary());
        ctx.insert("shared_secret", r.shared_secret.as_str());
        ctx.insert("auth_port", r.auth_port);
        ctx.insert("acct_port", r.acct_port);
        ctx.insert("radius_timeout", r.timeout_secs);
        ctx.insert("retransmit", r.retransmit);
        ctx.insert("deadtime", r.deadtime_mins);
        ctx.insert("accounting", r.accounting);
        ctx.insert("coa", r.coa);
        ctx.insert("coa_port", r.coa_port);
        ctx.insert("radsec", r.radsec);
        ctx.insert("radius_servers", self.radius_server_list());

        // TACACS+
        ctx.insert("tacacs", t.enabled);
        ctx.insert("tacacs_group", t.group_name.as_str());
        ctx.insert("tacacs_primary", t.primary_server.trim());
        ctx.insert("tacacs_secondary", t.secondary_server.trim());
        ctx.insert("tacacs_secret", t.shared_secret.as_str());

        // Authentication
        ctx.insert("method", a.method.id());
        ctx.insert("use_dot1x", a.method.uses_dot1x());
        ctx.insert("use_mab", a.method.uses_mab());
        ctx.insert("dot1x_only", a.method == AuthMethod::Dot1x);
        ctx.insert("mab_only", a.method == AuthMethod::Mab);
        ctx.insert("mab_first", a.method == AuthMethod::MabThenDot1x);
        ctx.insert("both_methods", a.method.uses_dot1x() && a.method.uses_mab());
        ctx.insert("mode", a.mode.id());
        ctx.insert("is_monitor", a.mode == AuthMode::Monitor);
        ctx.insert("is_low_impact", a.mode == AuthMode::LowImpact);
        ctx.insert("is_closed", a.mode == AuthMode::Closed);
        ctx.insert("host_mode", a.host_mode.id());
        ctx.insert("is_single_host", a.host_mode == HostMode::SingleHost);
        ctx.insert("is_multi_host", a.host_mode == HostMode::MultiHost);
        ctx.insert("is_multi_auth", a.host_mode == HostMode::MultiAuth);
        ctx.insert("is_multi_domain", a.host_mode == HostMode::MultiDomain);
        ctx.insert("is_ibns2", a.policy_mode == PolicyMode::Ibns2);
        ctx.insert("reauth", a.reauth_enabled);
        ctx.insert("reauth_period", a.reauth_period);
        ctx.insert("tx_period", a.tx_period);
        ctx.insert("max_reauth_req", a.max_reauth_req);
        ctx.insert("quiet_period", a.quiet_period);
        ctx.insert("critical_auth", a.critical_auth);
        ctx.insert("dacl", a.dacl);
        ctx.insert("device_tracking", a.device_tracking);

        // VLANs
        ctx.insert("data_vlan", v.data);
        ctx.insert_opt("voice_vlan", v.voice);
        ctx.insert_opt("guest_vlan", v.guest);
        ctx.insert_opt("critical_vlan", v.critical);
        ctx.insert_opt("auth_fail_vlan", v.auth_fail);

        ctx
    }

    fn radius_server_list(&self) -> Vec<Context> {
        let r = &self.radius;
        [
            ("RADIUS-PRIMARY", r.primary_server.trim(), 1i64),
            ("RADIUS-SECONDARY", r.secondary_server.trim(), 2i64),
        ]
        .into_iter()
        .filter(|(_, ip, _)| !ip.is_empty())
        .map(|(name, ip, priority)| {
            Context::new()
                .with("server_name", name)
                .with("server_ip", ip)
                .with("priority", priority)
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Value;

    #[test]
    fn test_defaults() {
        let s = DeploymentSettings::default();
        assert_eq!(s.vendor, "cisco");
        assert_eq!(s.radius.auth_port, 1812);
        assert_eq!(s.radius.acct_port, 1813);
        assert_eq!(s.auth.reauth_period, 3600);
        assert_eq!(s.auth.method, AuthMethod::Dot1xThenMab);
        assert!(!s.radius.has_primary());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let s = DeploymentSettings::from_toml(
            r#"
vendor = "aruba"
platform = "aos-cx"

[radius]
primary_server = "10.1.1.10"

[auth]
policy_mode = "ibns2.0"
reauth_period = 7200
"#,
        )
        .unwrap();

        assert_eq!(s.vendor, "aruba");
        assert_eq!(s.radius.primary_server, "10.1.1.10");
        assert_eq!(s.radius.auth_port, 1812);
        assert_eq!(s.auth.policy_mode, PolicyMode::Ibns2);
        assert_eq!(s.auth.reauth_period, 7200);
        assert_eq!(s.vlans.data, 10);
    }

    #[test]
    fn test_invalid_enum_is_rejected() {
        let err = DeploymentSettings::from_toml("[auth]\nmode = \"sometimes\"\n").unwrap_err();
        assert!(err.to_string().contains("sometimes"));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut s = DeploymentSettings::default();
        s.radius.primary_server = "10.1.1.10".into();
        s.vlans.voice = Some(20);
        s.hostname = Some("access-sw1".into());

        let toml = s.to_toml().unwrap();
        assert_eq!(DeploymentSettings::from_toml(&toml).unwrap(), s);
    }

    #[test]
    fn test_json_input() {
        let s = DeploymentSettings::from_json(
            r#"{"vendor":"juniper","platform":"junos","auth":{"method":"mab"}}"#,
        )
        .unwrap();
        assert_eq!(s.auth.method, AuthMethod::Mab);
    }

    #[test]
    fn test_policy_mode_spellings() {
        for s in ["ibns2", "ibns2.0", "IBNS 2.0", "ibns-2.0"] {
            assert_eq!(PolicyMode::parse(s), Some(PolicyMode::Ibns2), "{}", s);
        }
        assert_eq!(PolicyMode::parse("classic"), Some(PolicyMode::Classic));
        assert_eq!(PolicyMode::parse("ibns3"), None);
    }

    #[test]
    fn test_enum_ids_parse_back() {
        for m in AuthMethod::all() {
            assert_eq!(AuthMethod::parse(m.id()), Some(*m));
        }
        for m in AuthMode::all() {
            assert_eq!(AuthMode::parse(m.id()), Some(*m));
        }
        for m in HostMode::all() {
            assert_eq!(HostMode::parse(m.id()), Some(*m));
        }
    }

    #[test]
    fn test_context_derived_flags() {
        let mut s = DeploymentSettings::default();
        s.radius.primary_server = " 10.1.1.10 ".into();
        s.auth.method = AuthMethod::MabThenDot1x;
        s.auth.mode = AuthMode::Closed;

        let ctx = s.to_context();
        assert_eq!(ctx.get("primary_server"), Some(&Value::from("10.1.1.10")));
        assert!(ctx.is_truthy("has_primary"));
        assert!(!ctx.is_truthy("has_secondary"));
        assert!(ctx.is_truthy("mab_first"));
        assert!(ctx.is_truthy("both_methods"));
        assert!(ctx.is_truthy("is_closed"));
        assert!(!ctx.is_truthy("is_monitor"));
        assert!(ctx.get("voice_vlan").is_none());
    }

    #[test]
    fn test_context_server_list_skips_empty() {
        let mut s = DeploymentSettings::default();
        s.radius.primary_server = "10.1.1.10".into();
        let ctx = s.to_context();
        match ctx.get("radius_servers") {
            Some(Value::List(items)) => assert_eq!(items.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_assigned_vlans() {
        let mut v = VlanSettings::default();
        v.guest = Some(999);
        assert_eq!(v.assigned(), vec![("data", 10), ("guest", 999)]);
    }
}
