//! Built-in rule table

use super::{Category, Rule, Severity};
use crate::settings::{AuthMethod, AuthMode, DeploymentSettings, HostMode, PolicyMode};
use crate::vendor::Capabilities;

/// Secrets that appear in vendor documentation and lab guides
const WELL_KNOWN_SECRETS: &[&str] = &[
    "cisco",
    "aruba",
    "juniper",
    "secret",
    "radius",
    "password",
    "testing123",
    "changeme",
    "default",
    "admin",
];

const MIN_SECRET_LEN: usize = 16;
const MIN_REAUTH_SECS: u32 = 300;
const MAX_REAUTH_SECS: u32 = 86_400;

/// Seconds before a dead primary fails over
const MAX_FAILOVER_SECS: u32 = 30;

pub static RULES: &[Rule] = &[
    // RADIUS
    Rule {
        id: "radius-primary",
        title: "Primary RADIUS server",
        category: Category::Radius,
        severity: Severity::Critical,
        deduction: 30,
        check: radius_primary,
    },
    Rule {
        id: "radius-secondary",
        title: "Redundant RADIUS server",
        category: Category::Radius,
        severity: Severity::Warning,
        deduction: 10,
        check: radius_secondary,
    },
    Rule {
        id: "radius-secret-missing",
        title: "RADIUS shared secret set",
        category: Category::Radius,
        severity: Severity::Critical,
        deduction: 25,
        check: radius_secret_missing,
    },
    Rule {
        id: "radius-secret-common",
        title: "RADIUS shared secret not a known default",
        category: Category::Radius,
        severity: Severity::Critical,
        deduction: 20,
        check: radius_secret_common,
    },
    Rule {
        id: "radius-secret-length",
        title: "RADIUS shared secret length",
        category: Category::Radius,
        severity: Severity::Warning,
        deduction: 10,
        check: radius_secret_length,
    },
    Rule {
        id: "radius-accounting",
        title: "RADIUS accounting",
        category: Category::Radius,
        severity: Severity::Warning,
        deduction: 5,
        check: radius_accounting,
    },
    Rule {
        id: "radius-coa",
        title: "Change of Authorization",
        category: Category::Radius,
        severity: Severity::Warning,
        deduction: 5,
        check: radius_coa,
    },
    Rule {
        id: "radius-failover",
        title: "RADIUS failover time",
        category: Category::Radius,
        severity: Severity::Recommendation,
        deduction: 2,
        check: radius_failover,
    },
    Rule {
        id: "radius-deadtime",
        title: "RADIUS dead time",
        category: Category::Radius,
        severity: Severity::Recommendation,
        deduction: 2,
        check: radius_deadtime,
    },
    Rule {
        id: "radius-radsec",
        title: "RADIUS over TLS",
        category: Category::Radius,
        severity: Severity::Recommendation,
        deduction: 3,
        check: radius_radsec,
    },
    // Authentication
    Rule {
        id: "auth-monitor-mode",
        title: "Access enforcement",
        category: Category::Authentication,
        severity: Severity::Warning,
        deduction: 10,
        check: auth_monitor_mode,
    },
    Rule {
        id: "auth-multi-host",
        title: "Per-endpoint authentication",
        category: Category::Authentication,
        severity: Severity::Warning,
        deduction: 10,
        check: auth_multi_host,
    },
    Rule {
        id: "auth-mab-only",
        title: "802.1X in use",
        category: Category::Authentication,
        severity: Severity::Warning,
        deduction: 8,
        check: auth_mab_only,
    },
    Rule {
        id: "auth-mab-first",
        title: "Authentication order",
        category: Category::Authentication,
        severity: Severity::Recommendation,
        deduction: 3,
        check: auth_mab_first,
    },
    Rule {
        id: "auth-reauth-short",
        title: "Reauthentication period lower bound",
        category: Category::Authentication,
        severity: Severity::Warning,
        deduction: 10,
        check: auth_reauth_short,
    },
    Rule {
        id: "auth-reauth-long",
        title: "Reauthentication period upper bound",
        category: Category::Authentication,
        severity: Severity::Recommendation,
        deduction: 3,
        check: auth_reauth_long,
    },
    Rule {
        id: "auth-reauth-disabled",
        title: "Periodic reauthentication",
        category: Category::Authentication,
        severity: Severity::Recommendation,
        deduction: 5,
        check: auth_reauth_disabled,
    },
    Rule {
        id: "auth-critical",
        title: "Critical authentication",
        category: Category::Authentication,
        severity: Severity::Warning,
        deduction: 8,
        check: auth_critical,
    },
    Rule {
        id: "auth-device-tracking",
        title: "Device tracking",
        category: Category::Authentication,
        severity: Severity::Recommendation,
        deduction: 3,
        check: auth_device_tracking,
    },
    Rule {
        id: "auth-dacl",
        title: "Downloadable ACLs",
        category: Category::Authentication,
        severity: Severity::Recommendation,
        deduction: 2,
        check: auth_dacl,
    },
    Rule {
        id: "auth-ibns2",
        title: "IBNS 2.0 policy syntax",
        category: Category::Authentication,
        severity: Severity::Recommendation,
        deduction: 3,
        check: auth_ibns2,
    },
    // VLANs
    Rule {
        id: "vlan-range",
        title: "VLAN ids in range",
        category: Category::Vlan,
        severity: Severity::Critical,
        deduction: 20,
        check: vlan_range,
    },
    Rule {
        id: "vlan-default",
        title: "Default VLAN avoided",
        category: Category::Vlan,
        severity: Severity::Warning,
        deduction: 10,
        check: vlan_default,
    },
    Rule {
        id: "vlan-voice-separate",
        title: "Voice VLAN separation",
        category: Category::Vlan,
        severity: Severity::Warning,
        deduction: 10,
        check: vlan_voice_separate,
    },
    Rule {
        id: "vlan-guest-separate",
        title: "Guest VLAN separation",
        category: Category::Vlan,
        severity: Severity::Warning,
        deduction: 10,
        check: vlan_guest_separate,
    },
    Rule {
        id: "vlan-critical",
        title: "Critical VLAN",
        category: Category::Vlan,
        severity: Severity::Warning,
        deduction: 5,
        check: vlan_critical,
    },
    Rule {
        id: "vlan-guest",
        title: "Guest VLAN",
        category: Category::Vlan,
        severity: Severity::Recommendation,
        deduction: 3,
        check: vlan_guest,
    },
    // Administration
    Rule {
        id: "admin-tacacs-server",
        title: "TACACS+ server",
        category: Category::Administration,
        severity: Severity::Critical,
        deduction: 20,
        check: admin_tacacs_server,
    },
    Rule {
        id: "admin-tacacs-secret",
        title: "TACACS+ key",
        category: Category::Administration,
        severity: Severity::Warning,
        deduction: 10,
        check: admin_tacacs_secret,
    },
    Rule {
        id: "admin-tacacs",
        title: "Centralised device administration",
        category: Category::Administration,
        severity: Severity::Recommendation,
        deduction: 5,
        check: admin_tacacs,
    },
    // Platform
    Rule {
        id: "platform-unsupported",
        title: "Requested features supported",
        category: Category::Platform,
        severity: Severity::Warning,
        deduction: 5,
        check: platform_unsupported,
    },
];

fn radius_primary(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (!s.radius.has_primary()).then(|| "No primary RADIUS server configured".to_string())
}

fn radius_secondary(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (!s.radius.has_secondary()).then(|| {
        "No secondary RADIUS server configured; authentication stops if the primary fails"
            .to_string()
    })
}

fn radius_secret_missing(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    // RadSec authenticates with certificates
    (s.radius.shared_secret.is_empty() && !s.radius.radsec)
        .then(|| "RADIUS shared secret is empty".to_string())
}

fn radius_secret_common(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    let secret = s.radius.shared_secret.to_lowercase();
    WELL_KNOWN_SECRETS
        .contains(&secret.as_str())
        .then(|| "RADIUS shared secret is a well-known default".to_string())
}

fn radius_secret_length(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    let len = s.radius.shared_secret.chars().count();
    (len > 0 && len < MIN_SECRET_LEN).then(|| {
        format!(
            "RADIUS shared secret is {} characters; use at least {}",
            len, MIN_SECRET_LEN
        )
    })
}

fn radius_accounting(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (!s.radius.accounting)
        .then(|| "RADIUS accounting is disabled; session history will be missing".to_string())
}

fn radius_coa(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (!s.radius.coa).then(|| {
        "Change of Authorization is disabled; policy changes need a port bounce".to_string()
    })
}

fn radius_failover(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    let worst = s
        .radius
        .timeout_secs
        .saturating_mul(s.radius.retransmit.saturating_add(1));
    (worst > MAX_FAILOVER_SECS).then(|| {
        format!(
            "A dead RADIUS server takes {}s to detect; keep timeout x attempts within {}s",
            worst, MAX_FAILOVER_SECS
        )
    })
}

fn radius_deadtime(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (s.radius.deadtime_mins == 0 && s.radius.has_secondary()).then(|| {
        "Dead time is 0; an unreachable server is retried on every request".to_string()
    })
}

fn radius_radsec(s: &DeploymentSettings, caps: &Capabilities) -> Option<String> {
    (caps.radsec && !s.radius.radsec)
        .then(|| "Platform supports RadSec; consider RADIUS over TLS".to_string())
}

fn auth_monitor_mode(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (s.auth.mode == AuthMode::Monitor)
        .then(|| "Monitor mode does not enforce access for unauthenticated endpoints".to_string())
}

fn auth_multi_host(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (s.auth.host_mode == HostMode::MultiHost).then(|| {
        "Multi-host mode lets further devices share the first authenticated session".to_string()
    })
}

fn auth_mab_only(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (s.auth.method == AuthMethod::Mab)
        .then(|| "MAB only relies on MAC addresses, which are easily spoofed".to_string())
}

fn auth_mab_first(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (s.auth.method == AuthMethod::MabThenDot1x).then(|| {
        "MAB runs before 802.1X; supplicant-capable endpoints may be authorized by MAC".to_string()
    })
}

fn auth_reauth_short(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (s.auth.reauth_enabled && s.auth.reauth_period < MIN_REAUTH_SECS).then(|| {
        format!(
            "Reauthentication period of {}s is less than {} seconds and will load the RADIUS servers",
            s.auth.reauth_period, MIN_REAUTH_SECS
        )
    })
}

fn auth_reauth_long(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (s.auth.reauth_enabled && s.auth.reauth_period > MAX_REAUTH_SECS).then(|| {
        format!(
            "Reauthentication period of {}s exceeds 24 hours",
            s.auth.reauth_period
        )
    })
}

fn auth_reauth_disabled(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (!s.auth.reauth_enabled).then(|| "Periodic reauthentication is disabled".to_string())
}

fn auth_critical(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (!s.auth.critical_auth && s.auth.mode != AuthMode::Monitor).then(|| {
        "Critical authentication is disabled; a RADIUS outage blocks every port".to_string()
    })
}

fn auth_device_tracking(s: &DeploymentSettings, caps: &Capabilities) -> Option<String> {
    (caps.device_tracking && !s.auth.device_tracking).then(|| {
        "Device tracking is disabled; endpoint IP addresses will not reach the RADIUS server"
            .to_string()
    })
}

fn auth_dacl(s: &DeploymentSettings, caps: &Capabilities) -> Option<String> {
    (caps.dacl && !s.auth.dacl && s.auth.mode != AuthMode::Monitor)
        .then(|| "Downloadable ACLs are available but not enabled".to_string())
}

fn auth_ibns2(s: &DeploymentSettings, caps: &Capabilities) -> Option<String> {
    (caps.ibns2 && s.auth.policy_mode == PolicyMode::Classic)
        .then(|| "Platform supports IBNS 2.0 policy maps; classic commands are deprecated".to_string())
}

fn vlan_range(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    let bad: Vec<_> = s
        .vlans
        .assigned()
        .into_iter()
        .filter(|(_, id)| !(1..=4094).contains(id))
        .map(|(role, id)| format!("{} VLAN {}", role, id))
        .collect();
    (!bad.is_empty()).then(|| format!("VLAN ids must be 1-4094: {}", bad.join(", ")))
}

fn vlan_default(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    let roles: Vec<_> = s
        .vlans
        .assigned()
        .into_iter()
        .filter(|(_, id)| *id == 1)
        .map(|(role, _)| role)
        .collect();
    (!roles.is_empty()).then(|| format!("Default VLAN 1 used for: {}", roles.join(", ")))
}

fn vlan_voice_separate(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (s.vlans.voice == Some(s.vlans.data))
        .then(|| format!("Voice and data traffic share VLAN {}", s.vlans.data))
}

fn vlan_guest_separate(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (s.vlans.guest == Some(s.vlans.data))
        .then(|| format!("Guest and data traffic share VLAN {}", s.vlans.data))
}

fn vlan_critical(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (s.auth.critical_auth && s.vlans.critical.is_none()).then(|| {
        "Critical authentication is enabled without a critical VLAN; the data VLAN is used"
            .to_string()
    })
}

fn vlan_guest(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (s.auth.method.uses_dot1x() && s.vlans.guest.is_none())
        .then(|| "No guest VLAN for endpoints without an 802.1X supplicant".to_string())
}

fn admin_tacacs_server(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (s.tacacs.enabled && s.tacacs.primary_server.trim().is_empty())
        .then(|| "TACACS+ is enabled but no server is configured".to_string())
}

fn admin_tacacs_secret(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (s.tacacs.enabled && s.tacacs.shared_secret.is_empty())
        .then(|| "TACACS+ key is empty".to_string())
}

fn admin_tacacs(s: &DeploymentSettings, _: &Capabilities) -> Option<String> {
    (!s.tacacs.enabled)
        .then(|| "Device administration is not authenticated against TACACS+".to_string())
}

fn platform_unsupported(s: &DeploymentSettings, caps: &Capabilities) -> Option<String> {
    let requested = [
        (s.auth.policy_mode == PolicyMode::Ibns2, caps.ibns2, "IBNS 2.0"),
        (s.radius.radsec, caps.radsec, "RadSec"),
        (s.radius.coa, caps.coa, "CoA"),
        (s.auth.dacl, caps.dacl, "dACL"),
        (s.auth.critical_auth, caps.critical_auth, "critical authentication"),
        (s.auth.device_tracking, caps.device_tracking, "device tracking"),
        (s.tacacs.enabled, caps.tacacs, "TACACS+"),
        (s.auth.host_mode == HostMode::MultiDomain, caps.multi_domain, "multi-domain"),
    ];
    let missing: Vec<_> = requested
        .iter()
        .filter(|(wanted, supported, _)| *wanted && !*supported)
        .map(|(_, _, name)| *name)
        .collect();
    (!missing.is_empty()).then(|| {
        format!(
            "Platform cannot express: {}; these will be omitted from the configuration",
            missing.join(", ")
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_checks() {
        let caps = Capabilities::ALL;
        let mut s = DeploymentSettings::default();
        assert!(radius_secret_missing(&s, &caps).is_some());
        assert!(radius_secret_length(&s, &caps).is_none());

        s.radius.radsec = true;
        assert!(radius_secret_missing(&s, &caps).is_none());

        s.radius.shared_secret = "TESTING123".into();
        assert!(radius_secret_common(&s, &caps).is_some());
        assert!(radius_secret_length(&s, &caps)
            .unwrap()
            .contains("10 characters"));
    }

    #[test]
    fn test_failover_time() {
        let caps = Capabilities::ALL;
        let mut s = DeploymentSettings::default();
        assert!(radius_failover(&s, &caps).is_none());

        s.radius.timeout_secs = 10;
        s.radius.retransmit = 3;
        assert!(radius_failover(&s, &caps).unwrap().contains("40s"));
    }

    #[test]
    fn test_vlan_checks_name_roles() {
        let caps = Capabilities::ALL;
        let mut s = DeploymentSettings::default();
        s.vlans.data = 1;
        s.vlans.guest = Some(4095);

        assert_eq!(
            vlan_default(&s, &caps).unwrap(),
            "Default VLAN 1 used for: data"
        );
        assert!(vlan_range(&s, &caps).unwrap().contains("guest VLAN 4095"));
    }
}
