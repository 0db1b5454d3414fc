//! Built-in deployment wizard
//!
//! Question ids are dotted paths into [`DeploymentSettings`]; [`apply`]
//! writes a validated answer to the matching field.

use std::str::FromStr;

use super::{AnswerValue, Choice, Condition, FieldError, FieldKind, Question, Schema, Step};
use crate::settings::{AuthMethod, AuthMode, DeploymentSettings, HostMode, PolicyMode};
use crate::vendor;

impl Schema {
    /// The wizard that produces a [`DeploymentSettings`]
    pub fn deployment() -> Self {
        let defaults = DeploymentSettings::default();
        Self::new(vec![
            platform_step(&defaults),
            radius_step(&defaults),
            tacacs_step(&defaults),
            auth_step(&defaults),
            vlan_step(&defaults),
        ])
    }
}

fn platform_step(d: &DeploymentSettings) -> Step {
    let vendors = vendor::catalog()
        .iter()
        .map(|v| Choice::new(v.id, v.name))
        .collect();
    let platforms = vendor::catalog()
        .iter()
        .flat_map(|v| v.platforms.iter().map(move |p| Choice::new(p.id, p.name).in_group(v.id)))
        .collect();

    Step::new(
        "platform",
        "Switch platform",
        vec![
            Question::new("vendor", "Switch vendor", FieldKind::Select { options: vendors })
                .required()
                .default_value(d.vendor.as_str()),
            Question::new("platform", "Operating system", FieldKind::Select { options: platforms })
                .help("Offered for the selected vendor")
                .scoped_by("vendor")
                .required()
                .default_value(d.platform.as_str()),
            Question::new("hostname", "Switch hostname", FieldKind::Text)
                .help("Shown in the configuration header; leave blank to omit"),
            Question::new("interfaces", "Access port range", FieldKind::Text)
                .help("Leave blank for the platform's default range"),
        ],
    )
}

fn radius_step(d: &DeploymentSettings) -> Step {
    let r = &d.radius;
    let port = FieldKind::Number { min: 1, max: 65535 };
    Step::new(
        "radius",
        "RADIUS servers",
        vec![
            Question::new("radius.primary_server", "Primary RADIUS server", FieldKind::Host)
                .help("IP address or hostname of the primary policy server"),
            Question::new("radius.secondary_server", "Secondary RADIUS server", FieldKind::Host)
                .help("Leave blank if there is only one server"),
            Question::new(
                "radius.shared_secret",
                "RADIUS shared secret",
                FieldKind::Secret { min_length: 8 },
            )
            .help("At least 16 random characters is recommended"),
            Question::new("radius.group_name", "RADIUS server group name", FieldKind::Text)
                .default_value(r.group_name.as_str()),
            Question::new("radius.auth_port", "Authentication port", port.clone())
                .default_value(i64::from(r.auth_port)),
            Question::new("radius.acct_port", "Accounting port", port.clone())
                .default_value(i64::from(r.acct_port)),
            Question::new(
                "radius.timeout_secs",
                "Server timeout",
                FieldKind::Duration { min: 1, max: 60 },
            )
            .default_value(i64::from(r.timeout_secs)),
            Question::new(
                "radius.retransmit",
                "Retransmit count",
                FieldKind::Number { min: 0, max: 10 },
            )
            .default_value(i64::from(r.retransmit)),
            Question::new(
                "radius.deadtime_mins",
                "Dead time (minutes)",
                FieldKind::Number { min: 0, max: 1440 },
            )
            .default_value(i64::from(r.deadtime_mins)),
            Question::new("radius.accounting", "Enable RADIUS accounting", FieldKind::Toggle)
                .default_value(r.accounting),
            Question::new("radius.coa", "Enable Change of Authorization", FieldKind::Toggle)
                .default_value(r.coa),
            Question::new("radius.coa_port", "CoA port", port)
                .when(Condition::truthy("radius.coa"))
                .default_value(i64::from(r.coa_port)),
            Question::new("radius.radsec", "Use RadSec (RADIUS over TLS)", FieldKind::Toggle)
                .default_value(r.radsec),
        ],
    )
}

fn tacacs_step(d: &DeploymentSettings) -> Step {
    let t = &d.tacacs;
    let enabled = || Condition::truthy("tacacs.enabled");
    Step::new(
        "tacacs",
        "TACACS+ device administration",
        vec![
            Question::new("tacacs.enabled", "Configure TACACS+", FieldKind::Toggle)
                .default_value(t.enabled),
            Question::new("tacacs.primary_server", "Primary TACACS+ server", FieldKind::Host)
                .when(enabled())
                .required(),
            Question::new("tacacs.secondary_server", "Secondary TACACS+ server", FieldKind::Host)
                .when(enabled()),
            Question::new(
                "tacacs.shared_secret",
                "TACACS+ key",
                FieldKind::Secret { min_length: 8 },
            )
            .when(enabled())
            .required(),
            Question::new("tacacs.group_name", "TACACS+ server group name", FieldKind::Text)
                .when(enabled())
                .default_value(t.group_name.as_str()),
        ],
    )
}

fn auth_step(d: &DeploymentSettings) -> Step {
    let a = &d.auth;
    Step::new(
        "authentication",
        "Port authentication",
        vec![
            Question::new(
                "auth.method",
                "Authentication method",
                select([
                    (AuthMethod::Dot1x.id(), "802.1X only"),
                    (AuthMethod::Mab.id(), "MAB only"),
                    (AuthMethod::Dot1xThenMab.id(), "802.1X with MAB fallback"),
                    (AuthMethod::MabThenDot1x.id(), "MAB first, then 802.1X"),
                ]),
            )
            .default_value(a.method.id()),
            Question::new(
                "auth.mode",
                "Deployment mode",
                select([
                    (AuthMode::Monitor.id(), "Monitor (open, log only)"),
                    (AuthMode::LowImpact.id(), "Low impact (pre-auth ACL)"),
                    (AuthMode::Closed.id(), "Closed (no access until authenticated)"),
                ]),
            )
            .default_value(a.mode.id()),
            Question::new(
                "auth.host_mode",
                "Host mode",
                select([
                    (HostMode::SingleHost.id(), "Single host"),
                    (HostMode::MultiHost.id(), "Multi host"),
                    (HostMode::MultiAuth.id(), "Multi auth"),
                    (HostMode::MultiDomain.id(), "Multi domain (data + voice)"),
                ]),
            )
            .default_value(a.host_mode.id()),
            Question::new(
                "auth.policy_mode",
                "Policy syntax",
                select([
                    (PolicyMode::Classic.id(), "Classic authentication commands"),
                    (PolicyMode::Ibns2.id(), "IBNS 2.0 policy maps"),
                ]),
            )
            .when(Condition::all(vec![
                Condition::equals("vendor", "cisco"),
                Condition::equals("platform", "ios-xe"),
            ]))
            .default_value(a.policy_mode.id()),
            Question::new("auth.reauth_enabled", "Periodic reauthentication", FieldKind::Toggle)
                .default_value(a.reauth_enabled),
            Question::new(
                "auth.reauth_period",
                "Reauthentication period",
                FieldKind::Duration { min: 1, max: 86_400 * 7 },
            )
            .help("Seconds, or a value such as 1h")
            .when(Condition::truthy("auth.reauth_enabled"))
            .default_value(i64::from(a.reauth_period)),
            Question::new(
                "auth.tx_period",
                "EAPOL transmit period",
                FieldKind::Duration { min: 1, max: 65_535 },
            )
            .when(Condition::not(Condition::equals("auth.method", AuthMethod::Mab.id())))
            .default_value(i64::from(a.tx_period)),
            Question::new(
                "auth.max_reauth_req",
                "Maximum EAPOL retries",
                FieldKind::Number { min: 1, max: 10 },
            )
            .when(Condition::not(Condition::equals("auth.method", AuthMethod::Mab.id())))
            .default_value(i64::from(a.max_reauth_req)),
            Question::new(
                "auth.quiet_period",
                "Quiet period after failure",
                FieldKind::Duration { min: 0, max: 65_535 },
            )
            .default_value(i64::from(a.quiet_period)),
            Question::new(
                "auth.critical_auth",
                "Authorize ports when RADIUS is unreachable",
                FieldKind::Toggle,
            )
            .default_value(a.critical_auth),
            Question::new("auth.dacl", "Accept downloadable ACLs", FieldKind::Toggle)
                .default_value(a.dacl),
            Question::new("auth.device_tracking", "Enable device tracking", FieldKind::Toggle)
                .default_value(a.device_tracking),
        ],
    )
}

fn vlan_step(d: &DeploymentSettings) -> Step {
    Step::new(
        "vlans",
        "VLAN assignment",
        vec![
            Question::new("vlans.data", "Data VLAN", FieldKind::Vlan)
                .required()
                .default_value(i64::from(d.vlans.data)),
            Question::new("vlans.voice", "Voice VLAN", FieldKind::Vlan)
                .help("Leave blank if there are no phones"),
            Question::new("vlans.guest", "Guest VLAN", FieldKind::Vlan),
            Question::new("vlans.critical", "Critical VLAN", FieldKind::Vlan)
                .when(Condition::truthy("auth.critical_auth")),
            Question::new("vlans.auth_fail", "Authentication-failure VLAN", FieldKind::Vlan)
                .when(Condition::not(Condition::equals("auth.method", AuthMethod::Mab.id()))),
        ],
    )
}

fn select<const N: usize>(options: [(&str, &str); N]) -> FieldKind {
    FieldKind::Select {
        options: options
            .into_iter()
            .map(|(value, label)| Choice::new(value, label))
            .collect(),
    }
}

/// Write a validated answer into the settings field named by `id`
pub(super) fn apply(
    s: &mut DeploymentSettings,
    id: &str,
    value: &AnswerValue,
) -> Result<(), String> {
    match id {
        "vendor" => s.vendor = value.as_text(),
        "platform" => s.platform = value.as_text(),
        "hostname" => s.hostname = Some(value.as_text()),
        "interfaces" => s.interfaces = value.as_text(),

        "radius.primary_server" => s.radius.primary_server = value.as_text(),
        "radius.secondary_server" => s.radius.secondary_server = value.as_text(),
        "radius.shared_secret" => s.radius.shared_secret = value.as_text(),
        "radius.group_name" => s.radius.group_name = value.as_text(),
        "radius.auth_port" => s.radius.auth_port = int(value)?,
        "radius.acct_port" => s.radius.acct_port = int(value)?,
        "radius.timeout_secs" => s.radius.timeout_secs = int(value)?,
        "radius.retransmit" => s.radius.retransmit = int(value)?,
        "radius.deadtime_mins" => s.radius.deadtime_mins = int(value)?,
        "radius.accounting" => s.radius.accounting = flag(value)?,
        "radius.coa" => s.radius.coa = flag(value)?,
        "radius.coa_port" => s.radius.coa_port = int(value)?,
        "radius.radsec" => s.radius.radsec = flag(value)?,

        "tacacs.enabled" => s.tacacs.enabled = flag(value)?,
        "tacacs.primary_server" => s.tacacs.primary_server = value.as_text(),
        "tacacs.secondary_server" => s.tacacs.secondary_server = value.as_text(),
        "tacacs.shared_secret" => s.tacacs.shared_secret = value.as_text(),
        "tacacs.group_name" => s.tacacs.group_name = value.as_text(),

        "auth.method" => s.auth.method = choice(value)?,
        "auth.mode" => s.auth.mode = choice(value)?,
        "auth.host_mode" => s.auth.host_mode = choice(value)?,
        "auth.policy_mode" => s.auth.policy_mode = choice(value)?,
        "auth.reauth_enabled" => s.auth.reauth_enabled = flag(value)?,
        "auth.reauth_period" => s.auth.reauth_period = int(value)?,
        "auth.tx_period" => s.auth.tx_period = int(value)?,
        "auth.max_reauth_req" => s.auth.max_reauth_req = int(value)?,
        "auth.quiet_period" => s.auth.quiet_period = int(value)?,
        "auth.critical_auth" => s.auth.critical_auth = flag(value)?,
        "auth.dacl" => s.auth.dacl = flag(value)?,
        "auth.device_tracking" => s.auth.device_tracking = flag(value)?,

        "vlans.data" => s.vlans.data = int(value)?,
        "vlans.voice" => s.vlans.voice = Some(int(value)?),
        "vlans.guest" => s.vlans.guest = Some(int(value)?),
        "vlans.critical" => s.vlans.critical = Some(int(value)?),
        "vlans.auth_fail" => s.vlans.auth_fail = Some(int(value)?),

        other => return Err(format!("no settings field named '{}'", other)),
    }
    Ok(())
}

/// The vendor/platform pair must exist in the catalog
pub(super) fn check_platform(s: &DeploymentSettings) -> Result<(), FieldError> {
    let Some(v) = vendor::vendor(&s.vendor) else {
        return Err(FieldError::new("vendor", format!("unknown vendor '{}'", s.vendor)));
    };
    if v.platform(&s.platform).is_none() {
        let ids: Vec<_> = v.platforms.iter().map(|p| p.id).collect();
        return Err(FieldError::new(
            "platform",
            format!(
                "'{}' is not a {} platform (expected one of: {})",
                s.platform,
                v.name,
                ids.join(", ")
            ),
        ));
    }
    Ok(())
}

fn int<T: TryFrom<i64>>(value: &AnswerValue) -> Result<T, String> {
    match value {
        AnswerValue::Int(n) => T::try_from(*n).map_err(|_| format!("{} is out of range", n)),
        other => Err(format!("expected a number, got '{}'", other)),
    }
}

fn flag(value: &AnswerValue) -> Result<bool, String> {
    match value {
        AnswerValue::Bool(b) => Ok(*b),
        other => Err(format!("expected yes or no, got '{}'", other)),
    }
}

fn choice<T: FromStr>(value: &AnswerValue) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    value.as_text().parse().map_err(|e: T::Err| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Answers, SchemaError};

    #[test]
    fn test_empty_answers_collect_to_defaults() {
        let settings = Schema::deployment().collect(&Answers::new()).unwrap();
        assert_eq!(settings, DeploymentSettings::default());
    }

    #[test]
    fn test_question_ids_are_unique_and_applicable() {
        let schema = Schema::deployment();
        let mut ids: Vec<_> = schema.questions().map(|q| q.id.as_str()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);

        // Every question maps onto a settings field
        for q in schema.questions() {
            let mut s = DeploymentSettings::default();
            let sample = match q.kind {
                FieldKind::Toggle => AnswerValue::Bool(true),
                FieldKind::Number { min, .. } => AnswerValue::Int(min.max(1)),
                FieldKind::Duration { min, .. } => AnswerValue::Int(min.max(1) as i64),
                FieldKind::Vlan => AnswerValue::Int(100),
                FieldKind::Select { ref options } => AnswerValue::Text(options[0].value.clone()),
                _ => AnswerValue::Text("10.1.1.10".into()),
            };
            assert!(apply(&mut s, &q.id, &sample).is_ok(), "{}", q.id);
        }
    }

    #[test]
    fn test_collect_applies_answers() {
        let mut answers = Answers::new();
        answers.set("vendor", "Aruba");
        answers.set("platform", "aos_cx");
        answers.set("radius.primary_server", "10.1.1.10");
        answers.set("radius.secondary_server", "10.1.1.11");
        answers.set("auth.mode", "closed");
        answers.set("auth.reauth_period", "2h");
        answers.set("vlans.voice", "20");

        let s = Schema::deployment().collect(&answers).unwrap();
        assert_eq!(s.vendor, "aruba");
        assert_eq!(s.platform, "aos-cx");
        assert_eq!(s.radius.secondary_server, "10.1.1.11");
        assert_eq!(s.auth.mode, AuthMode::Closed);
        assert_eq!(s.auth.reauth_period, 7200);
        assert_eq!(s.vlans.voice, Some(20));
    }

    #[test]
    fn test_policy_mode_only_visible_on_ios_xe() {
        let schema = Schema::deployment();
        let visible = |answers: &Answers| {
            schema
                .visible(answers)
                .iter()
                .any(|q| q.id == "auth.policy_mode")
        };

        assert!(visible(&Answers::new()));

        let mut answers = Answers::new();
        answers.set("vendor", "juniper");
        answers.set("platform", "junos");
        assert!(!visible(&answers));
    }

    #[test]
    fn test_hidden_answers_are_ignored() {
        let mut answers = Answers::new();
        answers.set("vendor", "juniper");
        answers.set("platform", "junos");
        answers.set("auth.policy_mode", "ibns2");
        answers.set("tacacs.primary_server", "not a host!");

        let s = Schema::deployment().collect(&answers).unwrap();
        assert_eq!(s.auth.policy_mode, PolicyMode::Classic);
        assert!(s.tacacs.primary_server.is_empty());
    }

    #[test]
    fn test_tacacs_fields_required_when_enabled() {
        let mut answers = Answers::new();
        answers.set("tacacs.enabled", "yes");

        let err = Schema::deployment().collect(&answers).unwrap_err();
        let questions: Vec<_> = err.field_errors().iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, vec!["tacacs.primary_server", "tacacs.shared_secret"]);
    }

    #[test]
    fn test_all_errors_reported_together() {
        let mut answers = Answers::new();
        answers.set("radius.primary_server", "300.1.1.1");
        answers.set("radius.auth_port", AnswerValue::Int(70000));
        answers.set("vlans.data", AnswerValue::Int(5000));

        match Schema::deployment().collect(&answers) {
            Err(SchemaError::Invalid { errors }) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_platform_must_match_vendor() {
        let mut answers = Answers::new();
        answers.set("vendor", "cisco");
        answers.set("platform", "junos");

        let err = Schema::deployment().collect(&answers).unwrap_err();
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.field_errors()[0].question, "platform");
        assert!(err.field_errors()[0].message.contains("ios-xe, ios, nx-os"));
    }

    #[test]
    fn test_platform_defaults_to_vendor_first_platform() {
        let mut answers = Answers::new();
        answers.set("vendor", "juniper");

        let schema = Schema::deployment();
        let effective = schema.effective(&answers);
        assert_eq!(effective.get("platform"), Some(&AnswerValue::Text("junos".into())));

        let s = schema.collect(&answers).unwrap();
        assert_eq!(s.platform, "junos");
    }

    #[test]
    fn test_disabling_coa_hides_port() {
        let mut answers = Answers::new();
        answers.set("radius.coa", false);
        answers.set("radius.coa_port", "not a port");

        let s = Schema::deployment().collect(&answers).unwrap();
        assert!(!s.radius.coa);
        assert_eq!(s.radius.coa_port, 3799);
    }
}
