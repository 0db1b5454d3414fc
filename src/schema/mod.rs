//! Declarative question schema
//!
//! The wizard is described as data: steps of [`Question`]s, each with a
//! typed [`FieldKind`] and an optional [`Condition`] over earlier answers.
//! Visibility and validation are pure functions of the schema and the
//! current [`Answers`], so any front end (CLI prompts, answers file) drives
//! the same logic.
//!
//! ```
//! use nacforge::schema::{AnswerValue, Answers, Schema};
//!
//! let schema = Schema::deployment();
//! let mut answers = Answers::new();
//! answers.set("radius.primary_server", "10.1.1.10");
//! answers.set("vlans.voice", AnswerValue::Int(20));
//!
//! let settings = schema.collect(&answers)?;
//! assert_eq!(settings.radius.primary_server, "10.1.1.10");
//! assert_eq!(settings.vlans.voice, Some(20));
//! # Ok::<(), nacforge::schema::SchemaError>(())
//! ```

mod deployment;
mod error;

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parse::{normalize_id, parse_duration_secs};
use crate::settings::DeploymentSettings;

pub use error::{FieldError, Result, SchemaError};

/// An answer as supplied by a front end or after normalisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl AnswerValue {
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Text(s) => !s.trim().is_empty(),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<bool> for AnswerValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AnswerValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for AnswerValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Answers keyed by question id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers {
    values: BTreeMap<String, AnswerValue>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat TOML table of `"question.id" = value` pairs
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SchemaError::Parse {
            format: "TOML",
            message: e.to_string(),
        })
    }

    /// Parse a flat JSON object of `"question.id": value` pairs
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| SchemaError::Parse {
            format: "JSON",
            message: e.to_string(),
        })
    }

    pub fn set(&mut self, id: impl Into<String>, value: impl Into<AnswerValue>) {
        self.values.insert(id.into(), value.into());
    }

    pub fn get(&self, id: &str) -> Option<&AnswerValue> {
        self.values.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<AnswerValue> {
        self.values.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One option of a [`FieldKind::Select`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,

    /// Offered only when the question's scope field has this answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            group: None,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Input type of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text
    Text,

    /// Text masked in summaries; at least `min_length` characters
    Secret { min_length: usize },

    /// IPv4/IPv6 address or DNS name
    Host,

    /// Integer within an inclusive range
    Number { min: i64, max: i64 },

    /// Seconds, also accepting `"5m"`, `"1h"`, `"1d"`
    Duration { min: u64, max: u64 },

    /// Yes/no
    Toggle,

    /// 802.1Q VLAN id (1-4094)
    Vlan,

    /// One of a fixed set of values
    Select { options: Vec<Choice> },
}

/// Visibility rule over other answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// Answer to `field` equals `value` (text compared ignoring case and separators)
    Equals { field: String, value: AnswerValue },

    /// Answer to `field` is truthy
    Truthy { field: String },

    Not { condition: Box<Condition> },
    All { conditions: Vec<Condition> },
    Any { conditions: Vec<Condition> },
}

impl Condition {
    pub fn equals(field: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn truthy(field: impl Into<String>) -> Self {
        Self::Truthy {
            field: field.into(),
        }
    }

    pub fn not(condition: Condition) -> Self {
        Self::Not {
            condition: Box::new(condition),
        }
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Self::All { conditions }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Self::Any { conditions }
    }

    /// Evaluate against answers; missing answers are falsy and equal nothing
    pub fn evaluate(&self, answers: &Answers) -> bool {
        match self {
            Self::Equals { field, value } => answers
                .get(field)
                .is_some_and(|a| normalize_id(&a.as_text()) == normalize_id(&value.as_text())),
            Self::Truthy { field } => answers.get(field).is_some_and(AnswerValue::is_truthy),
            Self::Not { condition } => !condition.evaluate(answers),
            Self::All { conditions } => conditions.iter().all(|c| c.evaluate(answers)),
            Self::Any { conditions } => conditions.iter().any(|c| c.evaluate(answers)),
        }
    }
}

/// A single wizard question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    /// Dotted settings path (e.g., "radius.primary_server")
    pub id: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    pub required: bool,

    /// Value assumed when unanswered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<AnswerValue>,

    /// Field whose answer picks the group of select options on offer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Question {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            help: None,
            kind,
            condition: None,
            required: false,
            default: None,
            scope: None,
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<AnswerValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn scoped_by(mut self, field: impl Into<String>) -> Self {
        self.scope = Some(field.into());
        self
    }

    /// Select options on offer given the effective answers
    ///
    /// Empty for other kinds. A scoped question offers only the options
    /// grouped under its scope field's answer.
    pub fn choices(&self, answers: &Answers) -> Vec<&Choice> {
        let FieldKind::Select { options } = &self.kind else {
            return Vec::new();
        };
        let Some(ref field) = self.scope else {
            return options.iter().collect();
        };
        let group = answers.get(field).map(|v| normalize_id(&v.as_text()));
        options
            .iter()
            .filter(|c| c.group.as_deref().map(normalize_id) == group)
            .collect()
    }

    /// Default given the effective answers
    ///
    /// A scoped select whose default is not on offer falls back to the
    /// first option that is.
    pub fn default_in(&self, answers: &Answers) -> Option<AnswerValue> {
        if self.scope.is_none() {
            return self.default.clone();
        }
        let choices = self.choices(answers);
        let offered = |value: &AnswerValue| {
            let wanted = normalize_id(&value.as_text());
            choices.iter().any(|c| normalize_id(&c.value) == wanted)
        };
        match self.default {
            Some(ref default) if offered(default) => Some(default.clone()),
            _ => choices.first().map(|c| AnswerValue::Text(c.value.clone())),
        }
    }

    /// [`parse_answer`](Self::parse_answer), limited to the options on offer
    pub fn parse_in(
        &self,
        raw: &AnswerValue,
        answers: &Answers,
    ) -> std::result::Result<Option<AnswerValue>, FieldError> {
        let value = self.parse_answer(raw)?;
        if let (Some(_), Some(v)) = (&self.scope, &value) {
            let choices = self.choices(answers);
            if !choices.iter().any(|c| c.value == v.as_text()) {
                let valid: Vec<_> = choices.iter().map(|c| c.value.as_str()).collect();
                return Err(self.error(format!("'{}' is not one of: {}", v, valid.join(", "))));
            }
        }
        Ok(value)
    }

    /// Whether the question applies given the effective answers
    pub fn is_visible(&self, answers: &Answers) -> bool {
        self.condition.as_ref().map_or(true, |c| c.evaluate(answers))
    }

    /// Validate and normalise a raw answer
    ///
    /// Returns `Ok(None)` for a blank answer to an optional question.
    pub fn parse_answer(&self, raw: &AnswerValue) -> std::result::Result<Option<AnswerValue>, FieldError> {
        if raw.is_blank() {
            return if self.required {
                Err(self.error("an answer is required"))
            } else {
                Ok(None)
            };
        }

        let value = match &self.kind {
            FieldKind::Text => AnswerValue::Text(raw.as_text().trim().to_string()),

            FieldKind::Secret { min_length } => {
                let text = raw.as_text();
                if text.chars().count() < *min_length {
                    return Err(self.error(format!(
                        "must be at least {} characters",
                        min_length
                    )));
                }
                AnswerValue::Text(text)
            }

            FieldKind::Host => {
                let text = raw.as_text().trim().to_string();
                if !is_valid_host(&text) {
                    return Err(self.error(format!("'{}' is not an IP address or hostname", text)));
                }
                AnswerValue::Text(text)
            }

            FieldKind::Number { min, max } => {
                let n = self.integer(raw)?;
                if n < *min || n > *max {
                    return Err(self.error(format!("must be between {} and {}", min, max)));
                }
                AnswerValue::Int(n)
            }

            FieldKind::Duration { min, max } => {
                let secs = match raw {
                    AnswerValue::Int(n) => u64::try_from(*n).ok(),
                    AnswerValue::Text(s) => parse_duration_secs(s),
                    AnswerValue::Bool(_) => None,
                }
                .ok_or_else(|| self.error(format!("'{}' is not a duration", raw)))?;
                if secs < *min || secs > *max {
                    return Err(self.error(format!(
                        "must be between {} and {} seconds",
                        min, max
                    )));
                }
                AnswerValue::Int(secs as i64)
            }

            FieldKind::Toggle => AnswerValue::Bool(match raw {
                AnswerValue::Bool(b) => *b,
                AnswerValue::Int(0) => false,
                AnswerValue::Int(1) => true,
                other => match other.as_text().trim().to_lowercase().as_str() {
                    "y" | "yes" | "true" | "on" | "1" | "enable" | "enabled" => true,
                    "n" | "no" | "false" | "off" | "0" | "disable" | "disabled" => false,
                    _ => return Err(self.error(format!("'{}' is not yes or no", other))),
                },
            }),

            FieldKind::Vlan => {
                let n = self.integer(raw)?;
                if !(1..=4094).contains(&n) {
                    return Err(self.error("VLAN id must be between 1 and 4094"));
                }
                AnswerValue::Int(n)
            }

            FieldKind::Select { options } => {
                let wanted = normalize_id(&raw.as_text());
                let choice = options
                    .iter()
                    .find(|c| normalize_id(&c.value) == wanted)
                    .ok_or_else(|| {
                        let valid: Vec<_> = options.iter().map(|c| c.value.as_str()).collect();
                        self.error(format!(
                            "'{}' is not one of: {}",
                            raw,
                            valid.join(", ")
                        ))
                    })?;
                AnswerValue::Text(choice.value.clone())
            }
        };

        Ok(Some(value))
    }

    fn integer(&self, raw: &AnswerValue) -> std::result::Result<i64, FieldError> {
        match raw {
            AnswerValue::Int(n) => Ok(*n),
            AnswerValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| self.error(format!("'{}' is not a number", s.trim()))),
            AnswerValue::Bool(_) => Err(self.error("expected a number")),
        }
    }

    fn error(&self, message: impl Into<String>) -> FieldError {
        FieldError::new(&self.id, message)
    }
}

/// A titled group of questions, presented together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>,
}

impl Step {
    pub fn new(id: impl Into<String>, title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            questions,
        }
    }
}

/// A multi-step wizard definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub steps: Vec<Step>,
}

impl Schema {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// All questions in presentation order
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.steps.iter().flat_map(|s| s.questions.iter())
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions().find(|q| q.id == id)
    }

    /// Answers with defaults filled in for unanswered questions
    ///
    /// Conditions are evaluated against this view, so a question gated on
    /// a toggle that defaults to on is visible before the toggle is answered.
    /// Valid answers are normalised (so `"no"` for a toggle is `false`);
    /// invalid ones are kept as given.
    pub fn effective(&self, answers: &Answers) -> Answers {
        let mut effective = answers.clone();
        for q in self.questions() {
            let parsed = answers.get(&q.id).map(|raw| q.parse_in(raw, &effective));
            match parsed {
                Some(Ok(Some(value))) => effective.set(q.id.clone(), value),
                Some(Err(_)) => {}
                Some(Ok(None)) | None => {
                    effective.remove(&q.id);
                    if let Some(default) = q.default_in(&effective) {
                        effective.set(q.id.clone(), default);
                    }
                }
            }
        }
        effective
    }

    /// Questions that apply given the current answers
    pub fn visible(&self, answers: &Answers) -> Vec<&Question> {
        let effective = self.effective(answers);
        self.questions().filter(|q| q.is_visible(&effective)).collect()
    }

    /// Validate visible answers and build settings
    ///
    /// Every invalid answer is reported in one [`SchemaError::Invalid`].
    /// Unanswered optional questions keep the settings default; answers to
    /// hidden questions are ignored.
    pub fn collect(&self, answers: &Answers) -> Result<DeploymentSettings> {
        let effective = self.effective(answers);
        let mut settings = DeploymentSettings::default();
        let mut errors = Vec::new();

        for q in self.questions() {
            if !q.is_visible(&effective) {
                if answers.get(&q.id).is_some() {
                    debug!(question = %q.id, "ignoring answer to hidden question");
                }
                continue;
            }

            let parsed = match effective.get(&q.id) {
                Some(raw) => q.parse_in(raw, &effective),
                None if q.required => Err(FieldError::new(&q.id, "an answer is required")),
                None => Ok(None),
            };

            match parsed {
                Ok(Some(value)) => {
                    if let Err(message) = deployment::apply(&mut settings, &q.id, &value) {
                        errors.push(FieldError::new(&q.id, message));
                    }
                }
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }

        for (id, _) in answers.iter() {
            if self.question(id).is_none() {
                debug!(question = %id, "ignoring answer to unknown question");
            }
        }

        let platform_reported = errors
            .iter()
            .any(|e| e.question == "vendor" || e.question == "platform");
        if !platform_reported {
            if let Err(e) = deployment::check_platform(&settings) {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(settings)
        } else {
            Err(SchemaError::Invalid { errors })
        }
    }
}

fn is_valid_host(s: &str) -> bool {
    if s.parse::<IpAddr>().is_ok() {
        return true;
    }
    // A dotted-quad that failed to parse is a bad address, not a hostname
    if s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return false;
    }
    !s.is_empty()
        && s.len() <= 253
        && s.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(kind: FieldKind) -> Question {
        Question::new("field", "Field", kind)
    }

    #[test]
    fn test_condition_evaluation() {
        let mut answers = Answers::new();
        answers.set("vendor", "Cisco");
        answers.set("tacacs.enabled", true);

        assert!(Condition::equals("vendor", "cisco").evaluate(&answers));
        assert!(!Condition::equals("vendor", "aruba").evaluate(&answers));
        assert!(Condition::truthy("tacacs.enabled").evaluate(&answers));
        assert!(!Condition::truthy("missing").evaluate(&answers));
        assert!(Condition::not(Condition::truthy("missing")).evaluate(&answers));
        assert!(Condition::all(vec![
            Condition::equals("vendor", "cisco"),
            Condition::truthy("tacacs.enabled"),
        ])
        .evaluate(&answers));
        assert!(Condition::any(vec![
            Condition::equals("vendor", "juniper"),
            Condition::truthy("tacacs.enabled"),
        ])
        .evaluate(&answers));
        assert!(!Condition::any(vec![]).evaluate(&answers));
    }

    #[test]
    fn test_host_validation() {
        let host = q(FieldKind::Host);
        assert!(host.parse_answer(&"10.1.1.10".into()).is_ok());
        assert!(host.parse_answer(&"2001:db8::10".into()).is_ok());
        assert!(host.parse_answer(&"ise-1.example.com".into()).is_ok());
        assert!(host.parse_answer(&"10.1.1.300".into()).is_err());
        assert!(host.parse_answer(&"bad host".into()).is_err());
        assert_eq!(host.parse_answer(&"  ".into()), Ok(None));
    }

    #[test]
    fn test_required_blank_is_error() {
        let host = q(FieldKind::Host).required();
        let err = host.parse_answer(&"".into()).unwrap_err();
        assert_eq!(err.question, "field");
    }

    #[test]
    fn test_number_and_vlan_ranges() {
        let port = q(FieldKind::Number { min: 1, max: 65535 });
        assert_eq!(port.parse_answer(&"1812".into()), Ok(Some(AnswerValue::Int(1812))));
        assert!(port.parse_answer(&AnswerValue::Int(0)).is_err());
        assert!(port.parse_answer(&"abc".into()).is_err());

        let vlan = q(FieldKind::Vlan);
        assert!(vlan.parse_answer(&AnswerValue::Int(4094)).is_ok());
        assert!(vlan.parse_answer(&AnswerValue::Int(4095)).is_err());
        assert!(vlan.parse_answer(&AnswerValue::Int(0)).is_err());
    }

    #[test]
    fn test_duration_accepts_units() {
        let d = q(FieldKind::Duration { min: 1, max: 86_400 });
        assert_eq!(d.parse_answer(&"1h".into()), Ok(Some(AnswerValue::Int(3600))));
        assert_eq!(d.parse_answer(&AnswerValue::Int(100)), Ok(Some(AnswerValue::Int(100))));
        assert!(d.parse_answer(&"2d".into()).is_err());
        assert!(d.parse_answer(&"soon".into()).is_err());
    }

    #[test]
    fn test_toggle_spellings() {
        let t = q(FieldKind::Toggle);
        for yes in ["y", "YES", "true", "on"] {
            assert_eq!(t.parse_answer(&yes.into()), Ok(Some(AnswerValue::Bool(true))));
        }
        for no in ["n", "No", "false", "off"] {
            assert_eq!(t.parse_answer(&no.into()), Ok(Some(AnswerValue::Bool(false))));
        }
        assert!(t.parse_answer(&"maybe".into()).is_err());
    }

    #[test]
    fn test_select_canonicalises() {
        let s = q(FieldKind::Select {
            options: vec![Choice::new("ios-xe", "IOS-XE"), Choice::new("nx-os", "NX-OS")],
        });
        assert_eq!(
            s.parse_answer(&"IOS_XE".into()),
            Ok(Some(AnswerValue::Text("ios-xe".into())))
        );
        let err = s.parse_answer(&"eos".into()).unwrap_err();
        assert!(err.message.contains("ios-xe, nx-os"));
    }

    #[test]
    fn test_scoped_select_follows_scope_answer() {
        let os = q(FieldKind::Select {
            options: vec![
                Choice::new("ios-xe", "IOS-XE").in_group("cisco"),
                Choice::new("nx-os", "NX-OS").in_group("cisco"),
                Choice::new("junos", "Junos").in_group("juniper"),
            ],
        })
        .scoped_by("vendor")
        .default_value("ios-xe");

        let mut answers = Answers::new();
        answers.set("vendor", "cisco");
        assert_eq!(os.choices(&answers).len(), 2);
        assert_eq!(os.default_in(&answers), Some(AnswerValue::Text("ios-xe".into())));

        answers.set("vendor", "Juniper");
        assert_eq!(os.default_in(&answers), Some(AnswerValue::Text("junos".into())));
        assert_eq!(
            os.parse_in(&"JUNOS".into(), &answers),
            Ok(Some(AnswerValue::Text("junos".into())))
        );
        let err = os.parse_in(&"ios-xe".into(), &answers).unwrap_err();
        assert_eq!(err.message, "'ios-xe' is not one of: junos");
    }

    #[test]
    fn test_secret_min_length() {
        let s = q(FieldKind::Secret { min_length: 8 });
        assert!(s.parse_answer(&"short".into()).is_err());
        assert!(s.parse_answer(&"long-enough".into()).is_ok());
    }

    #[test]
    fn test_answers_from_toml() {
        let answers = Answers::from_toml(
            r#"
"radius.primary_server" = "10.1.1.10"
"auth.reauth_enabled" = false
"vlans.data" = 100
"#,
        )
        .unwrap();
        assert_eq!(answers.len(), 3);
        assert_eq!(answers.get("vlans.data"), Some(&AnswerValue::Int(100)));
        assert_eq!(answers.get("auth.reauth_enabled"), Some(&AnswerValue::Bool(false)));
    }

    #[test]
    fn test_answers_parse_error() {
        assert!(matches!(
            Answers::from_json("{not json"),
            Err(SchemaError::Parse { format: "JSON", .. })
        ));
    }
}
