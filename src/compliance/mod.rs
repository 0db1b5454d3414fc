//! Deployment Compliance Scoring
//!
//! Scores a [`DeploymentSettings`] against a fixed table of 802.1X / RADIUS
//! best-practice rules. Each failing rule produces a [`Finding`] and deducts
//! its weight from a starting score of 100.
//!
//! # Usage
//!
//! ```
//! use nacforge::compliance::{self, Severity};
//! use nacforge::settings::DeploymentSettings;
//!
//! let report = compliance::evaluate(&DeploymentSettings::default());
//!
//! let issue = report.issues().next().unwrap();
//! assert_eq!(issue.severity, Severity::Critical);
//! assert_eq!(issue.message, "No primary RADIUS server configured");
//! assert!(report.score < 100);
//! ```
//!
//! # Severities
//!
//! - **Critical**: security issue; the deployment should not go live as is
//! - **Warning**: weakens the deployment or its resilience
//! - **Recommendation**: optional hardening

mod report;
mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::settings::DeploymentSettings;
use crate::vendor::{self, Capabilities};

pub use report::{ComplianceReport, Finding};
pub use rules::RULES;

/// How serious a failing rule is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Recommendation,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Recommendation => "recommendation",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Area of the deployment a rule looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Radius,
    Authentication,
    Vlan,
    Administration,
    /// Requested features versus platform capabilities
    Platform,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Radius => "RADIUS",
            Self::Authentication => "Authentication",
            Self::Vlan => "VLANs",
            Self::Administration => "Administration",
            Self::Platform => "Platform",
        };
        f.write_str(name)
    }
}

/// Returns the failure message, or `None` when the rule passes
pub type Check = fn(&DeploymentSettings, &Capabilities) -> Option<String>;

/// A best-practice rule
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Stable identifier (e.g., "radius-primary")
    pub id: &'static str,
    pub title: &'static str,
    pub category: Category,
    pub severity: Severity,

    /// Points removed from the score when the rule fails
    pub deduction: u32,
    pub check: Check,
}

/// Score settings against the built-in [`RULES`]
pub fn evaluate(settings: &DeploymentSettings) -> ComplianceReport {
    evaluate_with(settings, RULES)
}

/// Score settings against an arbitrary rule table
///
/// Platform rules are skipped when the vendor/platform pair is not in the
/// catalog; other rules see an empty capability set.
pub fn evaluate_with(settings: &DeploymentSettings, rules: &[Rule]) -> ComplianceReport {
    let caps = match vendor::find(&settings.vendor, &settings.platform) {
        Some((_, platform)) => Some(platform.capabilities),
        None => {
            warn!(
                vendor = %settings.vendor,
                platform = %settings.platform,
                "platform not in catalog; skipping capability rules"
            );
            None
        }
    };

    let mut report = ComplianceReport::new();
    for rule in rules {
        if rule.category == Category::Platform && caps.is_none() {
            continue;
        }
        match (rule.check)(settings, &caps.unwrap_or_default()) {
            Some(message) => {
                debug!(rule = rule.id, severity = %rule.severity, "rule failed");
                report.add_finding(Finding::new(rule, message));
            }
            None => report.add_pass(rule.id),
        }
    }
    report
}
