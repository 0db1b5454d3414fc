//! Compliance report

use std::fmt;

use serde::Serialize;

use super::{Category, Rule, Severity};

/// A failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Rule identifier (e.g., "radius-primary")
    pub rule: String,
    pub title: String,
    pub category: Category,
    pub severity: Severity,
    pub deduction: u32,

    /// What is wrong with this deployment
    pub message: String,
}

impl Finding {
    pub fn new(rule: &Rule, message: impl Into<String>) -> Self {
        Self {
            rule: rule.id.to_string(),
            title: rule.title.to_string(),
            category: rule.category,
            severity: rule.severity,
            deduction: rule.deduction,
            message: message.into(),
        }
    }
}

/// Outcome of scoring one deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceReport {
    /// 100 minus the deductions of every finding, never below 0
    pub score: u32,
    pub findings: Vec<Finding>,

    /// Ids of rules that passed
    pub passed: Vec<String>,
}

impl Default for ComplianceReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplianceReport {
    pub const MAX_SCORE: u32 = 100;

    pub fn new() -> Self {
        Self {
            score: Self::MAX_SCORE,
            findings: Vec::new(),
            passed: Vec::new(),
        }
    }

    pub fn add_finding(&mut self, finding: Finding) {
        self.score = self.score.saturating_sub(finding.deduction).min(Self::MAX_SCORE);
        self.findings.push(finding);
    }

    pub fn add_pass(&mut self, rule: impl Into<String>) {
        self.passed.push(rule.into());
    }

    /// Critical findings (security issues)
    pub fn issues(&self) -> impl Iterator<Item = &Finding> {
        self.with_severity(Severity::Critical)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.with_severity(Severity::Warning)
    }

    pub fn recommendations(&self) -> impl Iterator<Item = &Finding> {
        self.with_severity(Severity::Recommendation)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    /// No critical findings
    pub fn is_compliant(&self) -> bool {
        self.issues().next().is_none()
    }

    /// Letter grade: A (90+), B (80+), C (70+), D (60+), F
    pub fn grade(&self) -> char {
        match self.score {
            90.. => 'A',
            80..=89 => 'B',
            70..=79 => 'C',
            60..=69 => 'D',
            _ => 'F',
        }
    }

    /// Pretty-printed JSON, including the grade
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("grade".to_string(), self.grade().to_string().into());
        }
        serde_json::to_string_pretty(&value)
    }
}

impl fmt::Display for ComplianceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Compliance Score: {}/{} ({})", self.score, Self::MAX_SCORE, self.grade())?;
        writeln!(
            f,
            "Rules: {}/{} passed",
            self.passed.len(),
            self.passed.len() + self.findings.len()
        )?;

        let sections = [
            ("Security Issues", "✗", Severity::Critical),
            ("Warnings", "⚠", Severity::Warning),
            ("Recommendations", "•", Severity::Recommendation),
        ];
        for (heading, marker, severity) in sections {
            let mut findings = self.with_severity(severity).peekable();
            if findings.peek().is_none() {
                continue;
            }
            writeln!(f, "\n{}:", heading)?;
            for finding in findings {
                writeln!(
                    f,
                    "  {} [{}] {} (-{})",
                    marker, finding.category, finding.message, finding.deduction
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DeploymentSettings;
    use crate::vendor::Capabilities;

    fn rule(severity: Severity, deduction: u32) -> Rule {
        fn never(_: &DeploymentSettings, _: &Capabilities) -> Option<String> {
            None
        }
        Rule {
            id: "test",
            title: "Test",
            category: Category::Radius,
            severity,
            deduction,
            check: never,
        }
    }

    #[test]
    fn test_score_saturates() {
        let mut report = ComplianceReport::new();
        report.add_finding(Finding::new(&rule(Severity::Critical, 70), "a"));
        assert_eq!(report.score, 30);
        report.add_finding(Finding::new(&rule(Severity::Critical, 70), "b"));
        assert_eq!(report.score, 0);
    }

    #[test]
    fn test_grades() {
        let mut report = ComplianceReport::new();
        assert_eq!(report.grade(), 'A');
        report.score = 85;
        assert_eq!(report.grade(), 'B');
        report.score = 70;
        assert_eq!(report.grade(), 'C');
        report.score = 60;
        assert_eq!(report.grade(), 'D');
        report.score = 12;
        assert_eq!(report.grade(), 'F');
    }

    #[test]
    fn test_severity_filters_and_display() {
        let mut report = ComplianceReport::new();
        report.add_finding(Finding::new(&rule(Severity::Warning, 10), "weak secret"));
        report.add_finding(Finding::new(&rule(Severity::Recommendation, 3), "use radsec"));
        report.add_pass("radius-primary");

        assert!(report.is_compliant());
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.recommendations().count(), 1);
        assert_eq!(report.issues().count(), 0);

        let text = report.to_string();
        assert!(text.starts_with("Compliance Score: 87/100 (B)"));
        assert!(text.contains("Rules: 1/3 passed"));
        assert!(text.contains("⚠ [RADIUS] weak secret (-10)"));
        assert!(!text.contains("Security Issues"));
    }

    #[test]
    fn test_json_includes_grade() {
        let report = ComplianceReport::new();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["score"], 100);
        assert_eq!(json["grade"], "A");
    }
}
