//! Output formatting and display utilities
//!
//! Status lines go to stdout. Errors, warnings, prompts and logs use
//! stderr, and so does [`note`], for status printed alongside an artifact
//! on stdout.

use colored::{ColoredString, Colorize};

use nacforge::compliance::{ComplianceReport, Finding, Severity};
use nacforge::parse::format_duration;
use nacforge::schema::{Condition, FieldKind, Question, Schema};
use nacforge::snapshot::Snapshot;
use nacforge::vendor::{Capabilities, Vendor};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

/// Print an info message to stderr
pub fn note(msg: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", msg.bold().underline());
}

/// Print a subheader
pub fn subheader(msg: &str) {
    println!("\n{}", msg.bold());
}

/// Print a compliance report
pub fn print_report(report: &ComplianceReport) {
    let score = format!("{}/{} ({})", report.score, ComplianceReport::MAX_SCORE, report.grade());
    let score = match report.grade() {
        'A' | 'B' => score.green(),
        'C' | 'D' => score.yellow(),
        _ => score.red(),
    };
    header("Compliance Report");
    println!("Score: {}", score.bold());
    println!(
        "Rules: {}/{} passed",
        report.passed.len(),
        report.passed.len() + report.findings.len()
    );

    print_findings("Security issues (must fix):", report.issues());
    print_findings("Warnings:", report.warnings());
    print_findings("Recommendations:", report.recommendations());
    println!();
}

fn print_findings<'a>(heading: &str, findings: impl Iterator<Item = &'a Finding>) {
    let findings: Vec<_> = findings.collect();
    if findings.is_empty() {
        return;
    }
    subheader(heading);
    for finding in findings {
        let (icon, message) = match finding.severity {
            Severity::Critical => ("✗".red(), finding.message.red()),
            Severity::Warning => ("⚠".yellow(), finding.message.yellow()),
            Severity::Recommendation => ("•".cyan(), finding.message.normal()),
        };
        let rule = format!("[{}]", finding.rule).dimmed();
        println!("  {} {} {}", icon, rule, message);
        println!(
            "    {}",
            format!("{} (-{})", finding.title, finding.deduction).dimmed()
        );
    }
}

/// Print the vendor catalog
pub fn print_catalog(vendors: &[Vendor]) {
    for vendor in vendors {
        header(vendor.name);
        for platform in vendor.platforms {
            println!(
                "  {} {}  {}",
                "→".cyan(),
                format!("{}/{}", vendor.id, platform.id).bold(),
                platform.name
            );
            println!("      {}", capability_list(&platform.capabilities).dimmed());
        }
    }
    println!();
}

fn capability_list(caps: &Capabilities) -> String {
    let flags = [
        ("ibns2", caps.ibns2),
        ("radsec", caps.radsec),
        ("coa", caps.coa),
        ("dacl", caps.dacl),
        ("critical-auth", caps.critical_auth),
        ("device-tracking", caps.device_tracking),
        ("tacacs", caps.tacacs),
        ("multi-domain", caps.multi_domain),
    ];
    let supported: Vec<_> = flags
        .iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| *name)
        .collect();
    if supported.is_empty() {
        "no optional features".to_string()
    } else {
        supported.join(", ")
    }
}

/// Print every step and question of a schema
pub fn print_schema(schema: &Schema) {
    for step in &schema.steps {
        header(&step.title);
        for q in &step.questions {
            print_question(q);
        }
    }
    println!();
}

fn print_question(q: &Question) {
    let required = if q.required { "*".red() } else { " ".normal() };
    println!("  {}{} {}", required, q.id.bold(), q.prompt);

    let mut details = vec![describe_kind(&q.kind)];
    if let Some(ref default) = q.default {
        details.push(format!("default: {}", default));
    }
    if let Some(ref scope) = q.scope {
        details.push(format!("options depend on {}", scope));
    }
    if let Some(ref condition) = q.condition {
        details.push(format!("when {}", describe_condition(condition)));
    }
    println!("     {}", details.join("; ").dimmed());
    if let Some(ref help) = q.help {
        println!("     {}", help.dimmed());
    }
}

pub fn describe_kind(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Text => "text".to_string(),
        FieldKind::Secret { min_length } => format!("secret, {}+ characters", min_length),
        FieldKind::Host => "IP address or hostname".to_string(),
        FieldKind::Number { min, max } => format!("number {}-{}", min, max),
        FieldKind::Duration { min, max } => {
            format!("duration {}-{}", format_duration(*min), format_duration(*max))
        }
        FieldKind::Toggle => "yes/no".to_string(),
        FieldKind::Vlan => "VLAN 1-4094".to_string(),
        FieldKind::Select { options } => {
            let values: Vec<_> = options.iter().map(|c| c.value.as_str()).collect();
            format!("one of {}", values.join(" | "))
        }
    }
}

fn describe_condition(condition: &Condition) -> String {
    let joined = |conditions: &[Condition], op: &str| {
        conditions
            .iter()
            .map(describe_condition)
            .collect::<Vec<_>>()
            .join(op)
    };
    match condition {
        Condition::Equals { field, value } => format!("{} = {}", field, value),
        Condition::Truthy { field } => field.clone(),
        Condition::Not { condition } => format!("not ({})", describe_condition(condition)),
        Condition::All { conditions } => joined(conditions.as_slice(), " and "),
        Condition::Any { conditions } => joined(conditions.as_slice(), " or "),
    }
}

/// Print snapshot listing
pub fn print_snapshots(snapshots: &[Snapshot]) {
    if snapshots.is_empty() {
        info("No snapshots saved");
        return;
    }
    for s in snapshots {
        println!(
            "  {} {}  {}  {}",
            s.short_id().cyan(),
            s.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            format!("{}/{}", s.vendor, s.platform).bold(),
            s.name
        );
        if !s.description.is_empty() {
            println!("           {}", s.description.dimmed());
        }
    }
}

/// Print one snapshot with its configuration
pub fn print_snapshot(s: &Snapshot) {
    header(&format!("Snapshot {}: {}", s.short_id(), s.name));
    field("Id", &s.id.to_string());
    field("Saved", &s.timestamp.to_rfc3339());
    field("Platform", &format!("{}/{}", s.vendor, s.platform));
    field("File", &s.filename);
    field("SHA-256", &s.hash);
    if !s.description.is_empty() {
        field("Description", &s.description);
    }
    println!("\n{}", "─".repeat(60));
    print!("{}", s.config);
    println!("{}", "─".repeat(60));
}

fn field(name: &str, value: &str) {
    let label: ColoredString = format!("{}:", name).bold();
    println!("  {} {}", label, value);
}

/// Print a JSON value
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_list() {
        assert_eq!(capability_list(&Capabilities::default()), "no optional features");
        let caps = Capabilities {
            coa: true,
            tacacs: true,
            ..Capabilities::default()
        };
        assert_eq!(capability_list(&caps), "coa, tacacs");
    }

    #[test]
    fn test_describe_condition() {
        let c = Condition::all(vec![
            Condition::equals("vendor", "cisco"),
            Condition::not(Condition::truthy("radius.radsec")),
        ]);
        assert_eq!(describe_condition(&c), "vendor = cisco and not (radius.radsec)");
    }

    #[test]
    fn test_describe_kind() {
        assert_eq!(describe_kind(&FieldKind::Number { min: 1, max: 10 }), "number 1-10");
        assert_eq!(describe_kind(&FieldKind::Vlan), "VLAN 1-4094");
        assert_eq!(
            describe_kind(&FieldKind::Duration { min: 300, max: 86_400 }),
            "duration 5m-1d"
        );
    }
}
