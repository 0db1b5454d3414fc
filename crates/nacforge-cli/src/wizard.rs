//! Interactive question prompts

use std::io::{self, BufRead, Write};

use colored::Colorize;
use nacforge::schema::{AnswerValue, Answers, FieldKind, Question, Schema};

use crate::output::describe_kind;

/// Ask every visible question in order, re-evaluating visibility after
/// each answer. A blank line keeps the default; end of input stops early
/// and leaves the remaining questions unanswered.
pub fn prompt<R: BufRead, W: Write>(schema: &Schema, mut input: R, mut out: W) -> io::Result<Answers> {
    let mut answers = Answers::new();

    for step in &schema.steps {
        let mut titled = false;
        for q in &step.questions {
            let effective = schema.effective(&answers);
            if !q.is_visible(&effective) {
                continue;
            }
            if !titled {
                writeln!(out, "\n{}", step.title.bold().underline())?;
                titled = true;
            }

            loop {
                write_prompt(&mut out, q, &effective)?;
                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    writeln!(out)?;
                    return Ok(answers);
                }
                let raw = AnswerValue::Text(line.trim_end_matches(['\r', '\n']).to_string());

                if raw.as_text().trim().is_empty() && q.default_in(&effective).is_some() {
                    break;
                }
                match q.parse_in(&raw, &effective) {
                    Ok(Some(value)) => {
                        answers.set(q.id.clone(), value);
                        break;
                    }
                    Ok(None) => break,
                    Err(e) => writeln!(out, "  {} {}", "✗".red(), e.message)?,
                }
            }
        }
    }

    Ok(answers)
}

fn write_prompt<W: Write>(out: &mut W, q: &Question, effective: &Answers) -> io::Result<()> {
    if let Some(ref help) = q.help {
        writeln!(out, "  {}", help.dimmed())?;
    }
    let kind = match q.kind {
        FieldKind::Select { .. } => {
            let values: Vec<_> = q.choices(effective).into_iter().map(|c| c.value.as_str()).collect();
            format!("one of {}", values.join(" | "))
        }
        _ => describe_kind(&q.kind),
    };
    let hint = match (&q.kind, q.default_in(effective)) {
        (FieldKind::Secret { .. }, _) | (_, None) => kind,
        (_, Some(default)) => format!("{}, default {}", kind, default),
    };
    write!(out, "{} {}: ", q.prompt, format!("[{}]", hint).dimmed())?;
    out.flush()
}

/// Answers with secret values masked, for echoing back to the user
pub fn masked(schema: &Schema, answers: &Answers) -> Vec<(String, String)> {
    answers
        .iter()
        .map(|(id, value)| {
            let secret = schema
                .question(id)
                .is_some_and(|q| matches!(q.kind, FieldKind::Secret { .. }));
            let shown = if secret {
                "*".repeat(8)
            } else {
                value.to_string()
            };
            (id.to_string(), shown)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_collects_answers() {
        colored::control::set_override(false);
        let schema = Schema::deployment();
        // vendor, platform, hostname, interfaces, then RADIUS primary
        let input = "juniper\njunos\nedge-1\n\n10.1.1.10\n";
        let mut out = Vec::new();

        let answers = prompt(&schema, Cursor::new(input), &mut out).unwrap();
        assert_eq!(answers.get("vendor"), Some(&AnswerValue::Text("juniper".into())));
        assert_eq!(answers.get("platform"), Some(&AnswerValue::Text("junos".into())));
        assert_eq!(answers.get("hostname"), Some(&AnswerValue::Text("edge-1".into())));
        assert!(answers.get("interfaces").is_none());
        assert_eq!(
            answers.get("radius.primary_server"),
            Some(&AnswerValue::Text("10.1.1.10".into()))
        );

        let settings = schema.collect(&answers).unwrap();
        assert_eq!(settings.vendor, "juniper");
        assert_eq!(settings.hostname.as_deref(), Some("edge-1"));
    }

    #[test]
    fn test_prompt_retries_invalid_answer() {
        colored::control::set_override(false);
        let schema = Schema::deployment();
        let input = "netgear\ncisco\n";
        let mut out = Vec::new();

        let answers = prompt(&schema, Cursor::new(input), &mut out).unwrap();
        assert_eq!(answers.get("vendor"), Some(&AnswerValue::Text("cisco".into())));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("'netgear' is not one of"));
    }

    #[test]
    fn test_prompt_offers_vendor_platforms() {
        colored::control::set_override(false);
        let schema = Schema::deployment();
        // Juniper, then a Cisco platform, then a blank to take the default
        let input = "juniper\nios-xe\n\n";
        let mut out = Vec::new();

        let answers = prompt(&schema, Cursor::new(input), &mut out).unwrap();
        assert!(answers.get("platform").is_none());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("'ios-xe' is not one of: junos"));
        assert!(text.contains("[one of junos, default junos]"));

        let settings = schema.collect(&answers).unwrap();
        assert_eq!(settings.platform, "junos");
    }

    #[test]
    fn test_masked_hides_secrets() {
        let schema = Schema::deployment();
        let mut answers = Answers::new();
        answers.set("radius.shared_secret", "super-secret-value");
        answers.set("vlans.data", AnswerValue::Int(10));

        let shown = masked(&schema, &answers);
        assert!(shown.contains(&("radius.shared_secret".to_string(), "********".to_string())));
        assert!(shown.contains(&("vlans.data".to_string(), "10".to_string())));
    }
}
