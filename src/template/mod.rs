//! Logic-less configuration templates
//!
//! A small Mustache-style language parsed into a typed tree. Structural
//! problems (unbalanced or overlapping sections, unterminated tags) are
//! rejected at parse time, so a parsed [`Template`] always renders.
//!
//! # Syntax
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `{{name}}` | substitute the value of `name` (empty when missing) |
//! | `{{#name}}...{{/name}}` | render the body when `name` is truthy; once per item for lists |
//! | `{{^name}}...{{/name}}` | render the body when `name` is falsy or missing |
//! | `{{! text}}` | comment, produces nothing |
//!
//! A section or comment tag that is the only thing on its line takes the
//! whole line with it, so block structure does not leave blank lines in the
//! generated configuration.
//!
//! # Usage
//!
//! ```
//! use nacforge::template::{Context, Template};
//!
//! let template = Template::parse(
//!     "radius server {{name}}\n{{#coa}}\naaa server radius dynamic-author\n{{/coa}}\n",
//! )?;
//! let ctx = Context::new().with("name", "ISE-1").with("coa", false);
//!
//! assert_eq!(template.render(&ctx), "radius server ISE-1\n");
//! # Ok::<(), nacforge::template::TemplateError>(())
//! ```

mod context;
mod error;
mod parser;
mod render;

use std::collections::BTreeSet;
use std::str::FromStr;

pub use context::{Context, Value};
pub use error::{Result, TemplateError};
pub use parser::Node;

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source
    pub fn parse(source: &str) -> Result<Self> {
        Ok(Self {
            nodes: parser::parse(source)?,
        })
    }

    /// Render against a context
    ///
    /// Pure: the same template and context always produce the same text.
    pub fn render(&self, context: &Context) -> String {
        render::render(&self.nodes, context)
    }

    /// Parsed node tree
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Every name referenced by a variable or section tag
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        collect_names(&self.nodes, &mut names);
        names
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn collect_names<'a>(nodes: &'a [Node], names: &mut BTreeSet<&'a str>) {
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Variable(name) => {
                names.insert(name);
            }
            Node::Section { name, children, .. } => {
                names.insert(name);
                collect_names(children, names);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str, ctx: &Context) -> String {
        Template::parse(source).unwrap().render(ctx)
    }

    #[test]
    fn test_variable_substitution() {
        let ctx = Context::new()
            .with("server", "10.1.1.10")
            .with("port", 1812u16);
        assert_eq!(
            render("host {{server}} auth-port {{ port }}", &ctx),
            "host 10.1.1.10 auth-port 1812"
        );
    }

    #[test]
    fn test_missing_variable_renders_empty() {
        assert_eq!(render("key [{{secret}}]", &Context::new()), "key []");
    }

    #[test]
    fn test_section_included_when_truthy() {
        let src = "{{#coa}}dynamic-author{{/coa}}";
        assert_eq!(render(src, &Context::new().with("coa", true)), "dynamic-author");
        assert_eq!(render(src, &Context::new().with("coa", false)), "");
        assert_eq!(render(src, &Context::new()), "");
        assert_eq!(render(src, &Context::new().with("coa", "")), "");
        assert_eq!(render(src, &Context::new().with("coa", 0i64)), "");
        assert_eq!(render(src, &Context::new().with("coa", "yes")), "dynamic-author");
    }

    #[test]
    fn test_inverted_section_included_when_falsy() {
        let src = "{{^secondary}}no backup server{{/secondary}}";
        assert_eq!(render(src, &Context::new()), "no backup server");
        assert_eq!(render(src, &Context::new().with("secondary", "")), "no backup server");
        assert_eq!(render(src, &Context::new().with("secondary", "10.1.1.11")), "");
    }

    #[test]
    fn test_list_section_iterates_with_item_scope() {
        let servers = vec![
            Context::new().with("name", "ISE-1").with("ip", "10.1.1.10"),
            Context::new().with("name", "ISE-2").with("ip", "10.1.1.11"),
        ];
        let ctx = Context::new()
            .with("servers", servers)
            .with("port", 1812u16);
        let out = render(
            "{{#servers}}\nradius server {{name}} {{ip}}:{{port}}\n{{/servers}}\n",
            &ctx,
        );
        assert_eq!(
            out,
            "radius server ISE-1 10.1.1.10:1812\nradius server ISE-2 10.1.1.11:1812\n"
        );
    }

    #[test]
    fn test_empty_list_takes_inverted_branch() {
        let ctx = Context::new().with("servers", Vec::<Context>::new());
        assert_eq!(render("{{^servers}}none{{/servers}}", &ctx), "none");
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let template = Template::parse(
            "aaa group server radius {{group}}\n{{#secondary}}\n server name {{secondary}}\n{{/secondary}}\n",
        )
        .unwrap();
        let ctx = Context::new()
            .with("group", "RADIUS-SERVERS")
            .with("secondary", "ISE-2");
        let first = template.render(&ctx);
        let second = template.render(&ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn test_standalone_block_lines_leave_no_blank_lines() {
        let src = "interface Gi1\n {{#voice}}\n switchport voice vlan {{voice}}\n {{/voice}}\n {{^voice}}\n no switchport voice vlan\n {{/voice}}\n exit\n";
        assert_eq!(
            render(src, &Context::new().with("voice", 20u16)),
            "interface Gi1\n switchport voice vlan 20\n exit\n"
        );
        assert_eq!(
            render(src, &Context::new()),
            "interface Gi1\n no switchport voice vlan\n exit\n"
        );
    }

    #[test]
    fn test_variables_lists_all_referenced_names() {
        let template = Template::parse("{{a}}{{#b}}{{c}}{{/b}}{{^d}}{{/d}}{{! e }}").unwrap();
        let names: Vec<_> = template.variables().into_iter().collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_from_str() {
        let template: Template = "{{x}}".parse().unwrap();
        assert_eq!(template.render(&Context::new().with("x", 1i64)), "1");
        assert!("{{#x}}".parse::<Template>().is_err());
    }
}
