//! Tree-walking renderer

use tracing::debug;

use super::context::{Context, Value};
use super::parser::Node;

/// Lookup stack; inner frames shadow outer ones
struct Scope<'a> {
    frames: Vec<&'a Context>,
}

impl<'a> Scope<'a> {
    fn lookup(&self, name: &str) -> Option<&'a Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}

pub(super) fn render(nodes: &[Node], context: &Context) -> String {
    let mut out = String::new();
    let mut scope = Scope {
        frames: vec![context],
    };
    render_nodes(nodes, &mut scope, &mut out);
    out
}

fn render_nodes<'a>(nodes: &'a [Node], scope: &mut Scope<'a>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),

            Node::Variable(name) => match scope.lookup(name) {
                Some(value) => out.push_str(&value.render()),
                None => debug!(variable = %name, "template variable not in context"),
            },

            Node::Section {
                name,
                inverted,
                children,
            } => {
                let value = scope.lookup(name);
                let truthy = value.is_some_and(Value::is_truthy);

                if *inverted {
                    if !truthy {
                        render_nodes(children, scope, out);
                    }
                    continue;
                }

                match value {
                    Some(Value::List(items)) => {
                        for item in items {
                            scope.frames.push(item);
                            render_nodes(children, scope, out);
                            scope.frames.pop();
                        }
                    }
                    Some(v) if v.is_truthy() => render_nodes(children, scope, out),
                    _ => {}
                }
            }
        }
    }
}
