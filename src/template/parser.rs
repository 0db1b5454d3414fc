//! Template tokenizer and tree builder
//!
//! Parsing happens in three passes:
//!
//! 1. tokenize the source into text runs and tags, recording line numbers
//! 2. strip the lines that hold nothing but a section or comment tag
//! 3. fold the token stream into a [`Node`] tree, rejecting unbalanced tags

use super::error::{Result, TemplateError};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A parsed template node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text copied to the output
    Text(String),

    /// `{{name}}`
    Variable(String),

    /// `{{#name}}...{{/name}}` or, when `inverted`, `{{^name}}...{{/name}}`
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Variable,
    Section,
    Inverted,
    Close,
    Comment,
}

impl TagKind {
    /// Block tags produce no output of their own and may sit on a line alone
    fn is_block(self) -> bool {
        !matches!(self, Self::Variable)
    }
}

#[derive(Debug)]
enum Token {
    Text(String),
    Tag {
        kind: TagKind,
        name: String,
        line: usize,
    },
}

/// Parse template source into a node tree
pub fn parse(source: &str) -> Result<Vec<Node>> {
    let mut tokens = tokenize(source)?;
    strip_standalone_lines(&mut tokens);
    build_tree(tokens)
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut line = 1;

    while let Some(start) = rest.find(OPEN) {
        let (text, after_text) = rest.split_at(start);
        if !text.is_empty() {
            tokens.push(Token::Text(text.to_string()));
        }
        line += text.matches('\n').count();

        let body_start = &after_text[OPEN.len()..];
        let end = body_start
            .find(CLOSE)
            .ok_or(TemplateError::UnterminatedTag { line })?;
        let body = &body_start[..end];

        tokens.push(parse_tag(body, line)?);

        line += body.matches('\n').count();
        rest = &body_start[end + CLOSE.len()..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_string()));
    }

    Ok(tokens)
}

fn parse_tag(body: &str, line: usize) -> Result<Token> {
    let body = body.trim();
    let (kind, name) = match body.chars().next() {
        Some('#') => (TagKind::Section, &body[1..]),
        Some('^') => (TagKind::Inverted, &body[1..]),
        Some('/') => (TagKind::Close, &body[1..]),
        Some('!') => (TagKind::Comment, &body[1..]),
        _ => (TagKind::Variable, body),
    };
    let name = name.trim();

    if kind != TagKind::Comment {
        if name.is_empty() {
            return Err(TemplateError::EmptyTag { line });
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(TemplateError::InvalidName {
                name: name.to_string(),
                line,
            });
        }
    }

    Ok(Token::Tag {
        kind,
        name: name.to_string(),
        line,
    })
}

/// Remove the surrounding whitespace and newline of block tags that sit
/// alone on their line.
///
/// Standalone status is decided against the untouched token stream first;
/// the trims are applied afterwards so that consecutive block lines are all
/// recognised.
fn strip_standalone_lines(tokens: &mut [Token]) {
    let last = tokens.len().saturating_sub(1);
    let mut standalone = vec![false; tokens.len()];

    for (i, token) in tokens.iter().enumerate() {
        let Token::Tag { kind, .. } = token else {
            continue;
        };
        if !kind.is_block() {
            continue;
        }

        let prev_ok = i == 0
            || match &tokens[i - 1] {
                Token::Text(t) => {
                    let tail = t.rsplit('\n').next().unwrap_or_default();
                    is_blank(tail) && (t.contains('\n') || i - 1 == 0)
                }
                Token::Tag { .. } => false,
            };
        let next_ok = i == last
            || match &tokens[i + 1] {
                Token::Text(t) => {
                    let head = t.split('\n').next().unwrap_or_default();
                    is_blank(head) && (t.contains('\n') || i + 1 == last)
                }
                Token::Tag { .. } => false,
            };

        standalone[i] = prev_ok && next_ok;
    }

    // (start, end) byte bounds kept for each text token
    let mut bounds: Vec<(usize, usize)> = tokens
        .iter()
        .map(|t| match t {
            Token::Text(s) => (0, s.len()),
            Token::Tag { .. } => (0, 0),
        })
        .collect();

    for i in (0..tokens.len()).filter(|&i| standalone[i]) {
        if i > 0 {
            if let Token::Text(t) = &tokens[i - 1] {
                bounds[i - 1].1 = t.rfind('\n').map_or(0, |p| p + 1);
            }
        }
        if i < last {
            if let Token::Text(t) = &tokens[i + 1] {
                bounds[i + 1].0 = t.find('\n').map_or(t.len(), |p| p + 1);
            }
        }
    }

    for (token, (start, end)) in tokens.iter_mut().zip(bounds) {
        if let Token::Text(t) = token {
            let end = end.max(start);
            *t = t[start..end].to_string();
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.chars().all(|c| c == ' ' || c == '\t' || c == '\r')
}

struct OpenSection {
    name: String,
    inverted: bool,
    line: usize,
    children: Vec<Node>,
}

fn build_tree(tokens: Vec<Token>) -> Result<Vec<Node>> {
    let mut root = Vec::new();
    let mut stack: Vec<OpenSection> = Vec::new();

    for token in tokens {
        let node = match token {
            Token::Text(t) if t.is_empty() => continue,
            Token::Text(t) => Node::Text(t),
            Token::Tag { kind, name, line } => match kind {
                TagKind::Comment => continue,
                TagKind::Variable => Node::Variable(name),
                TagKind::Section | TagKind::Inverted => {
                    stack.push(OpenSection {
                        name,
                        inverted: kind == TagKind::Inverted,
                        line,
                        children: Vec::new(),
                    });
                    continue;
                }
                TagKind::Close => {
                    let open = stack
                        .pop()
                        .ok_or_else(|| TemplateError::UnexpectedClose {
                            name: name.clone(),
                            line,
                        })?;
                    if open.name != name {
                        return Err(TemplateError::MismatchedClose {
                            expected: open.name,
                            found: name,
                            line,
                        });
                    }
                    Node::Section {
                        name: open.name,
                        inverted: open.inverted,
                        children: open.children,
                    }
                }
            },
        };

        match stack.last_mut() {
            Some(open) => open.children.push(node),
            None => root.push(node),
        }
    }

    if let Some(open) = stack.pop() {
        return Err(TemplateError::UnclosedSection {
            name: open.name,
            line: open.line,
        });
    }

    Ok(root)
}
