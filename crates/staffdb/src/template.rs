//! Positional placeholder handling for insert templates.
//!
//! Templates are written with JDBC-style `?` placeholders. Postgres expects
//! numbered `$n` parameters, so [`SqlTemplate::parse`] rewrites each `?` in
//! order while tracking the parameter index, leaving string literals,
//! dollar-quoted bodies, quoted identifiers and comments untouched. A `$`
//! inside an unquoted identifier (`col$1`) is part of the name, not a
//! parameter.

use crate::errors::BindingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    Literal,
    Identifier,
    DollarQuote,
    LineComment,
    BlockComment,
}

/// A parsed insert template ready to be prepared once and bound per entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTemplate {
    sql: String,
    placeholders: usize,
}

impl SqlTemplate {
    /// Parses a template, rewriting `?` placeholders to `$1..$n`.
    ///
    /// A template already written with `$n` parameters is kept verbatim; its
    /// placeholder count is the highest index used.
    pub fn parse(template: &str) -> Result<Self, BindingError> {
        if template.trim().is_empty() {
            return Err(BindingError::EmptyTemplate);
        }

        let mut sql = String::with_capacity(template.len() + 8);
        let mut question_marks = 0usize;
        let mut max_numbered = 0usize;
        let mut state = Scan::Code;
        let mut dollar_tag = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match state {
                Scan::Code => match c {
                    '?' => {
                        question_marks += 1;
                        sql.push_str(&format!("${question_marks}"));
                        continue;
                    }
                    '\'' => state = Scan::Literal,
                    '"' => state = Scan::Identifier,
                    '-' if chars.peek() == Some(&'-') => state = Scan::LineComment,
                    '/' if chars.peek() == Some(&'*') => state = Scan::BlockComment,
                    '$' if continues_identifier(&sql) => {}
                    '$' if chars.peek().is_some_and(char::is_ascii_digit) => {
                        let mut digits = String::new();
                        while let Some(d) = chars.next_if(char::is_ascii_digit) {
                            digits.push(d);
                        }
                        let idx = digits.parse::<usize>().unwrap_or(0);
                        max_numbered = max_numbered.max(idx);
                        sql.push('$');
                        sql.push_str(&digits);
                        continue;
                    }
                    '$' => {
                        if let Some(tag) = dollar_quote_tag(chars.clone()) {
                            sql.push(c);
                            sql.extend(chars.by_ref().take(tag.chars().count() + 1));
                            dollar_tag = tag;
                            state = Scan::DollarQuote;
                            continue;
                        }
                    }
                    _ => {}
                },
                Scan::DollarQuote
                    if c == '$' && closes_dollar_quote(chars.clone(), &dollar_tag) =>
                {
                    sql.push(c);
                    sql.extend(chars.by_ref().take(dollar_tag.chars().count() + 1));
                    state = Scan::Code;
                    continue;
                }
                Scan::Literal if c == '\'' => state = Scan::Code,
                Scan::Identifier if c == '"' => state = Scan::Code,
                Scan::LineComment if c == '\n' => state = Scan::Code,
                Scan::BlockComment if c == '*' && chars.peek() == Some(&'/') => {
                    sql.push(c);
                    if let Some(slash) = chars.next() {
                        sql.push(slash);
                    }
                    state = Scan::Code;
                    continue;
                }
                _ => {}
            }
            sql.push(c);
        }

        if question_marks > 0 && max_numbered > 0 {
            return Err(BindingError::MixedPlaceholders);
        }

        Ok(Self {
            sql,
            placeholders: question_marks.max(max_numbered),
        })
    }

    /// The rewritten statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of positional parameters the statement expects.
    pub fn placeholders(&self) -> usize {
        self.placeholders
    }
}

/// True when the last emitted character belongs to an unquoted identifier.
fn continues_identifier(sql: &str) -> bool {
    sql.chars()
        .next_back()
        .is_some_and(|p| p.is_alphanumeric() || p == '_' || p == '$')
}

/// Tag of a `$$` or `$tag$` opener, given the input after its first `$`.
fn dollar_quote_tag(rest: impl Iterator<Item = char>) -> Option<String> {
    let mut tag = String::new();
    for c in rest {
        match c {
            '$' => return Some(tag),
            c if c.is_alphanumeric() || c == '_' => tag.push(c),
            _ => return None,
        }
    }
    None
}

fn closes_dollar_quote(mut rest: impl Iterator<Item = char>, tag: &str) -> bool {
    tag.chars().all(|t| rest.next() == Some(t)) && rest.next() == Some('$')
}
