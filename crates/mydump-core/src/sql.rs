//! Identifier quoting and value literals for the MySQL dialect.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Text emitted for SQL `NULL` values.
pub const NULL_LITERAL: &str = "null";

/// Wrap an identifier in backticks, doubling any embedded backtick.
pub fn quote_identifier(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('`');
    for ch in name.chars() {
        if ch == '`' {
            quoted.push('`');
        }
        quoted.push(ch);
    }
    quoted.push('`');
    quoted
}

/// How non-null values are turned into string literals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralMode {
    /// Wrap the raw text in single quotes without escaping.
    ///
    /// Values containing `'` or `\` produce malformed statements.
    #[default]
    Raw,
    /// Escape backslashes and single quotes with a backslash.
    Escaped,
}

/// Render one column value as a SQL literal.
pub fn value_literal(value: Option<&str>, mode: LiteralMode) -> Cow<'static, str> {
    match value {
        None => Cow::Borrowed(NULL_LITERAL),
        Some(text) => match mode {
            LiteralMode::Raw => Cow::Owned(format!("'{text}'")),
            LiteralMode::Escaped => Cow::Owned(format!("'{}'", escape_string(text))),
        },
    }
}

/// Render a row as a parenthesized, comma-separated value tuple.
pub fn value_tuple<'a, I>(values: I, mode: LiteralMode) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let literals: Vec<_> = values
        .into_iter()
        .map(|value| value_literal(value, mode))
        .collect();
    format!("({})", literals.join(","))
}

fn escape_string(text: &str) -> Cow<'_, str> {
    if !text.contains(['\'', '\\']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        if matches!(ch, '\'' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    Cow::Owned(escaped)
}
