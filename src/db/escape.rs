//! Lexical helpers for SQL text: identifier quoting and placeholder scanning.
//!
//! Neither helper is a SQL parser. Quoting only touches plain (optionally
//! dotted) identifiers and leaves expressions alone; scanning only needs to
//! know enough about string literals and comments to avoid treating a `?` or
//! `:name` inside them as a placeholder.

/// How identifiers (tables, columns) are quoted in generated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteStyle {
    /// Identifiers are emitted as given.
    #[default]
    None,
    /// ANSI double quotes (`"users"."id"`), used by SQLite and PostgreSQL.
    Double,
    /// MySQL-style backticks.
    Backtick,
}

impl QuoteStyle {
    fn quote_char(self) -> Option<char> {
        match self {
            QuoteStyle::None => None,
            QuoteStyle::Double => Some('"'),
            QuoteStyle::Backtick => Some('`'),
        }
    }

    /// Quote a column or table reference.
    ///
    /// Handles `table.column`, `*`, `table.*` and a trailing `AS alias`.
    /// Anything that is not a plain identifier (function calls, arithmetic,
    /// already-quoted names) is returned unchanged.
    pub fn quote(self, expr: &str) -> String {
        let Some(q) = self.quote_char() else {
            return expr.to_string();
        };
        let expr = expr.trim();

        if let Some((target, alias)) = split_alias(expr) {
            if is_identifier(alias) {
                return format!("{} AS {}", self.quote(target), quote_part(alias, q));
            }
            return expr.to_string();
        }

        let parts: Vec<&str> = expr.split('.').collect();
        let last = parts.len() - 1;
        let plain = parts
            .iter()
            .enumerate()
            .all(|(i, p)| is_identifier(p) || (i == last && *p == "*" && last > 0));
        if !plain {
            return expr.to_string();
        }
        parts
            .iter()
            .map(|p| if *p == "*" { "*".to_string() } else { quote_part(p, q) })
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn quote_part(part: &str, q: char) -> String {
    let doubled = format!("{q}{q}");
    format!("{q}{}{q}", part.replace(q, &doubled))
}

fn split_alias(expr: &str) -> Option<(&str, &str)> {
    let lower = expr.to_ascii_lowercase();
    let idx = lower.rfind(" as ")?;
    Some((expr[..idx].trim(), expr[idx + 4..].trim()))
}

/// True for `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A placeholder found in SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// `?`
    Positional,
    /// `:name` (name stored without the colon)
    Named(String),
}

/// Byte span of a placeholder within the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSpan {
    pub start: usize,
    pub end: usize,
    pub placeholder: Placeholder,
}

/// Find every `?` and `:name` placeholder outside string literals, quoted
/// identifiers and comments. `::` casts are not placeholders.
pub fn scan_placeholders(sql: &str) -> Vec<PlaceholderSpan> {
    let bytes = sql.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i = skip_quoted(bytes, i, quote);
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
            }
            b'?' => {
                spans.push(PlaceholderSpan {
                    start: i,
                    end: i + 1,
                    placeholder: Placeholder::Positional,
                });
                i += 1;
            }
            b':' if bytes.get(i + 1) == Some(&b':') => {
                i += 2;
            }
            b':' if bytes
                .get(i + 1)
                .is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_') =>
            {
                let start = i;
                i += 1;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                spans.push(PlaceholderSpan {
                    start,
                    end: i,
                    placeholder: Placeholder::Named(sql[start + 1..i].to_string()),
                });
            }
            _ => i += 1,
        }
    }

    spans
}

/// Returns the index just past the closing quote. A doubled quote inside the
/// literal is an escaped quote.
fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Rebuild `sql`, replacing each span with the text produced by `render`.
/// `render` receives the span and its zero-based ordinal.
pub fn replace_placeholders<F>(sql: &str, spans: &[PlaceholderSpan], mut render: F) -> String
where
    F: FnMut(&PlaceholderSpan, usize) -> String,
{
    let mut out = String::with_capacity(sql.len() + spans.len() * 2);
    let mut cursor = 0;
    for (ordinal, span) in spans.iter().enumerate() {
        out.push_str(&sql[cursor..span.start]);
        out.push_str(&render(span, ordinal));
        cursor = span.end;
    }
    out.push_str(&sql[cursor..]);
    out
}
