//! Token-level helpers shared by the tree builder and the entity decoders.
//!
//! Splitting is shell-like: whitespace separates tokens and a pair of single
//! or double quotes groups everything between them into one token. Quote
//! characters stay in the token so callers can tell a string literal from a
//! bare identifier; [`unquote`] removes them.
//!
//! The numeric decoders return `None` for anything that does not parse, so
//! decoders can probe tokens without treating a miss as an error.

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

/// Split one line into tokens, honoring quotes.
///
/// A line with an unterminated quote is split on whitespace alone.
pub fn split_tokens(line: &str) -> Vec<String> {
    split_quoted(line).unwrap_or_else(|| split_whitespace(line))
}

/// Plain whitespace splitting with no quote handling.
pub fn split_whitespace(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
}

/// Quote-aware splitting. Returns `None` when a quote is left open.
fn split_quoted(line: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == '\\' && q == '"' {
                    // Escaped character inside a double-quoted string
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    current.push(c);
                    in_token = true;
                }
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if quote.is_some() {
        return None;
    }
    if in_token {
        tokens.push(current);
    }
    Some(tokens)
}

// ---------------------------------------------------------------------------
// Quoting
// ---------------------------------------------------------------------------

/// Whether the token is wrapped in one matching pair of single or double quotes.
pub fn is_quoted(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() >= 2
        && matches!(bytes[0], b'"' | b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
}

/// Strip one layer of matching quotes, or return the token unchanged.
pub fn unquote(token: &str) -> &str {
    if is_quoted(token) {
        &token[1..token.len() - 1]
    } else {
        token
    }
}

/// Join tokens with single spaces and strip one layer of quotes from the result.
pub fn join_unquoted(tokens: &[String]) -> String {
    unquote(&tokens.join(" ")).to_string()
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// Decode an integer: `0x`/`0X` prefix means hexadecimal, anything else is
/// base 10 with an optional sign.
pub fn parse_int(token: &str) -> Option<i64> {
    let token = token.trim();
    match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(digits) => {
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return None;
            }
            i64::from_str_radix(digits, 16).ok()
        }
        None => token.parse().ok(),
    }
}

/// Decode a floating-point value in standard decimal notation.
pub fn parse_float(token: &str) -> Option<f64> {
    token.trim().parse().ok()
}

/// Decode any numeric token as a float, accepting hexadecimal integers too.
pub fn parse_number(token: &str) -> Option<f64> {
    parse_float(token).or_else(|| parse_int(token).map(|value| value as f64))
}

pub fn is_numeric(token: &str) -> bool {
    parse_number(token).is_some()
}

// ---------------------------------------------------------------------------
// Bracket markers
// ---------------------------------------------------------------------------

pub fn is_begin_marker(token: &str) -> bool {
    token.eq_ignore_ascii_case("/begin")
}

pub fn is_end_marker(token: &str) -> bool {
    token.eq_ignore_ascii_case("/end")
}
