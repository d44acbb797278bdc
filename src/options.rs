// Copyright 2025 Cowboy AI, LLC.

//! Flat option-token machinery
//!
//! Algorithm configurations are exchanged as flat lists of option tokens
//! (`-M 2 -V 0.001`). Composite slots embed a child's whole token stream as a
//! single quoted token, so joining and splitting must agree on quoting rules:
//! a token containing whitespace, quotes, or backslashes is double-quoted with
//! `\"` and `\\` escapes. `split_options` is the exact inverse of
//! `join_options`.

use crate::errors::{FlowError, FlowResult};

/// Returns true when a token must be quoted before joining
fn needs_quoting(token: &str) -> bool {
    token.is_empty() || token.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\')
}

/// Quote a single token, escaping embedded quotes and backslashes
pub fn quote_token(token: &str) -> String {
    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('"');
    for c in token.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

/// Join option tokens into a single space-separated string
///
/// Tokens that contain whitespace, quotes, or backslashes are quoted so the
/// result can be split back into the original token list.
pub fn join_options(tokens: &[String]) -> String {
    let mut parts = Vec::with_capacity(tokens.len());
    for token in tokens {
        if needs_quoting(token) {
            parts.push(quote_token(token));
        } else {
            parts.push(token.clone());
        }
    }
    parts.join(" ")
}

/// Split a space-separated option string back into tokens
///
/// # Errors
///
/// Returns [`FlowError::MalformedParameterEncoding`] when a quoted segment is
/// never closed.
pub fn split_options(input: &str) -> FlowResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut token = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => match chars.next() {
                        Some(escaped) => token.push(escaped),
                        None => {
                            return Err(FlowError::malformed(
                                "option-string",
                                "dangling escape at end of input",
                            ))
                        }
                    },
                    '"' => {
                        closed = true;
                        break;
                    }
                    other => token.push(other),
                }
            }
            if !closed {
                return Err(FlowError::malformed(
                    "option-string",
                    "unbalanced quote in option string",
                ));
            }
            tokens.push(token);
        } else {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
            tokens.push(token);
        }
    }

    Ok(tokens)
}
