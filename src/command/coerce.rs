//! Parameter coercion table
//!
//! Converts a literal token into a typed [`Arg`] for a declared [`ParamKind`].
//! Pure function of (kind, token): no side effects, no logging.

use crate::core::error::DispatchError;
use crate::core::types::{Arg, ParamKind};

/// Coerce `token` to `kind`
///
/// Integers are base 10 and must fit the kind's width; unsigned kinds take no
/// sign prefix at all. Floats accept decimal
/// and exponent notation at the kind's precision. Booleans accept `1 t T TRUE
/// true True` and `0 f F FALSE false False`. Strings are taken verbatim.
pub fn coerce(kind: ParamKind, token: &str) -> Result<Arg, DispatchError> {
    let arg = match kind {
        ParamKind::Int => token.parse().ok().map(Arg::Int),
        ParamKind::I8 => token.parse().ok().map(Arg::I8),
        ParamKind::I16 => token.parse().ok().map(Arg::I16),
        ParamKind::I32 => token.parse().ok().map(Arg::I32),
        ParamKind::I64 => token.parse().ok().map(Arg::I64),
        ParamKind::Uint => parse_unsigned(token).map(Arg::Uint),
        ParamKind::U8 => parse_unsigned(token).map(Arg::U8),
        ParamKind::U16 => parse_unsigned(token).map(Arg::U16),
        ParamKind::U32 => parse_unsigned(token).map(Arg::U32),
        ParamKind::U64 => parse_unsigned(token).map(Arg::U64),
        ParamKind::F32 => parse_f32(token).map(Arg::F32),
        ParamKind::F64 => parse_f64(token).map(Arg::F64),
        ParamKind::Bool => parse_bool(token).map(Arg::Bool),
        ParamKind::Str => Some(Arg::Str(token.to_string())),
        ParamKind::Unsupported(_) => None,
    };

    arg.ok_or_else(|| DispatchError::InvalidParam {
        kind,
        token: token.to_string(),
    })
}

fn parse_unsigned<T: std::str::FromStr>(token: &str) -> Option<T> {
    if token.starts_with('+') {
        return None;
    }
    token.parse().ok()
}

fn parse_bool(token: &str) -> Option<bool> {
    match token {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

// Finite text that overflows to infinity at the target precision is out of range.
fn names_infinity(token: &str) -> bool {
    let digits = token.trim_start_matches(['+', '-']);
    digits.eq_ignore_ascii_case("inf") || digits.eq_ignore_ascii_case("infinity")
}

fn parse_f32(token: &str) -> Option<f32> {
    let value: f32 = token.parse().ok()?;
    if value.is_infinite() && !names_infinity(token) {
        return None;
    }
    Some(value)
}

fn parse_f64(token: &str) -> Option<f64> {
    let value: f64 = token.parse().ok()?;
    if value.is_infinite() && !names_infinity(token) {
        return None;
    }
    Some(value)
}
