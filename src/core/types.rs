//! Scalar parameter kinds and coerced argument values

use std::fmt;

/// Declared kind of a handler parameter
///
/// Every handler parameter maps to exactly one kind. `Unsupported` carries the
/// name of a type the coercion table cannot produce; such a parameter fails at
/// invocation time, never at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Platform-width signed integer
    Int,
    I8,
    I16,
    I32,
    I64,
    /// Platform-width unsigned integer
    Uint,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    Str,
    Unsupported(&'static str),
}

impl ParamKind {
    /// Name used in coercion error messages
    pub fn name(&self) -> &'static str {
        match self {
            ParamKind::Int => "int",
            ParamKind::I8 => "int8",
            ParamKind::I16 => "int16",
            ParamKind::I32 => "int32",
            ParamKind::I64 => "int64",
            ParamKind::Uint => "uint",
            ParamKind::U8 => "uint8",
            ParamKind::U16 => "uint16",
            ParamKind::U32 => "uint32",
            ParamKind::U64 => "uint64",
            ParamKind::F32 => "float32",
            ParamKind::F64 => "float64",
            ParamKind::Bool => "bool",
            ParamKind::Str => "string",
            ParamKind::Unsupported(_) => "kind",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A literal token after coercion to its parameter kind
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(isize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Uint(usize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Str(String),
}

impl Arg {
    /// The kind this value was coerced to
    pub fn kind(&self) -> ParamKind {
        match self {
            Arg::Int(_) => ParamKind::Int,
            Arg::I8(_) => ParamKind::I8,
            Arg::I16(_) => ParamKind::I16,
            Arg::I32(_) => ParamKind::I32,
            Arg::I64(_) => ParamKind::I64,
            Arg::Uint(_) => ParamKind::Uint,
            Arg::U8(_) => ParamKind::U8,
            Arg::U16(_) => ParamKind::U16,
            Arg::U32(_) => ParamKind::U32,
            Arg::U64(_) => ParamKind::U64,
            Arg::F32(_) => ParamKind::F32,
            Arg::F64(_) => ParamKind::F64,
            Arg::Bool(_) => ParamKind::Bool,
            Arg::Str(_) => ParamKind::Str,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Arg::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Widen any integer kind to i64 (fails for u64 values above i64::MAX)
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Arg::Int(v) => i64::try_from(v).ok(),
            Arg::I8(v) => Some(v.into()),
            Arg::I16(v) => Some(v.into()),
            Arg::I32(v) => Some(v.into()),
            Arg::I64(v) => Some(v),
            Arg::Uint(v) => i64::try_from(v).ok(),
            Arg::U8(v) => Some(v.into()),
            Arg::U16(v) => Some(v.into()),
            Arg::U32(v) => Some(v.into()),
            Arg::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Arg::F32(v) => Some(v.into()),
            Arg::F64(v) => Some(v),
            _ => None,
        }
    }
}
