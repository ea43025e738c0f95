//! Conversions from stored parameter text into typed values.
//!
//! The set of target types is closed: [`ParamValue`] is sealed and only the
//! types listed in [`ParamKind`] implement it.

use std::fmt;
use std::str::FromStr;

/// The target types a parameter can be read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Text,
    Integer,
    Long,
    Word,
    Float,
    Double,
    Boolean,
}

impl ParamKind {
    pub const fn name(self) -> &'static str {
        match self {
            ParamKind::Text => "text",
            ParamKind::Integer => "integer",
            ParamKind::Long => "long",
            ParamKind::Word => "word",
            ParamKind::Float => "float",
            ParamKind::Double => "double",
            ParamKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for String {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for isize {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for bool {}
}

/// A type a stored parameter can be converted into.
pub trait ParamValue: sealed::Sealed + Sized {
    const KIND: ParamKind;

    /// Parse the full stored text, or `None` if any of it is left over.
    fn from_param(raw: &str) -> Option<Self>;
}

impl ParamValue for String {
    const KIND: ParamKind = ParamKind::Text;

    fn from_param(raw: &str) -> Option<Self> {
        Some(raw.to_owned())
    }
}

/// Leading whitespace is skipped, trailing content of any kind is not.
///
/// Vertical tab counts as whitespace here, unlike `char::is_ascii_whitespace`.
fn scalar_token(raw: &str) -> &str {
    raw.trim_start_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r'))
}

fn parse_exact<T: FromStr>(raw: &str) -> Option<T> {
    scalar_token(raw).parse().ok()
}

macro_rules! integer_param {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl ParamValue for $ty {
                const KIND: ParamKind = $kind;

                fn from_param(raw: &str) -> Option<Self> {
                    parse_exact(raw)
                }
            }
        )*
    };
}

integer_param! {
    i32 => ParamKind::Integer,
    i64 => ParamKind::Long,
    isize => ParamKind::Word,
}

// `str::parse` accepts "inf", "nan" and saturates overflow to infinity;
// stored parameters must be finite numbers.
impl ParamValue for f32 {
    const KIND: ParamKind = ParamKind::Float;

    fn from_param(raw: &str) -> Option<Self> {
        parse_exact::<f32>(raw).filter(|v| v.is_finite())
    }
}

impl ParamValue for f64 {
    const KIND: ParamKind = ParamKind::Double;

    fn from_param(raw: &str) -> Option<Self> {
        parse_exact::<f64>(raw).filter(|v| v.is_finite())
    }
}

impl ParamValue for bool {
    const KIND: ParamKind = ParamKind::Boolean;

    fn from_param(raw: &str) -> Option<Self> {
        match scalar_token(raw) {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}
