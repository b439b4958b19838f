//! Outcome of a best-effort parse.

use serde::Serialize;

/// Result of a heuristic parse that never fails outright.
///
/// Both variants carry a usable value; `RawFallback` means the parser did not
/// recognise the input and handed back a pass-through rendition of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Parsed<T> {
    /// The input was understood and normalized.
    Structured(T),
    /// Nothing was recognised; the value preserves the original input.
    RawFallback(T),
}

impl<T> Parsed<T> {
    /// Whether the parser fell back to raw input.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Parsed::RawFallback(_))
    }

    /// Borrow the carried value.
    pub fn value(&self) -> &T {
        match self {
            Parsed::Structured(v) | Parsed::RawFallback(v) => v,
        }
    }

    /// Take the carried value, discarding the parse outcome.
    pub fn into_inner(self) -> T {
        match self {
            Parsed::Structured(v) | Parsed::RawFallback(v) => v,
        }
    }
}
