//! JSON Pointer helpers (RFC 6901).
//!
//! Pointers locate nodes inside the input document for error reporting.
//! References (`$ref`) are pointer-like strings too, but only their final
//! segment is ever significant to the generator.

use std::fmt;

/// A JSON Pointer built segment by segment from the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonPointer(String);

impl JsonPointer {
    /// The empty pointer, addressing the whole document.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new pointer with `segment` appended.
    ///
    /// Escaping rules: `~` -> `~0`, `/` -> `~1`
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut path: String = String::with_capacity(self.0.len() + segment.len() + 1);
        path.push_str(&self.0);
        path.push('/');
        for c in segment.chars() {
            match c {
                '~' => path.push_str("~0"),
                '/' => path.push_str("~1"),
                other => path.push(other),
            }
        }
        Self(path)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the final `/`-separated segment of a reference string.
///
/// No unescaping is applied: `#/components/schemas/Pet` yields `Pet`, and a
/// reference without any `/` is returned unchanged.
#[must_use]
pub fn last_segment(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}
