//! Rut module - the entity identifier

use std::fmt;

/// Tax identifier of an entity (RUT)
///
/// Opaque token, trimmed and uppercased on construction so that `12345678-k`
/// and `12345678-K` address the same entity.
///
/// # Examples
///
/// ```
/// use rubro_domain::Rut;
///
/// let rut = Rut::new(" 76543210-k ");
/// assert_eq!(rut.as_str(), "76543210-K");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rut(String);

impl Rut {
    /// Create a normalized RUT
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_uppercase())
    }

    /// Get the normalized identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty after normalization
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A token safe to embed in a file name
    ///
    /// Path separators and other characters outside `[A-Z0-9.-]` are replaced
    /// with `_`.
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Rut {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Rut {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
