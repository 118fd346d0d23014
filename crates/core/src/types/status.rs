//! Status and classification enums for customers.

use serde::{Deserialize, Serialize};

/// Kind of customer an account belongs to.
///
/// Serialized with the exact casing the frontend sends (`"Individual"`,
/// `"Business"`). Any other value is rejected during deserialization. Stored
/// as `TEXT` and converted through [`FromStr`](std::str::FromStr).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CustomerType {
    /// A private person.
    #[default]
    Individual,
    /// A company or other organisation.
    Business,
}

impl CustomerType {
    /// All accepted values, in display order.
    pub const ALL: [Self; 2] = [Self::Individual, Self::Business];

    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Business => "Business",
        }
    }
}

impl std::fmt::Display for CustomerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CustomerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Individual" => Ok(Self::Individual),
            "Business" => Ok(Self::Business),
            _ => Err(format!(
                "customerType must be one of: Individual, Business (got '{s}')"
            )),
        }
    }
}
