/// Listing lifecycle states for stored listings
use std::fmt;

/// Represents the lifecycle state of a stored listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingState {
    /// Listing resolved on the marketplace the last time it was checked
    Active,

    /// Listing confirmed gone (HTTP 410); kept in storage, excluded from refreshes
    Deleted,
}

impl ListingState {
    /// Returns true if the listing should take part in calendar refreshes
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Converts the listing state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }

    /// Parses a listing state from its database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Returns all possible listing states
    pub fn all_states() -> Vec<Self> {
        vec![Self::Active, Self::Deleted]
    }
}

impl fmt::Display for ListingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
