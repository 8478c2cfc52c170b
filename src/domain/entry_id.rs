//! Type-safe entry identifier.
//!
//! [`EntryId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so that entry
//! identifiers cannot be confused with user references or other UUIDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier for a stored spreadsheet entry.
///
/// Assigned by the entry store on create and immutable thereafter. A restore
/// from a snapshot always mints a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(uuid::Uuid);

impl EntryId {
    /// Creates a new random `EntryId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates an `EntryId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<uuid::Uuid> for EntryId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<EntryId> for uuid::Uuid {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(EntryId::new(), EntryId::new());
    }

    #[test]
    fn display_is_hyphenated_uuid() {
        let uuid = uuid::Uuid::new_v4();
        let shown = EntryId::from_uuid(uuid).to_string();
        assert_eq!(shown.len(), 36);
        assert_eq!(shown, uuid.hyphenated().to_string());
    }

    #[test]
    fn serializes_as_bare_uuid_string() {
        let id = EntryId::new();
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn parses_from_str() {
        let uuid = uuid::Uuid::new_v4();
        let Ok(id) = uuid.to_string().parse::<EntryId>() else {
            panic!("parse failed");
        };
        assert_eq!(*id.as_uuid(), uuid);
        assert!("not-a-uuid".parse::<EntryId>().is_err());
    }
}
