//! Strongly typed identifiers.
//!
//! Every table the feedback subsystem touches is keyed by a UUID. Wrapping
//! each key in its own newtype keeps a `FeedbackId` from being handed to a
//! lookup that expects an `ApprovalId`.
//!
//! ```
//! use guestloop_core::{FeedbackId, TenantId};
//!
//! let tenant = TenantId::new();
//! let feedback = FeedbackId::new();
//!
//! fn scoped(tenant: TenantId, feedback: FeedbackId) -> String {
//!     format!("{tenant}/{feedback}")
//! }
//!
//! let key = scoped(tenant, feedback);
//! // scoped(feedback, tenant); // does not compile
//! # assert_eq!(key.len(), 73);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Error returned when a string is not a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// Name of the identifier type that failed to parse.
    pub id_type: &'static str,
    /// The underlying UUID parse error message.
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Consumes the ID and returns the underlying UUID.
            #[must_use]
            pub fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Identifier of a hotel tenant. All feedback rows are isolated by it.
    TenantId
);

define_id!(
    /// Identifier of a guest feedback item.
    FeedbackId
);

define_id!(
    /// Identifier of a configured manager contact.
    ManagerId
);

define_id!(
    /// Identifier of a response-approval request created by the risk gate.
    ApprovalId
);

define_id!(
    /// Identifier of an append-only escalation log entry.
    EscalationLogId
);

define_id!(
    /// Identifier of a queued outbound email.
    EmailQueueId
);

define_id!(
    /// Identifier of an audit log entry.
    AuditLogId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_distinct_ids() {
        let a = FeedbackId::new();
        let b = FeedbackId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 36);
    }

    #[test]
    fn test_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = ApprovalId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
        assert_eq!(id.into_inner(), uuid);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let id = TenantId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");

        let back: TenantId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_parse_valid_uuid() {
        let id: ManagerId = "123e4567-e89b-12d3-a456-426614174000".parse().unwrap();
        assert_eq!(id.to_string(), "123e4567-e89b-12d3-a456-426614174000");
    }

    #[test]
    fn test_parse_invalid_uuid_names_the_type() {
        let err = "not-a-uuid".parse::<FeedbackId>().unwrap_err();
        assert_eq!(err.id_type, "FeedbackId");
        assert!(err.to_string().starts_with("Failed to parse FeedbackId"));
    }
}
