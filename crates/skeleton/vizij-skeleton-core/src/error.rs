//! Error types for skeleton construction, pose mapping and serialization.

use crate::ids::JointId;

/// Skeleton core result type
pub type Result<T> = core::result::Result<T, SkeletonError>;

/// Errors surfaced by the skeleton core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SkeletonError {
    /// No joint with the given sid is present in the index.
    #[error("Joint not found: sid '{sid}'")]
    NotFound { sid: String },

    /// The handle does not name a live joint of this skeleton.
    #[error("Unknown joint handle: {joint:?}")]
    UnknownJoint { joint: JointId },

    /// Role or sid is not a recognized hand joint role.
    #[error("'{role}' is not a valid hand joint role")]
    InvalidJointRole { role: String },

    /// Structural edit that would break the tree.
    #[error("Invalid skeleton structure: {reason}")]
    InvalidStructure { reason: String },

    /// Rejected configuration value.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Malformed text or binary input.
    #[error("Decode error: {reason}")]
    Decode { reason: String },

    /// Serializer backend failure.
    #[error("Encode error: {reason}")]
    Encode { reason: String },
}

impl SkeletonError {
    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    pub(crate) fn structure(reason: impl Into<String>) -> Self {
        Self::InvalidStructure {
            reason: reason.into(),
        }
    }

    /// Whether the caller can reasonably fall back and continue.
    ///
    /// Role and structure violations are programming errors and are never
    /// worth retrying.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::UnknownJoint { .. } | Self::Decode { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotFound { .. } | Self::UnknownJoint { .. } => "lookup",
            Self::InvalidJointRole { .. } => "role",
            Self::InvalidStructure { .. } => "structure",
            Self::InvalidConfig { .. } => "config",
            Self::Decode { .. } | Self::Encode { .. } => "serialization",
        }
    }
}
