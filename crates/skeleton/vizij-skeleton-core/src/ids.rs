//! Arena handles for joints.

use serde::{Deserialize, Serialize};

/// Index of a joint slot inside a [`Skeleton`](crate::Skeleton) arena.
///
/// Handles are only meaningful for the skeleton that issued them. They are
/// never reissued, so a stale handle reports `UnknownJoint` instead of
/// aliasing a newer joint.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct JointId(pub u32);

/// Monotonic allocator for JointId.
#[derive(Default, Debug, Clone)]
pub(crate) struct IdAllocator {
    next_joint: u32,
}

impl IdAllocator {
    /// Handle the next allocation will return.
    #[inline]
    pub(crate) fn peek(&self) -> JointId {
        JointId(self.next_joint)
    }

    #[inline]
    pub(crate) fn alloc_joint(&mut self) -> JointId {
        let id = JointId(self.next_joint);
        self.next_joint = self.next_joint.wrapping_add(1);
        id
    }
}
