//! Vizij Skeleton Core (engine-agnostic)
//!
//! Joint hierarchy with a lazily refreshed world-transform cache, a sid
//! index, anatomical hand limits, a hand pose mapper driven by biomechanical
//! DOFs, and JSON / binary serialization of skeletons.
//!
//! Everything here is single-threaded per skeleton. Rendering, physics and
//! file I/O live with the callers.

pub mod config;
pub mod constraints;
pub mod error;
pub mod hand;
pub mod ids;
pub mod joint;
pub mod math;
pub mod pose;
pub mod serial;
pub mod skeleton;
pub mod transform;

// Re-exports for consumers (adapters)
pub use config::HandConfig;
pub use constraints::{
    hand_joint_sids, ConstraintTable, Finger, JointRole, RotationBounds, Segment, Side,
    DIP_PIP_RATIO,
};
pub use error::{Result, SkeletonError};
pub use hand::{dip_rotation, FingerDof, HandDof, HandPoseMapper};
pub use ids::JointId;
pub use joint::JointNode;
pub use pose::JointRotation;
pub use serial::{JointDoc, SkeletonDoc};
pub use skeleton::Skeleton;
pub use transform::CacheState;
