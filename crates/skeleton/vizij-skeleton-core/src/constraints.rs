//! Anatomical rotation limits for hand joints.
//!
//! Roles are `(side, finger, segment)` keys named after H-Anim sids
//! (`r_index1`, `l_thumb3`, ...). Flexion bounds are expressed as signed
//! rotations about each side's canonical flexion axis, so left bounds are the
//! numeric negation of right bounds. Abduction bounds are side-independent.

use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SkeletonError};

/// Ratio between coupled DIP and PIP flexion.
pub const DIP_PIP_RATIO: f32 = 2.0 / 3.0;

const MCP_FLEXION_DEG: (f32, f32) = (-30.0, 90.0);
const PIP_FLEXION_DEG: (f32, f32) = (0.0, 110.0);
const TMC_FLEXION_DEG: (f32, f32) = (-20.0, 45.0);
const MCP_ABDUCTION_DEG: (f32, f32) = (-20.0, 20.0);
const TMC_ABDUCTION_DEG: (f32, f32) = (0.0, 60.0);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    /// Sign applied to flexion axes: mirrored joints flex about the negated
    /// axis.
    #[inline]
    pub fn flexion_sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    #[inline]
    pub fn prefix(self) -> &'static str {
        match self {
            Side::Left => "l",
            Side::Right => "r",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// The four fingers sharing the MCP/PIP/DIP layout.
    pub const LONG: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    pub fn name(self) -> &'static str {
        match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        }
    }
}

/// Segment number along a finger, proximal to distal.
///
/// For long fingers these are the MCP, PIP and DIP joints; for the thumb the
/// TMC, MCP and IP joints.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Proximal,
    Middle,
    Distal,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Proximal, Segment::Middle, Segment::Distal];

    pub fn number(self) -> u8 {
        match self {
            Segment::Proximal => 1,
            Segment::Middle => 2,
            Segment::Distal => 3,
        }
    }

    fn from_number(n: char) -> Option<Self> {
        match n {
            '1' => Some(Segment::Proximal),
            '2' => Some(Segment::Middle),
            '3' => Some(Segment::Distal),
            _ => None,
        }
    }
}

/// Normalized joint role used to look up rotation limits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JointRole {
    pub side: Side,
    pub finger: Finger,
    pub segment: Segment,
}

impl JointRole {
    pub const fn new(side: Side, finger: Finger, segment: Segment) -> Self {
        Self {
            side,
            finger,
            segment,
        }
    }

    /// H-Anim sid, e.g. `r_index1`.
    pub fn sid(&self) -> String {
        self.to_string()
    }

    /// Parse an H-Anim hand sid.
    pub fn from_sid(sid: &str) -> Result<Self> {
        let invalid = || SkeletonError::InvalidJointRole {
            role: sid.to_string(),
        };
        let (prefix, rest) = sid.split_once('_').ok_or_else(invalid)?;
        let side = match prefix {
            "l" => Side::Left,
            "r" => Side::Right,
            _ => return Err(invalid()),
        };
        let mut chars = rest.chars();
        let segment = chars
            .next_back()
            .and_then(Segment::from_number)
            .ok_or_else(invalid)?;
        let finger = Finger::ALL
            .into_iter()
            .find(|f| f.name() == chars.as_str())
            .ok_or_else(invalid)?;
        Ok(Self::new(side, finger, segment))
    }

    /// Position of this role in [`hand_joint_sids`] for its side.
    #[inline]
    pub(crate) fn hand_slot(self) -> usize {
        self.finger as usize * Segment::ALL.len() + self.segment as usize
    }

    /// The same joint on the other hand.
    pub fn mirrored(self) -> Self {
        let side = match self.side {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        };
        Self { side, ..self }
    }
}

impl fmt::Display for JointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}{}",
            self.side.prefix(),
            self.finger.name(),
            self.segment.number()
        )
    }
}

impl FromStr for JointRole {
    type Err = SkeletonError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_sid(s)
    }
}

/// All hand joint sids for one side, finger by finger, proximal first.
pub fn hand_joint_sids(side: Side) -> Vec<String> {
    Finger::ALL
        .into_iter()
        .flat_map(|finger| {
            Segment::ALL
                .into_iter()
                .map(move |segment| JointRole::new(side, finger, segment).sid())
        })
        .collect()
}

/// Rotation limits in radians. `minimum` may exceed `maximum` on mirrored
/// roles; use [`RotationBounds::ordered`] for clamping.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotationBounds {
    pub minimum: f32,
    pub maximum: f32,
}

impl RotationBounds {
    pub fn from_degrees(minimum: f32, maximum: f32) -> Self {
        Self {
            minimum: minimum.to_radians(),
            maximum: maximum.to_radians(),
        }
    }

    pub fn negated(self) -> Self {
        Self {
            minimum: -self.minimum,
            maximum: -self.maximum,
        }
    }

    pub fn scaled(self, k: f32) -> Self {
        Self {
            minimum: self.minimum * k,
            maximum: self.maximum * k,
        }
    }

    /// `(low, high)` with `low <= high`.
    #[inline]
    pub fn ordered(self) -> (f32, f32) {
        if self.minimum <= self.maximum {
            (self.minimum, self.maximum)
        } else {
            (self.maximum, self.minimum)
        }
    }

    #[inline]
    pub fn clamp(self, angle: f32) -> f32 {
        let (lo, hi) = self.ordered();
        angle.clamp(lo, hi)
    }
}

/// Immutable role -> bounds mapping.
#[derive(Clone, Debug, Default)]
pub struct ConstraintTable {
    flexion: HashMap<JointRole, RotationBounds>,
    abduction: HashMap<JointRole, RotationBounds>,
}

static HAND_LIMITS: Lazy<ConstraintTable> = Lazy::new(ConstraintTable::build_hand);

impl ConstraintTable {
    /// Empty table; every query fails until bounds are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide table of standard hand limits.
    pub fn hand() -> &'static ConstraintTable {
        &HAND_LIMITS
    }

    /// Register right-side flexion bounds; the left side gets the negation.
    pub fn with_flexion(
        mut self,
        finger: Finger,
        segment: Segment,
        right: RotationBounds,
    ) -> Self {
        let role = JointRole::new(Side::Right, finger, segment);
        self.flexion.insert(role, right);
        self.flexion.insert(role.mirrored(), right.negated());
        self
    }

    /// Register abduction bounds for both sides.
    pub fn with_abduction(
        mut self,
        finger: Finger,
        segment: Segment,
        bounds: RotationBounds,
    ) -> Self {
        let role = JointRole::new(Side::Right, finger, segment);
        self.abduction.insert(role, bounds);
        self.abduction.insert(role.mirrored(), bounds);
        self
    }

    fn build_hand() -> Self {
        let mcp = RotationBounds::from_degrees(MCP_FLEXION_DEG.0, MCP_FLEXION_DEG.1);
        let pip = RotationBounds::from_degrees(PIP_FLEXION_DEG.0, PIP_FLEXION_DEG.1);
        let dip = pip.scaled(DIP_PIP_RATIO);
        let tmc = RotationBounds::from_degrees(TMC_FLEXION_DEG.0, TMC_FLEXION_DEG.1);

        let mut table = Self::new()
            .with_flexion(Finger::Thumb, Segment::Proximal, tmc)
            .with_flexion(Finger::Thumb, Segment::Middle, mcp)
            .with_flexion(Finger::Thumb, Segment::Distal, dip)
            .with_abduction(
                Finger::Thumb,
                Segment::Proximal,
                RotationBounds::from_degrees(TMC_ABDUCTION_DEG.0, TMC_ABDUCTION_DEG.1),
            );
        for finger in Finger::LONG {
            table = table
                .with_flexion(finger, Segment::Proximal, mcp)
                .with_flexion(finger, Segment::Middle, pip)
                .with_flexion(finger, Segment::Distal, dip)
                .with_abduction(
                    finger,
                    Segment::Proximal,
                    RotationBounds::from_degrees(MCP_ABDUCTION_DEG.0, MCP_ABDUCTION_DEG.1),
                );
        }
        table
    }

    pub fn flexion(&self, role: JointRole) -> Result<RotationBounds> {
        self.flexion
            .get(&role)
            .copied()
            .ok_or_else(|| SkeletonError::InvalidJointRole { role: role.sid() })
    }

    pub fn abduction(&self, role: JointRole) -> Result<RotationBounds> {
        self.abduction
            .get(&role)
            .copied()
            .ok_or_else(|| SkeletonError::InvalidJointRole {
                role: format!("{role} (abduction)"),
            })
    }

    pub fn minimum_rotation(&self, role: JointRole) -> Result<f32> {
        self.flexion(role).map(|b| b.minimum)
    }

    pub fn maximum_rotation(&self, role: JointRole) -> Result<f32> {
        self.flexion(role).map(|b| b.maximum)
    }

    /// Flexion bounds looked up by H-Anim sid.
    pub fn flexion_for_sid(&self, sid: &str) -> Result<RotationBounds> {
        self.flexion(JointRole::from_sid(sid)?)
    }
}
