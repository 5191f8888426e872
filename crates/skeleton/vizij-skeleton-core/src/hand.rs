//! Hand pose mapping: biomechanical DOFs -> local joint rotations.
//!
//! Long fingers (index..pinky):
//! - MCP: `flexion(Z) * abduction(X)`
//! - PIP: flexion about Z
//! - DIP: coupled to PIP through [`DIP_PIP_RATIO`], not independently driven
//!
//! Thumb:
//! - TMC: `flexion(Y) * abduction(X)`
//! - MCP and IP: flexion about the rig's thumb axis ([`HandConfig`])
//!
//! Flexion axes (Z, Y) flip sign on the left hand; the abduction axis does
//! not. The thumb axis is supplied per side. Every angle is clamped to its
//! role's bounds before it is written; out-of-range input is not an error.

use log::trace;
use nalgebra::{Quaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::HandConfig;
use crate::constraints::{
    hand_joint_sids, ConstraintTable, Finger, JointRole, Segment, Side, DIP_PIP_RATIO,
};
use crate::error::Result;
use crate::math::axis_angle;
use crate::skeleton::Skeleton;

/// DOFs of one long finger, radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FingerDof {
    pub mcp_abduction: f32,
    pub mcp_flexion: f32,
    pub pip_flexion: f32,
}

impl FingerDof {
    pub fn new(mcp_abduction: f32, mcp_flexion: f32, pip_flexion: f32) -> Self {
        Self {
            mcp_abduction,
            mcp_flexion,
            pip_flexion,
        }
    }
}

/// One hand's DOF vector for a single update, radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HandDof {
    pub index: FingerDof,
    pub middle: FingerDof,
    pub ring: FingerDof,
    pub pinky: FingerDof,
    pub tmc_abduction: f32,
    pub tmc_flexion: f32,
    pub mcp_thumb_flexion: f32,
    pub ip_thumb_flexion: f32,
}

impl HandDof {
    /// All angles zero.
    pub fn neutral() -> Self {
        Self::default()
    }

    /// DOFs of a long finger; `None` for the thumb.
    pub fn finger(&self, finger: Finger) -> Option<&FingerDof> {
        match finger {
            Finger::Thumb => None,
            Finger::Index => Some(&self.index),
            Finger::Middle => Some(&self.middle),
            Finger::Ring => Some(&self.ring),
            Finger::Pinky => Some(&self.pinky),
        }
    }

    pub fn finger_mut(&mut self, finger: Finger) -> Option<&mut FingerDof> {
        match finger {
            Finger::Thumb => None,
            Finger::Index => Some(&mut self.index),
            Finger::Middle => Some(&mut self.middle),
            Finger::Ring => Some(&mut self.ring),
            Finger::Pinky => Some(&mut self.pinky),
        }
    }

    /// The four long fingers with their DOFs, index first.
    pub fn long_fingers(&self) -> [(Finger, &FingerDof); 4] {
        [
            (Finger::Index, &self.index),
            (Finger::Middle, &self.middle),
            (Finger::Ring, &self.ring),
            (Finger::Pinky, &self.pinky),
        ]
    }

    /// Same values for all four long fingers.
    pub fn with_long_fingers(self, dof: FingerDof) -> Self {
        Self {
            index: dof,
            middle: dof,
            ring: dof,
            pinky: dof,
            ..self
        }
    }
}

/// Axis conventions and joint sids of one hand.
#[derive(Clone, Debug)]
struct SideConvention {
    flexion_sign: f32,
    thumb_axis: Vector3<f32>,
    /// Indexed by [`JointRole::hand_slot`].
    sids: Vec<String>,
}

impl SideConvention {
    fn finger_flexion_axis(&self) -> Vector3<f32> {
        Vector3::z() * self.flexion_sign
    }

    fn tmc_flexion_axis(&self) -> Vector3<f32> {
        Vector3::y() * self.flexion_sign
    }

    fn abduction_axis(&self) -> Vector3<f32> {
        Vector3::x()
    }

    fn sid(&self, role: JointRole) -> &str {
        &self.sids[role.hand_slot()]
    }
}

/// Writes hand DOFs into a skeleton's H-Anim hand joints.
#[derive(Clone, Debug)]
pub struct HandPoseMapper<'t> {
    table: &'t ConstraintTable,
    left: SideConvention,
    right: SideConvention,
}

impl HandPoseMapper<'static> {
    /// Mapper using the standard hand limits.
    pub fn new(config: HandConfig) -> Result<Self> {
        HandPoseMapper::with_table(config, ConstraintTable::hand())
    }
}

impl<'t> HandPoseMapper<'t> {
    pub fn with_table(config: HandConfig, table: &'t ConstraintTable) -> Result<Self> {
        let convention = |side: Side| -> Result<SideConvention> {
            Ok(SideConvention {
                flexion_sign: side.flexion_sign(),
                thumb_axis: config.thumb_axis(side)?,
                sids: hand_joint_sids(side),
            })
        };
        Ok(Self {
            table,
            left: convention(Side::Left)?,
            right: convention(Side::Right)?,
        })
    }

    pub fn table(&self) -> &ConstraintTable {
        self.table
    }

    fn convention(&self, side: Side) -> &SideConvention {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Map `dof` onto the `side` hand of `skeleton`.
    ///
    /// The skeleton's sid index must be current. A missing joint aborts with
    /// `NotFound`; joints written before the failure keep their new values.
    pub fn apply_hand_pose(
        &self,
        skeleton: &mut Skeleton,
        side: Side,
        dof: &HandDof,
    ) -> Result<()> {
        let conv = self.convention(side);
        let flex_axis = conv.finger_flexion_axis();
        let abd_axis = conv.abduction_axis();

        for (finger, d) in dof.long_fingers() {
            let mcp = JointRole::new(side, finger, Segment::Proximal);
            let abduction = self.clamp_abduction(mcp, d.mcp_abduction)?;
            let flexion = self.clamp_flexion(mcp, conv, d.mcp_flexion)?;
            let q = axis_angle(&flex_axis, flexion) * axis_angle(&abd_axis, abduction);
            write(skeleton, conv, mcp, q)?;

            let pip = JointRole::new(side, finger, Segment::Middle);
            let pip_flexion = self.clamp_flexion(pip, conv, d.pip_flexion)?;
            write(skeleton, conv, pip, axis_angle(&flex_axis, pip_flexion))?;

            let dip = JointRole::new(side, finger, Segment::Distal);
            let dip_flexion = self.clamp_flexion(dip, conv, dip_rotation(pip_flexion))?;
            write(skeleton, conv, dip, axis_angle(&flex_axis, dip_flexion))?;
        }

        let ip = JointRole::new(side, Finger::Thumb, Segment::Distal);
        let ip_flexion = self.clamp_flexion(ip, conv, dof.ip_thumb_flexion)?;
        let q = axis_angle(&conv.thumb_axis, ip_flexion);
        write(skeleton, conv, ip, q)?;

        let mcp = JointRole::new(side, Finger::Thumb, Segment::Middle);
        let mcp_flexion = self.clamp_flexion(mcp, conv, dof.mcp_thumb_flexion)?;
        let q = axis_angle(&conv.thumb_axis, mcp_flexion);
        write(skeleton, conv, mcp, q)?;

        let tmc = JointRole::new(side, Finger::Thumb, Segment::Proximal);
        let abduction = self.clamp_abduction(tmc, dof.tmc_abduction)?;
        let flexion = self.clamp_flexion(tmc, conv, dof.tmc_flexion)?;
        let q = axis_angle(&conv.tmc_flexion_axis(), flexion) * axis_angle(&abd_axis, abduction);
        write(skeleton, conv, tmc, q)
    }

    /// Clamp a flexion angle so the signed rotation `sign * angle` stays
    /// inside the role's bounds.
    fn clamp_flexion(&self, role: JointRole, conv: &SideConvention, angle: f32) -> Result<f32> {
        let bounds = self.table.flexion(role)?;
        let clamped = bounds.clamp(conv.flexion_sign * angle) * conv.flexion_sign;
        if clamped != angle {
            trace!("{role}: flexion {angle} clamped to {clamped}");
        }
        Ok(clamped)
    }

    fn clamp_abduction(&self, role: JointRole, angle: f32) -> Result<f32> {
        let clamped = self.table.abduction(role)?.clamp(angle);
        if clamped != angle {
            trace!("{role}: abduction {angle} clamped to {clamped}");
        }
        Ok(clamped)
    }
}

fn write(
    skeleton: &mut Skeleton,
    conv: &SideConvention,
    role: JointRole,
    q: Quaternion<f32>,
) -> Result<()> {
    let joint = skeleton.lookup(conv.sid(role))?;
    skeleton.set_local_rotation(joint, q)
}

/// DIP flexion implied by a PIP flexion.
#[inline]
pub fn dip_rotation(pip_flexion: f32) -> f32 {
    pip_flexion * DIP_PIP_RATIO
}
