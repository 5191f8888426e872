//! Hand pose mapper configuration.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constraints::Side;
use crate::error::{Result, SkeletonError};
use crate::math::vec3_from_array;

/// Per-rig settings for [`HandPoseMapper`](crate::HandPoseMapper).
///
/// The thumb flexes about an axis that is not aligned with the other fingers;
/// each rig supplies its own axis per side. Axes need not be unit length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HandConfig {
    pub thumb_flexion_axis_left: [f32; 3],
    pub thumb_flexion_axis_right: [f32; 3],
}

impl Default for HandConfig {
    fn default() -> Self {
        Self {
            thumb_flexion_axis_left: [1.0, -1.0, -1.0],
            thumb_flexion_axis_right: [1.0, 1.0, 1.0],
        }
    }
}

impl HandConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| SkeletonError::InvalidConfig {
            reason: e.to_string(),
        })
    }

    /// Normalized thumb flexion axis for `side`.
    pub fn thumb_axis(&self, side: Side) -> Result<Vector3<f32>> {
        let raw = match side {
            Side::Left => self.thumb_flexion_axis_left,
            Side::Right => self.thumb_flexion_axis_right,
        };
        let axis = vec3_from_array(raw);
        let len = axis.norm();
        if !len.is_finite() || len <= f32::EPSILON {
            return Err(SkeletonError::InvalidConfig {
                reason: format!("{side:?} thumb axis {raw:?} is zero or non-finite"),
            });
        }
        Ok(axis / len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_are_normalized() {
        let cfg = HandConfig::default();
        let r = cfg.thumb_axis(Side::Right).unwrap();
        assert_relative_eq!(r.norm(), 1.0, epsilon = 1e-6);
        assert!(r.y > 0.0);
        assert!(cfg.thumb_axis(Side::Left).unwrap().y < 0.0);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{ "thumbFlexionAxisLeft": [0, 0, -1] }"#;
        let cfg = HandConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.thumb_flexion_axis_left, [0.0, 0.0, -1.0]);
        assert_eq!(cfg.thumb_flexion_axis_right, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn zero_axis_is_rejected() {
        let cfg = HandConfig {
            thumb_flexion_axis_right: [0.0; 3],
            ..HandConfig::default()
        };
        assert!(matches!(
            cfg.thumb_axis(Side::Right),
            Err(SkeletonError::InvalidConfig { .. })
        ));
        assert!(HandConfig::from_json_str("[1, 2]").is_err());
    }
}
