//! Typed input and output records exchanged with the external loader.
//!
//! The core performs no file I/O: an external loader parses the simulation
//! configuration into these records, and an external serializer consumes the
//! updated dynamics record after each macro step. The path fields are opaque
//! strings carried for that loader's benefit.

use crate::math::Vec2;
use crate::{CrowdError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-call parameters of the mechanical layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParametersRecord {
    /// Macro time step `Δt` driven by the caller (s).
    pub macro_step: f64,
    /// Sub-step `δt` of the contact resolver (s).
    pub sub_step: f64,
    /// Directory holding the static data files; not dereferenced by the core.
    pub static_path: String,
    /// Directory holding the dynamic data files; not dereferenced by the core.
    pub dynamic_path: String,
    /// Force a reload of the static records on this call.
    pub load_static_data: bool,
}

impl ParametersRecord {
    /// Validate the time stepping.
    ///
    /// # Errors
    ///
    /// Non-finite steps are numeric errors; non-positive steps or a sub-step
    /// exceeding the macro step are configuration errors.
    pub fn validate(&self) -> Result<()> {
        if !self.macro_step.is_finite() || !self.sub_step.is_finite() {
            return Err(CrowdError::numeric("time step"));
        }
        if self.macro_step <= 0.0 || self.sub_step <= 0.0 {
            return Err(CrowdError::config("time steps must be positive"));
        }
        if self.sub_step > self.macro_step {
            return Err(CrowdError::config(
                "sub-step must not exceed the macro step",
            ));
        }
        Ok(())
    }

    /// Number of resolver sub-steps per macro step, `round(Δt/δt)`.
    ///
    /// At least 1 for parameters that pass [`validate`](Self::validate).
    #[must_use]
    pub fn sub_step_count(&self) -> usize {
        (self.macro_step / self.sub_step).round() as usize
    }
}

/// Elastic moduli of one material.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MaterialRecord {
    /// External id of the material.
    pub id: String,
    /// Young's modulus `E` (Pa).
    pub young_modulus: f64,
    /// Shear modulus `G` (Pa).
    pub shear_modulus: f64,
}

/// Contact coefficients supplied for one unordered material pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactRecord {
    /// External id of the first material.
    pub id_a: String,
    /// External id of the second material.
    pub id_b: String,
    /// Normal damping `γ_n`.
    pub damping_normal: f64,
    /// Tangential damping `γ_t`.
    pub damping_tangential: f64,
    /// Sliding friction coefficient `μ`.
    pub friction_sliding: f64,
}

/// The materials input: intrinsic moduli plus pairwise contact coefficients.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MaterialsRecord {
    /// One entry per material.
    pub intrinsic: Vec<MaterialRecord>,
    /// Contact coefficients; every unordered pair must be covered.
    pub binary: Vec<ContactRecord>,
}

/// One wall polyline of the geometry input.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WallRecord {
    /// External id of the wall's material.
    pub material: String,
    /// Corner polyline; consecutive corners form segments.
    pub corners: Vec<Vec2>,
}

/// The geometry input: domain extents and obstacles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeometryRecord {
    /// Domain extent along x.
    pub lx: f64,
    /// Domain extent along y.
    pub ly: f64,
    /// The obstacle polylines.
    pub walls: Vec<WallRecord>,
}

/// One disc of an agent's body in the agents input.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeRecord {
    /// External id of the shape.
    pub id: String,
    /// External id of the shape's material.
    pub material: String,
    /// Disc radius; negative values are treated by magnitude.
    pub radius: f64,
    /// Offset of the disc center from the center of mass, body frame.
    pub position: Vec2,
}

/// One agent of the agents input.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentRecord {
    /// External id of the agent.
    pub id: String,
    /// Total mass (kg).
    pub mass: f64,
    /// Moment of inertia about the center of mass (kg·m²).
    pub moment_of_inertia: f64,
    /// Translational damping rate `1/τ_t`.
    pub floor_damping: f64,
    /// Rotational damping rate `1/τ_r`.
    pub angular_damping: f64,
    /// The agent's discs, in body-frame order.
    pub shapes: Vec<ShapeRecord>,
}

/// The agents input: immutable agent and shape data.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentsRecord {
    /// One entry per agent.
    pub agents: Vec<AgentRecord>,
}

/// Per-agent dynamics, consumed and produced each macro step.
///
/// On input the kinematic fields carry the state at the start of the macro
/// step and the drive fields carry the driving force `Fp` and torque `Mp`.
/// On success the kinematic fields are overwritten with the post-step state;
/// the drive fields are left as given.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentDynamics {
    /// External id of the agent.
    pub id: String,
    /// Position of the center of mass.
    pub position: Vec2,
    /// Velocity of the center of mass.
    pub velocity: Vec2,
    /// Orientation (rad).
    pub theta: f64,
    /// Angular velocity (rad/s).
    pub omega: f64,
    /// Driving force `Fp`.
    pub drive_force: Vec2,
    /// Driving torque `Mp`.
    pub drive_torque: f64,
}

/// The dynamics record: one entry for every known agent.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DynamicsRecord {
    /// Per-agent entries, keyed by external id.
    pub agents: Vec<AgentDynamics>,
}
