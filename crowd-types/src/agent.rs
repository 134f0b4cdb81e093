//! Agent state: rigid-body data, shape layout, desired motion, neighbors.

use crate::math::Vec2;
use crate::{CrowdError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unique identifier for an agent; ids are dense in `[0, N)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentId(pub u32);

impl AgentId {
    /// Create a new agent id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Index into dense per-agent tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Agent({})", self.0)
    }
}

/// Identifier of a material row in the material table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MaterialId(pub u32);

impl MaterialId {
    /// Create a new material id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Index into the material table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A disc glued rigidly to the agent's body frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shape {
    /// Offset of the disc center from the center of mass, in the body frame.
    pub offset: Vec2,
    /// Stored disc radius; only its magnitude enters contact geometry.
    pub radius: f64,
    /// Material of the disc surface.
    pub material: MaterialId,
}

/// Reference to one wall segment of one obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WallRef {
    /// Index of the obstacle in the geometry table.
    pub obstacle: usize,
    /// Index of the segment within the obstacle's polyline.
    pub segment: usize,
}

/// Immutable rigid-body data of an agent, fixed at static load.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentBody {
    /// Total mass (kg).
    pub mass: f64,
    /// Moment of inertia about the center of mass (kg·m²).
    pub moment_of_inertia: f64,
    /// The discs whose union is the agent's body.
    pub shapes: Vec<Shape>,
    /// Body orientation at which the shape offsets are expressed.
    pub theta_init: f64,
    /// Translational damping rate `1/τ_t`.
    pub inv_tau_translation: f64,
    /// Rotational damping rate `1/τ_r`.
    pub inv_tau_rotation: f64,
    radius_enclose: f64,
}

impl AgentBody {
    /// Build a body, computing the enclosing radius from the shape layout.
    ///
    /// # Errors
    ///
    /// Non-finite inputs are numeric errors; non-positive mass, inertia or
    /// damping rates and an empty shape list are configuration errors.
    pub fn new(
        mass: f64,
        moment_of_inertia: f64,
        shapes: Vec<Shape>,
        theta_init: f64,
        inv_tau_translation: f64,
        inv_tau_rotation: f64,
    ) -> Result<Self> {
        for (name, value) in [
            ("mass", mass),
            ("moment of inertia", moment_of_inertia),
            ("initial orientation", theta_init),
            ("translational damping rate", inv_tau_translation),
            ("rotational damping rate", inv_tau_rotation),
        ] {
            if !value.is_finite() {
                return Err(CrowdError::numeric(name));
            }
        }
        if mass <= 0.0 {
            return Err(CrowdError::config("mass must be positive"));
        }
        if moment_of_inertia <= 0.0 {
            return Err(CrowdError::config("moment of inertia must be positive"));
        }
        if inv_tau_translation <= 0.0 || inv_tau_rotation <= 0.0 {
            return Err(CrowdError::config("damping rates must be positive"));
        }
        if shapes.is_empty() {
            return Err(CrowdError::config("an agent needs at least one shape"));
        }
        for shape in &shapes {
            if !shape.radius.is_finite() || !shape.offset.x.is_finite() || !shape.offset.y.is_finite()
            {
                return Err(CrowdError::numeric("shape geometry"));
            }
        }

        let radius_enclose = shapes
            .iter()
            .map(|s| s.offset.norm() + s.radius.abs())
            .fold(0.0, f64::max);

        Ok(Self {
            mass,
            moment_of_inertia,
            shapes,
            theta_init,
            inv_tau_translation,
            inv_tau_rotation,
            radius_enclose,
        })
    }

    /// Radius of the smallest disc about the center of mass containing every shape.
    #[must_use]
    pub fn radius_enclose(&self) -> f64 {
        self.radius_enclose
    }
}

/// Mutable kinematic state of an agent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Kinematics {
    /// Position of the center of mass.
    pub position: Vec2,
    /// Orientation of the body (rad).
    pub theta: f64,
    /// Velocity of the center of mass.
    pub velocity: Vec2,
    /// Angular velocity (rad/s).
    pub omega: f64,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            theta: 0.0,
            velocity: Vec2::zeros(),
            omega: 0.0,
        }
    }
}

/// Velocity targets derived from the driving force and torque.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Desired {
    /// Target velocity `Fp·τ_t/m`.
    pub velocity: Vec2,
    /// Target angular velocity `Mp·τ_r/I`.
    pub omega: f64,
    /// Heading of the target velocity, zero when the target is zero.
    pub theta: f64,
}

impl Default for Desired {
    fn default() -> Self {
        Self {
            velocity: Vec2::zeros(),
            omega: 0.0,
            theta: 0.0,
        }
    }
}

/// A simulated agent: rigid-body data plus its evolving state.
///
/// The neighbor lists are transient: they are cleared when new driver
/// inputs arrive and rebuilt at the start of every macro step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Agent {
    /// Dense id of the agent.
    pub id: AgentId,
    /// Immutable rigid-body data.
    pub body: AgentBody,
    /// Current kinematic state.
    pub kinematics: Kinematics,
    /// Current desired-motion targets.
    pub desired: Desired,
    /// Agent neighbors for the current macro step.
    pub neighbors: Vec<AgentId>,
    /// Wall-segment neighbors for the current macro step.
    pub wall_neighbors: Vec<WallRef>,
}

impl Agent {
    /// Create an agent at rest with zeroed targets.
    #[must_use]
    pub fn new(id: AgentId, body: AgentBody) -> Self {
        Self {
            id,
            body,
            kinematics: Kinematics::default(),
            desired: Desired::default(),
            neighbors: Vec::new(),
            wall_neighbors: Vec::new(),
        }
    }

    /// Overwrite kinematics and driving inputs for a new macro step.
    ///
    /// Recomputes the desired velocity `Fp·τ_t/m`, desired angular velocity
    /// `Mp·τ_r/I` and desired heading, and clears the neighbor lists.
    pub fn set_dynamics(&mut self, kinematics: Kinematics, drive_force: Vec2, drive_torque: f64) {
        self.kinematics = kinematics;

        let velocity = drive_force / (self.body.inv_tau_translation * self.body.mass);
        let omega = drive_torque / (self.body.inv_tau_rotation * self.body.moment_of_inertia);
        let theta = if velocity.x == 0.0 && velocity.y == 0.0 {
            0.0
        } else {
            velocity.y.atan2(velocity.x)
        };
        self.desired = Desired {
            velocity,
            omega,
            theta,
        };

        self.neighbors.clear();
        self.wall_neighbors.clear();
    }

    /// Advance position and orientation by the current velocities over `dt`.
    pub fn step_kinematic(&mut self, dt: f64) {
        self.kinematics.position += self.kinematics.velocity * dt;
        self.kinematics.theta += self.kinematics.omega * dt;
    }

    /// Shape offsets rotated into the world frame by `theta − theta_init`.
    #[must_use]
    pub fn world_shape_offsets(&self) -> Vec<Vec2> {
        let alpha = self.kinematics.theta - self.body.theta_init;
        let (sin, cos) = alpha.sin_cos();
        self.body
            .shapes
            .iter()
            .map(|s| {
                Vec2::new(
                    s.offset.x * cos - s.offset.y * sin,
                    s.offset.x * sin + s.offset.y * cos,
                )
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn disc_body(radius: f64) -> AgentBody {
        AgentBody::new(
            80.0,
            5.0,
            vec![Shape {
                offset: Vec2::zeros(),
                radius,
                material: MaterialId::new(0),
            }],
            0.0,
            2.0,
            2.0,
        )
        .unwrap()
    }

    #[test]
    fn test_radius_enclose_uses_magnitudes() {
        let body = AgentBody::new(
            80.0,
            5.0,
            vec![
                Shape {
                    offset: Vec2::new(0.15, 0.0),
                    radius: -0.1,
                    material: MaterialId::new(0),
                },
                Shape {
                    offset: Vec2::new(-0.05, 0.0),
                    radius: 0.12,
                    material: MaterialId::new(0),
                },
            ],
            0.0,
            2.0,
            2.0,
        )
        .unwrap();

        // Negative stored radii count by magnitude: 0.15 + 0.1
        assert_relative_eq!(body.radius_enclose(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_body_validation() {
        let shape = Shape {
            offset: Vec2::zeros(),
            radius: 0.2,
            material: MaterialId::new(0),
        };
        assert!(AgentBody::new(0.0, 5.0, vec![shape], 0.0, 2.0, 2.0).is_err());
        assert!(AgentBody::new(80.0, -1.0, vec![shape], 0.0, 2.0, 2.0).is_err());
        assert!(AgentBody::new(80.0, 5.0, vec![], 0.0, 2.0, 2.0).is_err());
        assert!(AgentBody::new(80.0, 5.0, vec![shape], 0.0, 0.0, 2.0).is_err());
        assert!(
            AgentBody::new(f64::NAN, 5.0, vec![shape], 0.0, 2.0, 2.0)
                .unwrap_err()
                .is_numeric()
        );
    }

    #[test]
    fn test_set_dynamics_derives_targets() {
        let mut agent = Agent::new(AgentId::new(0), disc_body(0.25));
        agent.neighbors.push(AgentId::new(1));

        let kin = Kinematics {
            position: Vec2::new(10.0, 10.0),
            theta: 0.0,
            velocity: Vec2::new(1.0, 0.0),
            omega: 0.0,
        };
        // Fp = (m, 0) with 1/τ_t = 2 gives v_des = (0.5, 0)
        agent.set_dynamics(kin, Vec2::new(80.0, 0.0), 10.0);

        assert_relative_eq!(agent.desired.velocity.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(agent.desired.velocity.y, 0.0, epsilon = 1e-12);
        // Mp = 10 with I = 5 and 1/τ_r = 2 gives ω_des = 1
        assert_relative_eq!(agent.desired.omega, 1.0, epsilon = 1e-12);
        assert_relative_eq!(agent.desired.theta, 0.0, epsilon = 1e-12);
        assert!(agent.neighbors.is_empty());
    }

    #[test]
    fn test_zero_drive_gives_zero_heading() {
        let mut agent = Agent::new(AgentId::new(0), disc_body(0.25));
        agent.set_dynamics(Kinematics::default(), Vec2::zeros(), 0.0);
        assert_eq!(agent.desired.theta, 0.0);

        agent.set_dynamics(Kinematics::default(), Vec2::new(0.0, -80.0), 0.0);
        assert_relative_eq!(
            agent.desired.theta,
            -std::f64::consts::FRAC_PI_2,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_step_kinematic() {
        let mut agent = Agent::new(AgentId::new(0), disc_body(0.25));
        agent.kinematics.velocity = Vec2::new(2.0, -1.0);
        agent.kinematics.omega = 0.5;

        agent.step_kinematic(0.1);

        assert_relative_eq!(agent.kinematics.position.x, 0.2, epsilon = 1e-12);
        assert_relative_eq!(agent.kinematics.position.y, -0.1, epsilon = 1e-12);
        assert_relative_eq!(agent.kinematics.theta, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_world_shape_offsets_rotate_with_theta() {
        let body = AgentBody::new(
            80.0,
            5.0,
            vec![Shape {
                offset: Vec2::new(0.2, 0.0),
                radius: 0.1,
                material: MaterialId::new(0),
            }],
            0.0,
            2.0,
            2.0,
        )
        .unwrap();
        let mut agent = Agent::new(AgentId::new(0), body);
        agent.kinematics.theta = std::f64::consts::FRAC_PI_2;

        let offsets = agent.world_shape_offsets();
        assert_relative_eq!(offsets[0].x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(offsets[0].y, 0.2, epsilon = 1e-12);
    }
}
