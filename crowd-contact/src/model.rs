//! The per-contact elastic-viscoplastic force law.
//!
//! Normal response is a spring-dashpot clamped to repulsion:
//!
//! ```text
//! F_n = max(0, k_n·ξ − γ_n·(v_rel·n̂))
//! ```
//!
//! The tangential response integrates the relative tangential displacement
//! `s_t` over the sub-step and bounds it by the Coulomb cone:
//!
//! ```text
//! s_t ← s_t + (v_rel·t̂)·δt,   |k_t·s_t| ≤ μ·F_n
//! F_t = −(k_t·s_t + γ_t·(v_rel·t̂))
//! ```
//!
//! When the cone is reached, the accumulator is reset to the cone boundary
//! and the contact slides.

use crowd_types::math::{perp_scaled, Vec2};

use crate::contact::ContactState;
use crate::material::PairCoefficients;

/// Outcome of evaluating the force law for one overlapping contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactResponse {
    /// Total contact force on the owning surface (normal plus tangential).
    pub force: Vec2,
    /// Updated tangential accumulator, after the Coulomb-cone clamp.
    pub accumulator: f64,
    /// Whether the contact sticks or slides.
    pub state: ContactState,
}

/// Spring-dashpot contact law with Coulomb friction for one material pair.
#[derive(Debug, Clone, Copy)]
pub struct ContactLaw {
    coefficients: PairCoefficients,
    sub_step: f64,
}

impl ContactLaw {
    /// Create the law for one material pair at sub-step `sub_step`.
    #[must_use]
    pub fn new(coefficients: PairCoefficients, sub_step: f64) -> Self {
        Self {
            coefficients,
            sub_step,
        }
    }

    /// The material-pair coefficients in effect.
    #[must_use]
    pub fn coefficients(&self) -> &PairCoefficients {
        &self.coefficients
    }

    /// Evaluate the law for an overlap `xi > 0`.
    ///
    /// `normal` must be the unit normal pointing toward the owning surface,
    /// `relative_velocity` the velocity of the owning surface relative to
    /// the other at the contact point, and `accumulator` the tangential
    /// history carried from the previous sub-step (zero for a fresh
    /// contact).
    #[must_use]
    pub fn respond(
        &self,
        xi: f64,
        normal: &Vec2,
        relative_velocity: &Vec2,
        accumulator: f64,
    ) -> ContactResponse {
        let tangent = perp_scaled(1.0, normal);
        let v_normal = relative_velocity.dot(normal);
        let v_tangent = relative_velocity.dot(&tangent);
        let c = &self.coefficients;

        // Purely repulsive normal response.
        let normal_force = (c.stiffness_normal * xi - c.damping_normal * v_normal).max(0.0);

        let mut accumulator = accumulator + v_tangent * self.sub_step;
        let cone = c.friction * normal_force;
        let state = if (c.stiffness_tangential * accumulator).abs() > cone {
            accumulator = accumulator.signum() * cone / c.stiffness_tangential;
            ContactState::Sliding
        } else {
            ContactState::Touching
        };
        let tangential_force =
            -(c.stiffness_tangential * accumulator + c.damping_tangential * v_tangent);

        ContactResponse {
            force: normal_force * normal + tangential_force * tangent,
            accumulator,
            state,
        }
    }
}
