//! Core data types for crowd mechanics simulation.
//!
//! This crate provides the foundational types of the mechanical layer:
//!
//! - [`Agent`] - rigid-body data, kinematics and desired motion of one agent
//! - [`Obstacle`] - wall polylines agents collide with
//! - [`Domain`](math::Domain) - periodic domain geometry
//! - The input/output records ([`ParametersRecord`], [`MaterialsRecord`],
//!   [`GeometryRecord`], [`AgentsRecord`], [`DynamicsRecord`]) exchanged
//!   with the external loader and serializer
//! - [`CrowdError`] - the categorized error type
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They carry no contact physics and no
//! stepping logic; those live in `crowd-contact` and `crowd-core`. The only
//! behavior here is in-place state updates ([`Agent::set_dynamics`],
//! [`Agent::step_kinematic`]) and the body-to-world shape transform.
//!
//! # Coordinate System
//!
//! The simulation is strictly planar. Positions live on a periodic domain
//! `Lx × Ly`; orientations are scalar angles about the out-of-plane axis,
//! counterclockwise positive.

#![doc(html_root_url = "https://docs.rs/crowd-types/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

mod agent;
mod error;
pub mod math;
mod obstacle;
mod records;

pub use agent::{Agent, AgentBody, AgentId, Desired, Kinematics, MaterialId, Shape, WallRef};
pub use error::CrowdError;
pub use math::{Domain, Vec2};
pub use obstacle::Obstacle;
pub use records::{
    AgentDynamics, AgentRecord, AgentsRecord, ContactRecord, DynamicsRecord, GeometryRecord,
    MaterialRecord, MaterialsRecord, ParametersRecord, ShapeRecord, WallRecord,
};

/// Result type for mechanical-layer operations.
pub type Result<T> = std::result::Result<T, CrowdError>;
