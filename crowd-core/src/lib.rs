//! Collision prediction and sub-stepped contact resolution for crowds.
//!
//! This crate is the mechanical core of an agent-based crowd simulator.
//! Given agents whose bodies are unions of rigid discs, it advances their
//! planar kinematics over one macro step `Δt`, resolving agent/agent and
//! agent/obstacle contacts with a DEM-style soft-contact model at a fine
//! sub-step `δt`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CrowdMechanics                         │
//! │  Owns: material table, domain, obstacles, agent table       │
//! │  Sequences one macro step per call                          │
//! └────────┬──────────────┬──────────────┬─────────────┬────────┘
//!          ▼              ▼              ▼             ▼
//!   neighborhood     activation       resolver     relaxation
//!   velocity-bound   project, scan,   K sub-steps  closed-form
//!   candidate pairs  revert, close    of contacts  for inactive
//! ```
//!
//! Per macro step: update desired motion from the driver inputs, build the
//! neighbor lists, predict the mechanically active set, sub-step the active
//! agents with full contact dynamics, relax every inactive agent in closed
//! form, and publish the new kinematics into the dynamics record.
//!
//! The whole pipeline is single-threaded, synchronous and deterministic:
//! agents and contacts are visited in agent-id and neighbor-list insertion
//! order, and forces are summed in dense per-agent accumulators in that
//! order.

#![doc(html_root_url = "https://docs.rs/crowd-core/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

pub mod activation;
mod engine;
pub mod neighborhood;
pub mod relaxation;
mod resolver;

pub use activation::{predict_active, ActiveSet};
pub use engine::CrowdMechanics;
pub use neighborhood::{build_neighborhoods, V_MAX_AGENT};
pub use relaxation::relax_passive;
pub use resolver::ContactResolver;

// Re-export the vocabulary the engine API is expressed in
pub use crowd_contact::{ContactKey, ContactState, MaterialTable, PairCoefficients};
pub use crowd_types::{
    Agent, AgentBody, AgentDynamics, AgentId, AgentRecord, AgentsRecord, ContactRecord,
    CrowdError, Desired, Domain, DynamicsRecord, GeometryRecord, Kinematics, MaterialId,
    MaterialRecord, MaterialsRecord, Obstacle, ParametersRecord, Result, Shape, ShapeRecord,
    Vec2, WallRecord, WallRef,
};
