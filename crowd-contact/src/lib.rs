//! Soft-contact model for crowd mechanics.
//!
//! This crate provides the material-pair coefficient table and the
//! per-contact force law used by the sub-stepping resolver:
//!
//! - [`MaterialTable`] derives normal and tangential stiffness for every
//!   ordered material pair from per-material elastic moduli, and
//!   symmetrizes the damping and friction coefficients supplied for each
//!   pair.
//! - [`ContactLaw`] evaluates the elastic-viscoplastic response of one
//!   overlapping contact: a purely repulsive normal spring-dashpot and a
//!   tangential spring-dashpot whose integrated displacement is bounded by
//!   the Coulomb cone.
//! - [`TangentialLedger`] carries the tangential accumulators between
//!   sub-steps, keyed by [`ContactKey`]; releasing a contact destroys its
//!   accumulator.
//!
//! # Contact Model
//!
//! ```text
//! F_n = max(0, k_n·ξ − γ_n·(v_rel·n̂))
//! F_t = −(k_t·s_t + γ_t·(v_rel·t̂)),   |k_t·s_t| ≤ μ·F_n
//! ```
//!
//! `ξ` is the overlap, `s_t` the tangential displacement integrated since
//! the contact began. Parameters are per material pair: `k_n`, `k_t` derived
//! from the Young and shear moduli, `γ_n`, `γ_t`, `μ` given by input.
//!
//! # Example
//!
//! ```
//! use crowd_contact::{ContactLaw, MaterialTable};
//! use crowd_types::{ContactRecord, MaterialRecord, MaterialsRecord, Vec2};
//!
//! let record = MaterialsRecord {
//!     intrinsic: vec![MaterialRecord {
//!         id: "body".into(),
//!         young_modulus: 1e6,
//!         shear_modulus: 4e5,
//!     }],
//!     binary: vec![ContactRecord {
//!         id_a: "body".into(),
//!         id_b: "body".into(),
//!         damping_normal: 10.0,
//!         damping_tangential: 10.0,
//!         friction_sliding: 0.5,
//!     }],
//! };
//! let table = MaterialTable::from_record(&record)?;
//! let body = table.resolve("body")?;
//!
//! let law = ContactLaw::new(*table.pair(body, body), 0.01);
//! let response = law.respond(0.01, &Vec2::new(1.0, 0.0), &Vec2::new(-0.1, 0.0), 0.0);
//! assert!(response.force.x > 0.0); // repulsive
//! # Ok::<(), crowd_types::CrowdError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/crowd-contact/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

mod contact;
mod material;
mod model;

pub use contact::{ContactKey, ContactState, TangentialLedger};
pub use material::{MaterialTable, PairCoefficients};
pub use model::{ContactLaw, ContactResponse};

// Re-export the types the contact API is expressed in
pub use crowd_types::{AgentId, MaterialId, Vec2};
