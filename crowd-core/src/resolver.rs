//! Sub-stepped contact resolution for mechanically active agents.
//!
//! The resolver advances the active agents over one macro step in
//! `K = round(Δt/δt)` fixed sub-steps. Each sub-step gathers the relaxation
//! drive and every contact force into dense per-agent accumulators, then
//! integrates with semi-implicit Euler (velocities first, positions with
//! the updated velocities) in agent-id order. Contact discovery walks the
//! pre-computed neighbor lists and tests every shape pair; each agent pair
//! is owned by its lower id and applied equal and opposite.
//!
//! Tangential accumulators persist across sub-steps while the overlap
//! lasts; losing the overlap releases the contact and destroys its history.

use crowd_contact::{ContactKey, ContactLaw, MaterialTable, TangentialLedger};
use crowd_types::math::{cross, perp_scaled, segment_closest_point, Domain, Vec2};
use crowd_types::{Agent, Obstacle};
use tracing::{debug, trace};

use crate::activation::ActiveSet;

/// Resolves contacts among the active agents over one macro step.
#[derive(Debug)]
pub struct ContactResolver<'a> {
    obstacles: &'a [Obstacle],
    domain: &'a Domain,
    materials: &'a MaterialTable,
    sub_step: f64,
    ledger: TangentialLedger,
    forces: Vec<Vec2>,
    torques: Vec<f64>,
}

impl<'a> ContactResolver<'a> {
    /// Create a resolver for one macro step.
    #[must_use]
    pub fn new(
        obstacles: &'a [Obstacle],
        domain: &'a Domain,
        materials: &'a MaterialTable,
        sub_step: f64,
        agent_count: usize,
    ) -> Self {
        Self {
            obstacles,
            domain,
            materials,
            sub_step,
            ledger: TangentialLedger::new(),
            forces: vec![Vec2::zeros(); agent_count],
            torques: vec![0.0; agent_count],
        }
    }

    /// Number of contacts currently carrying tangential history.
    #[must_use]
    pub fn live_contact_count(&self) -> usize {
        self.ledger.len()
    }

    /// Run `sub_steps` fixed sub-steps over the active agents.
    pub fn run(&mut self, agents: &mut [Agent], active: &ActiveSet, sub_steps: usize) {
        debug!(active = active.len(), sub_steps, "resolving contacts");
        for _ in 0..sub_steps {
            self.advance(agents, active);
        }
        trace!(live_contacts = self.ledger.len(), "macro step resolved");
    }

    /// One sub-step: accumulate forces, then integrate.
    fn advance(&mut self, agents: &mut [Agent], active: &ActiveSet) {
        self.forces.fill(Vec2::zeros());
        self.torques.fill(0.0);

        for &id in active.members() {
            self.accumulate(agents, id.index());
        }

        for agent in agents.iter_mut() {
            if !active.contains(agent.id) {
                continue;
            }
            let index = agent.id.index();
            let body = &agent.body;

            let drive_force = (agent.desired.velocity - agent.kinematics.velocity)
                * (body.mass * body.inv_tau_translation);
            let drive_torque = (agent.desired.omega - agent.kinematics.omega)
                * (body.moment_of_inertia * body.inv_tau_rotation);

            let total_force = drive_force + self.forces[index];
            let total_torque = drive_torque + self.torques[index];

            agent.kinematics.velocity += total_force / body.mass * self.sub_step;
            agent.kinematics.omega += total_torque / body.moment_of_inertia * self.sub_step;
            agent.step_kinematic(self.sub_step);
        }
    }

    /// Accumulate all contact forces exerted on (and by) agent `first`.
    fn accumulate(&mut self, agents: &[Agent], first: usize) {
        let agent = &agents[first];
        let offsets = agent.world_shape_offsets();
        let position = agent.kinematics.position;
        let velocity = agent.kinematics.velocity;
        let omega = agent.kinematics.omega;

        for wall in &agent.wall_neighbors {
            let obstacle = &self.obstacles[wall.obstacle];
            let (start, end) = obstacle.segment(wall.segment);
            let wall_material = obstacle.material();

            for (shape_index, offset) in offsets.iter().enumerate() {
                let shape = &agent.body.shapes[shape_index];
                let center = position + *offset;
                let (distance, closest) = segment_closest_point(&start, &end, &center);
                let xi = shape.radius.abs() - distance;
                let key = ContactKey::AgentWall {
                    agent: agent.id,
                    shape: shape_index,
                    obstacle: wall.obstacle,
                    segment: wall.segment,
                };
                if xi <= 0.0 {
                    if self.ledger.release(&key) {
                        trace!(?key, "wall contact released");
                    }
                    continue;
                }
                if distance <= 0.0 {
                    // Shape center exactly on the wall: no orientable normal
                    continue;
                }

                let normal = (center - closest) / distance;
                let lever = closest - position;
                let velocity_at_contact = velocity + perp_scaled(omega, &lever);

                let law = ContactLaw::new(
                    *self.materials.pair(shape.material, wall_material),
                    self.sub_step,
                );
                let previous = self.ledger.get(&key).unwrap_or(0.0);
                let response = law.respond(xi, &normal, &velocity_at_contact, previous);
                self.ledger.set(key, response.accumulator);

                self.forces[first] += response.force;
                self.torques[first] += cross(&lever, &response.force);
            }
        }

        for &other_id in &agent.neighbors {
            // Each pair is owned by its lower id; the closure guarantees
            // both members of an overlapping pair are active.
            if other_id.index() <= first {
                continue;
            }
            let other = &agents[other_id.index()];
            let other_offsets = other.world_shape_offsets();

            for (first_shape, offset) in offsets.iter().enumerate() {
                let shape = &agent.body.shapes[first_shape];
                let center = position + *offset;

                for (second_shape, other_offset) in other_offsets.iter().enumerate() {
                    let other_shape = &other.body.shapes[second_shape];
                    let other_center = other.kinematics.position + *other_offset;

                    let separation = self.domain.separation(&center, &other_center);
                    let distance = separation.norm();
                    let xi = shape.radius.abs() + other_shape.radius.abs() - distance;
                    let key = ContactKey::AgentAgent {
                        first: agent.id,
                        first_shape,
                        second: other_id,
                        second_shape,
                    };
                    if xi <= 0.0 {
                        if self.ledger.release(&key) {
                            trace!(?key, "agent contact released");
                        }
                        continue;
                    }
                    if distance <= 0.0 {
                        continue;
                    }

                    let normal = separation / distance;
                    let relative_velocity = (velocity + perp_scaled(omega, offset))
                        - (other.kinematics.velocity
                            + perp_scaled(other.kinematics.omega, other_offset));

                    let law = ContactLaw::new(
                        *self.materials.pair(shape.material, other_shape.material),
                        self.sub_step,
                    );
                    let previous = self.ledger.get(&key).unwrap_or(0.0);
                    let response = law.respond(xi, &normal, &relative_velocity, previous);
                    self.ledger.set(key, response.accumulator);

                    self.forces[first] += response.force;
                    self.torques[first] += cross(offset, &response.force);
                    self.forces[other_id.index()] -= response.force;
                    self.torques[other_id.index()] -= cross(other_offset, &response.force);
                }
            }
        }
    }
}
