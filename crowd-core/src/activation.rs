//! Activation prediction: which agents need contact resolution this step.
//!
//! The predictor projects every agent along its desired velocities over the
//! macro step, scans the projected configuration for near-overlaps, reverts
//! the projection, then augments the set with agents whose velocities
//! deviate from their targets and closes over immediate neighbors. Contact
//! forces propagate to immediate neighbors within one macro step; deeper
//! propagation is absorbed by subsequent macro steps, so the closure is one
//! hop.

use crowd_types::math::Domain;
use crowd_types::{Agent, AgentId, Obstacle};

/// Margin added to enclosing radii when testing projected overlap.
const ACTIVATION_MARGIN: f64 = 0.1;

/// Squared velocity mismatch above which an agent reacts mechanically.
const REACTIVITY_THRESHOLD: f64 = 1e-4;

/// The set of mechanically active agents, in activation order.
#[derive(Debug, Clone, Default)]
pub struct ActiveSet {
    members: Vec<AgentId>,
    flags: Vec<bool>,
}

impl ActiveSet {
    fn with_capacity(agent_count: usize) -> Self {
        Self {
            members: Vec::new(),
            flags: vec![false; agent_count],
        }
    }

    fn insert(&mut self, id: AgentId) {
        if !self.flags[id.index()] {
            self.flags[id.index()] = true;
            self.members.push(id);
        }
    }

    /// Active agents in activation order.
    #[must_use]
    pub fn members(&self) -> &[AgentId] {
        &self.members
    }

    /// Whether `id` is active.
    #[must_use]
    pub fn contains(&self, id: AgentId) -> bool {
        self.flags.get(id.index()).copied().unwrap_or(false)
    }

    /// Number of active agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no agent is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Decide the set of mechanically active agents for this macro step.
///
/// A future collision exists iff the returned set is non-empty. The
/// tentative projection is reverted by subtracting the same deltas, so the
/// predictor leaves the agent table unchanged and is idempotent.
#[must_use]
pub fn predict_active(
    agents: &mut [Agent],
    obstacles: &[Obstacle],
    domain: &Domain,
    macro_step: f64,
) -> ActiveSet {
    // Tentative kinematic projection along the desired velocities.
    for agent in agents.iter_mut() {
        agent.kinematics.position += agent.desired.velocity * macro_step;
        agent.kinematics.theta += agent.desired.omega * macro_step;
    }

    // Overlap scan at the projected configuration.
    let mut active = ActiveSet::with_capacity(agents.len());
    for first in 0..agents.len() {
        let agent = &agents[first];
        let position = agent.kinematics.position;

        for wall in &agent.wall_neighbors {
            let (start, end) = obstacles[wall.obstacle].segment(wall.segment);
            let midpoint = 0.5 * (start + end);
            if domain.distance(&position, &midpoint)
                < agent.body.radius_enclose() + ACTIVATION_MARGIN
            {
                active.insert(agent.id);
            }
        }

        for &neighbor in &agent.neighbors {
            if neighbor.index() <= first {
                continue;
            }
            let other = &agents[neighbor.index()];
            if domain.distance(&position, &other.kinematics.position)
                < agent.body.radius_enclose() + other.body.radius_enclose() + ACTIVATION_MARGIN
            {
                active.insert(agent.id);
                active.insert(other.id);
            }
        }
    }

    // Revert the projection by subtracting the same deltas.
    for agent in agents.iter_mut() {
        agent.kinematics.position -= agent.desired.velocity * macro_step;
        agent.kinematics.theta -= agent.desired.omega * macro_step;
    }

    // Agents whose velocity strongly deviates from the target react
    // mechanically even without a predicted overlap.
    for agent in agents.iter() {
        let dv = agent.kinematics.velocity - agent.desired.velocity;
        let dw = agent.kinematics.omega - agent.desired.omega;
        if dv.norm_squared() + dw * dw > REACTIVITY_THRESHOLD {
            active.insert(agent.id);
        }
    }

    // One hop of neighbor closure.
    let seeds: Vec<AgentId> = active.members().to_vec();
    for seed in seeds {
        for &neighbor in &agents[seed.index()].neighbors {
            active.insert(neighbor);
        }
    }

    active
}
