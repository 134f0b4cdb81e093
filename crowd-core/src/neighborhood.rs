//! Neighborhood construction: velocity-bounded candidate pair selection.
//!
//! All pairs that could possibly touch within one macro step become
//! neighbors. The cutoff is the distance an agent can cover at the speed
//! ceiling; for agent pairs it is doubled, since both may close head-on.
//! A uniform grid could replace the exact scan as long as it yields a
//! superset of these pairs.

use crowd_types::math::{segment_closest_point, Domain};
use crowd_types::{Agent, Obstacle, WallRef};

/// Speed ceiling of any agent (m/s).
///
/// Only the neighborhood cutoff depends on it; the dynamics never clamp
/// velocities to it.
pub const V_MAX_AGENT: f64 = 7.0;

/// Rebuild the agent and wall neighbor lists of every agent.
///
/// Wall segments within `Δt·vMax` of an agent's center (Euclidean
/// point-to-segment distance; walls are not periodic) and agents within
/// twice that cutoff (periodic center distance) become neighbors. Agent
/// pairs are inserted symmetrically, scanning in agent-id order.
pub fn build_neighborhoods(
    agents: &mut [Agent],
    obstacles: &[Obstacle],
    domain: &Domain,
    macro_step: f64,
) {
    let wall_cutoff = macro_step * V_MAX_AGENT;
    let agent_cutoff = 2.0 * wall_cutoff;

    for agent in agents.iter_mut() {
        agent.neighbors.clear();
        agent.wall_neighbors.clear();
    }

    for first in 0..agents.len() {
        let position = agents[first].kinematics.position;

        for (obstacle_index, obstacle) in obstacles.iter().enumerate() {
            for segment in 0..obstacle.segment_count() {
                let (start, end) = obstacle.segment(segment);
                let (distance, _) = segment_closest_point(&start, &end, &position);
                if distance < wall_cutoff {
                    agents[first].wall_neighbors.push(WallRef {
                        obstacle: obstacle_index,
                        segment,
                    });
                }
            }
        }

        for second in (first + 1)..agents.len() {
            let distance = domain.distance(&position, &agents[second].kinematics.position);
            if distance < agent_cutoff {
                let second_id = agents[second].id;
                let first_id = agents[first].id;
                agents[first].neighbors.push(second_id);
                agents[second].neighbors.push(first_id);
            }
        }
    }
}
