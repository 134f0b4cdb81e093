//! Passive relaxation of agents outside the active set.

use crowd_types::Agent;

/// Relax an inactive agent toward its desired velocities over `macro_step`.
///
/// Integrates `dv/dt = (v_des − v)/τ` in closed form,
///
/// ```text
/// v(Δt) = v_des·(1 − e^{−Δt/τ}) + v(0)·e^{−Δt/τ}
/// ```
///
/// independently for the velocity components (with `τ_t`) and the angular
/// velocity (with `τ_r`), then advances the kinematics with the relaxed
/// velocities.
pub fn relax_passive(agent: &mut Agent, macro_step: f64) {
    let decay_translation = (-macro_step * agent.body.inv_tau_translation).exp();
    let decay_rotation = (-macro_step * agent.body.inv_tau_rotation).exp();

    agent.kinematics.velocity = agent.desired.velocity * (1.0 - decay_translation)
        + agent.kinematics.velocity * decay_translation;
    agent.kinematics.omega =
        agent.desired.omega * (1.0 - decay_rotation) + agent.kinematics.omega * decay_rotation;

    agent.step_kinematic(macro_step);
}
