//! End-to-end macro-step scenarios through the engine API.
//!
//! All scenarios share the same setup: `Δt = 0.1`, `δt = 0.01`,
//! a 100 × 100 periodic domain, and a single material with `E = 1e6`,
//! `G = 4e5`, `γ_n = γ_t = 10`, `μ = 0.5`. Agents use `τ_t = τ_r = 0.5`
//! (damping rates 2.0).
//!
//! Agents that are mechanically active without touching anything follow the
//! sub-stepped discrete relaxation; passive agents follow the closed form.
//! Where the distinction matters, the expected values are computed
//! explicitly with the same update rule.

use approx::assert_relative_eq;
use crowd_core::CrowdMechanics;
use crowd_types::{
    AgentDynamics, AgentRecord, AgentsRecord, ContactRecord, DynamicsRecord, GeometryRecord,
    MaterialRecord, MaterialsRecord, ParametersRecord, ShapeRecord, Vec2, WallRecord,
};

const MACRO_STEP: f64 = 0.1;
const SUB_STEP: f64 = 0.01;
const MASS: f64 = 80.0;
const INERTIA: f64 = 5.0;
const DAMPING_RATE: f64 = 2.0; // 1/τ with τ = 0.5

fn parameters() -> ParametersRecord {
    ParametersRecord {
        macro_step: MACRO_STEP,
        sub_step: SUB_STEP,
        static_path: "static".into(),
        dynamic_path: "dynamic".into(),
        load_static_data: false,
    }
}

fn materials() -> MaterialsRecord {
    MaterialsRecord {
        intrinsic: vec![MaterialRecord {
            id: "body".into(),
            young_modulus: 1e6,
            shear_modulus: 4e5,
        }],
        binary: vec![ContactRecord {
            id_a: "body".into(),
            id_b: "body".into(),
            damping_normal: 10.0,
            damping_tangential: 10.0,
            friction_sliding: 0.5,
        }],
    }
}

fn geometry(walls: Vec<WallRecord>) -> GeometryRecord {
    GeometryRecord {
        lx: 100.0,
        ly: 100.0,
        walls,
    }
}

fn left_wall() -> WallRecord {
    WallRecord {
        material: "body".into(),
        corners: vec![Vec2::new(0.0, 0.0), Vec2::new(0.0, 10.0)],
    }
}

fn disc_agent(id: &str, radius: f64) -> AgentRecord {
    AgentRecord {
        id: id.into(),
        mass: MASS,
        moment_of_inertia: INERTIA,
        floor_damping: DAMPING_RATE,
        angular_damping: DAMPING_RATE,
        shapes: vec![ShapeRecord {
            id: format!("{id}-disc"),
            material: "body".into(),
            radius,
            position: Vec2::zeros(),
        }],
    }
}

fn entry(id: &str, position: Vec2, velocity: Vec2, drive_force: Vec2) -> AgentDynamics {
    AgentDynamics {
        id: id.into(),
        position,
        velocity,
        theta: 0.0,
        omega: 0.0,
        drive_force,
        drive_torque: 0.0,
    }
}

/// Drive force that makes the desired velocity equal `v`.
fn drive_for(v: Vec2) -> Vec2 {
    v * (MASS * DAMPING_RATE)
}

/// The resolver's velocity update for a contact-free agent, iterated over
/// the sub-steps of one macro step.
fn discrete_relaxation(mut v: f64, v_des: f64) -> f64 {
    for _ in 0..10 {
        v += (v_des - v) * DAMPING_RATE * SUB_STEP;
    }
    v
}

/// Position reached by a contact-free active agent (semi-implicit Euler).
fn discrete_glide(mut x: f64, mut v: f64, v_des: f64) -> f64 {
    for _ in 0..10 {
        v += (v_des - v) * DAMPING_RATE * SUB_STEP;
        x += v * SUB_STEP;
    }
    x
}

#[test]
fn free_glide_relaxes_toward_target() {
    let mut engine = CrowdMechanics::new();
    // Fp = (m, 0): v_des = (0.5, 0), half the current speed. The mismatch
    // makes the agent mechanically active, with nothing to touch.
    let mut dynamics = DynamicsRecord {
        agents: vec![entry(
            "glider",
            Vec2::new(10.0, 10.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(MASS, 0.0),
        )],
    };

    engine
        .step(
            &parameters(),
            Some(&materials()),
            Some(&geometry(vec![left_wall()])),
            Some(&AgentsRecord {
                agents: vec![disc_agent("glider", 0.25)],
            }),
            &mut dynamics,
        )
        .unwrap();

    let out = &dynamics.agents[0];
    assert_relative_eq!(out.velocity.x, discrete_relaxation(1.0, 0.5), epsilon = 1e-12);
    assert_relative_eq!(
        out.position.x,
        discrete_glide(10.0, 1.0, 0.5),
        epsilon = 1e-12
    );

    // The sub-stepped update converges to the closed form
    let closed_form = 0.5 + 0.5 * (-0.2_f64).exp();
    assert_relative_eq!(out.velocity.x, closed_form, epsilon = 2e-3);

    // No contact activity: the motion stays on the x axis
    assert_relative_eq!(out.velocity.y, 0.0, epsilon = 1e-12);
    assert_relative_eq!(out.omega, 0.0, epsilon = 1e-12);
    assert_relative_eq!(out.theta, 0.0, epsilon = 1e-12);
}

#[test]
fn wall_standoff_slows_without_contact() {
    let mut engine = CrowdMechanics::new();
    // Approaching the wall at x = 0 with zero drive. The wall is beyond the
    // neighbor cutoff (1.0 > 0.7), so relaxation is all that acts.
    let mut dynamics = DynamicsRecord {
        agents: vec![entry(
            "walker",
            Vec2::new(1.0, 5.0),
            Vec2::new(-1.0, 0.0),
            Vec2::zeros(),
        )],
    };

    engine
        .step(
            &parameters(),
            Some(&materials()),
            Some(&geometry(vec![left_wall()])),
            Some(&AgentsRecord {
                agents: vec![disc_agent("walker", 0.25)],
            }),
            &mut dynamics,
        )
        .unwrap();

    let out = &dynamics.agents[0];
    assert_relative_eq!(
        out.velocity.x,
        discrete_relaxation(-1.0, 0.0),
        epsilon = 1e-12
    );
    assert_relative_eq!(
        out.position.x,
        discrete_glide(1.0, -1.0, 0.0),
        epsilon = 1e-12
    );

    // Slowed, still short of the wall, never pushed back
    assert!(out.velocity.x > -1.0);
    assert!(out.position.x > 0.9 - f64::EPSILON);
    assert!(out.position.x < 1.0);
    assert_relative_eq!(out.velocity.y, 0.0, epsilon = 1e-12);
}

#[test]
fn head_on_collision_repels() {
    let mut engine = CrowdMechanics::new();
    let agents = AgentsRecord {
        agents: vec![disc_agent("left", 0.6), disc_agent("right", 0.6)],
    };
    let mut dynamics = DynamicsRecord {
        agents: vec![
            entry(
                "left",
                Vec2::new(49.5, 50.0),
                Vec2::new(1.0, 0.0),
                drive_for(Vec2::new(1.0, 0.0)),
            ),
            entry(
                "right",
                Vec2::new(50.5, 50.0),
                Vec2::new(-1.0, 0.0),
                drive_for(Vec2::new(-1.0, 0.0)),
            ),
        ],
    };

    engine
        .step(
            &parameters(),
            Some(&materials()),
            Some(&geometry(vec![left_wall()])),
            Some(&agents),
            &mut dynamics,
        )
        .unwrap();

    let left = &dynamics.agents[0];
    let right = &dynamics.agents[1];

    // The normal force opposes closure for both agents
    assert!(left.velocity.x < 1.0);
    assert!(right.velocity.x > -1.0);

    // The symmetric setup stays symmetric about x = 50
    assert_relative_eq!(left.velocity.x, -right.velocity.x, epsilon = 1e-9);
    assert_relative_eq!(
        50.0 - left.position.x,
        right.position.x - 50.0,
        epsilon = 1e-9
    );

    // Separation exceeds the projection-only estimate of 0.8
    assert!(right.position.x - left.position.x > 0.8);

    // No tangential excitation in a purely normal collision
    assert_relative_eq!(left.velocity.y, 0.0, epsilon = 1e-9);
    assert_relative_eq!(left.omega, 0.0, epsilon = 1e-9);
}

#[test]
fn periodic_pair_touches_without_force() {
    let mut engine = CrowdMechanics::new();
    // Two discs facing each other across the periodic seam. The positions
    // are exactly representable, so the wrapped center distance is exactly
    // the sum of the radii and the overlap exactly zero.
    let agents = AgentsRecord {
        agents: vec![disc_agent("west", 0.25), disc_agent("east", 0.25)],
    };
    let mut dynamics = DynamicsRecord {
        agents: vec![
            entry("west", Vec2::new(0.25, 50.0), Vec2::zeros(), Vec2::zeros()),
            entry("east", Vec2::new(99.75, 50.0), Vec2::zeros(), Vec2::zeros()),
        ],
    };

    engine
        .step(
            &parameters(),
            Some(&materials()),
            Some(&geometry(vec![left_wall()])),
            Some(&agents),
            &mut dynamics,
        )
        .unwrap();

    // ξ = 0: no contact force, nothing moves on either side of the seam
    assert_relative_eq!(dynamics.agents[0].position.x, 0.25, epsilon = 1e-12);
    assert_relative_eq!(dynamics.agents[1].position.x, 99.75, epsilon = 1e-12);
    assert_relative_eq!(dynamics.agents[0].velocity.norm(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(dynamics.agents[1].velocity.norm(), 0.0, epsilon = 1e-12);
}

#[test]
fn cascade_activation_reaches_one_hop() {
    let mut engine = CrowdMechanics::new();
    // A drives toward B and will overlap at projection. C is within B's
    // neighbor cutoff but never close to overlap; closure makes it active
    // anyway. D is out of range entirely and stays passive.
    //
    // C and D carry the same small velocity mismatch, below the reactivity
    // threshold. An active agent integrates it with the sub-stepped rule, a
    // passive one with the closed form; the two are distinguishable.
    let agents = AgentsRecord {
        agents: vec![
            disc_agent("a", 0.6),
            disc_agent("b", 0.6),
            disc_agent("c", 0.6),
            disc_agent("d", 0.6),
        ],
    };
    let residual = 0.009; // squared mismatch 8.1e-5 < 1e-4
    let mut dynamics = DynamicsRecord {
        agents: vec![
            entry(
                "a",
                Vec2::new(50.0, 50.0),
                Vec2::new(1.0, 0.0),
                drive_for(Vec2::new(1.0, 0.0)),
            ),
            entry("b", Vec2::new(51.35, 50.0), Vec2::zeros(), Vec2::zeros()),
            entry(
                "c",
                Vec2::new(52.7, 50.0),
                Vec2::new(0.0, residual),
                Vec2::zeros(),
            ),
            entry(
                "d",
                Vec2::new(70.0, 50.0),
                Vec2::new(0.0, residual),
                Vec2::zeros(),
            ),
        ],
    };

    engine
        .step(
            &parameters(),
            Some(&materials()),
            Some(&geometry(vec![left_wall()])),
            Some(&agents),
            &mut dynamics,
        )
        .unwrap();

    let expected_active = discrete_relaxation(residual, 0.0);
    let expected_passive = residual * (-0.2_f64).exp();
    // The two update rules genuinely differ at this precision
    assert!((expected_active - expected_passive).abs() > 1e-7);

    // C was activated by closure through B
    assert_relative_eq!(dynamics.agents[2].velocity.y, expected_active, epsilon = 1e-12);
    // D stayed passive
    assert_relative_eq!(
        dynamics.agents[3].velocity.y,
        expected_passive,
        epsilon = 1e-12
    );
}

#[test]
fn repeated_steps_keep_static_data() {
    let mut engine = CrowdMechanics::new();
    let mut dynamics = DynamicsRecord {
        agents: vec![entry(
            "walker",
            Vec2::new(50.0, 50.0),
            Vec2::new(0.5, 0.0),
            drive_for(Vec2::new(0.5, 0.0)),
        )],
    };

    engine
        .step(
            &parameters(),
            Some(&materials()),
            Some(&geometry(vec![left_wall()])),
            Some(&AgentsRecord {
                agents: vec![disc_agent("walker", 0.25)],
            }),
            &mut dynamics,
        )
        .unwrap();

    // Ten further macro steps, dynamics only
    for _ in 0..10 {
        engine
            .step(&parameters(), None, None, None, &mut dynamics)
            .unwrap();
    }

    // Matched drive: the passive fixed point just translates
    assert_relative_eq!(dynamics.agents[0].velocity.x, 0.5, epsilon = 1e-9);
    assert_relative_eq!(
        dynamics.agents[0].position.x,
        50.0 + 11.0 * 0.5 * MACRO_STEP,
        epsilon = 1e-9
    );
}
