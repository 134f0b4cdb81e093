//! The macro-step engine: the library entry point of the mechanical layer.
//!
//! [`CrowdMechanics`] owns all process-lifetime simulation state: the
//! material table, the domain and obstacles, the agent table, and the
//! mapping between external string ids and dense agent ids. There is no
//! global state; every component receives the tables it reads.
//!
//! The first call to [`CrowdMechanics::step`] must supply the static
//! records (materials, geometry, agents); subsequent calls only update the
//! dynamics unless the parameters request a static reload. All inputs of a
//! call are validated and staged before any agent is touched, so a rejected
//! call leaves the kinematics at the previous macro step's values.

use crowd_contact::MaterialTable;
use crowd_types::math::perp_scaled;
use crowd_types::{
    Agent, AgentBody, AgentId, AgentsRecord, CrowdError, Domain, DynamicsRecord, GeometryRecord,
    Kinematics, MaterialsRecord, Obstacle, ParametersRecord, Result, Shape, Vec2,
};
use hashbrown::HashMap;
use tracing::debug;

use crate::activation::predict_active;
use crate::neighborhood::build_neighborhoods;
use crate::relaxation::relax_passive;
use crate::resolver::ContactResolver;

/// The mechanical layer engine.
///
/// # Example
///
/// ```
/// use crowd_core::CrowdMechanics;
/// use crowd_types::{
///     AgentDynamics, AgentRecord, AgentsRecord, ContactRecord, DynamicsRecord, GeometryRecord,
///     MaterialRecord, MaterialsRecord, ParametersRecord, ShapeRecord, Vec2, WallRecord,
/// };
///
/// let parameters = ParametersRecord {
///     macro_step: 0.1,
///     sub_step: 0.01,
///     static_path: "static".into(),
///     dynamic_path: "dynamic".into(),
///     load_static_data: false,
/// };
/// let materials = MaterialsRecord {
///     intrinsic: vec![MaterialRecord {
///         id: "body".into(),
///         young_modulus: 1e6,
///         shear_modulus: 4e5,
///     }],
///     binary: vec![ContactRecord {
///         id_a: "body".into(),
///         id_b: "body".into(),
///         damping_normal: 10.0,
///         damping_tangential: 10.0,
///         friction_sliding: 0.5,
///     }],
/// };
/// let geometry = GeometryRecord {
///     lx: 100.0,
///     ly: 100.0,
///     walls: vec![WallRecord {
///         material: "body".into(),
///         corners: vec![Vec2::new(0.0, 0.0), Vec2::new(0.0, 100.0)],
///     }],
/// };
/// let agents = AgentsRecord {
///     agents: vec![AgentRecord {
///         id: "walker".into(),
///         mass: 80.0,
///         moment_of_inertia: 5.0,
///         floor_damping: 2.0,
///         angular_damping: 2.0,
///         shapes: vec![ShapeRecord {
///             id: "torso".into(),
///             material: "body".into(),
///             radius: 0.25,
///             position: Vec2::zeros(),
///         }],
///     }],
/// };
/// let mut dynamics = DynamicsRecord {
///     agents: vec![AgentDynamics {
///         id: "walker".into(),
///         position: Vec2::new(10.0, 10.0),
///         velocity: Vec2::new(1.0, 0.0),
///         theta: 0.0,
///         omega: 0.0,
///         drive_force: Vec2::new(160.0, 0.0),
///         drive_torque: 0.0,
///     }],
/// };
///
/// let mut engine = CrowdMechanics::new();
/// engine.step(
///     &parameters,
///     Some(&materials),
///     Some(&geometry),
///     Some(&agents),
///     &mut dynamics,
/// )?;
///
/// // The dynamics record now carries the post-step kinematics
/// assert!(dynamics.agents[0].position.x > 10.0);
/// # Ok::<(), crowd_types::CrowdError>(())
/// ```
#[derive(Debug, Default)]
pub struct CrowdMechanics {
    scene: Option<Scene>,
}

impl CrowdMechanics {
    /// Create an engine with no loaded scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the static data has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.scene.is_some()
    }

    /// Advance the simulation by one macro step.
    ///
    /// Inputs arrive in the order of the external interface: parameters,
    /// then the static records (required on the first call or when
    /// `load_static_data` is set, ignored otherwise), then the dynamics
    /// record, whose kinematic fields are overwritten with the post-step
    /// state of every agent on success.
    ///
    /// # Errors
    ///
    /// Returns a categorized error on invalid parameters, missing static
    /// records, unknown or missing agents in the dynamics record, or
    /// non-finite input values. On error no agent state is modified.
    pub fn step(
        &mut self,
        parameters: &ParametersRecord,
        materials: Option<&MaterialsRecord>,
        geometry: Option<&GeometryRecord>,
        agents: Option<&AgentsRecord>,
        dynamics: &mut DynamicsRecord,
    ) -> Result<()> {
        parameters.validate()?;

        if self.scene.is_none() || parameters.load_static_data {
            let materials = materials.ok_or_else(|| {
                CrowdError::config("materials record required to load static data")
            })?;
            let geometry = geometry.ok_or_else(|| {
                CrowdError::config("geometry record required to load static data")
            })?;
            let agents = agents.ok_or_else(|| {
                CrowdError::config("agents record required to load static data")
            })?;
            self.scene = Some(Scene::load(materials, geometry, agents)?);
        }

        let Some(scene) = self.scene.as_mut() else {
            return Err(CrowdError::config("static data not loaded"));
        };
        scene.advance(parameters, dynamics)
    }
}

/// Everything the engine owns once the static records are loaded.
#[derive(Debug)]
struct Scene {
    materials: MaterialTable,
    domain: Domain,
    obstacles: Vec<Obstacle>,
    agents: Vec<Agent>,
    agent_index: HashMap<String, AgentId>,
}

impl Scene {
    fn load(
        materials: &MaterialsRecord,
        geometry: &GeometryRecord,
        agents: &AgentsRecord,
    ) -> Result<Self> {
        let materials = MaterialTable::from_record(materials)?;
        let domain = Domain::new(geometry.lx, geometry.ly)?;

        let mut obstacles = Vec::with_capacity(geometry.walls.len());
        for wall in &geometry.walls {
            let material = materials.resolve(&wall.material)?;
            obstacles.push(Obstacle::new(wall.corners.clone(), material)?);
        }

        let mut table = Vec::with_capacity(agents.agents.len());
        let mut agent_index = HashMap::with_capacity(agents.agents.len());
        for (index, record) in agents.agents.iter().enumerate() {
            let id = AgentId::new(index as u32);
            if agent_index.insert(record.id.clone(), id).is_some() {
                return Err(CrowdError::config(format!(
                    "duplicate agent id {}",
                    record.id
                )));
            }

            if record.shapes.is_empty() {
                return Err(CrowdError::config(format!(
                    "agent {} has no shapes",
                    record.id
                )));
            }
            let mut shapes = Vec::with_capacity(record.shapes.len());
            for shape in &record.shapes {
                shapes.push(Shape {
                    offset: shape.position,
                    radius: shape.radius,
                    material: materials.resolve(&shape.material)?,
                });
            }
            let theta_init = initial_orientation(&shapes);

            let body = AgentBody::new(
                record.mass,
                record.moment_of_inertia,
                shapes,
                theta_init,
                record.floor_damping,
                record.angular_damping,
            )?;
            table.push(Agent::new(id, body));
        }

        debug!(
            agents = table.len(),
            obstacles = obstacles.len(),
            materials = materials.len(),
            "static data loaded"
        );

        Ok(Self {
            materials,
            domain,
            obstacles,
            agents: table,
            agent_index,
        })
    }

    /// Run one macro step against a staged, fully validated dynamics record.
    fn advance(
        &mut self,
        parameters: &ParametersRecord,
        dynamics: &mut DynamicsRecord,
    ) -> Result<()> {
        let staged = self.stage_dynamics(dynamics)?;
        for (id, kinematics, drive_force, drive_torque) in staged {
            self.agents[id.index()].set_dynamics(kinematics, drive_force, drive_torque);
        }

        build_neighborhoods(
            &mut self.agents,
            &self.obstacles,
            &self.domain,
            parameters.macro_step,
        );
        let active = predict_active(
            &mut self.agents,
            &self.obstacles,
            &self.domain,
            parameters.macro_step,
        );
        debug!(
            agents = self.agents.len(),
            active = active.len(),
            "macro step"
        );

        if !active.is_empty() {
            let mut resolver = ContactResolver::new(
                &self.obstacles,
                &self.domain,
                &self.materials,
                parameters.sub_step,
                self.agents.len(),
            );
            resolver.run(&mut self.agents, &active, parameters.sub_step_count());
        }

        for agent in &mut self.agents {
            if !active.contains(agent.id) {
                relax_passive(agent, parameters.macro_step);
            }
        }

        self.publish(dynamics);
        Ok(())
    }

    /// Validate the dynamics record without touching any agent.
    ///
    /// Every known agent must appear exactly once, every id must be known,
    /// and every value must be finite.
    fn stage_dynamics(
        &self,
        dynamics: &DynamicsRecord,
    ) -> Result<Vec<(AgentId, Kinematics, Vec2, f64)>> {
        let mut staged = Vec::with_capacity(dynamics.agents.len());
        let mut seen = vec![false; self.agents.len()];

        for entry in &dynamics.agents {
            let id = *self
                .agent_index
                .get(entry.id.as_str())
                .ok_or_else(|| CrowdError::reference("agent", entry.id.clone()))?;
            if seen[id.index()] {
                return Err(CrowdError::config(format!(
                    "agent {} appears twice in the dynamics record",
                    entry.id
                )));
            }
            seen[id.index()] = true;

            let values = [
                entry.position.x,
                entry.position.y,
                entry.velocity.x,
                entry.velocity.y,
                entry.theta,
                entry.omega,
                entry.drive_force.x,
                entry.drive_force.y,
                entry.drive_torque,
            ];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(CrowdError::numeric(format!("dynamics of agent {}", entry.id)));
            }

            staged.push((
                id,
                Kinematics {
                    position: entry.position,
                    theta: entry.theta,
                    velocity: entry.velocity,
                    omega: entry.omega,
                },
                entry.drive_force,
                entry.drive_torque,
            ));
        }

        if let Some(index) = seen.iter().position(|covered| !covered) {
            let missing = self
                .agent_index
                .iter()
                .find(|(_, id)| id.index() == index)
                .map_or_else(String::new, |(name, _)| name.clone());
            return Err(CrowdError::config(format!(
                "agent {missing} is missing from the dynamics record"
            )));
        }

        Ok(staged)
    }

    /// Overwrite the kinematic fields of the dynamics record.
    fn publish(&self, dynamics: &mut DynamicsRecord) {
        for entry in &mut dynamics.agents {
            if let Some(id) = self.agent_index.get(entry.id.as_str()) {
                let kinematics = &self.agents[id.index()].kinematics;
                entry.position = kinematics.position;
                entry.velocity = kinematics.velocity;
                entry.theta = kinematics.theta;
                entry.omega = kinematics.omega;
            }
        }
    }
}

/// Body orientation implied by the shape layout.
///
/// The chord from the first to the last shape offset is read as the
/// shoulder line; the body faces along its perpendicular. Layouts with a
/// degenerate chord (single shape, coincident offsets) face `0`.
fn initial_orientation(shapes: &[Shape]) -> f64 {
    let first = shapes[0].offset;
    let last = shapes[shapes.len() - 1].offset;
    let facing = perp_scaled(1.0, &(last - first));
    if facing.x == 0.0 && facing.y == 0.0 {
        0.0
    } else {
        facing.y.atan2(facing.x)
    }
}
