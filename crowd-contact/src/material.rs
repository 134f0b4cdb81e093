//! Material table: per-material elastic moduli and derived pair coefficients.
//!
//! The table is built once from the materials record. Normal and tangential
//! stiffness are derived from the Young and shear moduli of each ordered
//! pair; damping and friction are read from the contact records and
//! symmetrized. Every unordered material pair, including a material against
//! itself, must be covered by a contact record.

use crowd_types::{CrowdError, MaterialId, MaterialsRecord, Result};
use hashbrown::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Contact coefficients for one ordered material pair.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairCoefficients {
    /// Normal damping `γ_n`.
    pub damping_normal: f64,
    /// Tangential damping `γ_t`.
    pub damping_tangential: f64,
    /// Normal stiffness `k_n`, derived from the elastic moduli.
    pub stiffness_normal: f64,
    /// Tangential stiffness `k_t`, derived from the elastic moduli.
    pub stiffness_tangential: f64,
    /// Sliding friction coefficient `μ`.
    pub friction: f64,
}

/// Table of materials and their pairwise contact coefficients.
#[derive(Debug, Clone)]
pub struct MaterialTable {
    index: HashMap<String, MaterialId>,
    external_ids: Vec<String>,
    pairs: Vec<PairCoefficients>,
    len: usize,
}

impl MaterialTable {
    /// Build the table from the materials record.
    ///
    /// # Errors
    ///
    /// - Duplicate material ids or a contact record missing for some pair
    ///   are configuration errors.
    /// - Contact records naming unknown materials are reference errors.
    /// - Non-finite moduli, or derived stiffness that is not finite and
    ///   positive (a zero stiffness denominator), are numeric errors.
    pub fn from_record(record: &MaterialsRecord) -> Result<Self> {
        if record.intrinsic.is_empty() {
            return Err(CrowdError::config("at least one material is required"));
        }

        let n = record.intrinsic.len();
        let mut index = HashMap::with_capacity(n);
        let mut external_ids = Vec::with_capacity(n);
        let mut young = Vec::with_capacity(n);
        let mut shear = Vec::with_capacity(n);
        for (i, material) in record.intrinsic.iter().enumerate() {
            if !material.young_modulus.is_finite() || !material.shear_modulus.is_finite() {
                return Err(CrowdError::numeric(format!(
                    "elastic moduli of material {}",
                    material.id
                )));
            }
            if index
                .insert(material.id.clone(), MaterialId::new(i as u32))
                .is_some()
            {
                return Err(CrowdError::config(format!(
                    "duplicate material id {}",
                    material.id
                )));
            }
            external_ids.push(material.id.clone());
            young.push(material.young_modulus);
            shear.push(material.shear_modulus);
        }

        // Stiffness is derived for every ordered pair; the formulas are
        // symmetric in (i, j).
        let mut pairs = vec![
            PairCoefficients {
                damping_normal: 0.0,
                damping_tangential: 0.0,
                stiffness_normal: 0.0,
                stiffness_tangential: 0.0,
                friction: 0.0,
            };
            n * n
        ];
        for i in 0..n {
            for j in 0..n {
                let k_n = stiffness_normal(young[i], shear[i], young[j], shear[j]);
                let k_t = stiffness_tangential(young[i], shear[i], young[j], shear[j]);
                if !k_n.is_finite() || k_n <= 0.0 {
                    return Err(CrowdError::numeric(format!(
                        "normal stiffness for materials {}-{}",
                        external_ids[i], external_ids[j]
                    )));
                }
                if !k_t.is_finite() || k_t <= 0.0 {
                    return Err(CrowdError::numeric(format!(
                        "tangential stiffness for materials {}-{}",
                        external_ids[i], external_ids[j]
                    )));
                }
                pairs[i * n + j].stiffness_normal = k_n;
                pairs[i * n + j].stiffness_tangential = k_t;
            }
        }

        // Damping and friction come from the contact records, symmetrized
        // over (i, j) and (j, i).
        let mut covered = vec![false; n * n];
        for contact in &record.binary {
            let i = *index
                .get(contact.id_a.as_str())
                .ok_or_else(|| CrowdError::reference("material", contact.id_a.clone()))?;
            let j = *index
                .get(contact.id_b.as_str())
                .ok_or_else(|| CrowdError::reference("material", contact.id_b.clone()))?;
            if !contact.damping_normal.is_finite()
                || !contact.damping_tangential.is_finite()
                || !contact.friction_sliding.is_finite()
            {
                return Err(CrowdError::numeric(format!(
                    "contact coefficients for materials {}-{}",
                    contact.id_a, contact.id_b
                )));
            }
            for slot in [i.index() * n + j.index(), j.index() * n + i.index()] {
                pairs[slot].damping_normal = contact.damping_normal;
                pairs[slot].damping_tangential = contact.damping_tangential;
                pairs[slot].friction = contact.friction_sliding;
                covered[slot] = true;
            }
        }
        for i in 0..n {
            for j in i..n {
                if !covered[i * n + j] {
                    return Err(CrowdError::config(format!(
                        "no contact coefficients for material pair {}-{}",
                        external_ids[i], external_ids[j]
                    )));
                }
            }
        }

        Ok(Self {
            index,
            external_ids,
            pairs,
            len: n,
        })
    }

    /// Number of materials in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table is empty (never true for a built table).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resolve an external material id to its row.
    ///
    /// # Errors
    ///
    /// Returns a reference error for an unknown id.
    pub fn resolve(&self, id: &str) -> Result<MaterialId> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| CrowdError::reference("material", id))
    }

    /// External id of a material row.
    #[must_use]
    pub fn external_id(&self, id: MaterialId) -> &str {
        &self.external_ids[id.index()]
    }

    /// Coefficients for the ordered pair `(a, b)`.
    #[must_use]
    pub fn pair(&self, a: MaterialId, b: MaterialId) -> &PairCoefficients {
        &self.pairs[a.index() * self.len + b.index()]
    }
}

/// Normal stiffness `k_n` of a material pair from its elastic moduli.
fn stiffness_normal(e_i: f64, g_i: f64, e_j: f64, g_j: f64) -> f64 {
    1.0 / ((4.0 * g_i - e_i) / (4.0 * g_i * g_i) + (4.0 * g_j - e_j) / (4.0 * g_j * g_j))
}

/// Tangential stiffness `k_t` of a material pair from its elastic moduli.
fn stiffness_tangential(e_i: f64, g_i: f64, e_j: f64, g_j: f64) -> f64 {
    1.0 / ((6.0 * g_i - e_i) / (8.0 * g_i * g_i) + (6.0 * g_j - e_j) / (8.0 * g_j * g_j))
}
