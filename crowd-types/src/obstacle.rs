//! Obstacles: wall polylines that agents collide with.

use crate::agent::MaterialId;
use crate::math::Vec2;
use crate::{CrowdError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An obstacle: an ordered polyline of wall corners with one material.
///
/// Each consecutive corner pair is a wall segment. The polyline is not
/// implicitly closed, and its geometry is never wrapped by the periodic
/// domain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Obstacle {
    vertices: Vec<Vec2>,
    material: MaterialId,
}

impl Obstacle {
    /// Create an obstacle from its corner polyline.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when fewer than two corners are given
    /// or two consecutive corners coincide (a zero-length segment has no
    /// normal), and a numeric error for non-finite coordinates.
    pub fn new(vertices: Vec<Vec2>, material: MaterialId) -> Result<Self> {
        if vertices.len() < 2 {
            return Err(CrowdError::config(
                "an obstacle needs at least two corners",
            ));
        }
        for v in &vertices {
            if !v.x.is_finite() || !v.y.is_finite() {
                return Err(CrowdError::numeric("obstacle corner"));
            }
        }
        for pair in vertices.windows(2) {
            if pair[0] == pair[1] {
                return Err(CrowdError::config(
                    "consecutive obstacle corners must be distinct",
                ));
            }
        }
        Ok(Self { vertices, material })
    }

    /// Number of wall segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.vertices.len() - 1
    }

    /// Endpoints of segment `index`.
    #[must_use]
    pub fn segment(&self, index: usize) -> (Vec2, Vec2) {
        (self.vertices[index], self.vertices[index + 1])
    }

    /// The obstacle's material.
    #[must_use]
    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// The corner polyline.
    #[must_use]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }
}
