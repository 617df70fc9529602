//! Spatial indexing for contact detection.
//!
//! Stands in for the contact events a rigid-body engine would report: two
//! circles are in contact while their discs overlap.

use geo::Coord;
use kdtree::KdTree;
use kdtree::distance::squared_euclidean;

use super::contacts::{CircleId, ContactGraph};
use super::error::PetriError;

/// Type alias for 2D spatial KD-tree used for efficient neighbor queries.
pub type Tree2D = KdTree<f32, usize, [f32; 2]>;

/// Position and size of one body, as seen by the contact detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFootprint {
    /// Body id.
    pub id: CircleId,
    /// World position of the center.
    pub pos: Coord<f32>,
    /// Disc radius.
    pub radius: f32,
}

/// Builds a KD-tree over body centers; the payload is the slice index.
pub fn build_tree(bodies: &[BodyFootprint]) -> Result<Tree2D, PetriError> {
    let mut tree = KdTree::new(2);
    for (i, body) in bodies.iter().enumerate() {
        tree.add([body.pos.x, body.pos.y], i)
            .map_err(|kind| PetriError::Spatial { id: body.id.0, kind })?;
    }
    Ok(tree)
}

/// Rebuilds `graph` so it holds exactly the overlapping pairs among `bodies`.
pub fn detect_contacts(bodies: &[BodyFootprint], graph: &mut ContactGraph) -> Result<(), PetriError> {
    graph.clear();
    if bodies.len() < 2 {
        return Ok(());
    }
    let tree = build_tree(bodies)?;
    let max_radius = bodies.iter().map(|b| b.radius).fold(0.0_f32, f32::max);

    for (i, body) in bodies.iter().enumerate() {
        let reach = body.radius + max_radius;
        let nearby = tree
            .within(&[body.pos.x, body.pos.y], reach * reach, &squared_euclidean)
            .map_err(|kind| PetriError::Spatial { id: body.id.0, kind })?;
        for (dist2, &j) in nearby {
            // each pair is visited from both ends; keep one
            if j <= i {
                continue;
            }
            let other = &bodies[j];
            let touch = body.radius + other.radius;
            if dist2 < touch * touch {
                graph.add_contact(body.id, other.id);
            }
        }
    }
    Ok(())
}
