//! Footprint reconstruction from mesh boundary edges
//!
//! A floor mesh is a set of planar faces. Every interior edge is shared by
//! two faces, so an edge that occurs exactly once in the flattened face
//! loops lies on the outline. Walking those edges from an arbitrary start
//! recovers the outline as an ordered vertex loop.
//!
//! Only the first loop discovered is returned; disconnected outlines and
//! interior holes are not represented.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::error::{SceneError, SceneResult};
use crate::foundation::math::{Vec2, Vec3};
use crate::scene::Polygon;

/// Undirected edge between two vertex indices
pub type Edge = [usize; 2];

fn canonical(edge: Edge) -> Edge {
    let [a, b] = edge;
    if a <= b { [a, b] } else { [b, a] }
}

/// Flatten face loops into their closing edges
///
/// `loop_totals[i]` consecutive entries of `indices` form face `i`; each face
/// contributes one edge per vertex, the last wrapping back to the first.
pub fn loop_edges(indices: &[usize], loop_totals: &[usize]) -> SceneResult<Vec<Edge>> {
    let mut edges = Vec::with_capacity(indices.len());
    let mut offset = 0;
    for &size in loop_totals {
        let face = indices.get(offset..offset + size).ok_or_else(|| {
            SceneError::malformed(format!(
                "face loop of {size} vertices at offset {offset} overruns {} indices",
                indices.len()
            ))
        })?;
        for (i, &a) in face.iter().enumerate() {
            edges.push([a, face[(i + 1) % size]]);
        }
        offset += size;
    }
    Ok(edges)
}

/// Edges occurring exactly once, in input order
pub fn boundary_edges(edges: &[Edge]) -> Vec<Edge> {
    let mut counts: HashMap<Edge, usize> = HashMap::new();
    for &edge in edges {
        *counts.entry(canonical(edge)).or_insert(0) += 1;
    }
    edges
        .iter()
        .copied()
        .filter(|edge| counts.get(&canonical(*edge)) == Some(&1))
        .collect()
}

/// Ordered vertex loop along the boundary
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoundaryLoop {
    /// Vertices in walk order, each visited once
    pub vertices: Vec<usize>,
    /// Whether the walk returned to its start vertex
    pub closed: bool,
}

/// Walk the boundary graph starting at the first boundary edge
///
/// At each vertex the walk takes the first boundary neighbour that is not
/// the vertex it came from and has not been visited yet (the start vertex
/// excepted, which closes the loop).
pub fn outer_loop(edges: &[Edge]) -> BoundaryLoop {
    let boundary = boundary_edges(edges);
    let Some(&[start, _]) = boundary.first() else {
        return BoundaryLoop::default();
    };

    let mut adjacency: HashMap<usize, Vec<usize>> = HashMap::new();
    for &[a, b] in &boundary {
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }

    let mut vertices = vec![start];
    let mut visited = HashSet::from([start]);
    let mut previous = None;
    let mut current = start;
    let mut closed = false;

    while let Some(next) = adjacency.get(&current).and_then(|neighbours| {
        neighbours
            .iter()
            .copied()
            .find(|&n| Some(n) != previous && (n == start || !visited.contains(&n)))
    }) {
        if next == start {
            closed = true;
            break;
        }
        previous = Some(current);
        current = next;
        vertices.push(next);
        visited.insert(next);
    }

    if adjacency.len() > vertices.len() {
        debug!(
            "Boundary has {} vertices, walk kept {}; remaining loops dropped",
            adjacency.len(),
            vertices.len()
        );
    }
    BoundaryLoop { vertices, closed }
}

/// Floor footprint polygon of a planar mesh
///
/// Vertices are projected onto the XY plane. A mesh whose boundary walk
/// yields fewer than three vertices has no footprint and is malformed.
pub fn reconstruct_footprint(vertices: &[Vec3], edges: &[Edge]) -> SceneResult<Polygon> {
    let outline = outer_loop(edges);
    if outline.vertices.len() < 3 {
        return Err(SceneError::malformed(format!(
            "boundary walk found {} vertices, a footprint needs at least 3",
            outline.vertices.len()
        )));
    }
    let ring = outline
        .vertices
        .iter()
        .map(|&index| {
            vertices
                .get(index)
                .map(|v| Vec2::new(v.x, v.y))
                .ok_or_else(|| {
                    SceneError::malformed(format!(
                        "edge references vertex {index}, mesh has {}",
                        vertices.len()
                    ))
                })
        })
        .collect::<SceneResult<Vec<_>>>()?;
    Ok(Polygon::new(ring))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_loop_edges_wrap_each_face() {
        let edges = loop_edges(&[0, 1, 2, 0, 2, 3], &[3, 3]).unwrap();
        assert_eq!(edges, vec![[0, 1], [1, 2], [2, 0], [0, 2], [2, 3], [3, 0]]);
    }

    #[test]
    fn test_loop_edges_overrun() {
        assert!(matches!(loop_edges(&[0, 1, 2], &[3, 3]), Err(SceneError::Malformed(_))));
    }

    #[test]
    fn test_shared_diagonal_is_interior() {
        let edges = loop_edges(&[0, 1, 2, 0, 2, 3], &[3, 3]).unwrap();
        let boundary = boundary_edges(&edges);
        assert_eq!(boundary, vec![[0, 1], [1, 2], [2, 3], [3, 0]]);
    }

    #[test]
    fn test_unit_square_from_two_triangles() {
        let edges = loop_edges(&[0, 1, 2, 0, 2, 3], &[3, 3]).unwrap();
        let outline = outer_loop(&edges);

        assert!(outline.closed);
        let mut sorted = outline.vertices.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);

        let polygon = reconstruct_footprint(&unit_square(), &edges).unwrap();
        assert_eq!(polygon.len(), 4);
        assert_relative_eq!(polygon.area(), 1.0);
    }

    #[test]
    fn test_l_shaped_room() {
        // Three unit quads forming an L; 8 outline vertices
        let vertices: Vec<Vec3> = [
            (0.0, 0.0), (1.0, 0.0), (2.0, 0.0),
            (0.0, 1.0), (1.0, 1.0), (2.0, 1.0),
            (0.0, 2.0), (1.0, 2.0),
        ]
        .iter()
        .map(|&(x, y)| Vec3::new(x, y, 3.0))
        .collect();
        let edges = loop_edges(&[0, 1, 4, 3, 1, 2, 5, 4, 3, 4, 7, 6], &[4, 4, 4]).unwrap();

        let outline = outer_loop(&edges);
        assert!(outline.closed);
        assert_eq!(outline.vertices.len(), 8);

        let polygon = reconstruct_footprint(&vertices, &edges).unwrap();
        assert_relative_eq!(polygon.area(), 3.0);
    }

    #[test]
    fn test_open_chain_stops() {
        let outline = outer_loop(&[[0, 1], [1, 2]]);
        assert_eq!(outline.vertices, vec![0, 1, 2]);
        assert!(!outline.closed);
    }

    #[test]
    fn test_empty_and_interior_only() {
        assert_eq!(outer_loop(&[]), BoundaryLoop::default());
        assert_eq!(outer_loop(&[[0, 1], [1, 0]]), BoundaryLoop::default());
    }

    #[test]
    fn test_footprint_needs_a_boundary() {
        for edges in [vec![], vec![[0, 1], [1, 0]], vec![[0, 1]]] {
            assert!(matches!(
                reconstruct_footprint(&unit_square(), &edges),
                Err(SceneError::Malformed(_))
            ));
        }
    }

    #[test]
    fn test_bad_vertex_index() {
        let edges = [[0, 1], [1, 9], [9, 0]];
        assert!(matches!(
            reconstruct_footprint(&unit_square(), &edges),
            Err(SceneError::Malformed(_))
        ));
    }
}
