/////////////////////////////////////////////////////////////////////////////////////////////
//
// Constructs the 6-D bounding volume hierarchy over mesh elements and their aggregates.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::cmp::Ordering;

use faer::{Col, Mat, Row, RowRef};

use crate::config::{BvhParams, SplitAxes};
use crate::utils;

/// Per-element surface data consumed by tree construction.
///
/// One row per mesh element: `masses` holds the element area, `positions`
/// the element barycenter and `normals` the unit element normal, both of
/// shape `(N, 3)`. The element id is the row index, so the mesh collaborator
/// must enumerate its elements in a stable order for builds to be
/// reproducible.
#[derive(Debug, Clone)]
pub struct SurfaceElements {
    masses: Col<f64>,
    positions: Mat<f64>,
    normals: Mat<f64>,
}

impl SurfaceElements {
    /// Bundles per-element masses, positions and normals.
    ///
    /// # Panics
    /// Panics if the row counts disagree or the coordinate matrices are not
    /// three columns wide.
    pub fn new(masses: Col<f64>, positions: Mat<f64>, normals: Mat<f64>) -> Self {
        assert_eq!(
            positions.nrows(),
            masses.nrows(),
            "Positions and masses must have one row per element."
        );
        assert_eq!(
            normals.nrows(),
            masses.nrows(),
            "Normals and masses must have one row per element."
        );
        assert_eq!(positions.ncols(), 3, "Positions must be (N, 3).");
        assert_eq!(normals.ncols(), 3, "Normals must be (N, 3).");

        Self {
            masses,
            positions,
            normals,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.masses.nrows()
    }

    /// Whether the element set is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The mass (area) of one element.
    #[inline(always)]
    pub fn mass(&self, element_id: usize) -> f64 {
        self.masses[element_id]
    }

    /// The barycenter of one element.
    #[inline(always)]
    pub fn position(&self, element_id: usize) -> RowRef<f64> {
        self.positions.row(element_id)
    }

    /// The unit normal of one element.
    #[inline(always)]
    pub fn normal(&self, element_id: usize) -> RowRef<f64> {
        self.normals.row(element_id)
    }
}

/// Aggregate summary of a cluster: one mass, centroid and normal standing in
/// for all elements beneath a node. `element_id` is populated for leaves.
#[derive(Debug, Clone)]
pub struct MassNormalPoint {
    pub mass: f64,
    pub position: Row<f64>,
    pub normal: Row<f64>,
    pub element_id: Option<usize>,
}

/// Structural role of a node within the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BvhNodeKind {
    /// A node with no elements; only ever produced by an empty input set.
    Empty,

    /// A single element.
    Leaf { element_id: usize },

    /// An internal split; children are arena indices.
    Interior {
        children: [usize; 2],
        split_axis: usize,
        split_point: f64,
    },
}

/// One node of the mesh BVH, stored in the tree's flat arena.
///
/// The arena index doubles as the node id and equals the node's pre-order
/// rank, since construction pushes each node before recursing into its
/// children. Aggregates are the mass-weighted combination of the node's two
/// children and are re-derivable from the leaves alone.
#[derive(Debug, Clone)]
pub struct BvhNode {
    pub kind: BvhNodeKind,
    pub total_mass: f64,
    pub center_of_mass: Row<f64>,
    pub average_normal: Row<f64>,
    pub min_coords: Row<f64>,
    pub max_coords: Row<f64>,
    pub subtree_size: usize,
    first_element: usize,
    num_elements: usize,
}

impl BvhNode {
    /// Number of elements beneath this node.
    #[inline(always)]
    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    /// Ratio of the node's bounding-box diagonal to a distance; the
    /// Barnes-Hut style accuracy measure used by admissibility tests.
    #[inline(always)]
    pub fn node_ratio(&self, distance: f64) -> f64 {
        utils::get_distance(self.min_coords.as_ref(), self.max_coords.as_ref()) / distance
    }

    /// Whether a point lies inside the node's axis-aligned bounding box
    /// (boundary inclusive).
    pub fn box_contains(&self, point: RowRef<f64>) -> bool {
        for c in 0..3 {
            if point[c] < self.min_coords[c] || point[c] > self.max_coords[c] {
                return false;
            }
        }
        true
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, BvhNodeKind::Leaf { .. })
    }
}

/// Working copy of one element during construction; reordered in place so
/// every node's cluster becomes a contiguous slice.
#[derive(Debug, Clone)]
struct BuildPoint {
    mass: f64,
    position: Row<f64>,
    normal: Row<f64>,
    element_id: usize,
}

impl BuildPoint {
    /// The splitting coordinate for a cycle axis: 0..3 index the position,
    /// 3..6 the normal.
    #[inline(always)]
    fn coord(&self, axis: usize) -> f64 {
        match axis {
            0..=2 => self.position[axis],
            3..=5 => self.normal[axis - 3],
            _ => unreachable!("axis out of splitting cycle: {}", axis),
        }
    }
}

/// A bounding volume hierarchy over mesh elements, splitting on position and
/// (optionally) normal coordinates.
///
/// Nodes live in a flat pre-order arena, so `node_id` assignment is implicit
/// and deterministic: two builds from identical input produce identical
/// trees. The tree owns a copy of the element data it was built from; when
/// the geometry moves without changing which element belongs to which leaf,
/// [`MeshBvh::update_geometry`] refreshes all aggregates bottom-up without
/// re-splitting.
#[derive(Debug, Clone)]
pub struct MeshBvh {
    nodes: Vec<BvhNode>,
    element_order: Vec<usize>,
    elements: SurfaceElements,
    threshold_theta: f64,
    split_axes: SplitAxes,
}

impl MeshBvh {
    /// Builds a BVH over the given elements.
    ///
    /// # Arguments
    /// * `elements`: Per-element masses, barycenters and unit normals.
    /// * `params`: Optional construction parameters; defaults are used when `None`.
    pub fn new(elements: SurfaceElements, params: Option<BvhParams>) -> Self {
        let bvh_params = params.unwrap_or_default();
        let num_elements = elements.len();

        let mut points: Vec<BuildPoint> = (0..num_elements)
            .map(|i| BuildPoint {
                mass: elements.mass(i),
                position: elements.position(i).to_owned(),
                normal: elements.normal(i).to_owned(),
                element_id: i,
            })
            .collect();

        let mut tree = Self {
            nodes: Vec::with_capacity(2 * num_elements.max(1)),
            element_order: Vec::new(),
            elements,
            threshold_theta: bvh_params.threshold_theta,
            split_axes: bvh_params.split_axes,
        };

        tree.build_node(&mut points, 0, 0);
        tree.element_order = points.iter().map(|p| p.element_id).collect();

        tree
    }

    /// Recursively builds the subtree for a slice of points and returns the
    /// arena index of its root. `offset` is the slice's start within the
    /// final element ordering.
    fn build_node(&mut self, points: &mut [BuildPoint], axis: usize, offset: usize) -> usize {
        let node_index = self.nodes.len();

        if points.is_empty() {
            self.nodes.push(BvhNode {
                kind: BvhNodeKind::Empty,
                total_mass: 0.0,
                center_of_mass: Row::zeros(3),
                average_normal: Row::zeros(3),
                min_coords: Row::zeros(3),
                max_coords: Row::zeros(3),
                subtree_size: 1,
                first_element: offset,
                num_elements: 0,
            });
            return node_index;
        }

        if points.len() == 1 {
            let point = &points[0];
            self.nodes.push(BvhNode {
                kind: BvhNodeKind::Leaf {
                    element_id: point.element_id,
                },
                total_mass: point.mass,
                center_of_mass: point.position.clone(),
                average_normal: point.normal.clone(),
                min_coords: point.position.clone(),
                max_coords: point.position.clone(),
                subtree_size: 1,
                first_element: offset,
                num_elements: 1,
            });
            return node_index;
        }

        let num_points = points.len();
        let split_point = Self::axis_splitting_plane(points, axis);

        let mut lesser: Vec<BuildPoint> = Vec::with_capacity(num_points / 2 + 1);
        let mut greater: Vec<BuildPoint> = Vec::with_capacity(num_points / 2 + 1);

        for point in points.iter() {
            if point.coord(axis) <= split_point {
                lesser.push(point.clone());
            } else {
                greater.push(point.clone());
            }
        }

        // All points share the splitting coordinate; split evenly by
        // cardinality instead so the recursion terminates.
        if lesser.is_empty() || greater.is_empty() {
            lesser.clear();
            greater.clear();
            let half = num_points / 2;
            lesser.extend(points[..half].iter().cloned());
            greater.extend(points[half..].iter().cloned());
        }

        let num_lesser = lesser.len();
        for (slot, point) in points
            .iter_mut()
            .zip(lesser.into_iter().chain(greater.into_iter()))
        {
            *slot = point;
        }

        // Push a placeholder so children land after this node in pre-order,
        // then fill in the aggregates once both subtrees exist.
        self.nodes.push(BvhNode {
            kind: BvhNodeKind::Interior {
                children: [0, 0],
                split_axis: axis,
                split_point,
            },
            total_mass: 0.0,
            center_of_mass: Row::zeros(3),
            average_normal: Row::zeros(3),
            min_coords: Row::zeros(3),
            max_coords: Row::zeros(3),
            subtree_size: 1,
            first_element: offset,
            num_elements: num_points,
        });

        let next_axis = self.split_axes.next_axis(axis);
        let lesser_index = self.build_node(&mut points[..num_lesser], next_axis, offset);
        let greater_index =
            self.build_node(&mut points[num_lesser..], next_axis, offset + num_lesser);

        let (total_mass, center_of_mass, average_normal, min_coords, max_coords) =
            self.aggregated_from_children(lesser_index, greater_index);
        let subtree_size =
            1 + self.nodes[lesser_index].subtree_size + self.nodes[greater_index].subtree_size;

        let node = &mut self.nodes[node_index];
        node.kind = BvhNodeKind::Interior {
            children: [lesser_index, greater_index],
            split_axis: axis,
            split_point,
        };
        node.total_mass = total_mass;
        node.center_of_mass = center_of_mass;
        node.average_normal = average_normal;
        node.min_coords = min_coords;
        node.max_coords = max_coords;
        node.subtree_size = subtree_size;

        node_index
    }

    /// Chooses the splitting plane along `axis` by sorting the selected
    /// coordinate and picking the split index that minimizes the sum of
    /// squared coordinate spans of the two sides. This balances bounding-box
    /// tightness rather than cardinality.
    fn axis_splitting_plane(points: &[BuildPoint], axis: usize) -> f64 {
        let mut coords: Vec<f64> = points.iter().map(|p| p.coord(axis)).collect();
        coords.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let num_points = coords.len();
        let mut split_index = 0;
        let mut min_widths = f64::INFINITY;

        for i in 0..num_points - 1 {
            let width1 = coords[i] - coords[0];
            let width2 = coords[num_points - 1] - coords[i + 1];

            let sum_squares = width1 * width1 + width2 * width2;
            if sum_squares < min_widths {
                min_widths = sum_squares;
                split_index = i;
            }
        }

        (coords[split_index] + coords[split_index + 1]) / 2.0
    }

    /// Mass-weighted aggregates of two sibling nodes.
    fn aggregated_from_children(
        &self,
        lesser: usize,
        greater: usize,
    ) -> (f64, Row<f64>, Row<f64>, Row<f64>, Row<f64>) {
        let mut total_mass = 0.0;
        let mut center_of_mass = Row::<f64>::zeros(3);
        let mut average_normal = Row::<f64>::zeros(3);
        let mut min_coords = self.nodes[lesser].min_coords.clone();
        let mut max_coords = self.nodes[lesser].max_coords.clone();

        for &child_index in &[lesser, greater] {
            let child = &self.nodes[child_index];
            total_mass += child.total_mass;
            for c in 0..3 {
                center_of_mass[c] += child.total_mass * child.center_of_mass[c];
                average_normal[c] += child.total_mass * child.average_normal[c];
            }
            min_coords = utils::row_min(min_coords.as_ref(), child.min_coords.as_ref());
            max_coords = utils::row_max(max_coords.as_ref(), child.max_coords.as_ref());
        }

        if total_mass > 0.0 {
            for c in 0..3 {
                center_of_mass[c] /= total_mass;
            }
        }
        let average_normal = utils::unit_normalized(average_normal.as_ref());

        (
            total_mass,
            center_of_mass,
            average_normal,
            min_coords,
            max_coords,
        )
    }

    /// Replaces the element geometry and recomputes every node's aggregates
    /// bottom-up, without re-splitting.
    ///
    /// This is the cheap alternative to a full rebuild when positions move
    /// but the leaf assignment is still acceptable; when the partition is
    /// unchanged it produces exactly the aggregates a from-scratch build
    /// would. The caller owns the decision of when drift warrants a rebuild.
    ///
    /// # Panics
    /// Panics if the element count differs from the tree's.
    pub fn update_geometry(&mut self, elements: SurfaceElements) {
        assert_eq!(
            elements.len(),
            self.elements.len(),
            "Geometry updates must keep the element count; rebuild instead."
        );
        self.elements = elements;

        // Children follow their parent in the pre-order arena, so a reverse
        // sweep visits both children before every interior node.
        for index in (0..self.nodes.len()).rev() {
            let kind = self.nodes[index].kind;
            match kind {
                BvhNodeKind::Empty => {}
                BvhNodeKind::Leaf { element_id } => {
                    let mass = self.elements.mass(element_id);
                    let position = self.elements.position(element_id).to_owned();
                    let normal = self.elements.normal(element_id).to_owned();

                    let node = &mut self.nodes[index];
                    node.total_mass = mass;
                    node.center_of_mass = position.clone();
                    node.min_coords = position.clone();
                    node.max_coords = position;
                    node.average_normal = normal;
                }
                BvhNodeKind::Interior { children, .. } => {
                    let (total_mass, center_of_mass, average_normal, min_coords, max_coords) =
                        self.aggregated_from_children(children[0], children[1]);

                    let node = &mut self.nodes[index];
                    node.total_mass = total_mass;
                    node.center_of_mass = center_of_mass;
                    node.average_normal = average_normal;
                    node.min_coords = min_coords;
                    node.max_coords = max_coords;
                }
            }
        }
    }

    /// Single-point admissibility: whether this node may stand in as an
    /// aggregate when evaluated from `point`, per the tree-wide separation
    /// threshold.
    pub fn is_admissible_from(&self, node_id: usize, point: RowRef<f64>) -> bool {
        let node = &self.nodes[node_id];
        match node.kind {
            BvhNodeKind::Empty => true,
            BvhNodeKind::Leaf { .. } => {
                utils::get_distance(node.center_of_mass.as_ref(), point) > 0.0
            }
            BvhNodeKind::Interior { .. } => {
                let distance = utils::get_distance(node.center_of_mass.as_ref(), point);
                node.node_ratio(distance) < self.threshold_theta
            }
        }
    }

    /// The aggregate mass/centroid/normal summary of a node.
    pub fn aggregate_point(&self, node_id: usize) -> MassNormalPoint {
        let node = &self.nodes[node_id];
        MassNormalPoint {
            mass: node.total_mass,
            position: node.center_of_mass.clone(),
            normal: node.average_normal.clone(),
            element_id: match node.kind {
                BvhNodeKind::Leaf { element_id } => Some(element_id),
                _ => None,
            },
        }
    }

    /// The element ids contained in a node's cluster.
    pub fn cluster_elements(&self, node_id: usize) -> &[usize] {
        let node = &self.nodes[node_id];
        &self.element_order[node.first_element..node.first_element + node.num_elements]
    }

    /// The arena index of the root node.
    pub fn root_id(&self) -> usize {
        0
    }

    /// All nodes in pre-order; the slice index is the node id.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// One node by id.
    pub fn node(&self, node_id: usize) -> &BvhNode {
        &self.nodes[node_id]
    }

    /// The element data the tree currently aggregates.
    pub fn elements(&self) -> &SurfaceElements {
        &self.elements
    }

    /// Number of nodes in the tree.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaf nodes.
    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Number of elements the tree was built over.
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Number of levels, counting the root.
    pub fn depth(&self) -> usize {
        fn depth_of(nodes: &[BvhNode], index: usize) -> usize {
            match nodes[index].kind {
                BvhNodeKind::Interior { children, .. } => {
                    1 + depth_of(nodes, children[0]).max(depth_of(nodes, children[1]))
                }
                _ => 1,
            }
        }
        depth_of(&self.nodes, 0)
    }

    /// The separation threshold shared by the whole tree.
    pub fn threshold_theta(&self) -> f64 {
        self.threshold_theta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SplitAxes;
    use faer::mat;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_elements(n: usize, seed: u64) -> SurfaceElements {
        let mut rng = StdRng::seed_from_u64(seed);
        let positions = Mat::from_fn(n, 3, |_, _| rng.random_range(0.0..1.0));

        let mut normals = Mat::from_fn(n, 3, |_, _| rng.random_range(-1.0..1.0));
        for i in 0..n {
            let norm = (0..3)
                .map(|c| normals[(i, c)] * normals[(i, c)])
                .sum::<f64>()
                .sqrt()
                .max(1e-6);
            for c in 0..3 {
                normals[(i, c)] /= norm;
            }
        }

        let masses = Col::from_fn(n, |_| rng.random_range(0.5..1.5));
        SurfaceElements::new(masses, positions, normals)
    }

    fn assert_aggregates_consistent(bvh: &MeshBvh) {
        for node_id in 0..bvh.num_nodes() {
            let node = bvh.node(node_id);
            if node.num_elements() == 0 {
                continue;
            }

            let ids = bvh.cluster_elements(node_id);
            assert_eq!(ids.len(), node.num_elements());

            let mass_sum: f64 = ids.iter().map(|&i| bvh.elements().mass(i)).sum();
            assert!(
                (mass_sum - node.total_mass).abs() <= 1e-9 * mass_sum.max(1.0),
                "node {} mass {} != leaf sum {}",
                node_id,
                node.total_mass,
                mass_sum
            );

            for c in 0..3 {
                let weighted: f64 = ids
                    .iter()
                    .map(|&i| bvh.elements().mass(i) * bvh.elements().position(i)[c])
                    .sum();
                let expected = weighted / mass_sum;
                assert!(
                    (expected - node.center_of_mass[c]).abs() <= 1e-9,
                    "node {} centroid component {} mismatch",
                    node_id,
                    c
                );
            }

            for &i in ids {
                let p = bvh.elements().position(i);
                for c in 0..3 {
                    assert!(p[c] >= node.min_coords[c] - 1e-12);
                    assert!(p[c] <= node.max_coords[c] + 1e-12);
                }
            }
        }
    }

    #[test]
    fn aggregates_are_mass_weighted_leaf_averages() {
        let bvh = MeshBvh::new(random_elements(64, 7), None);
        assert_eq!(bvh.num_elements(), 64);
        assert_eq!(bvh.num_leaves(), 64);
        assert_aggregates_consistent(&bvh);

        let root_aggregate = bvh.aggregate_point(bvh.root_id());
        assert!(root_aggregate.element_id.is_none());
        assert!((root_aggregate.mass - bvh.node(0).total_mass).abs() <= 1e-12);

        let leaf_id = (0..bvh.num_nodes())
            .find(|&i| bvh.node(i).is_leaf())
            .unwrap();
        assert_eq!(
            bvh.aggregate_point(leaf_id).element_id,
            Some(bvh.cluster_elements(leaf_id)[0])
        );
    }

    #[test]
    fn positional_split_regime_builds_consistent_trees() {
        let params = BvhParams {
            split_axes: SplitAxes::Positional,
            ..BvhParams::default()
        };
        let bvh = MeshBvh::new(random_elements(40, 11), Some(params));
        assert_eq!(bvh.num_leaves(), 40);
        assert_aggregates_consistent(&bvh);
    }

    #[test]
    fn node_ids_are_preorder_ranks() {
        let bvh = MeshBvh::new(random_elements(33, 3), None);

        fn walk(bvh: &MeshBvh, index: usize) {
            if let BvhNodeKind::Interior { children, .. } = bvh.node(index).kind {
                assert_eq!(children[0], index + 1);
                assert_eq!(
                    children[1],
                    index + 1 + bvh.node(children[0]).subtree_size
                );
                walk(bvh, children[0]);
                walk(bvh, children[1]);
            }
        }
        walk(&bvh, bvh.root_id());

        assert_eq!(bvh.node(bvh.root_id()).subtree_size, bvh.num_nodes());
    }

    #[test]
    fn rebuild_from_identical_input_is_identical() {
        let a = MeshBvh::new(random_elements(50, 21), None);
        let b = MeshBvh::new(random_elements(50, 21), None);

        assert_eq!(a.num_nodes(), b.num_nodes());
        for i in 0..a.num_nodes() {
            let (na, nb) = (a.node(i), b.node(i));
            assert_eq!(na.kind, nb.kind);
            assert_eq!(na.subtree_size, nb.subtree_size);
            assert_eq!(na.total_mass.to_bits(), nb.total_mass.to_bits());
            for c in 0..3 {
                assert_eq!(
                    na.center_of_mass[c].to_bits(),
                    nb.center_of_mass[c].to_bits()
                );
            }
        }
        assert_eq!(a.cluster_elements(0), b.cluster_elements(0));
    }

    #[test]
    fn empty_input_builds_a_single_empty_node() {
        let elements = SurfaceElements::new(
            Col::zeros(0),
            Mat::zeros(0, 3),
            Mat::zeros(0, 3),
        );
        let bvh = MeshBvh::new(elements, None);
        assert_eq!(bvh.num_nodes(), 1);
        assert_eq!(bvh.node(0).kind, BvhNodeKind::Empty);
        assert_eq!(bvh.node(0).total_mass, 0.0);
    }

    #[test]
    fn single_element_builds_a_leaf_root() {
        let bvh = MeshBvh::new(random_elements(1, 5), None);
        assert_eq!(bvh.num_nodes(), 1);
        assert_eq!(bvh.node(0).kind, BvhNodeKind::Leaf { element_id: 0 });
        assert_eq!(bvh.cluster_elements(0), &[0]);
    }

    #[test]
    fn coincident_points_terminate_via_even_split() {
        let n = 16;
        let positions = Mat::from_fn(n, 3, |_, _| 0.5);
        let normals = Mat::from_fn(n, 3, |_, c| if c == 2 { 1.0 } else { 0.0 });
        let masses = Col::from_fn(n, |_| 1.0);

        let bvh = MeshBvh::new(SurfaceElements::new(masses, positions, normals), None);
        assert_eq!(bvh.num_leaves(), n);
        assert_eq!(bvh.num_nodes(), 2 * n - 1);
        // An even split halves the set each level.
        assert_eq!(bvh.depth(), 5);
    }

    #[test]
    fn update_geometry_after_translation_matches_fresh_build() {
        let elements = random_elements(48, 13);
        let mut moved_positions = Mat::zeros(48, 3);
        for i in 0..48 {
            for c in 0..3 {
                moved_positions[(i, c)] = elements.position(i)[c] + 10.0;
            }
        }
        let moved = SurfaceElements::new(
            elements.masses.clone(),
            moved_positions,
            elements.normals.clone(),
        );

        let mut updated = MeshBvh::new(elements, None);
        updated.update_geometry(moved.clone());

        // A pure translation keeps every split decision, so the refreshed
        // aggregates must agree with a build from the moved geometry.
        let rebuilt = MeshBvh::new(moved, None);
        assert_eq!(updated.num_nodes(), rebuilt.num_nodes());
        for i in 0..updated.num_nodes() {
            let (nu, nr) = (updated.node(i), rebuilt.node(i));
            assert!((nu.total_mass - nr.total_mass).abs() <= 1e-12);
            for c in 0..3 {
                assert!((nu.center_of_mass[c] - nr.center_of_mass[c]).abs() <= 1e-9);
                assert!((nu.min_coords[c] - nr.min_coords[c]).abs() <= 1e-9);
                assert!((nu.max_coords[c] - nr.max_coords[c]).abs() <= 1e-9);
            }
        }
        assert_aggregates_consistent(&updated);
    }

    #[test]
    fn box_containment_and_ratio_behave_on_a_known_box() {
        let bvh = MeshBvh::new(random_elements(32, 17), None);
        let root = bvh.node(bvh.root_id());

        assert!(root.box_contains(root.center_of_mass.as_ref()));
        let outside = mat![[100.0, 100.0, 100.0]];
        assert!(!root.box_contains(outside.row(0)));

        let diag = utils::get_distance(root.min_coords.as_ref(), root.max_coords.as_ref());
        assert!((root.node_ratio(2.0 * diag) - 0.5).abs() <= 1e-12);
    }

    #[test]
    fn far_points_are_admissible_near_points_are_not() {
        let bvh = MeshBvh::new(random_elements(32, 19), None);
        let root = bvh.root_id();

        let far = mat![[1000.0, 0.0, 0.0]];
        assert!(bvh.is_admissible_from(root, far.row(0)));
        let inside = bvh.node(root).center_of_mass.clone();
        assert!(!bvh.is_admissible_from(root, inside.as_ref()));
    }
}
