/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the upward/downward percolation sweeps behind the fast admissible multiply.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::{Mat, MatRef, Row};
use rayon::prelude::*;

use crate::block_cluster::ClusterPair;
use crate::bvh::{BvhNodeKind, MeshBvh};
use crate::traits::KernelFunction;

/// Per-multiply scratch state, one row per BVH node and one column per
/// right-hand side.
///
/// This shadows the spatial tree without touching it: `wt_dot` carries the
/// mass-weighted subtree sums collected on the way up, `b` the admissible
/// contributions distributed on the way down. A fresh instance is created
/// for every multiply call, so repeated or concurrent multiplies against the
/// same block-cluster tree never alias state.
#[derive(Debug)]
pub(crate) struct PercolationScratch {
    pub wt_dot: Mat<f64>,
    pub b: Mat<f64>,
}

impl PercolationScratch {
    pub fn new(num_nodes: usize, nrhs: usize) -> Self {
        Self {
            wt_dot: Mat::zeros(num_nodes, nrhs),
            b: Mat::zeros(num_nodes, nrhs),
        }
    }
}

/// Upward pass: fills `wt_dot` so every node holds the mass-weighted sum of
/// `v` over its subtree.
///
/// Children follow their parent in the pre-order arena, so a reverse index
/// sweep is a post-order traversal: both children are final before their
/// parent is visited.
pub(crate) fn percolate_upward(bvh: &MeshBvh, v: &MatRef<f64>, scratch: &mut PercolationScratch) {
    let nrhs = v.ncols();

    for index in (0..bvh.num_nodes()).rev() {
        let node = bvh.node(index);
        match node.kind {
            BvhNodeKind::Empty => {}
            BvhNodeKind::Leaf { element_id } => {
                for k in 0..nrhs {
                    scratch.wt_dot[(index, k)] = node.total_mass * *v.get(element_id, k);
                }
            }
            BvhNodeKind::Interior { children, .. } => {
                for k in 0..nrhs {
                    let sum =
                        scratch.wt_dot[(children[0], k)] + scratch.wt_dot[(children[1], k)];
                    scratch.wt_dot[(index, k)] = sum;
                }
            }
        }
    }
}

/// Admissible phase: for every cluster `I`, accumulates
/// `b[I] += a_IJ * wt_dot[J]` over its admissible partners `J`.
///
/// Buckets are keyed by the first cluster's node id, so the outer loop
/// parallelizes cleanly: each cluster's contribution row is independent.
pub(crate) fn accumulate_admissible<K>(
    bvh: &MeshBvh,
    kernel: &K,
    buckets: &[Vec<ClusterPair>],
    scratch: &mut PercolationScratch,
) where
    K: KernelFunction + Sync,
{
    let nrhs = scratch.wt_dot.ncols();
    let wt_dot = &scratch.wt_dot;

    let contributions: Vec<Option<Row<f64>>> = buckets
        .par_iter()
        .map(|pairs| {
            if pairs.is_empty() {
                return None;
            }

            let mut row = Row::<f64>::zeros(nrhs);
            for pair in pairs {
                let a_ij = kernel.evaluate(
                    bvh.node(pair.cluster1).center_of_mass.as_ref(),
                    bvh.node(pair.cluster2).center_of_mass.as_ref(),
                );
                for k in 0..nrhs {
                    row[k] += a_ij * wt_dot[(pair.cluster2, k)];
                }
            }
            Some(row)
        })
        .collect();

    for (index, contribution) in contributions.iter().enumerate() {
        if let Some(row) = contribution {
            for k in 0..nrhs {
                scratch.b[(index, k)] += row[k];
            }
        }
    }
}

/// Downward pass: turns `b` into a running sum from the root down (every
/// ancestor's admissible contributions apply to all of its descendants) and
/// writes `mass * b` into `result` at each leaf.
pub(crate) fn percolate_downward(
    bvh: &MeshBvh,
    scratch: &mut PercolationScratch,
    result: &mut Mat<f64>,
) {
    let nrhs = scratch.b.ncols();
    let mut parent_b = vec![0.0; nrhs];

    for index in 0..bvh.num_nodes() {
        let node = bvh.node(index);
        match node.kind {
            BvhNodeKind::Empty => {}
            BvhNodeKind::Leaf { element_id } => {
                for k in 0..nrhs {
                    result[(element_id, k)] = node.total_mass * scratch.b[(index, k)];
                }
            }
            BvhNodeKind::Interior { children, .. } => {
                for k in 0..nrhs {
                    parent_b[k] = scratch.b[(index, k)];
                }
                for &child in &children {
                    for k in 0..nrhs {
                        scratch.b[(child, k)] += parent_b[k];
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::SurfaceElements;
    use faer::{Col, Mat};

    fn line_elements(n: usize) -> SurfaceElements {
        let positions = Mat::from_fn(n, 3, |i, c| if c == 0 { i as f64 } else { 0.0 });
        let normals = Mat::from_fn(n, 3, |_, c| if c == 2 { 1.0 } else { 0.0 });
        let masses = Col::from_fn(n, |i| 1.0 + i as f64);
        SurfaceElements::new(masses, positions, normals)
    }

    #[test]
    fn upward_pass_collects_mass_weighted_subtree_sums() {
        let bvh = MeshBvh::new(line_elements(8), None);
        let v = Mat::from_fn(8, 1, |_, _| 1.0);
        let mut scratch = PercolationScratch::new(bvh.num_nodes(), 1);

        percolate_upward(&bvh, &v.as_ref(), &mut scratch);

        for node_id in 0..bvh.num_nodes() {
            let expected: f64 = bvh
                .cluster_elements(node_id)
                .iter()
                .map(|&i| bvh.elements().mass(i))
                .sum();
            assert!((scratch.wt_dot[(node_id, 0)] - expected).abs() <= 1e-12);
        }
    }

    #[test]
    fn downward_pass_distributes_ancestor_contributions_to_leaves() {
        let bvh = MeshBvh::new(line_elements(4), None);
        let mut scratch = PercolationScratch::new(bvh.num_nodes(), 1);

        // Seed only the root; every leaf must then receive mass * seed.
        scratch.b[(bvh.root_id(), 0)] = 3.0;

        let mut result = Mat::zeros(4, 1);
        percolate_downward(&bvh, &mut scratch, &mut result);

        for i in 0..4 {
            assert!((result[(i, 0)] - 3.0 * bvh.elements().mass(i)).abs() <= 1e-12);
        }
    }
}
