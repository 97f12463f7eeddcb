/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the block-cluster tree: admissibility splitting and the block multiply modes.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use faer::{Col, Mat, MatRef};
use rayon::prelude::*;

use crate::bvh::{BvhNodeKind, MeshBvh};
use crate::config::BctParams;
use crate::percolation::{self, PercolationScratch};
use crate::progress::{ProgressMsg, ProgressSink};
use crate::traits::KernelFunction;
use crate::utils;

/// Errors that can occur during block-cluster tree operations.
#[derive(Debug)]
pub enum BctError {
    /// A multiply was called with a vector whose row count does not match
    /// the number of elements the tree was built over.
    VectorLengthMismatch { expected: usize, actual: usize },
}

impl fmt::Display for BctError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BctError::VectorLengthMismatch { expected, actual } => write!(
                f,
                "block-cluster multiply failed: vector has {} rows but the tree indexes {} elements",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for BctError {}

/// A pair of BVH clusters, stored by node id.
///
/// Conceptually unordered, but the first/second roles are fixed because the
/// percolated multiply buckets pairs by `cluster1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterPair {
    pub cluster1: usize,
    pub cluster2: usize,
}

/// A block-cluster decomposition of the dense element-pair interaction
/// operator, built over a [`MeshBvh`].
///
/// Construction co-traverses the spatial tree against itself breadth-first
/// and sorts every cluster pair into one of two flat lists: admissible pairs
/// (far enough apart to approximate through cluster aggregates) and
/// inadmissible pairs (evaluated exactly). Every element pair `(i, j)` with
/// `i != j` is covered by exactly one pair in exactly one of the lists; only
/// pairs with an empty side are dropped.
///
/// The tree exposes three multiply modes over vectors indexed by element id:
/// exact products over the inadmissible list, single-shot aggregate products
/// over the admissible list, and the production [`multiply_fast`] path that
/// percolates the admissible contributions up and down the spatial tree in
/// `O(N log N)`.
///
/// The BVH is borrowed read-only for the tree's lifetime; it is the caller's
/// responsibility to rebuild both structures when the geometry drifts, since
/// the tree cannot detect staleness itself.
///
/// [`multiply_fast`]: BlockClusterTree::multiply_fast
#[derive(Debug)]
pub struct BlockClusterTree<'a, K: KernelFunction> {
    bvh: &'a MeshBvh,
    kernel: K,
    separation_coeff: f64,
    exact_block_cutoff: usize,
    admissible_pairs: Vec<ClusterPair>,
    inadmissible_pairs: Vec<ClusterPair>,
    admissible_by_cluster: Vec<Vec<ClusterPair>>,
    af_ones: Col<f64>,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl<'a, K: KernelFunction + Send + Sync> BlockClusterTree<'a, K> {
    /// Builds the block-cluster decomposition for a spatial tree and kernel.
    ///
    /// # Arguments
    /// * `bvh`: The spatial tree over the mesh elements.
    /// * `kernel`: Pairwise kernel callable; its parameters (exponent,
    ///   smoothing) are opaque to this tree.
    /// * `separation_coeff`: Barnes-Hut style admissibility threshold; a
    ///   pair is admissible when both clusters' diagonal-to-distance ratios
    ///   fall below it.
    /// * `params`: Optional classification parameters; defaults when `None`.
    /// * `progress`: Optional sink receiving timed construction events.
    pub fn new(
        bvh: &'a MeshBvh,
        kernel: K,
        separation_coeff: f64,
        params: Option<BctParams>,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> Self {
        let bct_params = params.unwrap_or_default();

        let mut tree = Self {
            bvh,
            kernel,
            separation_coeff,
            exact_block_cutoff: bct_params.exact_block_cutoff,
            admissible_pairs: Vec::new(),
            inadmissible_pairs: Vec::new(),
            admissible_by_cluster: Vec::new(),
            af_ones: Col::zeros(bvh.num_elements()),
            progress,
        };

        let start = Instant::now();
        tree.classify_pairs();
        tree.organize_pairs_by_first();
        tree.premultiply_af_ones();

        if let Some(sink) = &tree.progress {
            sink.emit(ProgressMsg::PairsClassified {
                admissible: tree.admissible_pairs.len(),
                inadmissible: tree.inadmissible_pairs.len(),
                elapsed_ms: start.elapsed().as_millis(),
            });
        }

        tree
    }

    /// Breadth-first co-traversal of the spatial tree against itself,
    /// resolving every cluster pair into the admissible or inadmissible
    /// list, or subdividing it into the cross product of child pairs.
    fn classify_pairs(&mut self) {
        let bvh = self.bvh;
        let root = bvh.root_id();
        let mut unresolved = vec![ClusterPair {
            cluster1: root,
            cluster2: root,
        }];

        while !unresolved.is_empty() {
            let mut next_pairs = Vec::new();

            for pair in unresolved {
                let cluster1 = bvh.node(pair.cluster1);
                let cluster2 = bvh.node(pair.cluster2);

                if cluster1.num_elements() == 0 || cluster2.num_elements() == 0 {
                    // Pairs with an empty side contribute nothing.
                    continue;
                } else if cluster1.num_elements() == 1 && cluster2.num_elements() == 1 {
                    // Two singletons are always multiplied exactly;
                    // aggregation is meaningless for size-1 clusters.
                    self.inadmissible_pairs.push(pair);
                } else if self.is_pair_admissible(&pair) {
                    self.admissible_pairs.push(pair);
                } else if self.is_pair_small_enough(&pair) {
                    self.inadmissible_pairs.push(pair);
                } else {
                    // A cluster holding more than one element is interior,
                    // so both sides have children to cross.
                    let children1 = match cluster1.kind {
                        BvhNodeKind::Interior { children, .. } => children,
                        _ => unreachable!("multi-element cluster must be interior"),
                    };
                    let children2 = match cluster2.kind {
                        BvhNodeKind::Interior { children, .. } => children,
                        _ => unreachable!("multi-element cluster must be interior"),
                    };

                    for &child1 in &children1 {
                        for &child2 in &children2 {
                            next_pairs.push(ClusterPair {
                                cluster1: child1,
                                cluster2: child2,
                            });
                        }
                    }
                }
            }

            unresolved = next_pairs;
        }
    }

    /// Whether exact evaluation of the pair is cheap enough to stop
    /// subdividing.
    fn is_pair_small_enough(&self, pair: &ClusterPair) -> bool {
        let s1 = self.bvh.node(pair.cluster1).num_elements();
        let s2 = self.bvh.node(pair.cluster2).num_elements();
        (s1 <= 1) || (s2 <= 1) || (s1 + s2 <= self.exact_block_cutoff)
    }

    /// Double-sided Barnes-Hut admissibility test.
    fn is_pair_admissible(&self, pair: &ClusterPair) -> bool {
        // A cluster is never admissible with itself.
        if pair.cluster1 == pair.cluster2 {
            return false;
        }

        let cluster1 = self.bvh.node(pair.cluster1);
        let cluster2 = self.bvh.node(pair.cluster2);

        // A cluster is never admissible with a cluster whose centroid lies
        // inside its bounding box.
        if cluster1.box_contains(cluster2.center_of_mass.as_ref())
            || cluster2.box_contains(cluster1.center_of_mass.as_ref())
        {
            return false;
        }

        let distance = utils::get_distance(
            cluster1.center_of_mass.as_ref(),
            cluster2.center_of_mass.as_ref(),
        );

        // Both ratios must pass; a single-sided check would let a large
        // cluster hide behind a small partner.
        let ratio1 = cluster1.node_ratio(distance);
        let ratio2 = cluster2.node_ratio(distance);

        ratio1.max(ratio2) < self.separation_coeff
    }

    /// Buckets admissible pairs by their first cluster's node id.
    fn organize_pairs_by_first(&mut self) {
        self.admissible_by_cluster = vec![Vec::new(); self.bvh.num_nodes()];
        for pair in &self.admissible_pairs {
            self.admissible_by_cluster[pair.cluster1].push(*pair);
        }
    }

    /// Percolates the all-ones vector once so the admissible row sums are
    /// available to every later fast multiply.
    fn premultiply_af_ones(&mut self) {
        let num_elements = self.bvh.num_elements();
        let ones = Mat::from_fn(num_elements, 1, |_, _| 1.0);
        let raw = self.multiply_af_percolated(&ones.as_ref());
        self.af_ones = Col::from_fn(num_elements, |i| raw[(i, 0)]);
    }

    /// Applies the raw admissible block operator through the percolation
    /// sweeps: upward aggregation, bucketed centroid terms, downward
    /// distribution. Returns `diag(mass) * Af * v` without the symmetric
    /// diagonal-subtracted form.
    fn multiply_af_percolated(&self, v: &MatRef<f64>) -> Mat<f64> {
        let mut scratch = PercolationScratch::new(self.bvh.num_nodes(), v.ncols());

        percolation::percolate_upward(self.bvh, v, &mut scratch);
        percolation::accumulate_admissible(
            self.bvh,
            &self.kernel,
            &self.admissible_by_cluster,
            &mut scratch,
        );

        let mut result = Mat::zeros(self.bvh.num_elements(), v.ncols());
        percolation::percolate_downward(self.bvh, &mut scratch, &mut result);
        result
    }

    /// Exact block product over the inadmissible pair list.
    ///
    /// # Arguments
    /// * `v`: Matrix of shape (N, K) with one row per element and one column
    ///   per right-hand side.
    ///
    /// # Returns
    /// * The accumulated inadmissible contribution, shape (N, K).
    pub fn multiply_exact(&self, v: &MatRef<f64>) -> Result<Mat<f64>, BctError> {
        self.check_vector(v)?;
        Ok(self.pairwise_exact_product(&self.inadmissible_pairs, v))
    }

    /// Exact block product over the *admissible* pair list. This is a
    /// diagnostic path: comparing it against [`BlockClusterTree::multiply_approx`]
    /// measures the aggregation error in isolation.
    pub fn multiply_admissible_exact(&self, v: &MatRef<f64>) -> Result<Mat<f64>, BctError> {
        self.check_vector(v)?;
        Ok(self.pairwise_exact_product(&self.admissible_pairs, v))
    }

    /// Single-shot aggregate product over the admissible pair list: one
    /// kernel evaluation per pair, distributed to every element of the first
    /// cluster.
    pub fn multiply_approx(&self, v: &MatRef<f64>) -> Result<Mat<f64>, BctError> {
        self.check_vector(v)?;

        let num_elements = self.bvh.num_elements();
        let nrhs = v.ncols();

        let result = self
            .admissible_pairs
            .par_iter()
            .fold(
                || Mat::<f64>::zeros(num_elements, nrhs),
                |mut local, pair| {
                    self.af_approx_product(pair, v, &mut local);
                    local
                },
            )
            .reduce(
                || Mat::<f64>::zeros(num_elements, nrhs),
                |mut merged, local| {
                    merged += local;
                    merged
                },
            );

        Ok(result)
    }

    /// The production multiply: exact near field plus percolated far field,
    /// in `O(N log N)`.
    ///
    /// Equals `multiply_exact(v) + multiply_approx(v)` up to floating-point
    /// summation order; the far field is applied through a fresh percolation
    /// scratch rather than per-pair loops.
    ///
    /// # Arguments
    /// * `v`: Matrix of shape (N, K) with one row per element and one column
    ///   per right-hand side.
    ///
    /// # Returns
    /// * The full block-structured operator applied to `v`, shape (N, K).
    pub fn multiply_fast(&self, v: &MatRef<f64>) -> Result<Mat<f64>, BctError> {
        self.check_vector(v)?;

        let near_start = Instant::now();
        let mut result = self.pairwise_exact_product(&self.inadmissible_pairs, v);
        let near_field_ms = near_start.elapsed().as_millis();

        let far_start = Instant::now();
        let percolated = self.multiply_af_percolated(v);
        for i in 0..self.bvh.num_elements() {
            for k in 0..v.ncols() {
                result[(i, k)] += 2.0 * (self.af_ones[i] * *v.get(i, k) - percolated[(i, k)]);
            }
        }
        let far_field_ms = far_start.elapsed().as_millis();

        if let Some(sink) = &self.progress {
            sink.emit(ProgressMsg::FastMultiply {
                near_field_ms,
                far_field_ms,
            });
        }

        Ok(result)
    }

    /// Runs the exact row-by-row product for a list of pairs, with each
    /// rayon worker accumulating into a private buffer merged once at the
    /// end.
    fn pairwise_exact_product(&self, pairs: &[ClusterPair], v: &MatRef<f64>) -> Mat<f64> {
        let num_elements = self.bvh.num_elements();
        let nrhs = v.ncols();

        pairs
            .par_iter()
            .fold(
                || Mat::<f64>::zeros(num_elements, nrhs),
                |mut local, pair| {
                    self.af_full_product(pair, v, &mut local);
                    local
                },
            )
            .reduce(
                || Mat::<f64>::zeros(num_elements, nrhs),
                |mut merged, local| {
                    merged += local;
                    merged
                },
            )
    }

    /// Exact product of one block: for every element of the first cluster,
    /// accumulates the kernel row sum and row dot over the second cluster
    /// (skipping the self pair) and adds the symmetric diagonal-subtracted
    /// row contribution `2 * mass_i * (row_sum * v_i - row_dot)`.
    fn af_full_product(&self, pair: &ClusterPair, v: &MatRef<f64>, result: &mut Mat<f64>) {
        let elements = self.bvh.elements();
        let nrhs = v.ncols();

        let cluster1 = self.bvh.cluster_elements(pair.cluster1);
        let cluster2 = self.bvh.cluster_elements(pair.cluster2);

        let mut row_dots = vec![0.0; nrhs];

        for &i in cluster1 {
            let mid1 = elements.position(i);
            let mut row_sum = 0.0;
            row_dots.fill(0.0);

            for &j in cluster2 {
                // The diagonal of the operator is implicitly zero; the skip
                // also keeps the kernel away from zero distances.
                if i == j {
                    continue;
                }

                let af_ij = elements.mass(j) * self.kernel.evaluate(mid1, elements.position(j));
                row_sum += af_ij;
                for k in 0..nrhs {
                    row_dots[k] += af_ij * *v.get(j, k);
                }
            }

            let mass1 = elements.mass(i);
            for k in 0..nrhs {
                result[(i, k)] += 2.0 * mass1 * (row_sum * *v.get(i, k) - row_dots[k]);
            }
        }
    }

    /// Aggregate product of one admissible block: a single centroid kernel
    /// term stands in for the whole block, at cost
    /// `O(|cluster1| + |cluster2|)`.
    fn af_approx_product(&self, pair: &ClusterPair, v: &MatRef<f64>, result: &mut Mat<f64>) {
        let elements = self.bvh.elements();
        let nrhs = v.ncols();

        let node1 = self.bvh.node(pair.cluster1);
        let node2 = self.bvh.node(pair.cluster2);

        let a_ij = self.kernel.evaluate(
            node1.center_of_mass.as_ref(),
            node2.center_of_mass.as_ref(),
        );

        // a(I,J) * w(J)^T * 1(J)
        let a_wf_one = a_ij * node2.total_mass;

        // a(I,J) * w(J)^T * v(J)
        let mut a_wf_v = vec![0.0; nrhs];
        for &j in self.bvh.cluster_elements(pair.cluster2) {
            let mass2 = elements.mass(j);
            for k in 0..nrhs {
                a_wf_v[k] += mass2 * *v.get(j, k);
            }
        }
        for value in a_wf_v.iter_mut() {
            *value *= a_ij;
        }

        for &i in self.bvh.cluster_elements(pair.cluster1) {
            let mass1 = elements.mass(i);
            for k in 0..nrhs {
                result[(i, k)] += 2.0 * mass1 * (a_wf_one * *v.get(i, k) - a_wf_v[k]);
            }
        }
    }

    fn check_vector(&self, v: &MatRef<f64>) -> Result<(), BctError> {
        match v.nrows() == self.bvh.num_elements() {
            true => Ok(()),
            false => Err(BctError::VectorLengthMismatch {
                expected: self.bvh.num_elements(),
                actual: v.nrows(),
            }),
        }
    }

    /// Number of admissible pairs.
    pub fn admissible_count(&self) -> usize {
        self.admissible_pairs.len()
    }

    /// Number of inadmissible pairs.
    pub fn inadmissible_count(&self) -> usize {
        self.inadmissible_pairs.len()
    }

    /// The admissible pair list, for diagnostics.
    pub fn admissible_pairs(&self) -> &[ClusterPair] {
        &self.admissible_pairs
    }

    /// The inadmissible pair list, for diagnostics.
    pub fn inadmissible_pairs(&self) -> &[ClusterPair] {
        &self.inadmissible_pairs
    }

    /// The separation threshold the tree was classified with.
    pub fn separation_coeff(&self) -> f64 {
        self.separation_coeff
    }

    /// The spatial tree the decomposition was built over.
    pub fn bvh(&self) -> &MeshBvh {
        self.bvh
    }
}
