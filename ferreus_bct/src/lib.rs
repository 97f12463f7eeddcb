/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API for the block-cluster tree (BCT) crate.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Block-Cluster Tree (BCT) operators for surface meshes
//!
//! This crate applies dense pairwise-interaction operators over the N
//! elements of a surface mesh without ever materializing the N x N matrix.
//!
//! Such operators appear in surface-energy optimization: every pair of mesh
//! faces interacts through a kernel that decays with distance, and both the
//! energy's metric and its Sobolev preconditioner need repeated
//! matrix-vector products against that dense operator. Direct evaluation is
//! **O(N²)** per product, which is impractical beyond a few thousand faces.
//!
//! The crate reduces this to near-linear time with two structures:
//!
//! - [`MeshBvh`] - a bounding volume hierarchy over element barycenters and
//!   normals (up to six splitting coordinates), aggregating mass, centroid,
//!   average normal and bounding box per cluster.
//! - [`BlockClusterTree`] - a co-traversal of the BVH against itself that
//!   splits the dense operator into *admissible* blocks, approximated by a
//!   single centroid-to-centroid kernel term, and *inadmissible* blocks,
//!   evaluated exactly. Its percolated fast multiply sweeps partial sums up
//!   and down the spatial tree to apply all admissible blocks in
//!   **O(N log N)**.
//!
//! The pairwise kernel is supplied by the caller through the
//! [`KernelFunction`] trait; ready-made kernels and sample surfaces live in
//! the companion `ferreus_mesh_utils` crate.
//!
//! # Example: Fast Operator Application
//!
//! ```
//! use faer::{Col, Mat, RowRef};
//! use rand::{Rng, SeedableRng};
//! use rand::rngs::StdRng;
//! use ferreus_bct::{BlockClusterTree, KernelFunction, MeshBvh, SurfaceElements};
//!
//! // An inverse-quintic kernel of the kind used by tangent-point energies.
//! pub struct InverseQuinticKernel;
//!
//! impl KernelFunction for InverseQuinticKernel {
//!     #[inline(always)]
//!     fn evaluate(&self, target: RowRef<f64>, source: RowRef<f64>) -> f64 {
//!         let mut dist = 0.0;
//!         for (t, s) in target.iter().zip(source.iter()) {
//!             let diff = t - s;
//!             dist += diff * diff;
//!         }
//!         dist.sqrt().powi(-5)
//!     }
//! }
//!
//! // One mass/barycenter/normal record per mesh element; the element id is
//! // the row index.
//! let num_elements = 64;
//! let mut rng = StdRng::seed_from_u64(42);
//! let positions = Mat::from_fn(num_elements, 3, |_, _| rng.random_range(0.0..1.0));
//! let normals = Mat::from_fn(num_elements, 3, |_, c| if c == 2 { 1.0 } else { 0.0 });
//! let masses = Col::from_fn(num_elements, |_| 1.0 / num_elements as f64);
//! let elements = SurfaceElements::new(masses, positions, normals);
//!
//! // Build the spatial tree once per geometry state, then the
//! // block-cluster decomposition on top of it.
//! let bvh = MeshBvh::new(elements, None);
//! let bct = BlockClusterTree::new(&bvh, InverseQuinticKernel, 0.5, None, None);
//!
//! // Apply the operator without forming the dense matrix. Results are
//! // indexed by element id; several right-hand sides may share one call.
//! let v = Mat::from_fn(num_elements, 1, |i, _| (i % 7) as f64);
//! let result = bct.multiply_fast(&v.as_ref()).unwrap();
//! assert_eq!(result.nrows(), num_elements);
//!
//! // The symmetric row-sum-minus-dot algebra annihilates constants.
//! let ones = Mat::from_fn(num_elements, 1, |_, _| 1.0);
//! let on_ones = bct.multiply_fast(&ones.as_ref()).unwrap();
//! assert!((0..num_elements).all(|i| on_ones[(i, 0)].abs() < 1e-8));
//! ```
//!
//! # References
//!
//! 1. Barnes, J., & Hut, P. (1986).
//!    *A hierarchical O(N log N) force-calculation algorithm.*
//!    *Nature*, **324**, 446-449.
//!
//! 2. Hackbusch, W. (1999).
//!    *A sparse matrix arithmetic based on H-matrices.*
//!    *Computing*, **62**, 89-108.
//!
//! 3. Yu, C., Schumacher, H., & Crane, K. (2021).
//!    *[Repulsive surfaces.](https://doi.org/10.1145/3478513.3480521)*
//!    *ACM Transactions on Graphics*, **40**(6).

pub mod config;
pub mod progress;

mod block_cluster;
mod bvh;
mod percolation;
mod traits;
mod utils;

#[doc(inline)]
pub use {
    block_cluster::{BctError, BlockClusterTree, ClusterPair},
    bvh::{BvhNode, BvhNodeKind, MassNormalPoint, MeshBvh, SurfaceElements},
    traits::KernelFunction,
};
