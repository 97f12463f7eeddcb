/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports kernels, sample surfaces, and diagnostics helpers for the ferreus_bct crate.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities for the [`ferreus_bct`] crate
//!
//! Concrete pairwise kernels, deterministic sample surfaces, and CSV helpers
//! for inspecting block-cluster decompositions.
//!
//! # Example: Tetrahedron Operator
//!
//! ```
//! use faer::Mat;
//! use ferreus_bct::{BlockClusterTree, MeshBvh};
//! use ferreus_mesh_utils::{FractionalMetricKernel, regular_tetrahedron};
//!
//! let elements = regular_tetrahedron();
//! let bvh = MeshBvh::new(elements, None);
//!
//! let kernel = FractionalMetricKernel::new(2.0, 0.0);
//! let bct = BlockClusterTree::new(&bvh, kernel, 0.5, None, None);
//!
//! // Four faces are never far enough apart to aggregate, so the whole
//! // operator is evaluated exactly.
//! assert_eq!(bct.admissible_count(), 0);
//!
//! let v = Mat::from_fn(4, 1, |i, _| i as f64);
//! let result = bct.multiply_fast(&v.as_ref()).unwrap();
//! assert_eq!(result.nrows(), 4);
//! ```

mod io;
mod kernels;
mod surfaces;

pub use {
    io::{cluster_pairs_to_csv, csv_to_cluster_pairs},
    kernels::{FractionalMetricKernel, InversePowerKernel, get_distance_sq},
    surfaces::{planar_grid, random_elements, regular_tetrahedron},
};
