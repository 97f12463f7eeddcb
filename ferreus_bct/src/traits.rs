/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the kernel evaluation trait used by the block-cluster tree for pairwise terms.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::RowRef;

/// Evaluates the pairwise interaction strength between two points in space.
///
/// Implementors define how the kernel distance term is computed given two
/// [`faer::RowRef<f64>`](https://docs.rs/faer/latest/faer/row/type.RowRef.html)
/// arguments holding 3D coordinates. The same callable is used for exact
/// element-to-element terms and for centroid-to-centroid aggregate terms, so
/// any kernel parameters (exponents, smoothing lengths) live on the
/// implementing type.
pub trait KernelFunction {
    fn evaluate(&self, target: RowRef<f64>, source: RowRef<f64>) -> f64;
}
