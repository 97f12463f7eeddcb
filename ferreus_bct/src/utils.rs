/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides small geometric helpers shared by the BVH and block-cluster tree modules.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::{Row, RowRef};

/// Returns the Euclidean distance between two points.
#[inline(always)]
pub fn get_distance(target: RowRef<f64>, source: RowRef<f64>) -> f64 {
    get_distance_sq(target, source).sqrt()
}

/// Returns the squared Euclidean distance between two points.
#[inline(always)]
pub fn get_distance_sq(target: RowRef<f64>, source: RowRef<f64>) -> f64 {
    let mut dist = 0.0;
    for (t, s) in target.iter().zip(source.iter()) {
        let diff = t - s;
        dist += diff * diff;
    }
    dist
}

/// Componentwise minimum of two coordinate rows.
#[inline(always)]
pub fn row_min(a: RowRef<f64>, b: RowRef<f64>) -> Row<f64> {
    Row::from_fn(a.ncols(), |i| a[i].min(b[i]))
}

/// Componentwise maximum of two coordinate rows.
#[inline(always)]
pub fn row_max(a: RowRef<f64>, b: RowRef<f64>) -> Row<f64> {
    Row::from_fn(a.ncols(), |i| a[i].max(b[i]))
}

/// Returns a unit-length copy of the row, or the row unchanged if its norm
/// is too small to normalize safely.
#[inline(always)]
pub fn unit_normalized(row: RowRef<f64>) -> Row<f64> {
    let norm: f64 = row.iter().map(|c| c * c).sum::<f64>().sqrt();
    match norm > f64::EPSILON {
        true => Row::from_fn(row.ncols(), |i| row[i] / norm),
        false => row.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn distance_of_axis_aligned_points() {
        let a = mat![[0.0, 0.0, 0.0]];
        let b = mat![[3.0, 4.0, 0.0]];
        assert_eq!(get_distance(a.row(0), b.row(0)), 5.0);
        assert_eq!(get_distance_sq(a.row(0), b.row(0)), 25.0);
    }

    #[test]
    fn row_min_max_are_componentwise() {
        let a = mat![[1.0, 5.0, -2.0]];
        let b = mat![[3.0, 4.0, 0.0]];
        let lo = row_min(a.row(0), b.row(0));
        let hi = row_max(a.row(0), b.row(0));
        assert_eq!((lo[0], lo[1], lo[2]), (1.0, 4.0, -2.0));
        assert_eq!((hi[0], hi[1], hi[2]), (3.0, 5.0, 0.0));
    }

    #[test]
    fn unit_normalized_handles_zero_rows() {
        let v = mat![[0.0, 0.0, 2.0]];
        let n = unit_normalized(v.row(0));
        assert_eq!((n[0], n[1], n[2]), (0.0, 0.0, 1.0));

        let zero = mat![[0.0, 0.0, 0.0]];
        let z = unit_normalized(zero.row(0));
        assert_eq!((z[0], z[1], z[2]), (0.0, 0.0, 0.0));
    }
}
