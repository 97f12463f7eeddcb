/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares configuration types for BVH construction and block-cluster classification.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares configuration types for BVH construction and block-cluster classification.

use serde::{Deserialize, Serialize};

/// Supported split-axis regimes for the mesh BVH.
///
/// Each element carries a position and a unit normal, so the splitting
/// coordinate can cycle over the three positional axes alone or over all six
/// position/normal axes. Splitting on normals as well groups elements that
/// are both close together and similarly oriented, which tightens the
/// aggregate normals used by downstream energy evaluations.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub enum SplitAxes {
    /// Cycle the splitting coordinate over x, y, z.
    Positional,

    /// Cycle the splitting coordinate over x, y, z, nx, ny, nz.
    PositionalAndNormal,
}

impl SplitAxes {
    /// Number of coordinates in the splitting cycle.
    pub(crate) fn axis_count(&self) -> usize {
        match self {
            SplitAxes::Positional => 3,
            SplitAxes::PositionalAndNormal => 6,
        }
    }

    /// The axis that follows `axis` in the splitting cycle.
    pub(crate) fn next_axis(&self, axis: usize) -> usize {
        (axis + 1) % self.axis_count()
    }
}

/// Parameters controlling construction of the mesh BVH.
///
/// ### Default Values
/// - `threshold_theta`: `0.25`
/// - `split_axes`: [`SplitAxes::PositionalAndNormal`]
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct BvhParams {
    /// Separation ratio used by single-point admissibility queries against
    /// the tree ([`crate::MeshBvh::is_admissible_from`]). A node is usable
    /// as an aggregate when its bounding-box diagonal over the distance to
    /// the query point falls below this threshold.
    pub threshold_theta: f64,

    /// Which coordinates the recursive splitting cycles through.
    pub split_axes: SplitAxes,
}

impl Default for BvhParams {
    fn default() -> Self {
        BvhParams {
            threshold_theta: 0.25,
            split_axes: SplitAxes::PositionalAndNormal,
        }
    }
}

/// Parameters controlling block-cluster pair classification.
///
/// ### Default Values
/// - `exact_block_cutoff`: `8`
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct BctParams {
    /// A pair whose combined element count does not exceed this cutoff is
    /// evaluated exactly rather than subdivided further. Exact evaluation of
    /// tiny blocks is both cheaper and more accurate than forcing more
    /// splits; the default of 8 is an empirical trade-off and may be tuned
    /// for unusual element distributions.
    pub exact_block_cutoff: usize,
}

impl Default for BctParams {
    fn default() -> Self {
        BctParams {
            exact_block_cutoff: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_cycles_wrap_for_both_regimes() {
        let positional = SplitAxes::Positional;
        assert_eq!(positional.next_axis(0), 1);
        assert_eq!(positional.next_axis(2), 0);

        let full = SplitAxes::PositionalAndNormal;
        assert_eq!(full.next_axis(2), 3);
        assert_eq!(full.next_axis(5), 0);
    }

    #[test]
    fn defaults_match_documented_values() {
        let bvh = BvhParams::default();
        assert_eq!(bvh.threshold_theta, 0.25);
        assert_eq!(bvh.split_axes, SplitAxes::PositionalAndNormal);

        let bct = BctParams::default();
        assert_eq!(bct.exact_block_cutoff, 8);
    }
}
