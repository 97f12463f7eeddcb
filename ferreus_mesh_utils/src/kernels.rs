/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the concrete pairwise kernels used with the block-cluster tree.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::RowRef;
use ferreus_bct::KernelFunction;

/// Fractional metric kernel with `phi(r) = (r^2 + eps^2)^-((2s + 1) / 2)`.
///
/// This is the distance term of the fractional Sobolev metric driving
/// tangent-point surface energies: at `smoothing = 0` it is the plain
/// `r^-(2s + 1)` power law, while a positive `smoothing` mollifies the
/// singularity for near-coincident barycenters. Both the exponent `s` and
/// the smoothing length are opaque to the block-cluster tree; they ride
/// along on this kernel value.
#[derive(Clone, Debug, Copy)]
pub struct FractionalMetricKernel {
    pub exponent: f64,
    pub smoothing: f64,
}

impl FractionalMetricKernel {
    #[inline(always)]
    pub fn new(exponent: f64, smoothing: f64) -> Self {
        Self {
            exponent,
            smoothing,
        }
    }

    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        self.eval_r2(r * r)
    }

    #[inline(always)]
    fn eval_r2(&self, r2: f64) -> f64 {
        let power = 2.0 * self.exponent + 1.0;
        (r2 + self.smoothing * self.smoothing).powf(-power / 2.0)
    }
}

impl KernelFunction for FractionalMetricKernel {
    #[inline(always)]
    fn evaluate(&self, target: RowRef<f64>, source: RowRef<f64>) -> f64 {
        let r2 = get_distance_sq(target, source);
        self.eval_r2(r2)
    }
}

/// Inverse power-law kernel with `phi(r) = r^-p`.
#[derive(Clone, Debug, Copy)]
pub struct InversePowerKernel {
    pub power: f64,
}

impl InversePowerKernel {
    #[inline(always)]
    pub fn new(power: f64) -> Self {
        Self { power }
    }

    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        r.powf(-self.power)
    }
}

impl KernelFunction for InversePowerKernel {
    #[inline(always)]
    fn evaluate(&self, target: RowRef<f64>, source: RowRef<f64>) -> f64 {
        let r = get_distance_sq(target, source).sqrt();
        self.phi(r)
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn fractional_metric_reduces_to_power_law_without_smoothing() {
        let kernel = FractionalMetricKernel::new(2.0, 0.0);
        // 2s + 1 = 5, so phi(2) = 2^-5.
        assert!((kernel.phi(2.0) - 1.0 / 32.0).abs() <= 1e-15);

        let a = mat![[0.0, 0.0, 0.0]];
        let b = mat![[2.0, 0.0, 0.0]];
        assert!((kernel.evaluate(a.row(0), b.row(0)) - 1.0 / 32.0).abs() <= 1e-15);
    }

    #[test]
    fn smoothing_bounds_the_kernel_at_zero_distance() {
        let kernel = FractionalMetricKernel::new(2.0, 0.1);
        let at_zero = kernel.phi(0.0);
        assert!(at_zero.is_finite());
        assert!((at_zero - 0.1_f64.powf(-5.0)).abs() <= 1e-6 * at_zero);

        // Smoothing only matters near the origin.
        let plain = FractionalMetricKernel::new(2.0, 0.0);
        let far_ratio = kernel.phi(10.0) / plain.phi(10.0);
        assert!((far_ratio - 1.0).abs() <= 1e-3);
    }

    #[test]
    fn inverse_power_matches_manual_evaluation() {
        let kernel = InversePowerKernel::new(3.0);
        let a = mat![[1.0, 2.0, 2.0]];
        let b = mat![[1.0, 2.0, 0.0]];
        // Distance 2, so 2^-3.
        assert!((kernel.evaluate(a.row(0), b.row(0)) - 0.125).abs() <= 1e-15);
    }
}
