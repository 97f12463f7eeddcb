/////////////////////////////////////////////////////////////////////////////////////////////
//
// Generates deterministic sample surfaces used by tests, benchmarks, and documentation.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::{Col, Mat};
use ferreus_bct::SurfaceElements;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The four faces of a regular tetrahedron with vertices on `(+-1, +-1, +-1)`.
///
/// Each element carries the face barycenter, the outward unit normal and the
/// face area (`2 * sqrt(3)` per face).
pub fn regular_tetrahedron() -> SurfaceElements {
    let verts: [[f64; 3]; 4] = [
        [1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
    ];
    // Face f is opposite vertex f.
    let faces: [[usize; 3]; 4] = [[1, 2, 3], [0, 2, 3], [0, 1, 3], [0, 1, 2]];

    let mut positions = Mat::zeros(4, 3);
    let mut normals = Mat::zeros(4, 3);
    let mut masses = Col::zeros(4);

    for (f, face) in faces.iter().enumerate() {
        let (a, b, c) = (verts[face[0]], verts[face[1]], verts[face[2]]);
        let opposite = verts[f];

        let barycenter = [
            (a[0] + b[0] + c[0]) / 3.0,
            (a[1] + b[1] + c[1]) / 3.0,
            (a[2] + b[2] + c[2]) / 3.0,
        ];
        let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        let mut cross = [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ];
        let cross_norm = (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt();

        // Orient outward, away from the opposite vertex.
        let outward: f64 = (0..3)
            .map(|k| cross[k] * (barycenter[k] - opposite[k]))
            .sum();
        if outward < 0.0 {
            for value in cross.iter_mut() {
                *value = -*value;
            }
        }

        masses[f] = cross_norm / 2.0;
        for k in 0..3 {
            positions[(f, k)] = barycenter[k];
            normals[(f, k)] = cross[k] / cross_norm;
        }
    }

    SurfaceElements::new(masses, positions, normals)
}

/// A flat `nx * ny` patch of square cells in the z = `origin[2]` plane.
///
/// Cell centers start half a cell in from `origin`; every element has mass
/// `spacing^2` and the +z unit normal.
pub fn planar_grid(nx: usize, ny: usize, spacing: f64, origin: [f64; 3]) -> SurfaceElements {
    let n = nx * ny;
    let positions = Mat::from_fn(n, 3, |i, c| {
        let (gx, gy) = (i % nx, i / nx);
        match c {
            0 => origin[0] + (gx as f64 + 0.5) * spacing,
            1 => origin[1] + (gy as f64 + 0.5) * spacing,
            _ => origin[2],
        }
    });
    let normals = Mat::from_fn(n, 3, |_, c| if c == 2 { 1.0 } else { 0.0 });
    let masses = Col::from_fn(n, |_| spacing * spacing);

    SurfaceElements::new(masses, positions, normals)
}

/// Random elements in the unit cube with random unit normals and masses in
/// `[0.5, 1.5)`.
///
/// # Parameters
/// - `n`: Number of elements to generate.
/// - `seed`: Optional random seed.
///   - If `Some(seed)` is provided, the same elements are generated
///     deterministically across runs and platforms (useful for reproducible
///     tests).
///   - If `None`, the generator is seeded from the operating system's
///     randomness source.
pub fn random_elements(n: usize, seed: Option<u64>) -> SurfaceElements {
    let mut rng = match seed.is_some() {
        true => StdRng::seed_from_u64(seed.unwrap()),
        false => StdRng::from_os_rng(),
    };

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tetrahedron_faces_have_known_area_and_outward_normals() {
        let elements = regular_tetrahedron();
        assert_eq!(elements.len(), 4);

        let expected_area = 2.0 * 3.0_f64.sqrt();
        for f in 0..4 {
            assert!((elements.mass(f) - expected_area).abs() <= 1e-12);

            let normal = elements.normal(f);
            let norm: f64 = (0..3).map(|c| normal[c] * normal[c]).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() <= 1e-12);

            // The tetrahedron is centered on the origin, so outward normals
            // point along their face barycenters.
            let position = elements.position(f);
            let dot: f64 = (0..3).map(|c| normal[c] * position[c]).sum();
            assert!(dot > 0.0);
        }
    }

    #[test]
    fn grid_cells_tile_the_requested_patch() {
        let elements = planar_grid(4, 3, 0.5, [1.0, 2.0, -1.0]);
        assert_eq!(elements.len(), 12);

        for i in 0..12 {
            assert_eq!(elements.mass(i), 0.25);
            assert_eq!(elements.position(i)[2], -1.0);
            assert_eq!(elements.normal(i)[2], 1.0);
        }
        assert_eq!(elements.position(0)[0], 1.25);
        assert_eq!(elements.position(11)[1], 3.25);
    }

    #[test]
    fn seeded_random_elements_are_reproducible() {
        let a = random_elements(25, Some(42));
        let b = random_elements(25, Some(42));
        for i in 0..25 {
            assert_eq!(a.mass(i).to_bits(), b.mass(i).to_bits());
            for c in 0..3 {
                assert_eq!(
                    a.position(i)[c].to_bits(),
                    b.position(i)[c].to_bits()
                );
            }
        }
    }

    #[test]
    fn random_normals_are_unit_length() {
        let elements = random_elements(50, Some(7));
        for i in 0..50 {
            let normal = elements.normal(i);
            let norm: f64 = (0..3).map(|c| normal[c] * normal[c]).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() <= 1e-9);
        }
    }
}
