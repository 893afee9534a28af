//! Hand-rolled trigonometric noise.
//!
//! Cheap, allocation-free and bit-for-bit deterministic for a given input,
//! which lets terrain heights be recomputed at query time instead of stored.

/// Single octave of layered sine/cosine noise, roughly in `[-1, 1]`.
///
/// The seed only shifts phases, so nearby seeds still give unrelated shapes.
pub fn trig_noise(x: f32, z: f32, seed: u32) -> f32 {
    let s = seed as f32;
    let a = (x * 1.7 + s * 0.131).sin() * (z * 1.3 + s * 0.293).cos();
    let b = ((x + z) * 0.9 + s * 0.517).sin();
    let c = (x * 0.6 - z * 1.1 + s * 0.071).cos() * (z * 0.4 + x * 0.2).sin();

    a * 0.5 + b * 0.3 + c * 0.2
}

/// Scalar hash in `[0, 1)` used to jitter procedural shapes.
///
/// Same trick as the classic GLSL `fract(sin(dot(...)) * 43758.5453)`.
pub fn hash01(a: f32, b: f32, seed: u32) -> f32 {
    let v = (a * 12.9898 + b * 78.233 + seed as f32 * 0.3183).sin() * 43_758.547;
    (v - v.floor()).min(1.0 - f32::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_stays_in_unit_range() {
        for i in -50..50 {
            for j in -50..50 {
                let n = trig_noise(i as f32 * 0.37, j as f32 * 0.53, 7);
                assert!((-1.0..=1.0).contains(&n), "noise {n} out of range");
            }
        }
    }

    #[test]
    fn seed_changes_output() {
        let a = trig_noise(3.2, -1.4, 1);
        let b = trig_noise(3.2, -1.4, 2);
        assert_ne!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn hash_is_unit_interval() {
        for i in 0..200 {
            let h = hash01(i as f32, (i * 3) as f32, 11);
            assert!((0.0..1.0).contains(&h));
        }
    }
}
