//! SIMD kernels for vector distance computation.

/// Squared-L2 kernels built on `wide`.
pub mod distance_wide {
    use wide::f32x8;

    /// Below this length the scalar loop wins.
    const SIMD_THRESHOLD: usize = 8;

    /// Scalar squared Euclidean distance.
    pub fn squared_l2_scalar(a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| {
                let d = x - y;
                d * d
            })
            .sum()
    }

    /// SIMD-accelerated squared Euclidean distance using f32x8.
    ///
    /// Both slices must have the same length; extra components of the
    /// longer slice are ignored.
    pub fn squared_l2_simd(a: &[f32], b: &[f32]) -> f32 {
        let len = a.len().min(b.len());
        let (a, b) = (&a[..len], &b[..len]);

        if len < SIMD_THRESHOLD {
            return squared_l2_scalar(a, b);
        }

        let mut acc = f32x8::splat(0.0);

        // Process 8 values at a time
        let chunks_a = a.chunks_exact(8);
        let chunks_b = b.chunks_exact(8);
        let remainder_a = chunks_a.remainder();
        let remainder_b = chunks_b.remainder();

        let mut lane_a = [0.0f32; 8];
        let mut lane_b = [0.0f32; 8];
        for (chunk_a, chunk_b) in chunks_a.zip(chunks_b) {
            lane_a.copy_from_slice(chunk_a);
            lane_b.copy_from_slice(chunk_b);
            let diff = f32x8::from(lane_a) - f32x8::from(lane_b);
            acc = acc + diff * diff;
        }

        // Sum all lanes
        let mut total = acc.to_array().iter().sum::<f32>();

        // Add remainder
        total += squared_l2_scalar(remainder_a, remainder_b);

        total
    }
}
