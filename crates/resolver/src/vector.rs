//! Query vector construction.

use crate::error::{ResolveError, ResolveResult};

/// In-place L2 normalization. The zero vector is left untouched.
pub fn l2_normalize_in_place(v: &mut [f32]) {
    let norm_sq: f32 = v.iter().map(|x| x * x).sum();
    if norm_sq > 0.0 {
        let inv_norm = norm_sq.sqrt().recip();
        for x in v.iter_mut() {
            *x *= inv_norm;
        }
    }
}

/// L2 norm of `v`.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine distance `1 - cos(a, b)`. Returns `1.0` when either side is the zero vector.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = l2_norm(a);
    let nb = l2_norm(b);
    if na > 0.0 && nb > 0.0 {
        1.0 - dot / (na * nb)
    } else {
        1.0
    }
}

/// Combine embeddings into a single unit-length query vector.
///
/// Computes the element-wise mean (centroid) of `vectors` and rescales it to
/// unit length. A centroid of norm zero is returned as the all-zero vector.
/// With a single unit-length input this is the identity.
pub fn aggregate<V: AsRef<[f32]>>(vectors: &[V]) -> ResolveResult<Vec<f32>> {
    let first = vectors
        .first()
        .ok_or_else(|| ResolveError::InvalidInput("cannot aggregate zero vectors".into()))?;
    let dim = first.as_ref().len();

    let mut centroid = vec![0.0f32; dim];
    for v in vectors {
        let v = v.as_ref();
        if v.len() != dim {
            return Err(ResolveError::DimensionMismatch {
                expected: dim,
                found: v.len(),
            });
        }
        for (acc, x) in centroid.iter_mut().zip(v) {
            *acc += x;
        }
    }

    let inv = (vectors.len() as f32).recip();
    for x in centroid.iter_mut() {
        *x *= inv;
    }
    l2_normalize_in_place(&mut centroid);
    Ok(centroid)
}
