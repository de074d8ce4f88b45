//! Vector similarity functions over raw slices.

/// Cosine similarity between two vectors.
///
/// Returns a value in [-1.0, 1.0]; 0.0 for zero vectors or mismatched
/// dimensions.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Normalized mean of `embeddings`.
///
/// Empty input gives an empty vector.
pub fn calculate_centroid(embeddings: &[&[f32]]) -> Vec<f32> {
    let Some(first) = embeddings.first() else {
        return Vec::new();
    };

    let dim = first.len();
    let n = embeddings.len() as f32;
    let mut centroid = vec![0.0f32; dim];

    for embedding in embeddings {
        for (acc, &val) in centroid.iter_mut().zip(embedding.iter()) {
            *acc += val;
        }
    }

    for val in centroid.iter_mut() {
        *val /= n;
    }

    normalize(&mut centroid);
    centroid
}

/// Normalize a vector to unit length in place.
pub fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in v.iter_mut() {
            *val /= norm;
        }
    }
}
