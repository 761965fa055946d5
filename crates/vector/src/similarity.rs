use faqseek_common::DistanceMetric;
use ndarray::{Array1, Array2, ArrayViewMut1};

/// Cosine similarity of two vectors (0.0 when either is all zeros or the
/// lengths differ)
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Scale a vector to unit length in place. Zero vectors stay zero.
pub(crate) fn normalize(mut vector: ArrayViewMut1<f32>) {
    let norm = vector.dot(&vector).sqrt();
    if norm > 0.0 {
        vector.mapv_inplace(|x| x / norm);
    }
}

/// Distance from `query` to every row of `rows`.
///
/// Both sides must already be normalized. Squared L2 between unit vectors
/// is `2 - 2 * dot`; computing it that way keeps zero vectors (which
/// `normalize` leaves at zero) at the same similarity under both metrics.
pub(crate) fn distances(metric: DistanceMetric, rows: &Array2<f32>, query: &Array1<f32>) -> Array1<f32> {
    let dots = rows.dot(query);
    match metric {
        DistanceMetric::Cosine => dots.mapv(|dot| 1.0 - dot),
        DistanceMetric::L2 => dots.mapv(|dot| (2.0 - 2.0 * dot).max(0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0, 0.0], &[2.0, 0.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_normalize() {
        let mut v = array![3.0_f32, 4.0];
        normalize(v.view_mut());
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = array![0.0_f32, 0.0];
        normalize(zero.view_mut());
        assert_eq!(zero, array![0.0_f32, 0.0]);
    }

    #[test]
    fn test_cosine_distances() {
        let rows = array![[1.0_f32, 0.0], [0.0, 1.0], [-1.0, 0.0]];
        let query = array![1.0_f32, 0.0];
        let d = distances(DistanceMetric::Cosine, &rows, &query);
        assert_eq!(d, array![0.0_f32, 1.0, 2.0]);
    }

    #[test]
    fn test_l2_similarity_matches_cosine() {
        let a = [0.3_f32, 0.4, 0.5];
        let b = [0.9_f32, -0.1, 0.2];

        let mut rows = Array2::from_shape_vec((1, 3), b.to_vec()).unwrap();
        normalize(rows.row_mut(0));
        let mut query = Array1::from(a.to_vec());
        normalize(query.view_mut());

        let d = distances(DistanceMetric::L2, &rows, &query)[0];
        let expected = cosine_similarity(&a, &b);
        assert!((DistanceMetric::L2.similarity(d) - expected).abs() < 1e-5);

        let d = distances(DistanceMetric::Cosine, &rows, &query)[0];
        assert!((DistanceMetric::Cosine.similarity(d) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_zero_query_scores_like_cosine() {
        let mut rows = array![[3.0_f32, 4.0], [0.0, 0.0]];
        for row in rows.rows_mut() {
            normalize(row);
        }
        let query = array![0.0_f32, 0.0];

        let cosine = distances(DistanceMetric::Cosine, &rows, &query);
        let l2 = distances(DistanceMetric::L2, &rows, &query);
        for (c, l) in cosine.iter().zip(l2.iter()) {
            assert_eq!(DistanceMetric::Cosine.similarity(*c), 0.0);
            assert_eq!(DistanceMetric::L2.similarity(*l), 0.0);
        }
    }

    #[test]
    fn test_l2_distance_range() {
        let rows = array![[1.0_f32, 0.0], [-1.0, 0.0], [0.0, 1.0]];
        let query = array![1.0_f32, 0.0];
        let d = distances(DistanceMetric::L2, &rows, &query);
        assert_eq!(d, array![0.0_f32, 4.0, 2.0]);
    }
}
