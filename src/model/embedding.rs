/// Standard comparison threshold for this class of identity embedding.
pub const MATCH_THRESHOLD: f32 = 0.6;

/// Fixed-length identity vector produced by the face embedder. Opaque except
/// for distance comparison; the dimensionality is whatever the embedder
/// emits.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn distance(&self, other: &Embedding) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }

    pub fn is_match(&self, other: &Embedding, threshold: f32) -> bool {
        self.distance(other) <= threshold
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

impl std::ops::Deref for Embedding {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::{Embedding, MATCH_THRESHOLD};

    #[test]
    fn distance_to_self_is_zero() {
        let embedding = Embedding::from(vec![0.6, 0.8, 0.0]);
        assert_eq!(embedding.distance(&embedding), 0.);
    }

    #[test]
    fn distance_of_orthonormal_vectors() {
        let a = Embedding::from(vec![1.0, 0.0]);
        let b = Embedding::from(vec![0.0, 1.0]);
        assert!((a.distance(&b) - 2f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn match_predicate_is_inclusive() {
        let a = Embedding::from(vec![0.0, 0.0]);
        let b = Embedding::from(vec![MATCH_THRESHOLD, 0.0]);
        assert!(a.is_match(&b, MATCH_THRESHOLD));
        let c = Embedding::from(vec![MATCH_THRESHOLD + 0.01, 0.0]);
        assert!(!a.is_match(&c, MATCH_THRESHOLD));
    }

    #[test]
    fn serializes_as_a_bare_array() {
        let embedding = Embedding::from(vec![0.25, -0.5]);
        let json = serde_json::to_string(&embedding).expect("Failed to serialize embedding");
        assert_eq!(json, "[0.25,-0.5]");
        let back: Embedding = serde_json::from_str(&json).expect("Failed to deserialize embedding");
        assert_eq!(back, embedding);
    }
}
