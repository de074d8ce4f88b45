//! Gap clustering.
//!
//! Missing job terms often describe one competency several ways ("docker",
//! "kubernetes", "containerization"). Grouping them lets the composer emit
//! one suggestion per theme instead of one per keyword.
//!
//! Small sets form a single cluster. Larger sets are partitioned with
//! spherical k-means (cosine distance on unit vectors), seeded
//! deterministically by farthest-point selection from the first term.

use resume_embeddings::{Embedding, SharedEmbedder};
use resume_types::AdvisorConfig;
use serde::Serialize;
use tracing::debug;

use crate::similarity::{calculate_centroid, cosine_similarity};

/// Upper bound on k-means iterations.
const MAX_ITERATIONS: usize = 50;

/// A group of related missing terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeCluster {
    /// Member closest to the cluster centroid
    pub representative: String,
    /// All members, including the representative, in input order
    pub members: Vec<String>,
}

impl ThemeCluster {
    /// Members other than the representative, at most `n`.
    pub fn examples(&self, n: usize) -> Vec<&str> {
        self.members
            .iter()
            .filter(|m| **m != self.representative)
            .take(n)
            .map(|m| m.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Cluster sizing policy.
#[derive(Debug, Clone, Copy)]
pub struct ClusterPolicy {
    /// Sets of at most this many terms form a single cluster
    pub single_cluster_max: usize,
    /// Upper bound on k
    pub max_clusters: usize,
    /// k = count / members_per_cluster, clamped to [2, max_clusters]
    pub members_per_cluster: usize,
}

impl Default for ClusterPolicy {
    fn default() -> Self {
        Self {
            single_cluster_max: 6,
            max_clusters: 4,
            members_per_cluster: 6,
        }
    }
}

impl From<&AdvisorConfig> for ClusterPolicy {
    fn from(config: &AdvisorConfig) -> Self {
        Self {
            single_cluster_max: config.single_cluster_max,
            max_clusters: config.max_clusters,
            members_per_cluster: config.members_per_cluster,
        }
    }
}

impl ClusterPolicy {
    /// Number of clusters for `count` terms.
    pub fn k_for(&self, count: usize) -> usize {
        if count <= self.single_cluster_max.max(1) {
            return 1;
        }
        let max_k = self.max_clusters.max(2);
        (count / self.members_per_cluster.max(1)).clamp(2, max_k).min(count)
    }
}

/// Groups missing terms into themes.
pub struct GapClusterer<'a> {
    embedder: &'a SharedEmbedder,
    policy: ClusterPolicy,
}

impl<'a> GapClusterer<'a> {
    pub fn new(embedder: &'a SharedEmbedder, policy: ClusterPolicy) -> Self {
        Self { embedder, policy }
    }

    /// Cluster `terms` (most significant first).
    ///
    /// Every input term lands in exactly one cluster. Clusters are ordered
    /// by the position of their earliest member.
    pub fn cluster(&self, terms: &[String]) -> Vec<ThemeCluster> {
        if terms.is_empty() {
            return Vec::new();
        }
        let k = self.policy.k_for(terms.len());
        if k == 1 {
            return vec![ThemeCluster {
                representative: terms[0].clone(),
                members: terms.to_vec(),
            }];
        }

        let embeddings = self.embedder.embed_many(terms);
        let assignment = kmeans(&embeddings, k);
        let clusters = build_clusters(terms, &embeddings, &assignment, k);
        debug!(terms = terms.len(), clusters = clusters.len(), "Clustered missing terms");
        clusters
    }
}

/// Spherical k-means. Returns the cluster index of every item.
///
/// Deterministic: item 0 seeds the first centroid, each further seed is the
/// item least similar to its nearest existing seed. No cluster is left
/// empty.
pub fn kmeans(embeddings: &[Embedding], k: usize) -> Vec<usize> {
    let n = embeddings.len();
    if n == 0 || k == 0 {
        return Vec::new();
    }
    let k = k.min(n);
    let vectors: Vec<&[f32]> = embeddings.iter().map(|e| e.values.as_slice()).collect();

    let mut centroids: Vec<Vec<f32>> = seed(&vectors, k)
        .into_iter()
        .map(|i| vectors[i].to_vec())
        .collect();
    let mut assignment = vec![usize::MAX; n];

    for iteration in 0..MAX_ITERATIONS {
        let mut next: Vec<usize> = vectors
            .iter()
            .map(|v| nearest_centroid(v, &centroids))
            .collect();
        repair_empty(&vectors, &centroids, &mut next, k);

        if next == assignment {
            debug!(iteration, "k-means converged");
            break;
        }
        assignment = next;

        for (c, centroid) in centroids.iter_mut().enumerate() {
            let members: Vec<&[f32]> = vectors
                .iter()
                .zip(assignment.iter())
                .filter(|(_, &a)| a == c)
                .map(|(v, _)| *v)
                .collect();
            if !members.is_empty() {
                *centroid = calculate_centroid(&members);
            }
        }
    }

    assignment
}

fn seed(vectors: &[&[f32]], k: usize) -> Vec<usize> {
    let mut seeds = vec![0];
    while seeds.len() < k {
        let next = (0..vectors.len())
            .filter(|i| !seeds.contains(i))
            .map(|i| {
                let closest = seeds
                    .iter()
                    .map(|&s| cosine_similarity(vectors[i], vectors[s]))
                    .fold(f32::MIN, f32::max);
                (i, closest)
            })
            // Least similar to any seed; earliest index on ties
            .fold(None, |best: Option<(usize, f32)>, (i, s)| match best {
                Some((_, bs)) if bs <= s => best,
                _ => Some((i, s)),
            });
        match next {
            Some((i, _)) => seeds.push(i),
            None => break,
        }
    }
    seeds
}

fn nearest_centroid(v: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_sim = f32::MIN;
    for (c, centroid) in centroids.iter().enumerate() {
        let s = cosine_similarity(v, centroid);
        if s > best_sim {
            best = c;
            best_sim = s;
        }
    }
    best
}

/// Give every empty cluster the worst-fitting member of the largest one.
fn repair_empty(vectors: &[&[f32]], centroids: &[Vec<f32>], assignment: &mut [usize], k: usize) {
    for c in 0..k {
        if assignment.iter().any(|&a| a == c) {
            continue;
        }
        let mut sizes = vec![0usize; k];
        for &a in assignment.iter() {
            sizes[a] += 1;
        }
        let Some(largest) = (0..k).filter(|&i| sizes[i] > 1).max_by_key(|&i| (sizes[i], k - i))
        else {
            continue;
        };
        let worst = (0..assignment.len())
            .filter(|&i| assignment[i] == largest)
            .map(|i| (i, cosine_similarity(vectors[i], &centroids[largest])))
            .fold(None, |best: Option<(usize, f32)>, (i, s)| match best {
                Some((_, bs)) if bs <= s => best,
                _ => Some((i, s)),
            });
        if let Some((i, _)) = worst {
            assignment[i] = c;
        }
    }
}

fn build_clusters(
    terms: &[String],
    embeddings: &[Embedding],
    assignment: &[usize],
    k: usize,
) -> Vec<ThemeCluster> {
    let mut clusters: Vec<(usize, ThemeCluster)> = (0..k)
        .filter_map(|c| {
            let idx: Vec<usize> = (0..terms.len()).filter(|&i| assignment[i] == c).collect();
            let first = *idx.first()?;
            let vectors: Vec<&[f32]> = idx.iter().map(|&i| embeddings[i].values.as_slice()).collect();
            let centroid = calculate_centroid(&vectors);

            let mut rep = first;
            let mut rep_sim = f32::MIN;
            for &i in &idx {
                let s = cosine_similarity(&embeddings[i].values, &centroid);
                if s > rep_sim {
                    rep = i;
                    rep_sim = s;
                }
            }

            Some((
                first,
                ThemeCluster {
                    representative: terms[rep].clone(),
                    members: idx.iter().map(|&i| terms[i].clone()).collect(),
                },
            ))
        })
        .collect();
    clusters.sort_by_key(|(first, _)| *first);
    clusters.into_iter().map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_k_for() {
        let p = ClusterPolicy::default();
        assert_eq!(p.k_for(0), 1);
        assert_eq!(p.k_for(6), 1);
        assert_eq!(p.k_for(7), 2);
        assert_eq!(p.k_for(18), 3);
        assert_eq!(p.k_for(100), 4);
    }

    #[test]
    fn test_empty_input() {
        let embedder = SharedEmbedder::hashing();
        let clusterer = GapClusterer::new(&embedder, ClusterPolicy::default());
        assert!(clusterer.cluster(&[]).is_empty());
    }

    #[test]
    fn test_small_set_single_cluster() {
        let embedder = SharedEmbedder::hashing();
        let clusterer = GapClusterer::new(&embedder, ClusterPolicy::default());
        let terms = strings(&["docker", "kubernetes", "helm"]);
        let clusters = clusterer.cluster(&terms);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].representative, "docker");
        assert_eq!(clusters[0].members, terms);
        assert_eq!(clusters[0].examples(2), vec!["kubernetes", "helm"]);
    }

    #[test]
    fn test_related_terms_group_together() {
        let embedder = SharedEmbedder::hashing();
        let clusterer = GapClusterer::new(&embedder, ClusterPolicy::default());
        let terms = strings(&[
            "kubernetes",
            "kubernetes cluster",
            "kubernetes operators",
            "kubernetes helm",
            "payroll",
            "payroll reports",
            "payroll audits",
            "payroll taxes",
        ]);
        let clusters = clusterer.cluster(&terms);
        assert_eq!(clusters.len(), 2);

        let first: HashSet<&str> = clusters[0].members.iter().map(|s| s.as_str()).collect();
        assert!(first.contains("kubernetes"));
        assert!(first.contains("kubernetes operators"));
        assert!(!first.contains("payroll"));
        assert!(clusters[1].representative.contains("payroll"));
    }

    #[test]
    fn test_representative_is_member() {
        let embedder = SharedEmbedder::hashing();
        let clusterer = GapClusterer::new(&embedder, ClusterPolicy::default());
        let terms: Vec<String> = (0..20).map(|i| format!("skill{} topic{}", i, i % 3)).collect();
        for c in clusterer.cluster(&terms) {
            assert!(c.members.contains(&c.representative));
        }
    }

    #[test]
    fn test_kmeans_identical_vectors_no_empty_cluster() {
        let e = Embedding::new(vec![1.0, 0.0]);
        let assignment = kmeans(&[e.clone(), e.clone(), e.clone(), e], 3);
        let used: HashSet<usize> = assignment.iter().copied().collect();
        assert_eq!(used.len(), 3);
    }

    proptest! {
        #[test]
        fn every_term_in_exactly_one_cluster(
            raw in proptest::collection::btree_set("[a-z]{3,9}( [a-z]{3,9})?", 0..30)
        ) {
            let terms: Vec<String> = raw.into_iter().collect();
            let embedder = SharedEmbedder::hashing();
            let policy = ClusterPolicy::default();
            let clusters = GapClusterer::new(&embedder, policy).cluster(&terms);

            if terms.is_empty() {
                prop_assert!(clusters.is_empty());
            } else if terms.len() <= 6 {
                prop_assert_eq!(clusters.len(), 1);
                prop_assert_eq!(&clusters[0].members, &terms);
            } else {
                prop_assert!(clusters.len() >= 2 && clusters.len() <= policy.max_clusters);
            }

            let mut seen: Vec<String> = clusters.iter().flat_map(|c| c.members.clone()).collect();
            seen.sort();
            let mut expected = terms.clone();
            expected.sort();
            prop_assert_eq!(seen, expected);
        }
    }
}
