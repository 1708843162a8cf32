//! Property tests for scoring and matching

use std::collections::BTreeMap;

use bloomlink::core::{Fingerprint, FingerprintStore, MatchMethod};
use bloomlink::matching::map_entities;
use bloomlink::similarity::{
    dice_coefficient, ScoringConfig, SimilarityEdge, SimilarityGraph, SimilarityScorer,
};
use proptest::prelude::*;

const BITS: usize = 128;

fn fingerprint() -> impl Strategy<Value = Fingerprint> {
    prop::collection::vec(any::<u64>(), 2)
        .prop_map(|words| Fingerprint::from_words(words, BITS).unwrap())
}

fn sparse_fingerprint() -> impl Strategy<Value = Fingerprint> {
    // Few set bits, so that pairs land on a spread of scores
    prop::collection::vec(0..BITS, 0..24)
        .prop_map(|positions| Fingerprint::from_positions(BITS, positions).unwrap())
}

fn store(max: usize) -> impl Strategy<Value = FingerprintStore> {
    prop::collection::vec(sparse_fingerprint(), 0..max).prop_map(FingerprintStore::new)
}

/// Small graphs with coarse scores, so ties and conflicts are common
fn graph() -> impl Strategy<Value = SimilarityGraph> {
    (1usize..7, 1usize..7).prop_flat_map(|(n_a, n_b)| {
        prop::collection::vec((0..n_a, 0..n_b, 0u8..=10), 0..20).prop_map(move |raw| {
            let unique: BTreeMap<(usize, usize), u8> =
                raw.into_iter().map(|(a, b, s)| ((a, b), s)).collect();
            let edges = unique
                .into_iter()
                .map(|((a, b), s)| SimilarityEdge::new(a, b, f64::from(s) / 10.0))
                .collect();
            SimilarityGraph::from_edges(n_a, n_b, edges).unwrap()
        })
    })
}

fn threshold() -> impl Strategy<Value = f64> {
    (0u8..=10).prop_map(|t| f64::from(t) / 10.0)
}

proptest! {
    #[test]
    fn dice_is_symmetric_and_bounded(a in fingerprint(), b in fingerprint()) {
        let ab = dice_coefficient(&a, &b);
        let ba = dice_coefficient(&b, &a);
        prop_assert!((0.0..=1.0).contains(&ab));
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn dice_self_similarity(a in fingerprint()) {
        prop_assume!(!a.is_empty());
        prop_assert_eq!(dice_coefficient(&a, &a), 1.0);
    }

    #[test]
    fn top_k_full_width_keeps_dense_best(a in store(8), b in store(8)) {
        prop_assume!(!b.is_empty());
        let scorer = SimilarityScorer::new();
        let dense = scorer.score_all(&a, &b).unwrap();
        let top = scorer.score_top_k(&a, &b, b.len()).unwrap();

        prop_assert_eq!(top.len(), dense.len());
        prop_assert_eq!(top.best_per_source(), dense.best_per_source());
    }

    #[test]
    fn top_k_equals_truncated_dense_rows(
        (a, b, k) in (store(8), store(8)).prop_flat_map(|(a, b)| {
            let width = b.len().max(1);
            (Just(a), Just(b), 1..=width)
        })
    ) {
        let scorer = SimilarityScorer::new();
        let dense = scorer.score_all(&a, &b).unwrap();
        let top = scorer.score_top_k(&a, &b, k).unwrap();

        let mut expected: Vec<SimilarityEdge> = Vec::new();
        for index_a in 0..a.len() {
            let mut row: Vec<SimilarityEdge> = dense
                .edges()
                .iter()
                .filter(|e| e.index_a == index_a)
                .copied()
                .collect();
            row.sort_by(|x, y| {
                y.score
                    .total_cmp(&x.score)
                    .then_with(|| x.index_b.cmp(&y.index_b))
            });
            row.truncate(k);
            expected.extend(row);
        }
        prop_assert_eq!(top.edges(), expected.as_slice());
    }

    #[test]
    fn serial_and_parallel_scoring_agree(a in store(12), b in store(6), chunk in 1usize..5) {
        let parallel =
            SimilarityScorer::with_config(ScoringConfig::default().with_chunk_rows(chunk));
        let serial = SimilarityScorer::with_config(ScoringConfig::default().with_parallel(false));

        prop_assert_eq!(parallel.score_all(&a, &b).unwrap(), serial.score_all(&a, &b).unwrap());
        prop_assert_eq!(
            parallel.score_top_k(&a, &b, 2).unwrap(),
            serial.score_top_k(&a, &b, 2).unwrap()
        );
    }

    #[test]
    fn every_strategy_is_injective(g in graph(), t in threshold()) {
        for method in MatchMethod::ALL {
            let mapping = map_entities(&g, t, Some(method)).unwrap();
            prop_assert!(mapping.is_injective(), "{} mapping is not injective", method);
            prop_assert!(mapping.edges().all(|e| e.score >= t));
        }
    }

    #[test]
    fn optimal_strategies_beat_greedy(g in graph(), t in threshold()) {
        let greedy = map_entities(&g, t, Some(MatchMethod::Greedy)).unwrap().total_score();
        let bipartite = map_entities(&g, t, Some(MatchMethod::Bipartite)).unwrap().total_score();
        let weighted = map_entities(&g, t, Some(MatchMethod::Weighted)).unwrap().total_score();

        prop_assert!(bipartite + 1e-6 >= greedy, "bipartite {} < greedy {}", bipartite, greedy);
        prop_assert!(weighted + 1e-6 >= greedy, "weighted {} < greedy {}", weighted, greedy);
        prop_assert!(
            (bipartite - weighted).abs() < 1e-6,
            "bipartite {} != weighted {}",
            bipartite,
            weighted
        );
    }

    #[test]
    fn matching_is_idempotent(g in graph(), t in threshold()) {
        let before = g.clone();
        for method in MatchMethod::ALL {
            let first = map_entities(&g, t, Some(method)).unwrap();
            let second = map_entities(&g, t, Some(method)).unwrap();
            prop_assert_eq!(first, second);
        }
        prop_assert_eq!(g, before);
    }
}
