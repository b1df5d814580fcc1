//! Property tests for normalization, chunking, and search invariants.

use proptest::prelude::*;

use docqa_core::{Chunk, Document, Normalizer, VectorIndex, WindowChunker};

fn arb_vector(dims: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1.0f32..1.0, dims)
}

proptest! {
    #[test]
    fn normalization_is_idempotent(text in any::<String>()) {
        let normalizer = Normalizer::new();
        let once = normalizer.normalize(&text);
        let twice = normalizer.normalize(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_text_has_no_runs_of_whitespace(text in any::<String>()) {
        let normalized = Normalizer::new().normalize(&text);
        prop_assert!(!normalized.contains("  "));
        prop_assert!(!normalized.contains('\n'));
        prop_assert_eq!(normalized.trim(), normalized.as_str());
    }

    #[test]
    fn chunks_respect_the_size_limit(text in "[ a-zA-Z0-9.,!?\n]{0,4000}") {
        let chunker = WindowChunker::default();
        let document = Document::from_text("prop.txt", text);
        for chunk in chunker.chunk(&document) {
            let chars = chunk.text.chars().count();
            prop_assert!(chars > 0);
            prop_assert!(chars <= 1000, "chunk has {} chars", chars);
        }
    }

    #[test]
    fn chunking_never_panics_and_pages_stay_in_range(
        pages in prop::collection::vec(any::<String>(), 0..5),
    ) {
        let page_count = pages.len();
        let document = Document::new("prop.txt", pages);
        let chunker = WindowChunker::new(40, 10).unwrap();
        for chunk in chunker.chunk(&document) {
            prop_assert!(chunk.page >= 1);
            prop_assert!(chunk.page as usize <= page_count);
            prop_assert!(!chunk.text.trim().is_empty());
        }
    }

    #[test]
    fn search_results_are_ordered_and_bounded(
        vectors in prop::collection::vec(arb_vector(8), 1..30),
        query in arb_vector(8),
        top_k in 1usize..10,
    ) {
        let mut index = VectorIndex::new(8, "prop-model");
        for (i, vector) in vectors.into_iter().enumerate() {
            let chunk = Chunk {
                text: format!("chunk {i}"),
                source: "prop.txt".to_string(),
                page: 1,
            };
            index.insert(chunk, vector).unwrap();
        }

        let results = index.search(&query, top_k, f32::MIN);
        prop_assert!(results.len() <= top_k);
        for pair in results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn min_score_filters_every_result(
        vectors in prop::collection::vec(arb_vector(8), 1..30),
        query in arb_vector(8),
    ) {
        let mut index = VectorIndex::new(8, "prop-model");
        for (i, vector) in vectors.into_iter().enumerate() {
            let chunk = Chunk {
                text: format!("chunk {i}"),
                source: "prop.txt".to_string(),
                page: 1,
            };
            index.insert(chunk, vector).unwrap();
        }

        for result in index.search(&query, 50, 0.3) {
            prop_assert!(result.score >= 0.3);
        }
    }
}
