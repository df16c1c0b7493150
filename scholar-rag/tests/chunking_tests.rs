//! Property tests for word-window chunking.

use proptest::prelude::*;
use scholar_rag::{Chunker, Document, WordWindowChunker, chunk_words};

/// Text made of short words separated by arbitrary runs of whitespace.
fn arb_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(("[a-zA-Z0-9éß]{1,8}", "[ \t\n]{1,3}"), 0..60).prop_map(|parts| {
        parts.into_iter().map(|(word, gap)| format!("{word}{gap}")).collect::<String>()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Identical input always yields identical chunks.
    #[test]
    fn chunking_is_deterministic(text in arb_text(), max_words in 1usize..20) {
        let first = chunk_words(&text, max_words).unwrap();
        prop_assert_eq!(first, chunk_words(&text, max_words).unwrap());
    }

    /// Every chunk holds between one and `max_words` words, and the chunks'
    /// words in order reproduce the original token sequence.
    #[test]
    fn chunks_are_bounded_and_lossless(text in arb_text(), max_words in 1usize..20) {
        let chunks = chunk_words(&text, max_words).unwrap();
        for chunk in &chunks {
            let count = chunk.split(' ').count();
            prop_assert!(count >= 1 && count <= max_words);
        }
        for chunk in chunks.iter().rev().skip(1) {
            prop_assert_eq!(chunk.split(' ').count(), max_words);
        }

        let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.split(' ')).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        prop_assert_eq!(rejoined, original);
    }

    /// The chunker trait agrees with the free function and numbers chunks in order.
    #[test]
    fn chunker_matches_chunk_words(text in arb_text(), max_words in 1usize..20) {
        let chunker = WordWindowChunker::new(max_words).unwrap();
        let chunks = chunker.chunk(&Document::new("doc", text.clone()));
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        prop_assert_eq!(texts, chunk_words(&text, max_words).unwrap());
        for (ordinal, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.ordinal, ordinal);
            prop_assert_eq!(&chunk.id, &format!("doc_{ordinal}"));
        }
    }
}

#[test]
fn splits_the_reference_sentence() {
    let chunks = chunk_words("alpha beta gamma delta", 2).unwrap();
    assert_eq!(chunks, vec!["alpha beta", "gamma delta"]);
    let chunks = chunk_words("alpha beta gamma delta", 3).unwrap();
    assert_eq!(chunks, vec!["alpha beta gamma", "delta"]);
}
