use super::*;
use crate::processor::DocumentMetadata;
use itertools::Itertools;

fn splitter(chunk_size: usize, chunk_overlap: usize) -> RecursiveTextSplitter {
    RecursiveTextSplitter::new(ChunkingConfig {
        chunk_size,
        chunk_overlap,
    })
}

fn numbered_words(count: usize) -> String {
    (0..count).map(|i| format!("w{:03}", i)).join(" ")
}

#[test]
fn default_config() {
    let config = ChunkingConfig::default();
    assert_eq!(config.chunk_size, 1000);
    assert_eq!(config.chunk_overlap, 200);
}

#[test]
fn short_text_is_single_chunk() {
    let chunks = RecursiveTextSplitter::default().split_text("Hello world.");
    assert_eq!(chunks, vec!["Hello world.".to_string()]);
}

#[test]
fn empty_text_yields_nothing() {
    assert!(RecursiveTextSplitter::default().split_text("").is_empty());
    assert!(RecursiveTextSplitter::default().split_text("  \n\n  ").is_empty());
}

#[test]
fn paragraphs_are_preferred_boundaries() {
    let text = "First paragraph here.\n\nSecond paragraph here.\n\nThird one.";
    let chunks = splitter(30, 0).split_text(text);

    assert_eq!(
        chunks,
        vec![
            "First paragraph here.".to_string(),
            "Second paragraph here.".to_string(),
            "Third one.".to_string(),
        ]
    );
}

#[test]
fn separator_stays_with_following_piece() {
    let chunks = splitter(5, 0).with_separators(["|"]).split_text("aaa|bbb");
    assert_eq!(chunks, vec!["aaa".to_string(), "|bbb".to_string()]);
}

#[test]
fn character_fallback_respects_budget() {
    let text = "x".repeat(2500);
    let chunks = RecursiveTextSplitter::default().split_text(&text);

    let lengths: Vec<usize> = chunks.iter().map(|c| char_len(c)).collect();
    assert_eq!(lengths, vec![1000, 1000, 900]);
}

#[test]
fn unsplittable_piece_is_kept_whole() {
    let text = format!("short {}", "y".repeat(20));
    let chunks = splitter(10, 0).with_separators([" "]).split_text(&text);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], "short");
    assert_eq!(chunks[1].trim(), "y".repeat(20));
    assert!(char_len(&chunks[1]) > 10);
}

#[test]
fn chunks_never_exceed_chunk_size() {
    let text = format!(
        "{}\n\n{}\n{}",
        numbered_words(400),
        numbered_words(50),
        numbered_words(300)
    );
    let chunks = RecursiveTextSplitter::default().split_text(&text);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(char_len(chunk) <= 1000, "chunk too long: {}", char_len(chunk));
    }
}

#[test]
fn consecutive_chunks_overlap_by_configured_amount() {
    let text = numbered_words(600);
    let document = Document {
        content: text.clone(),
        metadata: DocumentMetadata::new("words.txt"),
    };

    let chunks = RecursiveTextSplitter::default().split_documents(&[document]);
    assert!(chunks.len() >= 3);

    for pair in chunks.windows(2) {
        let previous_end = pair[0].metadata.start_index + pair[0].content.len();
        let next_start = pair[1].metadata.start_index;

        assert!(next_start < previous_end, "chunks should overlap");
        let overlap = previous_end - next_start;
        assert!(
            (150..=200).contains(&overlap),
            "unexpected overlap of {} characters",
            overlap
        );
    }
}

#[test]
fn chunks_are_exact_spans_of_the_source() {
    let text = format!(
        "Intro line.\n\n{}\n\nMiddle section.\n{}\n\nThe end.",
        numbered_words(250),
        numbered_words(180)
    );
    let document = Document {
        content: text.clone(),
        metadata: DocumentMetadata::new("spans.txt"),
    };

    let chunks = splitter(300, 60).split_documents(&[document]);
    assert!(chunks.len() > 2);

    for chunk in &chunks {
        let start = chunk.metadata.start_index;
        let span = text.get(start..start + chunk.content.len());
        assert_eq!(span, Some(chunk.content.as_str()));
    }

    let last = chunks.last().expect("at least one chunk");
    assert!(last.content.ends_with("The end."));
}

#[test]
fn split_documents_carries_metadata_and_indexes() {
    let documents = vec![
        Document {
            content: numbered_words(300),
            metadata: DocumentMetadata::new("a.txt"),
        },
        Document {
            content: "tiny".to_string(),
            metadata: DocumentMetadata::new("b.txt"),
        },
    ];

    let chunks = RecursiveTextSplitter::default().split_documents(&documents);

    let (first, rest): (Vec<_>, Vec<_>) = chunks
        .iter()
        .partition(|c| c.metadata.document.source == "a.txt");
    assert!(first.len() > 1);
    for (expected, chunk) in first.iter().enumerate() {
        assert_eq!(chunk.metadata.chunk_index, expected);
    }

    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].content, "tiny");
    assert_eq!(rest[0].metadata.chunk_index, 0);
    assert_eq!(rest[0].metadata.start_index, 0);
}

#[test]
fn multibyte_text_is_counted_in_characters() {
    let text = "é".repeat(1500);
    let chunks = RecursiveTextSplitter::default().split_text(&text);

    assert_eq!(char_len(&chunks[0]), 1000);
    assert!(chunks.iter().all(|c| char_len(c) <= 1000));
}

#[test]
fn repeated_multibyte_text_has_increasing_start_indexes() {
    let text = "привет ".repeat(400);
    let document = Document {
        content: text.clone(),
        metadata: DocumentMetadata::new("greetings.txt"),
    };

    let chunks = splitter(100, 40).split_documents(&[document]);
    assert!(chunks.len() > 10);

    for chunk in &chunks {
        let start = chunk.metadata.start_index;
        assert_eq!(
            text.get(start..start + chunk.content.len()),
            Some(chunk.content.as_str())
        );
    }

    let starts = chunks.iter().map(|c| c.metadata.start_index).collect_vec();
    assert!(
        starts.iter().tuple_windows().all(|(a, b)| a < b),
        "start indexes should increase: {:?}",
        starts
    );

    for pair in chunks.windows(2) {
        let previous_end = pair[0].metadata.start_index + pair[0].content.len();
        let overlap = text
            .get(pair[1].metadata.start_index..previous_end)
            .map_or(0, char_len);
        assert!(overlap <= 40, "overlap of {} characters", overlap);
    }

    let last = chunks.last().expect("at least one chunk");
    assert_eq!(
        last.metadata.start_index + last.content.len(),
        text.trim_end().len()
    );
}
