//! Overlapping word-window chunker.
//!
//! Splits document text into windows of `chunk_size` whitespace-separated
//! words. Consecutive windows start `step` words apart, where
//! `step = chunk_size * (1 - overlap_ratio)` (at least 1), so neighbouring
//! chunks share `chunk_size - step` words of context. The last window is
//! clamped to the end of the document and is always emitted, so every word
//! lands in at least one chunk.
//!
//! Words inside a chunk are re-joined with single spaces; original line
//! breaks and runs of whitespace are not preserved.

/// Number of words between the starts of consecutive windows.
pub fn step_size(chunk_size: usize, overlap_ratio: f64) -> usize {
    let step = (chunk_size as f64 * (1.0 - overlap_ratio)).floor();
    if step.is_finite() && step >= 1.0 {
        step as usize
    } else {
        1
    }
}

/// Split `text` into overlapping word windows.
///
/// Never returns an empty vector: text with at most `chunk_size` words
/// (including empty text) produces exactly one chunk.
pub fn chunk_words(text: &str, chunk_size: usize, overlap_ratio: f64) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let chunk_size = chunk_size.max(1);

    if words.len() <= chunk_size {
        return vec![words.join(" ")];
    }

    let step = step_size(chunk_size, overlap_ratio);
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(n: usize) -> String {
        (0..n)
            .map(|i| format!("w{}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn word_count(chunk: &str) -> usize {
        chunk.split_whitespace().count()
    }

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = chunk_words("Hello,   world!\n\nSecond line.", 1000, 0.25);
        assert_eq!(chunks, vec!["Hello, world! Second line."]);
    }

    #[test]
    fn test_exactly_chunk_size_is_single_chunk() {
        let text = numbered_words(10);
        let chunks = chunk_words(&text, 10, 0.25);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(chunk_words("", 1000, 0.25), vec![String::new()]);
        assert_eq!(chunk_words("  \n\t ", 1000, 0.25), vec![String::new()]);
    }

    #[test]
    fn test_1500_words_default_settings() {
        let text = numbered_words(1500);
        let chunks = chunk_words(&text, 1000, 0.25);
        assert_eq!(chunks.len(), 2);
        assert_eq!(word_count(&chunks[0]), 1000);
        assert_eq!(word_count(&chunks[1]), 750);
        assert!(chunks[0].starts_with("w0 "));
        assert!(chunks[1].starts_with("w750 "));
        assert!(chunks[1].ends_with("w1499"));
    }

    #[test]
    fn test_coverage_and_overlap() {
        for (n, size, ratio) in [(23, 5, 0.4), (101, 10, 0.25), (57, 8, 0.0), (40, 7, 0.9)] {
            let text = numbered_words(n);
            let chunks = chunk_words(&text, size, ratio);
            let step = step_size(size, ratio);

            let mut covered = vec![false; n];
            for (i, chunk) in chunks.iter().enumerate() {
                let first = i * step;
                for (offset, word) in chunk.split_whitespace().enumerate() {
                    assert_eq!(word, format!("w{}", first + offset));
                    covered[first + offset] = true;
                }
            }
            assert!(covered.iter().all(|c| *c), "uncovered words for n={}", n);

            for pair in chunks.windows(2) {
                let a: Vec<&str> = pair[0].split_whitespace().collect();
                let b: Vec<&str> = pair[1].split_whitespace().collect();
                let shared = a.iter().filter(|w| b.contains(w)).count();
                assert_eq!(shared, (size - step).min(b.len()));
            }
        }
    }

    #[test]
    fn test_no_redundant_tail_chunk() {
        // Second window (750..1750) already reaches the end.
        let chunks = chunk_words(&numbered_words(1600), 1000, 0.25);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_step_never_zero() {
        assert_eq!(step_size(1, 0.5), 1);
        assert_eq!(step_size(4, 0.99), 1);
        assert_eq!(step_size(1000, 0.25), 750);
        let chunks = chunk_words(&numbered_words(5), 1, 0.5);
        assert_eq!(chunks, vec!["w0", "w1", "w2", "w3", "w4"]);
    }

    #[test]
    fn test_deterministic() {
        let text = numbered_words(333);
        assert_eq!(chunk_words(&text, 50, 0.3), chunk_words(&text, 50, 0.3));
    }
}
