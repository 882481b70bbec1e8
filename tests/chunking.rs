use relaybot::dispatch::{split_for_platform, DEFAULT_CHUNK_SIZE, PLATFORM_MESSAGE_LIMIT};

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[test]
fn test_short_text_is_one_chunk() {
    let chunks = split_for_platform("hello", DEFAULT_CHUNK_SIZE);
    assert_eq!(chunks, vec!["hello".to_string()]);
}

#[test]
fn test_empty_text_has_no_chunks() {
    assert!(split_for_platform("", DEFAULT_CHUNK_SIZE).is_empty());
}

#[test]
fn test_text_exactly_at_limit_is_one_chunk() {
    let text = "a".repeat(10);
    assert_eq!(split_for_platform(&text, 10), vec![text]);
}

#[test]
fn test_cuts_after_last_newline_in_window() {
    let text = "first line\nsecond line\nthird";
    let chunks = split_for_platform(text, 15);

    assert_eq!(chunks[0], "first line\n");
    assert_eq!(chunks.concat(), text);
    assert!(chunks.iter().all(|c| char_len(c) <= 15));
}

#[test]
fn test_long_line_is_hard_split() {
    let text = "x".repeat(25);
    let chunks = split_for_platform(&text, 10);

    assert_eq!(chunks.len(), 3);
    assert_eq!(char_len(&chunks[0]), 10);
    assert_eq!(char_len(&chunks[1]), 10);
    assert_eq!(char_len(&chunks[2]), 5);
}

#[test]
fn test_multibyte_text_splits_on_char_boundaries() {
    let text = "héllo wörld 🚀🚀🚀 ünïcödé ".repeat(20);
    let chunks = split_for_platform(&text, 7);

    assert_eq!(chunks.concat(), text);
    assert!(chunks.iter().all(|c| char_len(c) <= 7 && !c.is_empty()));
}

#[test]
fn test_long_reply_fits_platform_limit() {
    let paragraph = format!("{}\n", "lorem ipsum dolor sit amet ".repeat(8));
    let text = paragraph.repeat(40);
    assert!(char_len(&text) > PLATFORM_MESSAGE_LIMIT);

    let chunks = split_for_platform(&text, DEFAULT_CHUNK_SIZE);

    assert!(chunks.len() > 1);
    assert_eq!(chunks.concat(), text);
    for chunk in &chunks {
        assert!(char_len(chunk) <= DEFAULT_CHUNK_SIZE);
        // Every cut lands on a paragraph boundary here.
        assert!(chunk.ends_with('\n'));
    }
}

#[test]
fn test_leading_newline_stays_with_following_text() {
    let text = format!("{}\n{}", "a".repeat(10), "b".repeat(12));
    let chunks = split_for_platform(&text, 10);

    assert_eq!(chunks, vec!["a".repeat(10), format!("\n{}", "b".repeat(9)), "bbb".to_string()]);
    assert!(chunks.iter().all(|c| !c.trim().is_empty()));
}

#[test]
fn test_blank_lines_are_never_a_chunk_of_their_own() {
    let text = format!("{}\n\n  \n{}\n{}", "x".repeat(8), "y".repeat(30), "z".repeat(4));
    let chunks = split_for_platform(&text, 8);

    assert_eq!(chunks.concat(), text);
    for chunk in &chunks {
        assert!(char_len(chunk) <= 8);
        assert!(!chunk.trim().is_empty(), "blank chunk in {:?}", chunks);
    }
}
