use relaybot::platform::console::{parse_line, CONSOLE_CHANNEL, CONSOLE_USER};

#[test]
fn test_plain_text_comes_from_console_user() {
    let event = parse_line("hello there  ").unwrap();
    assert_eq!(event.sender_id, CONSOLE_USER);
    assert_eq!(event.channel_id, CONSOLE_CHANNEL);
    assert_eq!(event.content, "hello there");
    assert!(!event.sender_is_bot);
}

#[test]
fn test_blank_line_is_skipped() {
    assert!(parse_line("").is_none());
    assert!(parse_line("   \t").is_none());
}

#[test]
fn test_json_line_carries_event_fields() {
    let event = parse_line(
        r#"{"sender_id": "42", "channel_id": "general", "content": "hi", "mentions_bot": true}"#,
    )
    .unwrap();

    assert_eq!(event.sender_id, "42");
    assert_eq!(event.channel_id, "general");
    assert_eq!(event.content, "hi");
    assert!(event.mentions_bot);
    assert!(!event.sender_is_bot);
}

#[test]
fn test_json_line_defaults_channel() {
    let event = parse_line(r#"{"sender_id": "7", "content": "yo", "sender_is_bot": true}"#).unwrap();
    assert_eq!(event.channel_id, CONSOLE_CHANNEL);
    assert!(event.sender_is_bot);
}

#[test]
fn test_malformed_json_is_plain_text() {
    let event = parse_line("{not really json}").unwrap();
    assert_eq!(event.sender_id, CONSOLE_USER);
    assert_eq!(event.content, "{not really json}");
}
