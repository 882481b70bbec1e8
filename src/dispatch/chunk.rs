/// Hard per-message limit of the target platform, in characters.
pub const PLATFORM_MESSAGE_LIMIT: usize = 2000;

/// Default chunk size; leaves headroom below the platform limit.
pub const DEFAULT_CHUNK_SIZE: usize = 1900;

/// Split `text` into ordered chunks of at most `limit` characters.
///
/// A cut is placed right after the last newline inside the window, so the
/// newline stays at the end of the earlier chunk. A line longer than the
/// window is cut at the window edge, as is a window holding nothing but
/// whitespace before its last newline. Concatenating the chunks gives back
/// `text` exactly.
pub fn split_for_platform(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        // Byte offset just past the `limit`-th character, if the rest is longer.
        let window_end = match rest.char_indices().nth(limit) {
            Some((offset, _)) => offset,
            None => {
                chunks.push(rest.to_string());
                break;
            }
        };

        // Never cut off a blank chunk.
        let cut = match rest[..window_end].rfind('\n') {
            Some(newline) if !rest[..newline].trim().is_empty() => newline + 1,
            _ => window_end,
        };

        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }

    chunks
}
