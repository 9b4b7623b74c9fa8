//! Splitting long messages into size-limited chunks.
//!
//! Lengths are measured in characters, matching how chat services count.

/// Split `message` into chunks of at most `limit` characters.
///
/// Lines are packed greedily; a line that alone exceeds the limit is carved at
/// the last space in its first `limit` characters, unless that space falls
/// before `limit / 2`, in which case it is cut at exactly `limit`. Returned
/// chunks are trimmed and never empty.
pub fn segment(message: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);

    if char_len(message) <= limit {
        return finish(vec![message.to_string()]);
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in message.split_inclusive('\n') {
        let line_len = char_len(line);

        if current_len + line_len > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current.push_str(line);
            current_len = line_len;
        } else {
            current.push_str(line);
            current_len += line_len;
        }

        while current_len > limit {
            let (head, rest) = carve(&current, limit);
            chunks.push(head.to_string());
            current = rest.trim_start().to_string();
            current_len = char_len(&current);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    finish(chunks)
}

/// Split an over-long buffer into a head of at most `limit` chars and the rest.
fn carve(buffer: &str, limit: usize) -> (&str, &str) {
    let boundary = byte_offset(buffer, limit);
    let window = &buffer[..boundary];

    let split = match window.rfind(' ') {
        Some(space) if char_len(&window[..space]) >= limit / 2 => space,
        _ => boundary,
    };

    buffer.split_at(split)
}

fn finish(chunks: Vec<String>) -> Vec<String> {
    chunks
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the `n`th character, or the end of the string.
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}
