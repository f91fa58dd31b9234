//! Chunked message delivery.
//!
//! Discord caps a message at 2000 characters; answers are sent in fixed
//! chunks well under that. A failed chunk is retried at the same offset, so
//! the receiver never sees a gap, and the whole delivery is abandoned once
//! the retry budget runs out.

use serenity::model::id::ChannelId;
use tracing::warn;

use crate::error::DiscordError;

/// Maximum characters per outgoing message chunk.
pub const CHUNK_MAX: usize = 1500;

/// Send failures tolerated across one chunked delivery.
pub const SEND_RETRY_BUDGET: u32 = 3;

/// Split `text` into consecutive chunks of at most `limit` characters.
///
/// Chunks concatenate back to exactly `text`. Empty input yields no chunks.
pub fn split_chunks(text: &str, limit: usize) -> Vec<String> {
    assert!(limit > 0, "chunk limit must be positive");

    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(limit)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(cut);
        chunks.push(head.to_string());
        rest = tail;
    }
    chunks
}

/// Send `text` to `channel_id` in [`CHUNK_MAX`]-char chunks, in order.
///
/// Every failure burns one unit of [`SEND_RETRY_BUDGET`] and retries the
/// same chunk; when the budget is gone the delivery stops where it is.
pub async fn send_chunked(
    http: &serenity::http::Http,
    channel_id: ChannelId,
    text: &str,
) -> Result<(), DiscordError> {
    let chunks = split_chunks(text, CHUNK_MAX);
    let total = chunks.len();
    let mut budget = SEND_RETRY_BUDGET;
    let mut sent = 0;

    while sent < total {
        match channel_id.say(http, &chunks[sent]).await {
            Ok(_) => sent += 1,
            Err(e) => {
                budget -= 1;
                warn!(error = %e, chunk = sent + 1, total, budget, "chunk send failed");
                if budget == 0 {
                    return Err(DiscordError::Delivery { sent, total });
                }
            }
        }
    }

    Ok(())
}
