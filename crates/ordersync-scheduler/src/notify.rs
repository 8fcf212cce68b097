//! Notification building and delivery — chunk identifiers, format, send in order.

use std::time::Duration;

use ordersync_core::error::Result;
use ordersync_core::traits::Notifier;
use ordersync_core::types::{CHUNK_SIZE, MessageChunk};

/// Format one chat message: `"{label} ({first}-{last} of {total}):\n{ids}"`.
pub fn format_chunk(label: &str, first: usize, last: usize, total: usize, ids: &[String]) -> String {
    format!("{label} ({first}-{last} of {total}):\n{}", ids.join(", "))
}

/// Split identifiers into ordered groups of at most [`CHUNK_SIZE`].
pub fn chunk_messages(label: &str, ids: &[String]) -> Vec<MessageChunk> {
    let total = ids.len();
    ids.chunks(CHUNK_SIZE)
        .enumerate()
        .map(|(i, group)| {
            let first = i * CHUNK_SIZE + 1;
            let last = i * CHUNK_SIZE + group.len();
            MessageChunk {
                first,
                last,
                total,
                ids: group.to_vec(),
                text: format_chunk(label, first, last, total, group),
            }
        })
        .collect()
}

/// Send chunks one at a time, pausing `delay` after each send.
/// The first failure stops delivery; nothing after it is sent.
pub async fn deliver(notifier: &dyn Notifier, chunks: &[MessageChunk], delay: Duration) -> Result<usize> {
    let mut sent = 0;
    for chunk in chunks {
        notifier.send(&chunk.text).await?;
        sent += 1;
        tracing::info!(
            "✅ Sent {}-{} of {} via {}",
            chunk.first,
            chunk.last,
            chunk.total,
            notifier.name()
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockNotifier;

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("0000{i:05}")).collect()
    }

    #[test]
    fn test_twenty_five_ids_make_three_chunks() {
        let chunks = chunk_messages("💰 Processing orders > $500 from yesterday", &ids(25));
        assert_eq!(chunks.len(), 3);
        let ranges: Vec<(usize, usize)> = chunks.iter().map(|c| (c.first, c.last)).collect();
        assert_eq!(ranges, vec![(1, 10), (11, 20), (21, 25)]);
        assert!(chunks[2].text.starts_with("💰 Processing orders > $500 from yesterday (21-25 of 25):\n"));
        assert!(chunks[2].text.ends_with("000000024, 000000025"));
    }

    #[test]
    fn test_chunk_sizes_and_order() {
        for n in [0usize, 1, 9, 10, 11, 20, 99, 100, 101] {
            let list = ids(n);
            let chunks = chunk_messages("x", &list);
            assert_eq!(chunks.len(), n.div_ceil(CHUNK_SIZE), "n = {n}");
            assert!(chunks.iter().all(|c| !c.ids.is_empty() && c.ids.len() <= CHUNK_SIZE));
            let joined: Vec<String> = chunks.into_iter().flat_map(|c| c.ids).collect();
            assert_eq!(joined, list);
        }
    }

    #[test]
    fn test_format_chunk() {
        let text = format_chunk("📦 Holded orders within last 30 days", 1, 2, 2, &["A1".into(), "B2".into()]);
        assert_eq!(text, "📦 Holded orders within last 30 days (1-2 of 2):\nA1, B2");
    }

    #[tokio::test]
    async fn test_deliver_stops_at_first_failure() {
        let notifier = MockNotifier::failing_on(2);
        let chunks = chunk_messages("x", &ids(35));
        let result = deliver(&notifier, &chunks, Duration::ZERO).await;
        assert!(result.is_err());
        assert_eq!(notifier.attempts(), 2);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deliver_waits_between_messages() {
        let notifier = MockNotifier::new();
        let chunks = chunk_messages("x", &ids(25));
        let started = tokio::time::Instant::now();
        let sent = deliver(&notifier, &chunks, Duration::from_millis(1000)).await.unwrap();
        assert_eq!(sent, 3);
        assert!(started.elapsed() >= Duration::from_millis(3000));
    }
}
