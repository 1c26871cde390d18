//! # Request Id Sequence
//!
//! Process-wide source of outbound request ids.

use std::sync::atomic::{AtomicU64, Ordering};

static LAST_REQUEST_ID: AtomicU64 = AtomicU64::new(0);

/// Next outbound request id. Strictly increasing within the process, starting at 1.
pub fn next_request_id() -> u64 {
    LAST_REQUEST_ID.fetch_add(1, Ordering::Relaxed) + 1
}

/// Last id handed out, or 0 if none.
pub fn last_request_id() -> u64 {
    LAST_REQUEST_ID.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase() {
        let first = next_request_id();
        let second = next_request_id();
        let third = next_request_id();
        assert!(first >= 1);
        assert!(second > first);
        assert!(third > second);
        assert!(last_request_id() >= third);
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..250).map(|_| next_request_id()).collect::<Vec<_>>()))
            .collect();

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }
}
