use std::sync::{Arc, OnceLock};

use super::types::ProbeResult;

/// Single-assignment holder for a probe verdict. Clones share the same slot,
/// so handlers running on different threads still race for one write: the
/// first [`offer`](Self::offer) wins and every later one is ignored.
#[derive(Debug, Clone, Default)]
pub struct ResultSlot {
    inner: Arc<OnceLock<ProbeResult>>,
}

impl ResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `result` unless a verdict already exists. Returns `true` when
    /// this call won.
    pub fn offer(&self, result: ProbeResult) -> bool {
        self.inner.set(result).is_ok()
    }

    pub fn get(&self) -> Option<&ProbeResult> {
        self.inner.get()
    }

    pub fn is_settled(&self) -> bool {
        self.inner.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::probe::types::ProbeFailure;

    #[test]
    fn first_writer_wins() {
        let slot = ResultSlot::new();
        assert!(slot.offer(ProbeFailure::Timeout.into()));
        assert!(!slot.offer(ProbeResult::accepted()));
        assert_eq!(slot.get().map(|r| r.message.as_str()), Some("Connection timeout"));
    }

    #[test]
    fn concurrent_offers_settle_once() {
        let slot = ResultSlot::new();
        let handles: Vec<_> = (0..8)
            .map(|idx| {
                let slot = slot.clone();
                thread::spawn(move || {
                    let result = if idx % 2 == 0 {
                        ProbeResult::accepted()
                    } else {
                        ProbeFailure::Timeout.into()
                    };
                    slot.offer(result)
                })
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread"))
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(slot.is_settled());
    }
}
