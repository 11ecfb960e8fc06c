use tokio::sync::mpsc;

use super::AuditEntry;

/// Handle for recording audit entries
///
/// This is cheaply cloneable and can be shared across tasks.
/// Entries are sent through an async channel to be written by the AuditWriter.
#[derive(Clone)]
pub struct AuditHandle {
    tx: mpsc::Sender<AuditEntry>,
}

impl AuditHandle {
    /// Create a new audit handle from a channel sender
    pub fn new(tx: mpsc::Sender<AuditEntry>) -> Self {
        Self { tx }
    }

    /// Record an entry asynchronously
    ///
    /// If the channel is full or closed, the error is logged but the
    /// caller is not blocked or failed. The booking outcome itself never
    /// depends on the durable record landing.
    pub async fn record(&self, entry: AuditEntry) {
        if let Err(e) = self.tx.send(entry).await {
            tracing::error!("Failed to record audit entry: {}", e);
        }
    }

    /// Record an entry synchronously (blocking)
    ///
    /// Use this in contexts where async isn't available.
    pub fn record_blocking(&self, entry: AuditEntry) {
        if let Err(e) = self.tx.blocking_send(entry) {
            tracing::error!("Failed to record audit entry: {}", e);
        }
    }

    /// Try to record an entry without blocking
    ///
    /// Returns true if the entry was sent successfully, false otherwise.
    pub fn try_record(&self, entry: AuditEntry) -> bool {
        match self.tx.try_send(entry) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to record audit entry: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditStatus;
    use chrono::NaiveDate;

    fn entry(window: &str) -> AuditEntry {
        AuditEntry::new(
            NaiveDate::from_ymd_opt(2025, 12, 9).unwrap(),
            window,
            AuditStatus::Success,
            Some("ok".to_string()),
            None,
        )
    }

    #[tokio::test]
    async fn test_record_entry() {
        let (tx, mut rx) = mpsc::channel(10);
        let handle = AuditHandle::new(tx);

        handle.record(entry("8-11")).await;

        let received = rx.recv().await.expect("Should receive entry");
        assert_eq!(received.window, "8-11");
    }

    #[tokio::test]
    async fn test_multiple_handles_same_channel() {
        let (tx, mut rx) = mpsc::channel(10);
        let handle1 = AuditHandle::new(tx.clone());
        let handle2 = AuditHandle::new(tx);

        handle1.record(entry("8-11")).await;
        handle2.record(entry("20-21")).await;

        assert_eq!(rx.recv().await.unwrap().window, "8-11");
        assert_eq!(rx.recv().await.unwrap().window, "20-21");
    }

    #[test]
    fn test_try_record_full_channel() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = AuditHandle::new(tx);

        assert!(handle.try_record(entry("8-11")));
        assert!(!handle.try_record(entry("11-14")));
    }

    #[tokio::test]
    async fn test_record_closed_channel() {
        let (tx, rx) = mpsc::channel::<AuditEntry>(10);
        let handle = AuditHandle::new(tx);

        drop(rx);

        // Should not panic, just log an error
        handle.record(entry("8-11")).await;
    }
}
