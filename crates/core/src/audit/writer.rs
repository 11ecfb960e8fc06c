use std::sync::Arc;

use tokio::sync::mpsc;

use super::{AuditEntry, AuditHandle, AuditStore};

/// Background task that receives audit entries and writes them to storage
pub struct AuditWriter {
    rx: mpsc::Receiver<AuditEntry>,
    store: Arc<dyn AuditStore>,
}

impl AuditWriter {
    /// Create a new audit writer
    pub fn new(rx: mpsc::Receiver<AuditEntry>, store: Arc<dyn AuditStore>) -> Self {
        Self { rx, store }
    }

    /// Run the writer, consuming entries until the channel is closed
    ///
    /// This should be spawned as a background task. A failed insert is
    /// logged and the writer keeps going; the in-memory run result was
    /// already returned to the caller.
    pub async fn run(mut self) {
        tracing::info!("Audit writer started");

        while let Some(entry) = self.rx.recv().await {
            if let Err(e) = self.store.append(&entry) {
                tracing::error!("Failed to write audit entry: {}", e);
            }
        }

        tracing::info!("Audit writer shutting down");
    }
}

/// Create a complete audit system
///
/// Returns:
/// - `AuditHandle` - for recording entries (clone this to share across tasks)
/// - `AuditWriter` - spawn this as a background task with `tokio::spawn(writer.run())`
///
/// # Arguments
/// * `store` - The audit store to write entries to
/// * `buffer_size` - Size of the channel buffer (sends block when full)
pub fn create_audit_system(
    store: Arc<dyn AuditStore>,
    buffer_size: usize,
) -> (AuditHandle, AuditWriter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    let handle = AuditHandle::new(tx);
    let writer = AuditWriter::new(rx, store);
    (handle, writer)
}
