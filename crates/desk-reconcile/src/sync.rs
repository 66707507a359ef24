use thiserror::Error;

#[derive(Debug, Error)]
/// Failure starting the downstream propagation step.
pub enum SyncError {
    #[error("sync trigger failed: {0}")]
    Trigger(String),
}

/// Fire-and-forget propagation of directory changes to downstream
/// consumers. Triggered at most once per batch; its failure is reported
/// but never rolls back already-applied changes.
pub trait SyncTrigger {
    fn trigger_sync(&self) -> Result<(), SyncError>;
}

#[derive(Debug, Default, Clone, Copy)]
/// Sync trigger for deployments without a downstream consumer.
pub struct NoopSync;

impl SyncTrigger for NoopSync {
    fn trigger_sync(&self) -> Result<(), SyncError> {
        Ok(())
    }
}
