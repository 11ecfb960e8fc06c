use std::sync::Arc;

use seatgrab_core::{
    AuditHandle, AuditStore, ProgressBroadcaster, ReservationRunner, SettingsStore,
    TriggerScheduler,
};

/// Shared application state
pub struct AppState {
    settings: Arc<dyn SettingsStore>,
    audit_store: Arc<dyn AuditStore>,
    audit: AuditHandle,
    runner: Arc<dyn ReservationRunner>,
    scheduler: TriggerScheduler,
    progress: ProgressBroadcaster,
}

impl AppState {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        audit_store: Arc<dyn AuditStore>,
        audit: AuditHandle,
        runner: Arc<dyn ReservationRunner>,
        scheduler: TriggerScheduler,
        progress: ProgressBroadcaster,
    ) -> Self {
        Self {
            settings,
            audit_store,
            audit,
            runner,
            scheduler,
            progress,
        }
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn audit_store(&self) -> &dyn AuditStore {
        self.audit_store.as_ref()
    }

    pub fn audit(&self) -> &AuditHandle {
        &self.audit
    }

    pub fn runner(&self) -> &dyn ReservationRunner {
        self.runner.as_ref()
    }

    pub fn scheduler(&self) -> &TriggerScheduler {
        &self.scheduler
    }

    pub fn progress(&self) -> &ProgressBroadcaster {
        &self.progress
    }
}
