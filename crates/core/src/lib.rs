pub mod audit;
pub mod config;
pub mod dates;
pub mod metrics;
pub mod orchestrator;
pub mod portal;
pub mod progress;
pub mod scheduler;
pub mod seats;
pub mod settings;
pub mod testing;
pub mod windows;

pub use audit::{
    create_audit_system, AuditEntry, AuditError, AuditHandle, AuditStatus, AuditStore,
    AuditWriter, SqliteAuditStore,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    PortalConfig, ServerConfig,
};
pub use dates::{to_jalali, DateMode, ReservationDate};
pub use orchestrator::{
    AttemptResult, BookingOrchestrator, OrchestratorError, ReservationRunner, RunReport,
    TaskError,
};
pub use portal::{
    parse_reservation_form, MarkupError, PortalError, PortalGateway, ReservationForm,
    ReservationSubmission, SamanGateway, SubmitResponse,
};
pub use progress::{ProgressBroadcaster, ProgressEvent, StepStatus, WindowSummary};
pub use scheduler::{SchedulerConfig, TriggerScheduler};
pub use seats::{select_seat, NoSeatsAvailable, Seat};
pub use settings::{
    AdvancedUpdate, BookingSettings, Credentials, CustomSchedule, SelectionUpdate, SettingsError,
    SettingsStore, SqliteSettingsStore,
};
pub use windows::{TimeWindow, UnknownWindow};
