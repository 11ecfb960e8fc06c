//! Trigger scheduler for automatic reservation runs.
//!
//! A single periodic timer drives trigger checks. Each tick loads the
//! persisted settings and fires (a) one-shot custom schedules whose
//! execution date/hour/minute exactly matches now, and (b) at the daily
//! trigger time, the window sets scheduled for today and tomorrow. Every
//! trigger is consumed once it has been attempted, whatever the booking
//! outcome, so a failed run never fires again on its own.

mod config;

pub use config::SchedulerConfig;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::metrics;
use crate::orchestrator::ReservationRunner;
use crate::settings::{CustomSchedule, SettingsStore};

/// Periodic trigger check that starts reservation runs.
///
/// Cloning shares the underlying state; all clones observe the same
/// running flag and re-entrancy guard.
#[derive(Clone)]
pub struct TriggerScheduler {
    config: SchedulerConfig,
    settings: Arc<dyn SettingsStore>,
    runner: Arc<dyn ReservationRunner>,
    running: Arc<AtomicBool>,
    tick_in_progress: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl TriggerScheduler {
    pub fn new(
        config: SchedulerConfig,
        settings: Arc<dyn SettingsStore>,
        runner: Arc<dyn ReservationRunner>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            settings,
            runner,
            running: Arc::new(AtomicBool::new(false)),
            tick_in_progress: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Start the tick loop (spawns a background task).
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Trigger scheduler already running");
            return;
        }

        info!(
            interval_secs = self.config.tick_interval_secs,
            daily_hour = self.config.daily_hour,
            daily_minute = self.config.daily_minute,
            "Starting trigger scheduler"
        );
        self.spawn_tick_loop();
    }

    /// Stop the tick loop gracefully.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Trigger scheduler not running");
            return;
        }

        info!("Stopping trigger scheduler");
        let _ = self.shutdown_tx.send(());

        // Give an in-flight tick a moment to finish
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    /// Stop the current loop and start a fresh one.
    pub async fn restart(&self) {
        self.stop().await;
        self.start();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    fn spawn_tick_loop(&self) {
        let scheduler = self.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Trigger scheduler loop started");
            let mut ticker =
                tokio::time::interval(Duration::from_secs(scheduler.config.tick_interval_secs));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Trigger scheduler loop received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !scheduler.running.load(Ordering::Relaxed) {
                            break;
                        }
                        scheduler.tick_at(Local::now().naive_local()).await;
                    }
                }
            }
            info!("Trigger scheduler loop stopped");
        });
    }

    /// Run one trigger check for the given local time.
    ///
    /// A tick must not start while a previous tick's run is still in
    /// flight; a duplicate trigger under slow network is worse than a
    /// late one.
    pub async fn tick_at(&self, now: NaiveDateTime) {
        if self
            .tick_in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Skipping tick, previous tick still in progress");
            metrics::SCHEDULER_TICKS.with_label_values(&["skipped"]).inc();
            return;
        }

        self.process_tick(now).await;
        self.tick_in_progress.store(false, Ordering::SeqCst);
    }

    async fn process_tick(&self, now: NaiveDateTime) {
        let settings = match self.settings.load() {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load settings in scheduler tick: {}", e);
                metrics::SCHEDULER_TICKS.with_label_values(&["failed"]).inc();
                return;
            }
        };

        let today = now.date();
        let mut triggered = false;

        // One-shot custom schedules matching this exact minute.
        let due: Vec<CustomSchedule> = settings
            .custom_schedules
            .iter()
            .filter(|s| {
                !s.executed
                    && s.execution_date == today
                    && s.execution_hour == now.hour()
                    && s.execution_minute == now.minute()
            })
            .cloned()
            .collect();

        for schedule in due {
            triggered = true;
            let run_id = format!("custom-{}", Uuid::new_v4());
            info!(
                schedule_id = %schedule.id,
                reserve_date = %schedule.reserve_date,
                run_id,
                "Running custom schedule"
            );

            if let Err(e) = self
                .runner
                .run(&schedule.windows, &run_id, Some(schedule.reserve_date))
                .await
            {
                error!(schedule_id = %schedule.id, "Custom schedule run failed: {}", e);
            }

            // Consumed whatever the outcome; only the triggering is
            // idempotent, not the booking result.
            self.mark_custom_executed(&schedule.id);
        }

        // Daily trigger for today's and tomorrow's scheduled window sets.
        if now.hour() == self.config.daily_hour && now.minute() == self.config.daily_minute {
            for day in [Some(today), today.succ_opt()].into_iter().flatten() {
                let Some(windows) = settings.scheduled_days.get(&day).cloned() else {
                    continue;
                };
                if windows.is_empty() {
                    continue;
                }

                triggered = true;
                let run_id = format!("daily-{}", Uuid::new_v4());
                info!(date = %day, run_id, "Running daily schedule");

                if let Err(e) = self.runner.run(&windows, &run_id, Some(day)).await {
                    error!(date = %day, "Daily schedule run failed: {}", e);
                }

                self.remove_scheduled_day(day);
            }
        }

        let outcome = if triggered { "triggered" } else { "idle" };
        metrics::SCHEDULER_TICKS.with_label_values(&[outcome]).inc();
    }

    /// Reload, flip the executed flag and persist, so concurrent settings
    /// edits made during the run are not clobbered.
    fn mark_custom_executed(&self, id: &str) {
        let mut settings = match self.settings.load() {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to reload settings to consume schedule {}: {}", id, e);
                return;
            }
        };

        let Some(schedule) = settings.custom_schedules.iter_mut().find(|s| s.id == id) else {
            // Deleted while the run was in flight.
            return;
        };
        schedule.executed = true;

        if let Err(e) = self.settings.save(&settings) {
            error!("Failed to persist consumed schedule {}: {}", id, e);
        }
    }

    fn remove_scheduled_day(&self, day: NaiveDate) {
        let mut settings = match self.settings.load() {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to reload settings to clear day {}: {}", day, e);
                return;
            }
        };

        if settings.scheduled_days.remove(&day).is_none() {
            return;
        }

        if let Err(e) = self.settings.save(&settings) {
            error!("Failed to persist cleared day {}: {}", day, e);
        }
    }
}
