//! Quiet-hours ringer scheduler.
//!
//! Each tick reads the current ringer mode, asks [`decide`] what to do and
//! writes only when the decision calls for a change. Failed writes are logged
//! and skipped; the next tick decides afresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::ScheduleConfig;
use crate::schedule::{SchedulerAction, SoundMode, decide};
use crate::traits::{Clock, Ringer};

pub struct QuietHoursScheduler {
    config: ScheduleConfig,
    ringer: Arc<dyn Ringer>,
    clock: Arc<dyn Clock>,
    available: bool,
}

impl QuietHoursScheduler {
    pub fn new(config: ScheduleConfig, ringer: Arc<dyn Ringer>, clock: Arc<dyn Clock>) -> Self {
        if config.is_degenerate() {
            warn!(
                "Quiet window {0}-{0} has no length and is treated as quiet all day",
                config.start_hour
            );
        }
        Self {
            config,
            ringer,
            clock,
            available: true,
        }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ScheduleConfig) {
        if config.is_degenerate() {
            warn!(
                "Quiet window {0}-{0} has no length and is treated as quiet all day",
                config.start_hour
            );
        }
        info!(
            "Schedule {}: quiet {}:00-{}:00",
            if config.enabled { "enabled" } else { "disabled" },
            config.start_hour,
            config.end_hour
        );
        self.config = config;
    }

    /// False once the ringer reported that no audio service exists.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Ringer mode as the platform reports it, if it can be read.
    pub fn ringer_mode(&self) -> Option<SoundMode> {
        self.ringer.mode().ok()
    }

    /// Run one check and return the action that was applied.
    ///
    /// Returns `NoOp` when nothing needed changing, when the ringer write failed,
    /// and from then on when the audio service turned out to be missing.
    pub fn tick(&mut self) -> SchedulerAction {
        if !self.available || !self.config.enabled {
            return SchedulerAction::NoOp;
        }

        let current = match self.ringer.mode() {
            Ok(mode) => mode,
            Err(e) if e.is_unavailable() => {
                warn!("Disabling quiet-hours scheduler: {}", e);
                self.available = false;
                return SchedulerAction::NoOp;
            }
            Err(e) => {
                warn!("Failed to read ringer mode: {}", e);
                return SchedulerAction::NoOp;
            }
        };

        let hour = self.clock.current_hour();
        let action = decide(&self.config, hour, current);
        let SchedulerAction::SetMode(mode) = action else {
            debug!("Ringer already {:?} at {}:00", current, hour);
            return SchedulerAction::NoOp;
        };

        match self.ringer.set_mode(mode) {
            Ok(()) => {
                info!("Ringer {:?} -> {:?} at {}:00", current, mode, hour);
                action
            }
            Err(e) if e.is_unavailable() => {
                warn!("Disabling quiet-hours scheduler: {}", e);
                self.available = false;
                SchedulerAction::NoOp
            }
            Err(e) => {
                warn!("Failed to set ringer to {:?}: {}", mode, e);
                SchedulerAction::NoOp
            }
        }
    }

    /// Tick on a fixed interval until `shutdown` flips to `true`.
    pub async fn run(mut self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!("Quiet-hours scheduler running every {}s", interval.as_secs());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Quiet-hours scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::traits::{MockClock, SimulatedRinger, UnavailableRinger};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 17)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn night_schedule() -> ScheduleConfig {
        ScheduleConfig {
            enabled: true,
            start_hour: 22,
            end_hour: 7,
        }
    }

    fn scheduler(hour: u32) -> (QuietHoursScheduler, SimulatedRinger, MockClock) {
        let ringer = SimulatedRinger::default();
        let clock = MockClock::new(at(hour));
        let scheduler = QuietHoursScheduler::new(
            night_schedule(),
            Arc::new(ringer.clone()),
            Arc::new(clock.clone()),
        );
        (scheduler, ringer, clock)
    }

    #[test]
    fn test_tick_enters_quiet_window() {
        let (mut s, ringer, _) = scheduler(23);
        assert_eq!(s.tick(), SchedulerAction::SetMode(SoundMode::Vibrate));
        assert_eq!(ringer.mode(), Ok(SoundMode::Vibrate));
    }

    #[test]
    fn test_repeated_ticks_write_once() {
        let (mut s, ringer, _) = scheduler(23);
        s.tick();
        for _ in 0..10 {
            assert_eq!(s.tick(), SchedulerAction::NoOp);
        }
        assert_eq!(ringer.writes(), vec![SoundMode::Vibrate]);
    }

    #[test]
    fn test_user_override_is_respected_inside_window() {
        let (mut s, ringer, _) = scheduler(23);
        s.tick();
        ringer.set_by_user(SoundMode::Silent);
        assert_eq!(s.tick(), SchedulerAction::NoOp);
        assert_eq!(ringer.mode(), Ok(SoundMode::Silent));
    }

    #[test]
    fn test_disabled_schedule_does_not_touch_ringer() {
        let (mut s, ringer, _) = scheduler(23);
        s.set_config(ScheduleConfig {
            enabled: false,
            ..night_schedule()
        });
        assert_eq!(s.tick(), SchedulerAction::NoOp);
        assert_eq!(ringer.write_count(), 0);
    }

    #[test]
    fn test_failed_write_is_skipped_then_retried_next_tick() {
        let (mut s, ringer, _) = scheduler(23);
        ringer.set_failing(true);
        assert_eq!(s.tick(), SchedulerAction::NoOp);
        assert_eq!(ringer.mode(), Ok(SoundMode::Normal));
        assert!(s.is_available());

        ringer.set_failing(false);
        assert_eq!(s.tick(), SchedulerAction::SetMode(SoundMode::Vibrate));
    }

    #[test]
    fn test_unavailable_ringer_disables_scheduler() {
        let mut s = QuietHoursScheduler::new(
            night_schedule(),
            Arc::new(UnavailableRinger),
            Arc::new(MockClock::new(at(23))),
        );
        assert_eq!(s.tick(), SchedulerAction::NoOp);
        assert!(!s.is_available());
        assert_eq!(s.tick(), SchedulerAction::NoOp);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (s, ringer, _) = scheduler(23);
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(s.run(Duration::from_millis(10), rx));
        tokio::time::sleep(Duration::from_millis(60)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(ringer.writes(), vec![SoundMode::Vibrate]);
    }
}
