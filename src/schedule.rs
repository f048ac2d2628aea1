use std::num::{IntErrorKind, ParseIntError};

use serde::Serialize;

use crate::config::ScheduleConfig;
use crate::error::ValidationError;

/// Device ringer mode as exposed by the platform audio service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundMode {
    Normal,
    Vibrate,
    /// Reported by the platform but never written or acted on by the scheduler.
    Silent,
}

/// What the scheduler wants done to the ringer on this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerAction {
    SetMode(SoundMode),
    NoOp,
}

/// Check whether `hour` falls inside the quiet window `[start, end)`.
///
/// When `start >= end` the window wraps past midnight. `start == end` takes the
/// wrapping branch and is therefore quiet around the clock.
pub fn is_quiet_hour(start: u32, end: u32, hour: u32) -> bool {
    if start < end {
        (start..end).contains(&hour)
    } else {
        hour >= start || hour < end
    }
}

/// Decide the ringer action for the current hour.
///
/// Only the two boundary cases produce a write: entering the window while the
/// ringer is `Normal`, and leaving it while the ringer is `Vibrate`. Anything the
/// user set by hand in between is left alone.
pub fn decide(config: &ScheduleConfig, hour: u32, current: SoundMode) -> SchedulerAction {
    if !config.enabled {
        return SchedulerAction::NoOp;
    }

    let quiet = is_quiet_hour(config.start_hour, config.end_hour, hour);
    match (quiet, current) {
        (true, SoundMode::Normal) => SchedulerAction::SetMode(SoundMode::Vibrate),
        (false, SoundMode::Vibrate) => SchedulerAction::SetMode(SoundMode::Normal),
        _ => SchedulerAction::NoOp,
    }
}

/// Parse one hour field as typed into the settings form.
pub fn parse_hour(input: &str) -> Result<u32, ValidationError> {
    let trimmed = input.trim();
    let value: i64 = trimmed.parse().map_err(|e: ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            ValidationError::OutOfRange(trimmed.to_string())
        }
        _ => ValidationError::NotANumber(trimmed.to_string()),
    })?;
    if !(0..24).contains(&value) {
        return Err(ValidationError::OutOfRange(trimmed.to_string()));
    }
    Ok(value as u32)
}

impl ScheduleConfig {
    /// Build the schedule a settings save would produce from the raw form fields.
    ///
    /// Both hour fields must validate.
    pub fn from_form(start: &str, end: &str, enabled: bool) -> Result<Self, ValidationError> {
        let start_hour = parse_hour(start)?;
        let end_hour = parse_hour(end)?;
        Ok(Self {
            enabled,
            start_hour,
            end_hour,
        })
    }

    /// Whether the configured window is the ambiguous `start == end` case.
    pub fn is_degenerate(&self) -> bool {
        self.start_hour == self.end_hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(start: u32, end: u32) -> ScheduleConfig {
        ScheduleConfig {
            enabled: true,
            start_hour: start,
            end_hour: end,
        }
    }

    // ==================== Quiet Window Tests ====================

    #[test]
    fn test_overnight_window_examples() {
        assert!(is_quiet_hour(22, 7, 23));
        assert!(is_quiet_hour(22, 7, 6));
        assert!(!is_quiet_hour(22, 7, 12));
    }

    #[test]
    fn test_overnight_window_boundaries() {
        assert!(is_quiet_hour(22, 7, 22));
        assert!(is_quiet_hour(22, 7, 0));
        assert!(!is_quiet_hour(22, 7, 7));
        assert!(!is_quiet_hour(22, 7, 21));
    }

    #[test]
    fn test_daytime_window_is_half_open() {
        assert!(is_quiet_hour(9, 17, 9));
        assert!(is_quiet_hour(9, 17, 16));
        assert!(!is_quiet_hour(9, 17, 17));
        assert!(!is_quiet_hour(9, 17, 8));
    }

    #[test]
    fn test_degenerate_window_is_always_quiet() {
        for hour in 0..24 {
            assert!(is_quiet_hour(5, 5, hour), "hour {hour} should be quiet");
        }
        assert!(schedule(5, 5).is_degenerate());
        assert!(!schedule(22, 7).is_degenerate());
    }

    // ==================== Decision Tests ====================

    #[test]
    fn test_disabled_schedule_never_acts() {
        let config = ScheduleConfig {
            enabled: false,
            ..schedule(22, 7)
        };
        assert_eq!(decide(&config, 23, SoundMode::Normal), SchedulerAction::NoOp);
        assert_eq!(decide(&config, 12, SoundMode::Vibrate), SchedulerAction::NoOp);
    }

    #[test]
    fn test_entering_window_sets_vibrate() {
        assert_eq!(
            decide(&schedule(22, 7), 23, SoundMode::Normal),
            SchedulerAction::SetMode(SoundMode::Vibrate)
        );
    }

    #[test]
    fn test_leaving_window_restores_normal() {
        assert_eq!(
            decide(&schedule(22, 7), 7, SoundMode::Vibrate),
            SchedulerAction::SetMode(SoundMode::Normal)
        );
    }

    #[test]
    fn test_matching_mode_is_noop() {
        assert_eq!(
            decide(&schedule(22, 7), 23, SoundMode::Vibrate),
            SchedulerAction::NoOp
        );
        assert_eq!(
            decide(&schedule(22, 7), 12, SoundMode::Normal),
            SchedulerAction::NoOp
        );
    }

    #[test]
    fn test_silent_is_never_touched() {
        assert_eq!(
            decide(&schedule(22, 7), 23, SoundMode::Silent),
            SchedulerAction::NoOp
        );
        assert_eq!(
            decide(&schedule(22, 7), 12, SoundMode::Silent),
            SchedulerAction::NoOp
        );
    }

    // ==================== Input Validation Tests ====================

    #[test]
    fn test_parse_hour_accepts_valid_hours() {
        assert_eq!(parse_hour("0"), Ok(0));
        assert_eq!(parse_hour(" 23 "), Ok(23));
        assert_eq!(parse_hour("7"), Ok(7));
    }

    #[test]
    fn test_parse_hour_rejects_non_numbers() {
        assert_eq!(
            parse_hour("abc"),
            Err(ValidationError::NotANumber("abc".to_string()))
        );
        assert_eq!(
            parse_hour("7.5"),
            Err(ValidationError::NotANumber("7.5".to_string()))
        );
        assert_eq!(parse_hour(""), Err(ValidationError::NotANumber(String::new())));
    }

    #[test]
    fn test_parse_hour_rejects_out_of_range() {
        assert_eq!(parse_hour("24"), Err(ValidationError::OutOfRange("24".into())));
        assert_eq!(parse_hour("-1"), Err(ValidationError::OutOfRange("-1".into())));
    }

    #[test]
    fn test_parse_hour_overflow_is_out_of_range() {
        let huge = "99999999999999999999";
        assert_eq!(parse_hour(huge), Err(ValidationError::OutOfRange(huge.into())));
        assert_eq!(
            parse_hour("-99999999999999999999"),
            Err(ValidationError::OutOfRange("-99999999999999999999".into()))
        );
    }

    #[test]
    fn test_from_form_rejects_either_field() {
        assert_eq!(
            ScheduleConfig::from_form("abc", "6", false),
            Err(ValidationError::NotANumber("abc".into()))
        );
        assert_eq!(
            ScheduleConfig::from_form("21", "30", true),
            Err(ValidationError::OutOfRange("30".into()))
        );
    }

    #[test]
    fn test_from_form_applies_all_fields() {
        let edited = ScheduleConfig::from_form("21", "6", false).unwrap();
        assert_eq!(
            edited,
            ScheduleConfig {
                enabled: false,
                start_hour: 21,
                end_hour: 6,
            }
        );
    }

    // ==================== Property-Based Tests ====================

    #[cfg(test)]
    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn plain_window_matches_range(start in 0u32..24, end in 0u32..24, hour in 0u32..24) {
                prop_assume!(start < end);
                prop_assert_eq!(is_quiet_hour(start, end, hour), start <= hour && hour < end);
            }

            #[test]
            fn wrapped_window_matches_union(start in 0u32..24, end in 0u32..24, hour in 0u32..24) {
                prop_assume!(start >= end);
                prop_assert_eq!(is_quiet_hour(start, end, hour), hour >= start || hour < end);
            }

            #[test]
            fn decision_is_idempotent(start in 0u32..24, end in 0u32..24, hour in 0u32..24) {
                let config = ScheduleConfig { enabled: true, start_hour: start, end_hour: end };
                let mut mode = SoundMode::Normal;
                if let SchedulerAction::SetMode(next) = decide(&config, hour, mode) {
                    mode = next;
                }
                for _ in 0..5 {
                    prop_assert_eq!(decide(&config, hour, mode), SchedulerAction::NoOp);
                }
            }

            #[test]
            fn decision_only_writes_normal_or_vibrate(
                start in 0u32..24,
                end in 0u32..24,
                hour in 0u32..24,
                mode_index in 0usize..3,
            ) {
                let config = ScheduleConfig { enabled: true, start_hour: start, end_hour: end };
                let mode = [SoundMode::Normal, SoundMode::Vibrate, SoundMode::Silent][mode_index];
                if let SchedulerAction::SetMode(next) = decide(&config, hour, mode) {
                    prop_assert_ne!(next, SoundMode::Silent);
                    prop_assert_ne!(next, mode);
                }
            }
        }
    }
}
