//! Progress reporting and auto-advance detection

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default cap on the lead before the end of a track at which auto-advance fires
pub const DEFAULT_AUTO_ADVANCE_LEAD_CAP: Duration = Duration::from_secs(2);

/// One progress reading of the active channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSample {
    /// Fill ratio in [0, 1]
    pub ratio: f32,
    pub elapsed_label: String,
    pub duration_label: String,
}

/// Format a time as `m:ss`
///
/// Minutes are not wrapped into hours; `None` renders as `0:00`.
pub fn format_time(time: Option<Duration>) -> String {
    let Some(time) = time else {
        return "0:00".to_string();
    };
    let total = time.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

/// `position / duration` clamped to [0, 1]; 0 while the duration is unknown
pub fn fill_ratio(position: Duration, duration: Option<Duration>) -> f32 {
    match duration {
        Some(duration) if !duration.is_zero() => {
            (position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0) as f32
        }
        _ => 0.0,
    }
}

/// Auto-advance lead for a crossfade duration: `min(crossfade, cap)`
pub fn auto_advance_lead(crossfade: Duration, cap: Duration) -> Duration {
    crossfade.min(cap)
}

/// Watches the active channel's position
///
/// The auto-advance watch fires at most once per track: it disarms when it
/// fires and is re-armed only when a new track becomes active.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    lead: Duration,
    armed: bool,
}

impl ProgressReporter {
    /// Reporter that fires auto-advance `lead` before the end of a track
    pub fn new(lead: Duration) -> Self {
        Self { lead, armed: true }
    }

    pub fn lead(&self) -> Duration {
        self.lead
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Re-arm the watch for a newly active track
    pub fn rearm(&mut self) {
        self.armed = true;
    }

    /// Disarm without firing (the track is already being left)
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Read a sample
    pub fn sample(&self, position: Duration, duration: Option<Duration>) -> ProgressSample {
        ProgressSample {
            ratio: fill_ratio(position, duration),
            elapsed_label: format_time(Some(position)),
            duration_label: format_time(duration),
        }
    }

    /// Check the auto-advance window
    ///
    /// Returns true exactly once per arming, when the time remaining drops
    /// to the lead or below. Unknown durations never fire.
    pub fn check_auto_advance(&mut self, position: Duration, duration: Option<Duration>) -> bool {
        let Some(duration) = duration else {
            return false;
        };
        if !self.armed || duration.is_zero() {
            return false;
        }

        let remaining = duration.saturating_sub(position);
        if remaining <= self.lead {
            self.armed = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_pads_seconds() {
        assert_eq!(format_time(Some(Duration::from_secs(0))), "0:00");
        assert_eq!(format_time(Some(Duration::from_secs(7))), "0:07");
        assert_eq!(format_time(Some(Duration::from_millis(65_900))), "1:05");
        assert_eq!(format_time(Some(Duration::from_secs(3_725))), "62:05");
        assert_eq!(format_time(None), "0:00");
    }

    #[test]
    fn fill_ratio_is_clamped() {
        let ten = Some(Duration::from_secs(10));
        assert_eq!(fill_ratio(Duration::from_secs(5), ten), 0.5);
        assert_eq!(fill_ratio(Duration::from_secs(12), ten), 1.0);
        assert_eq!(fill_ratio(Duration::from_secs(3), None), 0.0);
        assert_eq!(fill_ratio(Duration::from_secs(3), Some(Duration::ZERO)), 0.0);
    }

    #[test]
    fn lead_is_capped_at_two_seconds() {
        let cap = DEFAULT_AUTO_ADVANCE_LEAD_CAP;
        assert_eq!(
            auto_advance_lead(Duration::from_millis(1500), cap),
            Duration::from_millis(1500)
        );
        assert_eq!(auto_advance_lead(Duration::from_secs(5), cap), Duration::from_secs(2));
    }

    #[test]
    fn auto_advance_fires_once_per_arming() {
        let mut reporter = ProgressReporter::new(Duration::from_millis(1500));
        let duration = Some(Duration::from_secs(10));

        assert!(!reporter.check_auto_advance(Duration::from_millis(8_400), duration));
        assert!(reporter.check_auto_advance(Duration::from_millis(8_600), duration));
        assert!(!reporter.check_auto_advance(Duration::from_millis(9_000), duration));
        assert!(!reporter.check_auto_advance(Duration::from_secs(10), duration));

        reporter.rearm();
        assert!(!reporter.check_auto_advance(Duration::from_secs(1), duration));
        assert!(reporter.check_auto_advance(Duration::from_millis(8_500), duration));
    }

    #[test]
    fn unknown_duration_never_fires() {
        let mut reporter = ProgressReporter::new(Duration::from_millis(1500));
        assert!(!reporter.check_auto_advance(Duration::from_secs(100), None));
        assert!(reporter.is_armed());
    }

    #[test]
    fn sample_labels() {
        let reporter = ProgressReporter::new(Duration::from_millis(1500));
        let sample = reporter.sample(Duration::from_secs(61), Some(Duration::from_secs(244)));
        assert_eq!(sample.elapsed_label, "1:01");
        assert_eq!(sample.duration_label, "4:04");
        assert!((sample.ratio - 61.0 / 244.0).abs() < 1e-6);
    }
}
