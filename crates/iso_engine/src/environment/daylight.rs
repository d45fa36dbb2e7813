//! # Daylight Cycle
//!
//! Maps the externally supplied hour onto lighting parameters and discrete
//! day/night and phase notifications. The engine never advances time itself;
//! every change arrives through [`DaylightCycle::set_hour`].

use std::fmt;

use crate::core::config::{DaylightConfig, DaylightKeyframe};
use crate::draw::color::Color;
use crate::foundation::math::utils::{inverse_lerp, lerp, wrap};

const HOURS_PER_DAY: f32 = 24.0;

/// Lighting at one moment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaylightSample {
    /// Hour in `[0, 24)`
    pub hour: f32,
    /// Background sky color
    pub sky: Color,
    /// Multiplicative world tint
    pub tint: Color,
    /// Ambient intensity in `[0, 1]`
    pub ambient: f32,
    /// Whether this hour counts as night
    pub is_night: bool,
}

/// Named thresholds reported when the clock moves forward past them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayPhase {
    /// 05:00
    Dawn,
    /// 06:00
    Sunrise,
    /// 12:00
    Noon,
    /// 18:00
    Sunset,
    /// 19:00
    Dusk,
    /// 20:00
    Night,
}

impl DayPhase {
    /// Every phase in chronological order
    pub const ALL: [DayPhase; 6] = [
        DayPhase::Dawn,
        DayPhase::Sunrise,
        DayPhase::Noon,
        DayPhase::Sunset,
        DayPhase::Dusk,
        DayPhase::Night,
    ];

    /// Hour at which the phase begins
    pub fn hour(self) -> f32 {
        match self {
            DayPhase::Dawn => 5.0,
            DayPhase::Sunrise => 6.0,
            DayPhase::Noon => 12.0,
            DayPhase::Sunset => 18.0,
            DayPhase::Dusk => 19.0,
            DayPhase::Night => 20.0,
        }
    }
}

/// Coarse time-of-day bucket, matching the simulation's own naming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    /// 05:00 to 07:00
    Dawn,
    /// 07:00 to 12:00
    Morning,
    /// 12:00 to 14:00
    Noon,
    /// 14:00 to 18:00
    Afternoon,
    /// 18:00 to 20:00
    Evening,
    /// 20:00 to 05:00
    Night,
}

impl TimeOfDay {
    /// Bucket for an hour
    pub fn from_hour(hour: f32) -> Self {
        let hour = wrap(hour, HOURS_PER_DAY);
        match hour {
            h if (5.0..7.0).contains(&h) => TimeOfDay::Dawn,
            h if (7.0..12.0).contains(&h) => TimeOfDay::Morning,
            h if (12.0..14.0).contains(&h) => TimeOfDay::Noon,
            h if (14.0..18.0).contains(&h) => TimeOfDay::Afternoon,
            h if (18.0..20.0).contains(&h) => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    /// Lowercase name
    pub fn label(self) -> &'static str {
        match self {
            TimeOfDay::Dawn => "dawn",
            TimeOfDay::Morning => "morning",
            TimeOfDay::Noon => "noon",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Notifications produced by an hour update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaylightEvent {
    /// Day turned into night
    NightStarted,
    /// Night turned into day
    DayStarted,
    /// The clock moved forward past a phase threshold
    PhaseReached(DayPhase),
}

/// Whether an hour counts as night
pub fn is_night(hour: f32) -> bool {
    let hour = wrap(hour, HOURS_PER_DAY);
    hour >= 19.0 || hour < 6.0
}

/// Window light level for an hour
///
/// Off through the day, ramping on between 18:00 and 19:00, fully on through
/// the night and ramping off between 05:00 and 06:00.
pub fn building_light_intensity(hour: f32) -> f32 {
    let hour = wrap(hour, HOURS_PER_DAY);
    if (6.0..18.0).contains(&hour) {
        0.0
    } else if (18.0..19.0).contains(&hour) {
        hour - 18.0
    } else if (5.0..6.0).contains(&hour) {
        6.0 - hour
    } else {
        1.0
    }
}

/// `HH:MM` for an hour value
pub fn format_clock(hour: f32) -> String {
    let minutes = (wrap(hour, HOURS_PER_DAY) * 60.0).floor() as u32;
    format!("{:02}:{:02}", (minutes / 60) % 24, minutes % 60)
}

/// Hour-driven lighting state
#[derive(Debug, Clone)]
pub struct DaylightCycle {
    keyframes: Vec<DaylightKeyframe>,
    hour: Option<f32>,
    current: DaylightSample,
}

impl Default for DaylightCycle {
    fn default() -> Self {
        Self::new(&DaylightConfig::default())
    }
}

impl DaylightCycle {
    /// Create a cycle from a keyframe table, starting at noon
    pub fn new(config: &DaylightConfig) -> Self {
        let mut keyframes = config.keyframes.clone();
        keyframes.sort_by(|a, b| a.hour.total_cmp(&b.hour));
        let mut cycle = Self {
            keyframes,
            hour: None,
            current: DaylightSample {
                hour: 12.0,
                sky: Color::WHITE,
                tint: Color::WHITE,
                ambient: 1.0,
                is_night: false,
            },
        };
        cycle.current = cycle.get_config(12.0);
        cycle
    }

    /// Last hour pushed, if any
    pub fn hour(&self) -> Option<f32> {
        self.hour
    }

    /// Lighting for the last hour pushed (noon before the first push)
    pub fn sample(&self) -> DaylightSample {
        self.current
    }

    /// Bucket for the last hour pushed
    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_hour(self.current.hour)
    }

    /// Interpolated lighting for any hour, wrapping across midnight
    ///
    /// An hour that matches a keyframe returns that keyframe exactly.
    pub fn get_config(&self, hour: f32) -> DaylightSample {
        let hour = wrap(hour, HOURS_PER_DAY);
        let (Some(first), Some(last)) = (self.keyframes.first(), self.keyframes.last()) else {
            return DaylightSample {
                hour,
                sky: Color::WHITE,
                tint: Color::WHITE,
                ambient: 1.0,
                is_night: is_night(hour),
            };
        };

        let after = self.keyframes.partition_point(|k| k.hour <= hour);
        let (prev, next, prev_hour, next_hour, at) = if after == 0 {
            // before the first keyframe: bracket with yesterday's last one
            (last, first, last.hour - HOURS_PER_DAY, first.hour, hour)
        } else {
            let prev = &self.keyframes[after - 1];
            match self.keyframes.get(after) {
                Some(next) => (prev, next, prev.hour, next.hour, hour),
                None => (prev, first, prev.hour, first.hour + HOURS_PER_DAY, hour),
            }
        };

        if at == prev_hour {
            return Self::from_keyframe(prev, hour);
        }
        let t = inverse_lerp(prev_hour, next_hour, at).clamp(0.0, 1.0);
        DaylightSample {
            hour,
            sky: prev.sky.lerp(next.sky, t),
            tint: prev.tint.lerp(next.tint, t),
            ambient: lerp(prev.ambient, next.ambient, t),
            is_night: is_night(hour),
        }
    }

    /// Push a new hour; returns the notifications it triggers
    ///
    /// The first push only establishes the baseline. Afterwards a day/night
    /// change yields exactly one event, and phase thresholds passed while
    /// moving forward yield one event each in chronological order. A later
    /// hour on the same day is always forward; an earlier hour counts as
    /// forward across midnight only when the wrapped step is under 12 hours.
    /// Backward steps report no phases.
    pub fn set_hour(&mut self, hour: f32) -> Vec<DaylightEvent> {
        if !hour.is_finite() {
            log::warn!("Ignoring non-finite hour {hour}");
            return Vec::new();
        }
        let hour = wrap(hour, HOURS_PER_DAY);
        self.current = self.get_config(hour);
        let previous = self.hour.replace(hour);

        let Some(previous) = previous else {
            return Vec::new();
        };

        let mut events = Vec::new();
        match (is_night(previous), is_night(hour)) {
            (false, true) => {
                log::info!("Night started at {}", format_clock(hour));
                events.push(DaylightEvent::NightStarted);
            }
            (true, false) => {
                log::info!("Day started at {}", format_clock(hour));
                events.push(DaylightEvent::DayStarted);
            }
            _ => {}
        }

        let step = if hour >= previous {
            hour - previous
        } else {
            hour + HOURS_PER_DAY - previous
        };
        let forward = hour > previous || step < HOURS_PER_DAY / 2.0;
        if step > 0.0 && forward {
            let mut passed: Vec<(f32, DayPhase)> = DayPhase::ALL
                .into_iter()
                .map(|phase| ((phase.hour() - previous).rem_euclid(HOURS_PER_DAY), phase))
                .filter(|&(distance, _)| distance > 0.0 && distance <= step)
                .collect();
            passed.sort_by(|a, b| a.0.total_cmp(&b.0));
            for (_, phase) in passed {
                log::debug!("Phase {phase:?} reached");
                events.push(DaylightEvent::PhaseReached(phase));
            }
        }
        events
    }

    fn from_keyframe(keyframe: &DaylightKeyframe, hour: f32) -> DaylightSample {
        DaylightSample {
            hour,
            sky: keyframe.sky,
            tint: keyframe.tint,
            ambient: keyframe.ambient,
            is_night: is_night(hour),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn noon_keyframe() -> DaylightKeyframe {
        DaylightConfig::default()
            .keyframes
            .into_iter()
            .find(|k| k.hour == 12.0)
            .expect("noon keyframe")
    }

    #[test]
    fn test_exact_noon_sample() {
        let cycle = DaylightCycle::default();
        let sample = cycle.get_config(12.0);
        let noon = noon_keyframe();
        assert_eq!(sample.sky, noon.sky);
        assert_eq!(sample.tint, noon.tint);
        assert_eq!(sample.ambient, noon.ambient);
        assert!(!sample.is_night);
    }

    #[test]
    fn test_between_keyframes_strictly_between() {
        let cycle = DaylightCycle::default();
        let sample = cycle.get_config(10.5);
        let nine = cycle.get_config(9.0);
        let noon = cycle.get_config(12.0);
        assert!(sample.ambient > nine.ambient && sample.ambient < noon.ambient);
        assert!(sample.sky.r > noon.sky.r && sample.sky.r < nine.sky.r);
    }

    #[test]
    fn test_wraps_across_midnight() {
        let cycle = DaylightCycle::default();
        let late = cycle.get_config(23.0);
        let ten = cycle.get_config(22.0);
        let midnight = cycle.get_config(0.0);
        assert!(late.ambient < ten.ambient && late.ambient > midnight.ambient);
        assert_eq!(cycle.get_config(24.0), midnight);
    }

    #[test]
    fn test_every_hour_is_bracketed() {
        let cycle = DaylightCycle::default();
        for step in 0..96 {
            let sample = cycle.get_config(step as f32 * 0.25);
            assert!((0.0..=1.0).contains(&sample.ambient));
        }
    }

    #[test]
    fn test_night_predicate() {
        assert!(is_night(19.0));
        assert!(is_night(5.99));
        assert!(!is_night(6.0));
        assert!(!is_night(18.99));
    }

    #[test]
    fn test_building_lights_curve() {
        assert_relative_eq!(building_light_intensity(12.0), 0.0);
        assert_relative_eq!(building_light_intensity(18.5), 0.5);
        assert_relative_eq!(building_light_intensity(19.0), 1.0);
        assert_relative_eq!(building_light_intensity(2.0), 1.0);
        assert_relative_eq!(building_light_intensity(5.25), 0.75);
        assert_relative_eq!(building_light_intensity(6.0), 0.0);
    }

    #[test]
    fn test_first_push_fires_nothing() {
        let mut cycle = DaylightCycle::default();
        assert!(cycle.set_hour(22.0).is_empty());
        assert!(cycle.sample().is_night);
    }

    #[test]
    fn test_one_event_per_crossing() {
        let mut cycle = DaylightCycle::default();
        cycle.set_hour(18.0);
        let events = cycle.set_hour(19.5);
        let night_events = events.iter().filter(|e| **e == DaylightEvent::NightStarted).count();
        assert_eq!(night_events, 1);
        assert!(events.contains(&DaylightEvent::PhaseReached(DayPhase::Dusk)));
        assert!(!events.contains(&DaylightEvent::PhaseReached(DayPhase::Sunset)));

        let again = cycle.set_hour(19.75);
        assert!(!again.contains(&DaylightEvent::NightStarted));
    }

    #[test]
    fn test_forward_wrap_fires_phases_in_order() {
        let mut cycle = DaylightCycle::default();
        cycle.set_hour(22.0);
        let events = cycle.set_hour(6.5);
        assert_eq!(
            events,
            vec![
                DaylightEvent::DayStarted,
                DaylightEvent::PhaseReached(DayPhase::Dawn),
                DaylightEvent::PhaseReached(DayPhase::Sunrise),
            ]
        );
    }

    #[test]
    fn test_long_same_day_advance_is_forward() {
        let mut cycle = DaylightCycle::default();
        cycle.set_hour(6.0);
        let events = cycle.set_hour(19.5);
        assert_eq!(
            events,
            vec![
                DaylightEvent::NightStarted,
                DaylightEvent::PhaseReached(DayPhase::Noon),
                DaylightEvent::PhaseReached(DayPhase::Sunset),
                DaylightEvent::PhaseReached(DayPhase::Dusk),
            ]
        );
    }

    #[test]
    fn test_long_wrap_is_backward() {
        let mut cycle = DaylightCycle::default();
        cycle.set_hour(10.0);
        let events = cycle.set_hour(2.0);
        assert_eq!(events, vec![DaylightEvent::NightStarted]);
    }

    #[test]
    fn test_backward_step_fires_no_phases() {
        let mut cycle = DaylightCycle::default();
        cycle.set_hour(13.0);
        let events = cycle.set_hour(11.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_time_of_day_buckets() {
        assert_eq!(TimeOfDay::from_hour(6.0), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::from_hour(13.0), TimeOfDay::Noon);
        assert_eq!(TimeOfDay::from_hour(19.0), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(3.0), TimeOfDay::Night);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(6.5), "06:30");
        assert_eq!(format_clock(23.99), "23:59");
    }
}
