//! Wall-clock alignment to FT8 cycles
//!
//! An explicit time source owns the offset between the wall clock and the
//! cycle grid. Live operation uses a zero offset (cycles align to UTC);
//! WAV replay freezes an offset so a synthetic rollover lands shortly after
//! the first sample.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{TimeZone, Utc};

/// Fires once per cycle when its phase-shifted cycle time wraps.
#[derive(Debug)]
pub struct Ticker {
    offset: f64,
    prev: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct TimeSource {
    cycle_seconds: f64,
    offset: f64,
}

impl TimeSource {
    /// Cycles aligned to the UTC clock.
    pub fn live(cycle_seconds: f64) -> Self {
        Self {
            cycle_seconds,
            offset: 0.0,
        }
    }

    /// Frozen offset for replay: the next synthetic rollover lands one
    /// second after now, leaving the ring a moment to start filling.
    pub fn replay(cycle_seconds: f64) -> Self {
        let offset = Self::unix_now() % cycle_seconds + 1.0;
        Self {
            cycle_seconds,
            offset,
        }
    }

    fn unix_now() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }

    pub fn now(&self) -> f64 {
        Self::unix_now()
    }

    /// Seconds into the current cycle, in `[0, cycle_seconds)`.
    pub fn cycle_time(&self) -> f64 {
        (Self::unix_now() - self.offset).rem_euclid(self.cycle_seconds)
    }

    pub fn seconds_to_rollover(&self) -> f64 {
        self.cycle_seconds - self.cycle_time()
    }

    /// UTC start of the cycle containing wall-clock time `t`, as
    /// `YYMMDD_HHMMSS`.
    pub fn cycle_start_str(&self, t: f64) -> String {
        let start = self.cycle_seconds * ((t - self.offset) / self.cycle_seconds).floor();
        Utc.timestamp_opt(start as i64, 0)
            .single()
            .map(|d| d.format("%y%m%d_%H%M%S").to_string())
            .unwrap_or_default()
    }

    pub fn ticker(&self, offset: f64) -> Ticker {
        Ticker { offset, prev: 0.0 }
    }

    /// True once per cycle, the first time the ticker's phase wraps.
    pub fn check(&self, ticker: &mut Ticker) -> bool {
        let t = (Self::unix_now() - self.offset - ticker.offset).rem_euclid(self.cycle_seconds);
        let ticked = t < ticker.prev;
        ticker.prev = t;
        ticked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_time_stays_in_range() {
        let ts = TimeSource::live(15.0);
        let t = ts.cycle_time();
        assert!((0.0..15.0).contains(&t));
        assert!((0.0..=15.0).contains(&ts.seconds_to_rollover()));
    }

    #[test]
    fn cycle_start_str_is_utc_and_quantised() {
        let ts = TimeSource::live(15.0);
        // 2025-08-01 12:00:14 UTC falls in the cycle starting 12:00:00
        let t = Utc
            .with_ymd_and_hms(2025, 8, 1, 12, 0, 14)
            .unwrap()
            .timestamp() as f64;
        assert_eq!(ts.cycle_start_str(t), "250801_120000");
        assert_eq!(ts.cycle_start_str(t + 1.0), "250801_120015");
    }

    #[test]
    fn replay_offset_places_rollover_one_second_out() {
        let ts = TimeSource::replay(15.0);
        let remaining = ts.seconds_to_rollover();
        assert!((0.9..=1.1).contains(&remaining), "remaining {remaining}");
    }

    #[test]
    fn ticker_does_not_fire_immediately() {
        let ts = TimeSource::live(15.0);
        let mut ticker = ts.ticker(0.0);
        assert!(!ts.check(&mut ticker));
    }
}
