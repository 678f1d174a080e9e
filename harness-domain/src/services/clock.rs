// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Clock Service
//!
//! RFC3339-compliant UTC timestamp helpers shared by run metadata, case
//! results, and the realtime event log. All timestamps in the harness are
//! normalized to UTC; the realtime adapter additionally tracks elapsed time
//! from a monotonic baseline so event timing survives wall-clock jumps (see
//! `Elapsed`).

use std::time::Instant;

use chrono::{DateTime, SecondsFormat, Utc};

/// Current UTC instant as an RFC3339 string with second precision, matching
/// the `str(datetime.now(timezone.utc))`-shaped strings in run metadata.
pub fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current UTC instant as an RFC3339 string with microsecond precision, used
/// for realtime event timestamps.
pub fn now_utc_iso_micros() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Monotonic elapsed-time tracker. Used by the realtime adapter to compute
/// `elapsed_ms_since_audio_start`, which must be independent of wall-clock
/// jumps (spec requirement).
#[derive(Debug, Clone, Copy)]
pub struct MonotonicBaseline(Instant);

impl MonotonicBaseline {
    pub fn now() -> Self {
        MonotonicBaseline(Instant::now())
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.0.elapsed().as_millis() as u64
    }
}

/// Formats a `std::time::Duration` the way run metadata renders `elapsed`,
/// e.g. `0:00:01.234567` (mirrors Python's `timedelta` string form).
pub fn format_elapsed(elapsed: std::time::Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    let micros = elapsed.subsec_micros();
    if micros == 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}:{:02}.{:06}", hours, minutes, secs, micros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn elapsed_formats_like_timedelta() {
        assert_eq!(format_elapsed(Duration::from_secs(3661)), "1:01:01");
        assert_eq!(
            format_elapsed(Duration::from_micros(3_661_500_000)),
            "1:01:01.500000"
        );
    }

    #[test]
    fn monotonic_baseline_is_nondecreasing() {
        let baseline = MonotonicBaseline::now();
        std::thread::sleep(Duration::from_millis(5));
        assert!(baseline.elapsed_ms() >= 5);
    }
}
