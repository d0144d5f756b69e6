//! Declared test duration to seconds.

/// Upper bound applied to second-scale durations.
pub const SECOND_SCALE_CAP: f64 = 10.0;

/// Unit of a declared test duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Hour,
    Minute,
    Second,
    Unrecognized,
}

impl DurationUnit {
    /// Case-sensitive; the serving API uses "hour", "min" and "sec".
    pub fn parse(unit: &str) -> Self {
        match unit {
            "hour" => DurationUnit::Hour,
            "minute" | "min" => DurationUnit::Minute,
            "second" | "sec" => DurationUnit::Second,
            _ => DurationUnit::Unrecognized,
        }
    }

    pub fn to_seconds(self, magnitude: f64) -> f64 {
        match self {
            DurationUnit::Hour => magnitude * 3600.0,
            DurationUnit::Minute => magnitude * 60.0,
            // TODO: confirm with the load-test owners why second-scale runs are capped at 10s.
            DurationUnit::Second => magnitude.min(SECOND_SCALE_CAP),
            DurationUnit::Unrecognized => 0.0,
        }
    }
}

/// Convert a `(magnitude, unit)` pair into seconds.
///
/// Unknown units yield zero rather than an error.
pub fn normalize(magnitude: f64, unit: &str) -> f64 {
    DurationUnit::parse(unit).to_seconds(magnitude)
}
