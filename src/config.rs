//! Configuration types.

use std::time::Duration;

/// Session behaviour knobs.
#[derive(Debug, Clone)]
pub struct QuizConfig {
    /// Minimum time the chart processing screen stays up.
    pub chart_dwell: Duration,
    /// Minimum time the "forecast accuracy" pacing screen stays up.
    pub accuracy_dwell: Duration,
    /// Minimum time the palm processing screen stays up.
    pub palm_dwell: Duration,
    /// Upper bound on a single generation call. `None` waits forever.
    pub generation_timeout: Option<Duration>,
    /// Whether `reset` also wipes the profile, not just the readings.
    pub reset_clears_profile: bool,
    /// Whether a failed generation stores the canned fallback reading
    /// instead of leaving the slot pending.
    pub substitute_fallback: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            chart_dwell: Duration::from_millis(3000),
            accuracy_dwell: Duration::from_millis(3000),
            palm_dwell: Duration::from_millis(3000),
            generation_timeout: Some(Duration::from_secs(30)),
            reset_clears_profile: false,
            substitute_fallback: true,
        }
    }
}

impl QuizConfig {
    /// Build from `QUIZ_*` environment variables, keeping defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let generation_timeout = match env_parse::<u64>("QUIZ_GENERATION_TIMEOUT_SECS") {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.generation_timeout,
        };

        Self {
            chart_dwell: env_millis("QUIZ_CHART_DWELL_MS").unwrap_or(defaults.chart_dwell),
            accuracy_dwell: env_millis("QUIZ_ACCURACY_DWELL_MS")
                .unwrap_or(defaults.accuracy_dwell),
            palm_dwell: env_millis("QUIZ_PALM_DWELL_MS").unwrap_or(defaults.palm_dwell),
            generation_timeout,
            reset_clears_profile: env_parse("QUIZ_RESET_CLEARS_PROFILE")
                .unwrap_or(defaults.reset_clears_profile),
            substitute_fallback: env_parse("QUIZ_SUBSTITUTE_FALLBACK")
                .unwrap_or(defaults.substitute_fallback),
        }
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    env_parse::<u64>(key).map(Duration::from_millis)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable config value");
            None
        }
    }
}
