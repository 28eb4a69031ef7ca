//! Tunables governing wrong-pool mastery, difficulty adjustment, spaced
//! repetition, and session defaults.

/// All configuration knobs named in the engine's configuration table,
/// collected into one struct so call sites never hardcode a magic number.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// `M`: correct answers required in the wrong pool before eviction.
    pub mastery_threshold: u8,
    /// `P_wrong`: chance to draw from the wrong pool on a given selection.
    pub wrong_pool_probability: f64,
    /// `W`: recent answers considered for target-difficulty adjustment.
    pub difficulty_window: usize,
    /// `T`: desired accuracy.
    pub target_success_rate: f64,
    /// `δ`: deadband around `T` within which the target is left unchanged.
    pub difficulty_deadband: f64,
    /// `Δ`: step size for target-difficulty adjustment.
    pub difficulty_delta: f64,
    /// Spaced-repetition interval schedule, in hours, indexed by attempt count.
    pub spaced_intervals_h: Vec<f64>,
    /// Seconds until a newly created session expires.
    pub session_default_duration_s: u32,
    /// Upper bound on a session's `planned_total`.
    pub session_max_questions: u32,
    /// `K`: optimistic-concurrency retries for a session's atomic advance.
    pub advance_retry_attempts: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mastery_threshold: 2,
            wrong_pool_probability: 0.20,
            difficulty_window: 10,
            target_success_rate: 0.75,
            difficulty_deadband: 0.10,
            difficulty_delta: 0.15,
            spaced_intervals_h: vec![1.0, 4.0, 24.0, 72.0, 168.0],
            session_default_duration_s: 3_600,
            session_max_questions: 500,
            advance_retry_attempts: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_matches_the_documented_table() {
        let config = EngineConfig::default();
        assert_eq!(config.mastery_threshold, 2);
        assert!((config.wrong_pool_probability - 0.20).abs() < 1e-9);
        assert_eq!(config.difficulty_window, 10);
        assert!((config.target_success_rate - 0.75).abs() < 1e-9);
        assert!((config.difficulty_deadband - 0.10).abs() < 1e-9);
        assert!((config.difficulty_delta - 0.15).abs() < 1e-9);
        assert_eq!(config.spaced_intervals_h, vec![1.0, 4.0, 24.0, 72.0, 168.0]);
        assert_eq!(config.session_default_duration_s, 3_600);
        assert_eq!(config.session_max_questions, 500);
        assert_eq!(config.advance_retry_attempts, 3);
    }
}
