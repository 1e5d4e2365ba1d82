//! Tutoring Center configuration.
//!
//! The four simulation sizes are positional command-line arguments. Delay
//! tuning and the RNG seed are optional flags that fall back to environment
//! variables. Every value is validated before any actor starts.

use clap::Parser;
use std::time::Duration;
use thiserror::Error;

/// Default upper bound of a student's simulated work delay (microseconds).
pub const DEFAULT_WORK_DELAY_MAX_US: u64 = 2000;

/// Default duration of one tutoring session (microseconds).
pub const DEFAULT_TUTORING_DELAY_US: u64 = 200;

/// Command-line arguments.
///
/// Positional values are taken as strings so that zero, negative, and
/// non-numeric input all surface as the same [`ConfigError`].
#[derive(Debug, Clone, Parser)]
#[command(name = "tutoring-center")]
#[command(about = "Simulate a bounded-capacity tutoring center")]
pub struct CliArgs {
    /// Number of student actors
    #[arg(allow_negative_numbers = true)]
    pub students: String,

    /// Number of tutor actors
    #[arg(allow_negative_numbers = true)]
    pub tutors: String,

    /// Number of waiting-room chairs
    #[arg(allow_negative_numbers = true)]
    pub chairs: String,

    /// Help sessions each student must receive before leaving
    #[arg(allow_negative_numbers = true)]
    pub helps: String,

    /// Upper bound of a student's random work delay, in microseconds
    #[arg(long, env = "TUTORING_WORK_DELAY_MAX_US", default_value_t = DEFAULT_WORK_DELAY_MAX_US)]
    pub work_delay_max_us: u64,

    /// Duration of one tutoring session, in microseconds
    #[arg(long, env = "TUTORING_SESSION_DELAY_US", default_value_t = DEFAULT_TUTORING_DELAY_US)]
    pub tutoring_delay_us: u64,

    /// Seed for the per-student RNGs (random when omitted)
    #[arg(long, env = "TUTORING_SEED")]
    pub seed: Option<u64>,
}

/// Validated simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of student actors.
    pub students: u32,

    /// Number of tutor actors.
    pub tutors: u32,

    /// Number of waiting-room chairs (capacity pool size).
    pub chairs: u32,

    /// Help sessions each student must receive.
    pub helps: u32,

    /// Upper bound (exclusive) of a student's random work delay.
    pub work_delay_max: Duration,

    /// Duration of one tutoring session.
    pub tutoring_delay: Duration,

    /// Seed for per-student RNGs. `None` seeds from entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Build a configuration with default delays and no seed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if any size is zero.
    pub fn new(students: u32, tutors: u32, chairs: u32, helps: u32) -> Result<Self, ConfigError> {
        let config = Self {
            students,
            tutors,
            chairs,
            helps,
            work_delay_max: Duration::from_micros(DEFAULT_WORK_DELAY_MAX_US),
            tutoring_delay: Duration::from_micros(DEFAULT_TUTORING_DELAY_US),
            seed: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Override the simulated delays.
    #[must_use]
    pub fn with_delays(mut self, work_delay_max: Duration, tutoring_delay: Duration) -> Self {
        self.work_delay_max = work_delay_max;
        self.tutoring_delay = tutoring_delay;
        self
    }

    /// Fix the RNG seed for reproducible runs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load configuration from parsed command-line arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a positional value is not a
    /// positive integer.
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let config = Self {
            students: parse_positive("students", &args.students)?,
            tutors: parse_positive("tutors", &args.tutors)?,
            chairs: parse_positive("chairs", &args.chairs)?,
            helps: parse_positive("helps", &args.helps)?,
            work_delay_max: Duration::from_micros(args.work_delay_max_us),
            tutoring_delay: Duration::from_micros(args.tutoring_delay_us),
            seed: args.seed,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("students", self.students),
            ("tutors", self.tutors),
            ("chairs", self.chairs),
            ("helps", self.helps),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue(format!(
                    "{name} must be a positive integer, got 0"
                )));
            }
        }
        Ok(())
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<u32, ConfigError> {
    let value: i64 = raw.trim().parse().map_err(|_| {
        ConfigError::InvalidValue(format!("{name} must be a positive integer, got '{raw}'"))
    })?;

    if value <= 0 {
        return Err(ConfigError::InvalidValue(format!(
            "{name} must be a positive integer, got {value}"
        )));
    }

    u32::try_from(value)
        .map_err(|_| ConfigError::InvalidValue(format!("{name} is too large: {value}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args_positional() {
        let args = CliArgs::try_parse_from(["tutoring-center", "10", "3", "4", "2"]).unwrap();
        let config = Config::from_args(&args).unwrap();

        assert_eq!(config.students, 10);
        assert_eq!(config.tutors, 3);
        assert_eq!(config.chairs, 4);
        assert_eq!(config.helps, 2);
        assert_eq!(
            config.work_delay_max,
            Duration::from_micros(DEFAULT_WORK_DELAY_MAX_US)
        );
        assert_eq!(
            config.tutoring_delay,
            Duration::from_micros(DEFAULT_TUTORING_DELAY_US)
        );
    }

    #[test]
    fn test_from_args_tuning_flags() {
        let args = CliArgs::try_parse_from([
            "tutoring-center",
            "2",
            "1",
            "1",
            "1",
            "--work-delay-max-us",
            "0",
            "--tutoring-delay-us",
            "50",
            "--seed",
            "7",
        ])
        .unwrap();
        let config = Config::from_args(&args).unwrap();

        assert_eq!(config.work_delay_max, Duration::ZERO);
        assert_eq!(config.tutoring_delay, Duration::from_micros(50));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_missing_positional_is_rejected() {
        let result = CliArgs::try_parse_from(["tutoring-center", "10", "3", "4"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_and_negative_values_rejected() {
        let args = CliArgs::try_parse_from(["tutoring-center", "10", "0", "4", "2"]).unwrap();
        let err = Config::from_args(&args).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref msg) if msg.contains("tutors")));

        let args = CliArgs::try_parse_from(["tutoring-center", "10", "3", "-4", "2"]).unwrap();
        let err = Config::from_args(&args).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref msg) if msg.contains("chairs")));
    }

    #[test]
    fn test_non_numeric_value_rejected() {
        let args = CliArgs::try_parse_from(["tutoring-center", "ten", "3", "4", "2"]).unwrap();
        let err = Config::from_args(&args).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref msg) if msg.contains("students")));
    }

    #[test]
    fn test_new_rejects_zero() {
        assert!(Config::new(0, 1, 1, 1).is_err());
        assert!(Config::new(1, 1, 1, 0).is_err());
        assert!(Config::new(1, 1, 1, 1).is_ok());
    }
}
