//! Log filtering for the event narration.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
///
/// Narration is logged under the `tutoring.*` targets (`tutoring.actor.student`,
/// `tutoring.actor.coordinator`, `tutoring.actor.tutor`, `tutoring.simulation`),
/// which a `tutoring_center` directive alone does not match.
pub const DEFAULT_LOG_FILTER: &str = "tutoring_center=info,tutoring=info";

/// `RUST_LOG` when set and valid, otherwise [`DEFAULT_LOG_FILTER`].
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
