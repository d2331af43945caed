//! Seedable randomness for delay sampling and failure injection.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::WorkConfig;

/// Bounds and odds of the simulated work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkProfile {
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
    pub failure_rate: f64,
}

impl Default for WorkProfile {
    fn default() -> Self {
        Self::from(&WorkConfig::default())
    }
}

impl From<&WorkConfig> for WorkProfile {
    fn from(config: &WorkConfig) -> Self {
        Self {
            min_delay_secs: config.min_delay_secs,
            max_delay_secs: config.max_delay_secs,
            failure_rate: config.failure_rate,
        }
    }
}

/// Shared random source. The lock is held only for a single draw.
#[derive(Debug)]
pub struct FailureInjector {
    rng: Mutex<StdRng>,
}

impl FailureInjector {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Seeded when `seed` is set, OS entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Uniform delay in `[min, max]` seconds.
    pub fn sample_delay(&self, profile: &WorkProfile) -> f64 {
        if profile.max_delay_secs <= profile.min_delay_secs {
            return profile.min_delay_secs;
        }
        self.with_rng(|rng| rng.gen_range(profile.min_delay_secs..=profile.max_delay_secs))
    }

    /// Draw `u` in `[0, 1)`; the failure fires when `u < rate`.
    pub fn roll_failure(&self, rate: f64) -> bool {
        let draw: f64 = self.with_rng(|rng| rng.gen());
        draw < rate
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // A panic mid-draw cannot leave the generator in a bad state.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_within_bounds() {
        let injector = FailureInjector::seeded(1);
        let profile = WorkProfile::default();
        for _ in 0..10_000 {
            let delay = injector.sample_delay(&profile);
            assert!((0.01..=0.5).contains(&delay), "delay {delay} out of range");
        }
    }

    #[test]
    fn test_failure_rate_converges() {
        let injector = FailureInjector::seeded(42);
        let failures = (0..10_000).filter(|_| injector.roll_failure(0.3)).count();
        // 4.4 standard deviations either side of 3000.
        assert!((2800..=3200).contains(&failures), "got {failures} failures");
    }

    #[test]
    fn test_rate_extremes() {
        let injector = FailureInjector::seeded(3);
        assert!((0..1000).all(|_| !injector.roll_failure(0.0)));
        assert!((0..1000).all(|_| injector.roll_failure(1.0)));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a = FailureInjector::seeded(9);
        let b = FailureInjector::seeded(9);
        let profile = WorkProfile::default();
        for _ in 0..100 {
            assert_eq!(a.sample_delay(&profile), b.sample_delay(&profile));
        }
    }

    #[test]
    fn test_degenerate_range() {
        let injector = FailureInjector::seeded(0);
        let profile = WorkProfile {
            min_delay_secs: 0.2,
            max_delay_secs: 0.2,
            failure_rate: 0.0,
        };
        assert_eq!(injector.sample_delay(&profile), 0.2);
    }
}
