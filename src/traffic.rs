//! Synthetic traffic against `GET /work`.
//!
//! Sends requests one after another, each with a randomly chosen `fail`
//! flag, pausing a random interval between them.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use rand::Rng;

/// What to send and how fast.
#[derive(Debug, Clone)]
pub struct TrafficPlan {
    pub url: String,
    pub requests: usize,
    /// Probability that a request carries `fail=true`.
    pub fail_ratio: f64,
    pub min_pause: Duration,
    pub max_pause: Duration,
}

impl Default for TrafficPlan {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000/work".to_string(),
            requests: 500,
            fail_ratio: 1.0 / 3.0,
            min_pause: Duration::from_millis(50),
            max_pause: Duration::from_millis(200),
        }
    }
}

/// Result of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Status(u16),
    Error(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Status(status) => write!(f, "{status}"),
            Outcome::Error(e) => write!(f, "Error - {e}"),
        }
    }
}

/// Tally of a finished run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficSummary {
    pub by_status: BTreeMap<u16, usize>,
    pub errors: usize,
    /// Requests sent with `fail=true`.
    pub fail_requested: usize,
}

impl TrafficSummary {
    pub fn total(&self) -> usize {
        self.by_status.values().sum::<usize>() + self.errors
    }

    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Status(status) => *self.by_status.entry(*status).or_default() += 1,
            Outcome::Error(_) => self.errors += 1,
        }
    }
}

impl fmt::Display for TrafficSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sent {} (fail=true: {})", self.total(), self.fail_requested)?;
        for (status, count) in &self.by_status {
            write!(f, ", {status}: {count}")?;
        }
        write!(f, ", errors: {}", self.errors)
    }
}

/// Parse a `fail` probability. Accepts finite values in `[0, 1]` only.
pub fn parse_fail_ratio(raw: &str) -> Result<f64, String> {
    let ratio: f64 = raw.trim().parse().map_err(|e| format!("{e}"))?;
    if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
        return Err(format!("{raw} is not a probability between 0 and 1"));
    }
    Ok(ratio)
}

fn fail_probability(plan: &TrafficPlan) -> f64 {
    if plan.fail_ratio.is_nan() {
        0.0
    } else {
        plan.fail_ratio.clamp(0.0, 1.0)
    }
}

fn pause(plan: &TrafficPlan, rng: &mut impl Rng) -> Duration {
    if plan.max_pause <= plan.min_pause {
        return plan.min_pause;
    }
    rng.gen_range(plan.min_pause..=plan.max_pause)
}

/// Execute `plan`, calling `report` after every request.
pub async fn run<R, F>(
    client: &reqwest::Client,
    plan: &TrafficPlan,
    rng: &mut R,
    mut report: F,
) -> TrafficSummary
where
    R: Rng,
    F: FnMut(usize, &Outcome),
{
    let mut summary = TrafficSummary::default();

    for i in 0..plan.requests {
        let fail = rng.gen_bool(fail_probability(plan));
        if fail {
            summary.fail_requested += 1;
        }

        let outcome = match client.get(&plan.url).query(&[("fail", fail)]).send().await {
            Ok(response) => Outcome::Status(response.status().as_u16()),
            Err(e) => Outcome::Error(e.to_string()),
        };

        summary.record(&outcome);
        report(i, &outcome);

        let wait = pause(plan, rng);
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_fail_ratio() {
        assert_eq!(parse_fail_ratio("0.25"), Ok(0.25));
        assert_eq!(parse_fail_ratio("0"), Ok(0.0));
        assert_eq!(parse_fail_ratio("1"), Ok(1.0));
        for raw in ["NaN", "nan", "inf", "-inf", "1.5", "-0.1", "lots"] {
            assert!(parse_fail_ratio(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn test_nan_ratio_never_requests_failures() {
        let plan = TrafficPlan {
            fail_ratio: f64::NAN,
            ..TrafficPlan::default()
        };
        assert_eq!(fail_probability(&plan), 0.0);
    }

    #[test]
    fn test_pause_within_bounds() {
        let plan = TrafficPlan::default();
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..1000 {
            let p = pause(&plan, &mut rng);
            assert!(p >= plan.min_pause && p <= plan.max_pause);
        }
    }

    #[test]
    fn test_summary_display() {
        let mut summary = TrafficSummary::default();
        summary.record(&Outcome::Status(200));
        summary.record(&Outcome::Status(200));
        summary.record(&Outcome::Status(500));
        summary.record(&Outcome::Error("refused".into()));
        summary.fail_requested = 2;

        assert_eq!(summary.total(), 4);
        assert_eq!(summary.to_string(), "sent 4 (fail=true: 2), 200: 2, 500: 1, errors: 1");
        assert_eq!(Outcome::Error("refused".into()).to_string(), "Error - refused");
    }

    #[tokio::test]
    async fn test_unreachable_target_counts_errors() {
        let plan = TrafficPlan {
            url: "http://127.0.0.1:9/work".to_string(),
            requests: 3,
            min_pause: Duration::ZERO,
            max_pause: Duration::ZERO,
            ..TrafficPlan::default()
        };
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = Vec::new();

        let summary = run(&client, &plan, &mut rng, |i, _| seen.push(i)).await;

        assert_eq!(summary.errors, 3);
        assert!(summary.by_status.is_empty());
        assert_eq!(seen, vec![0, 1, 2]);
    }
}
