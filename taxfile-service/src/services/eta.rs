//! Refund completion ETA prediction.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

const MIN_DAYS: i64 = 10;
const MAX_DAYS: i64 = 60;

/// Estimate when a freshly filed refund will finish processing: now plus a
/// uniformly random whole number of days in [10, 60], drawn fresh per call.
pub fn predict_eta() -> DateTime<Utc> {
    let days = rand::thread_rng().gen_range(MIN_DAYS..=MAX_DAYS);
    Utc::now() + Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eta_is_within_the_advertised_window() {
        for _ in 0..100 {
            let now = Utc::now();
            let eta = predict_eta();
            assert!(eta > now);
            // num_days truncates the microseconds elapsed since `now`.
            let days = (eta - now).num_days();
            assert!(
                (MIN_DAYS - 1..=MAX_DAYS).contains(&days),
                "got {} days",
                days
            );
        }
    }

    #[test]
    fn repeated_predictions_vary() {
        let first = predict_eta();
        let varied = (0..20).any(|_| {
            let next = predict_eta();
            (next - first).num_days().abs() > 0
        });
        assert!(varied, "20 draws from a 51-day range never differed");
    }
}
