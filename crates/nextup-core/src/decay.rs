//! Time-decay adjustment for the urgency feature.
//!
//! Stale items lose urgency exponentially with age so an untouched backlog
//! sinks over time, down to a configurable floor. A near-term deadline
//! overrides decay entirely: inside the override window urgency is forced
//! into 90-100, linear in the hours remaining.

use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, Context};
use crate::features::{Factor, FeatureSet};

/// Decay parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DecayConfig {
    /// Fraction of urgency lost per day of inactivity (default 0.05)
    pub rate_per_day: f64,
    /// Floor below which decayed urgency is clamped (default 10)
    pub floor: f64,
    /// Deadlines closer than this many hours bypass decay (default 48)
    pub override_hours: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        DecayConfig {
            rate_per_day: 0.05,
            floor: 10.0,
            override_hours: 48.0,
        }
    }
}

impl DecayConfig {
    /// Adjust the urgency feature for age and deadline proximity.
    ///
    /// Inside the override window the urgency is forced to 90-100 (100 at
    /// one hour or less, 90 at the window edge); otherwise the extracted
    /// urgency decays with the candidate's age and is clamped at the floor.
    pub fn adjust(&self, features: &mut FeatureSet, candidate: &Candidate, context: &Context) {
        if let Some(deadline) = candidate.deadline {
            let remaining_minutes = (deadline - context.now).num_minutes();
            if remaining_minutes <= 0 {
                features.set(Factor::Urgency, 100.0);
                return;
            }
            let remaining_hours = remaining_minutes as f64 / 60.0;
            if remaining_hours <= self.override_hours {
                features.set(Factor::Urgency, self.override_urgency(remaining_hours));
                return;
            }
        }

        let age_days = candidate.age_days(context.now);
        let base = features.get(Factor::Urgency);
        let decayed = base * (1.0 - self.rate_per_day).powf(age_days);
        features.set(Factor::Urgency, decayed.max(self.floor));
    }

    /// Urgency inside the override window: 100 at <= 1 hour, 90 at the edge.
    fn override_urgency(&self, remaining_hours: f64) -> f64 {
        if remaining_hours <= 1.0 {
            return 100.0;
        }
        let span = (self.override_hours - 1.0).max(1.0);
        let fraction = (remaining_hours - 1.0) / span;
        100.0 - 10.0 * fraction
    }
}
