use serde::{Deserialize, Serialize};

use crate::core::config::TierThresholds;

/// Relevance bucket of a scored candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Tailored,
    Recommended,
    Exploratory,
    Excluded,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Tailored => "tailored",
            Tier::Recommended => "recommended",
            Tier::Exploratory => "exploratory",
            Tier::Excluded => "excluded",
        }
    }
}

/// Assign a tier from the final score and the specific-match flag
///
/// Thresholds are inclusive lower bounds. Without a strong match on an
/// identity-specific dimension, tailored and recommended assignments are
/// demoted to exploratory.
pub fn classify(score: f64, has_specific_match: bool, thresholds: &TierThresholds) -> Tier {
    let tier = if score >= thresholds.tailored {
        Tier::Tailored
    } else if score >= thresholds.recommended {
        Tier::Recommended
    } else if score >= thresholds.exploratory {
        Tier::Exploratory
    } else {
        Tier::Excluded
    };

    match tier {
        Tier::Tailored | Tier::Recommended if !has_specific_match => Tier::Exploratory,
        tier => tier,
    }
}
