//! Trait preview strings shown while an insight is loading

use matchdeck_common::Candidate;

/// Placeholders used when a candidate has no scores or interests
pub const FALLBACK_TRAITS: [&str; 3] = ["Shared vibe", "Schedule sync", "Personality sparks"];

/// Personality score above which the pair is described as in sync
const PERSONALITY_SYNC_THRESHOLD: f64 = 0.6;

/// Ordered trait strings for `candidate`
///
/// Deterministic: the same candidate always yields the same sequence.
pub fn trait_sequence(candidate: Option<&Candidate>) -> Vec<String> {
    let Some(candidate) = candidate else {
        return fallback();
    };

    let mut traits = Vec::with_capacity(4);
    if let Some(score) = candidate.compatibility_score {
        traits.push(format!("{:.0}% compatibility signal", score * 100.0));
    }
    if let Some(interest) = candidate.shared_interests.first() {
        traits.push(format!("{} synergy", interest));
    }
    if let Some(score) = candidate.schedule_score {
        traits.push(format!("{}% schedule overlap", (score * 100.0).round()));
    }
    if let Some(score) = candidate.personality_score {
        traits.push(if score > PERSONALITY_SYNC_THRESHOLD {
            "Personalities in sync".to_string()
        } else {
            "Complementary personalities".to_string()
        });
    }

    if traits.is_empty() {
        fallback()
    } else {
        traits
    }
}

fn fallback() -> Vec<String> {
    FALLBACK_TRAITS.iter().map(|s| s.to_string()).collect()
}
