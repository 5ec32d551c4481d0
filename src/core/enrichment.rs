use crate::models::{Candidate, EnrichedCandidate, MatchCategory};

/// Tag fragments that mark a shared academic interest
pub const STUDY_KEYWORDS: [&str; 3] = ["study", "academic", "research"];

/// Tag fragments that mark a shared hobby
pub const ACTIVITY_KEYWORDS: [&str; 4] = ["sports", "music", "gaming", "art"];

/// Score above which an untagged candidate is treated as a potential date.
/// The boundary is exclusive.
pub const POTENTIAL_DATE_THRESHOLD: f64 = 0.8;

const STUDY_BUDDY_ACTIVITIES: [&str; 3] = [
    "📚 Study session at library",
    "💻 Coding practice together",
    "🧪 Lab work collaboration",
];

const ACTIVITY_PARTNER_ACTIVITIES: [&str; 3] = [
    "🎵 Jam session",
    "⚽ Sports activity",
    "🎮 Gaming tournament",
];

const FRIEND_ACTIVITIES: [&str; 3] = [
    "☕ Coffee chat",
    "🍕 Campus food tour",
    "🎬 Movie night",
];

const POTENTIAL_DATE_ACTIVITIES: [&str; 3] = [
    "🌅 Campus walk",
    "📖 Book discussion",
    "🎨 Art gallery visit",
];

/// Enrich a ranked candidate with its category and a suggested activity
///
/// Total and pure: the same candidate always yields the same output.
pub fn enrich(candidate: Candidate) -> EnrichedCandidate {
    let category = categorize(&candidate);
    let suggested_activity = suggest_activity(category, &candidate.user_id).to_string();

    EnrichedCandidate {
        candidate,
        category,
        suggested_activity,
    }
}

/// Assign a relationship category
///
/// Priority, first match wins:
/// 1. any study/academic/research tag -> study buddy
/// 2. any sports/music/gaming/art tag -> activity partner
/// 3. score > 0.8 -> potential date
/// 4. friend
pub fn categorize(candidate: &Candidate) -> MatchCategory {
    if has_keyword(&candidate.common_interests, &STUDY_KEYWORDS) {
        return MatchCategory::StudyBuddy;
    }

    if has_keyword(&candidate.common_interests, &ACTIVITY_KEYWORDS) {
        return MatchCategory::ActivityPartner;
    }

    if candidate.compatibility_score > POTENTIAL_DATE_THRESHOLD {
        return MatchCategory::PotentialDate;
    }

    MatchCategory::Friend
}

/// Activities offered for a category
pub fn activities_for(category: MatchCategory) -> &'static [&'static str; 3] {
    match category {
        MatchCategory::StudyBuddy => &STUDY_BUDDY_ACTIVITIES,
        MatchCategory::ActivityPartner => &ACTIVITY_PARTNER_ACTIVITIES,
        MatchCategory::Friend => &FRIEND_ACTIVITIES,
        MatchCategory::PotentialDate => &POTENTIAL_DATE_ACTIVITIES,
    }
}

/// Pick an activity keyed by the candidate's user id
pub fn suggest_activity(category: MatchCategory, user_id: &str) -> &'static str {
    let activities = activities_for(category);
    let index = (stable_hash(user_id) % activities.len() as u64) as usize;
    activities[index]
}

/// Case-insensitive substring match of any tag against any keyword
#[inline]
fn has_keyword(tags: &[String], keywords: &[&str]) -> bool {
    tags.iter().any(|tag| {
        let tag = tag.to_lowercase();
        keywords.iter().any(|keyword| tag.contains(keyword))
    })
}

/// 64-bit FNV-1a. Stable across builds and platforms, unlike `DefaultHasher`.
#[inline]
fn stable_hash(value: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    value.bytes().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, score: f64, tags: &[&str]) -> Candidate {
        Candidate::new(id, score, tags.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn test_study_tag_wins_over_score() {
        let c = candidate("u1", 0.95, &["Research Methods", "music"]);
        assert_eq!(categorize(&c), MatchCategory::StudyBuddy);
    }

    #[test]
    fn test_activity_tag() {
        let c = candidate("u1", 0.95, &["Indie Music"]);
        assert_eq!(categorize(&c), MatchCategory::ActivityPartner);
    }

    #[test]
    fn test_keyword_is_substring_match() {
        // "artificial" contains "art"
        let c = candidate("u1", 0.1, &["artificial intelligence"]);
        assert_eq!(categorize(&c), MatchCategory::ActivityPartner);
    }

    #[test]
    fn test_score_threshold_is_exclusive() {
        assert_eq!(categorize(&candidate("u1", 0.8, &[])), MatchCategory::Friend);
        assert_eq!(categorize(&candidate("u1", 0.81, &[])), MatchCategory::PotentialDate);
    }

    #[test]
    fn test_uncategorizable_tags_fall_through() {
        let c = candidate("u1", 0.3, &["hiking", "cooking"]);
        assert_eq!(categorize(&c), MatchCategory::Friend);
    }

    #[test]
    fn test_activity_belongs_to_category() {
        let enriched = enrich(candidate("abc", 0.5, &["study"]));
        assert!(activities_for(MatchCategory::StudyBuddy).contains(&enriched.suggested_activity.as_str()));
    }

    #[test]
    fn test_enrich_is_deterministic() {
        let c = candidate("user-42", 0.9, &[]);
        assert_eq!(enrich(c.clone()), enrich(c));
    }

    #[test]
    fn test_stable_hash_known_values() {
        assert_eq!(stable_hash(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(stable_hash("a"), 0xaf63_dc4c_8601_ec8c);
    }
}
