use serde::{Deserialize, Serialize};

/// Experience needed per "step" of the level curve. Level `L` spans
/// `[(L-1)^2 * STEP, L^2 * STEP)`.
const EXPERIENCE_STEP: i64 = 100;

/// Fixed experience grants for content creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExperienceReward {
    Post,
    ForumThread,
    ForumReply,
    Project,
}

impl ExperienceReward {
    pub const fn amount(self) -> i64 {
        match self {
            ExperienceReward::Post => 10,
            ExperienceReward::ForumThread => 20,
            ExperienceReward::ForumReply => 5,
            ExperienceReward::Project => 50,
        }
    }
}

/// `floor(sqrt(experience / 100)) + 1`. Negative input counts as zero.
pub fn level_for_experience(experience: i64) -> i64 {
    integer_sqrt(experience.max(0) / EXPERIENCE_STEP) + 1
}

/// Experience at which `level` rolls over into `level + 1`.
pub fn next_level_experience(level: i64) -> i64 {
    let level = level.max(1);
    level.saturating_mul(level).saturating_mul(EXPERIENCE_STEP)
}

fn integer_sqrt(n: i64) -> i64 {
    if n < 2 {
        return n.max(0);
    }
    let mut root = (n as f64).sqrt() as i64;
    // the float estimate can be off by one near perfect squares
    while root.checked_mul(root).map_or(true, |sq| sq > n) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).is_some_and(|sq| sq <= n) {
        root += 1;
    }
    root
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progression {
    pub experience: i64,
    pub level: i64,
}

impl Progression {
    pub fn apply(experience: i64, amount: i64) -> Self {
        let experience = experience.max(0).saturating_add(amount.max(0));
        Self {
            experience,
            level: level_for_experience(experience),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub level: i64,
    pub experience: i64,
    pub next_level_experience: i64,
}

impl LevelInfo {
    pub fn from_experience(experience: i64) -> Self {
        let level = level_for_experience(experience);
        Self {
            level,
            experience,
            next_level_experience: next_level_experience(level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_experience(0), 1);
        assert_eq!(level_for_experience(99), 1);
        assert_eq!(level_for_experience(100), 2);
        assert_eq!(level_for_experience(399), 2);
        assert_eq!(level_for_experience(400), 3);
        assert_eq!(level_for_experience(899), 3);
        assert_eq!(level_for_experience(900), 4);
        assert_eq!(level_for_experience(-50), 1);
    }

    #[test]
    fn level_is_monotonic() {
        let mut previous = level_for_experience(0);
        for xp in 1..50_000 {
            let level = level_for_experience(xp);
            assert!(level >= previous, "level dropped at {xp}");
            previous = level;
        }
    }

    #[test]
    fn threshold_matches_level_formula() {
        for xp in 0..50_000 {
            let level = level_for_experience(xp);
            assert!(xp < next_level_experience(level), "xp {xp} already past threshold of level {level}");
            if level > 1 {
                assert!(xp >= next_level_experience(level - 1));
            }
            assert_eq!(level_for_experience(next_level_experience(level)), level + 1);
        }
    }

    #[test]
    fn integer_sqrt_is_exact_for_large_values() {
        assert_eq!(integer_sqrt(i64::MAX), 3_037_000_499);
        assert_eq!(integer_sqrt(3_037_000_499 * 3_037_000_499), 3_037_000_499);
        assert_eq!(integer_sqrt(3_037_000_499 * 3_037_000_499 - 1), 3_037_000_498);
    }

    #[test]
    fn apply_recomputes_from_total() {
        let progression = Progression::apply(95, 10);
        assert_eq!(progression, Progression { experience: 105, level: 2 });
        assert_eq!(Progression::apply(i64::MAX - 1, 10).experience, i64::MAX);
    }

    #[test]
    fn reward_amounts() {
        assert_eq!(ExperienceReward::Post.amount(), 10);
        assert_eq!(ExperienceReward::ForumThread.amount(), 20);
        assert_eq!(ExperienceReward::ForumReply.amount(), 5);
        assert_eq!(ExperienceReward::Project.amount(), 50);
    }

    #[test]
    fn level_info_serializes_camel_case() {
        let info = LevelInfo::from_experience(150);
        let json = serde_json::to_value(info).unwrap();
        assert_eq!(json["level"], 2);
        assert_eq!(json["nextLevelExperience"], 400);
    }
}
