// ============================================
// src/scoring.rs
// Running score, streaks and end-of-game grades
// ============================================

use serde::{Deserialize, Serialize};

/// Score state kept by every game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub score: u32,
    pub correct: u32,
    pub wrong: u32,
    pub streak: u32,
    pub max_streak: u32,
}

impl Tally {
    /// A correct answer worth `points`.
    pub fn award(&mut self, points: u32) {
        self.score += points;
        self.correct += 1;
        self.streak += 1;
        self.max_streak = self.max_streak.max(self.streak);
    }

    /// Points that do not count as a correct answer (bonuses, pops).
    pub fn add_points(&mut self, points: u32) {
        self.score += points;
    }

    pub fn deduct(&mut self, points: u32) {
        self.score = self.score.saturating_sub(points);
    }

    pub fn miss(&mut self) {
        self.wrong += 1;
        self.streak = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn label(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

/// Messages for the A+, A, B, C and failing bands, plus the failing grade.
#[derive(Debug, Clone, Copy)]
pub struct GradeScale {
    pub messages: [&'static str; 5],
    pub fail: Grade,
}

pub const STANDARD_SCALE: GradeScale = GradeScale {
    messages: ["Excellent!", "Great Job!", "Good Work!", "Keep Trying!", "Practice More!"],
    fail: Grade::D,
};

pub fn percentage(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

impl GradeScale {
    pub fn grade(&self, correct: u32, total: u32) -> (Grade, &'static str) {
        let pct = percentage(correct, total);
        if pct >= 90.0 {
            (Grade::APlus, self.messages[0])
        } else if pct >= 80.0 {
            (Grade::A, self.messages[1])
        } else if pct >= 70.0 {
            (Grade::B, self.messages[2])
        } else if pct >= 60.0 {
            (Grade::C, self.messages[3])
        } else {
            (self.fail, self.messages[4])
        }
    }
}

/// Picks the message of the highest threshold `value` reaches.
/// `table` is ordered from the highest threshold down.
pub fn threshold_message(value: u32, table: &[(u32, &'static str)], fallback: &'static str) -> &'static str {
    table
        .iter()
        .find(|(min, _)| value >= *min)
        .map(|(_, message)| *message)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn award_tracks_streaks() {
        let mut tally = Tally::default();
        tally.award(10);
        tally.award(10);
        tally.miss();
        tally.award(5);
        assert_eq!(tally.score, 25);
        assert_eq!(tally.correct, 3);
        assert_eq!(tally.wrong, 1);
        assert_eq!(tally.streak, 1);
        assert_eq!(tally.max_streak, 2);
    }

    #[test]
    fn deduct_saturates_at_zero() {
        let mut tally = Tally::default();
        tally.add_points(5);
        tally.deduct(10);
        assert_eq!(tally.score, 0);
        assert_eq!(tally.correct, 0);
    }

    #[test]
    fn grade_bands() {
        assert_eq!(STANDARD_SCALE.grade(9, 10), (Grade::APlus, "Excellent!"));
        assert_eq!(STANDARD_SCALE.grade(8, 10).0, Grade::A);
        assert_eq!(STANDARD_SCALE.grade(7, 10).0, Grade::B);
        assert_eq!(STANDARD_SCALE.grade(6, 10).0, Grade::C);
        assert_eq!(STANDARD_SCALE.grade(5, 10), (Grade::D, "Practice More!"));
        assert_eq!(STANDARD_SCALE.grade(0, 0).0, Grade::D);
    }

    #[test]
    fn threshold_message_picks_highest_band() {
        let table = [(10, "master"), (5, "good")];
        assert_eq!(threshold_message(12, &table, "keep going"), "master");
        assert_eq!(threshold_message(5, &table, "keep going"), "good");
        assert_eq!(threshold_message(1, &table, "keep going"), "keep going");
    }
}
