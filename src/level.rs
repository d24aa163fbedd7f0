/// Coarse rank shown on the game-over card
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum_macros::Display)]
pub enum Level {
    Beginner,
    Apprentice,
    Intermediate,
    Advanced,
    Master,
}

impl Level {
    pub fn from_correct(correct_count: u32) -> Self {
        match correct_count {
            0..=2 => Level::Beginner,
            3..=6 => Level::Apprentice,
            7..=11 => Level::Intermediate,
            12..=17 => Level::Advanced,
            _ => Level::Master,
        }
    }

    /// 1-based rank number
    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }
}
