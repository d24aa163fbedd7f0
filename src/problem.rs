use rand::Rng;

/// Smallest value a session can open with
pub const MIN_START: u64 = 2;
/// Largest value a session can open with
pub const MAX_START: u64 = 10;

/// The `value + value` question currently on screen.
///
/// `sum` is always `value * 2`; the only way to build one is through
/// [`Problem::new`], which refuses values whose double does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Problem {
    value: u64,
    sum: u64,
}

impl Problem {
    pub fn new(value: u64) -> Option<Self> {
        value.checked_mul(2).map(|sum| Self { value, sum })
    }

    /// Random opening question in `[MIN_START, MAX_START]`
    pub fn starting<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let value = rng.gen_range(MIN_START..=MAX_START);
        Self {
            value,
            sum: value * 2,
        }
    }

    /// The following round doubles again: the old sum becomes the new value.
    pub fn next(&self) -> Option<Self> {
        Self::new(self.sum)
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn sum(&self) -> u64 {
        self.sum
    }

    pub fn is_answered_by(&self, input: &str) -> bool {
        !input.is_empty() && input == self.sum.to_string()
    }
}
