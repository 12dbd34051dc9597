use crate::component::DiceRoll;
use rand::Rng;

/// The result of rolling a [`DiceRoll`] check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceOutcome {
    /// The rolled value, in `1..=sides`.
    pub value: i32,
    /// `true` iff `value >= threshold`.
    pub success: bool,
}

impl DiceRoll {
    /// Rolls this check with the caller's RNG.
    ///
    /// The executor never calls this — it is handed outcomes through
    /// [`FlowExecutor::apply_dice_outcome`](crate::flow::FlowExecutor::apply_dice_outcome).
    /// Hosts and the standalone player roll here; tests pass a seeded
    /// `StdRng` for determinism. A `sides` below 1 is clamped to 1.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceOutcome {
        let sides = self.sides.max(1);
        let value = rng.random_range(1..=sides);
        DiceOutcome {
            value,
            success: value >= self.threshold,
        }
    }
}
