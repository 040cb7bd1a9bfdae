//! Two-bit saturating direction counter.
//!
//! Each direction-table slot holds one of four states. An update moves the
//! state one step toward the resolved outcome and clamps at the strong ends.

/// State of a two-bit saturating branch-direction counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SaturatingState {
    /// Strongly predicts not-taken; absorbing under not-taken updates.
    StrongNotTaken,
    /// Weakly predicts not-taken. Reset state of every slot.
    #[default]
    WeakNotTaken,
    /// Weakly predicts taken.
    WeakTaken,
    /// Strongly predicts taken; absorbing under taken updates.
    StrongTaken,
}

impl SaturatingState {
    /// All states, ordered from not-taken to taken.
    pub const ALL: [Self; 4] = [
        Self::StrongNotTaken,
        Self::WeakNotTaken,
        Self::WeakTaken,
        Self::StrongTaken,
    ];

    /// One step toward taken.
    #[must_use]
    pub const fn increment(self) -> Self {
        match self {
            Self::StrongNotTaken => Self::WeakNotTaken,
            Self::WeakNotTaken => Self::WeakTaken,
            Self::WeakTaken | Self::StrongTaken => Self::StrongTaken,
        }
    }

    /// One step toward not-taken.
    #[must_use]
    pub const fn decrement(self) -> Self {
        match self {
            Self::StrongNotTaken | Self::WeakNotTaken => Self::StrongNotTaken,
            Self::WeakTaken => Self::WeakNotTaken,
            Self::StrongTaken => Self::WeakTaken,
        }
    }

    /// Applies a resolved outcome.
    #[must_use]
    pub const fn train(self, taken: bool) -> Self {
        if taken {
            self.increment()
        } else {
            self.decrement()
        }
    }

    /// Direction this state predicts.
    pub const fn predicts_taken(self) -> bool {
        matches!(self, Self::WeakTaken | Self::StrongTaken)
    }

    /// Two-bit encoding (`0b00` = strong not-taken .. `0b11` = strong taken).
    pub const fn bits(self) -> u8 {
        self as u8
    }
}
