//! Types that represent the core data model, such as `Expense` and `ActiveChallenge`.
mod amount;
mod challenge;
mod expense;
mod favorite;

pub use amount::{Amount, AmountError};
pub use challenge::{
    catalog, ActiveChallenge, ChallengeDefinition, ChallengeKind, CompletedChallenge,
    TargetCategory, ALL_CATEGORIES,
};
pub use expense::{Expense, ExpenseUpdates};
pub use favorite::{Favorite, DEFAULT_EMOJI};
