use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the in-memory auction model (ledger, catalog, effects).
///
/// Every operation that returns one of these leaves the model untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    /// No team is registered under the given name.
    #[error("team `{0}` not found")]
    TeamNotFound(String),
    /// No product exists with the given identifier.
    #[error("product `{0}` not found")]
    ProductNotFound(Uuid),
    /// A team with the same name already exists.
    #[error("team name `{0}` already exists")]
    DuplicateName(String),
    /// The debited team does not hold enough points.
    #[error("team `{team}` has {available} points, {requested} requested")]
    InsufficientBalance {
        /// Team whose balance was too low.
        team: String,
        /// Points currently held.
        available: u32,
        /// Points the operation needed.
        requested: u32,
    },
    /// The team has no mystery card left to spend.
    #[error("team `{0}` has no mystery cards available")]
    NoCardsAvailable(String),
    /// The effect targets the team that owns the card.
    #[error("team `{0}` cannot target itself")]
    InvalidTarget(String),
    /// A targeted effect was requested without a target team.
    #[error("{0} effect requires a target team")]
    MissingTarget(String),
    /// Product fields are missing or inconsistent.
    #[error("invalid product: {0}")]
    InvalidProduct(String),
    /// The amount is zero or otherwise unusable.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}
