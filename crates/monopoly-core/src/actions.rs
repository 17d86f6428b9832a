//! Turn outcomes, notification events, and the card-effect seam.
//!
//! Rolls produce a [`TurnOutcome`], consumed immediately by the caller for
//! display and never stored. Non-roll commands produce a [`GameEvent`] that
//! the wallet collaborator mirrors externally; balances carried on events are
//! always read from the post-transaction state.

use crate::board::{PlayerId, Position, Tile};
use crate::player::Player;
use serde::{Deserialize, Serialize};

/// What happened on the tile a move ended on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandingEffect {
    /// Safe tile, no balance effect
    None,
    /// Landed on a tax tile
    TaxPaid { amount: i64 },
    /// Landed on another player's property; `owner_balance` is the owner's
    /// balance after the credit, read from post-transfer state like every
    /// balance on [`GameEvent`]
    RentPaid {
        owner: PlayerId,
        amount: i64,
        owner_balance: i64,
    },
    /// Landed on Go To Jail
    SentToJail,
    /// Chance / community chest delta supplied by the card resolver
    CardApplied {
        balance_delta: i64,
        moved_to: Option<Position>,
    },
}

/// Result of one roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Who rolled
    pub player: PlayerId,
    /// The two dice
    pub dice: (u8, u8),
    /// Sum of the dice
    pub total: u8,
    /// Both dice equal; the same player rolls again
    pub is_double: bool,
    /// Whether the move wrapped past Go and paid the bonus
    pub passed_start: bool,
    /// Effect applied on landing
    pub landing: LandingEffect,
    /// Acting player's position after the move (post-redirect)
    pub position: Position,
    /// Acting player's balance after every effect of this roll
    pub balance: i64,
}

/// Notifications emitted by non-roll commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The game started; the first player acts
    GameStarted { first_player: PlayerId },
    GamePaused,
    GameResumed,
    GameEnded,
    /// A property was bought
    PropertyPurchased {
        player: PlayerId,
        position: Position,
        price: i64,
        balance: i64,
    },
    /// An improvement was built
    ImprovementBuilt {
        player: PlayerId,
        position: Position,
        level: u8,
        cost: i64,
        balance: i64,
    },
    /// Bail was paid and the player released
    BailPaid {
        player: PlayerId,
        cost: i64,
        balance: i64,
    },
}

/// Balance/position delta returned by a drawn card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEffect {
    /// Applied to the drawing player's balance (may be negative)
    pub balance_delta: i64,
    /// Forced move; applied without landing resolution or the start bonus
    pub move_to: Option<Position>,
}

/// Chance / community-chest collaborator.
///
/// Deck contents are not part of the core. The engine applies whatever delta
/// a draw returns inside the same state update as the rest of the roll.
pub trait CardResolver {
    /// Draw a card for the player who landed on `tile`
    fn draw(&mut self, player: &Player, tile: &Tile) -> Option<CardEffect>;
}

/// The empty effect table: every draw is a no-op
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCards;

impl CardResolver for NoCards {
    fn draw(&mut self, _player: &Player, _tile: &Tile) -> Option<CardEffect> {
        None
    }
}
