//! Player state and the joined-player roster.
//!
//! This module contains:
//! - Player struct with balance, position, jail status, and holdings
//! - PlayerRegistry enforcing identity uniqueness and the roster cap
//!
//! Join order is canonical turn order; the registry never reorders.

use crate::board::{PlayerId, Position};
use crate::game::GameError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum number of players in one game
pub const MAX_PLAYERS: usize = 4;

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Opaque identity supplied at join time
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Current balance; may dip below zero only within a single command
    pub balance: i64,
    /// Board position (0-39)
    pub position: Position,
    /// Whether the player is incarcerated
    pub in_jail: bool,
    /// Turns left to sit out unless bail is paid
    pub jail_turns_remaining: u8,
    /// Positions this player owns; mirrors the board overlay
    pub owned_positions: BTreeSet<Position>,
    /// Reserved for bankruptcy/elimination
    pub is_active: bool,
    /// Reserved; card decks are an external effect table
    pub get_out_of_jail_cards: u8,
}

impl Player {
    pub(crate) fn new(id: PlayerId, name: String, starting_balance: i64) -> Self {
        Self {
            id,
            name,
            balance: starting_balance,
            position: 0,
            in_jail: false,
            jail_turns_remaining: 0,
            owned_positions: BTreeSet::new(),
            is_active: true,
            get_out_of_jail_cards: 0,
        }
    }

    /// Whether this player owns the given position
    pub fn owns(&self, position: Position) -> bool {
        self.owned_positions.contains(&position)
    }
}

/// Players who have joined, in join order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    /// Empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player to the roster.
    ///
    /// Fails if the identity is already present or the roster is full. The
    /// new player starts at position 0 with the given balance, out of jail,
    /// holding nothing, appended to the turn order.
    pub fn join(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
        starting_balance: i64,
    ) -> Result<&Player, GameError> {
        if self.players.iter().any(|p| p.id == id) {
            return Err(GameError::AlreadyJoined);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::RosterFull);
        }

        let index = self.players.len();
        self.players.push(Player::new(id, name.into(), starting_balance));
        Ok(&self.players[index])
    }

    /// Look up a player by identity
    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == *id)
    }

    pub(crate) fn get_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == *id)
    }

    /// Player at a turn-order index
    pub fn at(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub(crate) fn at_mut(&mut self, index: usize) -> Option<&mut Player> {
        self.players.get_mut(index)
    }

    /// All players in join order
    pub fn all(&self) -> &[Player] {
        &self.players
    }

    /// Number of joined players
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether nobody has joined yet
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
