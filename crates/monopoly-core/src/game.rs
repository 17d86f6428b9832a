//! Core game state machine.
//!
//! This module contains the main `GameState` struct and all game logic:
//! the lifecycle machine, turn sequencing (roll, move, resolve the landing
//! effect, advance), and player-initiated transactions (buy, build, bail).
//!
//! Every command validates fully before writing, and every write of one
//! command lands before the command returns. Rent transfers in particular
//! debit and credit inside the same update; no caller can observe one side
//! without the other.

use crate::actions::{CardResolver, GameEvent, LandingEffect, TurnOutcome};
use crate::board::{
    Board, BoardState, PlayerId, Position, TileKind, BOARD_SIZE, JAIL_POSITION,
    MAX_IMPROVEMENT_LEVEL,
};
use crate::player::{Player, PlayerRegistry};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Credited when a move wraps past Go
pub const PASSING_START_BONUS: i64 = 200;

/// Cost to leave jail early
pub const BAIL_COST: i64 = 50;

/// Turns a player sits out when sent to jail
pub const JAIL_TERM: u8 = 3;

/// Minimum players before the game can start
pub const MIN_PLAYERS: usize = 2;

/// Game lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Players may join; no turns yet
    NotStarted,
    /// Turns are being played
    InProgress,
    /// Suspended; resumable
    Paused,
    /// Terminal
    Ended,
}

/// Errors that can occur when applying commands
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("identity already joined")]
    AlreadyJoined,

    #[error("roster is full")]
    RosterFull,

    #[error("need at least 2 players to start")]
    InsufficientPlayers,

    #[error("unknown player")]
    UnknownPlayer,

    #[error("not your turn")]
    WrongTurn,

    #[error("invalid lifecycle transition")]
    InvalidTransition,

    #[error("current tile cannot be purchased")]
    NotPurchasable,

    #[error("property already owned")]
    AlreadyOwned,

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("not the owner of this property")]
    NotOwner,

    #[error("improvement cap reached")]
    ImprovementCap,

    #[error("only streets can be improved")]
    NotImprovable,

    #[error("not in jail")]
    NotInJail,

    #[error("not implemented")]
    NotImplemented,
}

/// Read-only projection of the game for presentation.
///
/// Cloned snapshot; holding one never aliases live game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub lifecycle: Lifecycle,
    pub current_player: Option<PlayerId>,
    pub players: Vec<Player>,
}

/// The complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Immutable tile catalog
    board: Board,
    /// Per-game overlay (owners, improvements)
    board_state: BoardState,
    /// Joined players in turn order
    players: PlayerRegistry,
    lifecycle: Lifecycle,
    /// Index into the roster; meaningful only while in progress
    current_player_index: usize,
}

impl GameState {
    /// New game on the standard board, nobody joined
    pub fn new() -> Self {
        Self::with_board(Board::standard())
    }

    /// New game on a custom catalog
    pub fn with_board(board: Board) -> Self {
        Self {
            board,
            board_state: BoardState::new(),
            players: PlayerRegistry::new(),
            lifecycle: Lifecycle::NotStarted,
            current_player_index: 0,
        }
    }

    // ==================== Roster ====================

    /// Add a player to the game.
    ///
    /// Identity, display name, and starting balance come from the identity
    /// collaborator. Join order is turn order.
    pub fn join(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
        starting_balance: i64,
    ) -> Result<&Player, GameError> {
        let player = self.players.join(id, name, starting_balance)?;
        info!(player = %player.id, balance = player.balance, "player joined");
        Ok(player)
    }

    // ==================== Lifecycle ====================

    /// Start the game. Requires at least two joined players.
    pub fn start(&mut self) -> Result<GameEvent, GameError> {
        if self.lifecycle != Lifecycle::NotStarted {
            return Err(GameError::InvalidTransition);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::InsufficientPlayers);
        }

        self.lifecycle = Lifecycle::InProgress;
        self.current_player_index = 0;

        let first_player = self.players.all()[0].id.clone();
        info!(player = %first_player, "game started");
        Ok(GameEvent::GameStarted { first_player })
    }

    /// Pause a game in progress
    pub fn pause(&mut self) -> Result<GameEvent, GameError> {
        if self.lifecycle != Lifecycle::InProgress {
            return Err(GameError::InvalidTransition);
        }
        self.lifecycle = Lifecycle::Paused;
        info!("game paused");
        Ok(GameEvent::GamePaused)
    }

    /// Resume a paused game
    pub fn resume(&mut self) -> Result<GameEvent, GameError> {
        if self.lifecycle != Lifecycle::Paused {
            return Err(GameError::InvalidTransition);
        }
        self.lifecycle = Lifecycle::InProgress;
        info!("game resumed");
        Ok(GameEvent::GameResumed)
    }

    /// End the game from any non-terminal state
    pub fn end(&mut self) -> Result<GameEvent, GameError> {
        if self.lifecycle == Lifecycle::Ended {
            return Err(GameError::InvalidTransition);
        }
        self.lifecycle = Lifecycle::Ended;
        info!("game ended");
        Ok(GameEvent::GameEnded)
    }

    // ==================== Turn resolution ====================

    /// Roll two dice for the acting player and resolve the move.
    pub fn roll_and_resolve(
        &mut self,
        acting: &PlayerId,
        cards: &mut dyn CardResolver,
    ) -> Result<TurnOutcome, GameError> {
        let mut rng = rand::thread_rng();
        let dice = (rng.gen_range(1..=6), rng.gen_range(1..=6));
        self.roll_and_resolve_with(acting, dice, cards)
    }

    /// Resolve a move with an explicit dice pair.
    ///
    /// Deterministic entry point for replays and tests. Dice outside 1-6 are
    /// a programming error.
    pub fn roll_and_resolve_with(
        &mut self,
        acting: &PlayerId,
        dice: (u8, u8),
        cards: &mut dyn CardResolver,
    ) -> Result<TurnOutcome, GameError> {
        assert!(
            (1..=6).contains(&dice.0) && (1..=6).contains(&dice.1),
            "dice values must be in 1-6"
        );

        if self.lifecycle != Lifecycle::InProgress {
            return Err(GameError::InvalidTransition);
        }

        let index = self.current_player_index;
        let current = self.players.at(index).ok_or(GameError::WrongTurn)?;
        if current.id != *acting {
            return Err(GameError::WrongTurn);
        }

        let total = dice.0 + dice.1;
        let is_double = dice.0 == dice.1;
        let old_position = current.position;
        let new_position = (old_position + total) % BOARD_SIZE;
        let passed_start = new_position < old_position;

        // Validation done. Everything below is the single state update for
        // this roll; the outcome is read back from state after all writes.
        {
            let p = self.players.at_mut(index).unwrap();
            p.position = new_position;
            if passed_start {
                p.balance += PASSING_START_BONUS;
            }
        }

        let tile = self.board.tile(new_position).clone();
        let landing = match tile.kind {
            TileKind::Tax => {
                let amount = tile.tax_amount.unwrap_or(0);
                self.players.at_mut(index).unwrap().balance -= amount;
                LandingEffect::TaxPaid { amount }
            }

            TileKind::GoToJail => {
                let p = self.players.at_mut(index).unwrap();
                p.position = JAIL_POSITION;
                p.in_jail = true;
                p.jail_turns_remaining = JAIL_TERM;
                LandingEffect::SentToJail
            }

            TileKind::Chance | TileKind::CommunityChest => {
                let effect = cards.draw(self.players.at(index).unwrap(), &tile);
                match effect {
                    Some(effect) => {
                        let p = self.players.at_mut(index).unwrap();
                        p.balance += effect.balance_delta;
                        if let Some(dest) = effect.move_to {
                            assert!(dest < BOARD_SIZE, "card destination {dest} out of range");
                            p.position = dest;
                        }
                        LandingEffect::CardApplied {
                            balance_delta: effect.balance_delta,
                            moved_to: effect.move_to,
                        }
                    }
                    None => LandingEffect::None,
                }
            }

            kind if kind.is_purchasable() => {
                match self.board_state.owner(new_position).cloned() {
                    Some(owner) if owner != *acting => {
                        let level = self.board_state.tile(new_position).improvement_level;
                        let amount = tile.rent_at(level);
                        self.players.at_mut(index).unwrap().balance -= amount;
                        let creditor = self.players.get_mut(&owner).unwrap();
                        creditor.balance += amount;
                        let owner_balance = creditor.balance;
                        LandingEffect::RentPaid {
                            owner,
                            amount,
                            owner_balance,
                        }
                    }
                    // Unowned or self-owned: no transfer
                    _ => LandingEffect::None,
                }
            }

            _ => LandingEffect::None,
        };

        // A double keeps the turn; otherwise advance in join order
        if !is_double {
            self.current_player_index = (self.current_player_index + 1) % self.players.len();
        }

        let p = self.players.at(index).unwrap();
        let outcome = TurnOutcome {
            player: p.id.clone(),
            dice,
            total,
            is_double,
            passed_start,
            landing,
            position: p.position,
            balance: p.balance,
        };
        debug!(
            player = %outcome.player,
            dice = ?outcome.dice,
            position = outcome.position,
            balance = outcome.balance,
            "turn resolved"
        );
        Ok(outcome)
    }

    // ==================== Transactions ====================

    /// Buy the property the acting player is standing on.
    pub fn buy_property(&mut self, acting: &PlayerId) -> Result<GameEvent, GameError> {
        if self.lifecycle != Lifecycle::InProgress {
            return Err(GameError::InvalidTransition);
        }

        let (position, balance) = {
            let p = self.players.get(acting).ok_or(GameError::UnknownPlayer)?;
            (p.position, p.balance)
        };

        let tile = self.board.tile(position);
        if !tile.kind.is_purchasable() {
            return Err(GameError::NotPurchasable);
        }
        if self.board_state.owner(position).is_some() {
            return Err(GameError::AlreadyOwned);
        }

        let price = tile.price.unwrap_or(0);
        if balance < price {
            return Err(GameError::InsufficientFunds);
        }

        // All checks passed; board and player mutate together
        self.board_state.tile_mut(position).owner = Some(acting.clone());
        let p = self.players.get_mut(acting).unwrap();
        p.balance -= price;
        p.owned_positions.insert(position);
        let balance = p.balance;

        info!(player = %acting, position, price, "property purchased");
        Ok(GameEvent::PropertyPurchased {
            player: acting.clone(),
            position,
            price,
            balance,
        })
    }

    /// Build one improvement on a street the acting player owns.
    ///
    /// Cost is half the purchase price. Railroads and utilities can be owned
    /// but never improved; their rent schedules index off ownership alone.
    pub fn build_improvement(
        &mut self,
        acting: &PlayerId,
        position: Position,
    ) -> Result<GameEvent, GameError> {
        let state = self.board_state.tile(position);
        if state.owner.as_ref() != Some(acting) {
            return Err(GameError::NotOwner);
        }
        if self.board.tile(position).kind != TileKind::Property {
            return Err(GameError::NotImprovable);
        }
        if state.improvement_level >= MAX_IMPROVEMENT_LEVEL {
            return Err(GameError::ImprovementCap);
        }

        let cost = self.board.tile(position).price.unwrap_or(0) / 2;
        let balance = self
            .players
            .get(acting)
            .ok_or(GameError::UnknownPlayer)?
            .balance;
        if balance < cost {
            return Err(GameError::InsufficientFunds);
        }

        let entry = self.board_state.tile_mut(position);
        entry.improvement_level += 1;
        let level = entry.improvement_level;
        let p = self.players.get_mut(acting).unwrap();
        p.balance -= cost;
        let balance = p.balance;

        info!(player = %acting, position, level, cost, "improvement built");
        Ok(GameEvent::ImprovementBuilt {
            player: acting.clone(),
            position,
            level,
            cost,
            balance,
        })
    }

    /// Pay bail and leave jail immediately.
    pub fn pay_bail(&mut self, acting: &PlayerId) -> Result<GameEvent, GameError> {
        let p = self.players.get(acting).ok_or(GameError::UnknownPlayer)?;
        if !p.in_jail {
            return Err(GameError::NotInJail);
        }
        if p.balance < BAIL_COST {
            return Err(GameError::InsufficientFunds);
        }

        let p = self.players.get_mut(acting).unwrap();
        p.balance -= BAIL_COST;
        p.in_jail = false;
        p.jail_turns_remaining = 0;
        let balance = p.balance;

        info!(player = %acting, "bail paid");
        Ok(GameEvent::BailPaid {
            player: acting.clone(),
            cost: BAIL_COST,
            balance,
        })
    }

    /// Reserved extension point; always fails with
    /// [`GameError::NotImplemented`].
    pub fn mortgage_property(
        &mut self,
        _acting: &PlayerId,
        _position: Position,
    ) -> Result<GameEvent, GameError> {
        Err(GameError::NotImplemented)
    }

    // ==================== Projections ====================

    /// Current lifecycle state
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// The tile catalog
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The per-game board overlay
    pub fn board_state(&self) -> &BoardState {
        &self.board_state
    }

    /// The joined players in turn order
    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    /// The player whose turn it is, while the game is in progress
    pub fn current_player(&self) -> Option<&Player> {
        if self.lifecycle != Lifecycle::InProgress {
            return None;
        }
        self.players.at(self.current_player_index)
    }

    /// Snapshot of the game for presentation
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            lifecycle: self.lifecycle,
            current_player: self.current_player().map(|p| p.id.clone()),
            players: self.players.all().to_vec(),
        }
    }

    /// Summary as a JSON string
    pub fn summary_json(&self) -> String {
        serde_json::to_string(&self.summary()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Serialize the whole game (save/replay path)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore a game serialized with [`GameState::to_json`]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{CardEffect, NoCards};
    use pretty_assertions::assert_eq;

    fn alice() -> PlayerId {
        PlayerId::new("0xalice")
    }

    fn bob() -> PlayerId {
        PlayerId::new("0xbob")
    }

    fn two_player_game() -> GameState {
        let mut game = GameState::new();
        game.join(alice(), "Alice", 1500).unwrap();
        game.join(bob(), "Bob", 1500).unwrap();
        game.start().unwrap();
        game
    }

    // ==================== Lifecycle ====================

    #[test]
    fn test_start_requires_two_players() {
        let mut game = GameState::new();
        assert_eq!(game.start().unwrap_err(), GameError::InsufficientPlayers);

        game.join(alice(), "Alice", 1500).unwrap();
        assert_eq!(game.start().unwrap_err(), GameError::InsufficientPlayers);
        assert_eq!(game.lifecycle(), Lifecycle::NotStarted);

        game.join(bob(), "Bob", 1500).unwrap();
        let event = game.start().unwrap();
        assert_eq!(
            event,
            GameEvent::GameStarted {
                first_player: alice()
            }
        );
        assert_eq!(game.lifecycle(), Lifecycle::InProgress);
        assert_eq!(game.current_player().unwrap().id, alice());
    }

    #[test]
    fn test_start_twice_fails() {
        let mut game = two_player_game();
        assert_eq!(game.start().unwrap_err(), GameError::InvalidTransition);
    }

    #[test]
    fn test_pause_resume_end() {
        let mut game = two_player_game();

        // Cannot resume a running game
        assert_eq!(game.resume().unwrap_err(), GameError::InvalidTransition);

        game.pause().unwrap();
        assert_eq!(game.lifecycle(), Lifecycle::Paused);

        // Cannot pause twice
        assert_eq!(game.pause().unwrap_err(), GameError::InvalidTransition);

        game.resume().unwrap();
        assert_eq!(game.lifecycle(), Lifecycle::InProgress);

        game.end().unwrap();
        assert_eq!(game.lifecycle(), Lifecycle::Ended);

        // Ended is terminal
        assert_eq!(game.end().unwrap_err(), GameError::InvalidTransition);
        assert_eq!(game.pause().unwrap_err(), GameError::InvalidTransition);
        assert_eq!(game.start().unwrap_err(), GameError::InvalidTransition);
    }

    #[test]
    fn test_end_from_not_started() {
        let mut game = GameState::new();
        game.end().unwrap();
        assert_eq!(game.lifecycle(), Lifecycle::Ended);
    }

    #[test]
    fn test_invalid_transition_does_not_mutate() {
        let mut game = GameState::new();
        assert_eq!(game.resume().unwrap_err(), GameError::InvalidTransition);
        assert_eq!(game.lifecycle(), Lifecycle::NotStarted);
    }

    // ==================== Turn resolution ====================

    #[test]
    fn test_roll_before_start_fails() {
        let mut game = GameState::new();
        game.join(alice(), "Alice", 1500).unwrap();
        let err = game
            .roll_and_resolve_with(&alice(), (3, 4), &mut NoCards)
            .unwrap_err();
        assert_eq!(err, GameError::InvalidTransition);
    }

    #[test]
    fn test_roll_out_of_turn_fails() {
        let mut game = two_player_game();
        let err = game
            .roll_and_resolve_with(&bob(), (3, 4), &mut NoCards)
            .unwrap_err();
        assert_eq!(err, GameError::WrongTurn);

        // State untouched
        assert_eq!(game.players().get(&bob()).unwrap().position, 0);
        assert_eq!(game.current_player().unwrap().id, alice());
    }

    #[test]
    fn test_landing_on_safe_tile_moves_without_balance_change() {
        let mut game = two_player_game();
        let outcome = game
            .roll_and_resolve_with(&alice(), (3, 4), &mut NoCards)
            .unwrap();

        assert_eq!(outcome.total, 7);
        assert!(!outcome.is_double);
        assert_eq!(outcome.position, 7); // Chance
        assert_eq!(outcome.landing, LandingEffect::None);
        assert_eq!(outcome.balance, 1500);

        // Non-double advances the turn
        assert_eq!(game.current_player().unwrap().id, bob());
    }

    #[test]
    fn test_double_keeps_the_turn() {
        let mut game = two_player_game();
        game.roll_and_resolve_with(&alice(), (3, 4), &mut NoCards)
            .unwrap();

        let outcome = game
            .roll_and_resolve_with(&bob(), (2, 2), &mut NoCards)
            .unwrap();
        assert!(outcome.is_double);
        assert_eq!(outcome.position, 2);

        // Bob rolls again
        assert_eq!(game.current_player().unwrap().id, bob());
        game.roll_and_resolve_with(&bob(), (1, 2), &mut NoCards)
            .unwrap();
        assert_eq!(game.current_player().unwrap().id, alice());
    }

    #[test]
    fn test_tax_tile_debits_fixed_amount() {
        let mut game = two_player_game();
        let outcome = game
            .roll_and_resolve_with(&alice(), (1, 3), &mut NoCards)
            .unwrap();

        assert_eq!(outcome.position, 4); // Income Tax
        assert_eq!(outcome.landing, LandingEffect::TaxPaid { amount: 200 });
        assert_eq!(outcome.balance, 1300);
    }

    #[test]
    fn test_passing_start_credits_bonus() {
        let mut game = two_player_game();
        game.players.get_mut(&alice()).unwrap().position = 38;

        let outcome = game
            .roll_and_resolve_with(&alice(), (1, 2), &mut NoCards)
            .unwrap();

        assert_eq!(outcome.position, 1);
        assert!(outcome.passed_start);
        assert_eq!(outcome.balance, 1700);
    }

    #[test]
    fn test_no_bonus_without_wrap() {
        let mut game = two_player_game();
        let outcome = game
            .roll_and_resolve_with(&alice(), (1, 2), &mut NoCards)
            .unwrap();
        assert!(!outcome.passed_start);
        assert_eq!(outcome.balance, 1500);
    }

    #[test]
    fn test_go_to_jail_overrides_position() {
        let mut game = two_player_game();
        game.players.get_mut(&alice()).unwrap().position = 27;

        let outcome = game
            .roll_and_resolve_with(&alice(), (1, 2), &mut NoCards)
            .unwrap();

        assert_eq!(outcome.landing, LandingEffect::SentToJail);
        assert_eq!(outcome.position, JAIL_POSITION);

        let p = game.players().get(&alice()).unwrap();
        assert_eq!(p.position, JAIL_POSITION);
        assert!(p.in_jail);
        assert_eq!(p.jail_turns_remaining, JAIL_TERM);
    }

    #[test]
    fn test_rent_transfers_atomically() {
        let mut game = two_player_game();
        // Alice owns Baltic Avenue (position 3, base rent 4)
        game.board_state.tile_mut(3).owner = Some(alice());

        // Advance to Bob's turn
        game.roll_and_resolve_with(&alice(), (3, 4), &mut NoCards)
            .unwrap();

        let outcome = game
            .roll_and_resolve_with(&bob(), (1, 2), &mut NoCards)
            .unwrap();

        assert_eq!(
            outcome.landing,
            LandingEffect::RentPaid {
                owner: alice(),
                amount: 4,
                owner_balance: 1504
            }
        );
        assert_eq!(outcome.balance, 1496);

        // Both sides visible in the same snapshot
        let summary = game.summary();
        let balance_of = |id: &PlayerId| {
            summary
                .players
                .iter()
                .find(|p| p.id == *id)
                .unwrap()
                .balance
        };
        assert_eq!(balance_of(&bob()), 1496);
        assert_eq!(balance_of(&alice()), 1504);
    }

    #[test]
    fn test_base_rent_on_cheapest_street() {
        let mut game = two_player_game();
        // Alice owns Mediterranean Avenue (position 1, base rent 2)
        game.board_state.tile_mut(1).owner = Some(alice());

        game.roll_and_resolve_with(&alice(), (3, 4), &mut NoCards)
            .unwrap();
        game.players.get_mut(&bob()).unwrap().position = 38;

        // Bob wraps past Go onto Mediterranean: +200 bonus, -2 rent
        let outcome = game
            .roll_and_resolve_with(&bob(), (2, 1), &mut NoCards)
            .unwrap();
        assert_eq!(outcome.position, 1);
        assert_eq!(
            outcome.landing,
            LandingEffect::RentPaid {
                owner: alice(),
                amount: 2,
                owner_balance: 1502
            }
        );
        assert_eq!(outcome.balance, 1698);
        assert_eq!(game.players().get(&alice()).unwrap().balance, 1502);
    }

    #[test]
    fn test_rent_uses_improvement_level() {
        let mut game = two_player_game();
        {
            let entry = game.board_state.tile_mut(3);
            entry.owner = Some(alice());
            entry.improvement_level = 3; // rent 180 on Baltic
        }

        game.roll_and_resolve_with(&alice(), (3, 4), &mut NoCards)
            .unwrap();
        let outcome = game
            .roll_and_resolve_with(&bob(), (1, 2), &mut NoCards)
            .unwrap();

        assert_eq!(
            outcome.landing,
            LandingEffect::RentPaid {
                owner: alice(),
                amount: 180,
                owner_balance: 1680
            }
        );
        assert_eq!(game.players().get(&alice()).unwrap().balance, 1680);
        assert_eq!(game.players().get(&bob()).unwrap().balance, 1320);
    }

    #[test]
    fn test_landing_on_own_property_is_free() {
        let mut game = two_player_game();
        game.board_state.tile_mut(3).owner = Some(alice());

        let outcome = game
            .roll_and_resolve_with(&alice(), (1, 2), &mut NoCards)
            .unwrap();

        assert_eq!(outcome.landing, LandingEffect::None);
        assert_eq!(outcome.balance, 1500);
        assert_eq!(game.players().get(&bob()).unwrap().balance, 1500);
    }

    #[test]
    fn test_landing_on_unowned_property_is_free() {
        let mut game = two_player_game();
        let outcome = game
            .roll_and_resolve_with(&alice(), (1, 2), &mut NoCards)
            .unwrap();
        assert_eq!(outcome.landing, LandingEffect::None);
        assert_eq!(outcome.balance, 1500);
    }

    // ==================== Card seam ====================

    struct FixedCard(CardEffect);

    impl CardResolver for FixedCard {
        fn draw(&mut self, _player: &Player, _tile: &crate::board::Tile) -> Option<CardEffect> {
            Some(self.0)
        }
    }

    #[test]
    fn test_card_effect_applies_balance_and_move() {
        let mut game = two_player_game();
        let mut cards = FixedCard(CardEffect {
            balance_delta: -15,
            move_to: Some(0),
        });

        // (3, 4) lands on Chance at 7
        let outcome = game
            .roll_and_resolve_with(&alice(), (3, 4), &mut cards)
            .unwrap();

        assert_eq!(
            outcome.landing,
            LandingEffect::CardApplied {
                balance_delta: -15,
                moved_to: Some(0)
            }
        );
        assert_eq!(outcome.balance, 1485);
        assert_eq!(outcome.position, 0);

        let p = game.players().get(&alice()).unwrap();
        assert_eq!(p.balance, 1485);
        assert_eq!(p.position, 0);
    }

    #[test]
    fn test_empty_card_table_is_a_no_op() {
        let mut game = two_player_game();
        let outcome = game
            .roll_and_resolve_with(&alice(), (3, 4), &mut NoCards)
            .unwrap();
        assert_eq!(outcome.landing, LandingEffect::None);
        assert_eq!(outcome.balance, 1500);
        assert_eq!(outcome.position, 7);
    }

    // ==================== Transactions ====================

    #[test]
    fn test_buy_property() {
        let mut game = two_player_game();
        game.roll_and_resolve_with(&alice(), (1, 2), &mut NoCards)
            .unwrap(); // Baltic Avenue, price 60

        let event = game.buy_property(&alice()).unwrap();
        assert_eq!(
            event,
            GameEvent::PropertyPurchased {
                player: alice(),
                position: 3,
                price: 60,
                balance: 1440,
            }
        );

        assert_eq!(game.board_state().owner(3), Some(&alice()));
        let p = game.players().get(&alice()).unwrap();
        assert_eq!(p.balance, 1440);
        assert!(p.owns(3));
    }

    #[test]
    fn test_buy_requires_purchasable_tile() {
        let mut game = two_player_game();
        // Alice stands on Go
        assert_eq!(
            game.buy_property(&alice()).unwrap_err(),
            GameError::NotPurchasable
        );
    }

    #[test]
    fn test_buy_rejects_owned_property() {
        let mut game = two_player_game();
        game.board_state.tile_mut(3).owner = Some(bob());
        game.players.get_mut(&alice()).unwrap().position = 3;

        assert_eq!(
            game.buy_property(&alice()).unwrap_err(),
            GameError::AlreadyOwned
        );
        assert_eq!(game.players().get(&alice()).unwrap().balance, 1500);
    }

    #[test]
    fn test_buy_with_insufficient_funds_changes_nothing() {
        let mut game = two_player_game();
        {
            let p = game.players.get_mut(&alice()).unwrap();
            p.position = 39; // Boardwalk, price 400
            p.balance = 399;
        }

        assert_eq!(
            game.buy_property(&alice()).unwrap_err(),
            GameError::InsufficientFunds
        );
        assert_eq!(game.board_state().owner(39), None);
        let p = game.players().get(&alice()).unwrap();
        assert_eq!(p.balance, 399);
        assert!(!p.owns(39));
    }

    #[test]
    fn test_buy_requires_game_in_progress() {
        let mut game = two_player_game();
        game.pause().unwrap();
        assert_eq!(
            game.buy_property(&alice()).unwrap_err(),
            GameError::InvalidTransition
        );
    }

    #[test]
    fn test_build_improvement() {
        let mut game = two_player_game();
        game.board_state.tile_mut(3).owner = Some(alice());
        game.players.get_mut(&alice()).unwrap().owned_positions.insert(3);

        // Baltic price 60, build cost 30
        let event = game.build_improvement(&alice(), 3).unwrap();
        assert_eq!(
            event,
            GameEvent::ImprovementBuilt {
                player: alice(),
                position: 3,
                level: 1,
                cost: 30,
                balance: 1470,
            }
        );
        assert_eq!(game.board_state().tile(3).improvement_level, 1);
    }

    #[test]
    fn test_build_requires_ownership() {
        let mut game = two_player_game();
        assert_eq!(
            game.build_improvement(&alice(), 3).unwrap_err(),
            GameError::NotOwner
        );

        game.board_state.tile_mut(3).owner = Some(bob());
        assert_eq!(
            game.build_improvement(&alice(), 3).unwrap_err(),
            GameError::NotOwner
        );
    }

    #[test]
    fn test_build_rejected_on_railroads_and_utilities() {
        let mut game = two_player_game();

        // Alice buys Reading Railroad (5), then the Electric Company (12)
        game.players.get_mut(&alice()).unwrap().position = 5;
        game.buy_property(&alice()).unwrap();
        game.players.get_mut(&alice()).unwrap().position = 12;
        game.buy_property(&alice()).unwrap();
        let balance = game.players().get(&alice()).unwrap().balance;

        // Owned, but not streets: neither can take an improvement
        assert_eq!(
            game.build_improvement(&alice(), 5).unwrap_err(),
            GameError::NotImprovable
        );
        assert_eq!(
            game.build_improvement(&alice(), 12).unwrap_err(),
            GameError::NotImprovable
        );
        assert_eq!(game.board_state().tile(5).improvement_level, 0);
        assert_eq!(game.board_state().tile(12).improvement_level, 0);
        assert_eq!(game.players().get(&alice()).unwrap().balance, balance);
    }

    #[test]
    fn test_build_stops_at_cap() {
        let mut game = two_player_game();
        {
            let entry = game.board_state.tile_mut(3);
            entry.owner = Some(alice());
            entry.improvement_level = MAX_IMPROVEMENT_LEVEL;
        }

        assert_eq!(
            game.build_improvement(&alice(), 3).unwrap_err(),
            GameError::ImprovementCap
        );
        assert_eq!(
            game.board_state().tile(3).improvement_level,
            MAX_IMPROVEMENT_LEVEL
        );
    }

    #[test]
    fn test_build_with_insufficient_funds_changes_nothing() {
        let mut game = two_player_game();
        game.board_state.tile_mut(3).owner = Some(alice());
        game.players.get_mut(&alice()).unwrap().balance = 29;

        assert_eq!(
            game.build_improvement(&alice(), 3).unwrap_err(),
            GameError::InsufficientFunds
        );
        assert_eq!(game.board_state().tile(3).improvement_level, 0);
        assert_eq!(game.players().get(&alice()).unwrap().balance, 29);
    }

    #[test]
    fn test_pay_bail() {
        let mut game = two_player_game();
        {
            let p = game.players.get_mut(&alice()).unwrap();
            p.in_jail = true;
            p.jail_turns_remaining = JAIL_TERM;
        }

        let event = game.pay_bail(&alice()).unwrap();
        assert_eq!(
            event,
            GameEvent::BailPaid {
                player: alice(),
                cost: BAIL_COST,
                balance: 1450,
            }
        );

        let p = game.players().get(&alice()).unwrap();
        assert!(!p.in_jail);
        assert_eq!(p.jail_turns_remaining, 0);
    }

    #[test]
    fn test_pay_bail_outside_jail_fails() {
        let mut game = two_player_game();
        assert_eq!(game.pay_bail(&alice()).unwrap_err(), GameError::NotInJail);
        assert_eq!(game.players().get(&alice()).unwrap().balance, 1500);
    }

    #[test]
    fn test_pay_bail_with_insufficient_funds_keeps_jail() {
        let mut game = two_player_game();
        {
            let p = game.players.get_mut(&alice()).unwrap();
            p.in_jail = true;
            p.balance = 40;
        }

        assert_eq!(
            game.pay_bail(&alice()).unwrap_err(),
            GameError::InsufficientFunds
        );
        let p = game.players().get(&alice()).unwrap();
        assert!(p.in_jail);
        assert_eq!(p.balance, 40);
    }

    #[test]
    fn test_mortgage_is_an_explicit_stub() {
        let mut game = two_player_game();
        game.board_state.tile_mut(3).owner = Some(alice());
        assert_eq!(
            game.mortgage_property(&alice(), 3).unwrap_err(),
            GameError::NotImplemented
        );
    }

    #[test]
    fn test_unknown_player_is_rejected() {
        let mut game = two_player_game();
        let stranger = PlayerId::new("0xstranger");
        assert_eq!(
            game.buy_property(&stranger).unwrap_err(),
            GameError::UnknownPlayer
        );
        assert_eq!(
            game.pay_bail(&stranger).unwrap_err(),
            GameError::UnknownPlayer
        );
    }

    // ==================== Projections ====================

    #[test]
    fn test_current_player_outside_in_progress_is_none() {
        let mut game = GameState::new();
        game.join(alice(), "Alice", 1500).unwrap();
        game.join(bob(), "Bob", 1500).unwrap();
        assert!(game.current_player().is_none());

        game.start().unwrap();
        assert!(game.current_player().is_some());

        game.pause().unwrap();
        assert!(game.current_player().is_none());
    }

    #[test]
    fn test_summary_is_a_defensive_snapshot() {
        let mut game = two_player_game();
        let summary = game.summary();

        game.roll_and_resolve_with(&alice(), (1, 3), &mut NoCards)
            .unwrap(); // Income Tax, -200

        // The earlier snapshot still shows the pre-roll state
        assert_eq!(summary.players[0].balance, 1500);
        assert_eq!(summary.players[0].position, 0);
        assert_eq!(summary.current_player, Some(alice()));

        // A fresh snapshot shows the new state
        let fresh = game.summary();
        assert_eq!(fresh.players[0].balance, 1300);
        assert_eq!(fresh.current_player, Some(bob()));
    }
}
