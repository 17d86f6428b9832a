//! Core engine for a turn-based property-trading board game.
//!
//! This crate provides the rules layer consumed by a presentation frontend
//! and an external wallet/identity layer:
//! - The immutable 40-tile board catalog and rent lookup
//! - The joined-player roster (join order is turn order)
//! - The game state machine: lifecycle, turn sequencing, landing effects
//! - Player transactions: buy property, build improvements, pay bail
//!
//! # Architecture
//!
//! The engine is platform-agnostic. It can be compiled to:
//! - Native Rust for embedding in a host application
//! - WebAssembly for a browser frontend (feature `wasm`)
//!
//! All commands are synchronous `&mut self` methods: each one validates
//! fully, then applies its whole state delta before returning. Identity and
//! card-deck content stay outside the core - every command takes an explicit
//! acting identity, and chance/community-chest draws go through the
//! [`actions::CardResolver`] seam.
//!
//! # Modules
//!
//! - [`board`]: tile catalog, rent schedules, per-game board overlay
//! - [`player`]: player state and the roster
//! - [`actions`]: turn outcomes, events, the card-effect seam
//! - [`game`]: the game state machine

pub mod actions;
pub mod board;
pub mod game;
pub mod player;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{CardEffect, CardResolver, GameEvent, LandingEffect, NoCards, TurnOutcome};
pub use board::{
    Board, BoardState, ColorGroup, PlayerId, Position, Tile, TileKind, TileState, BOARD_SIZE,
    JAIL_POSITION, MAX_IMPROVEMENT_LEVEL,
};
pub use game::{
    GameError, GameState, GameSummary, Lifecycle, BAIL_COST, JAIL_TERM, MIN_PLAYERS,
    PASSING_START_BONUS,
};
pub use player::{Player, PlayerRegistry, MAX_PLAYERS};
