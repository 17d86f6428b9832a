//! Board catalog and per-game board state.
//!
//! This module contains:
//! - The immutable 40-tile catalog (positions, kinds, prices, rent schedules)
//! - Rent lookup by improvement level
//! - The mutable per-game overlay (owner, improvements, mortgage flag)
//!
//! The catalog never changes during play. Everything a game mutates lives in
//! [`BoardState`], a parallel array keyed by position.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of cells on the board
pub const BOARD_SIZE: u8 = 40;

/// Where players are sent when incarcerated
pub const JAIL_POSITION: Position = 10;

/// Maximum improvement level on a property tile
pub const MAX_IMPROVEMENT_LEVEL: u8 = 5;

/// Board cell index (0-39)
pub type Position = u8;

/// Opaque player identity, supplied by the identity collaborator at join
/// time (a wallet address in the reference frontend).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wrap an external identity string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The underlying identity string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Kind of board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// Go - passing it pays the start bonus
    Start,
    /// Street property, can carry improvements
    Property,
    Railroad,
    Utility,
    /// Fixed payment on landing
    Tax,
    /// Card draw, delegated to the effect resolver
    Chance,
    /// Card draw, delegated to the effect resolver
    CommunityChest,
    /// Just visiting when passed through or landed on
    Jail,
    /// Landing here forces the player into jail
    GoToJail,
    FreeParking,
}

impl TileKind {
    /// Whether a player can own this kind of tile
    pub fn is_purchasable(&self) -> bool {
        matches!(
            self,
            TileKind::Property | TileKind::Railroad | TileKind::Utility
        )
    }
}

/// Color group for street properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorGroup {
    Brown,
    LightBlue,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    DarkBlue,
}

/// A single cell in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    /// Index on the board (0-39)
    pub position: Position,
    /// What kind of cell this is
    pub kind: TileKind,
    /// Display name
    pub name: String,
    /// Purchase price (purchasable kinds only)
    pub price: Option<i64>,
    /// Rent by improvement level (purchasable kinds only)
    pub rent: Option<Vec<i64>>,
    /// Color group (street properties only)
    pub color: Option<ColorGroup>,
    /// Fixed amount owed on landing (tax tiles only)
    pub tax_amount: Option<i64>,
}

impl Tile {
    fn corner(position: Position, kind: TileKind, name: &str) -> Self {
        Self {
            position,
            kind,
            name: name.to_string(),
            price: None,
            rent: None,
            color: None,
            tax_amount: None,
        }
    }

    fn property(
        position: Position,
        name: &str,
        price: i64,
        color: ColorGroup,
        rent: [i64; 6],
    ) -> Self {
        Self {
            position,
            kind: TileKind::Property,
            name: name.to_string(),
            price: Some(price),
            rent: Some(rent.to_vec()),
            color: Some(color),
            tax_amount: None,
        }
    }

    fn railroad(position: Position, name: &str) -> Self {
        Self {
            position,
            kind: TileKind::Railroad,
            name: name.to_string(),
            price: Some(200),
            rent: Some(vec![25, 50, 100, 200]),
            color: None,
            tax_amount: None,
        }
    }

    fn utility(position: Position, name: &str) -> Self {
        Self {
            position,
            kind: TileKind::Utility,
            name: name.to_string(),
            price: Some(150),
            rent: Some(vec![4, 10]),
            color: None,
            tax_amount: None,
        }
    }

    fn tax(position: Position, name: &str, amount: i64) -> Self {
        Self {
            position,
            kind: TileKind::Tax,
            name: name.to_string(),
            price: None,
            rent: None,
            color: None,
            tax_amount: Some(amount),
        }
    }

    /// Rent owed at an improvement level.
    ///
    /// Tiles without a rent schedule owe 0. Levels past the end of the
    /// schedule owe the top amount.
    pub fn rent_at(&self, level: u8) -> i64 {
        match &self.rent {
            Some(schedule) if !schedule.is_empty() => {
                schedule[(level as usize).min(schedule.len() - 1)]
            }
            _ => 0,
        }
    }
}

/// The immutable 40-tile catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    tiles: Vec<Tile>,
}

impl Board {
    /// Build the standard US-edition board
    pub fn standard() -> Self {
        use ColorGroup::*;

        let tiles = vec![
            Tile::corner(0, TileKind::Start, "Go"),
            Tile::property(1, "Mediterranean Avenue", 60, Brown, [2, 10, 30, 90, 160, 250]),
            Tile::corner(2, TileKind::CommunityChest, "Community Chest"),
            Tile::property(3, "Baltic Avenue", 60, Brown, [4, 20, 60, 180, 320, 450]),
            Tile::tax(4, "Income Tax", 200),
            Tile::railroad(5, "Reading Railroad"),
            Tile::property(6, "Oriental Avenue", 100, LightBlue, [6, 30, 90, 270, 400, 550]),
            Tile::corner(7, TileKind::Chance, "Chance"),
            Tile::property(8, "Vermont Avenue", 100, LightBlue, [6, 30, 90, 270, 400, 550]),
            Tile::property(9, "Connecticut Avenue", 120, LightBlue, [8, 40, 100, 300, 450, 600]),
            Tile::corner(10, TileKind::Jail, "Jail"),
            Tile::property(11, "St. Charles Place", 140, Pink, [10, 50, 150, 450, 625, 750]),
            Tile::utility(12, "Electric Company"),
            Tile::property(13, "States Avenue", 140, Pink, [10, 50, 150, 450, 625, 750]),
            Tile::property(14, "Virginia Avenue", 160, Pink, [12, 60, 180, 500, 700, 900]),
            Tile::railroad(15, "Pennsylvania Railroad"),
            Tile::property(16, "St. James Place", 180, Orange, [14, 70, 200, 550, 750, 950]),
            Tile::corner(17, TileKind::CommunityChest, "Community Chest"),
            Tile::property(18, "Tennessee Avenue", 180, Orange, [14, 70, 200, 550, 750, 950]),
            Tile::property(19, "New York Avenue", 200, Orange, [16, 80, 220, 600, 800, 1000]),
            Tile::corner(20, TileKind::FreeParking, "Free Parking"),
            Tile::property(21, "Kentucky Avenue", 220, Red, [18, 90, 250, 700, 875, 1050]),
            Tile::corner(22, TileKind::Chance, "Chance"),
            Tile::property(23, "Indiana Avenue", 220, Red, [18, 90, 250, 700, 875, 1050]),
            Tile::property(24, "Illinois Avenue", 240, Red, [20, 100, 300, 750, 925, 1100]),
            Tile::railroad(25, "B. & O. Railroad"),
            Tile::property(26, "Atlantic Avenue", 260, Yellow, [22, 110, 330, 800, 975, 1150]),
            Tile::property(27, "Ventnor Avenue", 260, Yellow, [22, 110, 330, 800, 975, 1150]),
            Tile::utility(28, "Water Works"),
            Tile::property(29, "Marvin Gardens", 280, Yellow, [24, 120, 360, 850, 1025, 1200]),
            Tile::corner(30, TileKind::GoToJail, "Go To Jail"),
            Tile::property(31, "Pacific Avenue", 300, Green, [26, 130, 390, 900, 1100, 1275]),
            Tile::property(32, "North Carolina Avenue", 300, Green, [26, 130, 390, 900, 1100, 1275]),
            Tile::corner(33, TileKind::CommunityChest, "Community Chest"),
            Tile::property(34, "Pennsylvania Avenue", 320, Green, [28, 150, 450, 1000, 1200, 1400]),
            Tile::railroad(35, "Short Line"),
            Tile::corner(36, TileKind::Chance, "Chance"),
            Tile::property(37, "Park Place", 350, DarkBlue, [35, 175, 500, 1100, 1300, 1500]),
            Tile::tax(38, "Luxury Tax", 100),
            Tile::property(39, "Boardwalk", 400, DarkBlue, [50, 200, 600, 1400, 1700, 2000]),
        ];

        Self { tiles }
    }

    /// Tile at a position. Positions outside 0-39 are a programming error.
    pub fn tile(&self, position: Position) -> &Tile {
        assert!(
            position < BOARD_SIZE,
            "board position {position} out of range"
        );
        &self.tiles[position as usize]
    }

    /// Tile at a position, or `None` outside the board
    pub fn get(&self, position: Position) -> Option<&Tile> {
        self.tiles.get(position as usize)
    }

    /// All 40 tiles in board order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

/// Mutable per-game state of one tile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileState {
    /// Owning player, if purchased
    pub owner: Option<PlayerId>,
    /// Houses-equivalent built (0-5, property tiles only)
    pub improvement_level: u8,
    /// Reserved; mortgage mechanics are an explicit stub
    pub is_mortgaged: bool,
}

/// Per-game overlay keyed by position, parallel to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    tiles: Vec<TileState>,
}

impl BoardState {
    /// Fresh overlay: nothing owned, nothing built
    pub fn new() -> Self {
        Self {
            tiles: vec![TileState::default(); BOARD_SIZE as usize],
        }
    }

    /// Overlay entry at a position. Out-of-range positions are a
    /// programming error.
    pub fn tile(&self, position: Position) -> &TileState {
        assert!(
            position < BOARD_SIZE,
            "board position {position} out of range"
        );
        &self.tiles[position as usize]
    }

    pub(crate) fn tile_mut(&mut self, position: Position) -> &mut TileState {
        assert!(
            position < BOARD_SIZE,
            "board position {position} out of range"
        );
        &mut self.tiles[position as usize]
    }

    /// Owner of a position, if any
    pub fn owner(&self, position: Position) -> Option<&PlayerId> {
        self.tile(position).owner.as_ref()
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}
