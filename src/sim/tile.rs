//! Tile kinds and their trait table
//!
//! Every tile kind is a plain enum variant; its behaviour comes from a
//! static data table rather than per-kind code.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// One of the four grid directions, in neighbour-slot order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right = 0,
    Top = 1,
    Left = 2,
    Bottom = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Top,
        Direction::Left,
        Direction::Bottom,
    ];

    /// Grid offset of one step in this direction (y grows downward)
    #[inline]
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Right => IVec2::new(1, 0),
            Direction::Top => IVec2::new(0, -1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Bottom => IVec2::new(0, 1),
        }
    }
}

/// How many resting tiles a kind can bear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    /// Never collapses
    Unbreakable,
    /// Collapses once the load exceeds this count
    Bears(u32),
}

/// Collectible item dropped by broken or collapsed tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Mud,
    Stone,
    Scaffold,
}

impl ItemKind {
    /// The tile placed when this item is used
    pub fn tile(self) -> TileKind {
        match self {
            ItemKind::Mud => TileKind::Dirt,
            ItemKind::Stone => TileKind::Stone,
            ItemKind::Scaffold => TileKind::Scaffold,
        }
    }

    /// Frame count of the item's spin animation
    pub fn frame_count(self) -> usize {
        match self {
            ItemKind::Mud => 8,
            ItemKind::Stone => 8,
            ItemKind::Scaffold => 8,
        }
    }
}

/// Tile types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Grass,
    Dirt,
    Stone,
    Log,
    Scaffold,
    /// The anchor of the tower; defines the playable envelope
    Crystal,
}

/// Immutable per-kind behaviour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileTraits {
    /// Whether the player can break it
    pub breakable: bool,
    /// Seconds of continuous digging needed to break it
    pub break_time: f64,
    /// Whether gravity applies
    pub fall_eligible: bool,
    pub strength: Strength,
    /// Max lateral distance at which a supported neighbour still holds this tile up
    pub stickiness: u32,
    pub drop: Option<ItemKind>,
}

impl TileKind {
    pub const ALL: [TileKind; 6] = [
        TileKind::Grass,
        TileKind::Dirt,
        TileKind::Stone,
        TileKind::Log,
        TileKind::Scaffold,
        TileKind::Crystal,
    ];

    pub fn traits(self) -> TileTraits {
        match self {
            TileKind::Grass => TileTraits {
                breakable: true,
                break_time: 0.5,
                fall_eligible: true,
                strength: Strength::Unbreakable,
                stickiness: 4,
                drop: Some(ItemKind::Mud),
            },
            TileKind::Dirt => TileTraits {
                breakable: true,
                break_time: 0.5,
                fall_eligible: true,
                strength: Strength::Bears(10),
                stickiness: 4,
                drop: Some(ItemKind::Mud),
            },
            TileKind::Stone => TileTraits {
                breakable: true,
                break_time: 1.0,
                fall_eligible: true,
                strength: Strength::Unbreakable,
                stickiness: 6,
                drop: Some(ItemKind::Stone),
            },
            TileKind::Log => TileTraits {
                breakable: true,
                break_time: 0.7,
                fall_eligible: true,
                strength: Strength::Bears(10),
                stickiness: 3,
                drop: Some(ItemKind::Scaffold),
            },
            TileKind::Scaffold => TileTraits {
                breakable: true,
                break_time: 0.3,
                fall_eligible: true,
                strength: Strength::Bears(5),
                stickiness: 10,
                drop: Some(ItemKind::Scaffold),
            },
            TileKind::Crystal => TileTraits {
                breakable: false,
                break_time: 0.0,
                fall_eligible: true,
                strength: Strength::Unbreakable,
                stickiness: 0,
                drop: None,
            },
        }
    }

    /// Column of this kind in the tile sheet
    pub fn sheet_column(self) -> u32 {
        match self {
            TileKind::Crystal => 0,
            TileKind::Grass => 1,
            TileKind::Stone => 2,
            TileKind::Dirt => 3,
            TileKind::Log => 4,
            TileKind::Scaffold => 5,
        }
    }
}

/// An occupant of a grid cell
///
/// Position is not stored; it is whatever cell of the grid holds the tile.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub kind: TileKind,
    /// Outside the crystal envelope: not interactive, drawn with the locked texture
    pub locked: bool,
}

impl Tile {
    /// New tiles start locked until the next lock sweep
    pub fn new(kind: TileKind) -> Self {
        Self { kind, locked: true }
    }

    #[inline]
    pub fn traits(&self) -> TileTraits {
        self.kind.traits()
    }

    pub fn is_crystal(&self) -> bool {
        self.kind == TileKind::Crystal
    }

    /// Breakable and currently inside the envelope
    pub fn can_break(&self) -> bool {
        !self.locked && self.traits().breakable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_unit_steps() {
        for dir in Direction::ALL {
            let offset = dir.offset();
            assert_eq!(offset.x.abs() + offset.y.abs(), 1);
        }
        assert_eq!(Direction::Bottom.offset() + Direction::Top.offset(), IVec2::ZERO);
        assert_eq!(Direction::Left.offset() + Direction::Right.offset(), IVec2::ZERO);
    }

    #[test]
    fn test_items_place_their_source_tiles() {
        assert_eq!(TileKind::Dirt.traits().drop.map(ItemKind::tile), Some(TileKind::Dirt));
        assert_eq!(TileKind::Stone.traits().drop.map(ItemKind::tile), Some(TileKind::Stone));
        assert_eq!(TileKind::Grass.traits().drop, Some(ItemKind::Mud));
        assert_eq!(TileKind::Crystal.traits().drop, None);
    }

    #[test]
    fn test_locked_tile_cannot_break() {
        let mut tile = Tile::new(TileKind::Dirt);
        assert!(!tile.can_break());
        tile.locked = false;
        assert!(tile.can_break());

        let mut crystal = Tile::new(TileKind::Crystal);
        crystal.locked = false;
        assert!(!crystal.can_break());
    }
}
