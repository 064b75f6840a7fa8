//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (column-major over the grid, by id for items)
//! - No image or platform dependencies

pub mod animator;
pub mod grid;
pub mod hotbar;
pub mod item;
pub mod physics;
pub mod state;
pub mod tick;
pub mod tile;

pub use animator::Animator;
pub use grid::{GridError, TileGrid};
pub use hotbar::{Hotbar, Stack};
pub use item::Item;
pub use physics::{Collapse, PhysicsReport};
pub use state::{BreakIndicator, World};
pub use tick::{TickInput, WorldEvent, tick};
pub use tile::{Direction, ItemKind, Strength, Tile, TileKind, TileTraits};
