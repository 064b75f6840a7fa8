//! Torre - A crystal tower sandbox game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile grid, physics, player actions)
//! - `scene`: Ordered render list and pointer hit-testing
//! - `assets`: Texture loading and sprite sheet slicing
//! - `renderer`: Software compositing of draw commands
//! - `settings`: Data-driven world configuration
//! - `logging`: Logger setup for the binary

pub mod assets;
pub mod logging;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;

    /// Edge length of a tile in pixels
    pub const TILE_LENGTH: i32 = 50;
    /// Width of the loaded tile grid (in tiles)
    pub const GRID_WIDTH: i32 = 30;
    /// Height of the loaded tile grid (in tiles)
    pub const GRID_HEIGHT: i32 = 20;

    /// Screen size in pixels (the grid fills the screen)
    pub const SCREEN_WIDTH: i32 = GRID_WIDTH * TILE_LENGTH;
    pub const SCREEN_HEIGHT: i32 = GRID_HEIGHT * TILE_LENGTH;

    /// Edge length of a dropped item sprite
    pub const ITEM_LENGTH: i32 = 44;
    /// Edge length of the break indicator sprite
    pub const BREAK_INDICATOR_LENGTH: i32 = 15;
    /// Frames in the crystal shimmer sheet
    pub const CRYSTAL_FRAMES: usize = 8;
    /// Frames in the break indicator sheet, shown in order as progress builds
    pub const BREAK_INDICATOR_FRAMES: usize = 8;

    /// Break progress needed to break a tile (one unit per tick per second of break time)
    pub const BREAK_THRESHOLD: f64 = TICK_RATE as f64;

    /// Hotbar layout
    pub const HOTBAR_SLOTS: usize = 8;
    pub const HOTBAR_ORIGIN: (i32, i32) = (523, 924);
    pub const HOTBAR_SLOT_STRIDE: i32 = 56;
    pub const HOTBAR_SLOT_INSET: i32 = 9;
    /// Offset of the selection frame from its slot
    pub const HOTBAR_SELECTION_INSET: i32 = 2;

    /// Rows of open sky kept clear of fog above the crystal
    pub const FOG_HEADROOM_ROWS: i32 = 4;
    /// Height of each faded fog edge sprite
    pub const FOG_EDGE_HEIGHT: i32 = 150;
}

/// Draw layers, back to front
pub mod layers {
    pub const BACKGROUND: i32 = 0;
    pub const TILES: i32 = 1;
    pub const PLACE_INDICATOR: i32 = 2;
    pub const BREAK_INDICATOR: i32 = 3;
    pub const ITEMS: i32 = 3;
    pub const WAR_FOG: i32 = 4;
    pub const HOTBAR: i32 = 5;
}

/// Top-left pixel of the tile cell containing `pixel`
#[inline]
pub fn snap_to_cell(pixel: IVec2) -> IVec2 {
    let len = consts::TILE_LENGTH;
    IVec2::new(pixel.x.div_euclid(len) * len, pixel.y.div_euclid(len) * len)
}

/// Whether a pixel position lies on screen
#[inline]
pub fn on_screen(pixel: IVec2) -> bool {
    pixel.x >= 0
        && pixel.y >= 0
        && pixel.x < consts::SCREEN_WIDTH
        && pixel.y < consts::SCREEN_HEIGHT
}
