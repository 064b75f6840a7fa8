//! The loaded tile grid and its coordinate spaces
//!
//! Three coordinate spaces are in play:
//! - pixel: screen position, `TILE_LENGTH` pixels per tile
//! - local: cell index inside the grid, `(0, 0)` is the top-left cell
//! - global: tile position relative to the world origin, where the crystal
//!   column sits at x = 0 and ground level is y = 0 (y grows downward)
//!
//! Neighbours are never stored. A tile's neighbour in a direction is whatever
//! occupies the adjacent cell, so placement and removal keep adjacency
//! consistent without any relinking.

use glam::IVec2;
use thiserror::Error;

use super::tile::{Direction, Tile, TileKind};
use crate::consts::{FOG_HEADROOM_ROWS, GRID_HEIGHT, GRID_WIDTH, TILE_LENGTH};
use crate::scene::Bound;
use crate::settings::Settings;

/// Errors from grid mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("global tile ({x}, {y}) is outside the loaded grid")]
    OutOfBounds { x: i32, y: i32 },
    #[error("the crystal is not at global tile (0, {height})")]
    CrystalMissing { height: i32 },
}

impl GridError {
    fn out_of_bounds(global: IVec2) -> Self {
        GridError::OutOfBounds {
            x: global.x,
            y: global.y,
        }
    }
}

/// A `GRID_WIDTH` x `GRID_HEIGHT` window of tiles plus the crystal reference point
#[derive(Debug, Clone)]
pub struct TileGrid {
    /// Global tile coordinate of the top-left cell
    origin: IVec2,
    /// Row-major cell storage
    cells: Vec<Option<Tile>>,
    /// Global row of the crystal (ground level is 0, the tower grows negative)
    crystal_height: i32,
}

impl TileGrid {
    /// An empty grid with the crystal reference at `crystal_height` (no crystal tile placed)
    pub fn empty(origin: IVec2, crystal_height: i32) -> Self {
        Self {
            origin,
            cells: vec![None; (GRID_WIDTH * GRID_HEIGHT) as usize],
            crystal_height,
        }
    }

    /// Build the starting world: ground strata, the tower columns, and the crystal
    pub fn seeded(settings: &Settings) -> Result<Self, GridError> {
        let origin = IVec2::from(settings.grid_origin);
        let mut grid = Self::empty(origin, settings.crystal_height);

        for local_y in 0..GRID_HEIGHT {
            for local_x in 0..GRID_WIDTH {
                let global = grid.local_to_global(IVec2::new(local_x, local_y));
                let kind = if global.y == settings.grass_row {
                    Some(TileKind::Grass)
                } else if global.y > settings.grass_row && global.y <= settings.dirt_bottom_row {
                    Some(TileKind::Dirt)
                } else if global.y > settings.dirt_bottom_row {
                    Some(TileKind::Stone)
                } else {
                    None
                };
                if let Some(kind) = kind {
                    grid.place(Tile::new(kind), global)?;
                }
            }
        }

        // Dirt tower from ground level up to the crystal
        let mut y = 0;
        while y > settings.crystal_height {
            grid.place(Tile::new(TileKind::Dirt), IVec2::new(0, y))?;
            y -= 1;
        }
        if let Some(column) = settings.scaffold_column {
            for i in 0..settings.scaffold_height as i32 {
                grid.place(Tile::new(TileKind::Scaffold), IVec2::new(column, -i))?;
            }
        }
        if let Some(column) = settings.log_column {
            for i in 0..settings.log_height as i32 {
                grid.place(Tile::new(TileKind::Log), IVec2::new(column, -i))?;
            }
        }
        grid.place(Tile::new(TileKind::Crystal), grid.crystal_position())?;
        grid.refresh_locks();

        log::info!(
            "Seeded grid at origin ({}, {}) with crystal at height {}",
            origin.x,
            origin.y,
            grid.crystal_height
        );
        Ok(grid)
    }

    pub fn origin(&self) -> IVec2 {
        self.origin
    }

    pub fn crystal_height(&self) -> i32 {
        self.crystal_height
    }

    /// Global tile coordinate of the crystal
    pub fn crystal_position(&self) -> IVec2 {
        IVec2::new(0, self.crystal_height)
    }

    // --- Coordinate transforms ---

    /// Whether a local cell lies inside the grid
    #[inline]
    pub fn contains_local(&self, local: IVec2) -> bool {
        local.x >= 0 && local.y >= 0 && local.x < GRID_WIDTH && local.y < GRID_HEIGHT
    }

    #[inline]
    fn index(&self, local: IVec2) -> Option<usize> {
        self.contains_local(local)
            .then(|| (local.y * GRID_WIDTH + local.x) as usize)
    }

    /// Cell under a pixel, or `None` off the grid
    pub fn pixel_to_local(&self, pixel: IVec2) -> Option<IVec2> {
        if pixel.x < 0 || pixel.y < 0 {
            return None;
        }
        let local = pixel / TILE_LENGTH;
        self.contains_local(local).then_some(local)
    }

    /// Top-left pixel of a local cell
    pub fn local_to_pixel(&self, local: IVec2) -> IVec2 {
        local * TILE_LENGTH
    }

    pub fn local_to_global(&self, local: IVec2) -> IVec2 {
        local + self.origin
    }

    /// Local cell of a global coordinate, or `None` outside the loaded window
    pub fn global_to_local(&self, global: IVec2) -> Option<IVec2> {
        let local = global - self.origin;
        self.contains_local(local).then_some(local)
    }

    pub fn pixel_to_global(&self, pixel: IVec2) -> Option<IVec2> {
        self.pixel_to_local(pixel).map(|l| self.local_to_global(l))
    }

    /// Pixel rectangle of the cell under the cursor
    pub fn active_range(&self, pixel: IVec2) -> Bound {
        let cell = crate::snap_to_cell(pixel);
        Bound::from_size(cell, IVec2::splat(TILE_LENGTH))
    }

    // --- Cell access ---

    pub fn get_local(&self, local: IVec2) -> Option<&Tile> {
        self.index(local).and_then(|i| self.cells[i].as_ref())
    }

    pub fn get(&self, global: IVec2) -> Option<&Tile> {
        self.global_to_local(global).and_then(|l| self.get_local(l))
    }

    pub fn tile_at_pixel(&self, pixel: IVec2) -> Option<&Tile> {
        self.pixel_to_local(pixel).and_then(|l| self.get_local(l))
    }

    /// The tile adjacent to a local cell; the grid boundary reads as empty
    #[inline]
    pub fn neighbor(&self, local: IVec2, dir: Direction) -> Option<&Tile> {
        self.get_local(local + dir.offset())
    }

    #[inline]
    pub fn has_neighbor(&self, local: IVec2, dir: Direction) -> bool {
        self.neighbor(local, dir).is_some()
    }

    /// All four neighbours, indexed by `Direction as usize`
    pub fn neighbors(&self, local: IVec2) -> [Option<&Tile>; 4] {
        Direction::ALL.map(|dir| self.neighbor(local, dir))
    }

    /// Occupied cells in column-major order (x outer, y top to bottom)
    pub fn occupied(&self) -> impl Iterator<Item = (IVec2, &Tile)> + '_ {
        (0..GRID_WIDTH).flat_map(move |x| {
            (0..GRID_HEIGHT).filter_map(move |y| {
                let local = IVec2::new(x, y);
                self.get_local(local).map(|t| (local, t))
            })
        })
    }

    pub fn tile_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    // --- Mutation ---

    /// Store a tile at a global coordinate, returning whatever it displaced
    pub fn place(&mut self, tile: Tile, global: IVec2) -> Result<Option<Tile>, GridError> {
        let local = self
            .global_to_local(global)
            .ok_or_else(|| GridError::out_of_bounds(global))?;
        Ok(self.place_local(tile, local))
    }

    /// Empty the cell at a global coordinate
    pub fn remove(&mut self, global: IVec2) -> Result<Option<Tile>, GridError> {
        let local = self
            .global_to_local(global)
            .ok_or_else(|| GridError::out_of_bounds(global))?;
        Ok(self.remove_local(local))
    }

    pub(crate) fn place_local(&mut self, tile: Tile, local: IVec2) -> Option<Tile> {
        let i = self.index(local)?;
        self.cells[i].replace(tile)
    }

    pub(crate) fn remove_local(&mut self, local: IVec2) -> Option<Tile> {
        let i = self.index(local)?;
        self.cells[i].take()
    }

    /// Move the occupant of `from` into the empty cell `to`
    pub(crate) fn move_local(&mut self, from: IVec2, to: IVec2) -> bool {
        if self.get_local(to).is_some() || !self.contains_local(to) {
            return false;
        }
        match self.remove_local(from) {
            Some(tile) => {
                self.place_local(tile, to);
                true
            }
            None => false,
        }
    }

    // --- Crystal envelope ---

    /// Whether a global row lies inside the crystal envelope
    #[inline]
    pub fn in_envelope_global(&self, global: IVec2) -> bool {
        global.y.abs() <= self.crystal_height.abs()
    }

    /// Whether the pixel is over part of the currently playable envelope
    pub fn in_envelope(&self, pixel: IVec2) -> bool {
        self.pixel_to_global(pixel)
            .is_some_and(|g| self.in_envelope_global(g))
    }

    /// Top and bottom pixel rows of the unfogged band around the envelope
    pub fn fog_range(&self) -> (i32, i32) {
        let top = (self.crystal_height - self.origin.y - FOG_HEADROOM_ROWS) * TILE_LENGTH;
        let bottom = (-self.crystal_height - self.origin.y + 1) * TILE_LENGTH;
        (top, bottom)
    }

    /// Move the crystal to `(0, new_height)` and re-run the lock sweep
    ///
    /// Returns whatever tile occupied the target cell.
    pub fn relocate_crystal(&mut self, new_height: i32) -> Result<Option<Tile>, GridError> {
        let old = self.crystal_position();
        let target = IVec2::new(0, new_height);
        let target_local = self
            .global_to_local(target)
            .ok_or_else(|| GridError::out_of_bounds(target))?;
        if !self.get(old).is_some_and(Tile::is_crystal) {
            return Err(GridError::CrystalMissing {
                height: self.crystal_height,
            });
        }

        let crystal = self.remove(old)?;
        let displaced = match crystal {
            Some(crystal) => self.place_local(crystal, target_local),
            None => None,
        };
        log::debug!("Crystal moved from height {} to {}", self.crystal_height, new_height);
        self.crystal_height = new_height;
        self.refresh_locks();
        Ok(displaced)
    }

    /// Recompute every tile's lock state from the crystal envelope
    pub fn refresh_locks(&mut self) {
        let origin = self.origin;
        let limit = self.crystal_height.abs();
        for (i, cell) in self.cells.iter_mut().enumerate() {
            if let Some(tile) = cell {
                let global_y = i as i32 / GRID_WIDTH + origin.y;
                tile.locked = global_y.abs() > limit;
            }
        }
    }
}
