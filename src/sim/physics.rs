//! Per-tick tile physics
//!
//! Each tick decides, for every occupied cell, whether the tile falls,
//! collapses, or stays. Decisions are taken against the grid as it stood at
//! the end of the previous tick and only then applied, so no decision sees a
//! half-updated grid.
//!
//! Rules:
//! - Fall: a fall-eligible, unlocked tile with nothing below it falls one
//!   cell unless a contiguous row of neighbours reaches a supported tile
//!   within its stickiness, on either side.
//! - Collapse: a tile with finite strength collapses when the number of tiles
//!   resting on it exceeds that strength.
//! - Lock sweep: lock state is recomputed from the crystal envelope.

use std::collections::{HashSet, VecDeque};

use glam::IVec2;

use super::grid::TileGrid;
use super::tile::{Direction, Strength, Tile, TileKind};

/// A tile removed by collapse this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collapse {
    /// Global tile coordinate it occupied
    pub global: IVec2,
    /// Top-left pixel of its former cell
    pub pixel: IVec2,
    pub kind: TileKind,
}

/// What one physics step changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicsReport {
    /// Global (from, to) of every tile that moved down
    pub fallen: Vec<(IVec2, IVec2)>,
    pub collapsed: Vec<Collapse>,
    pub crystal_moved: bool,
}

impl PhysicsReport {
    pub fn is_quiet(&self) -> bool {
        self.fallen.is_empty() && self.collapsed.is_empty()
    }
}

/// Whether a contiguous run of neighbours in `dir` reaches a tile with bottom support
///
/// The walk covers distances `1..=reach`; an empty cell (or the grid edge)
/// ends it unsupported.
pub fn supported_from_side(grid: &TileGrid, local: IVec2, dir: Direction, reach: u32) -> bool {
    let mut cell = local;
    for _ in 0..reach {
        cell += dir.offset();
        if grid.get_local(cell).is_none() {
            return false;
        }
        if grid.has_neighbor(cell, Direction::Bottom) {
            return true;
        }
    }
    false
}

/// Whether the tile at `local` falls this tick
pub fn will_fall(grid: &TileGrid, local: IVec2, tile: &Tile) -> bool {
    let traits = tile.traits();
    if !traits.fall_eligible || tile.locked || grid.has_neighbor(local, Direction::Bottom) {
        return false;
    }
    // The grid floor has nowhere to fall to
    if !grid.contains_local(local + Direction::Bottom.offset()) {
        return false;
    }
    if tile.is_crystal() && grid.local_to_global(local).y >= 0 {
        // The crystal never sinks below ground level
        return false;
    }
    !supported_from_side(grid, local, Direction::Left, traits.stickiness)
        && !supported_from_side(grid, local, Direction::Right, traits.stickiness)
}

/// Number of tiles resting on the tile at `local`, counted up to `limit + 1`
///
/// Breadth-first from the tile above, following TOP edges and lateral edges
/// into neighbours that have nothing below them. Stops as soon as the count
/// exceeds `limit`.
pub fn load(grid: &TileGrid, local: IVec2, limit: u32) -> u32 {
    let start = local + Direction::Top.offset();
    if grid.get_local(start).is_none() {
        return 0;
    }

    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    let mut count = 0;

    while let Some(cell) = queue.pop_front() {
        count += 1;
        if count > limit {
            break;
        }

        let up = cell + Direction::Top.offset();
        if grid.get_local(up).is_some() && visited.insert(up) {
            queue.push_back(up);
        }
        for dir in [Direction::Left, Direction::Right] {
            let side = cell + dir.offset();
            if grid.get_local(side).is_some()
                && !grid.has_neighbor(side, Direction::Bottom)
                && visited.insert(side)
            {
                queue.push_back(side);
            }
        }
    }
    count
}

/// Whether the tile at `local` is carrying more than its strength
pub fn will_collapse(grid: &TileGrid, local: IVec2, tile: &Tile) -> bool {
    match tile.traits().strength {
        Strength::Unbreakable => false,
        Strength::Bears(limit) => load(grid, local, limit) > limit,
    }
}

/// Run one physics step over the whole grid
pub fn step(grid: &mut TileGrid) -> PhysicsReport {
    // Decide everything against the settled grid first
    let mut falls = Vec::new();
    let mut collapse_candidates = Vec::new();
    for (local, tile) in grid.occupied() {
        if will_fall(grid, local, tile) {
            falls.push(local);
        } else if will_collapse(grid, local, tile) {
            collapse_candidates.push(local);
        }
    }

    // A tile whose support is itself collapsing waits for the next tick
    let collapsing: HashSet<IVec2> = collapse_candidates.iter().copied().collect();
    collapse_candidates.retain(|local| !collapsing.contains(&(*local + Direction::Bottom.offset())));

    let mut report = PhysicsReport::default();

    // Apply falls bottom-up so a tile never lands in a cell that is still leaving
    for &local in falls.iter().rev() {
        let below = local + Direction::Bottom.offset();
        let from = grid.local_to_global(local);
        let to = grid.local_to_global(below);
        let is_crystal = grid.get_local(local).is_some_and(Tile::is_crystal);
        let moved = if is_crystal {
            match grid.relocate_crystal(grid.crystal_height() + 1) {
                Ok(_) => {
                    report.crystal_moved = true;
                    true
                }
                Err(err) => {
                    log::warn!("Crystal could not fall: {}", err);
                    false
                }
            }
        } else {
            grid.move_local(local, below)
        };
        if moved {
            log::debug!("Tile fell from ({}, {}) to ({}, {})", from.x, from.y, to.x, to.y);
            report.fallen.push((from, to));
        }
    }

    for local in collapse_candidates {
        if let Some(tile) = grid.remove_local(local) {
            let global = grid.local_to_global(local);
            log::debug!("{:?} collapsed at ({}, {})", tile.kind, global.x, global.y);
            report.collapsed.push(Collapse {
                global,
                pixel: grid.local_to_pixel(local),
                kind: tile.kind,
            });
        }
    }

    grid.refresh_locks();
    report
}
