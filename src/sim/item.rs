//! Dropped collectible items
//!
//! An item is spawned where a tile broke or collapsed, shoots off in a random
//! direction with decaying speed, and is collected when the pointer touches it.

use glam::{IVec2, Vec2};

use super::animator::Animator;
use super::tile::ItemKind;
use crate::consts::{ITEM_LENGTH, SCREEN_HEIGHT, SCREEN_WIDTH, TILE_LENGTH};
use crate::scene::{Bound, TempHandle};

/// Offset of the item sprite inside the cell it spawned from
const SPAWN_INSET: i32 = 3;

/// A dropped item entity
#[derive(Debug, Clone)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
    /// Top-left pixel
    pub pos: IVec2,
    /// Remaining drift speed in pixels per tick
    speed: i32,
    /// Drift heading in radians
    heading: f32,
    pub animator: Animator,
    /// Entry in the render list
    pub(crate) render_handle: Option<TempHandle>,
    /// Entry in the hit-test list
    pub(crate) hit_handle: Option<TempHandle>,
}

impl Item {
    /// A new item in the cell whose top-left pixel is `cell_pixel`
    pub fn new(
        id: u32,
        kind: ItemKind,
        cell_pixel: IVec2,
        speed: i32,
        heading: f32,
        frame_ticks: f64,
    ) -> Self {
        Self {
            id,
            kind,
            pos: cell_pixel + IVec2::splat(SPAWN_INSET),
            speed,
            heading,
            animator: Animator::new(kind.frame_count(), frame_ticks),
            render_handle: None,
            hit_handle: None,
        }
    }

    pub fn bound(&self) -> Bound {
        Bound::from_size(self.pos, IVec2::splat(ITEM_LENGTH))
    }

    pub fn is_moving(&self) -> bool {
        self.speed > 0
    }

    /// Advance one tick of drift; returns true if the item moved
    ///
    /// Each axis stops at the screen edge independently.
    pub fn drift(&mut self) -> bool {
        if self.speed <= 0 {
            return false;
        }
        let step = (Vec2::from_angle(self.heading) * self.speed as f32).as_ivec2();
        let next = self.pos + step;
        let max = IVec2::new(SCREEN_WIDTH - TILE_LENGTH, SCREEN_HEIGHT - TILE_LENGTH);
        let before = self.pos;
        if next.x >= 0 && next.x <= max.x {
            self.pos.x = next.x;
        }
        if next.y >= 0 && next.y <= max.y {
            self.pos.y = next.y;
        }
        self.speed -= 1;
        self.pos != before
    }
}
