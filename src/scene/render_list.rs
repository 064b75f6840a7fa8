//! Layered draw ordering
//!
//! The render list holds one [`Drawable`] per visual element, ordered by
//! layer. Rendering walks it back to front and asks a [`Painter`] to turn each
//! drawable into [`DrawCommand`]s against the current world state.

use glam::IVec2;

use super::bound::Bound;
use super::ordered_list::{EntryId, OrderedList, OrderedListError, TempHandle};
use crate::sim::{ItemKind, TileKind};

/// A visual element in the render list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drawable {
    Background,
    /// Every tile in the grid
    Tiles,
    /// Ghost of the selected item under the cursor
    PlaceIndicator,
    BreakIndicator,
    /// A dropped item, by item id
    Item(u32),
    WarFog,
    Hotbar,
}

/// A single image to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    Background,
    Tile { kind: TileKind, locked: bool },
    Crystal { frame: usize },
    Item { kind: ItemKind, frame: usize },
    BreakIndicator { frame: usize },
    /// Faded edge of the war fog, above or below the envelope
    FogEdge { top: bool },
    Hotbar,
    Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCommand {
    Sprite { sprite: Sprite, pos: IVec2 },
    /// Opaque black rectangle
    Fill { bound: Bound },
}

/// Something draw commands can be issued to
pub trait RenderSurface {
    fn draw(&mut self, command: &DrawCommand);
}

/// Records commands in order
impl RenderSurface for Vec<DrawCommand> {
    fn draw(&mut self, command: &DrawCommand) {
        self.push(*command);
    }
}

/// Expands drawables into draw commands
pub trait Painter {
    fn paint(&mut self, drawable: &Drawable, surface: &mut dyn RenderSurface);
}

#[derive(Debug, Clone, Default)]
pub struct RenderList {
    entries: OrderedList<Drawable>,
}

impl RenderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, drawable: Drawable, layer: i32) -> EntryId {
        self.entries.insert(drawable, layer as i64)
    }

    pub fn insert_temporary(&mut self, drawable: Drawable, layer: i32) -> TempHandle {
        self.entries.insert_temporary(drawable, layer as i64)
    }

    pub fn remove(&mut self, handle: TempHandle) -> Result<Drawable, OrderedListError> {
        self.entries.remove(handle)
    }

    /// Drawables back to front
    pub fn iter(&self) -> impl Iterator<Item = &Drawable> + '_ {
        self.entries.iter()
    }

    /// Walk back to front, painting each drawable onto `surface`
    pub fn render(&self, painter: &mut impl Painter, surface: &mut dyn RenderSurface) {
        for drawable in &self.entries {
            painter.paint(drawable, surface);
        }
    }
}
