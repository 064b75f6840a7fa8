//! Session state
//!
//! `World` owns everything a running session needs: the tile grid, dropped
//! items, the hotbar, the break indicator, and the two scene lists. The tick
//! driver mutates it; rendering reads it.

use std::f32::consts::TAU;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::animator::Animator;
use super::grid::{GridError, TileGrid};
use super::hotbar::Hotbar;
use super::item::Item;
use super::tile::ItemKind;
use crate::consts::*;
use crate::scene::{
    Bound, DrawCommand, Drawable, HitTarget, HitTestList, Painter, RenderList, RenderSurface,
    Sprite, TempHandle,
};
use crate::settings::Settings;
use crate::{layers, on_screen, snap_to_cell};

/// Progress on breaking the tile under the cursor
#[derive(Debug, Clone)]
pub struct BreakIndicator {
    /// Global tile being broken
    pub target: IVec2,
    /// Pixel region of the target cell; leaving it restarts the indicator
    pub cell: Bound,
    /// Top-left pixel of the indicator sprite
    pub pos: IVec2,
    pub break_time: f64,
    pub progress: f64,
    handle: TempHandle,
}

impl BreakIndicator {
    /// Add one tick of progress
    pub fn advance(&mut self) -> f64 {
        self.progress += 1.0 / self.break_time;
        self.progress
    }

    /// Keep the sprite on the pointer; returns false once the pointer has left the cell
    pub fn follow(&mut self, cursor: IVec2) -> bool {
        self.pos = indicator_pos(cursor);
        self.cell.contains(cursor)
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= BREAK_THRESHOLD
    }

    /// Sheet frame for the current progress
    pub fn frame(&self) -> usize {
        let fraction = (self.progress / BREAK_THRESHOLD).clamp(0.0, 1.0);
        ((fraction * BREAK_INDICATOR_FRAMES as f64) as usize).min(BREAK_INDICATOR_FRAMES - 1)
    }
}

/// Sprite position that centres the break indicator on `cursor`
fn indicator_pos(cursor: IVec2) -> IVec2 {
    cursor - IVec2::splat(BREAK_INDICATOR_LENGTH / 2)
}

/// A running session
pub struct World {
    /// Run seed
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub grid: TileGrid,
    /// Dropped items, sorted by id
    pub items: Vec<Item>,
    pub hotbar: Hotbar,
    pub(super) break_indicator: Option<BreakIndicator>,
    pub(super) cursor: Option<IVec2>,
    pub(super) render_list: RenderList,
    pub(super) hit_list: HitTestList,
    crystal_animator: Animator,
    rng: Pcg32,
    item_launch_speed: i32,
    item_frame_ticks: f64,
    next_id: u32,
}

impl World {
    /// Start a session from `settings`
    pub fn new(settings: &Settings) -> Result<Self, GridError> {
        let grid = TileGrid::seeded(settings)?;

        let mut render_list = RenderList::new();
        render_list.insert(Drawable::Background, layers::BACKGROUND);
        render_list.insert(Drawable::Tiles, layers::TILES);
        render_list.insert(Drawable::PlaceIndicator, layers::PLACE_INDICATOR);
        render_list.insert(Drawable::WarFog, layers::WAR_FOG);
        render_list.insert(Drawable::Hotbar, layers::HOTBAR);

        let mut hit_list = HitTestList::new();
        for slot in 0..HOTBAR_SLOTS {
            hit_list.insert(Hotbar::slot_bound(slot), HitTarget::HotbarSlot(slot));
        }

        log::info!("New session with seed {}", settings.seed);
        Ok(Self {
            seed: settings.seed,
            time_ticks: 0,
            grid,
            items: Vec::new(),
            hotbar: Hotbar::with_stacks(&settings.starting_hotbar),
            break_indicator: None,
            cursor: None,
            render_list,
            hit_list,
            crystal_animator: Animator::new(CRYSTAL_FRAMES, settings.crystal_frame_ticks),
            rng: Pcg32::seed_from_u64(settings.seed),
            item_launch_speed: settings.item_launch_speed,
            item_frame_ticks: settings.item_frame_ticks,
            next_id: 1,
        })
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Pointer position as of the last tick
    pub fn cursor(&self) -> Option<IVec2> {
        self.cursor
    }

    pub fn break_indicator(&self) -> Option<&BreakIndicator> {
        self.break_indicator.as_ref()
    }

    pub fn render_list(&self) -> &RenderList {
        &self.render_list
    }

    pub fn hit_list(&self) -> &HitTestList {
        &self.hit_list
    }

    pub fn item(&self, id: u32) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Drop an item into the cell whose top-left pixel is `cell_pixel`
    pub fn spawn_item(&mut self, kind: ItemKind, cell_pixel: IVec2) -> u32 {
        let id = self.next_entity_id();
        let heading = self.rng.random::<f32>() * TAU;
        let mut item = Item::new(
            id,
            kind,
            cell_pixel,
            self.item_launch_speed,
            heading,
            self.item_frame_ticks,
        );
        item.render_handle = Some(self.render_list.insert_temporary(Drawable::Item(id), layers::ITEMS));
        item.hit_handle = Some(self.hit_list.insert_temporary(item.bound(), HitTarget::Item(id)));
        log::debug!("Spawned {:?} item {} at ({}, {})", kind, id, item.pos.x, item.pos.y);
        self.items.push(item);
        id
    }

    /// Take an item out of the world and into the hotbar
    pub fn collect_item(&mut self, id: u32) -> Option<ItemKind> {
        let index = self.items.iter().position(|i| i.id == id)?;
        let item = self.items.remove(index);
        self.unlink_item(&item);
        self.hotbar.add_item(item.kind);
        log::debug!("Collected {:?} item {}", item.kind, id);
        Some(item.kind)
    }

    fn unlink_item(&mut self, item: &Item) {
        if let Some(handle) = item.render_handle {
            if let Err(err) = self.render_list.remove(handle) {
                log::warn!("Item {} had no render entry: {}", item.id, err);
            }
        }
        if let Some(handle) = item.hit_handle {
            if let Err(err) = self.hit_list.remove(handle) {
                log::warn!("Item {} had no hit entry: {}", item.id, err);
            }
        }
    }

    /// Advance every item's drift and keep its hit region in step
    pub fn drift_items(&mut self) {
        for item in &mut self.items {
            if !item.drift() {
                continue;
            }
            if let Some(handle) = item.hit_handle {
                match self.hit_list.relocate(handle, item.bound()) {
                    Ok(moved) => item.hit_handle = Some(moved),
                    Err(err) => {
                        log::warn!("Item {} lost its hit entry: {}", item.id, err);
                        item.hit_handle = None;
                    }
                }
            }
        }
    }

    /// Begin breaking the tile under `cursor`; returns false if there is nothing breakable
    pub fn start_break(&mut self, cursor: IVec2) -> bool {
        self.cancel_break();
        if !self.grid.in_envelope(cursor) {
            return false;
        }
        let Some(tile) = self.grid.tile_at_pixel(cursor).filter(|t| t.can_break()) else {
            return false;
        };
        let break_time = tile.traits().break_time;
        let Some(target) = self.grid.pixel_to_global(cursor) else {
            return false;
        };
        let handle = self
            .render_list
            .insert_temporary(Drawable::BreakIndicator, layers::BREAK_INDICATOR);
        self.break_indicator = Some(BreakIndicator {
            target,
            cell: self.grid.active_range(cursor),
            pos: indicator_pos(cursor),
            break_time,
            progress: 0.0,
            handle,
        });
        true
    }

    /// Drop the break indicator, if any
    pub fn cancel_break(&mut self) {
        if let Some(indicator) = self.break_indicator.take() {
            if let Err(err) = self.render_list.remove(indicator.handle) {
                log::warn!("Break indicator had no render entry: {}", err);
            }
        }
    }

    /// Draw the current frame, back to front
    ///
    /// Advances animation cursors; the grid itself is left untouched.
    pub fn render(&mut self, surface: &mut dyn RenderSurface) {
        let mut painter = WorldPainter {
            grid: &self.grid,
            items: &mut self.items,
            hotbar: &self.hotbar,
            break_indicator: self.break_indicator.as_ref(),
            crystal: &mut self.crystal_animator,
            cursor: self.cursor,
        };
        self.render_list.render(&mut painter, surface);
    }
}

/// Borrowed view of a world while its render list is walked
struct WorldPainter<'a> {
    grid: &'a TileGrid,
    items: &'a mut [Item],
    hotbar: &'a Hotbar,
    break_indicator: Option<&'a BreakIndicator>,
    crystal: &'a mut Animator,
    cursor: Option<IVec2>,
}

impl WorldPainter<'_> {
    fn paint_tiles(&mut self, surface: &mut dyn RenderSurface) {
        let crystal_frame = self.crystal.next_frame();
        for (local, tile) in self.grid.occupied() {
            let sprite = if tile.is_crystal() {
                Sprite::Crystal {
                    frame: crystal_frame,
                }
            } else {
                Sprite::Tile {
                    kind: tile.kind,
                    locked: tile.locked,
                }
            };
            surface.draw(&DrawCommand::Sprite {
                sprite,
                pos: self.grid.local_to_pixel(local),
            });
        }
    }

    fn paint_war_fog(&self, surface: &mut dyn RenderSurface) {
        let (top, bottom) = self.grid.fog_range();
        let edge_top = top - FOG_EDGE_HEIGHT;
        if edge_top > 0 {
            surface.draw(&DrawCommand::Fill {
                bound: Bound::new(IVec2::ZERO, IVec2::new(SCREEN_WIDTH - 1, edge_top - 1)),
            });
        }
        surface.draw(&DrawCommand::Sprite {
            sprite: Sprite::FogEdge { top: true },
            pos: IVec2::new(0, edge_top),
        });
        surface.draw(&DrawCommand::Sprite {
            sprite: Sprite::FogEdge { top: false },
            pos: IVec2::new(0, bottom),
        });
        let edge_bottom = bottom + FOG_EDGE_HEIGHT;
        if edge_bottom < SCREEN_HEIGHT {
            surface.draw(&DrawCommand::Fill {
                bound: Bound::new(
                    IVec2::new(0, edge_bottom),
                    IVec2::new(SCREEN_WIDTH - 1, SCREEN_HEIGHT - 1),
                ),
            });
        }
    }

    fn paint_hotbar(&self, surface: &mut dyn RenderSurface) {
        surface.draw(&DrawCommand::Sprite {
            sprite: Sprite::Hotbar,
            pos: IVec2::from(HOTBAR_ORIGIN),
        });
        for (slot, stack) in self.hotbar.slots().iter().enumerate() {
            if let Some(stack) = stack {
                surface.draw(&DrawCommand::Sprite {
                    sprite: Sprite::Item {
                        kind: stack.item,
                        frame: 0,
                    },
                    pos: Hotbar::icon_origin(slot),
                });
            }
        }
        surface.draw(&DrawCommand::Sprite {
            sprite: Sprite::Selection,
            pos: Hotbar::slot_origin(self.hotbar.selected()) + IVec2::splat(HOTBAR_SELECTION_INSET),
        });
    }
}

impl Painter for WorldPainter<'_> {
    fn paint(&mut self, drawable: &Drawable, surface: &mut dyn RenderSurface) {
        match *drawable {
            Drawable::Background => surface.draw(&DrawCommand::Sprite {
                sprite: Sprite::Background,
                pos: IVec2::ZERO,
            }),
            Drawable::Tiles => self.paint_tiles(surface),
            Drawable::PlaceIndicator => {
                let Some(cursor) = self.cursor.filter(|c| on_screen(*c)) else {
                    return;
                };
                if let Some(stack) = self.hotbar.selected_stack() {
                    surface.draw(&DrawCommand::Sprite {
                        sprite: Sprite::Item {
                            kind: stack.item,
                            frame: 0,
                        },
                        pos: snap_to_cell(cursor) + IVec2::splat(3),
                    });
                }
            }
            Drawable::BreakIndicator => {
                if let Some(indicator) = self.break_indicator {
                    surface.draw(&DrawCommand::Sprite {
                        sprite: Sprite::BreakIndicator {
                            frame: indicator.frame(),
                        },
                        pos: indicator.pos,
                    });
                }
            }
            Drawable::Item(id) => {
                if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
                    let frame = item.animator.next_frame();
                    surface.draw(&DrawCommand::Sprite {
                        sprite: Sprite::Item {
                            kind: item.kind,
                            frame,
                        },
                        pos: item.pos,
                    });
                }
            }
            Drawable::WarFog => self.paint_war_fog(surface),
            Drawable::Hotbar => self.paint_hotbar(surface),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::TileKind;

    fn new_world() -> World {
        World::new(&Settings::default()).unwrap()
    }

    /// Pixel centre of a global tile in the default layout
    fn centre_of(world: &World, global: IVec2) -> IVec2 {
        let local = world.grid.global_to_local(global).unwrap();
        world.grid.local_to_pixel(local) + IVec2::splat(TILE_LENGTH / 2)
    }

    #[test]
    fn test_new_world_registers_scene() {
        let world = new_world();
        assert_eq!(world.render_list().len(), 5);
        assert_eq!(world.hit_list().len(), HOTBAR_SLOTS);
        assert!(world.items.is_empty());
        assert_eq!(world.hotbar.selected_tile(), Some(TileKind::Dirt));
    }

    #[test]
    fn test_spawn_and_collect_item() {
        let mut world = new_world();
        let id = world.spawn_item(ItemKind::Stone, IVec2::new(700, 300));
        assert_eq!(world.render_list().len(), 6);
        assert_eq!(world.hit_list().len(), HOTBAR_SLOTS + 1);
        assert_eq!(world.item(id).map(|i| i.pos), Some(IVec2::new(703, 303)));

        assert_eq!(world.collect_item(id), Some(ItemKind::Stone));
        assert_eq!(world.render_list().len(), 5);
        assert_eq!(world.hit_list().len(), HOTBAR_SLOTS);
        assert_eq!(world.hotbar.slot(1).map(|s| s.amount), Some(101));
        assert_eq!(world.collect_item(id), None);
    }

    #[test]
    fn test_item_scatter_is_seeded() {
        let mut a = new_world();
        let mut b = new_world();
        for _ in 0..3 {
            a.spawn_item(ItemKind::Mud, IVec2::new(700, 300));
            b.spawn_item(ItemKind::Mud, IVec2::new(700, 300));
        }
        for _ in 0..20 {
            a.drift_items();
            b.drift_items();
        }
        let pa: Vec<IVec2> = a.items.iter().map(|i| i.pos).collect();
        let pb: Vec<IVec2> = b.items.iter().map(|i| i.pos).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_start_break_needs_breakable_tile_in_envelope() {
        let mut world = new_world();
        // Grass at the surface
        let grass = centre_of(&world, IVec2::new(5, 1));
        assert!(world.start_break(grass));
        assert_eq!(world.render_list().len(), 6);

        // Open sky
        let sky = centre_of(&world, IVec2::new(5, -3));
        assert!(!world.start_break(sky));
        assert!(world.break_indicator().is_none());
        assert_eq!(world.render_list().len(), 5);

        // Locked stone below the envelope
        let stone = centre_of(&world, IVec2::new(5, 7));
        assert!(!world.start_break(stone));

        // The crystal itself
        let crystal = centre_of(&world, IVec2::new(0, -5));
        assert!(!world.start_break(crystal));
    }

    #[test]
    fn test_break_frames_follow_progress() {
        let mut world = new_world();
        assert!(world.start_break(centre_of(&world, IVec2::new(5, 1))));
        let indicator = world.break_indicator.as_mut().unwrap();
        assert_eq!(indicator.frame(), 0);
        for _ in 0..15 {
            indicator.advance();
        }
        // Grass breaks in 30 ticks; half way there
        assert_eq!(indicator.frame(), BREAK_INDICATOR_FRAMES / 2);
        for _ in 0..15 {
            indicator.advance();
        }
        assert!(indicator.is_complete());
        assert_eq!(indicator.frame(), BREAK_INDICATOR_FRAMES - 1);
    }

    #[test]
    fn test_render_walks_layers_in_order() {
        let mut world = new_world();
        world.cursor = Some(IVec2::new(725, 425));
        world.spawn_item(ItemKind::Mud, IVec2::new(700, 300));
        let mut commands: Vec<DrawCommand> = Vec::new();
        world.render(&mut commands);

        let sprites: Vec<Sprite> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Sprite { sprite, .. } => Some(*sprite),
                DrawCommand::Fill { .. } => None,
            })
            .collect();
        assert_eq!(sprites.first(), Some(&Sprite::Background));
        assert_eq!(sprites.last(), Some(&Sprite::Selection));
        let tiles = sprites
            .iter()
            .filter(|s| matches!(s, Sprite::Tile { .. } | Sprite::Crystal { .. }))
            .count();
        assert_eq!(tiles, world.grid.tile_count());

        let crystal_at = sprites
            .iter()
            .position(|s| matches!(s, Sprite::Crystal { .. }))
            .unwrap();
        let item_at = sprites
            .iter()
            .position(|s| matches!(s, Sprite::Item { frame: 0, .. }))
            .unwrap();
        let fog_at = sprites
            .iter()
            .position(|s| matches!(s, Sprite::FogEdge { top: true }))
            .unwrap();
        assert!(crystal_at < item_at && item_at < fog_at);
    }

    #[test]
    fn test_render_leaves_grid_alone() {
        let mut world = new_world();
        let before: Vec<_> = world.grid.occupied().map(|(p, t)| (p, t.clone())).collect();
        let mut commands: Vec<DrawCommand> = Vec::new();
        for _ in 0..5 {
            world.render(&mut commands);
        }
        let after: Vec<_> = world.grid.occupied().map(|(p, t)| (p, t.clone())).collect();
        assert_eq!(before, after);
    }
}
