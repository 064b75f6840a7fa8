//! Fixed timestep simulation tick
//!
//! One tick runs, in order: pointer dispatch, player actions, tile physics,
//! item drift.

use glam::IVec2;

use super::physics;
use super::state::World;
use super::tile::{Direction, ItemKind, Tile, TileKind};
use crate::scene::{HitTarget, PointerEvent};

/// Input snapshot for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in pixels, `None` when outside the window
    pub cursor: Option<IVec2>,
    /// Left button went down this tick
    pub left_pressed: bool,
    /// Left button went up this tick
    pub left_released: bool,
    /// Left button completed a click this tick
    pub left_clicked: bool,
    pub right_clicked: bool,
    /// Wheel notches, positive moves the selection right
    pub scroll: i32,
}

/// Something observable that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    TileBroken { global: IVec2, kind: TileKind },
    TilePlaced { global: IVec2, kind: TileKind },
    TileCollapsed { global: IVec2, kind: TileKind },
    /// The crystal moved up a row to make room for a tile
    CrystalRaised { height: i32 },
    CrystalFell { height: i32 },
    ItemSpawned { id: u32, kind: ItemKind },
    ItemCollected { id: u32, kind: ItemKind },
    SlotSelected { slot: usize },
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput) -> Vec<WorldEvent> {
    let mut events = Vec::new();
    world.time_ticks += 1;
    world.cursor = input.cursor;

    dispatch_pointer(world, input, &mut events);

    if input.scroll != 0 {
        world.hotbar.change_selection(input.scroll);
        events.push(WorldEvent::SlotSelected {
            slot: world.hotbar.selected(),
        });
    }

    if input.left_released {
        world.cancel_break();
    } else {
        if input.left_pressed {
            if let Some(cursor) = input.cursor {
                world.start_break(cursor);
            }
        }
        advance_break(world, &mut events);
    }

    if input.right_clicked {
        if let Some(cursor) = input.cursor {
            place_selected(world, cursor, &mut events);
        }
    }

    let report = physics::step(&mut world.grid);
    for collapse in &report.collapsed {
        events.push(WorldEvent::TileCollapsed {
            global: collapse.global,
            kind: collapse.kind,
        });
        if let Some(drop) = collapse.kind.traits().drop {
            let id = world.spawn_item(drop, collapse.pixel);
            events.push(WorldEvent::ItemSpawned { id, kind: drop });
        }
    }
    if report.crystal_moved {
        log::info!("Crystal fell to height {}", world.grid.crystal_height());
        events.push(WorldEvent::CrystalFell {
            height: world.grid.crystal_height(),
        });
    }

    world.drift_items();
    events
}

/// Route enter/leave and clicks to whatever is under the pointer
fn dispatch_pointer(world: &mut World, input: &TickInput, events: &mut Vec<WorldEvent>) {
    for event in world.hit_list.update(input.cursor) {
        match event {
            PointerEvent::Enter(HitTarget::Item(id)) => {
                if let Some(kind) = world.collect_item(id) {
                    events.push(WorldEvent::ItemCollected { id, kind });
                }
            }
            PointerEvent::Enter(target) => log::trace!("Pointer entered {:?}", target),
            PointerEvent::Leave(target) => log::trace!("Pointer left {:?}", target),
        }
    }

    if input.left_clicked {
        if let Some(HitTarget::HotbarSlot(slot)) = world.hit_list.click() {
            world.hotbar.select(slot);
            events.push(WorldEvent::SlotSelected { slot });
        }
    }
}

/// Move the break indicator with the pointer and break its tile once complete
fn advance_break(world: &mut World, events: &mut Vec<WorldEvent>) {
    let Some(cursor) = world.cursor else {
        return;
    };
    let left_cell = match world.break_indicator.as_mut() {
        Some(indicator) => !indicator.follow(cursor),
        None => return,
    };
    if left_cell && !world.start_break(cursor) {
        return;
    }

    let Some(indicator) = world.break_indicator.as_mut() else {
        return;
    };
    indicator.advance();
    if !indicator.is_complete() {
        return;
    }
    let target = indicator.target;
    world.cancel_break();

    let breakable = world.grid.get(target).is_some_and(Tile::can_break);
    if !breakable {
        log::debug!("Nothing left to break at ({}, {})", target.x, target.y);
        return;
    }
    let Ok(Some(tile)) = world.grid.remove(target) else {
        return;
    };
    log::debug!("Broke {:?} at ({}, {})", tile.kind, target.x, target.y);
    events.push(WorldEvent::TileBroken {
        global: target,
        kind: tile.kind,
    });
    if let Some(drop) = tile.traits().drop {
        let pixel = world.grid.local_to_pixel(target - world.grid.origin());
        let id = world.spawn_item(drop, pixel);
        events.push(WorldEvent::ItemSpawned { id, kind: drop });
    }
}

/// Use one item from the selected hotbar slot at `cursor`
///
/// An empty cell takes the tile directly. Clicking the crystal raises it one
/// row and puts the tile where it stood.
fn place_selected(world: &mut World, cursor: IVec2, events: &mut Vec<WorldEvent>) {
    if !world.grid.in_envelope(cursor) {
        log::debug!("Place at ({}, {}) is outside the envelope", cursor.x, cursor.y);
        return;
    }
    let Some(kind) = world.hotbar.selected_tile() else {
        return;
    };
    let Some(global) = world.grid.pixel_to_global(cursor) else {
        return;
    };

    match world.grid.get(global) {
        None => {}
        Some(tile) if tile.is_crystal() => {
            let above = global + Direction::Top.offset();
            if world.grid.global_to_local(above).is_none() || world.grid.get(above).is_some() {
                log::warn!("No room to raise the crystal above height {}", global.y);
                return;
            }
            if let Err(err) = world.grid.relocate_crystal(above.y) {
                log::warn!("Crystal could not be raised: {}", err);
                return;
            }
            log::info!("Crystal raised to height {}", above.y);
            events.push(WorldEvent::CrystalRaised { height: above.y });
        }
        Some(_) => return,
    }

    if let Err(err) = world.grid.place(Tile::new(kind), global) {
        log::warn!("Place rejected: {}", err);
        return;
    }
    world.hotbar.take_selected();
    world.grid.refresh_locks();
    log::debug!("Placed {:?} at ({}, {})", kind, global.x, global.y);
    events.push(WorldEvent::TilePlaced { global, kind });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{HOTBAR_SLOTS, TILE_LENGTH};
    use crate::settings::Settings;
    use crate::sim::hotbar::Hotbar;

    fn new_world() -> World {
        World::new(&Settings::default()).unwrap()
    }

    fn centre_of(world: &World, global: IVec2) -> IVec2 {
        world.grid.local_to_pixel(global - world.grid.origin()) + IVec2::splat(TILE_LENGTH / 2)
    }

    fn hover(cursor: IVec2) -> TickInput {
        TickInput {
            cursor: Some(cursor),
            ..Default::default()
        }
    }

    fn kind_at(world: &World, x: i32, y: i32) -> Option<TileKind> {
        world.grid.get(IVec2::new(x, y)).map(|t| t.kind)
    }

    #[test]
    fn test_idle_world_is_quiet() {
        let mut world = new_world();
        for _ in 0..120 {
            assert!(tick(&mut world, &TickInput::default()).is_empty());
        }
        assert_eq!(world.time_ticks, 120);
        assert_eq!(world.grid.crystal_height(), -5);
    }

    #[test]
    fn test_holding_left_breaks_tile() {
        let mut world = new_world();
        let grass = IVec2::new(5, 1);
        let cursor = centre_of(&world, grass);

        let press = TickInput {
            left_pressed: true,
            ..hover(cursor)
        };
        assert!(tick(&mut world, &press).is_empty());
        // Grass takes 30 ticks including the press tick
        for _ in 0..28 {
            assert!(tick(&mut world, &hover(cursor)).is_empty());
        }
        assert_eq!(kind_at(&world, 5, 1), Some(TileKind::Grass));

        let events = tick(&mut world, &hover(cursor));
        assert_eq!(kind_at(&world, 5, 1), None);
        assert_eq!(
            events[0],
            WorldEvent::TileBroken {
                global: grass,
                kind: TileKind::Grass
            }
        );
        assert!(matches!(
            events[1],
            WorldEvent::ItemSpawned {
                kind: ItemKind::Mud,
                ..
            }
        ));
        assert!(world.break_indicator().is_none());
        assert_eq!(world.items.len(), 1);

        // The drop lands under the pointer and is collected on the next tick
        let events = tick(&mut world, &hover(cursor));
        assert!(matches!(
            events[0],
            WorldEvent::ItemCollected {
                kind: ItemKind::Mud,
                ..
            }
        ));
        assert!(world.items.is_empty());
        assert_eq!(world.hotbar.slot(0).map(|s| s.amount), Some(101));
    }

    #[test]
    fn test_release_cancels_break() {
        let mut world = new_world();
        let cursor = centre_of(&world, IVec2::new(5, 1));
        tick(
            &mut world,
            &TickInput {
                left_pressed: true,
                ..hover(cursor)
            },
        );
        assert!(world.break_indicator().is_some());
        tick(
            &mut world,
            &TickInput {
                left_released: true,
                ..hover(cursor)
            },
        );
        assert!(world.break_indicator().is_none());
        assert_eq!(world.render_list().len(), 5);
    }

    #[test]
    fn test_moving_off_cell_restarts_indicator() {
        let mut world = new_world();
        let first = centre_of(&world, IVec2::new(5, 1));
        tick(
            &mut world,
            &TickInput {
                left_pressed: true,
                ..hover(first)
            },
        );
        for _ in 0..10 {
            tick(&mut world, &hover(first));
        }
        assert!(world.break_indicator().unwrap().progress > 0.0);

        // Onto the dirt below: a fresh indicator
        let second = centre_of(&world, IVec2::new(5, 2));
        tick(&mut world, &hover(second));
        let indicator = world.break_indicator().unwrap();
        assert_eq!(indicator.target, IVec2::new(5, 2));
        assert!((indicator.progress - 2.0).abs() < 1e-9);

        // Into open sky: nothing to break
        let sky = centre_of(&world, IVec2::new(5, -2));
        tick(&mut world, &hover(sky));
        assert!(world.break_indicator().is_none());
        assert_eq!(world.render_list().len(), 5);
    }

    #[test]
    fn test_right_click_places_selected_tile() {
        let mut world = new_world();
        let target = IVec2::new(6, 0);
        let input = TickInput {
            right_clicked: true,
            ..hover(centre_of(&world, target))
        };
        let events = tick(&mut world, &input);
        assert_eq!(
            events,
            vec![WorldEvent::TilePlaced {
                global: target,
                kind: TileKind::Dirt
            }]
        );
        assert_eq!(kind_at(&world, 6, 0), Some(TileKind::Dirt));
        assert_eq!(world.hotbar.slot(0).map(|s| s.amount), Some(99));

        // Occupied cell: nothing happens
        assert!(tick(&mut world, &input).is_empty());
        assert_eq!(world.hotbar.slot(0).map(|s| s.amount), Some(99));
    }

    #[test]
    fn test_place_outside_envelope_is_rejected() {
        let mut world = new_world();
        let input = TickInput {
            right_clicked: true,
            ..hover(centre_of(&world, IVec2::new(6, -7)))
        };
        assert!(tick(&mut world, &input).is_empty());
        assert_eq!(kind_at(&world, 6, -7), None);
    }

    #[test]
    fn test_empty_slot_places_nothing() {
        let mut world = new_world();
        world.hotbar.select(HOTBAR_SLOTS - 1);
        let input = TickInput {
            right_clicked: true,
            ..hover(centre_of(&world, IVec2::new(6, 0)))
        };
        assert!(tick(&mut world, &input).is_empty());
        assert_eq!(kind_at(&world, 6, 0), None);
    }

    #[test]
    fn test_growing_tower_collapses_overloaded_dirt() {
        let mut world = new_world();
        let crystal = centre_of(&world, IVec2::new(0, -5));
        let input = TickInput {
            right_clicked: true,
            ..hover(crystal)
        };
        let events = tick(&mut world, &input);

        assert_eq!(world.grid.crystal_height(), -6);
        assert_eq!(kind_at(&world, 0, -6), Some(TileKind::Crystal));
        assert_eq!(kind_at(&world, 0, -5), Some(TileKind::Dirt));
        assert!(events.contains(&WorldEvent::CrystalRaised { height: -6 }));

        // The base of the tower now carries eleven tiles, one past its strength
        assert!(events.contains(&WorldEvent::TileCollapsed {
            global: IVec2::new(0, 5),
            kind: TileKind::Dirt
        }));
        assert_eq!(kind_at(&world, 0, 5), None);
        assert_eq!(world.items.len(), 1);
        assert_eq!(world.items[0].kind, ItemKind::Mud);

        // The envelope grew with the crystal
        assert!(!world.grid.get(IVec2::new(4, 6)).unwrap().locked);
    }

    #[test]
    fn test_collapsed_tile_drops_item_in_its_cell() {
        let settings = Settings {
            item_launch_speed: 0,
            ..Settings::default()
        };
        let mut world = World::new(&settings).unwrap();
        let crystal = centre_of(&world, IVec2::new(0, -5));
        let input = TickInput {
            right_clicked: true,
            ..hover(crystal)
        };
        let events = tick(&mut world, &input);

        let id = events
            .iter()
            .find_map(|e| match e {
                WorldEvent::ItemSpawned { id, kind: ItemKind::Mud } => Some(*id),
                _ => None,
            })
            .unwrap();
        // Global (0, 5) sits at local (14, 15), pixel (700, 750)
        let cell = world.grid.local_to_pixel(IVec2::new(0, 5) - world.grid.origin());
        assert_eq!(cell, IVec2::new(700, 750));
        assert_eq!(world.item(id).unwrap().pos, cell + IVec2::splat(3));
    }

    #[test]
    fn test_scroll_and_click_select_slots() {
        let mut world = new_world();
        let events = tick(
            &mut world,
            &TickInput {
                scroll: -1,
                ..Default::default()
            },
        );
        assert_eq!(events, vec![WorldEvent::SlotSelected { slot: 7 }]);

        let slot = Hotbar::slot_bound(2);
        let input = TickInput {
            left_clicked: true,
            ..hover(slot.min + IVec2::splat(10))
        };
        let events = tick(&mut world, &input);
        assert_eq!(events, vec![WorldEvent::SlotSelected { slot: 2 }]);
        assert_eq!(world.hotbar.selected_tile(), Some(TileKind::Scaffold));
    }

    #[test]
    fn test_same_inputs_same_world() {
        let script = |world: &mut World| {
            let crystal = centre_of(world, IVec2::new(0, -5));
            tick(
                world,
                &TickInput {
                    right_clicked: true,
                    ..hover(crystal)
                },
            );
            for _ in 0..30 {
                tick(world, &hover(IVec2::new(10, 10)));
            }
        };
        let mut a = new_world();
        let mut b = new_world();
        script(&mut a);
        script(&mut b);
        let pa: Vec<IVec2> = a.items.iter().map(|i| i.pos).collect();
        let pb: Vec<IVec2> = b.items.iter().map(|i| i.pos).collect();
        assert_eq!(pa, pb);
        assert_eq!(a.grid.tile_count(), b.grid.tile_count());
    }
}
