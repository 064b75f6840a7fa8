//! Inventory hotbar
//!
//! Eight slots along the bottom of the screen. Collected items stack onto a
//! slot already holding their kind, otherwise they take the first empty slot.

use glam::IVec2;

use super::tile::{ItemKind, TileKind};
use crate::consts::{HOTBAR_ORIGIN, HOTBAR_SLOTS, HOTBAR_SLOT_INSET, HOTBAR_SLOT_STRIDE, ITEM_LENGTH};
use crate::scene::Bound;
use crate::settings::StartingStack;

/// One occupied hotbar slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stack {
    pub item: ItemKind,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotbar {
    slots: [Option<Stack>; HOTBAR_SLOTS],
    selected: usize,
}

impl Default for Hotbar {
    fn default() -> Self {
        Self {
            slots: [None; HOTBAR_SLOTS],
            selected: 0,
        }
    }
}

impl Hotbar {
    /// A hotbar filled left to right from `stacks`
    pub fn with_stacks(stacks: &[StartingStack]) -> Self {
        let mut hotbar = Self::default();
        for stack in stacks {
            hotbar.add_items(stack.item, stack.amount);
        }
        hotbar
    }

    pub fn slots(&self) -> &[Option<Stack>; HOTBAR_SLOTS] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<Stack> {
        self.slots.get(index).copied().flatten()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_stack(&self) -> Option<Stack> {
        self.slot(self.selected)
    }

    /// Add one collected item; returns false if every slot holds another kind
    pub fn add_item(&mut self, item: ItemKind) -> bool {
        self.add_items(item, 1)
    }

    pub fn add_items(&mut self, item: ItemKind, amount: u32) -> bool {
        if amount == 0 {
            return true;
        }
        if let Some(stack) = self.slots.iter_mut().flatten().find(|s| s.item == item) {
            stack.amount += amount;
            return true;
        }
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(Stack { item, amount });
                true
            }
            None => {
                log::warn!("Hotbar full, dropping {:?}", item);
                false
            }
        }
    }

    /// Move the selection by `delta` slots, wrapping in both directions
    pub fn change_selection(&mut self, delta: i32) {
        let slots = HOTBAR_SLOTS as i32;
        self.selected = (self.selected as i32 + delta).rem_euclid(slots) as usize;
    }

    pub fn select(&mut self, index: usize) {
        if index < HOTBAR_SLOTS {
            self.selected = index;
        }
    }

    /// Tile the selected slot would place, without consuming it
    pub fn selected_tile(&self) -> Option<TileKind> {
        self.selected_stack().map(|s| s.item.tile())
    }

    /// Consume one item from the selected slot; the slot is cleared when empty
    pub fn take_selected(&mut self) -> Option<TileKind> {
        let slot = &mut self.slots[self.selected];
        let stack = slot.as_mut()?;
        let tile = stack.item.tile();
        stack.amount = stack.amount.saturating_sub(1);
        if stack.amount == 0 {
            *slot = None;
        }
        Some(tile)
    }

    /// Top-left pixel of slot `index`
    pub fn slot_origin(index: usize) -> IVec2 {
        IVec2::new(
            HOTBAR_ORIGIN.0 + HOTBAR_SLOT_STRIDE * index as i32,
            HOTBAR_ORIGIN.1,
        )
    }

    /// Clickable region of slot `index`
    pub fn slot_bound(index: usize) -> Bound {
        Bound::from_size(Self::icon_origin(index), IVec2::splat(ITEM_LENGTH))
    }

    /// Where the item icon of slot `index` is drawn
    pub fn icon_origin(index: usize) -> IVec2 {
        Self::slot_origin(index) + IVec2::splat(HOTBAR_SLOT_INSET)
    }
}
