use std::collections::HashMap;
use tracing::{debug, trace};
use crate::events::{ListenerHandle, Listeners};
use crate::item::ItemRef;
use super::slot::{Slot, SlotChange};

/// Fixed-capacity slot container
///
/// Slot indices are stable: slots are never reordered, and the slot count
/// only changes through `resize`. A per-item totals cache answers quantity
/// queries without scanning; it is always derivable from the slots.
#[derive(Debug)]
pub struct Inventory {
    /// Slots in index order (empty slots hold no item)
    slots: Vec<Slot>,

    /// Cached quantity per item id (absent = 0)
    totals: HashMap<String, u32>,

    /// Inventory-changed listeners; they get read access to the new state
    listeners: Listeners<Inventory>,
}

impl Inventory {
    /// Creates a new empty inventory with the specified capacity (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Inventory {
            slots: (0..capacity).map(|_| Slot::new()).collect(),
            totals: HashMap::new(),
            listeners: Listeners::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// All slots in index order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Returns the slot at `index`, or None if out of range
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Returns true if the inventory has no items
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Slot::is_empty)
    }

    /// Returns true if all slots are occupied
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|slot| !slot.is_empty())
    }

    /// Indices of slots holding weapons, in index order
    pub fn weapon_slots(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.item().is_some_and(|item| item.is_weapon()))
            .map(|(index, _)| index)
            .collect()
    }

    /// Adds items to the inventory
    ///
    /// Returns the number of units that couldn't fit (0 = fully absorbed).
    ///
    /// # Strategy
    /// 1. Stackable items top up existing stacks of the same id, in index order
    /// 2. Empty slots are filled in index order: up to a full stack for
    ///    stackable items, exactly one unit per slot otherwise
    pub fn try_add(&mut self, item: &ItemRef, amount: u32) -> u32 {
        if amount == 0 {
            return 0;
        }

        let max_stack = item.effective_max_stack();
        let mut remaining = amount;

        // Phase 1: Top up existing stacks
        if item.stackable {
            for slot in self.slots.iter_mut() {
                if remaining == 0 {
                    break;
                }
                if slot.holds(&item.id) {
                    remaining -= slot.add(remaining, max_stack);
                }
            }
        }

        // Phase 2: Create new stacks in empty slots
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if remaining == 0 {
                break;
            }
            if !slot.is_empty() {
                continue;
            }

            let placed = if item.stackable { remaining.min(max_stack) } else { 1 };
            slot.set(item.clone(), placed);
            remaining -= placed;
            trace!(index, id = %item.id, placed, "new stack");
        }

        let added = amount - remaining;
        if added > 0 {
            *self.totals.entry(item.id.clone()).or_insert(0) += added;
            debug!(id = %item.id, added, leftover = remaining, "items added");
            self.notify();
        }

        remaining
    }

    /// Adds items, returning true only if every unit fit
    pub fn add(&mut self, item: &ItemRef, amount: u32) -> bool {
        self.try_add(item, amount) == 0
    }

    /// Removes `amount` units of an item
    ///
    /// All-or-nothing: returns false without touching anything if fewer than
    /// `amount` units are held. Later slots are drained first.
    pub fn remove(&mut self, item_id: &str, amount: u32) -> bool {
        let total = self.get_total(item_id);
        if amount == 0 || total < amount {
            return false;
        }

        let mut needed = amount;
        for slot in self.slots.iter_mut().rev() {
            if needed == 0 {
                break;
            }
            if slot.holds(item_id) {
                needed -= slot.remove(needed);
            }
        }

        let new_total = total - amount;
        if new_total == 0 {
            self.totals.remove(item_id);
        } else {
            self.totals.insert(item_id.to_string(), new_total);
        }

        debug!(id = item_id, amount, remaining = new_total, "items removed");
        self.notify();
        true
    }

    /// Removes up to `amount` units from one slot
    ///
    /// Returns how many units were removed (0 for a bad index or empty slot).
    pub fn remove_from_slot(&mut self, index: usize, amount: u32) -> u32 {
        let Some(slot) = self.slots.get_mut(index) else {
            return 0;
        };
        if slot.is_empty() {
            return 0;
        }

        let removed = slot.remove(amount);
        if removed > 0 {
            self.rebuild_totals();
            debug!(index, removed, "removed from slot");
            self.notify();
        }
        removed
    }

    /// Empties one slot, returning the quantity it held
    pub fn clear_slot(&mut self, index: usize) -> u32 {
        let Some(slot) = self.slots.get_mut(index) else {
            return 0;
        };
        if slot.is_empty() {
            return 0;
        }

        let removed = slot.clear();
        self.rebuild_totals();
        debug!(index, removed, "slot cleared");
        self.notify();
        removed
    }

    /// Checks if at least `amount` units of an item are held
    pub fn has(&self, item_id: &str, amount: u32) -> bool {
        self.get_total(item_id) >= amount
    }

    /// Total units of an item across all slots
    pub fn get_total(&self, item_id: &str) -> u32 {
        self.totals.get(item_id).copied().unwrap_or(0)
    }

    /// Changes the slot count
    ///
    /// Growing appends empty slots. Shrinking drops slots from the tail and
    /// hands their contents back to the caller, who may re-add them
    /// elsewhere; the inventory itself no longer counts them.
    pub fn resize(&mut self, new_capacity: usize) -> Vec<(ItemRef, u32)> {
        let new_capacity = new_capacity.max(1);
        let old_capacity = self.slots.len();
        if new_capacity == old_capacity {
            return Vec::new();
        }

        let mut evicted = Vec::new();
        if new_capacity > old_capacity {
            self.slots.resize_with(new_capacity, Slot::new);
        } else {
            for mut slot in self.slots.drain(new_capacity..) {
                if let Some(contents) = slot.take_contents() {
                    evicted.push(contents);
                }
            }
            self.rebuild_totals();
        }

        debug!(old_capacity, new_capacity, evicted = evicted.len(), "inventory resized");
        self.notify();
        evicted
    }

    /// Registers a callback for inventory changes
    ///
    /// The callback receives the inventory after the change and may read it
    /// through `get_total` and the slot accessors.
    pub fn subscribe(&mut self, callback: impl FnMut(&Inventory) + 'static) -> ListenerHandle {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        self.listeners.unsubscribe(handle)
    }

    /// Registers a callback for changes to one slot (None for a bad index)
    pub fn subscribe_slot(
        &mut self,
        index: usize,
        callback: impl FnMut(&SlotChange) + 'static,
    ) -> Option<ListenerHandle> {
        self.slots.get_mut(index).map(|slot| slot.subscribe(callback))
    }

    pub fn unsubscribe_slot(&mut self, index: usize, handle: ListenerHandle) -> bool {
        self.slots
            .get_mut(index)
            .is_some_and(|slot| slot.unsubscribe(handle))
    }

    /// Recomputes the totals cache from the slots
    fn rebuild_totals(&mut self) {
        self.totals.clear();
        for slot in &self.slots {
            if let Some(id) = slot.item_id() {
                *self.totals.entry(id.to_string()).or_insert(0) += slot.quantity();
            }
        }
    }

    fn notify(&mut self) {
        // Listeners read `self`, so they are detached for the duration of the call
        let mut listeners = std::mem::take(&mut self.listeners);
        listeners.emit(self);
        self.listeners = listeners;
    }
}
