// Inventory module
//
// This module provides slot-based item storage:
// - Slot: one fixed cell holding one item kind and a quantity
// - Inventory: fixed-capacity ordered slots, totals cache, stacking

pub mod inventory;
pub mod slot;

// Re-export main types
pub use inventory::Inventory;
pub use slot::{Slot, SlotChange};
