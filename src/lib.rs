//! Inventory and equipment accounting
//!
//! Slot-based inventories with stacking, weapon equip/holster/reload over a
//! shared ammo stock, and change notifications for UI layers.

pub mod config;
pub mod dropped_item;
pub mod equipment;
pub mod events;
pub mod inventory;
pub mod item;
pub mod player;

pub use config::LoadoutConfig;
pub use dropped_item::DroppedItem;
pub use equipment::{
    AmmoStatus, BufferChange, EquipmentManager, EquippedWeapon, FireEvent, WeaponCycle,
    WeaponState,
};
pub use events::{ListenerHandle, Listeners};
pub use inventory::{Inventory, Slot, SlotChange};
pub use item::{
    CatalogError, ItemDefinition, ItemProperties, ItemRef, ItemRegistry, WeaponAttributes,
};
pub use player::{Player, PlayerAction};
