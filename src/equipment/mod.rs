// Equipment module
//
// Weapon handling on top of the inventory:
// - EquippedWeapon: one weapon instance (magazine, trigger, holster state)
// - EquipmentManager: active/holstered weapons and the ammo buffer
// - WeaponCycle: weapon switching over inventory slots

pub mod cycle;
pub mod manager;
pub mod weapon;

pub use cycle::WeaponCycle;
pub use manager::{BufferChange, EquipmentManager};
pub use weapon::{AmmoStatus, EquippedWeapon, FireEvent, WeaponState};
