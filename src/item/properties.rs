use serde::{Serialize, Deserialize};

/// Different categories of items with type-specific data
///
/// Inventory code treats every item the same way; only equipment code
/// looks inside to find weapon parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ItemProperties {
    /// Plain item (ammo, consumables, materials)
    #[default]
    Generic,

    /// Item that can be equipped and fired
    Weapon(WeaponAttributes),
}

/// Weapon-specific parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponAttributes {
    /// Seconds between shots while the trigger is held
    #[serde(default)]
    pub fire_rate: f32,

    /// Rounds the magazine holds
    #[serde(default)]
    pub magazine_size: u32,

    /// Keeps firing while the trigger is held
    #[serde(default)]
    pub automatic: bool,

    /// Item id of the ammunition (None = needs no ammo)
    #[serde(default)]
    pub ammo_item_id: Option<String>,
}

impl WeaponAttributes {
    pub fn new(
        fire_rate: f32,
        magazine_size: u32,
        automatic: bool,
        ammo_item_id: Option<&str>,
    ) -> Self {
        WeaponAttributes {
            fire_rate,
            magazine_size,
            automatic,
            ammo_item_id: ammo_item_id.map(str::to_string),
        }
    }
}
