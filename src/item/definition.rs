use serde::{Serialize, Deserialize};
use std::sync::Arc;
use super::properties::{ItemProperties, WeaponAttributes};

/// Shared, immutable handle to an item definition
///
/// Slots, weapons and pickups all point at the same definition; nothing
/// mutates it after it leaves the catalog.
pub type ItemRef = Arc<ItemDefinition>;

/// The blueprint for an item type
///
/// This defines the static properties of an item that are shared
/// across all instances. A slot only records which definition it holds
/// and how many units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Unique identifier (used for lookups and totals)
    pub id: String,

    /// Display name shown in UI
    pub name: String,

    /// Description shown in tooltips
    #[serde(default)]
    pub description: String,

    /// Whether units of this item can share one slot
    #[serde(default)]
    pub stackable: bool,

    /// Maximum units per slot (ignored when not stackable)
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,

    /// Item-specific properties and behaviors
    #[serde(default)]
    pub properties: ItemProperties,
}

fn default_max_stack() -> u32 {
    1
}

impl ItemDefinition {
    /// Creates a new item definition
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        stackable: bool,
        max_stack: u32,
        properties: ItemProperties,
    ) -> Self {
        ItemDefinition {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            stackable,
            max_stack,
            properties,
        }
    }

    /// Shorthand for a plain stackable item with no special properties
    pub fn stackable(id: impl Into<String>, name: impl Into<String>, max_stack: u32) -> Self {
        Self::new(id, name, "", true, max_stack, ItemProperties::Generic)
    }

    /// Shorthand for a plain item where every unit takes its own slot
    pub fn single(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, "", false, 1, ItemProperties::Generic)
    }

    /// Shorthand for a weapon definition (weapons never stack)
    pub fn weapon(
        id: impl Into<String>,
        name: impl Into<String>,
        attributes: WeaponAttributes,
    ) -> Self {
        Self::new(id, name, "", false, 1, ItemProperties::Weapon(attributes))
    }

    /// Units that fit in one slot: `max_stack` (at least 1) when stackable, else 1
    pub fn effective_max_stack(&self) -> u32 {
        if self.stackable {
            self.max_stack.max(1)
        } else {
            1
        }
    }

    /// Weapon parameters, if this item is a weapon
    pub fn weapon_attributes(&self) -> Option<&WeaponAttributes> {
        match &self.properties {
            ItemProperties::Weapon(attributes) => Some(attributes),
            ItemProperties::Generic => None,
        }
    }

    pub fn is_weapon(&self) -> bool {
        self.weapon_attributes().is_some()
    }

    /// Wraps the definition into a shareable handle
    pub fn into_ref(self) -> ItemRef {
        Arc::new(self)
    }
}
