use std::collections::HashMap;
use std::fs;
use std::path::Path;
use serde::Deserialize;
use tracing::{debug, warn};
use super::definition::{ItemDefinition, ItemRef};
use super::error::CatalogError;
use super::properties::*;

/// On-disk layout of a JSON catalog
#[derive(Debug, Deserialize)]
struct CatalogFile {
    items: Vec<ItemDefinition>,
}

/// Central registry of all item definitions
///
/// This is the single source of truth for what items exist.
/// Pickups, inventories and weapons hold `ItemRef`s handed out here.
#[derive(Debug, Default)]
pub struct ItemRegistry {
    items: HashMap<String, ItemRef>,
}

impl ItemRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        ItemRegistry {
            items: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in items pre-registered
    pub fn create_default() -> Self {
        let mut registry = Self::new();
        registry.register_base_items();
        registry
    }

    /// Parses a JSON catalog (`{ "items": [...] }`) and validates it
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for item in file.items {
            registry.register(item)?;
        }
        registry.validate()?;
        debug!(items = registry.len(), "catalog parsed");
        Ok(registry)
    }

    /// Reads and parses a JSON catalog from disk
    pub fn load_from_path(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Registers a new item definition
    ///
    /// Out-of-range numbers are normalized instead of rejected: `max_stack`
    /// is raised to 1 and a negative `fire_rate` becomes 0.
    pub fn register(&mut self, mut item: ItemDefinition) -> Result<ItemRef, CatalogError> {
        if item.id.trim().is_empty() {
            return Err(CatalogError::EmptyId(item.name));
        }
        if self.items.contains_key(&item.id) {
            return Err(CatalogError::DuplicateItem(item.id));
        }

        if item.max_stack < 1 {
            warn!(id = %item.id, "max_stack below 1, clamping");
            item.max_stack = 1;
        }
        if let ItemProperties::Weapon(weapon) = &mut item.properties {
            if weapon.fire_rate.is_nan() || weapon.fire_rate < 0.0 {
                warn!(id = %item.id, fire_rate = weapon.fire_rate, "invalid fire_rate, using 0");
                weapon.fire_rate = 0.0;
            }
        }

        let item = item.into_ref();
        self.items.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    /// Checks cross-references between definitions
    pub fn validate(&self) -> Result<(), CatalogError> {
        for item in self.weapons() {
            let Some(ammo) = item.weapon_attributes().and_then(|w| w.ammo_item_id.as_ref()) else {
                continue;
            };
            if !self.exists(ammo) {
                return Err(CatalogError::UnknownAmmo {
                    weapon: item.id.clone(),
                    ammo: ammo.clone(),
                });
            }
        }
        Ok(())
    }

    /// Gets an item definition by ID
    pub fn get(&self, id: &str) -> Option<&ItemRef> {
        self.items.get(id)
    }

    /// Returns true if an item with this ID exists
    pub fn exists(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns all item definitions, sorted by id
    pub fn all_items(&self) -> Vec<&ItemRef> {
        let mut items: Vec<&ItemRef> = self.items.values().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    /// Returns every weapon definition, sorted by id
    pub fn weapons(&self) -> Vec<&ItemRef> {
        self.all_items()
            .into_iter()
            .filter(|item| item.is_weapon())
            .collect()
    }

    // ======================================================================
    // Item Registration - Base Items
    // ======================================================================

    fn register_base_items(&mut self) {
        let base = [
            ItemDefinition::new(
                "pistol_ammo",
                "9mm Rounds",
                "Ammunition for the pistol.",
                true,
                60,
                ItemProperties::Generic,
            ),
            ItemDefinition::new(
                "rifle_ammo",
                "5.56 Rounds",
                "Ammunition for the rifle.",
                true,
                90,
                ItemProperties::Generic,
            ),
            ItemDefinition::new(
                "pistol",
                "Pistol",
                "Semi-automatic sidearm.",
                false,
                1,
                ItemProperties::Weapon(WeaponAttributes::new(0.25, 7, false, Some("pistol_ammo"))),
            ),
            ItemDefinition::new(
                "rifle",
                "Rifle",
                "Automatic rifle.",
                false,
                1,
                ItemProperties::Weapon(WeaponAttributes::new(0.1, 30, true, Some("rifle_ammo"))),
            ),
            ItemDefinition::new(
                "knife",
                "Knife",
                "Needs no ammunition.",
                false,
                1,
                ItemProperties::Weapon(WeaponAttributes::new(0.5, 0, false, None)),
            ),
            ItemDefinition::new(
                "medkit",
                "Medkit",
                "Restores health.",
                false,
                1,
                ItemProperties::Generic,
            ),
        ];

        for item in base {
            let id = item.id.clone();
            if let Err(err) = self.register(item) {
                warn!(%id, %err, "failed to register base item");
            }
        }
    }
}
