use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, info};

use crate::config::LoadoutConfig;
use crate::dropped_item::DroppedItem;
use crate::equipment::{EquipmentManager, WeaponCycle};
use crate::inventory::Inventory;
use crate::item::{ItemRef, ItemRegistry};

/// Loadout actions the player can perform
///
/// Decouples input handling from execution: whatever reads the keyboard
/// produces these, and `Player::apply` runs them against the loadout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    // === Weapon selection ===
    NextWeapon,
    QuickSlot(usize), // 1-based weapon number
    Holster,

    // === Combat ===
    FireStart,
    FireStop,
    Reload,

    // === Ammo and items ===
    Unload,
    Drop,
}

/// Inventory, equipment and weapon switching for one player
pub struct Player {
    catalog: ItemRegistry,
    inventory: Inventory,
    equipment: EquipmentManager,
    cycle: WeaponCycle,
    cycle_stale: Rc<Cell<bool>>,
}

impl Player {
    pub fn new(config: &LoadoutConfig, catalog: ItemRegistry) -> Self {
        let mut inventory = Inventory::new(config.inventory_capacity);

        // Weapon slots move whenever the inventory does
        let cycle_stale = Rc::new(Cell::new(true));
        let flag = Rc::clone(&cycle_stale);
        inventory.subscribe(move |_| flag.set(true));

        info!(capacity = inventory.capacity(), items = catalog.len(), "player loadout ready");
        Player {
            catalog,
            inventory,
            equipment: EquipmentManager::new(),
            cycle: WeaponCycle::new(),
            cycle_stale,
        }
    }

    pub fn catalog(&self) -> &ItemRegistry {
        &self.catalog
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Direct inventory access, for listeners and debug tooling
    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub fn equipment(&self) -> &EquipmentManager {
        &self.equipment
    }

    pub fn equipment_mut(&mut self) -> &mut EquipmentManager {
        &mut self.equipment
    }

    /// Picks up as much of a dropped stack as fits
    pub fn pickup(&mut self, dropped: &mut DroppedItem) -> bool {
        dropped.try_pickup(&mut self.inventory)
    }

    /// Adds catalog items by id, returning the amount that did not fit
    pub fn give(&mut self, item_id: &str, amount: u32) -> u32 {
        match self.catalog.get(item_id) {
            Some(item) => {
                let item = ItemRef::clone(item);
                self.inventory.try_add(&item, amount)
            }
            None => {
                debug!(item = item_id, "unknown item, nothing given");
                amount
            }
        }
    }

    /// Equips a weapon item directly
    pub fn equip(&mut self, weapon: &ItemRef) -> bool {
        self.equipment.equip(weapon, &mut self.inventory)
    }

    /// Runs one action against the loadout
    ///
    /// Returns false when the action had nothing to act on.
    pub fn apply(&mut self, action: PlayerAction) -> bool {
        debug!(?action, "player action");
        match action {
            PlayerAction::NextWeapon => {
                self.refresh_cycle();
                match self.cycle.next(&self.inventory) {
                    Some(weapon) => self.equip(&weapon),
                    None => false,
                }
            }
            PlayerAction::QuickSlot(number) => {
                self.refresh_cycle();
                match self.cycle.select(number, &self.inventory) {
                    Some(weapon) => self.equip(&weapon),
                    None => false,
                }
            }
            PlayerAction::Holster => {
                let armed = self.equipment.active().is_some();
                self.equipment.holster_active(&mut self.inventory);
                armed
            }
            PlayerAction::FireStart => self
                .equipment
                .active_mut()
                .is_some_and(|weapon| weapon.start_firing()),
            PlayerAction::FireStop => match self.equipment.active_mut() {
                Some(weapon) => {
                    weapon.stop_firing();
                    true
                }
                None => false,
            },
            PlayerAction::Reload => self.equipment.reload_active(&mut self.inventory) > 0,
            PlayerAction::Unload => self.equipment.unload_active() > 0,
            PlayerAction::Drop => {
                let armed = self.equipment.active().is_some();
                self.equipment.unequip_and_drop(&mut self.inventory);
                armed
            }
        }
    }

    /// Advances automatic fire, returning rounds fired
    pub fn tick(&mut self, dt: f32) -> u32 {
        self.equipment.tick(dt)
    }

    /// Returns every buffered round to the inventory where it fits
    pub fn stow_buffer(&mut self) -> u32 {
        let mut ammo_ids: Vec<String> = self.equipment.buffer().keys().cloned().collect();
        ammo_ids.sort_unstable();

        let mut stowed = 0;
        for ammo_id in ammo_ids {
            let Some(ammo) = self.catalog.get(&ammo_id).cloned() else {
                debug!(ammo = %ammo_id, "buffered ammo missing from catalog, left buffered");
                continue;
            };
            stowed += self.equipment.flush_buffer(&ammo, &mut self.inventory);
        }
        stowed
    }

    /// Rounds of one ammo id the player owns anywhere
    pub fn total_ammo(&self, ammo_id: &str) -> u32 {
        self.equipment.total_ammo(ammo_id, &self.inventory)
    }

    fn refresh_cycle(&mut self) {
        if self.cycle_stale.replace(false) {
            self.cycle.rebuild(&self.inventory);
        }
    }
}
