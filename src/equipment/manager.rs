//! Equip / holster / reload orchestration
//!
//! The manager owns at most one active weapon, every holstered weapon
//! (keyed by item id) and a per-ammo-id buffer of rounds taken out of
//! magazines. Ammo only moves between four places: the inventory, the
//! active magazine, holstered magazines and the buffer. Outside of firing,
//! pickups and drops, the sum over those places never changes.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::events::{ListenerHandle, Listeners};
use crate::inventory::Inventory;
use crate::item::ItemRef;
use super::weapon::EquippedWeapon;

/// New buffered amount for one ammo id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferChange {
    pub ammo_id: String,
    pub amount: u32,
}

#[derive(Debug, Default)]
pub struct EquipmentManager {
    active: Option<EquippedWeapon>,
    holstered: HashMap<String, EquippedWeapon>,
    ammo_buffer: HashMap<String, u32>,
    weapon_listeners: Listeners<Option<EquippedWeapon>>,
    buffer_listeners: Listeners<BufferChange>,
}

impl EquipmentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The weapon in hand, if any
    pub fn active(&self) -> Option<&EquippedWeapon> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut EquippedWeapon> {
        self.active.as_mut()
    }

    /// A holstered weapon instance by item id
    pub fn holstered(&self, weapon_id: &str) -> Option<&EquippedWeapon> {
        self.holstered.get(weapon_id)
    }

    /// Ids of all holstered weapons, sorted
    pub fn holstered_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.holstered.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Equips a weapon item
    ///
    /// The current weapon is always holstered first, even when it is the one
    /// being requested. A holstered instance of the same item is reused with
    /// its magazine as-is; otherwise a new instance is created. Only an empty
    /// magazine is loaded, from the buffer first and then the inventory.
    ///
    /// Returns false (with nothing active) if the item is not a weapon.
    pub fn equip(&mut self, weapon: &ItemRef, inventory: &mut Inventory) -> bool {
        self.holster_active(inventory);

        let instance = self
            .holstered
            .remove(&weapon.id)
            .or_else(|| EquippedWeapon::from_item(weapon));
        let Some(mut instance) = instance else {
            debug!(item = %weapon.id, "not a weapon, nothing equipped");
            self.set_active(None);
            return false;
        };

        let loaded = if instance.magazine() == 0 {
            self.load_from_stock(instance.ammo_id(), instance.magazine_size(), inventory)
        } else {
            instance.magazine()
        };
        instance.initialize(loaded, Some(inventory));

        debug!(weapon = %weapon.id, magazine = instance.magazine(), "equipped");
        self.set_active(Some(instance));
        true
    }

    /// Moves the active weapon to the holster, magazine intact
    pub fn holster_active(&mut self, inventory: &mut Inventory) {
        let Some(mut weapon) = self.active.take() else {
            return;
        };

        weapon.holster(inventory);
        let id = weapon.id().to_string();
        if let Some(previous) = self.holstered.insert(id.clone(), weapon) {
            let lost = previous.destroy(inventory);
            warn!(weapon = %id, lost, "replaced a second holstered instance");
        }
        self.emit_weapon_changed();
    }

    /// Destroys the active weapon; its loaded rounds are lost
    ///
    /// Returns the number of rounds lost.
    pub fn unequip_and_drop(&mut self, inventory: &mut Inventory) -> u32 {
        let Some(weapon) = self.active.take() else {
            return 0;
        };

        let lost = weapon.destroy(inventory);
        self.emit_weapon_changed();
        lost
    }

    /// Tops up the active magazine from the buffer, then the inventory
    ///
    /// Returns the rounds transferred from both sources combined.
    pub fn reload_active(&mut self, inventory: &mut Inventory) -> u32 {
        let Some(active) = self.active.as_ref() else {
            return 0;
        };
        let Some(ammo_id) = active.ammo_id().map(str::to_string) else {
            return 0;
        };
        let needed = active.missing_rounds();
        if needed == 0 {
            return 0;
        }

        let from_buffer = self.take_from_buffer(&ammo_id, needed);
        if let Some(active) = self.active.as_mut() {
            active.add_ammo(from_buffer);
        }

        let from_inventory = take_from_inventory(inventory, &ammo_id, needed - from_buffer);
        if let Some(active) = self.active.as_mut() {
            active.add_ammo(from_inventory);
        }

        let transferred = from_buffer + from_inventory;
        debug!(ammo = %ammo_id, from_buffer, from_inventory, "reloaded");
        transferred
    }

    /// Fires the active weapon once
    pub fn fire_active(&mut self) -> bool {
        self.active.as_mut().is_some_and(EquippedWeapon::try_fire)
    }

    /// Advances automatic fire of the active weapon
    pub fn tick(&mut self, dt: f32) -> u32 {
        self.active.as_mut().map_or(0, |weapon| weapon.tick(dt))
    }

    /// Takes every round out of the active magazine into the buffer
    pub fn unload_active(&mut self) -> u32 {
        let Some(weapon) = self.active.as_mut() else {
            return 0;
        };
        let Some(ammo_id) = weapon.ammo_id().map(str::to_string) else {
            return 0;
        };
        let rounds = weapon.unload();
        self.deposit(&ammo_id, rounds);
        rounds
    }

    /// Takes every round out of a holstered weapon's magazine into the buffer
    pub fn unload_holstered(&mut self, weapon_id: &str) -> u32 {
        let Some(weapon) = self.holstered.get_mut(weapon_id) else {
            return 0;
        };
        let Some(ammo_id) = weapon.ammo_id().map(str::to_string) else {
            return 0;
        };
        let rounds = weapon.unload();
        self.deposit(&ammo_id, rounds);
        rounds
    }

    /// Returns buffered rounds of `ammo` to the inventory
    ///
    /// Whatever does not fit stays buffered. Returns the rounds moved.
    pub fn flush_buffer(&mut self, ammo: &ItemRef, inventory: &mut Inventory) -> u32 {
        let buffered = self.buffered_amount(&ammo.id);
        if buffered == 0 {
            return 0;
        }

        let leftover = inventory.try_add(ammo, buffered);
        let returned = buffered - leftover;
        if returned > 0 {
            self.set_buffered(&ammo.id, leftover);
        }
        debug!(ammo = %ammo.id, returned, leftover, "buffer flushed");
        returned
    }

    /// All buffered ammo by ammo id
    pub fn buffer(&self) -> &HashMap<String, u32> {
        &self.ammo_buffer
    }

    pub fn buffered_amount(&self, ammo_id: &str) -> u32 {
        self.ammo_buffer.get(ammo_id).copied().unwrap_or(0)
    }

    /// Discards buffered ammo for one ammo id, returning how much was lost
    ///
    /// Notifies with an amount of 0 even when nothing was buffered.
    pub fn clear_buffer(&mut self, ammo_id: &str) -> u32 {
        if ammo_id.is_empty() {
            return 0;
        }
        let discarded = self.ammo_buffer.remove(ammo_id).unwrap_or(0);
        self.buffer_listeners.emit(&BufferChange {
            ammo_id: ammo_id.to_string(),
            amount: 0,
        });
        discarded
    }

    /// Rounds of one ammo id across inventory, magazines and buffer
    pub fn total_ammo(&self, ammo_id: &str, inventory: &Inventory) -> u32 {
        let loaded: u32 = self
            .active
            .iter()
            .chain(self.holstered.values())
            .filter(|weapon| weapon.ammo_id() == Some(ammo_id))
            .map(EquippedWeapon::magazine)
            .sum();
        inventory.get_total(ammo_id) + loaded + self.buffered_amount(ammo_id)
    }

    /// Registers a callback for weapon changes (receives the new active weapon)
    pub fn subscribe_weapon_changed(
        &mut self,
        callback: impl FnMut(&Option<EquippedWeapon>) + 'static,
    ) -> ListenerHandle {
        self.weapon_listeners.subscribe(callback)
    }

    pub fn unsubscribe_weapon_changed(&mut self, handle: ListenerHandle) -> bool {
        self.weapon_listeners.unsubscribe(handle)
    }

    pub fn subscribe_buffer_changed(
        &mut self,
        callback: impl FnMut(&BufferChange) + 'static,
    ) -> ListenerHandle {
        self.buffer_listeners.subscribe(callback)
    }

    pub fn unsubscribe_buffer_changed(&mut self, handle: ListenerHandle) -> bool {
        self.buffer_listeners.unsubscribe(handle)
    }

    /// Pulls up to `capacity` rounds for an empty magazine
    fn load_from_stock(
        &mut self,
        ammo_id: Option<&str>,
        capacity: u32,
        inventory: &mut Inventory,
    ) -> u32 {
        let Some(ammo_id) = ammo_id else {
            return 0;
        };
        let from_buffer = self.take_from_buffer(ammo_id, capacity);
        from_buffer + take_from_inventory(inventory, ammo_id, capacity - from_buffer)
    }

    fn take_from_buffer(&mut self, ammo_id: &str, wanted: u32) -> u32 {
        let buffered = self.buffered_amount(ammo_id);
        let taken = buffered.min(wanted);
        if taken > 0 {
            self.set_buffered(ammo_id, buffered - taken);
        }
        taken
    }

    fn deposit(&mut self, ammo_id: &str, rounds: u32) {
        if rounds > 0 {
            let buffered = self.buffered_amount(ammo_id);
            self.set_buffered(ammo_id, buffered + rounds);
        }
    }

    fn set_buffered(&mut self, ammo_id: &str, amount: u32) {
        if amount == 0 {
            self.ammo_buffer.remove(ammo_id);
        } else {
            self.ammo_buffer.insert(ammo_id.to_string(), amount);
        }
        self.buffer_listeners.emit(&BufferChange {
            ammo_id: ammo_id.to_string(),
            amount,
        });
    }

    fn set_active(&mut self, weapon: Option<EquippedWeapon>) {
        self.active = weapon;
        self.emit_weapon_changed();
    }

    fn emit_weapon_changed(&mut self) {
        let mut listeners = std::mem::take(&mut self.weapon_listeners);
        listeners.emit(&self.active);
        self.weapon_listeners = listeners;
    }
}

/// Removes up to `wanted` rounds from the inventory, returning how many
fn take_from_inventory(inventory: &mut Inventory, ammo_id: &str, wanted: u32) -> u32 {
    let take = wanted.min(inventory.get_total(ammo_id));
    if take > 0 && inventory.remove(ammo_id, take) {
        take
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemDefinition, WeaponAttributes};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ammo() -> ItemRef {
        ItemDefinition::stackable("ammo", "Ammo", 100).into_ref()
    }

    fn rifle() -> ItemRef {
        ItemDefinition::weapon(
            "rifle",
            "Rifle",
            WeaponAttributes::new(0.25, 10, true, Some("ammo")),
        )
        .into_ref()
    }

    fn carbine() -> ItemRef {
        ItemDefinition::weapon(
            "carbine",
            "Carbine",
            WeaponAttributes::new(0.25, 5, false, Some("ammo")),
        )
        .into_ref()
    }

    fn knife() -> ItemRef {
        ItemDefinition::weapon("knife", "Knife", WeaponAttributes::new(0.5, 0, false, None))
            .into_ref()
    }

    fn stocked(rounds: u32) -> Inventory {
        let mut inventory = Inventory::new(8);
        inventory.try_add(&ammo(), rounds);
        inventory
    }

    #[test]
    fn test_fresh_equip_loads_from_inventory() {
        let mut inventory = stocked(25);
        let mut manager = EquipmentManager::new();

        assert!(manager.equip(&rifle(), &mut inventory));
        assert_eq!(manager.active().unwrap().magazine(), 10);
        assert_eq!(inventory.get_total("ammo"), 15);
    }

    #[test]
    fn test_equip_drains_buffer_before_inventory() {
        let mut inventory = stocked(20);
        let mut manager = EquipmentManager::new();
        manager.ammo_buffer.insert("ammo".to_string(), 4);

        manager.equip(&rifle(), &mut inventory);
        assert_eq!(manager.active().unwrap().magazine(), 10);
        assert_eq!(manager.buffered_amount("ammo"), 0);
        assert_eq!(inventory.get_total("ammo"), 14);
    }

    #[test]
    fn test_equip_with_short_stock_loads_partially() {
        let mut inventory = stocked(3);
        let mut manager = EquipmentManager::new();

        manager.equip(&rifle(), &mut inventory);
        assert_eq!(manager.active().unwrap().magazine(), 3);
        assert_eq!(inventory.get_total("ammo"), 0);
    }

    #[test]
    fn test_holster_cycle_conserves_ammo() {
        let mut inventory = stocked(10);
        let mut manager = EquipmentManager::new();
        manager.equip(&rifle(), &mut inventory);
        for _ in 0..6 {
            manager.fire_active();
        }
        inventory.try_add(&ammo(), 6);
        assert_eq!(manager.total_ammo("ammo", &inventory), 10);

        manager.equip(&knife(), &mut inventory);
        let holstered = manager.holstered("rifle").unwrap();
        assert_eq!(holstered.magazine(), 4);
        assert!(!holstered.is_active());
        assert_eq!(inventory.get_total("ammo"), 6);
        assert_eq!(manager.buffered_amount("ammo"), 0);

        manager.equip(&rifle(), &mut inventory);
        assert_eq!(manager.active().unwrap().magazine(), 4);
        assert_eq!(inventory.get_total("ammo"), 6);
        assert_eq!(manager.buffered_amount("ammo"), 0);
        assert!(manager.holstered("rifle").is_none());
        assert_eq!(manager.holstered_ids(), vec!["knife"]);
        assert_eq!(manager.total_ammo("ammo", &inventory), 10);
    }

    #[test]
    fn test_reload_drains_buffer_then_inventory() {
        let mut inventory = stocked(12);
        let mut manager = EquipmentManager::new();
        manager.equip(&rifle(), &mut inventory); // 10 loaded, 2 left
        for _ in 0..8 {
            manager.fire_active();
        }
        inventory.try_add(&ammo(), 8); // 10 in stock
        manager.ammo_buffer.insert("ammo".to_string(), 3);

        assert_eq!(manager.reload_active(&mut inventory), 8);
        assert_eq!(manager.buffered_amount("ammo"), 0);
        assert_eq!(inventory.get_total("ammo"), 5);
        assert_eq!(manager.active().unwrap().magazine(), 10);
    }

    #[test]
    fn test_reload_full_or_unarmed_is_noop() {
        let mut inventory = stocked(30);
        let mut manager = EquipmentManager::new();
        assert_eq!(manager.reload_active(&mut inventory), 0);

        manager.equip(&rifle(), &mut inventory);
        assert_eq!(manager.reload_active(&mut inventory), 0);
        assert_eq!(inventory.get_total("ammo"), 20);

        manager.equip(&knife(), &mut inventory);
        assert_eq!(manager.reload_active(&mut inventory), 0);
    }

    #[test]
    fn test_reload_partial_when_short() {
        let mut inventory = stocked(10);
        let mut manager = EquipmentManager::new();
        manager.equip(&rifle(), &mut inventory);
        for _ in 0..7 {
            manager.fire_active();
        }
        inventory.try_add(&ammo(), 2);

        assert_eq!(manager.reload_active(&mut inventory), 2);
        assert_eq!(manager.active().unwrap().magazine(), 5);
        assert_eq!(inventory.get_total("ammo"), 0);
    }

    #[test]
    fn test_self_equip_emits_holster_and_equip() {
        let mut inventory = stocked(10);
        let mut manager = EquipmentManager::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        manager.subscribe_weapon_changed(move |weapon: &Option<EquippedWeapon>| {
            sink.borrow_mut()
                .push(weapon.as_ref().map(|w| w.id().to_string()));
        });

        manager.equip(&rifle(), &mut inventory);
        manager.equip(&rifle(), &mut inventory);

        assert_eq!(
            *seen.borrow(),
            vec![Some("rifle".to_string()), None, Some("rifle".to_string())]
        );
        assert_eq!(manager.active().unwrap().magazine(), 10);
        assert!(manager.holstered_ids().is_empty());
    }

    #[test]
    fn test_equip_non_weapon_leaves_hands_empty() {
        let mut inventory = stocked(10);
        let mut manager = EquipmentManager::new();
        manager.equip(&rifle(), &mut inventory);

        assert!(!manager.equip(&ammo(), &mut inventory));
        assert!(manager.active().is_none());
        assert_eq!(manager.holstered("rifle").unwrap().magazine(), 10);
    }

    #[test]
    fn test_unequip_and_drop_loses_magazine() {
        let mut inventory = stocked(15);
        let mut manager = EquipmentManager::new();
        manager.equip(&rifle(), &mut inventory);

        assert_eq!(manager.unequip_and_drop(&mut inventory), 10);
        assert!(manager.active().is_none());
        assert!(manager.holstered("rifle").is_none());
        assert_eq!(manager.total_ammo("ammo", &inventory), 5);
        assert_eq!(manager.unequip_and_drop(&mut inventory), 0);

        // A new instance starts empty and loads again
        manager.equip(&rifle(), &mut inventory);
        assert_eq!(manager.active().unwrap().magazine(), 5);
    }

    #[test]
    fn test_unload_holstered_feeds_other_weapon() {
        let mut inventory = stocked(13);
        let mut manager = EquipmentManager::new();
        manager.equip(&rifle(), &mut inventory); // 10, stock 3
        manager.equip(&carbine(), &mut inventory); // 3, stock 0
        manager.equip(&rifle(), &mut inventory);

        assert_eq!(manager.unload_holstered("carbine"), 3);
        assert_eq!(manager.buffered_amount("ammo"), 3);
        assert_eq!(manager.holstered("carbine").unwrap().magazine(), 0);
        assert_eq!(manager.unload_holstered("missing"), 0);

        // Re-equipping the emptied carbine refills it from the buffer
        manager.equip(&carbine(), &mut inventory);
        assert_eq!(manager.active().unwrap().magazine(), 3);
        assert_eq!(manager.buffered_amount("ammo"), 0);
        assert_eq!(manager.total_ammo("ammo", &inventory), 13);
    }

    #[test]
    fn test_unload_active_and_flush() {
        let mut inventory = stocked(10);
        let mut manager = EquipmentManager::new();
        manager.equip(&rifle(), &mut inventory);

        assert_eq!(manager.unload_active(), 10);
        assert_eq!(manager.active().unwrap().magazine(), 0);
        assert_eq!(manager.flush_buffer(&ammo(), &mut inventory), 10);
        assert_eq!(inventory.get_total("ammo"), 10);
        assert!(manager.buffer().is_empty());
        assert_eq!(manager.flush_buffer(&ammo(), &mut inventory), 0);
    }

    #[test]
    fn test_flush_keeps_leftover_buffered() {
        let ammo = ItemDefinition::stackable("ammo", "Ammo", 4).into_ref();
        let mut inventory = Inventory::new(1);
        let mut manager = EquipmentManager::new();
        manager.ammo_buffer.insert("ammo".to_string(), 6);

        assert_eq!(manager.flush_buffer(&ammo, &mut inventory), 4);
        assert_eq!(manager.buffered_amount("ammo"), 2);
    }

    #[test]
    fn test_clear_buffer_notifies_zero() {
        let mut manager = EquipmentManager::new();
        manager.ammo_buffer.insert("ammo".to_string(), 5);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        manager.subscribe_buffer_changed(move |change: &BufferChange| {
            sink.borrow_mut().push((change.ammo_id.clone(), change.amount))
        });

        assert_eq!(manager.clear_buffer("ammo"), 5);
        assert_eq!(manager.buffered_amount("ammo"), 0);
        assert_eq!(manager.clear_buffer(""), 0);
        assert_eq!(*seen.borrow(), vec![("ammo".to_string(), 0)]);
    }

    #[test]
    fn test_holstered_weapon_ignores_inventory_changes() {
        let mut inventory = stocked(10);
        let mut manager = EquipmentManager::new();
        manager.equip(&rifle(), &mut inventory);
        manager.equip(&knife(), &mut inventory);

        assert!(!manager.holstered("rifle").unwrap().is_bound());
        assert!(manager.active().unwrap().is_bound());
    }
}
