//! Runtime state of one physical weapon
//!
//! An `EquippedWeapon` is created the first time a weapon item is equipped
//! and lives until it is explicitly destroyed. Holstering keeps the instance
//! (and its magazine) around; destroying consumes it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

use crate::events::{ListenerHandle, Listeners};
use crate::inventory::Inventory;
use crate::item::{ItemRef, WeaponAttributes};

/// Ammo counts shown next to the weapon: loaded rounds and inventory stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AmmoStatus {
    pub magazine: u32,
    pub reserve: u32,
}

impl fmt::Display for AmmoStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} / {}", self.magazine, self.reserve)
    }
}

/// Outcome of a trigger pull, for effect and hit-routing collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireEvent {
    /// A round was fired; `remaining` rounds are left in the magazine
    Shot { remaining: u32 },
    /// The magazine was empty
    DryFire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponState {
    /// In hand: can fire, tracks the inventory's ammo stock
    Active,
    /// Put away: cannot fire, magazine frozen
    Holstered,
}

/// Ammo counters shared with the inventory subscription
///
/// The inventory only holds a weak pointer to this, so a destroyed weapon's
/// leftover subscription (if any) does nothing.
#[derive(Debug, Default)]
struct AmmoFeed {
    magazine: Cell<u32>,
    reserve: Cell<u32>,
    listeners: RefCell<Listeners<AmmoStatus>>,
}

impl AmmoFeed {
    fn status(&self) -> AmmoStatus {
        AmmoStatus {
            magazine: self.magazine.get(),
            reserve: self.reserve.get(),
        }
    }

    fn publish(&self) {
        let status = self.status();
        self.listeners.borrow_mut().emit(&status);
    }
}

#[derive(Debug)]
pub struct EquippedWeapon {
    item: ItemRef,
    attributes: WeaponAttributes,
    state: WeaponState,
    feed: Rc<AmmoFeed>,
    /// Inventory-changed subscription while bound
    binding: Option<ListenerHandle>,
    fire_listeners: Listeners<FireEvent>,
    trigger_held: bool,
    /// Seconds until the next automatic shot
    cooldown: f32,
}

impl EquippedWeapon {
    /// Creates a holstered, empty instance of a weapon item
    ///
    /// Returns None if the item is not a weapon.
    pub fn from_item(item: &ItemRef) -> Option<Self> {
        let attributes = item.weapon_attributes()?.clone();
        Some(EquippedWeapon {
            item: item.clone(),
            attributes,
            state: WeaponState::Holstered,
            feed: Rc::new(AmmoFeed::default()),
            binding: None,
            fire_listeners: Listeners::new(),
            trigger_held: false,
            cooldown: 0.0,
        })
    }

    pub fn item(&self) -> &ItemRef {
        &self.item
    }

    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn attributes(&self) -> &WeaponAttributes {
        &self.attributes
    }

    pub fn ammo_id(&self) -> Option<&str> {
        self.attributes.ammo_item_id.as_deref()
    }

    pub fn magazine(&self) -> u32 {
        self.feed.magazine.get()
    }

    pub fn magazine_size(&self) -> u32 {
        self.attributes.magazine_size
    }

    /// Rounds missing from a full magazine
    pub fn missing_rounds(&self) -> u32 {
        self.magazine_size().saturating_sub(self.magazine())
    }

    pub fn state(&self) -> WeaponState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == WeaponState::Active
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn is_firing(&self) -> bool {
        self.trigger_held
    }

    /// Current magazine and last known inventory stock of this weapon's ammo
    pub fn ammo_status(&self) -> AmmoStatus {
        self.feed.status()
    }

    /// Activates the weapon with `loaded` rounds (clamped to the magazine size)
    ///
    /// With an inventory, the weapon subscribes to it so the reserve count
    /// follows the ammo stock.
    pub fn initialize(&mut self, loaded: u32, inventory: Option<&mut Inventory>) {
        self.feed.magazine.set(loaded.min(self.magazine_size()));
        if let Some(inventory) = inventory {
            self.bind(inventory);
        }
        self.state = WeaponState::Active;
        debug!(weapon = %self.id(), magazine = self.magazine(), "weapon active");
        self.feed.publish();
    }

    /// Puts the weapon away: trigger released, subscription dropped
    pub fn holster(&mut self, inventory: &mut Inventory) {
        self.stop_firing();
        self.unbind(inventory);
        self.state = WeaponState::Holstered;
        debug!(weapon = %self.id(), magazine = self.magazine(), "weapon holstered");
    }

    /// Destroys the instance, returning how many loaded rounds were lost
    pub fn destroy(mut self, inventory: &mut Inventory) -> u32 {
        self.stop_firing();
        self.unbind(inventory);
        let lost = self.magazine();
        debug!(weapon = %self.id(), lost, "weapon destroyed");
        lost
    }

    /// Fires one round if the magazine has any
    ///
    /// Returns false on a dry fire or when the weapon is holstered.
    pub fn try_fire(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }

        let magazine = self.magazine();
        let (fired, event) = if magazine > 0 {
            self.feed.magazine.set(magazine - 1);
            (true, FireEvent::Shot { remaining: magazine - 1 })
        } else {
            (false, FireEvent::DryFire)
        };

        trace!(weapon = %self.id(), ?event, "trigger");
        self.fire_listeners.emit(&event);
        self.feed.publish();
        fired
    }

    /// Pulls the trigger
    ///
    /// Fires immediately. Automatic weapons keep the trigger held and fire
    /// again from `tick` every `fire_rate` seconds until `stop_firing`.
    pub fn start_firing(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        if self.attributes.automatic {
            if self.trigger_held {
                return false;
            }
            self.trigger_held = true;
            self.cooldown = self.attributes.fire_rate;
        }
        self.try_fire()
    }

    /// Releases the trigger
    pub fn stop_firing(&mut self) {
        self.trigger_held = false;
        self.cooldown = 0.0;
    }

    /// Advances automatic fire by `dt` seconds, returning rounds fired
    ///
    /// A weapon with a zero fire rate fires at most once per tick.
    pub fn tick(&mut self, dt: f32) -> u32 {
        if !self.trigger_held || !self.is_active() {
            return 0;
        }

        let rate = self.attributes.fire_rate;
        if rate <= 0.0 {
            return u32::from(self.try_fire());
        }

        let mut fired = 0;
        self.cooldown -= dt.max(0.0);
        while self.cooldown <= 0.0 {
            if self.try_fire() {
                fired += 1;
            }
            self.cooldown += rate;
        }
        fired
    }

    /// Loads rounds, dropping anything beyond the magazine size
    pub fn add_ammo(&mut self, amount: u32) {
        if amount == 0 {
            return;
        }
        let loaded = self.magazine().saturating_add(amount).min(self.magazine_size());
        self.feed.magazine.set(loaded);
        self.feed.publish();
    }

    /// Empties the magazine, returning the rounds taken out
    pub fn unload(&mut self) -> u32 {
        let rounds = self.feed.magazine.replace(0);
        if rounds > 0 {
            self.feed.publish();
        }
        rounds
    }

    pub fn subscribe_ammo(&mut self, callback: impl FnMut(&AmmoStatus) + 'static) -> ListenerHandle {
        self.feed.listeners.borrow_mut().subscribe(callback)
    }

    pub fn unsubscribe_ammo(&mut self, handle: ListenerHandle) -> bool {
        self.feed.listeners.borrow_mut().unsubscribe(handle)
    }

    pub fn subscribe_fire(&mut self, callback: impl FnMut(&FireEvent) + 'static) -> ListenerHandle {
        self.fire_listeners.subscribe(callback)
    }

    pub fn unsubscribe_fire(&mut self, handle: ListenerHandle) -> bool {
        self.fire_listeners.unsubscribe(handle)
    }

    fn bind(&mut self, inventory: &mut Inventory) {
        let ammo_id = self.attributes.ammo_item_id.clone();
        self.feed
            .reserve
            .set(ammo_id.as_deref().map_or(0, |id| inventory.get_total(id)));

        if self.binding.is_some() {
            return;
        }
        let feed = Rc::downgrade(&self.feed);
        self.binding = Some(inventory.subscribe(move |inventory: &Inventory| {
            let Some(feed) = feed.upgrade() else {
                return;
            };
            feed.reserve
                .set(ammo_id.as_deref().map_or(0, |id| inventory.get_total(id)));
            feed.publish();
        }));
    }

    fn unbind(&mut self, inventory: &mut Inventory) {
        if let Some(handle) = self.binding.take() {
            inventory.unsubscribe(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemDefinition;

    fn pistol() -> ItemRef {
        ItemDefinition::weapon(
            "pistol",
            "Pistol",
            WeaponAttributes::new(0.25, 7, false, Some("ammo")),
        )
        .into_ref()
    }

    fn smg() -> ItemRef {
        ItemDefinition::weapon(
            "smg",
            "SMG",
            WeaponAttributes::new(0.25, 20, true, Some("ammo")),
        )
        .into_ref()
    }

    fn ammo() -> ItemRef {
        ItemDefinition::stackable("ammo", "Ammo", 50).into_ref()
    }

    #[test]
    fn test_from_item_requires_weapon() {
        assert!(EquippedWeapon::from_item(&ammo()).is_none());
        let weapon = EquippedWeapon::from_item(&pistol()).unwrap();
        assert_eq!(weapon.state(), WeaponState::Holstered);
        assert_eq!(weapon.magazine(), 0);
    }

    #[test]
    fn test_initialize_clamps_magazine() {
        let mut weapon = EquippedWeapon::from_item(&pistol()).unwrap();
        weapon.initialize(50, None);
        assert_eq!(weapon.magazine(), 7);
        assert!(weapon.is_active());
        assert!(!weapon.is_bound());
    }

    #[test]
    fn test_try_fire_until_dry() {
        let mut weapon = EquippedWeapon::from_item(&pistol()).unwrap();
        weapon.initialize(2, None);

        assert!(weapon.try_fire());
        assert!(weapon.try_fire());
        assert!(!weapon.try_fire());
        assert_eq!(weapon.magazine(), 0);
    }

    #[test]
    fn test_fire_events() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut weapon = EquippedWeapon::from_item(&pistol()).unwrap();
        let sink = events.clone();
        weapon.subscribe_fire(move |event: &FireEvent| sink.borrow_mut().push(*event));
        weapon.initialize(1, None);

        weapon.try_fire();
        weapon.try_fire();
        assert_eq!(
            *events.borrow(),
            vec![FireEvent::Shot { remaining: 0 }, FireEvent::DryFire]
        );
    }

    #[test]
    fn test_add_ammo_drops_overflow() {
        let mut weapon = EquippedWeapon::from_item(&pistol()).unwrap();
        weapon.initialize(5, None);
        weapon.add_ammo(10);
        assert_eq!(weapon.magazine(), 7);
        assert_eq!(weapon.missing_rounds(), 0);
    }

    #[test]
    fn test_holstered_weapon_cannot_fire() {
        let mut inventory = Inventory::new(2);
        let mut weapon = EquippedWeapon::from_item(&pistol()).unwrap();
        weapon.initialize(3, Some(&mut inventory));
        weapon.holster(&mut inventory);

        assert!(!weapon.try_fire());
        assert!(!weapon.start_firing());
        assert_eq!(weapon.magazine(), 3);
    }

    #[test]
    fn test_reserve_follows_inventory_while_bound() {
        let ammo = ammo();
        let mut inventory = Inventory::new(2);
        inventory.try_add(&ammo, 10);

        let statuses = Rc::new(RefCell::new(Vec::new()));
        let mut weapon = EquippedWeapon::from_item(&pistol()).unwrap();
        let sink = statuses.clone();
        weapon.subscribe_ammo(move |status: &AmmoStatus| sink.borrow_mut().push(status.to_string()));

        weapon.initialize(4, Some(&mut inventory));
        inventory.try_add(&ammo, 5);
        weapon.holster(&mut inventory);
        inventory.try_add(&ammo, 5);

        assert_eq!(*statuses.borrow(), vec!["4 / 10", "4 / 15"]);
        // Holstered weapons stop tracking the stock
        assert_eq!(weapon.ammo_status().reserve, 15);
    }

    #[test]
    fn test_rebinding_does_not_duplicate_subscription() {
        let mut inventory = Inventory::new(2);
        let mut weapon = EquippedWeapon::from_item(&pistol()).unwrap();
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        weapon.subscribe_ammo(move |_| *counter.borrow_mut() += 1);

        weapon.initialize(1, Some(&mut inventory));
        weapon.initialize(1, Some(&mut inventory));
        *hits.borrow_mut() = 0;
        inventory.try_add(&ammo(), 1);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_destroy_unsubscribes_and_reports_loss() {
        let mut inventory = Inventory::new(2);
        let mut weapon = EquippedWeapon::from_item(&pistol()).unwrap();
        weapon.initialize(6, Some(&mut inventory));

        assert_eq!(weapon.destroy(&mut inventory), 6);
        // Inventory changes after destruction reach nobody
        assert!(inventory.add(&ammo(), 1));
    }

    #[test]
    fn test_semi_automatic_fires_once_per_pull() {
        let mut weapon = EquippedWeapon::from_item(&pistol()).unwrap();
        weapon.initialize(7, None);

        assert!(weapon.start_firing());
        assert_eq!(weapon.tick(1.0), 0);
        assert_eq!(weapon.magazine(), 6);
    }

    #[test]
    fn test_automatic_fire_rate() {
        let mut weapon = EquippedWeapon::from_item(&smg()).unwrap();
        weapon.initialize(20, None);

        assert!(weapon.start_firing()); // immediate shot
        assert_eq!(weapon.tick(0.125), 0);
        assert_eq!(weapon.tick(0.125), 1);
        assert_eq!(weapon.tick(0.5), 2);
        assert_eq!(weapon.magazine(), 16);

        weapon.stop_firing();
        assert_eq!(weapon.tick(1.0), 0);
        assert_eq!(weapon.magazine(), 16);
    }

    #[test]
    fn test_automatic_fire_runs_dry() {
        let mut weapon = EquippedWeapon::from_item(&smg()).unwrap();
        weapon.initialize(2, None);

        weapon.start_firing();
        assert_eq!(weapon.tick(1.0), 1);
        assert_eq!(weapon.magazine(), 0);
        assert!(weapon.is_firing());
    }

    #[test]
    fn test_unload_empties_magazine() {
        let mut weapon = EquippedWeapon::from_item(&pistol()).unwrap();
        weapon.initialize(5, None);
        assert_eq!(weapon.unload(), 5);
        assert_eq!(weapon.unload(), 0);
    }
}
