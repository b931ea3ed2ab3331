use crate::inventory::Inventory;
use crate::item::ItemRef;

/// Cached list of inventory slots holding weapons, for weapon switching
///
/// `next` walks the list round-robin; `select` jumps to the n-th weapon
/// (quick slots, 1-based). The cache must be rebuilt after the inventory
/// changes.
#[derive(Debug, Clone, Default)]
pub struct WeaponCycle {
    slots: Vec<usize>,
    position: Option<usize>,
}

impl WeaponCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rescans the inventory for weapon slots
    pub fn rebuild(&mut self, inventory: &Inventory) {
        self.slots = inventory.weapon_slots();
        if self.slots.is_empty() {
            self.position = None;
        } else if self.position.is_some_and(|p| p >= self.slots.len()) {
            self.position = Some(0);
        }
    }

    /// Slot indices holding weapons, in index order
    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    /// Position in `slots` of the last selected weapon
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Advances to the next weapon slot and returns its item
    pub fn next(&mut self, inventory: &Inventory) -> Option<ItemRef> {
        if self.slots.is_empty() {
            return None;
        }
        let next = self.position.map_or(0, |p| (p + 1) % self.slots.len());
        self.position = Some(next);
        weapon_at(inventory, self.slots[next])
    }

    /// Selects the `number`-th weapon slot (1-based, clamped to the list)
    pub fn select(&mut self, number: usize, inventory: &Inventory) -> Option<ItemRef> {
        if self.slots.is_empty() {
            return None;
        }
        let pick = number.saturating_sub(1).min(self.slots.len() - 1);
        self.position = Some(pick);
        weapon_at(inventory, self.slots[pick])
    }
}

fn weapon_at(inventory: &Inventory, index: usize) -> Option<ItemRef> {
    inventory
        .slot(index)?
        .item()
        .filter(|item| item.is_weapon())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemDefinition, WeaponAttributes};

    fn weapon(id: &str) -> ItemRef {
        ItemDefinition::weapon(id, id, WeaponAttributes::new(0.25, 5, false, None)).into_ref()
    }

    fn armory() -> Inventory {
        let mut inventory = Inventory::new(5);
        inventory.try_add(&weapon("pistol"), 1);
        inventory.try_add(&ItemDefinition::stackable("ammo", "Ammo", 50).into_ref(), 20);
        inventory.try_add(&weapon("rifle"), 1);
        inventory
    }

    #[test]
    fn test_next_wraps_around() {
        let inventory = armory();
        let mut cycle = WeaponCycle::new();
        cycle.rebuild(&inventory);
        assert_eq!(cycle.slots(), &[0, 2]);

        let ids: Vec<String> = (0..3)
            .filter_map(|_| cycle.next(&inventory))
            .map(|item| item.id.clone())
            .collect();
        assert_eq!(ids, vec!["pistol", "rifle", "pistol"]);
    }

    #[test]
    fn test_select_clamps() {
        let inventory = armory();
        let mut cycle = WeaponCycle::new();
        cycle.rebuild(&inventory);

        assert_eq!(cycle.select(2, &inventory).unwrap().id, "rifle");
        assert_eq!(cycle.select(9, &inventory).unwrap().id, "rifle");
        assert_eq!(cycle.select(0, &inventory).unwrap().id, "pistol");
        assert_eq!(cycle.position(), Some(0));
    }

    #[test]
    fn test_rebuild_resets_position() {
        let mut inventory = armory();
        let mut cycle = WeaponCycle::new();
        cycle.rebuild(&inventory);
        cycle.select(2, &inventory);

        inventory.clear_slot(2);
        cycle.rebuild(&inventory);
        assert_eq!(cycle.position(), Some(0));

        inventory.clear_slot(0);
        cycle.rebuild(&inventory);
        assert_eq!(cycle.position(), None);
        assert!(cycle.next(&inventory).is_none());
    }
}
