use tracing::debug;
use crate::inventory::Inventory;
use crate::item::ItemRef;

/// A stack of items lying in the world, waiting to be picked up
///
/// Detection (triggers, look raycasts) is up to the caller; this only does
/// the accounting of moving the stack into an inventory.
#[derive(Debug, Clone)]
pub struct DroppedItem {
    pub item: ItemRef,
    pub quantity: u32,
}

impl DroppedItem {
    /// Creates a dropped stack (at least one unit)
    pub fn new(item: ItemRef, quantity: u32) -> Self {
        DroppedItem {
            item,
            quantity: quantity.max(1),
        }
    }

    /// Moves as much of the stack as fits into `inventory`
    ///
    /// Returns true when the whole stack was absorbed and the dropped item
    /// should be removed from the world. Otherwise `quantity` keeps what is
    /// left on the ground.
    pub fn try_pickup(&mut self, inventory: &mut Inventory) -> bool {
        if self.quantity == 0 {
            return false;
        }

        let leftover = inventory.try_add(&self.item, self.quantity);
        debug!(
            id = %self.item.id,
            picked = self.quantity - leftover,
            leftover,
            "pickup"
        );
        self.quantity = leftover;
        leftover == 0
    }

    /// True once nothing is left to pick up
    pub fn is_consumed(&self) -> bool {
        self.quantity == 0
    }
}
