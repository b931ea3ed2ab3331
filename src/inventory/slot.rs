use crate::events::{ListenerHandle, Listeners};
use crate::item::ItemRef;

/// New contents of a slot, delivered to slot listeners after a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct SlotChange {
    pub item: Option<ItemRef>,
    pub quantity: u32,
}

/// One fixed position in an inventory
///
/// Holds at most one item kind and a quantity. Invariant: `quantity == 0`
/// exactly when `item` is `None`.
#[derive(Debug, Default)]
pub struct Slot {
    item: Option<ItemRef>,
    quantity: u32,
    listeners: Listeners<SlotChange>,
}

impl Slot {
    /// Creates an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Item held in this slot (None if empty)
    pub fn item(&self) -> Option<&ItemRef> {
        self.item.as_ref()
    }

    /// Id of the held item (None if empty)
    pub fn item_id(&self) -> Option<&str> {
        self.item.as_ref().map(|item| item.id.as_str())
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns true if the slot holds nothing
    pub fn is_empty(&self) -> bool {
        self.item.is_none() || self.quantity == 0
    }

    /// Returns true if the slot holds the item with this id
    pub fn holds(&self, item_id: &str) -> bool {
        !self.is_empty() && self.item_id() == Some(item_id)
    }

    /// Replaces the contents
    ///
    /// A quantity of 0 clears the slot. No ceiling is enforced here; callers
    /// clamp to the item's stack size first. Always notifies.
    pub fn set(&mut self, item: ItemRef, quantity: u32) {
        if quantity == 0 {
            self.item = None;
            self.quantity = 0;
        } else {
            self.item = Some(item);
            self.quantity = quantity;
        }
        self.notify();
    }

    /// Adds units to an existing stack
    ///
    /// Returns how many units were actually added. Empty slots and
    /// non-stackable items accept nothing; the slot never exceeds `max_stack`.
    pub fn add(&mut self, amount: u32, max_stack: u32) -> u32 {
        let stackable = self.item.as_ref().is_some_and(|item| item.stackable);
        if amount == 0 || self.is_empty() || !stackable {
            return 0;
        }

        let added = amount.min(max_stack.saturating_sub(self.quantity));
        if added > 0 {
            self.quantity += added;
            self.notify();
        }
        added
    }

    /// Removes up to `amount` units
    ///
    /// Returns how many units were actually removed. The slot becomes empty
    /// when its quantity drops to 0.
    pub fn remove(&mut self, amount: u32) -> u32 {
        if amount == 0 || self.is_empty() {
            return 0;
        }

        let removed = amount.min(self.quantity);
        self.quantity -= removed;
        if self.quantity == 0 {
            self.item = None;
        }
        self.notify();
        removed
    }

    /// Empties the slot, returning the quantity it held
    pub fn clear(&mut self) -> u32 {
        let removed = self.quantity;
        let was_empty = self.is_empty();
        self.item = None;
        self.quantity = 0;
        if !was_empty {
            self.notify();
        }
        removed
    }

    /// Registers a callback for changes to this slot
    pub fn subscribe(&mut self, callback: impl FnMut(&SlotChange) + 'static) -> ListenerHandle {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        self.listeners.unsubscribe(handle)
    }

    /// Takes the contents out without notifying (used when slots are evicted)
    pub(crate) fn take_contents(&mut self) -> Option<(ItemRef, u32)> {
        let quantity = std::mem::take(&mut self.quantity);
        self.item.take().filter(|_| quantity > 0).map(|item| (item, quantity))
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let change = SlotChange {
            item: self.item.clone(),
            quantity: self.quantity,
        };
        self.listeners.emit(&change);
    }
}
