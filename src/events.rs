//! Listener lists for change notifications
//!
//! Every entity that raises notifications (slots, inventories, weapons, the
//! equipment manager) owns one `Listeners<T>` per notification kind.
//! Callbacks run synchronously, in registration order, before the mutating
//! call returns.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque token returned by `subscribe`, used to unsubscribe later
///
/// Handles are unique across the whole process, so passing a handle to the
/// wrong list can never remove somebody else's listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    fn next() -> Self {
        ListenerHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Ordered list of callbacks for one notification kind
pub struct Listeners<T: ?Sized> {
    entries: Vec<(ListenerHandle, Box<dyn FnMut(&T)>)>,
}

impl<T: ?Sized> Listeners<T> {
    pub fn new() -> Self {
        Listeners {
            entries: Vec::new(),
        }
    }

    /// Registers a callback and returns its handle
    pub fn subscribe(&mut self, callback: impl FnMut(&T) + 'static) -> ListenerHandle {
        let handle = ListenerHandle::next();
        self.entries.push((handle, Box::new(callback)));
        handle
    }

    /// Removes the callback registered under `handle`
    ///
    /// Returns false if no such callback exists (already removed, or it
    /// belongs to another list).
    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(h, _)| *h != handle);
        self.entries.len() != before
    }

    /// Calls every listener with `value`, in registration order
    pub fn emit(&mut self, value: &T) {
        for (_, callback) in self.entries.iter_mut() {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners: Listeners<u32> = Listeners::new();

        let first = log.clone();
        listeners.subscribe(move |v| first.borrow_mut().push(("first", *v)));
        let second = log.clone();
        listeners.subscribe(move |v| second.borrow_mut().push(("second", *v)));

        listeners.emit(&7);
        assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_unsubscribe_by_handle() {
        let hits = Rc::new(RefCell::new(0));
        let mut listeners: Listeners<()> = Listeners::new();

        let counter = hits.clone();
        let handle = listeners.subscribe(move |_| *counter.borrow_mut() += 1);
        listeners.emit(&());
        assert!(listeners.unsubscribe(handle));
        listeners.emit(&());

        assert_eq!(*hits.borrow(), 1);
        assert!(listeners.is_empty());
        // Second removal is a no-op
        assert!(!listeners.unsubscribe(handle));
    }

    #[test]
    fn test_foreign_handle_is_ignored() {
        let mut a: Listeners<u32> = Listeners::new();
        let mut b: Listeners<u32> = Listeners::new();
        let handle_a = a.subscribe(|_| {});
        b.subscribe(|_| {});

        assert!(!b.unsubscribe(handle_a));
        assert_eq!(b.len(), 1);
        assert_eq!(a.len(), 1);
    }
}
