//! Cross-target bound compatability traits and state cells
//!
//! On `wasm32-unknown-unknown` the debugger client lives on the browser main
//! thread: every DOM callback, mutation batch and channel message is
//! serialized by the event loop, so the bounds here collapse to nothing and
//! state cells are plain `RefCell`s. Natively (tests, tooling) the same types
//! carry `Send`/`Sync` bounds and are backed by a read-write lock.

#[allow(missing_docs)]
#[cfg(not(target_arch = "wasm32"))]
pub trait ConditionalSend: Send {}

#[cfg(not(target_arch = "wasm32"))]
impl<S> ConditionalSend for S where S: Send {}

#[allow(missing_docs)]
#[cfg(not(target_arch = "wasm32"))]
pub trait ConditionalSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<S> ConditionalSync for S where S: Send + Sync {}

#[allow(missing_docs)]
#[cfg(target_arch = "wasm32")]
pub trait ConditionalSend {}

#[cfg(target_arch = "wasm32")]
impl<S> ConditionalSend for S {}

#[allow(missing_docs)]
#[cfg(target_arch = "wasm32")]
pub trait ConditionalSync {}

#[cfg(target_arch = "wasm32")]
impl<S> ConditionalSync for S {}

/// Platform-appropriate shared interior mutability cell.
///
/// - Native: `parking_lot::RwLock`
/// - WASM: `std::cell::RefCell`
///
/// Guards must never be held across an `.await`; read what you need, drop
/// the guard, then suspend.
///
/// # Example
/// ```
/// use live_debugger_common::SharedCell;
///
/// let fingerprint = SharedCell::new(String::new());
///
/// fingerprint.replace("phx-a;phx-b".to_string());
///
/// assert_eq!(fingerprint.get(), "phx-a;phx-b");
/// ```
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct SharedCell<T>(parking_lot::RwLock<T>);

#[cfg(not(target_arch = "wasm32"))]
impl<T> SharedCell<T> {
    /// Creates a new SharedCell with the given value
    pub fn new(value: T) -> Self {
        Self(parking_lot::RwLock::new(value))
    }

    /// Acquires a read lock, blocking until it can be acquired
    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, T> {
        self.0.read()
    }

    /// Acquires a write lock, blocking until it can be acquired
    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, T> {
        self.0.write()
    }
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct SharedCell<T>(std::cell::RefCell<T>);

#[cfg(target_arch = "wasm32")]
impl<T> SharedCell<T> {
    /// Creates a new SharedCell with the given value
    pub fn new(value: T) -> Self {
        Self(std::cell::RefCell::new(value))
    }

    /// Borrows the value immutably
    ///
    /// # Panics
    /// Panics if the value is currently mutably borrowed
    pub fn read(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    /// Borrows the value mutably
    ///
    /// # Panics
    /// Panics if the value is currently borrowed
    pub fn write(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

impl<T> SharedCell<T> {
    /// Stores `value` and returns whatever was there before.
    pub fn replace(&self, value: T) -> T {
        std::mem::replace(&mut *self.write(), value)
    }

    /// Takes the value out, leaving `T::default()` behind.
    pub fn take(&self) -> T
    where
        T: Default,
    {
        std::mem::take(&mut *self.write())
    }

    /// Clones the current value out of the cell.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::SharedCell;

    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::wasm_bindgen_test;

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), test)]
    fn it_replaces_and_returns_the_previous_value() {
        let cell = SharedCell::new(Some("phx-1".to_string()));

        let previous = cell.replace(None);

        assert_eq!(previous.as_deref(), Some("phx-1"));
        assert_eq!(cell.get(), None);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), test)]
    fn it_takes_leaving_default_behind() {
        let cell = SharedCell::new(vec![1, 2, 3]);

        assert_eq!(cell.take(), vec![1, 2, 3]);
        assert!(cell.read().is_empty());
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), test)]
    fn it_allows_sequential_write_then_read() {
        let cell = SharedCell::new(0usize);

        {
            let mut value = cell.write();
            *value += 41;
        }
        *cell.write() += 1;

        assert_eq!(*cell.read(), 42);
    }
}
