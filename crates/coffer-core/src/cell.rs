//! Hook cells.
//!
//! `StateCell` is the reactive container behind `use_state`: writing a new
//! value asks the owning session for a re-render. `MutCell` is the silent
//! variant behind `use_ref` for data that must survive renders without
//! triggering them (task handles, async results, scratch values).
//!
//! Both are cheap clone-by-handle containers. The value sits behind a
//! mutex so an async supplier may hand its result over from another thread;
//! everything that reacts to the write still happens on the UI thread.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Change callback wired in by the reconciler at allocation.
pub(crate) type UpdateFn = Arc<dyn Fn() + Send + Sync>;

pub struct StateCell<T> {
    inner: Arc<StateInner<T>>,
}

struct StateInner<T> {
    value: Mutex<T>,
    on_change: UpdateFn,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> StateCell<T> {
    pub(crate) fn new(value: T, on_change: UpdateFn) -> Self {
        Self {
            inner: Arc::new(StateInner {
                value: Mutex::new(value),
                on_change,
            }),
        }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.value.lock().clone()
    }

    /// Stores `value` and requests a re-render. Writing a value equal to
    /// the current one is a no-op.
    pub fn set(&self, value: T)
    where
        T: PartialEq,
    {
        {
            let mut current = self.inner.value.lock();
            if *current == value {
                return;
            }
            *current = value;
        }
        // The callback may render inline; the lock must be released first.
        (self.inner.on_change)();
    }

    pub fn update(&self, f: impl FnOnce(&mut T))
    where
        T: Clone + PartialEq,
    {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        f(&self.inner.value.lock())
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateCell")
            .field(&*self.inner.value.lock())
            .finish()
    }
}

pub struct MutCell<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for MutCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> MutCell<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.lock().clone()
    }

    pub fn set(&self, value: T) {
        *self.inner.lock() = value;
    }

    pub fn update<U>(&self, f: impl FnOnce(&mut T) -> U) -> U {
        f(&mut self.inner.lock())
    }

    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        f(&self.inner.lock())
    }
}

impl<T: fmt::Debug> fmt::Debug for MutCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MutCell").field(&*self.inner.lock()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_cell<T: 'static>(value: T) -> (StateCell<T>, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let hook: UpdateFn = {
            let fired = fired.clone();
            Arc::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            })
        };
        (StateCell::new(value, hook), fired)
    }

    #[test]
    fn set_skips_equal_values() {
        let (cell, fired) = counting_cell(7);
        cell.set(7);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        cell.set(8);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(cell.get(), 8);
    }

    #[test]
    fn update_fires_once_per_real_change() {
        let (cell, fired) = counting_cell(String::from("a"));
        cell.update(|s| s.push('b'));
        cell.update(|_| {});
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(cell.get(), "ab");
    }

    #[test]
    fn mut_cell_is_silent() {
        let cell = MutCell::new(vec![1, 2]);
        cell.update(|v| v.push(3));
        assert_eq!(cell.with(|v| v.len()), 3);
    }
}
