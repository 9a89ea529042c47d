//! Growable object pool with O(1) take/return
//!
//! Elements live at stable slots addressed by `PoolKey`. A separate order
//! array is split at `in_use`: keys before the boundary are handed out, keys
//! after it are free. Returning a key swaps it with the last in-use key, so
//! both operations are constant time.

use petalfall_core::{PetalError, Result};

/// Stable handle to a pooled element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolKey(pub usize);

type Factory<T> = Box<dyn FnMut() -> T + Send>;
type Cleanup<T> = Box<dyn FnMut(&mut T) + Send>;

pub struct ObjectPool<T> {
    items: Vec<T>,
    /// Keys, in-use region first
    order: Vec<usize>,
    /// Position of each key inside `order`
    position: Vec<usize>,
    in_use: usize,
    ceiling: Option<usize>,
    factory: Factory<T>,
    cleanup: Option<Cleanup<T>>,
}

impl<T> ObjectPool<T> {
    /// Create a pool pre-filled with `capacity` factory-built elements
    pub fn new(capacity: usize, factory: impl FnMut() -> T + Send + 'static) -> Self {
        let mut pool = Self {
            items: Vec::new(),
            order: Vec::new(),
            position: Vec::new(),
            in_use: 0,
            ceiling: None,
            factory: Box::new(factory),
            cleanup: None,
        };
        pool.grow_to(capacity);
        pool
    }

    /// Run `cleanup` on every element as it is returned
    pub fn with_cleanup(mut self, cleanup: impl FnMut(&mut T) + Send + 'static) -> Self {
        self.cleanup = Some(Box::new(cleanup));
        self
    }

    /// Refuse to grow past `ceiling` elements
    pub fn with_ceiling(mut self, ceiling: usize) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// Number of elements currently handed out
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    pub fn available(&self) -> usize {
        self.capacity() - self.in_use
    }

    /// Hand out a free element, growing by half when none is left
    pub fn take(&mut self) -> Result<PoolKey> {
        if self.in_use == self.capacity() {
            self.grow()?;
        }
        let key = self.order[self.in_use];
        self.in_use += 1;
        Ok(PoolKey(key))
    }

    /// Return a previously taken element. O(1).
    ///
    /// Fails if `key` is unknown or not currently in use (double return).
    pub fn give_back(&mut self, key: PoolKey) -> Result<()> {
        let Some(&pos) = self.position.get(key.0) else {
            return Err(PetalError::PoolError(format!("unknown key {}", key.0)));
        };
        if pos >= self.in_use {
            return Err(PetalError::PoolError(format!(
                "key {} is not in use (double return?)",
                key.0
            )));
        }

        self.in_use -= 1;
        let boundary_key = self.order[self.in_use];
        self.order.swap(pos, self.in_use);
        self.position[boundary_key] = pos;
        self.position[key.0] = self.in_use;

        if let Some(cleanup) = self.cleanup.as_mut() {
            cleanup(&mut self.items[key.0]);
        }
        Ok(())
    }

    pub fn is_in_use(&self, key: PoolKey) -> bool {
        self.position.get(key.0).is_some_and(|&pos| pos < self.in_use)
    }

    pub fn get(&self, key: PoolKey) -> Option<&T> {
        self.items.get(key.0)
    }

    pub fn get_mut(&mut self, key: PoolKey) -> Option<&mut T> {
        self.items.get_mut(key.0)
    }

    fn grow(&mut self) -> Result<()> {
        let current = self.capacity();
        let mut target = (current.max(1) * 3).div_ceil(2);
        if let Some(ceiling) = self.ceiling {
            if current >= ceiling {
                return Err(PetalError::PoolExhausted { ceiling });
            }
            target = target.min(ceiling);
        }
        self.grow_to(target);
        log::debug!("Grew pool of {} to {}", std::any::type_name::<T>(), target);
        Ok(())
    }

    fn grow_to(&mut self, capacity: usize) {
        for key in self.items.len()..capacity {
            self.items.push((self.factory)());
            self.position.push(self.order.len());
            self.order.push(key);
        }
    }
}
