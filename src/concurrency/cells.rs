//! Dense per-node cells written under a partition-ownership discipline.
//!
//! A `PartitionedCells<T>` is a boxed slice of `UnsafeCell<T>` that may be shared
//! across worker threads. It performs no synchronization itself: the caller
//! guarantees that within one superstep a cell is only touched by the partition
//! owning its node id, and the superstep barrier orders accesses across supersteps.

use core::cell::UnsafeCell;

/// Per-node cells with owner-only mutation.
pub struct PartitionedCells<T> {
    cells: Box<[UnsafeCell<T>]>,
}

// SAFETY: access is partitioned by node id; see the module docs and the
// `# Safety` sections of the shared accessors.
unsafe impl<T: Send> Sync for PartitionedCells<T> {}

impl<T> PartitionedCells<T> {
    /// Creates `len` cells initialized by `init(index)`.
    pub fn from_fn(len: usize, mut init: impl FnMut(usize) -> T) -> Self {
        let cells = (0..len).map(|i| UnsafeCell::new(init(i))).collect();
        Self { cells }
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if there are no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Exclusive access to a cell.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        self.cells[index].get_mut()
    }

    /// Shared read of a cell while no writer exists.
    ///
    /// Holding `&mut self` elsewhere is impossible while this borrow lives, and
    /// shared writes are `unsafe`, so reads through `&self` only race with callers
    /// that violated [`PartitionedCells::set_shared`]'s contract.
    #[inline]
    pub fn get(&self, index: usize) -> &T {
        // SAFETY: writers through `&self` must own `index` and not overlap this borrow.
        unsafe { &*self.cells[index].get() }
    }

    /// Replaces the value of a cell through a shared reference.
    ///
    /// # Safety
    /// The calling thread must be the only one accessing `index` for the duration of
    /// the call, and no reference previously returned by [`PartitionedCells::get`]
    /// for `index` may still be alive.
    #[inline]
    pub unsafe fn set_shared(&self, index: usize, value: T) {
        // SAFETY: exclusivity of `index` is guaranteed by the caller.
        unsafe {
            *self.cells[index].get() = value;
        }
    }

    /// Iterates over all cells.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.cells.len()).map(move |i| self.get(i))
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for PartitionedCells<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_writers_do_not_interfere() {
        let cells = PartitionedCells::from_fn(64, |_| Vec::<usize>::new());
        std::thread::scope(|s| {
            for part in 0..4 {
                let cells = &cells;
                s.spawn(move || {
                    for i in (part..64).step_by(4) {
                        // SAFETY: each thread owns the ids congruent to `part` mod 4.
                        unsafe { cells.set_shared(i, vec![part, i]) };
                    }
                });
            }
        });
        for i in 0..64 {
            assert_eq!(cells.get(i), &vec![i % 4, i]);
        }
    }

    #[test]
    fn get_mut_replaces_in_place() {
        let mut cells = PartitionedCells::from_fn(3, |i| i as i64);
        *cells.get_mut(1) = 42;
        assert_eq!(cells.iter().copied().collect::<Vec<_>>(), vec![0, 42, 2]);
    }
}
