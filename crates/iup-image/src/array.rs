// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Growable array — a contiguous buffer whose unused tail is always zeroed.
//
// The buffer is used as scratch space for user-facing strings (file names,
// selection lists), so every growth, insertion, and removal leaves zeros in
// the elements that are not in use, and the whole buffer is wiped before it
// is freed.

use std::sync::atomic::{Ordering, compiler_fence};

use bytemuck::Zeroable;
use iup_core::error::{IupError, Result};
use tracing::trace;

/// Resizable array of plain-data elements with zero-initialised growth.
///
/// `capacity()` is the number of allocated elements, `len()` the number in
/// use. Slices returned by the mutating methods borrow the array, so they
/// cannot outlive the next reallocation.
#[derive(Debug)]
pub struct GrowableArray<T: Zeroable + Copy> {
    /// Backing storage; `buf.len()` is the capacity.
    buf: Vec<T>,
    count: usize,
    /// Growth step used by `increment`.
    start_capacity: usize,
}

impl<T: Zeroable + Copy> GrowableArray<T> {
    /// Allocate `initial_capacity` zeroed elements.
    ///
    /// `increment` grows the array by the same amount each time it runs out
    /// of room (one element when `initial_capacity` is zero).
    pub fn with_capacity(initial_capacity: usize) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(initial_capacity)
            .map_err(|_| IupError::Allocation {
                requested: initial_capacity,
            })?;
        buf.resize(initial_capacity, T::zeroed());
        Ok(Self {
            buf,
            count: 0,
            start_capacity: initial_capacity.max(1),
        })
    }

    /// Number of elements in use.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of allocated elements.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.buf[..self.count]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.buf[..self.count]
    }

    /// Hand the elements in use to the caller. The released data is not
    /// wiped.
    pub fn release(mut self) -> Vec<T> {
        let mut buf = std::mem::take(&mut self.buf);
        buf.truncate(self.count);
        self.count = 0;
        buf
    }

    /// Append one zeroed element.
    pub fn increment(&mut self) -> Result<&mut [T]> {
        let needed = self.count.checked_add(1).ok_or(IupError::Allocation {
            requested: usize::MAX,
        })?;
        self.reserve_for(needed, self.start_capacity)?;
        self.count = needed;
        Ok(self.as_mut_slice())
    }

    /// Append `n` zeroed elements. When the array runs out of room the
    /// capacity grows by exactly `n`.
    pub fn add(&mut self, n: usize) -> Result<&mut [T]> {
        let needed = self.count.checked_add(n).ok_or(IupError::Allocation {
            requested: usize::MAX,
        })?;
        self.reserve_for(needed, n)?;
        self.count = needed;
        Ok(self.as_mut_slice())
    }

    /// Open `n` zeroed elements at `index`, shifting the tail right.
    ///
    /// `index` may equal `len()` (append). Anything past that is rejected and
    /// the array is left untouched.
    pub fn insert(&mut self, index: usize, n: usize) -> Result<&mut [T]> {
        if index > self.count {
            return Err(IupError::IndexOutOfRange {
                index,
                count: self.count,
            });
        }
        let old_count = self.count;
        self.add(n)?;
        self.buf.copy_within(index..old_count, index + n);
        self.buf[index..index + n].fill(T::zeroed());
        Ok(self.as_mut_slice())
    }

    /// Remove `n` elements starting at `index`, shifting the tail left and
    /// zeroing the vacated elements. Returns `false` (and does nothing) when
    /// the range is out of bounds. Capacity never shrinks.
    pub fn remove(&mut self, index: usize, n: usize) -> bool {
        match index.checked_add(n) {
            Some(end) if end <= self.count => {
                self.buf.copy_within(end..self.count, index);
                let new_count = self.count - n;
                self.buf[new_count..self.count].fill(T::zeroed());
                self.count = new_count;
                true
            }
            _ => false,
        }
    }

    /// Append a copy of `items`.
    pub fn push_slice(&mut self, items: &[T]) -> Result<()> {
        let start = self.count;
        self.add(items.len())?;
        self.buf[start..start + items.len()].copy_from_slice(items);
        Ok(())
    }

    /// Make sure `needed` elements fit, growing by `grow_by` (or more if
    /// that is still short). The old buffer survives a failed allocation.
    fn reserve_for(&mut self, needed: usize, grow_by: usize) -> Result<()> {
        let capacity = self.buf.len();
        if needed <= capacity {
            return Ok(());
        }
        let new_capacity = capacity
            .checked_add(grow_by)
            .map(|c| c.max(needed))
            .ok_or(IupError::Allocation { requested: needed })?;

        self.buf
            .try_reserve_exact(new_capacity - capacity)
            .map_err(|_| IupError::Allocation {
                requested: new_capacity,
            })?;
        self.buf.resize(new_capacity, T::zeroed());
        trace!(capacity, new_capacity, "growable array reallocated");
        Ok(())
    }
}

impl<T: Zeroable + Copy> GrowableArray<T> {
    /// Zero the whole allocation with volatile stores.
    fn wipe(&mut self) {
        for slot in self.buf.iter_mut() {
            // SAFETY: `slot` is a valid, aligned, exclusive reference.
            unsafe { std::ptr::write_volatile(slot, T::zeroed()) };
        }
        compiler_fence(Ordering::SeqCst);
    }
}

impl<T: Zeroable + Copy> Drop for GrowableArray<T> {
    fn drop(&mut self) {
        self.wipe();
    }
}
