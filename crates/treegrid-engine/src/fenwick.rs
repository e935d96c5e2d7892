#![forbid(unsafe_code)]

//! Fenwick tree (Binary Indexed Tree) over pixel sizes.
//!
//! Both window calculators keep one of these: entry `i` is the size of item
//! `i`, [`SizeTree::start`] is the pixel offset where item `i` begins, and
//! [`SizeTree::index_at`] maps a scroll offset back to the item under it.
//!
//! | Operation | Time |
//! |-----------|------|
//! | `from_sizes(sizes)` | O(n) |
//! | `set(i, size)` | O(log n) |
//! | `start(i)` / `end(i)` | O(log n) |
//! | `index_at(offset)` | O(log n) |
//! | `total()` | O(1) |
//!
//! # Invariants
//!
//! 1. `start(0) == 0` and `start(i + 1) == start(i) + size(i)`.
//! 2. `total() == start(len())`.
//! 3. `index_at(o)` returns the unique `i` with `start(i) <= o < end(i)`
//!    for every `o < total()`, skipping zero-sized items.

/// Prefix sums of item sizes, 1-indexed internally.
#[derive(Debug, Clone, Default)]
pub struct SizeTree {
    /// `tree[0]` is unused.
    tree: Vec<u64>,
    /// Plain copy of the sizes for O(1) reads.
    sizes: Vec<u32>,
    total: u64,
}

impl SizeTree {
    /// Build from item sizes in O(n).
    #[must_use]
    pub fn from_sizes(sizes: &[u32]) -> Self {
        let n = sizes.len();
        let mut tree = vec![0u64; n + 1];
        for (i, &s) in sizes.iter().enumerate() {
            tree[i + 1] = u64::from(s);
        }
        for i in 1..=n {
            let parent = i + lowbit(i);
            if parent <= n {
                tree[parent] += tree[i];
            }
        }
        Self {
            tree,
            sizes: sizes.to_vec(),
            total: sizes.iter().map(|&s| u64::from(s)).sum(),
        }
    }

    /// Number of items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Whether there are no items.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Size of item `i`, or `None` past the end.
    #[inline]
    #[must_use]
    pub fn size(&self, i: usize) -> Option<u32> {
        self.sizes.get(i).copied()
    }

    /// Overwrite the size of item `i`. Out-of-range writes are ignored and
    /// reported as `false`.
    pub fn set(&mut self, i: usize, size: u32) -> bool {
        let Some(old) = self.sizes.get_mut(i) else {
            return false;
        };
        let (old_size, new_size) = (u64::from(*old), u64::from(size));
        *old = size;
        if old_size == new_size {
            return true;
        }
        let mut idx = i + 1;
        while idx < self.tree.len() {
            self.tree[idx] = self.tree[idx] + new_size - old_size;
            idx += lowbit(idx);
        }
        self.total = self.total + new_size - old_size;
        true
    }

    /// Sum of sizes of items `[0, i)`, i.e. the offset where item `i` begins.
    /// Clamped to `total()` for `i >= len()`.
    #[must_use]
    pub fn start(&self, i: usize) -> u64 {
        let mut idx = i.min(self.len());
        let mut sum = 0u64;
        while idx > 0 {
            sum += self.tree[idx];
            idx -= lowbit(idx);
        }
        sum
    }

    /// Offset just past item `i`.
    #[must_use]
    pub fn end(&self, i: usize) -> u64 {
        self.start(i.saturating_add(1))
    }

    /// Sum of all sizes.
    #[inline]
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Item whose extent contains `offset`.
    ///
    /// Offsets at or past the end map to the last item; `None` only when the
    /// tree is empty or every item has zero size.
    #[must_use]
    pub fn index_at(&self, offset: u64) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        if offset >= self.total {
            return self.sizes.iter().rposition(|&s| s > 0);
        }
        // Largest prefix count whose sum is <= offset; that item holds `offset`.
        let mut pos = 0usize;
        let mut remaining = offset;
        let mut step = highest_power_of_two(self.len());
        while step > 0 {
            let next = pos + step;
            if next <= self.len() && self.tree[next] <= remaining {
                remaining -= self.tree[next];
                pos = next;
            }
            step >>= 1;
        }
        Some(pos.min(self.len() - 1))
    }

    /// Resize to `n` items; new items take `fill`. O(n).
    pub fn resize(&mut self, n: usize, fill: u32) {
        if n == self.len() {
            return;
        }
        let mut sizes = std::mem::take(&mut self.sizes);
        sizes.resize(n, fill);
        *self = Self::from_sizes(&sizes);
    }

    /// All sizes in index order.
    #[must_use]
    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }
}

#[inline]
fn lowbit(x: usize) -> usize {
    x & x.wrapping_neg()
}

#[inline]
fn highest_power_of_two(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1 << (usize::BITS - 1 - n.leading_zeros())
    }
}
