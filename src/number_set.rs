//! Growable bit set with O(1) complement
//!
//! Used for syscall numbers (one set per personality), file descriptors and
//! signal numbers. The backing vector only ever grows; bits beyond the
//! current capacity read as clear before the inversion flag is applied.

use serde::Serialize;

type Slot = u32;
const BITS_PER_SLOT: u32 = Slot::BITS;

/// A set of non-negative numbers with a polarity flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NumberSet {
    slots: Vec<Slot>,
    inverted: bool,
}

impl NumberSet {
    /// Create an empty, non-inverted set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `number`, growing the backing storage as needed
    pub fn add(&mut self, number: u32) {
        let slot = (number / BITS_PER_SLOT) as usize;
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, 0);
        }
        self.slots[slot] |= 1 << (number % BITS_PER_SLOT);
    }

    /// Membership test: `(bit is set) XOR inverted`
    pub fn contains(&self, number: u32) -> bool {
        let set = self
            .slots
            .get((number / BITS_PER_SLOT) as usize)
            .is_some_and(|slot| slot & (1 << (number % BITS_PER_SLOT)) != 0);
        set ^ self.inverted
    }

    /// Flip the polarity of the whole set without touching the bits
    pub fn invert(&mut self) {
        self.inverted = !self.inverted;
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Clear every bit and the inversion flag, keeping the capacity
    pub fn clear(&mut self) {
        self.slots.fill(0);
        self.inverted = false;
    }

    /// Number of bits the set can hold without growing
    pub fn capacity(&self) -> usize {
        self.slots.len() * BITS_PER_SLOT as usize
    }

    /// Iterate over the numbers whose bit is set, ignoring the inversion flag
    pub fn iter_bits(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots.iter().enumerate().flat_map(|(i, &slot)| {
            (0..BITS_PER_SLOT)
                .filter(move |bit| slot & (1 << bit) != 0)
                .map(move |bit| i as u32 * BITS_PER_SLOT + bit)
        })
    }

    /// True if no bit is set, regardless of polarity
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|&slot| slot == 0)
    }
}
