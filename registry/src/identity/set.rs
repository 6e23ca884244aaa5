//! # Address Sets
//!
//! The three per-identity collections (associated addresses, providers,
//! resolvers) all need O(1) membership, O(1) insert and remove, and full
//! enumeration. A `HashMap` position index over a `Vec` gives all three:
//! removal swaps the last element into the vacated slot and patches its
//! index entry. Enumeration order is therefore insertion order perturbed by
//! removals; callers that care about the exact order (the recovery-time set
//! commitment does) read it through [`as_slice`](AddressSet::as_slice) at
//! the moment that matters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::address::Address;

/// An enumerable address set with constant-time membership and deletion.
///
/// Serializes as the enumerated list; the position index is rebuilt on
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSet {
    index: HashMap<Address, usize>,
    items: Vec<Address>,
}

impl AddressSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `address` is a member.
    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(address)
    }

    /// Insert an address. Returns `false` if it was already present.
    pub fn insert(&mut self, address: Address) -> bool {
        if self.index.contains_key(&address) {
            return false;
        }
        self.index.insert(address, self.items.len());
        self.items.push(address);
        true
    }

    /// Remove an address. Returns `false` if it was not present.
    ///
    /// Swap-remove: the last element takes the vacated position, so removal
    /// never shifts the whole tail.
    pub fn remove(&mut self, address: &Address) -> bool {
        let Some(pos) = self.index.remove(address) else {
            return false;
        };
        self.items.swap_remove(pos);
        if let Some(moved) = self.items.get(pos) {
            self.index.insert(*moved, pos);
        }
        true
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The members in enumeration order.
    pub fn as_slice(&self) -> &[Address] {
        &self.items
    }

    /// Iterate the members in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.items.iter()
    }

    /// The members as an owned list, in enumeration order.
    pub fn to_vec(&self) -> Vec<Address> {
        self.items.clone()
    }

    /// Remove every member.
    pub fn clear(&mut self) {
        self.index.clear();
        self.items.clear();
    }
}

impl FromIterator<Address> for AddressSet {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        let mut set = Self::new();
        for address in iter {
            set.insert(address);
        }
        set
    }
}

impl Serialize for AddressSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AddressSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<Address>::deserialize(deserializer)?;
        Ok(items.into_iter().collect())
    }
}
