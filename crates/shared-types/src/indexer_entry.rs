//! # Indexer Entry Codec
//!
//! Binary encoding of the indexer membership list held by the state store:
//!
//! ```text
//! [count: 1 byte][addr_1: ADDRESS_SIZE]...[addr_count: ADDRESS_SIZE]
//! ```
//!
//! ## Invariants
//!
//! - A well-formed entry has length `1 + count * ADDRESS_SIZE`.
//! - Every operation is total: malformed input never panics and never yields
//!   a partially updated buffer. Mutations signal "invalid / no change" with
//!   the zero-length [`EMPTY_ENTRY`] sentinel.
//! - Removing the last address yields `[0]`, a one-byte entry, which is
//!   distinct from the sentinel.

use tracing::debug;

use crate::address::ADDRESS_SIZE;

/// Sentinel returned when an input is invalid or a mutation is a no-op.
pub const EMPTY_ENTRY: &[u8] = &[];

/// Smallest entry that can hold one address.
const MIN_POPULATED_LEN: usize = 1 + ADDRESS_SIZE;

/// Upper bound imposed by the one-byte count prefix.
pub const MAX_INDEXERS: usize = u8::MAX as usize;

/// Append `address` to `entry`, returning a freshly built entry.
///
/// An absent entry, or one too short to hold a populated record, starts a
/// new single-element list. Returns the sentinel when the address has the
/// wrong width, the existing entry is inconsistent with its count byte, or
/// the list is full.
pub fn append(address: &[u8], entry: Option<&[u8]>) -> Vec<u8> {
    if address.len() != ADDRESS_SIZE {
        debug!(
            len = address.len(),
            expected = ADDRESS_SIZE,
            "indexer append: invalid address width"
        );
        return EMPTY_ENTRY.to_vec();
    }

    let existing = match entry {
        Some(bytes) if bytes.len() >= MIN_POPULATED_LEN => bytes,
        _ => {
            let mut fresh = Vec::with_capacity(MIN_POPULATED_LEN);
            fresh.push(1);
            fresh.extend_from_slice(address);
            return fresh;
        }
    };

    let Some(count) = checked_count(existing) else {
        debug!(len = existing.len(), "indexer append: malformed entry");
        return EMPTY_ENTRY.to_vec();
    };

    if count >= MAX_INDEXERS {
        debug!(count, "indexer append: entry is full");
        return EMPTY_ENTRY.to_vec();
    }

    let mut out = Vec::with_capacity(existing.len() + ADDRESS_SIZE);
    out.extend_from_slice(existing);
    out.extend_from_slice(address);
    out[0] = (count + 1) as u8;
    out
}

/// Zero-based slot of the first exact match of `address`, or `None`.
pub fn get_index(entry: &[u8], address: &[u8]) -> Option<usize> {
    if address.len() != ADDRESS_SIZE {
        return None;
    }
    let count = checked_count(entry)?;

    entry[1..]
        .chunks_exact(ADDRESS_SIZE)
        .take(count)
        .position(|slot| slot == address)
}

/// Remove the first occurrence of `address`, returning a freshly built entry.
///
/// Returns the sentinel when the input is malformed or the address is not
/// present.
pub fn remove(address: &[u8], entry: &[u8]) -> Vec<u8> {
    if address.len() != ADDRESS_SIZE || entry.len() < MIN_POPULATED_LEN {
        debug!(
            address_len = address.len(),
            entry_len = entry.len(),
            "indexer remove: invalid input"
        );
        return EMPTY_ENTRY.to_vec();
    }

    let Some(count) = checked_count(entry) else {
        debug!(len = entry.len(), "indexer remove: malformed entry");
        return EMPTY_ENTRY.to_vec();
    };

    let Some(index) = get_index(entry, address) else {
        debug!("indexer remove: address not present");
        return EMPTY_ENTRY.to_vec();
    };

    let start = 1 + index * ADDRESS_SIZE;
    let end = start + ADDRESS_SIZE;

    let mut out = Vec::with_capacity(entry.len() - ADDRESS_SIZE);
    out.push((count - 1) as u8);
    out.extend_from_slice(&entry[1..start]);
    out.extend_from_slice(&entry[end..]);
    out
}

/// Decode the address slots of a well-formed entry.
pub fn addresses(entry: &[u8]) -> Vec<&[u8]> {
    match checked_count(entry) {
        Some(count) => entry[1..].chunks_exact(ADDRESS_SIZE).take(count).collect(),
        None => Vec::new(),
    }
}

/// Whether the entry is the "invalid / no change" sentinel.
pub fn is_sentinel(entry: &[u8]) -> bool {
    entry.is_empty()
}

/// Count byte of an entry whose length agrees with it.
fn checked_count(entry: &[u8]) -> Option<usize> {
    let count = *entry.first()? as usize;
    (entry.len() == 1 + count * ADDRESS_SIZE).then_some(count)
}
