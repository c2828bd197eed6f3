// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Globally unique identifiers in IFC compressed form.
//!
//! An IFC `GlobalId` is 128 bits written as 22 characters of a 64-symbol
//! alphabet: the first character carries the top 2 bits, the remaining 21
//! carry 6 bits each.
//!
//! Identifiers of nested instances are chained to their parent's identifier,
//! so the same definition placed under two different parents gets two
//! different ids, while the same placement exported twice gets the same one.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};
use uuid::Uuid;

const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";

/// Length of a compressed identifier.
pub const COMPRESSED_LEN: usize = 22;

/// A 128-bit identifier rendered in IFC compressed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalId {
    bits: u128,
}

impl GlobalId {
    /// Wraps raw bits.
    pub fn from_bits(bits: u128) -> Self {
        Self { bits }
    }

    /// Wraps 16 big-endian bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self {
            bits: u128::from_be_bytes(bytes),
        }
    }

    /// Returns the raw bits.
    pub fn bits(&self) -> u128 {
        self.bits
    }

    /// Derives an identifier deterministically from arbitrary text.
    ///
    /// Compressed ids and UUIDs are decoded as-is; anything else is hashed.
    pub fn from_seed(seed: &str) -> Self {
        if let Ok(id) = seed.parse::<GlobalId>() {
            return id;
        }
        if let Ok(uuid) = Uuid::parse_str(seed) {
            return Self::from_bytes(*uuid.as_bytes());
        }
        Self::from_bytes(truncated_sha256(&[seed.as_bytes()]))
    }

    /// Scopes this identifier to `parent`. Must happen before rendering.
    pub fn chain_to(&mut self, parent: &GlobalId) {
        self.bits = u128::from_be_bytes(truncated_sha256(&[
            &parent.bits.to_be_bytes(),
            &self.bits.to_be_bytes(),
        ]));
    }

    /// Returns a copy scoped to `parent`.
    pub fn chained_to(mut self, parent: &GlobalId) -> Self {
        self.chain_to(parent);
        self
    }

    /// Renders the 22-character compressed form.
    pub fn compress(&self) -> String {
        (0..COMPRESSED_LEN)
            .map(|i| {
                let shift = 6 * (COMPRESSED_LEN - 1 - i);
                ALPHABET[((self.bits >> shift) & 0x3f) as usize] as char
            })
            .collect()
    }
}

fn truncated_sha256(parts: &[&[u8]]) -> [u8; 16] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest[..16]);
    out
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compress())
    }
}

/// Error returned when text is not a compressed identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a compressed IFC GlobalId: {0:?}")]
pub struct ParseGlobalIdError(pub String);

impl FromStr for GlobalId {
    type Err = ParseGlobalIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != COMPRESSED_LEN {
            return Err(ParseGlobalIdError(s.to_string()));
        }

        let mut bits: u128 = 0;
        for (i, byte) in s.bytes().enumerate() {
            let digit = ALPHABET
                .iter()
                .position(|&c| c == byte)
                .ok_or_else(|| ParseGlobalIdError(s.to_string()))? as u128;
            // The leading character only carries two bits.
            if i == 0 && digit > 3 {
                return Err(ParseGlobalIdError(s.to_string()));
            }
            bits = (bits << 6) | digit;
        }
        Ok(Self { bits })
    }
}

/// Capability that hands out identifiers during an export.
pub trait IdentifierService {
    /// Produces an identifier, derived from `seed` when given, random otherwise.
    fn generate(&mut self, seed: Option<&str>) -> GlobalId;
}

/// Default service: seeded ids via [`GlobalId::from_seed`], fresh ids from UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct IfcGuidService;

impl IdentifierService for IfcGuidService {
    fn generate(&mut self, seed: Option<&str>) -> GlobalId {
        match seed {
            Some(seed) => GlobalId::from_seed(seed),
            None => GlobalId::from_bytes(*Uuid::new_v4().as_bytes()),
        }
    }
}

impl<S: IdentifierService + ?Sized> IdentifierService for &mut S {
    fn generate(&mut self, seed: Option<&str>) -> GlobalId {
        (**self).generate(seed)
    }
}
