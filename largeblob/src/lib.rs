/***************************************************************************************************
 * Copyright (c) 2021-2022, Qualcomm Innovation Center, Inc. All rights reserved.
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the “Software”), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice (including the next
 * paragraph) shall be included in all copies or substantial portions of the
 * Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
//! # largeblob
//!
//! The CTAP 2.1 `authenticatorLargeBlobs` array: fragmented read/write of an authenticator's
//! encrypted blob store, addressed by a caller-supplied 32-octet symmetric key. This crate
//! orchestrates the lower-level codec and transport crates into the four operations a relying
//! party library actually calls: `get`, `put`, `remove`, and `trim`.
#![warn(missing_docs)]

mod aead;
mod array;
mod auth;
mod compress;
mod entry_codec;
mod fragment;
mod integrity;
mod lookup;
mod storage;

use largeblob_common::wire;
pub use largeblob_common::{Entry, LargeBlobArray, LargeBlobKey};
pub use largeblob_error::LargeBlobError;
use largeblob_transport::{CredentialManagement, PinUvAuth, Transport};
use zeroize::Zeroize;

use array::ArrayItem;

/// Every external collaborator this crate needs from an authenticator handle: the CTAP
/// transport, the PIN/UV auth subprotocol, and credential management (used only by
/// [`largeblob_trim`]). Blanket-implemented for any type implementing the three traits
/// individually, so callers never need to name this trait themselves.
pub trait Authenticator: Transport + PinUvAuth + CredentialManagement {}
impl<D: Transport + PinUvAuth + CredentialManagement> Authenticator for D {}

/// Fetch and decrypt the entry addressed by `key`.
///
/// Reads the whole array, then performs trial decryption (spec §4.9). Returns `NotFound` if no
/// entry authenticates under `key`, including when the device reports a missing or corrupt array
/// (spec §4.10 edge case: malformed array on `get` is `NotFound`, not an error).
///
/// `key_len != 32` is not a runtime case this function can see: [`LargeBlobKey`] can only be
/// constructed from exactly 32 octets.
pub fn largeblob_get<D: Transport>(dev: &mut D, key: &LargeBlobKey) -> Result<Vec<u8>, LargeBlobError> {
    let items = storage::read_array(dev)?;
    let result = lookup::lookup(&items, key)?;
    result.map(|r| r.plaintext.as_slice().to_vec()).ok_or(LargeBlobError::NotFound)
}

/// Compress, seal and store `plaintext` under `key`, replacing any existing entry for the same
/// key (spec §4.10).
///
/// `plaintext` must be non-empty. If the device reports a malformed array, this operation starts
/// from an empty array rather than failing, so the next write repairs storage.
pub fn largeblob_put<D: Transport + PinUvAuth>(
    dev: &mut D,
    pin: Option<&[u8]>,
    key: &LargeBlobKey,
    plaintext: &[u8],
) -> Result<(), LargeBlobError> {
    if plaintext.is_empty() {
        return Err(LargeBlobError::InvalidArgument);
    }

    let mut nonce = [0u8; wire::NONCE_LEN];
    getrandom::getrandom(&mut nonce).map_err(|_| LargeBlobError::Internal("rng failure"))?;

    let mut compressed = compress::compress(plaintext)?;
    let orig_size = plaintext.len() as u64;
    let ciphertext = aead::seal(key, &nonce, orig_size, &compressed);
    compressed.zeroize();
    let ciphertext = ciphertext?;
    let new_entry = ArrayItem::Decoded(Entry { ciphertext, nonce, orig_size });

    let mut items = storage::read_array(dev)?;
    match lookup::lookup(&items, key)? {
        Some(existing) => items[existing.index] = new_entry,
        None => items.push(new_entry),
    }
    storage::write_array(dev, pin, &items)
}

/// Remove the entry addressed by `key`, if any (spec §4.10). Removing an absent key succeeds as
/// a no-op.
pub fn largeblob_remove<D: Transport + PinUvAuth>(
    dev: &mut D,
    pin: Option<&[u8]>,
    key: &LargeBlobKey,
) -> Result<(), LargeBlobError> {
    let mut items = storage::read_array(dev)?;
    if let Some(existing) = lookup::lookup(&items, key)? {
        items.remove(existing.index);
        storage::write_array(dev, pin, &items)?;
    }
    Ok(())
}

/// Drop every entry that does not decrypt under any large-blob key currently held by a resident
/// credential on the device (spec §4.11). Entries that fail to decode at all are preserved
/// unconditionally, since this operation has no way to know whether they belong to another
/// application.
pub fn largeblob_trim<D: Authenticator>(dev: &mut D, pin: Option<&[u8]>) -> Result<(), LargeBlobError> {
    let mut live_keys = Vec::new();
    for rp in dev.get_rps(pin)? {
        for credential in dev.get_rks(&rp, pin)? {
            if let Some(raw) = credential.large_blob_key {
                if let Some(key) = LargeBlobKey::from_slice(&raw) {
                    live_keys.push(key);
                }
            }
        }
    }

    let items = storage::read_array(dev)?;
    let retained: Vec<ArrayItem> = items
        .into_iter()
        .filter(|item| match item {
            ArrayItem::Opaque(_) => true,
            ArrayItem::Decoded(entry) => live_keys
                .iter()
                .any(|key| aead::open(key, &entry.nonce, entry.orig_size, &entry.ciphertext).is_some()),
        })
        .collect();

    storage::write_array(dev, pin, &retained)
}
