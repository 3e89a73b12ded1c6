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
/***************************************************************************************************
 * largeblob-common
 *
 * Definitions (constants and structures) shared across every crate in the large-blob array
 * subsystem. These are split into their own crate, containing essentially no logic, to avoid
 * circular dependencies between the codec, transport and orchestration crates.
 **************************************************************************************************/
use zeroize::{Zeroize, ZeroizeOnDrop};

/***************************************************************************************************
 * Wire constants (spec §6)
 **************************************************************************************************/
pub mod wire {
    /// CTAP command id for the `authenticatorLargeBlobs` command.
    pub const CMD_LARGE_BLOBS: u8 = 0x0C;

    /// Read request map key: number of bytes requested.
    pub const KEY_GET: u32 = 1;
    /// Write request map key: chunk bytes to set.
    pub const KEY_SET: u32 = 1;
    /// Write request map key: offset into the serialized array.
    pub const KEY_OFFSET: u32 = 2;
    /// Read request / write request map key: requested count / total length (first chunk only).
    pub const KEY_LENGTH_OR_OFFSET: u32 = 3;
    /// Write request map key: pinUvAuthParam.
    pub const KEY_PIN_UV_AUTH_PARAM: u32 = 4;
    /// Write request map key: pinUvAuthProtocol.
    pub const KEY_PIN_UV_AUTH_PROTOCOL: u32 = 5;

    /// Entry map key: ciphertext.
    pub const ENTRY_KEY_CIPHERTEXT: u32 = 1;
    /// Entry map key: nonce.
    pub const ENTRY_KEY_NONCE: u32 = 2;
    /// Entry map key: origSize.
    pub const ENTRY_KEY_ORIG_SIZE: u32 = 3;

    /// Length, in octets, of an AEAD nonce.
    pub const NONCE_LEN: usize = 12;
    /// Length, in octets, of an AEAD authentication tag.
    pub const TAG_LEN: usize = 16;
    /// Length, in octets, of the array truncation trailer.
    pub const TRAILER_LEN: usize = 16;
    /// Length, in octets, of a large-blob key.
    pub const KEY_LEN: usize = 32;
    /// ASCII prefix of the AEAD associated data: `"blob"`.
    pub const AAD_PREFIX: [u8; 4] = *b"blob";
    /// Large-blob command id, used in the write-authorization HMAC input.
    pub const HMAC_CMD_BYTE: u8 = CMD_LARGE_BLOBS;
    /// Length, in octets, of the per-fragment write-authorization HMAC input (spec §4.8).
    pub const HMAC_INPUT_LEN: usize = 70;
    /// Largest message the CTAPHID framing layer below this subsystem can carry in one
    /// transaction, independent of what an individual device advertises as its `maxMsgSize`.
    pub const MAX_WIRE: usize = 7609;
}

/***************************************************************************************************
 * C1: Byte buffer
 **************************************************************************************************/

/// An owning, length-prefixed byte container.
///
/// `ByteBuffer` exists so every crate in the subsystem shares one vocabulary for "a bag of owned
/// bytes that must be wiped before it is freed" rather than passing `Vec<u8>` around and hoping
/// every call site remembers to zeroize it. Every setter copies its input; none alias the
/// caller's storage.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer(Vec<u8>);

impl ByteBuffer {
    /// Allocate an empty buffer with no backing storage.
    pub fn new() -> Self {
        ByteBuffer(Vec::new())
    }

    /// Replace the contents of this buffer with a copy of `data`, dropping (and zeroizing) any
    /// previous contents first.
    pub fn set(&mut self, data: &[u8]) {
        self.reset();
        self.0.extend_from_slice(data);
    }

    /// Extend this buffer with a copy of `data`.
    pub fn append(&mut self, data: &[u8]) {
        self.0.extend_from_slice(data);
    }

    /// Borrow the contents of this buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// The number of octets held by this buffer.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True iff this buffer holds no octets.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Zeroize and release the backing storage, leaving the buffer empty.
    pub fn reset(&mut self) {
        self.0.zeroize();
        self.0.clear();
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        ByteBuffer(data)
    }
}

impl Drop for ByteBuffer {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/***************************************************************************************************
 * Large-blob key (caller-supplied, §3)
 **************************************************************************************************/

/// A 32-octet symmetric key addressing one entry in the large-blob array.
///
/// Never stored by this subsystem beyond the lifetime of a single operation; zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct LargeBlobKey(pub [u8; wire::KEY_LEN]);

impl LargeBlobKey {
    /// Build a key from a byte slice, failing if it is not exactly 32 octets.
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        if data.len() != wire::KEY_LEN {
            return None;
        }
        let mut key = [0u8; wire::KEY_LEN];
        key.copy_from_slice(data);
        Some(LargeBlobKey(key))
    }

    /// Borrow the raw key material.
    pub fn as_bytes(&self) -> &[u8; wire::KEY_LEN] {
        &self.0
    }
}

/***************************************************************************************************
 * Large-blob entry and array (in-memory, §3)
 **************************************************************************************************/

/// One sealed element of the large-blob array: ciphertext, nonce, and original plaintext size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// `AEAD(key, nonce, aad, plaintext) = ciphertext || tag`; at least 16 octets (the tag alone).
    pub ciphertext: Vec<u8>,
    /// Exactly 12 octets.
    pub nonce: [u8; wire::NONCE_LEN],
    /// Length of the pre-compression plaintext; in `[1, usize::MAX]`.
    pub orig_size: u64,
}

impl Entry {
    /// True iff every field of this entry satisfies the invariants of spec §3.
    pub fn is_well_formed(&self) -> bool {
        self.orig_size != 0 && self.ciphertext.len() >= wire::TAG_LEN
    }
}

/// An ordered sequence of large-blob entries, as held in memory between a read and the
/// corresponding write. Index order is significant: `put` replaces in place, `remove` drops by
/// index, both observable to a caller re-reading the array.
pub type LargeBlobArray = Vec<Entry>;

/***************************************************************************************************
 * Authorization token (§3, §4.8)
 **************************************************************************************************/

/// An opaque PIN/UV authorization token, obtained from the authenticator and scoped to a single
/// write operation.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AuthToken(pub Vec<u8>);

impl AuthToken {
    /// Borrow the raw token bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_buffer_is_empty_until_set() {
        let mut buf = ByteBuffer::new();
        assert!(buf.is_empty());
        buf.set(b"hello");
        assert_eq!(buf.as_slice(), b"hello");
        assert!(!buf.is_empty());
    }

    #[test]
    fn byte_buffer_set_drops_previous_contents() {
        let mut buf = ByteBuffer::new();
        buf.set(b"first");
        buf.set(b"second");
        assert_eq!(buf.as_slice(), b"second");
    }

    #[test]
    fn byte_buffer_append_extends() {
        let mut buf = ByteBuffer::new();
        buf.set(b"ab");
        buf.append(b"cd");
        assert_eq!(buf.as_slice(), b"abcd");
    }

    #[test]
    fn byte_buffer_reset_empties() {
        let mut buf = ByteBuffer::new();
        buf.set(b"data");
        buf.reset();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn large_blob_key_rejects_wrong_length() {
        assert!(LargeBlobKey::from_slice(&[0u8; 31]).is_none());
        assert!(LargeBlobKey::from_slice(&[0u8; 33]).is_none());
        assert!(LargeBlobKey::from_slice(&[0u8; 32]).is_some());
    }

    #[test]
    fn entry_well_formedness() {
        let good = Entry {
            ciphertext: vec![0u8; 16],
            nonce: [0u8; 12],
            orig_size: 1,
        };
        assert!(good.is_well_formed());

        let zero_size = Entry {
            orig_size: 0,
            ..good.clone()
        };
        assert!(!zero_size.is_well_formed());

        let short_ciphertext = Entry {
            ciphertext: vec![0u8; 15],
            ..good
        };
        assert!(!short_ciphertext.is_well_formed());
    }
}
