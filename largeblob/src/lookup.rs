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
//! Trial-decryption lookup (spec §4.9): the array carries no index, so the caller's key is the
//! only way to find "its" entry. A failed trial decryption is not an error; a failed
//! decompression after a successful trial decryption is, since AEAD has already authenticated
//! that entry as belonging to this key.
use largeblob_common::{ByteBuffer, Entry, LargeBlobKey};
use largeblob_error::LargeBlobError;

use crate::array::ArrayItem;
use crate::{aead, compress};

/// One array entry that decrypted successfully under the caller's key.
pub struct LookupResult {
    /// Index of the matching item within the full array (including opaque items), usable by a
    /// caller that wants to replace or remove it in place.
    pub index: usize,
    /// The decompressed plaintext blob.
    pub plaintext: ByteBuffer,
}

/// Scan `items` in order, attempting to open each [`ArrayItem::Decoded`] entry under `key`.
/// Returns the first match, or `None` if no entry decrypts successfully.
pub fn lookup(items: &[ArrayItem], key: &LargeBlobKey) -> Result<Option<LookupResult>, LargeBlobError> {
    for (index, item) in items.iter().enumerate() {
        let ArrayItem::Decoded(entry) = item else {
            continue;
        };
        let Entry { ciphertext, nonce, orig_size } = entry;
        let Some(compressed) = aead::open(key, nonce, *orig_size, ciphertext) else {
            continue;
        };
        let plaintext = compress::decompress(&compressed, *orig_size)?;
        return Ok(Some(LookupResult { index, plaintext }));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use largeblob_common::wire;

    fn seal_entry(key: &LargeBlobKey, plaintext: &[u8]) -> Entry {
        let compressed = compress::compress(plaintext).unwrap();
        let nonce = [0x07u8; wire::NONCE_LEN];
        let ciphertext = aead::seal(key, &nonce, plaintext.len() as u64, &compressed).unwrap();
        Entry { ciphertext, nonce, orig_size: plaintext.len() as u64 }
    }

    #[test]
    fn finds_matching_entry_and_skips_others() {
        let key = LargeBlobKey([0x01u8; wire::KEY_LEN]);
        let other_key = LargeBlobKey([0x02u8; wire::KEY_LEN]);
        let items = vec![
            ArrayItem::Decoded(seal_entry(&other_key, b"not mine")),
            ArrayItem::Decoded(seal_entry(&key, b"mine")),
        ];
        let result = lookup(&items, &key).unwrap().unwrap();
        assert_eq!(result.index, 1);
        assert_eq!(result.plaintext.as_slice(), b"mine");
    }

    #[test]
    fn returns_none_when_nothing_matches() {
        let key = LargeBlobKey([0x01u8; wire::KEY_LEN]);
        let other_key = LargeBlobKey([0x02u8; wire::KEY_LEN]);
        let items = vec![ArrayItem::Decoded(seal_entry(&other_key, b"not mine"))];
        assert!(lookup(&items, &key).unwrap().is_none());
    }

    #[test]
    fn skips_opaque_items_without_attempting_decryption() {
        let key = LargeBlobKey([0x01u8; wire::KEY_LEN]);
        let items = vec![ArrayItem::Opaque(vec![0xffu8; 4]), ArrayItem::Decoded(seal_entry(&key, b"mine"))];
        let result = lookup(&items, &key).unwrap().unwrap();
        assert_eq!(result.index, 1);
    }
}
