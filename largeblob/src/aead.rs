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
//! AES-256-GCM sealing of one large-blob entry (spec §4.3). Associated data binds the
//! pre-compression plaintext length into the tag so a truncated or re-sized ciphertext never
//! authenticates under the wrong `origSize`.
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use largeblob_common::{wire, LargeBlobKey};
use largeblob_error::LargeBlobError;

fn associated_data(orig_size: u64) -> [u8; 12] {
    let mut aad = [0u8; 12];
    aad[0..4].copy_from_slice(&wire::AAD_PREFIX);
    aad[4..12].copy_from_slice(&orig_size.to_le_bytes());
    aad
}

/// Seal `plaintext` (the compressed entry payload) under `key`/`nonce`, binding `orig_size` into
/// the tag. Returns `ciphertext || tag`.
pub fn seal(
    key: &LargeBlobKey,
    nonce: &[u8; wire::NONCE_LEN],
    orig_size: u64,
    plaintext: &[u8],
) -> Result<Vec<u8>, LargeBlobError> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| LargeBlobError::Internal("aead key rejected"))?;
    let aad = associated_data(orig_size);
    cipher
        .encrypt(Nonce::from_slice(nonce), Payload { msg: plaintext, aad: &aad })
        .map_err(|_| LargeBlobError::Internal("aead seal failed"))
}

/// Attempt to open `ciphertext` (`ciphertext || tag`) under `key`/`nonce`/`orig_size`.
///
/// Returns `None` on authentication failure rather than an error: spec §4.9 requires that trial
/// decryption during lookup never aborts the scan, so every caller of this function is expected
/// to try the next candidate entry on `None`.
pub fn open(
    key: &LargeBlobKey,
    nonce: &[u8; wire::NONCE_LEN],
    orig_size: u64,
    ciphertext: &[u8],
) -> Option<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).ok()?;
    let aad = associated_data(orig_size);
    cipher
        .decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad: &aad })
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_then_open_round_trips() {
        let key = LargeBlobKey([0x11u8; wire::KEY_LEN]);
        let nonce = [0x22u8; wire::NONCE_LEN];
        let ciphertext = seal(&key, &nonce, 5, b"hello").unwrap();
        assert_eq!(open(&key, &nonce, 5, &ciphertext), Some(b"hello".to_vec()));
    }

    #[test]
    fn open_rejects_wrong_key() {
        let key = LargeBlobKey([0x11u8; wire::KEY_LEN]);
        let other = LargeBlobKey([0x99u8; wire::KEY_LEN]);
        let nonce = [0x22u8; wire::NONCE_LEN];
        let ciphertext = seal(&key, &nonce, 5, b"hello").unwrap();
        assert_eq!(open(&other, &nonce, 5, &ciphertext), None);
    }

    #[test]
    fn open_rejects_wrong_orig_size_in_aad() {
        let key = LargeBlobKey([0x11u8; wire::KEY_LEN]);
        let nonce = [0x22u8; wire::NONCE_LEN];
        let ciphertext = seal(&key, &nonce, 5, b"hello").unwrap();
        assert_eq!(open(&key, &nonce, 6, &ciphertext), None);
    }
}
