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
//! CBOR encoding of one `Entry` map (spec §3, §4.2): exactly three integer keys, ciphertext,
//! nonce, origSize. Unknown keys are tolerated on decode; missing required keys are rejected.
use largeblob_cbor::{Decoder, Encoder, MapAction, Value};
use largeblob_common::{wire, Entry};
use largeblob_error::LargeBlobError;

/// Encode one entry as a definite-length CBOR map.
pub fn encode_entry(entry: &Entry) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.map_header(3);
    enc.uint(wire::ENTRY_KEY_CIPHERTEXT as u64).bstr(&entry.ciphertext);
    enc.uint(wire::ENTRY_KEY_NONCE as u64).bstr(&entry.nonce);
    enc.uint(wire::ENTRY_KEY_ORIG_SIZE as u64).uint(entry.orig_size);
    enc.into_bytes()
}

/// Decode one entry map from `bytes`, which must hold exactly one well-formed CBOR map item.
/// Fails if any of the three required keys is absent, or if the decoded entry violates
/// [`Entry::is_well_formed`].
pub fn decode_entry(bytes: &[u8]) -> Result<Entry, LargeBlobError> {
    let mut ciphertext: Option<Vec<u8>> = None;
    let mut nonce: Option<Vec<u8>> = None;
    let mut orig_size: Option<u64> = None;

    let mut decoder = Decoder::new(bytes);
    decoder
        .walk_map(|key, value| match (key as u32, value) {
            (wire::ENTRY_KEY_CIPHERTEXT, Some(Value::Bstr(b))) => {
                ciphertext = Some(b.clone());
                MapAction::Continue
            }
            (wire::ENTRY_KEY_NONCE, Some(Value::Bstr(b))) => {
                nonce = Some(b.clone());
                MapAction::Continue
            }
            (wire::ENTRY_KEY_ORIG_SIZE, Some(Value::UInt(n))) => {
                orig_size = Some(*n);
                MapAction::Continue
            }
            _ => MapAction::Ignore,
        })
        .map_err(|_| LargeBlobError::Internal("malformed entry map"))?;

    let ciphertext = ciphertext.ok_or(LargeBlobError::Internal("entry missing ciphertext"))?;
    let nonce_bytes = nonce.ok_or(LargeBlobError::Internal("entry missing nonce"))?;
    let orig_size = orig_size.ok_or(LargeBlobError::Internal("entry missing origSize"))?;

    let nonce: [u8; wire::NONCE_LEN] = nonce_bytes
        .try_into()
        .map_err(|_| LargeBlobError::Internal("entry nonce has wrong length"))?;

    let entry = Entry { ciphertext, nonce, orig_size };
    if !entry.is_well_formed() {
        return Err(LargeBlobError::Internal("entry fails well-formedness check"));
    }
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Entry {
        Entry { ciphertext: vec![0xabu8; 20], nonce: [0x01u8; wire::NONCE_LEN], orig_size: 42 }
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let entry = sample();
        let bytes = encode_entry(&entry);
        assert_eq!(decode_entry(&bytes).unwrap(), entry);
    }

    #[test]
    fn decode_rejects_missing_required_key() {
        let mut enc = Encoder::new();
        enc.map_header(2);
        enc.uint(wire::ENTRY_KEY_CIPHERTEXT as u64).bstr(b"x");
        enc.uint(wire::ENTRY_KEY_NONCE as u64).bstr(&[0u8; wire::NONCE_LEN]);
        assert!(decode_entry(&enc.into_bytes()).is_err());
    }

    #[test]
    fn decode_tolerates_unknown_key() {
        let mut enc = Encoder::new();
        enc.map_header(4);
        enc.uint(wire::ENTRY_KEY_CIPHERTEXT as u64).bstr(&[0xabu8; 20]);
        enc.uint(wire::ENTRY_KEY_NONCE as u64).bstr(&[0x01u8; wire::NONCE_LEN]);
        enc.uint(wire::ENTRY_KEY_ORIG_SIZE as u64).uint(42);
        enc.uint(99).uint(7);
        let entry = decode_entry(&enc.into_bytes()).unwrap();
        assert_eq!(entry, sample());
    }

    #[test]
    fn decode_rejects_zero_orig_size() {
        let mut enc = Encoder::new();
        enc.map_header(3);
        enc.uint(wire::ENTRY_KEY_CIPHERTEXT as u64).bstr(&[0xabu8; 20]);
        enc.uint(wire::ENTRY_KEY_NONCE as u64).bstr(&[0x01u8; wire::NONCE_LEN]);
        enc.uint(wire::ENTRY_KEY_ORIG_SIZE as u64).uint(0);
        assert!(decode_entry(&enc.into_bytes()).is_err());
    }
}
