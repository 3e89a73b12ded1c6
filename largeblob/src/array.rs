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
//! The outer large-blob array: a definite-length CBOR array of entry maps (spec §3, §4.2, §4.11).
//! An item this process cannot decode is kept as opaque raw bytes rather than dropped, so a
//! `get`/`put` cycle never silently discards another application's entries.
use largeblob_cbor::{Decoder, Encoder};
use largeblob_common::Entry;
use largeblob_error::LargeBlobError;

use crate::entry_codec::{decode_entry, encode_entry};

/// One element of the large-blob array, after an attempt to decode it as an [`Entry`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayItem {
    /// Successfully decoded as a well-formed entry.
    Decoded(Entry),
    /// Structurally a CBOR item this process could not interpret as an entry; preserved
    /// verbatim so re-serializing the array does not lose another application's data.
    Opaque(Vec<u8>),
}

/// Parse the body (trailer already stripped) of a serialized large-blob array into its items.
///
/// Returns `Err` only if `body` is not itself a well-formed CBOR definite-length array; a
/// per-item decode failure never fails the whole parse, it just yields an [`ArrayItem::Opaque`].
pub fn parse_items(body: &[u8]) -> Result<Vec<ArrayItem>, LargeBlobError> {
    let mut decoder = Decoder::new(body);
    let count = decoder
        .read_array_header()
        .map_err(|_| LargeBlobError::Internal("malformed large-blob array"))?;

    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let before = decoder.remaining();
        decoder
            .skip_item()
            .map_err(|_| LargeBlobError::Internal("malformed large-blob array item"))?;
        let consumed = before.len() - decoder.remaining().len();
        let raw = &before[..consumed];

        match decode_entry(raw) {
            Ok(entry) => items.push(ArrayItem::Decoded(entry)),
            Err(_) => items.push(ArrayItem::Opaque(raw.to_vec())),
        }
    }
    Ok(items)
}

/// Serialize `items` back into the body of a large-blob array (trailer not included).
pub fn serialize_items(items: &[ArrayItem]) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.array_header(items.len());
    for item in items {
        match item {
            ArrayItem::Decoded(entry) => {
                enc.raw(&encode_entry(entry));
            }
            ArrayItem::Opaque(raw) => {
                enc.raw(raw);
            }
        }
    }
    enc.into_bytes()
}
