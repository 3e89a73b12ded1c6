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
//! The 16-octet SHA-256 truncation trailer appended to a serialized large-blob array (spec §4.6).
//! A missing or mismatched trailer is never an error at this layer; callers treat it as "no
//! array" per spec §4.6/§9.
use largeblob_common::wire;
use sha2::{Digest, Sha256};

fn digest(body: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(body);
    hasher.finalize().into()
}

/// Split `data` (the full bytes read back from the authenticator) into `(body, trailer)`. Returns
/// `None` if `data` is shorter than the trailer itself.
pub fn split_trailer(data: &[u8]) -> Option<(&[u8], &[u8])> {
    if data.len() < wire::TRAILER_LEN {
        return None;
    }
    Some(data.split_at(data.len() - wire::TRAILER_LEN))
}

/// True iff `trailer` is the first 16 octets of SHA-256(`body`), compared in constant time.
pub fn verify(body: &[u8], trailer: &[u8]) -> bool {
    if trailer.len() != wire::TRAILER_LEN {
        return false;
    }
    let expected = digest(body);
    let mut diff = 0u8;
    for (a, b) in expected[..wire::TRAILER_LEN].iter().zip(trailer) {
        diff |= a ^ b;
    }
    diff == 0
}

/// Append the truncation trailer for `body` onto a fresh copy of it.
pub fn append_trailer(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + wire::TRAILER_LEN);
    out.extend_from_slice(body);
    out.extend_from_slice(&digest(body)[..wire::TRAILER_LEN]);
    out
}
