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
//! Fragmented read and write of the serialized large-blob array over `authenticatorLargeBlobs`
//! (spec §4, §6). The fragment size is derived once per operation from the device's advertised
//! `maxMsgSize`, capped at the CTAPHID wire ceiling.
use largeblob_cbor::{Decoder, Encoder, MapAction, Value};
use largeblob_common::wire;
use largeblob_error::LargeBlobError;
use largeblob_transport::{PinUvAuth, Transport};

use crate::auth::{authorize_chunk, TokenCache};

const RX_TIMEOUT_MS: i32 = -1;

/// The maximum number of body octets carried in one fragment, derived from the device's
/// advertised `maxMsgSize` (spec §6). Fails `InvalidArgument` if the device's limit leaves no
/// room for the fixed CBOR/command overhead.
pub fn compute_fragment_limit<D: Transport>(dev: &D) -> Result<usize, LargeBlobError> {
    let advertised = dev.max_msg_size()?;
    let capped = advertised.min(wire::MAX_WIRE);
    capped.checked_sub(64).filter(|&l| l > 0).ok_or(LargeBlobError::InvalidArgument)
}

fn decode_get_reply(reply: &[u8]) -> Result<Vec<u8>, LargeBlobError> {
    let mut fragment: Option<Vec<u8>> = None;
    let mut dec = Decoder::new(reply);
    dec.walk_map(|key, value| match (key as u32, value) {
        (wire::KEY_GET, Some(Value::Bstr(b))) => {
            fragment = Some(b.clone());
            MapAction::Continue
        }
        _ => MapAction::Ignore,
    })
    .map_err(|_| LargeBlobError::Rx("malformed large-blob GET reply"))?;
    fragment.ok_or(LargeBlobError::Rx("GET reply missing fragment"))
}

/// Read the whole serialized array (body plus trailer) from the device, one fragment at a time.
pub fn read_all<D: Transport>(dev: &mut D) -> Result<Vec<u8>, LargeBlobError> {
    let limit = compute_fragment_limit(dev)?;
    let mut out = Vec::new();
    loop {
        let mut enc = Encoder::new();
        enc.map_header(2);
        enc.uint(wire::KEY_GET as u64).uint(limit as u64);
        enc.uint(wire::KEY_LENGTH_OR_OFFSET as u64).uint(out.len() as u64);
        dev.tx(&enc.into_bytes()).map_err(|_| LargeBlobError::Tx)?;
        let reply = dev.rx(RX_TIMEOUT_MS)?;
        let fragment = decode_get_reply(&reply)?;

        let got = fragment.len();
        if got > limit {
            return Err(LargeBlobError::Rx("GET reply fragment longer than requested"));
        }
        out.extend_from_slice(&fragment);
        if got < limit {
            break;
        }
    }
    Ok(out)
}

/// Write the whole serialized array (body plus trailer) to the device, one fragment at a time,
/// each authorized under a PIN/UV auth token when the device can produce one (spec §4.8); keys 4
/// and 5 are omitted entirely otherwise. The trailing 16-octet digest is always sent as its own
/// final fragment, never merged into the last body chunk (spec §4.7).
pub fn write_all<D: Transport + PinUvAuth>(
    dev: &mut D,
    pin: Option<&[u8]>,
    body: &[u8],
    trailer: &[u8],
) -> Result<(), LargeBlobError> {
    let limit = compute_fragment_limit(dev)?;
    let total_len = body
        .len()
        .checked_add(trailer.len())
        .ok_or(LargeBlobError::InvalidArgument)?;

    let mut cache = TokenCache::new();
    let mut offset: usize = 0;
    for chunk in body.chunks(limit).chain(std::iter::once(trailer)) {
        let offset_u32: u32 = offset.try_into().map_err(|_| LargeBlobError::InvalidArgument)?;
        let auth = authorize_chunk(dev, pin, &mut cache, offset_u32, chunk)?;

        let mut field_count = 2;
        if offset == 0 {
            field_count += 1;
        }
        if auth.is_some() {
            field_count += 2;
        }

        let mut enc = Encoder::new();
        enc.map_header(field_count);
        enc.uint(wire::KEY_SET as u64).bstr(chunk);
        enc.uint(wire::KEY_OFFSET as u64).uint(offset as u64);
        if offset == 0 {
            enc.uint(wire::KEY_LENGTH_OR_OFFSET as u64).uint(total_len as u64);
        }
        if let Some((mac, protocol)) = &auth {
            enc.uint(wire::KEY_PIN_UV_AUTH_PARAM as u64).bstr(mac);
            enc.uint(wire::KEY_PIN_UV_AUTH_PROTOCOL as u64).uint(*protocol as u64);
        }

        dev.tx(&enc.into_bytes()).map_err(|_| LargeBlobError::Tx)?;
        dev.rx_status(RX_TIMEOUT_MS)?;
        offset += chunk.len();
    }
    Ok(())
}
