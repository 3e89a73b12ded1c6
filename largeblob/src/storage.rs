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
//! Ties the fragment transport, integrity trailer and array codec together into the two
//! operations every higher-level command builds on: read the whole array, or write it back.
//!
//! `read_array` collapses every way the bytes coming off the wire can fail to be a usable array -
//! too short for a trailer, a trailer mismatch, or a body that doesn't parse as CBOR - into "no
//! array", never an error. A real authenticator that has never stored a large-blob array, and one
//! whose trailer was corrupted by a power loss mid-write, must be indistinguishable to callers.
use largeblob_common::wire;
use largeblob_error::LargeBlobError;
use largeblob_transport::{PinUvAuth, Transport};

use crate::array::{self, ArrayItem};
use crate::{fragment, integrity};

/// Read and parse the large-blob array, tolerating every recoverable failure as "empty".
pub fn read_array<D: Transport>(dev: &mut D) -> Result<Vec<ArrayItem>, LargeBlobError> {
    let data = fragment::read_all(dev)?;
    let Some((body, trailer)) = integrity::split_trailer(&data) else {
        return Ok(Vec::new());
    };
    if !integrity::verify(body, trailer) {
        return Ok(Vec::new());
    }
    Ok(array::parse_items(body).unwrap_or_default())
}

/// Serialize `items`, append the integrity trailer, and write the whole array back.
pub fn write_array<D: Transport + PinUvAuth>(
    dev: &mut D,
    pin: Option<&[u8]>,
    items: &[ArrayItem],
) -> Result<(), LargeBlobError> {
    let body = array::serialize_items(items);
    let trailer = {
        let framed = integrity::append_trailer(&body);
        framed[framed.len() - wire::TRAILER_LEN..].to_vec()
    };
    fragment::write_all(dev, pin, &body, &trailer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use largeblob_common::{wire as w, Entry};
    use largeblob_transport::simulated::SimulatedDevice;

    #[test]
    fn read_of_never_written_device_is_empty() {
        let mut dev = SimulatedDevice::new(256);
        assert!(read_array(&mut dev).unwrap().is_empty());
    }

    #[test]
    fn read_of_corrupt_trailer_is_empty_not_an_error() {
        let mut dev = SimulatedDevice::new(256).seed_storage(vec![0x01, 0x02, 0x03]);
        assert!(read_array(&mut dev).unwrap().is_empty());
    }

    #[test]
    fn write_then_read_round_trips_items() {
        let mut dev = SimulatedDevice::new(200);
        let items = vec![ArrayItem::Decoded(Entry {
            ciphertext: vec![0xabu8; 20],
            nonce: [0x01u8; w::NONCE_LEN],
            orig_size: 5,
        })];
        write_array(&mut dev, None, &items).unwrap();
        assert_eq!(read_array(&mut dev).unwrap(), items);
    }

    #[test]
    fn write_of_empty_array_then_read_is_empty() {
        let mut dev = SimulatedDevice::new(256);
        write_array(&mut dev, None, &[]).unwrap();
        assert!(read_array(&mut dev).unwrap().is_empty());
    }
}
