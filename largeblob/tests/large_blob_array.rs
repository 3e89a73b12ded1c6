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
extern crate largeblob;

use largeblob::{largeblob_get, largeblob_put, largeblob_remove, largeblob_trim, LargeBlobError, LargeBlobKey};
use largeblob_transport::simulated::SimulatedDevice;
use largeblob_transport::RelyingPartyId;

fn key(byte: u8) -> LargeBlobKey {
    LargeBlobKey([byte; 32])
}

#[test]
fn empty_device_reports_not_found_for_any_key() {
    let mut dev = SimulatedDevice::new(256);
    assert!(matches!(largeblob_get(&mut dev, &key(0x01)), Err(LargeBlobError::NotFound)));
}

#[test]
fn put_then_get_recovers_the_plaintext() {
    let mut dev = SimulatedDevice::new(256);
    let k = key(0x11);
    largeblob_put(&mut dev, None, &k, b"hello").unwrap();
    assert_eq!(largeblob_get(&mut dev, &k).unwrap(), b"hello");
}

#[test]
fn different_key_after_a_put_is_not_found() {
    let mut dev = SimulatedDevice::new(256);
    largeblob_put(&mut dev, None, &key(0x11), b"hello").unwrap();
    assert!(matches!(largeblob_get(&mut dev, &key(0x99)), Err(LargeBlobError::NotFound)));
}

#[test]
fn corrupted_trailer_reads_as_not_found_and_the_next_put_repairs_storage() {
    let mut staging = SimulatedDevice::new(256);
    largeblob_put(&mut staging, None, &key(0x11), b"hello").unwrap();
    let mut corrupted = staging.storage().to_vec();
    *corrupted.last_mut().unwrap() ^= 0x01;

    let mut dev = SimulatedDevice::new(256).seed_storage(corrupted);
    assert!(matches!(largeblob_get(&mut dev, &key(0x11)), Err(LargeBlobError::NotFound)));

    largeblob_put(&mut dev, None, &key(0x22), b"fresh array").unwrap();
    assert_eq!(largeblob_get(&mut dev, &key(0x22)).unwrap(), b"fresh array");
}

#[test]
fn last_fragment_of_exactly_the_limit_forces_an_extra_read() {
    // A small maxMsgSize keeps the fragment limit tiny so a realistic payload spans several
    // fragments, including one that lands exactly on the limit boundary.
    let mut dev = SimulatedDevice::new(80);
    let payload = vec![0x42u8; 300];
    largeblob_put(&mut dev, None, &key(0x11), &payload).unwrap();
    assert_eq!(largeblob_get(&mut dev, &key(0x11)).unwrap(), payload);
}

#[test]
fn trim_keeps_resident_entries_and_preserves_undecodable_ones() {
    let mut staging = SimulatedDevice::new(512);
    largeblob_put(&mut staging, None, &key(0x01), b"keep me").unwrap();
    largeblob_put(&mut staging, None, &key(0x02), b"drop me").unwrap();
    largeblob_put(&mut staging, None, &key(0x03), b"unknown owner").unwrap();

    let mut dev = SimulatedDevice::new(512)
        .seed_storage(staging.storage().to_vec())
        .with_resident_credential(RelyingPartyId(b"example.com".to_vec()), Some(key(0x01).0));

    largeblob_trim(&mut dev, None).unwrap();

    assert_eq!(largeblob_get(&mut dev, &key(0x01)).unwrap(), b"keep me");
    assert!(matches!(largeblob_get(&mut dev, &key(0x02)), Err(LargeBlobError::NotFound)));
    assert!(matches!(largeblob_get(&mut dev, &key(0x03)), Err(LargeBlobError::NotFound)));
}

#[test]
fn remove_of_never_written_key_succeeds_as_a_noop() {
    let mut dev = SimulatedDevice::new(256);
    assert!(largeblob_remove(&mut dev, None, &key(0x11)).is_ok());
    assert!(matches!(largeblob_get(&mut dev, &key(0x11)), Err(LargeBlobError::NotFound)));
}

#[test]
fn write_requires_pin_when_the_device_mandates_it() {
    let mut dev = SimulatedDevice::new(256).require_pin(true);
    assert!(largeblob_put(&mut dev, Some(b"1234"), &key(0x11), b"hello").is_ok());
    assert_eq!(largeblob_get(&mut dev, &key(0x11)).unwrap(), b"hello");
}

#[test]
fn write_without_pin_fails_when_the_device_mandates_one() {
    let mut dev = SimulatedDevice::new(256).require_pin(true);
    assert!(matches!(
        largeblob_put(&mut dev, None, &key(0x11), b"hello"),
        Err(LargeBlobError::PinRequired)
    ));
}

#[test]
fn write_succeeds_unauthenticated_when_the_device_permits_it_and_cannot_produce_a_token() {
    let mut dev = SimulatedDevice::new(256).without_uv_token_support();
    assert!(largeblob_put(&mut dev, None, &key(0x11), b"hello").is_ok());
    assert_eq!(largeblob_get(&mut dev, &key(0x11)).unwrap(), b"hello");
}
