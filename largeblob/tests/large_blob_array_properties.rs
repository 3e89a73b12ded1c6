#![allow(missing_docs)]

use largeblob::{largeblob_get, largeblob_put, largeblob_remove, LargeBlobError, LargeBlobKey};
use largeblob_transport::simulated::SimulatedDevice;
use proptest::prelude::*;

fn key_from(byte: u8) -> LargeBlobKey {
    LargeBlobKey([byte; 32])
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    // get(put(key, plaintext)) == plaintext, for any non-empty plaintext.
    #[test]
    fn get_after_put_recovers_plaintext(
        key_byte in any::<u8>(),
        plaintext in proptest::collection::vec(any::<u8>(), 1..512),
    ) {
        let mut dev = SimulatedDevice::new(200);
        let k = key_from(key_byte);
        largeblob_put(&mut dev, None, &k, &plaintext).unwrap();
        prop_assert_eq!(largeblob_get(&mut dev, &k).unwrap(), plaintext);
    }

    // Writing the same key twice leaves exactly one recoverable entry holding the latest value.
    #[test]
    fn repeated_put_is_idempotent_in_effect(
        key_byte in any::<u8>(),
        first in proptest::collection::vec(any::<u8>(), 1..128),
        second in proptest::collection::vec(any::<u8>(), 1..128),
    ) {
        let mut dev = SimulatedDevice::new(200);
        let k = key_from(key_byte);
        largeblob_put(&mut dev, None, &k, &first).unwrap();
        largeblob_put(&mut dev, None, &k, &second).unwrap();
        prop_assert_eq!(largeblob_get(&mut dev, &k).unwrap(), second);
    }

    // remove(put(key, plaintext)) always leaves the key unrecoverable.
    #[test]
    fn remove_after_put_is_not_found(
        key_byte in any::<u8>(),
        plaintext in proptest::collection::vec(any::<u8>(), 1..256),
    ) {
        let mut dev = SimulatedDevice::new(200);
        let k = key_from(key_byte);
        largeblob_put(&mut dev, None, &k, &plaintext).unwrap();
        largeblob_remove(&mut dev, None, &k).unwrap();
        prop_assert!(matches!(largeblob_get(&mut dev, &k), Err(LargeBlobError::NotFound)));
    }

    // Removing a key that was never written is always a successful no-op.
    #[test]
    fn remove_of_absent_key_never_errors(key_byte in any::<u8>()) {
        let mut dev = SimulatedDevice::new(200);
        prop_assert!(largeblob_remove(&mut dev, None, &key_from(key_byte)).is_ok());
    }

    // A distinct key never recovers another key's plaintext.
    #[test]
    fn distinct_keys_do_not_collide(
        key_a in any::<u8>(),
        key_b in any::<u8>(),
        plaintext in proptest::collection::vec(any::<u8>(), 1..128),
    ) {
        prop_assume!(key_a != key_b);
        let mut dev = SimulatedDevice::new(200);
        largeblob_put(&mut dev, None, &key_from(key_a), &plaintext).unwrap();
        prop_assert!(matches!(largeblob_get(&mut dev, &key_from(key_b)), Err(LargeBlobError::NotFound)));
    }
}
