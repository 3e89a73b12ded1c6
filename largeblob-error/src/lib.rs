/***************************************************************************************************
 * Copyright (c) 2022 Jeremy O'Donoghue. All rights reserved.
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
 * Common error handling for the large-blob array subsystem.
 **************************************************************************************************/
use thiserror::Error;

/// Set of errors produced by every crate in the large-blob array subsystem.
///
/// Variants correspond to the error taxonomy of the large-blob array specification: a small,
/// closed set of kinds rather than one variant per failing function. Trial-decryption failures
/// during array lookup are *not* represented here - they are expected and are swallowed inside
/// the lookup routine itself.
#[derive(Error, Debug)]
pub enum LargeBlobError {
    /// Bad key length, null/empty required argument, empty plaintext on `put`, a fragment
    /// length of zero, or a write offset that does not fit in 32 bits.
    #[error("invalid argument")]
    InvalidArgument,

    /// Memory exhaustion, CBOR construction failure, or a cryptographic primitive
    /// (SHA-256/HMAC/ECDH/AEAD) reporting internal failure.
    #[error("internal error: {0}")]
    Internal(&'static str),

    /// The transport failed to send a command to the authenticator.
    #[error("transport send failed")]
    Tx,

    /// The transport failed to receive a reply, or the reply was malformed.
    #[error("transport receive failed: {0}")]
    Rx(&'static str),

    /// No array entry decrypts successfully under the caller-supplied key.
    #[error("large-blob key not found")]
    NotFound,

    /// The authenticator requires PIN/UV authorization for this operation.
    #[error("PIN or user verification required")]
    PinRequired,

    /// Any other authenticator-reported CTAP status byte, passed through unchanged.
    #[error("authenticator returned status 0x{0:02x}")]
    Device(u8),
}

/// The CTAP status byte indicating success.
pub const CTAP1_ERR_SUCCESS: u8 = 0x00;
/// The CTAP status byte indicating the authenticator requires PIN/UV auth.
pub const CTAP2_ERR_PIN_REQUIRED: u8 = 0x36;
/// The CTAP status byte indicating no credential/entry matched the request.
pub const CTAP2_ERR_NO_CREDENTIALS: u8 = 0x2e;

/// Convert a CTAP status byte into a `Result`, the way this family of client libraries decodes a
/// reply boundary. `Ok(())` means the device reported success; anything else is mapped into the
/// taxonomy above, falling back to `LargeBlobError::Device` for codes this subsystem does not
/// special-case. Used by every `Transport::rx_status` implementation, including the simulated one.
///
/// Mirrors `tps_error::from_c_error_code`'s shape: a status-to-`Result` free function rather
/// than a `TryFrom` impl, so the success case reads naturally at call sites.
pub fn from_ctap_status(status: u8) -> Result<(), LargeBlobError> {
    match status {
        CTAP1_ERR_SUCCESS => Ok(()),
        CTAP2_ERR_PIN_REQUIRED => Err(LargeBlobError::PinRequired),
        CTAP2_ERR_NO_CREDENTIALS => Err(LargeBlobError::NotFound),
        other => Err(LargeBlobError::Device(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_status_maps_to_ok() {
        assert!(from_ctap_status(CTAP1_ERR_SUCCESS).is_ok());
    }

    #[test]
    fn pin_required_status_maps_to_pin_required() {
        assert!(matches!(
            from_ctap_status(CTAP2_ERR_PIN_REQUIRED),
            Err(LargeBlobError::PinRequired)
        ));
    }

    #[test]
    fn unrecognized_status_passes_through() {
        match from_ctap_status(0x7f) {
            Err(LargeBlobError::Device(0x7f)) => {}
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
