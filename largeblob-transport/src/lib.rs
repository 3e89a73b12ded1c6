/***************************************************************************************************
 * Copyright (c) 2022 Qualcomm Innovation Center, Inc. All rights reserved.
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the “Software”), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all copies or
 * substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
/***************************************************************************************************
 * largeblob-transport
 *
 * Traits for the external collaborators the large-blob array subsystem consumes but does not
 * implement: the CTAP transport, the PIN/UV auth subprotocol, and credential management. Every
 * other crate in the subsystem is in scope for this repository; these three are not, and are
 * represented here purely as interfaces. `simulated` provides an in-memory authenticator
 * implementing all three, used by `largeblob`'s integration tests in place of real hardware.
 **************************************************************************************************/
use largeblob_common::AuthToken;
use largeblob_error::LargeBlobError;

/// A resident credential's relying party identifier, as reported by credential management.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelyingPartyId(pub Vec<u8>);

/// One resident credential enumerated under a relying party.
#[derive(Clone, Debug)]
pub struct ResidentCredential {
    /// The credential's large-blob key, if it has one (spec §4.11: not every credential does).
    pub large_blob_key: Option<[u8; largeblob_common::wire::KEY_LEN]>,
}

/// The CTAP transport: sending a large-blob command and receiving its reply.
///
/// Mirrors the "Transport" external collaborator of spec §6. Implementations own the physical
/// link (USB HID, BLE, NFC, ...); framing below the CTAP CBOR command boundary is out of scope
/// here.
pub trait Transport {
    /// Send one `authenticatorLargeBlobs` command whose CBOR-encoded parameter map is `payload`.
    fn tx(&mut self, payload: &[u8]) -> Result<(), LargeBlobError>;

    /// Receive the authenticator's reply to the most recent [`Transport::tx`], which carries a
    /// CBOR map body (used for large-blob GET replies).
    fn rx(&mut self, timeout_ms: i32) -> Result<Vec<u8>, LargeBlobError>;

    /// Receive a status-only reply (used to acknowledge a large-blob SET chunk).
    fn rx_status(&mut self, timeout_ms: i32) -> Result<(), LargeBlobError>;

    /// The largest message this link can carry in either direction, as advertised by the device.
    fn max_msg_size(&self) -> Result<usize, LargeBlobError>;
}

/// The PIN/UV auth subprotocol: acquiring a token and MACing write fragments under it.
///
/// Mirrors the "PIN/UV" external collaborator of spec §6. PIN protocol *negotiation* (selecting
/// protocol 1 vs 2) is out of scope; this trait only uses whichever protocol a token was already
/// negotiated under (spec §4.8, resolved in SPEC_FULL.md).
pub trait PinUvAuth {
    /// True iff a UV token can be obtained: the device supports it and either a PIN was supplied
    /// or on-device user verification is available.
    fn can_get_uv_token(&self, pin: Option<&[u8]>) -> bool;

    /// Perform ECDH with the device, returning `(platform_public_key, shared_secret)`.
    fn do_ecdh(&mut self) -> Result<(Vec<u8>, Vec<u8>), LargeBlobError>;

    /// Exchange the shared secret for a token scoped to `permission_cmd`, returning the token
    /// and the PIN protocol id it was negotiated under.
    fn get_uv_token(
        &mut self,
        permission_cmd: u8,
        pin: Option<&[u8]>,
        shared_secret: &[u8],
        platform_pk: &[u8],
    ) -> Result<(AuthToken, u8), LargeBlobError>;

    /// MAC `mac_input` (the 70-octet input of spec §4.8) under `token`.
    fn encode_pin_auth(&self, token: &AuthToken, mac_input: &[u8]) -> Result<Vec<u8>, LargeBlobError>;
}

/// Credential management, consumed only by the trimmer (C11).
///
/// Mirrors the "Credential management" external collaborator of spec §6. The rest of CTAP2
/// credential management RPC is out of scope.
pub trait CredentialManagement {
    /// Every relying party with at least one resident credential on the device.
    fn get_rps(&mut self, pin: Option<&[u8]>) -> Result<Vec<RelyingPartyId>, LargeBlobError>;

    /// Every resident credential registered under `rp`.
    fn get_rks(
        &mut self,
        rp: &RelyingPartyId,
        pin: Option<&[u8]>,
    ) -> Result<Vec<ResidentCredential>, LargeBlobError>;
}

/// An in-memory fake authenticator implementing every external collaborator trait, used by
/// integration tests in place of real hardware.
pub mod simulated;
