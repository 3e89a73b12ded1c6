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
/// A minimal reference "Secure Component" standing in for a real authenticator: an in-memory
/// byte store reachable only through the large-blob CBOR commands, used to exercise the client
/// crate without hardware. The ECDH key agreement of spec §4.8 is collapsed to a single shared
/// token known to both sides - this is a test double, not a key-exchange implementation.
use hmac::{Hmac, Mac};
use largeblob_cbor::{Decoder, Encoder, MapAction, Value};
use largeblob_common::{wire, AuthToken};
use largeblob_error::{from_ctap_status, LargeBlobError, CTAP1_ERR_SUCCESS};
use sha2::{Digest, Sha256};

use crate::{CredentialManagement, PinUvAuth, RelyingPartyId, ResidentCredential, Transport};

type HmacSha256 = Hmac<Sha256>;

enum Pending {
    Get(Vec<u8>),
    /// The raw CTAP status byte the device would put on the wire, decoded through
    /// `from_ctap_status` at the `rx_status` reply boundary.
    Status(u8),
}

/// An in-memory fake authenticator implementing [`Transport`], [`PinUvAuth`] and
/// [`CredentialManagement`].
pub struct SimulatedDevice {
    storage: Vec<u8>,
    write_buffer: Vec<u8>,
    max_msg_size: usize,
    require_pin: bool,
    supports_uv_token: bool,
    get_overflow: usize,
    token_key: [u8; 32],
    resident_credentials: Vec<(RelyingPartyId, Vec<ResidentCredential>)>,
    pending: Option<Pending>,
}

impl SimulatedDevice {
    /// A freshly provisioned device: empty storage, `max_msg_size` advertised, no PIN required.
    pub fn new(max_msg_size: usize) -> Self {
        SimulatedDevice {
            storage: Vec::new(),
            write_buffer: Vec::new(),
            max_msg_size,
            require_pin: false,
            supports_uv_token: true,
            get_overflow: 0,
            token_key: [0x5au8; 32],
            resident_credentials: Vec::new(),
            pending: None,
        }
    }

    /// Require a PIN (or equivalent) to be supplied before honoring write fragments.
    pub fn require_pin(mut self, required: bool) -> Self {
        self.require_pin = required;
        self
    }

    /// Make the device unable to produce a PIN/UV auth token at all, regardless of whether a PIN
    /// is supplied - exercises the spec §4.8 unauthenticated-write path on the client.
    pub fn without_uv_token_support(mut self) -> Self {
        self.supports_uv_token = false;
        self
    }

    /// Make every GET reply carry `extra` octets more than the caller requested, to exercise the
    /// client's oversized-fragment rejection. A misbehaving-device test fixture only.
    pub fn overflowing_get(mut self, extra: usize) -> Self {
        self.get_overflow = extra;
        self
    }

    /// Seed the device's large-blob storage directly, bypassing the write protocol (used to set
    /// up corrupt-trailer and pre-populated-array test fixtures).
    pub fn seed_storage(mut self, bytes: Vec<u8>) -> Self {
        self.storage = bytes;
        self
    }

    /// Register a resident credential under `rp`, for [`CredentialManagement`] enumeration.
    pub fn with_resident_credential(
        mut self,
        rp: RelyingPartyId,
        large_blob_key: Option<[u8; wire::KEY_LEN]>,
    ) -> Self {
        let credential = ResidentCredential { large_blob_key };
        match self.resident_credentials.iter_mut().find(|(candidate, _)| candidate == &rp) {
            Some((_, creds)) => creds.push(credential),
            None => self.resident_credentials.push((rp, vec![credential])),
        }
        self
    }

    /// The raw bytes currently held by the device (serialized array plus trailer, or whatever
    /// was last seeded/written). Exposed for test assertions.
    pub fn storage(&self) -> &[u8] {
        &self.storage
    }

    fn verify_pin_auth(&self, offset: u64, chunk: &[u8], pin_auth: &[u8]) -> Result<(), LargeBlobError> {
        let expected = self.compute_mac(offset, chunk)?;
        if expected == pin_auth {
            Ok(())
        } else {
            Err(LargeBlobError::PinRequired)
        }
    }

    fn compute_mac(&self, offset: u64, chunk: &[u8]) -> Result<Vec<u8>, LargeBlobError> {
        let mut input = [0u8; wire::HMAC_INPUT_LEN];
        input[0..32].fill(0xff);
        input[32] = wire::HMAC_CMD_BYTE;
        input[33] = 0x00;
        let offset: u32 = offset
            .try_into()
            .map_err(|_| LargeBlobError::InvalidArgument)?;
        input[34..38].copy_from_slice(&offset.to_le_bytes());
        input[38..70].copy_from_slice(Sha256::digest(chunk).as_slice());

        let mut mac = HmacSha256::new_from_slice(&self.token_key)
            .map_err(|_| LargeBlobError::Internal("hmac key"))?;
        mac.update(&input);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn handle_get(&mut self, count: u64, offset: u64) -> Result<(), LargeBlobError> {
        let offset = offset as usize;
        let count = count as usize;
        let available = self.storage.get(offset..).unwrap_or(&[]);
        let take = available.len().min(count + self.get_overflow);
        let fragment = &available[..take];

        let mut enc = Encoder::new();
        enc.map_header(1);
        enc.uint(1).bstr(fragment);
        tracing::trace!(offset, count, returned = fragment.len(), "simulated GET fragment");
        self.pending = Some(Pending::Get(enc.into_bytes()));
        Ok(())
    }

    fn handle_set(
        &mut self,
        chunk: &[u8],
        offset: u64,
        total_len: Option<u64>,
        pin_auth: Option<&[u8]>,
    ) -> Result<(), LargeBlobError> {
        if self.require_pin {
            let pin_auth = pin_auth.ok_or(LargeBlobError::PinRequired)?;
            self.verify_pin_auth(offset, chunk, pin_auth)?;
        }
        if offset == 0 {
            let total_len = total_len.ok_or(LargeBlobError::InvalidArgument)?;
            self.write_buffer = vec![0u8; total_len as usize];
        }
        let offset = offset as usize;
        let end = offset
            .checked_add(chunk.len())
            .ok_or(LargeBlobError::InvalidArgument)?;
        if end > self.write_buffer.len() {
            return Err(LargeBlobError::InvalidArgument);
        }
        self.write_buffer[offset..end].copy_from_slice(chunk);
        tracing::trace!(offset, len = chunk.len(), total = self.write_buffer.len(), "simulated SET fragment");
        if end == self.write_buffer.len() {
            self.storage = std::mem::take(&mut self.write_buffer);
        }
        self.pending = Some(Pending::Status(CTAP1_ERR_SUCCESS));
        Ok(())
    }

    fn handle_command(&mut self, payload: &[u8]) -> Result<(), LargeBlobError> {
        let mut dec = Decoder::new(payload);
        let mut key1_uint: Option<u64> = None;
        let mut key1_bstr: Option<Vec<u8>> = None;
        let mut key2: Option<u64> = None;
        let mut key3: Option<u64> = None;
        let mut pin_auth: Option<Vec<u8>> = None;

        dec.walk_map(|key, value| match (key, value) {
            (1, Some(Value::UInt(v))) => {
                key1_uint = Some(*v);
                MapAction::Continue
            }
            (1, Some(Value::Bstr(b))) => {
                key1_bstr = Some(b.to_vec());
                MapAction::Continue
            }
            (2, Some(Value::UInt(v))) => {
                key2 = Some(*v);
                MapAction::Continue
            }
            (3, Some(Value::UInt(v))) => {
                key3 = Some(*v);
                MapAction::Continue
            }
            (4, Some(Value::Bstr(b))) => {
                pin_auth = Some(b.to_vec());
                MapAction::Continue
            }
            _ => MapAction::Ignore,
        })
        .map_err(|_| LargeBlobError::Rx("malformed large-blob command"))?;

        if let Some(count) = key1_uint {
            self.handle_get(count, key3.unwrap_or(0))
        } else if let Some(chunk) = key1_bstr {
            self.handle_set(&chunk, key2.unwrap_or(0), key3, pin_auth.as_deref())
        } else {
            Err(LargeBlobError::Rx("command carried neither count nor chunk"))
        }
    }
}

impl Transport for SimulatedDevice {
    fn tx(&mut self, payload: &[u8]) -> Result<(), LargeBlobError> {
        self.handle_command(payload)
    }

    fn rx(&mut self, _timeout_ms: i32) -> Result<Vec<u8>, LargeBlobError> {
        match self.pending.take() {
            Some(Pending::Get(bytes)) => Ok(bytes),
            _ => Err(LargeBlobError::Rx("no pending GET reply")),
        }
    }

    fn rx_status(&mut self, _timeout_ms: i32) -> Result<(), LargeBlobError> {
        match self.pending.take() {
            Some(Pending::Status(code)) => from_ctap_status(code),
            _ => Err(LargeBlobError::Rx("no pending status reply")),
        }
    }

    fn max_msg_size(&self) -> Result<usize, LargeBlobError> {
        Ok(self.max_msg_size)
    }
}

impl PinUvAuth for SimulatedDevice {
    fn can_get_uv_token(&self, pin: Option<&[u8]>) -> bool {
        self.supports_uv_token && (!self.require_pin || pin.is_some())
    }

    fn do_ecdh(&mut self) -> Result<(Vec<u8>, Vec<u8>), LargeBlobError> {
        let mut platform_pk = vec![0u8; 32];
        getrandom::getrandom(&mut platform_pk).map_err(|_| LargeBlobError::Internal("rng failure"))?;
        Ok((platform_pk, self.token_key.to_vec()))
    }

    fn get_uv_token(
        &mut self,
        _permission_cmd: u8,
        pin: Option<&[u8]>,
        _shared_secret: &[u8],
        _platform_pk: &[u8],
    ) -> Result<(AuthToken, u8), LargeBlobError> {
        if self.require_pin && pin.is_none() {
            return Err(LargeBlobError::PinRequired);
        }
        Ok((AuthToken(self.token_key.to_vec()), 2))
    }

    fn encode_pin_auth(&self, token: &AuthToken, mac_input: &[u8]) -> Result<Vec<u8>, LargeBlobError> {
        let mut mac = HmacSha256::new_from_slice(token.as_bytes())
            .map_err(|_| LargeBlobError::Internal("hmac key"))?;
        mac.update(mac_input);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl CredentialManagement for SimulatedDevice {
    fn get_rps(&mut self, _pin: Option<&[u8]>) -> Result<Vec<RelyingPartyId>, LargeBlobError> {
        Ok(self.resident_credentials.iter().map(|(rp, _)| rp.clone()).collect())
    }

    fn get_rks(
        &mut self,
        rp: &RelyingPartyId,
        _pin: Option<&[u8]>,
    ) -> Result<Vec<ResidentCredential>, LargeBlobError> {
        Ok(self
            .resident_credentials
            .iter()
            .find(|(candidate, _)| candidate == rp)
            .map(|(_, creds)| creds.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_device_returns_short_first_fragment() {
        let mut dev = SimulatedDevice::new(256);
        let mut enc = Encoder::new();
        enc.map_header(2);
        enc.uint(1).uint(100);
        enc.uint(3).uint(0);
        dev.tx(&enc.into_bytes()).unwrap();
        let reply = dev.rx(-1).unwrap();
        let mut d = Decoder::new(&reply);
        assert_eq!(d.read_map_header().unwrap(), 1);
        assert_eq!(d.read_uint().unwrap(), 1);
        assert!(d.read_bstr().unwrap().is_empty());
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut dev = SimulatedDevice::new(256);
        let payload = b"seeded-array-bytes";

        let mut set_enc = Encoder::new();
        set_enc.map_header(3);
        set_enc.uint(1).bstr(payload);
        set_enc.uint(2).uint(0);
        set_enc.uint(3).uint(payload.len() as u64);
        dev.tx(&set_enc.into_bytes()).unwrap();
        dev.rx_status(-1).unwrap();

        assert_eq!(dev.storage(), payload.as_slice());
    }

    #[test]
    fn rejects_write_with_wrong_mac_when_pin_required() {
        let mut dev = SimulatedDevice::new(256).require_pin(true);
        let mut set_enc = Encoder::new();
        set_enc.map_header(4);
        set_enc.uint(1).bstr(b"x");
        set_enc.uint(2).uint(0);
        set_enc.uint(3).uint(1);
        set_enc.uint(4).bstr(&[0u8; 32]);
        let result = dev.tx(&set_enc.into_bytes());
        assert!(matches!(result, Err(LargeBlobError::PinRequired)));
    }

    #[test]
    fn accepts_write_with_correct_mac() {
        let mut dev = SimulatedDevice::new(256).require_pin(true);
        let token = AuthToken(dev.token_key.to_vec());

        let mut input = [0u8; wire::HMAC_INPUT_LEN];
        input[0..32].fill(0xff);
        input[32] = wire::HMAC_CMD_BYTE;
        input[34..38].copy_from_slice(&0u32.to_le_bytes());
        input[38..70].copy_from_slice(Sha256::digest(b"x").as_slice());

        let mac = dev.compute_mac(0, b"x").unwrap();
        assert_eq!(mac, dev.encode_pin_auth(&token, &input).unwrap());

        let mut set_enc = Encoder::new();
        set_enc.map_header(4);
        set_enc.uint(1).bstr(b"x");
        set_enc.uint(2).uint(0);
        set_enc.uint(3).uint(1);
        set_enc.uint(4).bstr(&mac);
        dev.tx(&set_enc.into_bytes()).unwrap();
        dev.rx_status(-1).unwrap();
        assert_eq!(dev.storage(), b"x");
    }
}
