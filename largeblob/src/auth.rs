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
//! Per-fragment write authorization (spec §4.8): a PIN/UV auth token is acquired at most once per
//! write operation, then used to MAC every fragment's 70-octet HMAC input. Absence of a token is
//! allowed when the device cannot produce one; whether the authenticator actually accepts the
//! resulting unauthenticated write is for it to decide when the fragment is sent.
use largeblob_common::{wire, AuthToken};
use largeblob_error::LargeBlobError;
use largeblob_transport::PinUvAuth;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// A write operation's authorization token, fetched lazily on the first fragment that needs it
/// and reused for every subsequent fragment of the same write. Acquisition is attempted at most
/// once per write, whether or not it succeeds.
#[derive(Default)]
pub struct TokenCache {
    attempted: bool,
    token: Option<(AuthToken, u8)>,
}

impl TokenCache {
    /// An empty cache holding no token yet.
    pub fn new() -> Self {
        TokenCache { attempted: false, token: None }
    }

    fn ensure<D: PinUvAuth>(
        &mut self,
        dev: &mut D,
        pin: Option<&[u8]>,
    ) -> Result<Option<&(AuthToken, u8)>, LargeBlobError> {
        if !self.attempted {
            self.attempted = true;
            if dev.can_get_uv_token(pin) {
                let (platform_pk, shared_secret) = dev.do_ecdh()?;
                let (token, protocol) =
                    dev.get_uv_token(wire::CMD_LARGE_BLOBS, pin, &shared_secret, &platform_pk)?;
                self.token = Some((token, protocol));
            }
        }
        Ok(self.token.as_ref())
    }
}

fn mac_input(offset: u32, chunk: &[u8]) -> [u8; wire::HMAC_INPUT_LEN] {
    let mut input = [0u8; wire::HMAC_INPUT_LEN];
    input[0..32].fill(0xff);
    input[32] = wire::HMAC_CMD_BYTE;
    input[33] = 0x00;
    input[34..38].copy_from_slice(&offset.to_le_bytes());
    input[38..70].copy_from_slice(Sha256::digest(chunk).as_slice());
    input
}

/// Authorize one write fragment at `offset`, acquiring (and caching) a token on first use.
/// Returns `None`, rather than an error, when the device cannot produce a token at all - the
/// fragment is then sent with no `pinUvAuthParam`/`pinUvAuthProtocol`, and it is up to the
/// authenticator to accept or reject the unauthenticated write.
pub fn authorize_chunk<D: PinUvAuth>(
    dev: &mut D,
    pin: Option<&[u8]>,
    cache: &mut TokenCache,
    offset: u32,
    chunk: &[u8],
) -> Result<Option<(Vec<u8>, u8)>, LargeBlobError> {
    let Some((token, protocol)) = cache.ensure(dev, pin)? else {
        return Ok(None);
    };
    let protocol = *protocol;
    let mut input = mac_input(offset, chunk);
    let mac = dev.encode_pin_auth(token, &input);
    input.zeroize();
    Ok(Some((mac?, protocol)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use largeblob_transport::simulated::SimulatedDevice;

    #[test]
    fn authorizes_against_a_pin_requiring_device() {
        let mut dev = SimulatedDevice::new(256).require_pin(true);
        let mut cache = TokenCache::new();
        let (mac, protocol) = authorize_chunk(&mut dev, Some(b"1234"), &mut cache, 0, b"x")
            .unwrap()
            .unwrap();
        assert_eq!(mac.len(), 32);
        assert_eq!(protocol, 2);
    }

    #[test]
    fn omits_auth_when_device_cannot_produce_a_token() {
        let mut dev = SimulatedDevice::new(256).require_pin(true).without_uv_token_support();
        let mut cache = TokenCache::new();
        assert!(authorize_chunk(&mut dev, None, &mut cache, 0, b"x").unwrap().is_none());
    }

    #[test]
    fn token_is_fetched_at_most_once_per_cache() {
        let mut dev = SimulatedDevice::new(256).require_pin(true);
        let mut cache = TokenCache::new();
        let (first, _) = authorize_chunk(&mut dev, Some(b"1234"), &mut cache, 0, b"x").unwrap().unwrap();
        let (second, _) = authorize_chunk(&mut dev, Some(b"1234"), &mut cache, 4, b"y").unwrap().unwrap();
        assert_ne!(first, second); // different offset/chunk => different MAC, same token
    }
}
