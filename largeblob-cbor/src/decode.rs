/***************************************************************************************************
 * Copyright (c) 2020-2023 Qualcomm Innovation Center, Inc. All rights reserved.
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
 * CBOR decoder
 *
 * Reads the subset of RFC 8949 this subsystem's wire format uses: unsigned integers,
 * definite-length byte strings, definite-length arrays, and definite-length maps of integer
 * keys. Indefinite-length encodings are rejected outright rather than supported - the large-blob
 * array is always serialized with definite lengths (spec §3), and accepting indefinite lengths
 * here would only widen the attack surface presented to an untrusted authenticator's reply.
 **************************************************************************************************/
use crate::ast::{MapAction, Value};
use crate::error::{CBORError, Result};

/// Decode one item head (major type, additional-info-derived value, and the position just past
/// the head) at `pos`. Does not mutate any cursor; callers decide whether to advance.
fn read_head(buf: &[u8], pos: usize) -> Result<(u8, u64, usize)> {
    let b0 = *buf.get(pos).ok_or(CBORError::EndOfBuffer)?;
    let major = b0 >> 5;
    let info = b0 & 0x1f;
    match info {
        0..=23 => Ok((major, info as u64, pos + 1)),
        24 => {
            let b = *buf.get(pos + 1).ok_or(CBORError::EndOfBuffer)?;
            Ok((major, b as u64, pos + 2))
        }
        25 => {
            let bytes = buf.get(pos + 1..pos + 3).ok_or(CBORError::EndOfBuffer)?;
            Ok((major, u16::from_be_bytes(bytes.try_into().unwrap()) as u64, pos + 3))
        }
        26 => {
            let bytes = buf.get(pos + 1..pos + 5).ok_or(CBORError::EndOfBuffer)?;
            Ok((major, u32::from_be_bytes(bytes.try_into().unwrap()) as u64, pos + 5))
        }
        27 => {
            let bytes = buf.get(pos + 1..pos + 9).ok_or(CBORError::EndOfBuffer)?;
            Ok((major, u64::from_be_bytes(bytes.try_into().unwrap()), pos + 9))
        }
        28..=30 => Err(CBORError::MalformedEncoding),
        31 => Err(CBORError::IndefiniteLength),
        _ => unreachable!("additional info is a 5-bit field"),
    }
}

/// A cursor over a borrowed CBOR byte sequence.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    /// Construct a decoder positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Decoder { buf, pos: 0 }
    }

    /// The cursor's current byte offset into the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// True iff the cursor has consumed the whole buffer.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// The bytes not yet consumed by this cursor.
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Read an unsigned integer (major type 0). Rejects negative integers and indefinite forms.
    pub fn read_uint(&mut self) -> Result<u64> {
        let (major, value, new_pos) = read_head(self.buf, self.pos)?;
        match major {
            0 => {
                self.pos = new_pos;
                Ok(value)
            }
            1 => Err(CBORError::NegativeInteger),
            _ => Err(CBORError::ExpectedType("unsigned integer")),
        }
    }

    /// Read a definite-length byte string (major type 2) into a freshly owned `Vec<u8>`.
    pub fn read_bstr(&mut self) -> Result<Vec<u8>> {
        let buf = self.buf;
        let (major, len, new_pos) = read_head(buf, self.pos)?;
        if major != 2 {
            return Err(CBORError::ExpectedType("byte string"));
        }
        let len = len as usize;
        let end = new_pos.checked_add(len).ok_or(CBORError::LengthOutOfRange)?;
        let bytes = buf.get(new_pos..end).ok_or(CBORError::EndOfBuffer)?;
        self.pos = end;
        Ok(bytes.to_vec())
    }

    /// Read a definite-length array header (major type 4), returning its element count.
    pub fn read_array_header(&mut self) -> Result<usize> {
        let (major, len, new_pos) = read_head(self.buf, self.pos)?;
        if major != 4 {
            return Err(CBORError::ExpectedType("array"));
        }
        self.pos = new_pos;
        Ok(len as usize)
    }

    /// Read a definite-length map header (major type 5), returning its pair count.
    pub fn read_map_header(&mut self) -> Result<usize> {
        let (major, len, new_pos) = read_head(self.buf, self.pos)?;
        if major != 5 {
            return Err(CBORError::ExpectedType("map"));
        }
        self.pos = new_pos;
        Ok(len as usize)
    }

    /// Skip exactly one well-formed CBOR data item of any major type, without interpreting it.
    /// Used to discard the value belonging to an unrecognized map key: spec §4.2/§4.5 require
    /// that unknown keys be tolerated rather than rejected, which in a zero-copy decoder means
    /// the reader must still know how to walk past whatever value accompanies them.
    pub fn skip_item(&mut self) -> Result<()> {
        let (major, value, new_pos) = read_head(self.buf, self.pos)?;
        self.pos = new_pos;
        match major {
            0 | 1 | 7 => Ok(()), // integers, simple values and floats: head is the whole item
            2 | 3 => {
                let len = value as usize;
                let end = self.pos.checked_add(len).ok_or(CBORError::LengthOutOfRange)?;
                if end > self.buf.len() {
                    return Err(CBORError::EndOfBuffer);
                }
                self.pos = end;
                Ok(())
            }
            4 => {
                for _ in 0..value {
                    self.skip_item()?;
                }
                Ok(())
            }
            5 => {
                for _ in 0..value {
                    self.skip_item()?; // key
                    self.skip_item()?; // value
                }
                Ok(())
            }
            6 => self.skip_item(), // tag: exactly one tagged item follows
            _ => Err(CBORError::MalformedEncoding),
        }
    }

    /// Decode the next item as a `Value` if it is an unsigned integer or a byte string;
    /// otherwise skip over it and return `None`.
    fn decode_optional_value(&mut self) -> Result<Option<Value>> {
        let (major, _, _) = read_head(self.buf, self.pos)?;
        match major {
            0 => Ok(Some(Value::UInt(self.read_uint()?))),
            2 => Ok(Some(Value::Bstr(self.read_bstr()?))),
            _ => {
                self.skip_item()?;
                Ok(None)
            }
        }
    }

    /// Walk a definite-length map of integer keys (spec §4.2), invoking `f(key, value)` for
    /// each pair in order. `value` is `None` when the corresponding value was not an unsigned
    /// integer or byte string (it has already been skipped). `f` returns whether to continue,
    /// ignore-and-continue, or abort the walk.
    pub fn walk_map<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(u64, Option<&Value>) -> MapAction,
    {
        let count = self.read_map_header()?;
        for _ in 0..count {
            let key = self.read_uint()?;
            let value = self.decode_optional_value()?;
            match f(key, value.as_ref()) {
                MapAction::Continue | MapAction::Ignore => {}
                MapAction::Fail => return Err(CBORError::CallbackFailed),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::Encoder;

    #[test]
    fn round_trips_uint() {
        let bytes = Encoder::new().uint(1234).into_bytes();
        let mut d = Decoder::new(&bytes);
        assert_eq!(d.read_uint().unwrap(), 1234);
        assert!(d.is_empty());
    }

    #[test]
    fn round_trips_bstr() {
        let bytes = Encoder::new().bstr(b"hello world").into_bytes();
        let mut d = Decoder::new(&bytes);
        assert_eq!(d.read_bstr().unwrap(), b"hello world");
    }

    #[test]
    fn rejects_negative_integer_as_uint() {
        // major type 1, value 0 => CBOR -1
        let bytes = [0x20u8];
        let mut d = Decoder::new(&bytes);
        assert_eq!(d.read_uint(), Err(CBORError::NegativeInteger));
    }

    #[test]
    fn rejects_indefinite_length() {
        let bytes = [0x5fu8]; // indefinite-length byte string head
        let mut d = Decoder::new(&bytes);
        assert_eq!(d.read_bstr(), Err(CBORError::IndefiniteLength));
    }

    #[test]
    fn walk_map_ignores_unknown_keys() {
        let mut enc = Encoder::new();
        enc.map_header(2);
        enc.uint(1).bstr(b"known");
        enc.uint(99).array_header(1); // unknown key, array-typed value
        enc.uint(7);
        let bytes = enc.into_bytes();

        let mut d = Decoder::new(&bytes);
        let mut seen_known = false;
        let mut seen_unknown = false;
        d.walk_map(|key, value| {
            match key {
                1 => {
                    seen_known = true;
                    assert_eq!(value.unwrap().as_bstr(), Some(b"known".as_slice()));
                    MapAction::Continue
                }
                99 => {
                    seen_unknown = true;
                    assert!(value.is_none());
                    MapAction::Ignore
                }
                _ => MapAction::Fail,
            }
        })
        .unwrap();
        assert!(seen_known && seen_unknown);
    }

    #[test]
    fn walk_map_propagates_callback_failure() {
        let mut enc = Encoder::new();
        enc.map_header(1);
        enc.uint(5).uint(6);
        let bytes = enc.into_bytes();

        let mut d = Decoder::new(&bytes);
        let result = d.walk_map(|_, _| MapAction::Fail);
        assert_eq!(result, Err(CBORError::CallbackFailed));
    }
}
