/***************************************************************************************************
 * Copyright (c) 2021 Jeremy O'Donoghue. All rights reserved.
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
 * CBOR encoder
 *
 * The general-purpose `rs_minicbor`/`tps_minicbor` encoders this is descended from build into a
 * caller-owned fixed buffer and therefore need an `array_start`/`array_finalize` fix-up dance to
 * patch in a length header discovered only after its contents have been written. This subsystem
 * always knows the element count of every array or map before it starts encoding one (the
 * in-memory `Entry`/`LargeBlobArray` types carry their own lengths), so that fix-up machinery is
 * unneeded here: every `*_header` call below takes its length up front.
 **************************************************************************************************/

/// Write one CBOR item head: major type in `0..=7`, and either the item's direct value (for
/// integers) or a declared length (for strings/arrays/maps).
fn write_head(buf: &mut Vec<u8>, major: u8, value: u64) {
    let major_bits = major << 5;
    if value < 24 {
        buf.push(major_bits | value as u8);
    } else if value <= u8::MAX as u64 {
        buf.push(major_bits | 24);
        buf.push(value as u8);
    } else if value <= u16::MAX as u64 {
        buf.push(major_bits | 25);
        buf.extend_from_slice(&(value as u16).to_be_bytes());
    } else if value <= u32::MAX as u64 {
        buf.push(major_bits | 26);
        buf.extend_from_slice(&(value as u32).to_be_bytes());
    } else {
        buf.push(major_bits | 27);
        buf.extend_from_slice(&value.to_be_bytes());
    }
}

/// A append-only CBOR encoder, covering the item shapes required by spec §4.2: unsigned
/// integers, definite-length byte strings, definite-length arrays, and definite-length maps.
#[derive(Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    /// Start a new, empty encoding.
    pub fn new() -> Self {
        Encoder { buf: Vec::new() }
    }

    /// Append an unsigned integer (major type 0).
    pub fn uint(&mut self, value: u64) -> &mut Self {
        write_head(&mut self.buf, 0, value);
        self
    }

    /// Append a definite-length byte string (major type 2).
    pub fn bstr(&mut self, data: &[u8]) -> &mut Self {
        write_head(&mut self.buf, 2, data.len() as u64);
        self.buf.extend_from_slice(data);
        self
    }

    /// Append a definite-length array header (major type 4) declaring `len` following items.
    pub fn array_header(&mut self, len: usize) -> &mut Self {
        write_head(&mut self.buf, 4, len as u64);
        self
    }

    /// Append a definite-length map header (major type 5) declaring `len` following pairs.
    pub fn map_header(&mut self, len: usize) -> &mut Self {
        write_head(&mut self.buf, 5, len as u64);
        self
    }

    /// Append `bytes` verbatim, unparsed. Used to re-emit an already-encoded item (for example
    /// one this process could not fully decode) unchanged.
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// The bytes encoded so far.
    pub fn into_bytes(&self) -> Vec<u8> {
        self.buf.clone()
    }
}
