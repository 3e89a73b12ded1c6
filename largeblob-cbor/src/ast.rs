/***************************************************************************************************
 * Copyright (c) 2020-2022 Qualcomm Innovation Center, Inc. All rights reserved.
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
 * CBOR item values
 *
 * The large-blob wire format only ever needs two leaf item types: unsigned integers and byte
 * strings. `Value` is the decoded form of a map entry's value, used by `decode::walk_map`'s
 * callback.
 **************************************************************************************************/

/// A decoded CBOR item value, for the subset of CBOR this crate understands in full.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// A major-type-0 unsigned integer.
    UInt(u64),
    /// A major-type-2 definite-length byte string.
    Bstr(Vec<u8>),
}

impl Value {
    /// Unwrap an unsigned integer, or `None` if this value is a byte string.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::Bstr(_) => None,
        }
    }

    /// Unwrap a byte string, or `None` if this value is an unsigned integer.
    pub fn as_bstr(&self) -> Option<&[u8]> {
        match self {
            Value::Bstr(b) => Some(b.as_slice()),
            Value::UInt(_) => None,
        }
    }
}

/// The outcome of a `decode::walk_map` callback for one `(key, value)` pair (spec §4.2).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MapAction {
    /// Accept this pair and continue walking the map.
    Continue,
    /// This key is not recognized; its value has already been consumed. Continue walking.
    Ignore,
    /// Abort the walk; the map decode fails with `CBORError::CallbackFailed`.
    Fail,
}
