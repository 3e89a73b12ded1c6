/***************************************************************************************************
 * Copyright (c) 2021-2023 Qualcomm Innovation Center, Inc. All rights reserved.
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
 * largeblob-cbor error API
 *
 * A small CBOR encoder/decoder scoped to the item shapes the large-blob array wire format
 * actually uses: unsigned integers, definite-length byte strings, definite-length arrays, and
 * definite-length maps of integer keys.
 **************************************************************************************************/
use std::result;
use thiserror::Error;

/// An alias for `Result<T, CBORError>` used throughout this crate.
pub type Result<T> = result::Result<T, CBORError>;

/// Errors produced while encoding or decoding the large-blob wire shapes.
#[derive(Copy, Clone, Error, Debug, PartialEq, Eq)]
pub enum CBORError {
    /// The buffer ended before the current item could be fully read.
    #[error("unexpected end of CBOR buffer")]
    EndOfBuffer,
    /// The item's major type did not match what the caller expected here.
    #[error("expected CBOR type {0}")]
    ExpectedType(&'static str),
    /// An indefinite-length encoding was found where only definite-length is accepted.
    #[error("indefinite-length encoding is not accepted here")]
    IndefiniteLength,
    /// A negative integer was found where only unsigned integers are accepted.
    #[error("negative integer is not accepted here")]
    NegativeInteger,
    /// The additional-information encoding is reserved or otherwise malformed.
    #[error("malformed additional-information encoding")]
    MalformedEncoding,
    /// A map or array declared more items than remain in the buffer.
    #[error("declared length exceeds remaining buffer")]
    LengthOutOfRange,
    /// The caller's per-pair callback rejected the map being walked.
    #[error("map walk callback failed")]
    CallbackFailed,
}
