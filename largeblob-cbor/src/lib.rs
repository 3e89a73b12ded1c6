/***************************************************************************************************
 * Copyright (c) 2020-2022, Qualcomm Innovation Center, Inc. All rights reserved.
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
#![warn(missing_docs)]

//! # largeblob-cbor
//!
//! A small CBOR encoder/decoder scoped to the wire shapes the `authenticatorLargeBlobs` large-blob
//! array uses: unsigned integers, definite-length byte strings, and definite-length maps and
//! arrays with integer keys. Unlike a general-purpose CBOR library, this crate does not support
//! text strings, floats, tags, or indefinite-length encodings - the array is always serialized in
//! one canonical shape (spec §3, §4.2), and narrowing the decoder to exactly that shape narrows
//! the surface exposed to bytes coming back from an untrusted authenticator.

/// CBOR item values used as the decoded form of a map entry's value.
pub mod ast;
/// A cursor-based CBOR decoder.
pub mod decode;
/// An append-only CBOR encoder.
pub mod encode;
/// Error type shared by [`decode`] and [`encode`].
pub mod error;

pub use ast::{MapAction, Value};
pub use decode::Decoder;
pub use encode::Encoder;
pub use error::{CBORError, Result};
