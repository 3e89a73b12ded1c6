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
//! Raw DEFLATE compression of entry plaintext (spec §4.4), applied before sealing. Decompression
//! is bounded to the caller-supplied `orig_size` so a malicious or corrupt authenticator reply can
//! never coerce an unbounded allocation.
use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use largeblob_common::ByteBuffer;
use largeblob_error::LargeBlobError;

/// Compress `data` with raw DEFLATE (no zlib/gzip framing).
pub fn compress(data: &[u8]) -> Result<Vec<u8>, LargeBlobError> {
    let mut compressor = Compress::new(Compression::default(), false);
    let mut out = Vec::with_capacity(data.len());
    compressor
        .compress_vec(data, &mut out, FlushCompress::Finish)
        .map_err(|_| LargeBlobError::Internal("compression failed"))?;
    Ok(out)
}

/// Decompress `data`, expecting exactly `expected_len` octets of output.
///
/// Returns `Internal` if the stream does not inflate to precisely `expected_len` bytes: a
/// mismatch means the entry's `origSize` field disagrees with the compressed bytes it is
/// supposed to describe, which can only happen to data already authenticated by AEAD if the
/// entry itself is internally malformed.
///
/// The recovered plaintext is the most sensitive value in this subsystem, so it is handed back
/// as a [`ByteBuffer`] (C1) rather than a bare `Vec<u8>`, ensuring it is zeroized once the caller
/// is done with it instead of lingering in a dropped allocation.
pub fn decompress(data: &[u8], expected_len: u64) -> Result<ByteBuffer, LargeBlobError> {
    let expected_len = usize::try_from(expected_len)
        .map_err(|_| LargeBlobError::Internal("origSize exceeds platform address space"))?;
    let mut decompressor = Decompress::new(false);
    let mut out = Vec::with_capacity(expected_len);
    let status = decompressor
        .decompress_vec(data, &mut out, FlushDecompress::Finish)
        .map_err(|_| LargeBlobError::Internal("decompression failed"))?;
    if status != Status::StreamEnd || out.len() != expected_len {
        return Err(LargeBlobError::Internal("decompressed length mismatch"));
    }
    Ok(ByteBuffer::from(out))
}
