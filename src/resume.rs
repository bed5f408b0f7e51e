//! Resume-point detection
//!
//! An interrupted copy leaves the destination with a byte-identical prefix of
//! the source followed by garbage (or a short file). Instead of re-reading the
//! whole destination, the divergence point is located with a binary search
//! over fixed-size probe blocks: a matching block moves the lower bound up, a
//! differing block moves the upper bound down.
//!
//! The returned offset is the greatest probed offset whose block still
//! matches; resuming there re-copies at most one probe block, which is safe.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{CopierError, CopierResult};

/// Outcome of probing a destination file against its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeCheck {
    /// Destination already matches the source byte for byte
    Complete,
    /// Destination diverges; copying must resume at this offset
    Mismatch(u64),
}

impl ResumeCheck {
    pub fn is_complete(&self) -> bool {
        matches!(self, ResumeCheck::Complete)
    }

    /// Resume offset, or `None` when the file is already complete
    pub fn offset(&self) -> Option<u64> {
        match self {
            ResumeCheck::Complete => None,
            ResumeCheck::Mismatch(offset) => Some(*offset),
        }
    }
}

/// Probe `dest` against `source` and locate the resume offset.
///
/// `block_size` bounds how many bytes each probe reads; the effective block
/// is clamped to the source length so tiny files still work.
pub fn find_resume_position(
    source: &Path,
    dest: &Path,
    block_size: u64,
) -> CopierResult<ResumeCheck> {
    if block_size == 0 {
        return Err(CopierError::InvalidBlockSize);
    }

    let total_size = std::fs::metadata(source)?.len();
    let dest_size = std::fs::metadata(dest)?.len();

    if total_size == 0 {
        return if dest_size == 0 {
            Ok(ResumeCheck::Complete)
        } else {
            Ok(ResumeCheck::Mismatch(0))
        };
    }

    let block = total_size.min(block_size);

    let mut src = File::open(source)?;
    let mut dst = File::open(dest)?;

    // Fast path: identical tail and matching length means the copy finished.
    let tail_offset = total_size - block;
    if dest_size == total_size && !blocks_differ(&mut src, &mut dst, tail_offset, block)? {
        return Ok(ResumeCheck::Complete);
    }

    // Bisect for the greatest offset whose block still matches. `start` is
    // the best known matching offset (0 until proven otherwise).
    let mut start: u64 = 0;
    let mut end: u64 = total_size;
    while start + 1 < end {
        let mid = (start + end) / 2;
        if blocks_differ(&mut src, &mut dst, mid, block)? {
            end = mid;
        } else {
            start = mid;
        }
    }

    Ok(ResumeCheck::Mismatch(start))
}

fn blocks_differ(src: &mut File, dst: &mut File, offset: u64, block: u64) -> CopierResult<bool> {
    let a = read_block(src, offset, block)?;
    let b = read_block(dst, offset, block)?;
    Ok(a != b)
}

/// Read up to `block` bytes at `offset`; a short read (EOF) yields a short
/// buffer, which then compares unequal against a full one.
fn read_block(file: &mut File, offset: u64, block: u64) -> CopierResult<Vec<u8>> {
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; block as usize];
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buf.truncate(filled);
    Ok(buf)
}
