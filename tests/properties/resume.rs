//! Property tests for resume detection and the copy engine.

use std::fs;

use proptest::prelude::*;
use tempfile::tempdir;

use copier::cache::CopyCache;
use copier::copy::{CopyOptions, Copier};
use copier::resume::{find_resume_position, ResumeCheck};

fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Destination = matching prefix of `len` source bytes up to `keep`, then
/// `junk` bytes that differ from the source at every position.
fn diverged_dest(source: &[u8], keep: usize, junk: usize) -> Vec<u8> {
    let mut dest = source[..keep].to_vec();
    for i in 0..junk {
        let src_byte = source.get(keep + i).copied().unwrap_or(0);
        dest.push(!src_byte);
    }
    dest
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: After a copy over any diverged destination, the destination
    /// is byte-identical to the source.
    #[test]
    fn property_copy_converges_on_source(
        len in 1usize..4000,
        keep_ratio in 0.0f64..1.0,
        junk in 0usize..512,
        block in 1u64..128,
    ) {
        let dir = tempdir().unwrap();
        let source_bytes = patterned(len);
        let keep = ((len as f64) * keep_ratio) as usize;

        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        fs::write(&src, &source_bytes).unwrap();
        fs::write(&dst, diverged_dest(&source_bytes, keep, junk)).unwrap();

        let mut options = CopyOptions::default();
        options.block_size = block;
        options.chunk_size = 256;
        let mut copier = Copier::new(options, CopyCache::load(dir.path().join("cache.json")));

        copier.copy_file(&src, &dst, &mut |_| {}).unwrap();

        prop_assert_eq!(fs::read(&dst).unwrap(), source_bytes);
    }

    /// PROPERTY: The resume offset never lies beyond the end of the matching
    /// prefix, except for at most one probe block of slack.
    #[test]
    fn property_resume_offset_stays_within_prefix(
        len in 2usize..4000,
        keep_ratio in 0.0f64..1.0,
        block in 1u64..128,
    ) {
        let dir = tempdir().unwrap();
        let source_bytes = patterned(len);
        // Keep strictly less than the full file so a divergence exists.
        let keep = (((len - 1) as f64) * keep_ratio) as usize;

        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        fs::write(&src, &source_bytes).unwrap();
        fs::write(&dst, diverged_dest(&source_bytes, keep, len - keep)).unwrap();

        let check = find_resume_position(&src, &dst, block).unwrap();
        match check {
            ResumeCheck::Complete => prop_assert!(keep == len),
            ResumeCheck::Mismatch(offset) => {
                // A matching probe block at `offset` fits inside the prefix,
                // or the search never found one and fell back to 0.
                let effective_block = block.min(len as u64);
                prop_assert!(
                    offset == 0 || offset + effective_block <= keep as u64,
                    "offset {} with block {} escapes prefix of {}",
                    offset,
                    effective_block,
                    keep
                );
            }
        }
    }

    /// PROPERTY: Probing never panics, whatever the destination looks like.
    #[test]
    fn property_probe_never_panics(
        source_bytes in proptest::collection::vec(any::<u8>(), 0..2000),
        dest_bytes in proptest::collection::vec(any::<u8>(), 0..2000),
        block in 1u64..256,
    ) {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        fs::write(&src, &source_bytes).unwrap();
        fs::write(&dst, &dest_bytes).unwrap();

        let _ = find_resume_position(&src, &dst, block).unwrap();
    }

    /// PROPERTY: A file probed against itself is always complete.
    #[test]
    fn property_identical_files_are_complete(
        source_bytes in proptest::collection::vec(any::<u8>(), 0..2000),
        block in 1u64..256,
    ) {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        fs::write(&src, &source_bytes).unwrap();
        fs::write(&dst, &source_bytes).unwrap();

        let check = find_resume_position(&src, &dst, block).unwrap();
        prop_assert_eq!(check, ResumeCheck::Complete);
    }
}
