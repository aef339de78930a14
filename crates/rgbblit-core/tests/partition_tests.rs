use std::collections::HashSet;

use rgbblit_core::geometry::Geometry;
use rgbblit_core::partition::{Chunk, PartitionMode};

/// Assert the chunks tile `[0, total_len)` in order with no gap or overlap.
fn assert_exact_cover(chunks: &[Chunk], total_len: u64) {
    let mut next = 0;
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.start, next, "chunk {i} starts at {} expected {next}", chunk.start);
        next = chunk.start + chunk.len;
    }
    assert_eq!(next, total_len, "chunks end at {next}, file is {total_len} bytes");
}

#[test]
fn test_both_modes_cover_file_exactly_once() {
    let geometry = Geometry::new(7, 5).unwrap();
    let total = geometry.byte_len();
    for mode in [PartitionMode::Aligned, PartitionMode::Bytes] {
        for workers in 1..=(geometry.pixel_count() as usize) {
            assert_exact_cover(&Chunk::all(mode, total, workers), total);
        }
    }
}

#[test]
fn test_equal_shares_except_last() {
    let total = 1200 * 3;
    for workers in [1, 2, 3, 7, 11, 64] {
        let chunks = Chunk::all(PartitionMode::Bytes, total, workers);
        let share = total / workers as u64;
        for chunk in &chunks[..workers - 1] {
            assert_eq!(chunk.len, share);
        }
        assert_eq!(chunks[workers - 1].end(), total - 1);
    }
}

#[test]
fn test_aligned_chunks_yield_unique_coordinates() {
    let geometry = Geometry::new(6, 4).unwrap();
    let total = geometry.byte_len();
    for workers in 1..=(geometry.pixel_count() as usize) {
        let mut seen = HashSet::new();
        for chunk in Chunk::all(PartitionMode::Aligned, total, workers) {
            assert!(chunk.is_pixel_aligned());
            assert!(chunk.len > 0, "worker got an empty chunk with {workers} workers");
            for off in (chunk.start..chunk.start + chunk.len).step_by(3) {
                assert!(seen.insert(geometry.coordinate_of(off)));
            }
        }
        assert_eq!(seen.len() as u64, geometry.pixel_count());
    }
}

#[test]
fn test_byte_mode_aligned_when_workers_divide_pixels() {
    // 12 pixels, so 1, 2, 3, 4, 6 and 12 workers all land on triplet boundaries.
    let total = 36;
    for workers in [1, 2, 3, 4, 6, 12] {
        let chunks = Chunk::all(PartitionMode::Bytes, total, workers);
        assert!(chunks.iter().all(Chunk::is_pixel_aligned), "workers = {workers}");
        assert_eq!(chunks, Chunk::all(PartitionMode::Aligned, total, workers));
    }
}

#[test]
fn test_byte_mode_splits_triplets_otherwise() {
    let chunks = Chunk::all(PartitionMode::Bytes, 36, 5);
    assert!(chunks.iter().any(|c| !c.is_pixel_aligned()));
}
