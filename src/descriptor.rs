//! The packed tiling descriptor handed to the device kernel.
//!
//! A flat sequence of 64-bit words in a fixed order agreed with the kernel.
//! The host writes it once into a caller-provided buffer; the kernel reads
//! it verbatim. `tiling_key` and `used_cores` travel through dedicated
//! scalar slots, not this buffer.

use crate::error::{TilingError, TilingResult};

/// Fixed-order little-endian word record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TilingDescriptor {
    words: Vec<u64>,
}

impl TilingDescriptor {
    pub fn new() -> Self {
        TilingDescriptor { words: Vec::new() }
    }

    pub fn push(&mut self, word: u64) {
        self.words.push(word);
    }

    pub fn push_i64(&mut self, word: i64) {
        self.words.push(word as u64);
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Serialized size in bytes.
    pub fn byte_len(&self) -> usize {
        self.words.len() * 8
    }

    /// Pad the word count up to the smallest allowed bucket. The device ABI
    /// compiles descriptor layouts only for the bucket sizes, so padding
    /// happens here at the serialization boundary, never in the algorithm.
    pub fn pad_to_bucket(&mut self, buckets: &[usize]) -> TilingResult<usize> {
        let len = self.words.len();
        let bucket = buckets
            .iter()
            .copied()
            .find(|&b| b >= len)
            .ok_or(TilingError::Capacity {
                required: len * 8,
                capacity: buckets.last().copied().unwrap_or(0) * 8,
            })?;
        self.words.resize(bucket, 0);
        Ok(bucket)
    }

    /// Write the descriptor into `buf` little-endian, returning the byte
    /// count. Fails with `CapacityError` when `buf` is too small.
    pub fn serialize_into(&self, buf: &mut [u8]) -> TilingResult<usize> {
        let required = self.byte_len();
        if required > buf.len() {
            return Err(TilingError::Capacity { required, capacity: buf.len() });
        }
        for (i, w) in self.words.iter().enumerate() {
            buf[i * 8..(i + 1) * 8].copy_from_slice(&w.to_le_bytes());
        }
        Ok(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_little_endian_in_order() {
        let mut d = TilingDescriptor::new();
        d.push(1);
        d.push_i64(-1);
        let mut buf = [0u8; 16];
        assert_eq!(d.serialize_into(&mut buf).unwrap(), 16);
        assert_eq!(&buf[..8], &1u64.to_le_bytes());
        assert_eq!(&buf[8..], &u64::MAX.to_le_bytes());
    }

    #[test]
    fn overflow_is_capacity_error() {
        let mut d = TilingDescriptor::new();
        d.push(7);
        d.push(8);
        let mut buf = [0u8; 8];
        let err = d.serialize_into(&mut buf).unwrap_err();
        assert_eq!(err, TilingError::Capacity { required: 16, capacity: 8 });
    }

    #[test]
    fn bucket_padding_picks_smallest_fit() {
        let mut d = TilingDescriptor::new();
        for i in 0..5 {
            d.push(i);
        }
        assert_eq!(d.pad_to_bucket(&[2, 4, 8, 16]).unwrap(), 8);
        assert_eq!(d.words().len(), 8);
        assert_eq!(d.words()[5..], [0, 0, 0]);
    }

    #[test]
    fn oversized_record_exceeds_buckets() {
        let mut d = TilingDescriptor::new();
        for i in 0..20 {
            d.push(i);
        }
        assert!(matches!(
            d.pad_to_bucket(&[2, 4, 8, 16]),
            Err(TilingError::Capacity { .. })
        ));
    }
}
