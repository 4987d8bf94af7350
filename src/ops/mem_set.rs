//! Multi-tensor fill (memset family).
//!
//! Accepts up to 256 destination tensors with mixed dtypes and separate
//! int/float fill-value lists. Each tensor's byte span is chopped into
//! 64 KiB blocks; blocks are the work units, and a per-tensor start index
//! records where in the core cycle its first block lands so the kernel can
//! resume the round-robin without gaps.

use log::warn;

use crate::descriptor::TilingDescriptor;
use crate::error::{TilingError, TilingResult};
use crate::pipeline::{OpAnalysis, TilingStrategy};
use crate::platform::HardwareProfile;
use crate::shape::{NormalizedShape, TensorShape};
use crate::types::DType;

/// Fill granularity: one work unit is one 64 KiB span.
pub const FILL_BLOCK_BYTES: u64 = 65536;

/// Descriptor list lengths the device ABI is compiled for.
pub const LIST_BUCKETS: &[usize] = &[2, 4, 8, 16, 32, 64, 128, 256];

const KEY_BASE: u64 = 10000;
const MAX_TENSORS: usize = 256;

#[derive(Debug, Clone)]
pub struct MemSetTiling {
    pub tensors: Vec<(TensorShape, DType)>,
    /// One entry per integer/bool tensor, in tensor order; empty means
    /// fill with zero.
    pub int_values: Vec<i64>,
    /// One entry per float tensor, in tensor order; empty means 0.0.
    pub float_values: Vec<f32>,
}

/// Per-tensor block layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockInfo {
    block_num: u64,
    tail_bytes: u64,
    start_index: u64,
}

impl MemSetTiling {
    /// Smallest ABI bucket that fits the tensor count.
    pub fn bucket(&self) -> TilingResult<usize> {
        LIST_BUCKETS
            .iter()
            .copied()
            .find(|&b| b >= self.tensors.len())
            .ok_or_else(|| {
                TilingError::shape(format!(
                    "tensor list size {} exceeds maximum {MAX_TENSORS}",
                    self.tensors.len()
                ))
            })
    }

    fn validate_values(&self) -> TilingResult<()> {
        let int_count = self.tensors.iter().filter(|(_, dt)| dt.is_int_or_bool()).count();
        let float_count = self.tensors.len() - int_count;
        if self.int_values.is_empty() && int_count > 0 {
            warn!("mem_set: empty int value list, filling {int_count} integer tensors with 0");
        }
        if self.float_values.is_empty() && float_count > 0 {
            warn!("mem_set: empty float value list, filling {float_count} float tensors with 0.0");
        }
        if !self.int_values.is_empty() && self.int_values.len() != int_count {
            return Err(TilingError::shape(format!(
                "int value list has {} entries for {int_count} integer tensors",
                self.int_values.len()
            )));
        }
        if !self.float_values.is_empty() && self.float_values.len() != float_count {
            return Err(TilingError::shape(format!(
                "float value list has {} entries for {float_count} float tensors",
                self.float_values.len()
            )));
        }
        Ok(())
    }

    fn block_infos(&self, core_count: u32) -> Vec<BlockInfo> {
        let mut infos = Vec::with_capacity(self.tensors.len());
        let mut cursor = 0u64;
        for (shape, dtype) in &self.tensors {
            let bytes = shape.elem_count() as u64 * dtype.size_bytes() as u64;
            let tail_bytes = bytes % FILL_BLOCK_BYTES;
            let block_num = bytes / FILL_BLOCK_BYTES + u64::from(tail_bytes > 0);
            infos.push(BlockInfo { block_num, tail_bytes, start_index: cursor });
            cursor = (cursor + block_num) % core_count as u64;
        }
        infos
    }

    fn total_blocks(&self) -> i64 {
        self.tensors
            .iter()
            .map(|(shape, dtype)| {
                let bytes = shape.elem_count() as u64 * dtype.size_bytes() as u64;
                bytes.div_ceil(FILL_BLOCK_BYTES) as i64
            })
            .sum()
    }
}

impl TilingStrategy for MemSetTiling {
    fn name(&self) -> &'static str {
        "mem_set"
    }

    fn analyze(&self, _profile: &HardwareProfile) -> TilingResult<OpAnalysis> {
        if self.tensors.is_empty() {
            return Err(TilingError::shape("tensor list must not be empty"));
        }
        let bucket = self.bucket()?;
        self.validate_values()?;

        Ok(OpAnalysis {
            normalized: NormalizedShape {
                total_work_units: self.total_blocks(),
                inner_group_len: 1,
            },
            // Work units are whole blocks; the kernel fills bytes.
            elem_bytes: 1,
            buffer_multiplier: 1,
            align_bytes: 32,
            tiling_key: KEY_BASE + bucket as u64,
            per_unit_workspace_elems: 0,
        })
    }

    fn extend_descriptor(
        &self,
        _analysis: &OpAnalysis,
        profile: &HardwareProfile,
        desc: &mut TilingDescriptor,
    ) -> TilingResult<()> {
        let bucket = self.bucket()?;
        desc.push(self.tensors.len() as u64);
        let int_count = self.tensors.iter().filter(|(_, dt)| dt.is_int_or_bool()).count();
        desc.push(int_count as u64);

        // Fixed-length lists, padded to the bucket size.
        let pad = bucket - self.tensors.len();
        let mut int_iter = self.int_values.iter().copied();
        let mut float_iter = self.float_values.iter().copied();
        let mut dtype_words = Vec::with_capacity(bucket);
        let mut int_words = Vec::with_capacity(bucket);
        let mut float_words = Vec::with_capacity(bucket);
        for (_, dtype) in &self.tensors {
            dtype_words.push(dtype.code() as u64);
            if dtype.is_int_or_bool() {
                int_words.push(int_iter.next().unwrap_or(0) as u64);
                float_words.push(0);
            } else {
                int_words.push(0);
                float_words.push(float_iter.next().unwrap_or(0.0).to_bits() as u64);
            }
        }
        let infos = self.block_infos(profile.core_count);
        for words in [&mut dtype_words, &mut int_words, &mut float_words] {
            words.extend(std::iter::repeat(0).take(pad));
        }
        for w in dtype_words.into_iter().chain(int_words).chain(float_words) {
            desc.push(w);
        }
        for info in &infos {
            desc.push(info.block_num);
        }
        for info in &infos {
            desc.push(info.tail_bytes);
        }
        for info in &infos {
            desc.push(info.start_index);
        }
        for _ in 0..3 * pad {
            desc.push(0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run;

    fn tensor(dims: &[i64], dtype: DType) -> (TensorShape, DType) {
        (TensorShape::new(dims).unwrap(), dtype)
    }

    fn fills(tensors: Vec<(TensorShape, DType)>) -> MemSetTiling {
        MemSetTiling { tensors, int_values: vec![], float_values: vec![] }
    }

    #[test]
    fn bucket_and_key_follow_tensor_count() {
        let op = fills(vec![
            tensor(&[1024], DType::F32),
            tensor(&[1024], DType::I32),
            tensor(&[1024], DType::F16),
        ]);
        assert_eq!(op.bucket().unwrap(), 4);
        let analysis = op.analyze(&HardwareProfile::aiv48()).unwrap();
        assert_eq!(analysis.tiling_key, 10004);
    }

    #[test]
    fn block_layout_carries_start_indices() {
        // 3 MiB fills 48 blocks exactly; next tensor starts at index 0 again.
        let op = fills(vec![
            tensor(&[48 * 16384], DType::F32),
            tensor(&[100], DType::F32),
        ]);
        let infos = op.block_infos(48);
        assert_eq!(infos[0].block_num, 48);
        assert_eq!(infos[0].tail_bytes, 0);
        assert_eq!(infos[1].start_index, 0);
        assert_eq!(infos[1].block_num, 1);
        assert_eq!(infos[1].tail_bytes, 400);
    }

    #[test]
    fn value_list_length_mismatch_rejected() {
        let op = MemSetTiling {
            tensors: vec![tensor(&[8], DType::I32), tensor(&[8], DType::F32)],
            int_values: vec![1, 2],
            float_values: vec![],
        };
        assert!(op.analyze(&HardwareProfile::aiv48()).is_err());
    }

    #[test]
    fn empty_value_lists_default_to_zero_fill() {
        let op = fills(vec![tensor(&[8], DType::I32), tensor(&[8], DType::F32)]);
        let out = run(&HardwareProfile::aiv48(), &op).unwrap();
        assert_eq!(out.tiling_key, 10002);
        assert!(out.used_cores >= 1);
    }

    #[test]
    fn too_many_tensors_rejected() {
        let op = fills(vec![tensor(&[1], DType::U8); 257]);
        assert!(op.analyze(&HardwareProfile::aiv48()).is_err());
    }

    #[test]
    fn descriptor_lists_are_bucket_sized() {
        let op = fills(vec![
            tensor(&[100_000], DType::F32),
            tensor(&[10], DType::I8),
            tensor(&[10], DType::Bool),
        ]);
        let out = run(&HardwareProfile::aiv48(), &op).unwrap();
        // 9 common words + 2 counters + 6 lists of bucket(4) entries.
        assert_eq!(out.descriptor.words().len(), 9 + 2 + 6 * 4);
    }
}
