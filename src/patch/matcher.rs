use std::iter;
use wide::u8x16;

const SIMD_SIZE: usize = u8x16::LANES as usize;

/// Returns the length of the longest common prefix of `a` and `b`, and
/// whether that prefix covers the whole of `b`.
///
/// Equal ranges are compared one vector per step; the first unequal vector
/// is rescanned bytewise to pinpoint the mismatch. The result is identical
/// to [`longest_common_prefix_scalar`] for any input.
pub fn longest_common_prefix(a: &[u8], b: &[u8]) -> (usize, bool) {
  let limit = usize::min(a.len(), b.len());
  let (head_a, head_b) = (&a[..limit], &b[..limit]);
  let mut length = 0;
  for (chunk_a, chunk_b) in iter::zip(
    head_a.chunks_exact(SIMD_SIZE),
    head_b.chunks_exact(SIMD_SIZE),
  ) {
    if to_simd(chunk_a) != to_simd(chunk_b) {
      return (length + scalar_prefix_len(chunk_a, chunk_b), false);
    }
    length += SIMD_SIZE;
  }
  length += scalar_prefix_len(&head_a[length..], &head_b[length..]);
  (length, length == b.len())
}

/// Bytewise twin of [`longest_common_prefix`], kept as the reference the
/// vector path is validated against.
pub fn longest_common_prefix_scalar(a: &[u8], b: &[u8]) -> (usize, bool) {
  let length = scalar_prefix_len(a, b);
  (length, length == b.len())
}

fn scalar_prefix_len(a: &[u8], b: &[u8]) -> usize {
  iter::zip(a, b).take_while(|(byte_a, byte_b)| byte_a == byte_b).count()
}

fn to_simd(chunk: &[u8]) -> u8x16 {
  let mut buffer = [0u8; SIMD_SIZE];
  buffer.copy_from_slice(chunk);
  u8x16::new(buffer)
}
