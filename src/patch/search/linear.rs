use crate::patch::matcher::longest_common_prefix;
use crate::patch::search::{FindLongest, Found, MIN_MATCH_LEN};
use memchr::memchr_iter;

/// Exhaustive scan, suitable for small haystacks.
///
/// The memchr crate uses SIMD to locate candidate start positions, so only
/// positions sharing the needle's first byte are extended.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearFinder;

impl FindLongest for LinearFinder {
  fn find_longest(&mut self, haystack: &[u8], search_end: usize, needle: &[u8]) -> Option<Found> {
    let search_end = usize::min(search_end, haystack.len());
    if needle.len() < MIN_MATCH_LEN {
      return None;
    }
    let mut best: Option<Found> = None;
    let mut best_len = MIN_MATCH_LEN - 1;
    for start in memchr_iter(needle[0], &haystack[..search_end]) {
      // no start this late can outgrow the current best
      if haystack.len() - start <= best_len {
        break;
      }
      let (length, exhausted) = longest_common_prefix(&haystack[start..], needle);
      if length > best_len {
        best_len = length;
        best = Some(Found { start, length });
        if exhausted {
          break;
        }
      }
    }
    best
  }
}
