use crate::patch::matcher::longest_common_prefix;
use crate::patch::search::{FindLongest, Found, MIN_MATCH_LEN};
use rayon::prelude::*;

/// Precomputed index over one haystack, suitable when many needles are
/// searched against the same bytes.
///
/// The index is a sorted array of suffix start positions. A query
/// binary-searches the band of suffixes beginning with the needle's first
/// byte and extends each candidate bytewise. The index is keyed by slice
/// identity (address and length) and rebuilt when a different haystack is
/// handed in; results are identical to [`LinearFinder`] up to ties in the
/// start position.
///
/// [`LinearFinder`]: super::LinearFinder
#[derive(Clone, Debug, Default)]
pub struct SuffixFinder {
  index: Option<Index>,
}

impl FindLongest for SuffixFinder {
  fn find_longest(&mut self, haystack: &[u8], search_end: usize, needle: &[u8]) -> Option<Found> {
    let search_end = usize::min(search_end, haystack.len());
    if needle.len() < MIN_MATCH_LEN || search_end == 0 {
      return None;
    }
    let index = match &mut self.index {
      Some(index) if index.covers(haystack) => index,
      slot => slot.insert(Index::build(haystack)),
    };

    let mut best: Option<Found> = None;
    let mut best_len = MIN_MATCH_LEN - 1;
    for &suffix in index.band(haystack, needle[0]) {
      let start = suffix as usize;
      if start >= search_end || haystack.len() - start <= best_len {
        continue;
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

#[derive(Clone, Debug)]
struct Index {
  // Identity of the indexed slice, not a borrow; a borrow here would tie
  // the finder to a single encode call.
  ptr: *const u8,
  len: usize,
  suffixes: Vec<u32>,
}

impl Index {
  fn build(haystack: &[u8]) -> Self {
    let mut suffixes: Vec<u32> = (0..haystack.len() as u32).collect();
    // Sorting is the only data-parallel step; queries see a fully built,
    // deterministic index.
    suffixes.par_sort_unstable_by(|&a, &b| haystack[a as usize..].cmp(&haystack[b as usize..]));
    Self { ptr: haystack.as_ptr(), len: haystack.len(), suffixes }
  }

  fn covers(&self, haystack: &[u8]) -> bool {
    self.ptr == haystack.as_ptr() && self.len == haystack.len()
  }

  /// The suffixes beginning with `byte` form a contiguous band of the
  /// sorted array.
  fn band(&self, haystack: &[u8], byte: u8) -> &[u32] {
    let lower = self.suffixes.partition_point(|&s| haystack[s as usize] < byte);
    let upper = self.suffixes.partition_point(|&s| haystack[s as usize] <= byte);
    &self.suffixes[lower..upper]
  }
}
