//! Substring search back-ends for the encoder.
//!
//! All three return the same match length for the same inputs; start
//! positions may differ when several matches tie. The linear finder is the
//! reference implementation; the others are performance specializations for
//! larger haystacks and for haystacks reused across many searches.

mod linear;
mod rolling;
mod suffix;

pub use self::linear::LinearFinder;
pub use self::rolling::RollingFinder;
pub use self::suffix::SuffixFinder;

/// Matches shorter than this cost more to encode than the literal bytes
/// they replace, so the finders do not report them.
pub const MIN_MATCH_LEN: usize = 4;

/// A match: `needle[..length] == haystack[start..start + length]`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Found {
  pub start: usize,
  pub length: usize,
}

/// Capability the encoder is generic over: find the longest prefix of
/// `needle` that occurs in `haystack` at a start position below
/// `search_end`.
///
/// A match may extend past `search_end`. The encoder searches the
/// already-produced part of the target while letting matches run into the
/// bytes the copy under consideration would itself write; that overlap is
/// how run-length repetition is found.
pub trait FindLongest {
  fn find_longest(&mut self, haystack: &[u8], search_end: usize, needle: &[u8]) -> Option<Found>;
}

#[cfg(test)]
mod tests {
  use super::*;

  fn all_lengths(haystack: &[u8], search_end: usize, needle: &[u8]) -> Vec<Option<usize>> {
    let linear = LinearFinder.find_longest(haystack, search_end, needle);
    let rolling = RollingFinder.find_longest(haystack, search_end, needle);
    let suffix = SuffixFinder::default().find_longest(haystack, search_end, needle);
    for found in [linear, rolling, suffix].into_iter().flatten() {
      assert_eq!(
        &haystack[found.start..found.start + usize::min(found.length, haystack.len() - found.start)],
        &needle[..usize::min(found.length, haystack.len() - found.start)],
      );
      assert!(found.start < search_end);
      assert!(found.length >= MIN_MATCH_LEN);
    }
    [linear, rolling, suffix].iter().map(|found| found.map(|f| f.length)).collect()
  }

  fn agreed_length(haystack: &[u8], search_end: usize, needle: &[u8]) -> Option<usize> {
    let lengths = all_lengths(haystack, search_end, needle);
    assert!(
      lengths.windows(2).all(|pair| pair[0] == pair[1]),
      "back-ends disagree on {haystack:x?} / {needle:x?}: {lengths:?}"
    );
    lengths[0]
  }

  fn pseudo_random(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len)
      .map(|_| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 24) as u8
      })
      .collect()
  }

  #[test]
  pub fn finds_an_interior_match() {
    let haystack = b"the quick brown fox jumps over the lazy dog";
    assert_eq!(agreed_length(haystack, haystack.len(), b"brown fossil"), Some(8));
  }

  #[test]
  pub fn short_needles_are_not_reported() {
    let haystack = b"abcabcabc";
    assert_eq!(agreed_length(haystack, haystack.len(), b"abc"), None);
  }

  #[test]
  pub fn short_matches_are_not_reported() {
    assert_eq!(agreed_length(b"abcXXXXX", 8, b"abcdefgh"), None);
  }

  #[test]
  pub fn match_may_overlap_search_end() {
    // Only starts below 3 qualify, but the match extends through the whole
    // haystack, the way a target-copy runs into its own output.
    let haystack = b"abcabcabcabc";
    let found = LinearFinder.find_longest(haystack, 3, &haystack[3..]).unwrap();
    assert_eq!((found.start, found.length), (0, 9));
    assert_eq!(agreed_length(haystack, 3, &haystack[3..]), Some(9));
  }

  #[test]
  pub fn longest_of_several_candidates_wins() {
    let haystack = b"ab_abcd_abcdef_abc";
    assert_eq!(agreed_length(haystack, haystack.len(), b"abcdefgh"), Some(6));
  }

  #[test]
  pub fn backends_agree_on_random_data() {
    let haystack = pseudo_random(0x5EED, 2048);
    for seed in 1..32u64 {
      // half the needles are slices of the haystack, half are foreign
      let needle = if seed % 2 == 0 {
        let start = (seed as usize * 37) % 1024;
        haystack[start..start + 64].to_vec()
      } else {
        pseudo_random(seed, 64)
      };
      for search_end in [7, 256, haystack.len()] {
        agreed_length(&haystack, search_end, &needle);
      }
    }
  }

  #[test]
  pub fn suffix_finder_reuses_its_index_per_haystack() {
    let haystack = pseudo_random(7, 512);
    let mut finder = SuffixFinder::default();
    let first = finder.find_longest(&haystack, haystack.len(), &haystack[100..140]);
    let again = finder.find_longest(&haystack, haystack.len(), &haystack[100..140]);
    assert_eq!(first, again);
    assert_eq!(first.map(|f| f.length), Some(40));
  }
}
