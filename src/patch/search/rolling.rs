use crate::patch::matcher::longest_common_prefix;
use crate::patch::search::{FindLongest, Found, MIN_MATCH_LEN};

const BASE: u64 = 257;
const MODULUS: u64 = (1 << 31) - 1;

/// Rabin–Karp sweep, suitable for haystacks too large to scan exhaustively.
///
/// The window is always one byte longer than the best match so far: a longer
/// match anywhere must also match on its first `window` bytes, so a single
/// forward pass finds the maximum. Hash hits are verified bytewise, which
/// also filters collisions.
#[derive(Clone, Copy, Debug, Default)]
pub struct RollingFinder;

impl FindLongest for RollingFinder {
  fn find_longest(&mut self, haystack: &[u8], search_end: usize, needle: &[u8]) -> Option<Found> {
    let search_end = usize::min(search_end, haystack.len());
    let mut window = MIN_MATCH_LEN;
    if needle.len() < window || search_end == 0 || haystack.len() < window {
      return None;
    }

    let mut best: Option<Found> = None;
    let mut start = 0;
    let mut needle_hash = hash_of(&needle[..window]);
    let mut window_hash = hash_of(&haystack[..window]);
    let mut leading_power = power(window - 1);

    loop {
      if window_hash == needle_hash {
        let (length, _) = longest_common_prefix(&haystack[start..], needle);
        // anything shorter than the window is a hash collision
        if length >= window {
          best = Some(Found { start, length });
          if length == needle.len() {
            return best;
          }
          window = length + 1;
          needle_hash = hash_of(&needle[..window]);
          leading_power = power(window - 1);
          start += 1;
          if start >= search_end || start + window > haystack.len() {
            return best;
          }
          window_hash = hash_of(&haystack[start..start + window]);
          continue;
        }
      }
      if start + window >= haystack.len() {
        return best;
      }
      window_hash = slide(window_hash, haystack[start], haystack[start + window], leading_power);
      start += 1;
      if start >= search_end {
        return best;
      }
    }
  }
}

fn hash_of(bytes: &[u8]) -> u64 {
  bytes.iter().fold(0, |hash, &byte| (hash * BASE + byte as u64) % MODULUS)
}

fn power(exponent: usize) -> u64 {
  (0..exponent).fold(1, |power, _| power * BASE % MODULUS)
}

fn slide(hash: u64, outgoing: u8, incoming: u8, leading_power: u64) -> u64 {
  let tail = (hash + MODULUS - outgoing as u64 * leading_power % MODULUS) % MODULUS;
  (tail * BASE + incoming as u64) % MODULUS
}
