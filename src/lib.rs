//! Creation and application of BPS (`"BPS1"`) binary patches.
//!
//! A BPS patch records how to turn one byte sequence (the *source*) into
//! another (the *target*) as a stream of four commands: read from the source
//! in place, read literal bytes from the patch, or copy from an arbitrary
//! position of the source or of the already-produced target. Copies from the
//! target may overlap the bytes being written, which is how the format
//! expresses run-length repetition.
//!
//! [`patch::encode`] produces a patch; [`patch::decode`] applies one.
//! Checksum mismatches during decoding are reported as warnings next to the
//! decoded output rather than as failures, so a close-but-wrong source still
//! yields a candidate result.

pub mod crc;
pub mod patch;

pub use patch::{Decoded, decode, encode};
