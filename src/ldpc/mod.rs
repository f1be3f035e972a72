//! LDPC(174,91) error correction for FT8
//!
//! **Encoding**: 91-bit systematic word (77 payload + 14 CRC bits) plus 83
//! generator-derived parity bits.
//!
//! **Decoding**: iterative sum-product belief propagation over the sparse
//! parity-check graph, driven one iteration at a time by the candidate
//! decode schedule.

mod constants;
mod decode;
mod encode;

pub use constants::{K, M, N};
pub use decode::{count_unsatisfied, LdpcDecoder};
pub use encode::encode;
