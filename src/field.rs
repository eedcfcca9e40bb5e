//! Finite fields.
//!
//! This module defines the base field used by the isogeny layer. It is a
//! specialization of the backend-provided `GFp` type, for the prime:
//!
//! ```text
//! p = 0x5EF43B1BCFC913CE_C916D4D826699BAE_DD75AD77FCF31B26_1FFFFFFFFFFFFFFF
//! ```
//!
//! This prime has length 255 bits, and p = 3 mod 4 (square roots are
//! a single exponentiation). Raw integers are exchanged with the `UintBig`
//! type.

pub use crate::backend::{GFp, UintBig};

/// The base field GF(p).
pub type Fp = GFp<
    0x1FFFFFFFFFFFFFFF, 0xDD75AD77FCF31B26,
    0xC916D4D826699BAE, 0x5EF43B1BCFC913CE>;
