//! Isofp is a Rust library for arithmetic in a prime field GF(p), where
//! p is a fixed 255-bit prime suitable for isogeny-based cryptography.
//!
//! The field is the foundation beneath curve and isogeny computations:
//! everything above it reduces to additions, multiplications, inversions,
//! square roots and quadratic residuosity tests on elements of GF(p).
//! The field type is defined in `backend` as a type generic over the
//! modulus (`GFp`, with the modulus given as four 64-bit compile-time
//! type parameters); the fixed prime used by the protocol is the `Fp`
//! alias in the `field` module.
//!
//! Multi-precision natural integer operations (carrying addition and
//! subtraction, full-width multiplication, division with remainder,
//! modular exponentiation, modular inversion and the Jacobi symbol) are
//! provided by `backend::mp`; the field type delegates its heavier
//! operations to these primitives, parameterized by the modulus.
//!
//! # Usage
//!
//! The library is `no_std` and does not use heap allocation. Field
//! elements are plain `Copy` values over four 64-bit limbs. Random
//! elements are obtained from any `RngCore + CryptoRng` source; the
//! `rand_core` traits are re-exported.
//!
//! # Conventions
//!
//! All implemented functions should be strictly constant-time, unless
//! explicitly documented otherwise (non-constant-time functions normally
//! have "vartime" in their name). Booleans are avoided for potentially
//! secret values: functions that return or use such a value use the
//! `u32` type, with 0xFFFFFFFF meaning "true" and 0x00000000 meaning
//! "false". No other value shall be used, for they would lead to
//! unpredictable results. For the same reason, the `Eq` and `PartialEq`
//! traits are not implemented on field elements; use `equals()`.
//!
//! Field elements are always kept in canonical form (an integer in the
//! `0..p-1` range). Functions that modify the object on which they are
//! called have a name in `set_*()` (e.g. `x.set_square()` squares `x` in
//! place, while `x.square()` returns the square as a new instance).
//! Usual arithmetic operators are implemented, on both values and
//! references.

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub use rand_core::{CryptoRng, RngCore, Error as RngError};

macro_rules! static_assert {
    ($condition:expr) => {
        let _ = &[()][1 - ($condition) as usize];
    }
}

pub mod backend;
pub mod field;
