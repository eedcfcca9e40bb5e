//! Finite field implementation and its multi-precision support code.
//!
//! This module provides the `GFp` type, that implements the field of
//! integers modulo a prime p, and the `UintBig` type, that holds raw
//! (non-reduced) 256-bit integers used as interchange format. The `mp`
//! submodule contains the natural integer primitives (over `[u64; N]`
//! arrays) on which the field relies.
//!
//! The following properties apply to the field implementation:
//!
//!  - An instance encapsulates a field element, always in canonical
//!    form (an integer in the `0..p-1` range).
//!
//!  - The constant values `Self::ZERO`, `Self::ONE` and `Self::MINUS_ONE`
//!    contain the elements of value 0, 1 and -1, respectively.
//!
//!  - Usual arithmetic operators can be used on field elements (`+`, `-`,
//!    `*`, `/`, and the compound assignments `+=`, `-=`, `*=` and `/=`).
//!    Division by zero is tolerated, and yields zero (regardless of the
//!    dividend). Operators can use both the raw types, and references
//!    thereof.
//!
//!  - Addition and subtraction use the modulus shape: since both operands
//!    are lower than p, a single masked correction with the constants
//!    `MODP` (2^256 mod p) or `MINP` (2^256 - p) restores the canonical
//!    form.
//!
//!  - Multiplication computes the full 512-bit product, then reduces it
//!    with a division by p (keeping the remainder). `set_square()` and
//!    `square()` are plain self-multiplications.
//!
//!  - Function `set_cond(&mut self, a: &Self, ctl: u32)` sets the instance
//!    to the value of the other instance `a` if `ctl` is equal to
//!    0xFFFFFFFF, or leaves the instance value unmodified if `ctl` is equal
//!    to 0x00000000. Function `select(a0, a1, ctl)` returns a copy of
//!    `a0` or `a1`, and `cswap(a, b, ctl)` exchanges the contents of `a`
//!    and `b` under the same convention.
//!
//!  - The `legendre(self) -> i32` function returns the Legendre symbol
//!    for an element (0 for zero, +1 for non-zero squares, -1 for
//!    non-squares); `is_square()` returns 0xFFFFFFFF when that symbol is
//!    0 or +1.
//!
//!  - The `set_sqrt(&mut self) -> u32` function computes the square root
//!    of an element as x^((p+1)/4), which requires p = 3 mod 4. On
//!    success, 0xFFFFFFFF is returned. On failure (input is not a
//!    square), the element is set to zero, and 0x00000000 is returned.
//!
//!  - Function `random(rng)` draws 32 bytes from the provided random
//!    source and reduces them modulo p. The output is not exactly uniform
//!    (small values are favoured with a bias of about (2^256 mod p)/2^256);
//!    `try_random(rng)` propagates the source errors.

pub mod mp;

mod uintbig;
pub use uintbig::UintBig;

mod gfp;
pub use gfp::GFp;

// Carrying addition and subtraction should use u64::carrying_add()
// and u64::borrowing_sub(), but these functions are currently only
// experimental.

// Add with carry; carry is 0 or 1.
// (x, y, c_in) -> x + y + c_in mod 2^64, c_out

#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub(crate) fn addcarry_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    use core::arch::x86_64::_addcarry_u64;
    unsafe {
        let mut d = 0u64;
        let cc = _addcarry_u64(c, x, y, &mut d);
        (d, cc)
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
pub(crate) const fn addcarry_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    let z = (x as u128).wrapping_add(y as u128).wrapping_add(c as u128);
    (z as u64, (z >> 64) as u8)
}

// Subtract with borrow; borrow is 0 or 1.
// (x, y, c_in) -> x - y - c_in mod 2^64, c_out

#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub(crate) fn subborrow_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    use core::arch::x86_64::_subborrow_u64;
    unsafe {
        let mut d = 0u64;
        let cc = _subborrow_u64(c, x, y, &mut d);
        (d, cc)
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
pub(crate) const fn subborrow_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    let z = (x as u128).wrapping_sub(y as u128).wrapping_sub(c as u128);
    (z as u64, (z >> 127) as u8)
}

// Compute x*y+z1+z2 over 128 bits, returned as two 64-bit words (lo, hi)
#[inline(always)]
pub(crate) const fn umull_add2(x: u64, y: u64, z1: u64, z2: u64) -> (u64, u64) {
    let t = ((x as u128) * (y as u128))
        .wrapping_add(z1 as u128).wrapping_add(z2 as u128);
    (t as u64, (t >> 64) as u64)
}

// Expand a 0/1 bit into a full 64-bit mask (0 or 0xFFFFFFFFFFFFFFFF).
#[inline(always)]
pub(crate) const fn bitmask(b: u64) -> u64 {
    b.wrapping_neg()
}

// Convert a 32-bit control word (0 or 0xFFFFFFFF) into a 64-bit mask.
#[inline(always)]
pub(crate) const fn ctl_mask(ctl: u32) -> u64 {
    ((ctl as i32) as i64) as u64
}
