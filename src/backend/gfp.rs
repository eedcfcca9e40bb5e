use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use super::{bitmask, ctl_mask};
use super::mp;
use super::UintBig;
use crate::{CryptoRng, RngCore, RngError};

#[derive(Clone, Copy, Debug)]
pub struct GFp<const M0: u64, const M1: u64, const M2: u64, const M3: u64>([u64; 4]);

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64> GFp<M0, M1, M2, M3> {

    // Modulus must be 3 mod 4 (square roots are computed as a single
    // exponentiation; this also makes it odd).
    // Top modulus word must not be zero (i.e. the modulus size must be at
    // least 193 bits); hence, any 64-bit integer is a valid element.
    // Primality is not checked.
    const COMPILE_TIME_CHECKS: () = Self::compile_time_checks();
    const fn compile_time_checks() {
        static_assert!((M0 & 3) == 3);
        static_assert!(M3 != 0);
    }

    // Modulus, in base 2^64 (low-to-high order).
    pub const MODULUS: [u64; 4] = [ M0, M1, M2, M3 ];

    // 2^256 - p; subtracted after a borrow in subtraction.
    pub const MINP: [u64; 4] = Self::make_minp();

    // 2^256 mod p; added after a carry in addition.
    pub const MODP: [u64; 4] = Self::make_modp();

    // (p+1)/4
    const QP1D4: [u64; 4] = Self::make_qp1d4();

    // (p-1)/2
    const QM1D2: [u64; 4] = [
        (M0 >> 1) | (M1 << 63),
        (M1 >> 1) | (M2 << 63),
        (M2 >> 1) | (M3 << 63),
        M3 >> 1,
    ];

    // p-2
    const QM2: [u64; 4] = [ M0.wrapping_sub(2), M1, M2, M3 ];

    pub const ZERO: Self = Self([ 0, 0, 0, 0 ]);
    pub const ONE: Self = Self([ 1, 0, 0, 0 ]);
    pub const MINUS_ONE: Self = Self([ M0.wrapping_sub(1), M1, M2, M3 ]);

    // Create an element from its four 64-bit limbs. The limbs are
    // provided in little-endian order (least significant limb first).
    // The value MUST be lower than the modulus; it is used as is.
    // This function can be used in constant expressions.
    #[inline(always)]
    pub const fn w64le(x0: u64, x1: u64, x2: u64, x3: u64) -> Self {
        Self([ x0, x1, x2, x3 ])
    }

    // Create an element from a small integer. Since the modulus is
    // at least 2^192, no reduction is needed.
    #[inline(always)]
    pub fn from_u64(x: u64) -> Self {
        Self([ x, 0, 0, 0 ])
    }

    #[inline(always)]
    pub fn from_u32(x: u32) -> Self {
        Self::from_u64(x as u64)
    }

    /// Converts a raw integer into a field element, without reduction.
    ///
    /// The raw value MUST already be lower than the modulus; otherwise,
    /// the returned element breaks the canonical-form invariant and all
    /// subsequent operations on it yield unspecified results. This is
    /// checked only in debug builds; use `encode_checked()` for a checked
    /// conversion, or `reduce()` for a conversion with reduction.
    #[inline(always)]
    pub fn encode(x: &UintBig) -> Self {
        debug_assert!(mp::borrow_n(&x.0, &Self::MODULUS) == 1);
        Self(x.0)
    }

    /// Converts a raw integer into a field element. If the value is not
    /// lower than the modulus, `None` is returned. Side-channel analysis
    /// may reveal whether the conversion succeeded.
    #[inline]
    pub fn encode_checked(x: &UintBig) -> Option<Self> {
        if mp::borrow_n(&x.0, &Self::MODULUS) == 1 {
            Some(Self(x.0))
        } else {
            None
        }
    }

    /// Converts a raw integer into a field element, reducing it modulo p.
    /// This never fails.
    #[inline]
    pub fn reduce(x: &UintBig) -> Self {
        let (_, r) = mp::tdiv_qr(&mp::Wide::from_lo(x.0), &Self::MODULUS);
        Self(r)
    }

    /// Returns the raw integer (in the `0..p-1` range) for this element.
    #[inline(always)]
    pub fn decode(self) -> UintBig {
        UintBig(self.0)
    }

    #[inline(always)]
    fn set_add(&mut self, rhs: &Self) {
        let () = Self::COMPILE_TIME_CHECKS;

        // Raw addition. Both operands are lower than p, hence the sum
        // is lower than 2*p.
        let cc = mp::add_n(&mut self.0, &rhs.0);
        let cw = bitmask(cc as u64);

        // On carry, the sum is 2^256 + d; fold the 2^256 back in as
        // 2^256 mod p. A carry implies p > 2^255, so 2^256 mod p is
        // 2^256 - p, and d + (2^256 mod p) is the sum minus p.
        mp::add_n_masked(&mut self.0, &Self::MODP, cw);

        // Without a carry, subtract p if the sum is not lower than p.
        let bb = mp::borrow_n(&self.0, &Self::MODULUS);
        let sw = !cw & bitmask((bb as u64) ^ 1);
        mp::sub_n_masked(&mut self.0, &Self::MODULUS, sw);
    }

    #[inline(always)]
    fn set_sub(&mut self, rhs: &Self) {
        // Raw subtraction.
        let cc = mp::sub_n(&mut self.0, &rhs.0);

        // On borrow, we have x - y + 2^256; subtract 2^256 - p to get
        // x - y + p, which is in the 1..p-1 range.
        mp::sub_n_masked(&mut self.0, &Self::MINP, bitmask(cc as u64));
    }

    // Negate this value (in place).
    #[inline(always)]
    pub fn set_neg(&mut self) {
        let mut r = Self::ZERO;
        r.set_sub(self);
        *self = r;
    }

    // Conditionally copy the provided value ('a') into self:
    //  - If ctl == 0xFFFFFFFF, then the value of 'a' is copied into self.
    //  - If ctl == 0, then the value of self is unchanged.
    // ctl MUST be equal to 0 or 0xFFFFFFFF.
    #[inline(always)]
    pub fn set_cond(&mut self, a: &Self, ctl: u32) {
        let cw = ctl_mask(ctl);
        self.0[0] ^= cw & (self.0[0] ^ a.0[0]);
        self.0[1] ^= cw & (self.0[1] ^ a.0[1]);
        self.0[2] ^= cw & (self.0[2] ^ a.0[2]);
        self.0[3] ^= cw & (self.0[3] ^ a.0[3]);
    }

    // Return a value equal to either a0 (if ctl == 0) or a1 (if
    // ctl == 0xFFFFFFFF). Value ctl MUST be either 0 or 0xFFFFFFFF.
    #[inline(always)]
    pub fn select(a0: &Self, a1: &Self, ctl: u32) -> Self {
        let mut r = *a0;
        r.set_cond(a1, ctl);
        r
    }

    // Conditionally swap two elements: values a and b are exchanged if
    // ctl == 0xFFFFFFFF, or not exchanged if ctl == 0x00000000. Value
    // ctl MUST be either 0x00000000 or 0xFFFFFFFF. The same operations
    // are performed in both cases.
    #[inline(always)]
    pub fn cswap(a: &mut Self, b: &mut Self, ctl: u32) {
        let cw = ctl_mask(ctl);
        let t = cw & (a.0[0] ^ b.0[0]); a.0[0] ^= t; b.0[0] ^= t;
        let t = cw & (a.0[1] ^ b.0[1]); a.0[1] ^= t; b.0[1] ^= t;
        let t = cw & (a.0[2] ^ b.0[2]); a.0[2] ^= t; b.0[2] ^= t;
        let t = cw & (a.0[3] ^ b.0[3]); a.0[3] ^= t; b.0[3] ^= t;
    }

    // Multiplication: full 512-bit product, then division by the
    // modulus (the remainder is the result).
    #[inline]
    fn set_mul(&mut self, rhs: &Self) {
        let () = Self::COMPILE_TIME_CHECKS;

        let (_, r) = mp::tdiv_qr(&mp::mul_n(&self.0, &rhs.0), &Self::MODULUS);
        self.0 = r;
    }

    // Square this value (in place).
    #[inline(always)]
    pub fn set_square(&mut self) {
        let x = *self;
        self.set_mul(&x);
    }

    // Square this value.
    #[inline(always)]
    pub fn square(self) -> Self {
        let mut r = self;
        r.set_square();
        r
    }

    // Raise this value to the provided exponent. The exponent is
    // considered public (it may leak through timing-based side channels);
    // the value itself does not leak.
    #[inline]
    pub fn set_pow_pubexp(&mut self, e: &UintBig) {
        self.0 = mp::powm(&self.0, &e.0, &Self::MODULUS);
    }

    #[inline(always)]
    pub fn pow_pubexp(self, e: &UintBig) -> Self {
        let mut r = self;
        r.set_pow_pubexp(e);
        r
    }

    // Invert this value (in place), as x^(p-2). If this value is zero,
    // then it stays at zero.
    #[inline]
    pub fn set_invert(&mut self) {
        self.0 = mp::powm(&self.0, &Self::QM2, &Self::MODULUS);
    }

    #[inline(always)]
    pub fn invert(self) -> Self {
        let mut r = self;
        r.set_invert();
        r
    }

    // Invert this value (in place) with a binary extended GCD. If this
    // value is zero, then it stays at zero.
    // WARNING: this function is not constant-time; it MUST NOT be applied
    // on secret data.
    pub fn set_invert_vartime(&mut self) {
        self.0 = match mp::invert_vartime(&self.0, &Self::MODULUS) {
            Some(y) => y,
            None => [0; 4],
        };
    }

    #[inline(always)]
    pub fn invert_vartime(self) -> Self {
        let mut r = self;
        r.set_invert_vartime();
        r
    }

    // Divide this value by the provided divisor. If the divisor is zero,
    // then this value is set to zero.
    #[inline]
    fn set_div(&mut self, y: &Self) {
        self.set_mul(&y.invert());
    }

    // Compute the Legendre symbol on this value. Return value is:
    //   0   if this value is zero
    //  +1   if this value is a non-zero quadratic residue
    //  -1   if this value is not a quadratic residue
    // The value x^((p-1)/2) is computed (Euler's criterion).
    pub fn legendre(self) -> i32 {
        let e = Self(mp::powm(&self.0, &Self::QM1D2, &Self::MODULUS));
        let qr = e.equals(Self::ONE);
        let nqr = e.equals(Self::MINUS_ONE);
        ((qr & 1) as i32) - ((nqr & 1) as i32)
    }

    // Same as legendre(), but computed with the binary Jacobi symbol
    // algorithm. This is faster, but not constant-time; it MUST NOT be
    // applied on secret data.
    pub fn legendre_vartime(self) -> i32 {
        mp::jacobi_vartime(&self.0, &Self::MODULUS)
    }

    // Return 0xFFFFFFFF if this value is a square (including zero),
    // 0x00000000 otherwise.
    #[inline]
    pub fn is_square(self) -> u32 {
        let e = Self(mp::powm(&self.0, &Self::QM1D2, &Self::MODULUS));
        !e.equals(Self::MINUS_ONE)
    }

    // Set this value to its square root. Returned value is 0xFFFFFFFF
    // if the operation succeeded (value was indeed a quadratic residue),
    // 0 otherwise (value was not a quadratic residue). In the latter case,
    // this value is set to zero as well.
    // When this operation succeeds, the returned square root is exactly
    // x^((p+1)/4); there is no normalization of its sign.
    //
    // This operation returns unspecified results if the modulus is not
    // prime.
    pub fn set_sqrt(&mut self) -> u32 {
        // Keep a copy of the source value, to check the square root
        // afterwards.
        let x = *self;

        // p = 3 mod 4, hence the candidate square root is x^((p+1)/4)
        self.0 = mp::powm(&self.0, &Self::QP1D4, &Self::MODULUS);

        // Check computed square root; clear this value on mismatch.
        let r = self.square().equals(x);
        self.set_cond(&Self::ZERO, !r);
        r
    }

    #[inline(always)]
    pub fn sqrt(self) -> (Self, u32) {
        let mut x = self;
        let r = x.set_sqrt();
        (x, r)
    }

    // Equality check between two elements (constant-time); returned value
    // is 0xFFFFFFFF on equality, 0 otherwise.
    #[inline]
    pub fn equals(self, rhs: Self) -> u32 {
        let r = (self.0[0] ^ rhs.0[0])
              | (self.0[1] ^ rhs.0[1])
              | (self.0[2] ^ rhs.0[2])
              | (self.0[3] ^ rhs.0[3]);
        ((r | r.wrapping_neg()) >> 63).wrapping_sub(1) as u32
    }

    // Compare this value with zero (constant-time); returned value
    // is 0xFFFFFFFF if this element is zero, 0 otherwise.
    #[inline]
    pub fn iszero(self) -> u32 {
        let r = self.0[0] | self.0[1] | self.0[2] | self.0[3];
        ((r | r.wrapping_neg()) >> 63).wrapping_sub(1) as u32
    }

    /// Generates a random element by reducing 32 bytes from the provided
    /// random source modulo p.
    ///
    /// This is not a rejection sampler: the output distribution is
    /// slightly biased toward low values (the first 2^256 mod p
    /// residues are a bit more likely than the others).
    pub fn random<T: CryptoRng + RngCore>(rng: &mut T) -> Self {
        let mut buf = [0u8; 32];
        rng.fill_bytes(&mut buf);
        Self::reduce(&UintBig::from_le_bytes(&buf))
    }

    /// Same as `random()`, but errors from the random source are
    /// returned instead of triggering a panic.
    pub fn try_random<T: CryptoRng + RngCore>(rng: &mut T)
        -> Result<Self, RngError>
    {
        let mut buf = [0u8; 32];
        rng.try_fill_bytes(&mut buf)?;
        Ok(Self::reduce(&UintBig::from_le_bytes(&buf)))
    }

    // Given the modulus p (odd, at least 2^192), compute 2^256 - p.
    const fn make_minp() -> [u64; 4] {
        const fn sbb(x: u64, y: u64, cc: u64) -> (u64, u64) {
            let z = (x as u128).wrapping_sub(y as u128)
                .wrapping_sub(cc as u128);
            (z as u64, ((z >> 64) as u64) & 1)
        }
        let (d0, cc) = sbb(0, M0, 0);
        let (d1, cc) = sbb(0, M1, cc);
        let (d2, cc) = sbb(0, M2, cc);
        let (d3, _)  = sbb(0, M3, cc);
        [ d0, d1, d2, d3 ]
    }

    // Compute 2^256 mod p, by doubling 1 modulo p 256 times.
    const fn make_modp() -> [u64; 4] {
        const fn sbb(x: u64, y: u64, cc: u64) -> (u64, u64) {
            let z = (x as u128).wrapping_sub(y as u128)
                .wrapping_sub(cc as u128);
            (z as u64, ((z >> 64) as u64) & 1)
        }
        let mut r = [ 1u64, 0, 0, 0 ];
        let mut i = 0;
        while i < 256 {
            let top = r[3] >> 63;
            let d0 = r[0] << 1;
            let d1 = (r[1] << 1) | (r[0] >> 63);
            let d2 = (r[2] << 1) | (r[1] >> 63);
            let d3 = (r[3] << 1) | (r[2] >> 63);
            let (e0, cc) = sbb(d0, M0, 0);
            let (e1, cc) = sbb(d1, M1, cc);
            let (e2, cc) = sbb(d2, M2, cc);
            let (e3, cc) = sbb(d3, M3, cc);
            if top != 0 || cc == 0 {
                r = [ e0, e1, e2, e3 ];
            } else {
                r = [ d0, d1, d2, d3 ];
            }
            i += 1;
        }
        r
    }

    // Compute (p+1)/4 = floor(p/4) + 1 (for p = 3 mod 4).
    const fn make_qp1d4() -> [u64; 4] {
        const fn adc(x: u64, y: u64, cc: u64) -> (u64, u64) {
            let z = (x as u128).wrapping_add(y as u128)
                .wrapping_add(cc as u128);
            (z as u64, (z >> 64) as u64)
        }
        let (d0, cc) = adc((M0 >> 2) | (M1 << 62), 1, 0);
        let (d1, cc) = adc((M1 >> 2) | (M2 << 62), 0, cc);
        let (d2, cc) = adc((M2 >> 2) | (M3 << 62), 0, cc);
        let (d3, _)  = adc(M3 >> 2, 0, cc);
        [ d0, d1, d2, d3 ]
    }
}

// ========================================================================
// Implementations of all the traits needed to use the simple operators
// (+, *, /...) on field element instances, with or without references.

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Add<GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn add(self, other: GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = self;
        r.set_add(&other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Add<&GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn add(self, other: &GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = self;
        r.set_add(other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Add<GFp<M0, M1, M2, M3>> for &GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn add(self, other: GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = *self;
        r.set_add(&other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Add<&GFp<M0, M1, M2, M3>> for &GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn add(self, other: &GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = *self;
        r.set_add(other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    AddAssign<GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    #[inline(always)]
    fn add_assign(&mut self, other: GFp<M0, M1, M2, M3>) {
        self.set_add(&other);
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    AddAssign<&GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    #[inline(always)]
    fn add_assign(&mut self, other: &GFp<M0, M1, M2, M3>) {
        self.set_add(other);
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Div<GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn div(self, other: GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = self;
        r.set_div(&other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Div<&GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn div(self, other: &GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = self;
        r.set_div(other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Div<GFp<M0, M1, M2, M3>> for &GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn div(self, other: GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = *self;
        r.set_div(&other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Div<&GFp<M0, M1, M2, M3>> for &GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn div(self, other: &GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = *self;
        r.set_div(other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    DivAssign<GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    #[inline(always)]
    fn div_assign(&mut self, other: GFp<M0, M1, M2, M3>) {
        self.set_div(&other);
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    DivAssign<&GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    #[inline(always)]
    fn div_assign(&mut self, other: &GFp<M0, M1, M2, M3>) {
        self.set_div(other);
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Mul<GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn mul(self, other: GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = self;
        r.set_mul(&other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Mul<&GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn mul(self, other: &GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = self;
        r.set_mul(other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Mul<GFp<M0, M1, M2, M3>> for &GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn mul(self, other: GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = *self;
        r.set_mul(&other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Mul<&GFp<M0, M1, M2, M3>> for &GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn mul(self, other: &GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = *self;
        r.set_mul(other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    MulAssign<GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    #[inline(always)]
    fn mul_assign(&mut self, other: GFp<M0, M1, M2, M3>) {
        self.set_mul(&other);
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    MulAssign<&GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    #[inline(always)]
    fn mul_assign(&mut self, other: &GFp<M0, M1, M2, M3>) {
        self.set_mul(other);
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Neg for GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn neg(self) -> GFp<M0, M1, M2, M3> {
        let mut r = self;
        r.set_neg();
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Neg for &GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn neg(self) -> GFp<M0, M1, M2, M3> {
        let mut r = *self;
        r.set_neg();
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Sub<GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn sub(self, other: GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = self;
        r.set_sub(&other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Sub<&GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn sub(self, other: &GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = self;
        r.set_sub(other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Sub<GFp<M0, M1, M2, M3>> for &GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn sub(self, other: GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = *self;
        r.set_sub(&other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    Sub<&GFp<M0, M1, M2, M3>> for &GFp<M0, M1, M2, M3>
{
    type Output = GFp<M0, M1, M2, M3>;

    #[inline(always)]
    fn sub(self, other: &GFp<M0, M1, M2, M3>) -> GFp<M0, M1, M2, M3> {
        let mut r = *self;
        r.set_sub(other);
        r
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    SubAssign<GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    #[inline(always)]
    fn sub_assign(&mut self, other: GFp<M0, M1, M2, M3>) {
        self.set_sub(&other);
    }
}

impl<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
    SubAssign<&GFp<M0, M1, M2, M3>> for GFp<M0, M1, M2, M3>
{
    #[inline(always)]
    fn sub_assign(&mut self, other: &GFp<M0, M1, M2, M3>) {
        self.set_sub(other);
    }
}

// ========================================================================

#[cfg(test)]
mod tests {

    use super::GFp;
    use crate::backend::UintBig;
    use crate::{CryptoRng, RngCore, RngError};
    use num_bigint::BigUint;
    use sha2::{Sha256, Digest};
    use sha3::{Shake256, Shake256Reader};
    use sha3::digest::{ExtendableOutput, XofReader};

    // A pretend RNG for test purposes (deterministic from a given seed).
    struct DRNG(Shake256Reader);

    impl DRNG {

        fn from_seed(seed: &[u8]) -> Self {
            let mut sh = Shake256::default();
            sha3::digest::Update::update(&mut sh, seed);
            Self(sh.finalize_xof())
        }
    }

    impl RngCore for DRNG {

        fn next_u32(&mut self) -> u32 {
            let mut buf = [0u8; 4];
            self.fill_bytes(&mut buf);
            u32::from_le_bytes(buf)
        }

        fn next_u64(&mut self) -> u64 {
            let mut buf = [0u8; 8];
            self.fill_bytes(&mut buf);
            u64::from_le_bytes(buf)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.0.read(dest);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8])
            -> Result<(), RngError>
        {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for DRNG { }

    // A random source that always fails.
    struct BrokenRng;

    impl RngCore for BrokenRng {

        fn next_u32(&mut self) -> u32 {
            panic!("broken RNG");
        }

        fn next_u64(&mut self) -> u64 {
            panic!("broken RNG");
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            panic!("broken RNG");
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8])
            -> Result<(), RngError>
        {
            let code = core::num::NonZeroU32::new(RngError::CUSTOM_START)
                .unwrap();
            Err(RngError::from(code))
        }
    }

    impl CryptoRng for BrokenRng { }

    fn big(x: &UintBig) -> BigUint {
        BigUint::from_bytes_le(&x.to_le_bytes())
    }

    fn modulus<const M0: u64, const M1: u64, const M2: u64, const M3: u64>()
        -> BigUint
    {
        big(&UintBig::w64le(M0, M1, M2, M3))
    }

    // va, vb must be 32 bytes each in length
    fn check_gf_ops<const M0: u64, const M1: u64,
                    const M2: u64, const M3: u64>
                   (va: &[u8], vb: &[u8])
    {
        let zp = modulus::<M0, M1, M2, M3>();
        let mut ba = [0u8; 32];
        let mut bb = [0u8; 32];
        ba.copy_from_slice(va);
        bb.copy_from_slice(vb);

        let a = GFp::<M0, M1, M2, M3>::reduce(&UintBig::from_le_bytes(&ba));
        let b = GFp::<M0, M1, M2, M3>::reduce(&UintBig::from_le_bytes(&bb));
        let za = BigUint::from_bytes_le(va) % &zp;
        let zb = BigUint::from_bytes_le(vb) % &zp;
        assert!(big(&a.decode()) == za);
        assert!(big(&b.decode()) == zb);

        let c = a + b;
        let zc = big(&c.decode());
        assert!(zc == (&za + &zb) % &zp);
        assert!(zc < zp);

        let c = a - b;
        let zc = big(&c.decode());
        assert!(zc == ((&zp + &za) - &zb) % &zp);
        assert!(zc < zp);
        assert!((c + b).equals(a) == 0xFFFFFFFF);

        let c = -a;
        let zc = big(&c.decode());
        assert!(zc == (&zp - &za) % &zp);

        let c = a * b;
        let zc = big(&c.decode());
        assert!(zc == (&za * &zb) % &zp);

        let c = a.square();
        let zc = big(&c.decode());
        assert!(zc == (&za * &za) % &zp);

        let mut c = a;
        c += b;
        c -= b;
        assert!(c.equals(a) == 0xFFFFFFFF);
        c *= b;
        assert!(c.equals(a * b) == 0xFFFFFFFF);

        // Raw round-trip.
        let raw = a.decode();
        assert!(GFp::<M0, M1, M2, M3>::encode(&raw).decode() == raw);
        assert!(GFp::<M0, M1, M2, M3>::encode_checked(&raw).is_some());

        let c = a / b;
        let d = c * b;
        if b.iszero() != 0 {
            assert!(c.iszero() == 0xFFFFFFFF);
        } else {
            assert!(a.equals(d) == 0xFFFFFFFF);
            assert!((b * b.invert()).equals(GFp::ONE) == 0xFFFFFFFF);
            assert!(b.invert().equals(b.invert_vartime()) == 0xFFFFFFFF);
        }
    }

    // This tests field operations; nqr MUST be a non-quadratic-residue
    // in the field.
    fn test_field<const M0: u64, const M1: u64, const M2: u64, const M3: u64>
                 (nqr: u32)
    {
        let zp = modulus::<M0, M1, M2, M3>();
        assert!(big(&UintBig(GFp::<M0, M1, M2, M3>::MINP)) + &zp
            == BigUint::from(1u32) << 256);
        assert!(big(&UintBig(GFp::<M0, M1, M2, M3>::MODP))
            == (BigUint::from(1u32) << 256) % &zp);

        let va = [0u8; 32];
        let vb = [0xFFu8; 32];
        check_gf_ops::<M0, M1, M2, M3>(&va, &va);
        check_gf_ops::<M0, M1, M2, M3>(&va, &vb);
        check_gf_ops::<M0, M1, M2, M3>(&vb, &vb);
        let mut vp = [0u8; 32];
        vp.copy_from_slice(&UintBig::w64le(M0, M1, M2, M3).to_le_bytes());
        check_gf_ops::<M0, M1, M2, M3>(&vp, &vb);

        let zero = GFp::<M0, M1, M2, M3>::ZERO;
        let one = GFp::<M0, M1, M2, M3>::ONE;
        let xnqr = GFp::<M0, M1, M2, M3>::from_u32(nqr);
        assert!(zero.legendre() == 0);
        assert!(zero.legendre_vartime() == 0);
        assert!(zero.is_square() == 0xFFFFFFFF);
        assert!(one.legendre() == 1);
        assert!(one.is_square() == 0xFFFFFFFF);
        assert!(xnqr.legendre() == -1);
        assert!(xnqr.legendre_vartime() == -1);
        assert!(xnqr.is_square() == 0);
        let (t, r) = zero.sqrt();
        assert!(r == 0xFFFFFFFF && t.iszero() == 0xFFFFFFFF);

        let mut sh = Sha256::new();
        for i in 0..20 {
            sh.update(((2 * i + 0) as u64).to_le_bytes());
            let va = sh.finalize_reset();
            sh.update(((2 * i + 1) as u64).to_le_bytes());
            let vb = sh.finalize_reset();
            check_gf_ops::<M0, M1, M2, M3>(&va, &vb);

            let mut ba = [0u8; 32];
            ba.copy_from_slice(&va);
            let a = GFp::<M0, M1, M2, M3>::reduce(&UintBig::from_le_bytes(&ba));
            let s = a.square();
            let s2 = s * xnqr;
            assert!(s.legendre() == 1);
            assert!(s.legendre_vartime() == 1);
            assert!(s.is_square() == 0xFFFFFFFF);
            assert!(s2.legendre() == -1);
            assert!(s2.legendre_vartime() == -1);
            assert!(s2.is_square() == 0);
            let (t, r) = s.sqrt();
            assert!(r == 0xFFFFFFFF);
            assert!(t.square().equals(s) == 0xFFFFFFFF);
            assert!(t.equals(a) == 0xFFFFFFFF || t.equals(-a) == 0xFFFFFFFF);
            let (t2, r) = s2.sqrt();
            assert!(r == 0);
            assert!(t2.iszero() == 0xFFFFFFFF);
        }
    }

    type Fp = crate::field::Fp;

    #[test]
    fn fp_ops() {
        test_field::< 0x1FFFFFFFFFFFFFFF,
                      0xDD75AD77FCF31B26,
                      0xC916D4D826699BAE,
                      0x5EF43B1BCFC913CE >(7);
    }

    #[test]
    fn gfp256_ops() {
        // Modulus from curve P-256 (larger than 2^255, so that additions
        // may produce a carry).
        test_field::< 0xFFFFFFFFFFFFFFFF,
                      0x00000000FFFFFFFF,
                      0x0000000000000000,
                      0xFFFFFFFF00000001 >(3);
    }

    #[test]
    fn gf256max_ops() {
        // Largest 256-bit prime.
        test_field::< 0xFFFFFFFFFFFFFF43,
                      0xFFFFFFFFFFFFFFFF,
                      0xFFFFFFFFFFFFFFFF,
                      0xFFFFFFFFFFFFFFFF >(2);
    }

    #[test]
    fn fp_constants() {
        let vp = hex::decode(
            "5ef43b1bcfc913cec916d4d826699baedd75ad77fcf31b261fffffffffffffff")
            .unwrap();
        assert!(big(&UintBig(Fp::MODULUS)) == BigUint::from_bytes_be(&vp));
        assert!(Fp::MINP == [
            0xE000000000000001, 0x228A5288030CE4D9,
            0x36E92B27D9966451, 0xA10BC4E43036EC31,
        ]);
        assert!(Fp::MODP == [
            0xC000000000000002, 0x4514A5100619C9B3,
            0x6DD2564FB32CC8A2, 0x421789C8606DD862,
        ]);
        assert!(Fp::ZERO.decode() == UintBig::ZERO);
        assert!(Fp::ONE.decode() == UintBig::w64le(1, 0, 0, 0));
        assert!(Fp::from_u64(1).equals(Fp::ONE) == 0xFFFFFFFF);
        assert!(Fp::from_u64(0).iszero() == 0xFFFFFFFF);
    }

    #[test]
    fn fp_wraparound() {
        let pm1 = UintBig::w64le(
            0x1FFFFFFFFFFFFFFE, 0xDD75AD77FCF31B26,
            0xC916D4D826699BAE, 0x5EF43B1BCFC913CE);
        let a = Fp::encode(&pm1);
        assert!(a.equals(Fp::MINUS_ONE) == 0xFFFFFFFF);
        assert!((a + Fp::ONE).iszero() == 0xFFFFFFFF);
        assert!((Fp::ZERO - Fp::ONE).decode() == pm1);
        assert!((-Fp::ONE).decode() == pm1);
        assert!((a * a).equals(Fp::ONE) == 0xFFFFFFFF);

        let two = Fp::from_u64(2);
        let h = two.invert();
        assert!(h.decode() == UintBig::w64le(
            0x1000000000000000, 0x6EBAD6BBFE798D93,
            0x648B6A6C1334CDD7, 0x2F7A1D8DE7E489E7));
        assert!((two * h).equals(Fp::ONE) == 0xFFFFFFFF);
        assert!((two * two.invert_vartime()).equals(Fp::ONE) == 0xFFFFFFFF);
        assert!((Fp::ONE / two).equals(h) == 0xFFFFFFFF);
    }

    #[test]
    fn fp_encode_checked() {
        let p = UintBig(Fp::MODULUS);
        assert!(Fp::encode_checked(&p).is_none());
        assert!(Fp::encode_checked(&UintBig::w64le(!0, !0, !0, !0)).is_none());
        assert!(Fp::reduce(&p).iszero() == 0xFFFFFFFF);
        let x = Fp::encode_checked(&UintBig::w64le(
            0x1FFFFFFFFFFFFFFE, 0xDD75AD77FCF31B26,
            0xC916D4D826699BAE, 0x5EF43B1BCFC913CE)).unwrap();
        assert!(x.equals(Fp::MINUS_ONE) == 0xFFFFFFFF);
    }

    #[test]
    fn fp_zero_inversion() {
        assert!(Fp::ZERO.invert().iszero() == 0xFFFFFFFF);
        assert!(Fp::ZERO.invert_vartime().iszero() == 0xFFFFFFFF);
        assert!((Fp::ONE / Fp::ZERO).iszero() == 0xFFFFFFFF);
    }

    #[test]
    fn fp_cswap() {
        let mut rng = DRNG::from_seed(b"cswap");
        let a0 = Fp::random(&mut rng);
        let b0 = Fp::random(&mut rng);
        let (mut a, mut b) = (a0, b0);
        Fp::cswap(&mut a, &mut b, 0);
        assert!(a.equals(a0) == 0xFFFFFFFF && b.equals(b0) == 0xFFFFFFFF);
        Fp::cswap(&mut a, &mut b, 0xFFFFFFFF);
        assert!(a.equals(b0) == 0xFFFFFFFF && b.equals(a0) == 0xFFFFFFFF);
        Fp::cswap(&mut a, &mut b, 0xFFFFFFFF);
        assert!(a.equals(a0) == 0xFFFFFFFF && b.equals(b0) == 0xFFFFFFFF);

        assert!(Fp::select(&a0, &b0, 0).equals(a0) == 0xFFFFFFFF);
        assert!(Fp::select(&a0, &b0, 0xFFFFFFFF).equals(b0) == 0xFFFFFFFF);
        let mut c = a0;
        c.set_cond(&b0, 0);
        assert!(c.equals(a0) == 0xFFFFFFFF);
        c.set_cond(&b0, 0xFFFFFFFF);
        assert!(c.equals(b0) == 0xFFFFFFFF);
    }

    #[test]
    fn fp_pow() {
        let mut rng = DRNG::from_seed(b"pow");
        let zp = modulus::<0x1FFFFFFFFFFFFFFF, 0xDD75AD77FCF31B26,
                           0xC916D4D826699BAE, 0x5EF43B1BCFC913CE>();
        for _ in 0..10 {
            let x = Fp::random(&mut rng);
            let mut eb = [0u8; 32];
            rng.fill_bytes(&mut eb);
            let e = UintBig::from_le_bytes(&eb);
            let y = x.pow_pubexp(&e);
            assert!(big(&y.decode()) == big(&x.decode()).modpow(&big(&e), &zp));
        }
        let x = Fp::from_u64(12345);
        assert!(x.pow_pubexp(&UintBig::ZERO).equals(Fp::ONE) == 0xFFFFFFFF);
        assert!(x.pow_pubexp(&UintBig::w64le(2, 0, 0, 0)).equals(x.square())
            == 0xFFFFFFFF);
    }

    #[test]
    fn fp_random() {
        let mut rng = DRNG::from_seed(b"random");
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10000 {
            let x = Fp::random(&mut rng);
            let raw = x.decode();
            assert!(Fp::encode_checked(&raw).is_some());
            assert!(seen.insert(raw.limbs()));
        }

        let mut rng1 = DRNG::from_seed(b"same");
        let mut rng2 = DRNG::from_seed(b"same");
        let x1 = Fp::random(&mut rng1);
        let x2 = Fp::try_random(&mut rng2).unwrap();
        assert!(x1.equals(x2) == 0xFFFFFFFF);

        assert!(Fp::try_random(&mut BrokenRng).is_err());
    }
}
