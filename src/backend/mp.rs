//! Multi-precision natural integers.
//!
//! Integers are fixed-width arrays of `N` 64-bit limbs, in little-endian
//! order (least significant limb first). Double-width values (e.g. full
//! products) use the `Wide` container, which keeps the low and high
//! halves as two `N`-limb arrays.
//!
//! Carrying addition and subtraction, multiplication, division and
//! modular exponentiation are constant-time (with regard to the values;
//! the exponent of `powm()` is considered public). Functions with
//! "vartime" in their name are not constant-time and MUST NOT be used
//! on secret data.

use super::{addcarry_u64, subborrow_u64, umull_add2, bitmask};

/// A double-width natural integer (`2*N` limbs), split into its low and
/// high halves.
#[derive(Clone, Copy, Debug)]
pub struct Wide<const N: usize> {
    pub lo: [u64; N],
    pub hi: [u64; N],
}

impl<const N: usize> Wide<N> {

    pub const ZERO: Self = Self { lo: [0; N], hi: [0; N] };

    /// Widens an `N`-limb integer (high half is zero).
    #[inline(always)]
    pub const fn from_lo(lo: [u64; N]) -> Self {
        Self { lo, hi: [0; N] }
    }

    #[inline(always)]
    fn limb(&self, i: usize) -> u64 {
        if i < N { self.lo[i] } else { self.hi[i - N] }
    }

    #[inline(always)]
    fn limb_mut(&mut self, i: usize) -> &mut u64 {
        if i < N { &mut self.lo[i] } else { &mut self.hi[i - N] }
    }
}

/// Adds `b` to `a` (in place); the output carry (0 or 1) is returned.
#[inline]
pub fn add_n<const N: usize>(a: &mut [u64; N], b: &[u64; N]) -> u8 {
    let mut cc = 0;
    for i in 0..N {
        (a[i], cc) = addcarry_u64(a[i], b[i], cc);
    }
    cc
}

/// Adds `b & m` to `a` (in place), for a mask `m` equal to 0 or
/// 0xFFFFFFFFFFFFFFFF; the output carry (0 or 1) is returned.
#[inline]
pub fn add_n_masked<const N: usize>(a: &mut [u64; N], b: &[u64; N], m: u64)
    -> u8
{
    let mut cc = 0;
    for i in 0..N {
        (a[i], cc) = addcarry_u64(a[i], b[i] & m, cc);
    }
    cc
}

/// Subtracts `b` from `a` (in place); the output borrow (0 or 1) is
/// returned.
#[inline]
pub fn sub_n<const N: usize>(a: &mut [u64; N], b: &[u64; N]) -> u8 {
    let mut cc = 0;
    for i in 0..N {
        (a[i], cc) = subborrow_u64(a[i], b[i], cc);
    }
    cc
}

/// Subtracts `b & m` from `a` (in place), for a mask `m` equal to 0 or
/// 0xFFFFFFFFFFFFFFFF; the output borrow (0 or 1) is returned.
#[inline]
pub fn sub_n_masked<const N: usize>(a: &mut [u64; N], b: &[u64; N], m: u64)
    -> u8
{
    let mut cc = 0;
    for i in 0..N {
        (a[i], cc) = subborrow_u64(a[i], b[i] & m, cc);
    }
    cc
}

/// Returns the borrow of the subtraction `a - b` (1 if `a < b`, 0
/// otherwise). The subtraction result itself is discarded.
#[inline]
pub fn borrow_n<const N: usize>(a: &[u64; N], b: &[u64; N]) -> u8 {
    let mut cc = 0;
    for i in 0..N {
        (_, cc) = subborrow_u64(a[i], b[i], cc);
    }
    cc
}

/// Computes the full `2*N`-limb product of `a` and `b`.
pub fn mul_n<const N: usize>(a: &[u64; N], b: &[u64; N]) -> Wide<N> {
    let mut d = Wide::<N>::ZERO;
    for i in 0..N {
        let mut hi = 0;
        for j in 0..N {
            let (lo, h) = umull_add2(a[i], b[j], d.limb(i + j), hi);
            *d.limb_mut(i + j) = lo;
            hi = h;
        }
        *d.limb_mut(i + N) = hi;
    }
    d
}

/// Divides `n` by `d`, returning the quotient (over `2*N` limbs) and
/// the remainder (over `N` limbs).
///
/// The divisor MUST NOT be zero; on a zero divisor, the returned values
/// are unspecified. This is a bit-serial restoring division: it always
/// runs through all `128*N` bits of the dividend and is constant-time.
pub fn tdiv_qr<const N: usize>(n: &Wide<N>, d: &[u64; N])
    -> (Wide<N>, [u64; N])
{
    let mut q = Wide::<N>::ZERO;
    let mut r = [0u64; N];
    for k in (0..(2 * N)).rev() {
        let w = n.limb(k);
        for j in (0..64).rev() {
            // r <- 2*r + bit; the bit shifted out of the top limb is
            // kept in 'top'. Since r < d before the shift, 2*r + 1 < 2*d
            // and at most one subtraction of d is needed.
            let top = if N > 0 { r[N - 1] >> 63 } else { 0 };
            for i in (1..N).rev() {
                r[i] = (r[i] << 1) | (r[i - 1] >> 63);
            }
            if N > 0 {
                r[0] = (r[0] << 1) | ((w >> j) & 1);
            }

            // Subtract d if r >= d (i.e. if there was a top bit, or
            // if the subtraction does not borrow).
            let mut t = r;
            let cc = sub_n(&mut t, d);
            let ok = top | ((cc as u64) ^ 1);
            let m = bitmask(ok);
            for i in 0..N {
                r[i] ^= m & (r[i] ^ t[i]);
            }
            *q.limb_mut(k) |= ok << j;
        }
    }
    (q, r)
}

/// Computes `a*b mod m` (division-based reduction). The modulus MUST NOT
/// be zero.
#[inline]
pub fn mul_mod<const N: usize>(a: &[u64; N], b: &[u64; N], m: &[u64; N])
    -> [u64; N]
{
    let (_, r) = tdiv_qr(&mul_n(a, b), m);
    r
}

/// Computes `x^e mod m`. The exponent `e` is considered public (the
/// processing is constant-time with regard to `x`, but not `e`). The
/// modulus MUST NOT be zero. The base needs not be reduced.
pub fn powm<const N: usize>(x: &[u64; N], e: &[u64; N], m: &[u64; N])
    -> [u64; N]
{
    let (_, x) = tdiv_qr(&Wide::from_lo(*x), m);

    // Make a 4-bit window; win[i] contains x^(i+1)
    let mut win = [[0u64; N]; 15];
    win[0] = x;
    for i in 1..8 {
        let j = i * 2;
        win[j - 1] = mul_mod(&win[i - 1], &win[i - 1], m);
        win[j] = mul_mod(&win[j - 1], &win[0], m);
    }

    // Explore 4-bit chunks of the exponent, high to low. Skip leading
    // chunks of value 0.
    let mut r = [0u64; N];
    let mut z = false;
    for i in (0..N).rev() {
        let ew = e[i];
        for j in (0..16).rev() {
            if z {
                for _ in 0..4 {
                    r = mul_mod(&r, &r, m);
                }
            }
            let c = ((ew >> (j << 2)) & 0x0F) as usize;
            if c != 0 {
                if z {
                    r = mul_mod(&r, &win[c - 1], m);
                } else {
                    z = true;
                    r = win[c - 1];
                }
            }
        }
    }
    if !z {
        // x^0 = 1 (reduced, in case m = 1).
        let mut one = [0u64; N];
        if N > 0 {
            one[0] = 1;
        }
        (_, r) = tdiv_qr(&Wide::from_lo(one), m);
    }
    r
}

// Shift right by one bit; 'top' (0 or 1) is inserted as the new top bit.
#[inline(always)]
fn rsh1<const N: usize>(a: &mut [u64; N], top: u64) {
    for i in 0..N {
        let next = if i + 1 < N { a[i + 1] } else { top };
        a[i] = (a[i] >> 1) | (next << 63);
    }
}

// a <- a/2 mod m, for an odd modulus m and a < m.
#[inline(always)]
fn half_mod<const N: usize>(a: &mut [u64; N], m: &[u64; N]) {
    let cc = add_n_masked(a, m, bitmask(a[0] & 1));
    rsh1(a, cc as u64);
}

// a <- (a - b) mod m, for a < m and b < m.
#[inline(always)]
fn sub_mod<const N: usize>(a: &mut [u64; N], b: &[u64; N], m: &[u64; N]) {
    let cc = sub_n(a, b);
    add_n_masked(a, m, bitmask(cc as u64));
}

fn is_zero_vartime<const N: usize>(a: &[u64; N]) -> bool {
    a.iter().all(|&w| w == 0)
}

fn is_one_vartime<const N: usize>(a: &[u64; N]) -> bool {
    N > 0 && a[0] == 1 && a[1..].iter().all(|&w| w == 0)
}

/// Computes the inverse of `x` modulo `m` with a binary extended GCD.
/// The modulus MUST be odd (and greater than 1). If `x` is not
/// invertible modulo `m` (in particular if `x = 0 mod m`), then `None`
/// is returned.
///
/// WARNING: this function is not constant-time.
pub fn invert_vartime<const N: usize>(x: &[u64; N], m: &[u64; N])
    -> Option<[u64; N]>
{
    let (_, mut u) = tdiv_qr(&Wide::from_lo(*x), m);
    if N == 0 || is_zero_vartime(&u) {
        return None;
    }

    // Invariants: x1*x = u mod m, x2*x = v mod m
    let mut v = *m;
    let mut x1 = [0u64; N];
    x1[0] = 1;
    let mut x2 = [0u64; N];
    loop {
        while (u[0] & 1) == 0 {
            rsh1(&mut u, 0);
            half_mod(&mut x1, m);
        }
        while (v[0] & 1) == 0 {
            rsh1(&mut v, 0);
            half_mod(&mut x2, m);
        }
        if u == v {
            break;
        }
        if borrow_n(&u, &v) == 0 {
            sub_n(&mut u, &v);
            sub_mod(&mut x1, &x2, m);
        } else {
            sub_n(&mut v, &u);
            sub_mod(&mut x2, &x1, m);
        }
    }

    // u = v = gcd(x, m)
    if is_one_vartime(&u) {
        Some(x1)
    } else {
        None
    }
}

/// Computes the Jacobi symbol (x|n). The modulus `n` MUST be odd.
/// Returned value is 0 if `x` and `n` are not coprime, +1 or -1
/// otherwise. If `n` is prime, this is the Legendre symbol.
///
/// WARNING: this function is not constant-time.
pub fn jacobi_vartime<const N: usize>(x: &[u64; N], n: &[u64; N]) -> i32 {
    if N == 0 {
        return 0;
    }
    let (_, mut a) = tdiv_qr(&Wide::from_lo(*x), n);
    let mut n = *n;
    let mut t = 1i32;
    loop {
        if is_zero_vartime(&a) {
            return if is_one_vartime(&n) { t } else { 0 };
        }

        // (2|n) = -1 if and only if n = 3 or 5 mod 8.
        while (a[0] & 1) == 0 {
            rsh1(&mut a, 0);
            let r = n[0] & 7;
            if r == 3 || r == 5 {
                t = -t;
            }
        }

        // Quadratic reciprocity, then a <- a - n (even).
        if borrow_n(&a, &n) != 0 {
            core::mem::swap(&mut a, &mut n);
            if (a[0] & 3) == 3 && (n[0] & 3) == 3 {
                t = -t;
            }
        }
        sub_n(&mut a, &n);
    }
}

// ========================================================================
