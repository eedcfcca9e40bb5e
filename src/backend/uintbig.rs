/// A raw 256-bit unsigned integer (four 64-bit limbs, little-endian).
///
/// This type has no reduction invariant: it is the interchange format
/// between field elements and external producers or consumers of
/// integers (entropy sources, serialization layers).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UintBig(pub(crate) [u64; 4]);

impl UintBig {

    pub const ZERO: Self = Self([0; 4]);

    /// Creates a value from its four 64-bit limbs, least significant
    /// limb first.
    #[inline(always)]
    pub const fn w64le(x0: u64, x1: u64, x2: u64, x3: u64) -> Self {
        Self([ x0, x1, x2, x3 ])
    }

    /// Returns the four 64-bit limbs, least significant limb first.
    #[inline(always)]
    pub const fn limbs(&self) -> [u64; 4] {
        self.0
    }

    /// Interprets 32 bytes as an integer, in unsigned little-endian
    /// convention.
    #[inline]
    pub fn from_le_bytes(buf: &[u8; 32]) -> Self {
        let mut x = [0u64; 4];
        for i in 0..4 {
            let mut w = [0u8; 8];
            w.copy_from_slice(&buf[(8 * i)..(8 * i + 8)]);
            x[i] = u64::from_le_bytes(w);
        }
        Self(x)
    }

    /// Writes this integer over exactly 32 bytes, in unsigned
    /// little-endian convention.
    #[inline]
    pub fn to_le_bytes(self) -> [u8; 32] {
        let mut d = [0u8; 32];
        for i in 0..4 {
            d[(8 * i)..(8 * i + 8)].copy_from_slice(&self.0[i].to_le_bytes());
        }
        d
    }
}

impl From<[u64; 4]> for UintBig {
    #[inline(always)]
    fn from(x: [u64; 4]) -> Self {
        Self(x)
    }
}

impl From<UintBig> for [u64; 4] {
    #[inline(always)]
    fn from(x: UintBig) -> Self {
        x.0
    }
}
