//! Fixed-width signed integers beyond 128 bits.
//!
//! [`Int192`] and [`Int256`] are two's-complement little-endian limb
//! integers sized for the widest determinants of the exact predicate
//! layer. They live entirely in registers, and every widening product is
//! exact: the caller picks an output width at least the sum of the input
//! widths. Exceeding a declared width is a programming error, checked in
//! debug builds only.

const TWO_POW_64: f64 = 18446744073709551616.0;

#[inline]
fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let t = a as u128 + b as u128 + carry as u128;
    (t as u64, (t >> 64) as u64)
}

#[inline]
fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let t = (a as u128).wrapping_sub(b as u128 + borrow as u128);
    (t as u64, (t >> 127) as u64)
}

/// Schoolbook product of an unsigned magnitude and a single limb.
fn mul_mag_by_limb(a: &[u64], b: u64, out: &mut [u64]) {
    let mut carry: u128 = 0;
    for (i, o) in out.iter_mut().enumerate() {
        let ai = if i < a.len() { a[i] as u128 } else { 0 };
        let t = ai * b as u128 + carry;
        *o = t as u64;
        carry = t >> 64;
    }
    debug_assert!(carry == 0, "widening product exceeds output width");
}

/// Schoolbook product of two unsigned magnitudes.
fn mul_mag(a: &[u64], b: &[u64], out: &mut [u64]) {
    for o in out.iter_mut() {
        *o = 0;
    }
    for i in 0..a.len() {
        let mut carry: u128 = 0;
        for j in 0..b.len() {
            if i + j >= out.len() {
                debug_assert!(a[i] == 0 || b[j] == 0, "widening product exceeds output width");
                continue;
            }
            let t = a[i] as u128 * b[j] as u128 + out[i + j] as u128 + carry;
            out[i + j] = t as u64;
            carry = t >> 64;
        }
        let mut k = i + b.len();
        while carry != 0 && k < out.len() {
            let t = out[k] as u128 + carry;
            out[k] = t as u64;
            carry = t >> 64;
            k += 1;
        }
        debug_assert!(carry == 0, "widening product exceeds output width");
    }
}

macro_rules! wide_int {
    ($name:ident, $limbs:expr) => {
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name {
            limbs: [u64; $limbs],
        }

        impl $name {
            pub const ZERO: Self = Self { limbs: [0; $limbs] };

            pub fn from_limbs(limbs: [u64; $limbs]) -> Self {
                Self { limbs }
            }

            pub fn limbs(&self) -> &[u64; $limbs] {
                &self.limbs
            }

            #[inline]
            pub fn is_zero(&self) -> bool {
                self.limbs.iter().all(|&l| l == 0)
            }

            /// Sign test without materializing a comparison value.
            #[inline]
            pub fn is_negative(&self) -> bool {
                (self.limbs[$limbs - 1] >> 63) != 0
            }

            /// -1, 0 or +1.
            #[inline]
            pub fn signum(&self) -> i8 {
                if self.is_negative() {
                    -1
                } else if self.is_zero() {
                    0
                } else {
                    1
                }
            }

            pub fn abs(self) -> Self {
                if self.is_negative() {
                    -self
                } else {
                    self
                }
            }

            fn from_i128(v: i128) -> Self {
                let mut limbs = [if v < 0 { u64::MAX } else { 0 }; $limbs];
                limbs[0] = v as u64;
                limbs[1] = (v >> 64) as u64;
                Self { limbs }
            }

            /// Unsigned magnitude of the value.
            fn magnitude(self) -> [u64; $limbs] {
                self.abs().limbs
            }

            /// Lossy conversion for logging and the f64 mirrors.
            pub fn to_f64(self) -> f64 {
                let neg = self.is_negative();
                let mag = self.magnitude();
                let mut x = 0.0;
                for &l in mag.iter().rev() {
                    x = x * TWO_POW_64 + l as f64;
                }
                if neg {
                    -x
                } else {
                    x
                }
            }
        }

        impl From<i64> for $name {
            fn from(v: i64) -> Self {
                Self::from_i128(v as i128)
            }
        }

        impl From<i128> for $name {
            fn from(v: i128) -> Self {
                Self::from_i128(v)
            }
        }

        impl std::ops::Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                let mut limbs = [0u64; $limbs];
                let mut carry = 0u64;
                for i in 0..$limbs {
                    let (s, c) = adc(self.limbs[i], rhs.limbs[i], carry);
                    limbs[i] = s;
                    carry = c;
                }
                let out = Self { limbs };
                debug_assert!(
                    self.is_negative() != rhs.is_negative()
                        || self.is_negative() == out.is_negative(),
                    "fixed-width addition overflow"
                );
                out
            }
        }

        impl std::ops::Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                let mut limbs = [0u64; $limbs];
                let mut borrow = 0u64;
                for i in 0..$limbs {
                    let (s, b) = sbb(self.limbs[i], rhs.limbs[i], borrow);
                    limbs[i] = s;
                    borrow = b;
                }
                let out = Self { limbs };
                debug_assert!(
                    self.is_negative() == rhs.is_negative()
                        || self.is_negative() == out.is_negative(),
                    "fixed-width subtraction overflow"
                );
                out
            }
        }

        impl std::ops::Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                let mut limbs = [0u64; $limbs];
                let mut carry = 1u64;
                for i in 0..$limbs {
                    let (s, c) = adc(!self.limbs[i], 0, carry);
                    limbs[i] = s;
                    carry = c;
                }
                Self { limbs }
            }
        }
    };
}

wide_int!(Int192, 3);
wide_int!(Int256, 4);

impl From<Int192> for Int256 {
    fn from(v: Int192) -> Self {
        let fill = if v.is_negative() { u64::MAX } else { 0 };
        let l = v.limbs();
        Int256::from_limbs([l[0], l[1], l[2], fill])
    }
}

#[inline]
fn mag_i128(v: i128) -> [u64; 2] {
    let m = v.unsigned_abs();
    [m as u64, (m >> 64) as u64]
}

/// `i64 * i64`, exact in 128 bits.
#[inline]
pub fn wide_mul_64(a: i64, b: i64) -> i128 {
    a as i128 * b as i128
}

/// `i128 * i64`, exact in 192 bits.
pub fn wide_mul_128_64(a: i128, b: i64) -> Int192 {
    let neg = (a < 0) != (b < 0);
    let mut out = [0u64; 3];
    mul_mag_by_limb(&mag_i128(a), b.unsigned_abs(), &mut out);
    let r = Int192::from_limbs(out);
    if neg {
        -r
    } else {
        r
    }
}

/// `i128 * i128`, exact in 256 bits.
pub fn wide_mul_128(a: i128, b: i128) -> Int256 {
    let neg = (a < 0) != (b < 0);
    let mut out = [0u64; 4];
    mul_mag(&mag_i128(a), &mag_i128(b), &mut out);
    let r = Int256::from_limbs(out);
    if neg {
        -r
    } else {
        r
    }
}

/// `Int192 * i64`, exact in 256 bits.
pub fn wide_mul_192_64(a: Int192, b: i64) -> Int256 {
    let neg = a.is_negative() != (b < 0);
    let mut out = [0u64; 4];
    mul_mag_by_limb(&a.magnitude(), b.unsigned_abs(), &mut out);
    let r = Int256::from_limbs(out);
    if neg {
        -r
    } else {
        r
    }
}

/// `Int192 * i128`; the caller guarantees the product fits 255 bits.
pub fn wide_mul_192_128(a: Int192, b: i128) -> Int256 {
    let neg = a.is_negative() != (b < 0);
    let mut out = [0u64; 4];
    mul_mag(&a.magnitude(), &mag_i128(b), &mut out);
    let r = Int256::from_limbs(out);
    if neg {
        -r
    } else {
        r
    }
}

/// `Int256 * i64`; the caller guarantees the product fits 255 bits.
pub fn wide_mul_256_64(a: Int256, b: i64) -> Int256 {
    let neg = a.is_negative() != (b < 0);
    let mut out = [0u64; 4];
    mul_mag_by_limb(&a.magnitude(), b.unsigned_abs(), &mut out);
    let r = Int256::from_limbs(out);
    if neg {
        -r
    } else {
        r
    }
}
