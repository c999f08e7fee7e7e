//! RSA private key components and the modular arithmetic around them
//!
//! The account's private key is stored as consecutive MPIs:
//! ```text
//! [2 bytes: bit length, big-endian][ceil(bits / 8) bytes: magnitude, big-endian]
//! ```
//! in the order p, q, d, u, followed by padding.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::error::{CryptoError, CryptoResult};

/// Decode a single MPI: everything after the 2-byte header is the magnitude.
pub fn decode_mpi(buf: &[u8]) -> CryptoResult<BigUint> {
    if buf.len() < 2 {
        return Err(CryptoError::Mpi(format!(
            "{} bytes is too short for the 2-byte header",
            buf.len()
        )));
    }
    Ok(BigUint::from_bytes_be(&buf[2..]))
}

/// Read one MPI off the front of `buf`, returning it and the remaining bytes.
///
/// The header counts bits, so the magnitude spans `ceil(bits / 8)` bytes.
pub fn read_mpi(buf: &[u8]) -> CryptoResult<(BigUint, &[u8])> {
    let header = buf
        .get(..2)
        .ok_or_else(|| CryptoError::Mpi("truncated header".into()))?;
    let bits = usize::from(u16::from_be_bytes([header[0], header[1]]));
    let end = 2 + (bits + 7) / 8;

    if buf.len() < end {
        return Err(CryptoError::Mpi(format!(
            "{bits}-bit integer needs {end} bytes, only {} available",
            buf.len()
        )));
    }

    Ok((decode_mpi(&buf[..end])?, &buf[end..]))
}

/// Extended Euclid: `(g, x, y)` with `a*x + b*y = g = gcd(a, b)`.
///
/// Produces the same coefficients as the textbook recursion
/// `egcd(a, b) = (g, y' - (b div a) * x', x')` where
/// `(g, x', y') = egcd(b mod a, a)` and `egcd(0, b) = (b, 0, 1)`, with floor
/// division, but without recursing.
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let mut quotients = Vec::new();
    let (mut a, mut b) = (a.clone(), b.clone());
    while !a.is_zero() {
        let (q, r) = b.div_mod_floor(&a);
        quotients.push(q);
        b = std::mem::replace(&mut a, r);
    }

    let (mut x, mut y) = (BigInt::zero(), BigInt::one());
    for q in quotients.iter().rev() {
        let next = &y - q * &x;
        y = std::mem::replace(&mut x, next);
    }

    (b, x, y)
}

/// `a^-1 mod m`, normalized into `[0, m)` for positive `m`.
pub fn modular_inverse(a: &BigInt, m: &BigInt) -> CryptoResult<BigInt> {
    if m.is_zero() {
        return Err(CryptoError::NoInverse);
    }
    let (g, x, _) = extended_gcd(a, m);
    if !g.is_one() {
        return Err(CryptoError::NoInverse);
    }
    Ok(x.mod_floor(m))
}

/// The decoded account private key.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    pub p: BigUint,
    pub q: BigUint,
    pub d: BigUint,
    pub u: BigUint,
}

impl RsaPrivateKey {
    pub fn modulus(&self) -> BigUint {
        &self.p * &self.q
    }

    /// Recover `e` as `d^-1 mod (p-1)(q-1)`.
    pub fn public_exponent(&self) -> CryptoResult<BigUint> {
        if self.p.is_zero() || self.q.is_zero() {
            return Err(CryptoError::Mpi("zero prime factor".into()));
        }
        let phi = (&self.p - 1u32) * (&self.q - 1u32);
        let e = modular_inverse(&BigInt::from(self.d.clone()), &BigInt::from(phi))?;
        e.to_biguint().ok_or(CryptoError::NoInverse)
    }
}

impl std::fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("modulus_bits", &self.modulus().bits())
            .finish_non_exhaustive()
    }
}

/// Parse the decrypted private key blob into p, q, d and u. Trailing
/// padding after the fourth MPI is ignored.
pub fn decode_private_key(blob: &[u8]) -> CryptoResult<RsaPrivateKey> {
    let (p, rest) = read_mpi(blob)?;
    let (q, rest) = read_mpi(rest)?;
    let (d, rest) = read_mpi(rest)?;
    let (u, _) = read_mpi(rest)?;
    Ok(RsaPrivateKey { p, q, d, u })
}
