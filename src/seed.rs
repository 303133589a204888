//! Base seeds and per-worker seed derivation.
//!
//! A JSON seed keeps its numeric kind: `101` and `101.5` are different
//! variants because they key the generators differently. Integral floats
//! hash to the equal integer, so `101.0` and `101` produce the same stream.
//! Integer literals are read from their source text and never pass through
//! a float.

use serde::de::{self, Deserialize, Deserializer};
use serde_json::value::RawValue;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const HASH_BITS: i32 = 61;
const HASH_MODULUS: u64 = (1 << HASH_BITS) - 1;
const HASH_INF: i64 = 314_159;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Seed {
    Int(i128),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParseSeedError(String);

impl Seed {
    /// Seed for worker `worker`: `base + worker`.
    ///
    /// Returns `None` when an integer seed would overflow.
    pub fn offset(self, worker: usize) -> Option<Seed> {
        match self {
            Seed::Int(base) => i128::try_from(worker)
                .ok()
                .and_then(|w| base.checked_add(w))
                .map(Seed::Int),
            Seed::Float(base) => Some(Seed::Float(base + worker as f64)),
        }
    }

    /// Generator key: `|n|` for integers, the modular hash reinterpreted as
    /// a 64-bit unsigned value for floats.
    pub fn key(self) -> u128 {
        match self {
            Seed::Int(n) => n.unsigned_abs(),
            Seed::Float(x) => u128::from(float_hash(x) as u64),
        }
    }

    /// [`Seed::key`] as little-endian 32-bit words without leading zero
    /// words, `[0]` for a zero key.
    pub fn key_words(self) -> Vec<u32> {
        let mut key = self.key();
        let mut words = Vec::with_capacity(4);
        while key != 0 {
            words.push(key as u32);
            key >>= 32;
        }
        if words.is_empty() {
            words.push(0);
        }
        words
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seed::Int(n) => write!(f, "{n}"),
            Seed::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<i64> for Seed {
    fn from(n: i64) -> Self {
        Seed::Int(n.into())
    }
}

impl From<f64> for Seed {
    fn from(x: f64) -> Self {
        Seed::Float(x)
    }
}

impl FromStr for Seed {
    type Err = ParseSeedError;

    /// Parses a JSON number literal. Integer literals must fit in `i128`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix('-').unwrap_or(s);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse::<i128>()
                .map(Seed::Int)
                .map_err(|_| ParseSeedError(format!("integer seed {s} is out of range")));
        }

        serde_json::from_str::<f64>(s)
            .map(Seed::Float)
            .map_err(|_| ParseSeedError(format!("seed must be a number, got {s}")))
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        raw.get().parse().map_err(de::Error::custom)
    }
}

/// Numeric hash of a float reduced modulo `2^61 - 1`.
///
/// Equal numbers hash equal regardless of kind, and `-1` is reserved so it
/// maps to `-2`.
fn float_hash(x: f64) -> i64 {
    if x.is_nan() {
        return 0;
    }
    if x.is_infinite() {
        return if x > 0.0 { HASH_INF } else { -HASH_INF };
    }

    let (mut m, mut e) = frexp(x);
    let sign = if m < 0.0 {
        m = -m;
        -1
    } else {
        1
    };

    // consume the mantissa 28 bits at a time
    let mut h: u64 = 0;
    while m != 0.0 {
        h = ((h << 28) & HASH_MODULUS) | (h >> (HASH_BITS - 28));
        m *= 268_435_456.0;
        e -= 28;
        let y = m as u64;
        m -= y as f64;
        h += y;
        if h >= HASH_MODULUS {
            h -= HASH_MODULUS;
        }
    }

    let e = if e >= 0 {
        e % HASH_BITS
    } else {
        HASH_BITS - 1 - ((-1 - e) % HASH_BITS)
    };
    h = ((h << e) & HASH_MODULUS) | (h >> (HASH_BITS - e));

    let h = h as i64 * sign;
    if h == -1 {
        -2
    } else {
        h
    }
}

/// Splits a finite float into a mantissa in `[0.5, 1)` and a power of two.
fn frexp(x: f64) -> (f64, i32) {
    if x == 0.0 || !x.is_finite() {
        return (x, 0);
    }

    let bits = x.to_bits();
    let exp = ((bits >> 52) & 0x7ff) as i32;
    if exp == 0 {
        // subnormal: scale into the normal range first
        let (m, e) = frexp(x * 2f64.powi(54));
        return (m, e - 54);
    }

    let m = f64::from_bits((bits & !(0x7ff << 52)) | (1022 << 52));
    (m, exp - 1022)
}
