use super::*;

/// Target at difficulty 1: `0x00000000ff000000...`.
pub static DIFF1: LazyLock<U256> = LazyLock::new(|| {
    let mut bytes = [0u8; 32];
    bytes[4] = 0xff;
    U256::from_big_endian(&bytes)
});

const SCALE: u64 = 1_000_000_000;

/// Largest scaled difficulty whose rounding is still exact in an `f64`.
const MAX_EXACT_SCALED: f64 = 9_007_199_254_740_992.0;

/// Share target for an assigned difficulty: `limit / difficulty`, truncated.
///
/// Difficulties with at most nine decimal places divide by their decimal
/// value, so `0.1` means one tenth. Everything else divides by the exact
/// binary value of the float. The division happens on 512-bit integers and a
/// target that does not fit saturates to the maximum.
pub fn share_target(limit: U256, difficulty: f64) -> Result<U256> {
    ensure!(
        difficulty.is_finite() && difficulty > 0.0,
        "difficulty must be finite and positive, got {difficulty}"
    );

    if limit.is_zero() {
        return Ok(U256::zero());
    }

    let scaled = (difficulty * SCALE as f64).round();

    if (1.0..MAX_EXACT_SCALED).contains(&scaled) && scaled / SCALE as f64 == difficulty {
        return Ok(saturate(
            U512::from(limit) * U512::from(SCALE) / U512::from(scaled as u64),
        ));
    }

    let (mantissa, exponent) = decompose(difficulty);

    if exponent >= 0 {
        if exponent >= 256 {
            return Ok(U256::zero());
        }

        return Ok(saturate(
            U512::from(limit) / (U512::from(mantissa) << exponent as usize),
        ));
    }

    let shift = exponent.unsigned_abs() as usize;

    if limit.bits() + shift > 512 {
        return Ok(U256::MAX);
    }

    Ok(saturate((U512::from(limit) << shift) / U512::from(mantissa)))
}

/// Splits a positive finite float into `mantissa * 2^exponent`.
fn decompose(value: f64) -> (u64, i32) {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1 << 52) - 1);

    if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | 1 << 52, biased - 1075)
    }
}

fn saturate(value: U512) -> U256 {
    U256::try_from(value).unwrap_or(U256::MAX)
}

/// 64 lowercase hex characters, big-endian, zero padded.
pub fn target_hex(target: U256) -> String {
    hex::encode(target.to_big_endian())
}

/// Difficulty of a target relative to [`DIFF1`].
pub fn target_difficulty(target: U256) -> f64 {
    if target.is_zero() {
        return f64::INFINITY;
    }

    to_f64(*DIFF1) / to_f64(target)
}

/// Difficulty achieved by a proof-of-work digest. The digest is read as a
/// little-endian integer. Returns `None` for an all-zero digest.
pub fn share_difficulty(digest: &[u8; 32], multiplier: f64) -> Option<f64> {
    let hash = U256::from_little_endian(digest);

    if hash.is_zero() {
        return None;
    }

    Some(to_f64(*DIFF1) / to_f64(hash) * multiplier)
}

pub(crate) fn to_f64(value: U256) -> f64 {
    value
        .0
        .iter()
        .rev()
        .fold(0.0, |acc, limb| acc * 18_446_744_073_709_551_616.0 + *limb as f64)
}
