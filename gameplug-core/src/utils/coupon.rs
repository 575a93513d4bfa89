// File: gameplug-core/src/utils/coupon.rs

use rand::rngs::OsRng;
use rand_core::TryRngCore;

use crate::Error;

/// Length in bytes of the random coupon suffix (rendered as hex).
const COUPON_SUFFIX_BYTES: usize = 4;

/// Generates a coupon code: fixed "GP-" prefix plus 8 uppercase hex chars
/// from the OS entropy source. Collisions are treated as negligible; codes
/// are not checked against previously issued ones.
pub fn generate_coupon_code() -> Result<String, Error> {
    let mut bytes = [0u8; COUPON_SUFFIX_BYTES];
    let mut rng = OsRng;
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Rng(e.to_string()))?;

    let suffix: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
    Ok(format!("GP-{suffix}"))
}
