//! # Hashing
//!
//! Stable identities used for idempotent sync.
//!
//! ```text
//! sale hash:   sha256("JD1-BLK-10|2|2025-10-09|170.00")   → 64 hex chars
//! fingerprint: sha256(sorted(unique(sale hashes)).join("|"))
//! ```
//!
//! The SKU is trimmed and upper-cased, the date trimmed, and the price is
//! rendered with two decimals. Changing any of these changes every stored
//! hash, so the format is frozen.
//!
//! Only the hash folds case. Reconciliation looks SKUs up exactly, so a
//! sale for `"a"` dedups against one for `"A"` yet is reported missing
//! when the sheet only holds `"A"`.

use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

use crate::money::Money;
use crate::types::SyncBatchFingerprint;

/// Hex-encoded SHA-256 of a string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Dedup hash of one sale.
///
/// The SKU is upper-cased here but matched case-sensitively against the
/// snapshot, so two sales differing only in SKU case share one hash.
pub fn sale_hash(sku: &str, quantity: i64, date: &str, unit_price: Money) -> String {
    let canonical = format!(
        "{}|{}|{}|{}",
        sku.trim().to_uppercase(),
        quantity,
        date.trim(),
        unit_price
    );
    sha256_hex(&canonical)
}

/// Fingerprint of a batch: order-independent and duplicate-insensitive.
pub fn batch_fingerprint<I, S>(hashes: I) -> SyncBatchFingerprint
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: BTreeSet<String> = hashes
        .into_iter()
        .map(|h| h.as_ref().to_string())
        .collect();
    let joined = unique.into_iter().collect::<Vec<_>>().join("|");
    SyncBatchFingerprint::new(sha256_hex(&joined))
}
