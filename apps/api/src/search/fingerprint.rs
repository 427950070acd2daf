//! Search-profile fingerprinting.
//!
//! Two searches share rejection memory iff their profiles canonicalize to the same
//! payload. The payload is tagged with field names and types and carries a schema
//! version, then hashed with SHA-256.
//!
//! Canonical forms:
//! - integers: truncated, plain decimal (`"25"`, `"-1"`)
//! - money: exactly two decimals (`5` and `"5.00"` both become `"5.00"`)
//! - postal code: trimmed, upper-cased, whitespace removed
//! - remaining time: `P{days}DT{hours}H`
//! - anything missing, blank, unparseable, or too large to hold exactly: `∅`

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::search::params::{FormValue, SearchProfile, MAX_EXACT_INTEGER};

/// Bump when the set of fingerprinted fields or their canonical forms change.
pub const FINGERPRINT_VERSION: &str = "v1";
const ABSENT: &str = "∅";

/// Hex-encoded SHA-256 of a canonical search profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProfileFingerprint(String);

impl ProfileFingerprint {
    pub fn compute(profile: &SearchProfile) -> Self {
        let digest = Sha256::digest(canonical_payload(profile).as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The exact string that gets hashed.
pub fn canonical_payload(profile: &SearchProfile) -> String {
    let days = canon_int(profile.time_remaining_days.as_ref());
    let hours = canon_int(profile.time_remaining_hours.as_ref());

    [
        format!("v={FINGERPRINT_VERSION}"),
        format!("miles:i={}", canon_int(profile.miles.as_ref())),
        format!("zip:s={}", canon_zip(profile.zip.as_ref())),
        format!("minProfit:m={}", canon_money(profile.min_profit.as_ref())),
        format!("budget:m={}", canon_money(profile.budget.as_ref())),
        format!("timeRemaining:d=P{days}DT{hours}H"),
    ]
    .join("|")
}

fn canon_int(value: Option<&FormValue>) -> String {
    value
        .and_then(FormValue::as_i64)
        .map(|n| n.to_string())
        .unwrap_or_else(|| ABSENT.to_string())
}

fn canon_money(value: Option<&FormValue>) -> String {
    let Some(n) = value.and_then(FormValue::as_f64) else {
        return ABSENT.to_string();
    };
    let cents = (n * 100.0).round();
    if cents.abs() >= MAX_EXACT_INTEGER {
        return ABSENT.to_string();
    }
    let cents = cents as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}

fn canon_zip(value: Option<&FormValue>) -> String {
    let zip: String = value
        .and_then(FormValue::as_text)
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if zip.is_empty() {
        ABSENT.to_string()
    } else {
        zip
    }
}
