//! Canonicalization and MD5 signatures.
//!
//! One canonicalizer serves both directions: outbound requests are signed
//! over the assembled [`FieldSet`], inbound XML replies are verified over the
//! flat map decoded from the body. Both feed the same `(key, value)` pairs
//! into [`canonicalize`], so a field set signed with a secret always verifies
//! with that secret.
//!
//! The algorithm:
//!
//! 1. drop entries with an empty value;
//! 2. drop the `sign` field itself;
//! 3. sort by key in ascending byte order;
//! 4. join as `key=value` pairs with `&`;
//! 5. append `&key=<secret>`;
//! 6. MD5 the bytes and render as uppercase hex.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fields::FieldSet;
use crate::{Result, WxPayError};

/// Field carrying the signature.
pub const FIELD_SIGN: &str = "sign";

/// Field carrying the signature scheme tag.
pub const FIELD_SIGN_TYPE: &str = "sign_type";

/// Field carrying the random nonce.
pub const FIELD_NONCE_STR: &str = "nonce_str";

/// Length of generated nonces.
pub const NONCE_LEN: usize = 32;

/// Signature scheme tag sent as `sign_type`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignType {
    /// MD5 over the canonical string.
    #[default]
    #[serde(rename = "MD5")]
    Md5,
}

impl SignType {
    /// Wire value of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
        }
    }
}

impl fmt::Display for SignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the canonical `k=v&k=v` string over `fields`.
///
/// When a key appears more than once the first occurrence wins.
pub fn canonicalize<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs: Vec<(&str, &str)> = fields
        .into_iter()
        .filter(|(key, value)| !value.is_empty() && *key != FIELD_SIGN)
        .collect();
    // Stable sort keeps the first occurrence ahead of later duplicates.
    pairs.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    pairs.dedup_by(|later, earlier| later.0 == earlier.0);

    let mut out = String::new();
    for (i, (key, value)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
    }
    out
}

/// Sign `fields` with `secret`.
pub fn sign<'a, I>(fields: I, secret: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let payload = format!("{}&key={}", canonicalize(fields), secret);
    format!("{:X}", md5::compute(payload.as_bytes()))
}

/// Verify the `sign` field of `fields` against a signature recomputed with `secret`.
///
/// The comparison is case-sensitive.
pub fn verify(fields: &FieldSet, secret: &str) -> Result<()> {
    let received = fields.get(FIELD_SIGN).unwrap_or_default();
    let computed = sign(fields.iter(), secret);
    if received != computed {
        return Err(WxPayError::SignatureMismatch {
            received: received.to_string(),
            computed,
        });
    }
    Ok(())
}

/// Generate a nonce of [`NONCE_LEN`] characters drawn from `[A-Za-z0-9]`.
pub fn nonce_str() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}
