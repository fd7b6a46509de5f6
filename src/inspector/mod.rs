//! Token classification.
//!
//! `classify` looks at a raw credential and derives a best-effort
//! `TokenMetadata` snapshot: a type label, an expiry, whether it is a JWT
//! and, for JWTs, the subject.  Signatures are never verified and the
//! function never fails; anything unrecognised is `Unknown` with the
//! default expiry of now + 24 hours.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Expiry assumed when the token itself does not say.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Classification label for a stored token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TokenKind {
    #[serde(rename = "Bearer")]
    Bearer,
    #[serde(rename = "Stripe-Key")]
    StripeKey,
    #[serde(rename = "GitHub-Token")]
    GitHubToken,
    #[serde(rename = "Slack-Token")]
    SlackToken,
    #[default]
    #[serde(rename = "Unknown")]
    Unknown,
}

impl TokenKind {
    /// The label persisted in the `token_type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bearer => "Bearer",
            Self::StripeKey => "Stripe-Key",
            Self::GitHubToken => "GitHub-Token",
            Self::SlackToken => "Slack-Token",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bearer" => Ok(Self::Bearer),
            "Stripe-Key" => Ok(Self::StripeKey),
            "GitHub-Token" => Ok(Self::GitHubToken),
            "Slack-Token" => Ok(Self::SlackToken),
            "Unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown token type '{other}'")),
        }
    }
}

/// Vendor prefixes checked in order after the JWT shape test.
const VENDOR_PREFIXES: &[(&str, TokenKind)] = &[
    ("sk_", TokenKind::StripeKey),
    ("rk_", TokenKind::StripeKey),
    ("pk_", TokenKind::StripeKey),
    ("github_pat_", TokenKind::GitHubToken),
    ("ghp_", TokenKind::GitHubToken),
    ("gho_", TokenKind::GitHubToken),
    ("ghu_", TokenKind::GitHubToken),
    ("ghs_", TokenKind::GitHubToken),
    ("xoxb-", TokenKind::SlackToken),
    ("xoxp-", TokenKind::SlackToken),
    ("xoxa-", TokenKind::SlackToken),
];

/// Metadata derived from a raw token at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(rename = "type")]
    pub token_type: TokenKind,

    /// Unix timestamp (seconds).  Best effort, never verified.
    pub expires_at: i64,

    pub is_jwt: bool,

    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl TokenMetadata {
    /// The `Unknown` classification with the default expiry relative to `now`.
    pub fn unknown_at(now: DateTime<Utc>) -> Self {
        Self {
            token_type: TokenKind::Unknown,
            expires_at: (now + Duration::hours(DEFAULT_TTL_HOURS)).timestamp(),
            is_jwt: false,
            subject: None,
        }
    }
}

/// Classify `raw` using the current time for the default expiry.
pub fn classify(raw: &str) -> TokenMetadata {
    classify_at(raw, Utc::now())
}

/// Classify `raw`, computing the default expiry from `now`.
pub fn classify_at(raw: &str, now: DateTime<Utc>) -> TokenMetadata {
    let mut meta = TokenMetadata::unknown_at(now);

    let segments: Vec<&str> = raw.split('.').collect();
    if segments.len() == 3 {
        meta.token_type = TokenKind::Bearer;
        meta.is_jwt = true;

        if let Some(claims) = decode_claims(segments[1]) {
            if let Some(exp) = claims.get("exp").and_then(numeric_claim) {
                meta.expires_at = exp;
            }
            if let Some(sub) = claims.get("sub").and_then(Value::as_str) {
                meta.subject = Some(sub.to_string());
            }
        }
        return meta;
    }

    if let Some((_, kind)) = VENDOR_PREFIXES
        .iter()
        .find(|(prefix, _)| raw.starts_with(prefix))
    {
        meta.token_type = *kind;
    }

    meta
}

/// Decode a JWT payload segment into a JSON object.  Any failure yields
/// `None`; the caller keeps its defaults.
fn decode_claims(segment: &str) -> Option<Map<String, Value>> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice::<Map<String, Value>>(&bytes).ok()
}

/// `exp` may be written as an integer or a float.
fn numeric_claim(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}
