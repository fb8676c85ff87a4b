//! Token, meeting code and verification code generation.
//!
//! All randomness comes from the process CSPRNG (`ring::rand::SystemRandom`).
//! Access tokens carry the real entropy; meeting codes and verification
//! codes are deliberately low-entropy, human-shareable secondary factors.

use crate::errors::AccessError;
use ring::rand::{SecureRandom, SystemRandom};

/// Number of random bytes in an access token (256 bits).
const ACCESS_TOKEN_BYTES: usize = 32;

/// Lowercase alphabet for meeting code segments.
const MEETING_CODE_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Meeting code segment lengths: `xxx-xxxx-xxx`.
const MEETING_CODE_SEGMENTS: [usize; 3] = [3, 4, 3];

/// Uppercase alphanumeric alphabet for verification codes.
const VERIFICATION_CODE_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of generated verification codes.
const VERIFICATION_CODE_LENGTH: usize = 6;

/// Generate an opaque access token.
///
/// Produces 32 CSPRNG bytes hex-encoded to 64 lowercase characters. The
/// token is the session's primary identifier and its only high-entropy
/// credential; it is never derived from time or counters.
pub fn new_access_token() -> Result<String, AccessError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; ACCESS_TOKEN_BYTES];

    rng.fill(&mut bytes).map_err(|e| {
        tracing::error!(target: "access.tokens", error = %e, "Failed to generate random bytes for access token");
        AccessError::Internal("RNG failure".to_string())
    })?;

    Ok(hex::encode(bytes))
}

/// Generate a human-typable meeting code.
///
/// Three lowercase-letter segments of lengths 3, 4 and 3 joined by hyphens
/// (`abc-defg-hij`). Each character is drawn uniformly from the 26-letter
/// alphabet via rejection sampling.
pub fn new_meeting_code() -> Result<String, AccessError> {
    let rng = SystemRandom::new();
    let mut segments = Vec::with_capacity(MEETING_CODE_SEGMENTS.len());

    for len in MEETING_CODE_SEGMENTS {
        let mut segment = String::with_capacity(len);
        for _ in 0..len {
            segment.push(uniform_char(&rng, MEETING_CODE_CHARS)?);
        }
        segments.push(segment);
    }

    Ok(segments.join("-"))
}

/// Generate a 6-character verification code.
///
/// Uppercase alphanumeric. This is a shared-secret-by-email second factor,
/// not a cryptographic token; the entropy requirement is only "hard to
/// guess within a small number of attempts".
pub fn new_verification_code() -> Result<String, AccessError> {
    let rng = SystemRandom::new();
    let mut code = String::with_capacity(VERIFICATION_CODE_LENGTH);

    for _ in 0..VERIFICATION_CODE_LENGTH {
        code.push(uniform_char(&rng, VERIFICATION_CODE_CHARS)?);
    }

    Ok(code)
}

/// Check whether `code` matches the meeting code grammar exactly
/// (`^[a-z]{3}-[a-z]{4}-[a-z]{3}$`).
///
/// Used as a fast-reject gate before any store lookup so malformed input
/// never probes the store.
pub fn is_valid_meeting_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.len() != 12 {
        return false;
    }

    bytes.iter().enumerate().all(|(i, &b)| match i {
        3 | 8 => b == b'-',
        _ => b.is_ascii_lowercase(),
    })
}

/// Draw one character uniformly from `alphabet`.
///
/// Rejection sampling: a raw byte is accepted only if it falls below the
/// largest multiple of the alphabet size, so `byte % len` is unbiased.
fn uniform_char(rng: &SystemRandom, alphabet: &[u8]) -> Result<char, AccessError> {
    let len = alphabet.len();
    // Largest multiple of `len` that fits in a byte
    let limit = (256 / len * len) as u8;

    loop {
        let mut byte = [0u8; 1];
        rng.fill(&mut byte).map_err(|e| {
            tracing::error!(target: "access.tokens", error = %e, "Failed to generate random byte");
            AccessError::Internal("RNG failure".to_string())
        })?;

        // limit == 0 means len divides 256 exactly and every byte is fair
        if limit == 0 || byte[0] < limit {
            let idx = usize::from(byte[0]) % len;
            let ch = alphabet
                .get(idx)
                .ok_or_else(|| AccessError::Internal("Alphabet index out of range".to_string()))?;
            return Ok(char::from(*ch));
        }
    }
}
