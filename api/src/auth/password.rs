//! Password hashing
//!
//! Salted PBKDF2-HMAC-SHA256. Stored as
//! `pbkdf2_sha256$<iterations>$<salt b64>$<hash b64>` so the iteration count
//! can be raised without invalidating existing hashes.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::error::DomainError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 16;

#[cfg(not(test))]
const ITERATIONS: u32 = 600_000;
#[cfg(test)]
const ITERATIONS: u32 = 1_000;

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let derived = pbkdf2_sha256(password.as_bytes(), &salt, ITERATIONS)?;

    Ok(format!(
        "{}${}${}${}",
        ALGORITHM,
        ITERATIONS,
        STANDARD.encode(salt),
        STANDARD.encode(derived)
    ))
}

/// Check a password against a stored hash.
///
/// Malformed hashes never verify.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(algorithm), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    if algorithm != ALGORITHM {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    if iterations == 0 {
        return false;
    }
    let (Ok(salt), Ok(expected)) = (STANDARD.decode(salt), STANDARD.decode(expected)) else {
        return false;
    };

    match pbkdf2_sha256(password.as_bytes(), &salt, iterations) {
        Ok(derived) => constant_time_eq(&derived, &expected),
        Err(_) => false,
    }
}

/// PBKDF2 with a single output block (32 bytes)
fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> Result<[u8; 32], DomainError> {
    let prf = HmacSha256::new_from_slice(password)
        .map_err(|e| DomainError::Internal(format!("Invalid HMAC key: {}", e)))?;

    let mut mac = prf.clone();
    mac.update(salt);
    mac.update(&1u32.to_be_bytes());
    let mut block = mac.finalize().into_bytes();

    let mut output = [0u8; 32];
    output.copy_from_slice(&block);

    for _ in 1..iterations {
        let mut mac = prf.clone();
        mac.update(&block);
        block = mac.finalize().into_bytes();
        for (out, b) in output.iter_mut().zip(block.iter()) {
            *out ^= b;
        }
    }

    Ok(output)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
