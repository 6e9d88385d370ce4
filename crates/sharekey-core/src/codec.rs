//! Text encoding of secrets.
//!
//! An encoded secret is `[type char][base58 payload][check char]`. The check
//! character is a Luhn mod 58 checksum over everything before it, type char
//! included. It catches every single-character substitution and most
//! transpositions; it is not an integrity mechanism against an adversary.

use crate::error::{Result, SecretError};
use crate::level::PrivilegeLevel;

/// The Bitcoin base58 alphabet, as used by [`bs58::Alphabet::BITCOIN`].
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

fn code_point(c: u8) -> Option<usize> {
    ALPHABET.iter().position(|&a| a == c)
}

/// Luhn mod 58 over alphabet positions, in text order.
fn luhn(codes: &[usize]) -> char {
    let n = ALPHABET.len();
    let mut factor = 2;
    let mut sum = 0;

    for &code in codes.iter().rev() {
        let addend = factor * code;
        factor = if factor == 2 { 1 } else { 2 };
        sum += addend / n + addend % n;
    }

    ALPHABET[(n - sum % n) % n] as char
}

/// Compute the Luhn mod 58 check character of `body`.
///
/// Fails if `body` contains a character outside the base58 alphabet.
pub fn check_char(body: &str) -> Result<char> {
    let codes = body
        .bytes()
        .map(|c| {
            code_point(c).ok_or_else(|| {
                SecretError::format(format!(
                    "character {:?} is outside the base58 alphabet",
                    c as char
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(luhn(&codes))
}

/// Encode a level and payload into the checked text form.
pub fn encode(level: PrivilegeLevel, payload: &[u8]) -> String {
    let mut out = String::with_capacity(payload.len() * 138 / 100 + 3);
    out.push(level.type_char());
    out.push_str(
        &bs58::encode(payload)
            .with_alphabet(bs58::Alphabet::BITCOIN)
            .into_string(),
    );

    // Type chars and base58 digits are all alphabet members.
    let codes: Vec<usize> = out.bytes().filter_map(code_point).collect();
    out.push(luhn(&codes));
    out
}

/// Split an encoded secret into its level and raw payload.
///
/// Performs every structural check: minimum length, known type char, check
/// char, base58 alphabet and exact payload length. Curve-level validation of
/// the payload is left to the caller.
pub fn decode(text: &str) -> Result<(PrivilegeLevel, Vec<u8>)> {
    if !text.is_ascii() {
        return Err(SecretError::format("secret contains non-ASCII characters"));
    }
    if text.len() < 2 {
        return Err(SecretError::format(format!(
            "secret too short: {} characters",
            text.len()
        )));
    }

    let type_char = text.as_bytes()[0] as char;
    let level = PrivilegeLevel::from_type_char(type_char).ok_or_else(|| {
        SecretError::format(format!("unknown secret type {:?}", type_char))
    })?;

    let (body, check) = text.split_at(text.len() - 1);
    let expected = check_char(body)?;
    if check.as_bytes()[0] as char != expected {
        return Err(SecretError::format("check character mismatch"));
    }

    let payload = bs58::decode(&body[1..])
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| SecretError::format(format!("invalid base58 payload: {}", e)))?;

    if payload.len() != level.payload_len() {
        return Err(SecretError::format(format!(
            "invalid {} payload length: expected {}, got {}",
            level,
            level.payload_len(),
            payload.len()
        )));
    }

    Ok((level, payload))
}
