// src/keys.rs
//
// Ed25519 key material and the StrKey text encoding the ledger uses for it.
// Public keys render as 56-char "G..." strings, secret seeds as "S...".

use ed25519_dalek::{Keypair as DalekKeypair, PublicKey, SecretKey, Signer};
use rand::rngs::OsRng;
use rand::RngCore;

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// StrKey version byte for ed25519 public keys ("G...").
const VERSION_ACCOUNT: u8 = 6 << 3;
/// StrKey version byte for ed25519 secret seeds ("S...").
const VERSION_SEED: u8 = 18 << 3;

// =============================================================================
// StrKey codec
// =============================================================================

// RFC 4648 base32, upper-case, unpadded. StrKey payloads are always 35 bytes
// (version + key + checksum), which lands exactly on 56 characters.
fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    for &byte in data {
        acc = (acc << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((acc >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((acc << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

fn base32_decode(s: &str) -> Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(s.len() * 5 / 8);
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    for c in s.bytes() {
        let val = BASE32_ALPHABET
            .iter()
            .position(|&a| a == c)
            .ok_or_else(|| format!("invalid base32 character '{}'", c as char))?;
        acc = (acc << 5) | val as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push(((acc >> bits) & 0xff) as u8);
        }
    }
    Ok(out)
}

/// CRC16-XModem (poly 0x1021, init 0), appended little-endian to StrKeys.
fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

fn encode_strkey(version: u8, key: &[u8; 32]) -> String {
    let mut data = Vec::with_capacity(35);
    data.push(version);
    data.extend_from_slice(key);
    let crc = crc16_xmodem(&data);
    data.extend_from_slice(&crc.to_le_bytes());
    base32_encode(&data)
}

fn decode_strkey(version: u8, s: &str) -> Result<[u8; 32], String> {
    if s.len() != 56 {
        return Err(format!("strkey must be 56 characters, got {}", s.len()));
    }
    let data = base32_decode(s)?;
    if data.len() != 35 {
        return Err(format!("strkey decodes to {} bytes, expected 35", data.len()));
    }
    if data[0] != version {
        return Err(format!("unexpected strkey version byte {:#04x}", data[0]));
    }
    let (body, checksum) = data.split_at(33);
    if checksum != &crc16_xmodem(body).to_le_bytes()[..] {
        return Err("strkey checksum mismatch".to_string());
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(&body[1..]);
    Ok(key)
}

/// Decodes a "G..." account id to its raw 32 key bytes.
pub fn decode_public_key(account_id: &str) -> Result<[u8; 32], String> {
    decode_strkey(VERSION_ACCOUNT, account_id)
}

// =============================================================================
// Keypair
// =============================================================================

/// An ed25519 account keypair. Lives only for the duration of a run;
/// nothing here is ever persisted.
pub struct Keypair {
    inner: DalekKeypair,
}

impl Keypair {
    /// Generates a fresh random keypair.
    pub fn random() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self::from_seed(seed)
    }

    /// Builds a keypair from a raw 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        // from_bytes only rejects wrong lengths, which a [u8; 32] rules out
        let secret = SecretKey::from_bytes(&seed).unwrap();
        let public = PublicKey::from(&secret);
        Keypair {
            inner: DalekKeypair { secret, public },
        }
    }

    /// Parses an "S..." seed string.
    pub fn from_secret(secret: &str) -> Result<Self, String> {
        let seed = decode_strkey(VERSION_SEED, secret)?;
        Ok(Self::from_seed(seed))
    }

    /// Public key in "G..." form.
    pub fn public_key(&self) -> String {
        encode_strkey(VERSION_ACCOUNT, &self.inner.public.to_bytes())
    }

    /// Secret seed in "S..." form. Keep out of logs.
    pub fn secret(&self) -> String {
        encode_strkey(VERSION_SEED, &self.inner.secret.to_bytes())
    }

    pub fn public_bytes(&self) -> [u8; 32] {
        self.inner.public.to_bytes()
    }

    /// Last four public-key bytes; decorates signatures so the network can
    /// match them to signers.
    pub fn hint(&self) -> [u8; 4] {
        let bytes = self.inner.public.to_bytes();
        [bytes[28], bytes[29], bytes[30], bytes[31]]
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.inner.sign(message).to_bytes()
    }
}

// =============================================================================
// Tests
// =============================================================================
