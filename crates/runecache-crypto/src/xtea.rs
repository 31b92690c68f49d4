//! XTEA block cipher for encrypted cache containers
//!
//! Containers use big-endian XTEA with 32 rounds over successive 8-byte
//! blocks. The cipher is length preserving: a trailing partial block shorter
//! than 8 bytes is not encrypted and passes through untouched.
//!
//! ## Usage
//!
//! ```rust
//! use runecache_crypto::{XteaKey, xtea};
//!
//! let key = XteaKey::from_words([0xDEAD_BEEF, 0, 0, 1]);
//! let ciphertext = xtea::encrypt(&key, b"Hello, XTEA block!");
//! let plaintext = xtea::decrypt(&key, &ciphertext);
//! assert_eq!(&plaintext, b"Hello, XTEA block!");
//! ```

use crate::keys::XteaKey;

/// Key schedule constant (2^32 / golden ratio)
pub const GOLDEN_RATIO: u32 = 0x9E37_79B9;

/// Number of Feistel rounds
pub const ROUNDS: u32 = 32;

/// Cipher block size in bytes
pub const BLOCK_SIZE: usize = 8;

/// Decrypt `data` in place.
///
/// Only whole 8-byte blocks are processed; any remainder is left as is.
pub fn decrypt_in_place(key: &XteaKey, data: &mut [u8]) {
    let k = key.words();

    for block in data.chunks_exact_mut(BLOCK_SIZE) {
        let (mut v0, mut v1) = load_block(block);
        let mut sum = GOLDEN_RATIO.wrapping_mul(ROUNDS);

        for _ in 0..ROUNDS {
            v1 = v1.wrapping_sub(
                (((v0 << 4) ^ (v0 >> 5)).wrapping_add(v0))
                    ^ sum.wrapping_add(k[((sum >> 11) & 3) as usize]),
            );
            sum = sum.wrapping_sub(GOLDEN_RATIO);
            v0 = v0.wrapping_sub(
                (((v1 << 4) ^ (v1 >> 5)).wrapping_add(v1)) ^ sum.wrapping_add(k[(sum & 3) as usize]),
            );
        }

        store_block(block, v0, v1);
    }
}

/// Encrypt `data` in place.
///
/// Inverse of [`decrypt_in_place`]; provided so callers and tests can
/// produce reference ciphertext.
pub fn encrypt_in_place(key: &XteaKey, data: &mut [u8]) {
    let k = key.words();

    for block in data.chunks_exact_mut(BLOCK_SIZE) {
        let (mut v0, mut v1) = load_block(block);
        let mut sum = 0u32;

        for _ in 0..ROUNDS {
            v0 = v0.wrapping_add(
                (((v1 << 4) ^ (v1 >> 5)).wrapping_add(v1)) ^ sum.wrapping_add(k[(sum & 3) as usize]),
            );
            sum = sum.wrapping_add(GOLDEN_RATIO);
            v1 = v1.wrapping_add(
                (((v0 << 4) ^ (v0 >> 5)).wrapping_add(v0))
                    ^ sum.wrapping_add(k[((sum >> 11) & 3) as usize]),
            );
        }

        store_block(block, v0, v1);
    }
}

/// Decrypt a copy of `data`
pub fn decrypt(key: &XteaKey, data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    decrypt_in_place(key, &mut out);
    out
}

/// Encrypt a copy of `data`
pub fn encrypt(key: &XteaKey, data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    encrypt_in_place(key, &mut out);
    out
}

fn load_block(block: &[u8]) -> (u32, u32) {
    let v0 = u32::from_be_bytes([block[0], block[1], block[2], block[3]]);
    let v1 = u32::from_be_bytes([block[4], block[5], block[6], block[7]]);
    (v0, v1)
}

fn store_block(block: &mut [u8], v0: u32, v1: u32) {
    block[..4].copy_from_slice(&v0.to_be_bytes());
    block[4..8].copy_from_slice(&v1.to_be_bytes());
}
