//! AES-256-GCM sealing for stored tokens.
//!
//! Every token is sealed with its own random nonce; ciphertext and nonce are
//! kept base64-encoded side by side in the store.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// 256-bit key
const KEY_SIZE: usize = 32;

/// 96-bit GCM nonce
const NONCE_SIZE: usize = 12;

/// A sealed token as persisted: (ciphertext, nonce), both base64.
#[derive(Debug, Clone, PartialEq)]
pub struct Sealed {
    pub ciphertext: String,
    pub nonce: String,
}

/// Holds the master key for the lifetime of the store.
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl TokenCipher {
    /// Build a cipher from a base64-encoded 32-byte key.
    pub fn from_base64_key(key_base64: &str) -> Result<Self> {
        let key_bytes = BASE64
            .decode(key_base64.trim())
            .context("Encryption key is not valid base64")?;

        if key_bytes.len() != KEY_SIZE {
            bail!(
                "Encryption key must be {} bytes (256 bits), got {} bytes",
                KEY_SIZE,
                key_bytes.len()
            );
        }

        let cipher = Aes256Gcm::new_from_slice(&key_bytes)
            .map_err(|e| anyhow!("Failed to create cipher: {}", e))?;

        Ok(Self { cipher })
    }

    pub fn seal(&self, plaintext: &str) -> Result<Sealed> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| anyhow!("Encryption failed: {}", e))?;

        Ok(Sealed {
            ciphertext: BASE64.encode(ciphertext),
            nonce: BASE64.encode(nonce),
        })
    }

    /// Fails on a wrong key, a corrupted column, or tampering.
    pub fn open(&self, sealed: &Sealed) -> Result<String> {
        let ciphertext = BASE64
            .decode(&sealed.ciphertext)
            .context("Failed to decode ciphertext")?;
        let nonce = BASE64
            .decode(&sealed.nonce)
            .context("Failed to decode nonce")?;

        if nonce.len() != NONCE_SIZE {
            bail!(
                "Invalid nonce size: expected {}, got {}",
                NONCE_SIZE,
                nonce.len()
            );
        }

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
            .map_err(|e| anyhow!("Decryption failed (wrong key or corrupted data): {}", e))?;

        String::from_utf8(plaintext).context("Decrypted token is not valid UTF-8")
    }
}
