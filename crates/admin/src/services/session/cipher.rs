//! Session token sealing with AES-256-GCM.
//!
//! Token format: `base64url(nonce_12bytes || ciphertext || tag_16bytes)`, no
//! padding. The key is `SHA-256(session_secret)`; the cookie name is bound as
//! associated data so a token cannot be replayed under another cookie.

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use super::SessionError;
use super::claims::SessionClaims;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Seals and opens session claims.
#[derive(Clone)]
pub struct SessionCipher {
    cipher: Aes256Gcm,
    aad: &'static [u8],
}

impl std::fmt::Debug for SessionCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl SessionCipher {
    /// Derive the cipher from the server secret.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Seal` if the derived key is rejected.
    pub fn new(secret: &SecretString, aad: &'static str) -> Result<Self, SessionError> {
        let key = Sha256::digest(secret.expose_secret().as_bytes());
        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| SessionError::Seal)?;
        Ok(Self {
            cipher,
            aad: aad.as_bytes(),
        })
    }

    /// Serialize and encrypt claims into a cookie-safe token.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Seal` if serialization or encryption fails.
    pub fn seal(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        let plaintext = serde_json::to_vec(claims).map_err(|_| SessionError::Seal)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: &plaintext,
                    aad: self.aad,
                },
            )
            .map_err(|_| SessionError::Seal)?;

        let mut token = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(token))
    }

    /// Decrypt and parse a token.
    ///
    /// Every failure (bad encoding, truncation, wrong key, tampering,
    /// unparseable payload) yields `None`.
    #[must_use]
    pub fn open(&self, token: &str) -> Option<SessionClaims> {
        let data = URL_SAFE_NO_PAD.decode(token.trim()).ok()?;
        if data.len() < NONCE_LEN + TAG_LEN {
            return None;
        }
        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce_bytes),
                Payload {
                    msg: ciphertext,
                    aad: self.aad,
                },
            )
            .ok()?;
        serde_json::from_slice(&plaintext).ok()
    }
}
