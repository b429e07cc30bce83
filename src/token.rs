//! Redirect token codec.
//!
//! AES-256-GCM keyed by SHA-256 of the configured secret. Tokens are issued as
//!
//! ```text
//! v1.<base64url-no-pad(nonce)>.<base64url-no-pad(ciphertext+tag)>
//! ```
//!
//! The version prefix lets the decoder accept older layouts. The only other one
//! understood is the legacy `<base64(iv)>:<base64(ciphertext+tag)>` pair, which is
//! decoded but never produced.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Version tag of tokens produced by [`TokenCodec::encrypt`].
pub const TOKEN_VERSION: &str = "v1";

const NONCE_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token secret cannot be empty")]
    EmptySecret,
    #[error("malformed token")]
    Malformed,
    #[error("unsupported token version '{0}'")]
    UnsupportedVersion(String),
    /// Wrong key or tampered ciphertext.
    #[error("token failed authentication")]
    Authentication,
    #[error("encryption failed")]
    Encryption,
    #[error("token payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("token destination is not an absolute http(s) URL")]
    InvalidDestination,
}

/// Layouts the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFormat {
    V1,
    LegacyColon,
}

/// Symmetric codec for redirect tokens, built once from the process secret.
#[derive(Clone)]
pub struct TokenCodec {
    cipher: Aes256Gcm,
}

impl TokenCodec {
    pub fn from_secret(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        let key = Sha256::digest(secret.as_bytes());
        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| TokenError::Encryption)?;
        Ok(Self { cipher })
    }

    /// Encrypts `plaintext` into a fresh `v1` token.
    ///
    /// Each call draws a new random nonce, so equal inputs give different tokens.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, TokenError> {
        let (nonce, ciphertext) = self.seal(plaintext)?;
        Ok(format!(
            "{}.{}.{}",
            TOKEN_VERSION,
            URL_SAFE_NO_PAD.encode(nonce),
            URL_SAFE_NO_PAD.encode(ciphertext)
        ))
    }

    /// Decrypts a token in any supported format back to its plaintext.
    pub fn decrypt(&self, token: &str) -> Result<String, TokenError> {
        let (nonce, ciphertext) = match detect_format(token)? {
            TokenFormat::V1 => split_v1(token)?,
            TokenFormat::LegacyColon => split_legacy(token)?,
        };
        self.open(&nonce, &ciphertext)
    }

    fn seal(&self, plaintext: &str) -> Result<([u8; NONCE_LEN], Vec<u8>), TokenError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| TokenError::Encryption)?;

        Ok((nonce, ciphertext))
    }

    fn open(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<String, TokenError> {
        // from_slice panics on any other length
        if nonce.len() != NONCE_LEN {
            return Err(TokenError::Malformed);
        }

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| TokenError::Authentication)?;

        String::from_utf8(plaintext).map_err(|_| TokenError::InvalidUtf8)
    }
}

/// Identifies the layout of `token` without decoding it.
pub fn detect_format(token: &str) -> Result<TokenFormat, TokenError> {
    if let Some((version, _)) = token.split_once('.') {
        if version == TOKEN_VERSION {
            return Ok(TokenFormat::V1);
        }
        if is_version_tag(version) {
            return Err(TokenError::UnsupportedVersion(version.to_string()));
        }
    }
    if token.contains(':') {
        return Ok(TokenFormat::LegacyColon);
    }
    Err(TokenError::Malformed)
}

fn is_version_tag(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.len() <= 4 && n.bytes().all(|b| b.is_ascii_digit()))
}

fn split_v1(token: &str) -> Result<(Vec<u8>, Vec<u8>), TokenError> {
    let rest = token
        .strip_prefix(TOKEN_VERSION)
        .and_then(|rest| rest.strip_prefix('.'))
        .ok_or(TokenError::Malformed)?;
    let (nonce, ciphertext) = rest.split_once('.').ok_or(TokenError::Malformed)?;

    Ok((
        URL_SAFE_NO_PAD
            .decode(nonce)
            .map_err(|_| TokenError::Malformed)?,
        URL_SAFE_NO_PAD
            .decode(ciphertext)
            .map_err(|_| TokenError::Malformed)?,
    ))
}

fn split_legacy(token: &str) -> Result<(Vec<u8>, Vec<u8>), TokenError> {
    // Unencoded '+' in a query string arrives as a space. A token that still
    // holds a '+' was not mangled, so its spaces stay invalid.
    let token = if token.contains('+') {
        token.to_string()
    } else {
        token.replace(' ', "+")
    };
    let (iv, ciphertext) = token.split_once(':').ok_or(TokenError::Malformed)?;

    Ok((
        STANDARD.decode(iv).map_err(|_| TokenError::Malformed)?,
        STANDARD
            .decode(ciphertext)
            .map_err(|_| TokenError::Malformed)?,
    ))
}
