//! Secret encryption for integration settings using AES-256-GCM.
//!
//! Secret setting values (client secrets, OAuth tokens) are sealed with a key
//! from configuration and bound to their owning tenant, integration and
//! setting name through additional authenticated data (AAD). Sealed values are
//! stored as text: `enc:` followed by base64 of `version || nonce || ciphertext`.

#![allow(deprecated)]

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use thiserror::Error;
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

const VERSION_ENCRYPTED: u8 = 0x01;
const VERSION_FIELD_LEN: usize = 1;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const MIN_ENCRYPTED_LEN: usize = VERSION_FIELD_LEN + NONCE_LEN + TAG_LEN;

/// Text prefix marking a sealed setting value.
pub const SEALED_PREFIX: &str = "enc:";

/// Crypto error types
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("invalid ciphertext format")]
    InvalidFormat,
    #[error("empty ciphertext")]
    EmptyCiphertext,
    #[error("invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),
}

/// Secure wrapper for encryption keys with zeroization
#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub struct ZeroizingKey(Vec<u8>);

pub type CryptoKey = ZeroizingKey;

impl CryptoKey {
    pub fn new(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength(bytes.len()));
        }
        Ok(ZeroizingKey(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Encrypt bytes using AES-256-GCM
pub fn encrypt_bytes(
    key: &CryptoKey,
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher_key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
    let cipher = Aes256Gcm::new(cipher_key);

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let mut ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut result = Vec::with_capacity(VERSION_FIELD_LEN + NONCE_LEN + ciphertext.len());
    result.push(VERSION_ENCRYPTED);
    result.extend_from_slice(&nonce);
    result.append(&mut ciphertext);

    Ok(result)
}

/// Decrypt bytes produced by [`encrypt_bytes`]
pub fn decrypt_bytes(
    key: &CryptoKey,
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.is_empty() {
        return Err(CryptoError::EmptyCiphertext);
    }

    if !is_encrypted_payload(ciphertext) {
        return Err(CryptoError::InvalidFormat);
    }

    let nonce = Nonce::from_slice(&ciphertext[VERSION_FIELD_LEN..VERSION_FIELD_LEN + NONCE_LEN]);
    let tag_and_ct = &ciphertext[VERSION_FIELD_LEN + NONCE_LEN..];

    let cipher_key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
    let cipher = Aes256Gcm::new(cipher_key);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: tag_and_ct,
                aad,
            },
        )
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

/// Determine if a payload is using the encrypted format
pub fn is_encrypted_payload(ciphertext: &[u8]) -> bool {
    ciphertext.len() >= MIN_ENCRYPTED_LEN && ciphertext[0] == VERSION_ENCRYPTED
}

/// Binds a sealed setting value to its owner.
#[derive(Debug, Clone, Copy)]
pub struct SettingAad<'a> {
    pub tenant_id: Uuid,
    pub integration_id: Uuid,
    pub setting_name: &'a str,
}

impl SettingAad<'_> {
    fn to_bytes(self) -> Vec<u8> {
        format!(
            "{}|{}|{}",
            self.tenant_id, self.integration_id, self.setting_name
        )
        .into_bytes()
    }
}

/// Seal a setting value for storage.
pub fn seal_setting_value(
    key: &CryptoKey,
    aad: SettingAad<'_>,
    value: &str,
) -> Result<String, CryptoError> {
    let sealed = encrypt_bytes(key, &aad.to_bytes(), value.as_bytes())?;
    Ok(format!("{SEALED_PREFIX}{}", STANDARD.encode(sealed)))
}

/// Open a stored setting value. Values without the sealed prefix are returned as-is.
pub fn open_setting_value(
    key: &CryptoKey,
    aad: SettingAad<'_>,
    stored: &str,
) -> Result<String, CryptoError> {
    let Some(encoded) = stored.strip_prefix(SEALED_PREFIX) else {
        return Ok(stored.to_string());
    };

    let sealed = STANDARD
        .decode(encoded)
        .map_err(|_| CryptoError::InvalidFormat)?;
    let plaintext = decrypt_bytes(key, &aad.to_bytes(), &sealed)?;

    String::from_utf8(plaintext)
        .map_err(|e| CryptoError::DecryptionFailed(format!("Invalid UTF-8: {}", e)))
}

pub fn is_sealed(stored: &str) -> bool {
    stored.starts_with(SEALED_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> CryptoKey {
        CryptoKey::new(vec![0u8; 32]).expect("valid test key")
    }

    fn aad(name: &str) -> SettingAad<'_> {
        SettingAad {
            tenant_id: Uuid::nil(),
            integration_id: Uuid::nil(),
            setting_name: name,
        }
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key();
        let encrypted = encrypt_bytes(&key, b"aad", b"secret message").unwrap();
        let decrypted = decrypt_bytes(&key, b"aad", &encrypted).unwrap();

        assert_eq!(decrypted, b"secret message");
    }

    #[test]
    fn test_different_aad_fails() {
        let key = test_key();
        let encrypted = encrypt_bytes(&key, b"aad-1", b"secret message").unwrap();

        assert!(decrypt_bytes(&key, b"aad-2", &encrypted).is_err());
    }

    #[test]
    fn test_modified_ciphertext_fails() {
        let key = test_key();
        let mut encrypted = encrypt_bytes(&key, b"aad", b"secret message").unwrap();
        encrypted[13] ^= 0x01;

        assert!(decrypt_bytes(&key, b"aad", &encrypted).is_err());
    }

    #[test]
    fn test_nonce_uniqueness() {
        let key = test_key();
        let encrypted1 = encrypt_bytes(&key, b"aad", b"secret").unwrap();
        let encrypted2 = encrypt_bytes(&key, b"aad", b"secret").unwrap();

        assert_ne!(&encrypted1[1..13], &encrypted2[1..13]);
    }

    #[test]
    fn test_invalid_key_length_rejected() {
        assert!(matches!(
            CryptoKey::new(vec![0u8; 16]),
            Err(CryptoError::InvalidKeyLength(16))
        ));
    }

    #[test]
    fn test_insufficient_ciphertext_length() {
        let key = test_key();
        let result = decrypt_bytes(&key, b"aad", &[VERSION_ENCRYPTED, 0x02]);
        assert!(matches!(result, Err(CryptoError::InvalidFormat)));
    }

    #[test]
    fn sealed_setting_value_opens_with_same_owner() {
        let key = test_key();
        let sealed = seal_setting_value(&key, aad("access_token"), "tok-123").unwrap();

        assert!(is_sealed(&sealed));
        assert!(!sealed.contains("tok-123"));
        assert_eq!(
            open_setting_value(&key, aad("access_token"), &sealed).unwrap(),
            "tok-123"
        );
        assert!(open_setting_value(&key, aad("refresh_token"), &sealed).is_err());
    }

    #[test]
    fn plain_setting_value_passes_through() {
        let key = test_key();
        assert_eq!(
            open_setting_value(&key, aad("client_id"), "public-id").unwrap(),
            "public-id"
        );
    }
}
