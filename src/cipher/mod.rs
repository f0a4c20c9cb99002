use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{generic_array::GenericArray, Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("encryption key must be exactly 32 bytes")]
    InvalidKey,
    #[error("encryption failed: {0}")]
    EncryptFailed(String),
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),
}

/// Symmetric cipher for stored aggregator access credentials.
///
/// AES-256-GCM with a random nonce per encryption; the nonce is prepended to
/// the ciphertext and the whole blob is base64-encoded for storage.
#[derive(Clone)]
pub struct CredentialCipher {
    key: [u8; 32],
}

impl CredentialCipher {
    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        let key: [u8; 32] = key.try_into().map_err(|_| CipherError::InvalidKey)?;
        Ok(Self { key })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let cipher = Aes256Gcm::new(GenericArray::from_slice(&self.key));
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CipherError::EncryptFailed(e.to_string()))?;

        let mut blob = nonce_bytes.to_vec();
        blob.extend(ciphertext);
        Ok(BASE64.encode(blob))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, CipherError> {
        let blob = BASE64
            .decode(encoded)
            .map_err(|e| CipherError::InvalidCiphertext(e.to_string()))?;
        if blob.len() < NONCE_LEN {
            return Err(CipherError::InvalidCiphertext("too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        let cipher = Aes256Gcm::new(GenericArray::from_slice(&self.key));

        let decrypted = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| CipherError::InvalidCiphertext(e.to_string()))?;

        String::from_utf8(decrypted)
            .map_err(|e| CipherError::InvalidCiphertext(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> CredentialCipher {
        CredentialCipher::new(&[7u8; 32]).unwrap()
    }

    #[test]
    fn round_trips_a_credential() {
        let cipher = cipher();
        let encoded = cipher.encrypt("access-sandbox-123").unwrap();
        assert_ne!(encoded, "access-sandbox-123");
        assert_eq!(cipher.decrypt(&encoded).unwrap(), "access-sandbox-123");
    }

    #[test]
    fn distinct_nonce_per_encryption() {
        let cipher = cipher();
        let a = cipher.encrypt("token").unwrap();
        let b = cipher.encrypt("token").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_bad_key_length() {
        assert!(matches!(
            CredentialCipher::new(&[0u8; 16]),
            Err(CipherError::InvalidKey)
        ));
    }

    #[test]
    fn rejects_tampered_ciphertext() {
        let cipher = cipher();
        let encoded = cipher.encrypt("token").unwrap();
        let mut blob = BASE64.decode(&encoded).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0xff;
        let tampered = BASE64.encode(blob);
        assert!(cipher.decrypt(&tampered).is_err());
    }

    #[test]
    fn rejects_truncated_ciphertext() {
        let cipher = cipher();
        assert!(cipher.decrypt(&BASE64.encode([1u8; 4])).is_err());
    }
}
