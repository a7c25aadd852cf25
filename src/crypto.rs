//! At-rest encryption for processor-issued card tokens.
//!
//! Ciphertexts are `base64(nonce || AES-256-GCM(token))`.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

const NONCE_LEN: usize = 12;

#[derive(Clone)]
pub struct PaymentTokenCipher {
    cipher: Aes256Gcm,
}

impl fmt::Debug for PaymentTokenCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("PaymentTokenCipher(..)") }
}

impl PaymentTokenCipher {
    pub fn new(key: &[u8; 32]) -> Self {
        Self { cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)) }
    }

    /// Builds a cipher from a base64-encoded 32-byte key.
    pub fn from_base64_key(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = STANDARD.decode(encoded.trim()).map_err(|_| CryptoError::InvalidKey)?;
        let key: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self::new(&key))
    }

    pub fn encrypt(&self, token: &str) -> Result<String, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self.cipher.encrypt(&nonce, token.as_bytes()).map_err(|_| CryptoError::Encrypt)?;
        let mut out = nonce.to_vec();
        out.extend_from_slice(&sealed);
        Ok(STANDARD.encode(out))
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let bytes = STANDARD.decode(ciphertext.trim()).map_err(|_| CryptoError::Malformed)?;
        if bytes.len() <= NONCE_LEN { return Err(CryptoError::Malformed); }
        let (nonce, sealed) = bytes.split_at(NONCE_LEN);
        let plain = self.cipher.decrypt(Nonce::from_slice(nonce), sealed).map_err(|_| CryptoError::Decrypt)?;
        String::from_utf8(plain).map_err(|_| CryptoError::Malformed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    #[error("payment token key must be 32 bytes of base64")]
    InvalidKey,
    #[error("failed to encrypt payment token")]
    Encrypt,
    #[error("payment token ciphertext is malformed")]
    Malformed,
    #[error("payment token could not be decrypted with the configured key")]
    Decrypt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypted_token_is_opaque_and_recoverable() {
        let cipher = PaymentTokenCipher::new(&[7u8; 32]);
        let sealed = cipher.encrypt("tok_visa_4242").unwrap();
        assert!(!sealed.contains("tok_visa"));
        assert_ne!(sealed, cipher.encrypt("tok_visa_4242").unwrap());
        assert_eq!(cipher.decrypt(&sealed).unwrap(), "tok_visa_4242");
    }

    #[test]
    fn test_wrong_key_and_garbage_are_rejected() {
        let sealed = PaymentTokenCipher::new(&[1u8; 32]).encrypt("tok").unwrap();
        let other = PaymentTokenCipher::new(&[2u8; 32]);
        assert_eq!(other.decrypt(&sealed), Err(CryptoError::Decrypt));
        assert_eq!(other.decrypt("not base64!"), Err(CryptoError::Malformed));
        assert_eq!(other.decrypt("AAAA"), Err(CryptoError::Malformed));
        assert_eq!(PaymentTokenCipher::from_base64_key("c2hvcnQ=").unwrap_err(), CryptoError::InvalidKey);
    }
}
