//! # Network Key Pair Identity
//!
//! Raw Ed25519 key material held by the node.
//!
//! ## Key Layout
//!
//! - Public key: 32 bytes
//! - Secret key: 64 bytes, `seed || public_key` (the libsodium layout)
//!
//! The secret key must embed the supplied public key; the pair is rejected
//! otherwise.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use shared_types::{Address, PublicKeyBytes, SignatureBytes};
use zeroize::Zeroize;

use super::errors::IdentityError;

/// Length of an Ed25519 public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Length of a secret key in `seed || public_key` layout.
pub const SECRET_KEY_LEN: usize = 64;

/// Identity backed by a raw Ed25519 key pair.
pub struct NetworkKeypairIdentity {
    signing_key: SigningKey,
    public_key: PublicKeyBytes,
    address: Address,
}

impl NetworkKeypairIdentity {
    /// Build an identity from raw key buffers.
    ///
    /// # Errors
    /// - `MissingKey` if either buffer is empty
    /// - `InvalidPublicKey` / `InvalidSecretKey` on wrong lengths
    /// - `AddressDerivation` if the public key is not a valid curve point
    /// - `KeyMismatch` if the secret key embeds a different public key
    pub fn new(public_key: &[u8], secret_key: &[u8]) -> Result<Self, IdentityError> {
        if public_key.is_empty() {
            return Err(IdentityError::MissingKey("public key"));
        }
        if secret_key.is_empty() {
            return Err(IdentityError::MissingKey("secret key"));
        }

        let public_key: PublicKeyBytes =
            public_key
                .try_into()
                .map_err(|_| IdentityError::InvalidPublicKey {
                    expected: PUBLIC_KEY_LEN,
                    actual: public_key.len(),
                })?;

        if secret_key.len() != SECRET_KEY_LEN {
            return Err(IdentityError::InvalidSecretKey {
                expected: SECRET_KEY_LEN,
                actual: secret_key.len(),
            });
        }

        let address = derive_address(&public_key)?;

        let mut keypair = [0u8; SECRET_KEY_LEN];
        keypair.copy_from_slice(secret_key);
        let signing_key = SigningKey::from_keypair_bytes(&keypair);
        keypair.zeroize();

        let signing_key = signing_key.map_err(|_| IdentityError::KeyMismatch)?;

        Ok(Self {
            signing_key,
            public_key,
            address,
        })
    }

    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        let public_key = signing_key.verifying_key().to_bytes();
        Self {
            address: Address::from_public_key(&public_key),
            signing_key,
            public_key,
        }
    }

    pub fn public_key(&self) -> PublicKeyBytes {
        self.public_key
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Sign `message` with the held secret key.
    pub fn sign(&self, message: &[u8]) -> SignatureBytes {
        self.signing_key.sign(message).to_bytes()
    }

    /// Verify `signature` over `message`, defaulting to the held public key.
    pub fn verify(
        &self,
        signature: &[u8],
        message: &[u8],
        public_key: Option<&PublicKeyBytes>,
    ) -> bool {
        verify_signature(signature, message, public_key.unwrap_or(&self.public_key))
    }

    /// Secret key in `seed || public_key` layout.
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LEN] {
        self.signing_key.to_keypair_bytes()
    }
}

impl fmt::Debug for NetworkKeypairIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkKeypairIdentity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Derive the checksum address for a public key, rejecting non-curve points.
fn derive_address(public_key: &PublicKeyBytes) -> Result<Address, IdentityError> {
    VerifyingKey::from_bytes(public_key)
        .map_err(|e| IdentityError::AddressDerivation(e.to_string()))?;
    Ok(Address::from_public_key(public_key))
}

/// Verify an Ed25519 signature. Malformed inputs verify as `false`.
pub fn verify_signature(signature: &[u8], message: &[u8], public_key: &PublicKeyBytes) -> bool {
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    verifying_key.verify_strict(message, &signature).is_ok()
}

/// Decode an encoded address into the Ed25519 public key it embeds.
pub fn decode_public_key(address: &str) -> Result<PublicKeyBytes, IdentityError> {
    let address = Address::parse(address)?;
    VerifyingKey::from_bytes(address.public_key()).map_err(|_| IdentityError::InvalidCurvePoint)?;
    Ok(*address.public_key())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_keys() -> (PublicKeyBytes, [u8; SECRET_KEY_LEN]) {
        let identity = NetworkKeypairIdentity::generate();
        (identity.public_key(), identity.secret_key_bytes())
    }

    #[test]
    fn test_construct_from_raw_keys() {
        let (pk, sk) = raw_keys();
        let identity = NetworkKeypairIdentity::new(&pk, &sk).unwrap();
        assert_eq!(identity.public_key(), pk);
        assert_eq!(identity.address(), &Address::from_public_key(&pk));
    }

    #[test]
    fn test_missing_keys_rejected() {
        let (pk, sk) = raw_keys();
        assert_eq!(
            NetworkKeypairIdentity::new(&[], &sk).unwrap_err(),
            IdentityError::MissingKey("public key")
        );
        assert_eq!(
            NetworkKeypairIdentity::new(&pk, &[]).unwrap_err(),
            IdentityError::MissingKey("secret key")
        );
    }

    #[test]
    fn test_malformed_keys_rejected() {
        let (pk, sk) = raw_keys();
        assert_eq!(
            NetworkKeypairIdentity::new(&pk[..31], &sk).unwrap_err(),
            IdentityError::InvalidPublicKey {
                expected: 32,
                actual: 31
            }
        );
        assert_eq!(
            NetworkKeypairIdentity::new(&pk, &sk[..32]).unwrap_err(),
            IdentityError::InvalidSecretKey {
                expected: 64,
                actual: 32
            }
        );
    }

    #[test]
    fn test_mismatched_pair_rejected() {
        let (pk, _) = raw_keys();
        let (_, other_sk) = raw_keys();
        assert_eq!(
            NetworkKeypairIdentity::new(&pk, &other_sk).unwrap_err(),
            IdentityError::KeyMismatch
        );
    }

    #[test]
    fn test_non_curve_public_key_fails_derivation() {
        // y = 2 has no matching x on edwards25519.
        let mut bad = [0u8; 32];
        bad[0] = 2;
        let (_, sk) = raw_keys();
        assert!(matches!(
            NetworkKeypairIdentity::new(&bad, &sk),
            Err(IdentityError::AddressDerivation(_))
        ));
    }

    #[test]
    fn test_sign_and_verify() {
        let identity = NetworkKeypairIdentity::generate();
        let signature = identity.sign(b"payload");
        assert!(identity.verify(&signature, b"payload", None));
        assert!(!identity.verify(&signature, b"other", None));

        let other = NetworkKeypairIdentity::generate();
        assert!(!identity.verify(&signature, b"payload", Some(&other.public_key())));
        assert!(other.verify(&signature, b"payload", Some(&identity.public_key())));
    }

    #[test]
    fn test_verify_rejects_malformed_signature() {
        let identity = NetworkKeypairIdentity::generate();
        assert!(!identity.verify(&[0u8; 10], b"payload", None));
    }

    #[test]
    fn test_decode_public_key_from_address() {
        let identity = NetworkKeypairIdentity::generate();
        let decoded = decode_public_key(identity.address().as_str()).unwrap();
        assert_eq!(decoded, identity.public_key());
        assert!(matches!(
            decode_public_key("not-an-address"),
            Err(IdentityError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let identity = NetworkKeypairIdentity::generate();
        let rendered = format!("{identity:?}");
        assert!(!rendered.contains(&hex::encode(identity.secret_key_bytes())));
    }
}
