// Local key manager: envelope layout and trait behaviour.

#[cfg(test)]
mod tests {
    use confidential_core::constants::{ENVELOPE_NONCE_LEN, TAG_LEN};
    use confidential_core::crypto::{CryptoError, LocalKeyManager, SymmetricKey};
    use confidential_core::transform::{ConfidentialityOracle, KeyManager};
    use confidential_core::types::Address;
    use futures::executor::block_on;

    fn manager() -> LocalKeyManager {
        LocalKeyManager::new(&SymmetricKey::new([9u8; 48])).unwrap()
    }

    #[test]
    fn envelope_round_trip() {
        let km = manager();
        let envelope = km.seal_envelope(b"call data").unwrap();
        assert_eq!(envelope.len(), ENVELOPE_NONCE_LEN + b"call data".len() + TAG_LEN);
        assert_eq!(km.open_envelope(&envelope).unwrap(), b"call data");
    }

    #[test]
    fn envelopes_use_fresh_nonces() {
        let km = manager();
        let a = km.seal_envelope(b"same").unwrap();
        let b = km.seal_envelope(b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn short_envelope_rejected() {
        let err = manager().open_envelope(&[0u8; 31]).unwrap_err();
        assert_eq!(err, CryptoError::CiphertextTooShort { len: 31, min: 32 });
    }

    #[test]
    fn tampered_envelope_rejected() {
        let km = manager();
        let mut envelope = km.seal_envelope(b"return data").unwrap();
        envelope[ENVELOPE_NONCE_LEN] ^= 0x80;
        assert_eq!(km.open_envelope(&envelope).unwrap_err(), CryptoError::TagMismatch);
    }

    #[test]
    fn other_key_cannot_open() {
        let envelope = manager().seal_envelope(b"secret").unwrap();
        let other = LocalKeyManager::new(&SymmetricKey::new([1u8; 48])).unwrap();
        assert!(other.open_envelope(&envelope).is_err());
    }

    #[test]
    fn trait_methods_round_trip() {
        let km = manager();
        let contract = Address::from([5u8; 20]);
        block_on(async {
            let ct = KeyManager::encrypt(&km, b"abc", &contract).await.unwrap();
            let pt = KeyManager::decrypt(&km, &ct).await.unwrap();
            assert_eq!(pt, b"abc");

            let err = KeyManager::decrypt(&km, b"short").await.unwrap_err();
            assert!(err.downcast_ref::<CryptoError>().is_some());
        });
    }

    #[test]
    fn oracle_reflects_registered_addresses() {
        let confidential = Address::from([1u8; 20]);
        let plain = Address::from([2u8; 20]);
        let mut km = manager().with_confidential(confidential);

        block_on(async {
            assert!(km.is_confidential(&confidential).await.unwrap());
            assert!(!km.is_confidential(&plain).await.unwrap());
        });

        km.add_confidential(plain);
        assert!(block_on(km.is_confidential(&plain)).unwrap());
    }
}
