use sealnote_crypto::{
    content_digest, decrypt, encrypt, verify_digest, CryptoError, SealKey, SealedParts,
    DIGEST_SIZE, NONCE_SIZE, TAG_SIZE,
};

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = SealKey::generate();
    let parts = encrypt(&key, b"buy milk").unwrap();

    assert_eq!(parts.nonce.len(), NONCE_SIZE);
    assert_eq!(parts.auth_tag.len(), TAG_SIZE);
    assert_eq!(decrypt(&key, &parts).unwrap(), b"buy milk");
}

#[test]
fn two_encryptions_differ() {
    let key = SealKey::generate();
    let a = encrypt(&key, b"same plaintext").unwrap();
    let b = encrypt(&key, b"same plaintext").unwrap();

    // Fresh nonce every call, so ciphertexts diverge too
    assert_ne!(a.nonce, b.nonce);
    assert_ne!(a.ciphertext, b.ciphertext);

    assert_eq!(decrypt(&key, &a).unwrap(), b"same plaintext");
    assert_eq!(decrypt(&key, &b).unwrap(), b"same plaintext");
}

#[test]
fn tampered_ciphertext_fails() {
    let key = SealKey::generate();
    let mut parts = encrypt(&key, b"attack at dawn").unwrap();
    parts.ciphertext[0] ^= 0x01;

    assert!(matches!(
        decrypt(&key, &parts),
        Err(CryptoError::AuthenticationFailure)
    ));
}

#[test]
fn tampered_nonce_fails() {
    let key = SealKey::generate();
    let mut parts = encrypt(&key, b"attack at dawn").unwrap();
    parts.nonce[0] ^= 0x01;

    assert!(matches!(
        decrypt(&key, &parts),
        Err(CryptoError::AuthenticationFailure)
    ));
}

#[test]
fn tampered_tag_fails() {
    let key = SealKey::generate();
    let mut parts = encrypt(&key, b"attack at dawn").unwrap();
    parts.auth_tag[TAG_SIZE - 1] ^= 0x80;

    assert!(matches!(
        decrypt(&key, &parts),
        Err(CryptoError::AuthenticationFailure)
    ));
}

#[test]
fn truncated_ciphertext_fails() {
    let key = SealKey::generate();
    let mut parts = encrypt(&key, b"attack at dawn").unwrap();
    parts.ciphertext.pop();

    assert!(decrypt(&key, &parts).is_err());
}

#[test]
fn digest_survives_serde_while_content_checked() {
    let key = SealKey::generate();
    let parts = encrypt(&key, b"note body").unwrap();
    let digest = content_digest(b"note body");
    assert_eq!(digest.len(), DIGEST_SIZE);

    let json = serde_json::to_string(&parts).unwrap();
    let restored: SealedParts = serde_json::from_str(&json).unwrap();

    let plaintext = decrypt(&key, &restored).unwrap();
    assert!(verify_digest(&plaintext, &digest));
}

// Property-based tests
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn roundtrip_always_recovers_plaintext(
            plaintext in proptest::collection::vec(any::<u8>(), 0..512)
        ) {
            let key = SealKey::generate();
            let parts = encrypt(&key, &plaintext).unwrap();
            prop_assert_eq!(parts.ciphertext.len(), plaintext.len());
            prop_assert_eq!(decrypt(&key, &parts).unwrap(), plaintext);
        }

        #[test]
        fn any_single_bit_flip_is_detected(
            plaintext in proptest::collection::vec(any::<u8>(), 1..128),
            pos in 0usize..1024,
            bit in 0usize..8,
            field in 0usize..3,
        ) {
            let key = SealKey::generate();
            let mut parts = encrypt(&key, &plaintext).unwrap();
            match field {
                0 => {
                    let idx = pos % parts.ciphertext.len();
                    parts.ciphertext[idx] ^= 1 << bit;
                }
                1 => parts.nonce[pos % NONCE_SIZE] ^= 1 << bit,
                _ => parts.auth_tag[pos % TAG_SIZE] ^= 1 << bit,
            }
            prop_assert!(matches!(
                decrypt(&key, &parts),
                Err(CryptoError::AuthenticationFailure)
            ));
        }

        #[test]
        fn digest_mismatch_for_different_content(
            a in proptest::collection::vec(any::<u8>(), 0..128),
            b in proptest::collection::vec(any::<u8>(), 0..128),
        ) {
            let digest = content_digest(&a);
            prop_assert!(verify_digest(&a, &digest));
            if a != b {
                prop_assert!(!verify_digest(&b, &digest));
            }
        }
    }
}
