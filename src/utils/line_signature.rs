use base64::prelude::*;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verifies the `x-line-signature` header: base64 of HMAC-SHA256 over the
/// raw request body, keyed with the channel secret. Comparison runs in
/// constant time over the decoded digest.
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(provided) = BASE64_STANDARD.decode(signature) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let expected = mac.finalize().into_bytes();

    ConstantTimeEq::ct_eq(expected.as_slice(), provided.as_slice()).into()
}

/// Computes the signature a sender would attach for the given body.
pub fn sign_body(channel_secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(body);
    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_signature() {
        let secret = "test-channel-secret";
        let body = br#"{"destination":"xxx","events":[]}"#;
        let signature = sign_body(secret, body);
        assert!(verify_signature(secret, body, &signature));
    }

    #[test]
    fn rejects_wrong_secret() {
        let body = b"payload";
        let signature = sign_body("secret-a", body);
        assert!(!verify_signature("secret-b", body, &signature));
    }

    #[test]
    fn rejects_tampered_body() {
        let secret = "test-channel-secret";
        let signature = sign_body(secret, b"original");
        assert!(!verify_signature(secret, b"tampered", &signature));
    }

    #[test]
    fn rejects_garbage_signature() {
        assert!(!verify_signature("secret", b"body", "not base64!!"));
        assert!(!verify_signature("secret", b"body", ""));
    }
}
