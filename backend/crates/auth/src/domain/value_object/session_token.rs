//! Session Token Value Object
//!
//! Cookie value `<uuid>.<base64url(HMAC-SHA256(secret, uuid))>`. The
//! signature lets a forged or truncated cookie be rejected without a
//! database round trip.

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use platform::crypto::{from_base64url, to_base64url};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Sign a session id
    pub fn sign(session_id: Uuid, secret: &[u8; 32]) -> Result<Self, InvalidLength> {
        let id = session_id.to_string();
        let mut mac = HmacSha256::new_from_slice(secret)?;
        mac.update(id.as_bytes());
        let signature = mac.finalize().into_bytes();
        Ok(Self(format!("{}.{}", id, to_base64url(&signature))))
    }

    /// Verify the signature and return the session id
    pub fn verify(token: &str, secret: &[u8; 32]) -> Option<Uuid> {
        let (id, signature) = token.split_once('.')?;
        let signature = from_base64url(signature).ok()?;

        let mut mac = HmacSha256::new_from_slice(secret).ok()?;
        mac.update(id.as_bytes());
        // Constant-time comparison
        mac.verify_slice(&signature).ok()?;

        id.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_then_verify() {
        let secret = [7u8; 32];
        let id = Uuid::new_v4();
        let token = SessionToken::sign(id, &secret).unwrap();
        assert_eq!(SessionToken::verify(token.as_str(), &secret), Some(id));
    }

    #[test]
    fn test_rejects_tampering() {
        let secret = [7u8; 32];
        let token = SessionToken::sign(Uuid::new_v4(), &secret).unwrap();
        let (_, sig) = token.as_str().split_once('.').unwrap();
        let forged = format!("{}.{}", Uuid::new_v4(), sig);

        assert_eq!(SessionToken::verify(&forged, &secret), None);
        assert_eq!(SessionToken::verify(token.as_str(), &[8u8; 32]), None);
        assert_eq!(SessionToken::verify("no-dot", &secret), None);
        assert_eq!(SessionToken::verify("abc.!!!", &secret), None);
    }

    #[test]
    fn test_signature_matches_rfc4231_hmac() {
        // RFC 4231 case 2 key, zero-padded to the secret width
        let mut secret = [0u8; 32];
        secret[..4].copy_from_slice(b"Jefe");
        let mut mac = HmacSha256::new_from_slice(&secret).unwrap();
        mac.update(b"what do ya want for nothing?");
        assert_eq!(
            mac.finalize().into_bytes().to_vec(),
            hex::decode("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843").unwrap()
        );

        let id = Uuid::new_v4();
        let token = SessionToken::sign(id, &secret).unwrap();
        let (_, sig) = token.as_str().split_once('.').unwrap();
        let mut truncated = from_base64url(sig).unwrap();
        truncated.pop();
        let short = format!("{}.{}", id, to_base64url(&truncated));
        assert_eq!(SessionToken::verify(&short, &secret), None);
    }
}
