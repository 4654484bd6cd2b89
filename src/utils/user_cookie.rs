//! Signed `user_id` cookie values.
//!
//! The owner of a short URL is identified by a `user_id` cookie. Its value is
//! `<user_id>.<mac>` where `mac` is the hex-encoded HMAC-SHA256 of the user id
//! keyed by the server secret, so a client cannot claim another owner's id.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Name of the identity cookie.
pub const USER_ID_COOKIE: &str = "user_id";

/// Signs and verifies `user_id` cookie values.
#[derive(Clone)]
pub struct UserCookieSigner {
    secret: String,
}

impl UserCookieSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key length")
    }

    /// Returns the cookie value carrying `user_id`.
    pub fn sign(&self, user_id: &str) -> String {
        let mut mac = self.mac();
        mac.update(user_id.as_bytes());
        format!("{}.{}", user_id, hex::encode(mac.finalize().into_bytes()))
    }

    /// Returns the user id if `value` carries a valid signature.
    pub fn verify(&self, value: &str) -> Option<String> {
        let (user_id, signature) = value.rsplit_once('.')?;
        if user_id.is_empty() {
            return None;
        }

        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac();
        mac.update(user_id.as_bytes());
        mac.verify_slice(&signature).ok()?;

        Some(user_id.to_string())
    }
}

impl std::fmt::Debug for UserCookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCookieSigner").finish_non_exhaustive()
    }
}
