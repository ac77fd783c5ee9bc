//! Login sessions and password hashing.
//!
//! # Invariants
//! - Only PHC-formatted argon2 hashes are stored; plaintext never is.
//! - At most one session is stored at a time.

use super::{ServiceError, ServiceResult};
use crate::model::school::Session;
use crate::repo::school_repo::{RepoResult, SchoolRepository};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::{info, warn};
use rand::RngCore;

const SALT_LEN: usize = 16;

/// Hashes `password` into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let mut salt_bytes = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| ServiceError::PasswordHash(err.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ServiceError::PasswordHash(err.to_string()))
}

/// Checks `password` against a stored PHC hash.
///
/// Unparseable stored hashes never verify.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Login/logout use cases.
pub struct AuthService<R: SchoolRepository> {
    repo: R,
}

impl<R: SchoolRepository> AuthService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Verifies credentials and stores the resulting session.
    ///
    /// # Errors
    /// - `InvalidCredentials` for unknown usernames and wrong passwords alike.
    pub fn login(&self, username: &str, password: &str) -> ServiceResult<Session> {
        let users = self.repo.users()?;
        let Some(account) = users
            .iter()
            .find(|user| user.username == username.trim())
            .filter(|user| verify_password(password, &user.password_hash))
        else {
            warn!("event=login module=auth status=rejected");
            return Err(ServiceError::InvalidCredentials);
        };

        let session = Session::for_account(account);
        self.repo.set_session(&session)?;
        info!(
            "event=login module=auth status=ok user_id={} role={}",
            session.user_id,
            session.role.as_str()
        );
        Ok(session)
    }

    pub fn logout(&self) -> RepoResult<()> {
        self.repo.clear_session()?;
        info!("event=logout module=auth status=ok");
        Ok(())
    }

    pub fn current_session(&self) -> RepoResult<Option<Session>> {
        self.repo.session()
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password};

    #[test]
    fn hash_verifies_only_matching_password() {
        let hash = hash_password("s3cret").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        let first = hash_password("password").expect("hash");
        let second = hash_password("password").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify_password("password", "70617373776f7264"));
    }
}
