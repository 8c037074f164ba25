use std::fs;
use std::path::PathBuf;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{AuthError, StoreError, StoreResult};
use crate::model::profile::Account;
use crate::model::workout_log::UserId;
use crate::repository::json_file::{data_dir, JsonFile};
use crate::repository::traits::IdentityProvider;

const ACCOUNTS_FILE_NAME: &str = "accounts.json";
const SESSION_FILE_NAME: &str = "session.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct Session {
    uid: UserId,
}

/// Local identity provider: accounts in `accounts.json`, the signed-in user
/// in `session.json`.
#[derive(Debug, Clone)]
pub struct FileIdentityProvider {
    accounts: JsonFile,
    session_path: PathBuf,
}

impl FileIdentityProvider {
    pub fn new(base_dir: Option<PathBuf>) -> StoreResult<Self> {
        let dir = data_dir(base_dir)?;
        let accounts = JsonFile::open(Some(dir.clone()), ACCOUNTS_FILE_NAME)?;
        Ok(Self {
            accounts,
            session_path: dir.join(SESSION_FILE_NAME),
        })
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let accounts: Vec<Account> = self.accounts.read()?;
        Ok(accounts
            .into_iter()
            .find(|a| a.email.eq_ignore_ascii_case(email.trim())))
    }

    fn write_session(&self, uid: &UserId) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(&Session { uid: uid.clone() })?;
        fs::write(&self.session_path, content)?;
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            AuthError::Hash(e.to_string())
        })
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

impl IdentityProvider for FileIdentityProvider {
    fn sign_up(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = email.trim();
        if self.find_by_email(email)?.is_some() {
            return Err(AuthError::EmailInUse(email.to_string()));
        }

        let account = Account {
            uid: UserId::new(Uuid::new_v4().to_string()),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };
        let mut accounts: Vec<Account> = self.accounts.read()?;
        accounts.push(account.clone());
        self.accounts.write(&accounts)?;
        self.write_session(&account.uid)?;

        info!(uid = %account.uid, "signed up");
        Ok(account)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let account = match self.find_by_email(email)? {
            Some(account) => account,
            None => {
                warn!("sign-in for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };
        if !verify_password(password, &account.password_hash)? {
            warn!(uid = %account.uid, "sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        self.write_session(&account.uid)?;
        info!(uid = %account.uid, "signed in");
        Ok(account)
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        if self.session_path.exists() {
            fs::remove_file(&self.session_path).map_err(StoreError::from)?;
        }
        info!("signed out");
        Ok(())
    }

    fn current_user(&self) -> Result<Option<UserId>, AuthError> {
        if !self.session_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.session_path).map_err(StoreError::from)?;
        let session: Session = serde_json::from_str(&content).map_err(StoreError::from)?;
        Ok(Some(session.uid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn provider() -> (TempDir, FileIdentityProvider) {
        let dir = TempDir::new().unwrap();
        let provider = FileIdentityProvider::new(Some(dir.path().to_path_buf())).unwrap();
        (dir, provider)
    }

    #[test]
    fn test_sign_up_signs_in() {
        let (_dir, provider) = provider();
        let account = provider.sign_up("ada@example.com", "secret1").unwrap();
        assert_ne!(account.password_hash, "secret1");
        assert_eq!(provider.current_user().unwrap(), Some(account.uid));
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (_dir, provider) = provider();
        provider.sign_up("ada@example.com", "secret1").unwrap();
        let err = provider.sign_up("ADA@example.com", "secret2").unwrap_err();
        assert!(matches!(err, AuthError::EmailInUse(_)));
    }

    #[test]
    fn test_sign_in_and_out() {
        let (_dir, provider) = provider();
        let account = provider.sign_up("ada@example.com", "secret1").unwrap();
        provider.sign_out().unwrap();
        assert_eq!(provider.current_user().unwrap(), None);

        assert!(matches!(
            provider.sign_in("ada@example.com", "wrong-pass"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            provider.sign_in("bob@example.com", "secret1"),
            Err(AuthError::InvalidCredentials)
        ));
        assert_eq!(provider.current_user().unwrap(), None);

        let signed_in = provider.sign_in("Ada@Example.com", "secret1").unwrap();
        assert_eq!(signed_in.uid, account.uid);
        assert_eq!(provider.current_user().unwrap(), Some(account.uid));
    }
}
