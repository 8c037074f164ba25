use tracing::info;

use crate::error::AuthError;
use crate::model::profile::{ProfilePatch, SignInForm, SignUpForm, UserProfile};
use crate::model::workout_log::UserId;
use crate::repository::{IdentityProvider, ProfileStore};

/// Sign-up, sign-in and profile editing over an identity provider and a
/// profile store.
pub struct AuthService<I: IdentityProvider, P: ProfileStore> {
    identity: I,
    profiles: P,
}

impl<I: IdentityProvider, P: ProfileStore> AuthService<I, P> {
    pub fn new(identity: I, profiles: P) -> Self {
        Self { identity, profiles }
    }

    pub fn sign_up(&self, form: &SignUpForm) -> Result<UserProfile, AuthError> {
        form.validate()?;
        let account = self.identity.sign_up(&form.email, &form.password)?;
        let profile = UserProfile::new(account.uid, &form.name, &account.email);
        self.profiles.put(&profile)?;
        info!(uid = %profile.uid, "created profile");
        Ok(profile)
    }

    pub fn sign_in(&self, form: &SignInForm) -> Result<UserId, AuthError> {
        form.validate()?;
        Ok(self.identity.sign_in(&form.email, &form.password)?.uid)
    }

    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.identity.sign_out()
    }

    pub fn current_user(&self) -> Result<Option<UserId>, AuthError> {
        self.identity.current_user()
    }

    pub fn require_user(&self) -> Result<UserId, AuthError> {
        self.current_user()?.ok_or(AuthError::NotSignedIn)
    }

    pub fn profile(&self) -> Result<UserProfile, AuthError> {
        let uid = self.require_user()?;
        self.profiles
            .get(&uid)?
            .ok_or_else(|| AuthError::ProfileMissing(uid.to_string()))
    }

    pub fn update_profile(&self, patch: &ProfilePatch) -> Result<UserProfile, AuthError> {
        patch.validate()?;
        let mut profile = self.profile()?;
        patch.apply_to(&mut profile);
        self.profiles.put(&profile)?;
        Ok(profile)
    }
}
