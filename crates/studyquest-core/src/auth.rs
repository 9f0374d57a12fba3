//! Identity session.
//!
//! The identity provider is a collaborator: the core only needs to know
//! whether someone is signed in and, optionally, who.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Profile claims returned by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub picture: String,
}

pub trait IdentityProvider {
    fn login(&mut self) -> Result<UserProfile, AuthError>;

    fn logout(&mut self) {}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub authenticated: bool,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

impl AuthSession {
    /// Run the provider's login. Failures are logged and leave the session
    /// signed out.
    pub fn login<P: IdentityProvider + ?Sized>(&mut self, provider: &mut P) -> bool {
        match provider.login() {
            Ok(profile) => {
                tracing::info!(sub = %profile.sub, "login successful");
                self.authenticated = true;
                self.profile = Some(profile);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                false
            }
        }
    }

    pub fn logout<P: IdentityProvider + ?Sized>(&mut self, provider: &mut P) {
        provider.logout();
        self.authenticated = false;
        self.profile = None;
    }

    pub fn display_name(&self) -> Option<&str> {
        let profile = self.profile.as_ref()?;
        [&profile.name, &profile.given_name, &profile.email]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
    }
}

/// Offline provider: signs in whoever is named on the command line.
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    pub name: String,
    pub email: Option<String>,
}

impl IdentityProvider for LocalIdentity {
    fn login(&mut self) -> Result<UserProfile, AuthError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AuthError::LoginFailed("a name is required".into()));
        }
        let mut parts = name.splitn(2, ' ');
        let given_name = parts.next().unwrap_or_default().to_string();
        let family_name = parts.next().unwrap_or_default().trim().to_string();
        let email = self.email.clone().unwrap_or_default();
        let sub = if email.is_empty() {
            format!("local|{}", name.to_lowercase().replace(' ', "."))
        } else {
            format!("local|{}", email.to_lowercase())
        };
        Ok(UserProfile {
            sub,
            name: name.to_string(),
            given_name,
            family_name,
            email,
            picture: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rejecting;

    impl IdentityProvider for Rejecting {
        fn login(&mut self) -> Result<UserProfile, AuthError> {
            Err(AuthError::LoginFailed("user cancelled".into()))
        }
    }

    #[test]
    fn local_login_builds_profile() {
        let mut session = AuthSession::default();
        let mut provider = LocalIdentity {
            name: "Ada Lovelace".into(),
            email: Some("Ada@Example.com".into()),
        };
        assert!(session.login(&mut provider));
        assert!(session.authenticated);
        let profile = session.profile.as_ref().unwrap();
        assert_eq!(profile.given_name, "Ada");
        assert_eq!(profile.family_name, "Lovelace");
        assert_eq!(profile.sub, "local|ada@example.com");
        assert_eq!(session.display_name(), Some("Ada Lovelace"));
    }

    #[test]
    fn failed_login_stays_signed_out() {
        let mut session = AuthSession::default();
        assert!(!session.login(&mut Rejecting));
        assert!(!session.authenticated);
        assert!(session.profile.is_none());
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut provider = LocalIdentity {
            name: "  ".into(),
            email: None,
        };
        assert!(provider.login().is_err());
    }

    #[test]
    fn logout_clears_profile() {
        let mut provider = LocalIdentity {
            name: "Grace".into(),
            email: None,
        };
        let mut session = AuthSession::default();
        session.login(&mut provider);
        assert_eq!(session.profile.as_ref().unwrap().sub, "local|grace");
        session.logout(&mut provider);
        assert_eq!(session, AuthSession::default());
    }
}
