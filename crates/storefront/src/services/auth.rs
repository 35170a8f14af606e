//! Thin client for the external authentication service.
//!
//! The service owns credentials and issues a session token plus a stable
//! user identifier; this client exchanges credentials for a session, keeps
//! the token in local storage, maintains the user's profile document in the
//! `users` collection, and notifies subscribers on session change.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument};

use clementine_core::{Email, EmailError, Role, UserId};

use crate::config::AuthConfig;
use crate::docstore::{DocumentStore, FieldFilter, StoreError, collections};
use crate::models::User;
use crate::storage::{KeyValueStorage, StorageError, TOKEN_KEY};

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Wrong password or unknown account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The session resolved, but no profile document exists.
    #[error("user profile not found")]
    UserNotFound,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password rejected by the service.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Unexpected response from the auth service.
    #[error("auth service returned status {status}: {body}")]
    Service { status: u16, body: String },

    /// Profile lookup against the document store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Token persistence failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// User-facing message for this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Invalid email or password".to_owned(),
            Self::UserNotFound => "User does not exist".to_owned(),
            Self::UserAlreadyExists => "An account with this email already exists".to_owned(),
            Self::WeakPassword(msg) => msg.clone(),
            Self::InvalidEmail(_) => "Invalid email address".to_owned(),
            Self::Http(_) | Self::Service { .. } | Self::Store(_) | Self::Storage(_) => {
                "Authentication service unavailable, please try again".to_owned()
            }
        }
    }
}

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    /// The signed-in user's profile.
    pub user: User,
    /// Bearer token for subsequent requests.
    pub id_token: String,
}

/// Profile details collected at sign-up.
#[derive(Debug, Clone, Default)]
pub struct SignUpProfile {
    /// Display name; a `user-<random>` name is generated when empty.
    pub full_name: String,
    pub phone: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    uid: String,
    id_token: String,
}

/// Client for the authentication service.
pub struct AuthClient<D: DocumentStore, S: KeyValueStorage> {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    admin_emails: Vec<String>,
    store: Arc<D>,
    storage: Arc<S>,
    sessions: watch::Sender<Option<User>>,
}

impl<D: DocumentStore, S: KeyValueStorage> AuthClient<D, S> {
    /// Create an auth client.
    #[must_use]
    pub fn new(config: &AuthConfig, store: Arc<D>, storage: Arc<S>) -> Self {
        let (sessions, _) = watch::channel(None);
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.expose_secret().to_owned(),
            admin_emails: config.admin_emails.clone(),
            store,
            storage,
            sessions,
        }
    }

    /// Subscribe to session changes. The current value is `Some(user)` when
    /// signed in and `None` otherwise.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.sessions.subscribe()
    }

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for a rejected email/password pair,
    /// `UserNotFound` if no profile document exists for the account.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = Email::parse(email)?;

        let response = self
            .http
            .post(format!("{}/sessions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "email": email.as_str(),
                "password": password,
            }))
            .send()
            .await?;
        let session = Self::decode_session(response).await?;

        let user = self
            .fetch_profile(&UserId::new(session.uid))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.storage.set(TOKEN_KEY, &session.id_token)?;
        self.sessions.send_replace(Some(user.clone()));
        info!(uid = %user.uid, "signed in");

        Ok(Session {
            user,
            id_token: session.id_token,
        })
    }

    /// Create an account and its profile document.
    ///
    /// The profile gets the admin role when the email is on the configured
    /// whitelist; an empty display name is replaced with a generated one.
    ///
    /// # Errors
    ///
    /// `UserAlreadyExists` for a duplicate email, `WeakPassword` when the
    /// service rejects the password.
    #[instrument(skip(self, password, profile))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: SignUpProfile,
    ) -> Result<Session, AuthError> {
        let email = Email::parse(email)?;

        let response = self
            .http
            .post(format!("{}/accounts", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "email": email.as_str(),
                "password": password,
            }))
            .send()
            .await?;
        let session = Self::decode_session(response).await?;

        let role = if self.is_whitelisted(email.as_str()) {
            Role::Admin
        } else {
            Role::User
        };
        let full_name = if profile.full_name.is_empty() {
            generated_username()
        } else {
            profile.full_name
        };

        let now = Utc::now();
        let user = User {
            uid: UserId::new(session.uid.as_str()),
            full_name,
            email,
            phone: profile.phone,
            address: None,
            district: None,
            province_city: None,
            avatar: None,
            bio: None,
            role,
            created_at: now,
            updated_at: now,
            is_active: true,
            is_deleted: false,
        };
        self.store
            .create(
                collections::USERS,
                serde_json::to_value(&user).map_err(StoreError::from)?,
            )
            .await?;

        self.storage.set(TOKEN_KEY, &session.id_token)?;
        self.sessions.send_replace(Some(user.clone()));
        info!(uid = %user.uid, role = %user.role, "account created");

        Ok(Session {
            user,
            id_token: session.id_token,
        })
    }

    /// Drop the local session: forget the token and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the token cannot be removed.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.storage.remove(TOKEN_KEY)?;
        self.sessions.send_replace(None);
        info!("signed out");
        Ok(())
    }

    /// The persisted session token, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if local storage is unreadable.
    pub fn current_id_token(&self) -> Result<Option<String>, AuthError> {
        Ok(self.storage.get(TOKEN_KEY)?)
    }

    /// Fetch a user's profile document by auth uid.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the lookup fails.
    pub async fn fetch_profile(&self, uid: &UserId) -> Result<Option<User>, AuthError> {
        let filter = FieldFilter::equals("uid", uid.as_str());
        let docs = self.store.list(collections::USERS, Some(&filter)).await?;
        let user = docs
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(StoreError::from)?;
        Ok(user)
    }

    fn is_whitelisted(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|white| white.eq_ignore_ascii_case(email))
    }

    async fn decode_session(response: reqwest::Response) -> Result<SessionResponse, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(AuthError::InvalidCredentials),
            409 => Err(AuthError::UserAlreadyExists),
            400 => Err(AuthError::WeakPassword(
                "Password does not meet the requirements".to_owned(),
            )),
            code => Err(AuthError::Service { status: code, body }),
        }
    }
}

/// Fallback display name for accounts created without one.
fn generated_username() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("user-{}", suffix.to_lowercase())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::docstore::MemoryDocumentStore;
    use crate::storage::MemoryStorage;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(
        server: &MockServer,
        store: Arc<MemoryDocumentStore>,
        storage: Arc<MemoryStorage>,
        admin_emails: Vec<String>,
    ) -> AuthClient<MemoryDocumentStore, MemoryStorage> {
        AuthClient::new(
            &AuthConfig {
                base_url: server.uri(),
                api_key: "auth-key".into(),
                admin_emails,
            },
            store,
            storage,
        )
    }

    #[test]
    fn test_generated_username_shape() {
        let name = generated_username();
        assert!(name.starts_with("user-"));
        assert_eq!(name.len(), "user-".len() + 8);
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uid": "u-1",
                "idToken": "tok-signup",
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sessions"))
            .and(body_partial_json(json!({"email": "ada@example.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uid": "u-1",
                "idToken": "tok-signin",
            })))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryDocumentStore::new());
        let storage = Arc::new(MemoryStorage::new());
        let client = client_for(&server, Arc::clone(&store), Arc::clone(&storage), vec![]);

        let session = client
            .sign_up("ada@example.com", "hunter2!", SignUpProfile::default())
            .await
            .unwrap();
        assert_eq!(session.user.uid.as_str(), "u-1");
        assert_eq!(session.user.role, Role::User);
        assert!(session.user.full_name.starts_with("user-"));
        assert_eq!(
            client.current_id_token().unwrap().as_deref(),
            Some("tok-signup")
        );

        let session = client.sign_in("ada@example.com", "hunter2!").await.unwrap();
        assert_eq!(session.id_token, "tok-signin");
        assert_eq!(session.user.email.as_str(), "ada@example.com");
    }

    #[tokio::test]
    async fn test_admin_whitelist_grants_role() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uid": "u-admin",
                "idToken": "tok",
            })))
            .mount(&server)
            .await;

        let client = client_for(
            &server,
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(MemoryStorage::new()),
            vec!["boss@example.com".to_owned()],
        );

        let session = client
            .sign_up("boss@example.com", "hunter2!", SignUpProfile::default())
            .await
            .unwrap();
        assert_eq!(session.user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_sign_in_maps_401_to_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(
            &server,
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(MemoryStorage::new()),
            vec![],
        );
        let err = client.sign_in("ada@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_sign_out_clears_token_and_notifies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uid": "u-1",
                "idToken": "tok",
            })))
            .mount(&server)
            .await;

        let client = client_for(
            &server,
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(MemoryStorage::new()),
            vec![],
        );
        let mut sessions = client.subscribe();

        client
            .sign_up("ada@example.com", "hunter2!", SignUpProfile::default())
            .await
            .unwrap();
        assert!(sessions.borrow_and_update().is_some());

        client.sign_out().unwrap();
        assert!(sessions.borrow_and_update().is_none());
        assert!(client.current_id_token().unwrap().is_none());
    }
}
