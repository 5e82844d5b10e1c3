//! Token acquisition engine - silent first, interactive redirect as fallback
//!
//! Per acquisition:
//!
//! ```text
//! Start ──► SilentAttempt ──► Done (token)
//!                 │
//!                 ├── interaction required ──► InteractiveFallback (redirect URL)
//!                 │
//!                 └── any other failure ─────► Failed (error unchanged)
//! ```
//!
//! The silent attempt is awaited to completion before the redirect is
//! built; the two paths never run concurrently.

use std::sync::Arc;

use sessiongate_domain::constants::{callback_uri, CACHED_TOKENS_PATH};
use sessiongate_domain::{
    AccessTokenOutcome, CachedToken, JsonPath, Result, ScopeSet, Session, SessionGateError,
    SilentTokenResult, TokenRequest,
};
use tracing::{debug, error, info, warn};

use super::ports::IdentityProvider;
use crate::session::SessionService;

/// Token acquisition engine
pub struct TokenAcquisitionEngine {
    identity: Arc<dyn IdentityProvider>,
    sessions: SessionService,
    public_origin: String,
}

impl TokenAcquisitionEngine {
    /// `public_origin` is the browser-facing origin used to build the
    /// interactive callback target.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        sessions: SessionService,
        public_origin: impl Into<String>,
    ) -> Self {
        Self { identity, sessions, public_origin: public_origin.into() }
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    /// Produce an access token for `scopes` on behalf of the session.
    ///
    /// Returns [`AccessTokenOutcome::RedirectRequired`] when the provider
    /// needs the user to interact; the token arrives on a later request
    /// after the browser has completed the redirect.
    ///
    /// # Errors
    /// `NoAccount` when the session has no resolvable account; any other
    /// provider or transport error is returned unchanged.
    pub async fn get_access_token(
        &self,
        session_id: &str,
        session: &Session,
        scopes: &ScopeSet,
    ) -> Result<AccessTokenOutcome> {
        let account = self
            .identity
            .accounts(session)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SessionGateError::NoAccount(session_id.to_string()))?;

        let request = TokenRequest::new(scopes.clone(), account);

        match self.identity.acquire_token_silent(&request, session).await {
            SilentTokenResult::Token(token) => {
                debug!(session_id = %session_id, scopes = %scopes, "Silent token acquisition succeeded");
                let access_token = token.access_token.clone();
                self.remember_token(session_id, session, token).await;
                Ok(AccessTokenOutcome::Token(access_token))
            }
            SilentTokenResult::InteractionRequired(reason) => {
                info!(
                    session_id = %session_id,
                    scopes = %scopes,
                    reason = %reason,
                    "Silent token acquisition requires interaction; redirecting"
                );
                let request = request.with_redirect_uri(callback_uri(&self.public_origin));
                let authorization_url = self.identity.acquire_token_redirect(&request).await?;
                Ok(AccessTokenOutcome::RedirectRequired { authorization_url })
            }
            SilentTokenResult::Failure(err) => {
                warn!(
                    session_id = %session_id,
                    error = %err,
                    error_label = err.label(),
                    "Silent token acquisition failed"
                );
                Err(err)
            }
        }
    }

    /// Load the session and acquire a token for it.
    ///
    /// # Errors
    /// `NoAccount` when no session is stored under `session_id`, otherwise
    /// as [`Self::get_access_token`].
    pub async fn get_access_token_for(
        &self,
        session_id: &str,
        scopes: &ScopeSet,
    ) -> Result<AccessTokenOutcome> {
        let session = self
            .sessions
            .get_session(session_id)
            .await?
            .ok_or_else(|| SessionGateError::NoAccount(session_id.to_string()))?;
        self.get_access_token(session_id, &session, scopes).await
    }

    /// Authorization URL for a plain interactive sign-in from `origin`.
    pub async fn sign_in(&self, origin: &str) -> Result<String> {
        let request = TokenRequest::sign_in(callback_uri(origin));
        self.identity.acquire_token_redirect(&request).await
    }

    /// Handle the callback of an interactive redirect.
    ///
    /// Stores the account and the issued token in the session document
    /// (creating it if needed) and returns the stored session.
    ///
    /// # Errors
    /// Provider errors from redeeming the code; `StoreUnavailable` when the
    /// session could not be written.
    pub async fn complete_sign_in(&self, session_id: &str, code: &str, state: &str) -> Result<Session> {
        if session_id.is_empty() {
            return Err(SessionGateError::InvalidArgument("session id is required".to_string()));
        }

        let completion = self.identity.complete_redirect(code, state).await?;

        let mut session =
            self.sessions.get_session(session_id).await?.unwrap_or_else(|| Session::new(session_id));
        session.session_id = session_id.to_string();
        session.account = Some(completion.account);
        session.upsert_cached_token(completion.token);

        if !self.sessions.save(&session).await? {
            return Err(SessionGateError::StoreUnavailable(format!(
                "session write for {session_id} was not acknowledged"
            )));
        }

        info!(session_id = %session_id, "Sign-in completed");
        Ok(session)
    }

    /// Drop the session and return the provider's end-session URL, which
    /// sends the browser back to `{origin}{path}`.
    ///
    /// A failure to delete the session is logged; the sign-out proceeds.
    pub async fn sign_out(&self, session_id: &str, origin: &str, path: &str) -> Result<String> {
        match self.sessions.delete_session(session_id).await {
            Ok(deleted) => debug!(session_id = %session_id, deleted, "Session removed on sign-out"),
            Err(err) => error!(session_id = %session_id, error = %err, "Failed to remove session on sign-out"),
        }

        let post_logout = format!("{}{}", origin.trim_end_matches('/'), path);
        self.identity.logout_url(&post_logout)
    }

    /// Merge a freshly acquired token into the session's cache and persist
    /// only the token list. Failures degrade to a logged warning.
    async fn remember_token(&self, session_id: &str, session: &Session, token: CachedToken) {
        let mut updated = session.clone();
        if !updated.upsert_cached_token(token) {
            return;
        }

        let path = match JsonPath::parse(CACHED_TOKENS_PATH) {
            Ok(path) => path,
            Err(err) => {
                error!(error = %err, "Invalid cached token path");
                return;
            }
        };

        if !self.sessions.persist_degraded(session_id, &path, &updated.cached_tokens).await {
            warn!(session_id = %session_id, "Acquired token was not cached in the session");
        }
    }
}
