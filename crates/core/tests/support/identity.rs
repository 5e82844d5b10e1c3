//! Scripted identity provider for testing
//!
//! Returns pre-programmed results and records the order in which the engine
//! called it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sessiongate_core::IdentityProvider;
use sessiongate_domain::{
    AccountInfo, RedirectCompletion, Result as DomainResult, Session, SessionGateError,
    SilentTokenResult, TokenRequest,
};

/// One call observed by [`ScriptedIdentityProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityCall {
    Accounts,
    Silent(TokenRequest),
    Redirect(TokenRequest),
    CompleteRedirect { code: String, state: String },
    Logout(String),
}

#[derive(Default)]
struct Script {
    silent: VecDeque<SilentTokenResult>,
    completion: Option<RedirectCompletion>,
    calls: Vec<IdentityCall>,
}

/// `IdentityProvider` returning scripted results.
///
/// Accounts come from the session record itself, as a provider with a
/// session-scoped cache would report them.
#[derive(Clone, Default)]
pub struct ScriptedIdentityProvider {
    script: Arc<Mutex<Script>>,
}

impl ScriptedIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next silent attempt.
    pub fn with_silent(self, result: SilentTokenResult) -> Self {
        self.script.lock().unwrap().silent.push_back(result);
        self
    }

    pub fn with_completion(self, account: AccountInfo, token: sessiongate_domain::CachedToken) -> Self {
        self.script.lock().unwrap().completion = Some(RedirectCompletion { account, token });
        self
    }

    pub fn calls(&self) -> Vec<IdentityCall> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn redirect_count(&self) -> usize {
        self.calls().iter().filter(|call| matches!(call, IdentityCall::Redirect(_))).count()
    }

    fn record(&self, call: IdentityCall) {
        self.script.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl IdentityProvider for ScriptedIdentityProvider {
    async fn accounts(&self, session: &Session) -> DomainResult<Vec<AccountInfo>> {
        self.record(IdentityCall::Accounts);
        Ok(session.account.clone().into_iter().collect())
    }

    async fn acquire_token_silent(&self, request: &TokenRequest, _session: &Session) -> SilentTokenResult {
        self.record(IdentityCall::Silent(request.clone()));
        self.script
            .lock()
            .unwrap()
            .silent
            .pop_front()
            .unwrap_or_else(|| SilentTokenResult::InteractionRequired("no cached token".to_string()))
    }

    async fn acquire_token_redirect(&self, request: &TokenRequest) -> DomainResult<String> {
        self.record(IdentityCall::Redirect(request.clone()));
        let redirect_uri = request
            .redirect_uri
            .clone()
            .ok_or_else(|| SessionGateError::InvalidArgument("redirect uri is required".to_string()))?;
        Ok(format!(
            "https://idp.example.com/authorize?scope={}&redirect_uri={redirect_uri}",
            request.scopes
        ))
    }

    async fn complete_redirect(&self, code: &str, state: &str) -> DomainResult<RedirectCompletion> {
        self.record(IdentityCall::CompleteRedirect { code: code.to_string(), state: state.to_string() });
        self.script
            .lock()
            .unwrap()
            .completion
            .clone()
            .ok_or_else(|| SessionGateError::TokenAcquisition("unknown authorization state".to_string()))
    }

    fn logout_url(&self, post_logout_redirect_uri: &str) -> DomainResult<String> {
        self.record(IdentityCall::Logout(post_logout_redirect_uri.to_string()));
        Ok(format!("https://idp.example.com/logout?post_logout_redirect_uri={post_logout_redirect_uri}"))
    }
}
