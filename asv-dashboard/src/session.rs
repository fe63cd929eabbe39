//! Admin session state machine
//!
//! ```text
//! Unauthenticated --request_admin--> AwaitingCredentials
//! AwaitingCredentials --submit(valid)--> Authenticating
//! AwaitingCredentials --cancel--> Unauthenticated
//! Authenticating --success--> Authenticated
//! Authenticating --rejected / unreachable--> AwaitingCredentials
//! Authenticated --logout / force_logout--> Unauthenticated
//! ```
//!
//! The controller owns the bearer token. `is_authenticated()` is true exactly
//! when a token is held, and the token is zeroed on every transition back to
//! `Unauthenticated`. Every login mints a new [`SessionId`]; a rejection is
//! only acted on when it was issued under the current one.

use crate::error::DashboardError;
use crate::secret::Secret;
use tracing::{debug, info, warn};

pub const MSG_REQUIRED_FIELDS: &str = "Username and password are required.";
pub const MSG_UNREACHABLE: &str = "Cannot connect to server. Please check your connection.";
pub const MSG_INVALID_CREDENTIALS: &str = crate::api::INVALID_CREDENTIALS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    AwaitingCredentials,
    Authenticating,
    Authenticated,
}

/// Which prompt input has focus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptField {
    #[default]
    Username,
    Password,
}

/// The login prompt as shown to the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginPrompt {
    pub username: String,
    pub password: Secret,
    pub error: Option<String>,
    pub focus: PromptField,
}

/// Validated login input. The password stays a `Secret` until the request
/// body is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Secret,
}

/// One authenticated session, counted from process start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

/// Token and session a privileged request is sent under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub token: Secret,
    pub session: SessionId,
}

/// Answer to an admin-view request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAccess {
    Granted,
    PromptShown,
}

/// What a login completion did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    Rejected(DashboardError),
    /// No login was in flight; the completion was dropped
    Stale,
}

#[derive(Debug)]
pub struct SessionController {
    state: SessionState,
    token: Option<Secret>,
    prompt: Option<LoginPrompt>,
    epoch: u64,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            token: None,
            prompt: None,
            epoch: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&Secret> {
        self.token.as_ref()
    }

    /// The current session, if authenticated
    pub fn session_id(&self) -> Option<SessionId> {
        self.token.as_ref().map(|_| SessionId(self.epoch))
    }

    /// Token and session for a privileged request
    pub fn grant(&self) -> Option<Grant> {
        self.token.as_ref().map(|token| Grant {
            token: token.clone(),
            session: SessionId(self.epoch),
        })
    }

    /// The open login prompt, if any
    pub fn prompt(&self) -> Option<&LoginPrompt> {
        self.prompt.as_ref()
    }

    /// Request the admin view. Opens the prompt when not authenticated.
    pub fn request_admin(&mut self) -> AdminAccess {
        match self.state {
            SessionState::Authenticated => AdminAccess::Granted,
            SessionState::Unauthenticated => {
                self.state = SessionState::AwaitingCredentials;
                self.prompt = Some(LoginPrompt::default());
                debug!("login prompt opened");
                AdminAccess::PromptShown
            }
            SessionState::AwaitingCredentials | SessionState::Authenticating => {
                AdminAccess::PromptShown
            }
        }
    }

    /// Close the prompt. Ignored while a login request is in flight.
    pub fn cancel(&mut self) -> bool {
        if self.state != SessionState::AwaitingCredentials {
            return false;
        }
        self.state = SessionState::Unauthenticated;
        self.prompt = None;
        true
    }

    /// Validate the prompt input and move to `Authenticating`.
    ///
    /// Empty fields keep the prompt open with a validation message; no
    /// request is made.
    pub fn submit(
        &mut self,
        username: &str,
        password: Secret,
    ) -> Result<Credentials, DashboardError> {
        if self.state != SessionState::AwaitingCredentials {
            return Err(DashboardError::Validation("no login prompt is open".to_string()));
        }
        let prompt = self.prompt.get_or_insert_with(LoginPrompt::default);
        let username = username.trim();
        prompt.username = username.to_string();
        prompt.password = password;

        if username.is_empty() || prompt.password.is_empty() {
            prompt.error = Some(MSG_REQUIRED_FIELDS.to_string());
            prompt.focus = if username.is_empty() {
                PromptField::Username
            } else {
                PromptField::Password
            };
            return Err(DashboardError::Validation(MSG_REQUIRED_FIELDS.to_string()));
        }

        prompt.error = None;
        self.state = SessionState::Authenticating;
        Ok(Credentials {
            username: username.to_string(),
            password: prompt.password.clone(),
        })
    }

    /// Apply the result of a login request
    pub fn complete(&mut self, result: Result<Secret, DashboardError>) -> LoginOutcome {
        if self.state != SessionState::Authenticating {
            return LoginOutcome::Stale;
        }
        match result {
            Ok(token) => {
                self.epoch += 1;
                self.token = Some(token);
                self.prompt = None;
                self.state = SessionState::Authenticated;
                info!("admin session started");
                LoginOutcome::Authenticated
            }
            Err(err) => {
                let message = match &err {
                    DashboardError::Unreachable(_) => MSG_UNREACHABLE.to_string(),
                    other => other.user_message(MSG_INVALID_CREDENTIALS),
                };
                warn!(error = %err, "login failed");
                let prompt = self.prompt.get_or_insert_with(LoginPrompt::default);
                prompt.password.clear();
                prompt.error = Some(message);
                prompt.focus = PromptField::Password;
                self.state = SessionState::AwaitingCredentials;
                LoginOutcome::Rejected(err)
            }
        }
    }

    /// Explicit logout. Returns the token so it can be revoked server-side.
    pub fn logout(&mut self) -> Option<Secret> {
        if self.state != SessionState::Authenticated {
            return None;
        }
        self.state = SessionState::Unauthenticated;
        info!("admin session ended");
        self.token.take()
    }

    /// Drop the session after the server rejected the token it issued.
    /// Returns false when `issued` is not the current session.
    pub fn force_logout(&mut self, issued: SessionId) -> bool {
        if self.state != SessionState::Authenticated {
            return false;
        }
        if issued != SessionId(self.epoch) {
            debug!(?issued, "rejection for an earlier session ignored");
            return false;
        }
        self.state = SessionState::Unauthenticated;
        if let Some(mut token) = self.token.take() {
            token.clear();
        }
        warn!("admin session expired");
        true
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
