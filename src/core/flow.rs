// src/core/flow.rs
//! Landing → authenticating → building flow

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CollaboratorError, FlowError};
use crate::services::CredentialVerifier;
use crate::types::VerifiedUser;

const PASSWORD_MISMATCH: &str = "Passwords don't match";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl LoginForm {
    /// Whether the submit action is enabled.
    pub fn is_submittable(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

impl SignupForm {
    pub fn is_submittable(&self) -> bool {
        !self.username.is_empty()
            && !self.email.is_empty()
            && !self.password.is_empty()
            && self.password == self.confirm_password
    }

    /// Inline hint, shown only once something has been typed in the confirmation.
    pub fn mismatch_hint(&self) -> Option<&'static str> {
        (!self.confirm_password.is_empty() && self.password != self.confirm_password)
            .then_some(PASSWORD_MISMATCH)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthRequest {
    Login(LoginForm),
    Signup(SignupForm),
}

impl AuthRequest {
    fn is_submittable(&self) -> bool {
        match self {
            AuthRequest::Login(form) => form.is_submittable(),
            AuthRequest::Signup(form) => form.is_submittable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    Landing,
    Authenticating { in_flight: Option<AuthRequest> },
    Building { user: VerifiedUser },
}

impl FlowState {
    fn label(&self) -> &'static str {
        match self {
            FlowState::Landing => "on the landing view",
            FlowState::Authenticating { in_flight: None } => "authenticating",
            FlowState::Authenticating { in_flight: Some(_) } => "a request is in flight",
            FlowState::Building { .. } => "building",
        }
    }
}

pub struct FlowController {
    state: FlowState,
    last_error: Option<CollaboratorError>,
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowController {
    pub fn new() -> Self {
        Self {
            state: FlowState::Landing,
            last_error: None,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn last_error(&self) -> Option<&CollaboratorError> {
        self.last_error.as_ref()
    }

    pub fn user(&self) -> Option<&VerifiedUser> {
        match &self.state {
            FlowState::Building { user } => Some(user),
            _ => None,
        }
    }

    /// User asked for the auth form.
    pub fn open_auth(&mut self) -> Result<(), FlowError> {
        match self.state {
            FlowState::Landing => {
                self.state = FlowState::Authenticating { in_flight: None };
                Ok(())
            }
            _ => Err(self.invalid("open the auth form")),
        }
    }

    pub fn submit(&mut self, request: AuthRequest) -> Result<(), FlowError> {
        if !matches!(self.state, FlowState::Authenticating { in_flight: None }) {
            return Err(self.invalid("submit credentials"));
        }
        if !request.is_submittable() {
            return Err(FlowError::FormIncomplete(match request {
                AuthRequest::Login(_) => "email and password are required",
                AuthRequest::Signup(ref form) if form.mismatch_hint().is_some() => {
                    PASSWORD_MISMATCH
                }
                AuthRequest::Signup(_) => "username, email and password are required",
            }));
        }

        self.last_error = None;
        self.state = FlowState::Authenticating {
            in_flight: Some(request),
        };
        Ok(())
    }

    /// Hand the in-flight request to the verifier.
    ///
    /// A rejection keeps the flow on the auth form so the user can retry.
    pub async fn resolve(
        &mut self,
        verifier: &dyn CredentialVerifier,
    ) -> Result<VerifiedUser, FlowError> {
        let request = match &mut self.state {
            FlowState::Authenticating { in_flight } => in_flight.take(),
            _ => None,
        };
        let Some(request) = request else {
            return Err(self.invalid("resolve credentials"));
        };

        let outcome = match &request {
            AuthRequest::Login(form) => verifier.verify(form).await,
            AuthRequest::Signup(form) => verifier.register(form).await,
        };

        match outcome {
            Ok(user) => {
                info!("Authenticated {} ({})", user.email, user.username);
                self.state = FlowState::Building { user: user.clone() };
                Ok(user)
            }
            Err(e) => {
                warn!("Authentication rejected: {}", e);
                self.last_error = Some(e.clone());
                Err(FlowError::Rejected(e))
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = FlowState::Landing;
        self.last_error = None;
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            action,
            state: self.state.label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollaboratorResult;

    struct OnlyAda;

    #[rocket::async_trait]
    impl CredentialVerifier for OnlyAda {
        async fn verify(&self, form: &LoginForm) -> CollaboratorResult<VerifiedUser> {
            if form.email == "ada@example.com" && form.password == "engine" {
                Ok(VerifiedUser {
                    username: "ada".to_string(),
                    email: form.email.clone(),
                })
            } else {
                Err(CollaboratorError::InvalidCredentials)
            }
        }

        async fn register(&self, form: &SignupForm) -> CollaboratorResult<VerifiedUser> {
            Err(CollaboratorError::AccountExists(form.email.clone()))
        }
    }

    fn login(password: &str) -> AuthRequest {
        AuthRequest::Login(LoginForm {
            email: "ada@example.com".to_string(),
            password: password.to_string(),
        })
    }

    #[test]
    fn test_form_validation_is_advisory() {
        assert!(!LoginForm::default().is_submittable());
        let mut signup = SignupForm {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "engine".to_string(),
            confirm_password: String::new(),
        };
        assert!(!signup.is_submittable());
        assert_eq!(signup.mismatch_hint(), None);

        signup.confirm_password = "engin".to_string();
        assert_eq!(signup.mismatch_hint(), Some("Passwords don't match"));

        signup.confirm_password = "engine".to_string();
        assert!(signup.is_submittable());
        assert_eq!(signup.mismatch_hint(), None);
    }

    #[tokio::test]
    async fn test_successful_login_reaches_building() {
        let mut flow = FlowController::new();
        flow.open_auth().unwrap();
        flow.submit(login("engine")).unwrap();

        let user = flow.resolve(&OnlyAda).await.unwrap();

        assert_eq!(user.username, "ada");
        assert_eq!(flow.user(), Some(&user));
    }

    #[tokio::test]
    async fn test_rejection_stays_on_auth_form() {
        let mut flow = FlowController::new();
        flow.open_auth().unwrap();
        flow.submit(login("wrong")).unwrap();

        let err = flow.resolve(&OnlyAda).await.unwrap_err();

        assert_eq!(
            err,
            FlowError::Rejected(CollaboratorError::InvalidCredentials)
        );
        assert_eq!(
            flow.state(),
            &FlowState::Authenticating { in_flight: None }
        );
        assert_eq!(
            flow.last_error(),
            Some(&CollaboratorError::InvalidCredentials)
        );

        // Retry succeeds and clears the error
        flow.submit(login("engine")).unwrap();
        assert!(flow.last_error().is_none());
        flow.resolve(&OnlyAda).await.unwrap();
        assert!(flow.user().is_some());
    }

    #[tokio::test]
    async fn test_signup_rejection_is_reported() {
        let mut flow = FlowController::new();
        flow.open_auth().unwrap();
        flow.submit(AuthRequest::Signup(SignupForm {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "engine".to_string(),
            confirm_password: "engine".to_string(),
        }))
        .unwrap();

        let err = flow.resolve(&OnlyAda).await.unwrap_err();
        assert!(matches!(
            err,
            FlowError::Rejected(CollaboratorError::AccountExists(_))
        ));
    }

    #[test]
    fn test_incomplete_forms_cannot_be_submitted() {
        let mut flow = FlowController::new();
        flow.open_auth().unwrap();

        let err = flow
            .submit(AuthRequest::Signup(SignupForm {
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "engine".to_string(),
                confirm_password: "other".to_string(),
            }))
            .unwrap_err();

        assert_eq!(err, FlowError::FormIncomplete("Passwords don't match"));
        assert_eq!(
            flow.state(),
            &FlowState::Authenticating { in_flight: None }
        );
    }

    #[tokio::test]
    async fn test_transitions_out_of_order_are_rejected() {
        let mut flow = FlowController::new();
        assert!(flow.submit(login("engine")).is_err());
        assert!(flow.resolve(&OnlyAda).await.is_err());

        flow.open_auth().unwrap();
        assert!(flow.open_auth().is_err());
        assert!(flow.resolve(&OnlyAda).await.is_err());

        flow.submit(login("engine")).unwrap();
        assert!(flow.submit(login("engine")).is_err());
        flow.resolve(&OnlyAda).await.unwrap();

        assert!(flow.open_auth().is_err());
        flow.reset();
        assert_eq!(flow.state(), &FlowState::Landing);
        assert!(flow.user().is_none());
    }
}
