use crate::{
    backend::BackendState,
    error::SessionError,
    models::{LoginRequest, RegisterRequest},
    navigation::NavigatorState,
    storage::CredentialStore,
};

pub const REQUIRED_MESSAGE: &str = "This field is required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Username,
    Password,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

/// AuthFlow
///
/// What a successful submission does next. Login persists the credential
/// through the [`CredentialStore`] facade, so the cookie the edge guard reads
/// is written together with the client copy.
#[derive(Clone)]
pub struct AuthFlow {
    backend: BackendState,
    store: CredentialStore,
    navigator: NavigatorState,
    login_route: String,
    landing_route: String,
}

impl AuthFlow {
    pub fn new(
        backend: BackendState,
        store: CredentialStore,
        navigator: NavigatorState,
        login_route: impl Into<String>,
        landing_route: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            store,
            navigator,
            login_route: login_route.into(),
            landing_route: landing_route.into(),
        }
    }

    /// Exchanges credentials for a token, persists it to both stores, then lands.
    pub async fn login(&self, request: &LoginRequest) -> Result<(), SessionError> {
        let token = self.backend.login(request).await?;
        self.store.store(&token).await?;
        tracing::info!(username = %request.username, "signed in");
        self.navigator.navigate(&self.landing_route);
        Ok(())
    }

    /// Creates the account and sends the visitor to login. No credential is written.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), SessionError> {
        self.backend.register(request).await?;
        tracing::info!(username = %request.username, "account registered");
        self.navigator.navigate(&self.login_route);
        Ok(())
    }
}

/// AuthForm
///
/// Field values plus the form's visible error state. Username and password are
/// always required, email only when registering.
#[derive(Debug, Clone)]
pub struct AuthForm {
    mode: FormMode,
    pub email: String,
    pub username: String,
    pub password: String,
    field_errors: Vec<FieldError>,
    error: Option<String>,
}

impl AuthForm {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            email: String::new(),
            username: String::new(),
            password: String::new(),
            field_errors: Vec::new(),
            error: None,
        }
    }

    pub fn login(username: &str, password: &str) -> Self {
        let mut form = Self::new(FormMode::Login);
        form.username = username.to_string();
        form.password = password.to_string();
        form
    }

    pub fn register(email: &str, username: &str, password: &str) -> Self {
        let mut form = Self::new(FormMode::Register);
        form.email = email.to_string();
        form.username = username.to_string();
        form.password = password.to_string();
        form
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn required_fields(&self) -> &'static [Field] {
        match self.mode {
            FormMode::Login => &[Field::Username, Field::Password],
            FormMode::Register => &[Field::Email, Field::Username, Field::Password],
        }
    }

    pub fn is_required(&self, field: Field) -> bool {
        self.required_fields().contains(&field)
    }

    /// Top-level error of the last submission, shown verbatim.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// validate
    ///
    /// Missing required fields. An empty result means the form may be sent.
    pub fn validate(&self) -> Vec<FieldError> {
        self.required_fields()
            .iter()
            .filter(|field| self.value(**field).is_empty())
            .map(|field| FieldError {
                field: *field,
                message: REQUIRED_MESSAGE,
            })
            .collect()
    }

    /// submit
    ///
    /// Validates, then runs the login or register flow. Any failure ends up
    /// as the single top-level error string; nothing is retried.
    pub async fn submit(&mut self, flow: &AuthFlow) -> Result<(), SessionError> {
        self.error = None;
        self.field_errors = self.validate();
        if let Some(first) = self.field_errors.first() {
            return Err(SessionError::Validation(first.message.to_string()));
        }

        let outcome = match self.mode {
            FormMode::Login => {
                let request = LoginRequest {
                    username: self.username.clone(),
                    password: self.password.clone(),
                };
                flow.login(&request).await
            }
            FormMode::Register => {
                let request = RegisterRequest {
                    email: self.email.clone(),
                    username: self.username.clone(),
                    password: self.password.clone(),
                };
                flow.register(&request).await
            }
        };

        if let Err(e) = &outcome {
            tracing::debug!(error = %e, mode = ?self.mode, "auth form submission failed");
            self.error = Some(e.user_message());
        }
        outcome
    }

    fn value(&self, field: Field) -> &str {
        match field {
            Field::Email => &self.email,
            Field::Username => &self.username,
            Field::Password => &self.password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_username_and_password_only() {
        let form = AuthForm::new(FormMode::Login);
        assert!(!form.is_required(Field::Email));
        assert!(form.is_required(Field::Username));
        assert!(form.is_required(Field::Password));
    }

    #[test]
    fn register_requires_email() {
        let form = AuthForm::register("", "a", "x");
        assert_eq!(
            form.validate(),
            vec![FieldError {
                field: Field::Email,
                message: REQUIRED_MESSAGE
            }]
        );
    }

    #[test]
    fn complete_login_form_validates() {
        assert!(AuthForm::login("a", "x").validate().is_empty());
    }

    #[test]
    fn empty_login_form_reports_every_missing_field() {
        let fields: Vec<Field> = AuthForm::new(FormMode::Login)
            .validate()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec![Field::Username, Field::Password]);
    }
}
