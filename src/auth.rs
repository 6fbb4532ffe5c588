use crate::form::{looks_like_email, Choice, FormView, SubmitPhase};
use crate::models::{Credentials, RegistrationRequest, INTERESTS, PROFESSIONS};

pub const LOGIN_FAILED: &str = "Invalid email or password. Please try again.";
pub const REGISTER_FAILED: &str = "Registration failed. Please try again.";
pub const REGISTER_SUCCEEDED: &str =
    "Registration successful! Please log in with your credentials.";
pub const MIN_PASSWORD_LEN: usize = 6;

pub const LOGIN_EMAIL: usize = 0;
pub const LOGIN_PASSWORD: usize = 1;

#[derive(Debug, Default)]
pub struct LoginView {
    pub email: String,
    pub password: String,
    focus: usize,
    phase: SubmitPhase,
}

impl LoginView {
    /// Starts a submission. Returns `None` when one is already in flight or
    /// the form is incomplete. The password buffer is emptied on hand-off.
    pub fn begin_submit(&mut self) -> Option<Credentials> {
        if self.is_submitting() {
            return None;
        }
        if self.email.trim().is_empty() || self.password.is_empty() {
            return self.reject("Please enter your email and password.");
        }
        if !looks_like_email(&self.email) {
            return self.reject("Please enter a valid email address.");
        }

        self.phase = SubmitPhase::Submitting;
        Some(Credentials {
            email: self.email.trim().to_string(),
            password: std::mem::take(&mut self.password),
        })
    }

    pub fn succeed(&mut self) {
        *self = Self::default();
    }

    pub fn fail(&mut self, message: String) {
        self.phase = SubmitPhase::Failed(message);
    }

    /// Drops an in-flight submission without touching the fields.
    pub fn abandon(&mut self) {
        if self.is_submitting() {
            self.phase = SubmitPhase::Idle;
        }
    }
}

impl FormView for LoginView {
    fn field_count(&self) -> usize {
        2
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, focus: usize) {
        self.focus = focus;
    }

    fn phase(&self) -> &SubmitPhase {
        &self.phase
    }

    fn phase_mut(&mut self) -> &mut SubmitPhase {
        &mut self.phase
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            LOGIN_EMAIL => Some(&mut self.email),
            LOGIN_PASSWORD => Some(&mut self.password),
            _ => None,
        }
    }
}

pub const SIGNUP_USERNAME: usize = 0;
pub const SIGNUP_EMAIL: usize = 1;
pub const SIGNUP_PASSWORD: usize = 2;
pub const SIGNUP_QUALIFICATION: usize = 3;
pub const SIGNUP_INTEREST: usize = 4;

#[derive(Debug)]
pub struct SignUpView {
    pub username: String,
    pub email: String,
    pub password: String,
    pub qualification: Choice,
    pub interest: Choice,
    focus: usize,
    phase: SubmitPhase,
}

impl Default for SignUpView {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: String::new(),
            qualification: Choice::new(&PROFESSIONS),
            interest: Choice::new(&INTERESTS),
            focus: 0,
            phase: SubmitPhase::Idle,
        }
    }
}

impl SignUpView {
    pub fn begin_submit(&mut self) -> Option<RegistrationRequest> {
        if self.is_submitting() {
            return None;
        }
        if self.username.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
        {
            return self.reject("Please fill in your username, email and password.");
        }
        if !looks_like_email(&self.email) {
            return self.reject("Please enter a valid email address.");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return self.reject("Password must be at least 6 characters.");
        }
        let Some(qualification) = self.qualification.value() else {
            return self.reject("Please choose your profession.");
        };
        let Some(interest) = self.interest.value() else {
            return self.reject("Please choose your interest.");
        };

        self.phase = SubmitPhase::Submitting;
        Some(RegistrationRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: std::mem::take(&mut self.password),
            qualification: qualification.to_string(),
            fields_of_interest: interest.to_string(),
        })
    }

    pub fn succeed(&mut self) {
        *self = Self::default();
    }

    pub fn fail(&mut self, message: String) {
        self.phase = SubmitPhase::Failed(message);
    }

    pub fn abandon(&mut self) {
        if self.is_submitting() {
            self.phase = SubmitPhase::Idle;
        }
    }
}

impl FormView for SignUpView {
    fn field_count(&self) -> usize {
        5
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, focus: usize) {
        self.focus = focus;
    }

    fn phase(&self) -> &SubmitPhase {
        &self.phase
    }

    fn phase_mut(&mut self) -> &mut SubmitPhase {
        &mut self.phase
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            SIGNUP_USERNAME => Some(&mut self.username),
            SIGNUP_EMAIL => Some(&mut self.email),
            SIGNUP_PASSWORD => Some(&mut self.password),
            _ => None,
        }
    }

    fn focused_choice(&mut self) -> Option<&mut Choice> {
        match self.focus {
            SIGNUP_QUALIFICATION => Some(&mut self.qualification),
            SIGNUP_INTEREST => Some(&mut self.interest),
            _ => None,
        }
    }
}
