use crate::form::{looks_like_email, Choice, FormView, SubmitPhase};
use crate::models::{ProfileUpdate, INTERESTS, PROFESSIONS};

pub const PROFILE_SAVED: &str = "Profile updated.";
pub const PROFILE_SAVE_FAILED: &str = "Could not update profile. Please try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfileTab {
    #[default]
    History,
    Downloads,
    Edit,
    Logout,
}

impl ProfileTab {
    pub const ALL: [ProfileTab; 4] = [Self::History, Self::Downloads, Self::Edit, Self::Logout];

    pub fn label(self) -> &'static str {
        match self {
            Self::History => "Analysis History",
            Self::Downloads => "Downloads",
            Self::Edit => "Edit Profile",
            Self::Logout => "Logout",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "history" => Some(Self::History),
            "downloads" => Some(Self::Downloads),
            "edit" => Some(Self::Edit),
            "logout" => Some(Self::Logout),
            _ => None,
        }
    }
}

pub fn greeting(user_name: Option<&str>) -> String {
    match user_name {
        Some(name) if !name.is_empty() => format!("Welcome, {}", name),
        _ => "User info unavailable".to_string(),
    }
}

pub const EDIT_EMAIL: usize = 0;
pub const EDIT_PROFESSION: usize = 1;
pub const EDIT_INTEREST: usize = 2;

#[derive(Debug)]
pub struct EditProfileForm {
    pub email: String,
    pub profession: Choice,
    pub interest: Choice,
    focus: usize,
    phase: SubmitPhase,
}

impl Default for EditProfileForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            profession: Choice::preselected(&PROFESSIONS),
            interest: Choice::preselected(&INTERESTS),
            focus: 0,
            phase: SubmitPhase::Idle,
        }
    }
}

impl EditProfileForm {
    pub fn begin_submit(&mut self) -> Option<ProfileUpdate> {
        if self.is_submitting() {
            return None;
        }
        if !looks_like_email(&self.email) {
            return self.reject("Please enter a valid email address.");
        }
        let (Some(profession), Some(interest)) = (self.profession.value(), self.interest.value())
        else {
            return self.reject("Please choose your profession and interest.");
        };

        self.phase = SubmitPhase::Submitting;
        Some(ProfileUpdate {
            email: self.email.trim().to_string(),
            qualification: profession.to_string(),
            fields_of_interest: interest.to_string(),
        })
    }

    pub fn finish(&mut self, result: Result<(), String>) {
        self.phase = match result {
            Ok(()) => SubmitPhase::Idle,
            Err(message) => SubmitPhase::Failed(message),
        };
    }

    pub fn abandon(&mut self) {
        if self.is_submitting() {
            self.phase = SubmitPhase::Idle;
        }
    }
}

impl FormView for EditProfileForm {
    fn field_count(&self) -> usize {
        3
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
        (self.focus == EDIT_EMAIL).then_some(&mut self.email)
    }

    fn focused_choice(&mut self) -> Option<&mut Choice> {
        match self.focus {
            EDIT_PROFESSION => Some(&mut self.profession),
            EDIT_INTEREST => Some(&mut self.interest),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ProfileView {
    tab: ProfileTab,
    pub edit: EditProfileForm,
}

impl ProfileView {
    pub fn tab(&self) -> ProfileTab {
        self.tab
    }

    /// Selects a sidebar entry. Returns `true` for Logout, which the router
    /// handles instead of switching tabs.
    pub fn select(&mut self, tab: ProfileTab) -> bool {
        if tab == ProfileTab::Logout {
            return true;
        }
        self.tab = tab;
        false
    }

    pub fn next_tab(&mut self) {
        self.tab = match self.tab {
            ProfileTab::History => ProfileTab::Downloads,
            ProfileTab::Downloads => ProfileTab::Edit,
            ProfileTab::Edit | ProfileTab::Logout => ProfileTab::History,
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
