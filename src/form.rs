/// Lifecycle of a form that submits one request at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
    Failed(String),
}

/// A select box over a fixed list. `None` means nothing chosen yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    options: &'static [&'static str],
    selected: Option<usize>,
}

impl Choice {
    pub fn new(options: &'static [&'static str]) -> Self {
        Self { options, selected: None }
    }

    pub fn preselected(options: &'static [&'static str]) -> Self {
        Self {
            options,
            selected: if options.is_empty() { None } else { Some(0) },
        }
    }

    pub fn value(&self) -> Option<&'static str> {
        self.selected.and_then(|i| self.options.get(i).copied())
    }

    pub fn options(&self) -> &'static [&'static str] {
        self.options
    }

    pub fn cycle(&mut self, forward: bool) {
        let len = self.options.len();
        if len == 0 {
            return;
        }
        self.selected = Some(match (self.selected, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        });
    }

    pub fn select(&mut self, value: &str) -> bool {
        match self.options.iter().position(|o| o.eq_ignore_ascii_case(value)) {
            Some(i) => {
                self.selected = Some(i);
                true
            }
            None => false,
        }
    }
}

/// Keyboard-driven editing shared by the login, sign-up and profile forms.
/// Inputs are locked while a submission is in flight, and any edit clears a
/// displayed error.
pub trait FormView {
    fn field_count(&self) -> usize;
    fn focus(&self) -> usize;
    fn set_focus(&mut self, focus: usize);
    fn phase(&self) -> &SubmitPhase;
    fn phase_mut(&mut self) -> &mut SubmitPhase;

    /// The text buffer under focus, if the focused field is a text input.
    fn focused_text(&mut self) -> Option<&mut String>;

    /// The select box under focus, if the focused field is one.
    fn focused_choice(&mut self) -> Option<&mut Choice> {
        None
    }

    fn is_submitting(&self) -> bool {
        *self.phase() == SubmitPhase::Submitting
    }

    fn error(&self) -> Option<&str> {
        match self.phase() {
            SubmitPhase::Failed(message) => Some(message),
            _ => None,
        }
    }

    fn clear_error(&mut self) {
        if matches!(self.phase(), SubmitPhase::Failed(_)) {
            *self.phase_mut() = SubmitPhase::Idle;
        }
    }

    fn focus_next(&mut self) {
        let count = self.field_count();
        if count > 0 {
            self.set_focus((self.focus() + 1) % count);
        }
    }

    fn focus_prev(&mut self) {
        let count = self.field_count();
        if count > 0 {
            self.set_focus((self.focus() + count - 1) % count);
        }
    }

    fn type_char(&mut self, c: char) {
        if self.is_submitting() {
            return;
        }
        if let Some(text) = self.focused_text() {
            text.push(c);
            self.clear_error();
        }
    }

    fn backspace(&mut self) {
        if self.is_submitting() {
            return;
        }
        if let Some(text) = self.focused_text() {
            text.pop();
            self.clear_error();
        }
    }

    fn cycle_choice(&mut self, forward: bool) {
        if self.is_submitting() {
            return;
        }
        if let Some(choice) = self.focused_choice() {
            choice.cycle(forward);
            self.clear_error();
        }
    }

    /// Moves to `Failed` and returns `None`, for use in `begin_submit` validation.
    fn reject<T>(&mut self, message: &str) -> Option<T>
    where
        Self: Sized,
    {
        *self.phase_mut() = SubmitPhase::Failed(message.to_string());
        None
    }
}

/// The checks an `type="email" required` input performs.
pub fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !value.contains(' '),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: [&str; 3] = ["red", "green", "blue"];

    #[test]
    fn test_choice_cycles_both_ways() {
        let mut choice = Choice::new(&COLORS);
        assert_eq!(choice.value(), None);
        choice.cycle(true);
        assert_eq!(choice.value(), Some("red"));
        choice.cycle(false);
        assert_eq!(choice.value(), Some("blue"));
        choice.cycle(true);
        assert_eq!(choice.value(), Some("red"));
    }

    #[test]
    fn test_choice_select_is_case_insensitive() {
        let mut choice = Choice::preselected(&COLORS);
        assert_eq!(choice.value(), Some("red"));
        assert!(choice.select("BLUE"));
        assert_eq!(choice.value(), Some("blue"));
        assert!(!choice.select("purple"));
        assert_eq!(choice.value(), Some("blue"));
    }

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("asha@example.com"));
        assert!(!looks_like_email("asha"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("asha@"));
        assert!(!looks_like_email("a sha@example.com"));
    }
}
