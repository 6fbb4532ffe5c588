use crate::models::{RecommendationRequest, RecommendationResult, RecommendedJob};

pub const INITIAL_VISIBLE: usize = 1;
pub const REVEAL_STEP: usize = 3;
pub const RETRY_HINT: &str = "Please try again or check your internet connection.";

/// The minimal job descriptor sent for recommendations, built from whatever
/// is in the analysis input.
pub fn build_request(input: &str) -> RecommendationRequest {
    RecommendationRequest {
        title: if input.is_empty() { "Sample Job".to_string() } else { input.to_string() },
        company: "Sample Company".to_string(),
        url: String::new(),
        source: "User".to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RecommendationPhase {
    #[default]
    Idle,
    Loading,
    Loaded(RecommendationResult),
    Failed(String),
}

#[derive(Debug, Default)]
pub struct RecommendationView {
    phase: RecommendationPhase,
    visible: usize,
    selected: usize,
}

impl RecommendationView {
    pub fn phase(&self) -> &RecommendationPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == RecommendationPhase::Loading
    }

    pub fn begin(&mut self, input: &str) -> Option<RecommendationRequest> {
        if self.is_loading() {
            return None;
        }
        self.phase = RecommendationPhase::Loading;
        Some(build_request(input))
    }

    pub fn finish(&mut self, result: Result<RecommendationResult, String>) {
        self.visible = INITIAL_VISIBLE;
        self.selected = 0;
        self.phase = match result {
            Ok(result) => RecommendationPhase::Loaded(result),
            Err(message) => RecommendationPhase::Failed(message),
        };
    }

    pub fn abandon(&mut self) {
        if self.is_loading() {
            self.phase = RecommendationPhase::Idle;
        }
    }

    fn jobs(&self) -> &[RecommendedJob] {
        match &self.phase {
            RecommendationPhase::Loaded(result) => &result.recommendations,
            _ => &[],
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible.max(INITIAL_VISIBLE)
    }

    pub fn visible_jobs(&self) -> &[RecommendedJob] {
        let jobs = self.jobs();
        &jobs[..self.visible_count().min(jobs.len())]
    }

    pub fn can_load_more(&self) -> bool {
        self.visible_count() < self.jobs().len()
    }

    pub fn can_show_less(&self) -> bool {
        self.visible_count() > INITIAL_VISIBLE
    }

    pub fn load_more(&mut self) {
        if self.can_load_more() {
            self.visible = (self.visible_count() + REVEAL_STEP).min(self.jobs().len());
        }
    }

    pub fn show_less(&mut self) {
        self.visible = INITIAL_VISIBLE;
        self.selected = self.selected.min(INITIAL_VISIBLE - 1);
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible_jobs().len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_job(&self) -> Option<&RecommendedJob> {
        self.visible_jobs().get(self.selected)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(count: usize) -> RecommendationResult {
        RecommendationResult {
            total_recommendations: Some(count as u64),
            safe_jobs_count: Some(count as u64),
            risky_jobs_count: Some(0),
            recommendations: (0..count)
                .map(|i| RecommendedJob {
                    title: format!("Job {i}"),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn loaded(count: usize) -> RecommendationView {
        let mut view = RecommendationView::default();
        view.begin("").unwrap();
        view.finish(Ok(result_with(count)));
        view
    }

    #[test]
    fn test_request_defaults() {
        let request = build_request("");
        assert_eq!(request.title, "Sample Job");
        assert_eq!(request.company, "Sample Company");
        assert_eq!(request.url, "");
        assert_eq!(request.source, "User");

        assert_eq!(build_request("Data Analyst").title, "Data Analyst");
    }

    #[test]
    fn test_reveal_starts_at_one() {
        let view = loaded(10);
        assert_eq!(view.visible_count(), 1);
        assert_eq!(view.visible_jobs().len(), 1);
        assert!(view.can_load_more());
        assert!(!view.can_show_less());
    }

    #[test]
    fn test_load_more_adds_three_and_caps() {
        let mut view = loaded(6);
        view.load_more();
        assert_eq!(view.visible_count(), 4);
        view.load_more();
        assert_eq!(view.visible_count(), 6);
        assert!(!view.can_load_more());
        view.load_more();
        assert_eq!(view.visible_count(), 6);
    }

    #[test]
    fn test_show_less_resets() {
        let mut view = loaded(10);
        view.load_more();
        view.load_more();
        view.select_next();
        view.select_next();
        view.show_less();
        assert_eq!(view.visible_count(), 1);
        assert_eq!(view.selected(), 0);
    }

    #[test]
    fn test_new_result_resets_reveal() {
        let mut view = loaded(10);
        view.load_more();
        view.begin("again").unwrap();
        view.finish(Ok(result_with(5)));
        assert_eq!(view.visible_count(), 1);
    }

    #[test]
    fn test_loading_guard() {
        let mut view = RecommendationView::default();
        assert!(view.begin("x").is_some());
        assert!(view.begin("x").is_none());
        view.finish(Err("Failed to load recommendation.".to_string()));
        assert_eq!(
            view.phase(),
            &RecommendationPhase::Failed("Failed to load recommendation.".to_string())
        );
        assert!(view.visible_jobs().is_empty());
    }

    #[test]
    fn test_selection_stays_within_visible() {
        let mut view = loaded(10);
        view.select_next();
        assert_eq!(view.selected(), 0);
        view.load_more();
        view.select_next();
        view.select_next();
        view.select_next();
        view.select_next();
        assert_eq!(view.selected(), 3);
        assert_eq!(view.selected_job().unwrap().title, "Job 3");
    }
}
