use scraper::{Html, Node};

/// Renders backend-supplied HTML as plain text. Markup is dropped, entities
/// are decoded, `<script>`/`<style>` bodies are discarded and whitespace is
/// collapsed to single spaces.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut pieces: Vec<&str> = Vec::new();

    for node in fragment.tree.root().descendants() {
        let Node::Text(text) = node.value() else { continue };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| matches!(el.name(), "script" | "style" | "template"))
        });
        if !hidden {
            pieces.push(text);
        }
    }

    pieces
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Position of a fraud score on a 0-100 bar. Out-of-range or non-finite
/// values from the backend are pinned to the nearest end.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

/// Number of filled cells when the score bar is `width` cells wide.
pub fn score_bar_fill(score: f64, width: usize) -> usize {
    let filled = (clamp_score(score) / 100.0 * width as f64).round() as usize;
    filled.min(width)
}

/// Formats a score the way the backend sent it: integers without a fraction.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 && score.is_finite() {
        format!("{}", score as i64)
    } else {
        format!("{:.1}", score)
    }
}

/// `no_company_website` -> `No Company Website`.
pub fn title_case_key(key: &str) -> String {
    key.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
