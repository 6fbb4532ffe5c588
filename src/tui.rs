use anyhow::Result;
use chrono::Datelike;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::analysis::{flag_label, AnalysisOutcome, AnalysisPhase, LOGIN_REQUIRED};
use crate::app::{App, AppEvent, Screen, Task};
use crate::auth::{
    LOGIN_EMAIL, LOGIN_PASSWORD, SIGNUP_EMAIL, SIGNUP_INTEREST, SIGNUP_PASSWORD,
    SIGNUP_QUALIFICATION, SIGNUP_USERNAME,
};
use crate::form::{Choice, FormView};
use crate::models::{AnalysisResult, HistoryEntry, ANALYSIS_HISTORY, DOWNLOAD_HISTORY};
use crate::profile::{greeting, ProfileTab, EDIT_EMAIL, EDIT_INTEREST, EDIT_PROFESSION};
use crate::recommend::{RecommendationPhase, RETRY_HINT};
use crate::text::{clamp_score, format_score, html_to_text, score_bar_fill, truncate};

const TICK: Duration = Duration::from_millis(100);
const SCORE_BAR_WIDTH: usize = 30;
const ACCENT: Color = Color::Rgb(42, 208, 196);
const BOLD_ACCENT: Style = Style::new().fg(ACCENT).add_modifier(Modifier::BOLD);
const BOLD_ERROR: Style = Style::new().fg(Color::Red).add_modifier(Modifier::BOLD);
const LINK: Style = Style::new().fg(ACCENT).add_modifier(Modifier::UNDERLINED);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum MainFocus {
    #[default]
    Input,
    Recommendations,
}

#[derive(Debug, Default)]
struct UiState {
    main_focus: MainFocus,
    result_scroll: u16,
    detail_scroll: u16,
}

pub fn run_tui(app: &mut App, events: &mut UnboundedReceiver<AppEvent>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, app, events);
    app.cancel_all();

    // Restore terminal
    stdout().execute(DisableBracketedPaste)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    events: &mut UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let mut ui = UiState::default();

    loop {
        while let Ok(event) = events.try_recv() {
            app.handle(event);
        }

        terminal.draw(|frame| draw(frame, app, &ui))?;

        if !event::poll(TICK)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if handle_key(app, &mut ui, key) {
                    break;
                }
            }
            Event::Paste(text) => handle_paste(app, &ui, &text),
            _ => {}
        }
    }
    Ok(())
}

// --- Input ---

fn handle_key(app: &mut App, ui: &mut UiState, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return true;
    }
    if app.notice().is_some() {
        app.dismiss_notice();
    }

    match app.screen() {
        Screen::Main => return handle_main_key(app, ui, key, ctrl),
        Screen::Login => match key.code {
            KeyCode::Esc => app.navigate(Screen::Main),
            KeyCode::Enter => app.submit_login(),
            KeyCode::Char('u') if ctrl => app.navigate(Screen::SignUp),
            _ => handle_form_key(&mut app.login, key),
        },
        Screen::SignUp => match key.code {
            KeyCode::Esc => app.navigate(Screen::Main),
            KeyCode::Enter => app.submit_signup(),
            KeyCode::Char('l') if ctrl => {
                if !app.signup.is_submitting() {
                    app.navigate(Screen::Login);
                }
            }
            _ => handle_form_key(&mut app.signup, key),
        },
        Screen::Profile => handle_profile_key(app, key),
    }
    false
}

fn handle_main_key(app: &mut App, ui: &mut UiState, key: KeyEvent, ctrl: bool) -> bool {
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Tab | KeyCode::BackTab => {
            ui.main_focus = match ui.main_focus {
                MainFocus::Input => MainFocus::Recommendations,
                MainFocus::Recommendations => MainFocus::Input,
            };
        }
        KeyCode::Char('l') if ctrl => app.navigate(Screen::Login),
        KeyCode::Char('u') if ctrl => app.navigate(Screen::SignUp),
        KeyCode::Char('p') if ctrl => app.navigate(Screen::Profile),
        KeyCode::Char('r') if ctrl => app.request_recommendations(),
        KeyCode::PageDown => ui.result_scroll = ui.result_scroll.saturating_add(3),
        KeyCode::PageUp => ui.result_scroll = ui.result_scroll.saturating_sub(3),
        _ => match ui.main_focus {
            MainFocus::Input => match key.code {
                KeyCode::Enter => {
                    ui.result_scroll = 0;
                    app.submit_analysis();
                }
                KeyCode::Backspace if app.is_authenticated() => app.analysis.backspace(),
                KeyCode::Char(c) if app.is_authenticated() && !ctrl => app.analysis.type_char(c),
                _ => {}
            },
            MainFocus::Recommendations => match key.code {
                KeyCode::Down | KeyCode::Char('j') => {
                    app.recommendations.select_next();
                    ui.detail_scroll = 0;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    app.recommendations.select_prev();
                    ui.detail_scroll = 0;
                }
                KeyCode::Char('J') => ui.detail_scroll = ui.detail_scroll.saturating_add(3),
                KeyCode::Char('K') => ui.detail_scroll = ui.detail_scroll.saturating_sub(3),
                KeyCode::Char('m') => app.recommendations.load_more(),
                KeyCode::Char('l') => app.recommendations.show_less(),
                KeyCode::Enter | KeyCode::Char('g') => app.request_recommendations(),
                _ => {}
            },
        },
    }
    false
}

fn handle_form_key<F: FormView>(form: &mut F, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Left => form.cycle_choice(false),
        KeyCode::Right => form.cycle_choice(true),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => form.type_char(c),
        _ => {}
    }
}

fn handle_profile_key(app: &mut App, key: KeyEvent) {
    let tab = match key.code {
        KeyCode::F(1) => Some(ProfileTab::History),
        KeyCode::F(2) => Some(ProfileTab::Downloads),
        KeyCode::F(3) => Some(ProfileTab::Edit),
        KeyCode::F(4) => Some(ProfileTab::Logout),
        _ => None,
    };
    if let Some(tab) = tab {
        app.select_profile_tab(tab);
        return;
    }

    if key.code == KeyCode::Esc {
        app.navigate(Screen::Main);
        return;
    }

    if app.profile.tab() == ProfileTab::Edit {
        match key.code {
            KeyCode::Enter => app.submit_profile_edit(),
            _ => handle_form_key(&mut app.profile.edit, key),
        }
        return;
    }

    match key.code {
        KeyCode::Char('1') => app.select_profile_tab(ProfileTab::History),
        KeyCode::Char('2') => app.select_profile_tab(ProfileTab::Downloads),
        KeyCode::Char('3') => app.select_profile_tab(ProfileTab::Edit),
        KeyCode::Char('4') => app.select_profile_tab(ProfileTab::Logout),
        KeyCode::Tab => app.profile.next_tab(),
        _ => {}
    }
}

fn handle_paste(app: &mut App, ui: &UiState, text: &str) {
    fn paste_into<F: FormView>(form: &mut F, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            form.type_char(c);
        }
    }

    match app.screen() {
        Screen::Main if ui.main_focus == MainFocus::Input && app.is_authenticated() => {
            for c in text.chars() {
                app.analysis.type_char(c);
            }
        }
        Screen::Login => paste_into(&mut app.login, text),
        Screen::SignUp => paste_into(&mut app.signup, text),
        Screen::Profile if app.profile.tab() == ProfileTab::Edit => {
            paste_into(&mut app.profile.edit, text)
        }
        _ => {}
    }
}

// --- Drawing ---

fn draw(frame: &mut Frame, app: &App, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    match app.screen() {
        Screen::Main => draw_main(frame, app, ui, chunks[1]),
        Screen::Login => draw_login(frame, app, chunks[1]),
        Screen::SignUp => draw_signup(frame, app, chunks[1]),
        Screen::Profile => draw_profile(frame, app, chunks[1]),
    }

    let status = match app.notice() {
        Some(notice) => Line::from(Span::styled(
            format!(" {}", notice),
            Style::default().fg(Color::Green),
        )),
        None => Line::from(Span::styled(
            format!(" (c) {} Fraud Finder. All rights reserved.", chrono::Local::now().year()),
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(status), chunks[2]);

    let help = Paragraph::new(help_text(app, ui)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}

fn help_text(app: &App, ui: &UiState) -> &'static str {
    match app.screen() {
        Screen::Main => match (ui.main_focus, app.is_authenticated()) {
            (MainFocus::Input, true) => {
                " Enter:analyze  Tab:recommendations  ^R:recommend  ^P:profile  PgUp/PgDn:scroll  Esc:quit"
            }
            (MainFocus::Input, false) => {
                " ^L:log in  ^U:sign up  Tab:recommendations  ^R:recommend  Esc:quit"
            }
            (MainFocus::Recommendations, _) => {
                " j/k:select  J/K:scroll  m:load more  l:show less  g:get recommendation  Tab:input  Esc:quit"
            }
        },
        Screen::Login => " Tab:next field  Enter:log in  ^U:sign up  Esc:back",
        Screen::SignUp => " Tab:next field  </>:choose  Enter:continue  ^L:log in  Esc:back",
        Screen::Profile => " F1:history  F2:downloads  F3:edit  F4:logout  Enter:save  Esc:back",
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let account = match app.user_name() {
        Some(name) => Span::styled(format!("Welcome, {} (^P) ", name), BOLD_ACCENT),
        None => Span::styled("[^U Sign Up] [^L Log In] ", Style::default().fg(ACCENT)),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" Fraud Finder ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("| Spot fake job postings before you apply   "),
        account,
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn focused_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default()
    };
    Block::default().borders(Borders::ALL).border_style(style).title(title)
}

fn draw_main(frame: &mut Frame, app: &App, ui: &UiState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(columns[0]);

    let intro = Paragraph::new(vec![
        Line::from(Span::styled(
            "Is The Job Offer Legit?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(
            "Paste a job posting url or its description below. Our AI will analyze it for signs of fraud.",
        ),
    ])
    .wrap(Wrap { trim: true });
    frame.render_widget(intro, left[0]);

    let input_focused = ui.main_focus == MainFocus::Input;
    let input = if app.analysis.input.is_empty() {
        let placeholder = if app.is_authenticated() {
            "Paste the job posting URL or the full text here"
        } else {
            "Log in to analyze job postings"
        };
        Text::from(Span::styled(placeholder, Style::default().fg(Color::DarkGray)))
    } else {
        let cursor = if input_focused { "_" } else { "" };
        Text::raw(format!("{}{}", app.analysis.input, cursor))
    };
    let input_widget = Paragraph::new(input)
        .block(focused_block(" Job posting ", input_focused))
        .wrap(Wrap { trim: false });
    frame.render_widget(input_widget, left[1]);

    let button = if app.analysis.is_analyzing() {
        Span::styled("[ Analyzing... ]", Style::default().fg(Color::DarkGray))
    } else if app.is_authenticated() {
        Span::styled("[ Analyze Job Posting ]", BOLD_ACCENT)
    } else {
        Span::styled("[ Analyze Job Posting ]", Style::default().fg(Color::DarkGray))
    };
    let controls = Paragraph::new(vec![Line::from(vec![
        Span::raw(format!(
            "Choose analysis type - (*) {}   ",
            capitalize(&app.analysis.analysis_type)
        )),
        button,
    ])]);
    frame.render_widget(controls, left[2]);

    let result = Paragraph::new(build_analysis_text(app))
        .block(Block::default().borders(Borders::ALL).title(" Result "))
        .wrap(Wrap { trim: false })
        .scroll((ui.result_scroll, 0));
    frame.render_widget(result, left[3]);

    let recommendations = Paragraph::new(build_recommendation_text(app))
        .block(focused_block(" Job Recommendations ", ui.main_focus == MainFocus::Recommendations))
        .wrap(Wrap { trim: false })
        .scroll((ui.detail_scroll, 0));
    frame.render_widget(recommendations, columns[1]);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn build_analysis_text(app: &App) -> Text<'static> {
    if !app.is_authenticated() {
        return Text::from(Span::styled(LOGIN_REQUIRED, Style::default().fg(Color::DarkGray)));
    }

    match app.analysis.phase() {
        AnalysisPhase::Idle => Text::from(Span::styled(
            "Results will appear here.",
            Style::default().fg(Color::DarkGray),
        )),
        AnalysisPhase::Analyzing => Text::from("Analyzing..."),
        AnalysisPhase::Done(AnalysisOutcome::Error(message)) => Text::from(Line::from(vec![
            Span::styled("Failed to analyze - ", BOLD_ERROR),
            Span::styled(message.clone(), Style::default().fg(Color::Red)),
        ])),
        AnalysisPhase::Done(AnalysisOutcome::Raw(raw)) => Text::raw(raw.clone()),
        AnalysisPhase::Done(AnalysisOutcome::Scorecard(result)) => build_scorecard(result),
    }
}

fn build_scorecard(result: &AnalysisResult) -> Text<'static> {
    let mut lines: Vec<Line> = Vec::new();
    let risk_style = result
        .risk_color
        .as_deref()
        .and_then(|c| c.parse::<Color>().ok())
        .map(|c| Style::default().fg(c))
        .unwrap_or_default()
        .add_modifier(Modifier::BOLD);

    let score = result.fraud_score.unwrap_or(0.0);
    lines.push(Line::from(Span::styled(
        format!(
            "Risk Score - {} ({})",
            format_score(score),
            result.risk_level.as_deref().unwrap_or("unknown")
        ),
        risk_style,
    )));

    let filled = score_bar_fill(score, SCORE_BAR_WIDTH);
    lines.push(Line::from(vec![
        Span::raw("["),
        Span::styled("#".repeat(filled), risk_style),
        Span::raw(".".repeat(SCORE_BAR_WIDTH - filled)),
        Span::raw(format!("] {}", format_score(clamp_score(score)))),
    ]));
    lines.push(Line::from(""));

    lines.push(Line::from(vec![
        Span::styled("Verdict - ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(result.verdict.clone().unwrap_or_default()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Is Scam - ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(if result.is_scam { "Yes" } else { "No" }),
    ]));

    if let Some(detail) = &result.analysis {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Red Flags -",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        let flags = result.active_flags();
        if flags.is_empty() {
            lines.push(Line::from(Span::styled("  none", Style::default().fg(Color::DarkGray))));
        }
        for key in flags {
            let (label, icon) = flag_label(key);
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<6}", icon), Style::default().fg(Color::Yellow)),
                Span::raw(label),
            ]));
        }

        if let Some(text) = detail.llm_analysis.as_deref().filter(|t| !t.trim().is_empty()) {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Analysis -",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for line in text.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
    }

    Text::from(lines)
}

fn build_recommendation_text(app: &App) -> Text<'static> {
    let view = &app.recommendations;
    let mut lines: Vec<Line> = Vec::new();

    let button = if view.is_loading() {
        Span::styled("[ Loading... ]", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled("[ Get Recommendation ]", BOLD_ACCENT)
    };
    lines.push(Line::from(button));
    lines.push(Line::from(""));

    match view.phase() {
        RecommendationPhase::Idle => {}
        RecommendationPhase::Loading => {
            lines.push(Line::from("Fetching job recommendations..."));
            lines.push(Line::from(Span::styled(
                "Please wait while we analyze safe & risky jobs",
                Style::default().fg(Color::DarkGray),
            )));
        }
        RecommendationPhase::Failed(message) => {
            lines.push(Line::from(vec![
                Span::styled("Error: ", BOLD_ERROR),
                Span::styled(message.clone(), Style::default().fg(Color::Red)),
            ]));
            lines.push(Line::from(Span::styled(RETRY_HINT, Style::default().fg(Color::DarkGray))));
        }
        RecommendationPhase::Loaded(result) => {
            let count =
                |n: Option<u64>| n.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
            lines.push(Line::from(Span::styled(
                "Recommended Jobs Summary",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(format!(
                "Total Recommendations: {}",
                count(result.total_recommendations)
            )));
            lines.push(Line::from(format!("Safe Jobs: {}", count(result.safe_jobs_count))));
            lines.push(Line::from(format!("Risky Jobs: {}", count(result.risky_jobs_count))));
            lines.push(Line::from(""));

            for (i, job) in view.visible_jobs().iter().enumerate() {
                let selected = i == view.selected();
                let marker = if selected { "> " } else { "  " };
                let style = if selected {
                    Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let score = job.fraud_score.map(format_score).unwrap_or_else(|| "-".to_string());
                lines.push(Line::from(Span::styled(
                    format!(
                        "{}{} | {} | score {}",
                        marker,
                        truncate(&job.title, 32),
                        truncate(&job.company, 20),
                        score
                    ),
                    style,
                )));
            }

            let mut actions = Vec::new();
            if view.can_load_more() {
                actions.push(Span::styled("[m] Load More  ", Style::default().fg(ACCENT)));
            }
            if view.can_show_less() {
                actions.push(Span::styled("[l] Show Less", Style::default().fg(ACCENT)));
            }
            if !actions.is_empty() {
                lines.push(Line::from(actions));
            }

            if let Some(job) = view.selected_job() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    job.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(format!("Company: {}", job.company)));
                if let Some(score) = job.fraud_score {
                    lines.push(Line::from(format!("Fraud Score: {}", format_score(score))));
                }
                let description = html_to_text(&job.description);
                if !description.is_empty() {
                    lines.push(Line::from(""));
                    lines.push(Line::from(description));
                }
                if !job.link.is_empty() {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(
                        format!("View Job -> {}", job.link),
                        Style::default().fg(ACCENT),
                    )));
                }
            }
        }
    }

    Text::from(lines)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn text_field(
    label: &str,
    value: &str,
    focused: bool,
    masked: bool,
    disabled: bool,
) -> Line<'static> {
    let shown = if masked { "*".repeat(value.chars().count()) } else { value.to_string() };
    let cursor = if focused && !disabled { "_" } else { "" };
    let style = if disabled {
        Style::default().fg(Color::DarkGray)
    } else if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!("{:<12}", label), style.add_modifier(Modifier::BOLD)),
        Span::styled(format!("{}{}", shown, cursor), style),
    ])
}

fn choice_field(
    label: &str,
    choice: &Choice,
    placeholder: &str,
    focused: bool,
    disabled: bool,
) -> Line<'static> {
    let style = if disabled {
        Style::default().fg(Color::DarkGray)
    } else if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default()
    };
    let value = match choice.value() {
        Some(v) => format!("< {} >", v),
        None => format!("< {} >", placeholder),
    };
    Line::from(vec![
        Span::styled(format!("{:<12}", label), style.add_modifier(Modifier::BOLD)),
        Span::styled(value, style),
    ])
}

fn error_line(message: Option<&str>) -> Line<'static> {
    match message {
        Some(message) => Line::from(Span::styled(message.to_string(), BOLD_ERROR)),
        None => Line::from(""),
    }
}

fn submit_line(idle: &'static str, busy: &'static str, submitting: bool) -> Line<'static> {
    if submitting {
        Line::from(Span::styled(format!("[ {} ]", busy), Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(Span::styled(format!("[ {} ]", idle), BOLD_ACCENT))
    }
}

fn draw_login(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.login;
    let busy = view.is_submitting();
    let lines = vec![
        error_line(view.error()),
        Line::from(""),
        text_field("Email", &view.email, view.focus() == LOGIN_EMAIL, false, busy),
        text_field("Password", &view.password, view.focus() == LOGIN_PASSWORD, true, busy),
        Line::from(""),
        Line::from(vec![
            Span::raw("Don't have an account? "),
            Span::styled("Sign up here (^U)", LINK),
        ]),
        Line::from(""),
        submit_line("LOG IN", "LOGGING IN...", busy),
    ];
    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Log In "))
        .wrap(Wrap { trim: false });
    frame.render_widget(form, centered(area, 64, 12));
}

fn draw_signup(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.signup;
    let busy = view.is_submitting();
    let focus = view.focus();
    let lines = vec![
        error_line(view.error()),
        Line::from(""),
        text_field("Username", &view.username, focus == SIGNUP_USERNAME, false, busy),
        text_field("Email", &view.email, focus == SIGNUP_EMAIL, false, busy),
        text_field("Password", &view.password, focus == SIGNUP_PASSWORD, true, busy),
        choice_field(
            "Profession",
            &view.qualification,
            "Choose your profession",
            focus == SIGNUP_QUALIFICATION,
            busy,
        ),
        choice_field(
            "Interest",
            &view.interest,
            "Choose your interest",
            focus == SIGNUP_INTEREST,
            busy,
        ),
        Line::from(""),
        Line::from(vec![
            Span::raw("Already have an account? "),
            Span::styled("Log in here (^L)", LINK),
        ]),
        Line::from(""),
        submit_line("CONTINUE", "CREATING ACCOUNT...", busy),
    ];
    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Sign Up "))
        .wrap(Wrap { trim: false });
    frame.render_widget(form, centered(area, 64, 15));
}

fn draw_profile(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)])
        .split(area);

    let mut sidebar: Vec<Line> = vec![
        Line::from(Span::styled(
            greeting(app.user_name()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (i, tab) in ProfileTab::ALL.iter().enumerate() {
        let style = if *tab == app.profile.tab() {
            Style::default().bg(ACCENT).fg(Color::Black).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        sidebar.push(Line::from(Span::styled(format!(" F{} {} ", i + 1, tab.label()), style)));
    }
    frame.render_widget(
        Paragraph::new(sidebar).block(Block::default().borders(Borders::ALL).title(" Profile ")),
        columns[0],
    );

    let tab = app.profile.tab();
    let content = match tab {
        ProfileTab::History => history_text(&ANALYSIS_HISTORY),
        ProfileTab::Downloads => history_text(&DOWNLOAD_HISTORY),
        ProfileTab::Edit => edit_profile_text(app),
        ProfileTab::Logout => Text::from("Press F4 to log out."),
    };
    frame.render_widget(
        Paragraph::new(content)
            .block(Block::default().borders(Borders::ALL).title(format!(" {} ", tab.label())))
            .wrap(Wrap { trim: false }),
        columns[1],
    );
}

fn history_text(entries: &[HistoryEntry]) -> Text<'static> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{:<4} {:<12} {:<26} {}", "#", "DATE", "TITLE", "RESULT"),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("-".repeat(70)),
    ];
    for entry in entries {
        lines.push(Line::from(format!(
            "{:<4} {:<12} {:<26} {}",
            entry.id,
            entry.date,
            truncate(entry.title, 24),
            entry.result
        )));
    }
    Text::from(lines)
}

fn edit_profile_text(app: &App) -> Text<'static> {
    let form = &app.profile.edit;
    let busy = form.is_submitting();
    let focus = form.focus();
    Text::from(vec![
        error_line(form.error()),
        Line::from(""),
        text_field("Email", &form.email, focus == EDIT_EMAIL, false, busy),
        choice_field("Profession", &form.profession, "", focus == EDIT_PROFESSION, busy),
        choice_field("Interest", &form.interest, "", focus == EDIT_INTEREST, busy),
        Line::from(""),
        submit_line("SAVE CHANGES", "SAVING...", busy || app.is_busy(Task::ProfileSave)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisDetail;
    use serde_json::{json, Map};

    fn text_of(text: &Text) -> String {
        text.lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_scorecard_lists_only_true_flags() {
        let mut flags = Map::new();
        flags.insert("no_linkedin".to_string(), json!(true));
        flags.insert("poor_grammar".to_string(), json!(false));
        let result = AnalysisResult {
            fraud_score: Some(140.0),
            risk_level: Some("High".to_string()),
            risk_color: Some("#e74c3c".to_string()),
            verdict: Some("Likely scam".to_string()),
            is_scam: true,
            analysis: Some(AnalysisDetail {
                red_flags: flags,
                llm_analysis: Some("Salary is implausible.".to_string()),
            }),
        };

        let rendered = text_of(&build_scorecard(&result));
        assert!(rendered.contains("Risk Score - 140 (High)"));
        assert!(rendered.contains(&format!("[{}] 100", "#".repeat(SCORE_BAR_WIDTH))));
        assert!(rendered.contains("No LinkedIn Presence"));
        assert!(!rendered.contains("Poor Grammar"));
        assert!(rendered.contains("Is Scam - Yes"));
        assert!(rendered.contains("Salary is implausible."));
    }

    #[test]
    fn test_negative_score_renders_empty_bar() {
        let result = AnalysisResult {
            fraud_score: Some(-12.0),
            ..Default::default()
        };
        let rendered = text_of(&build_scorecard(&result));
        assert!(rendered.contains(&format!("[{}] 0", ".".repeat(SCORE_BAR_WIDTH))));
        assert!(rendered.contains("Is Scam - No"));
    }

    #[test]
    fn test_history_text_has_all_rows() {
        let rendered = text_of(&history_text(&ANALYSIS_HISTORY));
        assert!(rendered.contains("Potential fraud detected: High salary promise"));
        assert_eq!(rendered.lines().count(), 2 + ANALYSIS_HISTORY.len());
    }

    #[test]
    fn test_centered_fits_small_areas() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered(area, 64, 12);
        assert_eq!(rect, Rect::new(0, 0, 40, 10));
        let rect = centered(Rect::new(0, 0, 100, 40), 64, 12);
        assert_eq!(rect, Rect::new(18, 14, 64, 12));
    }

    #[test]
    fn test_masked_field_hides_password() {
        let line = text_field("Password", "secret1", false, true, false);
        let rendered: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(rendered.contains("*******"));
        assert!(!rendered.contains("secret1"));
    }
}
