mod analysis;
mod api;
mod app;
mod auth;
mod config;
mod form;
mod logging;
mod models;
mod profile;
mod recommend;
mod session;
mod text;
mod tui;

#[cfg(test)]
mod testing;

use analysis::{flag_label, AnalysisOutcome, LOGIN_REQUIRED};
use anyhow::{anyhow, bail, Context, Result};
use api::{ApiClient, ANALYZE_FAILED, RECOMMEND_FAILED};
use app::App;
use auth::{LoginView, SignUpView, LOGIN_FAILED, REGISTER_FAILED, REGISTER_SUCCEEDED};
use chrono::Utc;
use clap::{Parser, Subcommand};
use config::{Config, Settings};
use form::FormView;
use models::{AnalysisResult, HistoryEntry, ScamReport, ANALYSIS_HISTORY, DOWNLOAD_HISTORY};
use profile::{EditProfileForm, ProfileTab, PROFILE_SAVED, PROFILE_SAVE_FAILED};
use serde_json::Value;
use session::SessionStore;
use std::time::Duration;
use text::{format_score, html_to_text, truncate};

const WRAP_WIDTH: usize = 80;
const LOGOUT_GRACE: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "fraudfinder")]
#[command(about = "Spot fake job postings before you apply")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the full-screen interface (default)
    Tui,

    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "FRAUDFINDER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        /// At least 6 characters
        #[arg(short, long, env = "FRAUDFINDER_PASSWORD", hide_env_values = true)]
        password: String,

        /// Student, "Recent Graduate", "Working Professional" or "Job Seeking Professional"
        #[arg(short, long)]
        qualification: String,

        /// Technology, Finance, Healthcare, Education or Other
        #[arg(short, long)]
        interest: String,
    },

    /// Forget the stored session and notify the backend
    Logout,

    /// Show who is logged in
    Whoami,

    /// Check a job posting for signs of fraud
    Analyze {
        /// Job posting URL or full text
        content: String,

        /// Send to {origin}/api/analyze instead of {api-url}/analyze
        #[arg(long)]
        direct: bool,
    },

    /// Get job recommendations
    Recommend {
        /// Job title to base recommendations on
        #[arg(short, long)]
        title: Option<String>,

        /// Print each job's description and link
        #[arg(short, long)]
        details: bool,
    },

    /// Show profile history
    Profile {
        /// history or downloads
        #[arg(default_value = "history")]
        tab: String,
    },

    /// Update email, profession and interest
    EditProfile {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        profession: String,

        #[arg(short, long)]
        interest: String,
    },

    /// Report a scam job posting
    Report {
        #[arg(short, long)]
        url: String,

        #[arg(short, long)]
        company: String,

        #[arg(short, long)]
        reason: String,
    },

    /// Show backend statistics
    Stats,

    /// Show recent scam alerts
    Alerts,
}

/// Turns a rejected form submission into an error carrying the form's message.
fn submitted<F: FormView, T>(form: &F, request: Option<T>) -> Result<T> {
    request.ok_or_else(|| anyhow!("{}", form.error().unwrap_or("Invalid input")))
}

fn print_wrapped(text: &str, indent: &str) {
    let options = textwrap::Options::new(WRAP_WIDTH)
        .initial_indent(indent)
        .subsequent_indent(indent);
    for line in textwrap::wrap(text, options) {
        println!("{}", line);
    }
}

fn print_history(entries: &[HistoryEntry]) {
    println!("{:<4} {:<12} {:<26} {}", "#", "DATE", "TITLE", "RESULT");
    println!("{}", "-".repeat(84));
    for entry in entries {
        println!(
            "{:<4} {:<12} {:<26} {}",
            entry.id,
            entry.date,
            truncate(entry.title, 24),
            entry.result
        );
    }
}

fn print_scorecard(result: &AnalysisResult) {
    let score = result
        .fraud_score
        .map(format_score)
        .unwrap_or_else(|| "-".to_string());
    println!("Risk Score: {} ({})", score, result.risk_level.as_deref().unwrap_or("unknown"));
    if let Some(verdict) = &result.verdict {
        println!("Verdict: {}", verdict);
    }
    println!("Is Scam: {}", if result.is_scam { "Yes" } else { "No" });

    let flags = result.active_flags();
    if !flags.is_empty() {
        println!("\nRed Flags:");
        for key in flags {
            let (label, icon) = flag_label(key);
            println!("  {:<6} {}", icon, label);
        }
    }

    if let Some(text) = result
        .analysis
        .as_ref()
        .and_then(|a| a.llm_analysis.as_deref())
        .filter(|t| !t.trim().is_empty())
    {
        println!("\nAnalysis:");
        print_wrapped(text, "  ");
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to format response")?);
    Ok(())
}

fn require_login(store: &SessionStore, config: &Config) -> Result<String> {
    let user = store
        .current_user(config.session_max_age, Utc::now())
        .context("Failed to read session")?;
    match user {
        Some(user) => Ok(user.username),
        None => bail!(LOGIN_REQUIRED),
    }
}

async fn run_command(
    command: Commands,
    api: ApiClient,
    store: SessionStore,
    config: &Config,
) -> Result<()> {
    match command {
        Commands::Tui => bail!("The interface runs on the main thread, not as a one-shot command"),

        Commands::Login { email, password } => {
            let mut form = LoginView::default();
            form.email = email;
            form.password = password;
            let request = form.begin_submit();
            let credentials = submitted(&form, request)?;

            let response = api
                .login(&credentials)
                .await
                .map_err(|e| anyhow!(e.user_message(LOGIN_FAILED)))?;
            let (user, username) =
                app::login_identity(response).ok_or_else(|| anyhow!(LOGIN_FAILED))?;
            store
                .save_login(&user, Utc::now())
                .with_context(|| format!("Failed to save session to {}", store.path().display()))?;
            println!("Login successful! Welcome back, {}", username);
        }

        Commands::Register {
            username,
            email,
            password,
            qualification,
            interest,
        } => {
            let mut form = SignUpView::default();
            form.username = username;
            form.email = email;
            form.password = password;
            if !form.qualification.select(&qualification) {
                bail!(
                    "Unknown profession '{}'. Choose one of: {}",
                    qualification,
                    form.qualification.options().join(", ")
                );
            }
            if !form.interest.select(&interest) {
                bail!(
                    "Unknown interest '{}'. Choose one of: {}",
                    interest,
                    form.interest.options().join(", ")
                );
            }
            let request = form.begin_submit();
            let registration = submitted(&form, request)?;

            api.register(&registration)
                .await
                .map_err(|e| anyhow!(e.user_message(REGISTER_FAILED)))?;
            println!("{}", REGISTER_SUCCEEDED);
        }

        Commands::Logout => {
            let acknowledged = app::logout(&api, &store)
                .await
                .with_context(|| format!("Failed to clear {}", store.path().display()))?;
            if acknowledged {
                println!("You have been logged out.");
            } else {
                println!("You have been logged out (the server could not be notified).");
            }
        }

        Commands::Whoami => {
            let user = store
                .current_user(config.session_max_age, Utc::now())
                .context("Failed to read session")?;
            match user {
                Some(user) => println!("{}", profile::greeting(Some(&user.username))),
                None => println!("Not logged in."),
            }
        }

        Commands::Analyze { content, direct } => {
            require_login(&store, config)?;
            let request = analysis::build_request(&content, models::DEFAULT_ANALYSIS_TYPE)
                .ok_or_else(|| anyhow!(analysis::EMPTY_INPUT))?;

            let payload = if direct {
                api.analyze_direct(&request).await
            } else {
                api.analyze_job(&request).await
            }
            .map_err(|e| anyhow!(e.user_message(ANALYZE_FAILED)))?;

            match analysis::classify_payload(&payload) {
                Some(AnalysisOutcome::Scorecard(result)) => print_scorecard(&result),
                Some(AnalysisOutcome::Raw(text)) => println!("{}", text),
                Some(AnalysisOutcome::Error(message)) => bail!("Failed to analyze - {}", message),
                None => println!("No result returned."),
            }
        }

        Commands::Recommend { title, details } => {
            let request = recommend::build_request(title.as_deref().unwrap_or_default());
            let result = api
                .recommend_direct(&request)
                .await
                .map_err(|e| {
                    anyhow!("{} {}", e.user_message(RECOMMEND_FAILED), recommend::RETRY_HINT)
                })?;

            let count =
                |n: Option<u64>| n.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
            println!("Total Recommendations: {}", count(result.total_recommendations));
            println!("Safe Jobs: {}", count(result.safe_jobs_count));
            println!("Risky Jobs: {}", count(result.risky_jobs_count));

            if result.recommendations.is_empty() {
                println!("\nNo recommendations found.");
                return Ok(());
            }

            println!();
            println!("{:<4} {:<32} {:<22} {:>8}", "#", "TITLE", "COMPANY", "SCORE");
            println!("{}", "-".repeat(69));
            for (i, job) in result.recommendations.iter().enumerate() {
                println!(
                    "{:<4} {:<32} {:<22} {:>8}",
                    i + 1,
                    truncate(&job.title, 30),
                    truncate(&job.company, 20),
                    job.fraud_score.map(format_score).unwrap_or_else(|| "-".to_string())
                );
            }

            if details {
                for (i, job) in result.recommendations.iter().enumerate() {
                    println!("\n#{} {}", i + 1, job.title);
                    let description = html_to_text(&job.description);
                    if !description.is_empty() {
                        print_wrapped(&description, "  ");
                    }
                    if !job.link.is_empty() {
                        println!("  {}", job.link);
                    }
                }
            }
        }

        Commands::Profile { tab } => match ProfileTab::parse(&tab) {
            Some(ProfileTab::History) => print_history(&ANALYSIS_HISTORY),
            Some(ProfileTab::Downloads) => print_history(&DOWNLOAD_HISTORY),
            _ => bail!("Unknown profile tab '{}'. Use history or downloads.", tab),
        },

        Commands::EditProfile {
            email,
            profession,
            interest,
        } => {
            let mut form = EditProfileForm::default();
            form.email = email;
            if !form.profession.select(&profession) {
                bail!(
                    "Unknown profession '{}'. Choose one of: {}",
                    profession,
                    form.profession.options().join(", ")
                );
            }
            if !form.interest.select(&interest) {
                bail!(
                    "Unknown interest '{}'. Choose one of: {}",
                    interest,
                    form.interest.options().join(", ")
                );
            }
            let request = form.begin_submit();
            let update = submitted(&form, request)?;

            api.edit_profile(&update)
                .await
                .map_err(|e| anyhow!(e.user_message(PROFILE_SAVE_FAILED)))?;
            println!("{}", PROFILE_SAVED);
        }

        Commands::Report { url, company, reason } => {
            let report = ScamReport {
                job_url: url,
                company_name: company,
                reason,
            };
            let response = api.report_scam(&report).await?;
            match response.get("message").and_then(Value::as_str) {
                Some(message) => println!("{}", message),
                None => println!("Report submitted. Thank you."),
            }
        }

        Commands::Stats => print_json(&api.stats().await?)?,

        Commands::Alerts => print_json(&api.recent_alerts().await?)?,
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_settings(&cli.settings)?;
    let command = cli.command.unwrap_or(Commands::Tui);

    if matches!(command, Commands::Tui) {
        logging::init_file(&config.log_filter, &config.log_path())?;
    } else {
        logging::init_stderr(&config.log_filter)?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let api = config.api_client()?;
    let store = config.session_store();

    match command {
        Commands::Tui => {
            let (mut app, mut events) =
                App::new(api, store, runtime.handle().clone(), config.session_max_age);
            let result = tui::run_tui(&mut app, &mut events);
            if let Some(pending) = app.take_pending_logout() {
                if runtime.block_on(tokio::time::timeout(LOGOUT_GRACE, pending)).is_err() {
                    tracing::warn!("logout notification still pending at exit");
                }
            }
            result?;
        }
        command => runtime.block_on(run_command(command, api, store, &config))?,
    }

    Ok(())
}
