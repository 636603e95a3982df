use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobfit::config::Config;
use jobfit::jobs::display::{company_initials, format_posted, format_salary};
use jobfit::jobs::SearchStatus;
use jobfit::session::SessionStatus;
use jobfit::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobFit client v{}", env!("CARGO_PKG_VERSION"));

    let mut state = AppState::from_config(config)?;

    match state.session.initialize() {
        SessionStatus::Authenticated => {
            if let Some(user) = state.session.user() {
                info!("Signed in as {} <{}>", user.name, user.email);
            }
        }
        _ => info!("No active session"),
    }

    match state.profile.read_profile().await {
        Ok(profile) if !profile.role.is_empty() => {
            info!("Target role: {}", profile.role);
        }
        Ok(_) => info!("No cached profile"),
        Err(e) => warn!("Could not read cached profile: {e}"),
    }

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        return Ok(());
    }

    let mut updates = state.jobs.subscribe();
    state.jobs.set_query(&query);
    loop {
        updates.changed().await?;
        match state.jobs.status() {
            SearchStatus::Ready => break,
            SearchStatus::Failed(message) => {
                warn!("{message}");
                break;
            }
            _ => continue,
        }
    }

    let now = Utc::now();
    for job in state.jobs.visible() {
        println!(
            "[{}] {} | {} | {} | {} | {}",
            company_initials(&job.company.display_name),
            job.title,
            job.location.display_name,
            format_salary(job.salary_min, job.salary_max),
            format_posted(job.created, now),
            job.redirect_url,
        );
    }
    if state.jobs.has_more() {
        println!(
            "... {} more",
            state.jobs.results().len() - state.jobs.visible_count()
        );
    }

    state.jobs.shutdown();
    Ok(())
}
