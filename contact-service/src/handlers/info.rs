use axum::{extract::State, response::Html};
use chrono::{DateTime, Local, TimeZone};
use service_core::error::AppError;
use std::fmt::Display;

use crate::startup::AppState;

/// Phonebook summary: how many contacts are stored and the server's current time.
pub async fn info(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let count = state.store.count().await?;
    Ok(Html(render_info(count, &Local::now())))
}

fn render_info<Tz>(count: u64, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "<div><p>Phonebook has info for {} people</p><p>{}</p></div>",
        count,
        now.format("%a %b %d %Y %H:%M:%S GMT%z")
    )
}
