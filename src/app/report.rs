use crate::domain::model::{QueryOutcome, Recommendation, UserId};
use crate::utils::error::{RecError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    outcome: &'a QueryOutcome,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    rank: usize,
    isbn: &'a str,
    title: &'a str,
    author: &'a str,
    year: Option<u16>,
    score: f64,
    image_url: &'a str,
}

pub fn render(outcome: &QueryOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(outcome)),
        OutputFormat::Json => {
            let report = JsonReport {
                generated_at: Utc::now(),
                outcome,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
        OutputFormat::Csv => render_csv(outcome.recommendations()),
    }
}

fn render_table(outcome: &QueryOutcome) -> String {
    let mut out = String::new();
    match outcome {
        QueryOutcome::ForUser { user_id, .. } => {
            let _ = writeln!(out, "📖 Recommended Books for user {}", user_id);
        }
        QueryOutcome::Similar(similar) => {
            let _ = writeln!(out, "Showing results for: {}", similar.reference.item.title);
            let _ = writeln!(out, "📚 Similar Books");
        }
    }

    let recommendations = outcome.recommendations();
    if recommendations.is_empty() {
        let _ = writeln!(out, "(no candidates)");
    }
    for (rank, rec) in recommendations.iter().enumerate() {
        let year = rec
            .item
            .year
            .map(|year| year.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let _ = writeln!(
            out,
            "{:>2}. {} | ✍️ {} | 🗓️ {} | ⭐ {:.2}",
            rank + 1,
            rec.item.title,
            rec.item.author,
            year,
            rec.score
        );
    }
    out
}

fn render_csv(recommendations: &[Recommendation]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (rank, rec) in recommendations.iter().enumerate() {
        writer.serialize(CsvRow {
            rank: rank + 1,
            isbn: &rec.item.id,
            title: &rec.item.title,
            author: &rec.item.author,
            year: rec.item.year,
            score: rec.score,
            image_url: rec.item.image_or_placeholder(),
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| RecError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn render_users(users: &[UserId], limit: usize, format: OutputFormat) -> Result<String> {
    let shown = &users[..users.len().min(limit)];
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(shown)?),
        OutputFormat::Table | OutputFormat::Csv => {
            let mut out = String::new();
            if format == OutputFormat::Csv {
                out.push_str("user_id\n");
            }
            for user in shown {
                out.push_str(user);
                out.push('\n');
            }
            if format == OutputFormat::Table && users.len() > shown.len() {
                let _ = writeln!(out, "... and {} more", users.len() - shown.len());
            }
            Ok(out)
        }
    }
}
