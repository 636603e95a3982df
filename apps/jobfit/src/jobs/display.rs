//! Formatting for job cards.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::JobListing;

const PREVIEW_CHARS: usize = 150;
const MAX_SKILLS: usize = 4;
const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

const MATCH_KEYWORDS: &[&str] = &[
    "react",
    "javascript",
    "typescript",
    "python",
    "frontend",
    "backend",
];

const SKILL_KEYWORDS: &[&str] = &[
    "React",
    "JavaScript",
    "TypeScript",
    "Python",
    "Node.js",
    "MongoDB",
    "SQL",
    "AWS",
    "Docker",
];

/// Up to two uppercase initials from the words of a company name.
pub fn company_initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Case-insensitive substring match over title, company and location.
pub fn filter_listings<'a>(listings: &'a [JobListing], text: &str) -> Vec<&'a JobListing> {
    let needle = text.to_lowercase();
    listings
        .iter()
        .filter(|job| {
            job.title.to_lowercase().contains(&needle)
                || job.company.display_name.to_lowercase().contains(&needle)
                || job.location.display_name.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn format_salary(min: Option<f64>, max: Option<f64>) -> String {
    let min = min.filter(|v| *v > 0.0);
    let max = max.filter(|v| *v > 0.0);
    match (min, max) {
        (Some(min), Some(max)) => format!("£{}k - £{}k", thousands(min), thousands(max)),
        (Some(min), None) => format!("£{}k+", thousands(min)),
        _ => "Salary not specified".to_string(),
    }
}

fn thousands(amount: f64) -> i64 {
    (amount / 1000.0).round() as i64
}

/// Relative age of a posting, counted in whole days rounded up.
pub fn format_posted(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - created).num_milliseconds().abs();
    let days = (elapsed + MS_PER_DAY - 1) / MS_PER_DAY;

    match days {
        1 => "1 day ago".to_string(),
        d if d < 7 => format!("{d} days ago"),
        d if d < 30 => format!("{} weeks ago", (d + 6) / 7),
        d => format!("{} months ago", (d + 29) / 30),
    }
}

/// Keyword overlap score, 60 to 95.
pub fn match_score(job: &JobListing) -> u8 {
    let text = format!("{} {}", job.title, job.description).to_lowercase();
    let matched = MATCH_KEYWORDS
        .iter()
        .filter(|keyword| text.contains(*keyword))
        .count();
    (60 + 8 * matched).min(95) as u8
}

pub fn extract_skills(description: &str) -> Vec<&'static str> {
    let text = description.to_lowercase();
    SKILL_KEYWORDS
        .iter()
        .copied()
        .filter(|skill| text.contains(&skill.to_lowercase()))
        .take(MAX_SKILLS)
        .collect()
}

pub fn description_preview(description: &str) -> String {
    let head: String = description.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// `full_time` -> `full time`.
pub fn contract_time_label(contract_time: &str) -> String {
    contract_time.replacen('_', " ", 1)
}

/// Bookmarked listing ids for the current view.
#[derive(Debug, Clone, Default)]
pub struct SavedJobs {
    ids: HashSet<String>,
}

impl SavedJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves or unsaves `id`. Returns whether it is saved afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
