//! Free-text fact sheet provider
//!
//! Asks the chat model for a movie fact sheet in a fixed plain-text layout
//! and parses it line by line. This path predates the structured provider
//! and survives as the fallback when TMDB has nothing.
//!
//! Expected layout:
//!
//! ```text
//! Inception (2010)
//! Rating: 8.8/10
//! Runtime: 148 min
//! Genre: Science Fiction, Action
//! Director: Christopher Nolan
//! Cast: Leonardo DiCaprio, Joseph Gordon-Levitt, Elliot Page
//! Plot: A thief who steals corporate secrets through dream-sharing
//! is given the inverse task of planting an idea.
//! Awards: 4 Oscars
//! ```

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{sentinel, MovieRecord, CAST_LIMIT},
    services::{llm::ChatCompleter, providers::MetadataProvider},
};

const FACT_SHEET_TOKENS: u32 = 300;

const SYSTEM_PROMPT: &str =
    "You are a film database. Reply only with the requested fact sheet, no commentary.";

pub struct FreeTextProvider {
    llm: Arc<dyn ChatCompleter>,
}

impl FreeTextProvider {
    pub fn new(llm: Arc<dyn ChatCompleter>) -> Self {
        Self { llm }
    }

    fn fact_sheet_prompt(title: &str, year: Option<i32>) -> String {
        let subject = match year {
            Some(year) => format!("{} ({})", title, year),
            None => title.to_string(),
        };

        format!(
            "Provide a fact sheet for the movie {} in exactly this format:\n\
             Title (Year)\n\
             Rating: <average score>/10\n\
             Runtime: <length> min\n\
             Genre: <genres, comma separated>\n\
             Director: <name>\n\
             Cast: <up to five actors, comma separated>\n\
             Plot: <two or three sentences>\n\
             Awards: <major honors, or None>",
            subject
        )
    }
}

#[async_trait::async_trait]
impl MetadataProvider for FreeTextProvider {
    fn name(&self) -> &'static str {
        "freetext"
    }

    async fn search(&self, title: &str, year: Option<i32>) -> AppResult<Option<MovieRecord>> {
        let prompt = Self::fact_sheet_prompt(title, year);
        let sheet = self.llm.complete(SYSTEM_PROMPT, &prompt, FACT_SHEET_TOKENS).await?;
        Ok(parse_fact_sheet(&sheet))
    }
}

/// Parses a plain-text fact sheet into a record.
///
/// Recognized lines: a `Title (Year)` header, the field prefixes `Runtime:`,
/// `Genre:`, `Director:` and `Cast:` (case-insensitive), a rating line ending
/// in `/10`, and a `Plot:` section that runs until an `Awards:` line or the
/// end of the text. Unrecognized lines are dropped silently. Without a
/// parsable header there is no match at all.
pub(crate) fn parse_fact_sheet(sheet: &str) -> Option<MovieRecord> {
    let mut header: Option<(String, i32)> = None;
    let mut rating: Option<String> = None;
    let mut runtime: Option<String> = None;
    let mut genre: Option<String> = None;
    let mut director: Option<String> = None;
    let mut cast: Option<String> = None;
    let mut plot_lines: Vec<String> = Vec::new();
    let mut in_plot = false;

    for raw_line in sheet.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        // The plot consumes every following line until the Awards marker.
        if in_plot {
            if strip_prefix_ignore_case(line, "awards:").is_some() {
                in_plot = false;
            } else {
                plot_lines.push(line.to_string());
            }
            continue;
        }

        if let Some(value) = strip_prefix_ignore_case(line, "plot:") {
            if !value.is_empty() {
                plot_lines.push(value.to_string());
            }
            in_plot = true;
        } else if let Some(value) = strip_prefix_ignore_case(line, "runtime:") {
            runtime = non_empty(value);
        } else if let Some(value) = strip_prefix_ignore_case(line, "genre:") {
            genre = non_empty(value);
        } else if let Some(value) = strip_prefix_ignore_case(line, "director:") {
            director = non_empty(value);
        } else if let Some(value) = strip_prefix_ignore_case(line, "cast:") {
            cast = parse_cast(value);
        } else if let Some(value) = parse_rating(line) {
            rating = Some(value);
        } else if header.is_none() {
            header = parse_header(line);
        }
    }

    let (title, year) = header?;

    Some(MovieRecord {
        title,
        year: year.to_string(),
        plot: if plot_lines.is_empty() {
            sentinel("Plot")
        } else {
            plot_lines.join(" ")
        },
        cast: cast.unwrap_or_else(|| sentinel("Cast")),
        runtime: runtime.unwrap_or_else(|| sentinel("Runtime")),
        genre: genre.unwrap_or_else(|| sentinel("Genre")),
        director: director.unwrap_or_else(|| sentinel("Director")),
        rating: rating.unwrap_or_else(|| sentinel("Rating")),
        external_id: None,
        provider_id: None,
        provider: "freetext".to_string(),
    })
}

/// Matches a `Title (Year)` header with a four-digit year in trailing
/// parentheses.
fn parse_header(line: &str) -> Option<(String, i32)> {
    let open = line.rfind('(')?;
    let close = line[open..].find(')')? + open;
    let inner = line[open + 1..close].trim();

    if inner.len() != 4 {
        return None;
    }
    let year: i32 = inner.parse().ok()?;

    let title = line[..open].trim();
    if title.is_empty() {
        return None;
    }
    Some((title.to_string(), year))
}

/// Matches `Rating: 8.8/10` and bare `8.8/10` lines, normalizing the value
/// to one decimal place.
fn parse_rating(line: &str) -> Option<String> {
    let stripped = line.strip_suffix("/10")?;
    let value = strip_prefix_ignore_case(stripped, "rating:").unwrap_or_else(|| stripped.trim());
    let score: f64 = value.parse().ok()?;
    if !(0.0..=10.0).contains(&score) {
        return None;
    }
    Some(format!("{score:.1}"))
}

fn parse_cast(value: &str) -> Option<String> {
    let names: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .take(CAST_LIMIT)
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Case-insensitive ASCII prefix strip, returning the trimmed remainder.
fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(line[prefix.len()..].trim())
    } else {
        None
    }
}
