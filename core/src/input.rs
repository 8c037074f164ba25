use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::model::workout_log::{NewWorkoutLog, WorkoutLogPatch};
use crate::time::{parse_count, parse_log_date_at, parse_minutes};

pub const LOG_KEYS: [&str; 4] = ["duration", "calories", "date", "notes"];

#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    pub name: String,
    pub metadata: HashMap<String, String>,
}

fn is_key_prefix(key: &str, full: &str) -> bool {
    key.len() >= 2 && full.starts_with(key)
}

/// Splits free words (the name) from `key:value` metadata. A `notes:` token
/// takes every word after it, so notes may contain spaces. A `date:` token
/// holding a bare day takes a following `HH:MM` word as its time.
pub fn parse_args(args: &[String]) -> ParsedInput {
    let mut name_parts = Vec::new();
    let mut metadata = HashMap::new();

    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() {
                let value = if is_key_prefix(key, "notes") {
                    let rest: Vec<&str> = iter.by_ref().map(String::as_str).collect();
                    std::iter::once(value)
                        .chain(rest)
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ")
                } else if is_key_prefix(key, "date")
                    && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
                {
                    match iter.next_if(|next| NaiveTime::parse_from_str(next, "%H:%M").is_ok()) {
                        Some(time) => format!("{} {}", value, time),
                        None => value.to_string(),
                    }
                } else {
                    value.to_string()
                };
                metadata.insert(key.to_string(), value);
                continue;
            }
        }
        name_parts.push(arg.as_str());
    }

    ParsedInput {
        name: name_parts.join(" "),
        metadata,
    }
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    // 1. Exact match
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown key: '{}'", key)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}

fn normalized(parsed: ParsedInput) -> Result<(String, HashMap<String, String>)> {
    let mut metadata = HashMap::new();
    for (key, value) in parsed.metadata {
        metadata.insert(expand_key(&key, &LOG_KEYS)?, value);
    }
    Ok((parsed.name, metadata))
}

/// Builds a create payload from `Run dur:30 cal:200 date:yest notes:…`.
/// Missing numbers default to zero and a missing date to `now`.
pub fn draft_from_input(parsed: ParsedInput, now: NaiveDateTime) -> Result<NewWorkoutLog> {
    let (name, metadata) = normalized(parsed)?;
    let date = match metadata.get("date") {
        Some(d) => parse_log_date_at(d, now)?,
        None => now,
    };
    let mut draft = NewWorkoutLog::new(name, date);
    if let Some(d) = metadata.get("duration") {
        draft.duration = parse_minutes(d)?;
    }
    if let Some(c) = metadata.get("calories") {
        draft.calories = parse_count(c)?;
    }
    if let Some(n) = metadata.get("notes") {
        draft.notes = n.clone();
    }
    Ok(draft)
}

/// Builds an update payload; free words replace the name. The date cannot be
/// changed after creation.
pub fn patch_from_input(parsed: ParsedInput) -> Result<WorkoutLogPatch> {
    let (name, metadata) = normalized(parsed)?;
    if metadata.contains_key("date") {
        return Err(anyhow!("The date of a logged workout cannot be changed"));
    }
    Ok(WorkoutLogPatch {
        name: (!name.is_empty()).then_some(name),
        duration: metadata.get("duration").map(|d| parse_minutes(d)).transpose()?,
        calories: metadata.get("calories").map(|c| parse_count(c)).transpose()?,
        notes: metadata.get("notes").cloned(),
    })
}
