// Display helpers shared by the observable values.

use chrono::{DateTime, Local, Utc};

/// Slug used inside unique ids: spaces become `_`, everything lower-case.
pub fn sanitize(subject: &str) -> String {
    subject.replace(' ', "_").to_lowercase()
}

/// Title-case a personal name: upper-case every letter that follows a
/// non-letter, lower-case the rest ("ana-maria POP" -> "Ana-Maria Pop").
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Capitalise each whitespace-separated word ("ROMANIA" -> "Romania").
pub fn capitalize_words(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `YYYY-MM-DD HH:MM:SS` in the host's local time zone, or `""` when unset.
pub fn local_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| {
        at.with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    })
    .unwrap_or_default()
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Amount in lei with two decimals.
pub fn ron(amount: f64) -> String {
    format!("{amount:.2} RON")
}
