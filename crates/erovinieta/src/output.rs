//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one line per value.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use erovinieta_core::{Reading, SensorValue};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Readings ─────────────────────────────────────────────────────────

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Details")]
    details: String,
}

fn reading_row(reading: &Reading, color: bool) -> ReadingRow {
    let value = match (&reading.value, color) {
        (SensorValue::Bool(true), true) => reading.value.to_string().green().to_string(),
        (SensorValue::Bool(false), true) => reading.value.to_string().red().to_string(),
        _ => reading.value.to_string(),
    };
    let details = reading
        .attributes
        .iter()
        .filter(|(key, _)| key.as_str() != "attribution")
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join("\n");
    ReadingRow {
        name: reading.name.clone(),
        value,
        details,
    }
}

/// Render evaluated values in the chosen format.
pub fn render_readings(
    format: &OutputFormat,
    readings: &[Reading],
    color: bool,
) -> Result<String, CliError> {
    render_list(
        format,
        readings,
        |r| reading_row(r, color),
        |r| format!("{}\t{}", r.unique_id, r.value),
    )
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    line_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&line_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single items have no row shape.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> Result<String, CliError>,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table | OutputFormat::Plain => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(
    data: &T,
    compact: bool,
) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(out)
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use erovinieta_core::SensorKind;
    use erovinieta_core::sensor::Attributes;

    use super::*;

    fn reading() -> Reading {
        let mut attributes = Attributes::new();
        attributes.insert("plate".into(), "B123XYZ".into());
        attributes.insert("attribution".into(), "x".into());
        Reading {
            kind: SensorKind::ActiveVignette,
            name: "Active vignette (B123XYZ)".into(),
            unique_id: "erovinieta_active_vignette_b123xyz_default".into(),
            icon: "mdi:car",
            value: SensorValue::Bool(true),
            attributes,
        }
    }

    #[test]
    fn plain_output_is_one_line_per_value() {
        let out = render_readings(&OutputFormat::Plain, &[reading()], false).unwrap();
        assert_eq!(out, "erovinieta_active_vignette_b123xyz_default\tyes");
    }

    #[test]
    fn table_hides_attribution() {
        let out = render_readings(&OutputFormat::Table, &[reading()], false).unwrap();
        assert!(out.contains("plate: B123XYZ"));
        assert!(!out.contains("attribution"));
    }

    #[test]
    fn json_keeps_typed_values() {
        let out = render_readings(&OutputFormat::JsonCompact, &[reading()], false).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["value"], serde_json::Value::Bool(true));
        assert_eq!(parsed[0]["kind"], "active_vignette");
    }

    #[test]
    fn detail_render_failure_is_an_error() {
        let mut unserializable = std::collections::BTreeMap::new();
        unserializable.insert((1_u8, 2_u8), "tuple keys are not JSON");
        let result = render_single(&OutputFormat::Plain, &unserializable, |m| {
            render_json(m, false)
        });
        assert!(matches!(result, Err(CliError::Json(_))));
    }
}
