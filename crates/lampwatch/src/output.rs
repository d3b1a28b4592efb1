//! Rendering for `--output`.
//!
//! Records go through serde for the structured formats. Lists become a
//! rounded `tabled` grid, single records a `key: value` block, and
//! `plain` prints one identifying value per record.

use std::fmt::Display;
use std::io::{self, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Serialize for json, json-compact and yaml; `None` for the text formats.
fn structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Option<Result<String, CliError>> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(CliError::from),
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(CliError::from),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(CliError::from),
        OutputFormat::Table | OutputFormat::Plain => return None,
    };
    Some(text)
}

/// Render a collection; `to_row` shapes the table, `plain` one line each.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    plain: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    if let Some(text) = structured(format, data) {
        return text;
    }
    if matches!(format, OutputFormat::Plain) {
        return Ok(data.iter().map(plain).collect::<Vec<_>>().join("\n"));
    }
    Ok(Table::new(data.iter().map(to_row))
        .with(Style::rounded())
        .to_string())
}

/// Render one record; `detail` builds the table view.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail: impl Fn(&T) -> String,
    plain: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize + ?Sized,
{
    match structured(format, data) {
        Some(text) => text,
        None if matches!(format, OutputFormat::Plain) => Ok(plain(data)),
        None => Ok(detail(data)),
    }
}

pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let _ = writeln!(io::stdout().lock(), "{output}");
}

/// The store fell back or kept a stale value; stdout still gets the data.
pub fn warn_stale(error: Option<&str>, quiet: bool) {
    if quiet {
        return;
    }
    if let Some(message) = error {
        eprintln!("warning: {message}");
    }
}

/// Labels padded so values line up.
pub fn detail_block(rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0) + 1;
    let mut out = String::new();
    for (i, (label, value)) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("{:<width$} {value}", format!("{label}:")));
    }
    out
}

pub fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Serialize, Tabled)]
    struct Reading {
        slot: u32,
        score: u32,
    }

    fn readings() -> Vec<Reading> {
        vec![
            Reading { slot: 1, score: 80 },
            Reading { slot: 2, score: 40 },
        ]
    }

    fn list(format: OutputFormat) -> String {
        render_list(
            format,
            &readings(),
            |r| Reading {
                slot: r.slot,
                score: r.score,
            },
            |r| r.score.to_string(),
        )
        .unwrap()
    }

    #[test]
    fn plain_list_is_one_line_per_record() {
        assert_eq!(list(OutputFormat::Plain), "80\n40");
    }

    #[test]
    fn table_list_uses_rounded_grid() {
        let out = list(OutputFormat::Table);
        assert!(out.starts_with('╭'), "{out}");
        assert!(out.contains("score") && out.contains("40"), "{out}");
    }

    #[test]
    fn single_record_formats() {
        let r = Reading { slot: 3, score: 72 };
        let detail = |r: &Reading| detail_block(&[("Score", r.score.to_string())]);
        let plain = |r: &Reading| r.slot.to_string();

        let compact = render_single(OutputFormat::JsonCompact, &r, detail, plain).unwrap();
        assert_eq!(compact, r#"{"slot":3,"score":72}"#);
        let yaml = render_single(OutputFormat::Yaml, &r, detail, plain).unwrap();
        assert_eq!(yaml, "slot: 3\nscore: 72\n");
        assert_eq!(
            render_single(OutputFormat::Table, &r, detail, plain).unwrap(),
            "Score: 72"
        );
        assert_eq!(render_single(OutputFormat::Plain, &r, detail, plain).unwrap(), "3");
    }

    #[test]
    fn detail_block_aligns_values() {
        let out = detail_block(&[("Online", "yes".into()), ("Battery", "85%".into())]);
        assert_eq!(out, "Online:  yes\nBattery: 85%");
    }

    #[test]
    fn missing_values_render_as_dash() {
        assert_eq!(or_dash(None::<u8>), "-");
        assert_eq!(or_dash(Some(85)), "85");
    }
}
