use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::object::{Columns, Rows};
use tabled::settings::{Alignment, Style};

use crate::config::Cli;
use crate::rubric::{Rubric, RubricItem};

#[derive(Serialize)]
struct JsonReport<'a> {
    items: &'a [RubricItem],
    possible: u32,
    awarded: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Total,
    Json,
}

impl From<&Cli> for OutputMode {
    fn from(cli: &Cli) -> Self {
        if cli.total {
            OutputMode::Total
        } else if cli.json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

pub fn render_table(rubric: &Rubric) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Rubric Item", "Error?", "Possible", "Awarded"].map(String::from));
    for item in rubric.items() {
        builder.push_record([
            item.label().to_string(),
            item.message().to_string(),
            item.possible().to_string(),
            item.awarded().to_string(),
        ]);
    }
    builder.push_record([
        String::new(),
        "Total".to_string(),
        rubric.possible().to_string(),
        rubric.awarded().to_string(),
    ]);

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .modify(Columns::new(2..), Alignment::right())
        .modify(Rows::last(), Alignment::right());
    table.to_string()
}

pub fn write_report(out: &mut impl Write, mode: OutputMode, rubric: &Rubric) -> Result<()> {
    match mode {
        OutputMode::Total => writeln!(out, "{}", rubric.awarded())?,
        OutputMode::Table => writeln!(out, "{}", render_table(rubric))?,
        OutputMode::Json => {
            let report = JsonReport {
                items: rubric.items(),
                possible: rubric.possible(),
                awarded: rubric.awarded(),
            };
            let json = serde_json::to_string_pretty(&report).context("serialising rubric")?;
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}
