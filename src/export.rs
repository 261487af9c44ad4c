use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::report::{probability_table, standings_table};
use crate::season::OddsReport;

pub struct ExportSummary {
    pub standings_rows: usize,
    pub probability_rows: usize,
}

/// Writes a workbook with `Standings` and `Probabilities` sheets.
pub fn export_report(path: &Path, report: &OddsReport) -> Result<ExportSummary> {
    let standings = standings_table(&report.standings);
    let probabilities = probability_table(&report.simulation);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Standings")?;
        write_header(sheet, &["Rank", "Team", "Match W-L", "Game W-L", "Game Diff"])?;
        for (idx, line) in standings.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet.write_number(row, 0, (idx + 1) as f64)?;
            sheet.write_string(row, 1, &line.team)?;
            sheet.write_string(row, 2, &line.match_record)?;
            sheet.write_string(row, 3, &line.game_record)?;
            sheet.write_number(row, 4, f64::from(line.game_diff))?;
        }
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Probabilities")?;
        let mut header = vec!["Team".to_string()];
        header.extend(probabilities.brackets.iter().map(|b| format!("{b} (%)")));
        let header: Vec<&str> = header.iter().map(String::as_str).collect();
        write_header(sheet, &header)?;
        for (idx, line) in probabilities.rows.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet.write_string(row, 0, &line.team)?;
            for (col, pct) in line.percentages.iter().enumerate() {
                sheet.write_number(row, col as u16 + 1, *pct)?;
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportSummary {
        standings_rows: standings.len(),
        probability_rows: probabilities.rows.len(),
    })
}

fn write_header(worksheet: &mut Worksheet, names: &[&str]) -> Result<()> {
    for (col, name) in names.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *name)
            .with_context(|| format!("write header cell {col}"))?;
    }
    Ok(())
}
