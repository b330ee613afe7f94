use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::scoring::LedgerEntry;

/// Players with at least one goal, most goals first.
pub fn scorers(entries: &[LedgerEntry]) -> Vec<&LedgerEntry> {
    let mut out: Vec<&LedgerEntry> = entries.iter().filter(|e| e.goals > 0).collect();
    out.sort_by(|a, b| b.goals.cmp(&a.goals).then_with(|| a.name.cmp(&b.name)));
    out
}

/// Everyone, ordered by points, then wins, then goals.
pub fn points_table(entries: &[LedgerEntry]) -> Vec<&LedgerEntry> {
    let mut out: Vec<&LedgerEntry> = entries.iter().collect();
    out.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.wins.cmp(&a.wins))
            .then(b.goals.cmp(&a.goals))
            .then_with(|| a.name.cmp(&b.name))
    });
    out
}

pub fn scorer_rows(entries: &[LedgerEntry]) -> Vec<Vec<String>> {
    let mut rows = vec![vec!["Player".to_string(), "Goals".to_string()]];
    rows.extend(
        scorers(entries)
            .into_iter()
            .map(|e| vec![e.name.clone(), e.goals.to_string()]),
    );
    rows
}

pub fn points_rows(entries: &[LedgerEntry]) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Player".to_string(),
        "Points".to_string(),
        "W/D/L".to_string(),
        "Goals".to_string(),
        "Games".to_string(),
    ]];
    rows.extend(points_table(entries).into_iter().map(|e| {
        vec![
            e.name.clone(),
            e.points.to_string(),
            e.record_label(),
            e.goals.to_string(),
            e.games().to_string(),
        ]
    }));
    rows
}

pub struct ExportReport {
    pub scorers: usize,
    pub players: usize,
}

pub fn export_xlsx(path: &Path, entries: &[LedgerEntry]) -> Result<ExportReport> {
    let scorer_rows = scorer_rows(entries);
    let points_rows = points_rows(entries);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Scorers")?;
        write_rows(sheet, &scorer_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Points")?;
        write_rows(sheet, &points_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        scorers: scorer_rows.len().saturating_sub(1),
        players: points_rows.len().saturating_sub(1),
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{points_rows, points_table, scorers};
    use crate::scoring::LedgerEntry;

    fn entry(name: &str, points: u32, wins: u32, goals: u32) -> LedgerEntry {
        LedgerEntry {
            key: name.to_string(),
            name: name.to_string(),
            wins,
            draws: 0,
            losses: 0,
            points,
            goals,
        }
    }

    #[test]
    fn points_table_breaks_ties_on_wins_then_goals() {
        let rows = vec![entry("a", 6, 1, 0), entry("b", 6, 2, 0), entry("c", 6, 2, 5), entry("d", 9, 3, 0)];
        let names: Vec<&str> = points_table(&rows).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn scorers_skip_players_without_goals() {
        let rows = vec![entry("a", 0, 0, 0), entry("b", 0, 0, 2), entry("c", 0, 0, 4)];
        let names: Vec<&str> = scorers(&rows).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b"]);
    }

    #[test]
    fn points_rows_show_record_label() {
        let mut e = entry("a", 4, 1, 0);
        e.draws = 1;
        e.losses = 2;
        let rows = points_rows(&[e]);
        assert_eq!(rows[1][2], "1/1/2");
        assert_eq!(rows[1][4], "4");
    }
}
