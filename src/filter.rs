use crate::parse::{parse_number, parse_position, ColumnIndex, Field, RawRow};

/// Entries that are never standings participants.
pub const BLOCKED_DRIVERS: [&str; 2] = ["Lily Bowling", "Pace Car"];

pub fn is_blocked_driver(driver: &str) -> bool {
    BLOCKED_DRIVERS.contains(&driver)
}

/// A row stays when its driver is not blocked, its position parses to a
/// positive integer and its lap count parses to a positive number.
pub fn keep_row(row: &RawRow, columns: &ColumnIndex) -> bool {
    if is_blocked_driver(row.cell(columns, Field::Driver)) {
        return false;
    }
    let Some(pos) = parse_position(row.cell(columns, Field::Pos)) else {
        return false;
    };
    if pos <= 0 {
        return false;
    }
    matches!(parse_number(row.cell(columns, Field::Laps)), Some(laps) if laps > 0.0)
}

pub fn filter_rows(rows: Vec<RawRow>, columns: &ColumnIndex) -> Vec<RawRow> {
    rows.into_iter().filter(|row| keep_row(row, columns)).collect()
}
