use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use thiserror::Error;

pub const FIELD_DELIMITER: u8 = b',';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("feed has {0} line(s), need a header and at least one row")]
    TooFewLines(usize),

    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("unreadable feed: {0}")]
    Unreadable(String),
}

/// Logical fields of a standings row. The declaration order is also the
/// table column order the view renders and the click targets index into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    Driver,
    Class,
    Pos,
    ClassPos,
    Laps,
    Pits,
    AvgLap,
    BestLap,
    LastLap,
    InPit,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Driver,
        Field::Class,
        Field::Pos,
        Field::ClassPos,
        Field::Laps,
        Field::Pits,
        Field::AvgLap,
        Field::BestLap,
        Field::LastLap,
        Field::InPit,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Field::Driver => "Driver",
            Field::Class => "Class",
            Field::Pos => "Pos",
            Field::ClassPos => "Class Pos",
            Field::Laps => "Laps",
            Field::Pits => "Pits",
            Field::AvgLap => "Avg Lap",
            Field::BestLap => "Best Lap",
            Field::LastLap => "Last Lap",
            Field::InPit => "In Pit",
        }
    }

    pub fn table_index(self) -> usize {
        self as usize
    }

    pub fn from_table_index(idx: usize) -> Option<Field> {
        Field::ALL.get(idx).copied()
    }

    /// Accepts either a header name (exact match) or a table index.
    pub fn from_column_arg(raw: &str) -> Option<Field> {
        let raw = raw.trim();
        if let Ok(idx) = raw.parse::<usize>() {
            return Field::from_table_index(idx);
        }
        Field::ALL.into_iter().find(|f| f.header() == raw)
    }
}

/// Offsets of every required field inside a [`RawRow`], resolved from the
/// header line of one feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    offsets: [usize; Field::ALL.len()],
}

impl ColumnIndex {
    pub fn from_headers(headers: &StringRecord) -> Result<Self, FeedError> {
        let mut offsets = [0usize; Field::ALL.len()];
        for field in Field::ALL {
            let pos = headers
                .iter()
                .position(|h| h == field.header())
                .ok_or(FeedError::MissingColumn(field.header()))?;
            offsets[field.table_index()] = pos;
        }
        Ok(Self { offsets })
    }

    pub fn offset(&self, field: Field) -> usize {
        self.offsets[field.table_index()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub record: StringRecord,
}

impl RawRow {
    pub fn cell(&self, columns: &ColumnIndex, field: Field) -> &str {
        self.record.get(columns.offset(field)).unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub columns: ColumnIndex,
    pub rows: Vec<RawRow>,
    pub dropped_rows: usize,
}

/// Plain delimiter splitting: no quoting, every cell trimmed, ragged rows
/// allowed through so they can be counted and dropped here.
fn feed_reader(text: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .delimiter(FIELD_DELIMITER)
        .trim(Trim::All)
        .from_reader(text.as_bytes())
}

pub fn parse_feed(text: &str) -> Result<ParsedFeed, FeedError> {
    let mut records = feed_reader(text.trim())
        .records()
        .collect::<Result<Vec<StringRecord>, _>>()
        .map_err(|err| FeedError::Unreadable(err.to_string()))?;
    if records.len() < 2 {
        return Err(FeedError::TooFewLines(records.len()));
    }
    let body = records.split_off(1);
    let headers = &records[0];

    let columns = ColumnIndex::from_headers(headers)?;

    let mut rows = Vec::with_capacity(body.len());
    let mut dropped_rows = 0;
    for record in body {
        if record.len() < headers.len() {
            dropped_rows += 1;
            continue;
        }
        rows.push(RawRow { record });
    }

    Ok(ParsedFeed {
        columns,
        rows,
        dropped_rows,
    })
}

/// Parses a cell as a finite number. Text, `NaN` and infinities are `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parses a position cell. Fractional values written by float-typed
/// producers (`"3.0"`) truncate toward zero.
pub fn parse_position(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(pos) = raw.parse::<i64>() {
        return Some(pos);
    }
    parse_number(raw).map(|value| value.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Driver,Class,Pos,Class Pos,Laps,Pits,Avg Lap,Best Lap,Last Lap,In Pit";

    #[test]
    fn column_index_tolerates_reordering() {
        let text = "Team, Laps ,Driver,Class,Pos,Class Pos,Pits,Avg Lap,Best Lap,Last Lap,In Pit\n\
                    T1,12,Alice,GT3,4,2,1,90.1,89.5,90.0,False";
        let feed = parse_feed(text).unwrap();
        assert_eq!(feed.columns.offset(Field::Laps), 1);
        assert_eq!(feed.columns.offset(Field::Driver), 2);
        assert_eq!(feed.rows[0].cell(&feed.columns, Field::Driver), "Alice");
        assert_eq!(feed.rows[0].cell(&feed.columns, Field::Laps), "12");
    }

    #[test]
    fn missing_required_header_rejects_feed() {
        let text = "Driver,Class,Pos,Class Pos,Laps,Pits,Avg Lap,Best Lap,Last Lap\nA,GT3,1,1,3,0,1,1,1";
        assert_eq!(
            parse_feed(text).unwrap_err(),
            FeedError::MissingColumn("In Pit")
        );
    }

    #[test]
    fn header_only_feed_is_rejected() {
        assert_eq!(parse_feed(HEADER).unwrap_err(), FeedError::TooFewLines(1));
        assert_eq!(parse_feed("  \n").unwrap_err(), FeedError::TooFewLines(0));
    }

    #[test]
    fn short_rows_are_dropped_without_failing_feed() {
        let text = format!("{HEADER}\nA,GT3,1,1,3,0,1,1,1,False\nB,GT3,2\r\nC,P2,3,1,3,0,1,1,1,True\r\n");
        let feed = parse_feed(&text).unwrap();
        assert_eq!(feed.rows.len(), 2);
        assert_eq!(feed.dropped_rows, 1);
        assert_eq!(feed.rows[1].cell(&feed.columns, Field::InPit), "True");
    }

    #[test]
    fn quotes_are_plain_characters_and_blank_lines_are_skipped() {
        let text = format!("{HEADER}\n\n  \"A\" ,GT3,1,1,3,0,1,1,1,False");
        let feed = parse_feed(&text).unwrap();
        assert_eq!(feed.rows.len(), 1);
        assert_eq!(feed.dropped_rows, 0);
        assert_eq!(feed.rows[0].cell(&feed.columns, Field::Driver), "\"A\"");
    }

    #[test]
    fn number_and_position_parsing() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("False"), None);
        assert_eq!(parse_position("3"), Some(3));
        assert_eq!(parse_position("3.0"), Some(3));
        assert_eq!(parse_position("x"), None);
    }

    #[test]
    fn column_args_accept_names_and_indices() {
        assert_eq!(Field::from_column_arg("Best Lap"), Some(Field::BestLap));
        assert_eq!(Field::from_column_arg("7"), Some(Field::BestLap));
        assert_eq!(Field::from_column_arg("10"), None);
        assert_eq!(Field::from_column_arg("best lap"), None);
    }
}
