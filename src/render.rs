use serde::Serialize;

use crate::parse::{parse_number, ColumnIndex, Field};
use crate::standings::SnapshotRow;

/// One line of the standings table as handed to the view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanEntry {
    GroupHeader {
        display_name: String,
        class_order: i32,
        span: usize,
    },
    Row(PlanRow),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRow {
    /// Formatted cells in table column order.
    pub cells: Vec<String>,
    pub leader: bool,
    pub class_order: i32,
    pub class_name: String,
    pub class_icon: Option<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderPlan {
    pub entries: Vec<PlanEntry>,
}

impl RenderPlan {
    pub fn rows(&self) -> impl Iterator<Item = &PlanRow> {
        self.entries.iter().filter_map(|entry| match entry {
            PlanEntry::Row(row) => Some(row),
            PlanEntry::GroupHeader { .. } => None,
        })
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                PlanEntry::GroupHeader { display_name, .. } => Some(display_name.as_str()),
                PlanEntry::Row(_) => None,
            })
            .collect()
    }

    pub fn column(&self, field: Field) -> Vec<&str> {
        self.rows()
            .map(|row| row.cells[field.table_index()].as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the plan from rows already in display order. A group header is
/// emitted whenever the class sort order differs from the previous row's.
pub fn plan_rows(rows: &[&SnapshotRow], columns: &ColumnIndex) -> RenderPlan {
    let mut entries = Vec::with_capacity(rows.len() + 4);
    let mut current_group: Option<i32> = None;

    for row in rows {
        let class = &row.class;
        if current_group != Some(class.sort_order) {
            current_group = Some(class.sort_order);
            entries.push(PlanEntry::GroupHeader {
                display_name: class.display_name.clone(),
                class_order: class.sort_order,
                span: Field::ALL.len(),
            });
        }

        let cells = Field::ALL
            .iter()
            .map(|&field| match field {
                Field::Class => class.display_name.clone(),
                _ => format_number(row.cell(columns, field)),
            })
            .collect();

        entries.push(PlanEntry::Row(PlanRow {
            cells,
            leader: row.cell(columns, Field::ClassPos) == "1",
            class_order: class.sort_order,
            class_name: class.display_name.clone(),
            class_icon: class.icon(),
        }));
    }

    RenderPlan { entries }
}

const FRACTION_DIGITS: usize = 3;

/// Cuts numeric cells to three decimals and strips trailing zeros
/// (`12.500` -> `12.5`, `0.1005` -> `0.1`). Anything else passes through.
pub fn format_number(raw: &str) -> String {
    let Some(value) = parse_number(raw) else {
        return raw.to_string();
    };
    // Shortest round-trip digits, so the cut never lands on binary noise
    // (`90.1` stays `90.1` instead of `90.099`).
    let digits = value.to_string();
    let formatted = match digits.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.get(..FRACTION_DIGITS).unwrap_or(frac).trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{frac}")
            }
        }
        None => digits,
    };
    if formatted == "-0" {
        "0".to_string()
    } else {
        formatted
    }
}
