use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::parse::{parse_number, parse_position, Field};
use crate::standings::{SnapshotRow, StandingsSnapshot};

/// User-selected ordering. `column == None` is automatic class-leader
/// grouping; otherwise `column` is a table column index (see [`Field::ALL`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub column: Option<usize>,
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self::automatic()
    }
}

impl SortState {
    pub fn automatic() -> Self {
        Self {
            column: None,
            ascending: true,
        }
    }

    /// Header click transition. The same column flips direction, a new column
    /// starts ascending. Indices outside the table leave the state unchanged.
    pub fn apply_click(self, column: usize) -> Self {
        if Field::from_table_index(column).is_none() {
            return self;
        }
        if self.column == Some(column) {
            Self {
                column: Some(column),
                ascending: !self.ascending,
            }
        } else {
            Self {
                column: Some(column),
                ascending: true,
            }
        }
    }

    pub fn field(&self) -> Option<Field> {
        self.column.and_then(Field::from_table_index)
    }

    pub fn label(&self) -> String {
        match self.field() {
            None => "AUTO".to_string(),
            Some(field) => format!(
                "{} {}",
                field.header(),
                if self.ascending { "ASC" } else { "DESC" }
            ),
        }
    }
}

pub fn order_rows<'a>(snapshot: &'a StandingsSnapshot, sort: &SortState) -> Vec<&'a SnapshotRow> {
    match sort.field() {
        None => automatic_order(snapshot),
        Some(field) => explicit_order(snapshot, field, sort.ascending),
    }
}

/// Groups rows by raw class label, groups ordered by the best overall
/// position any of their cars holds, rows inside a group by position.
fn automatic_order(snapshot: &StandingsSnapshot) -> Vec<&SnapshotRow> {
    let columns = &snapshot.columns;
    let position = |row: &SnapshotRow| {
        parse_position(row.cell(columns, Field::Pos)).unwrap_or(i64::MAX)
    };

    let mut leaders: Vec<(&str, i64)> = Vec::new();
    for row in &snapshot.rows {
        let class = row.cell(columns, Field::Class);
        let pos = position(row);
        match leaders.iter_mut().find(|(key, _)| *key == class) {
            Some((_, best)) => *best = (*best).min(pos),
            None => leaders.push((class, pos)),
        }
    }
    // Stable: classes tied on leader position keep encounter order.
    leaders.sort_by_key(|(_, pos)| *pos);
    let class_rank: HashMap<&str, usize> = leaders
        .iter()
        .enumerate()
        .map(|(rank, (class, _))| (*class, rank))
        .collect();

    let mut rows: Vec<&SnapshotRow> = snapshot.rows.iter().collect();
    rows.sort_by(|a, b| {
        let rank_a = class_rank.get(a.cell(columns, Field::Class)).copied();
        let rank_b = class_rank.get(b.cell(columns, Field::Class)).copied();
        rank_a
            .cmp(&rank_b)
            .then_with(|| position(*a).cmp(&position(*b)))
    });
    rows
}

fn explicit_order(snapshot: &StandingsSnapshot, field: Field, ascending: bool) -> Vec<&SnapshotRow> {
    let columns = &snapshot.columns;
    let mut rows: Vec<&SnapshotRow> = snapshot.rows.iter().collect();
    merge_sort_by(&mut rows, &mut |a: &&SnapshotRow, b: &&SnapshotRow| {
        let ord = if field == Field::Class {
            a.class.sort_order.cmp(&b.class.sort_order)
        } else {
            compare_cells(a.cell(columns, field), b.cell(columns, field))
        };
        if ascending { ord } else { ord.reverse() }
    });
    rows
}

/// Numeric when both cells parse as numbers, otherwise a case-sensitive
/// lexical comparison of the two raw strings.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

// Mixed numeric/text columns can make `compare_cells` cyclic. `slice::sort_by`
// may panic on a comparator that is not a total order; this stable merge sort
// only ever yields some deterministic permutation.
fn merge_sort_by<T, F>(items: &mut Vec<T>, cmp: &mut F)
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return;
    }
    let mut right = items.split_off(items.len() / 2);
    merge_sort_by(items, cmp);
    merge_sort_by(&mut right, cmp);

    let left = std::mem::take(items);
    items.reserve(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if cmp(&right[j], &left[i]) == Ordering::Less {
            items.push(right[j]);
            j += 1;
        } else {
            items.push(left[i]);
            i += 1;
        }
    }
    items.extend_from_slice(&left[i..]);
    items.extend_from_slice(&right[j..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_same_column_toggles_and_new_column_resets() {
        let best_lap = Field::BestLap.table_index();
        let s = SortState::automatic().apply_click(best_lap);
        assert_eq!(s, SortState { column: Some(best_lap), ascending: true });
        let s = s.apply_click(best_lap);
        assert_eq!(s, SortState { column: Some(best_lap), ascending: false });
        let s = s.apply_click(Field::Laps.table_index());
        assert_eq!(s, SortState { column: Some(Field::Laps.table_index()), ascending: true });
    }

    #[test]
    fn out_of_range_click_is_ignored() {
        let s = SortState::automatic().apply_click(2);
        assert_eq!(s.apply_click(Field::ALL.len()), s);
    }

    #[test]
    fn compare_cells_mixes_numeric_and_lexical() {
        assert_eq!(compare_cells("9", "10"), Ordering::Less);
        assert_eq!(compare_cells("10.5", "10.50"), Ordering::Equal);
        // Mixed numeric/text falls back to comparing the raw strings.
        assert_eq!(compare_cells("10", "9a"), Ordering::Less);
        assert_eq!(compare_cells("-", "90.1"), Ordering::Less);
        assert_eq!(compare_cells("False", "True"), Ordering::Less);
        assert_eq!(compare_cells("b", "B"), Ordering::Greater);
    }

    #[test]
    fn merge_sort_is_stable_and_survives_cyclic_comparator() {
        let mut items = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd')];
        merge_sort_by(&mut items, &mut |x: &(i32, char), y: &(i32, char)| x.0.cmp(&y.0));
        assert_eq!(items, vec![(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c')]);

        let mut cyclic = vec!["10", "9", "1a", "10", "9", "1a"];
        merge_sort_by(&mut cyclic, &mut |a: &&str, b: &&str| compare_cells(a, b));
        assert_eq!(cyclic.len(), 6);
    }

    #[test]
    fn labels() {
        assert_eq!(SortState::automatic().label(), "AUTO");
        let s = SortState::automatic().apply_click(7).apply_click(7);
        assert_eq!(s.label(), "Best Lap DESC");
    }
}
