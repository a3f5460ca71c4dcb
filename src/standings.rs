use crate::class::{resolve_class, ClassDescriptor};
use crate::filter::filter_rows;
use crate::ordering::{order_rows, SortState};
use crate::parse::{parse_feed, ColumnIndex, FeedError, Field, RawRow};
use crate::render::{plan_rows, RenderPlan};

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub raw: RawRow,
    pub class: ClassDescriptor,
}

impl SnapshotRow {
    pub fn cell<'a>(&'a self, columns: &ColumnIndex, field: Field) -> &'a str {
        self.raw.cell(columns, field)
    }
}

/// Filtered rows of one successful fetch, kept in feed order. Display order
/// is derived per render from the current [`SortState`].
#[derive(Debug, Clone, PartialEq)]
pub struct StandingsSnapshot {
    pub columns: ColumnIndex,
    pub rows: Vec<SnapshotRow>,
    pub dropped_rows: usize,
    pub filtered_rows: usize,
}

impl StandingsSnapshot {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn build_snapshot(text: &str) -> Result<StandingsSnapshot, FeedError> {
    let feed = parse_feed(text)?;
    let total = feed.rows.len();
    let kept = filter_rows(feed.rows, &feed.columns);
    let filtered_rows = total - kept.len();

    let rows = kept
        .into_iter()
        .map(|raw| {
            let class = resolve_class(raw.cell(&feed.columns, Field::Class));
            SnapshotRow { raw, class }
        })
        .collect();

    Ok(StandingsSnapshot {
        columns: feed.columns,
        rows,
        dropped_rows: feed.dropped_rows,
        filtered_rows,
    })
}

pub fn render_snapshot(snapshot: &StandingsSnapshot, sort: &SortState) -> RenderPlan {
    let ordered = order_rows(snapshot, sort);
    plan_rows(&ordered, &snapshot.columns)
}

/// Whole pipeline for one feed text: parse, filter, classify, order, plan.
pub fn run_pipeline(text: &str, sort: &SortState) -> Result<RenderPlan, FeedError> {
    let snapshot = build_snapshot(text)?;
    Ok(render_snapshot(&snapshot, sort))
}
