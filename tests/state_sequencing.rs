use race_standings::ordering::SortState;
use race_standings::parse::Field;
use race_standings::state::{apply_delta, AppState, Delta, ProviderCommand};

const HEADER: &str = "Driver,Class,Pos,Class Pos,Laps,Pits,Avg Lap,Best Lap,Last Lap,In Pit";

fn feed(rows: &[&str]) -> String {
    let mut text = HEADER.to_string();
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text
}

fn older_feed() -> String {
    feed(&["Old,GT3,1,1,5,0,90,89,90,False"])
}

fn newer_feed() -> String {
    feed(&[
        "Fast,Hypercar,1,1,6,0,80,79.5,80,False",
        "Slow,GT3,2,1,6,0,90,88.25,90,False",
    ])
}

fn seq_of(cmd: ProviderCommand) -> u64 {
    match cmd {
        ProviderCommand::FetchFeed { seq } => seq,
    }
}

#[test]
fn tick_issues_increasing_sequence_numbers() {
    let mut state = AppState::new();
    assert_eq!(seq_of(state.tick()), 1);
    assert_eq!(seq_of(state.tick()), 2);
    assert_eq!(state.issued_seq, 2);
}

#[test]
fn late_response_from_older_fetch_is_discarded() {
    let mut state = AppState::new();
    let first = seq_of(state.tick());
    let second = seq_of(state.tick());

    apply_delta(
        &mut state,
        Delta::FeedLoaded {
            seq: second,
            text: newer_feed(),
        },
    );
    let applied = state.plan.clone();
    assert_eq!(state.applied_seq, Some(second));

    apply_delta(
        &mut state,
        Delta::FeedLoaded {
            seq: first,
            text: older_feed(),
        },
    );
    assert_eq!(state.plan, applied);
    assert_eq!(state.applied_seq, Some(second));
    assert_eq!(state.plan.column(Field::Driver), vec!["Fast", "Slow"]);
}

#[test]
fn response_superseded_by_newer_request_is_not_applied() {
    let mut state = AppState::new();
    let first = seq_of(state.tick());
    state.tick();
    state.apply_feed(first, &older_feed());
    assert!(state.snapshot.is_none());
    assert!(state.plan.is_empty());
}

#[test]
fn failures_keep_previous_render() {
    let mut state = AppState::new();
    let seq = seq_of(state.tick());
    state.apply_feed(seq, &newer_feed());
    let before = state.plan.clone();

    let seq = seq_of(state.tick());
    apply_delta(
        &mut state,
        Delta::FeedFailed {
            seq,
            error: "http 503 Service Unavailable".to_string(),
        },
    );
    assert_eq!(state.plan, before);

    let seq = seq_of(state.tick());
    state.apply_feed(seq, HEADER);
    assert_eq!(state.plan, before);

    let seq = seq_of(state.tick());
    state.apply_feed(seq, "Driver,Pos\nA,1");
    assert_eq!(state.plan, before);
}

#[test]
fn failures_never_reach_the_console() {
    let mut state = AppState::new();
    let seq = seq_of(state.tick());
    apply_delta(
        &mut state,
        Delta::FeedFailed {
            seq,
            error: "http 503".to_string(),
        },
    );
    let seq = seq_of(state.tick());
    state.apply_feed(seq, HEADER);
    let seq = seq_of(state.tick());
    state.apply_feed(seq, "Driver,Pos\nA,1");

    assert!(state.logs.is_empty(), "console got {:?}", state.logs);
    assert!(state.plan.is_empty());
}

#[test]
fn click_rerenders_without_fetching() {
    let mut state = AppState::new();
    let seq = seq_of(state.tick());
    state.apply_feed(seq, &newer_feed());

    state.click_header(Field::BestLap.table_index());
    state.click_header(Field::BestLap.table_index());
    assert_eq!(state.issued_seq, seq);
    assert_eq!(state.plan.column(Field::BestLap), vec!["88.25", "79.5"]);
}

#[test]
fn click_during_inflight_fetch_survives_the_response() {
    let mut state = AppState::new();
    let seq = seq_of(state.tick());
    state.click_header(Field::BestLap.table_index());
    state.click_header(Field::BestLap.table_index());
    assert!(state.plan.is_empty());

    state.apply_feed(seq, &newer_feed());
    assert_eq!(
        state.sort,
        SortState {
            column: Some(Field::BestLap.table_index()),
            ascending: false
        }
    );
    assert_eq!(state.plan.column(Field::Driver), vec!["Slow", "Fast"]);

    // A later fetch keeps the user's sort too.
    let seq = seq_of(state.tick());
    state.apply_feed(seq, &newer_feed());
    assert_eq!(state.plan.column(Field::Driver), vec!["Slow", "Fast"]);
}

#[test]
fn leader_flag_and_formatting_reach_the_plan() {
    let mut state = AppState::new();
    let seq = seq_of(state.tick());
    state.apply_feed(seq, &newer_feed());
    let rows: Vec<_> = state.plan.rows().collect();
    assert!(rows.iter().all(|row| row.leader));
    assert_eq!(rows[0].cells[Field::Class.table_index()], "Hypercar");
    assert_eq!(rows[0].class_icon, Some("🟥"));
    assert_eq!(rows[1].cells[Field::BestLap.table_index()], "88.25");
}

#[test]
fn log_ring_is_bounded() {
    let mut state = AppState::new();
    for i in 0..500 {
        apply_delta(&mut state, Delta::Log(format!("line {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.back().map(String::as_str), Some("line 499"));
}
