use race_standings::ordering::SortState;
use race_standings::parse::Field;
use race_standings::render::PlanEntry;
use race_standings::standings::run_pipeline;

const HEADER: &str = "Driver,Class,Pos,Class Pos,Laps,Pits,Avg Lap,Best Lap,Last Lap,In Pit";

#[test]
fn group_headers_carry_display_name_and_span() {
    let text = format!(
        "{HEADER}\n\
         A,Class 4074,1,1,10,0,200.5000,199.000,201.100,False\n\
         B,Mystery,2,1,9,1,250,249,251,True"
    );
    let plan = run_pipeline(&text, &SortState::automatic()).unwrap();
    assert_eq!(plan.entries.len(), 4);
    match &plan.entries[0] {
        PlanEntry::GroupHeader {
            display_name,
            class_order,
            span,
        } => {
            assert_eq!(display_name, "Hypercar");
            assert_eq!(*class_order, 1);
            assert_eq!(*span, Field::ALL.len());
        }
        other => panic!("expected group header, got {other:?}"),
    }
    match &plan.entries[3] {
        PlanEntry::Row(row) => {
            assert_eq!(row.class_name, "Mystery");
            assert_eq!(row.class_order, 99);
            assert_eq!(row.class_icon, None);
            assert_eq!(
                row.cells,
                vec!["B", "Mystery", "2", "1", "9", "1", "250", "249", "251", "True"]
            );
        }
        other => panic!("expected row, got {other:?}"),
    }
}

#[test]
fn leader_requires_literal_one() {
    let text = format!(
        "{HEADER}\n\
         A,GT3,1,1,10,0,1,1,1,False\n\
         B,GT3,2,01,10,0,1,1,1,False\n\
         C,GT3,3,1.0,10,0,1,1,1,False"
    );
    let plan = run_pipeline(&text, &SortState::automatic()).unwrap();
    let leaders: Vec<bool> = plan.rows().map(|row| row.leader).collect();
    assert_eq!(leaders, vec![true, false, false]);
}

#[test]
fn unknown_classes_share_one_header_when_adjacent() {
    let text = format!(
        "{HEADER}\n\
         A,Alpha,1,1,10,0,1,1,1,False\n\
         B,Beta,2,1,10,0,1,1,1,False"
    );
    let plan = run_pipeline(&text, &SortState::automatic()).unwrap();
    assert_eq!(plan.group_names(), vec!["Alpha"]);
}

#[test]
fn plan_serializes_for_external_views() {
    let text = format!("{HEADER}\nA,GT3,1,1,10,0,90.000,89.5,90.25,False");
    let plan = run_pipeline(&text, &SortState::automatic()).unwrap();
    let json = serde_json::to_value(&plan).unwrap();
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries[0]["kind"], "group_header");
    assert_eq!(entries[0]["display_name"], "GT3");
    assert_eq!(entries[1]["kind"], "row");
    assert_eq!(entries[1]["leader"], true);
    assert_eq!(entries[1]["class_icon"], "🟩");
    assert_eq!(entries[1]["cells"][6], "90");
}
