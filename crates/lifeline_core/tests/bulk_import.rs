use lifeline_core::bulk::{parse_bulk_events, prepare_bulk_import};
use lifeline_core::{
    Edge, Node, NodeDraft, SceneError, SceneStore, Settings, Sphere, TimelineConfig,
    TimelineSession, ValidationError,
};

#[test]
fn mixed_separators_parse_cleanly() {
    let events = parse_bulk_events("18, Graduated\n22.5: First job\n30; Moved city");
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|event| event.error.is_none()));
    let ages: Vec<f64> = events.iter().filter_map(|event| event.age).collect();
    assert_eq!(ages, vec![18.0, 22.5, 30.0]);
    assert_eq!(events[1].label.as_deref(), Some("First job"));
}

#[test]
fn line_without_separator_reports_it() {
    let events = parse_bulk_events("10 bad line");
    assert_eq!(events.len(), 1);
    let error = events[0].error.as_deref().unwrap();
    assert!(error.starts_with("Line 1:"));
    assert!(error.contains("separator"));
}

#[test]
fn decimal_comma_and_leading_zero_are_normalized() {
    let events = parse_bulk_events("07; Started school\n\n22,5; Internship");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].age, Some(7.0));
    // The first separator wins, so "22,5" splits into age 22 and label "5; Internship".
    assert_eq!(events[1].age, Some(22.0));
    assert_eq!(events[1].line, 3);
}

#[test]
fn any_hard_error_blocks_the_whole_batch() {
    let mut session = TimelineSession::empty(&Settings::default());
    let err = session
        .bulk_import("18, Fine\n140, Too old\nno separator", None, &|_: &str| true)
        .unwrap_err();
    match err {
        SceneError::Validation(ValidationError::BulkLines(lines)) => {
            assert_eq!(lines.len(), 2);
            assert!(lines[0].starts_with("Line 2:"));
            assert!(lines[1].starts_with("Line 3:"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(session.scene().is_empty());
}

#[test]
fn ages_past_branch_end_plan_an_extension() {
    let mut scene = SceneStore::new(TimelineConfig::default());
    let origin = scene
        .insert_node(Node::from_draft(
            &NodeDraft::new(20.0, "Moved abroad").with_sphere(Sphere::Place),
            2300.0,
            None,
        ))
        .unwrap();
    let branch = scene
        .insert_edge(Edge::new(origin, 2300.0, 20.0, 25.0, Sphere::Place.color()))
        .unwrap();

    let plan = prepare_bulk_import(&scene, "22, Language course\n31, Citizenship", Some(branch))
        .unwrap();
    assert_eq!(plan.extend_to, Some(31.0));
    assert_eq!(plan.x, 2300.0);
    assert!(plan
        .drafts
        .iter()
        .all(|draft| draft.sphere == Some(Sphere::Place)));

    let err = prepare_bulk_import(&scene, "12, Too early", Some(branch)).unwrap_err();
    assert!(matches!(
        err,
        SceneError::Validation(ValidationError::BulkLines(_))
    ));
}

#[test]
fn one_import_is_one_undo_step() {
    let mut session = TimelineSession::empty(&Settings::default());
    session
        .bulk_import("18, Graduated\n22.5: First job\n30; Moved city", None, &|_: &str| true)
        .unwrap();
    assert_eq!(session.scene().node_count(), 3);
    session.undo();
    assert!(session.scene().is_empty());
}
