//! End-to-end engine scenarios driven the way a rendering layer would.

use std::num::NonZeroUsize;

use canopy_core::{
    ClickEvent, ClopenMap, Engine, EngineOptions, Hierarchy, HierarchyRow, Marker, NodeKey,
    NodeView, RowType, SearchFilter, Transition,
};
use canopy_test_utils::fixtures::{TreeFixture, child_labels, node, selected_keys, snapshot};
use canopy_test_utils::host::{ReportLog, TestHost};
use canopy_test_utils::tracing_setup::init_test_tracing;
use pretty_assertions::assert_eq;

fn bounded(n: usize) -> EngineOptions {
    EngineOptions::default().with_capacity(NonZeroUsize::new(n).unwrap())
}

fn click(engine: &mut Engine, key: &str) {
    let target = node(engine, key);
    engine.handle_node_click(target, &ClickEvent::plain());
}

fn find_view<'a>(views: &'a [NodeView], id: &str) -> Option<&'a NodeView> {
    views.iter().find(|v| v.id.as_str() == id)
}

#[test_log::test]
fn test_capacity_two_evicts_oldest() {
    let mut engine = Engine::new(bounded(2));
    engine.on_snapshot_replaced(snapshot(TreeFixture::abc()));

    click(&mut engine, "a");
    click(&mut engine, "b");
    assert_eq!(selected_keys(&engine), vec!["a", "b"]);

    click(&mut engine, "c");
    assert_eq!(selected_keys(&engine), vec!["b", "c"]);

    let view = engine.view();
    let a = find_view(&view, "a").unwrap();
    assert!(!a.is_selected);
    assert_eq!(a.marker, None);
    assert_eq!(find_view(&view, "c").unwrap().marker, Some(Marker::Tick));
}

#[test_log::test]
fn test_collapse_prunes_to_selection_then_restores() {
    let mut engine = Engine::new(EngineOptions::default());
    engine.on_snapshot_replaced(snapshot(TreeFixture::siblings()));
    click(&mut engine, "x2");

    let x = node(&engine, "x");
    assert_eq!(engine.handle_collapse(x), Transition::Pruned { hidden: 2 });
    assert_eq!(child_labels(&engine, "x"), vec!["Lead"]);
    let pruned = engine.tree().node(x).unwrap().pruned_children().unwrap();
    assert_eq!(pruned.len(), 2);
    assert!(engine.tree().node(x).unwrap().is_expanded());

    let state = engine.state();
    let x_view = find_view(&state.nodes, "x").unwrap();
    assert_eq!(x_view.pruned, vec![NodeKey::from("x3"), NodeKey::from("x1")]);
    assert!(find_view(&state.nodes, "x1").is_none());
    assert_eq!(
        find_view(&state.nodes, "x2").unwrap().parent,
        Some(NodeKey::from("x"))
    );

    assert_eq!(engine.handle_collapse(x), Transition::Restored);
    let state = engine.state();
    assert!(find_view(&state.nodes, "x").unwrap().pruned.is_empty());
    assert_eq!(child_labels(&engine, "x"), vec!["Iron", "Lead", "Zinc"]);
    assert!(engine.tree().node(x).unwrap().pruned_children().is_none());

    // With the partition undone, a further collapse prunes again.
    assert_eq!(engine.handle_collapse(x), Transition::Pruned { hidden: 2 });
}

#[test_log::test]
fn test_collapse_after_deselect_closes() {
    let mut engine = Engine::new(EngineOptions::default());
    engine.on_snapshot_replaced(snapshot(TreeFixture::siblings()));
    click(&mut engine, "x2");
    click(&mut engine, "x2");

    let x = node(&engine, "x");
    assert_eq!(engine.handle_collapse(x), Transition::Collapsed);
    assert!(!engine.tree().node(x).unwrap().is_expanded());
}

#[test_log::test]
fn test_replacement_keeps_42_selected_and_visible() {
    let mut engine = Engine::new(EngineOptions::default());
    engine.on_snapshot_replaced(snapshot(TreeFixture::assessment(true)));
    click(&mut engine, "42");
    let old_42 = node(&engine, "42");

    let outcome = engine.on_snapshot_replaced(snapshot(TreeFixture::assessment(true)));
    assert_eq!(outcome.rebound, 1);

    let new_42 = node(&engine, "42");
    assert_ne!(old_42, new_42);
    assert!(engine.tree().node(old_42).is_none());
    assert_eq!(
        engine.selection().get(&NodeKey::from("42")).unwrap().node(),
        Some(new_42)
    );

    let view = engine.view();
    let leaf = find_view(&view, "42").unwrap();
    assert!(leaf.is_selected);
    assert_eq!(leaf.marker, Some(Marker::Tick));
    assert!(find_view(&view, "1").unwrap().is_expanded);
    assert!(find_view(&view, "4").unwrap().is_expanded);
    assert!(!find_view(&view, "2").unwrap().is_expanded);

    let rows: Vec<String> = engine
        .visible_rows()
        .iter()
        .map(|r| r.label.clone())
        .collect();
    assert_eq!(
        rows,
        vec!["Assessment", "Vitals", "Blood pressure", "Genomics"]
    );
}

#[test_log::test]
fn test_orphan_survives_until_id_returns() {
    let mut engine = Engine::new(EngineOptions::default());
    engine.on_snapshot_replaced(snapshot(TreeFixture::assessment(true)));
    click(&mut engine, "42");

    let outcome = engine.on_snapshot_replaced(snapshot(TreeFixture::assessment(false)));
    assert_eq!(outcome.orphaned, vec![NodeKey::from("42")]);
    let state = engine.state();
    assert_eq!(state.selection_set.len(), 1);
    assert!(state.selection_set[0].orphaned);
    assert_eq!(state.selection_set[0].label, "Blood pressure");

    let outcome = engine.on_snapshot_replaced(snapshot(TreeFixture::assessment(true)));
    assert!(outcome.orphaned.is_empty());
    assert!(!engine.selection().get(&NodeKey::from("42")).unwrap().is_orphaned());
}

#[test]
fn test_stale_handles_are_absorbed() {
    init_test_tracing();
    let reports = ReportLog::new();
    let mut engine = Engine::new(EngineOptions::default()).with_reporter(reports.reporter());
    engine.on_snapshot_replaced(snapshot(TreeFixture::abc()));
    let stale = node(&engine, "a");
    engine.on_snapshot_replaced(snapshot(TreeFixture::abc()));

    assert_eq!(engine.handle_collapse(stale), Transition::Ignored);
    assert_eq!(engine.handle_expand(stale), Transition::Ignored);
    assert_eq!(reports.counters(), vec![1, 2]);
}

#[test_log::test(tokio::test)]
async fn test_host_receives_reports_and_clopen_writes() {
    let mut host = TestHost::with_toml(
        r#"
[selection]
max_selections = 1
"#,
    )
    .await;
    host.engine
        .on_snapshot_replaced(snapshot(TreeFixture::siblings()));

    let y = node(&host.engine, "y");
    host.engine.handle_node_click(y, &ClickEvent::plain());
    click(&mut host.engine, "x1");
    click(&mut host.engine, "x3");

    assert_eq!(host.reports.counters(), vec![1, 2, 3, 4]);
    let last = host.reports.last().unwrap();
    assert_eq!(last.update_counter, host.engine.update_counter());
    assert_eq!(last.selection_set.len(), 1);
    assert_eq!(last.selection_set[0].label, "Zinc");

    assert_eq!(host.clopen.get(&NodeKey::from("y")), Some(true));
    assert_eq!(host.clopen.get(&NodeKey::from("x1")), Some(false));
    assert_eq!(host.clopen.get(&NodeKey::from("x3")), Some(true));
}

#[test_log::test(tokio::test)]
async fn test_default_host_selects_without_bound() {
    let mut host = TestHost::default_config().await;
    assert!(host.config_path.ends_with("canopy.toml"));
    assert_eq!(host.config.selection.max_selections, None);

    host.engine
        .on_snapshot_replaced(snapshot(TreeFixture::grid(2, 3)));
    for key in ["c0.0", "c0.1", "c0.2", "c1.0", "c1.1"] {
        click(&mut host.engine, key);
    }
    assert_eq!(selected_keys(&host.engine).len(), 5);
    assert_eq!(host.reports.len(), 6);
}

fn listing() -> Hierarchy {
    let row = |path: &str, node_type, name: &str| HierarchyRow {
        node_id: path.to_string(),
        node_type,
        node_name: name.to_string(),
        field_id: None,
        instance_id: None,
    };
    Hierarchy::from_rows(vec![
        row("1.0", RowType::Root, "Assessment"),
        row("1.1", RowType::Leaf, "Method of measuring blood pressure"),
        row("1.2", RowType::Leaf, "Date of birth"),
        row("2.0", RowType::Root, "Samples"),
        row("2.1", RowType::Leaf, "Blood sample barcode"),
    ])
}

#[test_log::test]
fn test_selection_survives_search_refresh() {
    let listing = listing();
    let clopen = ClopenMap::new();
    let mut engine = Engine::new(EngineOptions::default()).with_clopen(clopen.clone());
    engine.on_snapshot_replaced(
        listing
            .snapshot(&SearchFilter::all(), Some(&clopen))
            .unwrap(),
    );
    click(&mut engine, "3");

    let filtered = listing
        .snapshot(&SearchFilter::new("blood"), Some(&clopen))
        .unwrap();
    let outcome = engine.on_snapshot_replaced(filtered);
    assert_eq!(outcome.orphaned, vec![NodeKey::from("3")]);
    assert_eq!(outcome.adopted, Vec::<NodeKey>::new());

    let full = listing
        .snapshot(&SearchFilter::all(), Some(&clopen))
        .unwrap();
    engine.on_snapshot_replaced(full);
    assert_eq!(selected_keys(&engine), vec!["3"]);
    assert!(!engine.selection().get(&NodeKey::from("3")).unwrap().is_orphaned());
}

#[test_log::test]
fn test_new_session_restores_selection_from_clopen_map() {
    let listing = listing();
    let clopen = ClopenMap::new();
    {
        let mut engine = Engine::new(EngineOptions::default()).with_clopen(clopen.clone());
        engine.on_snapshot_replaced(listing.snapshot(&SearchFilter::all(), Some(&clopen)).unwrap());
        click(&mut engine, "2");
        click(&mut engine, "5");
    }

    let persisted = ClopenMap::from_json(&clopen.to_json().unwrap()).unwrap();
    let mut engine = Engine::new(bounded(2)).with_clopen(persisted.clone());
    let outcome = engine.on_snapshot_replaced(
        listing
            .snapshot(&SearchFilter::all(), Some(&persisted))
            .unwrap(),
    );

    assert_eq!(
        outcome.adopted,
        vec![NodeKey::from("2"), NodeKey::from("5")]
    );
    assert_eq!(selected_keys(&engine), vec!["2", "5"]);
    let view = engine.view();
    assert!(find_view(&view, "1").unwrap().is_expanded);
    assert!(find_view(&view, "4").unwrap().is_expanded);
}
