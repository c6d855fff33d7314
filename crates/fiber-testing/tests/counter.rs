use fiber_core::{AttrValue, Attributes, EffectTag, Element, RenderScope};
use fiber_testing::{run_test_root, HostOp, TestRoot};

fn counter(scope: &mut RenderScope<'_>, _: &Attributes) -> Element {
    let (first, set_first) = scope.use_state(1_i64);
    let (second, set_second) = scope.use_state(2_i64);
    Element::host("div")
        .with_child(
            Element::host("h1")
                .with_attr("style", "user-select: none")
                .on("Click", move |_| set_first.update(|count| count + 1))
                .with_children(["Count: ".to_owned(), first.to_string()]),
        )
        .with_child(
            Element::host("h2")
                .with_attr("style", "user-select: none")
                .on("Click", move |_| set_second.update(|count| count + 1))
                .with_children(["Count: ".to_owned(), second.to_string()]),
        )
}

fn mounted() -> TestRoot {
    let mut root = TestRoot::new();
    root.mount(Element::component(counter)).expect("mount");
    root
}

#[test]
fn initial_render_shows_both_counters() {
    let root = mounted();
    assert_eq!(root.text(), "Count: 1Count: 2");

    let heading = root.find("h1").expect("h1");
    let memory = root.memory();
    assert_eq!(
        memory.attribute(heading, "style"),
        Some(&AttrValue::from("user-select: none"))
    );
    assert_eq!(memory.node(heading).expect("node").listener_count("click"), 1);
}

#[test]
fn clicks_update_only_their_own_counter() {
    let mut root = mounted();

    assert_eq!(root.click("h1"), 1);
    root.settle().expect("rerender");
    assert_eq!(root.text(), "Count: 2Count: 2");

    assert_eq!(root.click("h2"), 1);
    assert_eq!(root.click("h2"), 1);
    root.settle().expect("rerender");
    assert_eq!(root.text(), "Count: 2Count: 4");
}

#[test]
fn click_rerender_touches_only_the_changed_text_and_listeners() {
    let mut root = mounted();
    let heading = root.find("h1").expect("h1");
    root.take_journal();

    root.click("h1");
    root.settle().expect("rerender");

    assert_eq!(root.find("h1"), Some(heading), "host node reused");
    let journal = root.take_journal();
    assert!(journal.iter().all(|op| !op.is_structural()), "{journal:?}");
    assert!(journal
        .iter()
        .all(|op| !matches!(op, HostOp::CreateNode { .. })));

    let text_updates = journal
        .iter()
        .filter(|op| matches!(op, HostOp::SetAttribute { name, .. } if name == "nodeValue"))
        .count();
    assert_eq!(text_updates, 1);

    let report = root.root().last_commit().expect("commit");
    assert_eq!(report.count(EffectTag::Placement), 0);
    assert_eq!(report.count(EffectTag::Deletion), 0);
}

#[test]
fn clicks_between_slices_are_folded_into_the_restarted_render() {
    run_test_root(|root| {
        root.mount(Element::component(counter)).expect("mount");

        root.click("h1");
        root.tick_units(2).expect("partial render");
        assert!(root.root().has_pending_work());
        assert_eq!(root.text(), "Count: 1Count: 2", "host untouched mid-render");

        root.click("h1");
        root.settle_in_units(3).expect("finish");
        assert_eq!(root.text(), "Count: 3Count: 2");
    });
}
