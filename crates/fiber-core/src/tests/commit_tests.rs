use std::cell::Cell;
use std::time::Duration;

use super::*;
use crate::element::Element;
use crate::fiber::Fiber;
use crate::hooks::RenderScope;
use crate::element::EventHandler;
use crate::host::{HostError, HostKind, MemoryHost};
use crate::work_loop::{Phase, TickOutcome};

fn mount() -> (RenderRoot<MemoryHost>, NodeId) {
    let mut host = MemoryHost::new();
    let container = host.create_container();
    (RenderRoot::new(host, container), container)
}

fn commit(root: &mut RenderRoot<MemoryHost>, element: Element) -> CommitReport {
    root.render(element);
    while root.has_pending_work() {
        root.tick(&|| Duration::from_millis(50)).expect("commit failed");
    }
    root.last_commit().cloned().expect("a commit happened")
}

#[test]
fn first_commit_places_elements_under_the_container() {
    let (mut root, container) = mount();
    let report = commit(
        &mut root,
        Element::host("div").with_attr("id", "foo").with_child("hi"),
    );

    assert_eq!(report.labels(EffectTag::Placement), vec!["div", "#text"]);
    assert_eq!(report.count(EffectTag::Deletion), 0);

    let div = root.host().find_element(container, "div").expect("div placed");
    assert_eq!(root.host().children(container), &[div]);
    assert_eq!(root.host().attribute(div, "id"), Some(&AttrValue::from("foo")));
    assert_eq!(root.host().text_content(container), "hi");
}

#[test]
fn identical_rerender_issues_no_host_calls() {
    let (mut root, container) = mount();
    let tree = || {
        Element::host("div")
            .with_attr("class", "box")
            .with_child(Element::host("b").with_child("x"))
    };
    commit(&mut root, tree());
    let before = root.host().len();

    let report = commit(&mut root, tree());
    assert_eq!(report.count(EffectTag::Placement), 0);
    assert_eq!(report.count(EffectTag::Deletion), 0);
    assert_eq!(report.count(EffectTag::Update), 3);
    assert_eq!(report.attribute_ops(), 0);
    assert_eq!(root.host().len(), before, "no host nodes were created");
    assert_eq!(root.host().text_content(container), "x");
}

#[test]
fn changed_attribute_is_set_on_the_same_node() {
    let (mut root, container) = mount();
    commit(&mut root, Element::host("input").with_attr("value", "a"));
    let input = root.host().find_element(container, "input").expect("input");

    let report = commit(&mut root, Element::host("input").with_attr("value", "b"));
    assert_eq!(root.host().find_element(container, "input"), Some(input));
    assert_eq!(root.host().attribute(input, "value"), Some(&AttrValue::from("b")));
    assert_eq!(report.attribute_ops(), 1);
}

#[test]
fn vanished_attribute_is_removed() {
    let (mut root, container) = mount();
    commit(
        &mut root,
        Element::host("a").with_attr("href", "/x").with_attr("title", "t"),
    );
    commit(&mut root, Element::host("a").with_attr("href", "/x"));

    let link = root.host().find_element(container, "a").expect("a");
    assert_eq!(root.host().attribute(link, "title"), None);
    assert_eq!(root.host().attribute(link, "href"), Some(&AttrValue::from("/x")));
}

#[test]
fn swapped_handler_replaces_the_listener() {
    let (mut root, container) = mount();
    let first = Rc::new(Cell::new(0));
    let second = Rc::new(Cell::new(0));

    let hits = Rc::clone(&first);
    commit(
        &mut root,
        Element::host("button").on("Click", move |_| hits.set(hits.get() + 1)),
    );
    let hits = Rc::clone(&second);
    commit(
        &mut root,
        Element::host("button").on("Click", move |_| hits.set(hits.get() + 1)),
    );

    let button = root.host().find_element(container, "button").expect("button");
    let node = root.host().node(button).expect("node");
    assert_eq!(node.listener_count("click"), 1);
    assert_eq!(node.attributes().get("onClick"), None);

    assert_eq!(root.host().dispatch_event(button, "click"), 1);
    assert_eq!(first.get(), 0);
    assert_eq!(second.get(), 1);
}

#[test]
fn dropped_handler_is_unregistered() {
    let (mut root, container) = mount();
    commit(&mut root, Element::host("button").on("Click", |_| {}));
    commit(&mut root, Element::host("button"));
    let button = root.host().find_element(container, "button").expect("button");
    assert_eq!(root.host().dispatch_event(button, "click"), 0);
}

#[test]
fn kind_change_removes_old_node_before_placing_new_one() {
    let (mut root, container) = mount();
    commit(&mut root, Element::host("p").with_child("old"));
    let old = root.host().find_element(container, "p").expect("p");

    let report = commit(&mut root, Element::host("span").with_child("new"));
    assert_eq!(report.effects()[0].effect, EffectTag::Deletion);
    assert_eq!(report.effects()[0].label, "p");
    assert_eq!(report.labels(EffectTag::Placement), vec!["span", "#text"]);

    let span = root.host().find_element(container, "span").expect("span");
    assert_eq!(root.host().children(container), &[span]);
    assert_eq!(root.host().node(old).and_then(|node| node.parent()), None);
    assert_eq!(root.host().text_content(container), "new");
}

#[test]
fn shrinking_a_list_removes_trailing_nodes() {
    let (mut root, container) = mount();
    let items = ["1", "2", "3"].map(|n| Element::host("li").with_child(n));
    commit(&mut root, Element::host("ul").with_children(items));
    let report = commit(
        &mut root,
        Element::host("ul").with_child(Element::host("li").with_child("1")),
    );

    assert_eq!(report.count(EffectTag::Deletion), 2);
    let ul = root.host().find_element(container, "ul").expect("ul");
    assert_eq!(root.host().children(ul).len(), 1);
    assert_eq!(root.host().text_content(container), "1");
}

fn badge(_: &mut RenderScope<'_>, attributes: &Attributes) -> Element {
    let label = attributes
        .get("label")
        .and_then(AttrValue::as_text)
        .unwrap_or("?")
        .to_owned();
    Element::host("em").with_child(label)
}

#[test]
fn deleting_a_component_removes_its_host_descendants() {
    let (mut root, container) = mount();
    commit(
        &mut root,
        Element::host("div").with_child(Element::component(badge).with_attr("label", "new")),
    );
    let div = root.host().find_element(container, "div").expect("div");
    assert_eq!(root.host().text_content(container), "new");

    let report = commit(&mut root, Element::host("div"));
    assert_eq!(report.count(EffectTag::Deletion), 1);
    assert!(root.host().children(div).is_empty());
    assert_eq!(root.host().find_element(container, "em"), None);
}

#[test]
fn component_children_attach_to_nearest_host_ancestor() {
    let (mut root, container) = mount();
    commit(&mut root, Element::component(badge).with_attr("label", "top"));
    let em = root.host().find_element(container, "em").expect("em");
    assert_eq!(root.host().children(container), &[em]);
}

#[test]
fn rejected_attribute_does_not_abort_the_commit() {
    let (mut root, container) = mount();
    let opaque = AttrValue::Opaque(Rc::new(42_u8));
    let report = commit(&mut root, Element::host("canvas").with_attr("data", opaque));

    assert_eq!(report.labels(EffectTag::Placement), vec!["canvas"]);
    let canvas = root.host().find_element(container, "canvas").expect("canvas");
    assert_eq!(root.host().attribute(canvas, "data"), None);
}

#[test]
fn orphaned_fiber_reports_malformed_tree() {
    let (mut root, _) = mount();
    commit(&mut root, Element::host("div"));
    let current = root.current_root().expect("committed");

    let stale = root.fibers.insert(Fiber::placement(&Element::host("x"), current));
    root.fibers.remove(stale);
    let orphan = root.fibers.insert(Fiber::placement(&Element::host("y"), stale));
    assert_eq!(
        root.host_parent(orphan),
        Err(FiberError::MalformedTree { fiber: orphan })
    );

    root.fibers[orphan].parent = None;
    assert_eq!(
        root.host_parent(orphan),
        Err(FiberError::MalformedTree { fiber: orphan })
    );
}

/// Memory host whose next `remove_child` is rejected.
struct FailingRemoveHost {
    memory: MemoryHost,
    fail_next_remove: bool,
}

impl HostAdapter for FailingRemoveHost {
    fn create_node(&mut self, kind: HostKind<'_>) -> Result<NodeId, HostError> {
        self.memory.create_node(kind)
    }

    fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), HostError> {
        self.memory.set_attribute(node, name, value)
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), HostError> {
        self.memory.remove_attribute(node, name)
    }

    fn add_event_listener(
        &mut self,
        node: NodeId,
        category: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        self.memory.add_event_listener(node, category, handler)
    }

    fn remove_event_listener(
        &mut self,
        node: NodeId,
        category: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        self.memory.remove_event_listener(node, category, handler)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        self.memory.append_child(parent, child)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        if std::mem::take(&mut self.fail_next_remove) {
            return Err(HostError::NotAChild { parent, child });
        }
        self.memory.remove_child(parent, child)
    }
}

#[test]
fn failed_commit_drops_the_work_in_progress_tree() {
    let mut memory = MemoryHost::new();
    let container = memory.create_container();
    let host = FailingRemoveHost {
        memory,
        fail_next_remove: false,
    };
    let mut root = RenderRoot::new(host, container);
    let unlimited = || Duration::from_millis(50);

    root.render(Element::host("p").with_child("old"));
    while root.has_pending_work() {
        root.tick(&unlimited).expect("mount");
    }
    let committed = root.current_root().expect("committed");
    let live_fibers = root.fibers.len();
    let first_commit = root.last_commit().cloned();

    root.host_mut().fail_next_remove = true;
    root.render(Element::host("span").with_child("new"));
    assert!(matches!(root.tick(&unlimited), Err(FiberError::Host(_))));

    assert_eq!(root.phase(), Phase::Idle);
    assert!(!root.has_pending_work());
    assert_eq!(root.work_in_progress_root(), None);
    assert_eq!(root.current_root(), Some(committed));
    assert!(root.fibers.is_alive(committed));
    assert_eq!(root.fibers.len(), live_fibers);
    assert!(root.deletions.is_empty());

    assert!(matches!(root.tick(&unlimited), Ok(TickOutcome::Idle)));
    assert_eq!(root.last_commit().cloned(), first_commit);
    assert_eq!(root.host().memory.text_content(container), "old");

    root.render(Element::host("span").with_child("new"));
    while root.has_pending_work() {
        root.tick(&unlimited).expect("remount");
    }
    assert_eq!(root.host().memory.text_content(container), "new");
    assert_eq!(root.host().memory.children(container).len(), 1);
}
