use std::time::Duration;

use super::*;
use crate::element::{Attributes, Element};
use crate::host::MemoryHost;
use crate::runtime::Runtime;
use crate::RenderRoot;

fn render_once<T: Clone + 'static>(
    previous: &[Rc<dyn Any>],
    runtime: &Runtime,
    initial: T,
) -> (T, SetState<T>, Vec<Rc<dyn Any>>) {
    let mut scope = RenderScope::new(previous, runtime.handle());
    let (value, setter) = scope.use_state(initial);
    (value, setter, scope.into_hooks())
}

#[test]
fn first_render_uses_initial_value() {
    let runtime = Runtime::default();
    let (value, setter, hooks) = render_once(&[], &runtime, 7_i64);
    assert_eq!(value, 7);
    assert_eq!(hooks.len(), 1);
    assert!(setter.is_mounted());
    assert!(!runtime.has_render_request());
}

#[test]
fn queued_updates_fold_in_enqueue_order() {
    let runtime = Runtime::default();
    let (_, setter, hooks) = render_once(&[], &runtime, 1_i64);

    setter.update(|value| value * 2);
    setter.update(|value| value + 3);
    assert!(runtime.has_render_request());
    assert_eq!(runtime.request_count(), 2);

    let (value, _, _) = render_once(&hooks, &runtime, 100_i64);
    assert_eq!(value, 5);
}

#[test]
fn reading_a_queue_does_not_drain_it() {
    let runtime = Runtime::default();
    let (_, setter, hooks) = render_once(&[], &runtime, String::from("a"));
    setter.update(|value| format!("{value}b"));

    let (first, _, _) = render_once(&hooks, &runtime, String::new());
    let (second, _, _) = render_once(&hooks, &runtime, String::new());
    assert_eq!(first, "ab");
    assert_eq!(second, "ab", "an abandoned render must not consume updates");
}

#[test]
fn set_replaces_the_value() {
    let runtime = Runtime::default();
    let (_, setter, hooks) = render_once(&[], &runtime, 3_i64);
    setter.update(|value| value + 1);
    setter.set(10);
    let (value, _, _) = render_once(&hooks, &runtime, 0_i64);
    assert_eq!(value, 10);
}

#[test]
fn type_change_at_an_index_starts_from_initial() {
    let runtime = Runtime::default();
    let (_, _, hooks) = render_once(&[], &runtime, 3_i64);
    let (value, _, _) = render_once(&hooks, &runtime, String::from("fresh"));
    assert_eq!(value, "fresh");
}

#[test]
fn setter_outliving_its_hook_still_requests_render() {
    let runtime = Runtime::default();
    let (_, setter, hooks) = render_once(&[], &runtime, 0_i64);
    drop(hooks);

    assert!(!setter.is_mounted());
    setter.set(5);
    assert!(runtime.take_render_request());
}

#[test]
fn handle_reports_requests_until_the_runtime_is_dropped() {
    let runtime = Runtime::default();
    let handle = runtime.handle();
    let (_, setter, _hooks) = render_once(&[], &runtime, 0_i64);
    assert!(handle.is_alive());
    assert!(!handle.has_render_request());

    setter.set(1);
    assert!(handle.has_render_request());
    assert!(runtime.take_render_request());
    assert!(!handle.has_render_request());

    drop(runtime);
    assert!(!handle.is_alive());
    assert!(!handle.has_render_request());
    setter.set(2);
    assert!(!handle.has_render_request());
}

thread_local! {
    static COUNTERS: std::cell::RefCell<Option<(SetState<i64>, SetState<i64>)>> =
        const { std::cell::RefCell::new(None) };
}

fn two_counters(scope: &mut RenderScope<'_>, _: &Attributes) -> Element {
    let (first, set_first) = scope.use_state(1_i64);
    let (second, set_second) = scope.use_state(10_i64);
    COUNTERS.with(|slot| *slot.borrow_mut() = Some((set_first, set_second)));
    Element::host("p").with_child(format!("{first}/{second}"))
}

fn settle(root: &mut RenderRoot<MemoryHost>) {
    while root.has_pending_work() {
        root.tick(&|| Duration::from_millis(16)).expect("tick failed");
    }
}

#[test]
fn hooks_persist_per_index_across_commits() {
    let mut host = MemoryHost::new();
    let container = host.create_container();
    let mut root = RenderRoot::new(host, container);
    root.render(Element::component(two_counters));
    settle(&mut root);
    assert_eq!(root.host().text_content(container), "1/10");

    for _ in 0..3 {
        let (_, set_second) = COUNTERS
            .with(|slot| slot.borrow().clone())
            .expect("component rendered");
        set_second.update(|value| value + 1);
        settle(&mut root);
    }
    assert_eq!(root.host().text_content(container), "1/13");

    let (set_first, _) = COUNTERS
        .with(|slot| slot.borrow().clone())
        .expect("component rendered");
    set_first.update(|value| value + 1);
    set_first.update(|value| value + 1);
    settle(&mut root);
    assert_eq!(root.host().text_content(container), "3/13");
}
