use std::time::Duration;

use fiber_core::{
    Attributes, Element, FiberError, MemoryHost, RenderRoot, RenderScope, TickOutcome,
};
use fiber_runtime_std::StdRuntime;

const SLOT_BUDGET: Duration = Duration::from_micros(200);

fn counter(scope: &mut RenderScope<'_>, _: &Attributes) -> Element {
    let (first, set_first) = scope.use_state(1_i64);
    let (second, set_second) = scope.use_state(2_i64);
    Element::host("div")
        .with_child(
            Element::host("h1")
                .with_attr("style", "user-select: none")
                .on("Click", move |_| {
                    log::info!("increase first counter");
                    set_first.update(|count| count + 1);
                })
                .with_children(["Count: ".to_owned(), first.to_string()]),
        )
        .with_child(
            Element::host("h2")
                .with_attr("style", "user-select: none")
                .on("Click", move |_| {
                    log::info!("increase second counter");
                    set_second.update(|count| count + 1);
                })
                .with_children(["Count: ".to_owned(), second.to_string()]),
        )
}

/// Ticks while the scheduler keeps asking for idle slots.
fn drive(runtime: &StdRuntime, root: &mut RenderRoot<MemoryHost>) -> Result<(), FiberError> {
    let mut slots = 0;
    while runtime.take_idle_slot_request() {
        match runtime.run_tick(root)? {
            TickOutcome::Committed { processed, report } => {
                log::info!(
                    "committed after {} slots: {processed} fibers in last slot, {} effects",
                    slots + 1,
                    report.effects().len()
                );
            }
            TickOutcome::Yielded { processed } => log::debug!("yielded after {processed} fibers"),
            TickOutcome::Idle => {}
        }
        slots += 1;
    }
    Ok(())
}

fn click(root: &RenderRoot<MemoryHost>, tag: &str) {
    let host = root.host();
    match host.find_element(root.container(), tag) {
        Some(node) => {
            host.dispatch_event(node, "click");
        }
        None => log::warn!("no <{tag}> to click"),
    }
}

fn main() {
    env_logger::init();

    println!("=== fiber-rs counter ===");
    println!("Two independent counters, clicked through the in-memory host.");
    println!();

    let runtime = StdRuntime::with_slot_budget(SLOT_BUDGET);
    let mut host = MemoryHost::new();
    let container = host.create_container();
    let mut root = RenderRoot::with_runtime(host, container, runtime.runtime());

    root.render(Element::component(counter));
    if let Err(err) = drive(&runtime, &mut root) {
        log::error!("initial render failed: {err}");
        return;
    }
    print!("{}", root.host().dump_tree(container));

    for tag in ["h1", "h1", "h2", "h1"] {
        println!();
        println!("click <{tag}>");
        click(&root, tag);
        if let Err(err) = drive(&runtime, &mut root) {
            log::error!("rerender failed: {err}");
            return;
        }
        print!("{}", root.host().dump_tree(container));
    }
}
