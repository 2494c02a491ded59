//! End-to-end engine scenarios, driven the way the content script drives the
//! real thing: schedule on mutation, fire the debounce timer, run the pass at
//! the next frame, feed back collected identifiers.

use pretty_assertions::assert_eq;
use threadmark_core::collect::normalize_candidates;
use threadmark_core::identity::assign_identifier;
use threadmark_core::{PassOutcome, SyncEngine};

/// A fake page: messages are (node key, document position, recorded id).
#[derive(Debug, Clone, Default)]
struct FakePage {
    messages: Vec<FakeMessage>,
}

#[derive(Debug, Clone)]
struct FakeMessage {
    node: u32,
    position: u32,
    recorded_id: Option<String>,
    container_id: Option<String>,
}

impl FakePage {
    fn push(&mut self, node: u32, container_id: Option<&str>) {
        self.messages.push(FakeMessage {
            node,
            position: node,
            recorded_id: None,
            container_id: container_id.map(ToOwned::to_owned),
        });
    }

    /// One collect → normalize → assign pass over the fake DOM.
    fn collect_ids(&mut self, entropy_counter: &mut u32) -> Vec<String> {
        let candidates = self.messages.iter().map(|message| message.node).collect();
        let ordered = normalize_candidates(
            candidates,
            |a: &u32, b: &u32| a == b,
            |a, b| {
                let pos = |node: &u32| {
                    self.messages
                        .iter()
                        .find(|message| message.node == *node)
                        .map(|message| message.position)
                        .expect("candidate nodes come from the page")
                };
                pos(a).cmp(&pos(b))
            },
        );

        ordered
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let message = self
                    .messages
                    .iter_mut()
                    .find(|message| message.node == *node)
                    .expect("ordered nodes come from the page");
                let assigned = assign_identifier(
                    message.recorded_id.as_deref(),
                    message.container_id.as_deref(),
                    index,
                    || {
                        *entropy_counter += 1;
                        format!("{entropy_counter:05x}")
                    },
                );
                if assigned.newly_assigned {
                    message.recorded_id = Some(assigned.id.clone());
                }
                assigned.id
            })
            .collect()
    }
}

fn run_pass(engine: &mut SyncEngine, page: &mut FakePage, entropy: &mut u32) -> Option<PassOutcome> {
    if !engine.begin_pass() {
        return None;
    }
    let ids = page.collect_ids(entropy);
    Some(engine.complete_pass(ids))
}

#[test]
fn mutation_burst_collapses_to_one_pass() {
    let mut engine = SyncEngine::new();
    let mut page = FakePage::default();
    let mut entropy = 0;
    for node in 0..10 {
        page.push(node, Some(&format!("turn-{node}")));
    }

    // Ten structural mutations inside the debounce window: each arms the
    // gate and supersedes the previous timer.
    let tokens = (0..10).map(|_| engine.schedule()).collect::<Vec<_>>();

    let mut passes = 0;
    for token in tokens {
        if engine.debounce_elapsed(token) {
            let outcome = run_pass(&mut engine, &mut page, &mut entropy)
                .expect("the gate should be free");
            assert_eq!(outcome, PassOutcome::Render { count: 10 });
            passes += 1;
        }
    }
    assert_eq!(passes, 1);
}

#[test]
fn overlapping_resync_is_a_noop_and_state_matches_a_single_pass() {
    let mut engine = SyncEngine::new();
    let mut page = FakePage::default();
    let mut entropy = 0;
    page.push(1, Some("turn-1"));
    page.push(2, Some("turn-2"));

    // First request enters the critical section; a second request arriving
    // mid-flight is dropped.
    assert!(engine.begin_pass());
    assert!(!engine.begin_pass());

    let ids = page.collect_ids(&mut entropy);
    assert_eq!(engine.complete_pass(ids), PassOutcome::Render { count: 2 });

    // A fresh pass over the same DOM settles to "unchanged": the dropped
    // request lost nothing.
    let outcome = run_pass(&mut engine, &mut page, &mut entropy)
        .expect("the gate should be free again");
    assert_eq!(outcome, PassOutcome::Unchanged { count: 2 });
}

#[test]
fn detached_messages_silently_drop_out_on_the_next_pass() {
    let mut engine = SyncEngine::new();
    let mut page = FakePage::default();
    let mut entropy = 0;
    page.push(1, Some("turn-1"));
    page.push(2, Some("turn-2"));
    page.push(3, Some("turn-3"));

    let outcome = run_pass(&mut engine, &mut page, &mut entropy).expect("gate free");
    assert_eq!(outcome, PassOutcome::Render { count: 3 });

    // Host removes the middle message.
    page.messages.retain(|message| message.node != 2);
    let outcome = run_pass(&mut engine, &mut page, &mut entropy).expect("gate free");
    assert_eq!(outcome, PassOutcome::Render { count: 2 });
    assert_eq!(
        engine.rendered_ids().to_vec(),
        vec!["tmk-id-turn-1".to_owned(), "tmk-id-turn-3".to_owned()]
    );
}

#[test]
fn route_change_forces_a_rerender_despite_colliding_identifiers() {
    let mut engine = SyncEngine::new();
    let mut page = FakePage::default();
    let mut entropy = 0;
    page.push(1, Some("turn-1"));

    assert!(!engine.observe_location("https://chat.example/c/alpha"));
    let outcome = run_pass(&mut engine, &mut page, &mut entropy).expect("gate free");
    assert_eq!(outcome, PassOutcome::Render { count: 1 });

    // Same-document navigation: the host page reuses identical container
    // ids on the new route.
    assert!(engine.observe_location("https://chat.example/c/beta"));
    let outcome = run_pass(&mut engine, &mut page, &mut entropy).expect("gate free");
    assert_eq!(
        outcome,
        PassOutcome::Render { count: 1 },
        "colliding identifiers must still re-render after a route change"
    );
}

#[test]
fn adapter_yielding_nothing_clears_the_panel_then_self_heals() {
    let mut engine = SyncEngine::new();
    let mut page = FakePage::default();
    let mut entropy = 0;
    page.push(1, None);
    page.push(2, None);

    let outcome = run_pass(&mut engine, &mut page, &mut entropy).expect("gate free");
    assert_eq!(outcome, PassOutcome::Render { count: 2 });

    // The host wipes the conversation (lazy route teardown).
    page.messages.clear();
    let outcome = run_pass(&mut engine, &mut page, &mut entropy).expect("gate free");
    assert_eq!(outcome, PassOutcome::Clear);

    // Messages stream back in; the next scheduled pass rebuilds.
    page.push(7, None);
    let outcome = run_pass(&mut engine, &mut page, &mut entropy).expect("gate free");
    assert_eq!(outcome, PassOutcome::Render { count: 1 });
}

#[test]
fn recorded_identifiers_keep_the_sequence_stable_across_passes() {
    let mut engine = SyncEngine::new();
    let mut page = FakePage::default();
    let mut entropy = 0;
    // No durable containers anywhere: first pass mints synthetic ids.
    page.push(1, None);
    page.push(2, None);

    let _ = run_pass(&mut engine, &mut page, &mut entropy).expect("gate free");
    let first = engine.rendered_ids().to_vec();

    // Because assignment is recorded on the node, an unchanged DOM
    // re-collects the same synthetic ids and the pass is a no-op.
    let outcome = run_pass(&mut engine, &mut page, &mut entropy).expect("gate free");
    assert_eq!(outcome, PassOutcome::Unchanged { count: 2 });
    assert_eq!(engine.rendered_ids(), first);
}
