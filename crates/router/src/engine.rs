//! Router engine - matcher, gate and mapper on the receive path
//!
//! Everything here is synchronous and cheap; reaction calls are handed to the
//! dispatcher's worker pool.

use std::sync::Arc;
use std::time::Instant;

use contracts::{OscEvent, OscEventCallback};
use dispatcher::Dispatcher;
use observability::{RouteMetricsAggregator, RouteSummary};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::gate::{GateDecision, SuppressReason};
use crate::mapper::map_value;
use crate::table::RoutingTable;

/// What happened to one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Event carried no arguments
    NoArguments,
    /// No contact matched the address
    Unmatched,
    /// Contact matched but the gate held the event back
    Suppressed {
        contact_id: String,
        reason: SuppressReason,
    },
    /// Gate opened; `dispatched` jobs were queued
    Routed { contact_id: String, dispatched: usize },
}

impl RouteOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoArguments => "no_arguments",
            Self::Unmatched => "unmatched",
            Self::Suppressed { .. } => "suppressed",
            Self::Routed { .. } => "routed",
        }
    }
}

/// Event router
pub struct Router {
    table: Arc<RoutingTable>,
    dispatcher: Arc<Dispatcher>,
    stats: Mutex<RouteMetricsAggregator>,
}

impl Router {
    pub fn new(table: Arc<RoutingTable>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            table,
            dispatcher,
            stats: Mutex::new(RouteMetricsAggregator::new()),
        }
    }

    pub fn table(&self) -> &Arc<RoutingTable> {
        &self.table
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Route one event using the current time
    pub fn handle_event(&self, event: &OscEvent) -> RouteOutcome {
        self.handle_event_at(event, Instant::now())
    }

    /// Route one event as if it arrived at `now`
    pub fn handle_event_at(&self, event: &OscEvent, now: Instant) -> RouteOutcome {
        let outcome = self.route(event, now);
        observability::record_route_outcome(outcome.label());
        outcome
    }

    fn route(&self, event: &OscEvent, now: Instant) -> RouteOutcome {
        let Some(raw) = event.value() else {
            debug!(address = %event.address, "Event without arguments dropped");
            self.stats.lock().record_empty();
            return RouteOutcome::NoArguments;
        };

        let snapshot = self.table.snapshot();
        let Some(contact) = snapshot.match_contact(&event.address) else {
            debug!(address = %event.address, "No contact for address");
            self.stats.lock().record_unmatched();
            return RouteOutcome::Unmatched;
        };
        let Some(gate) = snapshot.gate(&contact.id) else {
            warn!(contact_id = %contact.id, "Contact has no gate state");
            self.stats.lock().record_unmatched();
            return RouteOutcome::Unmatched;
        };

        let bindings = snapshot.bindings_for(&contact.id);
        let decision = gate.lock().evaluate(contact, bindings, raw, now);

        let selected = match decision {
            GateDecision::Suppressed(reason) => {
                debug!(
                    contact_id = %contact.id,
                    value = %raw,
                    reason = reason.as_str(),
                    "Event suppressed by gate"
                );
                observability::record_gate_suppressed(&contact.id, reason.as_str());
                self.stats.lock().record_suppressed();
                return RouteOutcome::Suppressed {
                    contact_id: contact.id.clone(),
                    reason,
                };
            }
            GateDecision::Propagate(selected) => selected,
        };

        let modules = self.table.modules();
        let mut queued = Vec::with_capacity(selected.len());

        for binding in selected.into_iter().filter_map(|i| bindings.get(i)) {
            let intensity = map_value(raw, binding);
            observability::record_mapped_intensity(&contact.id, intensity);

            let status = self
                .dispatcher
                .dispatch(&modules, Arc::clone(binding), intensity);
            if status.is_queued() {
                queued.push(intensity);
            }
            trace!(
                contact_id = %contact.id,
                module = %binding.module_name,
                reaction = %binding.reaction_type,
                intensity,
                status = ?status,
                "Binding dispatched"
            );
        }

        let dispatched = queued.len();
        {
            let mut stats = self.stats.lock();
            stats.record_routed(&contact.id);
            for intensity in queued {
                stats.record_dispatch(intensity);
            }
        }

        debug!(
            address = %event.address,
            contact_id = %contact.id,
            value = %raw,
            dispatched,
            "Event routed"
        );

        RouteOutcome::Routed {
            contact_id: contact.id.clone(),
            dispatched,
        }
    }

    /// Listener callback feeding this router
    pub fn listener_callback(self: &Arc<Self>) -> OscEventCallback {
        let router = Arc::clone(self);
        Arc::new(move |event: &OscEvent| {
            router.handle_event(event);
        })
    }

    /// Aggregated routing statistics since start
    pub fn stats(&self) -> RouteSummary {
        self.stats.lock().summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    use contracts::{Binding, Contact, ContractError, CurveType, OscArg, ReactionSink};
    use dispatcher::{DispatcherConfig, ModuleRegistry};

    /// Records (binding, intensity) for every call
    #[derive(Default)]
    struct RecordingModule {
        calls: Mutex<Vec<(Binding, f64)>>,
    }

    impl ReactionSink for RecordingModule {
        fn name(&self) -> &str {
            "recorder"
        }

        fn supports(&self, reaction_type: &str) -> bool {
            reaction_type == "vibrate"
        }

        fn react(&self, _reaction_type: &str, binding: &Binding, intensity: f64) -> Result<(), ContractError> {
            self.calls.lock().push((binding.clone(), intensity));
            Ok(())
        }
    }

    struct Harness {
        router: Arc<Router>,
        module: Arc<RecordingModule>,
    }

    impl Harness {
        fn new(contacts: Vec<Contact>, bindings: Vec<Binding>) -> Self {
            let module = Arc::new(RecordingModule::default());
            let table = Arc::new(RoutingTable::new());
            table.update(contacts, bindings).unwrap();
            table.update_modules(ModuleRegistry::new().with(module.clone()));

            let dispatcher = Arc::new(Dispatcher::spawn(DispatcherConfig::default()));
            Self {
                router: Arc::new(Router::new(table, dispatcher)),
                module,
            }
        }

        async fn settle(&self) -> Vec<(Binding, f64)> {
            let metrics = self.router.dispatcher().metrics();
            let deadline = Instant::now() + Duration::from_secs(5);
            while metrics.finished_count() < metrics.submitted_count() {
                assert!(Instant::now() < deadline, "dispatch did not settle");
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            self.module.calls.lock().clone()
        }
    }

    fn at(base: Instant, s: f64) -> Instant {
        base + Duration::from_secs_f64(s)
    }

    #[tokio::test]
    async fn test_routes_mapped_intensity() {
        let harness = Harness::new(
            vec![Contact::new("Hand", "Hand")],
            vec![Binding::new("Hand", "recorder")
                .with_mapping((0.0, 10.0), (0.0, 1.0), CurveType::Linear)
                .continuous()],
        );

        let outcome = harness
            .router
            .handle_event(&OscEvent::single("/avatar/parameters/Hand", 5.0));
        assert_eq!(
            outcome,
            RouteOutcome::Routed {
                contact_id: "Hand".into(),
                dispatched: 1
            }
        );

        let calls = harness.settle().await;
        assert_eq!(calls.len(), 1);
        assert!((calls[0].1 - 0.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_unknown_address_leaves_gates_untouched() {
        let harness = Harness::new(
            vec![Contact::new("Hand", "Hand"), Contact::new("Head", "Head")],
            vec![Binding::new("Hand", "recorder")],
        );

        let outcome = harness
            .router
            .handle_event(&OscEvent::single("/avatar/parameters/Foot", 1.0));
        assert_eq!(outcome, RouteOutcome::Unmatched);

        let snapshot = harness.router.table().snapshot();
        for contact in snapshot.contacts() {
            assert!(snapshot.gate_state(&contact.id).unwrap().is_idle());
        }
        assert!(harness.settle().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_arguments_dropped() {
        let harness = Harness::new(vec![Contact::new("Hand", "Hand")], vec![]);
        let outcome = harness
            .router
            .handle_event(&OscEvent::new("/avatar/parameters/Hand", vec![]));
        assert_eq!(outcome, RouteOutcome::NoArguments);
        assert!(harness.router.table().snapshot().gate_state("Hand").unwrap().is_idle());
    }

    #[tokio::test]
    async fn test_pulse_sequence_dispatches_rising_edges() {
        let harness = Harness::new(
            vec![Contact::new("Hand", "Hand")],
            vec![Binding::new("Hand", "recorder")],
        );

        let dispatched: Vec<usize> = [0, 1, 1, 0, 1]
            .iter()
            .enumerate()
            .filter_map(|(i, v)| {
                match harness
                    .router
                    .handle_event(&OscEvent::single("/avatar/parameters/Hand", OscArg::Int(*v)))
                {
                    RouteOutcome::Routed { dispatched: 1, .. } => Some(i),
                    _ => None,
                }
            })
            .collect();
        assert_eq!(dispatched, vec![1, 4]);
        assert_eq!(harness.settle().await.len(), 2);
    }

    #[tokio::test]
    async fn test_cooldown_with_stop_signal() {
        let harness = Harness::new(
            vec![Contact::new("Hand", "Hand").with_cooldown(2.0)],
            vec![Binding::new("Hand", "recorder").continuous()],
        );
        let router = &harness.router;
        let addr = "/avatar/parameters/Hand";
        let t0 = Instant::now();

        assert!(matches!(
            router.handle_event_at(&OscEvent::single(addr, 1.0), t0),
            RouteOutcome::Routed { dispatched: 1, .. }
        ));
        assert!(matches!(
            router.handle_event_at(&OscEvent::single(addr, 1.0), at(t0, 1.0)),
            RouteOutcome::Suppressed {
                reason: SuppressReason::Cooldown,
                ..
            }
        ));
        assert!(matches!(
            router.handle_event_at(&OscEvent::single(addr, false), at(t0, 1.0)),
            RouteOutcome::Routed { dispatched: 1, .. }
        ));
        assert!(matches!(
            router.handle_event_at(&OscEvent::single(addr, 1.0), at(t0, 2.1)),
            RouteOutcome::Routed { dispatched: 1, .. }
        ));

        let intensities: Vec<f64> = harness.settle().await.into_iter().map(|(_, i)| i).collect();
        assert_eq!(intensities.len(), 3);
        assert!(intensities.contains(&0.0));

        let stats = router.stats();
        assert_eq!(stats.suppressed_events, 1);
        assert_eq!(stats.dispatched_reactions, 3);
    }

    #[tokio::test]
    async fn test_update_resets_gate_state() {
        let harness = Harness::new(
            vec![Contact::new("Hand", "Hand")],
            vec![Binding::new("Hand", "recorder")],
        );
        let event = OscEvent::single("/avatar/parameters/Hand", true);

        assert!(matches!(harness.router.handle_event(&event), RouteOutcome::Routed { .. }));
        assert!(matches!(harness.router.handle_event(&event), RouteOutcome::Suppressed { .. }));

        harness
            .router
            .table()
            .update(
                vec![Contact::new("Hand", "Hand")],
                vec![Binding::new("Hand", "recorder")],
            )
            .unwrap();

        assert!(matches!(harness.router.handle_event(&event), RouteOutcome::Routed { .. }));
        assert_eq!(harness.settle().await.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_module_is_not_counted() {
        let harness = Harness::new(
            vec![Contact::new("Hand", "Hand")],
            vec![
                Binding::new("Hand", "recorder").continuous(),
                Binding::new("Hand", "absent").continuous(),
            ],
        );

        let outcome = harness
            .router
            .handle_event(&OscEvent::single("/avatar/parameters/Hand", 0.4));
        assert_eq!(
            outcome,
            RouteOutcome::Routed {
                contact_id: "Hand".into(),
                dispatched: 1
            }
        );
        assert_eq!(harness.router.dispatcher().metrics().unresolved_count(), 1);

        let stats = harness.router.stats();
        assert_eq!(stats.routed_events, 1);
        assert_eq!(stats.dispatched_reactions, 1);
        assert_eq!(stats.intensity.count, 1);
        assert!((stats.intensity.mean - 0.4).abs() < 1e-6);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stats_consistent_under_parallel_routing() {
        let contacts: Vec<Contact> = (0..4).map(|i| Contact::new("c", format!("c{i}"))).collect();
        let bindings: Vec<Binding> = (0..4)
            .flat_map(|i| {
                [
                    Binding::new(format!("c{i}"), "recorder").continuous(),
                    Binding::new(format!("c{i}"), "recorder").continuous(),
                ]
            })
            .collect();
        let harness = Harness::new(contacts, bindings);

        std::thread::scope(|scope| {
            for i in 0..4 {
                let router = &harness.router;
                scope.spawn(move || {
                    let address = format!("/avatar/parameters/c{i}");
                    for _ in 0..50 {
                        router.handle_event(&OscEvent::single(address.as_str(), 0.5));
                        let _ = router.stats();
                    }
                });
            }
        });

        let calls = harness.settle().await;
        assert_eq!(calls.len(), 400);

        let stats = harness.router.stats();
        assert_eq!(stats.routed_events, 200);
        assert_eq!(stats.dispatched_reactions, 400);
        assert_eq!(stats.contact_counts.get("c2"), Some(&50));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_never_expose_partial_tables() {
        let snapshot_a = (
            vec![Contact::new("Hand", "Hand")],
            vec![
                Binding::new("Hand", "recorder").with_device("a-1", "A").continuous(),
                Binding::new("Hand", "recorder").with_device("a-2", "A").continuous(),
            ],
        );
        let snapshot_b = (
            vec![Contact::new("Hand", "Hand").with_cooldown(0.0)],
            vec![Binding::new("Hand", "recorder").with_device("b-1", "B").continuous()],
        );
        let known: HashSet<String> = ["a-1", "a-2", "b-1"].iter().map(|s| s.to_string()).collect();

        let harness = Harness::new(snapshot_a.0.clone(), snapshot_a.1.clone());
        let router = Arc::clone(&harness.router);

        std::thread::scope(|scope| {
            let updater = {
                let router = Arc::clone(&router);
                let (a, b) = (snapshot_a.clone(), snapshot_b.clone());
                scope.spawn(move || {
                    for i in 0..200 {
                        let (contacts, bindings) = if i % 2 == 0 { b.clone() } else { a.clone() };
                        router.table().update(contacts, bindings).unwrap();
                    }
                })
            };

            let senders: Vec<_> = (0..4)
                .map(|_| {
                    let router = Arc::clone(&router);
                    scope.spawn(move || {
                        for i in 0..250 {
                            let event = OscEvent::single("/avatar/parameters/Hand", (i % 10) as f64 / 10.0);
                            match router.handle_event(&event) {
                                RouteOutcome::Routed { dispatched, .. } => {
                                    assert!(dispatched == 1 || dispatched == 2);
                                }
                                other => panic!("unexpected outcome {other:?}"),
                            }
                        }
                    })
                })
                .collect();

            updater.join().unwrap();
            for sender in senders {
                sender.join().unwrap();
            }
        });

        let calls = harness.settle().await;
        assert_eq!(calls.len() as u64, harness.router.dispatcher().metrics().submitted_count());
        assert!(calls.iter().all(|(binding, _)| known.contains(&binding.device_id)));
        harness.router.dispatcher().shutdown().await;
    }
}
