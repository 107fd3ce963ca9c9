//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 回环 UDP e2e 测试（OscListener -> Router -> Dispatcher -> 模块）

#[cfg(test)]
mod contract_tests {
    use contracts::BridgeConfig;

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_config_file_loads_into_routing_table() {
        let json = r#"{
            "contacts": [
                { "name": "Left Hand", "id": "HandL", "osc_path": "/avatar/parameters/HandL" },
                { "name": "Head", "id": "Head", "cooldown": 0.25 }
            ],
            "bindings": [
                { "contact_id": "HandL", "module_name": "log" },
                { "contact_id": "Head", "module_name": "log", "reaction_type": "shock" }
            ],
            "modules": [ { "name": "log", "module_type": "log" } ]
        }"#;

        let config: BridgeConfig =
            config_loader::ConfigLoader::load_from_str(json, config_loader::ConfigFormat::Json).unwrap();
        let table = router::RoutingTable::new();
        table.update(config.contacts, config.bindings).unwrap();
        table.update_modules(dispatcher::create_registry(&config.modules).unwrap());

        let snapshot = table.snapshot();
        assert_eq!(snapshot.contacts().len(), 2);
        assert_eq!(snapshot.bindings_for("Head").len(), 1);
        assert!(snapshot.match_contact("/avatar/parameters/Head").is_some());
        assert!(table.modules().get("log").is_some());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::net::{SocketAddr, UdpSocket};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use contracts::{Binding, Contact, ContractError, ReactionSink};
    use dispatcher::{Dispatcher, DispatcherConfig, ModuleRegistry};
    use ingestion::{ListenerConfig, OscListener};
    use parking_lot::Mutex;
    use rosc::{encoder, OscBundle, OscMessage, OscPacket, OscTime, OscType};
    use router::{Router, RoutingTable};

    /// Records (contact, reaction, intensity) for every call
    #[derive(Default)]
    struct RecordingModule {
        calls: Mutex<Vec<(String, String, f64)>>,
    }

    impl ReactionSink for RecordingModule {
        fn name(&self) -> &str {
            "recorder"
        }

        fn supports(&self, reaction_type: &str) -> bool {
            matches!(reaction_type, "vibrate" | "shock")
        }

        fn react(&self, reaction_type: &str, binding: &Binding, intensity: f64) -> Result<(), ContractError> {
            self.calls
                .lock()
                .push((binding.contact_id.clone(), reaction_type.to_string(), intensity));
            Ok(())
        }
    }

    /// Full stack bound to loopback
    struct Bridge {
        listener: OscListener,
        router: Arc<Router>,
        module: Arc<RecordingModule>,
        addr: SocketAddr,
        sender: UdpSocket,
    }

    impl Bridge {
        async fn start(contacts: Vec<Contact>, bindings: Vec<Binding>) -> Self {
            let module = Arc::new(RecordingModule::default());
            let table = Arc::new(RoutingTable::new());
            table.update(contacts, bindings).unwrap();
            table.update_modules(ModuleRegistry::new().with(module.clone()));

            let dispatcher = Arc::new(Dispatcher::spawn(DispatcherConfig::default().with_worker_count(2)));
            let router = Arc::new(Router::new(table, dispatcher));

            let mut listener = OscListener::with_config(ListenerConfig::loopback());
            listener.add_listener(router.listener_callback()).unwrap();
            let addr = listener.start(0).await.unwrap();

            let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
            Self {
                listener,
                router,
                module,
                addr,
                sender,
            }
        }

        fn send(&self, packet: &OscPacket) {
            let bytes = encoder::encode(packet).unwrap();
            self.sender.send_to(&bytes, self.addr).unwrap();
        }

        fn send_raw(&self, bytes: &[u8]) {
            self.sender.send_to(bytes, self.addr).unwrap();
        }

        /// Wait until `events` messages were routed and dispatch is idle
        async fn settle(&self, events: u64) -> Vec<(String, String, f64)> {
            let deadline = Instant::now() + Duration::from_secs(5);
            loop {
                let routed = self.router.stats().total_events;
                let metrics = self.router.dispatcher().metrics();
                if routed >= events && metrics.finished_count() >= metrics.submitted_count() {
                    break;
                }
                assert!(Instant::now() < deadline, "bridge did not settle ({routed}/{events} events)");
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            self.module.calls.lock().clone()
        }

        async fn shutdown(mut self) {
            self.listener.stop().await.unwrap();
            self.router.dispatcher().shutdown().await;
        }
    }

    fn message(addr: &str, arg: OscType) -> OscPacket {
        OscPacket::Message(OscMessage {
            addr: addr.to_string(),
            args: vec![arg],
        })
    }

    #[tokio::test]
    async fn test_exact_and_suffix_matching() {
        let bridge = Bridge::start(
            vec![
                Contact::new("Left Hand", "HandL").with_osc_path("/custom/left"),
                Contact::new("Head", "Head"),
            ],
            vec![
                Binding::new("HandL", "recorder").continuous(),
                Binding::new("Head", "recorder").with_reaction("shock").continuous(),
            ],
        )
        .await;

        bridge.send(&message("/custom/left", OscType::Float(0.5)));
        bridge.send(&message("/avatar/parameters/Head", OscType::Bool(true)));
        bridge.send(&message("/avatar/parameters/Foot", OscType::Bool(true)));

        let mut calls = bridge.settle(3).await;
        calls.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            calls,
            vec![
                ("HandL".to_string(), "vibrate".to_string(), 0.5),
                ("Head".to_string(), "shock".to_string(), 1.0),
            ]
        );
        assert_eq!(bridge.router.stats().unmatched_events, 1);

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_pulse_binding_fires_on_rising_edges() {
        let bridge = Bridge::start(
            vec![Contact::new("Touch", "Touch")],
            vec![Binding::new("Touch", "recorder")],
        )
        .await;

        for value in [0.0f32, 1.0, 1.0, 0.0, 1.0] {
            bridge.send(&message("/avatar/parameters/Touch", OscType::Float(value)));
        }

        let calls = bridge.settle(5).await;
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(_, _, intensity)| *intensity == 1.0));

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_bundle_messages_are_routed_individually() {
        let bridge = Bridge::start(
            vec![Contact::new("A", "A"), Contact::new("B", "B")],
            vec![
                Binding::new("A", "recorder").continuous(),
                Binding::new("B", "recorder").continuous(),
            ],
        )
        .await;

        bridge.send(&OscPacket::Bundle(OscBundle {
            timetag: OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![
                message("/p/A", OscType::Int(1)),
                message("/p/B", OscType::Double(0.25)),
            ],
        }));

        let mut calls = bridge.settle(2).await;
        calls.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ("A".to_string(), "vibrate".to_string(), 1.0));
        assert_eq!(calls[1], ("B".to_string(), "vibrate".to_string(), 0.25));

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_malformed_datagram_does_not_stop_listener() {
        let bridge = Bridge::start(
            vec![Contact::new("Hand", "Hand")],
            vec![Binding::new("Hand", "recorder").continuous()],
        )
        .await;

        bridge.send_raw(b"definitely not osc");
        bridge.send(&message("/avatar/parameters/Hand", OscType::Float(0.75)));

        let calls = bridge.settle(1).await;
        assert_eq!(calls, vec![("Hand".to_string(), "vibrate".to_string(), 0.75)]);

        let metrics = bridge.listener.metrics().snapshot();
        assert_eq!(metrics.decode_errors, 1);
        assert_eq!(metrics.datagrams_received, 2);

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_hot_update_changes_routing() {
        let bridge = Bridge::start(
            vec![Contact::new("Old", "Old")],
            vec![Binding::new("Old", "recorder").continuous()],
        )
        .await;

        bridge.send(&message("/p/Old", OscType::Float(0.5)));
        assert_eq!(bridge.settle(1).await.len(), 1);

        bridge
            .router
            .table()
            .update(
                vec![Contact::new("New", "New")],
                vec![Binding::new("New", "recorder").with_intensity(0.5).continuous()],
            )
            .unwrap();

        bridge.send(&message("/p/Old", OscType::Float(0.5)));
        bridge.send(&message("/p/New", OscType::Bool(true)));

        let calls = bridge.settle(3).await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], ("New".to_string(), "vibrate".to_string(), 0.5));
        assert_eq!(bridge.router.stats().unmatched_events, 1);

        bridge.shutdown().await;
    }
}
