//! Per-contact gate: cooldown window plus pulse-mode edge detection

use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{Binding, Contact, OscArg};

/// Why an event did not reach any binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// Inside the contact's cooldown window
    Cooldown,
    /// Only pulse bindings, and the value is not a rising edge
    NoEdge,
}

impl SuppressReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cooldown => "cooldown",
            Self::NoEdge => "no_edge",
        }
    }
}

/// Gate verdict for one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Suppressed(SuppressReason),
    /// Indices into the contact's bindings that should be dispatched
    Propagate(Vec<usize>),
}

/// Mutable gate state of one contact
#[derive(Debug, Clone, Default)]
pub struct GateState {
    last_trigger: Option<Instant>,
    last_raw: Option<OscArg>,
}

impl GateState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_trigger(&self) -> Option<Instant> {
        self.last_trigger
    }

    pub fn last_raw(&self) -> Option<&OscArg> {
        self.last_raw.as_ref()
    }

    /// Whether the gate has seen any event
    pub fn is_idle(&self) -> bool {
        self.last_trigger.is_none() && self.last_raw.is_none()
    }

    /// Decide which bindings receive `raw` at `now` and advance the state
    ///
    /// `last_raw` is always replaced, so edge detection stays correct after a
    /// suppressed event. A stop signal passes an active cooldown but does not
    /// restart it.
    pub fn evaluate(
        &mut self,
        contact: &Contact,
        bindings: &[Arc<Binding>],
        raw: &OscArg,
        now: Instant,
    ) -> GateDecision {
        let previous = self.last_raw.replace(raw.clone());

        let cooling = self.in_cooldown(contact, now);
        if cooling && !raw.is_stop_signal() {
            return GateDecision::Suppressed(SuppressReason::Cooldown);
        }

        let rising = is_rising_edge(previous.as_ref(), raw);
        let selected: Vec<usize> = bindings
            .iter()
            .enumerate()
            .filter(|(_, binding)| binding.is_continuous || rising)
            .map(|(index, _)| index)
            .collect();

        if selected.is_empty() {
            return GateDecision::Suppressed(SuppressReason::NoEdge);
        }

        // A stop signal let through by the cooldown bypass keeps the current window
        if !cooling {
            self.last_trigger = Some(now);
        }
        GateDecision::Propagate(selected)
    }

    fn in_cooldown(&self, contact: &Contact, now: Instant) -> bool {
        if contact.cooldown.is_nan() || contact.cooldown <= 0.0 {
            return false;
        }
        let Some(last) = self.last_trigger else {
            return false;
        };
        // Saturates for out-of-order instants
        let elapsed = now.saturating_duration_since(last);
        match Duration::try_from_secs_f64(contact.cooldown) {
            Ok(window) => elapsed < window,
            Err(_) => true,
        }
    }
}

/// `false`/absent/zero followed by `true`/positive
fn is_rising_edge(previous: Option<&OscArg>, current: &OscArg) -> bool {
    let was_low = previous.map_or(true, OscArg::is_stop_signal);
    was_low && current.is_active()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(base: Instant, s: f64) -> Instant {
        base + Duration::from_secs_f64(s)
    }

    fn pulse() -> Vec<Arc<Binding>> {
        vec![Arc::new(Binding::new("c", "m"))]
    }

    fn continuous() -> Vec<Arc<Binding>> {
        vec![Arc::new(Binding::new("c", "m").continuous())]
    }

    #[test]
    fn test_pulse_fires_on_rising_edges_only() {
        let contact = Contact::new("c", "c");
        let bindings = pulse();
        let mut gate = GateState::new();
        let t0 = Instant::now();

        let fired: Vec<usize> = [0, 1, 1, 0, 1]
            .iter()
            .enumerate()
            .filter_map(|(i, v)| {
                let decision = gate.evaluate(&contact, &bindings, &OscArg::Int(*v), secs(t0, i as f64));
                matches!(decision, GateDecision::Propagate(_)).then_some(i)
            })
            .collect();

        assert_eq!(fired, vec![1, 4]);
    }

    #[test]
    fn test_bool_edges() {
        let contact = Contact::new("c", "c");
        let bindings = pulse();
        let mut gate = GateState::new();
        let t0 = Instant::now();

        assert!(matches!(gate.evaluate(&contact, &bindings, &OscArg::Bool(true), t0), GateDecision::Propagate(_)));
        assert_eq!(
            gate.evaluate(&contact, &bindings, &OscArg::Bool(true), t0),
            GateDecision::Suppressed(SuppressReason::NoEdge)
        );
        assert_eq!(
            gate.evaluate(&contact, &bindings, &OscArg::Bool(false), t0),
            GateDecision::Suppressed(SuppressReason::NoEdge)
        );
        assert!(matches!(gate.evaluate(&contact, &bindings, &OscArg::Bool(true), t0), GateDecision::Propagate(_)));
    }

    #[test]
    fn test_continuous_always_propagates() {
        let contact = Contact::new("c", "c");
        let bindings = continuous();
        let mut gate = GateState::new();
        let t0 = Instant::now();

        for v in [0.0, 0.4, 0.4, 0.0] {
            assert_eq!(
                gate.evaluate(&contact, &bindings, &OscArg::Float(v), t0),
                GateDecision::Propagate(vec![0])
            );
        }
    }

    #[test]
    fn test_mixed_bindings_selected_independently() {
        let contact = Contact::new("c", "c");
        let bindings = vec![
            Arc::new(Binding::new("c", "pulse")),
            Arc::new(Binding::new("c", "stream").continuous()),
        ];
        let mut gate = GateState::new();
        let t0 = Instant::now();

        assert_eq!(
            gate.evaluate(&contact, &bindings, &OscArg::Float(0.8), t0),
            GateDecision::Propagate(vec![0, 1])
        );
        assert_eq!(
            gate.evaluate(&contact, &bindings, &OscArg::Float(0.9), t0),
            GateDecision::Propagate(vec![1])
        );
    }

    #[test]
    fn test_cooldown_suppresses_and_expires() {
        let contact = Contact::new("c", "c").with_cooldown(2.0);
        let bindings = continuous();
        let mut gate = GateState::new();
        let t0 = Instant::now();

        assert!(matches!(gate.evaluate(&contact, &bindings, &OscArg::Float(1.0), t0), GateDecision::Propagate(_)));
        assert_eq!(
            gate.evaluate(&contact, &bindings, &OscArg::Float(1.0), secs(t0, 1.0)),
            GateDecision::Suppressed(SuppressReason::Cooldown)
        );
        assert!(matches!(
            gate.evaluate(&contact, &bindings, &OscArg::Float(1.0), secs(t0, 2.1)),
            GateDecision::Propagate(_)
        ));
        assert_eq!(gate.last_trigger(), Some(secs(t0, 2.1)));
    }

    #[test]
    fn test_stop_signal_bypasses_cooldown_without_restarting_it() {
        let contact = Contact::new("c", "c").with_cooldown(2.0);
        let bindings = continuous();
        let mut gate = GateState::new();
        let t0 = Instant::now();

        gate.evaluate(&contact, &bindings, &OscArg::Float(1.0), t0);
        assert_eq!(
            gate.evaluate(&contact, &bindings, &OscArg::Float(0.5), secs(t0, 1.0)),
            GateDecision::Suppressed(SuppressReason::Cooldown)
        );
        assert_eq!(
            gate.evaluate(&contact, &bindings, &OscArg::Float(0.0), secs(t0, 1.0)),
            GateDecision::Propagate(vec![0])
        );
        assert_eq!(
            gate.evaluate(&contact, &bindings, &OscArg::Bool(false), secs(t0, 1.5)),
            GateDecision::Propagate(vec![0])
        );
        assert_eq!(gate.last_trigger(), Some(t0));
        assert!(matches!(
            gate.evaluate(&contact, &bindings, &OscArg::Float(1.0), secs(t0, 2.1)),
            GateDecision::Propagate(_)
        ));
    }

    #[test]
    fn test_suppressed_event_still_updates_last_value() {
        let contact = Contact::new("c", "c").with_cooldown(2.0);
        let bindings = pulse();
        let mut gate = GateState::new();
        let t0 = Instant::now();

        gate.evaluate(&contact, &bindings, &OscArg::Int(1), t0);
        gate.evaluate(&contact, &bindings, &OscArg::Int(0), secs(t0, 0.5));
        assert_eq!(
            gate.evaluate(&contact, &bindings, &OscArg::Int(1), secs(t0, 1.0)),
            GateDecision::Suppressed(SuppressReason::Cooldown)
        );
        assert_eq!(gate.last_raw(), Some(&OscArg::Int(1)));

        // The high at t=1 was recorded, so t=3 is a repeated high
        assert_eq!(
            gate.evaluate(&contact, &bindings, &OscArg::Int(1), secs(t0, 3.0)),
            GateDecision::Suppressed(SuppressReason::NoEdge)
        );
    }

    #[test]
    fn test_zero_cooldown_never_suppresses() {
        let contact = Contact::new("c", "c");
        let bindings = continuous();
        let mut gate = GateState::new();
        let t0 = Instant::now();

        for _ in 0..3 {
            assert!(matches!(gate.evaluate(&contact, &bindings, &OscArg::Float(1.0), t0), GateDecision::Propagate(_)));
        }
    }
}
