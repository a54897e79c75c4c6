//! Digital keyboard input tracking.
//!
//! The host environment owns the real event source; it injects
//! [`KeyEvent`]s through a channel obtained from [`Keyboard::sender`]. The
//! game loop drains that channel once per tick with [`Keyboard::pump`],
//! which maintains the held-key set and broadcasts physical transitions to
//! every live [`Keys`] tracker.
//!
//! Trackers map physical key names to action labels: several keys may feed
//! one label and one key may appear under several labels. [`Keys::pulse`]
//! recomputes the active label set fresh on every call; edge-triggered
//! callbacks and the [`Keys::take_edges`] buffer fire exactly once per
//! physical transition, never once per pulse.
//!
//! Multiple trackers coexist with broadcast semantics: every tracker sees
//! every transition it registered interest in, with no arbitration.
//! Dropping a tracker deregisters everything it registered.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crossbeam_channel::{Receiver, Sender, unbounded};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// A single key transition reported by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyEvent {
    /// Host-reported key name, e.g. `"a"`, `"ArrowLeft"`, `" "`.
    pub key: String,
    /// True for key-down, false for key-up.
    pub pressed: bool,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyEvent {
    /// A key-down event with no modifiers.
    pub fn down(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            pressed: true,
            alt: false,
            ctrl: false,
            meta: false,
        }
    }

    /// A key-up event with no modifiers.
    pub fn up(key: impl Into<String>) -> Self {
        Self {
            pressed: false,
            ..Self::down(key)
        }
    }

    pub fn with_modifiers(mut self, alt: bool, ctrl: bool, meta: bool) -> Self {
        self.alt = alt;
        self.ctrl = ctrl;
        self.meta = meta;
        self
    }

    /// Whether the host should run its default handling for this event.
    ///
    /// Bare keypresses are consumed by the game; a press carrying
    /// alt/ctrl/meta is left to the host so standard modified shortcuts
    /// keep working.
    pub fn allows_host_default(&self) -> bool {
        self.alt || self.ctrl || self.meta
    }
}

/// A buffered physical transition, in canonical key form.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyEdge {
    pub key: String,
    pub pressed: bool,
}

/// Normalize a host key name to its canonical form.
///
/// Letters are lowercased so `"A"` and `"a"` register together; arrow keys
/// collapse the `"Arrow"`-prefixed and short forms; the space bar's three
/// common spellings collapse to `"space"`.
pub fn canonical_key(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    match lower.as_str() {
        "" | "space" | "spacebar" => "space".to_string(),
        "arrowleft" => "left".to_string(),
        "arrowright" => "right".to_string(),
        "arrowup" => "up".to_string(),
        "arrowdown" => "down".to_string(),
        _ => lower,
    }
}

type EdgeCallback = Rc<RefCell<Box<dyn FnMut(&KeyEvent)>>>;

struct Action {
    label: String,
    keys: FxHashSet<String>,
}

struct TrackerInner {
    actions: Vec<Action>,
    /// Union of all action keys plus explicitly watched keys.
    interest: FxHashSet<String>,
    edges: Vec<KeyEdge>,
    on_down: FxHashMap<String, Vec<EdgeCallback>>,
    on_up: FxHashMap<String, Vec<EdgeCallback>>,
}

struct HubState {
    held: FxHashSet<String>,
    trackers: Vec<Weak<RefCell<TrackerInner>>>,
    /// While set, transitions update the held set and fire callbacks but
    /// are not buffered as edges, so gameplay key handling never replays
    /// input that arrived during a pause.
    paused: bool,
}

/// The shared keyboard hub: one per game, fed by the host channel.
pub struct Keyboard {
    tx: Sender<KeyEvent>,
    rx: Receiver<KeyEvent>,
    state: Rc<RefCell<HubState>>,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Keyboard {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            state: Rc::new(RefCell::new(HubState {
                held: FxHashSet::default(),
                trackers: Vec::new(),
                paused: false,
            })),
        }
    }

    /// Channel endpoint for the host event source. Cloneable and sendable
    /// across threads; the engine itself stays single-threaded.
    pub fn sender(&self) -> Sender<KeyEvent> {
        self.tx.clone()
    }

    /// Drain pending host events and dispatch the resulting transitions.
    /// Called once per tick, before the scene update.
    pub fn pump(&self) {
        while let Ok(event) = self.rx.try_recv() {
            self.dispatch(&event);
        }
    }

    /// Dispatch one event synchronously. Repeat key-down events while the
    /// key is already held (host auto-repeat) are not transitions and are
    /// ignored.
    pub fn dispatch(&self, event: &KeyEvent) {
        let canon = canonical_key(&event.key);
        let callbacks: Vec<EdgeCallback> = {
            let mut state = self.state.borrow_mut();
            let transition = if event.pressed {
                state.held.insert(canon.clone())
            } else {
                state.held.remove(&canon)
            };
            if !transition {
                return;
            }
            let paused = state.paused;
            let live: Vec<Rc<RefCell<TrackerInner>>> =
                state.trackers.iter().filter_map(Weak::upgrade).collect();
            state.trackers.retain(|w| w.strong_count() > 0);
            drop(state);

            let mut to_call = Vec::new();
            for tracker in live {
                let mut inner = tracker.borrow_mut();
                if !inner.interest.contains(&canon) {
                    continue;
                }
                if !paused {
                    inner.edges.push(KeyEdge {
                        key: canon.clone(),
                        pressed: event.pressed,
                    });
                }
                let map = if event.pressed {
                    &inner.on_down
                } else {
                    &inner.on_up
                };
                if let Some(cbs) = map.get(&canon) {
                    to_call.extend(cbs.iter().cloned());
                }
            }
            to_call
        };
        // Callbacks run with no hub/tracker borrow live, so they may poll
        // trackers or push further events.
        for cb in callbacks {
            (cb.borrow_mut())(event);
        }
    }

    /// True while the named key is held.
    pub fn is_held(&self, key: &str) -> bool {
        self.state.borrow().held.contains(&canonical_key(key))
    }

    /// Gate edge buffering while the game is paused. Held-state tracking
    /// and edge callbacks keep working, so a pause-toggle binding still
    /// fires; buffered edges are simply not recorded.
    pub fn set_paused(&self, paused: bool) {
        self.state.borrow_mut().paused = paused;
    }

    /// Create a tracker bound to this hub.
    pub fn tracker(&self) -> Keys {
        let inner = Rc::new(RefCell::new(TrackerInner {
            actions: Vec::new(),
            interest: FxHashSet::default(),
            edges: Vec::new(),
            on_down: FxHashMap::default(),
            on_up: FxHashMap::default(),
        }));
        self.state
            .borrow_mut()
            .trackers
            .push(Rc::downgrade(&inner));
        Keys {
            hub: Rc::clone(&self.state),
            inner,
        }
    }

    #[cfg(test)]
    fn live_tracker_count(&self) -> usize {
        self.state
            .borrow()
            .trackers
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

/// A scoped keyboard tracker: label-based polling plus edge callbacks.
pub struct Keys {
    hub: Rc<RefCell<HubState>>,
    inner: Rc<RefCell<TrackerInner>>,
}

impl Keys {
    /// Associate a set of physical keys with an action label. May be called
    /// repeatedly; the same key may appear under several labels.
    pub fn actions<I, S>(&mut self, label: impl Into<String>, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let canon: FxHashSet<String> = keys
            .into_iter()
            .map(|k| canonical_key(k.as_ref()))
            .collect();
        let mut inner = self.inner.borrow_mut();
        inner.interest.extend(canon.iter().cloned());
        inner.actions.push(Action {
            label: label.into(),
            keys: canon,
        });
        drop(inner);
        self
    }

    /// Register interest in keys without binding a label, so their edges
    /// show up in [`Keys::take_edges`].
    pub fn watch<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inner = self.inner.borrow_mut();
        for k in keys {
            inner.interest.insert(canonical_key(k.as_ref()));
        }
        drop(inner);
        self
    }

    /// The labels with at least one associated key currently held,
    /// recomputed fresh on every call. Order follows registration order;
    /// duplicate labels are reported once.
    pub fn pulse(&self) -> Vec<String> {
        let hub = self.hub.borrow();
        let inner = self.inner.borrow();
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut active: Vec<String> = Vec::new();
        for action in &inner.actions {
            if seen.contains(action.label.as_str()) {
                continue;
            }
            if action.keys.iter().any(|k| hub.held.contains(k)) {
                seen.insert(action.label.as_str());
                active.push(action.label.clone());
            }
        }
        active
    }

    /// True while the named key is held.
    pub fn is_held(&self, key: &str) -> bool {
        self.hub.borrow().held.contains(&canonical_key(key))
    }

    /// Fire `callback` once per physical key-down transition of `key`.
    pub fn on_down(&mut self, key: &str, callback: impl FnMut(&KeyEvent) + 'static) -> &mut Self {
        self.register_edge(key, true, Box::new(callback));
        self
    }

    /// Fire `callback` once per physical key-up transition of `key`.
    pub fn on_up(&mut self, key: &str, callback: impl FnMut(&KeyEvent) + 'static) -> &mut Self {
        self.register_edge(key, false, Box::new(callback));
        self
    }

    fn register_edge(&mut self, key: &str, down: bool, callback: Box<dyn FnMut(&KeyEvent)>) {
        let canon = canonical_key(key);
        let mut inner = self.inner.borrow_mut();
        inner.interest.insert(canon.clone());
        let map = if down {
            &mut inner.on_down
        } else {
            &mut inner.on_up
        };
        map.entry(canon)
            .or_default()
            .push(Rc::new(RefCell::new(callback)));
    }

    /// Drain buffered transitions for keys this tracker registered interest
    /// in. Each physical transition appears exactly once.
    pub fn take_edges(&mut self) -> SmallVec<[KeyEdge; 4]> {
        let mut inner = self.inner.borrow_mut();
        inner.edges.drain(..).collect()
    }
}

// Dropping the tracker's inner Rc leaves only dead weak slots in the hub;
// prune them eagerly so listener teardown is deterministic.
impl Drop for Keys {
    fn drop(&mut self) {
        let inner_ptr = Rc::as_ptr(&self.inner);
        self.hub.borrow_mut().trackers.retain(|w| {
            w.upgrade()
                .is_some_and(|rc| !std::ptr::eq(Rc::as_ptr(&rc), inner_ptr))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    // ==================== NORMALIZATION TESTS ====================

    #[test]
    fn test_canonical_key_letters_fold_case() {
        assert_eq!(canonical_key("A"), "a");
        assert_eq!(canonical_key("a"), "a");
    }

    #[test]
    fn test_canonical_key_arrows() {
        assert_eq!(canonical_key("ArrowLeft"), "left");
        assert_eq!(canonical_key("Left"), "left");
        assert_eq!(canonical_key("ArrowUp"), "up");
        assert_eq!(canonical_key("ArrowDown"), "down");
        assert_eq!(canonical_key("ArrowRight"), "right");
    }

    #[test]
    fn test_canonical_key_space_forms() {
        assert_eq!(canonical_key(" "), "space");
        assert_eq!(canonical_key("Space"), "space");
        assert_eq!(canonical_key("Spacebar"), "space");
    }

    // ==================== PULSE TESTS ====================

    #[test]
    fn test_pulse_empty_when_nothing_held() {
        let kb = Keyboard::new();
        let mut keys = kb.tracker();
        keys.actions("fire", &["Space"]);
        assert!(keys.pulse().is_empty());
    }

    #[test]
    fn test_pulse_reports_label_for_any_held_key() {
        let kb = Keyboard::new();
        let mut keys = kb.tracker();
        keys.actions("left", &["a", "ArrowLeft"]);
        kb.dispatch(&KeyEvent::down("Left"));
        assert_eq!(keys.pulse(), vec!["left".to_string()]);
        kb.dispatch(&KeyEvent::up("ArrowLeft"));
        assert!(keys.pulse().is_empty());
    }

    #[test]
    fn test_pulse_same_key_in_multiple_labels() {
        let kb = Keyboard::new();
        let mut keys = kb.tracker();
        keys.actions("fire", &["Space"]);
        keys.actions("jump", &["Space", "w"]);
        kb.dispatch(&KeyEvent::down(" "));
        let labels = keys.pulse();
        assert_eq!(labels, vec!["fire".to_string(), "jump".to_string()]);
    }

    #[test]
    fn test_pulse_recomputed_each_call() {
        let kb = Keyboard::new();
        let mut keys = kb.tracker();
        keys.actions("fire", &["Space"]);
        kb.dispatch(&KeyEvent::down("Space"));
        assert_eq!(keys.pulse().len(), 1);
        assert_eq!(keys.pulse().len(), 1); // no memoization across polls
        kb.dispatch(&KeyEvent::up("Space"));
        assert!(keys.pulse().is_empty());
    }

    // ==================== EDGE TESTS ====================

    #[test]
    fn test_on_down_fires_once_per_transition() {
        let kb = Keyboard::new();
        let mut keys = kb.tracker();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        keys.on_down("a", move |_| c.set(c.get() + 1));

        kb.dispatch(&KeyEvent::down("a"));
        kb.dispatch(&KeyEvent::down("a")); // host auto-repeat, not a transition
        assert_eq!(count.get(), 1);
        kb.dispatch(&KeyEvent::up("a"));
        kb.dispatch(&KeyEvent::down("a"));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_on_up_fires_once_per_transition() {
        let kb = Keyboard::new();
        let mut keys = kb.tracker();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        keys.on_up("Space", move |_| c.set(c.get() + 1));

        kb.dispatch(&KeyEvent::up("Space")); // not held: no transition
        assert_eq!(count.get(), 0);
        kb.dispatch(&KeyEvent::down(" "));
        kb.dispatch(&KeyEvent::up("Spacebar"));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_take_edges_buffers_interest_keys_only() {
        let kb = Keyboard::new();
        let mut keys = kb.tracker();
        keys.actions("thrust", &["w"]);
        kb.dispatch(&KeyEvent::down("w"));
        kb.dispatch(&KeyEvent::down("x")); // no interest registered
        kb.dispatch(&KeyEvent::up("w"));

        let edges: Vec<KeyEdge> = keys.take_edges().into_vec();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0], KeyEdge { key: "w".into(), pressed: true });
        assert_eq!(edges[1], KeyEdge { key: "w".into(), pressed: false });
        assert!(keys.take_edges().is_empty()); // drained
    }

    #[test]
    fn test_broadcast_to_multiple_trackers() {
        let kb = Keyboard::new();
        let mut a = kb.tracker();
        let mut b = kb.tracker();
        a.actions("go", &["w"]);
        b.actions("up", &["w"]);
        kb.dispatch(&KeyEvent::down("w"));
        assert_eq!(a.pulse(), vec!["go".to_string()]);
        assert_eq!(b.pulse(), vec!["up".to_string()]);
    }

    #[test]
    fn test_drop_deregisters_tracker() {
        let kb = Keyboard::new();
        let keys = kb.tracker();
        assert_eq!(kb.live_tracker_count(), 1);
        drop(keys);
        assert_eq!(kb.live_tracker_count(), 0);
        // Dispatch after drop must not panic.
        kb.dispatch(&KeyEvent::down("a"));
    }

    #[test]
    fn test_pump_drains_host_channel() {
        let kb = Keyboard::new();
        let mut keys = kb.tracker();
        keys.actions("fire", &["Space"]);
        let tx = kb.sender();
        tx.send(KeyEvent::down("Space")).unwrap();
        assert!(keys.pulse().is_empty()); // not pumped yet
        kb.pump();
        assert_eq!(keys.pulse(), vec!["fire".to_string()]);
    }

    #[test]
    fn test_paused_hub_skips_edge_buffer_but_keeps_callbacks() {
        let kb = Keyboard::new();
        let mut keys = kb.tracker();
        keys.actions("fire", &["Space"]);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        keys.on_down("Space", move |_| c.set(c.get() + 1));

        kb.set_paused(true);
        kb.dispatch(&KeyEvent::down("Space"));
        assert_eq!(count.get(), 1); // callbacks still fire
        assert!(keys.take_edges().is_empty()); // no buffered edge
        assert!(kb.is_held("Space")); // held set stays accurate
        kb.dispatch(&KeyEvent::up("Space"));

        kb.set_paused(false);
        kb.dispatch(&KeyEvent::down("Space"));
        assert_eq!(keys.take_edges().len(), 1);
    }

    // ==================== HOST DEFAULT TESTS ====================

    #[test]
    fn test_bare_key_consumed() {
        assert!(!KeyEvent::down("a").allows_host_default());
    }

    #[test]
    fn test_modified_key_passes_through() {
        assert!(KeyEvent::down("r").with_modifiers(false, true, false).allows_host_default());
        assert!(KeyEvent::down("q").with_modifiers(true, false, false).allows_host_default());
        assert!(KeyEvent::down("w").with_modifiers(false, false, true).allows_host_default());
    }
}
