//! Toast channel implementation.

use crate::clock::{Clock, SystemClock};
use crate::config::DEFAULT_TOAST_DURATION_MS;
use log::debug;
use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl Display for ToastKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle returned by `notify`, used for early dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// One active notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub handle: ToastHandle,
    pub kind: ToastKind,
    pub message: String,
    pub shown_at_ms: i64,
    /// `None` for sticky toasts that stay until dismissed.
    pub expires_at_ms: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetractReason {
    Dismissed,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastEvent {
    Shown(Toast),
    Retracted { toast: Toast, reason: RetractReason },
}

type Listener = Box<dyn FnMut(&ToastEvent)>;

#[derive(Default)]
struct ChannelState {
    next_handle: u64,
    next_subscription: u64,
    active: Vec<Toast>,
    listeners: Vec<(SubscriptionId, Listener)>,
    live_subscriptions: BTreeSet<SubscriptionId>,
    unsubscribed_during_dispatch: Vec<SubscriptionId>,
    pending: VecDeque<ToastEvent>,
    dispatching: bool,
}

/// Shared handle to the process-wide toast list.
///
/// Cloning is cheap; every clone observes the same toasts and subscribers.
/// Expiry is cooperative: the host loop calls `expire_due` (for example when
/// `next_deadline_ms` is reached).
#[derive(Clone)]
pub struct ToastChannel {
    state: Rc<RefCell<ChannelState>>,
    clock: Rc<dyn Clock>,
    default_duration_ms: i64,
}

impl Default for ToastChannel {
    fn default() -> Self {
        Self::new(Rc::new(SystemClock))
    }
}

impl ToastChannel {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self::with_default_duration(clock, DEFAULT_TOAST_DURATION_MS)
    }

    pub fn with_default_duration(clock: Rc<dyn Clock>, default_duration_ms: i64) -> Self {
        Self {
            state: Rc::new(RefCell::new(ChannelState::default())),
            clock,
            default_duration_ms,
        }
    }

    /// Shows a toast for the default duration.
    pub fn notify(&self, message: impl Into<String>, kind: ToastKind) -> ToastHandle {
        self.notify_for(message, kind, self.default_duration_ms)
    }

    /// Shows a toast retracted after `duration_ms`; `<= 0` means sticky.
    pub fn notify_for(
        &self,
        message: impl Into<String>,
        kind: ToastKind,
        duration_ms: i64,
    ) -> ToastHandle {
        let now = self.clock.now_ms();
        let toast = {
            let mut state = self.state.borrow_mut();
            state.next_handle += 1;
            let toast = Toast {
                handle: ToastHandle(state.next_handle),
                kind,
                message: message.into(),
                shown_at_ms: now,
                expires_at_ms: (duration_ms > 0).then(|| now.saturating_add(duration_ms)),
            };
            state.active.push(toast.clone());
            toast
        };

        debug!(
            "event=toast_shown module=notify handle={} kind={} sticky={}",
            toast.handle.0,
            kind,
            toast.expires_at_ms.is_none()
        );
        let handle = toast.handle;
        self.emit(ToastEvent::Shown(toast));
        handle
    }

    pub fn success(&self, message: impl Into<String>) -> ToastHandle {
        self.notify(message, ToastKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> ToastHandle {
        self.notify(message, ToastKind::Error)
    }

    pub fn warning(&self, message: impl Into<String>) -> ToastHandle {
        self.notify(message, ToastKind::Warning)
    }

    pub fn info(&self, message: impl Into<String>) -> ToastHandle {
        self.notify(message, ToastKind::Info)
    }

    /// Retracts a toast early. Returns `false` if it is no longer active.
    pub fn dismiss(&self, handle: ToastHandle) -> bool {
        let removed = {
            let mut state = self.state.borrow_mut();
            state
                .active
                .iter()
                .position(|toast| toast.handle == handle)
                .map(|index| state.active.remove(index))
        };

        match removed {
            Some(toast) => {
                self.emit(ToastEvent::Retracted {
                    toast,
                    reason: RetractReason::Dismissed,
                });
                true
            }
            None => false,
        }
    }

    /// Retracts every toast whose deadline has passed, oldest first.
    pub fn expire_due(&self) -> Vec<ToastHandle> {
        let now = self.clock.now_ms();
        let expired = {
            let mut state = self.state.borrow_mut();
            let (expired, kept): (Vec<Toast>, Vec<Toast>) = std::mem::take(&mut state.active)
                .into_iter()
                .partition(|toast| toast.expires_at_ms.is_some_and(|deadline| deadline <= now));
            state.active = kept;
            expired
        };

        let handles = expired.iter().map(|toast| toast.handle).collect();
        for toast in expired {
            self.emit(ToastEvent::Retracted {
                toast,
                reason: RetractReason::Expired,
            });
        }
        handles
    }

    /// Active toasts in insertion order.
    pub fn active(&self) -> Vec<Toast> {
        self.state.borrow().active.clone()
    }

    pub fn is_active(&self, handle: ToastHandle) -> bool {
        self.state
            .borrow()
            .active
            .iter()
            .any(|toast| toast.handle == handle)
    }

    /// Earliest pending expiry, for scheduling the next `expire_due` call.
    pub fn next_deadline_ms(&self) -> Option<i64> {
        self.state
            .borrow()
            .active
            .iter()
            .filter_map(|toast| toast.expires_at_ms)
            .min()
    }

    /// Registers a listener for shown/retracted events.
    ///
    /// Listeners may call back into the channel; nested events are queued
    /// and delivered after the current one.
    pub fn subscribe(&self, listener: impl FnMut(&ToastEvent) + 'static) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        state.listeners.push((id, Box::new(listener)));
        state.live_subscriptions.insert(id);
        id
    }

    /// Removes a listener. Returns `false` for unknown ids.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.borrow_mut();
        if !state.live_subscriptions.remove(&id) {
            return false;
        }
        state.listeners.retain(|(existing, _)| *existing != id);
        if state.dispatching {
            state.unsubscribed_during_dispatch.push(id);
        }
        true
    }

    fn emit(&self, event: ToastEvent) {
        {
            let mut state = self.state.borrow_mut();
            state.pending.push_back(event);
            if state.dispatching {
                return;
            }
            state.dispatching = true;
        }

        loop {
            let event = {
                let mut state = self.state.borrow_mut();
                let Some(event) = state.pending.pop_front() else {
                    state.dispatching = false;
                    return;
                };
                event
            };

            let mut round = DispatchRound::take(&self.state);
            for (_, listener) in round.listeners.iter_mut() {
                listener(&event);
            }
        }
    }
}

/// Listeners taken out of the state while one event is delivered.
///
/// Dropping the round puts them back, minus any unsubscribed meanwhile and
/// after any subscribed meanwhile. A panicking listener also ends the
/// dispatch so later events are delivered again.
struct DispatchRound<'a> {
    state: &'a RefCell<ChannelState>,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl<'a> DispatchRound<'a> {
    fn take(state: &'a RefCell<ChannelState>) -> Self {
        let listeners = std::mem::take(&mut state.borrow_mut().listeners);
        Self { state, listeners }
    }
}

impl Drop for DispatchRound<'_> {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        let unsubscribed = std::mem::take(&mut state.unsubscribed_during_dispatch);
        let mut listeners = std::mem::take(&mut self.listeners);
        listeners.retain(|(id, _)| !unsubscribed.contains(id));
        let added = std::mem::replace(&mut state.listeners, listeners);
        state.listeners.extend(added);
        if std::thread::panicking() {
            state.dispatching = false;
        }
    }
}
