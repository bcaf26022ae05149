use erp_core::notify::SubscriptionId;
use erp_core::{ManualClock, RetractReason, ToastChannel, ToastEvent, ToastKind};
use std::cell::RefCell;
use std::rc::Rc;

fn channel_at(start_ms: i64) -> (ToastChannel, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new(start_ms));
    (ToastChannel::new(clock.clone()), clock)
}

fn recorder(channel: &ToastChannel) -> Rc<RefCell<Vec<ToastEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    channel.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

#[test]
fn toast_is_visible_until_default_duration_elapses() {
    let (channel, clock) = channel_at(10_000);

    let handle = channel.success("Warehouse created successfully");
    let active = channel.active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].kind, ToastKind::Success);
    assert_eq!(active[0].message, "Warehouse created successfully");
    assert_eq!(active[0].expires_at_ms, Some(14_000));

    clock.advance(3_999);
    assert!(channel.expire_due().is_empty());
    assert!(channel.is_active(handle));

    clock.advance(1);
    assert_eq!(channel.expire_due(), vec![handle]);
    assert!(channel.active().is_empty());
}

#[test]
fn each_toast_expires_on_its_own_deadline() {
    let (channel, clock) = channel_at(0);

    let short = channel.notify_for("short", ToastKind::Info, 1_000);
    let long = channel.notify_for("long", ToastKind::Warning, 5_000);
    assert_eq!(channel.next_deadline_ms(), Some(1_000));

    clock.set(1_000);
    assert_eq!(channel.expire_due(), vec![short]);
    assert!(channel.is_active(long));
    assert_eq!(channel.next_deadline_ms(), Some(5_000));
}

#[test]
fn active_toasts_keep_insertion_order() {
    let (channel, _clock) = channel_at(0);

    channel.error("first");
    channel.info("second");
    channel.warning("third");

    let messages = channel
        .active()
        .into_iter()
        .map(|toast| toast.message)
        .collect::<Vec<_>>();
    assert_eq!(messages, vec!["first", "second", "third"]);
}

#[test]
fn sticky_toast_stays_until_dismissed() {
    let (channel, clock) = channel_at(0);

    let handle = channel.notify_for("Connection lost", ToastKind::Error, 0);
    assert_eq!(channel.next_deadline_ms(), None);

    clock.advance(3_600_000);
    assert!(channel.expire_due().is_empty());
    assert!(channel.dismiss(handle));
    assert!(!channel.dismiss(handle));
    assert!(channel.active().is_empty());
}

#[test]
fn dismissing_an_expired_toast_is_a_no_op() {
    let (channel, clock) = channel_at(0);
    let handle = channel.info("saved");

    clock.advance(10_000);
    channel.expire_due();

    assert!(!channel.dismiss(handle));
}

#[test]
fn clones_share_toasts_and_subscribers() {
    let (channel, _clock) = channel_at(0);
    let other = channel.clone();
    let events = recorder(&channel);

    other.success("from a clone");

    assert_eq!(channel.active().len(), 1);
    assert_eq!(events.borrow().len(), 1);
}

#[test]
fn subscribers_see_shown_and_retracted_events() {
    let (channel, clock) = channel_at(0);
    let events = recorder(&channel);

    let dismissed = channel.info("a");
    let expired = channel.info("b");
    channel.dismiss(dismissed);
    clock.advance(4_000);
    channel.expire_due();

    let events = events.borrow();
    assert_eq!(events.len(), 4);
    assert!(matches!(&events[0], ToastEvent::Shown(toast) if toast.handle == dismissed));
    assert!(matches!(&events[1], ToastEvent::Shown(toast) if toast.handle == expired));
    assert!(matches!(
        &events[2],
        ToastEvent::Retracted { toast, reason: RetractReason::Dismissed } if toast.handle == dismissed
    ));
    assert!(matches!(
        &events[3],
        ToastEvent::Retracted { toast, reason: RetractReason::Expired } if toast.handle == expired
    ));
}

#[test]
fn unsubscribed_listener_receives_nothing_further() {
    let (channel, _clock) = channel_at(0);
    let count = Rc::new(RefCell::new(0));
    let sink = count.clone();
    let id = channel.subscribe(move |_| *sink.borrow_mut() += 1);

    channel.info("one");
    assert!(channel.unsubscribe(id));
    assert!(!channel.unsubscribe(id));
    channel.info("two");

    assert_eq!(*count.borrow(), 1);
}

#[test]
fn listener_may_notify_from_inside_a_callback() {
    let (channel, _clock) = channel_at(0);
    let events = recorder(&channel);
    let echo = channel.clone();
    channel.subscribe(move |event| {
        if let ToastEvent::Shown(toast) = event {
            if toast.kind == ToastKind::Error {
                echo.info(format!("reported: {}", toast.message));
            }
        }
    });

    channel.error("disk full");

    let messages = channel
        .active()
        .into_iter()
        .map(|toast| toast.message)
        .collect::<Vec<_>>();
    assert_eq!(messages, vec!["disk full", "reported: disk full"]);
    assert_eq!(events.borrow().len(), 2);
}

#[test]
fn listener_may_unsubscribe_itself_during_dispatch() {
    let (channel, _clock) = channel_at(0);
    let count = Rc::new(RefCell::new(0));
    let own_id: Rc<RefCell<Option<SubscriptionId>>> = Rc::new(RefCell::new(None));

    let inner = channel.clone();
    let sink = count.clone();
    let id_slot = own_id.clone();
    let id = channel.subscribe(move |_| {
        *sink.borrow_mut() += 1;
        if let Some(id) = *id_slot.borrow() {
            inner.unsubscribe(id);
        }
    });
    *own_id.borrow_mut() = Some(id);

    channel.info("one");
    channel.info("two");

    assert_eq!(*count.borrow(), 1);
}

#[test]
fn panicking_listener_does_not_stall_later_events() {
    let (channel, _clock) = channel_at(0);
    let events = recorder(&channel);
    let armed = Rc::new(RefCell::new(true));
    let trigger = armed.clone();
    channel.subscribe(move |_| {
        if trigger.replace(false) {
            panic!("listener failure");
        }
    });

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        channel.info("first");
    }));
    assert!(outcome.is_err());

    channel.info("second");
    channel.info("third");

    let shown = events
        .borrow()
        .iter()
        .filter_map(|event| match event {
            ToastEvent::Shown(toast) => Some(toast.message.clone()),
            ToastEvent::Retracted { .. } => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(shown, vec!["first", "second", "third"]);
}
