//! The modal dialog shell.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
    time::Duration,
};

use crate::{
    gateways::{Document, EventHandler, ListenerId, ListenerTarget, Runtime, UiEvent},
    map_renderer::MapRenderer,
    sequence::SequenceCounter,
};

const ESCAPE_KEY: &str = "Escape";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogTiming {
    /// Duration of the fade in and fade out transitions.
    pub transition: Duration,
}

impl Default for DialogTiming {
    fn default() -> Self {
        Self {
            transition: Duration::from_millis(200),
        }
    }
}

/// Listeners of a single open/close cycle.
#[derive(Debug)]
struct Session {
    listeners: Vec<ListenerId>,
}

pub struct DialogController {
    me: Weak<Self>,
    document: Rc<dyn Document>,
    runtime: Rc<dyn Runtime>,
    renderer: Rc<MapRenderer>,
    sequences: SequenceCounter,
    timing: DialogTiming,
    state: Cell<DialogState>,
    // Pending transitions only complete if no other transition
    // has been started in the meantime.
    transition: Cell<u64>,
    session: RefCell<Option<Session>>,
}

impl fmt::Debug for DialogController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogController")
            .field("state", &self.state.get())
            .field("timing", &self.timing)
            .field("session", &self.session.borrow())
            .finish_non_exhaustive()
    }
}

impl DialogController {
    pub fn new(
        document: Rc<dyn Document>,
        runtime: Rc<dyn Runtime>,
        renderer: Rc<MapRenderer>,
        sequences: SequenceCounter,
        timing: DialogTiming,
    ) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            me: me.clone(),
            document,
            runtime,
            renderer,
            sequences,
            timing,
            state: Cell::new(DialogState::Closed),
            transition: Cell::new(0),
            session: RefCell::new(None),
        })
    }

    #[must_use]
    pub fn state(&self) -> DialogState {
        self.state.get()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state(), DialogState::Opening | DialogState::Open)
    }

    pub fn open(&self) {
        match self.state.get() {
            DialogState::Opening | DialogState::Open => return,
            DialogState::Closing => log::debug!("Reopening dialog before it has been closed"),
            DialogState::Closed => log::debug!("Opening dialog"),
        }
        let ticket = self.next_transition();
        if !self.document.has_overlay() {
            self.document.create_overlay();
        }
        self.document.set_dialog_displayed(true);
        self.document.set_modal_open(true);
        self.start_session();
        self.state.set(DialogState::Opening);
        // The fade-in only starts after the dialog has been displayed
        self.after(Duration::ZERO, ticket, Self::show);
        self.after(self.timing.transition, ticket, Self::finish_open);
    }

    /// Closes the dialog and cancels the current sequence.
    pub fn close(&self) {
        match self.state.get() {
            DialogState::Closed | DialogState::Closing => return,
            DialogState::Opening | DialogState::Open => log::debug!("Closing dialog"),
        }
        let ticket = self.next_transition();
        self.state.set(DialogState::Closing);
        self.sequences.invalidate();
        self.end_session();
        self.renderer.dispose();
        self.document.set_dialog_shown(false);
        self.after(self.timing.transition, ticket, Self::finish_close);
    }

    fn next_transition(&self) -> u64 {
        let ticket = self.transition.get() + 1;
        self.transition.set(ticket);
        ticket
    }

    fn after(&self, delay: Duration, ticket: u64, finish: fn(&Self)) {
        let me = self.me.clone();
        self.runtime.schedule(
            delay,
            Box::new(move || {
                let Some(this) = me.upgrade() else {
                    return;
                };
                if this.transition.get() == ticket {
                    finish(&this);
                }
            }),
        );
    }

    fn show(&self) {
        self.document.set_dialog_shown(true);
    }

    fn finish_open(&self) {
        if self.state.get() == DialogState::Opening {
            self.state.set(DialogState::Open);
        }
    }

    fn finish_close(&self) {
        if self.state.get() != DialogState::Closing {
            return;
        }
        self.document.remove_overlay();
        self.document.set_dialog_displayed(false);
        self.document.set_modal_open(false);
        self.state.set(DialogState::Closed);
        log::debug!("Dialog closed");
    }

    fn start_session(&self) {
        self.end_session();
        let listeners = vec![
            self.add_close_listener(ListenerTarget::Dismiss, |_| true),
            self.add_close_listener(ListenerTarget::Backdrop, |_| true),
            self.add_close_listener(ListenerTarget::Keyboard, |event| {
                matches!(event, UiEvent::KeyDown { key } if key == ESCAPE_KEY)
            }),
        ];
        *self.session.borrow_mut() = Some(Session { listeners });
    }

    fn end_session(&self) {
        let session = self.session.borrow_mut().take();
        let Some(Session { listeners }) = session else {
            return;
        };
        for id in listeners {
            self.document.remove_listener(id);
        }
    }

    fn add_close_listener(
        &self,
        target: ListenerTarget,
        accept: fn(&UiEvent) -> bool,
    ) -> ListenerId {
        let me = self.me.clone();
        let handler: EventHandler = Rc::new(move |event| {
            if !accept(event) {
                return;
            }
            if let Some(this) = me.upgrade() {
                this.close();
            }
        });
        self.document.add_listener(target, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::Harness;

    const TRANSITION: Duration = Duration::from_millis(200);

    fn escape() -> UiEvent {
        UiEvent::KeyDown {
            key: "Escape".into(),
        }
    }

    fn click() -> UiEvent {
        UiEvent::Click { carrier_id: None }
    }

    #[test]
    fn open_and_close() {
        let h = Harness::new();
        let dialog = h.widget.dialog();
        dialog.open();
        assert_eq!(dialog.state(), DialogState::Opening);
        assert_eq!(h.document.overlays(), 1);
        assert!(h.document.dialog_displayed());
        assert!(h.document.modal_open());
        assert_eq!(h.document.listener_count(ListenerTarget::Dismiss), 1);
        assert_eq!(h.document.listener_count(ListenerTarget::Backdrop), 1);
        assert_eq!(h.document.listener_count(ListenerTarget::Keyboard), 1);

        h.advance(TRANSITION);
        assert_eq!(dialog.state(), DialogState::Open);
        assert!(h.document.dialog_shown());

        dialog.close();
        assert_eq!(dialog.state(), DialogState::Closing);
        assert!(!h.document.dialog_shown());
        assert_eq!(h.document.listener_count(ListenerTarget::Dismiss), 0);
        assert_eq!(h.document.listener_count(ListenerTarget::Backdrop), 0);
        assert_eq!(h.document.listener_count(ListenerTarget::Keyboard), 0);
        // Overlay fades out
        assert_eq!(h.document.overlays(), 1);

        h.advance(TRANSITION);
        assert_eq!(dialog.state(), DialogState::Closed);
        assert_eq!(h.document.overlays(), 0);
        assert!(!h.document.dialog_displayed());
        assert!(!h.document.modal_open());
    }

    #[test]
    fn fade_in_after_display() {
        let h = Harness::new();
        let dialog = h.widget.dialog();
        dialog.open();
        assert!(h.document.dialog_displayed());
        assert!(!h.document.dialog_shown());

        h.advance(Duration::ZERO);
        assert!(h.document.dialog_shown());
        assert_eq!(dialog.state(), DialogState::Opening);
    }

    #[test]
    fn no_fade_in_if_closed_before() {
        let h = Harness::new();
        let dialog = h.widget.dialog();
        dialog.open();
        dialog.close();
        h.advance(Duration::ZERO);
        assert!(!h.document.dialog_shown());
        h.advance(TRANSITION);
        assert_eq!(dialog.state(), DialogState::Closed);
        assert!(!h.document.dialog_shown());
    }

    #[test]
    fn open_twice() {
        let h = Harness::new();
        let dialog = h.widget.dialog();
        dialog.open();
        dialog.open();
        h.advance(TRANSITION);
        dialog.open();
        assert_eq!(dialog.state(), DialogState::Open);
        assert_eq!(h.document.overlays(), 1);
        assert_eq!(h.document.listener_count(ListenerTarget::Dismiss), 1);
        assert_eq!(h.document.listener_count(ListenerTarget::Backdrop), 1);
        assert_eq!(h.document.listener_count(ListenerTarget::Keyboard), 1);
    }

    #[test]
    fn close_if_closed() {
        let h = Harness::new();
        let dialog = h.widget.dialog();
        dialog.close();
        assert_eq!(dialog.state(), DialogState::Closed);
        dialog.open();
        dialog.close();
        dialog.close();
        h.advance(TRANSITION);
        assert_eq!(dialog.state(), DialogState::Closed);
        assert_eq!(h.document.overlays(), 0);
    }

    #[test]
    fn close_on_escape() {
        let h = Harness::new();
        let dialog = h.widget.dialog();
        dialog.open();
        h.document.dispatch(
            ListenerTarget::Keyboard,
            &UiEvent::KeyDown {
                key: "Enter".into(),
            },
        );
        assert!(dialog.is_open());
        h.document.dispatch(ListenerTarget::Keyboard, &escape());
        assert_eq!(dialog.state(), DialogState::Closing);
    }

    #[test]
    fn close_on_backdrop_click() {
        let h = Harness::new();
        let dialog = h.widget.dialog();
        dialog.open();
        h.document.dispatch(ListenerTarget::Backdrop, &click());
        assert_eq!(dialog.state(), DialogState::Closing);
    }

    #[test]
    fn close_on_dismiss_button() {
        let h = Harness::new();
        let dialog = h.widget.dialog();
        dialog.open();
        h.advance(TRANSITION);
        h.document.dispatch(ListenerTarget::Dismiss, &click());
        h.advance(TRANSITION);
        assert_eq!(dialog.state(), DialogState::Closed);
        // The listeners are gone
        h.document.dispatch(ListenerTarget::Dismiss, &click());
        assert_eq!(dialog.state(), DialogState::Closed);
    }

    #[test]
    fn reopen_while_closing() {
        let h = Harness::new();
        let dialog = h.widget.dialog();
        dialog.open();
        h.advance(TRANSITION);
        dialog.close();
        h.advance(Duration::from_millis(100));
        dialog.open();
        assert_eq!(dialog.state(), DialogState::Opening);
        assert_eq!(h.document.overlays(), 1);

        // The pending teardown must not remove the overlay of the new session
        h.advance(Duration::from_millis(100));
        assert_eq!(h.document.overlays(), 1);
        assert!(h.document.modal_open());
        h.advance(Duration::from_millis(100));
        assert_eq!(dialog.state(), DialogState::Open);
        assert_eq!(h.document.overlays(), 1);
        assert_eq!(h.document.listener_count(ListenerTarget::Keyboard), 1);
    }

    #[test]
    fn close_while_opening() {
        let h = Harness::new();
        let dialog = h.widget.dialog();
        dialog.open();
        dialog.close();
        h.advance(TRANSITION);
        assert_eq!(dialog.state(), DialogState::Closed);
        assert_eq!(h.document.overlays(), 0);
    }

    #[test]
    fn close_invalidates_current_sequence() {
        let h = Harness::new();
        let dialog = h.widget.dialog();
        let seq = h.widget.sequences().begin();
        dialog.open();
        assert!(seq.is_current());
        dialog.close();
        assert!(!seq.is_current());
    }
}
