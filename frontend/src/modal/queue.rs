use std::collections::VecDeque;

use yew::prelude::*;

use crate::modal::kinds::{ModalKind, ModalRenderError};

/// Backlog capacity. Enqueueing past this drops the oldest pending modal.
pub const MAX_QUEUE_SIZE: usize = 10;

/// How long the close animation runs before the next modal may appear.
pub const CLOSE_ANIMATION_MS: u32 = 200;

/// A dialog waiting in (or at the front of) the modal queue.
///
/// Identity is the `id` string; the queue does not enforce uniqueness, so
/// enqueueing the same logical dialog twice creates two backlog entries.
#[derive(Clone)]
pub struct QueuedModal {
    pub id: String,
    pub kind: ModalKind,
    /// Reserved for interrupt-style callers; the backlog itself is FIFO.
    pub priority: Option<i32>,
    /// Deferred modals never become active on enqueue; they wait for an
    /// explicit `show_next`.
    pub defer: bool,
    /// Invoked when the modal fails to render. When absent the queue falls
    /// back to clearing the broken modal and advancing.
    pub on_error: Option<Callback<ModalRenderError>>,
}

impl QueuedModal {
    pub fn new(kind: ModalKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            priority: None,
            defer: false,
            on_error: None,
        }
    }

    pub fn deferred(kind: ModalKind) -> Self {
        Self {
            defer: true,
            ..Self::new(kind)
        }
    }

    pub fn with_on_error(mut self, on_error: Callback<ModalRenderError>) -> Self {
        self.on_error = Some(on_error);
        self
    }
}

/// Queue state: at most one active modal plus a FIFO backlog.
///
/// All transitions run inside single-threaded event handlers, so the state
/// is plain data with no locking. Timing (the close animation wait) lives in
/// `ModalQueueHandle`, which drives `begin_close`/`finish_close`.
#[derive(Default)]
pub struct ModalQueueState {
    active: Option<QueuedModal>,
    backlog: VecDeque<QueuedModal>,
    is_closing: bool,
    /// Screen-reader live-region text, replaced on every `active` transition.
    pub announcement: Option<String>,
}

impl ModalQueueState {
    pub fn active(&self) -> Option<&QueuedModal> {
        self.active.as_ref()
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    pub fn backlog_ids(&self) -> Vec<&str> {
        self.backlog.iter().map(|m| m.id.as_str()).collect()
    }

    pub fn is_closing(&self) -> bool {
        self.is_closing
    }

    /// True while anything is on screen or waiting to be shown.
    pub fn has_pending_modals(&self) -> bool {
        self.active.is_some() || !self.backlog.is_empty()
    }

    /// Queue a modal. The oldest backlog entry is evicted (with a warning)
    /// when the backlog is full. Deferred modals always join the backlog;
    /// everything else becomes active immediately when nothing is shown and
    /// no close animation is running.
    pub fn enqueue(&mut self, modal: QueuedModal) {
        if self.backlog.len() >= MAX_QUEUE_SIZE {
            if let Some(dropped) = self.backlog.pop_front() {
                gloo::console::warn!(format!(
                    "modal-queue: backlog full ({MAX_QUEUE_SIZE}), dropping oldest modal '{}'",
                    dropped.id
                ));
            }
        }
        if modal.defer {
            self.backlog.push_back(modal);
        } else if self.active.is_none() && !self.is_closing {
            self.set_active(modal);
        } else {
            self.backlog.push_back(modal);
        }
    }

    /// Interrupt semantics: replace whatever is active and drop the backlog.
    pub fn show(&mut self, modal: QueuedModal) {
        self.backlog.clear();
        self.is_closing = false;
        self.set_active(modal);
    }

    /// First half of the close sequence. Returns false (no-op) when nothing
    /// is active or a close is already running.
    pub fn begin_close(&mut self) -> bool {
        if self.active.is_none() || self.is_closing {
            return false;
        }
        self.is_closing = true;
        true
    }

    /// Second half of the close sequence: drop the active modal and promote
    /// the backlog head. Runs after the animation delay has elapsed.
    pub fn finish_close(&mut self) {
        self.active = None;
        self.is_closing = false;
        self.announcement = Some("Modal closed".to_string());
        if let Some(next) = self.backlog.pop_front() {
            self.set_active(next);
        }
    }

    /// Promote the backlog head when nothing is active. Used by modals that
    /// close outside the queue, and to surface deferred modals.
    pub fn show_next(&mut self) {
        if self.active.is_some() || self.is_closing {
            return;
        }
        if let Some(next) = self.backlog.pop_front() {
            self.set_active(next);
        }
    }

    /// Drop everything immediately, skipping the close animation. Applied on
    /// route changes so stale dialogs never follow the user to another page.
    pub fn clear(&mut self) {
        self.backlog.clear();
        self.is_closing = false;
        if self.active.take().is_some() {
            self.announcement = Some("Modal closed".to_string());
        }
    }

    /// Drop only the backlog; the active modal keeps its own close sequence.
    pub fn cancel(&mut self) {
        self.backlog.clear();
    }

    /// Remove the active modal without animation and promote the next entry.
    /// This is the default recovery path when a modal fails to render.
    pub fn drop_active_and_advance(&mut self) {
        self.active = None;
        self.is_closing = false;
        self.announcement = Some("Modal closed".to_string());
        if let Some(next) = self.backlog.pop_front() {
            self.set_active(next);
        }
    }

    fn set_active(&mut self, modal: QueuedModal) {
        self.announcement = Some(format!("{} opened", modal.kind.aria_label()));
        self.active = Some(modal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn plain_modal(id: &str) -> QueuedModal {
        QueuedModal {
            id: id.to_string(),
            ..QueuedModal::new(ModalKind::Alert(crate::components::alert_dialog::AlertDialogProps {
                message: "test".to_string(),
                title: None,
                on_dismiss: Callback::noop(),
            }))
        }
    }

    fn deferred_modal(id: &str) -> QueuedModal {
        QueuedModal {
            defer: true,
            ..plain_modal(id)
        }
    }

    #[wasm_bindgen_test]
    fn enqueue_activates_immediately_when_idle() {
        let mut state = ModalQueueState::default();
        state.enqueue(plain_modal("a"));
        assert_eq!(state.active().unwrap().id, "a");
        assert_eq!(state.backlog_len(), 0);
        assert!(state.has_pending_modals());
    }

    #[wasm_bindgen_test]
    fn at_most_one_active_with_fifo_backlog() {
        let mut state = ModalQueueState::default();
        state.enqueue(plain_modal("a"));
        state.enqueue(plain_modal("b"));
        state.enqueue(plain_modal("c"));
        assert_eq!(state.active().unwrap().id, "a");
        assert_eq!(state.backlog_ids(), vec!["b", "c"]);

        state.begin_close();
        state.finish_close();
        assert_eq!(state.active().unwrap().id, "b");

        state.begin_close();
        state.finish_close();
        assert_eq!(state.active().unwrap().id, "c");

        state.begin_close();
        state.finish_close();
        assert!(state.active().is_none());
        assert!(!state.has_pending_modals());
    }

    #[wasm_bindgen_test]
    fn deferred_modal_waits_for_show_next() {
        let mut state = ModalQueueState::default();
        state.enqueue(deferred_modal("d"));
        assert!(state.active().is_none());
        assert_eq!(state.backlog_len(), 1);

        state.show_next();
        assert_eq!(state.active().unwrap().id, "d");
        assert_eq!(state.backlog_len(), 0);
    }

    #[wasm_bindgen_test]
    fn show_next_is_noop_while_active() {
        let mut state = ModalQueueState::default();
        state.enqueue(plain_modal("a"));
        state.enqueue(deferred_modal("b"));
        state.show_next();
        assert_eq!(state.active().unwrap().id, "a");
        assert_eq!(state.backlog_len(), 1);
    }

    #[wasm_bindgen_test]
    fn capacity_eviction_drops_oldest() {
        let mut state = ModalQueueState::default();
        for i in 0..11 {
            state.enqueue(deferred_modal(&format!("m{i}")));
        }
        assert_eq!(state.backlog_len(), MAX_QUEUE_SIZE);
        let ids = state.backlog_ids();
        assert_eq!(ids.first(), Some(&"m1"));
        assert_eq!(ids.last(), Some(&"m10"));
    }

    #[wasm_bindgen_test]
    fn show_replaces_active_and_clears_backlog() {
        let mut state = ModalQueueState::default();
        state.enqueue(plain_modal("a"));
        state.enqueue(plain_modal("b"));
        state.show(plain_modal("urgent"));
        assert_eq!(state.active().unwrap().id, "urgent");
        assert_eq!(state.backlog_len(), 0);
    }

    #[wasm_bindgen_test]
    fn cancel_keeps_active_clear_drops_everything() {
        let mut state = ModalQueueState::default();
        state.enqueue(plain_modal("a"));
        state.enqueue(plain_modal("b"));

        state.cancel();
        assert!(state.active().is_some());
        assert_eq!(state.backlog_len(), 0);

        state.enqueue(plain_modal("c"));
        state.clear();
        assert!(state.active().is_none());
        assert_eq!(state.backlog_len(), 0);
        assert!(!state.has_pending_modals());
    }

    #[wasm_bindgen_test]
    fn no_activation_during_close_window() {
        let mut state = ModalQueueState::default();
        state.enqueue(plain_modal("a"));
        assert!(state.begin_close());

        // enqueue during the close window joins the backlog
        state.enqueue(plain_modal("b"));
        assert_eq!(state.active().unwrap().id, "a");
        assert_eq!(state.backlog_len(), 1);

        // a second close request is a no-op while closing
        assert!(!state.begin_close());

        state.finish_close();
        assert_eq!(state.active().unwrap().id, "b");
    }

    #[wasm_bindgen_test]
    fn announcements_follow_active_transitions() {
        let mut state = ModalQueueState::default();
        state.enqueue(plain_modal("a"));
        assert_eq!(state.announcement.as_deref(), Some("Notice opened"));

        state.begin_close();
        state.finish_close();
        assert_eq!(state.announcement.as_deref(), Some("Modal closed"));
    }
}
