use std::cell::RefCell;
use std::rc::Rc;

use gloo::timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::modal::kinds::ModalRenderError;
use crate::modal::queue::{ModalQueueState, QueuedModal, CLOSE_ANIMATION_MS};
use crate::services::logging::Logger;

/// Shared handle over the queue state. Cloning is cheap; all clones point at
/// the same state and the same re-render notifier.
#[derive(Clone)]
pub struct ModalQueueHandle {
    inner: Rc<RefCell<ModalQueueState>>,
    notify: Callback<()>,
}

impl PartialEq for ModalQueueHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl ModalQueueHandle {
    pub fn new(notify: Callback<()>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ModalQueueState::default())),
            notify,
        }
    }

    fn mutate(&self, apply: impl FnOnce(&mut ModalQueueState)) {
        apply(&mut self.inner.borrow_mut());
        self.notify.emit(());
    }

    pub fn enqueue(&self, modal: QueuedModal) {
        self.mutate(|state| state.enqueue(modal));
    }

    pub fn show(&self, modal: QueuedModal) {
        self.mutate(|state| state.show(modal));
    }

    pub fn show_next(&self) {
        self.mutate(|state| state.show_next());
    }

    pub fn clear(&self) {
        self.mutate(|state| state.clear());
    }

    pub fn cancel(&self) {
        self.mutate(|state| state.cancel());
    }

    pub fn has_pending_modals(&self) -> bool {
        self.inner.borrow().has_pending_modals()
    }

    pub fn is_closing(&self) -> bool {
        self.inner.borrow().is_closing()
    }

    pub fn active_modal(&self) -> Option<QueuedModal> {
        self.inner.borrow().active().cloned()
    }

    pub fn backlog_len(&self) -> usize {
        self.inner.borrow().backlog_len()
    }

    pub fn announcement(&self) -> Option<String> {
        self.inner.borrow().announcement.clone()
    }

    /// Close the active modal. The returned future resolves only after the
    /// close animation has elapsed and the next backlog entry (if any) has
    /// been promoted, so callers can sequence follow-up dialogs safely.
    pub async fn close_current(&self) {
        let began = self.inner.borrow_mut().begin_close();
        if !began {
            return;
        }
        self.notify.emit(());
        TimeoutFuture::new(CLOSE_ANIMATION_MS).await;
        self.inner.borrow_mut().finish_close();
        self.notify.emit(());
    }

    /// Recovery path for a modal whose render failed: report through the
    /// modal's own `on_error` when it has one, otherwise drop it and advance
    /// so the queue can never get stuck behind a broken entry.
    pub fn resolve_render_failure(&self, modal: &QueuedModal, error: ModalRenderError) {
        Logger::error_with_component(
            "modal-queue",
            &format!("modal '{}' failed to render: {error}", modal.id),
        );
        if let Some(on_error) = &modal.on_error {
            on_error.emit(error);
        } else {
            self.mutate(|state| state.drop_active_and_advance());
        }
    }
}

/// Retrieve the queue handle from context. Panics outside a
/// `ModalQueueProvider`, which is a wiring bug, not a runtime condition.
#[hook]
pub fn use_modal_queue() -> ModalQueueHandle {
    use_context::<ModalQueueHandle>().expect("ModalQueueProvider is missing from the component tree")
}

struct QueueVersion(u64);

impl Reducible for QueueVersion {
    type Action = ();

    fn reduce(self: Rc<Self>, _action: ()) -> Rc<Self> {
        Rc::new(QueueVersion(self.0.wrapping_add(1)))
    }
}

#[derive(Properties, PartialEq)]
pub struct ModalQueueProviderProps {
    /// Identifies the current logical page flow; the queue self-clears when
    /// it changes so dialogs never follow the user across navigation.
    #[prop_or_default]
    pub page_key: String,
    pub children: Children,
}

#[function_component(ModalQueueProvider)]
pub fn modal_queue_provider(props: &ModalQueueProviderProps) -> Html {
    let version = use_reducer(|| QueueVersion(0));
    let handle = {
        let version = version.clone();
        use_memo((), move |_| {
            ModalQueueHandle::new(Callback::from(move |_| version.dispatch(())))
        })
    };

    html! {
        <ContextProvider<ModalQueueHandle> context={(*handle).clone()}>
            { for props.children.iter() }
            <ModalHost
                handle={(*handle).clone()}
                version={version.0}
                page_key={props.page_key.clone()}
            />
        </ContextProvider<ModalQueueHandle>>
    }
}

#[derive(Properties, PartialEq)]
struct ModalHostProps {
    handle: ModalQueueHandle,
    /// Bumped by the queue on every state change to force a re-render.
    version: u64,
    #[prop_or_default]
    page_key: String,
}

#[function_component(ModalHost)]
fn modal_host(props: &ModalHostProps) -> Html {
    // Tracks the id already reported as broken so a re-render cannot invoke
    // the error path twice for the same modal instance.
    let reported_failure = use_mut_ref(|| Option::<String>::None);

    {
        let handle = props.handle.clone();
        use_effect_with(props.page_key.clone(), move |_| {
            handle.clear();
            || ()
        });
    }

    let announcement = props.handle.announcement().unwrap_or_default();

    let body = match props.handle.active_modal() {
        None => html! {},
        Some(modal) => match modal.kind.render() {
            Ok(content) => {
                let backdrop_class = if props.handle.is_closing() {
                    "modal-backdrop closing"
                } else {
                    "modal-backdrop"
                };
                html! {
                    <div class={backdrop_class} role="dialog" aria-modal="true"
                        aria-label={modal.kind.aria_label()}>
                        {content}
                    </div>
                }
            }
            Err(error) => {
                let already_reported =
                    reported_failure.borrow().as_deref() == Some(modal.id.as_str());
                if !already_reported {
                    *reported_failure.borrow_mut() = Some(modal.id.clone());
                    let handle = props.handle.clone();
                    // Deferred so the recovery mutation never runs inside
                    // this render pass.
                    spawn_local(async move {
                        handle.resolve_render_failure(&modal, error);
                    });
                }
                html! {}
            }
        },
    };

    html! {
        <>
            <div class="sr-only" aria-live="polite">{announcement}</div>
            {body}
        </>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::alert_dialog::AlertDialogProps;
    use crate::components::edit_appointment_modal::EditAppointmentModalProps;
    use crate::modal::kinds::ModalKind;
    use crate::services::api::ApiClient;
    use shared::{Appointment, Patient};
    use std::cell::Cell;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn alert_modal(id: &str) -> QueuedModal {
        QueuedModal {
            id: id.to_string(),
            ..QueuedModal::new(ModalKind::Alert(AlertDialogProps {
                message: "test".to_string(),
                title: None,
                on_dismiss: Callback::noop(),
            }))
        }
    }

    fn broken_edit_modal() -> QueuedModal {
        let appointment = Appointment {
            id: "ap-broken".to_string(),
            clinic_id: "cl-1".to_string(),
            patient_id: "pa-1".to_string(),
            practitioner_id: "pr-1".to_string(),
            appointment_type_id: "ty-1".to_string(),
            start_time: "not-a-timestamp".to_string(),
            clinic_notes: String::new(),
            resource_ids: vec![],
            auto_assigned: false,
        };
        let patient = Patient {
            id: "pa-1".to_string(),
            name: "Sato Aiko".to_string(),
            assigned_practitioner_ids: vec![],
            messaging_channel: None,
        };
        QueuedModal::new(ModalKind::EditAppointment(EditAppointmentModalProps {
            appointment,
            patient,
            practitioners: vec![],
            appointment_types: vec![],
            resources: vec![],
            api_client: ApiClient::new(),
            on_complete: Callback::noop(),
            on_cancel: Callback::noop(),
        }))
    }

    #[wasm_bindgen_test]
    async fn close_current_waits_for_the_animation() {
        let handle = ModalQueueHandle::new(Callback::noop());
        handle.enqueue(alert_modal("a"));

        let started = js_sys::Date::now();
        handle.close_current().await;
        let elapsed = js_sys::Date::now() - started;

        assert!(
            elapsed >= CLOSE_ANIMATION_MS as f64,
            "close resolved after {elapsed}ms"
        );
        assert!(handle.active_modal().is_none());
    }

    #[wasm_bindgen_test]
    async fn close_current_promotes_the_backlog_head() {
        let handle = ModalQueueHandle::new(Callback::noop());
        handle.enqueue(alert_modal("a"));
        handle.enqueue(alert_modal("b"));

        handle.close_current().await;
        assert_eq!(handle.active_modal().unwrap().id, "b");
    }

    #[wasm_bindgen_test]
    fn broken_modal_render_fails() {
        let modal = broken_edit_modal();
        assert!(modal.kind.render().is_err());
    }

    #[wasm_bindgen_test]
    fn default_recovery_advances_past_a_broken_modal() {
        let handle = ModalQueueHandle::new(Callback::noop());
        let broken = broken_edit_modal();
        handle.enqueue(broken.clone());
        handle.enqueue(alert_modal("next"));

        let error = broken.kind.render().unwrap_err();
        handle.resolve_render_failure(&broken, error);

        assert_eq!(handle.active_modal().unwrap().id, "next");
        assert_eq!(handle.backlog_len(), 0);
    }

    #[wasm_bindgen_test]
    fn custom_on_error_is_invoked_instead_of_advancing() {
        let handle = ModalQueueHandle::new(Callback::noop());
        let calls = Rc::new(Cell::new(0u32));
        let on_error = {
            let calls = calls.clone();
            Callback::from(move |_: ModalRenderError| calls.set(calls.get() + 1))
        };
        let broken = broken_edit_modal().with_on_error(on_error);
        handle.enqueue(broken.clone());

        let error = broken.kind.render().unwrap_err();
        handle.resolve_render_failure(&broken, error);

        assert_eq!(calls.get(), 1);
        // the caller owns recovery; the queue leaves the modal in place
        assert!(handle.active_modal().is_some());
    }
}
