use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::alert_dialog::{AlertDialogProps, ConfirmDialogProps};
use crate::modal::kinds::ModalKind;
use crate::modal::provider::ModalQueueHandle;
use crate::modal::queue::QueuedModal;

/// Simple single-step notices on top of the modal queue. Dialogs shown here
/// take part in the same serialization as the multi-step flows, so an alert
/// never overlaps a wizard.
#[derive(Clone, PartialEq)]
pub struct DialogService {
    queue: ModalQueueHandle,
}

impl DialogService {
    pub fn new(queue: ModalQueueHandle) -> Self {
        Self { queue }
    }

    /// Show a notice and resolve once the user has dismissed it and its
    /// close animation has finished.
    pub async fn alert(&self, message: String, title: Option<String>) {
        let (dismissed_tx, dismissed_rx) = oneshot::channel::<()>();
        let dismissed_tx = Rc::new(RefCell::new(Some(dismissed_tx)));
        let on_dismiss = {
            let queue = self.queue.clone();
            Callback::from(move |_: ()| {
                let queue = queue.clone();
                let dismissed_tx = dismissed_tx.clone();
                spawn_local(async move {
                    queue.close_current().await;
                    if let Some(tx) = dismissed_tx.borrow_mut().take() {
                        let _ = tx.send(());
                    }
                });
            })
        };

        self.queue.enqueue(QueuedModal::new(ModalKind::Alert(AlertDialogProps {
            message,
            title,
            on_dismiss,
        })));

        // A dropped sender (queue cleared on navigation) resolves too; the
        // caller should not hang on a dialog that no longer exists.
        let _ = dismissed_rx.await;
    }

    /// Ask a yes/no question; resolves with the choice after the dialog has
    /// closed. Navigation away counts as "no".
    pub async fn confirm(&self, message: String, title: Option<String>) -> bool {
        let (choice_tx, choice_rx) = oneshot::channel::<bool>();
        let choice_tx = Rc::new(RefCell::new(Some(choice_tx)));
        let on_choice = {
            let queue = self.queue.clone();
            Callback::from(move |choice: bool| {
                let queue = queue.clone();
                let choice_tx = choice_tx.clone();
                spawn_local(async move {
                    queue.close_current().await;
                    if let Some(tx) = choice_tx.borrow_mut().take() {
                        let _ = tx.send(choice);
                    }
                });
            })
        };

        self.queue.enqueue(QueuedModal::new(ModalKind::Confirm(ConfirmDialogProps {
            message,
            title,
            on_choice,
        })));

        choice_rx.await.unwrap_or(false)
    }
}
