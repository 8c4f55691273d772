use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use gloo::timers::future::TimeoutFuture;
use shared::{AssignPractitionerRequest, Patient, Practitioner};
use wasm_bindgen_futures::spawn_local;
use web_sys::MouseEvent;
use yew::prelude::*;

use crate::modal::kinds::ModalKind;
use crate::modal::provider::ModalQueueHandle;
use crate::modal::queue::QueuedModal;
use crate::services::api::ApiClient;
use crate::services::dialog::DialogService;
use crate::services::logging::Logger;

/// Pause between the previous dialog's close animation and the next queued
/// modal, so the two never overlap visually.
pub const FOLLOW_UP_DELAY_MS: u32 = 250;

/// Map practitioner ids to display names using the clinic roster.
pub fn practitioner_names(ids: &[String], roster: &[Practitioner]) -> Vec<String> {
    ids.iter()
        .map(|id| {
            roster
                .iter()
                .find(|practitioner| practitioner.id == *id)
                .map(|practitioner| practitioner.name.clone())
                .unwrap_or_else(|| id.clone())
        })
        .collect()
}

#[derive(Properties, PartialEq, Clone)]
pub struct AssignmentPromptModalProps {
    pub patient_name: String,
    pub practitioner_name: String,
    /// Names of the practitioners currently assigned to the patient
    pub assigned_names: Vec<String>,
    pub on_choice: Callback<bool>,
}

#[function_component(AssignmentPromptModal)]
pub fn assignment_prompt_modal(props: &AssignmentPromptModalProps) -> Html {
    let on_confirm = {
        let on_choice = props.on_choice.clone();
        Callback::from(move |_: MouseEvent| on_choice.emit(true))
    };
    let on_cancel = {
        let on_choice = props.on_choice.clone();
        Callback::from(move |_: MouseEvent| on_choice.emit(false))
    };

    html! {
        <div class="assignment-modal">
            <h2>{format!("Assign {} to {}?", props.practitioner_name, props.patient_name)}</h2>
            <p>
                {format!(
                    "{} is not one of {}'s assigned practitioners. Booking an appointment does not assign them automatically.",
                    props.practitioner_name, props.patient_name
                )}
            </p>
            {if props.assigned_names.is_empty() {
                html! { <p>{"No practitioners are currently assigned."}</p> }
            } else {
                html! {
                    <>
                        <p>{"Currently assigned:"}</p>
                        <ul class="assigned-list">
                            {for props.assigned_names.iter().map(|name| html! { <li>{name}</li> })}
                        </ul>
                    </>
                }
            }}
            <div class="assignment-modal-actions">
                <button class="btn btn-secondary" onclick={on_cancel}>{"Not now"}</button>
                <button class="btn btn-primary" onclick={on_confirm}>{"Assign"}</button>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct AssignmentConfirmationModalProps {
    pub patient_name: String,
    /// Assigned practitioner names after the assignment went through
    pub assigned_names: Vec<String>,
    pub on_dismiss: Callback<()>,
}

#[function_component(AssignmentConfirmationModal)]
pub fn assignment_confirmation_modal(props: &AssignmentConfirmationModalProps) -> Html {
    let on_ok = {
        let on_dismiss = props.on_dismiss.clone();
        Callback::from(move |_: MouseEvent| on_dismiss.emit(()))
    };

    html! {
        <div class="assignment-modal">
            <h2>{format!("Practitioners assigned to {}", props.patient_name)}</h2>
            <ul class="assigned-list">
                {for props.assigned_names.iter().map(|name| html! { <li>{name}</li> })}
            </ul>
            <div class="assignment-modal-actions">
                <button class="btn btn-primary" onclick={on_ok}>{"OK"}</button>
            </div>
        </div>
    }
}

/// Follow-up sequence after a successful edit whose practitioner is not yet
/// assigned to the patient: prompt first, then the assignment call, then a
/// summary of the updated assignment set. Cancelling the prompt ends the
/// flow without any API call. Runs after the success alert has been
/// dismissed; each queued modal is deferred and surfaced with `show_next`
/// after the inter-modal delay.
pub async fn run_assignment_followup(
    queue: ModalQueueHandle,
    dialogs: DialogService,
    api_client: ApiClient,
    patient: Patient,
    practitioner: Practitioner,
    roster: Vec<Practitioner>,
) {
    let (choice_tx, choice_rx) = oneshot::channel::<bool>();
    let choice_tx = Rc::new(RefCell::new(Some(choice_tx)));
    let on_choice = {
        let queue = queue.clone();
        Callback::from(move |confirmed: bool| {
            let queue = queue.clone();
            let choice_tx = choice_tx.clone();
            spawn_local(async move {
                queue.close_current().await;
                if let Some(tx) = choice_tx.borrow_mut().take() {
                    let _ = tx.send(confirmed);
                }
            });
        })
    };

    queue.enqueue(QueuedModal::deferred(ModalKind::AssignmentPrompt(
        AssignmentPromptModalProps {
            patient_name: patient.name.clone(),
            practitioner_name: practitioner.name.clone(),
            assigned_names: practitioner_names(&patient.assigned_practitioner_ids, &roster),
            on_choice,
        },
    )));
    TimeoutFuture::new(FOLLOW_UP_DELAY_MS).await;
    queue.show_next();

    // Resolves once the prompt's close animation has finished. A dropped
    // sender (queue cleared on navigation) counts as a cancel.
    let confirmed = choice_rx.await.unwrap_or(false);
    if !confirmed {
        return;
    }

    let request = AssignPractitionerRequest {
        practitioner_id: practitioner.id.clone(),
    };
    match api_client.assign_practitioner(&patient.id, request).await {
        Ok(response) => {
            let on_dismiss = {
                let queue = queue.clone();
                Callback::from(move |_: ()| {
                    let queue = queue.clone();
                    spawn_local(async move {
                        queue.close_current().await;
                    });
                })
            };
            queue.enqueue(QueuedModal::deferred(ModalKind::AssignmentConfirmation(
                AssignmentConfirmationModalProps {
                    patient_name: response.patient.name.clone(),
                    assigned_names: practitioner_names(
                        &response.patient.assigned_practitioner_ids,
                        &roster,
                    ),
                    on_dismiss,
                },
            )));
            TimeoutFuture::new(FOLLOW_UP_DELAY_MS).await;
            queue.show_next();
        }
        Err(message) => {
            Logger::error_with_component(
                "assignment-flow",
                &format!("practitioner assignment failed: {message}"),
            );
            dialogs
                .alert(
                    format!("Could not assign {}: {}", practitioner.name, message),
                    Some("Assignment failed".to_string()),
                )
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn roster() -> Vec<Practitioner> {
        vec![
            Practitioner {
                id: "pr-1".to_string(),
                name: "Tanaka Yuki".to_string(),
                title: "Physiotherapist".to_string(),
            },
            Practitioner {
                id: "pr-2".to_string(),
                name: "Mori Ken".to_string(),
                title: "Chiropractor".to_string(),
            },
        ]
    }

    #[wasm_bindgen_test]
    fn names_resolve_against_roster() {
        let ids = vec!["pr-2".to_string(), "pr-1".to_string()];
        assert_eq!(
            practitioner_names(&ids, &roster()),
            vec!["Mori Ken".to_string(), "Tanaka Yuki".to_string()]
        );
    }

    #[wasm_bindgen_test]
    fn unknown_ids_fall_back_to_the_id() {
        let ids = vec!["pr-9".to_string()];
        assert_eq!(practitioner_names(&ids, &roster()), vec!["pr-9".to_string()]);
    }
}
