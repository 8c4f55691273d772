use shared::{Appointment, AppointmentType, ClinicResource, Practitioner};
use wasm_bindgen_futures::spawn_local;
use web_sys::MouseEvent;
use yew::prelude::*;

use crate::components::assignment_modals::run_assignment_followup;
use crate::components::edit_appointment_modal::{EditAppointmentModalProps, EditCompletion};
use crate::hooks::use_schedule::use_schedule;
use crate::modal::kinds::ModalKind;
use crate::modal::provider::use_modal_queue;
use crate::modal::queue::QueuedModal;
use crate::services::api::ApiClient;
use crate::services::dialog::DialogService;
use crate::services::logging::Logger;
use crate::services::query_cache::QueryCache;

#[derive(Properties, PartialEq)]
pub struct SchedulePageProps {
    pub api_client: ApiClient,
    pub schedule_cache: QueryCache<Vec<Appointment>>,
    pub clinic_id: String,
}

#[function_component(SchedulePage)]
pub fn schedule_page(props: &SchedulePageProps) -> Html {
    let queue = use_modal_queue();
    let dialogs = DialogService::new(queue.clone());

    let date = use_state(|| chrono::Local::now().format("%Y-%m-%d").to_string());
    let schedule = use_schedule(&props.api_client, &props.schedule_cache, &props.clinic_id, &date);

    // Clinic roster and catalogs, loaded once; the edit wizard needs all of
    // them for its selects.
    let practitioners = use_state(Vec::<Practitioner>::new);
    let appointment_types = use_state(Vec::<AppointmentType>::new);
    let resources = use_state(Vec::<ClinicResource>::new);

    {
        let api_client = props.api_client.clone();
        let clinic_id = props.clinic_id.clone();
        let practitioners = practitioners.clone();
        let appointment_types = appointment_types.clone();
        let resources = resources.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match api_client.get_practitioners(&clinic_id).await {
                    Ok(fetched) => practitioners.set(fetched),
                    Err(e) => Logger::error_with_component(
                        "schedule",
                        &format!("failed to load practitioners: {e}"),
                    ),
                }
                match api_client.get_appointment_types(&clinic_id).await {
                    Ok(fetched) => appointment_types.set(fetched),
                    Err(e) => Logger::error_with_component(
                        "schedule",
                        &format!("failed to load appointment types: {e}"),
                    ),
                }
                match api_client.get_resources(&clinic_id).await {
                    Ok(fetched) => resources.set(fetched),
                    Err(e) => Logger::error_with_component(
                        "schedule",
                        &format!("failed to load resources: {e}"),
                    ),
                }
            });
            || ()
        });
    }

    let open_edit = {
        let api_client = props.api_client.clone();
        let queue = queue.clone();
        let dialogs = dialogs.clone();
        let practitioners = practitioners.clone();
        let appointment_types = appointment_types.clone();
        let resources = resources.clone();
        let refresh = schedule.actions.refresh.clone();

        Callback::from(move |appointment: Appointment| {
            let api_client = api_client.clone();
            let queue = queue.clone();
            let dialogs = dialogs.clone();
            let roster = (*practitioners).clone();
            let appointment_types = (*appointment_types).clone();
            let resources = (*resources).clone();
            let refresh = refresh.clone();

            spawn_local(async move {
                let patient = match api_client.get_patient(&appointment.patient_id).await {
                    Ok(patient) => patient,
                    Err(message) => {
                        dialogs
                            .alert(
                                format!("Could not load patient record: {message}"),
                                Some("Error".to_string()),
                            )
                            .await;
                        return;
                    }
                };

                let on_complete = {
                    let api_client = api_client.clone();
                    let queue = queue.clone();
                    let dialogs = dialogs.clone();
                    let patient = patient.clone();
                    let roster = roster.clone();
                    let refresh = refresh.clone();
                    Callback::from(move |completion: EditCompletion| {
                        let api_client = api_client.clone();
                        let queue = queue.clone();
                        let dialogs = dialogs.clone();
                        let patient = patient.clone();
                        let roster = roster.clone();
                        let refresh = refresh.clone();
                        spawn_local(async move {
                            // The wizard is done; wait out its close
                            // animation before the success notice appears.
                            queue.close_current().await;
                            refresh.emit(());
                            dialogs
                                .alert(
                                    "Appointment updated.".to_string(),
                                    Some("Saved".to_string()),
                                )
                                .await;

                            if !patient.is_assigned(&completion.practitioner_id) {
                                let practitioner = roster
                                    .iter()
                                    .find(|p| p.id == completion.practitioner_id)
                                    .cloned();
                                if let Some(practitioner) = practitioner {
                                    run_assignment_followup(
                                        queue,
                                        dialogs,
                                        api_client,
                                        patient,
                                        practitioner,
                                        roster,
                                    )
                                    .await;
                                }
                            }
                        });
                    })
                };

                let on_cancel = {
                    let queue = queue.clone();
                    Callback::from(move |_: ()| {
                        let queue = queue.clone();
                        spawn_local(async move {
                            queue.close_current().await;
                        });
                    })
                };

                queue.enqueue(QueuedModal::new(ModalKind::EditAppointment(
                    EditAppointmentModalProps {
                        appointment,
                        patient,
                        practitioners: roster,
                        appointment_types,
                        resources,
                        api_client,
                        on_complete,
                        on_cancel,
                    },
                )));
            });
        })
    };

    let on_date_change = {
        let date = date.clone();
        Callback::from(move |e: Event| {
            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
            date.set(input.value());
        })
    };

    let practitioner_name = |id: &str| {
        practitioners
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    html! {
        <section class="schedule-page">
            <div class="schedule-header">
                <h2>{"Schedule"}</h2>
                <input type="date" value={(*date).clone()} onchange={on_date_change} />
                {if schedule.state.from_cache {
                    html! { <span class="refreshing-hint">{"Refreshing..."}</span> }
                } else { html! {} }}
            </div>

            {if let Some(message) = &schedule.state.error {
                html! { <div class="form-message error">{message}</div> }
            } else { html! {} }}

            {if schedule.state.loading {
                html! { <div class="loading">{"Loading appointments..."}</div> }
            } else if schedule.state.appointments.is_empty() {
                html! { <div class="empty">{"No appointments on this day."}</div> }
            } else {
                html! {
                    <table class="schedule-table">
                        <thead>
                            <tr>
                                <th>{"Time"}</th>
                                <th>{"Practitioner"}</th>
                                <th>{"Status"}</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            {for schedule.state.appointments.iter().map(|appointment| {
                                let time = appointment
                                    .start_time_parsed()
                                    .map(|start| start.format("%H:%M").to_string())
                                    .unwrap_or_else(|_| appointment.start_time.clone());
                                let on_click = {
                                    let open_edit = open_edit.clone();
                                    let appointment = appointment.clone();
                                    Callback::from(move |_: MouseEvent| {
                                        open_edit.emit(appointment.clone());
                                    })
                                };
                                html! {
                                    <tr>
                                        <td>{time}</td>
                                        <td>{practitioner_name(&appointment.practitioner_id)}</td>
                                        <td>
                                            {if appointment.auto_assigned {
                                                html! { <span class="badge auto">{"Needs confirmation"}</span> }
                                            } else {
                                                html! { <span class="badge">{"Booked"}</span> }
                                            }}
                                        </td>
                                        <td>
                                            <button class="btn btn-small" onclick={on_click}>{"Edit"}</button>
                                        </td>
                                    </tr>
                                }
                            })}
                        </tbody>
                    </table>
                }
            }}
        </section>
    }
}
