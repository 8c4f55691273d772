use chrono::offset::LocalResult;
use chrono::{NaiveDate, NaiveTime, TimeZone};
use shared::{
    Appointment, AppointmentType, AppointmentUpdateRequest, ClinicResource,
    NotificationPreviewRequest, NotificationPreviewResult, Patient, Practitioner,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement, MouseEvent};
use yew::prelude::*;

use crate::services::api::ApiClient;
use crate::services::logging::Logger;

/// Wizard steps. Saving is not a step of its own; the active step keeps its
/// buttons disabled while a save or preview call is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum EditStep {
    Form,
    Review,
    Note,
    Preview,
}

/// Client-side draft of the edit, diffed against the original appointment
/// when the save payload is built.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDraft {
    pub appointment_type_id: String,
    pub practitioner_id: String,
    /// Date portion, `YYYY-MM-DD`
    pub date: String,
    /// Time portion, `HH:MM`
    pub time: String,
    pub clinic_notes: String,
    pub selected_resource_ids: Vec<String>,
    pub notification_note: String,
}

/// Which parts of the draft differ from the original appointment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChangeDetails {
    pub appointment_type_changed: bool,
    pub practitioner_changed: bool,
    pub date_changed: bool,
    pub time_changed: bool,
    pub resources_changed: bool,
}

/// Handed to `on_complete` after a successful save, so the caller can run
/// follow-up flows without reaching back into wizard state.
#[derive(Debug, Clone, PartialEq)]
pub struct EditCompletion {
    pub appointment: Appointment,
    pub patient_id: String,
    pub practitioner_id: String,
}

/// Split the original start time into the form's date and time fields.
pub fn original_date_time(appointment: &Appointment) -> Result<(String, String), chrono::ParseError> {
    let start = appointment.start_time_parsed()?;
    Ok((
        start.format("%Y-%m-%d").to_string(),
        start.format("%H:%M").to_string(),
    ))
}

/// Rebuild an RFC 3339 start time from the form's date and time fields,
/// keeping the original appointment's UTC offset.
pub fn combine_start_time(
    original: &Appointment,
    date: &str,
    time: &str,
) -> Result<String, String> {
    let original_start = original
        .start_time_parsed()
        .map_err(|e| format!("Original start time is invalid: {e}"))?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| "Please enter a valid date".to_string())?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| "Please enter a valid time".to_string())?;
    match original_start.offset().from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(start) | LocalResult::Ambiguous(start, _) => Ok(start.to_rfc3339()),
        LocalResult::None => Err("The selected date and time do not exist".to_string()),
    }
}

/// Diff the draft against the original appointment snapshot.
pub fn change_details(original: &Appointment, draft: &AppointmentDraft) -> ChangeDetails {
    let (original_date, original_time) = original_date_time(original).unwrap_or_default();
    let mut original_resources = original.resource_ids.clone();
    let mut draft_resources = draft.selected_resource_ids.clone();
    original_resources.sort();
    draft_resources.sort();
    ChangeDetails {
        appointment_type_changed: draft.appointment_type_id != original.appointment_type_id,
        practitioner_changed: draft.practitioner_id != original.practitioner_id,
        date_changed: draft.date != original_date,
        time_changed: draft.time != original_time,
        resources_changed: draft_resources != original_resources,
    }
}

/// Build the partial save payload. Only fields that actually changed are
/// included, except `practitioner_id` and `start_time` which are always sent.
pub fn build_update_request(
    original: &Appointment,
    draft: &AppointmentDraft,
    confirm_time: bool,
) -> Result<AppointmentUpdateRequest, String> {
    let details = change_details(original, draft);
    let start_time = combine_start_time(original, &draft.date, &draft.time)?;

    let mut request = AppointmentUpdateRequest {
        practitioner_id: Some(draft.practitioner_id.clone()),
        start_time: Some(start_time),
        ..Default::default()
    };
    if details.appointment_type_changed {
        request.appointment_type_id = Some(draft.appointment_type_id.clone());
    }
    if draft.clinic_notes.trim() != original.clinic_notes.trim() {
        request.clinic_notes = Some(draft.clinic_notes.trim().to_string());
    }
    if !draft.selected_resource_ids.is_empty() || details.resources_changed {
        request.selected_resource_ids = Some(draft.selected_resource_ids.clone());
    }
    if !draft.notification_note.trim().is_empty() {
        request.notification_note = Some(draft.notification_note.trim().to_string());
    }
    if confirm_time {
        request.confirm_time_selection = Some(true);
    }
    Ok(request)
}

/// Where the review step goes next. The notification decision belongs to the
/// backend; the client only routes on the preview's answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    /// Save immediately, no note/preview steps
    SaveDirect,
    /// A notification will be sent; collect the optional custom note first
    CollectNote(NotificationPreviewResult),
}

/// Fail-open routing: a preview that cannot be fetched must never trap the
/// user, so any preview failure degrades to a direct save.
pub fn review_outcome(
    has_channel: bool,
    preview: Option<Result<NotificationPreviewResult, String>>,
) -> ReviewOutcome {
    if !has_channel {
        return ReviewOutcome::SaveDirect;
    }
    match preview {
        Some(Ok(result)) if result.will_send_notification => ReviewOutcome::CollectNote(result),
        Some(Ok(_)) => ReviewOutcome::SaveDirect,
        Some(Err(_)) | None => ReviewOutcome::SaveDirect,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct FormFieldErrors {
    appointment_type: Option<String>,
    practitioner: Option<String>,
    time: Option<String>,
}

#[derive(Properties, PartialEq, Clone)]
pub struct EditAppointmentModalProps {
    pub appointment: Appointment,
    pub patient: Patient,
    pub practitioners: Vec<Practitioner>,
    pub appointment_types: Vec<AppointmentType>,
    pub resources: Vec<ClinicResource>,
    pub api_client: ApiClient,
    pub on_complete: Callback<EditCompletion>,
    pub on_cancel: Callback<()>,
}

#[function_component(EditAppointmentModal)]
pub fn edit_appointment_modal(props: &EditAppointmentModalProps) -> Html {
    let (initial_date, initial_time) = original_date_time(&props.appointment).unwrap_or_default();

    let current_step = use_state(|| EditStep::Form);
    let appointment_type_id = use_state(|| props.appointment.appointment_type_id.clone());
    let practitioner_id = use_state(|| props.appointment.practitioner_id.clone());
    let date_value = use_state(|| initial_date);
    let time_value = use_state(|| initial_time);
    let clinic_notes = use_state(|| props.appointment.clinic_notes.clone());
    let selected_resource_ids = use_state(|| props.appointment.resource_ids.clone());
    let notification_note = use_state(String::new);
    let field_errors = use_state(FormFieldErrors::default);
    let error = use_state(|| Option::<String>::None);
    let busy = use_state(|| false);
    let cached_preview = use_state(|| Option::<NotificationPreviewResult>::None);
    // Bumped on every step transition and on practitioner/date/time edits.
    // Async completions compare against it so a response that arrives after
    // the user has moved on cannot apply stale state.
    let step_generation = use_mut_ref(|| 0u64);

    let make_draft = {
        let appointment_type_id = appointment_type_id.clone();
        let practitioner_id = practitioner_id.clone();
        let date_value = date_value.clone();
        let time_value = time_value.clone();
        let clinic_notes = clinic_notes.clone();
        let selected_resource_ids = selected_resource_ids.clone();
        let notification_note = notification_note.clone();
        move || AppointmentDraft {
            appointment_type_id: (*appointment_type_id).clone(),
            practitioner_id: (*practitioner_id).clone(),
            date: (*date_value).clone(),
            time: (*time_value).clone(),
            clinic_notes: (*clinic_notes).clone(),
            selected_resource_ids: (*selected_resource_ids).clone(),
            notification_note: (*notification_note).clone(),
        }
    };

    // Form field handlers. Practitioner/date/time edits invalidate the cached
    // preview: the message content depends on them.
    let on_type_change = {
        let appointment_type_id = appointment_type_id.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            appointment_type_id.set(select.value());
        })
    };

    let on_practitioner_change = {
        let practitioner_id = practitioner_id.clone();
        let cached_preview = cached_preview.clone();
        let step_generation = step_generation.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            practitioner_id.set(select.value());
            cached_preview.set(None);
            *step_generation.borrow_mut() += 1;
        })
    };

    let on_date_change = {
        let date_value = date_value.clone();
        let cached_preview = cached_preview.clone();
        let step_generation = step_generation.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            date_value.set(input.value());
            cached_preview.set(None);
            *step_generation.borrow_mut() += 1;
        })
    };

    let on_time_change = {
        let time_value = time_value.clone();
        let cached_preview = cached_preview.clone();
        let step_generation = step_generation.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            time_value.set(input.value());
            cached_preview.set(None);
            *step_generation.borrow_mut() += 1;
        })
    };

    let on_clinic_notes_change = {
        let clinic_notes = clinic_notes.clone();
        Callback::from(move |e: Event| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            clinic_notes.set(area.value());
        })
    };

    let on_notification_note_change = {
        let notification_note = notification_note.clone();
        Callback::from(move |e: Event| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            notification_note.set(area.value());
        })
    };

    let on_toggle_resource = {
        let selected_resource_ids = selected_resource_ids.clone();
        Callback::from(move |resource_id: String| {
            let mut selected = (*selected_resource_ids).clone();
            if let Some(position) = selected.iter().position(|id| *id == resource_id) {
                selected.remove(position);
            } else {
                selected.push(resource_id);
            }
            selected_resource_ids.set(selected);
        })
    };

    // The save path shared by every terminal edge. Failure returns the user
    // to the form step so they can adjust and resubmit from the top.
    let run_save = {
        let props_appointment = props.appointment.clone();
        let props_patient_id = props.patient.id.clone();
        let api_client = props.api_client.clone();
        let on_complete = props.on_complete.clone();
        let make_draft = make_draft.clone();
        let current_step = current_step.clone();
        let error = error.clone();
        let busy = busy.clone();
        Callback::from(move |confirm_time: bool| {
            let appointment = props_appointment.clone();
            let patient_id = props_patient_id.clone();
            let api_client = api_client.clone();
            let on_complete = on_complete.clone();
            let draft = make_draft();
            let current_step = current_step.clone();
            let error = error.clone();
            let busy = busy.clone();

            busy.set(true);
            error.set(None);

            spawn_local(async move {
                let request = match build_update_request(&appointment, &draft, confirm_time) {
                    Ok(request) => request,
                    Err(message) => {
                        busy.set(false);
                        error.set(Some(message));
                        current_step.set(EditStep::Form);
                        return;
                    }
                };
                match api_client.update_appointment(&appointment.id, request).await {
                    Ok(response) => {
                        busy.set(false);
                        on_complete.emit(EditCompletion {
                            appointment: response.appointment,
                            patient_id,
                            practitioner_id: draft.practitioner_id,
                        });
                    }
                    Err(message) => {
                        Logger::error_with_component(
                            "edit-appointment",
                            &format!("appointment save failed: {message}"),
                        );
                        busy.set(false);
                        error.set(Some(message));
                        current_step.set(EditStep::Form);
                    }
                }
            });
        })
    };

    let on_form_submit = {
        let appointment_type_id = appointment_type_id.clone();
        let practitioner_id = practitioner_id.clone();
        let time_value = time_value.clone();
        let field_errors = field_errors.clone();
        let error = error.clone();
        let current_step = current_step.clone();
        let step_generation = step_generation.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let mut errors = FormFieldErrors::default();
            if appointment_type_id.is_empty() {
                errors.appointment_type = Some("Select an appointment type".to_string());
            }
            if practitioner_id.is_empty() {
                errors.practitioner = Some("Select a practitioner".to_string());
            }
            if time_value.is_empty() {
                errors.time = Some("Select a time".to_string());
            }
            let valid = errors == FormFieldErrors::default();
            field_errors.set(errors);
            if valid {
                error.set(None);
                *step_generation.borrow_mut() += 1;
                current_step.set(EditStep::Review);
            }
        })
    };

    // Whether this review is the auto-assignment confirm shortcut: the
    // backend picked this slot and the clinic kept the time, so the review
    // button commits directly with confirm_time_selection.
    let auto_confirm = {
        let details = change_details(&props.appointment, &make_draft());
        props.appointment.auto_assigned && !details.time_changed && !details.date_changed
    };

    let on_review_next = {
        let props_appointment = props.appointment.clone();
        let props_patient = props.patient.clone();
        let api_client = props.api_client.clone();
        let make_draft = make_draft.clone();
        let run_save = run_save.clone();
        let current_step = current_step.clone();
        let cached_preview = cached_preview.clone();
        let busy = busy.clone();
        let step_generation = step_generation.clone();
        Callback::from(move |_: MouseEvent| {
            let draft = make_draft();
            let details = change_details(&props_appointment, &draft);
            let auto_confirm =
                props_appointment.auto_assigned && !details.time_changed && !details.date_changed;
            if auto_confirm {
                run_save.emit(true);
                return;
            }
            if !props_patient.has_messaging_channel() {
                run_save.emit(false);
                return;
            }

            let new_start_time = match combine_start_time(&props_appointment, &draft.date, &draft.time)
            {
                Ok(start_time) => start_time,
                // Let the save path surface the problem on the form step.
                Err(_) => {
                    run_save.emit(false);
                    return;
                }
            };

            let generation = {
                let mut generation = step_generation.borrow_mut();
                *generation += 1;
                *generation
            };
            let api_client = api_client.clone();
            let appointment_id = props_appointment.id.clone();
            let request = NotificationPreviewRequest {
                new_practitioner_id: draft.practitioner_id.clone(),
                new_start_time,
                note: None,
            };
            let run_save = run_save.clone();
            let current_step = current_step.clone();
            let cached_preview = cached_preview.clone();
            let busy = busy.clone();
            let step_generation = step_generation.clone();

            busy.set(true);
            spawn_local(async move {
                let result = api_client.preview_notification(&appointment_id, request).await;
                if *step_generation.borrow() != generation {
                    return;
                }
                if let Err(message) = &result {
                    Logger::warn_with_component(
                        "edit-appointment",
                        &format!("notification preview failed, saving without notification: {message}"),
                    );
                }
                match review_outcome(true, Some(result)) {
                    ReviewOutcome::SaveDirect => run_save.emit(false),
                    ReviewOutcome::CollectNote(preview) => {
                        busy.set(false);
                        cached_preview.set(Some(preview));
                        *step_generation.borrow_mut() += 1;
                        current_step.set(EditStep::Note);
                    }
                }
            });
        })
    };

    let on_note_next = {
        let props_appointment = props.appointment.clone();
        let api_client = props.api_client.clone();
        let make_draft = make_draft.clone();
        let current_step = current_step.clone();
        let cached_preview = cached_preview.clone();
        let error = error.clone();
        let busy = busy.clone();
        let step_generation = step_generation.clone();
        Callback::from(move |_: MouseEvent| {
            let draft = make_draft();
            let note = draft.notification_note.trim().to_string();

            // The review-step preview was fetched without a note, so it stays
            // valid only while the note field is empty.
            if note.is_empty() && cached_preview.is_some() {
                error.set(None);
                *step_generation.borrow_mut() += 1;
                current_step.set(EditStep::Preview);
                return;
            }

            let new_start_time = match combine_start_time(&props_appointment, &draft.date, &draft.time)
            {
                Ok(start_time) => start_time,
                Err(message) => {
                    error.set(Some(message));
                    return;
                }
            };
            let generation = {
                let mut generation = step_generation.borrow_mut();
                *generation += 1;
                *generation
            };
            let api_client = api_client.clone();
            let appointment_id = props_appointment.id.clone();
            let request = NotificationPreviewRequest {
                new_practitioner_id: draft.practitioner_id.clone(),
                new_start_time,
                note: if note.is_empty() { None } else { Some(note) },
            };
            let current_step = current_step.clone();
            let cached_preview = cached_preview.clone();
            let error = error.clone();
            let busy = busy.clone();
            let step_generation = step_generation.clone();

            busy.set(true);
            error.set(None);
            spawn_local(async move {
                let result = api_client.preview_notification(&appointment_id, request).await;
                if *step_generation.borrow() != generation {
                    return;
                }
                busy.set(false);
                match result {
                    Ok(preview) => {
                        cached_preview.set(Some(preview));
                        *step_generation.borrow_mut() += 1;
                        current_step.set(EditStep::Preview);
                    }
                    Err(message) => {
                        error.set(Some(format!(
                            "Could not load the notification preview: {message}"
                        )));
                    }
                }
            });
        })
    };

    let on_preview_confirm = {
        let run_save = run_save.clone();
        Callback::from(move |_: MouseEvent| {
            run_save.emit(false);
        })
    };

    let go_back = |target: EditStep| {
        let current_step = current_step.clone();
        let error = error.clone();
        let step_generation = step_generation.clone();
        Callback::from(move |_: MouseEvent| {
            error.set(None);
            *step_generation.borrow_mut() += 1;
            current_step.set(target.clone());
        })
    };
    let on_review_back = go_back(EditStep::Form);
    let on_note_back = go_back(EditStep::Review);
    let on_preview_back = go_back(EditStep::Note);

    let on_cancel_click = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_: MouseEvent| {
            on_cancel.emit(());
        })
    };

    let practitioner_name = |id: &str| {
        props
            .practitioners
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    };
    let type_name = |id: &str| {
        props
            .appointment_types
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    let error_banner = if let Some(message) = (*error).as_ref() {
        html! { <div class="form-message error">{message}</div> }
    } else {
        html! {}
    };

    html! {
        <div class="edit-appointment-modal">
            {match (*current_step).clone() {
                EditStep::Form => html! {
                    <div class="edit-step">
                        <div class="edit-step-header">
                            <h2>{format!("Edit appointment for {}", props.patient.name)}</h2>
                        </div>
                        {error_banner.clone()}
                        <form onsubmit={on_form_submit}>
                            <div class="form-group">
                                <label for="appointment-type">{"Appointment type"}</label>
                                <select id="appointment-type" onchange={on_type_change} disabled={*busy}>
                                    <option value="" selected={appointment_type_id.is_empty()}>{"Select..."}</option>
                                    {for props.appointment_types.iter().map(|appointment_type| html! {
                                        <option
                                            value={appointment_type.id.clone()}
                                            selected={*appointment_type_id == appointment_type.id}
                                        >
                                            {format!("{} ({} min)", appointment_type.name, appointment_type.duration_minutes)}
                                        </option>
                                    })}
                                </select>
                                {if let Some(message) = &field_errors.appointment_type {
                                    html! { <div class="field-error">{message}</div> }
                                } else { html! {} }}
                            </div>

                            <div class="form-group">
                                <label for="practitioner">{"Practitioner"}</label>
                                <select id="practitioner" onchange={on_practitioner_change} disabled={*busy}>
                                    <option value="" selected={practitioner_id.is_empty()}>{"Select..."}</option>
                                    {for props.practitioners.iter().map(|practitioner| html! {
                                        <option
                                            value={practitioner.id.clone()}
                                            selected={*practitioner_id == practitioner.id}
                                        >
                                            {format!("{} ({})", practitioner.name, practitioner.title)}
                                        </option>
                                    })}
                                </select>
                                {if let Some(message) = &field_errors.practitioner {
                                    html! { <div class="field-error">{message}</div> }
                                } else { html! {} }}
                            </div>

                            <div class="form-group">
                                <label for="date">{"Date"}</label>
                                <input id="date" type="date" value={(*date_value).clone()}
                                    onchange={on_date_change} disabled={*busy} />
                            </div>

                            <div class="form-group">
                                <label for="time">{"Time"}</label>
                                <input id="time" type="time" value={(*time_value).clone()}
                                    onchange={on_time_change} disabled={*busy} />
                                {if let Some(message) = &field_errors.time {
                                    html! { <div class="field-error">{message}</div> }
                                } else { html! {} }}
                            </div>

                            <div class="form-group">
                                <label for="clinic-notes">{"Clinic notes (internal)"}</label>
                                <textarea id="clinic-notes" value={(*clinic_notes).clone()}
                                    onchange={on_clinic_notes_change} disabled={*busy} />
                            </div>

                            <div class="form-group">
                                <label>{"Resources"}</label>
                                {for props.resources.iter().map(|resource| {
                                    let resource_id = resource.id.clone();
                                    let on_toggle_resource = on_toggle_resource.clone();
                                    let checked = selected_resource_ids.contains(&resource.id);
                                    html! {
                                        <label class="resource-option">
                                            <input type="checkbox" {checked} disabled={*busy}
                                                onchange={Callback::from(move |_: Event| {
                                                    on_toggle_resource.emit(resource_id.clone());
                                                })} />
                                            {&resource.name}
                                        </label>
                                    }
                                })}
                            </div>

                            <div class="edit-step-actions">
                                <button type="button" class="btn btn-secondary"
                                    onclick={on_cancel_click.clone()} disabled={*busy}>
                                    {"Cancel"}
                                </button>
                                <button type="submit" class="btn btn-primary" disabled={*busy}>
                                    {"Next"}
                                </button>
                            </div>
                        </form>
                    </div>
                },

                EditStep::Review => {
                    let draft = make_draft();
                    let details = change_details(&props.appointment, &draft);
                    html! {
                        <div class="edit-step">
                            <div class="edit-step-header">
                                <h2>{"Review changes"}</h2>
                            </div>
                            {error_banner.clone()}
                            <dl class="review-summary">
                                <dt>{"Appointment type"}</dt>
                                <dd class={if details.appointment_type_changed { "changed" } else { "" }}>
                                    {type_name(&draft.appointment_type_id)}
                                </dd>
                                <dt>{"Practitioner"}</dt>
                                <dd class={if details.practitioner_changed { "changed" } else { "" }}>
                                    {practitioner_name(&draft.practitioner_id)}
                                </dd>
                                <dt>{"Date and time"}</dt>
                                <dd class={if details.date_changed || details.time_changed { "changed" } else { "" }}>
                                    {format!("{} {}", draft.date, draft.time)}
                                </dd>
                            </dl>
                            {if props.appointment.auto_assigned && auto_confirm {
                                html! {
                                    <p class="review-hint">
                                        {"This slot was assigned automatically. Confirming keeps the proposed time."}
                                    </p>
                                }
                            } else { html! {} }}
                            <div class="edit-step-actions">
                                <button type="button" class="btn btn-secondary"
                                    onclick={on_review_back} disabled={*busy}>
                                    {"Back"}
                                </button>
                                <button type="button" class="btn btn-primary"
                                    onclick={on_review_next} disabled={*busy}>
                                    {if *busy {
                                        "Working..."
                                    } else if auto_confirm {
                                        "Confirm"
                                    } else {
                                        "Next"
                                    }}
                                </button>
                            </div>
                        </div>
                    }
                }

                EditStep::Note => html! {
                    <div class="edit-step">
                        <div class="edit-step-header">
                            <h2>{"Add a note to the notification"}</h2>
                            <p>{"The patient will be notified about this change. You can add a short note to the message."}</p>
                        </div>
                        {error_banner.clone()}
                        <div class="form-group">
                            <label for="notification-note">{"Note (optional)"}</label>
                            <textarea id="notification-note" value={(*notification_note).clone()}
                                onchange={on_notification_note_change} disabled={*busy} />
                        </div>
                        <div class="edit-step-actions">
                            <button type="button" class="btn btn-secondary"
                                onclick={on_note_back} disabled={*busy}>
                                {"Back"}
                            </button>
                            <button type="button" class="btn btn-primary"
                                onclick={on_note_next} disabled={*busy}>
                                {if *busy { "Loading preview..." } else { "Next" }}
                            </button>
                        </div>
                    </div>
                },

                EditStep::Preview => html! {
                    <div class="edit-step">
                        <div class="edit-step-header">
                            <h2>{"Notification preview"}</h2>
                        </div>
                        {error_banner.clone()}
                        <div class="notification-preview">
                            {match (*cached_preview).as_ref().and_then(|p| p.preview_message.clone()) {
                                Some(message) => html! { <pre class="preview-message">{message}</pre> },
                                None => html! { <p>{"The patient will be notified about this change."}</p> },
                            }}
                        </div>
                        <div class="edit-step-actions">
                            <button type="button" class="btn btn-secondary"
                                onclick={on_preview_back} disabled={*busy}>
                                {"Back"}
                            </button>
                            <button type="button" class="btn btn-primary"
                                onclick={on_preview_confirm} disabled={*busy}>
                                {if *busy { "Saving..." } else { "Confirm and save" }}
                            </button>
                        </div>
                    </div>
                },
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn original() -> Appointment {
        Appointment {
            id: "ap-1".to_string(),
            clinic_id: "cl-1".to_string(),
            patient_id: "pa-1".to_string(),
            practitioner_id: "pr-1".to_string(),
            appointment_type_id: "ty-1".to_string(),
            start_time: "2026-09-01T10:00:00+09:00".to_string(),
            clinic_notes: "A".to_string(),
            resource_ids: vec!["re-1".to_string()],
            auto_assigned: false,
        }
    }

    fn unchanged_draft() -> AppointmentDraft {
        AppointmentDraft {
            appointment_type_id: "ty-1".to_string(),
            practitioner_id: "pr-1".to_string(),
            date: "2026-09-01".to_string(),
            time: "10:00".to_string(),
            clinic_notes: "A".to_string(),
            selected_resource_ids: vec!["re-1".to_string()],
            notification_note: String::new(),
        }
    }

    #[wasm_bindgen_test]
    fn change_details_detects_each_field() {
        let appointment = original();
        assert_eq!(
            change_details(&appointment, &unchanged_draft()),
            ChangeDetails::default()
        );

        let mut draft = unchanged_draft();
        draft.practitioner_id = "pr-2".to_string();
        draft.time = "11:30".to_string();
        let details = change_details(&appointment, &draft);
        assert!(details.practitioner_changed);
        assert!(details.time_changed);
        assert!(!details.date_changed);
        assert!(!details.appointment_type_changed);
        assert!(!details.resources_changed);
    }

    #[wasm_bindgen_test]
    fn resource_order_does_not_count_as_change() {
        let mut appointment = original();
        appointment.resource_ids = vec!["re-1".to_string(), "re-2".to_string()];
        let mut draft = unchanged_draft();
        draft.selected_resource_ids = vec!["re-2".to_string(), "re-1".to_string()];
        assert!(!change_details(&appointment, &draft).resources_changed);
    }

    #[wasm_bindgen_test]
    fn payload_always_carries_practitioner_and_start_time() {
        let request = build_update_request(&original(), &unchanged_draft(), false).unwrap();
        assert_eq!(request.practitioner_id.as_deref(), Some("pr-1"));
        assert_eq!(
            request.start_time.as_deref(),
            Some("2026-09-01T10:00:00+09:00")
        );
        assert!(request.appointment_type_id.is_none());
        assert!(request.notification_note.is_none());
        assert!(request.confirm_time_selection.is_none());
    }

    #[wasm_bindgen_test]
    fn payload_omits_unchanged_clinic_notes() {
        // same value after trimming: not part of the payload
        let mut draft = unchanged_draft();
        draft.clinic_notes = "  A ".to_string();
        let request = build_update_request(&original(), &draft, false).unwrap();
        assert!(request.clinic_notes.is_none());

        draft.clinic_notes = "B".to_string();
        let request = build_update_request(&original(), &draft, false).unwrap();
        assert_eq!(request.clinic_notes.as_deref(), Some("B"));
    }

    #[wasm_bindgen_test]
    fn payload_sends_resources_when_cleared() {
        let mut draft = unchanged_draft();
        draft.selected_resource_ids = vec![];
        let request = build_update_request(&original(), &draft, false).unwrap();
        assert_eq!(request.selected_resource_ids, Some(vec![]));
    }

    #[wasm_bindgen_test]
    fn payload_includes_entered_note_and_confirm_flag() {
        let mut draft = unchanged_draft();
        draft.notification_note = " see you soon ".to_string();
        let request = build_update_request(&original(), &draft, true).unwrap();
        assert_eq!(request.notification_note.as_deref(), Some("see you soon"));
        assert_eq!(request.confirm_time_selection, Some(true));
    }

    #[wasm_bindgen_test]
    fn combine_start_time_keeps_original_offset() {
        let start = combine_start_time(&original(), "2026-09-02", "14:15").unwrap();
        assert_eq!(start, "2026-09-02T14:15:00+09:00");
    }

    #[wasm_bindgen_test]
    fn review_without_channel_saves_directly() {
        assert_eq!(review_outcome(false, None), ReviewOutcome::SaveDirect);
    }

    #[wasm_bindgen_test]
    fn review_fail_open_on_preview_error() {
        // a broken preview endpoint must never block the save
        let outcome = review_outcome(true, Some(Err("network error".to_string())));
        assert_eq!(outcome, ReviewOutcome::SaveDirect);
    }

    #[wasm_bindgen_test]
    fn review_routes_on_backend_answer() {
        let silent = NotificationPreviewResult {
            will_send_notification: false,
            preview_message: None,
        };
        assert_eq!(
            review_outcome(true, Some(Ok(silent))),
            ReviewOutcome::SaveDirect
        );

        let noisy = NotificationPreviewResult {
            will_send_notification: true,
            preview_message: Some("Hi".to_string()),
        };
        assert_eq!(
            review_outcome(true, Some(Ok(noisy.clone()))),
            ReviewOutcome::CollectNote(noisy)
        );
    }
}
