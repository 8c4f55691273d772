use std::rc::Rc;

use shared::ClinicSettings;
use web_sys::{HtmlInputElement, MouseEvent};
use yew::prelude::*;

use crate::hooks::use_settings_page::{
    use_settings_page, SectionChanges, SettingsFetch, SettingsSave, SettingsValidate,
    UseSettingsPageOptions,
};
use crate::services::api::ApiClient;

#[derive(Properties, PartialEq)]
pub struct ClinicSettingsPageProps {
    pub api_client: ApiClient,
    pub clinic_id: String,
}

fn section_changes(current: &ClinicSettings, original: &ClinicSettings) -> Vec<(String, bool)> {
    let clinic_info_changed = current.clinic_name != original.clinic_name
        || current.phone != original.phone
        || current.address != original.address;
    let booking_rules_changed = current.allow_online_booking != original.allow_online_booking
        || current.min_notice_hours != original.min_notice_hours
        || current.max_advance_days != original.max_advance_days;
    vec![
        ("clinic info".to_string(), clinic_info_changed),
        ("booking rules".to_string(), booking_rules_changed),
    ]
}

fn validate_settings(settings: &ClinicSettings) -> Result<(), String> {
    if settings.clinic_name.trim().is_empty() {
        return Err("Clinic name is required".to_string());
    }
    if settings.max_advance_days == 0 {
        return Err("Bookings must be allowed at least one day ahead".to_string());
    }
    Ok(())
}

#[function_component(ClinicSettingsPage)]
pub fn clinic_settings_page(props: &ClinicSettingsPageProps) -> Html {
    let fetch: SettingsFetch<ClinicSettings> = {
        let api_client = props.api_client.clone();
        let clinic_id = props.clinic_id.clone();
        Rc::new(move || {
            let api_client = api_client.clone();
            let clinic_id = clinic_id.clone();
            Box::pin(async move { api_client.get_clinic_settings(&clinic_id).await })
        })
    };
    let save: SettingsSave<ClinicSettings> = {
        let api_client = props.api_client.clone();
        let clinic_id = props.clinic_id.clone();
        Rc::new(move |settings: ClinicSettings| {
            let api_client = api_client.clone();
            let clinic_id = clinic_id.clone();
            Box::pin(async move { api_client.update_clinic_settings(&clinic_id, settings).await })
        })
    };
    let validate: SettingsValidate<ClinicSettings> = Rc::new(validate_settings);
    let get_section_changes: SectionChanges<ClinicSettings> = Rc::new(section_changes);

    let settings = use_settings_page(UseSettingsPageOptions {
        fetch,
        save,
        validate: Some(validate),
        initial_data: None,
        skip_fetch: false,
        get_section_changes: Some(get_section_changes),
        on_save_error: None,
    });

    let update_text_field = |apply: fn(&mut ClinicSettings, String)| {
        let update_data = settings.actions.update_data.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let value = input.value();
            update_data.emit(Rc::new(move |current: &mut ClinicSettings| {
                apply(current, value.clone())
            }));
        })
    };
    let on_name_change = update_text_field(|s, v| s.clinic_name = v);
    let on_phone_change = update_text_field(|s, v| s.phone = v);
    let on_address_change = update_text_field(|s, v| s.address = v);

    let on_online_booking_toggle = {
        let update_data = settings.actions.update_data.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let checked = input.checked();
            update_data.emit(Rc::new(move |current: &mut ClinicSettings| {
                current.allow_online_booking = checked;
            }));
        })
    };
    let update_number_field = |apply: fn(&mut ClinicSettings, u32)| {
        let update_data = settings.actions.update_data.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Ok(value) = input.value().parse::<u32>() {
                update_data.emit(Rc::new(move |current: &mut ClinicSettings| {
                    apply(current, value)
                }));
            }
        })
    };
    let on_notice_change = update_number_field(|s, v| s.min_notice_hours = v);
    let on_advance_change = update_number_field(|s, v| s.max_advance_days = v);

    let on_save = {
        let save_data = settings.actions.save_data.clone();
        Callback::from(move |_: MouseEvent| save_data.emit(()))
    };
    let on_reset = {
        let reset_data = settings.actions.reset_data.clone();
        Callback::from(move |_: MouseEvent| reset_data.emit(()))
    };

    let section_is_dirty = |name: &str| {
        settings
            .state
            .section_changes
            .iter()
            .any(|(section, changed)| section == name && *changed)
    };
    let dirty_badge = |name: &str| {
        if section_is_dirty(name) {
            html! { <span class="badge dirty">{"Unsaved changes"}</span> }
        } else {
            html! {}
        }
    };

    if settings.state.loading {
        return html! { <div class="loading">{"Loading settings..."}</div> };
    }

    let current = match settings.state.data.clone() {
        Some(current) => current,
        None => {
            return html! {
                <div class="form-message error">
                    {settings
                        .state
                        .error
                        .clone()
                        .unwrap_or_else(|| "Settings are unavailable.".to_string())}
                </div>
            }
        }
    };

    html! {
        <section class="settings-page">
            <h2>{"Clinic settings"}</h2>

            {if let Some(message) = &settings.state.error {
                html! { <div class="form-message error">{message}</div> }
            } else { html! {} }}

            <fieldset class="settings-section">
                <legend>{"Clinic info"}{dirty_badge("clinic info")}</legend>
                <div class="form-group">
                    <label for="clinic-name">{"Name"}</label>
                    <input id="clinic-name" type="text" value={current.clinic_name.clone()}
                        onchange={on_name_change} disabled={settings.state.saving} />
                </div>
                <div class="form-group">
                    <label for="clinic-phone">{"Phone"}</label>
                    <input id="clinic-phone" type="tel" value={current.phone.clone()}
                        onchange={on_phone_change} disabled={settings.state.saving} />
                </div>
                <div class="form-group">
                    <label for="clinic-address">{"Address"}</label>
                    <input id="clinic-address" type="text" value={current.address.clone()}
                        onchange={on_address_change} disabled={settings.state.saving} />
                </div>
            </fieldset>

            <fieldset class="settings-section">
                <legend>{"Booking rules"}{dirty_badge("booking rules")}</legend>
                <div class="form-group">
                    <label class="checkbox-label">
                        <input type="checkbox" checked={current.allow_online_booking}
                            onchange={on_online_booking_toggle} disabled={settings.state.saving} />
                        {"Allow online booking"}
                    </label>
                </div>
                <div class="form-group">
                    <label for="min-notice">{"Minimum notice (hours)"}</label>
                    <input id="min-notice" type="number" min="0"
                        value={current.min_notice_hours.to_string()}
                        onchange={on_notice_change} disabled={settings.state.saving} />
                </div>
                <div class="form-group">
                    <label for="max-advance">{"Maximum advance (days)"}</label>
                    <input id="max-advance" type="number" min="1"
                        value={current.max_advance_days.to_string()}
                        onchange={on_advance_change} disabled={settings.state.saving} />
                </div>
            </fieldset>

            <div class="settings-actions">
                <button class="btn btn-secondary" onclick={on_reset}
                    disabled={settings.state.saving || !settings.state.has_unsaved_changes}>
                    {"Discard changes"}
                </button>
                <button class="btn btn-primary" onclick={on_save}
                    disabled={settings.state.saving || !settings.state.has_unsaved_changes}>
                    {if settings.state.saving { "Saving..." } else { "Save" }}
                </button>
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn settings() -> ClinicSettings {
        ClinicSettings {
            clinic_name: "Riverside Physio".to_string(),
            phone: "03-0000-0000".to_string(),
            address: "1-2-3 Kawacho".to_string(),
            allow_online_booking: true,
            min_notice_hours: 12,
            max_advance_days: 60,
        }
    }

    #[wasm_bindgen_test]
    fn sections_track_their_own_fields() {
        let original = settings();
        let mut current = settings();
        current.phone = "03-1111-1111".to_string();

        let changes = section_changes(&current, &original);
        assert_eq!(
            changes,
            vec![
                ("clinic info".to_string(), true),
                ("booking rules".to_string(), false),
            ]
        );

        current.min_notice_hours = 24;
        let changes = section_changes(&current, &original);
        assert!(changes.iter().all(|(_, changed)| *changed));
    }

    #[wasm_bindgen_test]
    fn validation_rejects_blank_name() {
        let mut current = settings();
        current.clinic_name = "  ".to_string();
        assert!(validate_settings(&current).is_err());
        assert!(validate_settings(&settings()).is_ok());
    }
}
