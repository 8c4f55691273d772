use shared::Appointment;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::api::ApiClient;
use crate::services::logging::Logger;
use crate::services::query_cache::QueryCache;

/// Cache key for one clinic day.
pub fn schedule_key(clinic_id: &str, date: &str) -> String {
    format!("{clinic_id}:{date}")
}

#[derive(Clone, PartialEq)]
pub struct ScheduleState {
    pub appointments: Vec<Appointment>,
    pub loading: bool,
    pub error: Option<String>,
    /// True while the values on screen come from the cache and a refetch is
    /// still in flight.
    pub from_cache: bool,
}

#[derive(Clone, PartialEq)]
pub struct UseScheduleActions {
    pub refresh: Callback<()>,
}

pub struct UseScheduleResult {
    pub state: ScheduleState,
    pub actions: UseScheduleActions,
}

/// Day schedule with stale-while-revalidate semantics: a cached day shows
/// immediately, the refetch replaces it on success and leaves it visible on
/// failure (with a non-blocking error).
#[hook]
pub fn use_schedule(
    api_client: &ApiClient,
    cache: &QueryCache<Vec<Appointment>>,
    clinic_id: &str,
    date: &str,
) -> UseScheduleResult {
    let appointments = use_state(Vec::<Appointment>::new);
    let loading = use_state(|| false);
    let error = use_state(|| Option::<String>::None);
    let from_cache = use_state(|| false);
    // Key of the most recent refresh; a response for any other key is stale
    // (the user already moved to another day) and must be dropped.
    let active_key = use_mut_ref(String::new);

    let refresh = {
        let api_client = api_client.clone();
        let cache = cache.clone();
        let clinic_id = clinic_id.to_string();
        let date = date.to_string();
        let appointments = appointments.clone();
        let loading = loading.clone();
        let error = error.clone();
        let from_cache = from_cache.clone();
        let active_key = active_key.clone();

        use_callback(
            (clinic_id.clone(), date.clone()),
            move |_, (clinic_id, date)| {
                let key = schedule_key(clinic_id, date);
                *active_key.borrow_mut() = key.clone();

                match cache.get(&key) {
                    Some(cached) => {
                        appointments.set(cached);
                        from_cache.set(true);
                    }
                    None => loading.set(true),
                }

                let api_client = api_client.clone();
                let cache = cache.clone();
                let clinic_id = clinic_id.clone();
                let date = date.clone();
                let appointments = appointments.clone();
                let loading = loading.clone();
                let error = error.clone();
                let from_cache = from_cache.clone();
                let active_key = active_key.clone();

                spawn_local(async move {
                    let result = api_client.get_appointments(&clinic_id, &date).await;
                    if *active_key.borrow() != key {
                        return;
                    }
                    match result {
                        Ok(response) => {
                            cache.insert(key, response.appointments.clone());
                            appointments.set(response.appointments);
                            error.set(None);
                            from_cache.set(false);
                        }
                        Err(message) => {
                            Logger::warn_with_component(
                                "schedule",
                                &format!("appointment fetch failed, keeping stale data: {message}"),
                            );
                            error.set(Some(message));
                        }
                    }
                    loading.set(false);
                });
            },
        )
    };

    // Refetch whenever the clinic or day changes.
    use_effect_with((clinic_id.to_string(), date.to_string()), {
        let refresh = refresh.clone();
        move |_| {
            refresh.emit(());
            || ()
        }
    });

    let state = ScheduleState {
        appointments: (*appointments).clone(),
        loading: *loading,
        error: (*error).clone(),
        from_cache: *from_cache,
    };

    let actions = UseScheduleActions { refresh };

    UseScheduleResult { state, actions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn key_includes_clinic_and_date() {
        assert_eq!(schedule_key("cl-1", "2026-08-30"), "cl-1:2026-08-30");
        assert_ne!(
            schedule_key("cl-1", "2026-08-30"),
            schedule_key("cl-2", "2026-08-30")
        );
    }
}
