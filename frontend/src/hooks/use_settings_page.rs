use std::rc::Rc;

use futures::future::LocalBoxFuture;
use serde::Serialize;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::logging::Logger;

pub type SettingsFetch<T> = Rc<dyn Fn() -> LocalBoxFuture<'static, Result<T, String>>>;
pub type SettingsSave<T> = Rc<dyn Fn(T) -> LocalBoxFuture<'static, Result<T, String>>>;
pub type SettingsValidate<T> = Rc<dyn Fn(&T) -> Result<(), String>>;
/// Caller-defined section-level dirty tracking: maps (current, original) to
/// named sections and whether each one changed. The hook never inspects the
/// settings shape itself.
pub type SectionChanges<T> = Rc<dyn Fn(&T, &T) -> Vec<(String, bool)>>;

/// Configuration for one settings screen.
pub struct UseSettingsPageOptions<T> {
    pub fetch: SettingsFetch<T>,
    pub save: SettingsSave<T>,
    pub validate: Option<SettingsValidate<T>>,
    /// Externally supplied data; skips the mount fetch when present
    pub initial_data: Option<T>,
    /// Skip the mount fetch entirely (data arrives via `refresh` later)
    pub skip_fetch: bool,
    pub get_section_changes: Option<SectionChanges<T>>,
    /// Invoked on validation/save failure; the fallback is the inline
    /// `error` state.
    pub on_save_error: Option<Callback<String>>,
}

#[derive(Clone, PartialEq)]
pub struct SettingsPageState<T: PartialEq> {
    pub data: Option<T>,
    /// Deep snapshot taken on fetch and replaced only after a successful save
    pub original_data: Option<T>,
    pub loading: bool,
    pub saving: bool,
    pub error: Option<String>,
    pub has_unsaved_changes: bool,
    pub section_changes: Vec<(String, bool)>,
}

#[derive(Clone)]
pub struct UseSettingsPageActions<T> {
    /// Functional update against the current draft
    pub update_data: Callback<Rc<dyn Fn(&mut T)>>,
    /// Revert the draft to the original snapshot
    pub reset_data: Callback<()>,
    /// Validate, persist, and replace the snapshot on success
    pub save_data: Callback<()>,
    pub refresh: Callback<()>,
}

pub struct UseSettingsPageResult<T: PartialEq> {
    pub state: SettingsPageState<T>,
    pub actions: UseSettingsPageActions<T>,
}

/// Dirty check by serialized comparison, so nested structures compare by
/// value without a PartialEq walk the caller has to maintain.
pub fn snapshots_differ<T: Serialize>(current: &Option<T>, original: &Option<T>) -> bool {
    serialize_snapshot(current) != serialize_snapshot(original)
}

fn serialize_snapshot<T: Serialize>(value: &Option<T>) -> String {
    match value {
        Some(value) => serde_json::to_string(value).unwrap_or_default(),
        None => String::new(),
    }
}

/// Fetch/edit/save controller shared by the settings screens: fetch on
/// mount (unless supplied or skipped), track an original snapshot, expose
/// update/reset/save, and surface errors inline or through the caller's
/// handler.
#[hook]
pub fn use_settings_page<T>(options: UseSettingsPageOptions<T>) -> UseSettingsPageResult<T>
where
    T: Clone + PartialEq + Serialize + 'static,
{
    let data = use_state(|| Option::<T>::None);
    let original_data = use_state(|| Option::<T>::None);
    let loading = use_state(|| false);
    let saving = use_state(|| false);
    let error = use_state(|| Option::<String>::None);

    let refresh = {
        let fetch = options.fetch.clone();
        let data = data.clone();
        let original_data = original_data.clone();
        let loading = loading.clone();
        let error = error.clone();

        use_callback((), move |_, _| {
            let fetch = fetch.clone();
            let data = data.clone();
            let original_data = original_data.clone();
            let loading = loading.clone();
            let error = error.clone();

            spawn_local(async move {
                loading.set(true);
                match fetch().await {
                    Ok(fetched) => {
                        data.set(Some(fetched.clone()));
                        original_data.set(Some(fetched));
                        error.set(None);
                    }
                    Err(message) => {
                        Logger::error_with_component(
                            "settings-page",
                            &format!("settings fetch failed: {message}"),
                        );
                        error.set(Some(message));
                    }
                }
                loading.set(false);
            });
        })
    };

    // Initial load: supplied data wins over fetching.
    {
        let initial_data = options.initial_data.clone();
        let skip_fetch = options.skip_fetch;
        let data = data.clone();
        let original_data = original_data.clone();
        let refresh = refresh.clone();

        use_effect_with((), move |_| {
            if let Some(initial) = initial_data {
                data.set(Some(initial.clone()));
                original_data.set(Some(initial));
            } else if !skip_fetch {
                refresh.emit(());
            }
            || ()
        });
    }

    let update_data = {
        let data = data.clone();
        use_callback((), move |mutate: Rc<dyn Fn(&mut T)>, _| {
            if let Some(mut current) = (*data).clone() {
                mutate(&mut current);
                data.set(Some(current));
            }
        })
    };

    let reset_data = {
        let data = data.clone();
        let original_data = original_data.clone();
        let error = error.clone();
        use_callback((), move |_, _| {
            data.set((*original_data).clone());
            error.set(None);
        })
    };

    let save_data = {
        let save = options.save.clone();
        let validate = options.validate.clone();
        let on_save_error = options.on_save_error.clone();
        let data = data.clone();
        let original_data = original_data.clone();
        let saving = saving.clone();
        let error = error.clone();

        use_callback((), move |_, _| {
            let current = match (*data).clone() {
                Some(current) => current,
                None => return,
            };
            let report_failure = {
                let on_save_error = on_save_error.clone();
                let error = error.clone();
                move |message: String| match &on_save_error {
                    Some(handler) => handler.emit(message),
                    None => error.set(Some(message)),
                }
            };
            if let Some(validate) = &validate {
                if let Err(message) = validate(&current) {
                    report_failure(message);
                    return;
                }
            }

            let save = save.clone();
            let data = data.clone();
            let original_data = original_data.clone();
            let saving = saving.clone();
            let error = error.clone();

            saving.set(true);
            error.set(None);
            spawn_local(async move {
                match save(current).await {
                    Ok(saved) => {
                        data.set(Some(saved.clone()));
                        original_data.set(Some(saved));
                    }
                    Err(message) => {
                        Logger::error_with_component(
                            "settings-page",
                            &format!("settings save failed: {message}"),
                        );
                        report_failure(message);
                    }
                }
                saving.set(false);
            });
        })
    };

    let section_changes = match (&options.get_section_changes, (*data).as_ref(), (*original_data).as_ref()) {
        (Some(get_section_changes), Some(current), Some(original)) => {
            get_section_changes(current, original)
        }
        _ => Vec::new(),
    };

    let state = SettingsPageState {
        data: (*data).clone(),
        original_data: (*original_data).clone(),
        loading: *loading,
        saving: *saving,
        error: (*error).clone(),
        has_unsaved_changes: snapshots_differ(&*data, &*original_data),
        section_changes,
    };

    let actions = UseSettingsPageActions {
        update_data,
        reset_data,
        save_data,
        refresh,
    };

    UseSettingsPageResult { state, actions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[derive(Clone, PartialEq, Serialize)]
    struct Demo {
        x: i32,
    }

    #[wasm_bindgen_test]
    fn fresh_fetch_is_clean() {
        let data = Some(Demo { x: 1 });
        let original = Some(Demo { x: 1 });
        assert!(!snapshots_differ(&data, &original));
    }

    #[wasm_bindgen_test]
    fn edits_mark_dirty_until_snapshot_replaced() {
        let original = Some(Demo { x: 1 });
        let edited = Some(Demo { x: 2 });
        assert!(snapshots_differ(&edited, &original));

        // successful save replaces the snapshot with the saved value
        let saved_snapshot = Some(Demo { x: 2 });
        assert!(!snapshots_differ(&edited, &saved_snapshot));
    }

    #[wasm_bindgen_test]
    fn missing_data_compares_clean_only_against_missing() {
        let none: Option<Demo> = None;
        assert!(!snapshots_differ(&none, &none));
        assert!(snapshots_differ(&Some(Demo { x: 1 }), &none));
    }
}
