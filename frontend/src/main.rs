use shared::Appointment;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

mod components;
mod hooks;
mod modal;
mod services;

use components::clinic_settings_page::ClinicSettingsPage;
use components::schedule_page::SchedulePage;
use modal::provider::ModalQueueProvider;
use services::api::ApiClient;
use services::query_cache::QueryCache;

// Single-clinic deployment for now; multi-clinic support would thread this
// through a login flow instead.
const CLINIC_ID: &str = "clinic-main";

#[derive(Clone, Copy, PartialEq)]
enum Page {
    Schedule,
    Settings,
}

impl Page {
    fn key(&self) -> &'static str {
        match self {
            Page::Schedule => "schedule",
            Page::Settings => "settings",
        }
    }
}

#[function_component(App)]
fn app() -> Html {
    let page = use_state(|| Page::Schedule);

    let api_client = use_memo((), |_| ApiClient::new());
    let schedule_cache = use_memo((), |_| QueryCache::<Vec<Appointment>>::new());

    // Connection status for the footer
    let backend_connected = use_state(|| false);
    let backend_endpoint = use_state(|| String::from("Checking..."));

    use_effect_with((), {
        let api_client = (*api_client).clone();
        let backend_connected = backend_connected.clone();
        let backend_endpoint = backend_endpoint.clone();
        move |_| {
            spawn_local(async move {
                match api_client.test_connection().await {
                    Ok(()) => {
                        backend_connected.set(true);
                        backend_endpoint.set("localhost:3000".to_string());
                    }
                    Err(e) => {
                        backend_connected.set(false);
                        backend_endpoint.set("Connection failed".to_string());
                        gloo::console::error!("Failed to connect to backend:", e);
                    }
                }
            });
            || ()
        }
    });

    let nav_button = |target: Page, label: &str| {
        let page = page.clone();
        let class = if *page == target {
            "nav-btn active"
        } else {
            "nav-btn"
        };
        let onclick = Callback::from(move |_| page.set(target));
        html! { <button {class} {onclick}>{label}</button> }
    };

    html! {
        <ModalQueueProvider page_key={page.key().to_string()}>
            <header class="header">
                <div class="container">
                    <h1>{"Clinic Desk"}</h1>
                    <nav class="page-nav">
                        {nav_button(Page::Schedule, "Schedule")}
                        {nav_button(Page::Settings, "Settings")}
                    </nav>
                </div>
            </header>

            <main class="main">
                <div class="container">
                    {match *page {
                        Page::Schedule => html! {
                            <SchedulePage
                                api_client={(*api_client).clone()}
                                schedule_cache={(*schedule_cache).clone()}
                                clinic_id={CLINIC_ID.to_string()}
                            />
                        },
                        Page::Settings => html! {
                            <ClinicSettingsPage
                                api_client={(*api_client).clone()}
                                clinic_id={CLINIC_ID.to_string()}
                            />
                        },
                    }}
                </div>
            </main>

            <div class="connection-status">
                {if *backend_connected {
                    format!("Connected to {}", *backend_endpoint)
                } else {
                    (*backend_endpoint).clone()
                }}
            </div>
        </ModalQueueProvider>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
