use web_sys::MouseEvent;
use yew::prelude::*;

/// Single-step notice dialog. The dismiss callback is wired by the dialog
/// service, which also drives the queue's close sequence.
#[derive(Properties, PartialEq, Clone)]
pub struct AlertDialogProps {
    pub message: String,
    #[prop_or_default]
    pub title: Option<String>,
    pub on_dismiss: Callback<()>,
}

#[function_component(AlertDialog)]
pub fn alert_dialog(props: &AlertDialogProps) -> Html {
    let on_ok = {
        let on_dismiss = props.on_dismiss.clone();
        Callback::from(move |_: MouseEvent| {
            on_dismiss.emit(());
        })
    };

    html! {
        <div class="alert-dialog">
            <h2 class="alert-dialog-title">
                {props.title.clone().unwrap_or_else(|| "Notice".to_string())}
            </h2>
            <p class="alert-dialog-message">{&props.message}</p>
            <div class="alert-dialog-actions">
                <button class="btn btn-primary" onclick={on_ok}>{"OK"}</button>
            </div>
        </div>
    }
}

/// Two-button confirm dialog; emits the user's choice exactly once per click.
#[derive(Properties, PartialEq, Clone)]
pub struct ConfirmDialogProps {
    pub message: String,
    #[prop_or_default]
    pub title: Option<String>,
    pub on_choice: Callback<bool>,
}

#[function_component(ConfirmDialog)]
pub fn confirm_dialog(props: &ConfirmDialogProps) -> Html {
    let on_confirm = {
        let on_choice = props.on_choice.clone();
        Callback::from(move |_: MouseEvent| {
            on_choice.emit(true);
        })
    };
    let on_cancel = {
        let on_choice = props.on_choice.clone();
        Callback::from(move |_: MouseEvent| {
            on_choice.emit(false);
        })
    };

    html! {
        <div class="alert-dialog">
            <h2 class="alert-dialog-title">
                {props.title.clone().unwrap_or_else(|| "Confirm".to_string())}
            </h2>
            <p class="alert-dialog-message">{&props.message}</p>
            <div class="alert-dialog-actions">
                <button class="btn btn-secondary" onclick={on_cancel}>{"Cancel"}</button>
                <button class="btn btn-primary" onclick={on_confirm}>{"OK"}</button>
            </div>
        </div>
    }
}
