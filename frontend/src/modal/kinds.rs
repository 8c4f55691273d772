use std::fmt;

use yew::prelude::*;

use crate::components::alert_dialog::{AlertDialog, AlertDialogProps, ConfirmDialog, ConfirmDialogProps};
use crate::components::assignment_modals::{
    AssignmentConfirmationModal, AssignmentConfirmationModalProps, AssignmentPromptModal,
    AssignmentPromptModalProps,
};
use crate::components::edit_appointment_modal::{EditAppointmentModal, EditAppointmentModalProps};

/// A modal that cannot be mounted. The queue treats this as fatal for the
/// one modal instance and advances past it.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalRenderError {
    InvalidData(String),
}

impl fmt::Display for ModalRenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModalRenderError::InvalidData(message) => write!(f, "invalid modal data: {message}"),
        }
    }
}

/// Every dialog kind the queue can carry, with typed props per variant.
/// Rendering dispatches exhaustively, so adding a kind here forces every
/// render site to handle it.
#[derive(Clone, PartialEq)]
pub enum ModalKind {
    EditAppointment(EditAppointmentModalProps),
    AssignmentPrompt(AssignmentPromptModalProps),
    AssignmentConfirmation(AssignmentConfirmationModalProps),
    Alert(AlertDialogProps),
    Confirm(ConfirmDialogProps),
}

impl ModalKind {
    /// Label announced to screen readers when the modal opens.
    pub fn aria_label(&self) -> String {
        match self {
            ModalKind::EditAppointment(_) => "Edit appointment".to_string(),
            ModalKind::AssignmentPrompt(_) => "Confirm practitioner assignment".to_string(),
            ModalKind::AssignmentConfirmation(_) => "Practitioner assigned".to_string(),
            ModalKind::Alert(props) => props
                .title
                .clone()
                .unwrap_or_else(|| "Notice".to_string()),
            ModalKind::Confirm(props) => props
                .title
                .clone()
                .unwrap_or_else(|| "Confirm".to_string()),
        }
    }

    /// Mount the modal's component tree. The edit wizard needs the original
    /// start time split into date and time fields, so an appointment with a
    /// malformed `start_time` fails here instead of mounting broken.
    pub fn render(&self) -> Result<Html, ModalRenderError> {
        match self {
            ModalKind::EditAppointment(props) => {
                props.appointment.start_time_parsed().map_err(|e| {
                    ModalRenderError::InvalidData(format!(
                        "appointment {} has unparseable start_time '{}': {e}",
                        props.appointment.id, props.appointment.start_time
                    ))
                })?;
                Ok(html! { <EditAppointmentModal ..props.clone() /> })
            }
            ModalKind::AssignmentPrompt(props) => {
                Ok(html! { <AssignmentPromptModal ..props.clone() /> })
            }
            ModalKind::AssignmentConfirmation(props) => {
                Ok(html! { <AssignmentConfirmationModal ..props.clone() /> })
            }
            ModalKind::Alert(props) => Ok(html! { <AlertDialog ..props.clone() /> }),
            ModalKind::Confirm(props) => Ok(html! { <ConfirmDialog ..props.clone() /> }),
        }
    }
}
