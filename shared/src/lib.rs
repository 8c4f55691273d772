use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A patient record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    /// Display name (family name first, as entered by the clinic)
    pub name: String,
    /// Practitioners the clinic has explicitly assigned to this patient.
    /// Being booked with a practitioner does NOT implicitly add them here.
    pub assigned_practitioner_ids: Vec<String>,
    /// Linked messaging channel for appointment notifications, if the
    /// patient has connected one. `None` means no notification can be sent.
    pub messaging_channel: Option<MessagingChannel>,
}

impl Patient {
    /// Whether a notification could reach this patient at all.
    pub fn has_messaging_channel(&self) -> bool {
        self.messaging_channel.is_some()
    }

    /// Whether the given practitioner is already assigned to this patient.
    pub fn is_assigned(&self, practitioner_id: &str) -> bool {
        self.assigned_practitioner_ids
            .iter()
            .any(|id| id == practitioner_id)
    }
}

/// An external messaging channel linked to a patient account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagingChannel {
    /// Messaging provider identifier (e.g. "line")
    pub provider: String,
    /// Provider-side user identifier
    pub channel_user_id: String,
}

/// A practitioner working at the clinic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Practitioner {
    pub id: String,
    pub name: String,
    /// Job title shown next to the name (e.g. "Physiotherapist")
    pub title: String,
}

/// A bookable appointment type (duration drives the schedule grid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentType {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
}

/// A physical clinic resource (room, chair, device) reservable per appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicResource {
    pub id: String,
    pub name: String,
}

/// An appointment as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub clinic_id: String,
    pub patient_id: String,
    pub practitioner_id: String,
    pub appointment_type_id: String,
    /// Start time with timezone (RFC 3339)
    pub start_time: String,
    /// Internal notes, never shown to the patient
    pub clinic_notes: String,
    /// Resources reserved for this appointment
    pub resource_ids: Vec<String>,
    /// True when the backend provisionally picked practitioner/time and the
    /// clinic has not yet confirmed the selection.
    pub auto_assigned: bool,
}

impl Appointment {
    /// Parse `start_time` into a timezone-aware value. The backend always
    /// emits RFC 3339, so a parse failure means corrupt data upstream.
    pub fn start_time_parsed(&self) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(&self.start_time)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<Appointment>,
}

/// Ask the backend whether an edit would trigger a patient notification,
/// and what the message would say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreviewRequest {
    pub new_practitioner_id: String,
    /// New start time (RFC 3339)
    pub new_start_time: String,
    /// Optional custom note appended to the notification message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Backend's prediction of the notification an edit would produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreviewResult {
    pub will_send_notification: bool,
    pub preview_message: Option<String>,
}

/// Partial update payload for an appointment. Only fields that actually
/// changed are serialized; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_type_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practitioner_id: Option<String>,
    /// New start time (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_notes: Option<String>,
    /// Custom note appended to the patient notification, if one is sent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_resource_ids: Option<Vec<String>>,
    /// Confirms an auto-assigned practitioner/time selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_time_selection: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentUpdateResponse {
    pub appointment: Appointment,
}

/// Assign a practitioner to a patient as a default provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignPractitionerRequest {
    pub practitioner_id: String,
}

/// Assignment endpoint returns the full updated patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignPractitionerResponse {
    pub patient: Patient,
}

/// Clinic-wide settings edited on the settings page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicSettings {
    pub clinic_name: String,
    pub phone: String,
    pub address: String,
    /// Whether patients can book online at all
    pub allow_online_booking: bool,
    /// Minimum notice before an online booking, in hours
    pub min_notice_hours: u32,
    /// How far ahead online bookings may be made, in days
    pub max_advance_days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_serializes_only_set_fields() {
        let request = AppointmentUpdateRequest {
            practitioner_id: Some("pr-2".to_string()),
            start_time: Some("2026-09-01T10:00:00+09:00".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("practitioner_id"));
        assert!(json.contains("start_time"));
        assert!(!json.contains("clinic_notes"));
        assert!(!json.contains("notification_note"));
        assert!(!json.contains("selected_resource_ids"));
    }

    #[test]
    fn patient_assignment_check() {
        let patient = Patient {
            id: "pa-1".to_string(),
            name: "Sato Aiko".to_string(),
            assigned_practitioner_ids: vec!["pr-1".to_string()],
            messaging_channel: None,
        };
        assert!(patient.is_assigned("pr-1"));
        assert!(!patient.is_assigned("pr-2"));
        assert!(!patient.has_messaging_channel());
    }

    #[test]
    fn appointment_start_time_parses() {
        let appointment = Appointment {
            id: "ap-1".to_string(),
            clinic_id: "cl-1".to_string(),
            patient_id: "pa-1".to_string(),
            practitioner_id: "pr-1".to_string(),
            appointment_type_id: "ty-1".to_string(),
            start_time: "2026-09-01T10:00:00+09:00".to_string(),
            clinic_notes: String::new(),
            resource_ids: vec![],
            auto_assigned: false,
        };
        assert!(appointment.start_time_parsed().is_ok());
    }
}
