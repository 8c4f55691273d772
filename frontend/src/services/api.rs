use gloo::net::http::Request;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{
    AppointmentListResponse, AppointmentType, AppointmentUpdateRequest,
    AppointmentUpdateResponse, AssignPractitionerRequest, AssignPractitionerResponse,
    ClinicResource, ClinicSettings, NotificationPreviewRequest, NotificationPreviewResult,
    Patient, Practitioner,
};

/// API client for communicating with the backend server
#[derive(Clone, PartialEq)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    /// Create a new API client with the default base URL
    pub fn new() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }

    /// Create a new API client with a custom base URL
    pub fn with_base_url(base_url: String) -> Self {
        Self { base_url }
    }

    /// Test connection to the backend
    pub async fn test_connection(&self) -> Result<(), String> {
        match Request::get(&format!("{}/api/health", self.base_url))
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => Err(format!("Connection failed: {}", e)),
        }
    }

    /// Appointments for one clinic day
    pub async fn get_appointments(
        &self,
        clinic_id: &str,
        date: &str,
    ) -> Result<AppointmentListResponse, String> {
        self.get(&format!(
            "/api/clinics/{}/appointments?date={}",
            clinic_id, date
        ))
        .await
    }

    pub async fn get_patient(&self, patient_id: &str) -> Result<Patient, String> {
        self.get(&format!("/api/patients/{}", patient_id)).await
    }

    pub async fn get_practitioners(&self, clinic_id: &str) -> Result<Vec<Practitioner>, String> {
        self.get(&format!("/api/clinics/{}/practitioners", clinic_id))
            .await
    }

    pub async fn get_appointment_types(
        &self,
        clinic_id: &str,
    ) -> Result<Vec<AppointmentType>, String> {
        self.get(&format!("/api/clinics/{}/appointment-types", clinic_id))
            .await
    }

    pub async fn get_resources(&self, clinic_id: &str) -> Result<Vec<ClinicResource>, String> {
        self.get(&format!("/api/clinics/{}/resources", clinic_id))
            .await
    }

    /// Ask the backend whether the pending edit would notify the patient
    pub async fn preview_notification(
        &self,
        appointment_id: &str,
        request: NotificationPreviewRequest,
    ) -> Result<NotificationPreviewResult, String> {
        self.post(
            &format!("/api/appointments/{}/notification-preview", appointment_id),
            &request,
        )
        .await
    }

    /// Apply a partial appointment edit
    pub async fn update_appointment(
        &self,
        appointment_id: &str,
        request: AppointmentUpdateRequest,
    ) -> Result<AppointmentUpdateResponse, String> {
        self.post(&format!("/api/appointments/{}", appointment_id), &request)
            .await
    }

    /// Assign a practitioner to a patient as a default provider
    pub async fn assign_practitioner(
        &self,
        patient_id: &str,
        request: AssignPractitionerRequest,
    ) -> Result<AssignPractitionerResponse, String> {
        self.post(
            &format!("/api/patients/{}/practitioners", patient_id),
            &request,
        )
        .await
    }

    pub async fn get_clinic_settings(&self, clinic_id: &str) -> Result<ClinicSettings, String> {
        self.get(&format!("/api/clinics/{}/settings", clinic_id))
            .await
    }

    pub async fn update_clinic_settings(
        &self,
        clinic_id: &str,
        settings: ClinicSettings,
    ) -> Result<ClinicSettings, String> {
        self.post(&format!("/api/clinics/{}/settings", clinic_id), &settings)
            .await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let url = format!("{}{}", self.base_url, path);
        match Request::get(&url).send().await {
            Ok(response) => {
                if response.ok() {
                    response
                        .json::<T>()
                        .await
                        .map_err(|e| format!("Failed to parse response: {}", e))
                } else {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    Err(error_text)
                }
            }
            Err(e) => Err(format!("Network error: {}", e)),
        }
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, String> {
        let url = format!("{}{}", self.base_url, path);
        match Request::post(&url)
            .json(body)
            .map_err(|e| format!("Failed to serialize request: {}", e))?
            .send()
            .await
        {
            Ok(response) => {
                if response.ok() {
                    response
                        .json::<T>()
                        .await
                        .map_err(|e| format!("Failed to parse response: {}", e))
                } else {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    Err(error_text)
                }
            }
            Err(e) => Err(format!("Network error: {}", e)),
        }
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
