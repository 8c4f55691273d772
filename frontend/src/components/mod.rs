pub mod alert_dialog;
pub mod assignment_modals;
pub mod clinic_settings_page;
pub mod edit_appointment_modal;
pub mod schedule_page;
