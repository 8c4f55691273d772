pub mod use_schedule;
pub mod use_settings_page;
