use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub dark_mode: bool,
    pub notifications: bool,
    pub email_notifications: bool,
    pub quiet_hours: bool,
    pub auto_assign: bool,
    pub report_summary: bool,
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            dark_mode: false,
            notifications: true,
            email_notifications: true,
            quiet_hours: false,
            auto_assign: false,
            report_summary: true,
            language: "en".into(),
        }
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsPatch {
    pub dark_mode: Option<bool>,
    pub notifications: Option<bool>,
    pub email_notifications: Option<bool>,
    pub quiet_hours: Option<bool>,
    pub auto_assign: Option<bool>,
    pub report_summary: Option<bool>,
    pub language: Option<String>,
}
