//! Enumerations shared by the store and the wire format.
//!
//! Each enum is stored as its text form and parsed back case-insensitively.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Some($name::$variant);
                    }
                )+
                None
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let text = value.as_str()?;
                $name::parse(text).ok_or_else(|| {
                    FromSqlError::Other(
                        format!("invalid {} value: {}", stringify!($name), text).into(),
                    )
                })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebrisType {
    #[serde(rename = "Plastic", alias = "plastic")]
    Plastic,
    #[serde(rename = "Metal", alias = "metal")]
    Metal,
    #[serde(rename = "Glass", alias = "glass")]
    Glass,
    #[serde(rename = "Organic", alias = "organic")]
    Organic,
    #[serde(rename = "Fishing Gear", alias = "fishing_gear", alias = "fishing gear")]
    FishingGear,
    #[serde(rename = "Mixed", alias = "mixed")]
    Mixed,
}

text_enum!(DebrisType {
    Plastic => "Plastic",
    Metal => "Metal",
    Glass => "Glass",
    Organic => "Organic",
    FishingGear => "Fishing Gear",
    Mixed => "Mixed",
});

/// Rough size of a reported debris pile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Low,
    Medium,
    High,
}

text_enum!(Quantity {
    Low => "low",
    Medium => "medium",
    High => "high",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Verified,
    Rejected,
}

text_enum!(ReviewStatus {
    Pending => "pending",
    Verified => "verified",
    Rejected => "rejected",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

text_enum!(Priority {
    High => "high",
    Medium => "medium",
    Low => "low",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Upcoming,
    Completed,
    Cancelled,
}

text_enum!(ScheduleStatus {
    Upcoming => "upcoming",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolunteerStatus {
    Active,
    Inactive,
}

text_enum!(VolunteerStatus {
    Active => "active",
    Inactive => "inactive",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

text_enum!(RegistrationStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Task,
    Reminder,
    Reward,
    Review,
    System,
}

text_enum!(NotificationKind {
    Task => "task",
    Reminder => "reminder",
    Reward => "reward",
    Review => "review",
    System => "system",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    High,
    Medium,
    Low,
}

text_enum!(Density {
    High => "high",
    Medium => "medium",
    Low => "low",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureStep {
    Camera,
    Classifying,
    Confirm,
}

text_enum!(CaptureStep {
    Camera => "camera",
    Classifying => "classifying",
    Confirm => "confirm",
});
