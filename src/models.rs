use serde::{Deserialize, Serialize};

/// The four statuses the UI offers. Wire rows keep `status` as a free
/// string so unrecognized values survive an export/import round trip;
/// this enum names the closed set for typed transitions and badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    ToDo,
    InProgress,
    Review,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        Self::ToDo,
        Self::InProgress,
        Self::Review,
        Self::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "To Do" => Some(Self::ToDo),
            "In Progress" => Some(Self::InProgress),
            "Review" => Some(Self::Review),
            "Completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn tone(&self) -> BadgeTone {
        match self {
            Self::ToDo => BadgeTone::Neutral,
            Self::InProgress => BadgeTone::Blue,
            Self::Review => BadgeTone::Purple,
            Self::Completed => BadgeTone::Green,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }

    pub fn tone(&self) -> BadgeTone {
        match self {
            Self::Low => BadgeTone::Green,
            Self::Medium => BadgeTone::Yellow,
            Self::High => BadgeTone::Red,
        }
    }
}

/// Visual accent for status/priority badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Neutral,
    Green,
    Yellow,
    Red,
    Blue,
    Purple,
}

/// Badge tone for an arbitrary wire status; unrecognized values get the
/// neutral treatment instead of failing.
pub fn status_tone(status: &str) -> BadgeTone {
    TaskStatus::parse(status).map_or(BadgeTone::Neutral, |s| s.tone())
}

pub fn priority_tone(priority: &str) -> BadgeTone {
    TaskPriority::parse(priority).map_or(BadgeTone::Neutral, |p| p.tone())
}

/// A task row as stored by the remote store. Fields mirror the wire
/// columns one-for-one; `status` and `priority` stay strings so the
/// export/import round trip is field-for-field faithful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub assignee_name: String,
    #[serde(default)]
    pub assignee_avatar: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub user_id: String,
}

fn default_priority() -> String {
    TaskPriority::Medium.as_str().to_string()
}

fn default_status() -> String {
    TaskStatus::ToDo.as_str().to_string()
}

/// User-entered task fields prior to persistence. The repository fills
/// in `status`, `created_at`, and `user_id` on insert.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub assignee_name: String,
    pub due_date: String,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            priority: TaskPriority::Medium,
            assignee_name: String::new(),
            due_date: String::new(),
        }
    }
}

/// A row of the `events` table, shown on the calendar view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub event_date: String,
    #[serde(default, rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub attendees_count: u32,
}

/// The signed-in user as reported by the auth endpoint. Either
/// confirmation timestamp being present means the email is verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
    #[serde(default)]
    pub confirmed_at: Option<String>,
}

/// An authenticated session. Passed explicitly into every repository
/// operation; nothing in the crate reads ambient auth state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
}
