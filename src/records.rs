/// Data structures for XTab
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bookmarked site shown in the grid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Site {
    pub name: String,
    pub url: String,
    pub icon: String,
}

impl Site {
    /// Build a site whose icon is the conventional `/favicon.ico` of its url
    pub fn new(name: String, url: String) -> Site {
        let icon = favicon_for(&url);
        Site { name, url, icon }
    }
}

pub fn favicon_for(url: &str) -> String {
    format!("{}/favicon.ico", url.trim_end_matches('/'))
}

/// A keyword submitted through the search box
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchEntry {
    pub keyword: String,
    pub time: DateTime<Utc>,
}

/// A to-do list item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub due_date: DateTime<Utc>,
}

/// Identifier assigned by the hosted table; serial or uuid depending on schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RecordId {
    Serial(i64),
    Token(String),
}

/// A row of the hosted `sites` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteSiteRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    pub url: String,
    pub icon: String,
    pub updated_at: DateTime<Utc>,
}

impl RemoteSiteRecord {
    /// A new row for a local site; the id is left to the remote store
    pub fn from_site(site: &Site, updated_at: DateTime<Utc>) -> RemoteSiteRecord {
        RemoteSiteRecord {
            id: None,
            name: site.name.clone(),
            url: site.url.clone(),
            icon: site.icon.clone(),
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_site_creation() {
        let site = Site::new("GitHub".to_string(), "https://github.com".to_string());

        assert_eq!(site.name, "GitHub");
        assert_eq!(site.url, "https://github.com");
        assert_eq!(site.icon, "https://github.com/favicon.ico");
    }

    #[test]
    fn test_favicon_does_not_double_slash() {
        assert_eq!(favicon_for("https://docs.rs/"), "https://docs.rs/favicon.ico");
    }

    #[test]
    fn test_todo_uses_camel_case_due_date() {
        let todo = TodoItem {
            id: "todo-1".to_string(),
            text: "Write report".to_string(),
            completed: false,
            due_date: Utc.with_ymd_and_hms(2024, 10, 28, 10, 30, 0).unwrap(),
        };

        let json = serde_json::to_value(&todo).unwrap();

        assert_eq!(json["dueDate"], "2024-10-28T10:30:00Z");
        assert!(json.get("due_date").is_none());
    }

    #[test]
    fn test_todo_reads_browser_iso_strings() {
        let json = r#"{"id":"a","text":"t","completed":true,"dueDate":"2024-10-28T10:30:00.000Z"}"#;
        let todo: TodoItem = serde_json::from_str(json).unwrap();

        assert_eq!(todo.due_date, Utc.with_ymd_and_hms(2024, 10, 28, 10, 30, 0).unwrap());
        assert!(todo.completed);
    }

    #[test]
    fn test_remote_record_ids() {
        let serial: RemoteSiteRecord = serde_json::from_str(
            r#"{"id":7,"name":"A","url":"https://a.io","icon":"https://a.io/favicon.ico","updated_at":"2024-01-01T00:00:00+00:00"}"#,
        )
        .unwrap();
        let token: RemoteSiteRecord = serde_json::from_str(
            r#"{"id":"c0ffee","name":"A","url":"https://a.io","icon":"i","updated_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(serial.id, Some(RecordId::Serial(7)));
        assert_eq!(token.id, Some(RecordId::Token("c0ffee".to_string())));
    }

    #[test]
    fn test_new_remote_record_omits_id() {
        let site = Site::new("A".to_string(), "https://a.io".to_string());
        let record = RemoteSiteRecord::from_site(&site, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        let json = serde_json::to_value(&record).unwrap();

        assert!(json.get("id").is_none());
        assert_eq!(json["url"], "https://a.io");
        assert_eq!(json["updated_at"], "2024-01-01T00:00:00Z");
    }
}
