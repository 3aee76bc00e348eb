/// To-do list backed by the `todos` key

use crate::clock::Clock;
use crate::config::TODOS_KEY;
use crate::error::{Result, XTabError};
use crate::records::TodoItem;
use crate::storage::{ListStore, StorageHandle};
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

const TODOS: ListStore<TodoItem> = ListStore::new(TODOS_KEY);

/// Value format of an `<input type="datetime-local">`
const DUE_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// True once `now` is strictly past the due date. Never cache this.
pub fn is_overdue(item: &TodoItem, now: DateTime<Utc>) -> bool {
    item.due_date < now
}

/// Overdue and still open, which is what gets highlighted
pub fn needs_attention(item: &TodoItem, now: DateTime<Utc>) -> bool {
    !item.completed && is_overdue(item, now)
}

/// Parse a `datetime-local` input value in the user's zone
pub fn parse_due_input(value: &str, clock: &impl Clock) -> Option<DateTime<Utc>> {
    let value = value.trim();
    // Browsers may append seconds
    let local = NaiveDateTime::parse_from_str(value, DUE_INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()?;
    clock.from_local(local)
}

/// `MM-dd HH:mm` in the user's zone
pub fn format_due(due_date: DateTime<Utc>, clock: &impl Clock) -> String {
    clock.to_local(due_date).format("%m-%d %H:%M").to_string()
}

/// Items in insertion order
pub struct TodoStore {
    storage: StorageHandle,
    items: Vec<TodoItem>,
}

impl TodoStore {
    pub fn load(storage: StorageHandle) -> Self {
        let items = TODOS.load(&*storage);
        TodoStore { storage, items }
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn add(&mut self, text: &str, due_date: Option<DateTime<Utc>>) -> Result<&TodoItem> {
        let text = text.trim();
        if text.is_empty() {
            return Err(XTabError::validation("To-do text is required"));
        }
        let due_date = due_date.ok_or_else(|| XTabError::validation("Pick a due date"))?;

        self.items.push(TodoItem {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
            due_date,
        });
        if let Err(e) = self.persist() {
            self.items.pop();
            return Err(e);
        }

        Ok(&self.items[self.items.len() - 1])
    }

    /// Flip `completed`; returns false when the id is unknown
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.items.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        let item = &mut self.items[index];
        item.completed = !item.completed;

        if let Err(e) = self.persist() {
            let item = &mut self.items[index];
            item.completed = !item.completed;
            return Err(e);
        }
        Ok(true)
    }

    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let original_len = self.items.len();
        let remaining: Vec<TodoItem> = self
            .items
            .iter()
            .filter(|t| t.id != id)
            .cloned()
            .collect();

        if remaining.len() == original_len {
            return Ok(false);
        }

        TODOS.save(&*self.storage, &remaining)?;
        self.items = remaining;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        TODOS.save(&*self.storage, &self.items)
    }
}
