//! Column Entity
//!
//! An ordered container of tasks with a title and a display color.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::entity::{DomainError, DomainResult, Entity};
use super::task::Task;

/// Display color as an RGB triplet, `"r,g,b"` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = DomainError;

    /// Accepts `"12,200,45"` as well as `"12, 200, 45"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| DomainError::invalid(format!("invalid color component in {:?}", s)))?;

        match parts.as_slice() {
            [r, g, b] => Ok(Rgb::new(*r, *g, *b)),
            _ => Err(DomainError::invalid(format!(
                "color must have three components, got {:?}",
                s
            ))),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = DomainError;

    /// An empty string (a column stored without color) reads as black
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Ok(Rgb::BLACK);
        }
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// A column and the tasks it owns, in insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub color: Rgb,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// The service encodes an empty task list as `null`
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Task>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Task>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Column {
    pub fn new(id: u32, title: impl Into<String>, color: Rgb) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            color,
            tasks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn task(&self, task_id: u32) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }
}

impl Entity for Column {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Fields for a column that does not exist yet; blanks take defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewColumn {
    pub title: Option<String>,
    pub color: Option<Rgb>,
}

impl NewColumn {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            color: None,
        }
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Fill defaults: `"Column {existing + 1}"` and black
    pub fn resolve(&self, existing: usize) -> ColumnFields {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Column {}", existing + 1));

        ColumnFields {
            title,
            color: self.color.unwrap_or(Rgb::BLACK),
        }
    }
}

/// Full `{title, color}` body the store expects for create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFields {
    pub title: String,
    pub color: Rgb,
}

/// Partial update of a column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnPatch {
    pub title: Option<String>,
    pub color: Option<Rgb>,
}

impl ColumnPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            color: None,
        }
    }

    pub fn color(color: Rgb) -> Self {
        Self {
            title: None,
            color: Some(color),
        }
    }

    /// Merge over `current`, rejecting a blank title
    pub fn resolve(&self, current: &Column) -> DomainResult<ColumnFields> {
        let title = match self.title.as_deref().map(str::trim) {
            Some("") => return Err(DomainError::invalid("column title cannot be empty")),
            Some(title) => title.to_string(),
            None => current.title.clone(),
        };

        Ok(ColumnFields {
            title,
            color: self.color.unwrap_or(current.color),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_parsing() {
        assert_eq!("12,200,45".parse::<Rgb>().unwrap(), Rgb::new(12, 200, 45));
        assert_eq!("0, 0, 0".parse::<Rgb>().unwrap(), Rgb::BLACK);
        assert!("12,200".parse::<Rgb>().is_err());
        assert!("300,0,0".parse::<Rgb>().is_err());
        assert!("#FF0000".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_rgb_wire_format() {
        let json = serde_json::to_string(&Rgb::new(10, 10, 10)).unwrap();
        assert_eq!(json, r#""10,10,10""#);
        let back: Rgb = serde_json::from_str(r#""1, 2, 3""#).unwrap();
        assert_eq!(back, Rgb::new(1, 2, 3));
        let empty: Rgb = serde_json::from_str(r#""""#).unwrap();
        assert_eq!(empty, Rgb::BLACK);
    }

    #[test]
    fn test_new_column_defaults() {
        let fields = NewColumn::default().resolve(2);
        assert_eq!(fields.title, "Column 3");
        assert_eq!(fields.color, Rgb::BLACK);

        let fields = NewColumn::titled("  ").resolve(0);
        assert_eq!(fields.title, "Column 1");

        let fields = NewColumn::titled("Backlog")
            .with_color(Rgb::new(10, 10, 10))
            .resolve(5);
        assert_eq!(fields.title, "Backlog");
        assert_eq!(fields.color.to_string(), "10,10,10");
    }

    #[test]
    fn test_patch_merges_over_current() {
        let current = Column::new(1, "Todo", Rgb::new(1, 2, 3));

        let fields = ColumnPatch::color(Rgb::new(9, 9, 9)).resolve(&current).unwrap();
        assert_eq!(fields.title, "Todo");
        assert_eq!(fields.color, Rgb::new(9, 9, 9));

        assert!(ColumnPatch::title("  ").resolve(&current).is_err());
    }

    #[test]
    fn test_column_from_wire() {
        let json = r#"{"id": 1, "title": "Doing", "color": "0, 0, 0",
            "tasks": [{"id": 5, "title": "t", "description": "", "progress": 0, "column_id": 1,
                       "created_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-01T10:00:00Z"}],
            "created_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-01T10:00:00Z"}"#;
        let column: Column = serde_json::from_str(json).unwrap();
        assert_eq!(column.tasks.len(), 1);
        assert!(column.task(5).is_some());
    }

    #[test]
    fn test_column_with_null_tasks() {
        let json = r#"{"id": 7, "title": "Backlog", "color": "10,10,10", "tasks": null,
            "created_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-01T10:00:00Z"}"#;
        let column: Column = serde_json::from_str(json).unwrap();
        assert_eq!(column.id, 7);
        assert!(column.tasks.is_empty());

        let bare: Column = serde_json::from_str(r#"{"id": 8, "title": "Done"}"#).unwrap();
        assert!(bare.tasks.is_empty());
    }
}
