//! Decoding and validation of create-book requests.

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use utoipa::ToSchema;

use super::models::NewBook;

/// A request field that may have been left out.
///
/// JSON `null` decodes as [`Field::Absent`]; an empty string decodes as
/// `Present("")` so that missing and blank stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Present(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Field::Absent, Field::Present)
    }
}

impl<'de, T> Deserialize<'de> for Field<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}

/// Unvalidated body of `POST /books`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct CreateBookCommand {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub title: Field<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub author: Field<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub publisher: Field<String>,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub price: Field<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    FieldMissing,
    FieldEmpty,
}

impl ValidationErrorKind {
    /// Problem `type` token reported to clients.
    pub fn problem_type(self) -> &'static str {
        match self {
            ValidationErrorKind::FieldMissing => "about:none",
            ValidationErrorKind::FieldEmpty => "about:blank",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ValidationErrorKind::FieldMissing => "none",
            ValidationErrorKind::FieldEmpty => "blank",
        }
    }
}

/// First offending field of a [`CreateBookCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field} must not be {}.", .kind.describe())]
pub struct ValidationError {
    pub field: &'static str,
    pub kind: ValidationErrorKind,
}

pub type ValidationOutcome = Result<NewBook, ValidationError>;

impl CreateBookCommand {
    /// Check fields in the order title, author, publisher, price and stop at
    /// the first failure.
    pub fn validate(self) -> ValidationOutcome {
        let title = required_text("title", self.title)?;
        let author = required_text("author", self.author)?;
        let publisher = required_text("publisher", self.publisher)?;
        let price = required("price", self.price)?;

        Ok(NewBook {
            title,
            author,
            publisher,
            price,
        })
    }
}

fn required<T>(field: &'static str, value: Field<T>) -> Result<T, ValidationError> {
    match value {
        Field::Present(value) => Ok(value),
        Field::Absent => Err(ValidationError {
            field,
            kind: ValidationErrorKind::FieldMissing,
        }),
    }
}

fn required_text(field: &'static str, value: Field<String>) -> Result<String, ValidationError> {
    let text = required(field, value)?;
    if text.is_empty() {
        return Err(ValidationError {
            field,
            kind: ValidationErrorKind::FieldEmpty,
        });
    }
    Ok(text)
}
