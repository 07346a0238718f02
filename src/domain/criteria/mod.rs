//! Search criteria over remote field names

mod matcher;

use serde_json::Value;

pub use matcher::Matcher;

use crate::domain::unit::CONTENT_TYPE_FIELD;

/// A search filter evaluated against records in their remote layout
///
/// Field names are remote field names; nested fields use dotted paths
/// such as `notes.created` or `checksums.sha256`.
#[derive(Debug, Clone, Default)]
pub enum Criteria {
    /// Matches everything
    #[default]
    True,
    And(Vec<Criteria>),
    Or(Vec<Criteria>),
    Field { field: String, matcher: Matcher },
}

impl Criteria {
    pub fn and(criteria: impl IntoIterator<Item = Criteria>) -> Self {
        Self::And(criteria.into_iter().collect())
    }

    pub fn or(criteria: impl IntoIterator<Item = Criteria>) -> Self {
        Self::Or(criteria.into_iter().collect())
    }

    pub fn with_field(field: impl Into<String>, matcher: impl Into<Matcher>) -> Self {
        Self::Field {
            field: field.into(),
            matcher: matcher.into(),
        }
    }

    pub fn with_field_in<I>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::with_field(field, Matcher::is_in(values))
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self::with_field("id", Matcher::equals(id.into()))
    }

    pub fn with_unit_type(content_type_id: impl Into<String>) -> Self {
        Self::with_field(CONTENT_TYPE_FIELD, Matcher::equals(content_type_id.into()))
    }

    pub fn matches(&self, data: &Value) -> bool {
        match self {
            Self::True => true,
            Self::And(items) => items.iter().all(|c| c.matches(data)),
            Self::Or(items) => items.iter().any(|c| c.matches(data)),
            Self::Field { field, matcher } => matcher.matches(lookup(data, field)),
        }
    }
}

/// Resolve a dotted path within a JSON document
fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |current, segment| current.get(segment))
}
