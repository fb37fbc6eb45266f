use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Subject,
    Location,
    Price,
    Spaces,
}

impl SortField {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Location => "location",
            Self::Price => "price",
            Self::Spaces => "spaces",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "subject" => Ok(Self::Subject),
            "location" => Ok(Self::Location),
            "price" => Ok(Self::Price),
            "spaces" => Ok(Self::Spaces),
            other => Err(format!(
                "unknown sort field '{other}' (expected subject, location, price or spaces)"
            )),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(format!("unknown sort order '{other}' (expected asc or desc)")),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// Search and sort parameters for the lesson listing.
///
/// Filtering and ordering happen server-side; this type only decides which
/// query parameters are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonQuery {
    search: Option<String>,
    sort: Option<(SortField, SortDirection)>,
}

impl LessonQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a query from raw UI inputs.
    ///
    /// A direction without a field is dropped; a field without a direction sorts ascending.
    pub fn build(
        search: Option<&str>,
        sort_field: Option<SortField>,
        direction: Option<SortDirection>,
    ) -> Self {
        let query = match search {
            Some(text) => Self::new().search(text),
            None => Self::new(),
        };
        match sort_field {
            Some(field) => query.sort_by(field, direction.unwrap_or_default()),
            None => query,
        }
    }

    /// Sets the free-text search. Blank text clears it.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = if text.trim().is_empty() {
            None
        } else {
            Some(text)
        };
        self
    }

    pub fn sort_by(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort = Some((field, direction));
        self
    }

    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn sort(&self) -> Option<(SortField, SortDirection)> {
        self.sort
    }

    /// Query parameters in a stable order: `q`, then `sortBy` and `order` together.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if let Some(text) = &self.search {
            params.push(("q", text.clone()));
        }
        if let Some((field, direction)) = self.sort {
            params.push(("sortBy", field.as_param().to_string()));
            params.push(("order", direction.as_param().to_string()));
        }
        params
    }
}
