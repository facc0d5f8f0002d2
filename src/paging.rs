//! Pagination and sorting parameters.
//!
//! Parsing is lenient: a value that does not make sense is ignored and the default applies,
//! so a bad `limit` never turns into an error response.

use serde::Deserialize;

pub const DEFAULT_LIMIT: u32 = 100;

/// Raw list query as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub skip: Option<String>,
    pub sort: Option<String>,
    pub sort_dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub skip: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            skip: 0,
        }
    }
}

impl Pagination {
    pub fn from_query(query: &ListQuery) -> Self {
        let mut pagination = Self::default();
        if let Some(limit) = query.limit.as_deref().and_then(parse_count) {
            if limit > 0 {
                pagination.limit = limit;
            }
        }
        if let Some(skip) = query.skip.as_deref().and_then(parse_count) {
            pagination.skip = skip;
        }
        pagination
    }

    pub fn to_query(self) -> Vec<(&'static str, String)> {
        vec![("skip", self.skip.to_string()), ("limit", self.limit.to_string())]
    }
}

/// Accepts integers, including integral floats such as `"20.0"`.
fn parse_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64).then_some(f as u32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

/// Sort criteria a route accepts.
#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    pub allowed: &'static [&'static str],
    pub default: Option<&'static str>,
}

pub const MOVIE_SORTS: SortSpec = SortSpec {
    allowed: &["year", "title", "avg_rating", "rating_count"],
    default: None,
};

/// Sorts served by the reviews service rather than the movies service.
pub const RATING_SORTS: &[&str] = &["avg_rating", "rating_count"];

pub const REVIEW_SORTS: SortSpec = SortSpec {
    allowed: &["created", "rating"],
    default: None,
};

pub const RELATION_SORTS: SortSpec = SortSpec {
    allowed: &["created"],
    default: None,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sorting {
    pub by: &'static str,
    pub dir: SortDir,
}

impl Sorting {
    /// `None` when neither the query nor the route names a criterion.
    pub fn from_query(query: &ListQuery, spec: SortSpec) -> Option<Self> {
        let by = query
            .sort
            .as_deref()
            .and_then(|sort| spec.allowed.iter().copied().find(|allowed| *allowed == sort))
            .or(spec.default)?;

        let dir = match query.sort_dir.as_deref() {
            Some("desc") => SortDir::Desc,
            _ => SortDir::Asc,
        };

        Some(Self { by, dir })
    }

    pub fn to_query(self) -> Vec<(&'static str, String)> {
        vec![("sort", self.by.to_string()), ("sort_dir", self.dir.as_str().to_string())]
    }
}

/// Combined query string for a paged, optionally sorted list call.
pub fn list_query(pagination: Pagination, sorting: Option<Sorting>) -> Vec<(&'static str, String)> {
    let mut query = pagination.to_query();
    if let Some(sorting) = sorting {
        query.extend(sorting.to_query());
    }
    query
}
