//! Page requests, sorting and page/slice result envelopes.
//!
//! # Responsibility
//! - Describe which window of a result set a caller wants (`PageRequest`).
//! - Carry the window plus totals back (`Page`) or just a has-next flag (`Slice`).
//! - Translate `Sort` into SQL `ORDER BY` through an explicit column whitelist.
//!
//! # Invariants
//! - Page numbers are zero-based and page size is at least 1.
//! - `Page` totals are consistent: `total_pages == ceil(total_elements / size)`.
//! - Sort properties never reach SQL unless whitelisted.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound applied to externally supplied page sizes.
pub const MAX_PAGE_SIZE: u32 = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagingError {
    InvalidSize(u32),
    UnknownSortProperty(String),
}

impl Display for PagingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSize(size) => write!(f, "page size must be at least 1, got {size}"),
            Self::UnknownSortProperty(property) => {
                write!(f, "unknown sort property `{property}`")
            }
        }
    }
}

impl Error for PagingError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub property: String,
    pub direction: Direction,
}

impl Order {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
        }
    }
}

/// Ordered list of sort orders. Empty means unsorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(direction: Direction, properties: &[&str]) -> Self {
        Self {
            orders: properties
                .iter()
                .map(|property| Order {
                    property: (*property).to_string(),
                    direction,
                })
                .collect(),
        }
    }

    pub fn by_orders(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    /// Parses one `sort` request parameter: `prop[,prop...][,asc|desc]`.
    ///
    /// The direction applies to every property in the parameter and
    /// defaults to ascending. Blank segments are skipped.
    pub fn from_param(value: &str) -> Self {
        let mut segments: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect();
        let direction = match segments.last().and_then(|last| Direction::parse(last)) {
            Some(direction) => {
                segments.pop();
                direction
            }
            None => Direction::Asc,
        };
        Self::by(direction, &segments)
    }

    pub fn and(mut self, other: Sort) -> Self {
        self.orders.extend(other.orders);
        self
    }

    pub fn is_sorted(&self) -> bool {
        !self.orders.is_empty()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Renders `ORDER BY` using `columns` as the property whitelist.
    ///
    /// `tiebreak` is always appended so equal keys keep a stable order
    /// across pages.
    pub fn to_order_by(
        &self,
        columns: &[(&str, &str)],
        tiebreak: &str,
    ) -> Result<String, PagingError> {
        let mut parts = Vec::with_capacity(self.orders.len() + 1);
        for order in &self.orders {
            let column = columns
                .iter()
                .find(|(property, _)| *property == order.property)
                .map(|(_, column)| *column)
                .ok_or_else(|| PagingError::UnknownSortProperty(order.property.clone()))?;
            parts.push(format!("{column} {}", order.direction.as_sql()));
        }
        parts.push(tiebreak.to_string());
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }
}

/// Zero-based page window with optional sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Sort,
}

impl PageRequest {
    pub fn of(page: u32, size: u32) -> Result<Self, PagingError> {
        Self::of_sorted(page, size, Sort::unsorted())
    }

    pub fn of_sorted(page: u32, size: u32, sort: Sort) -> Result<Self, PagingError> {
        if size == 0 {
            return Err(PagingError::InvalidSize(size));
        }
        Ok(Self { page, size, sort })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn previous_or_first(&self) -> Self {
        Self {
            page: self.page.saturating_sub(1),
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort: Sort) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }
}

/// One page of results plus the total row count of the underlying query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    content: Vec<T>,
    number: u32,
    size: u32,
    total_elements: u64,
    sort: Sort,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            number: request.page,
            size: request.size,
            total_elements,
            sort: request.sort.clone(),
        }
    }

    /// Builds a page, running `count` only when the total cannot be
    /// inferred from the fetched content.
    ///
    /// The total is known without a count query when the first page is
    /// not full, or when a later page is non-empty and not full.
    pub fn from_query<E>(
        content: Vec<T>,
        request: &PageRequest,
        count: impl FnOnce() -> Result<u64, E>,
    ) -> Result<Self, E> {
        let offset = request.offset();
        let fetched = content.len() as u64;
        let size = u64::from(request.size);

        let total = if offset == 0 && fetched < size {
            fetched
        } else if fetched != 0 && fetched < size {
            offset + fetched
        } else {
            count()?
        };

        Ok(Self::new(content, request, total))
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn total_pages(&self) -> u32 {
        let size = u64::from(self.size.max(1));
        u32::try_from(self.total_elements.div_ceil(size)).unwrap_or(u32::MAX)
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_first(&self) -> bool {
        !self.has_previous()
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
            sort: self.sort,
        }
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Page", 10)?;
        state.serialize_field("content", &self.content)?;
        state.serialize_field("number", &self.number)?;
        state.serialize_field("size", &self.size)?;
        state.serialize_field("sort", &self.sort)?;
        state.serialize_field("totalElements", &self.total_elements)?;
        state.serialize_field("totalPages", &self.total_pages())?;
        state.serialize_field("numberOfElements", &self.number_of_elements())?;
        state.serialize_field("first", &self.is_first())?;
        state.serialize_field("last", &self.is_last())?;
        state.serialize_field("empty", &self.is_empty())?;
        state.end()
    }
}

/// A window of results that only knows whether another window follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice<T> {
    content: Vec<T>,
    number: u32,
    size: u32,
    has_next: bool,
}

impl<T> Slice<T> {
    /// Builds a slice from a query that fetched up to `size + 1` rows.
    pub fn from_overfetch(mut content: Vec<T>, request: &PageRequest) -> Self {
        let size = request.size as usize;
        let has_next = content.len() > size;
        content.truncate(size);
        Self {
            content,
            number: request.page,
            size: request.size,
            has_next,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn is_last(&self) -> bool {
        !self.has_next
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Slice<U> {
        Slice {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            has_next: self.has_next,
        }
    }
}
