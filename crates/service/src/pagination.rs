//! Pagination utilities for service layer
//!
//! `PageRequest` is a zero-based page window plus ordered sort keys; `Page<T>` is the
//! response envelope with total-count metadata.

use serde::Serialize;

use crate::errors::ServiceError;
use crate::validation::ValidationErrors;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl From<Direction> for sea_orm::Order {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Asc => sea_orm::Order::Asc,
            Direction::Desc => sea_orm::Order::Desc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortOrder {
    pub property: String,
    pub direction: Direction,
}

impl SortOrder {
    pub fn asc(property: &str) -> Self { Self { property: property.to_string(), direction: Direction::Asc } }

    pub fn desc(property: &str) -> Self { Self { property: property.to_string(), direction: Direction::Desc } }

    /// Parse `property[,asc|desc]`; direction is case-insensitive and defaults to ascending.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut parts = raw.split(',').map(str::trim);
        let property = parts.next().unwrap_or_default();
        if property.is_empty() {
            return Err(format!("Invalid sort expression '{}'", raw));
        }
        let direction = match parts.next() {
            None | Some("") => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => Direction::Desc,
            Some(d) => return Err(format!("Invalid sort direction '{}'", d)),
        };
        if parts.next().is_some() {
            return Err(format!("Invalid sort expression '{}'", raw));
        }
        Ok(Self { property: property.to_string(), direction })
    }
}

/// Pagination parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 0-based page index
    pub page: u64,
    /// items per page, always >= 1
    pub size: u64,
    pub sort: Vec<SortOrder>,
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> Self { Self { page, size: size.max(1), sort: Vec::new() } }

    pub fn sorted_by(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    pub fn offset(&self) -> u64 { self.page.saturating_mul(self.size) }

    /// True when the page window starts before `total`; false on offset overflow.
    pub fn has_rows(&self, total: u64) -> bool {
        self.page.checked_mul(self.size).is_some_and(|offset| offset < total)
    }

    /// Build from raw query values.
    ///
    /// Missing values fall back to page 0 and `default_size`; size is clamped to
    /// `1..=max_size`. Malformed sort expressions and properties outside `sortable` are
    /// reported as validation failures on field `sort`.
    pub fn from_query(
        page: Option<u64>,
        size: Option<u64>,
        sort: &[String],
        default_size: u64,
        max_size: u64,
        sortable: &[&str],
    ) -> Result<Self, ServiceError> {
        let size = size.unwrap_or(default_size).clamp(1, max_size.max(1));
        let mut request = Self::new(page.unwrap_or(0), size);
        let mut errors = ValidationErrors::new();
        for raw in sort {
            match SortOrder::parse(raw) {
                Ok(order) if sortable.contains(&order.property.as_str()) => request.sort.push(order),
                Ok(order) => errors.add("sort", format!("Unknown sort property '{}'", order.property)),
                Err(msg) => errors.add("sort", msg),
            }
        }
        errors.into_result()?;
        Ok(request)
    }
}

impl Default for PageRequest {
    fn default() -> Self { Self::new(0, 20) }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    /// 0-based index of this page
    pub number: u64,
    pub size: u64,
    pub number_of_elements: u64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = request.size.max(1);
        let total_pages = total_elements.div_ceil(size);
        Self {
            number_of_elements: content.len() as u64,
            empty: content.is_empty(),
            content,
            total_elements,
            total_pages,
            number: request.page,
            size,
            first: request.page == 0,
            last: request.page.saturating_add(1) >= total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
            number_of_elements: self.number_of_elements,
            first: self.first,
            last: self.last,
            empty: self.empty,
        }
    }
}
