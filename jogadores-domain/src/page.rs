use crate::{ServiceError, ServiceResult, player::PlayerSortBy};

pub const DEFAULT_PAGE_SIZE: usize = 20;

pub const MAX_PAGE_SIZE: usize = 2000;

/// Storage offsets are signed 64-bit, so no page may end past this row.
const MAX_ROW_INDEX: usize = i64::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub property: PlayerSortBy,
    pub order: SortOrder,
}

impl Sort {
    /// Parses `property[,asc|desc]`, the format used by the list endpoint.
    pub fn parse(value: &str) -> ServiceResult<Option<Sort>> {
        let mut parts = value.split(',').map(|part| part.trim());
        let property = match parts.next() {
            None | Some("") => return Ok(None),
            Some(property) => PlayerSortBy::parse(property)?,
        };
        let order = match parts.next().map(|order| order.to_lowercase()) {
            None => SortOrder::Ascending,
            Some(order) => match order.as_str() {
                "" | "asc" => SortOrder::Ascending,
                "desc" => SortOrder::Descending,
                _ => return ServiceError::bad_request(format!("Invalid sort order '{}'", order)),
            },
        };
        if parts.next().is_some() {
            return ServiceError::bad_request(format!("Invalid sort '{}'", value));
        }
        Ok(Some(Sort { property, order }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    size: usize,
    sort: Option<Sort>,
}

impl PageRequest {
    pub fn new(page: usize, size: usize, sort: Option<Sort>) -> ServiceResult<Self> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return ServiceError::bad_request(format!(
                "Page size must be between 1 and {}",
                MAX_PAGE_SIZE
            ));
        }
        let end = page
            .checked_add(1)
            .and_then(|pages| pages.checked_mul(size));
        if !end.is_some_and(|end| end <= MAX_ROW_INDEX) {
            return ServiceError::bad_request("Page number too large");
        }
        Ok(Self { page, size, sort })
    }

    pub fn of(page: usize, size: usize) -> ServiceResult<Self> {
        Self::new(page, size, None)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn sort(&self) -> Option<Sort> {
        self.sort
    }

    pub fn offset(&self) -> usize {
        self.page * self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

/// One slice of a larger result set together with the total match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: usize,
    pub page_request: PageRequest,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, page_request: PageRequest, total_elements: usize) -> Self {
        Self {
            content,
            total_elements,
            page_request,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total_elements.div_ceil(self.page_request.size())
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn is_first(&self) -> bool {
        self.page_request.page() == 0
    }

    pub fn is_last(&self) -> bool {
        self.page_request.page() >= self.total_pages().saturating_sub(1)
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            page_request: self.page_request,
        }
    }
}
