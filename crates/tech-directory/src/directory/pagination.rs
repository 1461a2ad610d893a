use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Zero-based page index and page size, already clamped into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    size: usize,
}

impl PageRequest {
    /// Clamps `size` into `1..=MAX_PAGE_SIZE` and a negative `page` to 0.
    pub fn new(page: i64, size: i64) -> Self {
        let size = size.clamp(1, MAX_PAGE_SIZE as i64) as usize;
        let page = usize::try_from(page.max(0)).unwrap_or(usize::MAX);
        Self { page, size }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_elements: usize,
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            current_page: self.current_page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

pub fn paginate<T>(ranked: Vec<T>, request: PageRequest) -> Page<T> {
    let total_elements = ranked.len();
    let size = request.size;
    let total_pages = total_elements.div_ceil(size);
    let start = request.page.saturating_mul(size);

    let items = if start >= total_elements {
        Vec::new()
    } else {
        let end = start.saturating_add(size).min(total_elements);
        ranked.into_iter().skip(start).take(end - start).collect()
    };

    Page {
        items,
        total_elements,
        current_page: request.page,
        page_size: size,
        total_pages,
    }
}
