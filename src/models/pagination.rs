use serde::Serialize;

/// List envelope: `{ data, current_page, per_page, total, last_page }`.
#[derive(Debug, Serialize, PartialEq)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    #[serde(flatten)]
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
pub struct PaginationMeta {
    pub current_page: u64,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u64,
}

impl PaginationMeta {
    pub fn new(current_page: u64, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        Self {
            current_page,
            per_page,
            total,
            last_page: total.div_ceil(per_page as u64),
        }
    }
}
