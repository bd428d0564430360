use async_trait::async_trait;
use serde::Serialize;

use super::domain::{InvoiceId, InvoiceRecord};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Document storage for receipts. Records are append-only.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn insert(&self, record: InvoiceRecord) -> Result<InvoiceRecord, RepositoryError>;
    /// Records ordered newest first, skipping `offset` and returning at most `limit`.
    async fn page(&self, offset: usize, limit: usize)
        -> Result<Vec<InvoiceRecord>, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
    async fn fetch(&self, id: &InvoiceId) -> Result<Option<InvoiceRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Orders records by creation time, newest first, then slices out one page.
///
/// `records` must be in insertion order; equal timestamps list the later insert first.
pub fn newest_first_page(
    records: &[InvoiceRecord],
    offset: usize,
    limit: usize,
) -> Vec<InvoiceRecord> {
    let mut ordered: Vec<&InvoiceRecord> = records.iter().rev().collect();
    ordered.sort_by(|left, right| right.created_at.cmp(&left.created_at));
    ordered
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect()
}

/// Page coordinates for a listing, one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Reads raw query values leniently: leading digits count, anything unusable
    /// (missing, junk, zero, negative) falls back to the default.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: page.and_then(leading_positive).unwrap_or(DEFAULT_PAGE),
            limit: limit.and_then(leading_positive).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    pub fn capped(self, max_limit: u32) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, max_limit.max(1)),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize)
            .saturating_sub(1)
            .saturating_mul(self.limit as usize)
    }
}

fn leading_positive(raw: &str) -> Option<u32> {
    let digits = raw.trim_start();
    let digits = digits.strip_prefix('+').unwrap_or(digits);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<u32>().ok().filter(|value| *value > 0)
}

/// One page of receipts plus the totals the admin table paginates with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePage {
    pub invoices: Vec<InvoiceRecord>,
    pub total: u64,
    pub pages: u64,
    pub current_page: u32,
}

impl InvoicePage {
    pub fn new(invoices: Vec<InvoiceRecord>, total: u64, request: PageRequest) -> Self {
        Self {
            invoices,
            total,
            pages: total.div_ceil(u64::from(request.limit.max(1))),
            current_page: request.page,
        }
    }
}
