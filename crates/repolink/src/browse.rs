//! Read-only paginated listing of a user's linked repositories.

use sea_orm::DatabaseConnection;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::repository::{self, LinkedRepository, Pagination, RepositoryError};

pub const DEFAULT_PAGE_NUM: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Shown instead of a listing when the user has no linked account.
pub const ACCOUNT_NOT_FOUND: &str = "GitHub account not found.";

#[derive(Debug, Error)]
pub enum BrowseError {
    /// Non-integer or non-positive `page_num` / `page_size`.
    #[error("Invalid pagination parameters: {message}")]
    InvalidPagination { message: String },

    /// `page_num` past the last page.
    #[error("Page {page_num} out of range ({total_pages} pages)")]
    PageOutOfRange { page_num: u64, total_pages: u64 },

    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),
}

impl BrowseError {
    pub fn reason(&self) -> &'static str {
        match self {
            BrowseError::InvalidPagination { .. } | BrowseError::PageOutOfRange { .. } => {
                "invalid_pagination_params"
            }
            BrowseError::Store(_) => "store_error",
        }
    }
}

/// Validated, 1-indexed pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_num: u64,
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_num: DEFAULT_PAGE_NUM,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn parse_positive(name: &str, raw: Option<&str>, default: u64) -> Result<u64, BrowseError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 1 => Ok(value as u64),
        _ => Err(BrowseError::InvalidPagination {
            message: format!("{name}={raw:?} must be a positive integer"),
        }),
    }
}

impl PageRequest {
    /// Parse raw query values; absent values take the defaults.
    pub fn parse(page_num: Option<&str>, page_size: Option<&str>) -> Result<Self, BrowseError> {
        Ok(Self {
            page_num: parse_positive("page_num", page_num, DEFAULT_PAGE_NUM)?,
            page_size: parse_positive("page_size", page_size, DEFAULT_PAGE_SIZE)?,
        })
    }
}

/// One page of the browse view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BrowsePage {
    pub items: Vec<LinkedRepository>,
    pub page_num: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
    pub avatar_url: Option<String>,
    /// Set when there is nothing to list for a reason the user should see.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// List a user's repositories, most starred first.
///
/// A user without a linked account gets an empty page carrying
/// [`ACCOUNT_NOT_FOUND`]; pagination is only validated once an account exists.
/// Page 1 of an empty listing is valid; any later page past the end is not.
pub async fn browse(
    db: &DatabaseConnection,
    user_id: Uuid,
    page_num: Option<&str>,
    page_size: Option<&str>,
) -> Result<BrowsePage, BrowseError> {
    let Some(account) = repository::find_account_for_user(db, user_id).await? else {
        return Ok(BrowsePage {
            error: Some(ACCOUNT_NOT_FOUND.to_string()),
            ..BrowsePage::default()
        });
    };

    let request = PageRequest::parse(page_num, page_size)?;
    let result = repository::find_linked_for_user(
        db,
        user_id,
        Pagination::new(request.page_num - 1, request.page_size),
    )
    .await?;

    if request.page_num > result.total_pages.max(1) {
        return Err(BrowseError::PageOutOfRange {
            page_num: request.page_num,
            total_pages: result.total_pages,
        });
    }

    Ok(BrowsePage {
        items: result.items,
        page_num: request.page_num,
        page_size: request.page_size,
        total: result.total,
        total_pages: result.total_pages,
        avatar_url: account.avatar_url,
        error: None,
    })
}
