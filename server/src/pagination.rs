//! `startIndex` / `limit` / `order` query handling shared by the listing endpoints.

use serde::Deserialize;

/// Page size used by every listing endpoint when `limit` is absent.
pub const DEFAULT_PAGE_SIZE: i64 = 9;
/// Maximum page size for any listing.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw query parameters. Values are parsed leniently: anything that is not a
/// valid number falls back to the default, as browsers send whatever the UI
/// had on hand.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub start_index: Option<String>,
    pub limit: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
    pub ascending: bool,
}

impl Page {
    pub fn from_params(
        start_index: Option<&str>,
        limit: Option<&str>,
        order: Option<&str>,
        default_limit: i64,
    ) -> Self {
        let offset = start_index
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|n| *n >= 0)
            .unwrap_or(0);
        let limit = limit
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(default_limit)
            .min(MAX_PAGE_SIZE);
        Self {
            offset,
            limit,
            ascending: order == Some("asc"),
        }
    }

    /// SQL keyword for the requested sort direction (newest first by default).
    pub fn direction(&self) -> &'static str {
        if self.ascending {
            "ASC"
        } else {
            "DESC"
        }
    }
}

impl PageQuery {
    pub fn page(&self) -> Page {
        Page::from_params(
            self.start_index.as_deref(),
            self.limit.as_deref(),
            self.order.as_deref(),
            DEFAULT_PAGE_SIZE,
        )
    }
}
