//! OKX `history-candles` URL construction.

use crate::PageRequest;

/// Default REST endpoint host.
pub const DEFAULT_BASE_URL: &str = "https://www.okx.com";

/// Path of the historical candles endpoint.
pub const HISTORY_CANDLES_PATH: &str = "/api/v5/market/history-candles";

/// Largest page the endpoint will return.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Builds the URL for one page of candles.
///
/// The exchange's `after` parameter is exclusive on the bar open time, so a
/// page ending at `request.end` asks for bars opened before
/// `end - bar + 1ms`.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use maline_fetch::PageRequest;
/// use maline_fetch::url::history_candles_url;
/// use maline_types::{Bar, InstrumentId};
///
/// let end = Utc.with_ymd_and_hms(2025, 1, 28, 16, 0, 0).unwrap();
/// let request = PageRequest::new(InstrumentId::new("SOL-USDT-SWAP"), Bar::Hour1, end, 100);
/// let url = history_candles_url("https://www.okx.com", &request);
/// assert_eq!(
///     url,
///     "https://www.okx.com/api/v5/market/history-candles?instId=SOL-USDT-SWAP&bar=1H&limit=100&after=1738076400001"
/// );
/// ```
#[must_use]
pub fn history_candles_url(base_url: &str, request: &PageRequest) -> String {
    format!(
        "{}{}?instId={}&bar={}&limit={}&after={}",
        base_url.trim_end_matches('/'),
        HISTORY_CANDLES_PATH,
        request.instrument,
        request.bar,
        request.limit.clamp(1, MAX_PAGE_LIMIT),
        request.after_millis()
    )
}
