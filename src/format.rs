//! Display formatting for the presentation layer
//!
//! The renderer only paints strings; every number-to-text decision lives here
//! so list rows and the detail view format identically.

use crate::types::{AssetDetail, AssetSummary};
use serde::Serialize;

/// Maximum fraction digits of a locale-formatted price
const MAX_PRICE_FRACTION_DIGITS: usize = 3;

/// Sign of a 24h change, used to pick the row style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Positive,
    Negative,
}

impl ChangeDirection {
    /// Zero counts as positive
    pub fn of(change: f64) -> Self {
        if change >= 0.0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    /// CSS class name used by the renderer
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

/// Formats a number the way an en-US locale does: comma grouping and at most
/// three fraction digits with trailing zeros dropped
pub fn format_locale_number(value: f64) -> String {
    let fixed = format!("{:.*}", MAX_PRICE_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

/// `$65,000.5`
pub fn format_price_usd(price: f64) -> String {
    format!("${}", format_locale_number(price))
}

/// `$1282.53B`
pub fn format_market_cap_billions(market_cap: f64) -> String {
    format!("${:.2}B", market_cap / 1e9)
}

/// `-1.23%`
pub fn format_change_percent(change: f64) -> String {
    format!("{:.2}%", change)
}

/// Header of the detail view: `Bitcoin bitcoin (BTC)`
pub fn detail_header(detail: &AssetDetail) -> String {
    format!(
        "{} {} ({})",
        detail.name,
        detail.id,
        detail.symbol.to_uppercase()
    )
}

/// Pre-formatted cells for one market row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    /// Asset the row selects when clicked
    pub asset_id: String,
    /// `Bitcoin (BTC)` for list rows, the detail header for the detail view
    pub title: String,
    pub price: String,
    pub market_cap: String,
    pub change: String,
    pub direction: ChangeDirection,
}

impl From<&AssetSummary> for DisplayRow {
    fn from(asset: &AssetSummary) -> Self {
        Self {
            asset_id: asset.id.clone(),
            title: format!("{} ({})", asset.name, asset.symbol.to_uppercase()),
            price: format_price_usd(asset.current_price),
            market_cap: format_market_cap_billions(asset.market_cap),
            change: format_change_percent(asset.price_change_percentage_24h),
            direction: ChangeDirection::of(asset.price_change_percentage_24h),
        }
    }
}

impl From<&AssetDetail> for DisplayRow {
    fn from(detail: &AssetDetail) -> Self {
        let market = &detail.market_data;
        Self {
            asset_id: detail.id.clone(),
            title: detail_header(detail),
            price: format_price_usd(market.current_price_usd),
            market_cap: format_market_cap_billions(market.market_cap_usd),
            change: format_change_percent(market.price_change_percentage_24h),
            direction: ChangeDirection::of(market.price_change_percentage_24h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MarketData;

    fn bitcoin_detail() -> AssetDetail {
        AssetDetail {
            id: "bitcoin".to_string(),
            name: "Bitcoin".to_string(),
            symbol: "btc".to_string(),
            market_data: MarketData {
                current_price_usd: 65000.5,
                market_cap_usd: 1_282_530_000_000.0,
                price_change_percentage_24h: -1.2345,
            },
        }
    }

    #[test]
    fn test_locale_number() {
        assert_eq!(format_locale_number(65000.5), "65,000.5");
        assert_eq!(format_locale_number(1234567.0), "1,234,567");
        assert_eq!(format_locale_number(999.0), "999");
        assert_eq!(format_locale_number(0.99995), "1");
        assert_eq!(format_locale_number(0.1234), "0.123");
        assert_eq!(format_locale_number(-1500.25), "-1,500.25");
        assert_eq!(format_locale_number(-0.0001), "0");
    }

    #[test]
    fn test_detail_view_strings() {
        let row = DisplayRow::from(&bitcoin_detail());
        assert_eq!(row.title, "Bitcoin bitcoin (BTC)");
        assert_eq!(row.price, "$65,000.5");
        assert_eq!(row.market_cap, "$1282.53B");
        assert_eq!(row.change, "-1.23%");
        assert_eq!(row.direction.css_class(), "negative");
    }

    #[test]
    fn test_list_row_strings() {
        let asset = AssetSummary {
            id: "ethereum".to_string(),
            name: "Ethereum".to_string(),
            symbol: "eth".to_string(),
            current_price: 3120.0,
            market_cap: 375_000_000_000.0,
            price_change_percentage_24h: 0.0,
        };
        let row = DisplayRow::from(&asset);
        assert_eq!(row.asset_id, "ethereum");
        assert_eq!(row.title, "Ethereum (ETH)");
        assert_eq!(row.price, "$3,120");
        assert_eq!(row.market_cap, "$375.00B");
        assert_eq!(row.change, "0.00%");
        assert_eq!(row.direction, ChangeDirection::Positive);
    }
}
