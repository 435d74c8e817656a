//! Payloads of the account endpoints: customer details, demat holdings and funds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub exg_trade_date: ExchangeDates,
    #[serde(default)]
    pub exg_status: ExchangeDates,
    #[serde(default)]
    pub segments_allowed: SegmentsAllowed,
    #[serde(rename = "idirect_userid", default)]
    pub user_id: String,
    #[serde(default)]
    pub session_token: String,
    #[serde(rename = "idirect_user_name", default)]
    pub user_name: String,
    #[serde(rename = "idirect_lastlogin_time", default)]
    pub last_login_time: String,
}

/// One value per exchange, used for both trade dates and exchange status.
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct ExchangeDates {
    #[serde(default)]
    pub nse: String,
    #[serde(default)]
    pub bse: String,
    #[serde(default)]
    pub fno: String,
    #[serde(default)]
    pub ndx: String,
}

#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SegmentsAllowed {
    #[serde(default)]
    pub trading: String,
    #[serde(default)]
    pub equity: String,
    #[serde(default)]
    pub derivatives: String,
    #[serde(default)]
    pub currency: String,
}

/// Quantities are reported as strings by the API and kept that way.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DematHolding {
    pub stock_code: String,
    #[serde(rename = "stock_ISIN")]
    pub stock_isin: String,
    pub quantity: String,
    pub demat_total_bulk_quantity: String,
    pub demat_avail_quantity: String,
    pub blocked_quantity: String,
    pub demat_allocated_quantity: String,
}

/// `unallocated_balance` arrives as a string, the other amounts as numbers; both parse into
/// [`Decimal`].
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funds {
    pub bank_account: String,
    pub total_bank_balance: Decimal,
    pub allocated_equity: Decimal,
    pub allocated_fno: Decimal,
    pub allocated_commodity: Decimal,
    pub allocated_currency: Decimal,
    pub block_by_trade_equity: Decimal,
    pub block_by_trade_fno: Decimal,
    pub block_by_trade_commodity: Decimal,
    pub block_by_trade_currency: Decimal,
    pub block_by_trade_balance: Decimal,
    pub unallocated_balance: Decimal,
}

/// Body of the `customerdetails` request: the session key goes in `SessionToken`.
#[derive(Serialize)]
pub(crate) struct CustomerDetailsRequest<'req> {
    #[serde(rename = "SessionToken")]
    pub(crate) session_key: &'req str,
    #[serde(rename = "AppKey")]
    pub(crate) app_key: &'req str,
}
