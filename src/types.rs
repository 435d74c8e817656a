use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::str::FromStr;

use crate::Result;
use crate::error::Error;

/// HTTP methods the trading API accepts.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl RequestMethod {
    #[must_use]
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl FromStr for RequestMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(RequestMethod::Get),
            "POST" => Ok(RequestMethod::Post),
            "PUT" => Ok(RequestMethod::Put),
            "DELETE" => Ok(RequestMethod::Delete),
            other => Err(Error::validation(format!(
                "unsupported request method `{other}`; expected one of: GET|POST|PUT|DELETE"
            ))),
        }
    }
}

/// Resource paths, relative to the API base URL.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Endpoint {
    CustomerDetails,
    DematHoldings,
    Funds,
    HistoricalCharts,
    Margin,
    Order,
    PortfolioHoldings,
    PortfolioPositions,
    Quotes,
    Trades,
    OptionChain,
    SquareOff,
    PreviewOrder,
    LimitCalculator,
    MarginCalculator,
}

impl Endpoint {
    pub const ALL: [Endpoint; 15] = [
        Endpoint::CustomerDetails,
        Endpoint::DematHoldings,
        Endpoint::Funds,
        Endpoint::HistoricalCharts,
        Endpoint::Margin,
        Endpoint::Order,
        Endpoint::PortfolioHoldings,
        Endpoint::PortfolioPositions,
        Endpoint::Quotes,
        Endpoint::Trades,
        Endpoint::OptionChain,
        Endpoint::SquareOff,
        Endpoint::PreviewOrder,
        Endpoint::LimitCalculator,
        Endpoint::MarginCalculator,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Endpoint::CustomerDetails => "customerdetails",
            Endpoint::DematHoldings => "dematholdings",
            Endpoint::Funds => "funds",
            Endpoint::HistoricalCharts => "historicalcharts",
            Endpoint::Margin => "margin",
            Endpoint::Order => "order",
            Endpoint::PortfolioHoldings => "portfolioholdings",
            Endpoint::PortfolioPositions => "portfoliopositions",
            Endpoint::Quotes => "quotes",
            Endpoint::Trades => "trades",
            Endpoint::OptionChain => "optionchain",
            Endpoint::SquareOff => "squareoff",
            Endpoint::PreviewOrder => "preview_order",
            Endpoint::LimitCalculator => "fnolmtpriceandqtycal",
            Endpoint::MarginCalculator => "margincalculator",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let path = s.trim().trim_matches('/');
        Endpoint::ALL
            .into_iter()
            .find(|endpoint| endpoint.as_str() == path)
            .ok_or_else(|| Error::unknown_endpoint(path))
    }
}

/// Header names whose values are credentials and must not show up in logs.
const REDACTED: [&str; 2] = ["X-Checksum", "X-SessionToken"];

/// Header map with case-sensitive names.
///
/// The API matches `X-Checksum`, `X-SessionToken` etc. by their exact spelling, so names are
/// stored as given and never canonicalized. Inserting an existing name replaces its value.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// Copies every entry of `other` into `self`; on a name collision `other` wins.
    pub fn merge(&mut self, other: &Headers) {
        for (name, value) in other {
            self.0.insert(name.clone(), value.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(name, value)| {
                let value = if REDACTED.contains(&name.as_str()) {
                    "[REDACTED]"
                } else {
                    value.as_str()
                };
                (name, value)
            }))
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl<'headers> IntoIterator for &'headers Headers {
    type Item = (&'headers String, &'headers String);
    type IntoIter = btree_map::Iter<'headers, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Headers {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
