use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fibre count attribute of a product page
///
/// Digits found in the selector text become `Count`; text without digits is
/// kept verbatim; a page without the attribute is `NotAvailable` ("NA").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FibreCount {
    Count(u64),
    Text(String),
    #[default]
    NotAvailable,
}

impl FibreCount {
    pub const NA: &'static str = "NA";

    pub fn is_available(&self) -> bool {
        !matches!(self, Self::NotAvailable)
    }
}

impl std::fmt::Display for FibreCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
            Self::NotAvailable => f.write_str(Self::NA),
        }
    }
}

impl Serialize for FibreCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count(n) => serializer.serialize_u64(*n),
            Self::Text(text) => serializer.serialize_str(text),
            Self::NotAvailable => serializer.serialize_str(Self::NA),
        }
    }
}

impl<'de> Deserialize<'de> for FibreCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Self::Count(n),
            Raw::Text(text) if text == Self::NA => Self::NotAvailable,
            Raw::Text(text) => Self::Text(text),
        })
    }
}

/// One scraped product page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub url: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub brand: Option<String>,
    pub fibre_count: FibreCount,
}

impl ProductRecord {
    /// Record for a page that could not be fetched or parsed
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
            price: None,
            brand: None,
            fibre_count: FibreCount::NotAvailable,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.brand.is_none() && !self.fibre_count.is_available()
    }
}

/// Records of one scrape request plus the derived price statistic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeBatch {
    pub records: Vec<ProductRecord>,
    pub average_price: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScrapeBatch {
    pub fn new(records: Vec<ProductRecord>, started_at: DateTime<Utc>) -> Self {
        let average_price = average_price(&records);
        Self {
            records,
            average_price,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn priced_count(&self) -> usize {
        self.records.iter().filter(|r| r.price.is_some()).count()
    }
}

/// Mean of the present prices; missing prices are skipped, not counted as zero
pub fn average_price(records: &[ProductRecord]) -> Option<f64> {
    let prices: Vec<f64> = records.iter().filter_map(|r| r.price).collect();
    if prices.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = prices.len() as f64;
    Some(prices.iter().sum::<f64>() / count)
}
