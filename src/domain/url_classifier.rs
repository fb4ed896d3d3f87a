//! URL classification into named, non-exclusive buckets
//!
//! Matching is lower-cased substring search against declarative pattern
//! tables. A URL hitting any exclude pattern is dropped. Otherwise it is
//! appended to every bucket whose group matches, or to `other` when none
//! does. The input list is not deduplicated, so a repeated URL is repeated
//! in its buckets too.

use serde::{Deserialize, Serialize};

/// Named classification bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Products,
    Categories,
    Women,
    Men,
    Kids,
    Sale,
    Other,
}

impl Bucket {
    pub const ALL: [Self; 7] = [
        Self::Products,
        Self::Categories,
        Self::Women,
        Self::Men,
        Self::Kids,
        Self::Sale,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Women => "women",
            Self::Men => "men",
            Self::Kids => "kids",
            Self::Sale => "sale",
            Self::Other => "other",
        }
    }
}

/// Non-product pages, matched first
pub const EXCLUDE_PATTERNS: &[&str] = &[
    "/about",
    "/contact",
    "/help",
    "/faq",
    "/support",
    "/terms",
    "/privacy",
    "/policy",
    "/legal",
    "/blog",
    "/news",
    "/press",
    "/careers",
    "/jobs",
    "/store-locator",
    "/returns",
    "/shipping",
    "/cart",
    "/checkout",
    "/account",
    "/login",
    "/register",
    "/wishlist",
    "/gift-card",
];

/// Pattern groups, tested independently. A new bucket is a new row.
pub const PATTERN_GROUPS: &[(Bucket, &[&str])] = &[
    (
        Bucket::Products,
        &["/product", "/products", "/item", "/items", "/p/", "/shop/product", "/pd/", "/dp/", "/sku", "/style"],
    ),
    (
        Bucket::Categories,
        &["/category", "/categories", "/collection", "/collections", "/shop", "/catalog", "/browse"],
    ),
    (
        Bucket::Women,
        &["/women", "/womens", "/woman", "/ladies", "/her", "/female", "/w/"],
    ),
    (Bucket::Men, &["/men", "/mens", "/man", "/male", "/him", "/m/"]),
    (
        Bucket::Kids,
        &["/kids", "/children", "/child", "/baby", "/toddler", "/boys", "/girls", "/junior", "/youth"],
    ),
    (
        Bucket::Sale,
        &["/sale", "/clearance", "/outlet", "/deals", "/discount", "/promo", "/special", "/offer"],
    ),
];

/// Classification output, each bucket in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationBuckets {
    pub products: Vec<String>,
    pub categories: Vec<String>,
    pub women: Vec<String>,
    pub men: Vec<String>,
    pub kids: Vec<String>,
    pub sale: Vec<String>,
    pub other: Vec<String>,
}

impl ClassificationBuckets {
    pub fn get(&self, bucket: Bucket) -> &[String] {
        match bucket {
            Bucket::Products => &self.products,
            Bucket::Categories => &self.categories,
            Bucket::Women => &self.women,
            Bucket::Men => &self.men,
            Bucket::Kids => &self.kids,
            Bucket::Sale => &self.sale,
            Bucket::Other => &self.other,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<String> {
        match bucket {
            Bucket::Products => &mut self.products,
            Bucket::Categories => &mut self.categories,
            Bucket::Women => &mut self.women,
            Bucket::Men => &mut self.men,
            Bucket::Kids => &mut self.kids,
            Bucket::Sale => &mut self.sale,
            Bucket::Other => &mut self.other,
        }
    }

    /// Bucket name and size pairs, in `Bucket::ALL` order
    pub fn counts(&self) -> Vec<(&'static str, usize)> {
        Bucket::ALL
            .iter()
            .map(|bucket| (bucket.as_str(), self.get(*bucket).len()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        Bucket::ALL.iter().all(|bucket| self.get(*bucket).is_empty())
    }
}

pub fn is_excluded(url: &str) -> bool {
    let lower = url.to_lowercase();
    EXCLUDE_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

/// Sort URLs into buckets; pure and order-preserving
pub fn classify_urls<S: AsRef<str>>(urls: &[S]) -> ClassificationBuckets {
    let mut buckets = ClassificationBuckets::default();

    for url in urls {
        let url = url.as_ref();
        let lower = url.to_lowercase();

        if EXCLUDE_PATTERNS.iter().any(|pattern| lower.contains(pattern)) {
            continue;
        }

        let mut matched = false;
        for (bucket, patterns) in PATTERN_GROUPS {
            if patterns.iter().any(|pattern| lower.contains(pattern)) {
                buckets.get_mut(*bucket).push(url.to_string());
                matched = true;
            }
        }

        if !matched {
            buckets.other.push(url.to_string());
        }
    }

    buckets
}

/// Only the URLs classified as product pages
pub fn product_urls<S: AsRef<str>>(urls: &[S]) -> Vec<String> {
    classify_urls(urls).products
}

/// Case-insensitive substring include/exclude filter
pub fn filter_urls<S: AsRef<str>>(urls: &[S], include: Option<&str>, exclude: Option<&str>) -> Vec<String> {
    let include = include.map(str::to_lowercase);
    let exclude = exclude.map(str::to_lowercase);

    urls.iter()
        .map(AsRef::as_ref)
        .filter(|url| {
            let lower = url.to_lowercase();
            include.as_ref().is_none_or(|p| lower.contains(p.as_str()))
                && exclude.as_ref().is_none_or(|p| !lower.contains(p.as_str()))
        })
        .map(str::to_string)
        .collect()
}
