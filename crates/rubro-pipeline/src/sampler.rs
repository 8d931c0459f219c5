//! Document sampling
//!
//! Chooses which issuer documents of an entity are sent to the model. All
//! policies are pure; randomness comes from the `Rng` passed in.

use crate::error::SamplingError;
use chrono::{Datelike, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use rubro_domain::Document;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const DATE_TAG: &str = "FchEmis:";
const DATE_LEN: usize = "YYYY-MM-DD".len();

/// Sampling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SamplingMethod {
    /// Uniform sample without replacement (`aleatorio`)
    #[default]
    Random,
    /// Newest documents first (`recientes`)
    MostRecent,
    /// Oldest documents first (`antiguos`)
    Oldest,
    /// One document per equal-width date bucket (`estratificado`)
    Stratified,
}

impl SamplingMethod {
    /// Canonical configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            SamplingMethod::Random => "aleatorio",
            SamplingMethod::MostRecent => "recientes",
            SamplingMethod::Oldest => "antiguos",
            SamplingMethod::Stratified => "estratificado",
        }
    }
}

impl fmt::Display for SamplingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SamplingMethod {
    type Err = SamplingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aleatorio" | "random" => Ok(SamplingMethod::Random),
            "recientes" | "most_recent" => Ok(SamplingMethod::MostRecent),
            "antiguos" | "oldest" => Ok(SamplingMethod::Oldest),
            "estratificado" | "stratified" => Ok(SamplingMethod::Stratified),
            other => Err(SamplingError::InvalidArgument(format!(
                "unknown sampling method '{}', use aleatorio, recientes, antiguos or estratificado",
                other
            ))),
        }
    }
}

impl TryFrom<String> for SamplingMethod {
    type Error = SamplingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SamplingMethod> for String {
    fn from(method: SamplingMethod) -> Self {
        method.as_str().to_string()
    }
}

/// Emission date embedded as `FchEmis:YYYY-MM-DD`, if any
///
/// The first tag followed by a valid calendar date wins.
pub fn emission_date(text: &str) -> Option<NaiveDate> {
    text.match_indices(DATE_TAG).find_map(|(at, _)| {
        let start = at + DATE_TAG.len();
        let candidate = text.get(start..start + DATE_LEN)?;
        let shaped = candidate.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
        if !shaped {
            return None;
        }
        NaiveDate::parse_from_str(candidate, "%Y-%m-%d").ok()
    })
}

/// Select at most `n` documents according to `method`
///
/// When there are `n` or fewer documents they are all returned unchanged.
/// Date-ordered policies ignore undated documents and return nothing when no
/// document is dated; `Random` falls back to the full set in that case.
pub fn sample<R: Rng + ?Sized>(
    documents: &[Document],
    n: usize,
    method: SamplingMethod,
    rng: &mut R,
) -> Vec<Document> {
    if documents.len() <= n {
        return documents.to_vec();
    }

    let dated: Vec<(&Document, NaiveDate)> = documents
        .iter()
        .filter_map(|doc| emission_date(&doc.text).map(|date| (doc, date)))
        .collect();

    match method {
        SamplingMethod::Random if dated.is_empty() => {
            documents.choose_multiple(rng, n).cloned().collect()
        }
        SamplingMethod::Random => dated
            .choose_multiple(rng, n.min(dated.len()))
            .map(|(doc, _)| (*doc).clone())
            .collect(),
        SamplingMethod::MostRecent => {
            let mut ordered = dated;
            ordered.sort_by(|a, b| b.1.cmp(&a.1));
            ordered.into_iter().take(n).map(|(doc, _)| doc.clone()).collect()
        }
        SamplingMethod::Oldest => {
            let mut ordered = dated;
            ordered.sort_by(|a, b| a.1.cmp(&b.1));
            ordered.into_iter().take(n).map(|(doc, _)| doc.clone()).collect()
        }
        SamplingMethod::Stratified => stratified(&dated, n, rng),
    }
}

/// One random document per non-empty bucket, buckets in date order
fn stratified<R: Rng + ?Sized>(
    dated: &[(&Document, NaiveDate)],
    n: usize,
    rng: &mut R,
) -> Vec<Document> {
    if n == 0 || dated.is_empty() {
        return Vec::new();
    }
    let day = |date: &NaiveDate| i128::from(date.num_days_from_ce());
    let min = dated.iter().map(|(_, d)| day(d)).min().unwrap_or_default();
    let max = dated.iter().map(|(_, d)| day(d)).max().unwrap_or_default();
    let span = max - min;
    let buckets = n as i128;

    let mut strata: BTreeMap<usize, Vec<&Document>> = BTreeMap::new();
    for (doc, date) in dated {
        strata
            .entry(bucket_index(day(date) - min, span, buckets))
            .or_default()
            .push(*doc);
    }

    strata
        .values()
        .filter_map(|members| members.choose(rng).map(|doc| (*doc).clone()))
        .collect()
}

/// Bucket of a date `offset` days after the earliest one
///
/// Buckets are right-closed: a date on an interior edge belongs to the lower
/// bucket, and the earliest date belongs to the first.
fn bucket_index(offset: i128, span: i128, buckets: i128) -> usize {
    if span == 0 || offset == 0 {
        return 0;
    }
    let upper = (offset * buckets + span - 1) / span;
    (upper - 1).clamp(0, buckets - 1) as usize
}
