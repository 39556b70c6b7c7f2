use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use super::types::{Ingress, IngressSignificance};
use crate::ephemeris::CelestialBody;
use crate::zodiac::ZodiacSign;

/// Pre-authored description of a sign change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticTransit {
    pub body: CelestialBody,
    pub to_sign: ZodiacSign,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Editor's approximate date, shown only when no computed date exists
    #[serde(default)]
    pub date_hint: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitSource {
    Computed,
    Authored,
    Both,
}

/// A computed ingress, optionally carrying authored text, or authored text
/// with no computed counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedTransit {
    pub body: CelestialBody,
    pub to_sign: ZodiacSign,
    pub from_sign: Option<ZodiacSign>,
    pub timestamp: Option<DateTime<Utc>>,
    pub date_hint: Option<NaiveDate>,
    pub is_retrograde_reentry: bool,
    pub significance: IngressSignificance,
    pub title: Option<String>,
    pub description: Option<String>,
    pub source: TransitSource,
}

impl MergedTransit {
    fn computed(ingress: &Ingress) -> Self {
        Self {
            body: ingress.body,
            to_sign: ingress.to_sign,
            from_sign: Some(ingress.from_sign),
            timestamp: Some(ingress.exact_timestamp),
            date_hint: None,
            is_retrograde_reentry: ingress.is_retrograde_reentry,
            significance: ingress.significance,
            title: None,
            description: None,
            source: TransitSource::Computed,
        }
    }

    fn authored(transit: &StaticTransit) -> Self {
        Self {
            body: transit.body,
            to_sign: transit.to_sign,
            from_sign: None,
            timestamp: None,
            date_hint: transit.date_hint,
            is_retrograde_reentry: false,
            significance: IngressSignificance::for_body(transit.body),
            title: Some(transit.title.clone()),
            description: Some(transit.description.clone()),
            source: TransitSource::Authored,
        }
    }
}

/// Merge computed ingresses with authored content on `(body, to_sign)`.
///
/// The computed timestamp always wins and authored text is kept. When a
/// key has several computed ingresses, the text goes to the earliest
/// forward ingress, or to the earliest one if all are re-entries. Authored
/// entries with no match are appended undated, in authored order.
pub fn merge_transits(ingresses: &[Ingress], authored: &[StaticTransit]) -> Vec<MergedTransit> {
    let mut ordered: Vec<&Ingress> = ingresses.iter().collect();
    ordered.sort_by_key(|i| (i.exact_timestamp, i.body));

    // Ingress chosen to carry each key's text.
    let mut target: HashMap<(CelestialBody, ZodiacSign), usize> = HashMap::new();
    for (idx, ingress) in ordered.iter().enumerate() {
        let key = (ingress.body, ingress.to_sign);
        match target.get(&key) {
            None => {
                target.insert(key, idx);
            }
            Some(&current) => {
                if ordered[current].is_retrograde_reentry && !ingress.is_retrograde_reentry {
                    target.insert(key, idx);
                }
            }
        }
    }

    let mut merged: Vec<MergedTransit> = ordered
        .iter()
        .map(|ingress| MergedTransit::computed(ingress))
        .collect();
    let mut leftovers = Vec::new();
    let mut used = HashSet::new();

    for transit in authored {
        let key = (transit.body, transit.to_sign);
        match target.get(&key) {
            Some(&idx) if !used.contains(&key) => {
                used.insert(key);
                let entry = &mut merged[idx];
                entry.title = Some(transit.title.clone());
                entry.description = Some(transit.description.clone());
                entry.source = TransitSource::Both;
            }
            Some(_) => {
                warn!(
                    "Duplicate authored transit for {} into {}, keeping it undated",
                    transit.body, transit.to_sign
                );
                leftovers.push(MergedTransit::authored(transit));
            }
            None => leftovers.push(MergedTransit::authored(transit)),
        }
    }

    merged.extend(leftovers);
    merged
}
