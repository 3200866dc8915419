//! Competitor ranking: the backend's raw vendor probabilities turned into a bounded,
//! ordered list of display percentages.

use crate::domain::prediction::{ContractSummary, VendorPrediction, VendorRecommendation};
use crate::format;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

pub const MAX_RANKED_VENDORS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedVendor {
    pub vendor: String,
    pub raw_probability: f64,
    /// Share of the retained subset, rounded. The list may sum to 100 ± a few.
    pub percent: u32,
    pub most_recent_contract: Option<ContractSummary>,
    pub most_relevant_contract: Option<ContractSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "vendors", rename_all = "snake_case")]
pub enum VendorRanking {
    NoRecommendations,
    Ranked(Vec<RankedVendor>),
}

impl VendorRanking {
    pub fn vendors(&self) -> &[RankedVendor] {
        match self {
            Self::NoRecommendations => &[],
            Self::Ranked(v) => v,
        }
    }
}

pub fn normalize(recommendations: &[VendorRecommendation]) -> VendorRanking {
    if recommendations.is_empty() {
        return VendorRanking::NoRecommendations;
    }

    let mut retained: Vec<(&VendorRecommendation, f64)> = recommendations
        .iter()
        .map(|r| (r, sanitize(r.probability)))
        .collect();
    // sort_by is stable, so equal probabilities keep their backend order.
    retained.sort_by(|a, b| b.1.total_cmp(&a.1));
    retained.truncate(MAX_RANKED_VENDORS);

    let sum: f64 = retained.iter().map(|(_, p)| p).sum();

    let ranked = retained
        .into_iter()
        .map(|(rec, p)| RankedVendor {
            vendor: rec.vendor.clone(),
            raw_probability: p,
            percent: if sum > 0.0 {
                (p / sum * 100.0).round() as u32
            } else {
                0
            },
            most_recent_contract: rec.most_recent_contract.clone(),
            most_relevant_contract: rec.most_relevant_contract.clone(),
        })
        .collect();

    VendorRanking::Ranked(ranked)
}

fn sanitize(p: f64) -> f64 {
    if p.is_finite() && p > 0.0 {
        p
    } else {
        0.0
    }
}

/// Where the contract-history columns of a competitor row come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HistoryMode {
    /// Use the most-recent-contract data the backend sent; `N/A` where it sent none.
    #[default]
    Reported,
    /// Deterministic placeholder history for demos.
    Simulated { seed: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorRow {
    pub vendor: String,
    pub win_probability: String,
    pub percent: u32,
    pub total_contracts_value: String,
    pub most_recent_contract_date: String,
}

pub fn competitor_rows(ranking: &VendorRanking, mode: HistoryMode) -> Vec<CompetitorRow> {
    let mut rng = match mode {
        HistoryMode::Simulated { seed } => Some(StdRng::seed_from_u64(seed)),
        HistoryMode::Reported => None,
    };

    ranking
        .vendors()
        .iter()
        .map(|v| {
            let (total_contracts_value, most_recent_contract_date) = match rng.as_mut() {
                Some(rng) => simulated_history(rng),
                None => reported_history(v.most_recent_contract.as_ref()),
            };
            CompetitorRow {
                vendor: v.vendor.clone(),
                win_probability: format!("{}%", v.percent),
                percent: v.percent,
                total_contracts_value,
                most_recent_contract_date,
            }
        })
        .collect()
}

fn reported_history(contract: Option<&ContractSummary>) -> (String, String) {
    let value = contract
        .and_then(|c| c.value)
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(format::currency_compact)
        .unwrap_or_else(|| format::NOT_AVAILABLE.to_string());
    let date = contract
        .and_then(|c| c.date.as_deref())
        .map(format::contract_date)
        .unwrap_or_else(|| format::NOT_AVAILABLE.to_string());
    (value, date)
}

fn simulated_history(rng: &mut StdRng) -> (String, String) {
    const MONTHS: [&str; 12] = [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ];
    let millions: u32 = rng.gen_range(5..=100);
    let month = MONTHS[rng.gen_range(0..MONTHS.len())];
    let year: u32 = rng.gen_range(2023..=2025);
    (format!("${millions}M"), format!("{month} {year}"))
}

/// Prime and MWBE rankings for the first vendor prediction in a competitor response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorRankings {
    pub prime: VendorRanking,
    pub mwbe: VendorRanking,
    pub prime_rows: Vec<CompetitorRow>,
    pub mwbe_rows: Vec<CompetitorRow>,
    /// Backend-supplied explanation when it could not rank vendors.
    pub error: Option<String>,
}

impl CompetitorRankings {
    pub fn from_prediction(prediction: &VendorPrediction, mode: HistoryMode) -> Self {
        let prime = normalize(&prediction.prime_vendor_recommendations);
        let mwbe = normalize(&prediction.mwbe_vendor_recommendations);
        Self {
            prime_rows: competitor_rows(&prime, mode),
            mwbe_rows: competitor_rows(&mwbe, mode),
            prime,
            mwbe,
            error: prediction.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(vendor: &str, probability: f64) -> VendorRecommendation {
        VendorRecommendation {
            vendor: vendor.to_string(),
            probability,
            ..Default::default()
        }
    }

    fn percents(ranking: &VendorRanking) -> Vec<(String, u32)> {
        ranking
            .vendors()
            .iter()
            .map(|v| (v.vendor.clone(), v.percent))
            .collect()
    }

    #[test]
    fn two_vendors_keep_their_proportions() {
        let ranking = normalize(&[rec("B", 20.0), rec("A", 80.0)]);
        assert_eq!(
            percents(&ranking),
            vec![("A".to_string(), 80), ("B".to_string(), 20)]
        );
    }

    #[test]
    fn empty_input_is_not_an_error() {
        assert_eq!(normalize(&[]), VendorRanking::NoRecommendations);
        assert!(normalize(&[]).vendors().is_empty());
    }

    #[test]
    fn all_zero_probabilities_give_zero_percent() {
        let ranking = normalize(&[rec("A", 0.0), rec("B", 0.0), rec("C", 0.0)]);
        assert!(ranking.vendors().iter().all(|v| v.percent == 0));
        assert_eq!(ranking.vendors().len(), 3);
    }

    #[test]
    fn single_positive_vendor_takes_everything() {
        let ranking = normalize(&[rec("Acme Services LLC", 0.12)]);
        assert_eq!(percents(&ranking), vec![("Acme Services LLC".to_string(), 100)]);
    }

    #[test]
    fn seven_vendors_are_cut_to_top_five_and_renormalized() {
        let input = [
            rec("F", 0.05),
            rec("A", 0.30),
            rec("G", 0.02),
            rec("C", 0.20),
            rec("B", 0.25),
            rec("E", 0.08),
            rec("D", 0.10),
        ];
        let ranking = normalize(&input);
        let vendors = ranking.vendors();

        assert_eq!(vendors.len(), MAX_RANKED_VENDORS);
        let names: Vec<_> = vendors.iter().map(|v| v.vendor.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
        assert!(vendors.windows(2).all(|w| w[0].percent >= w[1].percent));

        let total: u32 = vendors.iter().map(|v| v.percent).sum();
        assert!((96..=104).contains(&total), "total was {total}");
    }

    #[test]
    fn ties_keep_backend_order() {
        let ranking = normalize(&[rec("first", 0.5), rec("second", 0.5), rec("third", 0.5)]);
        let names: Vec<_> = ranking.vendors().iter().map(|v| v.vendor.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn negative_or_nan_probabilities_count_as_zero() {
        let ranking = normalize(&[rec("A", -1.0), rec("B", f64::NAN), rec("C", 2.0)]);
        assert_eq!(ranking.vendors()[0].vendor, "C");
        assert_eq!(ranking.vendors()[0].percent, 100);
        assert_eq!(ranking.vendors()[1].percent, 0);
    }

    #[test]
    fn reported_history_falls_back_to_na() {
        let mut with_contract = rec("A", 0.7);
        with_contract.most_recent_contract = Some(ContractSummary {
            value: Some(2_400_000.0),
            date: Some("2025-03-14".into()),
            ..Default::default()
        });
        let ranking = normalize(&[with_contract, rec("B", 0.3)]);

        let rows = competitor_rows(&ranking, HistoryMode::Reported);
        assert_eq!(rows[0].win_probability, "70%");
        assert_eq!(rows[0].total_contracts_value, "$2.4M");
        assert_eq!(rows[0].most_recent_contract_date, "March 2025");
        assert_eq!(rows[1].total_contracts_value, "N/A");
        assert_eq!(rows[1].most_recent_contract_date, "N/A");
    }

    #[test]
    fn simulated_history_is_deterministic_per_seed() {
        let ranking = normalize(&[rec("A", 0.6), rec("B", 0.4)]);
        let a = competitor_rows(&ranking, HistoryMode::Simulated { seed: 7 });
        let b = competitor_rows(&ranking, HistoryMode::Simulated { seed: 7 });
        assert_eq!(a, b);
        assert!(a.iter().all(|r| r.total_contracts_value.ends_with('M')));
        assert!(a.iter().all(|r| r.most_recent_contract_date != "N/A"));
    }
}
