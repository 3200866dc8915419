//! Sigma-banded distribution charts drawn around a single predicted value.
//!
//! The curve shape is a fixed template per chart kind; only the axis labels depend on
//! the prediction. Without a usable prediction the chart is a placeholder, never a
//! curve centred on zero.

use crate::format;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Contract size spread as a fraction of the predicted value.
pub const SIZE_SIGMA_RATIO: f64 = 0.30;
/// Standard deviation of the timing model's historical errors, in days.
pub const TIMING_SIGMA_DAYS: f64 = 33.66;

const X_STEP: f64 = 0.5;
const X_MIN: f64 = -3.0;

const SIZE_TEMPLATE: [f64; 13] = [
    0.003, 0.015, 0.045, 0.120, 0.235, 0.340, 0.385, 0.340, 0.235, 0.120, 0.045, 0.015, 0.003,
];
const TIMING_TEMPLATE: [f64; 13] = [
    0.001, 0.004, 0.011, 0.030, 0.070, 0.130, 0.200, 0.130, 0.070, 0.030, 0.011, 0.004, 0.001,
];

const COVERAGE: [(u8, f64); 3] = [(1, 68.3), (2, 95.4), (3, 99.7)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    ContractSize,
    Timing,
}

impl ChartKind {
    fn template(self) -> &'static [f64; 13] {
        match self {
            Self::ContractSize => &SIZE_TEMPLATE,
            Self::Timing => &TIMING_TEMPLATE,
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Self::ContractSize => "Enter a Plan ID to view contract size distribution",
            Self::Timing => "Enter a Plan ID to view procurement timing distribution",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

/// The 13 template points of a chart kind, x from -3 to 3 in half-sigma steps.
pub fn curve(kind: ChartKind) -> impl Iterator<Item = CurvePoint> + Clone {
    kind.template()
        .iter()
        .enumerate()
        .map(|(i, &y)| CurvePoint {
            x: X_MIN + i as f64 * X_STEP,
            y,
        })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLabel {
    /// Whole sigmas from the mean, -3..=3.
    pub sigma: i32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageBand {
    pub sigmas: u8,
    pub percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub kind: ChartKind,
    pub mean_label: String,
    pub sigma_label: String,
    pub labels: Vec<AxisLabel>,
    pub points: Vec<CurvePoint>,
    pub coverage: Vec<CoverageBand>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DistributionChart {
    Placeholder { message: String },
    Chart(Distribution),
}

impl DistributionChart {
    pub fn placeholder(kind: ChartKind) -> Self {
        Self::Placeholder {
            message: kind.placeholder().to_string(),
        }
    }

    pub fn chart(&self) -> Option<&Distribution> {
        match self {
            Self::Chart(d) => Some(d),
            Self::Placeholder { .. } => None,
        }
    }
}

/// Raw label values for a size chart: `max(0, μ + iσ)` for i in -3..=3.
pub fn size_label_values(mu: f64) -> [f64; 7] {
    let sigma = mu * SIZE_SIGMA_RATIO;
    let mut out = [0.0; 7];
    for (slot, i) in out.iter_mut().zip(-3..=3) {
        *slot = (mu + f64::from(i) * sigma).max(0.0);
    }
    out
}

pub fn size_distribution(predicted_size: Option<f64>) -> DistributionChart {
    let Some(mu) = predicted_size.filter(|v| v.is_finite() && *v > 0.0) else {
        return DistributionChart::placeholder(ChartKind::ContractSize);
    };

    let labels = size_label_values(mu)
        .iter()
        .zip(-3..=3)
        .map(|(&v, sigma)| AxisLabel {
            sigma,
            text: format::currency_compact(v),
        })
        .collect();

    DistributionChart::Chart(Distribution {
        kind: ChartKind::ContractSize,
        mean_label: format::currency_compact(mu),
        sigma_label: format::currency_compact(mu * SIZE_SIGMA_RATIO),
        labels,
        points: curve(ChartKind::ContractSize).collect(),
        coverage: COVERAGE
            .iter()
            .map(|&(sigmas, percent)| CoverageBand {
                sigmas,
                percent,
                days: None,
            })
            .collect(),
    })
}

/// Day offset of the label `sigma` steps away from the predicted date.
pub fn timing_offset_days(sigma: i32) -> i64 {
    (f64::from(sigma) * TIMING_SIGMA_DAYS).round() as i64
}

pub fn timing_distribution(predicted_date: Option<NaiveDate>) -> DistributionChart {
    let Some(date) = predicted_date else {
        return DistributionChart::placeholder(ChartKind::Timing);
    };

    let labels = (-3..=3)
        .map(|sigma| AxisLabel {
            sigma,
            text: date
                .checked_add_signed(Duration::days(timing_offset_days(sigma)))
                .map(format::month_year)
                .unwrap_or_else(|| format::NOT_AVAILABLE.to_string()),
        })
        .collect();

    DistributionChart::Chart(Distribution {
        kind: ChartKind::Timing,
        mean_label: format::month_year(date),
        sigma_label: format!("{TIMING_SIGMA_DAYS:.2} days"),
        labels,
        points: curve(ChartKind::Timing).collect(),
        coverage: COVERAGE
            .iter()
            .map(|&(sigmas, percent)| CoverageBand {
                sigmas,
                percent,
                days: Some((f64::from(sigmas) * TIMING_SIGMA_DAYS * 100.0).round() / 100.0),
            })
            .collect(),
    })
}
