//! Structured qualification answers captured for a lead and the data score
//! derived from them.
//!
//! Every field is optional. Values that fail to parse (unknown enum strings,
//! non-numeric amounts, wrongly typed flags or text) are read as absent so
//! that scoring never fails on partially filled forms.

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::AppError;

/// Upper bound of the data score.
pub const DATA_SCORE_CAP: u32 = 60;

pub const BUDGET_RANGE_POINTS: u32 = 10;
pub const PAYMENT_METHOD_POINTS: u32 = 10;
pub const TRADE_IN_POINTS: u32 = 10;
pub const VEHICLE_USAGE_POINTS: u32 = 5;
pub const VEHICLE_INTEREST_POINTS: u32 = 5;
pub const FINANCING_DETAILS_POINTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Financing,
    Cash,
    Consortium,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PurchaseTimeline {
    #[serde(rename = "immediate")]
    Immediate,
    #[serde(rename = "within_30_days")]
    Within30Days,
    #[serde(rename = "3_to_6_months")]
    ThreeToSixMonths,
    #[serde(rename = "just_researching")]
    JustResearching,
}

impl PurchaseTimeline {
    /// Points awarded for how soon the lead intends to buy.
    pub fn points(self) -> u32 {
        match self {
            PurchaseTimeline::Immediate => 20,
            PurchaseTimeline::Within30Days => 15,
            PurchaseTimeline::ThreeToSixMonths => 5,
            PurchaseTimeline::JustResearching => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VehicleUsage {
    Work,
    LeisureFamily,
    Mixed,
}

/// Error returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! string_enum {
    ($ty:ty { $($variant:path => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($variant => $text),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($variant),)+
                    other => Err(UnknownVariant(other.to_string())),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(PaymentMethod {
    PaymentMethod::Financing => "financing",
    PaymentMethod::Cash => "cash",
    PaymentMethod::Consortium => "consortium",
    PaymentMethod::Other => "other",
});

string_enum!(PurchaseTimeline {
    PurchaseTimeline::Immediate => "immediate",
    PurchaseTimeline::Within30Days => "within_30_days",
    PurchaseTimeline::ThreeToSixMonths => "3_to_6_months",
    PurchaseTimeline::JustResearching => "just_researching",
});

string_enum!(VehicleUsage {
    VehicleUsage::Work => "work",
    VehicleUsage::LeisureFamily => "leisure_family",
    VehicleUsage::Mixed => "mixed",
});

/// Answers collected while qualifying a lead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct QualificationAnswers {
    #[serde(deserialize_with = "lenient_string")]
    #[schema(example = "Jeep Compass 2024")]
    pub vehicle_interest: Option<String>,
    #[serde(deserialize_with = "lenient_amount")]
    #[schema(value_type = Option<String>, example = "120000.00")]
    pub budget_min: Option<BigDecimal>,
    #[serde(deserialize_with = "lenient_amount")]
    #[schema(value_type = Option<String>, example = "150000.00")]
    pub budget_max: Option<BigDecimal>,
    #[serde(deserialize_with = "lenient_amount")]
    #[schema(value_type = Option<String>)]
    pub down_payment: Option<BigDecimal>,
    #[serde(deserialize_with = "lenient_amount")]
    #[schema(value_type = Option<String>)]
    pub max_installment: Option<BigDecimal>,
    #[serde(deserialize_with = "lenient_enum")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(deserialize_with = "lenient_bool")]
    pub has_trade_in: Option<bool>,
    #[serde(deserialize_with = "lenient_string")]
    pub trade_in_vehicle: Option<String>,
    #[serde(deserialize_with = "lenient_amount")]
    #[schema(value_type = Option<String>)]
    pub trade_in_value: Option<BigDecimal>,
    #[serde(deserialize_with = "lenient_enum")]
    pub purchase_timeline: Option<PurchaseTimeline>,
    #[serde(deserialize_with = "lenient_enum")]
    pub vehicle_usage: Option<VehicleUsage>,
    #[serde(deserialize_with = "lenient_string")]
    pub free_text_notes: Option<String>,
}

impl QualificationAnswers {
    /// Checks the data-model invariants: non-negative amounts and
    /// `budget_min <= budget_max` when both are present.
    ///
    /// Scoring does not require this; it is used to reject bad input at the
    /// HTTP boundary.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut problems = Vec::new();

        let amounts = [
            ("budgetMin", &self.budget_min),
            ("budgetMax", &self.budget_max),
            ("downPayment", &self.down_payment),
            ("maxInstallment", &self.max_installment),
            ("tradeInValue", &self.trade_in_value),
        ];
        for (name, amount) in amounts {
            if amount.as_ref().is_some_and(|a| !is_non_negative(a)) {
                problems.push(format!("{} must not be negative", name));
            }
        }

        if let (Some(min), Some(max)) = (&self.budget_min, &self.budget_max) {
            if min > max {
                problems.push("budgetMin must not exceed budgetMax".to_string());
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::BadRequest(problems.join("; ")))
        }
    }

    /// True when at least one budget bound is given and the range is well formed.
    pub fn has_budget_range(&self) -> bool {
        let bounds = [&self.budget_min, &self.budget_max];
        if bounds.iter().all(|b| b.is_none()) {
            return false;
        }
        if bounds
            .iter()
            .any(|b| b.as_ref().is_some_and(|a| !is_non_negative(a)))
        {
            return false;
        }
        match (&self.budget_min, &self.budget_max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }

    fn has_financing_details(&self) -> bool {
        [&self.down_payment, &self.max_installment]
            .iter()
            .any(|a| a.as_ref().is_some_and(is_non_negative))
    }

    fn has_vehicle_interest(&self) -> bool {
        self.vehicle_interest
            .as_deref()
            .is_some_and(|v| !v.trim().is_empty())
    }
}

/// Weighted sum over the populated, well-formed answers, capped at
/// [`DATA_SCORE_CAP`].
pub fn data_score(answers: &QualificationAnswers) -> u32 {
    let mut score = answers.purchase_timeline.map_or(0, PurchaseTimeline::points);

    if answers.has_budget_range() {
        score += BUDGET_RANGE_POINTS;
    }
    if answers.payment_method.is_some() {
        score += PAYMENT_METHOD_POINTS;
    }
    if answers.has_trade_in == Some(true) {
        score += TRADE_IN_POINTS;
    }
    if answers.vehicle_usage.is_some() {
        score += VEHICLE_USAGE_POINTS;
    }
    if answers.has_vehicle_interest() {
        score += VEHICLE_INTEREST_POINTS;
    }
    if answers.has_financing_details() {
        score += FINANCING_DETAILS_POINTS;
    }

    score.min(DATA_SCORE_CAP)
}

fn is_non_negative(amount: &BigDecimal) -> bool {
    *amount >= BigDecimal::zero()
}

fn lenient_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Number(n)) => BigDecimal::from_str(&n.to_string()).ok(),
        Some(serde_json::Value::String(s)) => BigDecimal::from_str(s.trim()).ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| v.as_bool()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Option<BigDecimal> {
        Some(BigDecimal::from_str(s).unwrap())
    }

    #[test]
    fn empty_answers_score_zero() {
        assert_eq!(data_score(&QualificationAnswers::default()), 0);
    }

    #[test]
    fn timeline_points() {
        let cases = [
            (PurchaseTimeline::Immediate, 20),
            (PurchaseTimeline::Within30Days, 15),
            (PurchaseTimeline::ThreeToSixMonths, 5),
            (PurchaseTimeline::JustResearching, 0),
        ];
        for (timeline, expected) in cases {
            let answers = QualificationAnswers {
                purchase_timeline: Some(timeline),
                ..Default::default()
            };
            assert_eq!(data_score(&answers), expected, "{:?}", timeline);
        }
    }

    #[test]
    fn inverted_budget_range_scores_nothing() {
        let answers = QualificationAnswers {
            budget_min: amount("200000"),
            budget_max: amount("100000"),
            ..Default::default()
        };
        assert!(!answers.has_budget_range());
        assert_eq!(data_score(&answers), 0);
        assert!(answers.validate().is_err());
    }

    #[test]
    fn single_budget_bound_counts() {
        let answers = QualificationAnswers {
            budget_max: amount("90000"),
            ..Default::default()
        };
        assert_eq!(data_score(&answers), BUDGET_RANGE_POINTS);
    }

    #[test]
    fn negative_amounts_are_ignored_and_rejected() {
        let answers = QualificationAnswers {
            down_payment: amount("-1"),
            ..Default::default()
        };
        assert_eq!(data_score(&answers), 0);
        let err = answers.validate().unwrap_err();
        assert_eq!(
            err,
            AppError::BadRequest("downPayment must not be negative".to_string())
        );
    }

    #[test]
    fn trade_in_declared_false_scores_nothing() {
        let answers = QualificationAnswers {
            has_trade_in: Some(false),
            ..Default::default()
        };
        assert_eq!(data_score(&answers), 0);
    }

    #[test]
    fn fully_populated_answers_hit_the_cap() {
        let answers = QualificationAnswers {
            vehicle_interest: Some("Toro Volcano".into()),
            budget_min: amount("100000"),
            budget_max: amount("140000"),
            down_payment: amount("30000"),
            max_installment: amount("2500"),
            payment_method: Some(PaymentMethod::Financing),
            has_trade_in: Some(true),
            trade_in_vehicle: Some("Strada 2019".into()),
            trade_in_value: amount("70000"),
            purchase_timeline: Some(PurchaseTimeline::Immediate),
            vehicle_usage: Some(VehicleUsage::Work),
            free_text_notes: Some("Prefere cor branca".into()),
        };
        assert_eq!(data_score(&answers), DATA_SCORE_CAP);
    }

    #[test]
    fn deserializes_wire_names() {
        let answers: QualificationAnswers = serde_json::from_value(serde_json::json!({
            "vehicleInterest": "Onix",
            "budgetMin": 50000,
            "budgetMax": "70000.50",
            "paymentMethod": "consortium",
            "hasTradeIn": true,
            "purchaseTimeline": "3_to_6_months",
            "vehicleUsage": "leisure_family"
        }))
        .unwrap();

        assert_eq!(answers.payment_method, Some(PaymentMethod::Consortium));
        assert_eq!(
            answers.purchase_timeline,
            Some(PurchaseTimeline::ThreeToSixMonths)
        );
        assert_eq!(answers.vehicle_usage, Some(VehicleUsage::LeisureFamily));
        assert_eq!(answers.budget_max, amount("70000.50"));
    }

    #[test]
    fn malformed_fields_read_as_absent() {
        let answers: QualificationAnswers = serde_json::from_value(serde_json::json!({
            "budgetMin": "muito",
            "paymentMethod": "pix",
            "purchaseTimeline": 7,
            "vehicleUsage": null
        }))
        .unwrap();

        assert_eq!(answers, QualificationAnswers::default());
    }

    #[test]
    fn wrongly_typed_flags_and_text_read_as_absent() {
        let answers: QualificationAnswers = serde_json::from_value(serde_json::json!({
            "hasTradeIn": "sim",
            "vehicleInterest": 2024,
            "tradeInVehicle": {"model": "Gol"},
            "freeTextNotes": ["ligar amanhã"],
            "purchaseTimeline": "immediate"
        }))
        .unwrap();

        assert_eq!(answers.has_trade_in, None);
        assert_eq!(answers.vehicle_interest, None);
        assert_eq!(answers.trade_in_vehicle, None);
        assert_eq!(answers.free_text_notes, None);
        assert_eq!(answers.purchase_timeline, Some(PurchaseTimeline::Immediate));
        assert_eq!(data_score(&answers), PurchaseTimeline::Immediate.points());
    }

    #[test]
    fn enum_parsing_is_case_insensitive() {
        assert_eq!(
            "Within_30_Days".parse::<PurchaseTimeline>(),
            Ok(PurchaseTimeline::Within30Days)
        );
        assert!("soon".parse::<PurchaseTimeline>().is_err());
        assert_eq!(VehicleUsage::LeisureFamily.to_string(), "leisure_family");
    }
}
