/// Scenario tests for lead scoring
/// Covers the data score, engagement detection and classification end to end
use bigdecimal::BigDecimal;
use dealer_crm_core::engagement::{EngagementSignal, KeywordSignalDetector};
use dealer_crm_core::qualification::{
    PaymentMethod, PurchaseTimeline, QualificationAnswers, VehicleUsage, DATA_SCORE_CAP,
    PAYMENT_METHOD_POINTS, TRADE_IN_POINTS,
};
use dealer_crm_core::scoring::{
    Classification, LeadScorer, ScoringThresholds, CLICKED_LINK_POINTS, HUMAN_CONTACT_POINTS,
};

fn lines(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_empty_input_is_cold_zero() {
        let score = LeadScorer::default().score(&QualificationAnswers::default(), &[]);

        assert_eq!(score.breakdown.data_score, 0);
        assert_eq!(score.breakdown.engagement_score, 0);
        assert_eq!(score.breakdown.total, 0);
        assert!(score.breakdown.signals.is_empty());
        assert_eq!(score.classification, Classification::Cold);
    }

    #[test]
    fn test_immediate_financing_trade_in_with_human_request() {
        let answers = QualificationAnswers {
            purchase_timeline: Some(PurchaseTimeline::Immediate),
            payment_method: Some(PaymentMethod::Financing),
            has_trade_in: Some(true),
            ..Default::default()
        };
        let transcript = lines(&["quero falar com vendedor"]);

        let score = LeadScorer::default().score(&answers, &transcript);

        assert_eq!(
            score.breakdown.data_score,
            20 + PAYMENT_METHOD_POINTS + TRADE_IN_POINTS
        );
        assert_eq!(score.breakdown.human_contact_lines, 1);
        assert_eq!(score.breakdown.clicked_link_lines, 0);
        assert_eq!(score.breakdown.engagement_score, HUMAN_CONTACT_POINTS);
        assert_eq!(score.breakdown.total, 60);
        assert_eq!(score.classification, Classification::Hot);
    }

    #[test]
    fn test_same_scenario_under_stricter_thresholds() {
        let answers = QualificationAnswers {
            purchase_timeline: Some(PurchaseTimeline::Immediate),
            payment_method: Some(PaymentMethod::Financing),
            has_trade_in: Some(true),
            ..Default::default()
        };
        let transcript = lines(&["quero falar com vendedor"]);
        let scorer = LeadScorer::new(ScoringThresholds::new(80, 50).unwrap());

        let score = scorer.score(&answers, &transcript);

        assert_eq!(score.breakdown.total, 60);
        assert_eq!(score.classification, Classification::Warm);
    }

    #[test]
    fn test_total_is_sum_of_parts() {
        let answers = QualificationAnswers {
            purchase_timeline: Some(PurchaseTimeline::Within30Days),
            vehicle_usage: Some(VehicleUsage::Mixed),
            ..Default::default()
        };
        let transcript = lines(&["cliquei no link", "abri o link de novo", "ok"]);

        let score = LeadScorer::default().score(&answers, &transcript);

        assert_eq!(score.breakdown.data_score, 20);
        assert_eq!(score.breakdown.engagement_score, 2 * CLICKED_LINK_POINTS);
        assert_eq!(
            score.breakdown.total,
            score.breakdown.data_score + score.breakdown.engagement_score
        );
        assert_eq!(score.classification, Classification::Warm);
    }
}

#[cfg(test)]
mod engagement_tests {
    use super::*;

    #[test]
    fn test_overlapping_line_counts_only_as_human_contact() {
        let transcript = lines(&["cliquei no link e quero falar com um atendente"]);

        let score = LeadScorer::default().score(&QualificationAnswers::default(), &transcript);

        assert_eq!(score.breakdown.human_contact_lines, 1);
        assert_eq!(score.breakdown.clicked_link_lines, 0);
        assert_eq!(
            score.breakdown.signals,
            vec![EngagementSignal::RequestedHumanContact]
        );
    }

    #[test]
    fn test_each_line_scored_once() {
        let transcript = lines(&[
            "Cliquei no link",
            "CLIQUEI NO LINK",
            "me liga por favor",
            "",
            "qual a cor?",
        ]);

        let score = LeadScorer::default().score(&QualificationAnswers::default(), &transcript);

        assert_eq!(score.breakdown.clicked_link_lines, 2);
        assert_eq!(score.breakdown.human_contact_lines, 1);
        assert_eq!(
            score.breakdown.engagement_score,
            2 * CLICKED_LINK_POINTS + HUMAN_CONTACT_POINTS
        );
    }

    #[test]
    fn test_custom_phrase_lists() {
        let detector = KeywordSignalDetector::from_phrases(
            &["chama no zap"],
            &["vi a proposta"],
        )
        .unwrap();
        let scorer = LeadScorer::with_detector(ScoringThresholds::default(), Box::new(detector));
        let transcript = lines(&["Vi a proposta", "chama no zap", "quero falar com vendedor"]);

        let score = scorer.score(&QualificationAnswers::default(), &transcript);

        assert_eq!(score.breakdown.clicked_link_lines, 1);
        assert_eq!(score.breakdown.human_contact_lines, 1);
    }
}

#[cfg(test)]
mod data_score_tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_data_score_is_capped() {
        let answers = QualificationAnswers {
            vehicle_interest: Some("Hilux SRX".to_string()),
            budget_min: Some(BigDecimal::from(250_000u32)),
            budget_max: Some(BigDecimal::from(320_000u32)),
            down_payment: Some(BigDecimal::from_str("80000.00").unwrap()),
            max_installment: None,
            payment_method: Some(PaymentMethod::Cash),
            has_trade_in: Some(true),
            trade_in_vehicle: Some("SW4 2018".to_string()),
            trade_in_value: Some(BigDecimal::from(180_000u32)),
            purchase_timeline: Some(PurchaseTimeline::Immediate),
            vehicle_usage: Some(VehicleUsage::Work),
            free_text_notes: None,
        };

        let score = LeadScorer::default().score(&answers, &[]);

        assert_eq!(score.breakdown.data_score, DATA_SCORE_CAP);
        assert_eq!(score.classification, Classification::Hot);
    }

    #[test]
    fn test_researching_lead_with_only_notes_is_cold() {
        let answers = QualificationAnswers {
            purchase_timeline: Some(PurchaseTimeline::JustResearching),
            free_text_notes: Some("só olhando".to_string()),
            ..Default::default()
        };

        let score = LeadScorer::default().score(&answers, &[]);

        assert_eq!(score.breakdown.total, 0);
        assert_eq!(score.classification, Classification::Cold);
    }

    #[test]
    fn test_score_serializes_camel_case() {
        let score = LeadScorer::default().score(
            &QualificationAnswers::default(),
            &lines(&["cliquei no link"]),
        );
        let json = serde_json::to_value(&score).unwrap();

        assert_eq!(json["breakdown"]["engagementScore"], 10);
        assert_eq!(json["breakdown"]["signals"][0], "clicked_link");
        assert_eq!(json["classification"], "cold");
    }
}
