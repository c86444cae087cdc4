//! Heuristic readers over raw completion text.
//!
//! Every extractor is total: when nothing usable is found it returns a fixed
//! default. Financing ROI and the cash-flow figures are sampled placeholders,
//! not derived from the deal or the text.

use crate::types::{
    AlternativeStructure, AnalysisResult, CashFlowEstimate, Complexity, FinancingOption,
    RiskLevel, RiskProfile,
};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

pub const DEFAULT_RECOMMENDATION: &str = "Analysis complete";

/// Strategies recognized by name, in output order.
pub const FINANCING_CATALOG: [&str; 5] = [
    "Seller Financing",
    "Lease Option",
    "Subject-to",
    "Wraparound",
    "Private Money",
];

pub const TRADITIONAL_FINANCING: &str = "Traditional Financing";

static RE_RECOMMENDATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)recommendation[\s:]+([^.]+)").expect("valid regex"));

/// Text after the first "recommendation:" up to the next period.
pub fn recommendation(text: &str) -> String {
    RE_RECOMMENDATION
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| DEFAULT_RECOMMENDATION.to_string())
}

/// One option per catalog name mentioned anywhere in `text`, or a single traditional fallback.
pub fn financing_options<R: Rng>(text: &str, rng: &mut R) -> Vec<FinancingOption> {
    let haystack = text.to_lowercase();

    let options: Vec<FinancingOption> = FINANCING_CATALOG
        .iter()
        .filter(|name| haystack.contains(&name.to_lowercase()))
        .map(|name| FinancingOption {
            kind: name.to_string(),
            description: format!("AI-recommended {name} strategy"),
            pros: strings(&["Lower down payment", "Flexible terms", "Creative solution"]),
            cons: strings(&["May require negotiation", "Legal complexity"]),
            estimated_roi: rng.gen_range(12.0..20.0),
            complexity: Complexity::Medium,
            requirements: strings(&["Good credit", "Property analysis", "Legal review"]),
        })
        .collect();

    if !options.is_empty() {
        return options;
    }

    vec![traditional_financing(rng)]
}

fn traditional_financing<R: Rng>(rng: &mut R) -> FinancingOption {
    FinancingOption {
        kind: TRADITIONAL_FINANCING.to_string(),
        description: "Standard bank financing approach".to_string(),
        pros: strings(&["Predictable terms", "Lower rates", "Established process"]),
        cons: strings(&["Higher down payment", "Strict requirements"]),
        estimated_roi: rng.gen_range(8.0..12.0),
        complexity: Complexity::Low,
        requirements: strings(&["Good credit score", "20% down payment", "Income verification"]),
    }
}

/// Placeholder profile; the text is not consulted.
pub fn risk_profile(_text: &str) -> RiskProfile {
    RiskProfile {
        overall_risk: RiskLevel::Medium,
        market_risk: "Market conditions appear stable for this property type".to_string(),
        financing_risk: "Standard financing available with good terms".to_string(),
        operational_risk: "Property management considerations apply".to_string(),
        mitigation_strategies: strings(&[
            "Diversify investment portfolio",
            "Maintain adequate reserves",
            "Regular property inspections",
            "Professional property management",
        ]),
    }
}

/// Placeholder figures, each drawn independently from its band.
pub fn cash_flow<R: Rng>(_text: &str, rng: &mut R) -> CashFlowEstimate {
    CashFlowEstimate {
        monthly_cash_flow: rng.gen_range(500.0..1500.0),
        annual_cash_flow: rng.gen_range(6000.0..18000.0),
        five_year_projection: rng.gen_range(30000.0..90000.0),
        break_even_months: rng.gen_range(12.0..36.0),
        cash_on_cash_return: rng.gen_range(8.0..20.0),
    }
}

pub fn alternative_structures(_text: &str) -> Vec<AlternativeStructure> {
    vec![
        AlternativeStructure {
            name: "Partnership Structure".to_string(),
            description: "Joint venture with experienced investor".to_string(),
            structure: "50/50 partnership with shared responsibilities".to_string(),
            benefits: strings(&["Shared risk", "Access to expertise", "Larger deals"]),
            considerations: strings(&["Shared profits", "Decision making", "Exit strategy"]),
        },
        AlternativeStructure {
            name: "Syndication".to_string(),
            description: "Pool multiple investors for larger deals".to_string(),
            structure: "GP/LP structure with management fees".to_string(),
            benefits: strings(&[
                "Access to larger deals",
                "Diversified risk",
                "Professional management",
            ]),
            considerations: strings(&[
                "Regulatory compliance",
                "Management fees",
                "Investor relations",
            ]),
        },
    ]
}

pub fn next_steps(_text: &str) -> Vec<String> {
    strings(&[
        "Conduct thorough property inspection",
        "Review comparable sales in the area",
        "Negotiate purchase terms",
        "Secure financing pre-approval",
        "Consult with real estate attorney",
        "Develop property management plan",
        "Create exit strategy timeline",
    ])
}

/// Run every extractor over the same text.
pub fn analysis<R: Rng>(text: &str, rng: &mut R) -> AnalysisResult {
    AnalysisResult {
        recommendation: recommendation(text),
        creative_financing_options: financing_options(text, rng),
        risk_analysis: risk_profile(text),
        cash_flow_projection: cash_flow(text, rng),
        alternative_structures: alternative_structures(text),
        next_steps: next_steps(text),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
