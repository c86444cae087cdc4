use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Low / medium / high, used for the investor's risk tolerance and the overall deal risk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// How hard a financing strategy is to put together.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Low => write!(f, "low"),
            Complexity::Medium => write!(f, "medium"),
            Complexity::High => write!(f, "high"),
        }
    }
}

/// Caller-supplied deal inputs. Passed to the prompt verbatim, never validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DealParameters {
    pub property_value: Decimal,
    pub down_payment: Decimal,
    /// Annual rate in percent (6.5 means 6.5%)
    pub interest_rate: Decimal,
    /// Years
    pub loan_term: u32,
    pub monthly_rent: Decimal,
    pub property_type: String,
    pub location: String,
    #[serde(default)]
    pub user_goals: Vec<String>,
    pub risk_tolerance: RiskLevel,
    /// Years
    pub investment_horizon: u32,
}

/// Full analysis of one deal. Each field is extracted on its own; they need not agree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub recommendation: String,
    pub creative_financing_options: Vec<FinancingOption>,
    pub risk_analysis: RiskProfile,
    pub cash_flow_projection: CashFlowEstimate,
    pub alternative_structures: Vec<AlternativeStructure>,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancingOption {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    /// Percent
    #[serde(rename = "estimatedROI")]
    pub estimated_roi: f64,
    pub complexity: Complexity,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub overall_risk: RiskLevel,
    pub market_risk: String,
    pub financing_risk: String,
    pub operational_risk: String,
    #[serde(default)]
    pub mitigation_strategies: Vec<String>,
}

/// Dollar figures except `break_even_months` and `cash_on_cash_return` (percent).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowEstimate {
    pub monthly_cash_flow: f64,
    pub annual_cash_flow: f64,
    pub five_year_projection: f64,
    pub break_even_months: f64,
    pub cash_on_cash_return: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeStructure {
    pub name: String,
    pub description: String,
    pub structure: String,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub considerations: Vec<String>,
}
