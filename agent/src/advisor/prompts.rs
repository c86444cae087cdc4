use crate::analyzer::gemini::GenerationConfig;
use crate::types::DealParameters;
use rust_decimal::Decimal;
use std::fmt;

/// Which question we are asking the model about a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    FullAnalysis,
    FinancingOptions,
    StructuringAdvice,
}

/// Whether the prompt asks for a JSON answer on top of the prose one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Prose,
    Json,
}

impl Task {
    pub fn generation_config(self) -> GenerationConfig {
        let (temperature, max_output_tokens) = match self {
            Task::FullAnalysis => (0.7, 2048),
            Task::FinancingOptions => (0.8, 1024),
            Task::StructuringAdvice => (0.6, 1024),
        };
        GenerationConfig {
            temperature,
            top_k: Some(40),
            top_p: Some(0.95),
            max_output_tokens,
        }
    }

    /// What the caller was waiting for, as used in "Failed to parse ..." messages.
    pub fn result_label(self) -> &'static str {
        match self {
            Task::FullAnalysis => "AI response",
            Task::FinancingOptions => "financing options",
            Task::StructuringAdvice => "structuring advice",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::FullAnalysis => write!(f, "ANALYSIS"),
            Task::FinancingOptions => write!(f, "FINANCING"),
            Task::StructuringAdvice => write!(f, "STRUCTURING"),
        }
    }
}

const ANALYSIS_JSON_SHAPE: &str = r#"{"recommendation": "...", "creativeFinancingOptions": [{"type": "...", "description": "...", "pros": ["..."], "cons": ["..."], "estimatedROI": 0.0, "complexity": "low|medium|high", "requirements": ["..."]}], "riskAnalysis": {"overallRisk": "low|medium|high", "marketRisk": "...", "financingRisk": "...", "operationalRisk": "...", "mitigationStrategies": ["..."]}, "cashFlowProjection": {"monthlyCashFlow": 0.0, "annualCashFlow": 0.0, "fiveYearProjection": 0.0, "breakEvenMonths": 0.0, "cashOnCashReturn": 0.0}, "alternativeStructures": [{"name": "...", "description": "...", "structure": "...", "benefits": ["..."], "considerations": ["..."]}], "nextSteps": ["..."]}"#;

const FINANCING_JSON_SHAPE: &str = r#"[{"type": "...", "description": "...", "pros": ["..."], "cons": ["..."], "estimatedROI": 0.0, "complexity": "low|medium|high", "requirements": ["..."]}]"#;

/// Render the prompt for `task`. Pure: same inputs, same string.
pub fn build(deal: &DealParameters, task: Task, format: OutputFormat) -> String {
    match task {
        Task::FullAnalysis => analysis_prompt(deal, format),
        Task::FinancingOptions => financing_prompt(deal, format),
        Task::StructuringAdvice => structuring_prompt(deal, format),
    }
}

fn analysis_prompt(deal: &DealParameters, format: OutputFormat) -> String {
    let closing = match format {
        OutputFormat::Prose => {
            "Format your response as a structured analysis that can be parsed into JSON format.".to_string()
        }
        OutputFormat::Json => format!(
            "Start with one line of the form \"Recommendation: <buy, pass, or negotiate> <short reason>.\"\n\
            Then give your full analysis as a single JSON object with exactly these keys:\n\
            {ANALYSIS_JSON_SHAPE}\n\
            Do NOT wrap the JSON in markdown code blocks."
        ),
    };

    format!(
        "You are an expert real estate investment advisor specializing in creative financing strategies. \
        Analyze the following deal and provide comprehensive recommendations.\n\
        \n\
        DEAL PARAMETERS:\n\
        - Property Value: ${value}\n\
        - Down Payment: ${down}\n\
        - Interest Rate: {rate}%\n\
        - Loan Term: {term} years\n\
        - Monthly Rent: ${rent}\n\
        - Property Type: {kind}\n\
        - Location: {location}\n\
        - User Goals: {goals}\n\
        - Risk Tolerance: {risk}\n\
        - Investment Horizon: {horizon} years\n\
        \n\
        Please provide a comprehensive analysis including:\n\
        1. Overall recommendation (buy, pass, or negotiate)\n\
        2. Creative financing options (seller financing, lease options, subject-to, etc.)\n\
        3. Risk analysis with mitigation strategies\n\
        4. Cash flow projections\n\
        5. Alternative deal structures\n\
        6. Specific next steps\n\
        \n\
        {closing}",
        value = currency(deal.property_value),
        down = currency(deal.down_payment),
        rate = deal.interest_rate.normalize(),
        term = deal.loan_term,
        rent = currency(deal.monthly_rent),
        kind = deal.property_type,
        location = deal.location,
        goals = deal.user_goals.join(", "),
        risk = deal.risk_tolerance,
        horizon = deal.investment_horizon,
    )
}

fn financing_prompt(deal: &DealParameters, format: OutputFormat) -> String {
    let closing = match format {
        OutputFormat::Prose => String::new(),
        OutputFormat::Json => format!(
            "\n\nAnswer with a JSON array, one element per strategy, naming the strategy in \"type\":\n\
            {FINANCING_JSON_SHAPE}\n\
            Do NOT wrap the JSON in markdown code blocks."
        ),
    };

    format!(
        "As a creative financing expert, suggest innovative financing options for this real estate deal:\n\
        \n\
        Property: ${value} {kind} in {location}\n\
        Down Payment Available: ${down}\n\
        Monthly Rent Potential: ${rent}\n\
        Risk Tolerance: {risk}\n\
        \n\
        Suggest 3-5 creative financing strategies including:\n\
        - Seller financing\n\
        - Lease options\n\
        - Subject-to financing\n\
        - Wraparound mortgages\n\
        - Private money lending\n\
        - Partnerships/JVs\n\
        \n\
        For each option, include pros, cons, estimated ROI, complexity level, and requirements.{closing}",
        value = currency(deal.property_value),
        kind = deal.property_type,
        location = deal.location,
        down = currency(deal.down_payment),
        rent = currency(deal.monthly_rent),
        risk = deal.risk_tolerance,
    )
}

fn structuring_prompt(deal: &DealParameters, format: OutputFormat) -> String {
    let closing = match format {
        OutputFormat::Prose => "",
        OutputFormat::Json => {
            "\n\nAnswer with a JSON array of strings, one step per element, in the order to carry them out. \
            Do NOT wrap the JSON in markdown code blocks."
        }
    };

    format!(
        "Provide specific deal structuring advice for this real estate investment:\n\
        \n\
        Property: ${value} {kind}\n\
        Location: {location}\n\
        Goals: {goals}\n\
        Risk Tolerance: {risk}\n\
        \n\
        Give 5-7 specific, actionable steps for structuring this deal optimally, including:\n\
        - Negotiation strategies\n\
        - Financing arrangements\n\
        - Legal considerations\n\
        - Tax implications\n\
        - Exit strategies{closing}",
        value = currency(deal.property_value),
        kind = deal.property_type,
        location = deal.location,
        goals = deal.user_goals.join(", "),
        risk = deal.risk_tolerance,
    )
}

/// Thousands-grouped amount, at most three decimals, trailing zeros dropped: 250000.50 -> "250,000.5".
pub fn currency(amount: Decimal) -> String {
    let text = amount.round_dp(3).normalize().to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskLevel;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn deal() -> DealParameters {
        DealParameters {
            property_value: dec!(350000),
            down_payment: dec!(70000),
            interest_rate: dec!(6.50),
            loan_term: 30,
            monthly_rent: dec!(2800),
            property_type: "Duplex".into(),
            location: "Columbus, OH".into(),
            user_goals: vec!["cash flow".into(), "equity growth".into()],
            risk_tolerance: RiskLevel::High,
            investment_horizon: 7,
        }
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(currency(dec!(0)), "0");
        assert_eq!(currency(dec!(950)), "950");
        assert_eq!(currency(dec!(1000)), "1,000");
        assert_eq!(currency(dec!(250000)), "250,000");
        assert_eq!(currency(dec!(1234567.50)), "1,234,567.5");
        assert_eq!(currency(dec!(12.34567)), "12.346");
    }

    #[test]
    fn prompts_are_deterministic() {
        for task in [Task::FullAnalysis, Task::FinancingOptions, Task::StructuringAdvice] {
            for format in [OutputFormat::Prose, OutputFormat::Json] {
                assert_eq!(build(&deal(), task, format), build(&deal(), task, format));
            }
        }
    }

    #[test]
    fn analysis_prompt_interpolates_every_field() {
        let p = build(&deal(), Task::FullAnalysis, OutputFormat::Prose);
        assert!(p.contains("- Property Value: $350,000\n"));
        assert!(p.contains("- Down Payment: $70,000\n"));
        assert!(p.contains("- Interest Rate: 6.5%\n"));
        assert!(p.contains("- Loan Term: 30 years\n"));
        assert!(p.contains("- Monthly Rent: $2,800\n"));
        assert!(p.contains("- Property Type: Duplex\n"));
        assert!(p.contains("- Location: Columbus, OH\n"));
        assert!(p.contains("- User Goals: cash flow, equity growth\n"));
        assert!(p.contains("- Risk Tolerance: high\n"));
        assert!(p.contains("- Investment Horizon: 7 years\n"));
        assert!(p.ends_with("can be parsed into JSON format."));
    }

    #[test]
    fn json_analysis_prompt_asks_for_object_and_recommendation_line() {
        let p = build(&deal(), Task::FullAnalysis, OutputFormat::Json);
        assert!(p.contains("\"Recommendation: <buy, pass, or negotiate>"));
        assert!(p.contains(ANALYSIS_JSON_SHAPE));
    }

    #[test]
    fn financing_prompt_names_the_property() {
        let p = build(&deal(), Task::FinancingOptions, OutputFormat::Prose);
        assert!(p.contains("Property: $350,000 Duplex in Columbus, OH\n"));
        assert!(p.contains("Down Payment Available: $70,000\n"));
        assert!(p.contains("Monthly Rent Potential: $2,800\n"));
        assert!(p.contains("Risk Tolerance: high\n"));
        assert!(!p.contains("JSON"));
        assert!(build(&deal(), Task::FinancingOptions, OutputFormat::Json).contains(FINANCING_JSON_SHAPE));
    }

    #[test]
    fn structuring_prompt_lists_goals() {
        let p = build(&deal(), Task::StructuringAdvice, OutputFormat::Prose);
        assert!(p.contains("Property: $350,000 Duplex\n"));
        assert!(p.contains("Goals: cash flow, equity growth\n"));
        assert!(p.ends_with("- Exit strategies"));
    }

    #[test]
    fn empty_text_fields_render_empty() {
        let mut d = deal();
        d.location.clear();
        d.user_goals.clear();
        let p = build(&d, Task::FullAnalysis, OutputFormat::Prose);
        assert!(p.contains("- Location: \n"));
        assert!(p.contains("- User Goals: \n"));
    }

    #[test]
    fn each_task_has_its_sampling() {
        let full = Task::FullAnalysis.generation_config();
        assert_eq!((full.temperature, full.max_output_tokens), (0.7, 2048));
        let fin = Task::FinancingOptions.generation_config();
        assert_eq!((fin.temperature, fin.max_output_tokens), (0.8, 1024));
        let st = Task::StructuringAdvice.generation_config();
        assert_eq!((st.temperature, st.max_output_tokens), (0.6, 1024));
        assert_eq!(st.top_k, Some(40));
        assert_eq!(st.top_p, Some(0.95));
    }
}
