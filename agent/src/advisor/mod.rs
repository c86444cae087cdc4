pub mod extract;
pub mod prompts;
pub mod structured;

use crate::analyzer::gemini::GeminiClient;
use crate::analyzer::transport::ReqwestTransport;
use crate::config::Config;
use crate::error::{AdvisorError, Result};
use crate::types::{AnalysisResult, DealParameters, FinancingOption};
use std::sync::Arc;
use tracing::{info, warn};

pub use prompts::{OutputFormat, Task};

/// Deal analysis service: prompt -> Gemini -> structured result.
/// Stateless between calls; share it behind an `Arc` if needed.
pub struct DealAdvisor {
    gemini: GeminiClient,
    format: OutputFormat,
}

impl DealAdvisor {
    pub fn new(gemini: GeminiClient, format: OutputFormat) -> Self {
        Self { gemini, format }
    }

    /// Wire up the reqwest transport described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::new(
            &config.gemini_api_base,
            &config.gemini_model,
            config.http_timeout(),
        )?;
        let format = if config.structured_output {
            OutputFormat::Json
        } else {
            OutputFormat::Prose
        };
        Ok(Self::new(
            GeminiClient::new(&config.gemini_api_key, Arc::new(transport)),
            format,
        ))
    }

    pub fn is_configured(&self) -> bool {
        self.gemini.is_configured()
    }

    pub async fn test_connection(&self) -> Result<bool> {
        self.ensure_configured()?;
        let ok = self.gemini.probe().await?;
        if ok {
            info!("Gemini connection OK");
        } else {
            warn!("Gemini answered without candidates");
        }
        Ok(ok)
    }

    /// Full analysis: recommendation, financing, risk, cash flow, structures, next steps.
    pub async fn analyze_deal(&self, deal: &DealParameters) -> Result<AnalysisResult> {
        let text = self.ask(deal, Task::FullAnalysis).await?;
        let mut rng = rand::thread_rng();
        let result = match self.format {
            OutputFormat::Json => structured::read_analysis(&text, &mut rng),
            OutputFormat::Prose => extract::analysis(&text, &mut rng),
        };
        info!(
            "Analysis: \"{}\" | {} financing options | {} risk",
            &result.recommendation.chars().take(60).collect::<String>(),
            result.creative_financing_options.len(),
            result.risk_analysis.overall_risk,
        );
        Ok(result)
    }

    pub async fn financing_options(&self, deal: &DealParameters) -> Result<Vec<FinancingOption>> {
        let text = self.ask(deal, Task::FinancingOptions).await?;
        let mut rng = rand::thread_rng();
        let options = match self.format {
            OutputFormat::Json => structured::read_financing_options(&text, &mut rng),
            OutputFormat::Prose => extract::financing_options(&text, &mut rng),
        };
        info!(
            "Financing: {}",
            options.iter().map(|o| o.kind.as_str()).collect::<Vec<_>>().join(", ")
        );
        Ok(options)
    }

    pub async fn structuring_advice(&self, deal: &DealParameters) -> Result<Vec<String>> {
        let text = self.ask(deal, Task::StructuringAdvice).await?;
        let steps = match self.format {
            OutputFormat::Json => structured::read_steps(&text),
            OutputFormat::Prose => extract::next_steps(&text),
        };
        info!("Structuring: {} steps", steps.len());
        Ok(steps)
    }

    /// One prompt, one request. Shape failures are named after `task`.
    async fn ask(&self, deal: &DealParameters, task: Task) -> Result<String> {
        self.ensure_configured()?;
        let prompt = prompts::build(deal, task, self.format);
        info!(
            "{task}: {} in {} ({} chars prompt)",
            deal.property_type,
            deal.location,
            prompt.len()
        );
        self.gemini
            .invoke(&prompt, task.generation_config())
            .await
            .map_err(|e| e.parsing(task.result_label()))
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.is_configured() {
            Ok(())
        } else {
            warn!("Gemini API key not configured, skipping request");
            Err(AdvisorError::not_configured())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::transport::testing::{candidates, ScriptedTransport};
    use crate::types::{Complexity, RiskLevel};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn deal() -> DealParameters {
        DealParameters {
            property_value: dec!(420000),
            down_payment: dec!(42000),
            interest_rate: dec!(7.125),
            loan_term: 30,
            monthly_rent: dec!(3100),
            property_type: "Fourplex".into(),
            location: "Tampa, FL".into(),
            user_goals: vec!["monthly income".into()],
            risk_tolerance: RiskLevel::Medium,
            investment_horizon: 5,
        }
    }

    fn advisor(key: &str, t: &Arc<ScriptedTransport>, format: OutputFormat) -> DealAdvisor {
        DealAdvisor::new(GeminiClient::new(key, t.clone()), format)
    }

    #[test]
    fn configured_only_with_a_real_key() {
        let t = Arc::new(ScriptedTransport::default());
        assert!(!advisor("", &t, OutputFormat::Prose).is_configured());
        assert!(!advisor("YOUR_GEMINI_API_KEY", &t, OutputFormat::Prose).is_configured());
        assert!(advisor("k", &t, OutputFormat::Prose).is_configured());
    }

    #[tokio::test]
    async fn unconfigured_calls_never_reach_the_transport() {
        let t = Arc::new(ScriptedTransport::replying(candidates(&["hi"])));
        let a = advisor("YOUR_GEMINI_API_KEY", &t, OutputFormat::Json);

        let expected = AdvisorError::not_configured();
        assert_eq!(a.test_connection().await.unwrap_err(), expected);
        assert_eq!(a.analyze_deal(&deal()).await.unwrap_err(), expected);
        assert_eq!(a.financing_options(&deal()).await.unwrap_err(), expected);
        assert_eq!(a.structuring_advice(&deal()).await.unwrap_err(), expected);
        assert_eq!(t.call_count(), 0);
    }

    #[tokio::test]
    async fn test_connection_reports_candidates() {
        let t = Arc::new(ScriptedTransport::replying(candidates(&["Connection successful"])));
        assert!(advisor("k", &t, OutputFormat::Prose).test_connection().await.unwrap());

        let t = Arc::new(ScriptedTransport::replying(json!({ "candidates": [] })));
        assert!(!advisor("k", &t, OutputFormat::Prose).test_connection().await.unwrap());
    }

    #[tokio::test]
    async fn analyze_deal_from_prose() {
        let t = Arc::new(ScriptedTransport::replying(candidates(&[
            "Our recommendation: negotiate further. Seller Financing and a wraparound both fit.",
        ])));
        let result = advisor("k", &t, OutputFormat::Prose).analyze_deal(&deal()).await.unwrap();

        assert_eq!(result.recommendation, "negotiate further");
        let kinds: Vec<_> = result.creative_financing_options.iter().map(|o| o.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Seller Financing", "Wraparound"]);
        assert_eq!(result.next_steps.len(), 7);

        let req = t.last_request().unwrap();
        assert_eq!(req.generation_config, Task::FullAnalysis.generation_config());
        assert!(req.contents[0].parts[0].text.contains("- Property Value: $420,000"));
    }

    #[tokio::test]
    async fn analyze_deal_prefers_json_when_asked() {
        let reply = r#"Recommendation: buy.
{"recommendation": "Buy at asking", "creativeFinancingOptions": [{"type": "Private Money", "description": "Local lender", "estimatedROI": 17, "complexity": "high"}]}"#;
        let t = Arc::new(ScriptedTransport::replying(candidates(&[reply])));
        let result = advisor("k", &t, OutputFormat::Json).analyze_deal(&deal()).await.unwrap();

        assert_eq!(result.recommendation, "Buy at asking");
        assert_eq!(result.creative_financing_options.len(), 1);
        assert_eq!(result.creative_financing_options[0].complexity, Complexity::High);
        assert_eq!(result.risk_analysis.overall_risk, RiskLevel::Medium);

        let prompt = &t.last_request().unwrap().contents[0].parts[0].text;
        assert!(prompt.contains("single JSON object"));
    }

    #[tokio::test]
    async fn financing_options_fall_back_to_traditional() {
        let t = Arc::new(ScriptedTransport::replying(candidates(&["A conventional loan is best."])));
        let options = advisor("k", &t, OutputFormat::Json).financing_options(&deal()).await.unwrap();

        assert_eq!(options.len(), 1);
        assert_eq!(options[0].kind, "Traditional Financing");
        assert!((8.0..12.0).contains(&options[0].estimated_roi));
        assert_eq!(
            t.last_request().unwrap().generation_config,
            Task::FinancingOptions.generation_config()
        );
    }

    #[tokio::test]
    async fn structuring_advice_reads_steps() {
        let t = Arc::new(ScriptedTransport::replying(candidates(&[
            r#"["Ask for a 2% seller credit", "Close in an LLC"]"#,
        ])));
        let steps = advisor("k", &t, OutputFormat::Json).structuring_advice(&deal()).await.unwrap();
        assert_eq!(steps, vec!["Ask for a 2% seller credit", "Close in an LLC"]);

        let t = Arc::new(ScriptedTransport::replying(candidates(&["1. Negotiate 2. Close"])));
        let steps = advisor("k", &t, OutputFormat::Prose).structuring_advice(&deal()).await.unwrap();
        assert_eq!(steps, extract::next_steps(""));
    }

    #[tokio::test]
    async fn shape_failures_name_the_operation() {
        let empty = || Arc::new(ScriptedTransport::replying(json!({ "candidates": [] })));

        let err = advisor("k", &empty(), OutputFormat::Prose).analyze_deal(&deal()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse AI response");

        let err = advisor("k", &empty(), OutputFormat::Prose).financing_options(&deal()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse financing options");

        let err = advisor("k", &empty(), OutputFormat::Prose).structuring_advice(&deal()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse structuring advice");
    }

    #[tokio::test]
    async fn transport_failures_surface_as_messages() {
        let cases = [
            (Some(403), "Invalid API key. Please check your Gemini API key."),
            (Some(429), "API rate limit exceeded. Please try again later."),
            (Some(400), "Invalid request. Please check your input parameters."),
            (Some(502), "An error occurred while processing your request."),
            (None, "An error occurred while processing your request."),
        ];
        for (status, message) in cases {
            let t = Arc::new(ScriptedTransport::failing(status));
            let err = advisor("k", &t, OutputFormat::Json).analyze_deal(&deal()).await.unwrap_err();
            assert_eq!(err.to_string(), message);
            assert_eq!(t.call_count(), 1);
        }
    }

    #[test]
    fn from_config_picks_output_format() {
        let mut cfg = Config::with_api_key("k");
        assert_eq!(DealAdvisor::from_config(&cfg).unwrap().format, OutputFormat::Json);
        cfg.structured_output = false;
        assert_eq!(DealAdvisor::from_config(&cfg).unwrap().format, OutputFormat::Prose);
    }
}
