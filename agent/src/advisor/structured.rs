//! JSON-first reading of completions.
//!
//! Prompts ask the model for JSON. Each field is read from it on its own;
//! anything absent, empty or ill-typed falls back to the heuristic extractor
//! for that field, so the result is always fully populated.

use crate::advisor::extract;
use crate::types::{
    AlternativeStructure, AnalysisResult, CashFlowEstimate, FinancingOption, RiskProfile,
};
use rand::Rng;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

const MAX_ROI: f64 = 100.0;

/// Full analysis: JSON object fields where usable, heuristics elsewhere.
pub fn read_analysis<R: Rng>(text: &str, rng: &mut R) -> AnalysisResult {
    let object = find_json(text, '{', |v| match v {
        Value::Object(map) => Some(map),
        _ => None,
    })
    .unwrap_or_else(Map::new);
    let field = |key: &str| object.get(key).cloned();

    let recommendation = field("recommendation").and_then(non_empty_string);
    let options = field("creativeFinancingOptions").and_then(financing_from_json);
    let risk = field("riskAnalysis").and_then(risk_from_json);
    let cash_flow = field("cashFlowProjection").and_then(cash_flow_from_json);
    let structures = field("alternativeStructures").and_then(structures_from_json);
    let steps = field("nextSteps").and_then(steps_from_json);

    let from_json = [
        recommendation.is_some(),
        options.is_some(),
        risk.is_some(),
        cash_flow.is_some(),
        structures.is_some(),
        steps.is_some(),
    ]
    .iter()
    .filter(|hit| **hit)
    .count();
    debug!("Structured analysis: {from_json}/6 fields from JSON");

    AnalysisResult {
        recommendation: recommendation.unwrap_or_else(|| extract::recommendation(text)),
        creative_financing_options: options
            .unwrap_or_else(|| extract::financing_options(text, rng)),
        risk_analysis: risk.unwrap_or_else(|| extract::risk_profile(text)),
        cash_flow_projection: cash_flow.unwrap_or_else(|| extract::cash_flow(text, rng)),
        alternative_structures: structures
            .unwrap_or_else(|| extract::alternative_structures(text)),
        next_steps: steps.unwrap_or_else(|| extract::next_steps(text)),
    }
}

/// Financing options from a JSON array, or from catalog names in the text.
pub fn read_financing_options<R: Rng>(text: &str, rng: &mut R) -> Vec<FinancingOption> {
    match find_json(text, '[', financing_from_json) {
        Some(options) => {
            debug!("Structured financing: {} options from JSON", options.len());
            options
        }
        None => extract::financing_options(text, rng),
    }
}

/// Structuring steps from a JSON array of strings, or the fixed checklist.
pub fn read_steps(text: &str) -> Vec<String> {
    match find_json(text, '[', steps_from_json) {
        Some(steps) => {
            debug!("Structured advice: {} steps from JSON", steps.len());
            steps
        }
        None => extract::next_steps(text),
    }
}

fn non_empty_string(v: Value) -> Option<String> {
    v.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Keeps well-formed entries, first one per type (case-insensitive), ROI clamped.
fn financing_from_json(v: Value) -> Option<Vec<FinancingOption>> {
    let Value::Array(items) = v else {
        return None;
    };

    let mut seen = HashSet::new();
    let options: Vec<FinancingOption> = items
        .into_iter()
        .filter_map(|mut item| {
            lowercase_field(&mut item, "complexity");
            serde_json::from_value::<FinancingOption>(item).ok()
        })
        .filter(|o| !o.kind.trim().is_empty() && o.estimated_roi.is_finite())
        .filter(|o| seen.insert(o.kind.trim().to_lowercase()))
        .map(|mut o| {
            o.kind = o.kind.trim().to_string();
            o.estimated_roi = o.estimated_roi.clamp(0.0, MAX_ROI);
            o
        })
        .collect();

    (!options.is_empty()).then_some(options)
}

fn risk_from_json(mut v: Value) -> Option<RiskProfile> {
    lowercase_field(&mut v, "overallRisk");
    serde_json::from_value(v).ok()
}

fn cash_flow_from_json(v: Value) -> Option<CashFlowEstimate> {
    let cf: CashFlowEstimate = serde_json::from_value(v).ok()?;
    let figures = [
        cf.monthly_cash_flow,
        cf.annual_cash_flow,
        cf.five_year_projection,
        cf.break_even_months,
        cf.cash_on_cash_return,
    ];
    figures.iter().all(|f| f.is_finite()).then_some(cf)
}

fn structures_from_json(v: Value) -> Option<Vec<AlternativeStructure>> {
    let structures: Vec<AlternativeStructure> = serde_json::from_value(v).ok()?;
    (!structures.is_empty()).then_some(structures)
}

fn steps_from_json(v: Value) -> Option<Vec<String>> {
    let steps: Vec<String> = serde_json::from_value::<Vec<String>>(v)
        .ok()?
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    (!steps.is_empty()).then_some(steps)
}

/// Models write "Medium" as often as "medium".
fn lowercase_field(v: &mut Value, key: &str) {
    if let Some(slot) = v.get_mut(key) {
        if let Some(s) = slot.as_str() {
            *slot = Value::String(s.trim().to_lowercase());
        }
    }
}

/// First balanced value opening with `open` that parses and that `accept` takes,
/// trying every occurrence of `open` in order, then a ```json fence.
fn find_json<T>(text: &str, open: char, accept: impl Fn(Value) -> Option<T>) -> Option<T> {
    text.match_indices(open)
        .filter_map(|(start, _)| balanced(&text[start..], open))
        .chain(fenced(text))
        .filter_map(|s| serde_json::from_str::<Value>(s).ok())
        .find_map(accept)
}

/// The value opening at the start of `text`, closed at its matching bracket.
fn balanced(text: &str, open: char) -> Option<&str> {
    let close = if open == '{' { '}' } else { ']' };
    if !text.starts_with(open) {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn fenced(text: &str) -> Option<&str> {
    let s = text.find("```json")?;
    let after = &text[s + 7..];
    let e = after.find("```")?;
    Some(after[..e].trim())
}
