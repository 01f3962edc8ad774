//! Working-Conclusion Generator: the engine's best narrative answer,
//! regardless of certainty, recomputed every turn.

use crate::config::{ConfidenceThresholds, HypothesisConfig};
use crate::hypothesis_manager;
use crate::state::{Hypothesis, ProgressMetrics, WorkingConclusion};
use crate::types::{ConfidenceLevel, HypothesisStatus, InvestigationMomentum, InvestigationPhase};

/// Generate the `WorkingConclusion` for the current turn.
pub fn generate(
    hypotheses: &[Hypothesis],
    phase: InvestigationPhase,
    turn: u32,
    thresholds: &ConfidenceThresholds,
    cfg: &HypothesisConfig,
) -> WorkingConclusion {
    let best = best_candidate(hypotheses);

    let (statement, confidence) = match best {
        Some(h) => (h.statement.clone(), h.likelihood),
        None => (placeholder_statement(phase), 0.0),
    };

    let confidence_level = ConfidenceLevel::from_likelihood(confidence, thresholds);
    let can_proceed_with_solution = confidence >= cfg.validated_min_likelihood;

    let mut caveats = Vec::new();
    let supporting_count = best.map_or(0, |h| h.supporting_evidence_ids.len());
    if supporting_count < 2 {
        caveats.push("low supporting evidence".to_string());
    }
    if confidence < cfg.validated_min_likelihood {
        caveats.push("confidence below validation threshold".to_string());
    }
    let alternatives = count_alternatives(hypotheses, best);
    if alternatives > 0 {
        caveats.push(format!("{alternatives} alternative explanations not ruled out"));
    }
    if best.map_or(false, |h| h.iterations_without_progress >= 3) {
        caveats.push("no recent progress".to_string());
    }

    WorkingConclusion {
        statement,
        confidence,
        confidence_level,
        supporting_evidence_count: supporting_count as u32,
        caveats,
        alternative_explanations: alternative_statements(hypotheses, best),
        can_proceed_with_solution,
        next_evidence_needed: next_evidence_needed(confidence, alternatives, cfg),
        generated_at_turn: turn,
    }
}

fn best_candidate(hypotheses: &[Hypothesis]) -> Option<&Hypothesis> {
    hypothesis_manager::validated(hypotheses).or_else(|| {
        hypotheses
            .iter()
            .filter(|h| h.status == HypothesisStatus::Active)
            .max_by(|a, b| a.likelihood.total_cmp(&b.likelihood))
    })
}

fn placeholder_statement(phase: InvestigationPhase) -> String {
    use InvestigationPhase::*;
    match phase {
        Intake => "Gathering initial details about the problem.".to_string(),
        BlastRadius => "Assessing the scope of impact.".to_string(),
        Timeline => "Establishing when the problem started.".to_string(),
        Hypothesis => "No hypothesis has enough support yet.".to_string(),
        Validation => "Validating candidate root causes.".to_string(),
        Solution => "Preparing a remediation plan.".to_string(),
        Document => "Documenting the investigation outcome.".to_string(),
    }
}

fn count_alternatives(hypotheses: &[Hypothesis], best: Option<&Hypothesis>) -> usize {
    hypotheses
        .iter()
        .filter(|h| {
            h.status == HypothesisStatus::Active
                && h.likelihood >= 0.30
                && best.map_or(true, |b| b.id != h.id)
        })
        .count()
}

fn alternative_statements(hypotheses: &[Hypothesis], best: Option<&Hypothesis>) -> Vec<String> {
    hypotheses
        .iter()
        .filter(|h| {
            h.status == HypothesisStatus::Active
                && h.likelihood >= 0.30
                && best.map_or(true, |b| b.id != h.id)
        })
        .map(|h| h.statement.clone())
        .collect()
}

fn next_evidence_needed(confidence: f64, alternatives: usize, cfg: &HypothesisConfig) -> Vec<String> {
    let mut needed = Vec::new();
    if confidence < cfg.validated_min_likelihood {
        needed.push("additional supporting evidence for the leading hypothesis".to_string());
    }
    if alternatives > 0 {
        needed.push("evidence to rule out remaining alternative explanations".to_string());
    }
    if needed.is_empty() {
        needed.push("confirmation evidence before proceeding to a solution".to_string());
    }
    needed
}

/// Compute `ProgressMetrics` for the current turn.
pub fn compute_progress_metrics(
    hypotheses: &[Hypothesis],
    evidence_provided_count: u32,
    evidence_blocked_count: u32,
    progress_in_last_three_turns: &[bool],
    turns_without_progress: u32,
) -> ProgressMetrics {
    let active_hypotheses_count = hypotheses
        .iter()
        .filter(|h| h.status == HypothesisStatus::Active)
        .count() as u32;

    let evidence_completeness = if evidence_provided_count + evidence_blocked_count == 0 {
        0.0
    } else {
        evidence_provided_count as f64
            / (evidence_provided_count + evidence_blocked_count) as f64
    };

    let momentum = classify_momentum(progress_in_last_three_turns);

    let blocked_reasons = if evidence_blocked_count > 0 {
        vec!["user declined or could not provide requested evidence".to_string()]
    } else {
        Vec::new()
    };

    ProgressMetrics {
        evidence_provided_count,
        evidence_blocked_count,
        active_hypotheses_count,
        evidence_completeness,
        momentum,
        turns_without_progress,
        blocked_reasons,
    }
}

fn classify_momentum(progress_in_last_three_turns: &[bool]) -> InvestigationMomentum {
    let window: Vec<&bool> = progress_in_last_three_turns.iter().rev().take(3).collect();
    if window.is_empty() {
        return InvestigationMomentum::Early;
    }
    let ratio = window.iter().filter(|p| ***p).count() as f64 / window.len() as f64;
    if ratio == 0.0 {
        InvestigationMomentum::Stalled
    } else if ratio >= 1.0 {
        InvestigationMomentum::Accelerating
    } else if window.len() < 3 {
        InvestigationMomentum::Early
    } else {
        InvestigationMomentum::Steady
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HypothesisCategory;
    use crate::types::HypothesisGenerationMode;

    fn active(likelihood: f64) -> Hypothesis {
        let mut h = Hypothesis::new(
            "leading hypothesis",
            HypothesisCategory::Code,
            likelihood,
            1,
            HypothesisGenerationMode::Systematic,
        );
        h.status = HypothesisStatus::Active;
        h
    }

    #[test]
    fn no_hypotheses_yields_placeholder_and_zero_confidence() {
        let conclusion = generate(
            &[],
            InvestigationPhase::Hypothesis,
            1,
            &ConfidenceThresholds::default(),
            &HypothesisConfig::default(),
        );
        assert_eq!(conclusion.confidence, 0.0);
        assert!(!conclusion.statement.is_empty());
        assert!(!conclusion.can_proceed_with_solution);
    }

    #[test]
    fn high_confidence_hypothesis_allows_proceeding() {
        let mut h = active(0.8);
        h.supporting_evidence_ids = vec![
            crate::state::EvidenceId::new(),
            crate::state::EvidenceId::new(),
        ];
        let conclusion = generate(
            &[h],
            InvestigationPhase::Validation,
            5,
            &ConfidenceThresholds::default(),
            &HypothesisConfig::default(),
        );
        assert!(conclusion.can_proceed_with_solution);
        assert!(conclusion.caveats.is_empty() || !conclusion.caveats.contains(&"low supporting evidence".to_string()));
    }

    #[test]
    fn alternatives_are_counted_and_named() {
        let leading = active(0.6);
        let alt = active(0.35);
        let conclusion = generate(
            &[leading, alt],
            InvestigationPhase::Validation,
            3,
            &ConfidenceThresholds::default(),
            &HypothesisConfig::default(),
        );
        assert_eq!(conclusion.alternative_explanations.len(), 1);
        assert!(conclusion
            .caveats
            .iter()
            .any(|c| c.contains("alternative explanations")));
    }

    #[test]
    fn next_evidence_needed_is_never_empty() {
        let conclusion = generate(
            &[],
            InvestigationPhase::Intake,
            0,
            &ConfidenceThresholds::default(),
            &HypothesisConfig::default(),
        );
        assert!(!conclusion.next_evidence_needed.is_empty());
    }

    #[test]
    fn momentum_classifies_stalled_and_accelerating() {
        assert_eq!(classify_momentum(&[false, false, false]), InvestigationMomentum::Stalled);
        assert_eq!(classify_momentum(&[true, true, true]), InvestigationMomentum::Accelerating);
        assert_eq!(classify_momentum(&[]), InvestigationMomentum::Early);
    }

    #[test]
    fn progress_metrics_compute_completeness_ratio() {
        let metrics = compute_progress_metrics(&[], 3, 1, &[true, true, false], 0);
        assert!((metrics.evidence_completeness - 0.75).abs() < 1e-9);
    }
}
