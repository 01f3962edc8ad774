//! Hypothesis Manager: the arithmetic core.
//!
//! Pure functions over `Hypothesis` / `&[Hypothesis]` except for the
//! `tracing` spans they open around mutation. Nothing here touches
//! `InvestigationState` directly — the Milestone Engine wires the calls.

use tracing::{debug, instrument};

use crate::config::HypothesisConfig;
use crate::state::Hypothesis;
use crate::types::{HypothesisCategory, HypothesisStatus};

/// Link a piece of evidence to a hypothesis as support, recompute
/// likelihood, and re-evaluate auto-transitions.
#[instrument(skip(hypothesis, cfg), fields(hypothesis_id = %hypothesis.id))]
pub fn apply_supporting_evidence(
    hypothesis: &mut Hypothesis,
    evidence_id: crate::state::EvidenceId,
    turn: u32,
    cfg: &HypothesisConfig,
) {
    hypothesis.supporting_evidence_ids.push(evidence_id);
    update_likelihood(hypothesis, cfg.supporting_evidence_delta, turn, cfg);
    evaluate_auto_transition(hypothesis, cfg);
}

/// Link a piece of evidence to a hypothesis as refutation, recompute
/// likelihood, and re-evaluate auto-transitions.
#[instrument(skip(hypothesis, cfg), fields(hypothesis_id = %hypothesis.id))]
pub fn apply_refuting_evidence(
    hypothesis: &mut Hypothesis,
    evidence_id: crate::state::EvidenceId,
    turn: u32,
    cfg: &HypothesisConfig,
) {
    hypothesis.refuting_evidence_ids.push(evidence_id);
    update_likelihood(hypothesis, cfg.refuting_evidence_delta, turn, cfg);
    evaluate_auto_transition(hypothesis, cfg);
}

/// Apply a likelihood delta, clamp, record the trajectory point, and
/// update the progress counter.
fn update_likelihood(hypothesis: &mut Hypothesis, delta: f64, turn: u32, cfg: &HypothesisConfig) {
    let before = hypothesis.likelihood;
    let after = (before + delta).clamp(0.0, 1.0);
    hypothesis.likelihood = after;
    hypothesis.confidence_trajectory.push((turn, after));

    if (after - before).abs() >= cfg.progress_delta_threshold {
        hypothesis.iterations_without_progress = 0;
        hypothesis.last_progress_at_turn = turn;
    } else {
        hypothesis.iterations_without_progress += 1;
    }
    debug!(before, after, delta, "hypothesis likelihood updated");
}

/// Confidence decay applied at turn boundaries to ACTIVE hypotheses
/// stalled for `decay_min_iterations_without_progress` or more.
pub fn apply_decay(hypothesis: &mut Hypothesis, turn: u32, cfg: &HypothesisConfig) {
    if hypothesis.status != HypothesisStatus::Active {
        return;
    }
    if hypothesis.iterations_without_progress < cfg.decay_min_iterations_without_progress {
        return;
    }
    let factor = cfg.decay_factor.powi(hypothesis.iterations_without_progress as i32);
    hypothesis.likelihood = (hypothesis.likelihood * factor).clamp(0.0, 1.0);
    hypothesis
        .confidence_trajectory
        .push((turn, hypothesis.likelihood));
}

/// Evaluate auto-status transitions. Only CAPTURED and ACTIVE hypotheses
/// are considered; everything else is left alone. REFUTED takes
/// precedence over RETIRED per the ordering contract.
pub fn evaluate_auto_transition(hypothesis: &mut Hypothesis, cfg: &HypothesisConfig) {
    if !matches!(
        hypothesis.status,
        HypothesisStatus::Captured | HypothesisStatus::Active
    ) {
        return;
    }

    let supporting = hypothesis.supporting_evidence_ids.len();
    let refuting = hypothesis.refuting_evidence_ids.len();

    if hypothesis.likelihood >= cfg.validated_min_likelihood
        && supporting >= cfg.validated_min_supporting
    {
        hypothesis.status = HypothesisStatus::Validated;
        hypothesis.validated_at_turn = Some(hypothesis.last_progress_at_turn);
    } else if hypothesis.likelihood <= cfg.refuted_max_likelihood
        && refuting >= cfg.refuted_min_refuting
    {
        hypothesis.status = HypothesisStatus::Refuted;
        hypothesis.validated_at_turn = Some(hypothesis.last_progress_at_turn);
    } else if hypothesis.likelihood < cfg.retired_max_likelihood {
        hypothesis.status = HypothesisStatus::Retired;
    } else if hypothesis.status == HypothesisStatus::Captured {
        hypothesis.status = HypothesisStatus::Active;
    }
}

/// Anchoring detection result.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchoringResult {
    pub triggered: bool,
    pub reason: Option<String>,
    pub affected_ids: Vec<crate::state::HypothesisId>,
}

/// Detect anchoring bias across the current hypothesis collection.
/// Requires the OODA controller's `current_iteration >= anchoring_min_iteration`.
pub fn detect_anchoring(
    hypotheses: &[Hypothesis],
    current_iteration: u32,
    cfg: &HypothesisConfig,
) -> AnchoringResult {
    if current_iteration < cfg.anchoring_min_iteration {
        return AnchoringResult {
            triggered: false,
            reason: None,
            affected_ids: Vec::new(),
        };
    }

    let active: Vec<&Hypothesis> = hypotheses
        .iter()
        .filter(|h| h.status == HypothesisStatus::Active)
        .collect();

    // Rule 1: too many active hypotheses sharing a category.
    let mut by_category: std::collections::HashMap<HypothesisCategory, Vec<&Hypothesis>> =
        std::collections::HashMap::new();
    for h in &active {
        by_category.entry(h.category).or_default().push(h);
    }
    if let Some((category, members)) = by_category
        .iter()
        .find(|(_, members)| members.len() >= cfg.anchoring_same_category_count)
    {
        return AnchoringResult {
            triggered: true,
            reason: Some(format!(
                "{} active hypotheses share category {category:?}",
                members.len()
            )),
            affected_ids: members.iter().map(|h| h.id).collect(),
        };
    }

    // Rule 2: too many hypotheses stalled without progress.
    let stalled: Vec<&&Hypothesis> = active
        .iter()
        .filter(|h| h.iterations_without_progress >= cfg.anchoring_stalled_iterations)
        .collect();
    if stalled.len() >= cfg.anchoring_stalled_count {
        return AnchoringResult {
            triggered: true,
            reason: Some(format!(
                "{} active hypotheses stalled for {}+ iterations",
                stalled.len(),
                cfg.anchoring_stalled_iterations
            )),
            affected_ids: stalled.iter().map(|h| h.id).collect(),
        };
    }

    // Rule 3: top-ranked hypothesis stalled below threshold.
    if let Some(top) = active
        .iter()
        .max_by(|a, b| a.likelihood.total_cmp(&b.likelihood))
    {
        if top.iterations_without_progress >= cfg.anchoring_top_ranked_iterations
            && top.likelihood < cfg.anchoring_top_ranked_likelihood
        {
            return AnchoringResult {
                triggered: true,
                reason: Some(format!(
                    "top-ranked hypothesis {} stalled at likelihood {:.2}",
                    top.id, top.likelihood
                )),
                affected_ids: vec![top.id],
            };
        }
    }

    AnchoringResult {
        triggered: false,
        reason: None,
        affected_ids: Vec::new(),
    }
}

/// Constraints handed to the prompt layer after a forced-alternative
/// retirement round.
#[derive(Debug, Clone, PartialEq)]
pub struct DiversificationConstraints {
    pub exclude_categories: Vec<HypothesisCategory>,
    pub require_diverse_categories: bool,
    pub min_new_hypotheses: usize,
}

/// On anchoring, retire stalled ACTIVE hypotheses in the dominant
/// category and return constraints for the next hypothesis-generation
/// prompt.
pub fn force_alternatives(
    hypotheses: &mut [Hypothesis],
    anchoring: &AnchoringResult,
    cfg: &HypothesisConfig,
) -> DiversificationConstraints {
    let dominant_categories: std::collections::HashSet<HypothesisCategory> = hypotheses
        .iter()
        .filter(|h| anchoring.affected_ids.contains(&h.id))
        .map(|h| h.category)
        .collect();

    for h in hypotheses.iter_mut() {
        if h.status == HypothesisStatus::Active
            && dominant_categories.contains(&h.category)
            && h.iterations_without_progress >= cfg.forced_alternative_min_iterations
        {
            h.status = HypothesisStatus::Retired;
        }
    }

    DiversificationConstraints {
        exclude_categories: dominant_categories.into_iter().collect(),
        require_diverse_categories: true,
        min_new_hypotheses: cfg.min_new_hypotheses_on_anchoring,
    }
}

/// Rank hypotheses by likelihood, descending.
pub fn rank_by_likelihood(hypotheses: &[Hypothesis]) -> Vec<&Hypothesis> {
    let mut ranked: Vec<&Hypothesis> = hypotheses.iter().collect();
    ranked.sort_by(|a, b| b.likelihood.total_cmp(&a.likelihood));
    ranked
}

/// ACTIVE hypotheses with likelihood above the noise floor, capped at
/// `max`, highest-likelihood first.
pub fn testable(hypotheses: &[Hypothesis], max: usize) -> Vec<&Hypothesis> {
    rank_by_likelihood(hypotheses)
        .into_iter()
        .filter(|h| h.status == HypothesisStatus::Active && h.likelihood > 0.20)
        .take(max)
        .collect()
}

/// The highest-likelihood VALIDATED hypothesis, if any.
pub fn validated(hypotheses: &[Hypothesis]) -> Option<&Hypothesis> {
    hypotheses
        .iter()
        .filter(|h| h.status == HypothesisStatus::Validated)
        .max_by(|a, b| a.likelihood.total_cmp(&b.likelihood))
}
