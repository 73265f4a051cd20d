use serde::{Deserialize, Serialize};

use super::domain::{Behavior, Competency, EvaluationDetail};

/// Scores strictly below this value (on the 0-100 scale) are surfaced as
/// improvement opportunities.
pub const IMPROVEMENT_THRESHOLD: u8 = 76;

/// Aggregated scoring result for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub competencies: Vec<CompetencyResult>,
    pub overall_average: Option<f64>,
    pub improvement_opportunities: Vec<ImprovementOpportunity>,
}

/// Per-competency result; `average` is the mean of the strictly positive
/// behavior scores, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyResult {
    pub name: String,
    pub average: f64,
    pub behaviors: Vec<BehaviorResult>,
}

/// Per-behavior line of the report; `score` is null for unscored behaviors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorResult {
    pub description: String,
    pub score: Option<u8>,
    pub comment: Option<String>,
}

/// A behavior scored below the fixed threshold, flagged for coaching focus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementOpportunity {
    pub competency: String,
    pub behavior: String,
    pub score: u8,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregate the stored detail scores of one evaluation.
///
/// Competency averages count only strictly positive scores; a competency
/// with no positive score is excluded from the result and from the overall
/// mean, so unset scores never drag averages down or show up as "0%". The
/// overall average is the mean of the competency averages (not a flat mean
/// of behavior scores) and is null when no competency qualifies. Pure
/// function; no persistence.
pub fn aggregate(
    details: &[EvaluationDetail],
    competencies: &[Competency],
    behaviors: &[Behavior],
) -> ScoreSummary {
    let mut ordered: Vec<&Competency> = competencies.iter().collect();
    ordered.sort_by_key(|competency| competency.order);

    let mut results = Vec::new();
    for competency in ordered {
        let mut grouped: Vec<&Behavior> = behaviors
            .iter()
            .filter(|behavior| behavior.competency_id == competency.id)
            .collect();
        grouped.sort_by_key(|behavior| behavior.order);

        if grouped.is_empty() {
            continue;
        }

        let mut lines = Vec::new();
        let mut positives: Vec<u8> = Vec::new();

        for behavior in grouped {
            let stored = details
                .iter()
                .find(|detail| detail.behavior_id == behavior.id);

            if let Some(score) = stored.map(|detail| detail.score) {
                if score > 0 {
                    positives.push(score);
                }
            }

            lines.push(BehaviorResult {
                description: behavior.description.clone(),
                score: stored.map(|detail| detail.score),
                comment: stored.and_then(|detail| detail.comment.clone()),
            });
        }

        if positives.is_empty() {
            continue;
        }

        let sum: u32 = positives.iter().map(|score| u32::from(*score)).sum();
        let average = round2(f64::from(sum) / positives.len() as f64);

        results.push(CompetencyResult {
            name: competency.name.clone(),
            average,
            behaviors: lines,
        });
    }

    let overall_average = if results.is_empty() {
        None
    } else {
        let sum: f64 = results.iter().map(|result| result.average).sum();
        Some(round2(sum / results.len() as f64))
    };

    let mut improvement_opportunities = Vec::new();
    for result in &results {
        for line in &result.behaviors {
            if let Some(score) = line.score {
                if score < IMPROVEMENT_THRESHOLD {
                    improvement_opportunities.push(ImprovementOpportunity {
                        competency: result.name.clone(),
                        behavior: line.description.clone(),
                        score,
                    });
                }
            }
        }
    }

    ScoreSummary {
        competencies: results,
        overall_average,
        improvement_opportunities,
    }
}
