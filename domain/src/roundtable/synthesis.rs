//! Synthesis of accepted analyses
//!
//! Claims are grouped by their normalized text. A group becomes a key
//! finding when more than half of the participating agents support it and
//! its objections do not outnumber its concessions; every other group is
//! kept as a minority finding. Nothing accepted is ever dropped.

use super::challenge::{Challenge, ChallengeKind};
use super::finding::{AgentAnalysis, EvidenceCitation, FindingId};
use super::vote::VoteTally;
use crate::core::text::{normalize_claim, truncate_chars};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key findings named in the recommendation
const RECOMMENDATION_FINDINGS: usize = 5;

/// Claims from one or more agents that normalize to the same text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedFinding {
    /// Wording of the first occurrence
    pub claim: String,
    pub supporters: Vec<String>,
    pub finding_ids: Vec<FindingId>,
    pub citations: Vec<EvidenceCitation>,
    pub mean_confidence: f64,
    pub objected_by: Vec<String>,
    pub conceded_by: Vec<String>,
}

impl MergedFinding {
    pub fn support(&self) -> usize {
        self.supporters.len()
    }

    /// Objections outnumber concessions
    pub fn is_contested(&self) -> bool {
        self.objected_by.len() > self.conceded_by.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synthesis {
    pub key_findings: Vec<MergedFinding>,
    pub minority_findings: Vec<MergedFinding>,
    pub recommendation: String,
    pub participating: Vec<String>,
    /// Filled in after voting
    pub consensus_rate: f64,
    /// Filled in after voting
    pub approval_rate: f64,
}

impl Synthesis {
    /// Record the vote rates. The consensus rate is the unweighted approval rate.
    pub fn with_vote_rates(mut self, tally: &VoteTally) -> Self {
        self.approval_rate = tally.approval_rate();
        self.consensus_rate = self.approval_rate;
        self
    }

    pub fn all_findings(&self) -> impl Iterator<Item = &MergedFinding> {
        self.key_findings.iter().chain(self.minority_findings.iter())
    }
}

struct Group {
    merged: MergedFinding,
    confidences: Vec<f64>,
    first_seen: usize,
}

/// Merge accepted analyses and challenges into a synthesis.
///
/// Findings are ranked by supporter count, then mean confidence, then the
/// order in which they were first seen.
pub fn synthesize(analyses: &[AgentAnalysis], challenges: &[Challenge]) -> Synthesis {
    let participating: Vec<String> = analyses.iter().map(|a| a.agent.clone()).collect();

    let mut groups: Vec<Group> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    let mut by_finding: HashMap<FindingId, usize> = HashMap::new();

    for analysis in analyses {
        for finding in &analysis.findings {
            let mut key = normalize_claim(&finding.claim);
            if key.is_empty() {
                key = finding.claim.trim().to_lowercase();
            }

            let idx = match by_key.get(&key) {
                Some(&idx) => idx,
                None => {
                    let idx = groups.len();
                    groups.push(Group {
                        merged: MergedFinding {
                            claim: finding.claim.clone(),
                            supporters: Vec::new(),
                            finding_ids: Vec::new(),
                            citations: Vec::new(),
                            mean_confidence: 0.0,
                            objected_by: Vec::new(),
                            conceded_by: Vec::new(),
                        },
                        confidences: Vec::new(),
                        first_seen: idx,
                    });
                    by_key.insert(key, idx);
                    idx
                }
            };

            let group = &mut groups[idx];
            if !group.merged.supporters.contains(&analysis.agent) {
                group.merged.supporters.push(analysis.agent.clone());
            }
            group.merged.finding_ids.push(finding.id.clone());
            if !group.merged.citations.contains(&finding.evidence) {
                group.merged.citations.push(finding.evidence.clone());
            }
            group.confidences.push(finding.confidence);
            by_finding.insert(finding.id.clone(), idx);
        }
    }

    for challenge in challenges {
        let Some(&idx) = by_finding.get(&challenge.target) else {
            continue;
        };
        let merged = &mut groups[idx].merged;
        let list = match challenge.kind {
            ChallengeKind::Objection => &mut merged.objected_by,
            ChallengeKind::Concession => &mut merged.conceded_by,
        };
        if !list.contains(&challenge.agent) {
            list.push(challenge.agent.clone());
        }
    }

    for group in &mut groups {
        group.merged.mean_confidence =
            group.confidences.iter().sum::<f64>() / group.confidences.len().max(1) as f64;
    }

    groups.sort_by(|a, b| {
        b.merged
            .support()
            .cmp(&a.merged.support())
            .then_with(|| {
                b.merged
                    .mean_confidence
                    .total_cmp(&a.merged.mean_confidence)
            })
            .then_with(|| a.first_seen.cmp(&b.first_seen))
    });

    let participants = participating.len();
    let (key_findings, minority_findings): (Vec<_>, Vec<_>) = groups
        .into_iter()
        .map(|g| g.merged)
        .partition(|m| m.support() * 2 > participants && !m.is_contested());

    let recommendation = recommend(&key_findings, &minority_findings);

    Synthesis {
        key_findings,
        minority_findings,
        recommendation,
        participating,
        consensus_rate: 0.0,
        approval_rate: 0.0,
    }
}

fn recommend(key: &[MergedFinding], minority: &[MergedFinding]) -> String {
    if key.is_empty() {
        if minority.is_empty() {
            return "No findings were accepted; the question needs human review.".to_string();
        }
        return format!(
            "No finding was corroborated by a majority of agents; {} minority finding(s) need human review.",
            minority.len()
        );
    }

    let listed = key
        .iter()
        .take(RECOMMENDATION_FINDINGS)
        .enumerate()
        .map(|(i, m)| format!("{}) {}", i + 1, truncate_chars(&m.claim, 200)))
        .collect::<Vec<_>>()
        .join("; ");
    let mut out = format!("Corroborated findings: {}.", listed);
    if !minority.is_empty() {
        out.push_str(&format!(
            " {} minority finding(s) are recorded for review.",
            minority.len()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roundtable::finding::Finding;

    fn analysis(agent: &str, claims: &[(&str, f64)]) -> AgentAnalysis {
        AgentAnalysis {
            agent: agent.to_string(),
            findings: claims
                .iter()
                .enumerate()
                .map(|(i, (claim, confidence))| Finding {
                    id: FindingId::for_agent(agent, i),
                    claim: claim.to_string(),
                    evidence: EvidenceCitation {
                        quote: format!("quote {}", i),
                        offset: i,
                    },
                    confidence: *confidence,
                })
                .collect(),
            flags: vec![],
        }
    }

    #[test]
    fn test_majority_claim_becomes_key_finding() {
        let analyses = vec![
            analysis("a", &[("Revenue fell in Q3.", 0.9)]),
            analysis("b", &[("revenue fell in q3", 0.7)]),
            analysis("c", &[("Costs are flat", 0.8)]),
        ];
        let s = synthesize(&analyses, &[]);
        assert_eq!(s.key_findings.len(), 1);
        assert_eq!(s.key_findings[0].claim, "Revenue fell in Q3.");
        assert_eq!(s.key_findings[0].supporters, vec!["a", "b"]);
        assert!((s.key_findings[0].mean_confidence - 0.8).abs() < 1e-9);
        assert_eq!(s.minority_findings.len(), 1);
        assert_eq!(s.minority_findings[0].claim, "Costs are flat");
        assert!(s.recommendation.contains("Revenue fell in Q3."));
    }

    #[test]
    fn test_no_majority_keeps_everything_as_minority() {
        let analyses = vec![
            analysis("a", &[("x is true", 0.5)]),
            analysis("b", &[("y is true", 0.5)]),
            analysis("c", &[("z is true", 0.5)]),
        ];
        let s = synthesize(&analyses, &[]);
        assert!(s.key_findings.is_empty());
        assert_eq!(s.minority_findings.len(), 3);
        assert!(s.recommendation.contains("human review"));
    }

    #[test]
    fn test_contested_claim_demoted() {
        let analyses = vec![
            analysis("a", &[("margin improved", 0.9)]),
            analysis("b", &[("margin improved", 0.9)]),
            analysis("c", &[("other", 0.9)]),
        ];
        let challenges = vec![
            Challenge::objection("c", FindingId::for_agent("a", 0), "one-off gain"),
            Challenge::objection("b", FindingId::for_agent("a", 0), "restated"),
        ];
        let s = synthesize(&analyses, &challenges);
        assert!(s.key_findings.is_empty());
        let margin = s
            .minority_findings
            .iter()
            .find(|m| m.claim == "margin improved")
            .unwrap();
        assert_eq!(margin.objected_by, vec!["c", "b"]);
    }

    #[test]
    fn test_concession_offsets_objection() {
        let analyses = vec![
            analysis("a", &[("margin improved", 0.9)]),
            analysis("b", &[("margin improved", 0.9)]),
        ];
        let challenges = vec![
            Challenge::objection("b", FindingId::for_agent("a", 0), "restated"),
            Challenge::concession("b", FindingId::for_agent("b", 0), "fair point"),
        ];
        let s = synthesize(&analyses, &challenges);
        assert_eq!(s.key_findings.len(), 1);
    }

    #[test]
    fn test_ranking_support_then_confidence_then_order() {
        let analyses = vec![
            analysis("a", &[("first", 0.5), ("second", 0.9), ("shared", 0.1)]),
            analysis("b", &[("shared", 0.1), ("third", 0.5)]),
        ];
        let s = synthesize(&analyses, &[]);
        let order: Vec<_> = s.all_findings().map(|m| m.claim.as_str()).collect();
        assert_eq!(order, vec!["shared", "second", "first", "third"]);
    }

    #[test]
    fn test_findings_never_dropped() {
        let analyses = vec![
            analysis("a", &[("one", 0.5), ("two", 0.5)]),
            analysis("b", &[("two", 0.5), ("three", 0.5)]),
        ];
        let s = synthesize(&analyses, &[]);
        let ids: usize = s.all_findings().map(|m| m.finding_ids.len()).sum();
        assert_eq!(ids, 4);
    }

    #[test]
    fn test_vote_rates_applied() {
        let s = synthesize(&[analysis("a", &[("x", 0.5)])], &[]);
        let tally = VoteTally {
            approve_count: 3,
            dissent_count: 1,
        };
        let s = s.with_vote_rates(&tally);
        assert_eq!(s.approval_rate, 0.75);
        assert_eq!(s.consensus_rate, 0.75);
    }
}
