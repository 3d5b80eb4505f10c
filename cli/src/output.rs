//! Console output formatting

use colored::Colorize;
use roundtable_domain::{
    AgentDescriptor, Artifact, ArtifactSummary, ChatResponse, ConsensusOutcome, Decision,
    MergedFinding,
};

/// Formats round table results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Findings, votes and the decision
    pub fn format_full(artifact: &Artifact) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Round Table Results"));
        output.push_str(&format!("{} {}\n", "Task:".cyan().bold(), artifact.task_id));
        output.push_str(&format!(
            "{} {}\n\n",
            "Agents:".cyan().bold(),
            artifact.participants.join(", ")
        ));
        if let Some(note) = &artifact.strategy_note {
            output.push_str(&format!("{} {}\n\n", "Strategy:".cyan().bold(), note));
        }

        output.push_str(&Self::section_header("Key Findings"));
        if artifact.synthesis.key_findings.is_empty() {
            output.push_str("  (none)\n");
        }
        for finding in &artifact.synthesis.key_findings {
            output.push_str(&Self::finding(finding));
        }

        if !artifact.synthesis.minority_findings.is_empty() {
            output.push_str(&Self::section_header("Minority Findings"));
            for finding in &artifact.synthesis.minority_findings {
                output.push_str(&Self::finding(finding));
            }
        }

        output.push_str(&Self::section_header("Votes"));
        for vote in &artifact.votes {
            let decision = match vote.decision {
                Decision::Approve => "approve".green(),
                Decision::Dissent => "dissent".red(),
            };
            output.push_str(&format!("  {} {}: {}\n", decision, vote.agent.bold(), vote.reason));
        }

        if !artifact.degraded.is_empty() {
            output.push_str(&Self::section_header("Degraded Agents"));
            for d in &artifact.degraded {
                output.push_str(&format!(
                    "  {} {} during {} ({}): {}\n",
                    "x".red(),
                    d.agent,
                    d.phase,
                    d.kind,
                    d.reason
                ));
            }
        }

        output.push('\n');
        output.push_str(&Self::format_summary(artifact));
        output
    }

    /// Recommendation and decision only
    pub fn format_summary(artifact: &Artifact) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{}\n{}\n\n",
            "Recommendation:".cyan().bold(),
            artifact.synthesis.recommendation
        ));
        output.push_str(&format!(
            "{} {}  (consensus {:.0}%, weighted {})\n",
            "Decision:".cyan().bold(),
            Self::outcome(artifact.outcome),
            artifact.consensus_rate * 100.0,
            artifact
                .weighted_approval
                .map(|w| format!("{:.2}", w))
                .unwrap_or_else(|| "n/a".to_string())
        ));
        if artifact.requires_human_review {
            output.push_str(&format!("{}\n", "Requires human review".yellow().bold()));
        }
        output
    }

    pub fn format_json(artifact: &Artifact) -> String {
        serde_json::to_string_pretty(artifact)
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }

    pub fn format_agents(agents: &[(AgentDescriptor, f64)]) -> String {
        if agents.is_empty() {
            return "No agents visible.\n".to_string();
        }
        let mut output = String::new();
        for (agent, score) in agents {
            let health = if agent.is_healthy() {
                agent.health.to_string().green()
            } else {
                agent.health.to_string().red()
            };
            output.push_str(&format!(
                "{:<24} {:<10} {:<8} trust {:.2}  {}  {}\n",
                agent.name.bold(),
                agent.target.as_str(),
                agent.visibility,
                score,
                health,
                agent.domain
            ));
        }
        output
    }

    pub fn format_search(hits: &[ArtifactSummary]) -> String {
        if hits.is_empty() {
            return "No matching artifacts.\n".to_string();
        }
        let mut output = String::new();
        for hit in hits {
            output.push_str(&format!(
                "{}  {}  {:<12} score {}  {}\n",
                hit.created_at.format("%Y-%m-%d %H:%M"),
                hit.task_id.to_string().bold(),
                Self::outcome(hit.outcome),
                hit.score,
                Self::truncate(&hit.query, 60)
            ));
        }
        output
    }

    pub fn format_chat(response: &ChatResponse) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n\n", response.answer));
        output.push_str(&format!(
            "{} {}\n",
            "Answered by:".cyan().bold(),
            response.responders.join(", ")
        ));
        if response.escalate {
            let reason = response
                .escalation_reason
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_default();
            output.push_str(&format!(
                "{} {}. Consider `roundtable run` for a full deliberation.\n",
                "Escalate:".yellow().bold(),
                reason
            ));
        }
        output
    }

    fn finding(finding: &MergedFinding) -> String {
        let mut out = format!(
            "  * {} [{}; confidence {:.2}]\n",
            finding.claim,
            finding.supporters.join(", "),
            finding.mean_confidence
        );
        for citation in &finding.citations {
            out.push_str(&format!("      \"{}\"\n", citation.quote.dimmed()));
        }
        if !finding.objected_by.is_empty() {
            out.push_str(&format!(
                "      {} {}\n",
                "objected by".red(),
                finding.objected_by.join(", ")
            ));
        }
        out
    }

    fn outcome(outcome: ConsensusOutcome) -> colored::ColoredString {
        match outcome {
            ConsensusOutcome::Approved => outcome.to_string().green().bold(),
            ConsensusOutcome::Rejected => outcome.to_string().red().bold(),
            ConsensusOutcome::Undetermined => outcome.to_string().yellow().bold(),
        }
    }

    fn truncate(text: &str, max: usize) -> String {
        if text.chars().count() <= max {
            return text.to_string();
        }
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("\n{}\n  {}\n{}\n\n", line, title.bold(), line)
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", format!("── {} ──", title).yellow().bold())
    }
}
