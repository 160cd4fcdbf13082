//! Plain-text rendering for terminal output.

use sopindex_core::{Answer, DocumentRecord};

const RULE: &str = "------------------------------------------------------------";

/// Numbered evidence listing with scores and full text.
pub fn render_evidence(records: &[DocumentRecord]) -> String {
    let mut out = String::new();
    for (i, rec) in records.iter().enumerate() {
        out.push_str(RULE);
        out.push('\n');
        out.push_str(&format!("[{}] {}\n", i + 1, rec.label()));
        if let Some(score) = rec.score {
            out.push_str(&format!("score = {score:.4}\n"));
        }
        out.push_str(rec.text.trim());
        out.push('\n');
    }
    out
}

/// Answer text followed by the SOP revisions it was grounded on.
pub fn render_answer(answer: &Answer) -> String {
    let mut out = format!(
        "Retrieved {} candidates, {} after version resolution (latest revision per SOP)\n\n",
        answer.candidates_considered,
        answer.evidence.len()
    );
    out.push_str(&answer.text);
    out.push('\n');
    if !answer.evidence.is_empty() {
        out.push_str("\nEvidence:\n");
        for rec in &answer.evidence {
            let score = rec.score.map(|s| format!("{s:.4}")).unwrap_or_default();
            out.push_str(&format!("  - {} [{}]\n", rec.label(), score));
        }
    }
    out
}
