use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// A guarded substring rewrite rule
///
/// A line is rewritten only when it contains `marker` and lacks `guard`, so
/// reapplying the rule to its own output is a no-op.
#[derive(Debug, Clone)]
pub struct ReplaceRule {
    pub marker: &'static str,
    pub guard: &'static str,
    pub from: &'static str,
    pub to: &'static str,
}

/// Represents a single patch operation over a line sequence
#[derive(Debug, Clone)]
pub enum PatchOp {
    /// Insert a literal block at a fixed index, clamped to the end of the
    /// sequence
    InsertBlockAt {
        index: usize,
        block: &'static [&'static str],
    },
    /// Replace a substring on the line at a fixed index. No-op when the
    /// substring is absent or the index is beyond the end of the sequence.
    ReplaceAt {
        index: usize,
        from: &'static str,
        to: &'static str,
    },
    /// Apply guarded substring rewrites across every line
    GuardedReplace { rules: Vec<ReplaceRule> },
    /// Insert a single line after an anchor found within a bounded window
    /// below a line whose trimmed content equals `marker`. Skipped when
    /// `guard` already appears inside the window.
    InsertLineInWindow {
        marker: &'static str,
        guard: &'static str,
        anchor: &'static str,
        window: usize,
        line: &'static str,
    },
    /// Insert a literal block after the first line whose trimmed content
    /// equals `close_token`, searched within a bounded window below a line
    /// containing `marker`. Stops after the first insertion.
    InsertBlockAfterClose {
        marker: &'static str,
        close_token: &'static str,
        window: usize,
        block: &'static [&'static str],
    },
}

impl fmt::Display for PatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchOp::InsertBlockAt { index, block } => {
                write!(f, "Insert {} lines at index {}", block.len(), index)
            }
            PatchOp::ReplaceAt { index, from, .. } => {
                write!(f, "Replace '{}' at index {}", from, index)
            }
            PatchOp::GuardedReplace { rules } => {
                write!(f, "Guarded replace with {} rules", rules.len())
            }
            PatchOp::InsertLineInWindow { marker, window, .. } => {
                write!(f, "Insert line within {} lines of '{}'", window, marker)
            }
            PatchOp::InsertBlockAfterClose { marker, window, .. } => {
                write!(f, "Insert block after close within {} lines of '{}'", window, marker)
            }
        }
    }
}

/// Whether a step changed the sequence or was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Applied,
    Skipped,
}

/// Per-step record of what a patch run actually did
///
/// A skipped conditional step is indistinguishable from "already applied" by
/// looking at the output file alone; the note carries the reason instead.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: &'static str,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A named operation within a patch plan
#[derive(Debug, Clone)]
pub struct PatchStep {
    pub name: &'static str,
    pub op: PatchOp,
}

impl PatchOp {
    /// Apply this operation to the line sequence
    pub fn apply(&self, lines: &mut Vec<String>) -> (StepStatus, Option<String>) {
        match self {
            PatchOp::InsertBlockAt { index, block } => {
                let at = (*index).min(lines.len());
                for (offset, line) in block.iter().enumerate() {
                    lines.insert(at + offset, (*line).to_string());
                }
                debug!("Inserted {} lines at index {}", block.len(), at);
                (StepStatus::Applied, None)
            }
            PatchOp::ReplaceAt { index, from, to } => match lines.get_mut(*index) {
                Some(line) if line.contains(from) => {
                    *line = line.replace(from, to);
                    debug!("Replaced '{}' at index {}", from, index);
                    (StepStatus::Applied, None)
                }
                Some(_) => (
                    StepStatus::Skipped,
                    Some(format!("'{}' not present at index {}", from, index)),
                ),
                None => {
                    warn!(
                        "Replacement index {} beyond end of sequence ({} lines)",
                        index,
                        lines.len()
                    );
                    (
                        StepStatus::Skipped,
                        Some(format!("index {} beyond end of sequence", index)),
                    )
                }
            },
            PatchOp::GuardedReplace { rules } => {
                let mut rewritten = 0;
                for line in lines.iter_mut() {
                    for rule in rules {
                        if line.contains(rule.marker) && !line.contains(rule.guard) {
                            *line = line.replace(rule.from, rule.to);
                            rewritten += 1;
                        }
                    }
                }
                if rewritten > 0 {
                    (StepStatus::Applied, Some(format!("{} lines rewritten", rewritten)))
                } else {
                    (StepStatus::Skipped, Some("no matching lines".to_string()))
                }
            }
            PatchOp::InsertLineInWindow {
                marker,
                guard,
                anchor,
                window,
                line,
            } => {
                let at = match lines.iter().position(|l| l.trim() == *marker) {
                    Some(at) => at,
                    None => {
                        return (
                            StepStatus::Skipped,
                            Some(format!("marker '{}' not found", marker)),
                        )
                    }
                };
                let end = (at + 1 + window).min(lines.len());
                if lines[at + 1..end].iter().any(|l| l.contains(guard)) {
                    return (
                        StepStatus::Skipped,
                        Some(format!("'{}' already present near '{}'", guard, marker)),
                    );
                }
                for i in at + 1..end {
                    if lines[i].contains(anchor) {
                        lines.insert(i + 1, (*line).to_string());
                        debug!("Inserted line at index {} after anchor '{}'", i + 1, anchor);
                        return (StepStatus::Applied, None);
                    }
                }
                (
                    StepStatus::Skipped,
                    Some(format!(
                        "anchor '{}' not found within {} lines of '{}'",
                        anchor, window, marker
                    )),
                )
            }
            PatchOp::InsertBlockAfterClose {
                marker,
                close_token,
                window,
                block,
            } => {
                let mut i = 0;
                while i < lines.len() {
                    if lines[i].contains(marker) {
                        let end = (i + 1 + window).min(lines.len());
                        for j in i + 1..end {
                            if lines[j].trim() == *close_token {
                                for (offset, b) in block.iter().enumerate() {
                                    lines.insert(j + 1 + offset, (*b).to_string());
                                }
                                debug!(
                                    "Inserted {} lines after close token at index {}",
                                    block.len(),
                                    j
                                );
                                return (StepStatus::Applied, None);
                            }
                        }
                    }
                    i += 1;
                }
                (
                    StepStatus::Skipped,
                    Some(format!(
                        "no '{}' with '{}' in its window",
                        marker, close_token
                    )),
                )
            }
        }
    }
}

/// Apply a plan in order, collecting one outcome per step
pub fn apply_steps(lines: &mut Vec<String>, steps: &[PatchStep]) -> Vec<StepOutcome> {
    steps
        .iter()
        .map(|step| {
            let (status, note) = step.op.apply(lines);
            match status {
                StepStatus::Applied => debug!("Step '{}' applied", step.name),
                StepStatus::Skipped => warn!(
                    "Step '{}' skipped: {}",
                    step.name,
                    note.as_deref().unwrap_or("no reason recorded")
                ),
            }
            StepOutcome {
                step: step.name,
                status,
                note,
            }
        })
        .collect()
}
