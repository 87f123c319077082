use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::error::PatchResult;
use crate::patch::ops::{apply_steps, PatchOp, PatchStep, ReplaceRule, StepOutcome, StepStatus};
use crate::utils::fs;

/// Default target file, resolved against the working directory
pub const DEFAULT_TARGET: &str = "WeeklyGoal.tsx";

/// Index the close-button block is spliced in at, just inside the goal
/// modal's content view
const CLOSE_BUTTON_INDEX: usize = 177;

/// Index of the empty-state header emoji line, before any insertion
const HEADER_STYLE_INDEX: usize = 187;

const CLOSE_BUTTON_BLOCK: &[&str] = &[
    "              <TouchableOpacity",
    "                style={styles.closeButton}",
    "                onPress={() => setShowModal(false)}",
    "                accessibilityRole=\"button\"",
    "                accessibilityLabel=\"닫기\"",
    "              >",
    "                <Text style={[styles.closeButtonText, { color: colors.textSecondary }]}>✕</Text>",
    "              </TouchableOpacity>",
];

const CLOSE_BUTTON_STYLES: &[&str] = &[
    "  closeButton: {",
    "    position: 'absolute',",
    "    top: 12 * scale,",
    "    right: 12 * scale,",
    "    padding: 8 * scale,",
    "  },",
    "  closeButtonText: {",
    "    fontWeight: '600',",
    "  },",
];

/// The five-step plan applied to the weekly goal card source
///
/// The first two steps address lines by position and assume the file still
/// matches the shipped revision; the remaining three anchor on content
/// markers and skip themselves once applied.
pub fn weekly_goal_plan() -> Vec<PatchStep> {
    vec![
        PatchStep {
            name: "close-button",
            op: PatchOp::InsertBlockAt {
                index: CLOSE_BUTTON_INDEX,
                block: CLOSE_BUTTON_BLOCK,
            },
        },
        PatchStep {
            name: "header-margin",
            op: PatchOp::ReplaceAt {
                // shifted by the block inserted above
                index: HEADER_STYLE_INDEX + CLOSE_BUTTON_BLOCK.len(),
                from: "marginBottom: 12 * scale }",
                to: "marginBottom: 12 * scale, marginTop: 8 * scale }",
            },
        },
        PatchStep {
            name: "flex-shrink",
            op: PatchOp::GuardedReplace {
                rules: vec![
                    ReplaceRule {
                        marker: "targetLabel: {",
                        guard: "flexShrink",
                        from: "targetLabel: {",
                        to: "targetLabel: { flexShrink: 0,",
                    },
                    ReplaceRule {
                        marker: "targetUnit: {",
                        guard: "flexShrink",
                        from: "targetUnit: {",
                        to: "targetUnit: { flexShrink: 0,",
                    },
                ],
            },
        },
        PatchStep {
            name: "flex-wrap",
            op: PatchOp::InsertLineInWindow {
                marker: "targetRow: {",
                guard: "flexWrap",
                anchor: "marginBottom",
                window: 5,
                line: "    flexWrap: 'nowrap',",
            },
        },
        PatchStep {
            name: "close-button-styles",
            op: PatchOp::InsertBlockAfterClose {
                marker: "modalCloseText: {",
                close_token: "},",
                window: 10,
                block: CLOSE_BUTTON_STYLES,
            },
        },
    ]
}

/// Report for one patch run
#[derive(Debug, Serialize)]
pub struct PatchReport {
    pub target: String,
    pub outcomes: Vec<StepOutcome>,
}

impl PatchReport {
    pub fn applied_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == StepStatus::Applied)
            .count()
    }
}

/// Read the target file, apply the weekly goal plan, and overwrite the
/// target in place
///
/// Fails without touching the file when it cannot be read; conditional
/// steps whose markers are missing are recorded as skipped, not errors.
pub fn patch_goal_card(path: impl AsRef<Path>) -> PatchResult<PatchReport> {
    let path = path.as_ref();

    let mut seq = fs::read_lines(path)?;
    debug!("Read {} lines from {}", seq.lines.len(), path.display());

    let outcomes = apply_steps(&mut seq.lines, &weekly_goal_plan());

    fs::write_lines(path, &seq)?;

    let report = PatchReport {
        target: path.display().to_string(),
        outcomes,
    };
    info!(
        "Patched {} ({} of {} steps applied)",
        path.display(),
        report.applied_count(),
        report.outcomes.len()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::tempdir;

    const HEADER_LINE: &str = "          <TwemojiImage emoji=\"🎯\" size={48 * scale} style={{ marginBottom: 12 * scale }} />";

    /// A file matching every index and marker assumption of the plan
    fn goal_card_fixture() -> String {
        let mut lines: Vec<String> = (0..188).map(|i| format!("// line {}", i)).collect();
        lines[187] = HEADER_LINE.to_string();
        for style_line in [
            "  targetRow: {",
            "    flexDirection: 'row',",
            "    alignItems: 'center',",
            "    marginBottom: 12 * scale,",
            "  },",
            "  targetLabel: {",
            "    fontWeight: '500',",
            "  },",
            "  targetUnit: {",
            "    marginLeft: 8 * scale,",
            "  },",
            "  modalCloseText: {",
            "    fontWeight: '500',",
            "  },",
            "});",
        ] {
            lines.push(style_line.to_string());
        }
        lines.join("\n") + "\n"
    }

    /// A 200-line file holding only the fixed-index assumptions
    fn index_only_fixture() -> String {
        let mut lines: Vec<String> = (0..200).map(|i| format!("// line {}", i)).collect();
        lines[187] = HEADER_LINE.to_string();
        lines.join("\n") + "\n"
    }

    fn write_fixture(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("WeeklyGoal.tsx");
        std_fs::write(&path, content).unwrap();
        path
    }

    fn count_occurrences(content: &str, needle: &str) -> usize {
        content.matches(needle).count()
    }

    #[test]
    fn test_known_good_input_applies_every_step() {
        let dir = tempdir().unwrap();
        let path = write_fixture(&dir, &goal_card_fixture());

        let report = patch_goal_card(&path).unwrap();
        assert_eq!(report.outcomes.len(), 5);
        assert_eq!(report.applied_count(), 5);

        let content = std_fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        // Close-button block at the fixed position
        assert_eq!(lines[CLOSE_BUTTON_INDEX].trim(), "<TouchableOpacity");
        // Header line picked up the marginTop addition at its shifted index
        let header = lines[HEADER_STYLE_INDEX + CLOSE_BUTTON_BLOCK.len()];
        assert!(header.contains("marginBottom: 12 * scale"));
        assert!(header.contains("marginTop: 8 * scale"));
        // Both style rules picked up flexShrink
        assert!(content.contains("targetLabel: { flexShrink: 0,"));
        assert!(content.contains("targetUnit: { flexShrink: 0,"));
        // flexWrap sits directly under targetRow's marginBottom
        let row = lines.iter().position(|l| l.trim() == "targetRow: {").unwrap();
        let margin = (row..row + 6)
            .find(|&i| lines[i].contains("marginBottom"))
            .unwrap();
        assert_eq!(lines[margin + 1].trim(), "flexWrap: 'nowrap',");
        // New style rules follow modalCloseText's closing brace
        let close_text = lines
            .iter()
            .position(|l| l.contains("modalCloseText: {"))
            .unwrap();
        assert_eq!(lines[close_text + 3].trim(), "closeButton: {");
        assert!(content.contains("closeButtonText: {"));
    }

    #[test]
    fn test_second_run_is_only_partially_idempotent() {
        let dir = tempdir().unwrap();
        let path = write_fixture(&dir, &goal_card_fixture());

        patch_goal_card(&path).unwrap();
        let first = std_fs::read_to_string(&path).unwrap();

        let report = patch_goal_card(&path).unwrap();
        let second = std_fs::read_to_string(&path).unwrap();

        // Guarded steps hold
        assert_eq!(count_occurrences(&second, "flexShrink: 0"), 2);
        assert_eq!(count_occurrences(&second, "flexWrap: 'nowrap'"), 1);
        // Unguarded steps re-apply
        assert_eq!(count_occurrences(&first, "<TouchableOpacity"), 1);
        assert_eq!(count_occurrences(&second, "<TouchableOpacity"), 2);
        assert_eq!(count_occurrences(&second, "closeButton: {"), 2);
        // The shifted fixed-index replacement no longer finds its substring
        let header_margin = report
            .outcomes
            .iter()
            .find(|o| o.step == "header-margin")
            .unwrap();
        assert_eq!(header_margin.status, StepStatus::Skipped);
    }

    #[test]
    fn test_missing_markers_leave_conditional_steps_untouched() {
        let dir = tempdir().unwrap();
        let path = write_fixture(&dir, &index_only_fixture());

        let report = patch_goal_card(&path).unwrap();
        for step in ["flex-shrink", "flex-wrap", "close-button-styles"] {
            let outcome = report.outcomes.iter().find(|o| o.step == step).unwrap();
            assert_eq!(outcome.status, StepStatus::Skipped, "step {}", step);
        }

        // Output must be exactly the input plus steps 1-2
        let mut expected: Vec<String> = index_only_fixture().lines().map(str::to_string).collect();
        for (offset, line) in CLOSE_BUTTON_BLOCK.iter().enumerate() {
            expected.insert(CLOSE_BUTTON_INDEX + offset, (*line).to_string());
        }
        let header = HEADER_STYLE_INDEX + CLOSE_BUTTON_BLOCK.len();
        expected[header] = expected[header].replace(
            "marginBottom: 12 * scale }",
            "marginBottom: 12 * scale, marginTop: 8 * scale }",
        );
        assert_eq!(
            std_fs::read_to_string(&path).unwrap(),
            expected.join("\n") + "\n"
        );
    }

    #[test]
    fn test_missing_file_fails_without_creating_one() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("WeeklyGoal.tsx");

        assert!(patch_goal_card(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_grown_output_and_shifted_header() {
        let dir = tempdir().unwrap();
        let path = write_fixture(&dir, &index_only_fixture());

        patch_goal_card(&path).unwrap();

        let content = std_fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines.len() >= 201);
        let header = lines[HEADER_STYLE_INDEX + CLOSE_BUTTON_BLOCK.len()];
        assert!(header.contains("marginBottom: 12 * scale"));
        assert!(header.contains("marginTop: 8 * scale"));
    }

    #[test]
    fn test_report_serializes_with_one_entry_per_step() {
        let dir = tempdir().unwrap();
        let path = write_fixture(&dir, &index_only_fixture());

        let report = patch_goal_card(&path).unwrap();
        let value = serde_json::to_value(&report).unwrap();

        let outcomes = value["outcomes"].as_array().unwrap();
        assert_eq!(outcomes.len(), 5);
        assert_eq!(outcomes[0]["step"], "close-button");
        assert_eq!(outcomes[0]["status"], "applied");
        assert_eq!(outcomes[2]["status"], "skipped");
        assert!(outcomes[2]["note"].is_string());
    }
}
