pub mod goal_card;
pub mod ops;

pub use goal_card::{patch_goal_card, weekly_goal_plan, PatchReport, DEFAULT_TARGET};
pub use ops::{apply_steps, PatchOp, PatchStep, ReplaceRule, StepOutcome, StepStatus};
