pub mod clip;
pub mod identifier;

pub use clip::{CLIP_RULES_VERSION, LevelRule, infer_clip_level};
pub use identifier::parse_equipment_identifier;
