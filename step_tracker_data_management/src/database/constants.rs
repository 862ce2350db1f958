pub const STEPS_TABLE_NAME: &str = "steps";
pub const ID: &str = "id";
pub const MONTH: &str = "month";
pub const DAY: &str = "day";
pub const STEPS: &str = "steps";
