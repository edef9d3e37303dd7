/// Exit codes for schedulers that only look at the process status.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
