pub const USE_MULTITHREAD: bool = true;

pub const DEFAULT_OUTPUT: &str = "-";

/// Batch source meaning "read standard input".
pub const STDIN_SOURCE: &str = "-";
