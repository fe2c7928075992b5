/// Reserved reply text meaning "send nothing". The router treats a payload
/// whose text equals this token exactly like an empty payload.
pub const SILENT_REPLY_TOKEN: &str = "SILENT_REPLY";
