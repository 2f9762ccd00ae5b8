/// Reports returned by the report-list endpoint when no limit is given.
pub const DEFAULT_REPORT_LIMIT: usize = 10;

/// Upper bound for any list limit.
pub const MAX_LIST_LIMIT: usize = 200;

/// Reports included in the dashboard's recent list.
pub const DASHBOARD_RECENT_REPORTS: usize = 5;

/// Cards a single generation request may produce.
pub const MIN_GENERATED_CARDS: u32 = 1;
pub const MAX_GENERATED_CARDS: u32 = 20;
pub const DEFAULT_GENERATED_CARDS: u32 = 5;

/// Subjects accepted in one report or planning request.
pub const MAX_SUBJECTS_PER_REQUEST: usize = 40;

/// Report years accepted at ingestion.
pub const MIN_REPORT_YEAR: i32 = 2000;
pub const MAX_REPORT_YEAR: i32 = 2100;

/// Longest OCR text accepted by the extraction endpoint (bytes).
pub const MAX_EXTRACT_TEXT_LEN: usize = 64 * 1024;
