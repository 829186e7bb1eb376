pub mod enrich;
pub mod format_id;
pub mod rules;
