pub mod followup;
pub mod lead;
pub mod offer;
pub mod sales_stage;
pub mod stage_entry;
pub mod user;
pub mod user_secret;
