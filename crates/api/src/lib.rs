//! Domain services for the Propline CRM: the sales-progression ledger,
//! the offer sub-ledger, lead intake, follow-ups, and login.

pub mod auth;
pub mod error;
pub mod followups;
pub mod leads;
pub mod offers;
pub mod progression;
pub mod seed;
