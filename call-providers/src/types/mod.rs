pub mod analysis;
pub mod telephony;
