pub(crate) mod analysis;
pub(crate) mod call;
pub(crate) mod company_setting;
pub(crate) mod employee;
pub(crate) mod lead;
pub(crate) mod session;
pub(crate) mod telephony_session;
