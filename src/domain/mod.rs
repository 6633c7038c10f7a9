mod contact_phone;
mod lead_email;
mod lead_name;
mod new_lead;
mod new_proposal;

pub use contact_phone::ContactPhone;
pub use lead_email::LeadEmail;
pub use lead_name::LeadName;
pub use new_lead::{NewLead, LEAD_MAGNET_RESOURCE};
pub use new_proposal::NewProposal;
