use crate::domain::{LeadEmail, LeadName};

/// Label of the lead magnet every lead in this service asked for.
pub const LEAD_MAGNET_RESOURCE: &str = "Guia NR-1";

/// A lead that passed validation and can be stored. Name and email are guaranteed non-blank by
/// their types; `company` is free text and may be empty.
#[derive(Debug)]
pub struct NewLead {
    pub name: LeadName,
    pub email: LeadEmail,
    pub company: String,
}

impl NewLead {
    pub fn resource(&self) -> &'static str {
        LEAD_MAGNET_RESOURCE
    }
}
