use crate::domain::{ContactPhone, LeadEmail, LeadName};

#[derive(Debug)]
pub struct NewProposal {
    pub name: LeadName,
    pub email: LeadEmail,
    pub phone: ContactPhone,
    pub company: String,
    pub message: String,
}
