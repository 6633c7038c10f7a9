/// The address a lead asked us to write to. Only presence is checked here: the relay is the
/// authority on what it accepts.
#[derive(Debug, Clone)]
pub struct LeadEmail(String);

impl LeadEmail {
    pub fn parse(s: String) -> Result<LeadEmail, String> {
        if s.trim().is_empty() {
            Err("A lead email cannot be empty.".to_string())
        } else {
            Ok(Self(s))
        }
    }
}

impl AsRef<str> for LeadEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LeadEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
