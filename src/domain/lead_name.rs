#[derive(Debug, Clone)]
pub struct LeadName(String);

impl LeadName {
    /// Returns an instance of `LeadName` if the input is not blank. The value is kept exactly as
    /// submitted, surrounding whitespace included.
    pub fn parse(s: String) -> Result<LeadName, String> {
        // `.trim()` returns a view over the input `s` without trailing whitespace-like characters.
        // `.is_empty` checks if the view contains any character.
        if s.trim().is_empty() {
            Err("A lead name cannot be empty.".to_string())
        } else {
            Ok(Self(s))
        }
    }
}

/// The caller gets a shared reference to the inner string. This gives the caller **read-only**
/// access, they have no way to compromise our invariants!
impl AsRef<str> for LeadName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LeadName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
