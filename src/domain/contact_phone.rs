#[derive(Debug, Clone)]
pub struct ContactPhone(String);

impl ContactPhone {
    pub fn parse(s: String) -> Result<ContactPhone, String> {
        if s.trim().is_empty() {
            Err("A contact phone cannot be empty.".to_string())
        } else {
            Ok(Self(s))
        }
    }
}

impl AsRef<str> for ContactPhone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
