/// The three fields every lead must fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Phone,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Phone, Field::Message];
}

/// Raw input snapshot taken at submit time. Values are validated and trimmed
/// here; nothing outlives the submission attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub name: String,
    pub phone: String,
    pub message: String,
}

/// Trimmed, validated field values ready for payload assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLead {
    pub name: String,
    pub phone: String,
    pub message: String,
}

impl FormFields {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Phone => &self.phone,
            Field::Message => &self.message,
        }
    }

    /// Check every field; on success return the trimmed values, otherwise the
    /// list of failing fields in display order.
    pub fn validate(&self) -> Result<ValidatedLead, Vec<Field>> {
        let invalid: Vec<Field> = Field::ALL
            .into_iter()
            .filter(|field| !field_is_valid(*field, self.value(*field)))
            .collect();
        if !invalid.is_empty() {
            return Err(invalid);
        }
        Ok(ValidatedLead {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            message: self.message.trim().to_string(),
        })
    }
}

/// A field is valid when it is non-empty after trimming; the phone field must
/// additionally strip down to exactly 10 digits.
pub fn field_is_valid(field: Field, raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    match field {
        Field::Phone => normalize_phone(trimmed).len() == 10,
        Field::Name | Field::Message => true,
    }
}

/// Strip everything but ASCII digits.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Progressive `(555) 123-4567` display formatting, applied as the visitor
/// types. Input past 10 digits is dropped.
pub fn format_phone(raw: &str) -> String {
    let digits: String = normalize_phone(raw).chars().take(10).collect();
    match digits.len() {
        0 => String::new(),
        1..=3 => format!("({digits}"),
        4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
        _ => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}
