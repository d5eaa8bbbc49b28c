//! Lead records

use serde::{Deserialize, Deserializer, Serialize};

/// Contact details submitted through the lead form
///
/// Every field is optional and unvalidated; an all-null submission is
/// still a lead. Any JSON scalar is accepted and kept as text, so a phone
/// number sent as a number reads as its digits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLead {
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub email: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
}

fn scalar_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Text(s) => s,
        Scalar::Int(n) => n.to_string(),
        Scalar::Uint(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}

impl NewLead {
    pub fn new(
        name: Option<impl Into<String>>,
        phone: Option<impl Into<String>>,
        email: Option<impl Into<String>>,
    ) -> Self {
        Self {
            name: name.map(Into::into),
            phone: phone.map(Into::into),
            email: email.map(Into::into),
        }
    }
}

/// A stored lead
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Auto-incremented row id
    pub id: i64,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Storage timestamp, as recorded by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Lead {
    pub fn from_new(id: i64, lead: NewLead, created_at: Option<String>) -> Self {
        Self {
            id,
            name: lead.name,
            phone: lead.phone,
            email: lead.email,
            created_at,
        }
    }

    /// Field value or a dash, for plain-text rendering
    pub fn display_field(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_lead_accepts_missing_fields() {
        let lead: NewLead = serde_json::from_str("{}").unwrap();
        assert_eq!(lead, NewLead::default());

        let lead: NewLead =
            serde_json::from_str(r#"{"name": null, "phone": "9876543210"}"#).unwrap();
        assert!(lead.name.is_none());
        assert_eq!(lead.phone.as_deref(), Some("9876543210"));
        assert!(lead.email.is_none());
    }

    #[test]
    fn test_new_lead_keeps_scalars_as_text() {
        let lead: NewLead = serde_json::from_str(
            r#"{"name": "Asha", "phone": 9876543210, "email": null}"#,
        )
        .unwrap();
        assert_eq!(lead.name.as_deref(), Some("Asha"));
        assert_eq!(lead.phone.as_deref(), Some("9876543210"));
        assert!(lead.email.is_none());

        let lead: NewLead = serde_json::from_str(r#"{"name": true, "phone": 98.5}"#).unwrap();
        assert_eq!(lead.name.as_deref(), Some("true"));
        assert_eq!(lead.phone.as_deref(), Some("98.5"));

        // Objects are not contact details
        assert!(serde_json::from_str::<NewLead>(r#"{"name": {"first": "Asha"}}"#).is_err());
    }

    #[test]
    fn test_lead_from_new() {
        let lead = Lead::from_new(7, NewLead::new(Some("Asha"), None::<String>, None::<String>), None);
        assert_eq!(lead.id, 7);
        assert_eq!(lead.name.as_deref(), Some("Asha"));
        assert_eq!(Lead::display_field(&lead.email), "-");
    }
}
