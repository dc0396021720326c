//! Token records as returned by a resolver.

use serde::{Deserialize, Serialize};

/// A category of token, carrying its display color.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenType {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl TokenType {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// The authoritative record of a token.
///
/// Immutable once obtained; every reference that embeds a record owns its
/// own copy.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl TokenRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, token_type: TokenType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            token_type,
        }
    }

    /// The id of this record's type.
    pub fn type_id(&self) -> &str {
        &self.token_type.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_shape() {
        let json = r##"{
            "id": "t1",
            "name": "Doctor Name",
            "type": { "id": "RP", "name": "Doctor Token", "color": "#0045ff" }
        }"##;

        let record: TokenRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "t1");
        assert_eq!(record.type_id(), "RP");
        assert_eq!(record.token_type.color, "#0045ff");
    }
}
