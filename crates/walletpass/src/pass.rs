//! Store-card pass descriptions.
//!
//! A convenience builder for the JSON document that becomes
//! `pass.json`. The pipeline does not depend on it (any
//! `serde_json::Value` works), but most loyalty-card passes are this
//! exact shape. Field names follow the wallet platform's camelCase
//! schema.

use serde::Serialize;

/// One display field (points balance, member name, ...).
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub key: String,
    pub label: String,
    pub value: String,
}

impl Field {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Field groups of a store card.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCard {
    pub primary_fields: Vec<Field>,
    pub secondary_fields: Vec<Field>,
    pub auxiliary_fields: Vec<Field>,
    pub back_fields: Vec<Field>,
}

/// A store-card pass description.
///
/// Unset optional keys are omitted from the serialized document rather
/// than emitted as null, matching what the platform expects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCardPass {
    pub description: String,
    pub format_version: u32,
    pub organization_name: String,
    pub pass_type_identifier: String,
    pub serial_number: String,
    pub team_identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_text: Option<String>,
    pub foreground_color: String,
    pub background_color: String,
    pub label_color: String,
    pub store_card: StoreCard,
}

impl StoreCardPass {
    /// A minimal valid store card; colors default to white-on-black.
    pub fn new(
        description: impl Into<String>,
        organization_name: impl Into<String>,
        pass_type_identifier: impl Into<String>,
        serial_number: impl Into<String>,
        team_identifier: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            format_version: 1,
            organization_name: organization_name.into(),
            pass_type_identifier: pass_type_identifier.into(),
            serial_number: serial_number.into(),
            team_identifier: team_identifier.into(),
            logo_text: None,
            foreground_color: "#FFFFFF".into(),
            background_color: "#000000".into(),
            label_color: "#FFFFFF".into(),
            store_card: StoreCard::default(),
        }
    }

    pub fn with_logo_text(mut self, logo_text: impl Into<String>) -> Self {
        self.logo_text = Some(logo_text.into());
        self
    }

    pub fn with_colors(
        mut self,
        foreground: impl Into<String>,
        background: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.foreground_color = foreground.into();
        self.background_color = background.into();
        self.label_color = label.into();
        self
    }

    pub fn with_primary_field(mut self, field: Field) -> Self {
        self.store_card.primary_fields.push(field);
        self
    }

    pub fn with_secondary_field(mut self, field: Field) -> Self {
        self.store_card.secondary_fields.push(field);
        self
    }

    pub fn with_auxiliary_field(mut self, field: Field) -> Self {
        self.store_card.auxiliary_fields.push(field);
        self
    }

    pub fn with_back_field(mut self, field: Field) -> Self {
        self.store_card.back_fields.push(field);
        self
    }

    /// The opaque description the pipeline consumes.
    pub fn to_value(&self) -> serde_json::Value {
        // Serialization of a plain struct cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StoreCardPass {
        StoreCardPass::new(
            "Loyalty Card",
            "Example Store",
            "pass.com.example.loyalty",
            "ABC123",
            "TEAM123",
        )
    }

    #[test]
    fn minimal_pass_has_platform_keys() {
        let value = sample().to_value();
        assert_eq!(value["formatVersion"], 1);
        assert_eq!(value["passTypeIdentifier"], "pass.com.example.loyalty");
        assert_eq!(value["serialNumber"], "ABC123");
        assert_eq!(value["teamIdentifier"], "TEAM123");
        assert!(value["storeCard"].is_object());
    }

    #[test]
    fn unset_logo_text_is_omitted_not_null() {
        let value = sample().to_value();
        assert!(value.get("logoText").is_none());

        let value = sample().with_logo_text("My Store").to_value();
        assert_eq!(value["logoText"], "My Store");
    }

    #[test]
    fn colors_and_fields_round_trip() {
        let value = sample()
            .with_colors("rgb(255,255,255)", "rgb(255,0,0)", "rgb(255,255,255)")
            .with_primary_field(Field::new("points", "Points", "100"))
            .to_value();

        assert_eq!(value["backgroundColor"], "rgb(255,0,0)");
        assert_eq!(value["storeCard"]["primaryFields"][0]["key"], "points");
    }
}
