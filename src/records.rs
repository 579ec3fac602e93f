use serde::{Deserialize, Serialize};

use crate::mappings;

/// One row of the applicants table.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Applicant {
    #[serde(alias = "id")]
    pub applicant_id: i64,
    pub name: String,
}

/// One reference molecule / brand family from the reference products master.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ReferenceProductMaster {
    #[serde(alias = "id")]
    pub ref_product_id: i64,
    pub proprietary_name: String,
}

/// A licensed product, either the 351(a) reference or a 351(k) follow-on.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Product {
    #[serde(alias = "id")]
    pub product_id: i64,
    pub proprietary_name: String,
    #[serde(default)]
    pub applicant_id: Option<i64>,
    #[serde(default, alias = "reference_product")]
    pub ref_product_id: Option<i64>,
    #[serde(default)]
    pub bla_type: Option<String>,
}

impl Product {
    pub fn bla_type(&self) -> &str {
        self.bla_type.as_deref().unwrap_or("")
    }

    pub fn is_reference(&self) -> bool {
        mappings::is_reference_bla(self.bla_type())
    }

    pub fn is_biosimilar_family(&self) -> bool {
        mappings::is_biosimilar_family(self.bla_type())
    }
}

/// One marketed strength / dosage form of a product.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PresentationDetail {
    pub product_id: i64,
    #[serde(default)]
    pub strength: Option<String>,
    #[serde(default)]
    pub presentation_form: Option<String>,
    #[serde(default)]
    pub marketing_status: Option<String>,
    /// Pre-joined label carried by older presentation tables.
    #[serde(default)]
    pub name: Option<String>,
}

impl PresentationDetail {
    /// Column label: "<strength> <form>", trimmed, case preserved.
    /// Falls back to `name` when neither strength nor form is set.
    pub fn label(&self) -> String {
        let strength = self.strength.as_deref().unwrap_or("").trim();
        let form = self.presentation_form.as_deref().unwrap_or("").trim();
        let joined = format!("{} {}", strength, form);
        let joined = joined.trim();
        if !joined.is_empty() {
            return joined.to_string();
        }
        self.name.as_deref().unwrap_or("").trim().to_string()
    }

    pub fn is_discontinued(&self) -> bool {
        mappings::is_discontinued(self.marketing_status.as_deref())
    }
}

/// Immutable copy of the four record sets a market view is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub applicants: Vec<Applicant>,
    pub reference_products: Vec<ReferenceProductMaster>,
    pub products: Vec<Product>,
    pub presentations: Vec<PresentationDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(strength: Option<&str>, form: Option<&str>, name: Option<&str>) -> PresentationDetail {
        PresentationDetail {
            product_id: 1,
            strength: strength.map(str::to_string),
            presentation_form: form.map(str::to_string),
            marketing_status: None,
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn label_joins_strength_and_form() {
        assert_eq!(detail(Some("40mg"), Some("pen"), None).label(), "40mg pen");
        assert_eq!(detail(Some(" 40mg "), Some(" Pen "), None).label(), "40mg Pen");
    }

    #[test]
    fn label_with_one_part_missing() {
        assert_eq!(detail(Some("40mg"), None, None).label(), "40mg");
        assert_eq!(detail(None, Some("vial"), None).label(), "vial");
        assert_eq!(detail(Some("  "), Some(""), None).label(), "");
    }

    #[test]
    fn label_falls_back_to_name() {
        assert_eq!(detail(None, None, Some("80mg/0.8mL syringe")).label(), "80mg/0.8mL syringe");
        assert_eq!(detail(Some("10mg"), None, Some("ignored")).label(), "10mg");
    }

    #[test]
    fn product_accepts_original_column_names() {
        let json = r#"{"id": 7, "proprietary_name": "Hyrimoz", "applicant_id": 3,
                       "reference_product": 1, "bla_type": "351(k) Biosimilar"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.product_id, 7);
        assert_eq!(product.ref_product_id, Some(1));
        assert!(product.is_biosimilar_family());
        assert!(!product.is_reference());
    }

    #[test]
    fn product_with_null_columns() {
        let json = r#"{"product_id": 1, "proprietary_name": "Humira",
                       "ref_product_id": null, "bla_type": null}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.bla_type(), "");
        assert_eq!(product.applicant_id, None);
        assert!(!product.is_biosimilar_family());
    }
}
