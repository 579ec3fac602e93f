use serde::Serialize;

pub const BLA_REFERENCE: &str = "351(a)";
pub const BLA_BIOSIMILAR: &str = "351(k) Biosimilar";
pub const BLA_INTERCHANGEABLE: &str = "351(k) Interchangeable";

/// Placeholder shown when a product's applicant is unknown.
pub const APPLICANT_PLACEHOLDER: &str = "N/A";

/// Status of one product at one presentation column.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CellStatus {
    #[serde(rename = "R")]
    Reference,
    #[serde(rename = "B")]
    Biosimilar,
    #[serde(rename = "I")]
    Interchangeable,
    #[serde(rename = "D")]
    Discontinued,
    #[default]
    #[serde(rename = "")]
    Empty,
}

impl CellStatus {
    pub const LEGEND: [CellStatus; 4] = [
        CellStatus::Reference,
        CellStatus::Biosimilar,
        CellStatus::Interchangeable,
        CellStatus::Discontinued,
    ];

    pub fn code(self) -> &'static str {
        match self {
            CellStatus::Reference => "R",
            CellStatus::Biosimilar => "B",
            CellStatus::Interchangeable => "I",
            CellStatus::Discontinued => "D",
            CellStatus::Empty => "",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CellStatus::Reference => "Reference Product",
            CellStatus::Biosimilar => "Biosimilar",
            CellStatus::Interchangeable => "Interchangeable",
            CellStatus::Discontinued => "Discontinued",
            CellStatus::Empty => "",
        }
    }

    pub fn is_empty(self) -> bool {
        self == CellStatus::Empty
    }
}

pub fn is_reference_bla(bla_type: &str) -> bool {
    bla_type.trim() == BLA_REFERENCE
}

/// 351(k) pathway: biosimilar or interchangeable.
pub fn is_biosimilar_family(bla_type: &str) -> bool {
    bla_type.contains(BLA_BIOSIMILAR) || bla_type.contains(BLA_INTERCHANGEABLE)
}

/// Marketing status: "Disc" / "Discontinued" → discontinued, anything else is marketed
pub fn is_discontinued(marketing_status: Option<&str>) -> bool {
    matches!(
        marketing_status.map(str::trim),
        Some("Disc") | Some("Discontinued")
    )
}

/// Classify one matched presentation. Discontinuation wins over the BLA type.
pub fn classify(bla_type: &str, marketing_status: Option<&str>) -> CellStatus {
    if is_discontinued(marketing_status) {
        CellStatus::Discontinued
    } else if is_reference_bla(bla_type) {
        CellStatus::Reference
    } else if bla_type.contains(BLA_INTERCHANGEABLE) {
        CellStatus::Interchangeable
    } else if bla_type.contains(BLA_BIOSIMILAR) {
        CellStatus::Biosimilar
    } else {
        CellStatus::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discontinued_overrides_reference() {
        assert_eq!(classify("351(a)", Some("Disc")), CellStatus::Discontinued);
        assert_eq!(classify("351(a)", Some("Discontinued")), CellStatus::Discontinued);
        assert_eq!(classify("351(a)", Some("Rx")), CellStatus::Reference);
        assert_eq!(classify("351(a)", None), CellStatus::Reference);
    }

    #[test]
    fn interchangeable_before_biosimilar() {
        assert_eq!(
            classify("351(k) Interchangeable", Some("Active")),
            CellStatus::Interchangeable
        );
        assert_eq!(
            classify("351(k) Biosimilar; 351(k) Interchangeable", None),
            CellStatus::Interchangeable
        );
        assert_eq!(classify("351(k) Biosimilar", None), CellStatus::Biosimilar);
    }

    #[test]
    fn unknown_bla_type_is_blank() {
        assert_eq!(classify("505(b)(2)", Some("Rx")), CellStatus::Empty);
        assert_eq!(classify("", None), CellStatus::Empty);
        assert_eq!(classify("", Some("Disc")), CellStatus::Discontinued);
    }

    #[test]
    fn only_exact_discontinued_tokens() {
        assert!(is_discontinued(Some(" Disc ")));
        assert!(!is_discontinued(Some("disc")));
        assert!(!is_discontinued(Some("Discontinued soon")));
        assert!(!is_discontinued(None));
    }

    #[test]
    fn status_serializes_as_code() {
        let json = serde_json::to_string(&CellStatus::LEGEND).unwrap();
        assert_eq!(json, r#"["R","B","I","D"]"#);
        assert_eq!(serde_json::to_string(&CellStatus::Empty).unwrap(), r#""""#);
    }
}
