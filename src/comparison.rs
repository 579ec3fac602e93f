use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::MarketError;
use crate::mappings::{self, CellStatus};
use crate::markets;
use crate::records::{Applicant, PresentationDetail, Product, ReferenceProductMaster, Snapshot};

/// What to do with several products sharing one proprietary name.
///
/// A group holding the market's 351(a) product always keeps it as the lead,
/// whatever the policy, so the reference row shows reference cells.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep the first product seen, drop the rest.
    #[default]
    FirstSeen,
    /// Keep the last product seen.
    LastSeen,
    /// One row; each column takes the first product that has the presentation.
    Merge,
}

/// Ordering of the non-reference rows.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NameOrder {
    #[default]
    CaseInsensitive,
    Ordinal,
}

impl NameOrder {
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            NameOrder::CaseInsensitive => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            NameOrder::Ordinal => a.cmp(b),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ViewOptions {
    pub duplicates: DuplicatePolicy,
    pub name_order: NameOrder,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub is_reference: bool,
    pub proprietary_name: String,
    pub applicant_name: String,
    /// Status per header label; `Empty` where the product lacks the presentation.
    pub presentation_status: BTreeMap<String, CellStatus>,
}

impl Row {
    pub fn status(&self, header: &str) -> CellStatus {
        self.presentation_status
            .get(header)
            .copied()
            .unwrap_or_default()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    pub market: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl TableModel {
    pub fn row(&self, proprietary_name: &str) -> Option<&Row> {
        self.rows
            .iter()
            .find(|r| r.proprietary_name == proprietary_name)
    }

    pub fn reference_row(&self) -> Option<&Row> {
        self.rows.first().filter(|r| r.is_reference)
    }
}

/// Build the comparison table of one market from the four record sets.
pub fn build_market_view(
    market: &str,
    applicants: &[Applicant],
    masters: &[ReferenceProductMaster],
    products: &[Product],
    presentations: &[PresentationDetail],
    options: &ViewOptions,
) -> Result<TableModel, MarketError> {
    let resolved = markets::resolve_market(market, products, masters)?;
    let headers = derive_headers(market, resolved.products(), presentations)?;
    let rows = build_rows(
        resolved.products(),
        applicants,
        presentations,
        &headers,
        options.duplicates,
    );
    Ok(assemble_table(market, headers, rows, options.name_order))
}

impl Snapshot {
    pub fn market_tiles(&self) -> Vec<String> {
        markets::market_tiles(&self.products, &self.reference_products)
    }

    pub fn market_view(&self, market: &str, options: &ViewOptions) -> Result<TableModel, MarketError> {
        build_market_view(
            market,
            &self.applicants,
            &self.reference_products,
            &self.products,
            &self.presentations,
            options,
        )
    }
}

/// Sorted, distinct, non-empty presentation labels across all resolved products.
pub fn derive_headers(
    market: &str,
    products: &[&Product],
    presentations: &[PresentationDetail],
) -> Result<Vec<String>, MarketError> {
    let ids: HashSet<i64> = products.iter().map(|p| p.product_id).collect();

    let mut matched = 0usize;
    let mut labels = BTreeSet::new();
    for detail in presentations.iter().filter(|d| ids.contains(&d.product_id)) {
        matched += 1;
        let label = detail.label();
        if !label.is_empty() {
            labels.insert(label);
        }
    }

    if matched == 0 {
        return Err(MarketError::NoPresentations {
            market: market.to_string(),
        });
    }
    Ok(labels.into_iter().collect())
}

/// One row per proprietary name, in first-seen order.
pub fn build_rows(
    products: &[&Product],
    applicants: &[Applicant],
    presentations: &[PresentationDetail],
    headers: &[String],
    policy: DuplicatePolicy,
) -> Vec<Row> {
    let mut applicant_names: HashMap<i64, &str> = HashMap::new();
    for applicant in applicants {
        applicant_names
            .entry(applicant.applicant_id)
            .or_insert(applicant.name.as_str());
    }

    let mut details_by_product: HashMap<i64, Vec<(String, &PresentationDetail)>> = HashMap::new();
    for detail in presentations {
        details_by_product
            .entry(detail.product_id)
            .or_default()
            .push((detail.label(), detail));
    }

    let mut groups: Vec<(&str, Vec<&Product>)> = Vec::new();
    for &product in products {
        match groups
            .iter_mut()
            .find(|(name, _)| *name == product.proprietary_name)
        {
            Some((_, members)) => members.push(product),
            None => groups.push((product.proprietary_name.as_str(), vec![product])),
        }
    }

    groups
        .into_iter()
        .map(|(name, members)| {
            let is_reference = members.iter().any(|p| p.is_reference());
            let members = if members.len() > 1 {
                collapse_duplicates(name, members, policy)
            } else {
                members
            };
            build_row(
                name,
                is_reference,
                &members,
                &applicant_names,
                &details_by_product,
                headers,
            )
        })
        .collect()
}

fn collapse_duplicates<'a>(
    name: &str,
    members: Vec<&'a Product>,
    policy: DuplicatePolicy,
) -> Vec<&'a Product> {
    tracing::debug!(
        name,
        products = members.len(),
        ?policy,
        "several products share a proprietary name"
    );
    let reference = members.iter().copied().find(|p| p.is_reference());
    match policy {
        DuplicatePolicy::FirstSeen => reference.or(members.first().copied()).into_iter().collect(),
        DuplicatePolicy::LastSeen => reference.or(members.last().copied()).into_iter().collect(),
        DuplicatePolicy::Merge => {
            let mut members = members;
            members.sort_by_key(|p| !p.is_reference());
            members
        }
    }
}

fn build_row(
    name: &str,
    is_reference: bool,
    members: &[&Product],
    applicant_names: &HashMap<i64, &str>,
    details_by_product: &HashMap<i64, Vec<(String, &PresentationDetail)>>,
    headers: &[String],
) -> Row {
    let lead = members[0];
    let applicant_name = lead
        .applicant_id
        .and_then(|id| applicant_names.get(&id).copied())
        .unwrap_or(mappings::APPLICANT_PLACEHOLDER)
        .to_string();

    let presentation_status = headers
        .iter()
        .map(|header| {
            let status = members
                .iter()
                .find_map(|product| {
                    details_by_product
                        .get(&product.product_id)?
                        .iter()
                        .find(|(label, _)| label == header)
                        .map(|(_, detail)| {
                            mappings::classify(
                                product.bla_type(),
                                detail.marketing_status.as_deref(),
                            )
                        })
                })
                .unwrap_or_default();
            (header.clone(), status)
        })
        .collect();

    Row {
        is_reference,
        proprietary_name: name.to_string(),
        applicant_name,
        presentation_status,
    }
}

/// Reference rows first in their given order, then the rest by name.
pub fn assemble_table(
    market: &str,
    headers: Vec<String>,
    mut rows: Vec<Row>,
    order: NameOrder,
) -> TableModel {
    rows.sort_by(|a, b| match (a.is_reference, b.is_reference) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => order.compare(&a.proprietary_name, &b.proprietary_name),
    });
    TableModel {
        market: market.to_string(),
        headers,
        rows,
    }
}
