use std::collections::HashSet;

use crate::error::MarketError;
use crate::records::{Product, ReferenceProductMaster};

/// Names of the reference products that have at least one biosimilar or
/// interchangeable product pointing at them, sorted and distinct.
pub fn market_tiles(products: &[Product], masters: &[ReferenceProductMaster]) -> Vec<String> {
    let referenced: HashSet<i64> = products
        .iter()
        .filter(|p| p.is_biosimilar_family())
        .filter_map(|p| p.ref_product_id)
        .collect();

    let mut tiles: Vec<String> = masters
        .iter()
        .filter(|m| referenced.contains(&m.ref_product_id))
        .map(|m| m.proprietary_name.clone())
        .collect();
    tiles.sort();
    tiles.dedup();

    tracing::debug!(tiles = tiles.len(), "derived market tiles");
    tiles
}

/// Products making up one market: the reference product first, then the
/// related 351(k) products in source order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketProducts<'a> {
    ref_product_ids: Vec<i64>,
    products: Vec<&'a Product>,
}

impl<'a> MarketProducts<'a> {
    /// Master ids carrying the market's name; usually exactly one.
    pub fn ref_product_ids(&self) -> &[i64] {
        &self.ref_product_ids
    }

    pub fn products(&self) -> &[&'a Product] {
        &self.products
    }

    pub fn reference(&self) -> &'a Product {
        self.products[0]
    }

    pub fn related(&self) -> &[&'a Product] {
        &self.products[1..]
    }
}

/// Find the master rows, the 351(a) product and the 351(k) products of a market.
///
/// Several master rows may share a proprietary name; the related products are
/// gathered from all of them, matching how [`market_tiles`] groups by name.
pub fn resolve_market<'a>(
    market: &str,
    products: &'a [Product],
    masters: &'a [ReferenceProductMaster],
) -> Result<MarketProducts<'a>, MarketError> {
    let mut ref_product_ids: Vec<i64> = masters
        .iter()
        .filter(|m| m.proprietary_name == market)
        .map(|m| m.ref_product_id)
        .collect();
    ref_product_ids.sort_unstable();
    ref_product_ids.dedup();
    if ref_product_ids.is_empty() {
        return Err(MarketError::NotFound {
            market: market.to_string(),
            entity: "reference product master",
        });
    }
    if ref_product_ids.len() > 1 {
        tracing::debug!(
            market,
            masters = ref_product_ids.len(),
            "market name shared by several masters"
        );
    }

    let reference = products
        .iter()
        .find(|p| p.proprietary_name == market && p.is_reference())
        .ok_or_else(|| MarketError::NotFound {
            market: market.to_string(),
            entity: "351(a) reference product",
        })?;

    let mut resolved = vec![reference];
    resolved.extend(products.iter().filter(|p| {
        p.ref_product_id
            .is_some_and(|id| ref_product_ids.binary_search(&id).is_ok())
            && p.product_id != reference.product_id
            && p.is_biosimilar_family()
    }));

    tracing::debug!(
        market,
        related = resolved.len() - 1,
        "resolved market products"
    );
    Ok(MarketProducts {
        ref_product_ids,
        products: resolved,
    })
}
