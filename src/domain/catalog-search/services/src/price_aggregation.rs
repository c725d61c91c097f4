// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;

use catalog_search::AggregatedPrice;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Sums prices sharing the same (currency, price type) and rounds every sum
/// once to `precision` decimal places. Output is ordered by currency, then by
/// price type.
pub fn merge_aggregated_prices(
    prices: impl IntoIterator<Item = AggregatedPrice>,
    precision: u32,
) -> Vec<AggregatedPrice> {
    let mut sums: BTreeMap<(String, String), (f64, u64)> = BTreeMap::new();

    for price in prices {
        let entry = sums
            .entry((price.currency, price.price_type_code))
            .or_insert((0.0, 0));
        entry.0 += price.price;
        entry.1 += price.products_count;
    }

    sums.into_iter()
        .map(
            |((currency, price_type_code), (price, products_count))| AggregatedPrice {
                currency,
                price_type_code,
                price: round_to(price, precision),
                products_count,
            },
        )
        .collect()
}

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(precision).unwrap_or(i32::MAX));
    (value * factor).round() / factor
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////


////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
