//! Vehicle fitment: which categories and parts exist for a platform.
//!
//! The store loads rows; these functions decide membership and order. A
//! product belongs to a category when the category id is in its set of
//! category ids.

use std::collections::BTreeSet;
use crate::domain::aggregates::{Category, MainCategory, Platform, Product};
use crate::domain::value_objects::PlatformRef;

pub fn find_platform<'a>(platforms: &'a [Platform], reference: &PlatformRef) -> Option<&'a Platform> {
    platforms.iter().find(|p| match reference {
        PlatformRef::Id(id) => p.id == *id,
        PlatformRef::Slug(slug) => p.slug.eq_ignore_ascii_case(slug),
    })
}

/// Platforms a given vehicle belongs to, by name.
pub fn platforms_for_vehicle<'a>(platforms: &'a [Platform], make: &str, model: &str, year: i32) -> Vec<&'a Platform> {
    let mut matches: Vec<&Platform> = platforms.iter().filter(|p| p.matches_vehicle(make, model, year)).collect();
    matches.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    matches
}

/// Categories with at least one displayed product for the platform, ordered by name.
pub fn categories_for_platform<'a>(platform: &Platform, categories: &'a [Category], products: &[Product]) -> Vec<&'a Category> {
    let stocked: BTreeSet<i64> = products.iter()
        .filter(|p| p.fits(platform.id))
        .flat_map(|p| p.category_ids.iter())
        .collect();
    let mut found: Vec<&Category> = categories.iter().filter(|c| stocked.contains(&c.id)).collect();
    found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    found
}

/// Main categories that own at least one of the platform's stocked categories, ordered by name.
pub fn main_categories_for_platform<'a>(
    platform: &Platform,
    main_categories: &'a [MainCategory],
    categories: &[Category],
    products: &[Product],
) -> Vec<&'a MainCategory> {
    let owners: BTreeSet<i64> = categories_for_platform(platform, categories, products)
        .into_iter()
        .map(|c| c.main_category_id)
        .collect();
    let mut found: Vec<&MainCategory> = main_categories.iter().filter(|m| owners.contains(&m.id)).collect();
    found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    found
}

/// Displayed products for the platform, optionally limited to one category, ordered by name.
pub fn products_for_platform<'a>(platform: &Platform, category_id: Option<i64>, products: &'a [Product]) -> Vec<&'a Product> {
    let mut found: Vec<&Product> = products.iter()
        .filter(|p| p.fits(platform.id))
        .filter(|p| category_id.map_or(true, |id| p.is_in_category(id)))
        .collect();
    found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{CategoryIds, Money};
    use rust_decimal_macros::dec;

    fn platform(id: i64, name: &str, slug: &str, years: (i32, i32)) -> Platform {
        Platform { id, name: name.into(), make: "Ford".into(), model: "Mustang".into(), start_year: years.0, end_year: years.1, slug: slug.into() }
    }

    fn product(id: i64, name: &str, platform_id: i64, cats: &str, display: bool) -> Product {
        Product { id, part_number: format!("P{id}"), name: name.into(), price: Money::usd(dec!(100)), platform_id: Some(platform_id), category_ids: CategoryIds::parse(cats), display }
    }

    fn category(id: i64, main: i64, name: &str) -> Category {
        Category { id, main_category_id: main, name: name.into(), slug: name.to_lowercase() }
    }

    fn fixture() -> (Vec<Platform>, Vec<MainCategory>, Vec<Category>, Vec<Product>) {
        let platforms = vec![platform(1, "S197 Mustang", "s197", (2005, 2014)), platform(2, "S550 Mustang", "s550", (2015, 2023))];
        let mains = vec![
            MainCategory { id: 10, name: "Suspension".into(), slug: "suspension".into() },
            MainCategory { id: 20, name: "Chassis".into(), slug: "chassis".into() },
            MainCategory { id: 30, name: "Brakes".into(), slug: "brakes".into() },
        ];
        let categories = vec![
            category(1, 10, "Springs"), category(2, 10, "Coilovers"), category(12, 20, "Subframe Connectors"),
            category(13, 20, "Torque Boxes"), category(30, 30, "Calipers"),
        ];
        let products = vec![
            product(100, "Lowering Springs", 1, "1", true),
            product(101, "Street Coilovers", 1, "2,12", true),
            product(102, "Hidden Torque Box", 1, "13", false),
            product(103, "Big Brake Kit", 2, "30", true),
            product(104, "Adjustable Coilovers", 1, "2", true),
        ];
        (platforms, mains, categories, products)
    }

    #[test]
    fn test_find_platform_by_id_or_slug() {
        let (platforms, ..) = fixture();
        assert_eq!(find_platform(&platforms, &PlatformRef::Id(2)).map(|p| p.id), Some(2));
        assert_eq!(find_platform(&platforms, &PlatformRef::Slug("S197".into())).map(|p| p.id), Some(1));
        assert!(find_platform(&platforms, &PlatformRef::Slug("fox".into())).is_none());
    }

    #[test]
    fn test_categories_use_set_membership_and_skip_hidden() {
        let (platforms, _, categories, products) = fixture();
        let names: Vec<&str> = categories_for_platform(&platforms[0], &categories, &products).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Coilovers", "Springs", "Subframe Connectors"]);
    }

    #[test]
    fn test_main_categories_for_platform() {
        let (platforms, mains, categories, products) = fixture();
        let names: Vec<&str> = main_categories_for_platform(&platforms[0], &mains, &categories, &products).iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Chassis", "Suspension"]);
        let names: Vec<&str> = main_categories_for_platform(&platforms[1], &mains, &categories, &products).iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Brakes"]);
    }

    #[test]
    fn test_products_filtered_and_ordered_by_name() {
        let (platforms, _, _, products) = fixture();
        let ids: Vec<i64> = products_for_platform(&platforms[0], Some(2), &products).iter().map(|p| p.id).collect();
        assert_eq!(ids, [104, 101]);
        let ids: Vec<i64> = products_for_platform(&platforms[0], None, &products).iter().map(|p| p.id).collect();
        assert_eq!(ids, [104, 100, 101]);
        assert!(products_for_platform(&platforms[1], Some(2), &products).is_empty());
    }

    #[test]
    fn test_vehicle_lookup() {
        let (platforms, ..) = fixture();
        let found: Vec<i64> = platforms_for_vehicle(&platforms, "ford", "mustang", 2015).iter().map(|p| p.id).collect();
        assert_eq!(found, [2]);
        assert!(platforms_for_vehicle(&platforms, "Ford", "Mustang", 1999).is_empty());
    }
}
