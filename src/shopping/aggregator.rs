//! Shopping list aggregation
//!
//! Folds a flat list of ingredient lines into one consolidated line per
//! (food, standardized measure) within each category.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::units::standardize;

/// One line of a shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub food: String,
    pub quantity: f64,
    pub measure: String,
    pub category: String,
    #[serde(default)]
    pub checked: bool,
}

/// Items of one category, in first-seen order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub items: Vec<ShoppingItem>,
}

/// Aggregated shopping list, grouped by category.
///
/// Categories keep the order in which they were first seen. Serializes as a
/// JSON object `{ category: [items...] }` in that same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedShoppingList {
    groups: Vec<CategoryGroup>,
}

impl GroupedShoppingList {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Total number of merged lines across all categories
    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    pub fn get(&self, category: &str) -> Option<&[ShoppingItem]> {
        self.groups
            .iter()
            .find(|g| g.category == category)
            .map(|g| g.items.as_slice())
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.category.as_str())
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<CategoryGroup> {
        self.groups
    }
}

impl Serialize for GroupedShoppingList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.category, &group.items)?;
        }
        map.end()
    }
}

/// Aggregate shopping items by category.
///
/// Two items merge when their category matches exactly, their food matches
/// case-insensitively and their standardized measures are identical. The
/// merged line keeps the first-seen item's `food` casing and `checked` flag;
/// its quantity is the sum of every contributor's standardized quantity.
pub fn aggregate(items: &[ShoppingItem]) -> GroupedShoppingList {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();
    // (category, lowercased food, standardized measure) -> (group, position)
    let mut line_index: HashMap<(&str, String, String), (usize, usize)> = HashMap::new();

    for item in items {
        let standard = standardize(item.quantity, &item.measure);
        let key = (
            item.category.as_str(),
            item.food.to_lowercase(),
            standard.measure.clone(),
        );

        if let Some(&(g, i)) = line_index.get(&key) {
            groups[g].items[i].quantity += standard.quantity;
            continue;
        }

        let g = *group_index.entry(item.category.as_str()).or_insert_with(|| {
            groups.push(CategoryGroup {
                category: item.category.clone(),
                items: Vec::new(),
            });
            groups.len() - 1
        });

        groups[g].items.push(ShoppingItem {
            food: item.food.clone(),
            quantity: standard.quantity,
            measure: standard.measure,
            category: item.category.clone(),
            checked: item.checked,
        });
        line_index.insert(key, (g, groups[g].items.len() - 1));
    }

    tracing::debug!(
        input = items.len(),
        categories = groups.len(),
        "aggregated shopping items"
    );

    GroupedShoppingList { groups }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(food: &str, quantity: f64, measure: &str, category: &str, checked: bool) -> ShoppingItem {
        ShoppingItem {
            food: food.to_string(),
            quantity,
            measure: measure.to_string(),
            category: category.to_string(),
            checked,
        }
    }

    #[test]
    fn test_merges_case_insensitive_food_with_same_standard_unit() {
        let items = vec![
            item("Garlic", 2.0, "cloves", "Produce", false),
            item("garlic", 3.0, "clove", "Produce", true),
        ];

        let grouped = aggregate(&items);
        let produce = grouped.get("Produce").unwrap();

        assert_eq!(produce.len(), 1);
        assert_eq!(produce[0].food, "Garlic");
        assert_eq!(produce[0].quantity, 5.0);
        assert_eq!(produce[0].measure, "pieces");
        assert!(!produce[0].checked);
    }

    #[test]
    fn test_no_cross_category_merge() {
        let items = vec![
            item("Rice", 500.0, "g", "Produce", false),
            item("Rice", 500.0, "g", "Pantry", false),
        ];

        let grouped = aggregate(&items);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped.get("Produce").unwrap().len(), 1);
        assert_eq!(grouped.get("Pantry").unwrap().len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let grouped = aggregate(&[]);
        assert!(grouped.is_empty());
        assert_eq!(grouped.item_count(), 0);
    }

    #[test]
    fn test_first_seen_order() {
        let items = vec![
            item("Milk", 1.0, "cup", "Dairy", false),
            item("Onion", 1.0, "whole", "Produce", false),
            item("Butter", 100.0, "g", "Dairy", false),
            item("milk", 1.0, "cups", "Dairy", false),
            item("Carrot", 2.0, "piece", "Produce", false),
        ];

        let grouped = aggregate(&items);

        let categories: Vec<&str> = grouped.categories().collect();
        assert_eq!(categories, vec!["Dairy", "Produce"]);

        let dairy: Vec<&str> = grouped.get("Dairy").unwrap().iter().map(|i| i.food.as_str()).collect();
        assert_eq!(dairy, vec!["Milk", "Butter"]);

        let produce: Vec<&str> = grouped.get("Produce").unwrap().iter().map(|i| i.food.as_str()).collect();
        assert_eq!(produce, vec!["Onion", "Carrot"]);
    }

    #[test]
    fn test_different_standard_units_stay_separate() {
        // 200 g stays grams, 3 lb crosses into kg
        let items = vec![
            item("Chicken", 200.0, "g", "Meat", false),
            item("chicken", 3.0, "lb", "Meat", false),
            item("Chicken", 1.0, "whole", "Meat", false),
        ];

        let grouped = aggregate(&items);
        let meat = grouped.get("Meat").unwrap();

        assert_eq!(meat.len(), 3);
        assert_eq!(meat[0].measure, "g");
        assert_eq!(meat[1].measure, "kg");
        assert_eq!(meat[1].quantity, 1.36);
        assert_eq!(meat[2].measure, "pieces");
    }

    #[test]
    fn test_sums_standardized_quantities_without_rerounding() {
        // 600 g + 600 g: each contributor is under 1 kg so both land in "g"
        let items = vec![
            item("Flour", 600.0, "g", "Pantry", false),
            item("Flour", 600.0, "grams", "Pantry", false),
        ];

        let grouped = aggregate(&items);
        let pantry = grouped.get("Pantry").unwrap();

        assert_eq!(pantry.len(), 1);
        assert_eq!(pantry[0].quantity, 1200.0);
        assert_eq!(pantry[0].measure, "g");
    }

    #[test]
    fn test_negative_quantities_net_out() {
        let items = vec![
            item("Eggs", 6.0, "pieces", "Dairy", false),
            item("eggs", -2.0, "piece", "Dairy", false),
        ];

        let grouped = aggregate(&items);
        assert_eq!(grouped.get("Dairy").unwrap()[0].quantity, 4.0);
    }

    #[test]
    fn test_empty_category_and_food_are_grouping_values() {
        let items = vec![
            item("", 1.0, "pinch", "", false),
            item("", 2.0, "pinch", "", false),
        ];

        let grouped = aggregate(&items);
        let uncategorized = grouped.get("").unwrap();
        assert_eq!(uncategorized.len(), 1);
        assert_eq!(uncategorized[0].quantity, 3.0);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let items = vec![item("Garlic", 2.6, "cloves", "Produce", true)];
        let before = items.clone();

        let _ = aggregate(&items);

        assert_eq!(items, before);
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let items = vec![
            item("Tomato", 2.0, "whole", "Produce", false),
            item("Yogurt", 500.0, "g", "Dairy", true),
        ];

        let json = serde_json::to_string(&aggregate(&items)).unwrap();

        let produce_at = json.find("\"Produce\"").unwrap();
        let dairy_at = json.find("\"Dairy\"").unwrap();
        assert!(produce_at < dairy_at);
        assert!(json.starts_with("{\"Produce\":[{\"food\":\"Tomato\""));
    }
}
