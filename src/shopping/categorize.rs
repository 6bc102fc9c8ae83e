//! Default grocery categories
//!
//! Used when an item is added to a stored list without a category.

use serde::{Deserialize, Serialize};

/// Grocery store section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Produce,
    Dairy,
    Meat,
    Pantry,
    Frozen,
    Bakery,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Produce => "Produce",
            Category::Dairy => "Dairy",
            Category::Meat => "Meat",
            Category::Pantry => "Pantry",
            Category::Frozen => "Frozen",
            Category::Bakery => "Bakery",
            Category::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const PRODUCE: &[&str] = &[
    "tomato", "tomatoes", "onion", "onions", "garlic", "lettuce", "carrot", "carrots",
    "celery", "bell pepper", "bell peppers", "cucumber", "cucumbers", "zucchini",
    "broccoli", "cauliflower", "spinach", "kale", "cabbage", "potato", "potatoes",
    "sweet potato", "sweet potatoes", "mushroom", "mushrooms", "green beans", "peas",
    "corn", "avocado", "avocados", "ginger", "cilantro", "parsley", "basil", "mint",
    "apple", "apples", "banana", "bananas", "orange", "oranges", "lemon", "lemons",
    "lime", "limes", "strawberries", "blueberries", "grapes", "berries",
];

const DAIRY: &[&str] = &[
    "milk", "butter", "cheese", "cheddar", "mozzarella", "parmesan", "feta", "yogurt",
    "greek yogurt", "cream", "heavy cream", "sour cream", "cream cheese", "cottage cheese",
    "egg", "eggs",
];

const MEAT: &[&str] = &[
    "chicken", "chicken breast", "chicken thighs", "beef", "ground beef", "steak", "pork",
    "bacon", "ham", "sausage", "turkey", "ground turkey", "lamb", "salmon", "tuna", "shrimp",
    "cod", "tilapia", "fish", "tofu",
];

const PANTRY: &[&str] = &[
    "rice", "brown rice", "pasta", "flour", "sugar", "brown sugar", "salt", "pepper",
    "black pepper", "olive oil", "vegetable oil", "coconut oil", "vinegar", "soy sauce",
    "honey", "oats", "rolled oats", "quinoa", "lentils", "chickpeas", "black beans",
    "beans", "peanut butter", "almonds", "walnuts", "baking powder", "baking soda",
    "cinnamon", "paprika", "cumin", "oregano", "chili powder", "stock", "broth",
    "protein powder",
];

const FROZEN: &[&str] = &[
    "frozen peas", "frozen corn", "frozen spinach", "frozen berries", "ice cream",
    "frozen vegetables",
];

const BAKERY: &[&str] = &[
    "bread", "whole wheat bread", "bagel", "bagels", "tortilla", "tortillas", "buns",
    "rolls", "pita", "croissant",
];

/// Map a food name to a grocery category; unknown foods are `Other`.
///
/// Frozen is checked before produce so "frozen peas" does not land with peas.
pub fn categorize_food(name: &str) -> Category {
    let normalized = name.trim().to_lowercase();
    let name = normalized.as_str();

    let tables: [(&[&str], Category); 6] = [
        (FROZEN, Category::Frozen),
        (PRODUCE, Category::Produce),
        (DAIRY, Category::Dairy),
        (MEAT, Category::Meat),
        (PANTRY, Category::Pantry),
        (BAKERY, Category::Bakery),
    ];

    tables
        .iter()
        .find(|(words, _)| words.contains(&name))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_known_foods() {
        assert_eq!(categorize_food("Garlic"), Category::Produce);
        assert_eq!(categorize_food("  greek yogurt "), Category::Dairy);
        assert_eq!(categorize_food("Chicken Breast"), Category::Meat);
        assert_eq!(categorize_food("rolled oats"), Category::Pantry);
        assert_eq!(categorize_food("Bagels"), Category::Bakery);
    }

    #[test]
    fn test_frozen_wins_over_produce() {
        assert_eq!(categorize_food("Frozen Peas"), Category::Frozen);
        assert_eq!(categorize_food("peas"), Category::Produce);
    }

    #[test]
    fn test_unknown_is_other() {
        assert_eq!(categorize_food("dragon fruit jam"), Category::Other);
        assert_eq!(categorize_food(""), Category::Other);
        assert_eq!(Category::Other.to_string(), "Other");
    }
}
