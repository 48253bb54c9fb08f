//! The closed vocabulary of dish names the estimator lands on.
//!
//! Three static tables live here: the canonical names (also used as the
//! zero-shot candidate labels), the default portion weights, and the alias
//! table consumed by the label normalizer.

pub mod aliases;
pub mod normalize;

use std::collections::HashMap;

use once_cell::sync::Lazy;

pub use normalize::normalize_label;

/// Grams reported for any name missing from the grams table.
pub const FALLBACK_GRAMS: u32 = 100;

/// Name used when no model produced a usable label.
pub const FALLBACK_DISH: &str = "Meal";

/// Canonical dish names, in the order they are offered to the zero-shot model.
pub const CANDIDATES: &[&str] = &[
    // US breakfast / diner staples
    "Oatmeal",
    "Porridge",
    "Yogurt Parfait",
    "Acai Bowl",
    "Smoothie Bowl",
    "Avocado Toast",
    "Grilled Cheese",
    "Chicken Wrap",
    "Beef Wrap",
    "Veggie Wrap",
    "Chicken & Rice",
    "Beef & Rice",
    "Rice (cooked)",
    "Chicken Breast",
    "Beef Steak",
    "Omelette",
    "Egg",
    "Scrambled Eggs",
    "Caesar Salad",
    "Greek Salad",
    "Garden Salad",
    "Pasta",
    "Spaghetti",
    "Mac and Cheese",
    "Burger",
    "Sandwich",
    "Turkey Sandwich",
    "Ham Sandwich",
    "Club Sandwich",
    "Taco",
    "Burrito",
    "Quesadilla",
    "Fries",
    "Soup",
    "Sushi",
    "Steak",
    "Pizza",
    "Pepperoni Pizza",
    "Cheese Pizza",
    "Bagel with Cream Cheese",
    "Peanut Butter Toast",
    "Granola with Milk",
    "Cereal with Milk",
    // Bowls
    "Chicken Bowl",
    "Beef Bowl",
    "Veggie Bowl",
    // Indian basics
    "Biryani",
    "Dosa",
    "Idli",
    "Poori",
    "Paratha",
    "Roti",
    "Dal",
    "Paneer",
    "Samosa",
    "Masala Dosa",
    "Chicken Curry",
    "Mutton Curry",
    "Fish Curry",
    "Veg Curry",
    "Chole",
    "Rajma",
    "Upma",
    "Vada",
    "Pav Bhaji",
    "Poha",
    "Kheer",
    "Gulab Jamun",
    "Curd (yogurt)",
];

const DEFAULT_GRAMS: &[(&str, u32)] = &[
    ("Oatmeal", 100),
    ("Porridge", 250),
    ("Yogurt Parfait", 200),
    ("Acai Bowl", 300),
    ("Smoothie Bowl", 300),
    ("Avocado Toast", 120),
    ("Grilled Cheese", 170),
    ("Chicken Wrap", 250),
    ("Beef Wrap", 260),
    ("Veggie Wrap", 240),
    ("Chicken & Rice", 100),
    ("Beef & Rice", 100),
    ("Rice (cooked)", 180),
    ("Chicken Breast", 150),
    ("Beef Steak", 180),
    ("Omelette", 140),
    ("Egg", 50),
    ("Scrambled Eggs", 150),
    ("Caesar Salad", 220),
    ("Greek Salad", 220),
    ("Garden Salad", 220),
    ("Pasta", 220),
    ("Spaghetti", 220),
    ("Mac and Cheese", 250),
    ("Burger", 180),
    ("Sandwich", 160),
    ("Turkey Sandwich", 170),
    ("Ham Sandwich", 170),
    ("Club Sandwich", 220),
    ("Taco", 120),
    ("Burrito", 250),
    ("Quesadilla", 220),
    ("Fries", 150),
    ("Soup", 300),
    ("Sushi", 200),
    ("Steak", 200),
    ("Pizza", 120),
    ("Pepperoni Pizza", 130),
    ("Cheese Pizza", 120),
    ("Bagel with Cream Cheese", 120),
    ("Peanut Butter Toast", 100),
    ("Granola with Milk", 200),
    ("Cereal with Milk", 200),
    ("Chicken Bowl", 100),
    ("Beef Bowl", 100),
    ("Veggie Bowl", 100),
    ("Biryani", 100),
    ("Dosa", 120),
    ("Idli", 50),
    ("Poori", 60),
    ("Paratha", 80),
    ("Roti", 50),
    ("Dal", 180),
    ("Paneer", 120),
    ("Samosa", 80),
    ("Masala Dosa", 140),
    ("Chicken Curry", 220),
    ("Mutton Curry", 220),
    ("Fish Curry", 220),
    ("Veg Curry", 220),
    ("Chole", 220),
    ("Rajma", 220),
    ("Upma", 200),
    ("Vada", 90),
    ("Pav Bhaji", 220),
    ("Poha", 160),
    ("Kheer", 150),
    ("Gulab Jamun", 70),
    ("Curd (yogurt)", 100),
];

static GRAMS_TABLE: Lazy<HashMap<&'static str, u32>> =
    Lazy::new(|| DEFAULT_GRAMS.iter().copied().collect());

/// Default portion weight for a dish, falling back to [`FALLBACK_GRAMS`].
pub fn default_grams(name: &str) -> u32 {
    GRAMS_TABLE.get(name).copied().unwrap_or(FALLBACK_GRAMS)
}

/// Whether `name` belongs to the canonical vocabulary.
pub fn is_canonical(name: &str) -> bool {
    CANDIDATES.contains(&name)
}
