//! Known raw model labels with a fixed canonical mapping.
//!
//! Keys are lowercase and matched exactly after trimming.

use std::collections::HashMap;

use once_cell::sync::Lazy;

const ALIASES: &[(&str, &str)] = &[
    // Oatmeal / porridge variants
    ("oatmeal", "Oatmeal"),
    ("porridge", "Oatmeal"),
    ("oats", "Oatmeal"),
    ("oat porridge", "Oatmeal"),
    ("banana oatmeal", "Oatmeal"),
    ("blueberry oatmeal", "Oatmeal"),
    // Eggs
    ("omelet", "Omelette"),
    ("omelette", "Omelette"),
    ("scrambled egg", "Scrambled Eggs"),
    ("scrambled eggs", "Scrambled Eggs"),
    ("fried egg", "Egg"),
    ("boiled egg", "Egg"),
    ("egg", "Egg"),
    // Toasts / sandwiches
    ("avocado toast", "Avocado Toast"),
    ("smashed avocado toast", "Avocado Toast"),
    ("grilled_cheese_sandwich", "Grilled Cheese"),
    ("grilled cheese", "Grilled Cheese"),
    ("peanut butter toast", "Peanut Butter Toast"),
    ("bagel with cream cheese", "Bagel with Cream Cheese"),
    ("turkey sandwich", "Turkey Sandwich"),
    ("ham sandwich", "Ham Sandwich"),
    ("club sandwich", "Club Sandwich"),
    ("sandwich", "Sandwich"),
    // Bowls
    ("acai bowl", "Acai Bowl"),
    ("açaí bowl", "Acai Bowl"),
    ("smoothie bowl", "Smoothie Bowl"),
    ("chicken bowl", "Chicken Bowl"),
    ("beef bowl", "Beef Bowl"),
    ("veggie bowl", "Veggie Bowl"),
    // Wraps
    ("chicken wrap", "Chicken Wrap"),
    ("chicken caesar wrap", "Chicken Wrap"),
    ("beef wrap", "Beef Wrap"),
    ("veggie wrap", "Veggie Wrap"),
    ("turkey wrap", "Turkey Sandwich"),
    // Rice combos
    ("chicken rice", "Chicken & Rice"),
    ("chicken and rice", "Chicken & Rice"),
    ("rice and chicken", "Chicken & Rice"),
    ("beef rice", "Beef & Rice"),
    ("beef and rice", "Beef & Rice"),
    ("rice and beef", "Beef & Rice"),
    ("white rice", "Rice (cooked)"),
    ("steamed rice", "Rice (cooked)"),
    ("fried rice", "Rice (cooked)"),
    // Meats
    ("chicken breast", "Chicken Breast"),
    ("grilled chicken", "Chicken Breast"),
    ("butter chicken", "Chicken Curry"),
    ("steak", "Steak"),
    ("beef steak", "Beef Steak"),
    // Salads
    ("caesar salad", "Caesar Salad"),
    ("greek salad", "Greek Salad"),
    ("garden salad", "Garden Salad"),
    ("house salad", "Garden Salad"),
    // Pasta
    ("spaghetti", "Spaghetti"),
    ("macaroni and cheese", "Mac and Cheese"),
    ("mac & cheese", "Mac and Cheese"),
    // Pizza
    ("pepperoni pizza", "Pepperoni Pizza"),
    ("cheese pizza", "Cheese Pizza"),
    ("pizza", "Pizza"),
    // Tex-Mex
    ("taco", "Taco"),
    ("burrito", "Burrito"),
    ("quesadilla", "Quesadilla"),
    // Cereals
    ("granola with milk", "Granola with Milk"),
    ("cereal with milk", "Cereal with Milk"),
    ("cereal", "Cereal with Milk"),
    // Indian
    ("curd", "Curd (yogurt)"),
    ("yoghurt", "Curd (yogurt)"),
    ("naan", "Roti"),
    ("chapati", "Roti"),
    ("phulka", "Roti"),
    ("chicken curry", "Chicken Curry"),
    ("veg curry", "Veg Curry"),
];

static ALIAS_TABLE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| ALIASES.iter().copied().collect());

/// Look up an already trimmed, lowercased label.
pub fn lookup(key: &str) -> Option<&'static str> {
    ALIAS_TABLE.get(key).copied()
}

/// All (alias, canonical name) pairs in declaration order.
pub fn all() -> &'static [(&'static str, &'static str)] {
    ALIASES
}
