//! Raw classifier label → canonical dish name.
//!
//! Resolution order, first match wins:
//! 1. exact alias lookup on the trimmed, lowercased label
//! 2. ordered substring rules ([`RULES`])
//! 3. title-cased copy of the label
//!
//! Step 3 can emit names outside the vocabulary. Those still get a portion
//! weight through the grams fallback.

use super::aliases;

/// One substring heuristic: if `matches` accepts the lowercased label, the
/// label resolves to `dish`.
pub struct Rule {
    pub dish: &'static str,
    pub matches: fn(&str) -> bool,
}

/// Substring rules in priority order.
///
/// Order is significant: rice combos must win over the single-ingredient
/// "rice" and "chicken" rules, and the pizza variants over plain pizza.
pub static RULES: &[Rule] = &[
    Rule {
        dish: "Oatmeal",
        matches: |s| s.contains("oat") || s.contains("porridge"),
    },
    Rule {
        dish: "Avocado Toast",
        matches: |s| s.contains("avocado") && s.contains("toast"),
    },
    Rule {
        dish: "Grilled Cheese",
        matches: |s| s.contains("grilled") && s.contains("cheese"),
    },
    Rule {
        dish: "Chicken Wrap",
        matches: |s| s.contains("wrap") && s.contains("chicken"),
    },
    Rule {
        dish: "Beef Wrap",
        matches: |s| s.contains("wrap") && s.contains("beef"),
    },
    Rule {
        dish: "Veggie Wrap",
        matches: |s| s.contains("wrap") && (s.contains("veg") || s.contains("veget")),
    },
    Rule {
        dish: "Chicken & Rice",
        matches: |s| s.contains("chicken") && s.contains("rice"),
    },
    Rule {
        dish: "Beef & Rice",
        matches: |s| s.contains("beef") && s.contains("rice"),
    },
    Rule {
        dish: "Rice (cooked)",
        matches: |s| s.contains("rice"),
    },
    Rule {
        dish: "Chicken Breast",
        matches: |s| s.contains("chicken") && !s.contains("curry"),
    },
    Rule {
        dish: "Yogurt Parfait",
        matches: |s| s.contains("yogurt") && s.contains("parfait"),
    },
    Rule {
        dish: "Acai Bowl",
        matches: |s| s.contains("bowl") && s.contains("acai"),
    },
    Rule {
        dish: "Smoothie Bowl",
        matches: |s| s.contains("bowl") && s.contains("smoothie"),
    },
    Rule {
        dish: "Caesar Salad",
        matches: |s| s.contains("caesar") && s.contains("salad"),
    },
    Rule {
        dish: "Greek Salad",
        matches: |s| s.contains("greek") && s.contains("salad"),
    },
    Rule {
        dish: "Garden Salad",
        matches: |s| s.contains("salad"),
    },
    Rule {
        dish: "Spaghetti",
        matches: |s| s.contains("spaghetti"),
    },
    Rule {
        dish: "Mac and Cheese",
        matches: |s| s.contains("mac") && s.contains("cheese"),
    },
    Rule {
        dish: "Quesadilla",
        matches: |s| s.contains("quesadilla"),
    },
    Rule {
        dish: "Taco",
        matches: |s| s.contains("taco"),
    },
    Rule {
        dish: "Burrito",
        matches: |s| s.contains("burrito"),
    },
    Rule {
        dish: "Pepperoni Pizza",
        matches: |s| s.contains("pizza") && s.contains("pepperoni"),
    },
    Rule {
        dish: "Cheese Pizza",
        matches: |s| s.contains("pizza") && s.contains("cheese"),
    },
    Rule {
        dish: "Pizza",
        matches: |s| s.contains("pizza"),
    },
];

/// Map a raw label to one canonical dish name.
///
/// Case and surrounding whitespace are ignored. An empty label yields an
/// empty string, which callers treat as "no usable label".
pub fn normalize_label(raw: &str) -> String {
    let key = raw.trim().to_lowercase();

    if let Some(name) = aliases::lookup(&key) {
        return name.to_string();
    }

    if let Some(rule) = RULES.iter().find(|rule| (rule.matches)(&key)) {
        return rule.dish.to_string();
    }

    title_case(&key)
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
///
/// `"chicken_tikka masala"` becomes `"Chicken_Tikka Masala"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
