//! Extraction of typed facts from the model's tagged reply.
//!
//! Two passes: locate `<section>...</section>` blocks, then match
//! `Label: 123 unit` lines inside `<nutrients>` against a fixed label table.
//! The parser never fails — a reply that ignores the requested format
//! degrades to zero-valued facts, and the raw text is kept elsewhere for
//! display. A user-facing parse error here would block the whole
//! conversation, so there is deliberately no error path.

use super::{ActivityFacts, MealFacts};

const SECTION_ANALYSIS: &str = "analysis";
const SECTION_NUTRIENTS: &str = "nutrients";

pub fn parse_meal(raw: &str) -> MealFacts {
    let description = section(raw, SECTION_ANALYSIS)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let nutrients = section(raw, SECTION_NUTRIENTS).unwrap_or("");
    MealFacts {
        description,
        calories: labeled_int(nutrients, "calories"),
        protein: labeled_int(nutrients, "protein"),
        fat: labeled_int(nutrients, "fat"),
        carbs: labeled_int(nutrients, "carbs"),
    }
}

pub fn parse_activity(raw: &str) -> ActivityFacts {
    let description = section(raw, SECTION_ANALYSIS)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let nutrients = section(raw, SECTION_NUTRIENTS).unwrap_or("");
    ActivityFacts {
        description,
        calories_burned: labeled_int(nutrients, "burned"),
    }
}

/// Pass 1: slice out the body between `<name>` and `</name>`, case-insensitive
/// on the tag. Missing open or close tag means no section.
fn section<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("<{name}>");
    let close = format!("</{name}>");
    let start = find_ascii_ci(raw, &open)? + open.len();
    let end = start + find_ascii_ci(&raw[start..], &close)?;
    Some(&raw[start..end])
}

/// ASCII-case-insensitive substring search. Tags are ASCII, so matches always
/// land on character boundaries regardless of what surrounds them.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    if haystack.len() < needle.len() {
        return None;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Pass 2: find the first line starting with `label` (case- and
/// whitespace-tolerant) followed by a separator, and take the first integer
/// on that line. Missing label or a line with no digits yields 0.
fn labeled_int(body: &str, label: &str) -> i32 {
    for line in body.lines() {
        let line = line.trim();
        let Some(rest) = strip_label(line, label) else {
            continue;
        };
        return first_int(rest);
    }
    0
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    let rest = &line[label.len()..];
    // Сразу после метки должен идти разделитель: "fat" не матчит "fatigue"
    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() => None,
        _ => Some(rest),
    }
}

fn first_int(s: &str) -> i32 {
    let mut digits = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if !digits.is_empty() {
            break;
        }
    }
    digits.parse().unwrap_or(0)
}
