//! Header cleaning for form exports whose header row repeats field groups
//! once per student, e.g. `Seksu (Kanorin 1)`, `Seksu (Kanorin 2)`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("parenthesized annotation pattern is valid"));
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Reduces a raw header cell to its logical field name.
///
/// Keeps only the first line, drops parenthesized annotations and `*`
/// emphasis markers, collapses whitespace runs and trims.
pub fn clean_header(raw: &str) -> String {
    let first_line = raw.split(|c| c == '\n' || c == '\r').next().unwrap_or("");
    let without_notes = PARENTHESIZED.replace_all(first_line, "");
    let without_emphasis = without_notes.replace('*', "");
    WHITESPACE_RUN
        .replace_all(without_emphasis.trim(), " ")
        .into_owned()
}

/// Makes every name unique. The first occurrence keeps its plain name, later
/// ones get `_1`, `_2`, ... in order of appearance.
pub fn dedupe_headers<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut taken: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::new();

    for name in names {
        if taken.insert(name.clone()) {
            out.push(name);
            continue;
        }
        let suffix = next_suffix.entry(name.clone()).or_insert(1);
        let unique = loop {
            let candidate = format!("{}_{}", name, suffix);
            *suffix += 1;
            if !taken.contains(&candidate) {
                break candidate;
            }
        };
        taken.insert(unique.clone());
        out.push(unique);
    }
    out
}

/// Cleans and deduplicates a whole header row, preserving column order.
pub fn clean_headers(raw: &[String]) -> Vec<String> {
    dedupe_headers(raw.iter().map(|h| clean_header(h)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn strips_annotations_and_emphasis() {
        assert_eq!(clean_header("Sex (Student 1)"), "Sex");
        assert_eq!(clean_header("**Naran Eskola**"), "Naran Eskola");
        assert_eq!(clean_header("  Idade  (Kanorin 2) "), "Idade");
        assert_eq!(clean_header("Titulu/Tópiku   Atividade"), "Titulu/Tópiku Atividade");
    }

    #[test]
    fn keeps_only_first_line() {
        assert_eq!(clean_header("Dokumentus\nUpload PDF (max 10MB)"), "Dokumentus");
        assert_eq!(clean_header("Munisipiu\r\nhili ida"), "Munisipiu");
    }

    #[test]
    fn unbalanced_parenthesis_is_left_alone() {
        assert_eq!(clean_header("Level (primary"), "Level (primary");
    }

    #[test]
    fn repeated_names_get_numeric_suffixes() {
        let cleaned = clean_headers(&strings(&[
            "Sex (Student 1)",
            "Sex (Student 2)",
            "Sex (Student 3)",
            "Age",
        ]));
        assert_eq!(cleaned, strings(&["Sex", "Sex_1", "Sex_2", "Age"]));
    }

    #[test]
    fn suffix_skips_names_already_present() {
        let deduped = dedupe_headers(strings(&["Name_1", "Name", "Name"]));
        assert_eq!(deduped, strings(&["Name_1", "Name", "Name_2"]));
    }

    #[test]
    fn blank_headers_stay_distinct() {
        let deduped = dedupe_headers(strings(&["", "", "X"]));
        assert_eq!(deduped, strings(&["", "_1", "X"]));
    }
}
