// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

const ELLIPSIS: char = '…';

/// Trimmed, lower-cased form of a search term.
pub fn normalize_term(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Case-insensitive substring match of an already normalized term against
/// any of the given fields. An empty term matches everything.
pub fn matches_any<'a>(fields: impl IntoIterator<Item = &'a str>, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(term))
}

/// Indices into `items` that pass `predicate` for the normalized `term`, in
/// original order. An empty term keeps every index without consulting the
/// predicate.
pub fn filter_indices<T>(
    items: &[T],
    term: &str,
    predicate: impl Fn(&T, &str) -> bool,
) -> Vec<usize> {
    if term.is_empty() {
        return (0..items.len()).collect();
    }
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| predicate(item, term))
        .map(|(index, _)| index)
        .collect()
}

/// Cut `value` to `max_chars` characters, appending an ellipsis when anything
/// was removed.
pub fn truncate_text(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{truncated}{ELLIPSIS}")
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::{filter_indices, matches_any, normalize_term, truncate_text};

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_term("  Casa A "), "casa a");
        assert_eq!(normalize_term("   "), "");
    }

    #[test]
    fn matches_any_is_substring_and_case_insensitive() {
        assert!(matches_any(["Casa Azul", "Lima"], "casa a"));
        assert!(matches_any(["Casa Azul", "Lima"], "lim"));
        assert!(!matches_any(["Casa Azul", "Lima"], "cusco"));
        assert!(matches_any(Vec::<&str>::new(), ""));
    }

    #[test]
    fn filter_indices_preserves_order() {
        let items = ["beta", "alpha", "alphabet", "gamma"];
        let kept = filter_indices(&items, "alpha", |item, term| item.contains(term));
        assert_eq!(kept, vec![1, 2]);
    }

    #[test]
    fn empty_term_skips_predicate() {
        let items = [1, 2, 3];
        let kept = filter_indices(&items, "", |_, _| false);
        assert_eq!(kept, vec![0, 1, 2]);
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_text("Juan Pérez", 6), "Juan P…");
        assert_eq!(truncate_text("Pérez", 5), "Pérez");
        assert_eq!(truncate_text("", 3), "");
    }
}
