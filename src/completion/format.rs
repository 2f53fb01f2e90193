use std::collections::HashSet;

/// Longest prefix shared by every candidate, compared char by char.
///
/// For display only; it is never used as a replacement length.
pub fn common_prefix(candidates: &[String]) -> String {
    let Some((first, rest)) = candidates.split_first() else {
        return String::new();
    };
    let mut prefix: &str = first;
    for candidate in rest {
        let shared: usize = prefix
            .chars()
            .zip(candidate.chars())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.len_utf8())
            .sum();
        prefix = &prefix[..shared];
        if prefix.is_empty() {
            break;
        }
    }
    prefix.to_string()
}

/// Drops repeated items, keeping the first occurrence of each.
pub fn remove_duplicates(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Lays candidates out in rows of equal-width columns fitting `max_width`.
///
/// Every cell is left-aligned and padded to the widest candidate plus two.
/// At least one column is used however narrow `max_width` is.
pub fn format_completions(candidates: &[String], max_width: usize) -> Vec<String> {
    match candidates {
        [] => return Vec::new(),
        [single] => return vec![single.clone()],
        _ => {}
    }

    let widest = candidates
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0);
    let col_width = widest + 2;
    let cols = (max_width / col_width).max(1);

    candidates
        .chunks(cols)
        .map(|row| {
            row.iter()
                .map(|c| format!("{c:<col_width$}"))
                .collect::<String>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix(&strings(&["test1", "test2", "test3"])), "test");
        assert_eq!(common_prefix(&strings(&["abc", "def"])), "");
        assert_eq!(common_prefix(&[]), "");
        assert_eq!(common_prefix(&strings(&["test"])), "test");
        assert_eq!(common_prefix(&strings(&["ab", "abc", "a"])), "a");
        assert_eq!(common_prefix(&strings(&["héllo", "hélp"])), "hél");
    }

    #[test]
    fn test_remove_duplicates_keeps_first_seen_order() {
        assert_eq!(
            remove_duplicates(strings(&["a", "b", "a", "c", "b"])),
            strings(&["a", "b", "c"])
        );
        assert!(remove_duplicates(Vec::new()).is_empty());
    }

    #[test]
    fn test_format_completions_columns() {
        assert!(format_completions(&[], 80).is_empty());
        assert_eq!(format_completions(&strings(&["only"]), 1), strings(&["only"]));

        let lines = format_completions(&strings(&["a", "bbb", "cc", "d", "eeee"]), 13);
        // widest is 4, so cells are 6 wide and two fit in 13.
        assert_eq!(lines, strings(&["a     bbb   ", "cc    d     ", "eeee  "]));

        let narrow = format_completions(&strings(&["alpha", "beta"]), 3);
        assert_eq!(narrow, strings(&["alpha  ", "beta   "]));
    }
}
