use std::collections::BTreeMap;

/// Alias name to raw, unparsed expansion text.
pub type AliasTable = BTreeMap<String, String>;

/// Replaces the first word of `line` with its alias expansion.
///
/// Fields are split on whitespace without quote awareness and rejoined with
/// single spaces. The expansion is applied once: if it starts with another
/// alias name, that name is left as is.
pub fn expand_alias(line: &str, table: &AliasTable) -> (String, bool) {
    let mut fields: Vec<&str> = line.split_whitespace().collect();
    let Some(first) = fields.first() else {
        return (line.to_string(), false);
    };
    match table.get(*first) {
        Some(expansion) => {
            fields[0] = expansion.as_str();
            (fields.join(" "), true)
        }
        None => (line.to_string(), false),
    }
}
