/// Words reserved by at least one supported database.
///
/// Sorted, lowercase.
const RESERVED: &[&str] = &[
    "add", "all", "alter", "and", "any", "as", "asc", "between", "by", "case", "check",
    "column", "constraint", "create", "cross", "current_date", "current_time",
    "current_timestamp", "current_user", "default", "delete", "desc", "distinct", "drop",
    "else", "end", "except", "exists", "false", "fetch", "for", "foreign", "from", "full",
    "grant", "group", "having", "in", "index", "inner", "insert", "intersect", "into", "is",
    "join", "key", "left", "like", "limit", "merge", "minus", "natural", "not", "null",
    "offset", "on", "or", "order", "outer", "primary", "references", "right", "row", "rownum",
    "rows", "select", "set", "table", "then", "to", "true", "union", "unique", "update",
    "user", "using", "values", "when", "where", "with",
];

pub(super) fn is_reserved(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    RESERVED.binary_search(&&lower[..]).is_ok()
}
