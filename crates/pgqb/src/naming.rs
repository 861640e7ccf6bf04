//! Identifier case conversion and quoting.
//!
//! - [`to_snake_case`] maps logical names (`createDate`) to SQL names (`create_date`).
//! - [`wrap_quotes`] double-quotes identifiers that are reserved or not plain lowercase.
//! - [`wrap_quotes_extended`] additionally quotes any keyword; used for aliases.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Keywords that are reserved in PostgreSQL, including the ones that may be
/// used as a function or type name.
const RESERVED_KEYWORDS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "authorization", "binary", "both", "case", "cast", "check", "collate", "collation",
    "column", "concurrently", "constraint", "create", "cross", "current_catalog",
    "current_date", "current_role", "current_schema", "current_time", "current_timestamp",
    "current_user", "default", "deferrable", "desc", "distinct", "do", "else", "end",
    "except", "false", "fetch", "for", "foreign", "freeze", "from", "full", "grant",
    "group", "having", "ilike", "in", "initially", "inner", "intersect", "into", "is",
    "isnull", "join", "lateral", "leading", "left", "like", "limit", "localtime",
    "localtimestamp", "natural", "not", "notnull", "null", "offset", "on", "only", "or",
    "order", "outer", "overlaps", "placing", "primary", "references", "returning", "right",
    "select", "session_user", "similar", "some", "symmetric", "system_user", "table",
    "tablesample", "then", "to", "trailing", "true", "union", "unique", "user", "using",
    "variadic", "verbose", "when", "where", "window", "with",
];

/// Every other PostgreSQL keyword (unreserved and column-name keywords).
const OTHER_KEYWORDS: &[&str] = &[
    "abort", "absent", "absolute", "access", "action", "add", "admin", "after", "aggregate",
    "also", "alter", "always", "assertion", "assignment", "at", "atomic", "attach",
    "attribute", "backward", "before", "begin", "between", "bigint", "bit", "boolean", "breadth",
    "by", "cache", "call", "called", "cascade", "cascaded", "catalog", "chain", "char",
    "character", "characteristics", "checkpoint", "class", "close", "cluster", "coalesce",
    "columns", "comment", "comments", "commit", "committed", "compression", "configuration",
    "conflict", "connection", "constraints", "content", "continue", "conversion", "copy",
    "cost", "csv", "cube", "current", "cursor", "cycle", "data", "database", "day",
    "deallocate", "dec", "decimal", "declare", "defaults", "deferred", "definer", "delete",
    "delimiter", "delimiters", "depends", "depth", "detach", "dictionary", "disable",
    "discard", "document", "domain", "double", "drop", "each", "enable", "encoding",
    "encrypted", "enum", "escape", "event", "exclude", "excluding", "exclusive", "execute",
    "exists", "explain", "expression", "extension", "external", "extract", "family", "filter",
    "finalize", "first", "float", "following", "force", "format", "forward", "function",
    "functions", "generated", "global", "granted", "greatest", "grouping", "groups",
    "handler", "header", "hold", "hour", "identity", "if", "immediate", "immutable",
    "implicit", "import", "include", "including", "increment", "indent", "index", "indexes",
    "inherit", "inherits", "inline", "inout", "input", "insensitive", "insert", "instead",
    "int", "integer", "interval", "invoker", "isolation", "json", "json_array",
    "json_arrayagg", "json_object", "json_objectagg", "key", "keys", "label", "language",
    "large", "last", "leakproof", "least", "level", "listen", "load", "local", "location",
    "lock", "locked", "logged", "mapping", "match", "matched", "materialized", "maxvalue",
    "merge", "method", "minute", "minvalue", "mode", "month", "move", "name", "names",
    "national", "nchar", "new", "next", "nfc", "nfd", "nfkc", "nfkd", "no", "none",
    "normalize", "normalized", "nothing", "notify", "nowait", "nullif", "nulls", "numeric",
    "object", "of", "off", "oids", "old", "operator", "option", "options", "ordinality",
    "others", "out", "over", "overlay", "overriding", "owned", "owner", "parallel",
    "parameter", "parser", "partial", "partition", "passing", "password", "plans", "policy",
    "position", "preceding", "precision", "prepare", "prepared", "preserve", "prior",
    "privileges", "procedural", "procedure", "procedures", "program", "publication", "quote",
    "range", "read", "real", "reassign", "recheck", "recursive", "ref", "referencing",
    "refresh", "reindex", "relative", "release", "rename", "repeatable", "replace",
    "replica", "reset", "restart", "restrict", "return", "returns", "revoke", "role",
    "rollback", "rollup", "routine", "routines", "row", "rows", "rule", "savepoint", "scalar",
    "schema", "schemas", "scroll", "search", "second", "security", "sequence", "sequences",
    "serializable", "server", "session", "set", "setof", "sets", "share", "show", "simple",
    "skip", "smallint", "snapshot", "sql", "stable", "standalone", "start", "statement",
    "statistics", "stdin", "stdout", "storage", "stored", "strict", "strip", "subscription",
    "substring", "support", "sysid", "system", "tables", "tablespace", "temp", "template",
    "temporary", "text", "ties", "time", "timestamp", "transaction", "transform", "treat",
    "trigger", "trim", "truncate", "trusted", "type", "types", "uescape", "unbounded",
    "uncommitted", "unencrypted", "unknown", "unlisten", "unlogged", "until", "update",
    "vacuum", "valid", "validate", "validator", "value", "values", "varchar", "varying",
    "version", "view", "views", "volatile", "whitespace", "within", "without", "work",
    "wrapper", "write", "xml", "xmlattributes", "xmlconcat", "xmlelement", "xmlexists",
    "xmlforest", "xmlnamespaces", "xmlparse", "xmlpi", "xmlroot", "xmlserialize",
    "xmltable", "year", "yes", "zone",
];

fn reserved_keywords() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| RESERVED_KEYWORDS.iter().copied().collect())
}

fn all_keywords() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        RESERVED_KEYWORDS
            .iter()
            .chain(OTHER_KEYWORDS)
            .copied()
            .collect()
    })
}

fn is_valid_identifier(s: &str) -> bool {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"^[a-z_][a-z0-9_]*$").expect("invalid built-in identifier regex")
    })
    .is_match(s)
}

fn quote_if_needed(s: &str, extended: bool) -> String {
    let reserved = reserved_keywords().contains(s) || (extended && all_keywords().contains(s));
    if reserved || !is_valid_identifier(s) {
        format!("\"{s}\"")
    } else {
        s.to_string()
    }
}

/// Quote a table or column identifier when PostgreSQL would not accept it bare.
pub fn wrap_quotes(s: &str) -> String {
    quote_if_needed(s, false)
}

/// Like [`wrap_quotes`] but also quotes unreserved keywords, for output aliases.
pub fn wrap_quotes_extended(s: &str) -> String {
    quote_if_needed(s, true)
}

/// Convert a logical identifier to snake_case.
///
/// Runs of non-word characters collapse to one separator, and every uppercase
/// letter that directly follows a word character starts a new segment.
pub fn to_snake_case(s: &str) -> String {
    static NON_WORD: OnceLock<regex::Regex> = OnceLock::new();
    let spaced = NON_WORD
        .get_or_init(|| regex::Regex::new(r"[^A-Za-z0-9_]+").expect("invalid built-in word regex"))
        .replace_all(s, " ");

    let mut segments = vec![String::new()];
    let mut after_word_char = false;
    for ch in spaced.chars() {
        if ch == ' ' {
            segments.push(String::new());
            after_word_char = false;
            continue;
        }
        if ch.is_ascii_uppercase() && after_word_char {
            segments.push(String::new());
        }
        if let Some(segment) = segments.last_mut() {
            segment.push(ch.to_ascii_lowercase());
        }
        after_word_char = true;
    }
    segments.join("_")
}
