use crate::registry::ObjectRecord;
use tracing::warn;

/// Returns the content of a comment line (marker stripped), or `None` for
/// a non-comment line. A line is a comment if its trimmed form starts with
/// `--` or `#`.
fn comment_content(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix("--") {
        Some(rest)
    } else {
        trimmed.strip_prefix('#')
    }
}

/// Parse one object source file into a record.
///
/// Every comment line is excluded from the SQL body. Comment content that
/// starts with `!` (immediately after the marker) is a directive; other
/// comments are plain commentary and discarded. Directives are applied in
/// file order: boolean flags are first-occurrence-wins, list-valued
/// directives accumulate, and `!schema` replaces the segment list each time
/// it appears.
pub fn parse_object_file(
    object_type: &str,
    name: &str,
    path: &str,
    text: &str,
) -> ObjectRecord {
    let mut record = ObjectRecord {
        object_type: object_type.to_uppercase(),
        name: name.to_string(),
        path: path.to_string(),
        ..Default::default()
    };

    let mut body_lines: Vec<&str> = Vec::new();
    for line in text.lines() {
        match comment_content(line) {
            None => body_lines.push(line),
            Some(content) => {
                if content.starts_with('!') {
                    record.directives.push(content.to_string());
                    apply_directive(&mut record, content);
                }
            }
        }
    }
    record.body = body_lines.join("\n");

    record
}

fn apply_directive(record: &mut ObjectRecord, directive: &str) {
    let token = directive.split_whitespace().next().unwrap_or(directive);
    // Everything after the leading token, e.g. the statement text of
    // `!createsql <stmt>`.
    let rest = directive[token.len()..].trim();

    match token {
        "!require" => {
            record
                .requires
                .extend(rest.split_whitespace().map(str::to_string));
        }
        "!vanilla" => record.vanilla = true,
        "!deleted" => {
            record.deleted = true;
            record.nocreate = true;
        }
        "!keep" => {
            record.keep = true;
            record.nodrop = true;
        }
        "!silent" => record.silent = true,
        "!debug" => record.debug = true,
        "!schema" => {
            record.schema = Some(rest.split_whitespace().map(str::to_string).collect());
        }
        "!condition" => record.condition.push(rest.to_string()),
        "!createcondition" => record.create_condition_expr.push(rest.to_string()),
        "!dropcondition" => record.drop_condition_expr.push(rest.to_string()),
        "!createsql" => record.create_sql.push(rest.to_string()),
        "!dropsql" => record.drop_sql.push(rest.to_string()),
        "!beforecreatesql" => record.before_create_sql.push(rest.to_string()),
        "!aftercreatesql" => record.after_create_sql.push(rest.to_string()),
        "!beforedropsql" => record.before_drop_sql.push(rest.to_string()),
        "!afterdropsql" => record.after_drop_sql.push(rest.to_string()),
        _ => {
            warn!(
                object_type = record.object_type,
                object_name = record.name,
                directive = token,
                "Ignoring unknown directive"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn parse(text: &str) -> ObjectRecord {
        parse_object_file("view", "user_stats", "views/user_stats.sql", text)
    }

    #[test]
    fn test_body_excludes_all_comment_lines() {
        let record = parse(indoc! {"
            -- plain commentary
            --!silent
            # hash comment
            AS SELECT id, name
            FROM users
        "});

        assert_eq!(record.body, "AS SELECT id, name\nFROM users");
        assert!(record.silent);
        assert_eq!(record.directives, vec!["!silent"]);
    }

    #[test]
    fn test_type_is_uppercased() {
        let record = parse("AS SELECT 1");
        assert_eq!(record.object_type, "VIEW");
        assert_eq!(record.name, "user_stats");
    }

    #[test]
    fn test_marker_with_space_is_plain_commentary() {
        // Directive detection requires `!` immediately after the marker.
        let record = parse("-- !silent\nAS SELECT 1");
        assert!(!record.silent);
        assert!(record.directives.is_empty());
    }

    #[test]
    fn test_hash_marker_directive() {
        let record = parse("#!keep\nAS SELECT 1");
        assert!(record.keep);
        assert!(record.nodrop);
    }

    #[test]
    fn test_require_accumulates_in_order() {
        let record = parse(indoc! {"
            --!require users function/count_users
            --!require orders
            AS SELECT 1
        "});
        assert_eq!(record.requires, vec!["users", "function/count_users", "orders"]);
    }

    #[test]
    fn test_deleted_implies_nocreate() {
        let record = parse("--!deleted");
        assert!(record.deleted);
        assert!(record.nocreate);
        assert!(!record.nodrop);
    }

    #[test]
    fn test_keep_implies_nodrop() {
        let record = parse("--!keep\nAS SELECT 1");
        assert!(record.keep);
        assert!(record.nodrop);
        assert!(!record.nocreate);
    }

    #[test]
    fn test_boolean_flags_repeat_is_noop() {
        let record = parse("--!vanilla\n--!vanilla\nSELECT 1");
        assert!(record.vanilla);
        assert_eq!(record.directives.len(), 2);
    }

    #[test]
    fn test_schema_replaces_each_occurrence() {
        let record = parse(indoc! {"
            --!schema reporting
            --!schema audit internal
            AS SELECT 1
        "});
        assert_eq!(
            record.schema,
            Some(vec!["audit".to_string(), "internal".to_string()])
        );
    }

    #[test]
    fn test_statement_lists_accumulate() {
        let record = parse(indoc! {"
            --!createsql CREATE VIEW {qualified} AS SELECT 1
            --!createsql GRANT SELECT ON {qualified} TO reader
            --!dropsql DROP VIEW IF EXISTS {qualified}
            --!beforecreatesql SET search_path TO {schema}
            --!aftercreatesql ANALYZE
            --!beforedropsql SET lock_timeout TO '1s'
            --!afterdropsql RESET lock_timeout
        "});
        assert_eq!(record.create_sql.len(), 2);
        assert_eq!(record.create_sql[1], "GRANT SELECT ON {qualified} TO reader");
        assert_eq!(record.drop_sql, vec!["DROP VIEW IF EXISTS {qualified}"]);
        assert_eq!(record.before_create_sql, vec!["SET search_path TO {schema}"]);
        assert_eq!(record.after_create_sql, vec!["ANALYZE"]);
        assert_eq!(record.before_drop_sql, vec!["SET lock_timeout TO '1s'"]);
        assert_eq!(record.after_drop_sql, vec!["RESET lock_timeout"]);
    }

    #[test]
    fn test_condition_directives() {
        let record = parse(indoc! {"
            --!condition SELECT 1 FROM pg_views WHERE viewname = '{name}'
            --!createcondition {type} == VIEW
            --!dropcondition {schema} != dbo
        "});
        assert_eq!(record.condition.len(), 1);
        assert_eq!(record.create_condition_expr, vec!["{type} == VIEW"]);
        assert_eq!(record.drop_condition_expr, vec!["{schema} != dbo"]);
    }

    #[test]
    fn test_unknown_directive_is_ignored() {
        let record = parse("--!frobnicate now\nAS SELECT 1");
        assert_eq!(record.directives, vec!["!frobnicate now"]);
        assert_eq!(record.body, "AS SELECT 1");
        assert!(!record.vanilla && !record.silent && !record.keep);
    }

    #[test]
    fn test_empty_file_yields_blank_body() {
        let record = parse("--!deleted\n");
        assert!(record.body.trim().is_empty());
    }

    #[test]
    fn test_indented_comment_lines_are_stripped() {
        let record = parse("  -- indented comment\n  AS SELECT 1");
        assert_eq!(record.body, "  AS SELECT 1");
    }
}
