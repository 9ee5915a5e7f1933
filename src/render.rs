use regex::Regex;
use std::sync::OnceLock;

/// Identifier-quoting style for the target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlDialect {
    #[default]
    Postgres,
    Mysql,
    SqlServer,
    /// Unknown dialect tag: identifiers pass through unquoted.
    Generic,
}

impl SqlDialect {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "postgres" | "postgresql" => SqlDialect::Postgres,
            "mysql" => SqlDialect::Mysql,
            "sqlserver" | "mssql" => SqlDialect::SqlServer,
            _ => SqlDialect::Generic,
        }
    }

    pub fn quote(&self, name: &str) -> String {
        match self {
            SqlDialect::Postgres => format!("\"{}\"", name),
            SqlDialect::Mysql => format!("`{}`", name),
            SqlDialect::SqlServer => format!("[{}]", name),
            SqlDialect::Generic => name.to_string(),
        }
    }
}

/// Schema-qualified, dialect-quoted object name. Schema segments are joined
/// with `.` and left unquoted; only the trailing object name is quoted.
pub fn qualified_name(dialect: SqlDialect, schema: &[String], name: &str) -> String {
    let quoted = dialect.quote(name);
    let segments: Vec<&str> = schema
        .iter()
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
        .collect();
    if segments.is_empty() {
        quoted
    } else {
        format!("{}.{}", segments.join("."), quoted)
    }
}

/// Record attributes available to template expansion.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub name: &'a str,
    pub object_type: &'a str,
    pub schema: &'a [String],
    pub path: &'a str,
    pub qualified: &'a str,
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(name|type|schema|path|qualified)\}").unwrap())
}

/// Substitute the fixed placeholder set into `template`. Anything outside
/// the fixed set passes through verbatim.
pub fn expand(template: &str, ctx: &TemplateContext<'_>) -> String {
    placeholder_re()
        .replace_all(template, |caps: &regex::Captures<'_>| match &caps[1] {
            "name" => ctx.name.to_string(),
            "type" => ctx.object_type.to_string(),
            "schema" => ctx.schema.join("."),
            "path" => ctx.path.to_string(),
            "qualified" => ctx.qualified.to_string(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

pub fn synthesize_create(object_type: &str, qualified: &str, body: &str) -> String {
    format!("CREATE {} {}\n{}", object_type, qualified, body)
}

pub fn synthesize_drop(object_type: &str, qualified: &str) -> String {
    format!("DROP {} {}", object_type, qualified)
}
