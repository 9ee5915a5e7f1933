use std::collections::BTreeMap;
use std::fmt;

/// Identifies one database object: uppercased category plus object name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    pub object_type: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(object_type: impl AsRef<str>, name: impl Into<String>) -> Self {
        Self {
            object_type: object_type.as_ref().to_uppercase(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.object_type, self.name)
    }
}

/// Per-pass DFS coloring of a record: white/gray/black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Unvisited,
    InProgress,
    Done,
}

/// One registered object, built from a single source file.
#[derive(Debug, Clone, Default)]
pub struct ObjectRecord {
    pub object_type: String,
    pub name: String,
    /// Source label, used in reports and as the `{path}` placeholder.
    pub path: String,

    /// SQL body with every comment line stripped.
    pub body: String,
    /// Raw directive strings in file order.
    pub directives: Vec<String>,
    /// Reference tokens of the form `name` or `type/name`.
    pub requires: Vec<String>,

    pub vanilla: bool,
    pub silent: bool,
    pub debug: bool,
    pub keep: bool,
    pub deleted: bool,
    pub nocreate: bool,
    pub nodrop: bool,

    /// Schema qualifier segments; `None` means "use the configured default".
    pub schema: Option<Vec<String>>,

    pub drop_sql: Vec<String>,
    pub create_sql: Vec<String>,
    pub before_drop_sql: Vec<String>,
    pub after_drop_sql: Vec<String>,
    pub before_create_sql: Vec<String>,
    pub after_create_sql: Vec<String>,

    /// Query-based condition text (legacy polarity-inverting kind).
    pub condition: Vec<String>,
    /// Predicate expressions gating create / drop.
    pub create_condition_expr: Vec<String>,
    pub drop_condition_expr: Vec<String>,

    pub status: Status,
}

impl ObjectRecord {
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.object_type, self.name.clone())
    }
}

/// Keyed store of object records. Re-registering a key overwrites the
/// previous record; iteration is grouped by type, then by name.
#[derive(Debug, Default)]
pub struct Registry {
    records: BTreeMap<ObjectKey, ObjectRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, record: ObjectRecord) {
        self.records.insert(record.key(), record);
    }

    pub fn get(&self, key: &ObjectKey) -> Option<&ObjectRecord> {
        self.records.get(key)
    }

    pub fn set_status(&mut self, key: &ObjectKey, status: Status) {
        if let Some(record) = self.records.get_mut(key) {
            record.status = status;
        }
    }

    /// Keys in pass order: by type, then by name within type.
    pub fn keys(&self) -> Vec<ObjectKey> {
        self.records.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectKey, &ObjectRecord)> {
        self.records.iter()
    }

    /// Marks every record Unvisited. Called at the start of each pass.
    pub fn reset_statuses(&mut self) {
        for record in self.records.values_mut() {
            record.status = Status::Unvisited;
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
