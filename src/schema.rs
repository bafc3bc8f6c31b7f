//! Declarative table definitions rendered to SQLite DDL.

/// Schema definition for the SQLite database
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub tables: Vec<TableDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    pub fn add_table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }

    /// One `CREATE TABLE IF NOT EXISTS` statement per table, in declaration order.
    pub fn to_sql(&self) -> String {
        self.tables
            .iter()
            .map(TableDefinition::to_sql)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn foreign_key(mut self, key: ForeignKey) -> Self {
        self.foreign_keys.push(key);
        self
    }

    pub fn to_sql(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(ColumnDefinition::to_sql).collect();
        parts.extend(self.foreign_keys.iter().map(ForeignKey::to_sql));
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            self.name,
            parts.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            constraints: Vec::new(),
        }
    }

    pub fn constraint(mut self, constraint: ColumnConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.data_type.as_sql());
        for constraint in &self.constraints {
            sql.push(' ');
            sql.push_str(constraint.as_sql());
        }
        sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Text,
    Real,
}

impl DataType {
    pub fn as_sql(self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Text => "TEXT",
            DataType::Real => "REAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnConstraint {
    /// `PRIMARY KEY AUTOINCREMENT`, only valid on an INTEGER column
    AutoIncrementKey,
    NotNull,
}

impl ColumnConstraint {
    pub fn as_sql(self) -> &'static str {
        match self {
            ColumnConstraint::AutoIncrementKey => "PRIMARY KEY AUTOINCREMENT",
            ColumnConstraint::NotNull => "NOT NULL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

impl ForeignKey {
    pub fn new(column: &str, foreign_table: &str, foreign_column: &str) -> Self {
        Self {
            column: column.to_string(),
            foreign_table: foreign_table.to_string(),
            foreign_column: foreign_column.to_string(),
        }
    }

    fn to_sql(&self) -> String {
        format!(
            "FOREIGN KEY({}) REFERENCES {}({})",
            self.column, self.foreign_table, self.foreign_column
        )
    }
}

pub const ACCOUNTS_TABLE: &str = "accounts";
pub const TRANSACTIONS_TABLE: &str = "transactions";

/// The `accounts` and `transactions` tables.
///
/// `transactions` is declared so the file layout is complete, but nothing in
/// this crate reads or writes it.
pub fn account_schema() -> Schema {
    use ColumnConstraint::{AutoIncrementKey, NotNull};

    let accounts = TableDefinition::new(ACCOUNTS_TABLE)
        .column(ColumnDefinition::new("id", DataType::Integer).constraint(AutoIncrementKey))
        .column(ColumnDefinition::new("name", DataType::Text).constraint(NotNull))
        .column(ColumnDefinition::new("password", DataType::Text).constraint(NotNull))
        .column(ColumnDefinition::new("balance", DataType::Real).constraint(NotNull));

    let transactions = TableDefinition::new(TRANSACTIONS_TABLE)
        .column(ColumnDefinition::new("id", DataType::Integer).constraint(AutoIncrementKey))
        .column(ColumnDefinition::new("account_id", DataType::Integer).constraint(NotNull))
        .column(ColumnDefinition::new("type", DataType::Text).constraint(NotNull))
        .column(ColumnDefinition::new("amount", DataType::Real).constraint(NotNull))
        .column(ColumnDefinition::new("timestamp", DataType::Text).constraint(NotNull))
        .foreign_key(ForeignKey::new("account_id", ACCOUNTS_TABLE, "id"));

    Schema::new().add_table(accounts).add_table(transactions)
}
