//! Transform table selection for incremental-interface generation
//!
//! Each table groups one family of query rewrites. The command line only
//! disables tables; `all_tables_disabled` overrides the individual flags.

use std::fmt;

/// Query families handled by the incremental transformer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryTable {
    /// Existential quantification: `some(...)`
    Table1,
    /// Universal quantification: `each(...)`
    Table2,
    /// Aggregates: `setof(...)`, `len(...)`
    Table3,
}

impl QueryTable {
    pub const ALL: [QueryTable; 3] = [QueryTable::Table1, QueryTable::Table2, QueryTable::Table3];

    /// Table handling a query function, if any
    pub fn for_function(name: &str) -> Option<Self> {
        match name {
            "some" => Some(QueryTable::Table1),
            "each" => Some(QueryTable::Table2),
            "setof" | "len" => Some(QueryTable::Table3),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            QueryTable::Table1 => 1,
            QueryTable::Table2 => 2,
            QueryTable::Table3 => 3,
        }
    }
}

impl fmt::Display for QueryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table{}", self.number())
    }
}

/// Raw command-line switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformFlags {
    pub no_table1: bool,
    pub no_table2: bool,
    pub no_table3: bool,
    pub jb_style: bool,
    pub no_all_tables: bool,
}

/// Effective transform configuration, immutable once built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformConfig {
    pub table1: bool,
    pub table2: bool,
    pub table3: bool,
    pub jb_style: bool,
    pub all_tables_disabled: bool,
}

impl TransformConfig {
    pub fn from_flags(flags: TransformFlags) -> Self {
        let all_tables_disabled = flags.no_all_tables;
        Self {
            table1: !flags.no_table1 && !all_tables_disabled,
            table2: !flags.no_table2 && !all_tables_disabled,
            table3: !flags.no_table3 && !all_tables_disabled,
            jb_style: flags.jb_style,
            all_tables_disabled,
        }
    }

    pub fn is_enabled(&self, table: QueryTable) -> bool {
        match table {
            QueryTable::Table1 => self.table1,
            QueryTable::Table2 => self.table2,
            QueryTable::Table3 => self.table3,
        }
    }

    pub fn enabled_tables(&self) -> Vec<QueryTable> {
        QueryTable::ALL
            .into_iter()
            .filter(|t| self.is_enabled(*t))
            .collect()
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self::from_flags(TransformFlags::default())
    }
}

impl From<TransformFlags> for TransformConfig {
    fn from(flags: TransformFlags) -> Self {
        Self::from_flags(flags)
    }
}
