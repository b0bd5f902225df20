use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// SQL column types the backend accepts. The spellings are part of the
/// wire contract and round-trip through `as_str`/`FromStr` unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Int,
    Varchar,
    Nvarchar,
    Datetime,
    Bit,
    Decimal,
    Float,
    Char,
    Nchar,
}

impl ColumnType {
    /// Every supported type, in the order the designer offers them.
    pub const ALL: [ColumnType; 9] = [
        ColumnType::Int,
        ColumnType::Varchar,
        ColumnType::Nvarchar,
        ColumnType::Datetime,
        ColumnType::Bit,
        ColumnType::Decimal,
        ColumnType::Float,
        ColumnType::Char,
        ColumnType::Nchar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int => "INT",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Nvarchar => "NVARCHAR",
            ColumnType::Datetime => "DATETIME",
            ColumnType::Bit => "BIT",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Float => "FLOAT",
            ColumnType::Char => "CHAR",
            ColumnType::Nchar => "NCHAR",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INT" => Ok(ColumnType::Int),
            "VARCHAR" => Ok(ColumnType::Varchar),
            "NVARCHAR" => Ok(ColumnType::Nvarchar),
            "DATETIME" => Ok(ColumnType::Datetime),
            "BIT" => Ok(ColumnType::Bit),
            "DECIMAL" => Ok(ColumnType::Decimal),
            "FLOAT" => Ok(ColumnType::Float),
            "CHAR" => Ok(ColumnType::Char),
            "NCHAR" => Ok(ColumnType::Nchar),
            other => Err(ModelError::UnknownColumnType(other.to_string())),
        }
    }
}

/// One column of a table node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ColumnType,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub foreign_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_table: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            primary_key: false,
            foreign_key: false,
            reference_table: None,
        }
    }

    /// The identity column every new table starts with.
    pub fn identity() -> Self {
        Self {
            name: "id".to_string(),
            ty: ColumnType::Int,
            primary_key: true,
            foreign_key: false,
            reference_table: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_type_round_trips_all_spellings() {
        for ty in ColumnType::ALL {
            let parsed: ColumnType = ty.as_str().parse().unwrap();
            assert_eq!(parsed, ty);
        }
    }

    #[test]
    fn column_type_rejects_unknown() {
        assert!("TEXT".parse::<ColumnType>().is_err());
        assert!("".parse::<ColumnType>().is_err());
    }

    #[test]
    fn column_type_parse_is_case_insensitive() {
        assert_eq!("varchar".parse::<ColumnType>().unwrap(), ColumnType::Varchar);
        assert_eq!(" int ".parse::<ColumnType>().unwrap(), ColumnType::Int);
    }

    #[test]
    fn column_serializes_with_wire_names() {
        let column = Column {
            reference_table: Some("Customer".to_string()),
            foreign_key: true,
            ..Column::new("customer_id", ColumnType::Int)
        };
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "customer_id",
                "type": "INT",
                "primaryKey": false,
                "foreignKey": true,
                "referenceTable": "Customer",
            })
        );
    }
}
