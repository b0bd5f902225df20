use serde::{Deserialize, Serialize};

use crate::mapping::{MappingEntry, Record};

/// Body of the insert-dimension-data operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionInsert {
    pub database_name: String,
    pub table: String,
    pub mapping: Vec<MappingEntry>,
    pub data: Vec<Record>,
}

/// Body of the insert-fact operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactInsert {
    pub database_name: String,
    pub fact_table: String,
    pub mapping: Vec<MappingEntry>,
    pub data: Vec<Record>,
}

/// Body of a message to the conversational agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub message: String,
}

/// Body of the train-chatbot operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainRequest {
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fact_insert_uses_camel_case_fields() {
        let body = FactInsert {
            database_name: "MyDatabase".to_string(),
            fact_table: "FactSales".to_string(),
            mapping: vec![],
            data: vec![],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "databaseName": "MyDatabase",
                "factTable": "FactSales",
                "mapping": [],
                "data": [],
            })
        );
    }
}
