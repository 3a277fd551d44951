//! Tables owned by the core plan, in their current shape.

use schema::{ColumnDefinition, ColumnType, Table, TableDefinition};

pub const ISO_CODE_WIDTH: u32 = 14;

pub const DEFAULT_LANGUAGE: &str = "en-US";

/// The node every content tree hangs off.
pub const CONTENT_NODE_ROOT_ID: i32 = -1;

/// Definitions of every core table, in creation order.
pub fn core_tables() -> Vec<TableDefinition> {
    vec![
        Language::definition(),
        ContentNode::definition(),
        PropertyData::definition(),
        DictionaryValue::definition(),
    ]
}

pub struct Language;

impl Table for Language {
    fn definition() -> TableDefinition {
        TableDefinition::new("language")
            .column(ColumnDefinition::new("id", ColumnType::Integer).primary_key())
            .column(ColumnDefinition::new("isoCode", ColumnType::VarChar(ISO_CODE_WIDTH)))
            .column(ColumnDefinition::new("cultureName", ColumnType::VarChar(100)).nullable())
            .column(ColumnDefinition::new("isDefault", ColumnType::Bool))
            .unique_index("IX_language_isoCode", ["isoCode"])
    }
}

pub struct ContentNode;

impl Table for ContentNode {
    fn definition() -> TableDefinition {
        TableDefinition::new("contentNode")
            .column(ColumnDefinition::new("id", ColumnType::Integer).primary_key())
            .column(ColumnDefinition::new("uniqueId", ColumnType::Uuid))
            .column(ColumnDefinition::new("parentId", ColumnType::Integer).nullable())
            .column(ColumnDefinition::new("level", ColumnType::Integer))
            .column(ColumnDefinition::new("path", ColumnType::VarChar(150)))
            .column(ColumnDefinition::new("sortOrder", ColumnType::Integer))
            .column(ColumnDefinition::new("nodeObjectType", ColumnType::Uuid).nullable())
            .column(ColumnDefinition::new("trashed", ColumnType::Bool))
            .column(ColumnDefinition::new("text", ColumnType::VarChar(255)).nullable())
            .column(ColumnDefinition::new("createDate", ColumnType::DateTime))
            .unique_index("IX_contentNode_uniqueId", ["uniqueId"])
            .index("IX_contentNode_parentId", ["parentId"])
            .index("IX_contentNode_path", ["path"])
            .index("IX_contentNode_objectType", ["nodeObjectType", "trashed"])
            .foreign_key("FK_contentNode_parent", "parentId", "contentNode", "id")
    }
}

pub struct PropertyData;

impl Table for PropertyData {
    fn definition() -> TableDefinition {
        TableDefinition::new("propertyData")
            .column(ColumnDefinition::new("id", ColumnType::Integer).primary_key())
            .column(ColumnDefinition::new("nodeId", ColumnType::Integer))
            .column(ColumnDefinition::new("propertyAlias", ColumnType::VarChar(255)))
            .column(ColumnDefinition::new("languageId", ColumnType::Integer).nullable())
            .column(ColumnDefinition::new("segment", ColumnType::VarChar(256)).nullable())
            .column(ColumnDefinition::new("intValue", ColumnType::Integer).nullable())
            .column(ColumnDefinition::new("textValue", ColumnType::Text).nullable())
            .unique_index(
                "IX_propertyData_variant",
                ["nodeId", "propertyAlias", "languageId", "segment"],
            )
            .index("IX_propertyData_languageId", ["languageId"])
            .foreign_key("FK_propertyData_contentNode", "nodeId", "contentNode", "id")
            .foreign_key("FK_propertyData_language", "languageId", "language", "id")
    }
}

pub struct DictionaryValue;

impl Table for DictionaryValue {
    fn definition() -> TableDefinition {
        TableDefinition::new("dictionaryValue")
            .column(ColumnDefinition::new("id", ColumnType::Integer).primary_key())
            .column(ColumnDefinition::new("uniqueId", ColumnType::Uuid))
            .column(ColumnDefinition::new(
                "languageIsoCode",
                ColumnType::VarChar(ISO_CODE_WIDTH),
            ))
            .column(ColumnDefinition::new("value", ColumnType::Text))
            .foreign_key(
                "FK_dictionaryValue_language",
                "languageIsoCode",
                "language",
                "isoCode",
            )
    }
}
