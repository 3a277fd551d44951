//! Rows a new installation starts with.

use schema::Statement;

use crate::tables::{CONTENT_NODE_ROOT_ID, DEFAULT_LANGUAGE};

const OBJECT_TYPE_SYSTEM_ROOT: &str = "ea7d8624-4cfe-4578-a871-24aa946bf34d";
const OBJECT_TYPE_CONTENT_RECYCLE_BIN: &str = "01bb7ff2-24dc-4c0c-95a2-c24ef72bbac8";
const OBJECT_TYPE_MEDIA_RECYCLE_BIN: &str = "cf3d8e34-1c1c-41e9-ae56-878b57b32113";

/// The inserts seeding `table`, empty for tables without base data.
pub fn base_data(table: &str) -> Vec<Statement> {
    match table {
        "language" => vec![insert(
            table,
            &[
                ("id", "1".to_string()),
                ("isoCode", quote(DEFAULT_LANGUAGE)),
                ("cultureName", quote("English (United States)")),
                ("isDefault", "TRUE".to_string()),
            ],
        )],
        "contentNode" => vec![
            system_node(
                CONTENT_NODE_ROOT_ID,
                "916724a5-173d-4619-b97e-b9de133dd6f5",
                OBJECT_TYPE_SYSTEM_ROOT,
                "SYSTEM DATA: master root",
            ),
            system_node(
                -20,
                "0f582a79-1e41-4cf0-bfa0-76340651891a",
                OBJECT_TYPE_CONTENT_RECYCLE_BIN,
                "Recycle Bin",
            ),
            system_node(
                -21,
                "bf7c7cbc-952f-4518-97a2-69e9c7b33842",
                OBJECT_TYPE_MEDIA_RECYCLE_BIN,
                "Recycle Bin",
            ),
        ],
        _ => Vec::new(),
    }
}

fn system_node(id: i32, unique_id: &str, object_type: &str, text: &str) -> Statement {
    let (parent_id, path) = if id == CONTENT_NODE_ROOT_ID {
        ("NULL".to_string(), id.to_string())
    } else {
        (
            CONTENT_NODE_ROOT_ID.to_string(),
            format!("{},{}", CONTENT_NODE_ROOT_ID, id),
        )
    };

    insert(
        "contentNode",
        &[
            ("id", id.to_string()),
            ("uniqueId", quote(unique_id)),
            ("parentId", parent_id),
            ("level", "0".to_string()),
            ("path", quote(&path)),
            ("sortOrder", "0".to_string()),
            ("nodeObjectType", quote(object_type)),
            ("trashed", "FALSE".to_string()),
            ("text", quote(text)),
            ("createDate", "CURRENT_TIMESTAMP".to_string()),
        ],
    )
}

fn insert(table: &str, values: &[(&str, String)]) -> Statement {
    let columns = values
        .iter()
        .map(|(column, _)| format!("\"{}\"", column))
        .collect::<Vec<_>>()
        .join(", ");
    let literals = values
        .iter()
        .map(|(_, value)| value.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Statement::Sql(format!(
        "INSERT INTO \"{}\" ({}) VALUES ({})",
        table, columns, literals
    ))
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language() {
        let statements = base_data("language");
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0].to_string(),
            "INSERT INTO \"language\" (\"id\", \"isoCode\", \"cultureName\", \"isDefault\") \
             VALUES (1, 'en-US', 'English (United States)', TRUE)"
        );
    }

    #[test]
    fn content_nodes() {
        let statements = base_data("contentNode")
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(statements.len(), 3);
        assert!(statements[0].contains("VALUES (-1, '916724a5-173d-4619-b97e-b9de133dd6f5', NULL, 0, '-1',"));
        assert!(statements[1].contains("-20, '0f582a79-1e41-4cf0-bfa0-76340651891a', -1, 0, '-1,-20',"));
        assert!(statements.iter().all(|sql| sql.starts_with("INSERT INTO \"contentNode\"")));
    }

    #[test]
    fn no_base_data() {
        assert!(base_data("propertyData").is_empty());
        assert!(base_data("unknown").is_empty());
    }
}
