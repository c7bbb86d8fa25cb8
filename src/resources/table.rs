//! Data tables with global secondary indexes.

use std::collections::HashSet;

use indexmap::IndexSet;
use tracing::debug;

use super::{require, Construct};
use crate::error::{Error, Result};
use crate::graph::{AttrValue, GraphBuilder, NodeHandle, ResourceKind, ResourceNode, Scope};

/// A secondary index. An empty sort key means the index is keyed on the
/// partition key alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    /// Index name
    pub name: String,
    /// Partition key attribute
    pub partition_key: String,
    /// Sort key attribute, possibly empty
    pub sort_key: String,
}

impl IndexDefinition {
    /// Create a new index definition
    pub fn new(
        name: impl Into<String>,
        partition_key: impl Into<String>,
        sort_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }

    fn has_sort_key(&self) -> bool {
        !self.sort_key.is_empty()
    }
}

/// A table and its indexes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    /// Logical table name, e.g. `users`
    pub name: String,
    /// Partition key attribute
    pub partition_key: String,
    /// Secondary indexes, possibly none
    pub indexes: Vec<IndexDefinition>,
}

/// Tables the application expects
pub fn default_tables() -> Vec<TableDefinition> {
    vec![
        TableDefinition {
            name: "content".into(),
            partition_key: "id".into(),
            indexes: vec![
                IndexDefinition::new("ByStatus", "status", "date"),
                IndexDefinition::new("ByTypeOwnerComp", "typeOwnerComp", "date"),
                IndexDefinition::new("ByTypeStatusComp", "typeStatusComp", "date"),
            ],
        },
        TableDefinition {
            name: "notifications".into(),
            partition_key: "id".into(),
            indexes: vec![
                IndexDefinition::new("ByTo", "to", "date"),
                IndexDefinition::new("ByToStatusComp", "toStatusComp", "date"),
            ],
        },
        TableDefinition {
            name: "users".into(),
            partition_key: "id".into(),
            indexes: vec![
                IndexDefinition::new("ByUsername", "usernameLower", ""),
                IndexDefinition::new("ByEmail", "email", ""),
            ],
        },
        TableDefinition {
            name: "notices".into(),
            partition_key: "id".into(),
            indexes: vec![IndexDefinition::new("ByStatus", "status", "date")],
        },
    ]
}

/// `users` -> `Users`
fn to_resource_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn key_schema(partition_key: &str, sort_key: Option<&str>) -> AttrValue {
    let mut keys = vec![AttrValue::map([
        ("AttributeName", partition_key),
        ("KeyType", "HASH"),
    ])];
    if let Some(sort_key) = sort_key {
        keys.push(AttrValue::map([("AttributeName", sort_key), ("KeyType", "RANGE")]));
    }
    AttrValue::List(keys)
}

impl TableDefinition {
    fn validate(&self) -> Result<()> {
        require("table", "name", &self.name)?;
        require(&format!("table '{}'", self.name), "partition_key", &self.partition_key)?;
        let mut seen = HashSet::new();
        for index in &self.indexes {
            require(&format!("table '{}'", self.name), "index name", &index.name)?;
            require(
                &format!("index '{}' of table '{}'", index.name, self.name),
                "partition_key",
                &index.partition_key,
            )?;
            if !seen.insert(index.name.as_str()) {
                return Err(Error::invalid_parameter(
                    "indexes",
                    format!("index '{}' declared twice on table '{}'", index.name, self.name),
                ));
            }
        }
        Ok(())
    }

    fn to_node(&self, id: String, prefix: &str) -> ResourceNode {
        let mut attributes: IndexSet<&str> = IndexSet::new();
        attributes.insert(&self.partition_key);
        for index in &self.indexes {
            attributes.insert(&index.partition_key);
            if index.has_sort_key() {
                attributes.insert(&index.sort_key);
            }
        }
        let definitions: Vec<AttrValue> = attributes
            .into_iter()
            .map(|name| AttrValue::map([("AttributeName", name), ("AttributeType", "S")]))
            .collect();

        let mut node = ResourceNode::new(id, ResourceKind::Table)
            .with_attr(
                "TableName",
                format!("{}_{}", prefix, self.name.to_uppercase()),
            )
            .with_attr("BillingMode", "PAY_PER_REQUEST")
            .with_attr("KeySchema", key_schema(&self.partition_key, None))
            .with_attr("AttributeDefinitions", definitions)
            .with_tag("environment", prefix);

        if !self.indexes.is_empty() {
            let indexes: Vec<AttrValue> = self
                .indexes
                .iter()
                .map(|index| {
                    let sort_key = index.has_sort_key().then_some(index.sort_key.as_str());
                    AttrValue::map([
                        ("IndexName", AttrValue::from(&index.name)),
                        ("KeySchema", key_schema(&index.partition_key, sort_key)),
                        ("Projection", AttrValue::map([("ProjectionType", "ALL")])),
                    ])
                })
                .collect();
            node = node.with_attr("GlobalSecondaryIndexes", indexes);
        }

        node
    }
}

/// The application's data tables under one name prefix
#[derive(Debug, Clone)]
pub struct TablesProps {
    /// Table name prefix, e.g. `PROD`
    pub prefix: String,
    /// Tables to declare
    pub tables: Vec<TableDefinition>,
}

impl Construct for TablesProps {
    type Handle = Vec<NodeHandle>;

    fn declare(self, builder: &mut GraphBuilder, scope: &Scope) -> Result<Vec<NodeHandle>> {
        require("tables", "prefix", &self.prefix)?;
        for table in &self.tables {
            table.validate()?;
        }

        let mut handles = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            let id = scope.node_id(&to_resource_name(&table.name))?;
            debug!(table = %table.name, indexes = table.indexes.len(), "declaring table");
            handles.push(builder.add_node(table.to_node(id, &self.prefix))?);
        }
        Ok(handles)
    }
}
