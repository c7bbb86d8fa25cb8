//! References to existing buckets.
//!
//! The buckets themselves predate this stack and are not managed by it;
//! they are declared as imported nodes so consumers get an ordering edge
//! and a retained node in the document.

use super::{require, Construct};
use crate::error::Result;
use crate::graph::{GraphBuilder, NodeHandle, ResourceKind, ResourceNode, Scope};

/// Reference to an existing bucket by name
#[derive(Debug, Clone)]
pub struct BucketRefProps {
    /// Local name within the scope, e.g. `DataBucket`
    pub id: String,
    /// Bucket name
    pub bucket_name: String,
}

/// Handle to a referenced bucket
#[derive(Debug, Clone)]
pub struct BucketHandle {
    node: NodeHandle,
    name: String,
}

impl BucketHandle {
    /// Bucket node
    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    /// Bucket name; known at declaration time for referenced buckets
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Construct for BucketRefProps {
    type Handle = BucketHandle;

    fn declare(self, builder: &mut GraphBuilder, scope: &Scope) -> Result<BucketHandle> {
        require("bucket reference", "bucket_name", &self.bucket_name)?;

        let node = builder.add_node(
            ResourceNode::new(scope.node_id(&self.id)?, ResourceKind::Bucket)
                .imported()
                .with_attr("BucketName", &self.bucket_name),
        )?;

        Ok(BucketHandle {
            node,
            name: self.bucket_name,
        })
    }
}
