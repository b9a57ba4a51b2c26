//! Projection planning
//!
//! Turns the caller's requested field names into a [`FetchPlan`]: the
//! ordinals to pick from each field record and whether to read the data
//! binary. Planning is pure; it runs before any store is touched.

use crate::schema::SeriesSchema;
use tracestore_core::{Error, FieldEntry, Result, DATA_BINARY_FIELD_NAME};
use tracing::debug;

/// What to read for every resolved entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchPlan {
    /// Read the opaque data binary
    pub fetch_data_binary: bool,
    /// Fields to project, in request order
    pub fields: Vec<FieldEntry>,
}

impl FetchPlan {
    /// Check if the plan would produce nothing but ids and timestamps
    pub fn is_empty(&self) -> bool {
        !self.fetch_data_binary && self.fields.is_empty()
    }
}

/// Resolve `projection` against the schema
///
/// An unknown name fails the whole plan with `FieldNotFound`.
pub fn plan(schema: &SeriesSchema, projection: &[String]) -> Result<FetchPlan> {
    let mut plan = FetchPlan::default();
    for name in projection {
        if name == DATA_BINARY_FIELD_NAME {
            plan.fetch_data_binary = true;
            debug!("to fetch data binary");
            continue;
        }
        let index = schema
            .field_index(name)
            .ok_or_else(|| Error::FieldNotFound { name: name.clone() })?;
        debug!(name = %name, index, "to fetch the field");
        plan.fields.push(FieldEntry::new(name.clone(), index));
    }
    Ok(plan)
}
