//! Entity materialization from column stores

use crate::chunk::InternalRef;
use crate::projection::FetchPlan;
use crate::series::TraceSeries;
use tracestore_core::{Entity, ReadScope, Result};
use tracing::trace;

impl TraceSeries {
    /// Build one entity from its field record and, if requested, its data
    /// binary. Either read failing fails the entity.
    pub(crate) fn materialize(
        &self,
        shard: u32,
        internal: &InternalRef,
        ts: u64,
        plan: &FetchPlan,
    ) -> Result<Entity> {
        let stores = self.schema.stores_for_byte(internal.state)?;
        let scope = ReadScope::at(shard, stores.fields, ts);
        let raw = self.reader.get_at(&scope, &internal.series_id, ts)?;
        let record = self.records.decode_record(&raw)?;

        let fields = if plan.fields.is_empty() {
            None
        } else {
            Some(record.project(&plan.fields))
        };

        let data_binary = if plan.fetch_data_binary {
            let scope = ReadScope::at(shard, stores.data, ts);
            Some(self.reader.get_at(&scope, &internal.series_id, ts)?)
        } else {
            None
        };

        trace!(
            store = stores.fields,
            record_fields = record.fields.len(),
            "materialized entity"
        );
        Ok(Entity {
            entity_id: record.entity_id,
            timestamp_nanos: record.timestamp_nanos,
            fields,
            data_binary,
        })
    }
}
