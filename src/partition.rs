use crate::models::{DeliveryRecord, RecordPartition};

pub fn partition(records: Vec<DeliveryRecord>) -> RecordPartition {
    let mut split = RecordPartition::default();
    for record in records {
        if record.is_pending() {
            split.pending.push(record);
        } else {
            split.completed.push(record);
        }
    }
    split
}
