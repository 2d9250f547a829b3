//! Small helpers shared across the engine.
use chrono::Utc;
use rand::Rng;

use crate::db_types::InvoiceId;

/// Mints a fresh invoice id. The timestamp keeps ids sortable and human-readable; the random suffix makes
/// them globally unique even when two intents are created in the same millisecond.
pub fn new_invoice_id() -> InvoiceId {
    let millis = Utc::now().timestamp_millis();
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    InvoiceId(format!("ORDER-{millis}-{suffix:04}"))
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::new_invoice_id;

    #[test]
    fn invoice_ids_have_the_expected_shape() {
        let id = new_invoice_id();
        let parts = id.as_str().split('-').collect::<Vec<_>>();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORDER");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn invoice_ids_do_not_trivially_collide() {
        let ids = (0..100).map(|_| new_invoice_id().0).collect::<HashSet<_>>();
        assert!(ids.len() > 95, "unexpected number of collisions: {}", 100 - ids.len());
    }
}
