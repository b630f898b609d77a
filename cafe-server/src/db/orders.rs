//! Order persistence

use super::{
    ACTIVE_ORDERS_TABLE, ORDERS_BY_CREATED_TABLE, ORDERS_TABLE, Storage, StorageError, StorageResult,
    from_bytes, to_bytes,
};
use redb::{ReadableDatabase, ReadableTable};
use shared::order::{Order, OrderStatus};

/// Outcome of a status compare-and-set
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    /// Status matched the expected value and was written
    Applied(Order),
    /// No order with that id
    NotFound,
    /// Status changed since it was read; carries the current record
    Stale(Order),
}

impl Storage {
    /// Persist a freshly created order and index it
    ///
    /// Never overwrites: an existing id fails with [`StorageError::OrderExists`].
    pub fn insert_order(&self, order: &Order) -> StorageResult<()> {
        let bytes = to_bytes(order)?;
        let txn = self.begin_write()?;
        {
            let mut orders = txn.open_table(ORDERS_TABLE)?;
            if orders.get(order.id)?.is_some() {
                return Err(StorageError::OrderExists(order.id));
            }
            orders.insert(order.id, bytes.as_slice())?;

            let mut by_created = txn.open_table(ORDERS_BY_CREATED_TABLE)?;
            by_created.insert((order.created_at, order.id), ())?;

            if !order.status.is_terminal() {
                let mut active = txn.open_table(ACTIVE_ORDERS_TABLE)?;
                active.insert(order.id, ())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_order(&self, id: i64) -> StorageResult<Option<Order>> {
        let txn = self.db.begin_read()?;
        let orders = txn.open_table(ORDERS_TABLE)?;
        match orders.get(id)? {
            Some(guard) => Ok(Some(from_bytes(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Set `status` to `to` only if it is still `expected`
    ///
    /// Read, compare and write happen inside one write transaction, so two
    /// callers racing from the same status cannot both apply.
    pub fn update_order_status(
        &self,
        id: i64,
        expected: OrderStatus,
        to: OrderStatus,
        changed_by: i64,
        changed_at: i64,
    ) -> StorageResult<StatusUpdate> {
        let txn = self.begin_write()?;
        let outcome = {
            let mut orders = txn.open_table(ORDERS_TABLE)?;
            let current = orders.get(id)?.map(|guard| guard.value().to_vec());
            match current {
                None => StatusUpdate::NotFound,
                Some(bytes) => {
                    let mut order: Order = from_bytes(&bytes)?;
                    if order.status != expected {
                        StatusUpdate::Stale(order)
                    } else {
                        order.status = to;
                        order.status_changed_at = changed_at;
                        order.status_changed_by = Some(changed_by);
                        let bytes = to_bytes(&order)?;
                        orders.insert(id, bytes.as_slice())?;

                        if to.is_terminal() {
                            let mut active = txn.open_table(ACTIVE_ORDERS_TABLE)?;
                            active.remove(id)?;
                        }
                        StatusUpdate::Applied(order)
                    }
                }
            }
        };

        match outcome {
            StatusUpdate::Applied(_) => txn.commit()?,
            _ => txn.abort()?,
        }
        Ok(outcome)
    }

    /// Orders with `from <= created_at < to`, oldest first
    pub fn orders_created_between(&self, from: i64, to: i64) -> StorageResult<Vec<Order>> {
        if from >= to {
            return Ok(Vec::new());
        }
        let txn = self.db.begin_read()?;
        let by_created = txn.open_table(ORDERS_BY_CREATED_TABLE)?;
        let orders = txn.open_table(ORDERS_TABLE)?;

        let mut result = Vec::new();
        for entry in by_created.range((from, i64::MIN)..(to, i64::MIN))? {
            let (key, _) = entry?;
            let (_, id) = key.value();
            if let Some(guard) = orders.get(id)? {
                result.push(from_bytes(guard.value())?);
            }
        }
        Ok(result)
    }

    /// All non-terminal orders (unordered)
    pub fn active_orders(&self) -> StorageResult<Vec<Order>> {
        let txn = self.db.begin_read()?;
        let active = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let orders = txn.open_table(ORDERS_TABLE)?;

        let mut result = Vec::new();
        for entry in active.iter()? {
            let (key, _) = entry?;
            if let Some(guard) = orders.get(key.value())? {
                result.push(from_bytes(guard.value())?);
            }
        }
        Ok(result)
    }
}
