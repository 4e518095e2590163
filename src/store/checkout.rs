use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use super::{CustomerSlot, Store};
use crate::models::order::Order;

/// Holds a customer's order slot while payment is captured.
///
/// Dropping the reservation without committing frees the slot again.
pub struct CheckoutReservation<'a> {
    store: &'a Store,
    customer_id: Uuid,
    committed: bool,
}

impl Store {
    /// `None` when the customer has an undelivered order or another checkout
    /// in flight.
    pub fn reserve_checkout(&self, customer_id: Uuid) -> Option<CheckoutReservation<'_>> {
        match self.open_orders.entry(customer_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(CustomerSlot::CheckingOut);
                Some(CheckoutReservation {
                    store: self,
                    customer_id,
                    committed: false,
                })
            }
        }
    }
}

impl CheckoutReservation<'_> {
    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }

    /// Stores the order with its line items and pins the slot to it.
    pub fn commit(mut self, order: Order) -> Order {
        self.store.orders.insert(order.id, order.clone());
        self.store
            .open_orders
            .insert(self.customer_id, CustomerSlot::Order(order.id));
        self.committed = true;
        order
    }
}

impl Drop for CheckoutReservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.store
                .open_orders
                .remove_if(&self.customer_id, |_, slot| *slot == CustomerSlot::CheckingOut);
        }
    }
}
