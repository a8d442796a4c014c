use std::sync::Arc;

use common::error::Res;
use uuid::Uuid;

use api_client::SessionStore;
use api_client::dtos::dashboard::CartItem;

/// Service add-on cart. The one client-owned collection: entries are created
/// locally and live only in the session store.
pub struct Cart {
    store: Arc<SessionStore>,
}

impl Cart {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Cart { store }
    }

    pub fn items(&self) -> Res<Vec<CartItem>> {
        Ok(self.store.cart_json()?.unwrap_or_default())
    }

    /// Adds an item; an existing entry with the same name just gets its
    /// quantity bumped.
    pub fn add(&self, name: &str, price: i64) -> Res<CartItem> {
        let mut items = self.items()?;
        let item = if let Some(existing) = items.iter_mut().find(|i| i.name == name) {
            existing.quantity += 1;
            existing.clone()
        } else {
            let item = CartItem {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                price,
                quantity: 1,
            };
            items.push(item.clone());
            item
        };
        self.store.set_cart_json(&items)?;
        Ok(item)
    }

    pub fn remove(&self, item_id: &str) -> Res<()> {
        let mut items = self.items()?;
        items.retain(|i| i.id != item_id);
        self.store.set_cart_json(&items)
    }

    pub fn clear(&self) {
        self.store.clear_cart();
    }

    pub fn total(&self) -> Res<i64> {
        Ok(self
            .items()?
            .iter()
            .map(|i| i.price * i64::from(i.quantity))
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Cart {
        Cart::new(Arc::new(SessionStore::new()))
    }

    #[test]
    fn add_remove_and_total() {
        let cart = cart();
        let boost = cart.add("Post boost", 50).unwrap();
        cart.add("Extra platform", 200).unwrap();
        assert_eq!(cart.total().unwrap(), 250);

        cart.remove(&boost.id).unwrap();
        assert_eq!(cart.total().unwrap(), 200);
        assert_eq!(cart.items().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_names_bump_quantity() {
        let cart = cart();
        cart.add("Post boost", 50).unwrap();
        let again = cart.add("Post boost", 50).unwrap();
        assert_eq!(again.quantity, 2);
        assert_eq!(cart.items().unwrap().len(), 1);
        assert_eq!(cart.total().unwrap(), 100);
    }

    #[test]
    fn clear_empties_the_cart() {
        let cart = cart();
        cart.add("Post boost", 50).unwrap();
        cart.clear();
        assert!(cart.items().unwrap().is_empty());
        assert_eq!(cart.total().unwrap(), 0);
    }
}
