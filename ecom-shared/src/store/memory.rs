/// In-memory implementation of the store traits
///
/// Holds every table in a single mutex-guarded state so each operation is
/// atomic. Referential rules of the SQL schema are emulated on write:
/// a missing referenced row rejects the whole write with a `Conflict`.
///
/// Cloning a `MemoryStore` shares the underlying state.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{
    AddressStore, OrderStore, ProductStore, Store, StoreError, StoreResult, UserStore,
    USERS_EMAIL_KEY,
};
use crate::models::{
    address::{Address, CreateAddress},
    order::{NewOrder, Order, OrderDetail},
    product::{CreateProduct, Product, UpdateProduct},
    user::{CreateUser, User},
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    addresses: BTreeMap<i64, Address>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, Order>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn detail_count(&self) -> usize {
        self.orders.values().map(|o| o.details.len()).sum()
    }
}

/// Store backed by process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Internal("memory store lock poisoned".to_string()))
    }

    /// Number of stored orders
    pub fn order_count(&self) -> StoreResult<usize> {
        Ok(self.tables()?.orders.len())
    }

    /// Number of stored order lines across all orders
    pub fn order_detail_count(&self) -> StoreResult<usize> {
        Ok(self.tables()?.detail_count())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables()?;

        if tables.users.values().any(|u| u.email == data.email) {
            return Err(StoreError::conflict(
                USERS_EMAIL_KEY,
                format!("email {} is already registered", data.email),
            ));
        }

        let user = User {
            id: tables.next_id(),
            email: data.email,
            password_hash: data.password_hash,
            first_name: data.first_name,
            last_name: data.last_name,
            phone_number: data.phone_number,
            role: data.role,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables()?;

        if !tables.users.contains_key(&id) {
            return Ok(false);
        }

        // Another user's order may still point at one of these addresses
        let referenced_elsewhere = tables.orders.values().any(|o| {
            o.user_id != id
                && [o.shipping_address_id, o.billing_address_id]
                    .iter()
                    .any(|a| tables.addresses.get(a).is_some_and(|addr| addr.user_id == id))
        });
        if referenced_elsewhere {
            return Err(StoreError::conflict(
                "orders_shipping_address_id_fkey",
                "an address of this user is used by another user's order",
            ));
        }

        tables.orders.retain(|_, o| o.user_id != id);
        tables.addresses.retain(|_, a| a.user_id != id);
        tables.users.remove(&id);

        Ok(true)
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn find_address(&self, id: i64) -> StoreResult<Option<Address>> {
        Ok(self.tables()?.addresses.get(&id).cloned())
    }

    async fn create_address(&self, user_id: i64, data: CreateAddress) -> StoreResult<Address> {
        let mut tables = self.tables()?;

        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::conflict(
                "addresses_user_id_fkey",
                format!("user {} does not exist", user_id),
            ));
        }

        let address = Address {
            id: tables.next_id(),
            user_id,
            address_line1: data.address_line1,
            address_line2: data.address_line2,
            city: data.city,
            state: data.state,
            country: data.country,
            postal_code: data.postal_code,
            is_default_shipping: data.is_default_shipping,
            is_default_billing: data.is_default_billing,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.addresses.insert(address.id, address.clone());

        Ok(address)
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find_product(&self, id: i64) -> StoreResult<Option<Product>> {
        Ok(self.tables()?.products.get(&id).cloned())
    }

    async fn create_product(&self, data: CreateProduct) -> StoreResult<Product> {
        let mut tables = self.tables()?;

        let product = Product {
            id: tables.next_id(),
            category_name: data.category_name,
            subcategory_name: data.subcategory_name,
            name: data.name,
            description: data.description,
            brand: data.brand,
            price: data.price,
            discount_price: data.discount_price,
            is_active: data.is_active,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.products.insert(product.id, product.clone());

        Ok(product)
    }

    async fn update_product(&self, id: i64, data: UpdateProduct) -> StoreResult<Option<Product>> {
        let mut tables = self.tables()?;

        let Some(product) = tables.products.get_mut(&id) else {
            return Ok(None);
        };
        data.apply_to(product);

        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables()?;

        let referenced = tables
            .orders
            .values()
            .flat_map(|o| o.details.iter())
            .any(|d| d.product_id == id);
        if referenced {
            return Err(StoreError::conflict(
                "order_details_product_id_fkey",
                format!("product {} is referenced by an order", id),
            ));
        }

        Ok(tables.products.remove(&id).is_some())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find_order(&self, id: i64) -> StoreResult<Option<Order>> {
        Ok(self.tables()?.orders.get(&id).cloned())
    }

    async fn insert_order(&self, data: NewOrder) -> StoreResult<Order> {
        let mut tables = self.tables()?;

        // Every reference is checked before any id is handed out
        if !tables.users.contains_key(&data.user_id) {
            return Err(StoreError::conflict(
                "orders_user_id_fkey",
                format!("user {} does not exist", data.user_id),
            ));
        }
        for (constraint, address_id) in [
            ("orders_shipping_address_id_fkey", data.shipping_address_id),
            ("orders_billing_address_id_fkey", data.billing_address_id),
        ] {
            if !tables.addresses.contains_key(&address_id) {
                return Err(StoreError::conflict(
                    constraint,
                    format!("address {} does not exist", address_id),
                ));
            }
        }
        if let Some(line) = data
            .details
            .iter()
            .find(|line| !tables.products.contains_key(&line.product_id))
        {
            return Err(StoreError::conflict(
                "order_details_product_id_fkey",
                format!("product {} does not exist", line.product_id),
            ));
        }
        if data.details.iter().any(|line| line.quantity <= 0) {
            return Err(StoreError::conflict(
                "order_details_quantity_check",
                "quantity must be positive",
            ));
        }

        let now = Utc::now();
        let order_id = tables.next_id();
        let mut details = Vec::with_capacity(data.details.len());
        for line in data.details {
            details.push(OrderDetail {
                id: tables.next_id(),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                price_at_purchase: line.price_at_purchase,
                created_at: now,
            });
        }

        let order = Order {
            id: order_id,
            user_id: data.user_id,
            shipping_address_id: data.shipping_address_id,
            billing_address_id: data.billing_address_id,
            order_date: now,
            total_amount: data.total_amount,
            status: data.status,
            details,
        };
        tables.orders.insert(order.id, order.clone());

        Ok(order)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.tables().map(|_| ())
    }
}
