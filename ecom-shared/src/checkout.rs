/// Order placement workflow
///
/// Validates every reference an order makes, prices each line from the
/// catalogue, and stores the order with all its lines in one atomic write.
///
/// # Steps
///
/// 1. The acting user must exist
/// 2. The shipping address must exist, then the billing address
/// 3. Each item, in request order: the product must exist, the quantity must
///    be positive. The unit price is the discount price when set, otherwise
///    the list price, and is frozen into the line.
/// 4. The order (status `pending`) and its lines are written together
///
/// The first failing check aborts the whole call. Nothing is written before
/// step 4, and step 4 either stores everything or nothing.
///
/// Addresses are not checked for ownership: any existing address may be used
/// for shipping or billing.
///
/// # Example
///
/// ```
/// use ecom_shared::checkout::{place_order, OrderError, OrderItem, PlaceOrder};
/// use ecom_shared::store::memory::MemoryStore;
///
/// # async fn example() {
/// let store = MemoryStore::new();
/// let request = PlaceOrder {
///     shipping_address_id: 1,
///     billing_address_id: 1,
///     items: vec![OrderItem { product_id: 1, quantity: 1 }],
/// };
///
/// let result = place_order(&store, 42, request).await;
/// assert!(matches!(result, Err(OrderError::UserNotFound(42))));
/// # }
/// ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::models::order::{NewOrder, NewOrderDetail, Order, OrderStatus};
use crate::store::{AddressStore, OrderStore, ProductStore, StoreError, UserStore};

/// Which address of an order a lookup was for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressRole {
    Shipping,
    Billing,
}

impl fmt::Display for AddressRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressRole::Shipping => write!(f, "Shipping"),
            AddressRole::Billing => write!(f, "Billing"),
        }
    }
}

/// Why an order could not be placed
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("{role} address {id} not found")]
    AddressNotFound { role: AddressRole, id: i64 },

    #[error("Product with ID {0} not found")]
    ProductNotFound(i64),

    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: i64, quantity: i32 },

    #[error("An order needs at least one item")]
    EmptyOrder,

    /// A lookup or the final write failed in the store
    #[error("Failed to persist order: {0}")]
    PersistenceFailure(#[source] StoreError),
}

/// One requested line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,

    pub quantity: i32,
}

/// Order request as submitted by a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub shipping_address_id: i64,

    pub billing_address_id: i64,

    /// Lines in the order they should be stored
    pub items: Vec<OrderItem>,
}

/// Places an order for `user_id`
///
/// # Errors
///
/// - `OrderError::UserNotFound` if the acting user doesn't exist
/// - `OrderError::AddressNotFound` for a missing shipping or billing address
/// - `OrderError::EmptyOrder` if no items were requested
/// - `OrderError::ProductNotFound` naming the first unknown product
/// - `OrderError::InvalidQuantity` for the first item with quantity ≤ 0
/// - `OrderError::PersistenceFailure` if the store fails, including a
///   referenced row vanishing before the write commits
pub async fn place_order<S>(store: &S, user_id: i64, request: PlaceOrder) -> Result<Order, OrderError>
where
    S: UserStore + AddressStore + ProductStore + OrderStore + ?Sized,
{
    debug!(user_id, items = request.items.len(), "Placing order");

    store
        .find_user(user_id)
        .await
        .map_err(OrderError::PersistenceFailure)?
        .ok_or(OrderError::UserNotFound(user_id))?;

    for (role, id) in [
        (AddressRole::Shipping, request.shipping_address_id),
        (AddressRole::Billing, request.billing_address_id),
    ] {
        store
            .find_address(id)
            .await
            .map_err(OrderError::PersistenceFailure)?
            .ok_or(OrderError::AddressNotFound { role, id })?;
    }

    if request.items.is_empty() {
        return Err(OrderError::EmptyOrder);
    }

    let mut total_amount = 0.0;
    let mut details = Vec::with_capacity(request.items.len());

    for item in request.items {
        let product = store
            .find_product(item.product_id)
            .await
            .map_err(OrderError::PersistenceFailure)?
            .ok_or(OrderError::ProductNotFound(item.product_id))?;

        if item.quantity <= 0 {
            return Err(OrderError::InvalidQuantity {
                product_id: item.product_id,
                quantity: item.quantity,
            });
        }

        let unit_price = product.unit_price();
        total_amount += unit_price * f64::from(item.quantity);

        details.push(NewOrderDetail {
            product_id: product.id,
            quantity: item.quantity,
            price_at_purchase: unit_price,
        });
    }

    let order = store
        .insert_order(NewOrder {
            user_id,
            shipping_address_id: request.shipping_address_id,
            billing_address_id: request.billing_address_id,
            total_amount,
            status: OrderStatus::Pending,
            details,
        })
        .await
        .map_err(|e| {
            error!(user_id, error = %e, "Order write failed");
            OrderError::PersistenceFailure(e)
        })?;

    info!(
        order_id = order.id,
        user_id,
        lines = order.details.len(),
        total_amount = order.total_amount,
        "Order placed"
    );

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        address::{Address, CreateAddress},
        product::{CreateProduct, Product, UpdateProduct},
        user::{CreateUser, User, UserRole},
    };
    use crate::store::{memory::MemoryStore, StoreResult};
    use async_trait::async_trait;

    struct Fixture {
        store: MemoryStore,
        user: User,
        address: Address,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let user = store
            .create_user(CreateUser {
                email: "buyer@example.com".to_string(),
                password_hash: "hash".to_string(),
                first_name: "Buyer".to_string(),
                last_name: "One".to_string(),
                phone_number: None,
                role: UserRole::User,
            })
            .await
            .unwrap();
        let address = store
            .create_address(
                user.id,
                CreateAddress {
                    address_line1: "12 MG Road".to_string(),
                    address_line2: None,
                    city: "Bengaluru".to_string(),
                    state: "KA".to_string(),
                    country: "India".to_string(),
                    postal_code: "560001".to_string(),
                    is_default_shipping: true,
                    is_default_billing: true,
                },
            )
            .await
            .unwrap();

        Fixture { store, user, address }
    }

    async fn product(store: &MemoryStore, price: f64, discount_price: Option<f64>) -> Product {
        store
            .create_product(CreateProduct {
                category_name: "Electronics".to_string(),
                subcategory_name: None,
                name: "Headphones".to_string(),
                description: "Over-ear".to_string(),
                brand: None,
                price,
                discount_price,
                is_active: true,
            })
            .await
            .unwrap()
    }

    fn request(address_id: i64, items: &[(i64, i32)]) -> PlaceOrder {
        PlaceOrder {
            shipping_address_id: address_id,
            billing_address_id: address_id,
            items: items
                .iter()
                .map(|&(product_id, quantity)| OrderItem { product_id, quantity })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_discount_price_is_used() {
        let f = fixture().await;
        let discounted = product(&f.store, 100.0, Some(80.0)).await;

        let order = place_order(&f.store, f.user.id, request(f.address.id, &[(discounted.id, 3)]))
            .await
            .unwrap();

        assert_eq!(order.details[0].price_at_purchase, 80.0);
        assert_eq!(order.total_amount, 240.0);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_list_price_without_discount() {
        let f = fixture().await;
        let plain = product(&f.store, 50.0, None).await;

        let order = place_order(&f.store, f.user.id, request(f.address.id, &[(plain.id, 1)]))
            .await
            .unwrap();

        assert_eq!(order.details[0].price_at_purchase, 50.0);
        assert_eq!(order.total_amount, 50.0);
    }

    #[tokio::test]
    async fn test_total_and_line_order() {
        let f = fixture().await;
        let first = product(&f.store, 100.0, Some(80.0)).await;
        let second = product(&f.store, 50.0, None).await;

        let order = place_order(
            &f.store,
            f.user.id,
            request(f.address.id, &[(first.id, 3), (second.id, 2)]),
        )
        .await
        .unwrap();

        assert_eq!(order.total_amount, 340.0);
        assert_eq!(order.details.len(), 2);
        assert_eq!(order.details[0].product_id, first.id);
        assert_eq!(order.details[0].quantity, 3);
        assert_eq!(order.details[1].product_id, second.id);
        assert_eq!(order.details[1].quantity, 2);
        assert!(order.details.iter().all(|d| d.order_id == order.id));

        let stored = f.store.find_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored, order);
    }

    #[tokio::test]
    async fn test_price_is_frozen_at_purchase() {
        let f = fixture().await;
        let item = product(&f.store, 100.0, None).await;

        let order = place_order(&f.store, f.user.id, request(f.address.id, &[(item.id, 1)]))
            .await
            .unwrap();

        f.store
            .update_product(
                item.id,
                UpdateProduct {
                    price: Some(999.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = f.store.find_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.details[0].price_at_purchase, 100.0);
        assert_eq!(stored.total_amount, 100.0);
    }

    #[tokio::test]
    async fn test_unknown_product_writes_nothing() {
        let f = fixture().await;
        let valid = product(&f.store, 10.0, None).await;

        let result = place_order(
            &f.store,
            f.user.id,
            request(f.address.id, &[(valid.id, 1), (9999, 1)]),
        )
        .await;

        assert!(matches!(result, Err(OrderError::ProductNotFound(9999))));
        assert_eq!(f.store.order_count().unwrap(), 0);
        assert_eq!(f.store.order_detail_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_quantity_after_valid_item_writes_nothing() {
        let f = fixture().await;
        let valid = product(&f.store, 10.0, None).await;
        let other = product(&f.store, 20.0, None).await;

        for quantity in [0, -2] {
            let result = place_order(
                &f.store,
                f.user.id,
                request(f.address.id, &[(valid.id, 2), (other.id, quantity)]),
            )
            .await;

            match result {
                Err(OrderError::InvalidQuantity { product_id, quantity: q }) => {
                    assert_eq!(product_id, other.id);
                    assert_eq!(q, quantity);
                }
                unexpected => panic!("expected InvalidQuantity, got {:?}", unexpected),
            }
        }

        assert_eq!(f.store.order_count().unwrap(), 0);
        assert_eq!(f.store.order_detail_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_user_and_addresses() {
        let f = fixture().await;
        let item = product(&f.store, 10.0, None).await;

        let result = place_order(&f.store, 777, request(f.address.id, &[(item.id, 1)])).await;
        assert!(matches!(result, Err(OrderError::UserNotFound(777))));

        let mut bad_shipping = request(f.address.id, &[(item.id, 1)]);
        bad_shipping.shipping_address_id = 555;
        let result = place_order(&f.store, f.user.id, bad_shipping).await;
        assert!(matches!(
            result,
            Err(OrderError::AddressNotFound { role: AddressRole::Shipping, id: 555 })
        ));

        let mut bad_billing = request(f.address.id, &[(item.id, 1)]);
        bad_billing.billing_address_id = 556;
        let result = place_order(&f.store, f.user.id, bad_billing).await;
        assert!(matches!(
            result,
            Err(OrderError::AddressNotFound { role: AddressRole::Billing, id: 556 })
        ));

        assert_eq!(f.store.order_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_address_checked_before_products() {
        let f = fixture().await;

        let mut req = request(f.address.id, &[(9999, 0)]);
        req.billing_address_id = 404;

        let result = place_order(&f.store, f.user.id, req).await;
        assert!(matches!(result, Err(OrderError::AddressNotFound { id: 404, .. })));
    }

    #[tokio::test]
    async fn test_empty_order_is_rejected() {
        let f = fixture().await;

        let result = place_order(&f.store, f.user.id, request(f.address.id, &[])).await;
        assert!(matches!(result, Err(OrderError::EmptyOrder)));
        assert_eq!(f.store.order_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_foreign_address_is_accepted() {
        let f = fixture().await;
        let item = product(&f.store, 10.0, None).await;
        let other = f
            .store
            .create_user(CreateUser {
                email: "friend@example.com".to_string(),
                password_hash: "hash".to_string(),
                first_name: "Friend".to_string(),
                last_name: "Two".to_string(),
                phone_number: None,
                role: UserRole::User,
            })
            .await
            .unwrap();

        let order = place_order(&f.store, other.id, request(f.address.id, &[(item.id, 1)]))
            .await
            .unwrap();
        assert_eq!(order.user_id, other.id);
        assert_eq!(order.shipping_address_id, f.address.id);
    }

    /// Reads succeed, the final write always fails
    struct BrokenWrites(MemoryStore);

    #[async_trait]
    impl UserStore for BrokenWrites {
        async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
            self.0.find_user(id).await
        }

        async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
            self.0.find_user_by_email(email).await
        }

        async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
            self.0.create_user(data).await
        }

        async fn delete_user(&self, id: i64) -> StoreResult<bool> {
            self.0.delete_user(id).await
        }
    }

    #[async_trait]
    impl AddressStore for BrokenWrites {
        async fn find_address(&self, id: i64) -> StoreResult<Option<Address>> {
            self.0.find_address(id).await
        }

        async fn create_address(&self, user_id: i64, data: CreateAddress) -> StoreResult<Address> {
            self.0.create_address(user_id, data).await
        }
    }

    #[async_trait]
    impl ProductStore for BrokenWrites {
        async fn find_product(&self, id: i64) -> StoreResult<Option<Product>> {
            self.0.find_product(id).await
        }

        async fn create_product(&self, data: CreateProduct) -> StoreResult<Product> {
            self.0.create_product(data).await
        }

        async fn update_product(&self, id: i64, data: UpdateProduct) -> StoreResult<Option<Product>> {
            self.0.update_product(id, data).await
        }

        async fn delete_product(&self, id: i64) -> StoreResult<bool> {
            self.0.delete_product(id).await
        }
    }

    #[async_trait]
    impl OrderStore for BrokenWrites {
        async fn find_order(&self, id: i64) -> StoreResult<Option<Order>> {
            self.0.find_order(id).await
        }

        async fn insert_order(&self, _data: NewOrder) -> StoreResult<Order> {
            Err(StoreError::Internal("connection reset".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_write_is_persistence_failure() {
        let f = fixture().await;
        let item = product(&f.store, 10.0, None).await;
        let broken = BrokenWrites(f.store.clone());

        let result = place_order(&broken, f.user.id, request(f.address.id, &[(item.id, 1)])).await;

        assert!(matches!(result, Err(OrderError::PersistenceFailure(_))));
        assert_eq!(f.store.order_count().unwrap(), 0);
    }
}
