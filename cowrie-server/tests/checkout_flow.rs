//! Checkout flow integration tests
//!
//! 覆盖下单核心性质：总额快照、库存扣减、空车拒单、整体回滚、
//! 并发预留互斥。嵌入式 RocksDB + 临时目录。

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use cowrie_server::checkout::{CheckoutError, CheckoutService};
use cowrie_server::db::DbService;
use cowrie_server::db::models::{
    AddressCreate, AddressKind, CategoryCreate, OrderStatus, ProductCreate, Role, UserCreate,
};
use cowrie_server::db::repository::{
    AddressRepository, CartRepository, CategoryRepository, OrderRepository, ProductRepository,
    UserRepository,
};

struct TestStore {
    db: Surreal<Db>,
    // Keep the tempdir alive for the duration of the test
    _tmp: tempfile::TempDir,
}

async fn open_store() -> TestStore {
    let tmp = tempfile::tempdir().unwrap();
    let service = DbService::new(&tmp.path().join("test.db").to_string_lossy())
        .await
        .unwrap();
    TestStore {
        db: service.db,
        _tmp: tmp,
    }
}

async fn seed_user(db: &Surreal<Db>, email: &str) -> RecordId {
    let repo = UserRepository::new(db.clone());
    let user = repo
        .create(UserCreate {
            email: email.to_string(),
            password: "hunter22".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role: Some(Role::Customer),
        })
        .await
        .unwrap();
    user.id.unwrap()
}

async fn seed_address(db: &Surreal<Db>, user: &RecordId, kind: AddressKind) -> RecordId {
    let repo = AddressRepository::new(db.clone());
    let address = repo
        .create(
            user.clone(),
            AddressCreate {
                street: "1 Harbour Rd".to_string(),
                city: "Portsmouth".to_string(),
                state: "HMP".to_string(),
                postal_code: "PO1".to_string(),
                country: "UK".to_string(),
                kind,
            },
        )
        .await
        .unwrap();
    address.id.unwrap()
}

async fn seed_product(db: &Surreal<Db>, name: &str, price: f64, stock: i64) -> RecordId {
    let categories = CategoryRepository::new(db.clone());
    let category = match categories.find_by_name("Shells").await.unwrap() {
        Some(c) => c,
        None => categories
            .create(CategoryCreate {
                name: "Shells".to_string(),
                description: None,
            })
            .await
            .unwrap(),
    };

    let products = ProductRepository::new(db.clone());
    let product = products
        .create(ProductCreate {
            category_id: category.id.unwrap().to_string(),
            name: name.to_string(),
            description: None,
            price,
            stock_quantity: stock,
            image_url: None,
        })
        .await
        .unwrap();
    product.id.unwrap()
}

async fn fill_cart(db: &Surreal<Db>, user: &RecordId, lines: &[(&RecordId, i64)]) -> RecordId {
    let carts = CartRepository::new(db.clone());
    let cart = carts.get_or_create(user).await.unwrap();
    let cart_id = cart.id.unwrap();
    for (product, qty) in lines {
        carts.create_item(&cart_id, product, *qty).await.unwrap();
    }
    cart_id
}

async fn stock_of(db: &Surreal<Db>, product: &RecordId) -> i64 {
    ProductRepository::new(db.clone())
        .find_by_id(&product.to_string())
        .await
        .unwrap()
        .unwrap()
        .stock_quantity
}

#[tokio::test]
async fn place_order_snapshots_prices_and_clears_cart() {
    let store = open_store().await;
    let db = &store.db;

    let user = seed_user(db, "alice@example.com").await;
    let shipping = seed_address(db, &user, AddressKind::Shipping).await;
    let billing = seed_address(db, &user, AddressKind::Billing).await;

    let conch = seed_product(db, "Conch", 10.0, 5).await;
    let murex = seed_product(db, "Murex", 5.0, 8).await;
    let cart_id = fill_cart(db, &user, &[(&conch, 2), (&murex, 3)]).await;

    let checkout = CheckoutService::new(db.clone());
    let detail = checkout
        .place_order(&user, &shipping.to_string(), &billing.to_string())
        .await
        .unwrap();

    // total = 10*2 + 5*3
    assert_eq!(detail.order.total_amount, 35.0);
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.items.len(), 2);

    // Stock debited
    assert_eq!(stock_of(db, &conch).await, 3);
    assert_eq!(stock_of(db, &murex).await, 5);

    // Cart cleared but the cart record itself persists
    let carts = CartRepository::new(db.clone());
    assert!(carts.list_items(&cart_id).await.unwrap().is_empty());
    assert!(carts.find_by_user(&user).await.unwrap().is_some());

    // Later price change must not affect the recorded snapshot
    let products = ProductRepository::new(db.clone());
    products
        .update(
            &conch.to_string(),
            cowrie_server::db::models::ProductUpdate {
                category_id: None,
                name: None,
                description: None,
                price: Some(99.0),
                stock_quantity: None,
                image_url: None,
            },
        )
        .await
        .unwrap();

    let orders = OrderRepository::new(db.clone());
    let reread = orders
        .find_detail(&detail.order.id.clone().unwrap().to_string())
        .await
        .unwrap()
        .unwrap();
    let conch_line = reread
        .items
        .iter()
        .find(|i| i.product == conch)
        .unwrap();
    assert_eq!(conch_line.price_at_purchase, 10.0);
    assert_eq!(reread.order.total_amount, 35.0);
}

#[tokio::test]
async fn empty_cart_is_rejected_without_side_effects() {
    let store = open_store().await;
    let db = &store.db;

    let user = seed_user(db, "bob@example.com").await;
    let shipping = seed_address(db, &user, AddressKind::Shipping).await;
    let billing = seed_address(db, &user, AddressKind::Billing).await;
    let conch = seed_product(db, "Conch", 10.0, 5).await;

    let checkout = CheckoutService::new(db.clone());
    let err = checkout
        .place_order(&user, &shipping.to_string(), &billing.to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));

    // No stock mutation, no order created
    assert_eq!(stock_of(db, &conch).await, 5);
    let orders = OrderRepository::new(db.clone());
    assert!(orders.find_by_user(&user).await.unwrap().is_empty());
}

#[tokio::test]
async fn insufficient_stock_on_second_line_rolls_back_first() {
    let store = open_store().await;
    let db = &store.db;

    let user = seed_user(db, "carol@example.com").await;
    let shipping = seed_address(db, &user, AddressKind::Shipping).await;
    let billing = seed_address(db, &user, AddressKind::Billing).await;

    let conch = seed_product(db, "Conch", 10.0, 5).await;
    let murex = seed_product(db, "Murex", 5.0, 1).await;
    fill_cart(db, &user, &[(&conch, 2), (&murex, 3)]).await;

    let checkout = CheckoutService::new(db.clone());
    let err = checkout
        .place_order(&user, &shipping.to_string(), &billing.to_string())
        .await
        .unwrap_err();
    match err {
        CheckoutError::InsufficientStock { name, .. } => assert_eq!(name, "Murex"),
        other => panic!("expected InsufficientStock, got {:?}", other),
    }

    // Full rollback: conch reservation returned, nothing persisted
    assert_eq!(stock_of(db, &conch).await, 5);
    assert_eq!(stock_of(db, &murex).await, 1);

    let orders = OrderRepository::new(db.clone());
    assert!(orders.find_by_user(&user).await.unwrap().is_empty());

    // Cart untouched
    let carts = CartRepository::new(db.clone());
    let cart = carts.find_by_user(&user).await.unwrap().unwrap();
    assert_eq!(carts.list_items(&cart.id.unwrap()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn missing_address_fails_before_any_reservation() {
    let store = open_store().await;
    let db = &store.db;

    let user = seed_user(db, "dave@example.com").await;
    let billing = seed_address(db, &user, AddressKind::Billing).await;
    let conch = seed_product(db, "Conch", 10.0, 5).await;
    fill_cart(db, &user, &[(&conch, 1)]).await;

    let checkout = CheckoutService::new(db.clone());
    let err = checkout
        .place_order(&user, "address:missing", &billing.to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::AddressNotFound(_)));

    assert_eq!(stock_of(db, &conch).await, 5);
}

#[tokio::test]
async fn concurrent_orders_for_last_unit_yield_one_winner() {
    let store = open_store().await;
    let db = &store.db;

    let pearl = seed_product(db, "Pearl", 100.0, 1).await;

    let alice = seed_user(db, "alice@race.example").await;
    let alice_ship = seed_address(db, &alice, AddressKind::Shipping).await;
    let alice_bill = seed_address(db, &alice, AddressKind::Billing).await;
    fill_cart(db, &alice, &[(&pearl, 1)]).await;

    let bob = seed_user(db, "bob@race.example").await;
    let bob_ship = seed_address(db, &bob, AddressKind::Shipping).await;
    let bob_bill = seed_address(db, &bob, AddressKind::Billing).await;
    fill_cart(db, &bob, &[(&pearl, 1)]).await;

    let checkout_a = CheckoutService::new(db.clone());
    let checkout_b = CheckoutService::new(db.clone());

    let alice_ship_id = alice_ship.to_string();
    let alice_bill_id = alice_bill.to_string();
    let bob_ship_id = bob_ship.to_string();
    let bob_bill_id = bob_bill.to_string();
    let (res_a, res_b) = tokio::join!(
        checkout_a.place_order(&alice, &alice_ship_id, &alice_bill_id),
        checkout_b.place_order(&bob, &bob_ship_id, &bob_bill_id),
    );

    let successes = [&res_a, &res_b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one order may win the last unit");

    let loser = if res_a.is_err() { res_a } else { res_b };
    assert!(matches!(
        loser.unwrap_err(),
        CheckoutError::InsufficientStock { .. }
    ));

    // Stock never goes negative
    assert_eq!(stock_of(db, &pearl).await, 0);

    let orders = OrderRepository::new(db.clone());
    assert_eq!(orders.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn status_updates_are_membership_checked_only() {
    let store = open_store().await;
    let db = &store.db;

    let user = seed_user(db, "erin@example.com").await;
    let shipping = seed_address(db, &user, AddressKind::Shipping).await;
    let billing = seed_address(db, &user, AddressKind::Billing).await;
    let conch = seed_product(db, "Conch", 10.0, 5).await;
    fill_cart(db, &user, &[(&conch, 1)]).await;

    let checkout = CheckoutService::new(db.clone());
    let detail = checkout
        .place_order(&user, &shipping.to_string(), &billing.to_string())
        .await
        .unwrap();
    let order_id = detail.order.id.unwrap().to_string();

    // "CANCELLED" never reaches the store: the enum parse rejects it
    assert!("CANCELLED".parse::<OrderStatus>().is_err());

    // No transition-order restriction: PENDING -> SHIPPED directly is allowed
    let orders = OrderRepository::new(db.clone());
    let shipped = orders
        .update_status(&order_id, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);

    // And back down is equally unrestricted (preserved source behavior)
    let paid = orders
        .update_status(&order_id, OrderStatus::Paid)
        .await
        .unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);
}
