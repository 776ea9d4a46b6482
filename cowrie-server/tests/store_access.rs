//! Store-level behavior tests: cart get-or-create idempotency, line merge
//! semantics, atomic stock reservation, and catalog filtering.

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use cowrie_server::db::DbService;
use cowrie_server::db::models::{CategoryCreate, ProductCreate, Role, UserCreate};
use cowrie_server::db::repository::{
    CartRepository, CategoryRepository, ProductRepository, UserRepository, RepoError,
};

struct TestStore {
    db: Surreal<Db>,
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
    repo.create(UserCreate {
        email: email.to_string(),
        password: "hunter22".to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        role: Some(Role::Customer),
    })
    .await
    .unwrap()
    .id
    .unwrap()
}

async fn seed_product(db: &Surreal<Db>, category: &str, name: &str, stock: i64) -> RecordId {
    let categories = CategoryRepository::new(db.clone());
    let cat = match categories.find_by_name(category).await.unwrap() {
        Some(c) => c,
        None => categories
            .create(CategoryCreate {
                name: category.to_string(),
                description: None,
            })
            .await
            .unwrap(),
    };

    ProductRepository::new(db.clone())
        .create(ProductCreate {
            category_id: cat.id.unwrap().to_string(),
            name: name.to_string(),
            description: Some(format!("A fine {}", name.to_lowercase())),
            price: 4.5,
            stock_quantity: stock,
            image_url: None,
        })
        .await
        .unwrap()
        .id
        .unwrap()
}

#[tokio::test]
async fn concurrent_first_access_creates_a_single_cart() {
    let store = open_store().await;
    let db = &store.db;
    let user = seed_user(db, "solo@example.com").await;

    let carts_a = CartRepository::new(db.clone());
    let carts_b = CartRepository::new(db.clone());

    let (a, b) = tokio::join!(carts_a.get_or_create(&user), carts_b.get_or_create(&user));
    let (a, b) = (a.unwrap(), b.unwrap());

    // Both callers see the same cart record
    assert_eq!(a.id, b.id);

    let mut result = db
        .query("SELECT <string>id AS id, <string>user AS user FROM cart WHERE user = $user")
        .bind(("user", user.clone()))
        .await
        .unwrap();
    let carts: Vec<serde_json::Value> = result.take(0).unwrap();
    assert_eq!(carts.len(), 1);
}

#[tokio::test]
async fn duplicate_line_is_rejected_by_unique_index() {
    let store = open_store().await;
    let db = &store.db;
    let user = seed_user(db, "dup@example.com").await;
    let shell = seed_product(db, "Shells", "Cowrie", 10).await;

    let carts = CartRepository::new(db.clone());
    let cart = carts.get_or_create(&user).await.unwrap();
    let cart_id = cart.id.unwrap();

    carts.create_item(&cart_id, &shell, 1).await.unwrap();
    // Second CREATE for the same (cart, product) must fail - merges go
    // through set_item_quantity instead
    let err = carts.create_item(&cart_id, &shell, 1).await.unwrap_err();
    assert!(matches!(err, RepoError::Database(_)));

    let items = carts.list_items(&cart_id).await.unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn reservation_is_conditional_and_atomic() {
    let store = open_store().await;
    let db = &store.db;
    let shell = seed_product(db, "Shells", "Cowrie", 3).await;

    let products = ProductRepository::new(db.clone());

    // More than available: refused, stock untouched
    assert!(!products.reserve_stock(&shell, 4).await.unwrap());
    assert_eq!(
        products
            .find_by_id(&shell.to_string())
            .await
            .unwrap()
            .unwrap()
            .stock_quantity,
        3
    );

    // Exactly available: accepted, stock hits zero
    assert!(products.reserve_stock(&shell, 3).await.unwrap());
    assert_eq!(
        products
            .find_by_id(&shell.to_string())
            .await
            .unwrap()
            .unwrap()
            .stock_quantity,
        0
    );

    // Nothing left
    assert!(!products.reserve_stock(&shell, 1).await.unwrap());

    // Release restores the reserved units
    products.release_stock(&shell, 3).await.unwrap();
    assert_eq!(
        products
            .find_by_id(&shell.to_string())
            .await
            .unwrap()
            .unwrap()
            .stock_quantity,
        3
    );
}

#[tokio::test]
async fn catalog_filters_by_category_and_search() {
    let store = open_store().await;
    let db = &store.db;

    let conch = seed_product(db, "Shells", "Conch", 5).await;
    let _murex = seed_product(db, "Shells", "Murex", 5).await;
    let _kelp = seed_product(db, "Plants", "Kelp", 5).await;

    let products = ProductRepository::new(db.clone());

    let all = products.find_all(None, None).await.unwrap();
    assert_eq!(all.len(), 3);

    // Category filter
    let shells_cat = CategoryRepository::new(db.clone())
        .find_by_name("Shells")
        .await
        .unwrap()
        .unwrap();
    let shells = products
        .find_all(Some(&shells_cat.id.unwrap().to_string()), None)
        .await
        .unwrap();
    assert_eq!(shells.len(), 2);

    // Case-insensitive substring search on name
    let found = products.find_all(None, Some("CON")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id.as_ref(), Some(&conch));

    // Search also matches descriptions
    let by_desc = products.find_all(None, Some("fine kelp")).await.unwrap();
    assert_eq!(by_desc.len(), 1);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let store = open_store().await;
    let db = &store.db;

    seed_user(db, "taken@example.com").await;

    let repo = UserRepository::new(db.clone());
    let err = repo
        .create(UserCreate {
            email: "taken@example.com".to_string(),
            password: "hunter22".to_string(),
            first_name: "Other".to_string(),
            last_name: "User".to_string(),
            role: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));
}
