//! Database Models

// Serde helpers
pub mod serde_helpers;

// Auth
pub mod user;

// Customer Domain
pub mod address;
pub mod cart;

// Catalog Domain
pub mod category;
pub mod product;

// Orders
pub mod order;

// Re-exports
pub use user::{AuthResponse, LoginRequest, Role, User, UserCreate, UserId, UserUpdate};
pub use address::{Address, AddressCreate, AddressId, AddressKind, AddressUpdate};
pub use cart::{
    Cart, CartId, CartItem, CartItemCreate, CartItemUpdate, CartItemWithCart, CartItemWithProduct,
};
pub use category::{Category, CategoryCreate, CategoryId, CategoryUpdate};
pub use product::{Product, ProductCreate, ProductId, ProductUpdate};
pub use order::{
    Order, OrderDetail, OrderId, OrderItem, OrderStatus, PlaceOrderRequest, StatusUpdateRequest,
};
