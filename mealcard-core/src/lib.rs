//! mealcard-core: provider wire types, credentials and movement output

pub mod credentials;
pub mod movement;
pub mod types;

pub use credentials::{ConfigError, Credentials, PASSWORD_VAR, USER_VAR};
pub use movement::{write_movements, write_summary};
pub use rust_decimal::Decimal;
pub use types::{
    Account, Customer, LoginData, LoginRequest, LoginResponse, LooseValue, Movement,
    MovementCategory, TransactionsData, TransactionsResponse,
};
