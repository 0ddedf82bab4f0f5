//! mealcard-client: authenticated session against the meal-card provider API
//!
//! ```no_run
//! # async fn example() -> Result<(), mealcard_client::ClientError> {
//! use mealcard_client::{Session, SessionConfig};
//! use mealcard_core::Credentials;
//!
//! let creds = Credentials {
//!     user_id: "someone@example.com".to_string(),
//!     password: "secret".to_string(),
//! };
//! let session = Session::new(SessionConfig::default())?;
//! let token = session.login(&creds).await?;
//! let balance = session.fetch_transactions(&token, &mut std::io::stdout()).await?;
//! println!("{balance}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod session;

pub use error::ClientError;
pub use session::{
    AuthToken, DEFAULT_BASE_URL, DEFAULT_CARD_ID, MAX_BODY_BYTES, Session, SessionConfig,
    build_http_client, http_client_builder,
};
