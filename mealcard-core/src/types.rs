//! Request and response bodies of the meal-card provider API.
//!
//! The provider is loose with its JSON: string and number fields show up as
//! `null`, and some fields carry a number in one response and a string or an
//! object in the next. Plain fields decode `null` to their default; fields of
//! no fixed shape are `Option<LooseValue>`.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// A field value whose JSON type the provider does not keep stable.
///
/// Serialises back to exactly what was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    Number(serde_json::Number),
    Text(String),
    Flag(bool),
    Structured(serde_json::Value),
}

impl From<i64> for LooseValue {
    fn from(n: i64) -> Self {
        LooseValue::Number(n.into())
    }
}

impl From<&str> for LooseValue {
    fn from(s: &str) -> Self {
        LooseValue::Text(s.to_string())
    }
}

/// Body of `POST /authenticate/default`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub user_id: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoginResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: LoginData,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginData {
    #[serde(deserialize_with = "null_as_default")]
    pub token: String,
    #[serde(deserialize_with = "null_as_default")]
    pub on_board_applied: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub customer: Customer,
}

/// Customer profile returned alongside the token. Not used beyond decoding.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub reg_version: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub birth_date: Option<LooseValue>,
    #[serde(deserialize_with = "null_as_default")]
    pub cell_phone_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub work_postal_code: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub residence_postal_code: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email_status: String,
    pub work_place: Option<LooseValue>,
    pub residence_place: Option<LooseValue>,
    #[serde(deserialize_with = "null_as_default")]
    pub register_status: String,
    pub lat_coordinate_work: Option<f64>,
    pub lng_coordinate_work: Option<f64>,
    pub lat_coordinate_residence: Option<f64>,
    pub lng_coordinate_residence: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub password_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
}

/// Body of `GET /protected/card/{id}/accountmovement`
///
/// Generic over the movement record so callers can decode the list into their
/// own type; [`Movement`] is the default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "M: Deserialize<'de>"))]
pub struct TransactionsResponse<M = Movement> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: TransactionsData<M>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: Vec<LooseValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default, bound(deserialize = "M: Deserialize<'de>"))]
pub struct TransactionsData<M = Movement> {
    #[serde(deserialize_with = "null_as_default")]
    pub account: Account,
    #[serde(deserialize_with = "null_as_default")]
    pub movement_list: Vec<M>,
}

impl<M> Default for TransactionsResponse<M> {
    fn default() -> Self {
        Self {
            data: TransactionsData::default(),
            message: Vec::new(),
        }
    }
}

impl<M> Default for TransactionsData<M> {
    fn default() -> Self {
        Self {
            account: Account::default(),
            movement_list: Vec::new(),
        }
    }
}

/// Card metadata and the spendable amount left on it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub iban: Option<LooseValue>,
    #[serde(deserialize_with = "null_as_default")]
    pub card_number: String,
    #[serde(deserialize_with = "decimal_from_number")]
    pub available_balance: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub card_holder_first_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub card_holder_last_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub card_activated: bool,
}

impl Account {
    pub fn holder_name(&self) -> String {
        format!(
            "{} {}",
            self.card_holder_first_name.trim(),
            self.card_holder_last_name.trim()
        )
        .trim()
        .to_string()
    }
}

/// One transaction on the card.
///
/// Serialises back to the provider's field names, which is the form printed
/// on stdout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Movement {
    #[serde(deserialize_with = "null_as_default")]
    pub transaction_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub transaction_type: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub transaction_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub amount: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub mcc: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: MovementCategory,
    pub category_id: Option<LooseValue>,
    #[serde(deserialize_with = "null_as_default")]
    pub balance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementCategory {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Goes through the shortest decimal rendering of the number, so 123.45 on the
// wire is exactly 123.45 and not the nearest binary float.
fn decimal_from_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(Decimal::ZERO);
    };
    let s = number.to_string();
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .map_err(|e| serde::de::Error::custom(format!("balance {s} out of range: {e}")))
}
