use mongodb::bson::oid::ObjectId;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::utils::{normalize_hobbies, split_hobbies, AppError};

/// User as stored in the `users` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(deserialize_with = "deserialize_stored_age")]
    pub age: i32,
    pub city: String,
    pub email: String,
    #[serde(default)]
    pub hobbies: Vec<String>,
}

impl UserDocument {
    /// Document without `_id`, ready for insert or replace
    pub fn from_payload(payload: UserPayload) -> Self {
        UserDocument {
            id: None,
            name: payload.name,
            age: payload.age,
            city: payload.city,
            email: payload.email,
            hobbies: payload.hobbies,
        }
    }
}

/// User record as it goes over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserRecord {
    /// Hex ObjectId assigned by the store
    #[serde(rename = "_id")]
    #[schema(example = "6650f1c2a7b3c94e1d2f0a11")]
    pub id: String,
    pub name: String,
    pub age: i32,
    pub city: String,
    pub email: String,
    #[serde(default)]
    pub hobbies: Vec<String>,
}

impl UserRecord {
    pub fn with_id(id: String, payload: UserPayload) -> Self {
        UserRecord {
            id,
            name: payload.name,
            age: payload.age,
            city: payload.city,
            email: payload.email,
            hobbies: payload.hobbies,
        }
    }
}

impl From<UserDocument> for UserRecord {
    fn from(doc: UserDocument) -> Self {
        UserRecord {
            id: doc.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: doc.name,
            age: doc.age,
            city: doc.city,
            email: doc.email,
            hobbies: doc.hobbies,
        }
    }
}

/// Body of POST /users and PUT /users/{id}: every field except `_id`.
///
/// `age` may arrive as a number or a numeric string, `hobbies` as an array or
/// a comma-separated string. Both forms are normalized while deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserPayload {
    #[schema(example = "Ana")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_age")]
    #[schema(example = 30)]
    pub age: i32,
    #[schema(example = "Lisbon")]
    pub city: String,
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_hobbies")]
    #[schema(example = json!(["reading", "coding"]))]
    pub hobbies: Vec<String>,
}

impl UserPayload {
    /// Rejects empty required text fields
    pub fn validate(self) -> Result<Self, AppError> {
        for (field, value) in [("name", &self.name), ("city", &self.city), ("email", &self.email)] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("Path `{}` is required.", field)));
            }
        }
        Ok(self)
    }
}

// Documentos escritos pelo shell ou por clientes antigos podem ter `age` como
// Int64 ou Double (ex: 30.0). Aceita qualquer número inteiro que caiba em i32.
struct StoredAgeVisitor;

impl<'de> de::Visitor<'de> for StoredAgeVisitor {
    type Value = i32;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a whole number that fits in i32")
    }

    fn visit_i32<E: de::Error>(self, v: i32) -> Result<i32, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i32, E> {
        i32::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i32, E> {
        i32::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i32, E> {
        if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
            Ok(v as i32)
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }
}

fn deserialize_stored_age<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(StoredAgeVisitor)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AgeInput {
    Number(i64),
    Text(String),
}

fn deserialize_age<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let age = match AgeInput::deserialize(deserializer)
        .map_err(|_| de::Error::custom("age must be an integer"))?
    {
        AgeInput::Number(n) => n,
        AgeInput::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("age must be an integer, got \"{}\"", s)))?,
    };

    i32::try_from(age).map_err(|_| de::Error::custom(format!("age {} is out of range", age)))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HobbiesInput {
    List(Vec<String>),
    Text(String),
}

fn deserialize_hobbies<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let hobbies = Option::<HobbiesInput>::deserialize(deserializer)
        .map_err(|_| de::Error::custom("hobbies must be a list of strings or a comma-separated string"))?;

    Ok(match hobbies {
        Some(HobbiesInput::List(items)) => normalize_hobbies(items),
        Some(HobbiesInput::Text(raw)) => split_hobbies(&raw),
        None => Vec::new(),
    })
}
