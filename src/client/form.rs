use crate::{
    client::ClientError,
    models::{UserPayload, UserRecord},
    utils::{join_hobbies, split_hobbies},
};

/// Raw text of the user form, as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub age: String,
    pub city: String,
    pub email: String,
    /// Comma-separated
    pub hobbies: String,
}

impl UserForm {
    pub fn from_record(user: &UserRecord) -> Self {
        UserForm {
            name: user.name.clone(),
            age: user.age.to_string(),
            city: user.city.clone(),
            email: user.email.clone(),
            hobbies: join_hobbies(&user.hobbies),
        }
    }

    pub fn to_payload(&self) -> Result<UserPayload, ClientError> {
        let age = self
            .age
            .trim()
            .parse::<i32>()
            .map_err(|_| ClientError::InvalidInput(format!("age must be an integer, got '{}'", self.age)))?;

        Ok(UserPayload {
            name: self.name.clone(),
            age,
            city: self.city.clone(),
            email: self.email.clone(),
            hobbies: split_hobbies(&self.hobbies),
        })
    }
}

/// Where the form is in its edit cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Editing { id: String },
    /// Set only while `UserDashboard::submit` awaits the request, which holds
    /// `&mut` on the dashboard; it records what is being saved. `target` is the
    /// id being updated, `None` for a create.
    Submitting { target: Option<String> },
}
