use crate::actor_framework::Entity;
use crate::domain::{Account, NewAccount};

impl Entity for Account {
    type Id = String;
    type CreateParams = NewAccount;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Account from creation parameters.
    fn from_create_params(id: String, params: NewAccount) -> Result<Self, String> {
        let name = params.name.trim();
        if name.is_empty() {
            return Err("account name must not be empty".to_string());
        }
        Ok(Self::new(id, name))
    }
}
