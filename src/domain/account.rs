/// A customer account. The order core only checks that one exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub name: String,
}

/// Payload for creating a new account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub name: String,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
