use serde::{Deserialize, Serialize};

/// Default maximum byte length of [`Account::name`].
pub const DEFAULT_MAX_NAME_LEN: usize = 100;
/// Default maximum byte length of [`Account::password`].
pub const DEFAULT_MAX_PASSWORD_LEN: usize = 50;

/// A persisted bank account.
///
/// `password` is kept as plaintext, exactly as the application hands it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub password: String,
    pub balance: f64,
}

impl Account {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        password: impl Into<String>,
        balance: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            password: password.into(),
            balance,
        }
    }
}

/// Upper bounds, in UTF-8 bytes, on the text columns of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLimits {
    pub max_name_len: usize,
    pub max_password_len: usize,
}

impl Default for TextLimits {
    fn default() -> Self {
        Self {
            max_name_len: DEFAULT_MAX_NAME_LEN,
            max_password_len: DEFAULT_MAX_PASSWORD_LEN,
        }
    }
}

impl TextLimits {
    pub fn new(max_name_len: usize, max_password_len: usize) -> Self {
        Self {
            max_name_len,
            max_password_len,
        }
    }

    pub fn check_name(&self, name: &str) -> std::result::Result<(), String> {
        check_len("name", name, self.max_name_len)
    }

    pub fn check_password(&self, password: &str) -> std::result::Result<(), String> {
        check_len("password", password, self.max_password_len)
    }

    /// Checks both text fields of `account`, returning a description of the
    /// first violation.
    pub fn check(&self, account: &Account) -> std::result::Result<(), String> {
        self.check_name(&account.name)?;
        self.check_password(&account.password)
    }
}

fn check_len(field: &str, value: &str, max: usize) -> std::result::Result<(), String> {
    if value.len() > max {
        return Err(format!("{field} is {} bytes, limit is {max}", value.len()));
    }
    Ok(())
}
