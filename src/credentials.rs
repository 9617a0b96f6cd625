use crate::config::PasswordStorage;
use crate::database::{JsonFile, Registration, UserDb};
use crate::error::StoreError;
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::PathBuf;

const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// Username to password mapping persisted as one JSON object.
///
/// Passwords are stored in plaintext unless [`PasswordStorage::Bcrypt`] is
/// selected, in which case new registrations store a bcrypt hash and older
/// plaintext entries keep authenticating.
#[derive(Debug)]
pub struct CredentialStore {
    file: JsonFile,
    users: BTreeMap<String, String>,
    storage: PasswordStorage,
}

impl CredentialStore {
    pub fn open<P: Into<PathBuf>>(path: P, storage: PasswordStorage) -> CredentialStore {
        let file = JsonFile::new(path);
        let users: BTreeMap<String, String> = file.load_or_default();
        debug!("Loaded {} users from {}", users.len(), file.path().display());
        CredentialStore {
            file,
            users,
            storage,
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn storage(&self) -> PasswordStorage {
        self.storage
    }

    /// Inserts a password already encoded with [`PasswordStorage::encode`]
    /// and persists the store. Lets callers hash without holding the store.
    pub fn insert_encoded(
        &mut self,
        username: &str,
        encoded: String,
    ) -> Result<Registration, StoreError> {
        if self.users.contains_key(username) {
            return Ok(Registration::AlreadyExists);
        }
        self.users.insert(username.to_owned(), encoded);
        if let Err(err) = self.file.save(&self.users) {
            self.users.remove(username);
            return Err(err);
        }
        info!("Registered user {}", username);
        Ok(Registration::Created)
    }
}

impl PasswordStorage {
    pub fn encode(self, password: &str) -> Result<String, StoreError> {
        match self {
            PasswordStorage::Plaintext => Ok(password.to_owned()),
            PasswordStorage::Bcrypt => Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?),
        }
    }
}

fn is_bcrypt_hash(stored: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|prefix| stored.starts_with(prefix))
}

impl UserDb for CredentialStore {
    type Error = StoreError;

    fn authenticate(&self, username: &str, password: &str) -> bool {
        let stored = match self.users.get(username) {
            Some(stored) => stored,
            None => return false,
        };
        match self.storage {
            PasswordStorage::Bcrypt if is_bcrypt_hash(stored) => {
                bcrypt::verify(password, stored).unwrap_or_else(|err| {
                    debug!("Bad password hash for {}: {:?}", username, err);
                    false
                })
            }
            _ => stored == password,
        }
    }

    fn register(&mut self, username: &str, password: &str) -> Result<Registration, StoreError> {
        if self.users.contains_key(username) {
            return Ok(Registration::AlreadyExists);
        }
        let encoded = self.storage.encode(password)?;
        self.insert_encoded(username, encoded)
    }
}
