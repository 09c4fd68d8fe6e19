//! Domain models

use serde::{Deserialize, Serialize};

/// One phone-book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneBookEntry {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl PhoneBookEntry {
    /// The editable fields of this entry
    pub fn fields(&self) -> EntryFields {
        EntryFields {
            name: self.name.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
        }
    }
}

/// Fields written by insert and update; the store assigns `id`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFields {
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl EntryFields {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }

    pub fn into_entry(self, id: i64) -> PhoneBookEntry {
        PhoneBookEntry {
            id,
            name: self.name,
            phone: self.phone,
            address: self.address,
        }
    }
}
