use std::fmt;

use oauth2::Scope as OAuth2Scope;

/// Permission level for an API scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ReadWrite,
    ReadOnly,
}

/// Predefined scopes understood by the accounting API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeType {
    Invoices(Permission),
    Contacts(Permission),
}

impl ScopeType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Invoices(Permission::ReadWrite) => "invoices",
            Self::Invoices(Permission::ReadOnly) => "invoices.read",
            Self::Contacts(Permission::ReadWrite) => "contacts",
            Self::Contacts(Permission::ReadOnly) => "contacts.read",
        }
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A space-separated collection of scopes requested during authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope(Vec<ScopeType>);

impl Scope {
    /// The scopes this pipeline needs: read access to invoices and contacts.
    #[must_use]
    pub fn read_only() -> Self {
        Self(vec![
            ScopeType::Invoices(Permission::ReadOnly),
            ScopeType::Contacts(Permission::ReadOnly),
        ])
    }

    pub fn push(&mut self, scope: ScopeType) {
        self.0.push(scope);
    }

    /// Converts the collection into the single space-separated scope value
    /// the `oauth2` crate expects.
    #[must_use]
    pub fn into_oauth2(self) -> OAuth2Scope {
        OAuth2Scope::new(self.to_string())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&joined)
    }
}

impl From<Vec<ScopeType>> for Scope {
    fn from(scopes: Vec<ScopeType>) -> Self {
        Self(scopes)
    }
}

impl FromIterator<ScopeType> for Scope {
    fn from_iter<I: IntoIterator<Item = ScopeType>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
