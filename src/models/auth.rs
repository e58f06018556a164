// src/models/auth.rs

use serde::{Deserialize, Serialize};

/// Claims carried in the caller's bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Caller identity, recorded as `changed_by` / `created_by`.
    pub sub: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub exp: Option<usize>,
}

/// The verified caller attached to the request extensions by `auth_guard`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub permissions: Vec<String>,
}

impl CurrentUser {
    /// A grant matches the exact slug, its `<domain>.*` wildcard, or `*`.
    pub fn has_permission(&self, required: &str) -> bool {
        let domain = required.split('.').next().unwrap_or(required);
        self.permissions.iter().any(|granted| {
            granted == required
                || granted == "*"
                || granted
                    .strip_suffix(".*")
                    .is_some_and(|prefix| prefix == domain)
        })
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            permissions: claims.permissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(perms: &[&str]) -> CurrentUser {
        CurrentUser {
            id: "u-1".into(),
            email: None,
            name: None,
            permissions: perms.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn exact_permission_matches() {
        assert!(user(&["vehicles.access"]).has_permission("vehicles.access"));
        assert!(!user(&["vehicles.access"]).has_permission("vehicles.edit"));
    }

    #[test]
    fn domain_wildcard_matches_only_its_domain() {
        let u = user(&["shipping.*"]);
        assert!(u.has_permission("shipping.edit"));
        assert!(u.has_permission("shipping.access"));
        assert!(!u.has_permission("sales.edit"));
    }

    #[test]
    fn global_wildcard_matches_everything() {
        assert!(user(&["*"]).has_permission("financial.edit"));
    }
}
