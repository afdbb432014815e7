//! Role-based access policy
//!
//! A static table of resource -> role -> permitted actions. The table is built
//! once at start-up (compiled-in default or a JSON file) and shared read-only
//! through `AppState`. Missing data always means "deny".

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// User role as asserted by the upstream auth provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Supplier,
    /// Older clients send `buyer`
    #[serde(alias = "buyer")]
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supplier => "supplier",
            Role::Customer => "customer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "supplier" => Ok(Role::Supplier),
            "customer" | "buyer" => Ok(Role::Customer),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// CRUD action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Create, Action::Read, Action::Update, Action::Delete];
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Read => write!(f, "read"),
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

impl std::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "create" => Ok(Action::Create),
            "read" => Ok(Action::Read),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            _ => Err(format!("Unknown action: {}", s)),
        }
    }
}

/// Resource names used by the HTTP handlers
pub mod resources {
    pub const ORDERS: &str = "orders";
    pub const PRODUCTS: &str = "products";
    pub const SUPPLIERS: &str = "suppliers";
    pub const CONSOLIDATIONS: &str = "consolidations";
    pub const PAYMENTS: &str = "payments";
    pub const WAREHOUSE: &str = "warehouse";
    pub const DASHBOARD: &str = "dashboard";
}

/// Immutable permission table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTable {
    rules: HashMap<String, HashMap<Role, HashSet<Action>>>,
}

impl PermissionTable {
    pub fn new(rules: HashMap<String, HashMap<Role, HashSet<Action>>>) -> Self {
        Self { rules }
    }

    /// Load a table from a JSON file shaped like
    /// `{ "orders": { "admin": ["create", "read"], ... }, ... }`
    pub fn from_json_file(
        path: impl AsRef<Path>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let table: PermissionTable = serde_json::from_str(&raw)?;

        tracing::info!(
            path = %path.as_ref().display(),
            resources = table.rules.len(),
            "Loaded permission table"
        );

        Ok(table)
    }

    /// Can `role` perform `action` on `resource`?
    pub fn has_permission(&self, role: Option<Role>, resource: &str, action: Action) -> bool {
        let Some(role) = role else {
            return false;
        };

        self.rules
            .get(resource)
            .and_then(|by_role| by_role.get(&role))
            .map(|actions| actions.contains(&action))
            .unwrap_or(false)
    }

    /// String-level lookup; unknown role or action names are denied
    pub fn has_permission_str(
        &self,
        role: Option<&str>,
        resource: Option<&str>,
        action: Option<&str>,
    ) -> bool {
        let role = role.and_then(|r| r.parse::<Role>().ok());
        let (Some(resource), Some(action)) = (resource, action.and_then(|a| a.parse::<Action>().ok())) else {
            return false;
        };

        self.has_permission(role, resource, action)
    }

    /// Actions `role` may take on `resource`
    pub fn allowed_actions(&self, role: Role, resource: &str) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|a| self.has_permission(Some(role), resource, *a))
            .collect()
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        use Action::*;
        use Role::*;

        const CRUD: [Action; 4] = [Create, Read, Update, Delete];

        let mut table = Self { rules: HashMap::new() };

        table.grant(resources::ORDERS, Admin, &CRUD);
        table.grant(resources::ORDERS, Supplier, &[Read, Update]);
        table.grant(resources::ORDERS, Customer, &[Create, Read, Update]);

        table.grant(resources::PRODUCTS, Admin, &CRUD);
        table.grant(resources::PRODUCTS, Supplier, &CRUD);
        table.grant(resources::PRODUCTS, Customer, &[Read]);

        table.grant(resources::SUPPLIERS, Admin, &CRUD);
        table.grant(resources::SUPPLIERS, Supplier, &[Read, Update]);
        table.grant(resources::SUPPLIERS, Customer, &[Read]);

        table.grant(resources::CONSOLIDATIONS, Admin, &CRUD);
        table.grant(resources::CONSOLIDATIONS, Supplier, &[Read]);
        table.grant(resources::CONSOLIDATIONS, Customer, &[Read]);

        table.grant(resources::PAYMENTS, Admin, &CRUD);
        table.grant(resources::PAYMENTS, Customer, &[Read]);

        table.grant(resources::WAREHOUSE, Admin, &CRUD);
        table.grant(resources::WAREHOUSE, Supplier, &[Read]);

        table.grant(resources::DASHBOARD, Admin, &[Read]);

        table
    }
}

impl PermissionTable {
    fn grant(&mut self, resource: &str, role: Role, actions: &[Action]) {
        self.rules
            .entry(resource.to_string())
            .or_default()
            .entry(role)
            .or_default()
            .extend(actions.iter().copied());
    }
}
