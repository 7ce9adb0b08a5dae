//! Seed data for the in-process backend.
//!
//! Mirrors the demo deployment: one free tenant and one pro tenant, each
//! with an admin and a member, all sharing the password `123`.

use noteplane_core::models::tenant::{Plan, Tenant};
use noteplane_core::models::user::Role;

pub const DEMO_PASSWORD: &str = "123";

pub(crate) struct SeedUser {
    pub username: &'static str,
    pub role: Role,
    pub tenant: &'static str,
}

pub(crate) fn tenants() -> Vec<Tenant> {
    vec![
        Tenant::new("acme", "Acme Corp", Plan::Free),
        Tenant::new("globex", "Globex Ltd", Plan::Pro),
    ]
}

pub(crate) static USERS: &[SeedUser] = &[
    SeedUser {
        username: "acmeAdmin",
        role: Role::Admin,
        tenant: "acme",
    },
    SeedUser {
        username: "acmeMember",
        role: Role::Member,
        tenant: "acme",
    },
    SeedUser {
        username: "globexAdmin",
        role: Role::Admin,
        tenant: "globex",
    },
    SeedUser {
        username: "globexMember",
        role: Role::Member,
        tenant: "globex",
    },
];
