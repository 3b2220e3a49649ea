//! Accounts and roles the workflows converge to.

/// A user account with a fixed, non-temporary password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTarget {
    pub email: &'static str,
    pub password: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
}

/// A realm role and the user it gets mapped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTarget {
    pub role_name: &'static str,
    pub description: &'static str,
    pub user_email: &'static str,
}

/// Regular customer account without any special role.
pub const REGULAR_USER: UserTarget = UserTarget {
    email: "user@afromarket.com",
    password: "Test123",
    first_name: "Regular",
    last_name: "User",
};

pub const MERCHANT_ROLE: RoleTarget = RoleTarget {
    role_name: "merchant",
    description: "Merchant role - can create and manage businesses",
    user_email: "merchant@afromarket.com",
};

pub const LOGIN_PATH: &str = "/fr/auth/login";
pub const MERCHANT_DASHBOARD_PATH: &str = "/fr/merchant/dashboard";
