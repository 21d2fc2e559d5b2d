// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;
pub mod types;
pub mod user_store;

pub use handlers::{login_handler, me_handler};
pub use jwt::{Claims, JwtManager};
pub use middleware::{auth_middleware, AuthContext};
pub use password::{hash_password, verify_password};
pub use service::{bearer_token, AuthService};
pub use types::{AuthResponse, LoginRequest, User, UserView};
pub use user_store::{BootstrapOutcome, UserStore};
