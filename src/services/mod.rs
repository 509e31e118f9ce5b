pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, AuthUser};
pub use auth_service_impl::SeaOrmAuthService;

pub mod habit_service;
pub mod habit_service_impl;
pub use habit_service::{HabitError, HabitService};
pub use habit_service_impl::SeaOrmHabitService;

pub mod token;
pub use token::{Claims, JwtManager, TokenError};
