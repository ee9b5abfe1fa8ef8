pub mod jwt;
pub mod middleware;

pub use jwt::{AuthError, Claims, JwtTokenVerifier, TokenVerifier};
pub use middleware::{AuthenticatedUser, auth_middleware};
