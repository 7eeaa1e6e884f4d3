pub mod access_jwt;
pub mod factory;
pub mod jwt;
pub mod password;
pub mod resolver;
pub mod token_issuer;

pub use access_jwt::{AccessJwtError, AccessTokenVerifier};
pub use factory::{AuthBuildError, AuthServices, build_auth_services};
pub use jwt::{JwtIssuer, KeyError};
pub use password::{PasswordEncoder, PasswordError};
pub use resolver::{CredentialResolver, ResolveError, TokenResolver};
pub use token_issuer::{IssuedToken, TokenIssuer};
