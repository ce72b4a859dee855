/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT token issuance and validation
/// - [`middleware`]: bearer-token extraction and the authenticated request
///   context
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing, pinned algorithm, issuer check,
///   configurable expiration
/// - **Credential errors**: login failures are indistinguishable between
///   unknown username and wrong password

pub mod jwt;
pub mod middleware;
pub mod password;
