/// Authentication and authorization utilities
///
/// This module provides the security primitives for TaskForge:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: session token generation and validation
/// - [`policy`]: the role-based authorization policy
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Session Tokens**: HS256-signed JWTs, 24-hour lifetime
/// - **Authorization**: one pure decision function for every mutation
///
/// # Example
///
/// ```no_run
/// use taskforge_shared::auth::jwt::{create_token, validate_token, Claims};
/// use taskforge_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// // Session token for user 42
/// let claims = Claims::new(42);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
/// let validated = validate_token(&token, "secret-key-at-least-32-bytes-long")?;
/// assert_eq!(validated.sub, 42);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
pub mod policy;
