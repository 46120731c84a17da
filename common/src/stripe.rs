use stripe::Client;

use crate::error::{AppError, Res};

/// Builds a Stripe client, refusing to do so without a secret key.
pub fn create_client(secret_key: &str) -> Res<Client> {
    if secret_key.trim().is_empty() {
        return Err(AppError::Configuration(
            "Stripe is not configured (STRIPE_SECRET_KEY is empty)".to_string(),
        ));
    }
    Ok(Client::new(secret_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_a_configuration_error() {
        assert!(matches!(create_client("  "), Err(AppError::Configuration(_))));
        assert!(create_client("sk_test_123").is_ok());
    }
}
