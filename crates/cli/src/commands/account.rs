//! Account session commands.

#![allow(clippy::print_stdout)]

use verdant_client::Storefront;
use verdant_client::types::RegisterRequest;

use verdant_core::{Email, EmailError};

/// Errors specific to account commands.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// The email did not parse.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The backend rejected the operation.
    #[error(transparent)]
    Api(#[from] verdant_client::error::ApiError),
}

/// Sign in and report the merged cart size.
pub async fn login(store: &Storefront, email: &str, password: &str) -> Result<(), AccountError> {
    let email = Email::parse(email)?;
    let profile = store.login(&email, password).await?;

    println!("signed in as {}", profile.email);
    let count = store.cart().state().count();
    if count > 0 {
        println!("cart has {count} items");
    }
    Ok(())
}

/// Create an account and start its session.
pub async fn register(
    store: &Storefront,
    email: &str,
    password: &str,
    first_name: String,
    last_name: String,
) -> Result<(), AccountError> {
    let request = RegisterRequest {
        email: Email::parse(email)?,
        password: password.to_owned(),
        first_name,
        last_name,
    };
    let profile = store.register(&request).await?;

    println!("account created for {}", profile.email);
    Ok(())
}

/// Sign out.
pub fn logout(store: &Storefront) {
    store.logout();
    println!("signed out");
}

/// Show the signed-in profile.
pub fn whoami(store: &Storefront) {
    match store.session().current().profile() {
        Some(profile) => {
            println!("{}", profile.email);
            if let (Some(first), Some(last)) = (&profile.first_name, &profile.last_name) {
                println!("{first} {last}");
            }
        }
        None => println!("not signed in"),
    }
}

/// List saved addresses.
pub async fn addresses(store: &Storefront) -> Result<(), AccountError> {
    let addresses = store.auth().addresses().await?;

    if addresses.is_empty() {
        println!("no saved addresses");
        return Ok(());
    }

    for address in &addresses {
        let default = if address.is_default { " (default)" } else { "" };
        println!("  [{}] {}{}", address.id, address.full_name, default);
        println!("      {}, {} {}", address.line1, address.city, address.postal_code);
    }
    Ok(())
}
