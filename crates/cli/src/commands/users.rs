//! User listing command.

use hridved_api::db::UserRepository;
use hridved_api::models::User;

use super::{CliError, connect};

/// Print a table of every account.
///
/// # Errors
///
/// Returns an error if the query fails.
#[allow(clippy::print_stdout)]
pub async fn list() -> Result<(), CliError> {
    let pool = connect().await?;
    let users = UserRepository::new(&pool).list().await?;

    println!("{}", table(&users));
    println!("\nTo make a user admin, run: hv-cli admin promote <email>");
    Ok(())
}

fn table(users: &[User]) -> String {
    let rule = "-".repeat(70);
    let mut out = format!(
        "{rule}\n| {:<20} | {:<30} | {:<10} |\n{rule}\n",
        "Name", "Email", "Admin"
    );
    for user in users {
        out.push_str(&format!(
            "| {:<20} | {:<30} | {:<10} |\n",
            user.name,
            user.email.as_str(),
            if user.is_admin { "YES" } else { "NO" }
        ));
    }
    out.push_str(&rule);
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use hridved_core::{Email, OAuthProvider, UserId};

    use super::*;

    #[test]
    fn test_table_rows() {
        let user = User {
            id: UserId::new(1),
            name: "Asha".to_string(),
            email: Email::parse("asha@example.com").unwrap(),
            password_hash: None,
            is_admin: true,
            avatar: String::new(),
            profile_image: String::new(),
            oauth_provider: OAuthProvider::default(),
            oauth_id: String::new(),
            phone: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let out = table(&[user]);
        assert!(out.contains("| Asha "));
        assert!(out.contains("asha@example.com"));
        assert!(out.contains("| YES "));
        assert_eq!(out.lines().count(), 5);
    }
}
