//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `procura_core` linkage with a deterministic probe.
//! - With a database path argument, bootstrap the store over that file and
//!   print per-tenant record counts.
//! - Seed passwords reach the file as SHA-256 digests, never as plain text.

use log::info;
use procura_core::seed::{PRIMARY_TENANT, SECONDARY_TENANT};
use procura_core::{AppConfig, ProcuraApp};
use sha2::{Digest, Sha256};
use std::process::ExitCode;

const PASSWORD_DOMAIN: &str = "procura-seed-password:";

/// Lowercase hex SHA-256 of the domain-tagged password, prefixed `sha256:`.
fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(format!("{PASSWORD_DOMAIN}{password}").as_bytes());
    let hex = digest
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>();
    format!("sha256:{hex}")
}

fn main() -> ExitCode {
    println!("procura_core ping={}", procura_core::ping());
    println!("procura_core version={}", procura_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let config = AppConfig::from_env().with_db_path(db_path);
    let mut app = match ProcuraApp::open(&config, &hash_password) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("procura: failed to open snapshot database: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!("event=cli_probe module=cli status=start");

    for notice in app.drain_notices() {
        println!("notice: {}", notice.message());
    }
    for tenant in [PRIMARY_TENANT, SECONDARY_TENANT] {
        let counts = app
            .snapshot()
            .tenant_counts(tenant)
            .into_iter()
            .map(|(kind, count)| format!("{}={count}", kind.as_str()))
            .collect::<Vec<_>>()
            .join(" ");
        println!("tenant={tenant} {counts}");
    }

    let (_, flushed) = app.shutdown();
    match flushed {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("procura: final save failed: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::hash_password;
    use procura_core::seed_snapshot;

    #[test]
    fn hashed_password_hides_the_plain_text() {
        let hashed = hash_password("demo123");
        assert!(hashed.starts_with("sha256:"));
        assert_eq!(hashed.len(), "sha256:".len() + 64);
        assert!(!hashed.contains("demo123"));
        assert_eq!(hashed, hash_password("demo123"));
        assert_ne!(hashed, hash_password("demo124"));
    }

    #[test]
    fn seeded_users_carry_only_digests() {
        let snapshot = seed_snapshot(chrono::Utc::now(), &hash_password);
        assert!(snapshot.users.iter().any(|user| user.password.is_some()));
        for user in &snapshot.users {
            if let Some(password) = user.password.as_deref() {
                assert!(password.starts_with("sha256:"), "{} kept a plain password", user.id);
            }
        }
    }
}
