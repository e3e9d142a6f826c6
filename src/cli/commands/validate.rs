//! Validate config command implementation

use super::load_index;
use crate::adapters::handlers::HandlerRegistry;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Treat skipped bindings as a configuration error
    #[arg(long)]
    pub strict: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let (config, index) = match load_index(config_path) {
            Ok(loaded) => loaded,
            Err(code) => return Ok(code),
        };

        println!("✅ Configuration file loaded successfully");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  HTTP Timeout: {}s", config.http.timeout_seconds);
        println!("  User Agent: {}", config.http.user_agent());
        println!(
            "  Known Handlers: {}",
            HandlerRegistry::builtin().names().join(", ")
        );
        println!();

        println!("Bindings ({}):", index.len());
        for binding in index.iter() {
            println!(
                "  {} [{}] {} → {} via {}",
                binding.handler_name,
                binding.id_prefix(),
                binding.catalog_uri,
                binding.trigger_attribute_uri,
                binding.handler.base_url(),
            );
        }

        if !index.skipped().is_empty() {
            println!();
            println!("⚠️  Skipped ({}):", index.skipped().len());
            for skipped in index.skipped() {
                println!(
                    "  {} catalog={} id_prefix={}",
                    skipped.handler_name,
                    skipped.catalog_uri.as_deref().unwrap_or("-"),
                    skipped.id_prefix.as_deref().unwrap_or("-"),
                );
                println!("     {}", skipped.reason);
            }
            if self.strict {
                println!();
                println!("❌ Configuration has skipped bindings");
                return Ok(2);
            }
        }

        println!();
        println!("✅ Configuration is valid");
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let args = ValidateArgs { strict: false };
        assert_eq!(args.execute("does-not-exist.toml").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_strict_fails_on_skipped() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[handlers.unknown_kind.catalogs]]
catalog_uri = "urn:catalog"
auto_complete_field_uri = "urn:attr"
attribute_mapping = {{ "a" = "urn:a" }}
"#
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        assert_eq!(ValidateArgs { strict: false }.execute(&path).await.unwrap(), 0);
        assert_eq!(ValidateArgs { strict: true }.execute(&path).await.unwrap(), 2);
    }
}
