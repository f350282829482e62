//! Command-line and environment configuration for the server binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::network::NetworkConfig;
use crate::store::TableDefinition;

#[derive(Debug, Parser)]
#[command(
    name = "gridtable-server",
    about = "Serves an editable, schema-bound table over htmx"
)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, env = "GRIDTABLE_HOST", default_value = "0.0.0.0")]
    pub host: String,
    /// Port to listen on (0 picks a free port)
    #[arg(long, env = "GRIDTABLE_PORT", default_value_t = 8080)]
    pub port: u16,
    /// JSON table definition; the built-in task list is served without one
    #[arg(long, env = "GRIDTABLE_DEFINITION")]
    pub definition: Option<PathBuf>,
    /// Route the table is mounted on
    #[arg(long, default_value = "/table", value_parser = parse_route)]
    pub route: String,
    /// Allowed CORS origin; repeat for several, `*` for any
    #[arg(long = "cors-origin", default_value = "*")]
    pub cors_origins: Vec<String>,
    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
    /// Emit logs as JSON lines
    #[arg(long, env = "GRIDTABLE_LOG_JSON")]
    pub log_json: bool,
}

impl ServerArgs {
    #[must_use]
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
            table_route: self.route.clone(),
            ..NetworkConfig::default()
        }
    }

    /// Loads the definition file if one was given, otherwise the demo table.
    ///
    /// # Errors
    ///
    /// Propagates failures from [`TableDefinition::from_file`].
    pub fn table_definition(&self) -> anyhow::Result<TableDefinition> {
        match &self.definition {
            Some(path) => TableDefinition::from_file(path),
            None => Ok(crate::demo::task_table()),
        }
    }
}

fn parse_route(route: &str) -> Result<String, String> {
    if route.len() > 1 && route.starts_with('/') && !route.contains(['?', '#']) {
        Ok(route.to_string())
    } else {
        Err(format!("route must be a path like /table, got {route:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_network_defaults() {
        let args = ServerArgs::try_parse_from(["gridtable-server"]).unwrap();
        let config = args.network_config();
        let defaults = NetworkConfig::default();

        assert_eq!(config.host, defaults.host);
        assert_eq!(config.port, defaults.port);
        assert_eq!(config.table_route, defaults.table_route);
        assert_eq!(config.request_timeout, defaults.request_timeout);
        assert_eq!(config.cors_origins, defaults.cors_origins);
        assert!(!args.log_json);
    }

    #[test]
    fn flags_override_defaults() {
        let args = ServerArgs::try_parse_from([
            "gridtable-server",
            "--port",
            "9000",
            "--route",
            "/tasks",
            "--cors-origin",
            "http://a",
            "--cors-origin",
            "http://b",
            "--timeout-secs",
            "5",
        ])
        .unwrap();
        let config = args.network_config();

        assert_eq!(config.port, 9000);
        assert_eq!(config.table_route, "/tasks");
        assert_eq!(config.cors_origins, vec!["http://a", "http://b"]);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn route_must_be_a_plain_path() {
        assert!(ServerArgs::try_parse_from(["gridtable-server", "--route", "table"]).is_err());
        assert!(ServerArgs::try_parse_from(["gridtable-server", "--route", "/"]).is_err());
        assert!(ServerArgs::try_parse_from(["gridtable-server", "--route", "/t?x=1"]).is_err());
    }

    #[test]
    fn missing_definition_uses_demo() {
        let args = ServerArgs::try_parse_from(["gridtable-server"]).unwrap();
        assert_eq!(args.table_definition().unwrap().path, "data");
    }
}
