//! Command-line arguments

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use integrationcli::api::iam::MemberType;
use integrationcli::resource::{PageRequest, View};
use std::path::PathBuf;
use tracing::Level;

/// Manage Application Integration and Integration Connectors resources
#[derive(Parser, Debug)]
#[command(name = "integrationcli", version, about, long_about = None)]
pub struct Args {
    /// GCP project ID
    #[arg(short = 'p', long = "proj", global = true, env = "INTEGRATIONCLI_PROJECT")]
    pub project: Option<String>,

    /// GCP region
    #[arg(short = 'r', long = "reg", global = true, env = "INTEGRATIONCLI_REGION")]
    pub region: Option<String>,

    /// Access token; Application Default Credentials are used when absent
    #[arg(
        short = 't',
        long,
        global = true,
        env = "INTEGRATIONCLI_TOKEN",
        hide_env_values = true
    )]
    pub token: Option<String>,

    /// Send every API call to this base URL instead of googleapis.com
    #[arg(long, global = true, env = "INTEGRATIONCLI_API_ENDPOINT")]
    pub api_endpoint: Option<String>,

    /// Do not print API responses
    #[arg(long, global = true)]
    pub no_output: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage auth configs
    Authconfigs {
        #[command(subcommand)]
        action: AuthConfigCommand,
    },
    /// Manage certificates
    Certificates {
        #[command(subcommand)]
        action: CertificateCommand,
    },
    /// Manage connections
    Connections {
        #[command(subcommand)]
        action: ConnectionCommand,
    },
    /// Manage connector managed zones
    Managedzones {
        #[command(subcommand)]
        action: ManagedZoneCommand,
    },
    /// Provision Application Integration in the region
    Provision(ProvisionArgs),
    /// Manage project IAM bindings
    Iam {
        #[command(subcommand)]
        action: ProjectIamCommand,
    },
    /// Manage saved preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsCommand,
    },
}

/// `--id` or `--name` (display name), exactly one
#[derive(ClapArgs, Debug)]
pub struct SelectorArgs {
    /// Resource ID
    #[arg(short, long)]
    pub id: Option<String>,

    /// Display name; resolved to an ID by listing
    #[arg(short, long)]
    pub name: Option<String>,
}

#[derive(ClapArgs, Debug, Default)]
pub struct ListArgs {
    /// Page size; server default when omitted
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Page token from a previous list
    #[arg(long, default_value = "")]
    pub page_token: String,

    /// Filter expression
    #[arg(short, long, default_value = "")]
    pub filter: String,

    /// Sort order, e.g. "createTime desc"
    #[arg(long, default_value = "")]
    pub order_by: String,

    /// Follow page tokens and print every item
    #[arg(long)]
    pub all: bool,
}

impl ListArgs {
    pub fn to_request(&self, view: Option<View>) -> PageRequest {
        PageRequest {
            page_size: self.page_size,
            page_token: self.page_token.clone(),
            filter: self.filter.clone(),
            order_by: self.order_by.clone(),
            view,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct FolderArgs {
    /// Local directory
    #[arg(short, long)]
    pub folder: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum AuthConfigCommand {
    /// Create an auth config from a JSON file
    Create {
        /// Auth config JSON, or base64 ciphertext with --encrypted-keyname
        #[arg(short, long)]
        file: PathBuf,

        /// Cloud KMS key that encrypted the file
        #[arg(short, long)]
        encrypted_keyname: Option<String>,

        /// PEM client certificate file
        #[arg(long, requires = "private_key")]
        ssl_certificate: Option<PathBuf>,

        /// PEM encrypted private key file for the client certificate
        #[arg(long, requires = "ssl_certificate")]
        private_key: Option<PathBuf>,

        /// Passphrase of the client certificate private key
        #[arg(long)]
        passphrase: Option<String>,
    },
    /// Get an auth config
    Get {
        #[command(flatten)]
        selector: SelectorArgs,

        /// Only display name, description, visibility and credential
        #[arg(long)]
        minimal: bool,
    },
    /// List auth configs
    List(ListArgs),
    /// Delete an auth config
    Delete(SelectorArgs),
    /// Update fields of an auth config
    Update {
        #[command(flatten)]
        selector: SelectorArgs,

        /// Auth config JSON with the new values
        #[arg(long)]
        file: PathBuf,

        /// Comma separated fields to update
        #[arg(long, default_value = "*")]
        update_mask: String,
    },
    /// Print the ID of the auth config with a display name
    Find {
        #[arg(short, long)]
        name: String,
    },
    /// Export all auth configs into a folder
    Export(FolderArgs),
    /// Create auth configs from an export folder
    Import(FolderArgs),
}

#[derive(Subcommand, Debug)]
pub enum CertificateCommand {
    /// Create a certificate
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        /// PEM certificate file
        #[arg(long)]
        ssl_certificate: PathBuf,

        /// PEM private key file
        #[arg(long)]
        private_key: PathBuf,

        #[arg(long)]
        passphrase: Option<String>,
    },
    /// Get a certificate
    Get(SelectorArgs),
    /// List certificates
    List(ListArgs),
    /// Delete a certificate
    Delete(SelectorArgs),
    /// Print the ID of the certificate with a display name
    Find {
        #[arg(short, long)]
        name: String,
    },
    /// Export all certificates into a folder
    Export(FolderArgs),
}

#[derive(Subcommand, Debug)]
pub enum ConnectionCommand {
    /// Create a connection from a JSON file
    Create {
        /// Connection ID
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        file: PathBuf,
    },
    /// Get a connection
    Get {
        #[arg(short, long)]
        name: String,

        #[arg(long, value_enum)]
        view: Option<View>,
    },
    /// List connections
    List {
        #[command(flatten)]
        list: ListArgs,

        #[arg(long, value_enum)]
        view: Option<View>,
    },
    /// Delete a connection
    Delete {
        #[arg(short, long)]
        name: String,
    },
    /// Update fields of a connection
    Update {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        file: PathBuf,

        /// Comma separated fields to update
        #[arg(long)]
        update_mask: String,
    },
    /// Export all connections into a folder
    Export(FolderArgs),
    /// Create connections from an export folder
    Import(FolderArgs),
    /// Manage IAM on a connection
    Iam {
        #[command(subcommand)]
        action: ConnectionIamCommand,
    },
}

#[derive(ClapArgs, Debug)]
pub struct GrantArgs {
    #[arg(long, value_enum)]
    pub member_type: MemberType,

    /// Email, service account or domain
    #[arg(long)]
    pub member: String,

    /// Role, e.g. roles/connectors.invoker
    #[arg(long)]
    pub role: String,
}

#[derive(Subcommand, Debug)]
pub enum ConnectionIamCommand {
    /// Show the IAM policy
    Get {
        #[arg(short, long)]
        name: String,
    },
    /// Grant a role to a member
    Set {
        #[arg(short, long)]
        name: String,

        #[command(flatten)]
        grant: GrantArgs,
    },
    /// Check which permissions the caller holds
    Test {
        #[arg(short, long)]
        name: String,

        /// Comma separated permissions
        #[arg(long, value_delimiter = ',', required = true)]
        permissions: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ManagedZoneCommand {
    /// Create a managed zone
    Create {
        /// Managed zone ID
        #[arg(short, long)]
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// DNS suffix, e.g. corp.example.com.
        #[arg(long)]
        dns: String,

        /// Project that owns the target VPC
        #[arg(long)]
        target_project: String,

        #[arg(long)]
        target_vpc: String,

        /// key=value, repeatable
        #[arg(long = "label")]
        labels: Vec<String>,
    },
    /// Get a managed zone
    Get {
        #[arg(short, long)]
        name: String,
    },
    /// List managed zones
    List(ListArgs),
    /// Delete a managed zone
    Delete {
        #[arg(short, long)]
        name: String,
    },
}

#[derive(ClapArgs, Debug)]
pub struct ProvisionArgs {
    /// Service account integrations run as
    #[arg(long)]
    pub service_account: Option<String>,

    /// Create sample integrations
    #[arg(long)]
    pub samples: bool,

    /// Provision a Google-managed encryption key
    #[arg(long)]
    pub gmek: bool,

    #[arg(long)]
    pub kms_project: Option<String>,

    #[arg(long)]
    pub kms_location: Option<String>,

    #[arg(long)]
    pub kms_ring: Option<String>,

    #[arg(long)]
    pub kms_key: Option<String>,

    #[arg(long)]
    pub kms_key_version: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ProjectIamCommand {
    /// Show the project IAM policy
    Get,
    /// Grant a role on the project
    Grant(GrantArgs),
}

#[derive(Subcommand, Debug)]
pub enum PrefsCommand {
    /// Show saved preferences
    Get,
    /// Save --proj and --reg as defaults
    Set,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_list_with_globals_after_subcommand() {
        let args = Args::try_parse_from([
            "integrationcli",
            "authconfigs",
            "list",
            "--page-size",
            "5",
            "--proj",
            "my-project",
        ])
        .unwrap();

        assert_eq!(args.project.as_deref(), Some("my-project"));
        match args.command {
            Command::Authconfigs {
                action: AuthConfigCommand::List(list),
            } => {
                let request = list.to_request(None);
                assert_eq!(request.page_size, Some(5));
                assert!(request.filter.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_connection_permissions_are_comma_split() {
        let args = Args::try_parse_from([
            "integrationcli",
            "connections",
            "iam",
            "test",
            "--name",
            "sfdc",
            "--permissions",
            "connectors.connections.get,connectors.connections.list",
        ])
        .unwrap();

        match args.command {
            Command::Connections {
                action: ConnectionCommand::Iam {
                    action: ConnectionIamCommand::Test { permissions, .. },
                },
            } => assert_eq!(permissions.len(), 2),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
