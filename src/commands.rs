//! Command dispatch
//!
//! Turns parsed arguments into library calls and prints the responses.

use crate::cli::{
    Args, AuthConfigCommand, CertificateCommand, Command, ConnectionCommand,
    ConnectionIamCommand, GrantArgs, ListArgs, ManagedZoneCommand, PrefsCommand,
    ProjectIamCommand, ProvisionArgs, SelectorArgs,
};
use anyhow::{Context, Result};
use integrationcli::api::iam::{self, IamTarget};
use integrationcli::api::{authconfigs, certificates, connections, managedzones, provision};
use integrationcli::config::{Endpoints, Preferences, Settings};
use integrationcli::gcp::auth::GcpCredentials;
use integrationcli::gcp::client::GcpClient;
use integrationcli::output;
use integrationcli::resource::{self, Collection, View};
use integrationcli::validate::Selector;
use integrationcli::Error;
use serde_json::Value;
use std::path::Path;

/// Global flags needed to reach the APIs
struct ConnectOptions {
    project: Option<String>,
    region: Option<String>,
    token: Option<String>,
    api_endpoint: Option<String>,
    no_output: bool,
}

impl ConnectOptions {
    async fn client(self, prefs: &Preferences) -> Result<GcpClient> {
        let mut settings =
            Settings::resolve(self.project.as_deref(), self.region.as_deref(), prefs)?
                .with_print_output(!self.no_output);
        if let Some(endpoint) = self.api_endpoint.as_deref() {
            settings = settings.with_endpoints(Endpoints::all(endpoint));
        }
        tracing::debug!(
            "Using project: {}, region: {}",
            settings.project,
            settings.region
        );

        let credentials = match self.token {
            Some(token) => GcpCredentials::from_token(token),
            None => GcpCredentials::from_adc().await?,
        };
        Ok(GcpClient::new(credentials, settings)?)
    }
}

pub async fn run(args: Args) -> Result<()> {
    let prefs = Preferences::load();
    let options = ConnectOptions {
        project: args.project,
        region: args.region,
        token: args.token,
        api_endpoint: args.api_endpoint,
        no_output: args.no_output,
    };

    match args.command {
        Command::Prefs { action } => run_prefs(
            action,
            prefs,
            options.project.as_deref(),
            options.region.as_deref(),
        ),
        Command::Authconfigs { action } => {
            let client = options.client(&prefs).await?;
            run_authconfigs(&client, action).await
        }
        Command::Certificates { action } => {
            let client = options.client(&prefs).await?;
            run_certificates(&client, action).await
        }
        Command::Connections { action } => {
            let client = options.client(&prefs).await?;
            run_connections(&client, action).await
        }
        Command::Managedzones { action } => {
            let client = options.client(&prefs).await?;
            run_managedzones(&client, action).await
        }
        Command::Provision(provision_args) => {
            let client = options.client(&prefs).await?;
            run_provision(&client, provision_args).await
        }
        Command::Iam { action } => {
            let client = options.client(&prefs).await?;
            run_project_iam(&client, action).await
        }
    }
}

fn print(client: &GcpClient, body: &[u8]) -> Result<()> {
    output::print_response(&client.settings, body).context("Failed to write to stdout")
}

fn read_json_file(path: &Path) -> Result<Value> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .map_err(Error::from)
        .with_context(|| format!("{} is not valid JSON", path.display()))
}

fn read_text_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Turn `--id`/`--name` into an ID, listing the collection for display names
async fn resolve_id(client: &GcpClient, collection: &Collection, selector: SelectorArgs) -> Result<String> {
    match Selector::from_flags(selector.id, selector.name)? {
        Selector::Id(id) => Ok(id),
        Selector::DisplayName(name) => Ok(resource::find(client, collection, &name).await?),
    }
}

async fn list_collection(
    client: &GcpClient,
    collection: &Collection,
    list: &ListArgs,
    view: Option<View>,
) -> Result<()> {
    let request = list.to_request(view);

    if list.all {
        let items = resource::fetch_all(client, collection, &request).await?;
        let mut envelope = serde_json::Map::new();
        envelope.insert(collection.items_key.to_string(), Value::Array(items));
        let body = serde_json::to_vec(&envelope)?;
        return print(client, &body);
    }

    let body = resource::fetch_raw(client, collection, &request).await?;
    print(client, &body)
}

async fn export_collection(client: &GcpClient, collection: &Collection, folder: &Path) -> Result<()> {
    let files = resource::export(client, collection, folder)
        .await
        .with_context(|| format!("Failed to export {}s", collection.kind))?;
    tracing::info!("Exported {} page(s) to {}", files.len(), folder.display());
    Ok(())
}

async fn run_authconfigs(client: &GcpClient, action: AuthConfigCommand) -> Result<()> {
    let collection = authconfigs::collection(client);

    match action {
        AuthConfigCommand::Create {
            file,
            encrypted_keyname,
            ssl_certificate,
            private_key,
            passphrase,
        } => {
            let certificate = match (ssl_certificate, private_key) {
                (Some(cert), Some(key)) => Some(authconfigs::ClientCertificate {
                    ssl_certificate: read_text_file(&cert)?,
                    encrypted_private_key: read_text_file(&key)?,
                    passphrase: passphrase.unwrap_or_default(),
                }),
                _ => None,
            };

            let body = match encrypted_keyname {
                Some(key_name) => {
                    let ciphertext = std::fs::read(&file)
                        .with_context(|| format!("Failed to read {}", file.display()))?;
                    authconfigs::create_encrypted(client, &key_name, &ciphertext, certificate.as_ref())
                        .await?
                }
                None => {
                    let body = read_json_file(&file)?;
                    authconfigs::create(client, &body, certificate.as_ref()).await?
                }
            };
            print(client, &body)
        }
        AuthConfigCommand::Get { selector, minimal } => {
            let id = resolve_id(client, &collection, selector).await?;
            let body = authconfigs::get(client, &id, minimal).await?;
            print(client, &body)
        }
        AuthConfigCommand::List(list) => list_collection(client, &collection, &list, None).await,
        AuthConfigCommand::Delete(selector) => {
            let id = resolve_id(client, &collection, selector).await?;
            let body = authconfigs::delete(client, &id).await?;
            print(client, &body)
        }
        AuthConfigCommand::Update {
            selector,
            file,
            update_mask,
        } => {
            let id = resolve_id(client, &collection, selector).await?;
            let body = read_json_file(&file)?;
            let response = authconfigs::patch(client, &id, &body, &update_mask).await?;
            print(client, &response)
        }
        AuthConfigCommand::Find { name } => {
            let id = authconfigs::find(client, &name).await?;
            println!("{}", id);
            Ok(())
        }
        AuthConfigCommand::Export(folder) => export_collection(client, &collection, &folder.folder).await,
        AuthConfigCommand::Import(folder) => {
            let count = authconfigs::import(client, &folder.folder)
                .await
                .context("Failed to import auth configs")?;
            tracing::info!("Imported {} auth config(s)", count);
            Ok(())
        }
    }
}

async fn run_certificates(client: &GcpClient, action: CertificateCommand) -> Result<()> {
    let collection = certificates::collection(client);

    match action {
        CertificateCommand::Create {
            name,
            description,
            ssl_certificate,
            private_key,
            passphrase,
        } => {
            let certificate = certificates::NewCertificate {
                display_name: name,
                description,
                ssl_certificate: read_text_file(&ssl_certificate)?,
                private_key: read_text_file(&private_key)?,
                passphrase,
            };
            let body = certificates::create(client, &certificate).await?;
            print(client, &body)
        }
        CertificateCommand::Get(selector) => {
            let id = resolve_id(client, &collection, selector).await?;
            let body = certificates::get(client, &id).await?;
            print(client, &body)
        }
        CertificateCommand::List(list) => list_collection(client, &collection, &list, None).await,
        CertificateCommand::Delete(selector) => {
            let id = resolve_id(client, &collection, selector).await?;
            let body = certificates::delete(client, &id).await?;
            print(client, &body)
        }
        CertificateCommand::Find { name } => {
            let id = certificates::find(client, &name).await?;
            println!("{}", id);
            Ok(())
        }
        CertificateCommand::Export(folder) => export_collection(client, &collection, &folder.folder).await,
    }
}

async fn run_connections(client: &GcpClient, action: ConnectionCommand) -> Result<()> {
    let collection = connections::collection(client);

    match action {
        ConnectionCommand::Create { name, file } => {
            let body = read_json_file(&file)?;
            let response = connections::create(client, &name, &body).await?;
            print(client, &response)
        }
        ConnectionCommand::Get { name, view } => {
            let body = connections::get(client, &name, view).await?;
            print(client, &body)
        }
        ConnectionCommand::List { list, view } => list_collection(client, &collection, &list, view).await,
        ConnectionCommand::Delete { name } => {
            let body = connections::delete(client, &name).await?;
            print(client, &body)
        }
        ConnectionCommand::Update {
            name,
            file,
            update_mask,
        } => {
            let body = read_json_file(&file)?;
            let response = connections::patch(client, &name, &body, &update_mask).await?;
            print(client, &response)
        }
        ConnectionCommand::Export(folder) => export_collection(client, &collection, &folder.folder).await,
        ConnectionCommand::Import(folder) => {
            let count = connections::import(client, &folder.folder)
                .await
                .context("Failed to import connections")?;
            tracing::info!("Started creation of {} connection(s)", count);
            Ok(())
        }
        ConnectionCommand::Iam { action } => run_connection_iam(client, action).await,
    }
}

async fn run_connection_iam(client: &GcpClient, action: ConnectionIamCommand) -> Result<()> {
    let body = match action {
        ConnectionIamCommand::Get { name } => {
            iam::get_policy(client, &IamTarget::connection(client, &name)).await?
        }
        ConnectionIamCommand::Set { name, grant } => {
            grant_role(client, &IamTarget::connection(client, &name), grant).await?
        }
        ConnectionIamCommand::Test { name, permissions } => {
            iam::test_permissions(client, &IamTarget::connection(client, &name), &permissions).await?
        }
    };
    print(client, &body)
}

async fn run_project_iam(client: &GcpClient, action: ProjectIamCommand) -> Result<()> {
    let target = IamTarget::project(client);
    let body = match action {
        ProjectIamCommand::Get => iam::get_policy(client, &target).await?,
        ProjectIamCommand::Grant(grant) => grant_role(client, &target, grant).await?,
    };
    print(client, &body)
}

async fn grant_role(client: &GcpClient, target: &IamTarget, grant: GrantArgs) -> Result<Vec<u8>> {
    let member = iam::member(grant.member_type, &grant.member)?;
    Ok(iam::add_binding(client, target, &grant.role, &member).await?)
}

async fn run_managedzones(client: &GcpClient, action: ManagedZoneCommand) -> Result<()> {
    let body = match action {
        ManagedZoneCommand::Create {
            name,
            description,
            dns,
            target_project,
            target_vpc,
            labels,
        } => {
            let zone = managedzones::NewManagedZone {
                description,
                dns,
                target_project,
                target_vpc,
                labels: managedzones::parse_labels(&labels)?,
            };
            managedzones::create(client, &name, &zone).await?
        }
        ManagedZoneCommand::Get { name } => managedzones::get(client, &name).await?,
        ManagedZoneCommand::List(list) => {
            let collection = managedzones::collection(client);
            return list_collection(client, &collection, &list, None).await;
        }
        ManagedZoneCommand::Delete { name } => managedzones::delete(client, &name).await?,
    };
    print(client, &body)
}

async fn run_provision(client: &GcpClient, args: ProvisionArgs) -> Result<()> {
    let cloud_kms_config = match (args.kms_project, args.kms_location, args.kms_ring, args.kms_key) {
        (Some(kms_project_id), Some(kms_location), Some(kms_ring), Some(key)) => {
            Some(provision::CloudKmsConfig {
                kms_location,
                kms_ring,
                key,
                key_version: args.kms_key_version,
                kms_project_id,
            })
        }
        (None, None, None, None) => None,
        _ => {
            return Err(Error::validation(
                "--kms-project, --kms-location, --kms-ring and --kms-key must be given together",
            )
            .into())
        }
    };

    let request = provision::ProvisionRequest {
        cloud_kms_config,
        create_sample_workflows: args.samples,
        provision_gmek: args.gmek,
        run_as_service_account: args.service_account,
    };
    let body = provision::provision(client, &request).await?;
    print(client, &body)
}

fn run_prefs(
    action: PrefsCommand,
    mut prefs: Preferences,
    project: Option<&str>,
    region: Option<&str>,
) -> Result<()> {
    match action {
        PrefsCommand::Get => {
            println!("{}", serde_json::to_string_pretty(&prefs)?);
        }
        PrefsCommand::Set => {
            if project.is_none() && region.is_none() {
                return Err(Error::validation("prefs set needs --proj and/or --reg").into());
            }
            prefs.update(project, region)?;
            prefs.save().context("Failed to save preferences")?;
            tracing::info!("Preferences saved");
        }
    }
    Ok(())
}
