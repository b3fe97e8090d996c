use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::http::config::{DEFAULT_CONNECT_TIMEOUT, HttpConfig, ProxyConfig};
use crate::options::{ApiKey, GlobalOptions, KeyCreateRequest, ServiceEndpoints, ValidationError};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug)]
#[command(name = "ibm-vpc-cli", version, about = "Manage IBM Cloud VPC resources")]
pub struct Cli {
    /// Enable debug logs
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Commands for IBM VPC infrastructure.
    #[command(subcommand)]
    Vpc(VpcCommands),
}

#[derive(Subcommand, Debug)]
pub enum VpcCommands {
    /// Perform VPC key operations.
    #[command(subcommand)]
    Key(KeyCommands),
}

#[derive(Subcommand, Debug)]
pub enum KeyCommands {
    /// Create VPC key
    ///
    /// EXAMPLE:
    /// export IBMCLOUD_API_KEY=<api-key>
    /// ibm-vpc-cli vpc key create --name <key-name> --region <region> --resource-group-name <resource-group-name> --public-key "<public-key-string>"
    ///
    /// Using a key file:
    /// ibm-vpc-cli vpc key create --name <key-name> --region <region> --key-path <path/to/vpc/key>
    Create(KeyCreateArgs),
}

/// Flags shared by every `vpc` command.
#[derive(Args, Debug, Clone)]
pub struct VpcGlobalArgs {
    /// IBM Cloud VPC region
    #[arg(long)]
    region: String,

    /// IBM Cloud resource group name
    #[arg(long)]
    resource_group_name: Option<String>,

    /// Custom IAM endpoint
    #[arg(long)]
    iam_endpoint: Option<Url>,

    /// Custom Resource Manager endpoint
    #[arg(long)]
    resource_manager_endpoint: Option<Url>,

    /// Custom VPC endpoint, replaces the regional one
    #[arg(long)]
    vpc_endpoint: Option<Url>,

    /// Proxy for every request. Defaults to HTTPS_PROXY or HTTP_PROXY.
    #[arg(long)]
    proxy_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
}

#[derive(Args, Debug, Clone)]
pub struct KeyCreateArgs {
    /// Key Name
    #[arg(long, required = true)]
    name: String,

    /// Public Key, within double quotation marks
    #[arg(long)]
    public_key: Option<String>,

    /// The absolute path to the VPC key file.
    #[arg(long)]
    key_path: Option<PathBuf>,

    #[command(flatten)]
    global: VpcGlobalArgs,
}

impl VpcGlobalArgs {
    /// Builds the command options, reading credentials and proxy settings from the environment.
    pub fn global_options(&self) -> Result<GlobalOptions, clap::Error> {
        self.global_options_with(ApiKey::from_env())
    }

    fn global_options_with(&self, api_key: ApiKey) -> Result<GlobalOptions, clap::Error> {
        let defaults = ServiceEndpoints::default();
        let endpoints = ServiceEndpoints {
            iam: self.iam_endpoint.clone().unwrap_or(defaults.iam),
            resource_manager: self
                .resource_manager_endpoint
                .clone()
                .unwrap_or(defaults.resource_manager),
            vpc: self.vpc_endpoint.clone(),
        };

        let proxy = ProxyConfig::try_from(self.proxy_url.as_deref().unwrap_or_default())?
            .try_with_url_from_env()?;
        let http = HttpConfig::new(
            Duration::from_secs(self.timeout),
            DEFAULT_CONNECT_TIMEOUT.min(Duration::from_secs(self.timeout)),
            proxy,
        );

        Ok(GlobalOptions::new(self.region.clone(), api_key)
            .with_endpoints(endpoints)
            .with_http_config(http))
    }
}

impl KeyCreateArgs {
    pub fn global(&self) -> &VpcGlobalArgs {
        &self.global
    }
}

impl TryFrom<&KeyCreateArgs> for KeyCreateRequest {
    type Error = ValidationError;

    fn try_from(args: &KeyCreateArgs) -> Result<Self, Self::Error> {
        KeyCreateRequest::new(
            args.name.clone(),
            args.public_key.clone(),
            args.key_path.clone(),
            args.global.resource_group_name.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use clap::error::ErrorKind;

    use super::*;
    use crate::key_material::PublicKeySource;

    fn parse_create(args: &[&str]) -> Result<KeyCreateArgs, clap::Error> {
        let cli = Cli::try_parse_from(
            ["ibm-vpc-cli", "vpc", "key", "create"]
                .iter()
                .chain(args.iter()),
        )?;
        match cli.command {
            Commands::Vpc(VpcCommands::Key(KeyCommands::Create(args))) => Ok(args),
        }
    }

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_literal_key() {
        let args = parse_create(&[
            "--name",
            "foo",
            "--region",
            "us-south",
            "--public-key",
            "ssh-ed25519 AAAA dev@example.com",
            "--resource-group-name",
            "capi",
        ])
        .unwrap();

        let request = KeyCreateRequest::try_from(&args).unwrap();
        assert_eq!(request.name, "foo");
        assert_eq!(
            request.public_key,
            PublicKeySource::Literal("ssh-ed25519 AAAA dev@example.com".to_string())
        );
        assert_eq!(request.resource_group_name.as_deref(), Some("capi"));
    }

    #[test]
    fn parses_key_path() {
        let args = parse_create(&[
            "--name",
            "foo",
            "--region",
            "us-south",
            "--key-path",
            "/home/dev/.ssh/id_rsa.pub",
        ])
        .unwrap();

        let request = KeyCreateRequest::try_from(&args).unwrap();
        assert_eq!(
            request.public_key,
            PublicKeySource::File(PathBuf::from("/home/dev/.ssh/id_rsa.pub"))
        );
        assert_eq!(request.resource_group_name, None);
    }

    #[test]
    fn name_is_required() {
        let err = parse_create(&["--region", "us-south", "--public-key", "ssh-rsa AAAA"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn region_is_required() {
        let err = parse_create(&["--name", "foo", "--public-key", "ssh-rsa AAAA"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn both_key_flags_fail_validation() {
        let args = parse_create(&[
            "--name",
            "foo",
            "--region",
            "us-south",
            "--public-key",
            "ssh-rsa AAAA",
            "--key-path",
            "/home/dev/.ssh/id_rsa.pub",
        ])
        .unwrap();

        assert_matches!(
            KeyCreateRequest::try_from(&args),
            Err(ValidationError::KeySource)
        );
    }

    #[test]
    fn no_key_flags_fail_validation() {
        let args = parse_create(&["--name", "foo", "--region", "us-south"]).unwrap();

        assert_matches!(
            KeyCreateRequest::try_from(&args),
            Err(ValidationError::KeySource)
        );
    }

    #[test]
    fn global_options_defaults() {
        let args = parse_create(&[
            "--name",
            "foo",
            "--region",
            "eu-de",
            "--public-key",
            "ssh-rsa AAAA",
            "--proxy-url",
            "http://localhost:3128",
        ])
        .unwrap();

        let options = args
            .global()
            .global_options_with(ApiKey::from("my-api-key"))
            .unwrap();

        assert_eq!(options.region, "eu-de");
        assert_eq!(options.api_key, ApiKey::from("my-api-key"));
        assert_eq!(options.endpoints, ServiceEndpoints::default());
        assert_eq!(options.http.timeout, Duration::from_secs(30));
        assert_eq!(options.http.conn_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(
            options.http.proxy,
            ProxyConfig::try_from("http://localhost:3128").unwrap()
        );
    }

    #[test]
    fn global_options_custom_endpoints() {
        let args = parse_create(&[
            "--name",
            "foo",
            "--region",
            "us-south",
            "--public-key",
            "ssh-rsa AAAA",
            "--iam-endpoint",
            "http://127.0.0.1:1000",
            "--resource-manager-endpoint",
            "http://127.0.0.1:2000",
            "--vpc-endpoint",
            "http://127.0.0.1:3000/v1",
            "--proxy-url",
            "http://localhost:3128",
            "--timeout",
            "5",
        ])
        .unwrap();

        let options = args
            .global()
            .global_options_with(ApiKey::from("my-api-key"))
            .unwrap();

        assert_eq!(options.endpoints.iam.as_str(), "http://127.0.0.1:1000/");
        assert_eq!(
            options.endpoints.resource_manager.as_str(),
            "http://127.0.0.1:2000/"
        );
        assert_eq!(
            options.endpoints.vpc.unwrap().as_str(),
            "http://127.0.0.1:3000/v1"
        );
        assert_eq!(options.http.timeout, Duration::from_secs(5));
        assert_eq!(options.http.conn_timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let err = parse_create(&[
            "--name",
            "foo",
            "--region",
            "us-south",
            "--public-key",
            "ssh-rsa AAAA",
            "--iam-endpoint",
            "not a url",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn invalid_proxy_is_rejected() {
        let args = parse_create(&[
            "--name",
            "foo",
            "--region",
            "us-south",
            "--public-key",
            "ssh-rsa AAAA",
            "--proxy-url",
            "::not-a-proxy",
        ])
        .unwrap();

        let err = args
            .global()
            .global_options_with(ApiKey::from("my-api-key"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }
}
