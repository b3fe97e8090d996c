use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use ibm_vpc::account::HttpAccountResolver;
use ibm_vpc::authenticator::IamAuthenticator;
use ibm_vpc::commands::create_key::CreateKeyCommand;
use ibm_vpc::http::client::HttpClient;
use ibm_vpc::options::KeyCreateRequest;
use ibm_vpc::parameters::{Cli, Commands, KeyCommands, KeyCreateArgs, VpcCommands};
use ibm_vpc::resource_group::HttpResourceGroupResolver;
use ibm_vpc::token_retriever::TokenRetrieverWithCache;
use ibm_vpc::vpc::http_vpc_client::HttpVpcClientFactory;
use tracing::Level;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Vpc(VpcCommands::Key(KeyCommands::Create(args))) => create_key(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn create_key(args: &KeyCreateArgs) -> Result<(), Box<dyn Error>> {
    // Flag validation happens before anything else is built.
    let request = KeyCreateRequest::try_from(args)?;
    let options = args.global().global_options()?;

    let http_client = HttpClient::new(&options.http)?;
    let token_retriever = Arc::new(TokenRetrieverWithCache::new(IamAuthenticator::new(
        http_client.clone(),
        options.endpoints.iam.clone(),
        options.api_key.clone(),
    )));

    let vpc_client_factory = HttpVpcClientFactory::new(
        http_client.clone(),
        token_retriever.clone(),
        options.api_key.clone(),
    )
    .with_endpoint(options.endpoints.vpc.clone());
    let account_resolver = HttpAccountResolver::new(
        http_client.clone(),
        token_retriever.clone(),
        options.api_key.clone(),
        options.endpoints.iam.clone(),
    );
    let resource_group_resolver = HttpResourceGroupResolver::new(
        http_client,
        token_retriever,
        options.endpoints.resource_manager.clone(),
    );

    CreateKeyCommand::new(vpc_client_factory, account_resolver, resource_group_resolver)
        .run(&options, &request)?;
    Ok(())
}
