use std::sync::Arc;

use anyhow::Context as _;
use api::{ApiClient, SaleCreate, SaleUpdate};
use config::Config;
use identity::{IdentityContext, IdentityResolver, IdentityStore};
use serde::Serialize;

use crate::args::{Command, SalesCommand};

pub(crate) async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    let store = IdentityStore::new(config.identity.store_path.clone());
    let status_url = config
        .auth_status_url()
        .context("invalid authentication status address")?;
    let identity = Arc::new(IdentityContext::new(IdentityResolver::new(store, status_url)));

    match command {
        Command::Whoami => whoami(&config, &identity).await,
        Command::Login { name } => login(&config, &identity, name),
        Command::Logout => logout(&config, &identity),
        Command::User => print_json(&client(&config, &identity).await?.current_user().await?),
        Command::Dashboard => print_json(&client(&config, &identity).await?.dashboard().await?),
        Command::Stats => print_json(&client(&config, &identity).await?.dashboard_stats().await?),
        Command::Recent { limit } => {
            print_json(&client(&config, &identity).await?.recent_sales(Some(limit)).await?)
        }
        Command::Sales { command: sales_command } => {
            sales(sales_command, &client(&config, &identity).await?).await
        }
    }
}

/// Resolve identity once up front; every request reuses the cached result
/// through the bridge.
async fn client(config: &Config, identity: &Arc<IdentityContext>) -> anyhow::Result<ApiClient> {
    identity.refresh().await;
    ApiClient::new(config, identity.clone())
}

async fn whoami(config: &Config, identity: &IdentityContext) -> anyhow::Result<()> {
    match identity.refresh().await {
        Some(resolved) => print_json(&resolved.identity),
        None => {
            let login_url = config.login_url().context("invalid login address")?;
            println!(
                "Not signed in. Open {login_url} in a browser, or run `saletrack login --name <name>` for a local development identity."
            );
            Ok(())
        }
    }
}

fn login(config: &Config, identity: &IdentityContext, name: Option<String>) -> anyhow::Result<()> {
    match name {
        Some(name) => {
            let resolved = identity.synthesize(&name)?;
            print_json(&resolved.identity)
        }
        None => {
            let login_url = config.login_url().context("invalid login address")?;
            println!("Open {login_url} in a browser to sign in.");
            Ok(())
        }
    }
}

fn logout(config: &Config, identity: &IdentityContext) -> anyhow::Result<()> {
    identity.clear()?;

    let logout_url = config.logout_url().context("invalid logout address")?;
    println!("Local development identity cleared. A provider session ends at {logout_url}.");

    Ok(())
}

async fn sales(command: SalesCommand, client: &ApiClient) -> anyhow::Result<()> {
    match command {
        SalesCommand::List => print_json(&client.sales().await?),
        SalesCommand::Show { id } => print_json(&client.sale(&id).await?),
        SalesCommand::Create {
            product,
            amount,
            date,
            platform,
            customer,
        } => {
            let sale = SaleCreate {
                product_name: product,
                amount,
                sale_date: date.unwrap_or_else(|| jiff::Timestamp::now().to_string()),
                customer_name: customer,
                platform,
            };

            print_json(&client.create_sale(&sale).await?)
        }
        SalesCommand::Update {
            id,
            product,
            amount,
            date,
            platform,
            customer,
        } => {
            let update = SaleUpdate {
                product_name: product,
                amount,
                sale_date: date,
                customer_name: customer,
                platform,
            };

            if update.is_empty() {
                anyhow::bail!("nothing to update, pass at least one field");
            }

            print_json(&client.update_sale(&id, &update).await?)
        }
        SalesCommand::Delete { id } => {
            client.delete_sale(&id).await?;
            log::info!("sale {id} deleted");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
