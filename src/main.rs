use std::ffi::OsStr;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use libadmin::api::ApiClient;
use libadmin::cli::{Cli, Commands};
use libadmin::config::Config;
use libadmin::models::{
    AcquisitionType, Author, Category, Location, Publisher, ResourceKind, Vendor,
};
use libadmin::resources::{DraftState, FieldRole, Flag, Resource};
use libadmin::tui;
use libadmin::tui::ui::fit_cell;

#[tokio::main]
async fn main() -> Result<()> {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "libadmin=info");
    }

    let cli = Cli::parse();

    let config = Config::from_env()?;
    config.validate()?;

    // The full-screen console owns the terminal, so it logs to the file
    // only; one-shot commands also echo to stderr.
    init_logging(&config, !matches!(cli.command, Commands::Tui));

    match &cli.command {
        Commands::Tui => {
            info!("Launching terminal interface");
            tui::run_tui(&config).await?;
            info!("Console exited cleanly");
        }

        Commands::View {
            resource,
            id,
            name,
            status,
        } => {
            let kind = Commands::parse_resource(resource)?;
            let client = ApiClient::new(&config)?;
            dispatch_view(kind, &client, *id, name.clone(), status.clone()).await?;
        }

        Commands::Delete { resource, id, yes } => {
            let kind = Commands::parse_resource(resource)?;
            let client = ApiClient::new(&config)?;
            dispatch_delete(kind, &client, *id, *yes).await?;
        }
    }

    Ok(())
}

fn init_logging(config: &Config, with_stderr: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_dir = config
        .log_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let log_name = config
        .log_file
        .file_name()
        .unwrap_or_else(|| OsStr::new("libadmin.log"));
    let file_appender = tracing_appender::rolling::never(log_dir, log_name);

    let stderr_layer = with_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();
}

async fn dispatch_view(
    kind: ResourceKind,
    client: &ApiClient,
    id: Option<i64>,
    name: Option<String>,
    status: Option<String>,
) -> Result<()> {
    match kind {
        ResourceKind::Location => run_view::<Location>(client, id, name, status).await,
        ResourceKind::Category => run_view::<Category>(client, id, name, status).await,
        ResourceKind::AcquisitionType => {
            run_view::<AcquisitionType>(client, id, name, status).await
        }
        ResourceKind::Vendor => run_view::<Vendor>(client, id, name, status).await,
        ResourceKind::Publisher => run_view::<Publisher>(client, id, name, status).await,
        ResourceKind::Author => run_view::<Author>(client, id, name, status).await,
    }
}

async fn dispatch_delete(kind: ResourceKind, client: &ApiClient, id: i64, yes: bool) -> Result<()> {
    match kind {
        ResourceKind::Location => run_delete::<Location>(client, id, yes).await,
        ResourceKind::Category => run_delete::<Category>(client, id, yes).await,
        ResourceKind::AcquisitionType => run_delete::<AcquisitionType>(client, id, yes).await,
        ResourceKind::Vendor => run_delete::<Vendor>(client, id, yes).await,
        ResourceKind::Publisher => run_delete::<Publisher>(client, id, yes).await,
        ResourceKind::Author => run_delete::<Author>(client, id, yes).await,
    }
}

async fn run_view<R: Resource>(
    client: &ApiClient,
    id: Option<i64>,
    name: Option<String>,
    status: Option<String>,
) -> Result<()> {
    let mut draft = DraftState::unset_for::<R>();
    if let Some(id) = id {
        set_filter::<R>(&mut draft, FieldRole::Id, "--id", id.to_string())?;
    }
    if let Some(name) = name {
        set_filter::<R>(&mut draft, FieldRole::Name, "--name", name)?;
    }
    if let Some(status) = status {
        set_filter::<R>(&mut draft, FieldRole::Status, "--status", status)?;
    }

    let body = R::build_request(Flag::View, &draft)?;
    let payload = client.execute::<R>(&body).await?;

    if payload.records.is_empty() {
        println!("No data found");
        return Ok(());
    }

    print_table::<R>(&payload.records);
    println!();
    println!("Total: {} records", payload.records.len());
    Ok(())
}

async fn run_delete<R: Resource>(client: &ApiClient, id: i64, yes: bool) -> Result<()> {
    // Fetch the record first so the operator sees what is being removed.
    let mut draft = DraftState::unset_for::<R>();
    set_filter::<R>(&mut draft, FieldRole::Id, "--id", id.to_string())?;
    let body = R::build_request(Flag::View, &draft)?;
    let payload = client.execute::<R>(&body).await?;

    let target = payload
        .records
        .into_iter()
        .find(|record| record.id() == Some(id))
        .ok_or_else(|| anyhow::anyhow!("No {} record with id {}", R::KIND.title(), id))?;

    println!("Target record:");
    for (column, cell) in R::COLUMNS.iter().zip(target.cells()) {
        println!("  {}: {}", column.title, cell);
    }

    if !yes {
        anyhow::bail!("Refusing to delete without --yes");
    }

    let body = target.delete_request();
    let payload = client.execute::<R>(&body).await?;
    println!(
        "{}",
        payload
            .message
            .unwrap_or_else(|| Flag::Delete.done_message().to_string())
    );
    Ok(())
}

fn set_filter<R: Resource>(
    draft: &mut DraftState,
    role: FieldRole,
    option: &str,
    value: String,
) -> Result<()> {
    match R::FIELDS.iter().find(|field| field.role == role) {
        Some(spec) => {
            draft.set(spec.name, value);
            Ok(())
        }
        None => anyhow::bail!("{} records have no {} filter", R::KIND.title(), option),
    }
}

fn print_table<R: Resource>(records: &[R]) {
    let header = R::COLUMNS
        .iter()
        .map(|column| fit_cell(column.title, column.width))
        .collect::<Vec<_>>()
        .join(" │ ");
    let line_width = R::COLUMNS.iter().map(|column| column.width).sum::<usize>()
        + 3 * R::COLUMNS.len().saturating_sub(1);

    println!("{header}");
    println!("{}", "─".repeat(line_width));
    for record in records {
        let row = record
            .cells()
            .iter()
            .zip(R::COLUMNS)
            .map(|(cell, column)| fit_cell(cell, column.width))
            .collect::<Vec<_>>()
            .join(" │ ");
        println!("{row}");
    }
}
