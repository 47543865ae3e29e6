use std::fmt::{Debug, Display};

use book_catalog::catalog_web_server::CatalogWebServer;
use book_catalog::core::{get_subscriber, init_subscriber, AppConfig};
use tokio::task::JoinError;

use colored::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::new()?;

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "catalog");
    let subscriber = get_subscriber("book_catalog".into(), "info".into(), file_appender);
    init_subscriber(subscriber);

    let catalog_web_server = CatalogWebServer::build(config.clone()).await?;
    let port = catalog_web_server.port();

    let server_task = tokio::spawn(catalog_web_server.run_until_stopped());

    println!("{}", "-----------------------------------------".green());
    println!("🚀 Server started on Addr: {} (port {})", config.http_listen, port);
    println!("{}", "-----------------------------------------".green());

    report_exit("catalog web server", server_task.await);
    Ok(())
}

fn report_exit(task_name: &str, outcome: Result<Result<(), impl Debug + Display>, JoinError>) {
    match outcome {
        Ok(Ok(())) => {
            tracing::info!("{} has exited", task_name)
        }
        Ok(Err(e)) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "{} failed",
                task_name
            )
        }
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "{}' task failed to complete",
                task_name
            )
        }
    }
}
