//! Headless administrative console.

mod args;
mod commands;
mod config;

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use keel_application::ConsoleContext;
use keel_core::{AppError, RecordId};
use keel_domain::{
    Configs, Departments, DictTypes, Direction, Menus, OperationLogs, Posts, Roles, Users,
};
use keel_infrastructure::{HttpAdminClient, TracingNotifier};

use crate::args::{Cli, Command, ListResource, MoveDirection, TreeResourceKind};
use crate::config::ConsoleConfig;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = ConsoleConfig::load()?;
    let client = Arc::new(HttpAdminClient::new(
        config.api_base_url.clone(),
        config.api_token.clone(),
        config.http_timeout,
    )?);
    let context = ConsoleContext::new(Arc::new(TracingNotifier::new()), config.screen);

    info!(
        api_base_url = %client.base_url(),
        page_size = config.screen.page_size,
        authenticated = config.api_token.is_some(),
        "keel-console started"
    );

    match cli.command {
        Command::List {
            resource,
            keyword,
            page,
            page_size,
        } => match resource {
            ListResource::Users => {
                commands::list::<Users>(client, context, keyword, page, page_size).await
            }
            ListResource::Roles => {
                commands::list::<Roles>(client, context, keyword, page, page_size).await
            }
            ListResource::Posts => {
                commands::list::<Posts>(client, context, keyword, page, page_size).await
            }
            ListResource::Dicts => {
                commands::list::<DictTypes>(client, context, keyword, page, page_size).await
            }
            ListResource::Configs => {
                commands::list::<Configs>(client, context, keyword, page, page_size).await
            }
            ListResource::Operlogs => {
                commands::list::<OperationLogs>(client, context, keyword, page, page_size).await
            }
        },
        Command::Tree {
            resource,
            keyword,
            collapsed,
        } => match resource {
            TreeResourceKind::Depts => {
                commands::tree::<Departments>(client, context, keyword, collapsed).await
            }
            TreeResourceKind::Menus => {
                commands::tree::<Menus>(client, context, keyword, collapsed).await
            }
        },
        Command::Move {
            resource,
            id,
            direction,
        } => {
            let id = RecordId::new(id);
            let direction = match direction {
                MoveDirection::Up => Direction::Up,
                MoveDirection::Down => Direction::Down,
            };
            match resource {
                TreeResourceKind::Depts => {
                    commands::move_node::<Departments>(client, context, id, direction).await
                }
                TreeResourceKind::Menus => {
                    commands::move_node::<Menus>(client, context, id, direction).await
                }
            }
        }
        Command::Delete { resource, ids } => {
            let ids: Vec<RecordId> = ids.into_iter().map(RecordId::new).collect();
            match resource {
                ListResource::Users => commands::delete::<Users>(client, context, ids).await,
                ListResource::Roles => commands::delete::<Roles>(client, context, ids).await,
                ListResource::Posts => commands::delete::<Posts>(client, context, ids).await,
                ListResource::Dicts => commands::delete::<DictTypes>(client, context, ids).await,
                ListResource::Configs => commands::delete::<Configs>(client, context, ids).await,
                ListResource::Operlogs => {
                    commands::delete::<OperationLogs>(client, context, ids).await
                }
            }
        }
        Command::Monitor { seconds } => {
            commands::monitor(client, config.status_reconnect, seconds).await
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
