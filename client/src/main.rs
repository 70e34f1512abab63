// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use client::api::{ApiClient, SubscriptionClient};
use client::config::ClientConfig;
use client::org_store::OrganizationStore;
use client::pages::{Dashboard, ProjectDetail, Sidebar};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting up the dashboard client...");

    let config = ClientConfig::from_env();
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory {}", config.data_dir.display()))?;

    let store = Arc::new(OrganizationStore::load(&config.data_dir));
    let api = ApiClient::new(config.graphql_url(), Arc::clone(&store));
    tracing::info!("Using API at {}", config.graphql_url());

    let mut sidebar = Sidebar::new(api.clone());
    sidebar.load().await;
    if let Some(organizations) = &sidebar.organizations().data {
        for organization in organizations {
            let marker = if organization.slug == sidebar.current_slug() { "*" } else { " " };
            println!("{} {} ({})", marker, organization.name, organization.slug);
        }
    }

    if let Some(slug) = &config.organization_slug {
        sidebar.select(slug);
    }

    let mut dashboard = Dashboard::new(api.clone());
    dashboard.load().await;
    if let Some(error) = &dashboard.state().error {
        anyhow::bail!("Could not load projects: {}", error);
    }
    for project in dashboard.projects() {
        println!(
            "{:<24} {:<10} {:>3}% ({}/{} tasks)",
            project.name,
            project.status.as_str(),
            project.completion_rate(),
            project.completed_tasks,
            project.task_count
        );
    }

    // With a project id, show its board and follow live task updates.
    let Some(project_id) = config.watch_project.clone() else {
        return Ok(());
    };
    let mut detail = ProjectDetail::new(api, project_id.clone());
    detail.load().await;
    print_board(&detail);

    let subscriptions = SubscriptionClient::connect(&config.subscriptions_url(), &store.current())
        .await
        .context("Failed to open the subscription connection")?;
    let mut updates = subscriptions
        .task_updated(&project_id)
        .context("Failed to subscribe to task updates")?;

    loop {
        tokio::select! {
            update = updates.next() => match update {
                Some(Ok(update)) => {
                    detail.apply_task_update(update).await;
                    print_board(&detail);
                }
                Some(Err(e)) => tracing::warn!("Task update failed: {}", e),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down.");
                break;
            }
        }
    }
    Ok(())
}

fn print_board(detail: &ProjectDetail) {
    for lane in detail.lanes() {
        println!("{} ({})", lane.title, lane.count());
        if let Some(placeholder) = lane.placeholder() {
            println!("    {}", placeholder);
        }
        for card in &lane.cards {
            match card.assignee_name {
                Some(assignee) => println!("  - {} [{}]", card.task.title, assignee),
                None => println!("  - {}", card.task.title),
            }
        }
    }
}
