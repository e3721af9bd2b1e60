//! Admin-only management commands.

use anyhow::Result;
use services::AppServices;
use trainer_core::model::{
    AppSettingsDraft, ResourceDraft, ResourceKind, Role, UserDraft, UserId, UserUpdate,
};

pub async fn list_categories(services: &AppServices) -> Result<()> {
    let categories = services.catalog().categories().await?;
    for name in categories.iter() {
        let marker = if name.is_default() { " (default)" } else { "" };
        println!("{name}{marker}");
    }
    Ok(())
}

pub async fn add_category(services: &AppServices, name: &str) -> Result<()> {
    services.users().require_admin().await?;
    let name = services.catalog().add_category(name).await?;
    println!("Added category {name}.");
    Ok(())
}

pub async fn remove_category(services: &AppServices, name: &str) -> Result<()> {
    services.users().require_admin().await?;
    let name = services.catalog().remove_category(name).await?;
    println!("Removed category {name}.");
    Ok(())
}

pub fn resource_draft(
    title: String,
    link: String,
    description: String,
    details: Vec<(String, String)>,
) -> ResourceDraft {
    details.into_iter().fold(
        ResourceDraft::new(title, link).with_description(description),
        |draft, (key, value)| draft.with_detail(key, value),
    )
}

pub async fn add_resource(
    services: &AppServices,
    category: &str,
    kind: ResourceKind,
    draft: ResourceDraft,
) -> Result<()> {
    services.users().require_admin().await?;
    let id = services.catalog().add_resource(category, kind, draft).await?;
    println!("Added resource #{id} to {category} / {kind}.");
    Ok(())
}

pub async fn remove_resource(
    services: &AppServices,
    category: &str,
    kind: ResourceKind,
    index: usize,
) -> Result<()> {
    services.users().require_admin().await?;
    let removed = services
        .catalog()
        .remove_resource(category, kind, index)
        .await?;
    println!("Removed \"{}\" from {category} / {kind}.", removed.title);
    Ok(())
}

pub async fn reset_resources(services: &AppServices) -> Result<()> {
    services.users().require_admin().await?;
    services.catalog().reset_resources().await?;
    println!("Learning resources restored to the bundled catalog.");
    Ok(())
}

pub async fn list_users(services: &AppServices) -> Result<()> {
    services.users().require_admin().await?;
    let users = services.users().users().await?;
    for user in users.users() {
        println!(
            "{:>4}  {:<16} {:<28} {:<6} {}",
            user.id(),
            user.username(),
            user.email(),
            user.role(),
            user.created_at().format("%Y-%m-%d"),
        );
    }
    Ok(())
}

pub async fn add_user(
    services: &AppServices,
    username: String,
    email: String,
    password: String,
    admin: bool,
) -> Result<()> {
    services.users().require_admin().await?;
    let draft = UserDraft {
        username,
        email,
        password,
        role: Some(if admin { Role::Admin } else { Role::User }),
    };
    let user = services.users().add_user(draft).await?;
    println!("Added user #{} {}.", user.id(), user.username());
    Ok(())
}

pub async fn update_user(services: &AppServices, id: UserId, update: UserUpdate) -> Result<()> {
    services.users().require_admin().await?;
    let user = services.users().update_user(id, update).await?;
    println!("Updated user #{} {} ({}).", user.id(), user.username(), user.role());
    Ok(())
}

pub async fn remove_user(services: &AppServices, id: UserId) -> Result<()> {
    services.users().require_admin().await?;
    let user = services.users().remove_user(id).await?;
    println!("Removed user {}.", user.username());
    Ok(())
}

pub async fn show_settings(services: &AppServices) -> Result<()> {
    let settings = services.settings().load().await?;
    println!("Welcome message: {}", settings.welcome_message());
    println!("Channel URL: {}", settings.channel_url().unwrap_or("(none)"));
    Ok(())
}

pub async fn save_settings(
    services: &AppServices,
    welcome_message: Option<String>,
    channel_url: Option<String>,
) -> Result<()> {
    services.users().require_admin().await?;
    let current = services.settings().load().await?;
    let mut draft: AppSettingsDraft = current.to_draft();
    if welcome_message.is_some() {
        draft.welcome_message = welcome_message;
    }
    if channel_url.is_some() {
        draft.channel_url = channel_url;
    }
    let saved = services.settings().save(draft).await?;
    println!("Saved. Welcome message: {}", saved.welcome_message());
    Ok(())
}
