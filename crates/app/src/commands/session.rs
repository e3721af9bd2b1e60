//! `seed`, `login` and `logout`.

use anyhow::Result;
use services::AppServices;

pub async fn seed(services: &AppServices, force: bool) -> Result<()> {
    services.seed(force).await?;
    if force {
        println!("Reset categories, learning resources and users to defaults.");
    } else {
        println!("Defaults are in place.");
    }
    Ok(())
}

pub async fn login(services: &AppServices, username: &str, password: &str) -> Result<()> {
    let user = services.users().login(username, password).await?;
    println!("Logged in as {} ({}).", user.username(), user.role());
    Ok(())
}

pub async fn logout(services: &AppServices) -> Result<()> {
    services.users().logout().await?;
    println!("Logged out.");
    Ok(())
}
