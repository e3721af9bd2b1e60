//! The `hub` command.

use anyhow::Result;
use services::AppServices;
use trainer_core::model::{LearningResource, ResourceKind};

pub async fn execute(
    services: &AppServices,
    category: Option<&str>,
    kind: Option<ResourceKind>,
    search: Option<&str>,
) -> Result<()> {
    let settings = services.settings().load().await?;
    println!("{}", settings.welcome_message());
    if let Some(url) = settings.channel_url() {
        println!("Learning channel: {url}");
    }
    println!();

    let Some(category) = category else {
        let record = services.catalog().load().await?;
        for name in record.categories.iter() {
            let count = record.learning_resources.count_in(name.as_str());
            println!("{name} ({count} resources)");
        }
        return Ok(());
    };

    let term = search.unwrap_or_default();
    println!("{category}");
    let kinds: Vec<ResourceKind> = kind.map_or_else(|| ResourceKind::ALL.to_vec(), |k| vec![k]);
    for kind in kinds {
        let shelf = services
            .catalog()
            .search_resources(category, kind, term)
            .await?;
        println!("\n  {kind}");
        if shelf.is_empty() {
            let empty = if term.trim().is_empty() { "nothing yet" } else { "no matches" };
            println!("    ({empty})");
        }
        for (index, resource) in shelf.iter().enumerate() {
            print_resource(index + 1, resource);
        }
    }
    Ok(())
}

fn print_resource(position: usize, resource: &LearningResource) {
    println!("    {position}. {} <{}>", resource.title, resource.link);
    if !resource.description.is_empty() {
        println!("       {}", resource.description);
    }
    let details: Vec<String> = resource
        .details
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect();
    if !details.is_empty() {
        println!("       {}", details.join(" | "));
    }
}
