use crate::config::Config;
use crate::db::Store;
use crate::services::{HabitService, SeaOrmHabitService};

pub async fn cmd_reset(config: &Config, email: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let Some(user) = store.get_user_by_email(email).await? else {
        println!("No account registered for {email}.");
        return Ok(());
    };

    let service = SeaOrmHabitService::new(store);
    let cleared = service.reset_habits(user.id).await?;

    println!("✓ Reset {cleared} habit(s) for {email}");
    Ok(())
}
