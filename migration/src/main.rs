use sea_orm_migration::prelude::*;
use std::env;

#[tokio::main]
async fn main() {
    if env::var("DATABASE_URL").is_err() {
        let db_path = if env::current_dir()
            .map(|dir| dir.ends_with("migration"))
            .unwrap_or(false)
        {
            "../jobtrail.db"
        } else {
            "jobtrail.db"
        };
        unsafe {
            env::set_var("DATABASE_URL", format!("sqlite://{db_path}?mode=rwc"));
        }
    }
    cli::run_cli(migration::Migrator).await;
}
