use jogadores_domain::player::{Player, PlayerRepository};
use jogadores_persistence_sqlite::SqlitePlayerRepository;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let db_path = std::env::var("JOGADORES_DB").expect("JOGADORES_DB env var not set");
    let path = std::path::Path::new(&db_path);
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty());
    if let Some(parent) = parent {
        if !parent.exists() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory for DB");
            println!("Created parent directory for DB at {}", parent.display());
        }
    }

    if path.exists() {
        std::fs::remove_file(path).expect("Failed to remove existing DB");
        println!("Removed existing DB at {}", db_path);
    }

    let repository = SqlitePlayerRepository::new();
    repository
        .init_schema()
        .await
        .expect("Failed to create jogadores table");

    println!("Created new DB at {}", db_path);

    create_player(&repository, "Felipe", "Hulk", "Vingadores").await;
    create_player(&repository, "Natasha", "Viuva Negra", "Vingadores").await;
    create_player(&repository, "Logan", "Wolverine", "X-Men").await;
}

async fn create_player(repository: &SqlitePlayerRepository, name: &str, codename: &str, group: &str) {
    let player = Player {
        id: None,
        name: name.to_string(),
        email: format!("{}@email.com", name.to_lowercase()),
        phone: "(11) 99999-9999".to_string(),
        codename: codename.to_string(),
        group: group.to_string(),
    };
    let saved = repository
        .insert_player(&player)
        .await
        .expect("Failed to insert player");
    println!("Created player {} ({}) with id {:?}", saved.name, saved.codename, saved.id);
}
