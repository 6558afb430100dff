use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use log::{info, warn};

use crate::{
    MISSING_PLAYER_ID_MESSAGE, ServiceError, ServiceResult,
    page::{Page, PageRequest, SortOrder},
};

pub type PlayerId = i64;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Player {
    pub id: Option<PlayerId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub codename: String,
    pub group: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerField {
    Name,
    Email,
    Phone,
    Codename,
    Group,
}

impl PlayerField {
    pub const ALL: [PlayerField; 5] = [
        PlayerField::Name,
        PlayerField::Email,
        PlayerField::Phone,
        PlayerField::Codename,
        PlayerField::Group,
    ];
}

impl Player {
    pub fn field(&self, field: PlayerField) -> &str {
        match field {
            PlayerField::Name => &self.name,
            PlayerField::Email => &self.email,
            PlayerField::Phone => &self.phone,
            PlayerField::Codename => &self.codename,
            PlayerField::Group => &self.group,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSortBy {
    Id,
    Field(PlayerField),
}

impl PlayerSortBy {
    pub fn parse(value: &str) -> ServiceResult<Self> {
        let sort_by = match value {
            "id" => PlayerSortBy::Id,
            "nome" | "name" => PlayerSortBy::Field(PlayerField::Name),
            "email" => PlayerSortBy::Field(PlayerField::Email),
            "telefone" | "phone" => PlayerSortBy::Field(PlayerField::Phone),
            "codinome" | "codename" => PlayerSortBy::Field(PlayerField::Codename),
            "grupo" | "group" => PlayerSortBy::Field(PlayerField::Group),
            _ => return ServiceError::bad_request(format!("Invalid sort property '{}'", value)),
        };
        Ok(sort_by)
    }
}

/// Query-by-example filter. Every non-empty field is matched as a
/// case-insensitive substring; empty or absent fields match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub codename: Option<String>,
    pub group: Option<String>,
}

impl PlayerFilter {
    fn value(&self, field: PlayerField) -> Option<&str> {
        match field {
            PlayerField::Name => self.name.as_deref(),
            PlayerField::Email => self.email.as_deref(),
            PlayerField::Phone => self.phone.as_deref(),
            PlayerField::Codename => self.codename.as_deref(),
            PlayerField::Group => self.group.as_deref(),
        }
    }

    /// The AND-combined predicates this filter imposes.
    pub fn predicates(&self) -> Vec<(PlayerField, &str)> {
        PlayerField::ALL
            .iter()
            .filter_map(|&field| match self.value(field) {
                Some(value) if !value.is_empty() => Some((field, value)),
                _ => None,
            })
            .collect()
    }

    pub fn matches(&self, player: &Player) -> bool {
        self.predicates().into_iter().all(|(field, value)| {
            player
                .field(field)
                .to_lowercase()
                .contains(&value.to_lowercase())
        })
    }
}

pub type ArcPlayerRepository = Arc<Box<dyn PlayerRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PlayerRepository {
    /// Stores a new record and returns it with the id assigned by storage.
    async fn insert_player(&self, player: &Player) -> ServiceResult<Player>;
    async fn get_player_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>>;
    async fn exists_by_codename(&self, codename: &str) -> ServiceResult<bool>;
    /// Overwrites the record with the same id.
    async fn update_player(&self, player: &Player) -> ServiceResult<Player>;
    async fn delete_player(&self, id: PlayerId) -> ServiceResult<()>;
    async fn find_players(
        &self,
        filter: &PlayerFilter,
        page_request: &PageRequest,
    ) -> ServiceResult<Page<Player>>;
}

pub type ArcPlayerService = Arc<Box<dyn PlayerService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PlayerService {
    async fn save(&self, player: Player) -> ServiceResult<Player>;
    async fn get_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>>;
    async fn delete_jogador(&self, player: Option<&Player>) -> ServiceResult<()>;
    async fn update_jogador(&self, player: Option<&Player>) -> ServiceResult<Player>;
    async fn find_jogador(
        &self,
        filter: &PlayerFilter,
        page_request: &PageRequest,
    ) -> ServiceResult<Page<Player>>;
}

pub struct PlayerServiceImpl {
    player_repository: ArcPlayerRepository,
}

impl PlayerServiceImpl {
    pub fn new(player_repository: ArcPlayerRepository) -> Self {
        Self { player_repository }
    }

    fn require_id(player: Option<&Player>) -> ServiceResult<(PlayerId, &Player)> {
        player
            .and_then(|player| player.id.map(|id| (id, player)))
            .ok_or_else(|| ServiceError::InvalidArgument(MISSING_PLAYER_ID_MESSAGE.to_string()))
    }
}

#[async_trait::async_trait]
impl PlayerService for PlayerServiceImpl {
    async fn save(&self, player: Player) -> ServiceResult<Player> {
        if self
            .player_repository
            .exists_by_codename(&player.codename)
            .await?
        {
            warn!("Rejected player with taken codename {}", player.codename);
            return Err(ServiceError::DuplicateCodename);
        }
        let player = Player { id: None, ..player };
        let saved = self.player_repository.insert_player(&player).await?;
        info!("Created player {:?} ({})", saved.id, saved.codename);
        Ok(saved)
    }

    async fn get_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>> {
        self.player_repository.get_player_by_id(id).await
    }

    async fn delete_jogador(&self, player: Option<&Player>) -> ServiceResult<()> {
        let (id, _) = Self::require_id(player)?;
        self.player_repository.delete_player(id).await?;
        info!("Deleted player {}", id);
        Ok(())
    }

    async fn update_jogador(&self, player: Option<&Player>) -> ServiceResult<Player> {
        let (id, player) = Self::require_id(player)?;
        let updated = self.player_repository.update_player(player).await?;
        info!("Updated player {}", id);
        Ok(updated)
    }

    async fn find_jogador(
        &self,
        filter: &PlayerFilter,
        page_request: &PageRequest,
    ) -> ServiceResult<Page<Player>> {
        self.player_repository
            .find_players(filter, page_request)
            .await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryCall {
    Insert,
    GetById,
    ExistsByCodename,
    Update,
    Delete,
    Find,
}

/// In-memory repository that records every call made against it.
#[derive(Default, Clone)]
pub struct MockPlayerRepository {
    players: Arc<Mutex<BTreeMap<PlayerId, Player>>>,
    last_id: Arc<Mutex<PlayerId>>,
    calls: Arc<Mutex<Vec<RepositoryCall>>>,
}

#[allow(unused)]
impl MockPlayerRepository {
    pub fn get_calls(&self) -> Vec<RepositoryCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, call: RepositoryCall) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|&&c| c == call)
            .count()
    }

    pub fn get_players(&self) -> Vec<Player> {
        self.players.lock().unwrap().values().cloned().collect()
    }

    fn record(&self, call: RepositoryCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl PlayerRepository for MockPlayerRepository {
    async fn insert_player(&self, player: &Player) -> ServiceResult<Player> {
        self.record(RepositoryCall::Insert);
        let mut players = self.players.lock().unwrap();
        if players.values().any(|p| p.codename == player.codename) {
            return Err(ServiceError::DuplicateCodename);
        }
        let mut last_id = self.last_id.lock().unwrap();
        *last_id += 1;
        let saved = Player {
            id: Some(*last_id),
            ..player.clone()
        };
        players.insert(*last_id, saved.clone());
        Ok(saved)
    }

    async fn get_player_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>> {
        self.record(RepositoryCall::GetById);
        Ok(self.players.lock().unwrap().get(&id).cloned())
    }

    async fn exists_by_codename(&self, codename: &str) -> ServiceResult<bool> {
        self.record(RepositoryCall::ExistsByCodename);
        Ok(self
            .players
            .lock()
            .unwrap()
            .values()
            .any(|p| p.codename == codename))
    }

    async fn update_player(&self, player: &Player) -> ServiceResult<Player> {
        self.record(RepositoryCall::Update);
        let Some(id) = player.id else {
            return ServiceError::invalid_argument(MISSING_PLAYER_ID_MESSAGE);
        };
        let mut players = self.players.lock().unwrap();
        if players
            .values()
            .any(|p| p.id != Some(id) && p.codename == player.codename)
        {
            return Err(ServiceError::DuplicateCodename);
        }
        match players.get_mut(&id) {
            Some(stored) => {
                *stored = player.clone();
                Ok(stored.clone())
            }
            None => ServiceError::not_found(format!("Player {} not found", id)),
        }
    }

    async fn delete_player(&self, id: PlayerId) -> ServiceResult<()> {
        self.record(RepositoryCall::Delete);
        self.players.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn find_players(
        &self,
        filter: &PlayerFilter,
        page_request: &PageRequest,
    ) -> ServiceResult<Page<Player>> {
        self.record(RepositoryCall::Find);
        let mut matching: Vec<Player> = self
            .players
            .lock()
            .unwrap()
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();

        // BTreeMap iteration already yields id order, so a stable sort keeps it as tie-break.
        if let Some(sort) = page_request.sort() {
            matching.sort_by(|a, b| {
                let ordering = match sort.property {
                    PlayerSortBy::Id => a.id.cmp(&b.id),
                    PlayerSortBy::Field(field) => a.field(field).cmp(b.field(field)),
                };
                match sort.order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        let total = matching.len();
        let content = matching
            .into_iter()
            .skip(page_request.offset())
            .take(page_request.size())
            .collect();
        Ok(Page::new(content, *page_request, total))
    }
}

#[cfg(test)]
mod tests {
    use crate::page::Sort;

    use super::*;

    fn felipe() -> Player {
        Player {
            id: None,
            name: "Felipe".to_string(),
            email: "felipe@email.com".to_string(),
            phone: "(11) 99999-9999".to_string(),
            codename: "Hulk".to_string(),
            group: "Vingadores".to_string(),
        }
    }

    fn player(name: &str, codename: &str, group: &str) -> Player {
        Player {
            id: None,
            name: name.to_string(),
            email: format!("{}@email.com", name.to_lowercase()),
            phone: "(11) 90000-0000".to_string(),
            codename: codename.to_string(),
            group: group.to_string(),
        }
    }

    fn service_with_mock() -> (PlayerServiceImpl, MockPlayerRepository) {
        let repository = MockPlayerRepository::default();
        let service = PlayerServiceImpl::new(Arc::new(Box::new(repository.clone())));
        (service, repository)
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_keeps_fields() {
        let (service, repository) = service_with_mock();

        let saved = service.save(felipe()).await.expect("Failed to save player");

        assert!(saved.id.is_some());
        assert_eq!(saved.name, "Felipe");
        assert_eq!(saved.email, "felipe@email.com");
        assert_eq!(saved.phone, "(11) 99999-9999");
        assert_eq!(saved.codename, "Hulk");
        assert_eq!(saved.group, "Vingadores");
        assert_eq!(
            repository.get_calls(),
            vec![RepositoryCall::ExistsByCodename, RepositoryCall::Insert]
        );
    }

    #[tokio::test]
    async fn test_save_ignores_incoming_id() {
        let (service, _) = service_with_mock();

        let saved = service
            .save(Player {
                id: Some(42),
                ..felipe()
            })
            .await
            .unwrap();

        assert_eq!(saved.id, Some(1));
    }

    #[tokio::test]
    async fn test_save_duplicate_codename() {
        let (service, repository) = service_with_mock();
        service.save(felipe()).await.unwrap();

        let duplicate = player("Bruce", "Hulk", "Defensores");
        let result = service.save(duplicate).await;

        assert_eq!(result, Err(ServiceError::DuplicateCodename));
        assert_eq!(
            result.unwrap_err().messages(),
            vec!["Codinome já cadastrado".to_string()]
        );
        assert_eq!(repository.count_calls(RepositoryCall::Insert), 1);
        assert_eq!(repository.get_players().len(), 1);
        assert_eq!(repository.get_players()[0].name, "Felipe");
    }

    #[tokio::test]
    async fn test_codename_match_is_case_sensitive() {
        let (service, repository) = service_with_mock();
        service.save(felipe()).await.unwrap();

        service
            .save(player("Bruce", "hulk", "Defensores"))
            .await
            .expect("Codename differing in case should be accepted");

        assert_eq!(repository.get_players().len(), 2);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let (service, _) = service_with_mock();
        let saved = service.save(felipe()).await.unwrap();

        let found = service.get_by_id(saved.id.unwrap()).await.unwrap();
        assert_eq!(found, Some(saved));

        assert_eq!(service.get_by_id(999).await, Ok(None));
    }

    #[tokio::test]
    async fn test_delete_requires_player_with_id() {
        let (service, repository) = service_with_mock();

        assert!(matches!(
            service.delete_jogador(None).await,
            Err(ServiceError::InvalidArgument(msg)) if msg == MISSING_PLAYER_ID_MESSAGE
        ));
        assert!(matches!(
            service.delete_jogador(Some(&felipe())).await,
            Err(ServiceError::InvalidArgument(_))
        ));
        assert_eq!(repository.count_calls(RepositoryCall::Delete), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let (service, repository) = service_with_mock();
        let saved = service.save(felipe()).await.unwrap();

        service
            .delete_jogador(Some(&saved))
            .await
            .expect("Failed to delete player");

        assert_eq!(repository.count_calls(RepositoryCall::Delete), 1);
        assert_eq!(service.get_by_id(saved.id.unwrap()).await, Ok(None));
    }

    #[tokio::test]
    async fn test_update_requires_player_with_id() {
        let (service, repository) = service_with_mock();

        assert!(matches!(
            service.update_jogador(None).await,
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.update_jogador(Some(&felipe())).await,
            Err(ServiceError::InvalidArgument(_))
        ));
        assert_eq!(repository.count_calls(RepositoryCall::Update), 0);
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let (service, repository) = service_with_mock();
        let saved = service.save(felipe()).await.unwrap();

        let changed = Player {
            email: "lipe@email.com".to_string(),
            group: "X-Men".to_string(),
            ..saved.clone()
        };
        let updated = service.update_jogador(Some(&changed)).await.unwrap();

        assert_eq!(updated, changed);
        assert_eq!(updated.id, saved.id);
        assert_eq!(repository.get_players(), vec![changed]);
        assert_eq!(repository.count_calls(RepositoryCall::ExistsByCodename), 1);
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let (service, _) = service_with_mock();
        let saved = service.save(felipe()).await.unwrap();
        service
            .save(player("Natasha", "Viuva Negra", "Vingadores"))
            .await
            .unwrap();

        let filter = PlayerFilter {
            name: Some("Felipe".to_string()),
            ..Default::default()
        };
        let page = service
            .find_jogador(&filter, &PageRequest::of(0, 10).unwrap())
            .await
            .unwrap();

        assert_eq!(page.content, vec![saved]);
        assert_eq!(page.total_elements, 1);
    }

    #[tokio::test]
    async fn test_find_is_case_insensitive_substring_and_paged() {
        let (service, _) = service_with_mock();
        service.save(felipe()).await.unwrap();
        service
            .save(player("Natasha", "Viuva Negra", "Vingadores"))
            .await
            .unwrap();
        service
            .save(player("Logan", "Wolverine", "X-Men"))
            .await
            .unwrap();

        let filter = PlayerFilter {
            group: Some("vinga".to_string()),
            codename: Some(String::new()),
            ..Default::default()
        };

        let first = service
            .find_jogador(&filter, &PageRequest::of(0, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(first.total_elements, 2);
        assert_eq!(first.content.len(), 1);
        assert_eq!(first.content[0].codename, "Hulk");

        let sorted = PageRequest::new(0, 10, Sort::parse("nome,desc").unwrap()).unwrap();
        let page = service.find_jogador(&filter, &sorted).await.unwrap();
        let names: Vec<_> = page.content.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Natasha", "Felipe"]);
    }

    #[test]
    fn test_filter_predicates() {
        let filter = PlayerFilter {
            name: Some("fe".to_string()),
            email: Some(String::new()),
            group: Some("VINGA".to_string()),
            ..Default::default()
        };

        assert_eq!(
            filter.predicates(),
            vec![(PlayerField::Name, "fe"), (PlayerField::Group, "VINGA")]
        );
        assert!(filter.matches(&felipe()));
        assert!(!filter.matches(&player("Logan", "Wolverine", "X-Men")));
        assert!(PlayerFilter::default().matches(&felipe()));
    }
}
