use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use jogadores_domain::{
    ServiceError, ServiceResult,
    page::{DEFAULT_PAGE_SIZE, PageRequest, Sort},
    player::{Player, PlayerFilter, PlayerId},
};
use log::debug;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{AppState, MyServiceError, PageResponse};

/// Field names in the order their validation errors are reported.
const VALIDATED_FIELDS: [&str; 5] = ["nome", "email", "telefone", "codinome", "grupo"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct JogadorDto {
    pub id: Option<PlayerId>,

    #[validate(
        required(message = "nome não pode estar vazio"),
        length(min = 1, message = "nome não pode estar vazio")
    )]
    pub nome: Option<String>,

    #[validate(
        required(message = "email não pode estar vazio"),
        length(min = 1, message = "email não pode estar vazio")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "telefone não pode estar vazio"),
        length(min = 1, message = "telefone não pode estar vazio")
    )]
    pub telefone: Option<String>,

    #[validate(
        required(message = "codinome não pode estar vazio"),
        length(min = 1, message = "codinome não pode estar vazio")
    )]
    pub codinome: Option<String>,

    #[validate(
        required(message = "grupo não pode estar vazio"),
        length(min = 1, message = "grupo não pode estar vazio")
    )]
    pub grupo: Option<String>,
}

impl JogadorDto {
    /// Runs the field rules, collecting one message per violated field.
    fn check(&self) -> ServiceResult<()> {
        let Err(errors) = self.validate() else {
            return Ok(());
        };
        let field_errors = errors.field_errors();
        let messages = VALIDATED_FIELDS
            .iter()
            .filter_map(|field| field_errors.get(*field))
            .filter_map(|errors| errors.first())
            .map(|error| match &error.message {
                Some(message) => message.to_string(),
                None => error.code.to_string(),
            })
            .collect();
        Err(ServiceError::Validation(messages))
    }

    fn into_player(self, id: Option<PlayerId>) -> Player {
        Player {
            id,
            name: self.nome.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.telefone.unwrap_or_default(),
            codename: self.codinome.unwrap_or_default(),
            group: self.grupo.unwrap_or_default(),
        }
    }
}

impl From<Player> for JogadorDto {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            nome: Some(player.name),
            email: Some(player.email),
            telefone: Some(player.phone),
            codinome: Some(player.codename),
            grupo: Some(player.group),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct JogadorQuery {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub codinome: Option<String>,
    pub grupo: Option<String>,
    pub page: Option<usize>,
    pub size: Option<usize>,
    pub sort: Option<String>,
}

impl JogadorQuery {
    fn page_request(&self) -> ServiceResult<PageRequest> {
        let sort = match &self.sort {
            Some(sort) => Sort::parse(sort)?,
            None => None,
        };
        PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
            sort,
        )
    }

    fn into_filter(self) -> PlayerFilter {
        PlayerFilter {
            name: self.nome,
            email: self.email,
            phone: self.telefone,
            codename: self.codinome,
            group: self.grupo,
        }
    }
}

fn extract_id(path: Result<Path<PlayerId>, PathRejection>) -> ServiceResult<PlayerId> {
    path.map(|Path(id)| id)
        .map_err(|e| ServiceError::BadRequest(e.body_text()))
}

fn extract_body(body: Result<Json<JogadorDto>, JsonRejection>) -> ServiceResult<JogadorDto> {
    let Json(dto) = body.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    dto.check()?;
    Ok(dto)
}

async fn find_existing(app: &AppState, id: PlayerId) -> ServiceResult<Player> {
    match app.player_service.get_by_id(id).await? {
        Some(player) => Ok(player),
        None => ServiceError::not_found(format!("Jogador {} não encontrado", id)),
    }
}

pub async fn create(
    State(app): State<AppState>,
    body: Result<Json<JogadorDto>, JsonRejection>,
) -> Result<(StatusCode, Json<JogadorDto>), MyServiceError> {
    let dto = extract_body(body)?;
    let saved = app.player_service.save(dto.into_player(None)).await?;
    Ok((StatusCode::CREATED, Json(saved.into())))
}

pub async fn get_by_id(
    State(app): State<AppState>,
    path: Result<Path<PlayerId>, PathRejection>,
) -> Result<Json<JogadorDto>, MyServiceError> {
    let id = extract_id(path)?;
    let player = find_existing(&app, id).await?;
    Ok(Json(player.into()))
}

pub async fn update(
    State(app): State<AppState>,
    path: Result<Path<PlayerId>, PathRejection>,
    body: Result<Json<JogadorDto>, JsonRejection>,
) -> Result<Json<JogadorDto>, MyServiceError> {
    let id = extract_id(path)?;
    let dto = extract_body(body)?;
    let existing = find_existing(&app, id).await?;
    let changed = dto.into_player(existing.id);
    let updated = app.player_service.update_jogador(Some(&changed)).await?;
    Ok(Json(updated.into()))
}

pub async fn delete(
    State(app): State<AppState>,
    path: Result<Path<PlayerId>, PathRejection>,
) -> Result<StatusCode, MyServiceError> {
    let id = extract_id(path)?;
    let existing = find_existing(&app, id).await?;
    app.player_service.delete_jogador(Some(&existing)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn find(
    State(app): State<AppState>,
    query: Result<Query<JogadorQuery>, QueryRejection>,
) -> Result<Json<PageResponse<JogadorDto>>, MyServiceError> {
    let Query(query) = query.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    let page_request = query.page_request()?;
    let filter = query.into_filter();
    debug!("Finding players with {:?} {:?}", filter, page_request);

    let page = app
        .player_service
        .find_jogador(&filter, &page_request)
        .await?;
    Ok(Json(page.map(JogadorDto::from).into()))
}
