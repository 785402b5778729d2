//! Handlers for `/libros` and `/libro`.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Json,
};
use biblioteca_db::{LibraryStore, SharedStore};
use biblioteca_http::{
    body::{parse_json, parse_optional_json},
    error::AppError,
    extract::QueryParams,
};

use super::assembler;
use super::models::{
    CreateLibro, CreatedLibro, IdQuery, Libro, ListQuery, UpdateLibro, UpdatedLibro, MISSING_ID,
};
use crate::utils;

const LIBRO_NOT_FOUND: &str = "Libro no encontrado.";
const LIBRO_ID_UNKNOWN: &str = "El ID del libro no existe.";
const LIBRO_DELETED: &str = "Libro eliminado exitosamente.";

/// `GET /libros[?titulo=]`
pub(super) async fn list_libros(
    State(store): State<SharedStore>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<Vec<Libro>>, AppError> {
    let titulo = utils::non_empty(query.titulo);

    let records = store.find_libros(titulo.as_deref()).await?;
    let libros = assembler::hydrate_all(store.as_ref(), records).await?;

    Ok(Json(libros))
}

/// `GET /libro?id=`
pub(super) async fn get_libro(
    State(store): State<SharedStore>,
    QueryParams(query): QueryParams<IdQuery>,
) -> Result<Json<Libro>, AppError> {
    let id = query
        .id()
        .ok_or_else(|| AppError::missing_parameter(MISSING_ID))?;

    let record = store
        .find_libro(&id)
        .await?
        .ok_or_else(|| AppError::not_found(LIBRO_NOT_FOUND))?;

    Ok(Json(assembler::hydrate(store.as_ref(), record).await?))
}

/// `POST /libro`
pub(super) async fn create_libro(
    State(store): State<SharedStore>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedLibro>), AppError> {
    let fields = parse_json::<CreateLibro>(&body)?.validate()?;
    check_autores(store.as_ref(), &fields.autores).await?;

    let id = store.insert_libro(fields.clone()).await?;
    tracing::info!(libro_id = %id, "libro created");

    Ok((StatusCode::CREATED, Json(CreatedLibro::new(id, fields))))
}

/// `PUT /libro?id=`; the id may also be sent inside the body.
pub(super) async fn update_libro(
    State(store): State<SharedStore>,
    QueryParams(query): QueryParams<IdQuery>,
    body: Bytes,
) -> Result<Json<UpdatedLibro>, AppError> {
    let (id, fields) = parse_json::<UpdateLibro>(&body)?.validate(query.id())?;
    check_autores(store.as_ref(), &fields.autores).await?;

    if store.find_libro(&id).await?.is_none() {
        return Err(AppError::not_found(LIBRO_ID_UNKNOWN));
    }

    let outcome = store.replace_libro(&id, fields.clone()).await?;
    // Deleted between the lookup and the replace.
    if outcome.matched == 0 {
        return Err(AppError::not_found(LIBRO_ID_UNKNOWN));
    }
    if outcome.modified == 0 {
        tracing::debug!(libro_id = %id, "libro already up to date");
    } else {
        tracing::info!(libro_id = %id, "libro updated");
    }

    Ok(Json(UpdatedLibro::new(id, fields)))
}

/// `DELETE /libro?id=`; a bare JSON string body is accepted as the id.
pub(super) async fn delete_libro(
    State(store): State<SharedStore>,
    QueryParams(query): QueryParams<IdQuery>,
    body: Bytes,
) -> Result<&'static str, AppError> {
    let id = match query.id() {
        Some(id) => id,
        None => utils::non_empty(parse_optional_json::<String>(&body)?)
            .ok_or_else(|| AppError::missing_parameter(MISSING_ID))?,
    };

    if !store.delete_libro(&id).await? {
        return Err(AppError::not_found(LIBRO_NOT_FOUND));
    }
    tracing::info!(libro_id = %id, "libro deleted");

    Ok(LIBRO_DELETED)
}

/// Looks the referenced authors up without rejecting unknown ones; only a
/// store failure stops the request.
async fn check_autores(store: &dyn LibraryStore, ids: &[String]) -> Result<(), AppError> {
    let found = assembler::resolve_autores(store, ids).await?;

    let mut requested = assembler::canonical_ids(store, ids);
    requested.sort_unstable();
    requested.dedup();
    if found.len() < requested.len() {
        tracing::warn!(
            requested = requested.len(),
            found = found.len(),
            "libro references authors that do not exist"
        );
    }

    Ok(())
}
