use biblioteca_db::{AutorRecord, NewAutor};
use biblioteca_http::error::AppError;
use serde::{Deserialize, Serialize};

use crate::utils;

pub const MISSING_FIELDS: &str = "El nombre del autor y la biografía son campos requeridos.";

/// An author as returned to clients, standalone or embedded in a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autor {
    pub id: String,
    pub nombre: String,
    pub biografia: i64,
}

impl From<AutorRecord> for Autor {
    fn from(record: AutorRecord) -> Self {
        Self {
            id: record.id,
            nombre: record.nombre,
            biografia: record.biografia,
        }
    }
}

/// Body of `POST /autor`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateAutor {
    pub nombre: Option<String>,
    pub biografia: Option<i64>,
}

impl CreateAutor {
    /// Both fields must be present; `nombre` non-empty, `biografia` non-zero.
    pub fn validate(self) -> Result<NewAutor, AppError> {
        let nombre = utils::non_empty(self.nombre);
        let biografia = self.biografia.filter(|value| *value != 0);

        match (nombre, biografia) {
            (Some(nombre), Some(biografia)) => Ok(NewAutor { nombre, biografia }),
            (nombre, biografia) => {
                let mut details = Vec::new();
                if nombre.is_none() {
                    details.push(utils::required("nombre"));
                }
                if biografia.is_none() {
                    details.push(utils::required("biografia"));
                }
                Err(AppError::validation(details, MISSING_FIELDS))
            }
        }
    }
}
