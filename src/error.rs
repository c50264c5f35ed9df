//! Crate-wide error taxonomy.
//!
//! Every fallible operation returns [`GaritaError`]. Variants carry enough
//! state for the caller to react without parsing messages, and they map
//! onto four categories ([`ErrorKind`]) that drive retry and reporting
//! behavior. The enum also serializes (tagged by `code`) so the backend
//! authority can return the same typed failures over the wire.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{BadgeStatus, TipoPersona};

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing input; nothing was attempted.
    Validation,
    /// The operation conflicts with current state (duplicate, illegal
    /// transition, already closed). Retrying unchanged will fail again.
    Conflict,
    /// The referenced entity does not exist.
    NotFound,
    /// The backend could not be reached or answered garbage. The only
    /// retryable category.
    Transport,
}

/// Typed failures for every operation in the crate.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum GaritaError {
    /// Malformed input (empty cedula, bad range bounds, unknown enum name).
    #[error("entrada inválida: {detalle}")]
    Validation {
        /// What was wrong with the input.
        detalle: String,
    },

    /// A badge with this `(numero, tipo)` already exists.
    #[error("gafete duplicado: {numero} ({tipo})")]
    DuplicateBadge {
        /// Printed badge number.
        numero: String,
        /// Badge category.
        tipo: TipoPersona,
    },

    /// Range provisioning found every number already taken.
    #[error("todos los números del rango {desde}..={hasta} ({tipo}) ya existen")]
    AllDuplicates {
        /// Badge category of the range.
        tipo: TipoPersona,
        /// First number requested.
        desde: u32,
        /// Last number requested.
        hasta: u32,
    },

    /// The requested badge status change is not in the transition table.
    #[error("transición inválida para gafete {numero}: {desde} → {hacia}")]
    InvalidTransition {
        /// Badge number.
        numero: String,
        /// Status the badge is in.
        desde: BadgeStatus,
        /// Status the change would land on.
        hacia: BadgeStatus,
    },

    /// The badge cannot be loaned right now.
    #[error("gafete {numero} no disponible (estado {status})")]
    BadgeUnavailable {
        /// Badge number.
        numero: String,
        /// Status that makes it unloanable.
        status: BadgeStatus,
    },

    /// Deletion refused because of the badge's current status.
    #[error("no se puede eliminar gafete {numero} en estado {status}")]
    DeleteForbidden {
        /// Badge number.
        numero: String,
        /// Status that blocks deletion.
        status: BadgeStatus,
    },

    /// Deletion refused because an open entry record references the badge.
    #[error("gafete {numero} referenciado por ingreso abierto {registro_id}")]
    BadgeReferenced {
        /// Badge number.
        numero: String,
        /// The open entry record holding the reference.
        registro_id: String,
    },

    /// The badge presented at exit is not the one loaned at entry.
    #[error("gafete no coincide: se esperaba {esperado}, se recibió {recibido}")]
    BadgeMismatch {
        /// Number recorded on the entry.
        esperado: String,
        /// Number presented at the gate.
        recibido: String,
    },

    /// The entry record is already closed.
    #[error("registro {registro_id} ya tiene salida registrada")]
    EntryAlreadyClosed {
        /// Entry record id.
        registro_id: String,
    },

    /// The person already has an open entry record.
    #[error("la persona {cedula} ya tiene un ingreso activo")]
    IngresoActivo {
        /// Cedula of the person.
        cedula: String,
    },

    /// An active blacklist entry already exists for this cedula.
    #[error("ya existe un bloqueo activo para {cedula}")]
    DuplicateBlock {
        /// Cedula of the person.
        cedula: String,
    },

    /// Unblock requested on an entry that is not currently active.
    #[error("el bloqueo {id} no está activo")]
    NotBlocked {
        /// Blacklist entry id.
        id: String,
    },

    /// Re-block requested on an entry that is already active.
    #[error("el bloqueo {id} ya está activo")]
    AlreadyBlocked {
        /// Blacklist entry id.
        id: String,
    },

    /// Resolution requested on an alert that is already resolved.
    #[error("la alerta {id} ya fue resuelta")]
    AlreadyResolved {
        /// Alert id.
        id: String,
    },

    /// An entry record was left open after its badge assignment failed
    /// and could not be annulled. Operator intervention required.
    #[error("registro {registro_id} quedó abierto sin gafete: {causa}")]
    CompensationFailed {
        /// The stranded entry record.
        registro_id: String,
        /// The assignment failure that started the rollback.
        causa: String,
    },

    /// No badge with this `(numero, tipo)`.
    #[error("gafete no encontrado: {numero} ({tipo})")]
    BadgeNotFound {
        /// Badge number.
        numero: String,
        /// Badge category.
        tipo: TipoPersona,
    },

    /// No entry record with this id.
    #[error("registro no encontrado: {id}")]
    EntryNotFound {
        /// Entry record id.
        id: String,
    },

    /// No blacklist entry with this id.
    #[error("bloqueo no encontrado: {id}")]
    BlockNotFound {
        /// Blacklist entry id.
        id: String,
    },

    /// No badge alert with this id.
    #[error("alerta no encontrada: {id}")]
    AlertNotFound {
        /// Alert id.
        id: String,
    },

    /// The backend authority could not be reached, timed out, or replied
    /// with something unintelligible.
    #[error("fallo de transporte: {detalle}")]
    Transport {
        /// Sanitized description of what went wrong.
        detalle: String,
    },
}

impl GaritaError {
    /// Category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GaritaError::Validation { .. } => ErrorKind::Validation,
            GaritaError::DuplicateBadge { .. }
            | GaritaError::AllDuplicates { .. }
            | GaritaError::InvalidTransition { .. }
            | GaritaError::BadgeUnavailable { .. }
            | GaritaError::DeleteForbidden { .. }
            | GaritaError::BadgeReferenced { .. }
            | GaritaError::BadgeMismatch { .. }
            | GaritaError::EntryAlreadyClosed { .. }
            | GaritaError::IngresoActivo { .. }
            | GaritaError::DuplicateBlock { .. }
            | GaritaError::NotBlocked { .. }
            | GaritaError::AlreadyBlocked { .. }
            | GaritaError::AlreadyResolved { .. }
            | GaritaError::CompensationFailed { .. } => ErrorKind::Conflict,
            GaritaError::BadgeNotFound { .. }
            | GaritaError::EntryNotFound { .. }
            | GaritaError::BlockNotFound { .. }
            | GaritaError::AlertNotFound { .. } => ErrorKind::NotFound,
            GaritaError::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// Whether a single manual retry is reasonable. Only transport
    /// failures qualify; conflicts and validation failures are stable.
    pub fn retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Shorthand for a validation failure.
    pub fn validation(detalle: impl Into<String>) -> Self {
        GaritaError::Validation {
            detalle: detalle.into(),
        }
    }

    /// Shorthand for a transport failure.
    pub fn transport(detalle: impl std::fmt::Display) -> Self {
        GaritaError::Transport {
            detalle: detalle.to_string(),
        }
    }
}
