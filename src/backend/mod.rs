//! Storage authority abstraction.
//!
//! All durable state lives behind a remote backend; nothing is persisted in
//! this process. The [`Backend`] trait is the seam: each method is one
//! atomic operation on one entity, and cross-entity flows are composed by
//! the registries on top. Badge status never moves by field overwrite:
//! callers send a named [`CambioGafete`] and the backend revalidates it
//! against current state before applying.
//!
//! Two implementations ship here: [`http::HttpBackend`] for the real
//! authority and [`memory::MemoryBackend`] for tests and offline drills.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GaritaError;
use crate::types::{
    BadgeAlert, BadgeToken, BlacklistEntry, CambioBloqueo, CambioGafete, EntryRecord, TipoPersona,
};

/// Payload for opening an entry record. The backend mints the id and
/// enforces the one-open-entry-per-person invariant atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NuevoRegistro {
    /// Cedula of the person entering.
    pub cedula: String,
    /// Person category (must match the badge tipo).
    pub tipo_persona: TipoPersona,
    /// Badge loaned for the stay.
    pub gafete_numero: String,
    /// Entry timestamp, stamped by the caller.
    pub fecha_entrada: DateTime<Utc>,
    /// Operator registering the entry.
    pub entrada_por: String,
    /// Free-form notes.
    pub observaciones: Option<String>,
}

/// Payload for closing an entry record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CierreRegistro {
    /// Exit timestamp, stamped by the caller.
    pub fecha_salida: DateTime<Utc>,
    /// Operator registering the exit.
    pub salida_por: String,
    /// Notes to record on the closed span; `None` keeps existing notes.
    pub observaciones: Option<String>,
}

/// Payload for creating a blacklist entry. Carries the initial block
/// event so the entry is never observable without a history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NuevoBloqueo {
    /// Cedula of the person being barred.
    pub cedula: String,
    /// Given name.
    pub nombre: String,
    /// Family name.
    pub apellido: String,
    /// Whether the bar is meant to be permanent.
    pub es_bloqueo_permanente: bool,
    /// Free-form notes.
    pub observaciones: Option<String>,
    /// The block event that creates the entry.
    pub cambio: CambioBloqueo,
}

/// Partial edit of a blacklist entry's descriptive fields. Only the
/// fields present change; the status history is not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualizacionBloqueo {
    /// New value for the permanent flag, when changing it.
    pub es_bloqueo_permanente: Option<bool>,
    /// Replacement notes, when changing them.
    pub observaciones: Option<String>,
}

/// Payload for opening a badge alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NuevaAlerta {
    /// Cedula the incident is charged to.
    pub cedula: String,
    /// Badge number involved.
    pub gafete_numero: String,
    /// When the incident was opened, stamped by the caller.
    pub creada: DateTime<Utc>,
    /// Context notes.
    pub notas: Option<String>,
}

/// Payload for resolving a badge alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolucionAlerta {
    /// Operator resolving the incident.
    pub resuelto_por: Option<String>,
    /// Resolution timestamp, stamped by the caller.
    pub fecha_resolucion: DateTime<Utc>,
    /// Resolution notes.
    pub notas: Option<String>,
}

/// The remote storage authority.
///
/// Every method settles within the configured deadline: implementations
/// either answer or fail `Transport`, never hang. List operations return
/// full result sets; filtering happens client-side at this facility's
/// scale.
#[async_trait]
pub trait Backend: Send + Sync {
    // ── Badges ──

    /// Store a new badge. Fails `DuplicateBadge` if `(numero, tipo)` exists.
    async fn insert_badge(&self, gafete: BadgeToken) -> Result<BadgeToken, GaritaError>;

    /// Fetch one badge by `(numero, tipo)`.
    async fn get_badge(&self, numero: &str, tipo: TipoPersona)
        -> Result<BadgeToken, GaritaError>;

    /// Fetch every badge.
    async fn list_badges(&self) -> Result<Vec<BadgeToken>, GaritaError>;

    /// Apply a named transition, revalidating it against the badge's
    /// current status in the same atomic step. Fails `InvalidTransition`
    /// when the move is stale or illegal.
    async fn transition_badge(
        &self,
        numero: &str,
        tipo: TipoPersona,
        cambio: CambioGafete,
    ) -> Result<BadgeToken, GaritaError>;

    /// Remove a badge. Fails `DeleteForbidden` unless the badge is
    /// disponible or danado, and `BadgeReferenced` while an open entry
    /// record points at it.
    async fn delete_badge(&self, numero: &str, tipo: TipoPersona) -> Result<(), GaritaError>;

    // ── Entry records ──

    /// Open an entry record. Fails `IngresoActivo` if the person already
    /// has an open record, checked atomically with the insert.
    async fn insert_entry(&self, nuevo: NuevoRegistro) -> Result<EntryRecord, GaritaError>;

    /// Fetch one entry record by id.
    async fn get_entry(&self, id: &str) -> Result<EntryRecord, GaritaError>;

    /// Fetch every entry record.
    async fn list_entries(&self) -> Result<Vec<EntryRecord>, GaritaError>;

    /// Close an entry record. Fails `EntryAlreadyClosed` if it is not open.
    async fn close_entry(
        &self,
        id: &str,
        cierre: CierreRegistro,
    ) -> Result<EntryRecord, GaritaError>;

    // ── Blacklist ──

    /// Create a blacklist entry with its initial block event. Fails
    /// `DuplicateBlock` if an active entry already exists for the cedula.
    async fn insert_block(&self, nuevo: NuevoBloqueo) -> Result<BlacklistEntry, GaritaError>;

    /// Fetch one blacklist entry by id.
    async fn get_block(&self, id: &str) -> Result<BlacklistEntry, GaritaError>;

    /// Fetch every blacklist entry, active or not.
    async fn list_blocks(&self) -> Result<Vec<BlacklistEntry>, GaritaError>;

    /// Append a block/unblock event to an entry's history. The backend
    /// enforces alternation: `NotBlocked` when unblocking an inactive
    /// entry, `AlreadyBlocked` when re-blocking an active one. A non-None
    /// `observaciones` replaces the entry's notes.
    async fn append_block_change(
        &self,
        id: &str,
        cambio: CambioBloqueo,
        observaciones: Option<String>,
    ) -> Result<BlacklistEntry, GaritaError>;

    /// Edit an entry's descriptive fields without touching its history.
    async fn update_block(
        &self,
        id: &str,
        cambios: ActualizacionBloqueo,
    ) -> Result<BlacklistEntry, GaritaError>;

    // ── Badge alerts ──

    /// Open a badge alert.
    async fn insert_alert(&self, nueva: NuevaAlerta) -> Result<BadgeAlert, GaritaError>;

    /// Fetch one alert by id.
    async fn get_alert(&self, id: &str) -> Result<BadgeAlert, GaritaError>;

    /// Fetch every alert, resolved or not.
    async fn list_alerts(&self) -> Result<Vec<BadgeAlert>, GaritaError>;

    /// Resolve an alert. Fails `AlreadyResolved` on a second resolution;
    /// resolution is terminal.
    async fn resolve_alert(
        &self,
        id: &str,
        resolucion: ResolucionAlerta,
    ) -> Result<BadgeAlert, GaritaError>;
}
