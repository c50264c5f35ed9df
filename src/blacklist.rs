//! Blacklist registry: who is barred from the facility and why.
//!
//! Blocks are soft toggles with a mandatory audit trail. Removing a block
//! never deletes anything; it appends an unblock event, and the entry stays
//! queryable (and re-activatable) forever. Every change records motive and
//! actor.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::backend::{ActualizacionBloqueo, Backend, NuevoBloqueo};
use crate::error::GaritaError;
use crate::types::{AccionBloqueo, BlacklistEntry, CambioBloqueo};

/// Request to bar a person. Callers with a person record at hand copy the
/// names from it; walk-in identification is typed in directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltaBloqueo {
    /// Cedula of the person to bar.
    pub cedula: String,
    /// Given name.
    pub nombre: String,
    /// Family name.
    pub apellido: String,
    /// Why the person is barred.
    pub motivo: String,
    /// Operator placing the block.
    pub actor: String,
    /// Whether the bar is meant to be permanent.
    pub es_bloqueo_permanente: bool,
    /// Free-form notes.
    pub observaciones: Option<String>,
}

/// Registry over the blacklist.
#[derive(Clone)]
pub struct BlacklistRegistry {
    backend: Arc<dyn Backend>,
}

impl BlacklistRegistry {
    /// Build a registry over the given storage authority.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Bar a person. The entry is created active, with the initial block
    /// already in its history.
    ///
    /// # Errors
    ///
    /// Fails `Validation` on missing identification or motive, and
    /// `DuplicateBlock` if the cedula already has an active block.
    pub async fn add(&self, alta: AltaBloqueo) -> Result<BlacklistEntry, GaritaError> {
        no_vacio("cedula", &alta.cedula)?;
        no_vacio("nombre", &alta.nombre)?;
        no_vacio("apellido", &alta.apellido)?;
        no_vacio("motivo", &alta.motivo)?;
        no_vacio("actor", &alta.actor)?;

        let entry = self
            .backend
            .insert_block(NuevoBloqueo {
                cedula: alta.cedula.trim().to_owned(),
                nombre: alta.nombre.trim().to_owned(),
                apellido: alta.apellido.trim().to_owned(),
                es_bloqueo_permanente: alta.es_bloqueo_permanente,
                observaciones: alta.observaciones,
                cambio: CambioBloqueo {
                    accion: AccionBloqueo::Bloqueado,
                    motivo: alta.motivo.trim().to_owned(),
                    actor: alta.actor.trim().to_owned(),
                    fecha: Utc::now(),
                },
            })
            .await?;
        info!(
            bloqueo = %entry.id,
            cedula = %entry.cedula,
            permanente = entry.es_bloqueo_permanente,
            "persona agregada a la lista negra"
        );
        Ok(entry)
    }

    /// Lift a bar. Appends an unblock event; the entry itself remains.
    ///
    /// # Errors
    ///
    /// Fails `BlockNotFound` for an unknown id, `NotBlocked` if the entry
    /// is not currently active, and `Validation` on a missing motive.
    pub async fn remove(
        &self,
        id: &str,
        motivo: &str,
        observaciones: Option<&str>,
        actor: &str,
    ) -> Result<BlacklistEntry, GaritaError> {
        no_vacio("motivo", motivo)?;
        no_vacio("actor", actor)?;
        let entry = self
            .backend
            .append_block_change(
                id,
                CambioBloqueo {
                    accion: AccionBloqueo::Desbloqueado,
                    motivo: motivo.trim().to_owned(),
                    actor: actor.trim().to_owned(),
                    fecha: Utc::now(),
                },
                observaciones.map(str::to_owned),
            )
            .await?;
        if entry.es_bloqueo_permanente {
            warn!(
                bloqueo = %entry.id,
                cedula = %entry.cedula,
                "se levantó un bloqueo marcado como permanente"
            );
        }
        info!(bloqueo = %entry.id, cedula = %entry.cedula, actor, "bloqueo levantado");
        Ok(entry)
    }

    /// Re-activate a previously lifted bar on the same entry, keeping the
    /// full history in one place.
    ///
    /// # Errors
    ///
    /// Fails `BlockNotFound` for an unknown id, `AlreadyBlocked` if the
    /// entry is already active, and `Validation` on a missing motive.
    pub async fn reactivate(
        &self,
        id: &str,
        motivo: &str,
        observaciones: Option<&str>,
        actor: &str,
    ) -> Result<BlacklistEntry, GaritaError> {
        no_vacio("motivo", motivo)?;
        no_vacio("actor", actor)?;
        let entry = self
            .backend
            .append_block_change(
                id,
                CambioBloqueo {
                    accion: AccionBloqueo::Bloqueado,
                    motivo: motivo.trim().to_owned(),
                    actor: actor.trim().to_owned(),
                    fecha: Utc::now(),
                },
                observaciones.map(str::to_owned),
            )
            .await?;
        info!(bloqueo = %entry.id, cedula = %entry.cedula, actor, "bloqueo reactivado");
        Ok(entry)
    }

    /// Edit an entry's descriptive fields (permanent flag, notes). The
    /// status history is untouched; use [`BlacklistRegistry::remove`] and
    /// [`BlacklistRegistry::reactivate`] to change the bar itself.
    ///
    /// # Errors
    ///
    /// Fails `Validation` when the edit is empty and `BlockNotFound` for
    /// an unknown id.
    pub async fn update(
        &self,
        id: &str,
        cambios: ActualizacionBloqueo,
    ) -> Result<BlacklistEntry, GaritaError> {
        if cambios == ActualizacionBloqueo::default() {
            return Err(GaritaError::validation("nada que actualizar"));
        }
        let entry = self.backend.update_block(id, cambios).await?;
        info!(bloqueo = %entry.id, cedula = %entry.cedula, "bloqueo editado");
        Ok(entry)
    }

    /// Fetch one entry with its full history.
    pub async fn get(&self, id: &str) -> Result<BlacklistEntry, GaritaError> {
        self.backend.get_block(id).await
    }

    /// Every entry, active or not, ordered by cedula.
    pub async fn list(&self) -> Result<Vec<BlacklistEntry>, GaritaError> {
        let mut entries = self.backend.list_blocks().await?;
        entries.sort_by(|a, b| a.cedula.cmp(&b.cedula));
        Ok(entries)
    }

    /// Currently active entries, ordered by cedula.
    pub async fn activos(&self) -> Result<Vec<BlacklistEntry>, GaritaError> {
        let mut entries: Vec<BlacklistEntry> = self
            .backend
            .list_blocks()
            .await?
            .into_iter()
            .filter(BlacklistEntry::is_active)
            .collect();
        entries.sort_by(|a, b| a.cedula.cmp(&b.cedula));
        Ok(entries)
    }

    /// The active entry for a cedula, if any.
    pub async fn check_bloqueado(
        &self,
        cedula: &str,
    ) -> Result<Option<BlacklistEntry>, GaritaError> {
        let cedula = cedula.trim();
        Ok(self
            .backend
            .list_blocks()
            .await?
            .into_iter()
            .find(|b| b.cedula == cedula && b.is_active()))
    }
}

fn no_vacio(campo: &str, valor: &str) -> Result<(), GaritaError> {
    if valor.trim().is_empty() {
        return Err(GaritaError::validation(format!("{campo} vacío")));
    }
    Ok(())
}
