//! In-memory backend for tests and offline drills.
//!
//! Holds the same invariants the real authority enforces: unique badge
//! identities, transition revalidation, one open entry per person, block
//! alternation, and terminal alert resolution. Everything is checked and
//! applied under a single write lock, so each call is atomic.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::{
    ActualizacionBloqueo, Backend, CierreRegistro, NuevaAlerta, NuevoBloqueo, NuevoRegistro,
    ResolucionAlerta,
};
use crate::error::GaritaError;
use crate::types::{
    AccionBloqueo, BadgeAlert, BadgeStatus, BadgeToken, BlacklistEntry, CambioBloqueo,
    CambioGafete, EntryRecord, EntryState, TipoPersona,
};

#[derive(Debug, Default)]
struct Estado {
    gafetes: BTreeMap<(String, TipoPersona), BadgeToken>,
    registros: BTreeMap<String, EntryRecord>,
    bloqueos: BTreeMap<String, BlacklistEntry>,
    alertas: BTreeMap<String, BadgeAlert>,
}

/// Backend that keeps everything in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    estado: Arc<RwLock<Estado>>,
}

impl MemoryBackend {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn insert_badge(&self, gafete: BadgeToken) -> Result<BadgeToken, GaritaError> {
        let mut estado = self.estado.write().await;
        let clave = (gafete.numero.clone(), gafete.tipo);
        if estado.gafetes.contains_key(&clave) {
            return Err(GaritaError::DuplicateBadge {
                numero: gafete.numero,
                tipo: gafete.tipo,
            });
        }
        estado.gafetes.insert(clave, gafete.clone());
        Ok(gafete)
    }

    async fn get_badge(
        &self,
        numero: &str,
        tipo: TipoPersona,
    ) -> Result<BadgeToken, GaritaError> {
        let estado = self.estado.read().await;
        estado
            .gafetes
            .get(&(numero.to_owned(), tipo))
            .cloned()
            .ok_or_else(|| GaritaError::BadgeNotFound {
                numero: numero.to_owned(),
                tipo,
            })
    }

    async fn list_badges(&self) -> Result<Vec<BadgeToken>, GaritaError> {
        let estado = self.estado.read().await;
        Ok(estado.gafetes.values().cloned().collect())
    }

    async fn transition_badge(
        &self,
        numero: &str,
        tipo: TipoPersona,
        cambio: CambioGafete,
    ) -> Result<BadgeToken, GaritaError> {
        let mut estado = self.estado.write().await;
        let gafete = estado
            .gafetes
            .get_mut(&(numero.to_owned(), tipo))
            .ok_or_else(|| GaritaError::BadgeNotFound {
                numero: numero.to_owned(),
                tipo,
            })?;
        cambio.aplicar(gafete, Utc::now())?;
        Ok(gafete.clone())
    }

    async fn delete_badge(&self, numero: &str, tipo: TipoPersona) -> Result<(), GaritaError> {
        let mut estado = self.estado.write().await;
        let clave = (numero.to_owned(), tipo);
        let gafete = estado
            .gafetes
            .get(&clave)
            .ok_or_else(|| GaritaError::BadgeNotFound {
                numero: numero.to_owned(),
                tipo,
            })?;
        if !matches!(gafete.status, BadgeStatus::Disponible | BadgeStatus::Danado) {
            return Err(GaritaError::DeleteForbidden {
                numero: numero.to_owned(),
                status: gafete.status,
            });
        }
        if let Some(abierto) = estado.registros.values().find(|r| {
            r.estado == EntryState::Adentro && r.gafete_numero == numero && r.tipo_persona == tipo
        }) {
            return Err(GaritaError::BadgeReferenced {
                numero: numero.to_owned(),
                registro_id: abierto.id.clone(),
            });
        }
        estado.gafetes.remove(&clave);
        Ok(())
    }

    async fn insert_entry(&self, nuevo: NuevoRegistro) -> Result<EntryRecord, GaritaError> {
        let mut estado = self.estado.write().await;
        let abierto = estado.registros.values().any(|r| {
            r.estado == EntryState::Adentro
                && r.cedula == nuevo.cedula
                && r.tipo_persona == nuevo.tipo_persona
        });
        if abierto {
            return Err(GaritaError::IngresoActivo {
                cedula: nuevo.cedula,
            });
        }
        let registro = EntryRecord {
            id: Uuid::new_v4().to_string(),
            cedula: nuevo.cedula,
            tipo_persona: nuevo.tipo_persona,
            gafete_numero: nuevo.gafete_numero,
            fecha_entrada: nuevo.fecha_entrada,
            fecha_salida: None,
            estado: EntryState::Adentro,
            entrada_por: nuevo.entrada_por,
            salida_por: None,
            observaciones: nuevo.observaciones,
        };
        estado.registros.insert(registro.id.clone(), registro.clone());
        Ok(registro)
    }

    async fn get_entry(&self, id: &str) -> Result<EntryRecord, GaritaError> {
        let estado = self.estado.read().await;
        estado
            .registros
            .get(id)
            .cloned()
            .ok_or_else(|| GaritaError::EntryNotFound { id: id.to_owned() })
    }

    async fn list_entries(&self) -> Result<Vec<EntryRecord>, GaritaError> {
        let estado = self.estado.read().await;
        Ok(estado.registros.values().cloned().collect())
    }

    async fn close_entry(
        &self,
        id: &str,
        cierre: CierreRegistro,
    ) -> Result<EntryRecord, GaritaError> {
        let mut estado = self.estado.write().await;
        let registro = estado
            .registros
            .get_mut(id)
            .ok_or_else(|| GaritaError::EntryNotFound { id: id.to_owned() })?;
        if registro.estado == EntryState::Salio {
            return Err(GaritaError::EntryAlreadyClosed {
                registro_id: id.to_owned(),
            });
        }
        registro.estado = EntryState::Salio;
        registro.fecha_salida = Some(cierre.fecha_salida);
        registro.salida_por = Some(cierre.salida_por);
        if cierre.observaciones.is_some() {
            registro.observaciones = cierre.observaciones;
        }
        Ok(registro.clone())
    }

    async fn insert_block(&self, nuevo: NuevoBloqueo) -> Result<BlacklistEntry, GaritaError> {
        let mut estado = self.estado.write().await;
        if nuevo.cambio.accion != AccionBloqueo::Bloqueado {
            return Err(GaritaError::validation(
                "el evento inicial de un bloqueo debe ser un bloqueo",
            ));
        }
        let activo = estado
            .bloqueos
            .values()
            .any(|b| b.cedula == nuevo.cedula && b.is_active());
        if activo {
            return Err(GaritaError::DuplicateBlock {
                cedula: nuevo.cedula,
            });
        }
        let entry = BlacklistEntry {
            id: Uuid::new_v4().to_string(),
            cedula: nuevo.cedula,
            nombre: nuevo.nombre,
            apellido: nuevo.apellido,
            es_bloqueo_permanente: nuevo.es_bloqueo_permanente,
            observaciones: nuevo.observaciones,
            historial: vec![nuevo.cambio],
        };
        estado.bloqueos.insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    async fn get_block(&self, id: &str) -> Result<BlacklistEntry, GaritaError> {
        let estado = self.estado.read().await;
        estado
            .bloqueos
            .get(id)
            .cloned()
            .ok_or_else(|| GaritaError::BlockNotFound { id: id.to_owned() })
    }

    async fn list_blocks(&self) -> Result<Vec<BlacklistEntry>, GaritaError> {
        let estado = self.estado.read().await;
        Ok(estado.bloqueos.values().cloned().collect())
    }

    async fn append_block_change(
        &self,
        id: &str,
        cambio: CambioBloqueo,
        observaciones: Option<String>,
    ) -> Result<BlacklistEntry, GaritaError> {
        let mut estado = self.estado.write().await;
        let entry = estado
            .bloqueos
            .get_mut(id)
            .ok_or_else(|| GaritaError::BlockNotFound { id: id.to_owned() })?;
        match cambio.accion {
            AccionBloqueo::Desbloqueado if !entry.is_active() => {
                return Err(GaritaError::NotBlocked { id: id.to_owned() });
            }
            AccionBloqueo::Bloqueado if entry.is_active() => {
                return Err(GaritaError::AlreadyBlocked { id: id.to_owned() });
            }
            _ => {}
        }
        entry.historial.push(cambio);
        if observaciones.is_some() {
            entry.observaciones = observaciones;
        }
        Ok(entry.clone())
    }

    async fn update_block(
        &self,
        id: &str,
        cambios: ActualizacionBloqueo,
    ) -> Result<BlacklistEntry, GaritaError> {
        let mut estado = self.estado.write().await;
        let entry = estado
            .bloqueos
            .get_mut(id)
            .ok_or_else(|| GaritaError::BlockNotFound { id: id.to_owned() })?;
        if let Some(permanente) = cambios.es_bloqueo_permanente {
            entry.es_bloqueo_permanente = permanente;
        }
        if cambios.observaciones.is_some() {
            entry.observaciones = cambios.observaciones;
        }
        Ok(entry.clone())
    }

    async fn insert_alert(&self, nueva: NuevaAlerta) -> Result<BadgeAlert, GaritaError> {
        let mut estado = self.estado.write().await;
        let alerta = BadgeAlert {
            id: Uuid::new_v4().to_string(),
            cedula: nueva.cedula,
            gafete_numero: nueva.gafete_numero,
            creada: nueva.creada,
            resuelto: false,
            resuelto_por: None,
            fecha_resolucion: None,
            notas: nueva.notas,
        };
        estado.alertas.insert(alerta.id.clone(), alerta.clone());
        Ok(alerta)
    }

    async fn get_alert(&self, id: &str) -> Result<BadgeAlert, GaritaError> {
        let estado = self.estado.read().await;
        estado
            .alertas
            .get(id)
            .cloned()
            .ok_or_else(|| GaritaError::AlertNotFound { id: id.to_owned() })
    }

    async fn list_alerts(&self) -> Result<Vec<BadgeAlert>, GaritaError> {
        let estado = self.estado.read().await;
        Ok(estado.alertas.values().cloned().collect())
    }

    async fn resolve_alert(
        &self,
        id: &str,
        resolucion: ResolucionAlerta,
    ) -> Result<BadgeAlert, GaritaError> {
        let mut estado = self.estado.write().await;
        let alerta = estado
            .alertas
            .get_mut(id)
            .ok_or_else(|| GaritaError::AlertNotFound { id: id.to_owned() })?;
        if alerta.resuelto {
            return Err(GaritaError::AlreadyResolved { id: id.to_owned() });
        }
        alerta.resuelto = true;
        alerta.resuelto_por = resolucion.resuelto_por;
        alerta.fecha_resolucion = Some(resolucion.fecha_resolucion);
        if resolucion.notas.is_some() {
            alerta.notas = resolucion.notas;
        }
        Ok(alerta.clone())
    }
}
