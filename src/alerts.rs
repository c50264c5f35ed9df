//! Badge alert manager: incidents opened when a badge is not returned,
//! lost, or damaged.
//!
//! Pending alerts feed the admission decision, so an unresolved incident
//! keeps its person out until an operator resolves it. Resolution is
//! terminal; history stays queryable.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::backend::{Backend, NuevaAlerta, ResolucionAlerta};
use crate::error::GaritaError;
use crate::types::BadgeAlert;

/// Manager over badge incidents.
#[derive(Clone)]
pub struct AlertManager {
    backend: Arc<dyn Backend>,
}

impl AlertManager {
    /// Build a manager over the given storage authority.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Open an incident charging a badge to a person.
    ///
    /// # Errors
    ///
    /// Fails `Validation` when cedula or badge number is empty.
    pub async fn create(
        &self,
        cedula: &str,
        gafete_numero: &str,
        notas: Option<&str>,
    ) -> Result<BadgeAlert, GaritaError> {
        let cedula = cedula.trim();
        let gafete_numero = gafete_numero.trim();
        if cedula.is_empty() {
            return Err(GaritaError::validation("cedula vacía en la alerta"));
        }
        if gafete_numero.is_empty() {
            return Err(GaritaError::validation("número de gafete vacío en la alerta"));
        }
        let alerta = self
            .backend
            .insert_alert(NuevaAlerta {
                cedula: cedula.to_owned(),
                gafete_numero: gafete_numero.to_owned(),
                creada: Utc::now(),
                notas: notas.map(str::to_owned),
            })
            .await?;
        info!(
            alerta = %alerta.id,
            cedula = %alerta.cedula,
            gafete = %alerta.gafete_numero,
            "alerta de gafete abierta"
        );
        Ok(alerta)
    }

    /// Resolve an incident. Resolution is terminal.
    ///
    /// # Errors
    ///
    /// Fails `AlertNotFound` for an unknown id and `AlreadyResolved` when
    /// the incident was closed before.
    pub async fn resolver(
        &self,
        alerta_id: &str,
        notas: Option<&str>,
        actor: Option<&str>,
    ) -> Result<BadgeAlert, GaritaError> {
        let alerta = self
            .backend
            .resolve_alert(
                alerta_id,
                ResolucionAlerta {
                    resuelto_por: actor.map(str::to_owned),
                    fecha_resolucion: Utc::now(),
                    notas: notas.map(str::to_owned),
                },
            )
            .await?;
        info!(
            alerta = %alerta.id,
            cedula = %alerta.cedula,
            actor = actor.unwrap_or("desconocido"),
            "alerta de gafete resuelta"
        );
        Ok(alerta)
    }

    /// Unresolved incidents charged to a cedula, oldest first.
    pub async fn pendientes_por_cedula(
        &self,
        cedula: &str,
    ) -> Result<Vec<BadgeAlert>, GaritaError> {
        let cedula = cedula.trim();
        let mut pendientes: Vec<BadgeAlert> = self
            .backend
            .list_alerts()
            .await?
            .into_iter()
            .filter(|a| !a.resuelto && a.cedula == cedula)
            .collect();
        pendientes.sort_by_key(|a| a.creada);
        Ok(pendientes)
    }

    /// Every incident, optionally filtered by resolution state, oldest
    /// first.
    pub async fn get_all(&self, resueltas: Option<bool>) -> Result<Vec<BadgeAlert>, GaritaError> {
        let mut alertas: Vec<BadgeAlert> = self
            .backend
            .list_alerts()
            .await?
            .into_iter()
            .filter(|a| resueltas.map_or(true, |r| a.resuelto == r))
            .collect();
        alertas.sort_by_key(|a| a.creada);
        Ok(alertas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;

    fn manager() -> AlertManager {
        AlertManager::new(Arc::new(MemoryBackend::new()))
    }

    #[tokio::test]
    async fn test_create_valida_campos() {
        let manager = manager();
        let err = manager
            .create("", "V-001", None)
            .await
            .expect_err("cedula vacía debe fallar");
        assert!(matches!(err, GaritaError::Validation { .. }));

        let err = manager
            .create("8-1", "  ", None)
            .await
            .expect_err("gafete vacío debe fallar");
        assert!(matches!(err, GaritaError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_pendientes_filtra_por_cedula_y_estado() {
        let manager = manager();
        let a1 = manager
            .create("8-1", "V-001", Some("no devuelto"))
            .await
            .expect("alerta 1");
        manager
            .create("8-2", "V-002", None)
            .await
            .expect("alerta de otra persona");
        let a3 = manager
            .create("8-1", "V-003", None)
            .await
            .expect("alerta 3");

        manager
            .resolver(&a3.id, Some("apareció"), Some("op1"))
            .await
            .expect("resolver");

        let pendientes = manager
            .pendientes_por_cedula("8-1")
            .await
            .expect("pendientes");
        assert_eq!(pendientes.len(), 1);
        assert_eq!(pendientes[0].id, a1.id);
    }

    #[tokio::test]
    async fn test_resolver_es_terminal() {
        let manager = manager();
        let alerta = manager.create("8-1", "V-001", None).await.expect("alerta");
        manager
            .resolver(&alerta.id, None, Some("op1"))
            .await
            .expect("primera resolución");
        let err = manager
            .resolver(&alerta.id, None, Some("op2"))
            .await
            .expect_err("segunda resolución debe fallar");
        assert!(matches!(err, GaritaError::AlreadyResolved { .. }));
    }

    #[tokio::test]
    async fn test_get_all_filtra_por_resolucion() {
        let manager = manager();
        let a1 = manager.create("8-1", "V-001", None).await.expect("alerta");
        manager.create("8-2", "V-002", None).await.expect("alerta");
        manager
            .resolver(&a1.id, None, None)
            .await
            .expect("resolver");

        assert_eq!(manager.get_all(None).await.expect("todas").len(), 2);
        assert_eq!(
            manager.get_all(Some(true)).await.expect("resueltas").len(),
            1
        );
        assert_eq!(
            manager
                .get_all(Some(false))
                .await
                .expect("pendientes")
                .len(),
            1
        );
    }
}
