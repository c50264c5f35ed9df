//! Badge registry: provisioning, lifecycle transitions, and retirement of
//! the physical badge tokens loaned at the gate.
//!
//! The registry validates client-side for fast feedback, but every status
//! change travels to the backend as a named [`CambioGafete`] and is
//! revalidated there against current state. There is no operation that
//! writes a status field directly.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::Backend;
use crate::error::GaritaError;
use crate::types::{BadgeStatus, BadgeToken, CambioGafete, TipoPersona};

/// Largest number of badges one range request may provision.
const MAX_RANGO: u32 = 500;

/// Request to provision a numbered run of badges of one tipo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangoGafetes {
    /// Badge category for the whole run.
    pub tipo: TipoPersona,
    /// Printed prefix, e.g. `"V-"`.
    pub prefijo: String,
    /// First number, inclusive.
    pub desde: u32,
    /// Last number, inclusive.
    pub hasta: u32,
    /// Zero-padding width for the numeric part (`3` makes `V-001`).
    pub ancho: usize,
}

impl RangoGafetes {
    /// Render the printed number for one position in the range.
    fn numero(&self, n: u32) -> String {
        let ancho = self.ancho;
        format!("{}{n:0ancho$}", self.prefijo)
    }
}

/// Outcome of a range provisioning request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreacionRango {
    /// Badges actually created, in numeric order.
    pub creados: Vec<BadgeToken>,
    /// Numbers skipped because they already existed.
    pub omitidos: Vec<String>,
}

/// Registry over the badge inventory.
#[derive(Clone)]
pub struct BadgeRegistry {
    backend: Arc<dyn Backend>,
}

impl BadgeRegistry {
    /// Build a registry over the given storage authority.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Provision a single badge, born disponible.
    ///
    /// # Errors
    ///
    /// Fails `Validation` on a malformed numero and `DuplicateBadge` if the
    /// `(numero, tipo)` identity is taken.
    pub async fn create(&self, numero: &str, tipo: TipoPersona) -> Result<BadgeToken, GaritaError> {
        let numero = numero.trim();
        validar_numero(numero)?;
        let gafete = self
            .backend
            .insert_badge(BadgeToken::nuevo(numero, tipo))
            .await?;
        info!(numero = %gafete.numero, tipo = %gafete.tipo, "gafete creado");
        Ok(gafete)
    }

    /// Provision a numbered run of badges, skipping numbers that already
    /// exist. Skips are reported, not errors; only a run where nothing at
    /// all could be created fails.
    ///
    /// # Errors
    ///
    /// Fails `Validation` on a malformed range and `AllDuplicates` when
    /// every number in the run was already taken.
    pub async fn create_range(&self, rango: &RangoGafetes) -> Result<CreacionRango, GaritaError> {
        if rango.desde > rango.hasta {
            return Err(GaritaError::validation(format!(
                "rango invertido: {}..={}",
                rango.desde, rango.hasta
            )));
        }
        let span = rango.hasta.checked_sub(rango.desde).unwrap_or(0);
        if span >= MAX_RANGO {
            return Err(GaritaError::validation(format!(
                "rango demasiado grande: máximo {MAX_RANGO} gafetes por solicitud"
            )));
        }
        validar_numero(&rango.numero(rango.desde))?;

        let existentes: HashSet<String> = self
            .backend
            .list_badges()
            .await?
            .into_iter()
            .filter(|g| g.tipo == rango.tipo)
            .map(|g| g.numero)
            .collect();

        let mut creados = Vec::new();
        let mut omitidos = Vec::new();
        for n in rango.desde..=rango.hasta {
            let numero = rango.numero(n);
            if existentes.contains(&numero) {
                omitidos.push(numero);
                continue;
            }
            match self
                .backend
                .insert_badge(BadgeToken::nuevo(&numero, rango.tipo))
                .await
            {
                Ok(gafete) => creados.push(gafete),
                // Someone provisioned the number between our list and insert.
                Err(GaritaError::DuplicateBadge { .. }) => omitidos.push(numero),
                Err(e) => return Err(e),
            }
        }

        if creados.is_empty() {
            return Err(GaritaError::AllDuplicates {
                tipo: rango.tipo,
                desde: rango.desde,
                hasta: rango.hasta,
            });
        }
        info!(
            tipo = %rango.tipo,
            creados = creados.len(),
            omitidos = omitidos.len(),
            "rango de gafetes provisionado"
        );
        Ok(CreacionRango { creados, omitidos })
    }

    /// Fetch one badge.
    pub async fn get(&self, numero: &str, tipo: TipoPersona) -> Result<BadgeToken, GaritaError> {
        self.backend.get_badge(numero.trim(), tipo).await
    }

    /// Every badge in the inventory, ordered by tipo then numero.
    pub async fn list(&self) -> Result<Vec<BadgeToken>, GaritaError> {
        let mut gafetes = self.backend.list_badges().await?;
        gafetes.sort_by(|a, b| (a.tipo, &a.numero).cmp(&(b.tipo, &b.numero)));
        Ok(gafetes)
    }

    /// Loanable badges of one tipo, ordered by numero.
    pub async fn get_available(&self, tipo: TipoPersona) -> Result<Vec<BadgeToken>, GaritaError> {
        let mut gafetes: Vec<BadgeToken> = self
            .backend
            .list_badges()
            .await?
            .into_iter()
            .filter(|g| g.tipo == tipo && g.status == BadgeStatus::Disponible)
            .collect();
        gafetes.sort_by(|a, b| a.numero.cmp(&b.numero));
        Ok(gafetes)
    }

    /// Whether a badge can be loaned right now. A badge that does not
    /// exist is simply not available; use [`BadgeRegistry::get`] when the
    /// caller needs to distinguish.
    pub async fn is_available(&self, numero: &str, tipo: TipoPersona) -> Result<bool, GaritaError> {
        match self.backend.get_badge(numero.trim(), tipo).await {
            Ok(gafete) => Ok(gafete.status == BadgeStatus::Disponible),
            Err(GaritaError::BadgeNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Move a badge to `objetivo` by mapping the pair (current, target)
    /// onto the corresponding named transition.
    ///
    /// # Errors
    ///
    /// Fails `InvalidTransition` when no named transition covers the pair.
    /// The mapping reads current status first, so a concurrent change can
    /// still surface as `InvalidTransition` from the backend revalidation.
    pub async fn update_status(
        &self,
        numero: &str,
        tipo: TipoPersona,
        objetivo: BadgeStatus,
        actor: &str,
        motivo: Option<&str>,
    ) -> Result<BadgeToken, GaritaError> {
        let numero = numero.trim();
        let actual = self.backend.get_badge(numero, tipo).await?.status;
        let cambio = cambio_hacia(actual, objetivo, actor, motivo).ok_or_else(|| {
            GaritaError::InvalidTransition {
                numero: numero.to_owned(),
                desde: actual,
                hacia: objetivo,
            }
        })?;
        let gafete = self.backend.transition_badge(numero, tipo, cambio).await?;
        info!(
            numero = %gafete.numero,
            tipo = %gafete.tipo,
            desde = %actual,
            hacia = %gafete.status,
            actor,
            "estado de gafete actualizado"
        );
        Ok(gafete)
    }

    /// Bind a badge to an open entry record (disponible → en_uso).
    pub async fn asignar(
        &self,
        numero: &str,
        tipo: TipoPersona,
        registro_id: &str,
    ) -> Result<BadgeToken, GaritaError> {
        self.backend
            .transition_badge(
                numero.trim(),
                tipo,
                CambioGafete::Asignar {
                    registro_id: Some(registro_id.to_owned()),
                },
            )
            .await
    }

    /// Return a badge to the rack (en_uso → disponible).
    pub async fn devolver(
        &self,
        numero: &str,
        tipo: TipoPersona,
    ) -> Result<BadgeToken, GaritaError> {
        self.backend
            .transition_badge(numero.trim(), tipo, CambioGafete::Devolver)
            .await
    }

    /// File a lost report ({disponible, en_uso} → perdido).
    pub async fn reportar_perdido(
        &self,
        numero: &str,
        tipo: TipoPersona,
        quien: Option<&str>,
        reportado_por: &str,
        motivo: Option<&str>,
    ) -> Result<BadgeToken, GaritaError> {
        let gafete = self
            .backend
            .transition_badge(
                numero.trim(),
                tipo,
                CambioGafete::ReportarPerdido {
                    quien: quien.map(str::to_owned),
                    reportado_por: Some(reportado_por.to_owned()),
                    motivo: motivo.map(str::to_owned),
                },
            )
            .await?;
        warn!(
            numero = %gafete.numero,
            tipo = %gafete.tipo,
            quien = quien.unwrap_or("desconocido"),
            "gafete reportado como perdido"
        );
        Ok(gafete)
    }

    /// Retire a badge from the inventory. The backend refuses unless the
    /// badge is disponible or danado and no open entry references it.
    pub async fn delete(&self, numero: &str, tipo: TipoPersona) -> Result<(), GaritaError> {
        let numero = numero.trim();
        self.backend.delete_badge(numero, tipo).await?;
        info!(numero, tipo = %tipo, "gafete eliminado");
        Ok(())
    }
}

fn validar_numero(numero: &str) -> Result<(), GaritaError> {
    if numero.is_empty() {
        return Err(GaritaError::validation("número de gafete vacío"));
    }
    if numero.contains('/') || numero.contains(char::is_whitespace) {
        return Err(GaritaError::validation(format!(
            "número de gafete inválido: {numero:?}"
        )));
    }
    Ok(())
}

/// Map a (current, target) status pair onto the named transition that
/// realizes it, if any does.
fn cambio_hacia(
    actual: BadgeStatus,
    objetivo: BadgeStatus,
    actor: &str,
    motivo: Option<&str>,
) -> Option<CambioGafete> {
    match (actual, objetivo) {
        (BadgeStatus::Disponible, BadgeStatus::EnUso) => {
            Some(CambioGafete::Asignar { registro_id: None })
        }
        (BadgeStatus::EnUso, BadgeStatus::Disponible) => Some(CambioGafete::Devolver),
        (BadgeStatus::Disponible | BadgeStatus::EnUso, BadgeStatus::Perdido) => {
            Some(CambioGafete::ReportarPerdido {
                quien: None,
                reportado_por: Some(actor.to_owned()),
                motivo: motivo.map(str::to_owned),
            })
        }
        (BadgeStatus::Perdido, BadgeStatus::Extraviado) => Some(CambioGafete::MarcarExtraviado {
            actor: Some(actor.to_owned()),
        }),
        (BadgeStatus::Extraviado, BadgeStatus::Disponible) => Some(CambioGafete::Recuperar {
            actor: actor.to_owned(),
        }),
        (BadgeStatus::Danado, BadgeStatus::Disponible) => Some(CambioGafete::Reparar {
            actor: actor.to_owned(),
        }),
        (actual, BadgeStatus::Danado) if actual != BadgeStatus::Danado => {
            Some(CambioGafete::MarcarDanado {
                actor: Some(actor.to_owned()),
                motivo: motivo.map(str::to_owned),
            })
        }
        _ => None,
    }
}
