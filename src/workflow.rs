//! Operator-facing workflows over the registries.
//!
//! [`Garita`] is the surface the console talks to. It wires the registries
//! over one backend, runs the entry and exit sagas, and writes the audit
//! line for every privileged action. An audit write failure is logged and
//! the action stands; the gate does not unwind a completed movement over
//! its own bookkeeping.

use std::sync::Arc;

use tracing::warn;

use crate::alerts::AlertManager;
use crate::audit::AuditLog;
use crate::backend::{ActualizacionBloqueo, Backend};
use crate::badges::{BadgeRegistry, CreacionRango, RangoGafetes};
use crate::blacklist::{AltaBloqueo, BlacklistRegistry};
use crate::eligibility::EligibilityValidator;
use crate::error::GaritaError;
use crate::occupancy::{OccupancyLedger, Salida};
use crate::types::{
    BadgeAlert, BadgeStatus, BadgeToken, BlacklistEntry, EligibilityResult, EntryRecord, Persona,
    TipoPersona,
};

/// Outcome of an entry attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultadoIngreso {
    /// The person was admitted and a badge loaned.
    Admitido {
        /// The freshly opened record.
        registro: EntryRecord,
        /// The verdict, kept for its non-blocking `alertas`.
        resultado: EligibilityResult,
    },
    /// The validator refused admission. Nothing was mutated.
    Denegado {
        /// The verdict with its bloqueos.
        resultado: EligibilityResult,
    },
}

/// The gate: registries plus the audited workflows that compose them.
pub struct Garita {
    gafetes: BadgeRegistry,
    lista_negra: BlacklistRegistry,
    alertas: AlertManager,
    registros: OccupancyLedger,
    validador: EligibilityValidator,
    audit: Arc<AuditLog>,
}

impl Garita {
    /// Wire every component over one backend and one audit sink.
    pub fn new(backend: Arc<dyn Backend>, audit: AuditLog) -> Self {
        let gafetes = BadgeRegistry::new(backend.clone());
        let alertas = AlertManager::new(backend.clone());
        let lista_negra = BlacklistRegistry::new(backend.clone());
        let registros = OccupancyLedger::new(backend, gafetes.clone(), alertas.clone());
        let validador =
            EligibilityValidator::new(lista_negra.clone(), registros.clone(), alertas.clone());
        Self {
            gafetes,
            lista_negra,
            alertas,
            registros,
            validador,
            audit: Arc::new(audit),
        }
    }

    /// Badge registry, for queries.
    pub fn gafetes(&self) -> &BadgeRegistry {
        &self.gafetes
    }

    /// Blacklist registry, for queries.
    pub fn lista_negra(&self) -> &BlacklistRegistry {
        &self.lista_negra
    }

    /// Alert manager, for queries.
    pub fn alertas(&self) -> &AlertManager {
        &self.alertas
    }

    /// Occupancy ledger, for queries.
    pub fn registros(&self) -> &OccupancyLedger {
        &self.registros
    }

    /// Run the admission checks without touching anything.
    pub async fn validar(&self, persona: &Persona) -> EligibilityResult {
        self.validador.validar_ingreso(persona).await
    }

    /// The entry saga: validate, check the badge, open the record, assign.
    ///
    /// A refusal is a normal outcome, not an error: the verdict comes back
    /// as [`ResultadoIngreso::Denegado`] and is audit-logged. The badge is
    /// checked before the record is opened so the common failure (badge on
    /// loan) never needs the annulment path.
    ///
    /// # Errors
    ///
    /// Fails `BadgeNotFound`/`BadgeUnavailable` on the badge pre-check, or
    /// with whatever the record/assign steps surfaced (including
    /// `CompensationFailed` if an opened record could not be annulled).
    pub async fn registrar_ingreso(
        &self,
        persona: &Persona,
        gafete_numero: &str,
        operador: &str,
        observaciones: Option<String>,
    ) -> Result<ResultadoIngreso, GaritaError> {
        let resultado = self.validador.validar_ingreso(persona).await;
        if !resultado.puede_ingresar {
            self.auditar(self.audit.log_ingreso_denegado(
                operador,
                &persona.cedula,
                &resultado.bloqueos,
            ));
            return Ok(ResultadoIngreso::Denegado { resultado });
        }

        let gafete = self.gafetes.get(gafete_numero, persona.tipo).await?;
        if gafete.status != BadgeStatus::Disponible {
            return Err(GaritaError::BadgeUnavailable {
                numero: gafete.numero,
                status: gafete.status,
            });
        }

        let registro = self
            .registros
            .crear(&persona.referencia(), gafete_numero, operador, observaciones)
            .await?;
        self.auditar(self.audit.log_ingreso(operador, &registro));
        Ok(ResultadoIngreso::Admitido {
            registro,
            resultado,
        })
    }

    /// The exit saga: close the record, settle the badge.
    ///
    /// # Errors
    ///
    /// Fails `EntryNotFound`, `EntryAlreadyClosed`, or `BadgeMismatch`
    /// (record untouched); badge-side trouble after the close is reported
    /// inside the [`Salida`], not as an error.
    pub async fn registrar_salida(
        &self,
        registro_id: &str,
        operador: &str,
        gafete_presentado: Option<&str>,
        observaciones: Option<String>,
    ) -> Result<Salida, GaritaError> {
        let salida = self
            .registros
            .registrar_salida(registro_id, operador, gafete_presentado, observaciones)
            .await?;
        self.auditar(self.audit.log_salida(
            operador,
            &salida.registro,
            gafete_presentado.is_some(),
        ));
        Ok(salida)
    }

    /// Provision one badge.
    pub async fn crear_gafete(
        &self,
        numero: &str,
        tipo: TipoPersona,
        operador: &str,
    ) -> Result<BadgeToken, GaritaError> {
        let gafete = self.gafetes.create(numero, tipo).await?;
        self.auditar(self.audit.log_gafete_creado(operador, &gafete));
        Ok(gafete)
    }

    /// Provision a numbered badge run.
    pub async fn crear_rango(
        &self,
        rango: &RangoGafetes,
        operador: &str,
    ) -> Result<CreacionRango, GaritaError> {
        let creacion = self.gafetes.create_range(rango).await?;
        self.auditar(self.audit.log_rango_creado(
            operador,
            rango.tipo,
            creacion.creados.len(),
            creacion.omitidos.len(),
        ));
        Ok(creacion)
    }

    /// Move a badge to a target status through its named transition.
    pub async fn actualizar_gafete(
        &self,
        numero: &str,
        tipo: TipoPersona,
        objetivo: BadgeStatus,
        operador: &str,
        motivo: Option<&str>,
    ) -> Result<BadgeToken, GaritaError> {
        let desde = self.gafetes.get(numero, tipo).await?.status;
        let gafete = self
            .gafetes
            .update_status(numero, tipo, objetivo, operador, motivo)
            .await?;
        self.auditar(self.audit.log_gafete_actualizado(operador, &gafete, desde));
        Ok(gafete)
    }

    /// Retire a badge.
    pub async fn eliminar_gafete(
        &self,
        numero: &str,
        tipo: TipoPersona,
        operador: &str,
    ) -> Result<(), GaritaError> {
        self.gafetes.delete(numero, tipo).await?;
        self.auditar(self.audit.log_gafete_eliminado(operador, numero, tipo));
        Ok(())
    }

    /// Bar a person.
    pub async fn bloquear(&self, alta: AltaBloqueo) -> Result<BlacklistEntry, GaritaError> {
        let actor = alta.actor.clone();
        let entry = self.lista_negra.add(alta).await?;
        self.auditar(self.audit.log_bloqueo_agregado(&actor, &entry));
        Ok(entry)
    }

    /// Lift a bar.
    pub async fn desbloquear(
        &self,
        id: &str,
        motivo: &str,
        observaciones: Option<&str>,
        operador: &str,
    ) -> Result<BlacklistEntry, GaritaError> {
        let entry = self
            .lista_negra
            .remove(id, motivo, observaciones, operador)
            .await?;
        self.auditar(self.audit.log_bloqueo_levantado(operador, &entry));
        Ok(entry)
    }

    /// Re-activate a lifted bar.
    pub async fn reactivar_bloqueo(
        &self,
        id: &str,
        motivo: &str,
        observaciones: Option<&str>,
        operador: &str,
    ) -> Result<BlacklistEntry, GaritaError> {
        let entry = self
            .lista_negra
            .reactivate(id, motivo, observaciones, operador)
            .await?;
        self.auditar(self.audit.log_bloqueo_reactivado(operador, &entry));
        Ok(entry)
    }

    /// Edit a blacklist entry's descriptive fields.
    pub async fn actualizar_bloqueo(
        &self,
        id: &str,
        cambios: ActualizacionBloqueo,
        operador: &str,
    ) -> Result<BlacklistEntry, GaritaError> {
        let entry = self.lista_negra.update(id, cambios).await?;
        self.auditar(self.audit.log_bloqueo_editado(operador, &entry));
        Ok(entry)
    }

    /// Open a badge incident by hand (the automatic path lives in the
    /// exit saga).
    pub async fn crear_alerta(
        &self,
        cedula: &str,
        gafete_numero: &str,
        notas: Option<&str>,
        operador: &str,
    ) -> Result<BadgeAlert, GaritaError> {
        let alerta = self.alertas.create(cedula, gafete_numero, notas).await?;
        self.auditar(self.audit.log_alerta_creada(operador, &alerta));
        Ok(alerta)
    }

    /// Resolve a badge incident.
    pub async fn resolver_alerta(
        &self,
        alerta_id: &str,
        notas: Option<&str>,
        operador: &str,
    ) -> Result<BadgeAlert, GaritaError> {
        let alerta = self
            .alertas
            .resolver(alerta_id, notas, Some(operador))
            .await?;
        self.auditar(self.audit.log_alerta_resuelta(operador, &alerta));
        Ok(alerta)
    }

    fn auditar(&self, resultado: anyhow::Result<()>) {
        if let Err(e) = resultado {
            warn!(error = %e, "no se pudo escribir la línea de auditoría");
        }
    }
}
