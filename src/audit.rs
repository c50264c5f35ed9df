//! Append-only audit trail of privileged gate actions.
//!
//! Writes structured JSON entries, one per line, to an append-only sink.
//! Unlike the HTTP error path, cedulas are not redacted here: this file is
//! the facility's own record of who did what at the gate, and identity is
//! the point. Audit write failures are the caller's to handle; workflows
//! log them and continue rather than unwinding a completed action.

use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;

use crate::types::{
    BadgeAlert, BadgeStatus, BadgeToken, BlacklistEntry, EntryRecord, MotivoBloqueo, TipoPersona,
};

/// Audit event discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEvent {
    /// A person entered and a badge was loaned.
    IngresoRegistrado,
    /// Admission was refused by the validator.
    IngresoDenegado,
    /// A person left; the record was closed.
    SalidaRegistrada,
    /// A badge was provisioned.
    GafeteCreado,
    /// A numbered run of badges was provisioned.
    RangoGafetesCreado,
    /// A badge moved through a lifecycle transition.
    GafeteActualizado,
    /// A badge was retired from the inventory.
    GafeteEliminado,
    /// A person was barred.
    BloqueoAgregado,
    /// A bar was lifted.
    BloqueoLevantado,
    /// A lifted bar was re-activated.
    BloqueoReactivado,
    /// A blacklist entry's descriptive fields were edited.
    BloqueoEditado,
    /// A badge incident was opened.
    AlertaCreada,
    /// A badge incident was resolved.
    AlertaResuelta,
}

/// One audit line.
#[derive(Debug, Serialize)]
struct AuditEntry {
    timestamp: String,
    actor: String,
    event: AuditEvent,
    details: serde_json::Value,
}

/// Audit log writing structured JSON to an append-only sink.
pub struct AuditLog {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl AuditLog {
    /// Create an audit log that appends to the given file path.
    pub fn new(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            writer: Mutex::new(Box::new(file)),
        })
    }

    /// Create an audit log from an arbitrary writer (for testing).
    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Log a registered entry.
    pub fn log_ingreso(&self, actor: &str, registro: &EntryRecord) -> anyhow::Result<()> {
        self.write_entry(
            AuditEvent::IngresoRegistrado,
            actor,
            serde_json::json!({
                "registro_id": registro.id,
                "cedula": registro.cedula,
                "tipo": registro.tipo_persona,
                "gafete": registro.gafete_numero,
            }),
        )
    }

    /// Log a refused admission with the bloqueos that caused it.
    pub fn log_ingreso_denegado(
        &self,
        actor: &str,
        cedula: &str,
        bloqueos: &[MotivoBloqueo],
    ) -> anyhow::Result<()> {
        self.write_entry(
            AuditEvent::IngresoDenegado,
            actor,
            serde_json::json!({
                "cedula": cedula,
                "bloqueos": bloqueos,
            }),
        )
    }

    /// Log a registered exit.
    pub fn log_salida(
        &self,
        actor: &str,
        registro: &EntryRecord,
        gafete_devuelto: bool,
    ) -> anyhow::Result<()> {
        self.write_entry(
            AuditEvent::SalidaRegistrada,
            actor,
            serde_json::json!({
                "registro_id": registro.id,
                "cedula": registro.cedula,
                "gafete": registro.gafete_numero,
                "gafete_devuelto": gafete_devuelto,
            }),
        )
    }

    /// Log a provisioned badge.
    pub fn log_gafete_creado(&self, actor: &str, gafete: &BadgeToken) -> anyhow::Result<()> {
        self.write_entry(
            AuditEvent::GafeteCreado,
            actor,
            serde_json::json!({
                "numero": gafete.numero,
                "tipo": gafete.tipo,
            }),
        )
    }

    /// Log a provisioned badge range.
    pub fn log_rango_creado(
        &self,
        actor: &str,
        tipo: TipoPersona,
        creados: usize,
        omitidos: usize,
    ) -> anyhow::Result<()> {
        self.write_entry(
            AuditEvent::RangoGafetesCreado,
            actor,
            serde_json::json!({
                "tipo": tipo,
                "creados": creados,
                "omitidos": omitidos,
            }),
        )
    }

    /// Log a badge lifecycle transition.
    pub fn log_gafete_actualizado(
        &self,
        actor: &str,
        gafete: &BadgeToken,
        desde: BadgeStatus,
    ) -> anyhow::Result<()> {
        self.write_entry(
            AuditEvent::GafeteActualizado,
            actor,
            serde_json::json!({
                "numero": gafete.numero,
                "tipo": gafete.tipo,
                "desde": desde,
                "hacia": gafete.status,
            }),
        )
    }

    /// Log a badge retirement.
    pub fn log_gafete_eliminado(
        &self,
        actor: &str,
        numero: &str,
        tipo: TipoPersona,
    ) -> anyhow::Result<()> {
        self.write_entry(
            AuditEvent::GafeteEliminado,
            actor,
            serde_json::json!({
                "numero": numero,
                "tipo": tipo,
            }),
        )
    }

    /// Log a blacklist addition.
    pub fn log_bloqueo_agregado(&self, actor: &str, entry: &BlacklistEntry) -> anyhow::Result<()> {
        self.log_bloqueo(AuditEvent::BloqueoAgregado, actor, entry)
    }

    /// Log a lifted block.
    pub fn log_bloqueo_levantado(&self, actor: &str, entry: &BlacklistEntry) -> anyhow::Result<()> {
        self.log_bloqueo(AuditEvent::BloqueoLevantado, actor, entry)
    }

    /// Log a re-activated block.
    pub fn log_bloqueo_reactivado(
        &self,
        actor: &str,
        entry: &BlacklistEntry,
    ) -> anyhow::Result<()> {
        self.log_bloqueo(AuditEvent::BloqueoReactivado, actor, entry)
    }

    /// Log an edit of a blacklist entry's descriptive fields.
    pub fn log_bloqueo_editado(&self, actor: &str, entry: &BlacklistEntry) -> anyhow::Result<()> {
        self.log_bloqueo(AuditEvent::BloqueoEditado, actor, entry)
    }

    fn log_bloqueo(
        &self,
        event: AuditEvent,
        actor: &str,
        entry: &BlacklistEntry,
    ) -> anyhow::Result<()> {
        self.write_entry(
            event,
            actor,
            serde_json::json!({
                "bloqueo_id": entry.id,
                "cedula": entry.cedula,
                "activo": entry.is_active(),
                "motivo": entry.motivo_actual(),
            }),
        )
    }

    /// Log an opened badge incident.
    pub fn log_alerta_creada(&self, actor: &str, alerta: &BadgeAlert) -> anyhow::Result<()> {
        self.write_entry(
            AuditEvent::AlertaCreada,
            actor,
            serde_json::json!({
                "alerta_id": alerta.id,
                "cedula": alerta.cedula,
                "gafete": alerta.gafete_numero,
            }),
        )
    }

    /// Log a resolved badge incident.
    pub fn log_alerta_resuelta(&self, actor: &str, alerta: &BadgeAlert) -> anyhow::Result<()> {
        self.write_entry(
            AuditEvent::AlertaResuelta,
            actor,
            serde_json::json!({
                "alerta_id": alerta.id,
                "cedula": alerta.cedula,
                "gafete": alerta.gafete_numero,
            }),
        )
    }

    /// Write a single JSON line to the audit log.
    fn write_entry(
        &self,
        event: AuditEvent,
        actor: &str,
        details: serde_json::Value,
    ) -> anyhow::Result<()> {
        let entry = AuditEntry {
            timestamp: Utc::now().to_rfc3339(),
            actor: actor.to_owned(),
            event,
            details,
        };
        let line = serde_json::to_string(&entry)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("audit lock poisoned: {e}"))?;
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}
