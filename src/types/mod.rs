//! Core domain types: badge tokens, entry records, blacklist entries,
//! badge alerts, and the admission verdict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GaritaError;

/// Person/badge category. Badges are typed by who may carry them, so the
/// same enum keys both persons and badge tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoPersona {
    /// External contractor working on site.
    Contratista,
    /// Supplier making deliveries.
    Proveedor,
    /// One-off visitor.
    Visita,
}

impl TipoPersona {
    /// Stable lowercase name used in wire paths and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoPersona::Contratista => "contratista",
            TipoPersona::Proveedor => "proveedor",
            TipoPersona::Visita => "visita",
        }
    }
}

impl std::fmt::Display for TipoPersona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TipoPersona {
    type Err = GaritaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "contratista" => Ok(TipoPersona::Contratista),
            "proveedor" => Ok(TipoPersona::Proveedor),
            "visita" => Ok(TipoPersona::Visita),
            other => Err(GaritaError::Validation {
                detalle: format!("tipo de persona desconocido: {other:?}"),
            }),
        }
    }
}

/// Badge token status. Status only ever changes through the named
/// transitions in [`CambioGafete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeStatus {
    /// On the rack, loanable.
    Disponible,
    /// Loaned out, bound to an entry record.
    EnUso,
    /// Reported lost; an incident is usually open for it.
    Perdido,
    /// Physically damaged, out of circulation until repaired.
    Danado,
    /// Written off as stray after a lost report.
    Extraviado,
}

impl BadgeStatus {
    /// Stable lowercase name used in wire paths and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeStatus::Disponible => "disponible",
            BadgeStatus::EnUso => "en_uso",
            BadgeStatus::Perdido => "perdido",
            BadgeStatus::Danado => "danado",
            BadgeStatus::Extraviado => "extraviado",
        }
    }
}

impl std::fmt::Display for BadgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BadgeStatus {
    type Err = GaritaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disponible" => Ok(BadgeStatus::Disponible),
            "en_uso" => Ok(BadgeStatus::EnUso),
            "perdido" => Ok(BadgeStatus::Perdido),
            "danado" => Ok(BadgeStatus::Danado),
            "extraviado" => Ok(BadgeStatus::Extraviado),
            other => Err(GaritaError::Validation {
                detalle: format!("estado de gafete desconocido: {other:?}"),
            }),
        }
    }
}

/// Entry record state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryState {
    /// The person is currently inside the facility.
    Adentro,
    /// The stay is closed.
    Salio,
}

/// Administrative status of a person, as recorded by the external
/// person directory and passed in with the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstadoPersona {
    /// Cleared to work/visit.
    Activo,
    /// Deactivated (contract ended, registration lapsed).
    Inactivo,
    /// Suspended pending review.
    Suspendido,
}

impl EstadoPersona {
    /// Stable lowercase name used in log fields and bloqueo payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoPersona::Activo => "activo",
            EstadoPersona::Inactivo => "inactivo",
            EstadoPersona::Suspendido => "suspendido",
        }
    }
}

impl std::fmt::Display for EstadoPersona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EstadoPersona {
    type Err = GaritaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "activo" => Ok(EstadoPersona::Activo),
            "inactivo" => Ok(EstadoPersona::Inactivo),
            "suspendido" => Ok(EstadoPersona::Suspendido),
            other => Err(GaritaError::Validation {
                detalle: format!("estado de persona desconocido: {other:?}"),
            }),
        }
    }
}

/// Weak reference to a person: cedula plus category. Entry records and
/// validation key on this pair, never on an embedded person copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonaRef {
    /// National identity number; the person identifier at the boundary.
    pub cedula: String,
    /// Person category.
    pub tipo: TipoPersona,
}

/// Exceptional authorization attached to a person snapshot. All three
/// fields must be present and non-empty for the authorization to count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutorizacionExcepcional {
    /// Why the exception was granted.
    pub motivo: String,
    /// Who granted it.
    pub autorizado_por: String,
    /// Last day the exception is valid.
    pub vence: chrono::NaiveDate,
}

/// Snapshot of a person as supplied by the caller. The core never loads
/// person records itself; the person directory is an external system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// National identity number.
    pub cedula: String,
    /// Given name.
    pub nombre: String,
    /// Family name.
    pub apellido: String,
    /// Person category.
    pub tipo: TipoPersona,
    /// Administrative status in the person directory.
    pub estado: EstadoPersona,
    /// Expiry date of the PRAIND safety-induction certificate.
    /// Required for contratistas; validated when present for the rest.
    pub fecha_vencimiento_praind: Option<chrono::NaiveDate>,
    /// Exceptional authorization, when entering outside the normal rules.
    pub autorizacion_excepcional: Option<AutorizacionExcepcional>,
}

impl Persona {
    /// The weak reference used to key entries and validation.
    pub fn referencia(&self) -> PersonaRef {
        PersonaRef {
            cedula: self.cedula.clone(),
            tipo: self.tipo,
        }
    }
}

/// A physical badge token. `(numero, tipo)` is the identity; status moves
/// only through [`CambioGafete`] transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeToken {
    /// Printed badge number, unique within its tipo.
    pub numero: String,
    /// Badge category.
    pub tipo: TipoPersona,
    /// Current lifecycle status.
    pub status: BadgeStatus,
    /// Open entry record this badge is bound to, when en_uso.
    pub asignado_a: Option<String>,
    /// When the badge was reported lost.
    pub fecha_perdido: Option<DateTime<Utc>>,
    /// Cedula of the person who lost it, when known.
    pub quien_perdio: Option<String>,
    /// Operator who filed the lost/damaged report.
    pub reportado_por: Option<String>,
    /// Operator who recovered or repaired it.
    pub resuelto_por: Option<String>,
    /// When it came back into circulation.
    pub fecha_resolucion: Option<DateTime<Utc>>,
    /// Free-form notes (lost/damage motive, recovery details).
    pub notas: Option<String>,
}

impl BadgeToken {
    /// A freshly provisioned badge, on the rack.
    pub fn nuevo(numero: impl Into<String>, tipo: TipoPersona) -> Self {
        Self {
            numero: numero.into(),
            tipo,
            status: BadgeStatus::Disponible,
            asignado_a: None,
            fecha_perdido: None,
            quien_perdio: None,
            reportado_por: None,
            resuelto_por: None,
            fecha_resolucion: None,
            notas: None,
        }
    }
}

/// Named badge transitions, the only way a badge status changes. Raw
/// status overwrites would lose updates under concurrent operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "accion", rename_all = "snake_case")]
pub enum CambioGafete {
    /// disponible → en_uso. `registro_id` binds the badge to an entry
    /// record; `None` for a manual loan outside the entry workflow.
    Asignar {
        /// Entry record the badge is being bound to.
        registro_id: Option<String>,
    },
    /// en_uso → disponible.
    Devolver,
    /// {disponible, en_uso} → perdido.
    ReportarPerdido {
        /// Cedula of the person who lost it, when known.
        quien: Option<String>,
        /// Operator filing the report.
        reportado_por: Option<String>,
        /// Circumstances.
        motivo: Option<String>,
    },
    /// perdido → extraviado (written off as stray).
    MarcarExtraviado {
        /// Operator making the call.
        actor: Option<String>,
    },
    /// extraviado → disponible (the badge turned up).
    Recuperar {
        /// Operator who recovered it.
        actor: String,
    },
    /// any status but danado → danado.
    MarcarDanado {
        /// Operator filing the damage report.
        actor: Option<String>,
        /// What happened to it.
        motivo: Option<String>,
    },
    /// danado → disponible.
    Reparar {
        /// Operator who put it back in circulation.
        actor: String,
    },
}

impl CambioGafete {
    /// Status this transition lands on.
    pub fn destino(&self) -> BadgeStatus {
        match self {
            CambioGafete::Asignar { .. } => BadgeStatus::EnUso,
            CambioGafete::Devolver => BadgeStatus::Disponible,
            CambioGafete::ReportarPerdido { .. } => BadgeStatus::Perdido,
            CambioGafete::MarcarExtraviado { .. } => BadgeStatus::Extraviado,
            CambioGafete::Recuperar { .. } => BadgeStatus::Disponible,
            CambioGafete::MarcarDanado { .. } => BadgeStatus::Danado,
            CambioGafete::Reparar { .. } => BadgeStatus::Disponible,
        }
    }

    /// Whether this transition is legal from `actual`.
    pub fn permitido_desde(&self, actual: BadgeStatus) -> bool {
        match self {
            CambioGafete::Asignar { .. } => actual == BadgeStatus::Disponible,
            CambioGafete::Devolver => actual == BadgeStatus::EnUso,
            CambioGafete::ReportarPerdido { .. } => {
                matches!(actual, BadgeStatus::Disponible | BadgeStatus::EnUso)
            }
            CambioGafete::MarcarExtraviado { .. } => actual == BadgeStatus::Perdido,
            CambioGafete::Recuperar { .. } => actual == BadgeStatus::Extraviado,
            CambioGafete::MarcarDanado { .. } => actual != BadgeStatus::Danado,
            CambioGafete::Reparar { .. } => actual == BadgeStatus::Danado,
        }
    }

    /// Apply the transition to a badge, stamping the bookkeeping fields.
    ///
    /// # Errors
    ///
    /// Fails `InvalidTransition` when the move is not in the table; the
    /// badge is untouched in that case.
    pub fn aplicar(
        &self,
        gafete: &mut BadgeToken,
        ahora: DateTime<Utc>,
    ) -> Result<(), GaritaError> {
        if !self.permitido_desde(gafete.status) {
            return Err(GaritaError::InvalidTransition {
                numero: gafete.numero.clone(),
                desde: gafete.status,
                hacia: self.destino(),
            });
        }
        match self {
            CambioGafete::Asignar { registro_id } => {
                gafete.asignado_a = registro_id.clone();
            }
            CambioGafete::Devolver => {
                gafete.asignado_a = None;
            }
            CambioGafete::ReportarPerdido {
                quien,
                reportado_por,
                motivo,
            } => {
                gafete.asignado_a = None;
                gafete.fecha_perdido = Some(ahora);
                gafete.quien_perdio = quien.clone();
                gafete.reportado_por = reportado_por.clone();
                gafete.notas = motivo.clone();
            }
            CambioGafete::MarcarExtraviado { actor } => {
                gafete.reportado_por = actor.clone().or_else(|| gafete.reportado_por.clone());
            }
            CambioGafete::Recuperar { actor } => {
                gafete.resuelto_por = Some(actor.clone());
                gafete.fecha_resolucion = Some(ahora);
            }
            CambioGafete::MarcarDanado { actor, motivo } => {
                gafete.asignado_a = None;
                gafete.reportado_por = actor.clone();
                gafete.notas = motivo.clone();
            }
            CambioGafete::Reparar { actor } => {
                gafete.resuelto_por = Some(actor.clone());
                gafete.fecha_resolucion = Some(ahora);
            }
        }
        gafete.status = self.destino();
        Ok(())
    }
}

/// One timestamped occupancy span for one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    /// Backend-issued opaque identifier.
    pub id: String,
    /// Cedula of the person inside.
    pub cedula: String,
    /// Person category (also the badge tipo).
    pub tipo_persona: TipoPersona,
    /// Number of the badge loaned for this stay (weak reference).
    pub gafete_numero: String,
    /// When the person entered.
    pub fecha_entrada: DateTime<Utc>,
    /// When the person left, once closed.
    pub fecha_salida: Option<DateTime<Utc>>,
    /// ADENTRO while the person is inside, SALIO afterwards.
    pub estado: EntryState,
    /// Operator who registered the entry.
    pub entrada_por: String,
    /// Operator who registered the exit.
    pub salida_por: Option<String>,
    /// Free-form notes.
    pub observaciones: Option<String>,
}

impl EntryRecord {
    /// Weak reference to the person this span belongs to.
    pub fn persona(&self) -> PersonaRef {
        PersonaRef {
            cedula: self.cedula.clone(),
            tipo: self.tipo_persona,
        }
    }
}

/// Direction of a blacklist status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccionBloqueo {
    /// The person was barred.
    Bloqueado,
    /// The bar was lifted.
    Desbloqueado,
}

/// One audit-trail event on a blacklist entry. The log is append-only;
/// events are never rewritten or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CambioBloqueo {
    /// Block or unblock.
    pub accion: AccionBloqueo,
    /// Why.
    pub motivo: String,
    /// Operator who made the change.
    pub actor: String,
    /// When.
    pub fecha: DateTime<Utc>,
}

/// A barred person. The current block state is a projection over the
/// append-only `historial`, not a stored boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    /// Backend-issued opaque identifier.
    pub id: String,
    /// Cedula of the barred person.
    pub cedula: String,
    /// Given name, kept so the roster is readable without the directory.
    pub nombre: String,
    /// Family name.
    pub apellido: String,
    /// Permanent bars are not expected to be lifted.
    pub es_bloqueo_permanente: bool,
    /// Free-form notes.
    pub observaciones: Option<String>,
    /// Append-only status-change log, oldest first. Never empty: the
    /// first change is the block that created the entry.
    pub historial: Vec<CambioBloqueo>,
}

impl BlacklistEntry {
    /// Whether the person is currently barred (last change is a block).
    pub fn is_active(&self) -> bool {
        matches!(
            self.historial.last().map(|c| c.accion),
            Some(AccionBloqueo::Bloqueado)
        )
    }

    /// Motive of the current (or most recent) block.
    pub fn motivo_actual(&self) -> Option<&str> {
        self.historial
            .iter()
            .rev()
            .find(|c| c.accion == AccionBloqueo::Bloqueado)
            .map(|c| c.motivo.as_str())
    }

    /// Operator who placed the current (or most recent) block.
    pub fn bloqueado_por(&self) -> Option<&str> {
        self.historial
            .iter()
            .rev()
            .find(|c| c.accion == AccionBloqueo::Bloqueado)
            .map(|c| c.actor.as_str())
    }

    /// When the current (or most recent) block was placed.
    pub fn fecha_bloqueo(&self) -> Option<DateTime<Utc>> {
        self.historial
            .iter()
            .rev()
            .find(|c| c.accion == AccionBloqueo::Bloqueado)
            .map(|c| c.fecha)
    }

    /// When the bar was last lifted, if the entry is currently inactive.
    pub fn fecha_desbloqueo(&self) -> Option<DateTime<Utc>> {
        match self.historial.last() {
            Some(c) if c.accion == AccionBloqueo::Desbloqueado => Some(c.fecha),
            _ => None,
        }
    }
}

/// An open incident over a badge: lost, damaged, or not returned at exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeAlert {
    /// Backend-issued opaque identifier.
    pub id: String,
    /// Cedula of the person the incident is charged to.
    pub cedula: String,
    /// Badge number involved.
    pub gafete_numero: String,
    /// When the incident was opened.
    pub creada: DateTime<Utc>,
    /// Terminal state; a resolved alert never reopens.
    pub resuelto: bool,
    /// Operator who resolved it.
    pub resuelto_por: Option<String>,
    /// When it was resolved.
    pub fecha_resolucion: Option<DateTime<Utc>>,
    /// Resolution or context notes.
    pub notas: Option<String>,
}

/// A hard blocking reason. Adding a variant forces every consumer match
/// to be revisited at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum MotivoBloqueo {
    /// The person has an active blacklist entry.
    ListaNegra {
        /// Motive recorded on the active block.
        motivo: String,
    },
    /// The person already has an open entry record.
    IngresoActivo {
        /// The open record.
        registro_id: String,
    },
    /// The person's directory status does not allow entry.
    EstadoInvalido {
        /// The offending status.
        estado: EstadoPersona,
    },
    /// Missing, expired, or incomplete authorization.
    AutorizacionInvalida {
        /// What exactly is wrong.
        motivo: String,
    },
    /// Unresolved badge incidents charged to the person's cedula.
    GafetesPendientes {
        /// How many are pending.
        cantidad: u32,
    },
    /// A sub-check could not complete; admission fails closed.
    SistemaNoDisponible {
        /// Which check was unreachable.
        servicio: String,
    },
}

impl std::fmt::Display for MotivoBloqueo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MotivoBloqueo::ListaNegra { motivo } => write!(f, "lista negra: {motivo}"),
            MotivoBloqueo::IngresoActivo { registro_id } => {
                write!(f, "ingreso activo: registro {registro_id}")
            }
            MotivoBloqueo::EstadoInvalido { estado } => write!(f, "estado inválido: {estado}"),
            MotivoBloqueo::AutorizacionInvalida { motivo } => {
                write!(f, "autorización inválida: {motivo}")
            }
            MotivoBloqueo::GafetesPendientes { cantidad } => {
                write!(f, "gafetes pendientes: {cantidad}")
            }
            MotivoBloqueo::SistemaNoDisponible { servicio } => {
                write!(f, "sistema no disponible: {servicio}")
            }
        }
    }
}

/// The admission verdict. Ephemeral: computed per validation, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    /// True iff `bloqueos` is empty.
    pub puede_ingresar: bool,
    /// Hard blocking reasons, in check order.
    pub bloqueos: Vec<MotivoBloqueo>,
    /// Non-blocking warnings for the operator.
    pub alertas: Vec<String>,
}

impl EligibilityResult {
    /// Build a verdict; `puede_ingresar` is derived, never set by hand.
    pub fn nuevo(bloqueos: Vec<MotivoBloqueo>, alertas: Vec<String>) -> Self {
        Self {
            puede_ingresar: bloqueos.is_empty(),
            bloqueos,
            alertas,
        }
    }
}
