//! Occupancy ledger: entry and exit spans for everyone on site.
//!
//! The ledger owns the multi-step flows that touch records and badges
//! together. The backend only gives atomicity per operation, so the entry
//! flow compensates explicitly: a record whose badge assignment fails is
//! annulled by closing it, never by deleting it. The exit flow closes the
//! record first and treats badge bookkeeping as a consequence; once the
//! person is out, a badge hiccup must not resurrect the span.

use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use tracing::{error, info, warn};

use crate::alerts::AlertManager;
use crate::backend::{Backend, CierreRegistro, NuevoRegistro};
use crate::badges::BadgeRegistry;
use crate::error::GaritaError;
use crate::types::{BadgeAlert, EntryRecord, EntryState, PersonaRef};

/// How the loaned badge was settled at exit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevolucionGafete {
    /// The badge came back and is on the rack again.
    Devuelto,
    /// The badge did not come back. A lost report was filed and an
    /// incident alert opened against the person.
    Perdido {
        /// The incident charged to the person's cedula.
        alerta: BadgeAlert,
    },
    /// The record closed but the badge bookkeeping failed. The exit
    /// stands; the badge needs manual attention.
    Fallo {
        /// What went wrong on the badge side.
        detalle: String,
    },
}

/// Outcome of a registered exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salida {
    /// The closed entry record.
    pub registro: EntryRecord,
    /// What happened to the badge.
    pub devolucion: DevolucionGafete,
}

/// Ledger over entry records.
#[derive(Clone)]
pub struct OccupancyLedger {
    backend: Arc<dyn Backend>,
    gafetes: BadgeRegistry,
    alertas: AlertManager,
}

impl OccupancyLedger {
    /// Build a ledger over the given storage authority and its sibling
    /// registries.
    pub fn new(backend: Arc<dyn Backend>, gafetes: BadgeRegistry, alertas: AlertManager) -> Self {
        Self {
            backend,
            gafetes,
            alertas,
        }
    }

    /// Open an entry record and bind the badge to it.
    ///
    /// If the badge assignment fails after the record was opened, the
    /// record is annulled (closed with a note) and the assignment failure
    /// is surfaced. Eligibility is the caller's concern; this method only
    /// enforces the one-open-record invariant the backend guards.
    ///
    /// # Errors
    ///
    /// Fails `IngresoActivo` if the person already has an open record,
    /// whatever made the badge assignment fail, or `CompensationFailed`
    /// when the annulment itself failed and the record is stranded open.
    pub async fn crear(
        &self,
        persona: &PersonaRef,
        gafete_numero: &str,
        entrada_por: &str,
        observaciones: Option<String>,
    ) -> Result<EntryRecord, GaritaError> {
        let gafete_numero = gafete_numero.trim();
        no_vacio("cedula", &persona.cedula)?;
        no_vacio("gafete", gafete_numero)?;
        no_vacio("actor", entrada_por)?;

        let registro = self
            .backend
            .insert_entry(NuevoRegistro {
                cedula: persona.cedula.trim().to_owned(),
                tipo_persona: persona.tipo,
                gafete_numero: gafete_numero.to_owned(),
                fecha_entrada: Utc::now(),
                entrada_por: entrada_por.trim().to_owned(),
                observaciones,
            })
            .await?;

        if let Err(causa) = self
            .gafetes
            .asignar(gafete_numero, persona.tipo, &registro.id)
            .await
        {
            return Err(self.anular(registro, causa).await);
        }

        info!(
            registro = %registro.id,
            cedula = %registro.cedula,
            gafete = %registro.gafete_numero,
            "ingreso registrado"
        );
        Ok(registro)
    }

    /// Annul a record whose badge assignment failed, by closing it with a
    /// note. Returns the error the caller should surface.
    async fn anular(&self, registro: EntryRecord, causa: GaritaError) -> GaritaError {
        let cierre = CierreRegistro {
            fecha_salida: Utc::now(),
            salida_por: registro.entrada_por.clone(),
            observaciones: Some(format!(
                "anulado: el gafete {} no pudo asignarse ({causa})",
                registro.gafete_numero
            )),
        };
        match self.backend.close_entry(&registro.id, cierre).await {
            Ok(_) => {
                warn!(
                    registro = %registro.id,
                    causa = %causa,
                    "asignación de gafete falló; registro anulado"
                );
                causa
            }
            Err(e) => {
                error!(
                    registro = %registro.id,
                    causa = %causa,
                    fallo_anulacion = %e,
                    "registro quedó abierto sin gafete asignado"
                );
                GaritaError::CompensationFailed {
                    registro_id: registro.id,
                    causa: causa.to_string(),
                }
            }
        }
    }

    /// Close an entry record, verifying the presented badge.
    ///
    /// `gafete_presentado` is the number physically handed over at the
    /// gate; `None` means the person did not return a badge. On a present
    /// match the badge goes back to the rack. On `None` a lost report and
    /// an incident alert are filed. Either way the record closes first,
    /// and badge-side failures are reported in the outcome rather than
    /// reopening the span.
    ///
    /// # Errors
    ///
    /// Fails `EntryNotFound` for an unknown id, `EntryAlreadyClosed` if the
    /// record has an exit, and `BadgeMismatch` (mutating nothing) when the
    /// presented number is not the loaned one.
    pub async fn registrar_salida(
        &self,
        registro_id: &str,
        salida_por: &str,
        gafete_presentado: Option<&str>,
        observaciones: Option<String>,
    ) -> Result<Salida, GaritaError> {
        no_vacio("actor", salida_por)?;
        let registro = self.backend.get_entry(registro_id).await?;
        if registro.estado == EntryState::Salio {
            return Err(GaritaError::EntryAlreadyClosed {
                registro_id: registro.id,
            });
        }
        if let Some(presentado) = gafete_presentado {
            let presentado = presentado.trim();
            no_vacio("gafete presentado", presentado)?;
            if presentado != registro.gafete_numero {
                return Err(GaritaError::BadgeMismatch {
                    esperado: registro.gafete_numero,
                    recibido: presentado.to_owned(),
                });
            }
        }

        let cerrado = self
            .backend
            .close_entry(
                &registro.id,
                CierreRegistro {
                    fecha_salida: Utc::now(),
                    salida_por: salida_por.trim().to_owned(),
                    observaciones,
                },
            )
            .await?;
        info!(
            registro = %cerrado.id,
            cedula = %cerrado.cedula,
            gafete_devuelto = gafete_presentado.is_some(),
            "salida registrada"
        );

        let devolucion = match gafete_presentado {
            Some(_) => self.devolver_gafete(&cerrado).await,
            None => self.declarar_no_devuelto(&cerrado, salida_por).await,
        };
        Ok(Salida {
            registro: cerrado,
            devolucion,
        })
    }

    async fn devolver_gafete(&self, registro: &EntryRecord) -> DevolucionGafete {
        match self
            .gafetes
            .devolver(&registro.gafete_numero, registro.tipo_persona)
            .await
        {
            Ok(_) => DevolucionGafete::Devuelto,
            Err(e) => {
                warn!(
                    registro = %registro.id,
                    gafete = %registro.gafete_numero,
                    error = %e,
                    "salida cerrada pero el gafete no pudo devolverse"
                );
                DevolucionGafete::Fallo {
                    detalle: e.to_string(),
                }
            }
        }
    }

    /// File the incident first: a pending alert is what blocks the next
    /// entry attempt, so it must exist even if the lost report fails.
    async fn declarar_no_devuelto(
        &self,
        registro: &EntryRecord,
        salida_por: &str,
    ) -> DevolucionGafete {
        let alerta = match self
            .alertas
            .create(
                &registro.cedula,
                &registro.gafete_numero,
                Some("gafete no devuelto al registrar la salida"),
            )
            .await
        {
            Ok(alerta) => alerta,
            Err(e) => {
                error!(
                    registro = %registro.id,
                    gafete = %registro.gafete_numero,
                    error = %e,
                    "salida cerrada pero la alerta de gafete no pudo crearse"
                );
                return DevolucionGafete::Fallo {
                    detalle: e.to_string(),
                };
            }
        };
        if let Err(e) = self
            .gafetes
            .reportar_perdido(
                &registro.gafete_numero,
                registro.tipo_persona,
                Some(&registro.cedula),
                salida_por,
                Some("no devuelto al registrar la salida"),
            )
            .await
        {
            warn!(
                registro = %registro.id,
                gafete = %registro.gafete_numero,
                error = %e,
                "alerta creada pero el reporte de pérdida falló"
            );
        }
        DevolucionGafete::Perdido { alerta }
    }

    /// Fetch one record.
    pub async fn get(&self, id: &str) -> Result<EntryRecord, GaritaError> {
        self.backend.get_entry(id).await
    }

    /// Every record, open or closed, oldest entry first.
    pub async fn list(&self) -> Result<Vec<EntryRecord>, GaritaError> {
        let mut registros = self.backend.list_entries().await?;
        registros.sort_by_key(|r| r.fecha_entrada);
        Ok(registros)
    }

    /// Everyone currently inside, oldest entry first.
    pub async fn abiertos(&self) -> Result<Vec<EntryRecord>, GaritaError> {
        let mut abiertos: Vec<EntryRecord> = self
            .backend
            .list_entries()
            .await?
            .into_iter()
            .filter(|r| r.estado == EntryState::Adentro)
            .collect();
        abiertos.sort_by_key(|r| r.fecha_entrada);
        Ok(abiertos)
    }

    /// The open record for a person, if they are inside.
    pub async fn abierto_por_persona(
        &self,
        persona: &PersonaRef,
    ) -> Result<Option<EntryRecord>, GaritaError> {
        let cedula = persona.cedula.trim();
        Ok(self
            .backend
            .list_entries()
            .await?
            .into_iter()
            .find(|r| {
                r.estado == EntryState::Adentro
                    && r.cedula == cedula
                    && r.tipo_persona == persona.tipo
            }))
    }

    /// Exits registered today, in the machine's local calendar day.
    pub async fn salidas_del_dia(&self) -> Result<Vec<EntryRecord>, GaritaError> {
        let registros = self.backend.list_entries().await?;
        Ok(salidas_en_dia(registros, Local::now().date_naive()))
    }

    /// Every span a badge number appears in, oldest first.
    pub async fn por_gafete(&self, numero: &str) -> Result<Vec<EntryRecord>, GaritaError> {
        let numero = numero.trim();
        let mut registros: Vec<EntryRecord> = self
            .backend
            .list_entries()
            .await?
            .into_iter()
            .filter(|r| r.gafete_numero == numero)
            .collect();
        registros.sort_by_key(|r| r.fecha_entrada);
        Ok(registros)
    }
}

/// Closed spans whose exit falls on `dia` in local time, oldest exit first.
fn salidas_en_dia(registros: Vec<EntryRecord>, dia: NaiveDate) -> Vec<EntryRecord> {
    let mut salidas: Vec<EntryRecord> = registros
        .into_iter()
        .filter(|r| {
            r.fecha_salida
                .map_or(false, |f| f.with_timezone(&Local).date_naive() == dia)
        })
        .collect();
    salidas.sort_by_key(|r| r.fecha_salida);
    salidas
}

fn no_vacio(campo: &str, valor: &str) -> Result<(), GaritaError> {
    if valor.trim().is_empty() {
        return Err(GaritaError::validation(format!("{campo} vacío")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use crate::backend::{ActualizacionBloqueo, NuevaAlerta, NuevoBloqueo, ResolucionAlerta};
    use crate::types::{
        BadgeStatus, BadgeToken, BlacklistEntry, CambioBloqueo, CambioGafete, TipoPersona,
    };
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct Mesa {
        ledger: OccupancyLedger,
        gafetes: BadgeRegistry,
        alertas: AlertManager,
    }

    fn mesa() -> Mesa {
        let backend = Arc::new(MemoryBackend::new());
        let gafetes = BadgeRegistry::new(backend.clone());
        let alertas = AlertManager::new(backend.clone());
        let ledger = OccupancyLedger::new(backend, gafetes.clone(), alertas.clone());
        Mesa {
            ledger,
            gafetes,
            alertas,
        }
    }

    fn visita(cedula: &str) -> PersonaRef {
        PersonaRef {
            cedula: cedula.to_owned(),
            tipo: TipoPersona::Visita,
        }
    }

    async fn con_gafete(mesa: &Mesa, numero: &str) {
        mesa.gafetes
            .create(numero, TipoPersona::Visita)
            .await
            .expect("alta de gafete");
    }

    /// Backend that opens the entry record and then answers everything
    /// else with a transport failure, so the badge assignment and the
    /// annulment both fail.
    struct BackendCaidoTrasAbrir;

    #[async_trait]
    impl Backend for BackendCaidoTrasAbrir {
        async fn insert_badge(&self, _: BadgeToken) -> Result<BadgeToken, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn get_badge(&self, _: &str, _: TipoPersona) -> Result<BadgeToken, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn list_badges(&self) -> Result<Vec<BadgeToken>, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn transition_badge(
            &self,
            _: &str,
            _: TipoPersona,
            _: CambioGafete,
        ) -> Result<BadgeToken, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn delete_badge(&self, _: &str, _: TipoPersona) -> Result<(), GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn insert_entry(&self, nuevo: NuevoRegistro) -> Result<EntryRecord, GaritaError> {
            Ok(EntryRecord {
                id: "r-atascado".to_owned(),
                cedula: nuevo.cedula,
                tipo_persona: nuevo.tipo_persona,
                gafete_numero: nuevo.gafete_numero,
                fecha_entrada: nuevo.fecha_entrada,
                fecha_salida: None,
                estado: EntryState::Adentro,
                entrada_por: nuevo.entrada_por,
                salida_por: None,
                observaciones: nuevo.observaciones,
            })
        }
        async fn get_entry(&self, _: &str) -> Result<EntryRecord, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn list_entries(&self) -> Result<Vec<EntryRecord>, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn close_entry(
            &self,
            _: &str,
            _: CierreRegistro,
        ) -> Result<EntryRecord, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn insert_block(&self, _: NuevoBloqueo) -> Result<BlacklistEntry, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn get_block(&self, _: &str) -> Result<BlacklistEntry, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn list_blocks(&self) -> Result<Vec<BlacklistEntry>, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn append_block_change(
            &self,
            _: &str,
            _: CambioBloqueo,
            _: Option<String>,
        ) -> Result<BlacklistEntry, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn update_block(
            &self,
            _: &str,
            _: ActualizacionBloqueo,
        ) -> Result<BlacklistEntry, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn insert_alert(&self, _: NuevaAlerta) -> Result<BadgeAlert, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn get_alert(&self, _: &str) -> Result<BadgeAlert, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn list_alerts(&self) -> Result<Vec<BadgeAlert>, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
        async fn resolve_alert(
            &self,
            _: &str,
            _: ResolucionAlerta,
        ) -> Result<BadgeAlert, GaritaError> {
            Err(GaritaError::transport("backend fuera de línea"))
        }
    }

    #[tokio::test]
    async fn test_ingreso_asigna_gafete() {
        let mesa = mesa();
        con_gafete(&mesa, "V-001").await;

        let registro = mesa
            .ledger
            .crear(&visita("8-1"), "V-001", "op1", None)
            .await
            .expect("ingreso");
        assert_eq!(registro.estado, EntryState::Adentro);
        assert_eq!(registro.gafete_numero, "V-001");

        let gafete = mesa
            .gafetes
            .get("V-001", TipoPersona::Visita)
            .await
            .expect("consulta");
        assert_eq!(gafete.status, BadgeStatus::EnUso);
        assert_eq!(gafete.asignado_a.as_deref(), Some(registro.id.as_str()));
    }

    #[tokio::test]
    async fn test_ingreso_duplicado_rechazado() {
        let mesa = mesa();
        con_gafete(&mesa, "V-001").await;
        con_gafete(&mesa, "V-002").await;

        mesa.ledger
            .crear(&visita("8-1"), "V-001", "op1", None)
            .await
            .expect("primer ingreso");
        let err = mesa
            .ledger
            .crear(&visita("8-1"), "V-002", "op1", None)
            .await
            .expect_err("segundo ingreso debe fallar");
        assert!(matches!(err, GaritaError::IngresoActivo { .. }));
    }

    #[tokio::test]
    async fn test_ingreso_anulado_si_gafete_no_asigna() {
        let mesa = mesa();
        // V-001 no existe: insert_entry tendrá éxito y asignar fallará.
        let err = mesa
            .ledger
            .crear(&visita("8-1"), "V-001", "op1", None)
            .await
            .expect_err("ingreso sin gafete debe fallar");
        assert!(matches!(err, GaritaError::BadgeNotFound { .. }));

        assert!(mesa.ledger.abiertos().await.expect("abiertos").is_empty());
        let historial = mesa.ledger.list().await.expect("historial");
        assert_eq!(historial.len(), 1);
        assert_eq!(historial[0].estado, EntryState::Salio);
        assert!(historial[0]
            .observaciones
            .as_deref()
            .expect("nota de anulación")
            .contains("anulado"));
    }

    #[tokio::test]
    async fn test_anulacion_fallida_expone_el_registro_atascado() {
        let backend = Arc::new(BackendCaidoTrasAbrir);
        let gafetes = BadgeRegistry::new(backend.clone());
        let alertas = AlertManager::new(backend.clone());
        let ledger = OccupancyLedger::new(backend, gafetes, alertas);

        let err = ledger
            .crear(&visita("8-1"), "V-001", "op1", None)
            .await
            .expect_err("asignación y anulación deben fallar");
        match err {
            GaritaError::CompensationFailed { registro_id, causa } => {
                assert_eq!(registro_id, "r-atascado");
                assert!(causa.contains("fuera de línea"));
            }
            otra => panic!("se esperaba CompensationFailed, llegó {otra:?}"),
        }
    }

    #[tokio::test]
    async fn test_salida_con_gafete_devuelve() {
        let mesa = mesa();
        con_gafete(&mesa, "V-001").await;
        let registro = mesa
            .ledger
            .crear(&visita("8-1"), "V-001", "op1", None)
            .await
            .expect("ingreso");

        let salida = mesa
            .ledger
            .registrar_salida(&registro.id, "op2", Some("V-001"), None)
            .await
            .expect("salida");
        assert_eq!(salida.devolucion, DevolucionGafete::Devuelto);
        assert_eq!(salida.registro.estado, EntryState::Salio);
        assert_eq!(salida.registro.salida_por.as_deref(), Some("op2"));
        assert!(salida.registro.fecha_salida.is_some());

        let gafete = mesa
            .gafetes
            .get("V-001", TipoPersona::Visita)
            .await
            .expect("consulta");
        assert_eq!(gafete.status, BadgeStatus::Disponible);
    }

    #[tokio::test]
    async fn test_salida_gafete_equivocado_no_muta() {
        let mesa = mesa();
        con_gafete(&mesa, "V-001").await;
        let registro = mesa
            .ledger
            .crear(&visita("8-1"), "V-001", "op1", None)
            .await
            .expect("ingreso");

        let err = mesa
            .ledger
            .registrar_salida(&registro.id, "op2", Some("V-002"), None)
            .await
            .expect_err("gafete equivocado debe fallar");
        assert!(matches!(
            err,
            GaritaError::BadgeMismatch { ref esperado, ref recibido }
                if esperado == "V-001" && recibido == "V-002"
        ));

        let registro = mesa.ledger.get(&registro.id).await.expect("consulta");
        assert_eq!(registro.estado, EntryState::Adentro);
        let gafete = mesa
            .gafetes
            .get("V-001", TipoPersona::Visita)
            .await
            .expect("consulta de gafete");
        assert_eq!(gafete.status, BadgeStatus::EnUso);
    }

    #[tokio::test]
    async fn test_salida_sin_gafete_abre_alerta() {
        let mesa = mesa();
        con_gafete(&mesa, "V-001").await;
        let registro = mesa
            .ledger
            .crear(&visita("8-1"), "V-001", "op1", None)
            .await
            .expect("ingreso");

        let salida = mesa
            .ledger
            .registrar_salida(&registro.id, "op2", None, None)
            .await
            .expect("salida");
        assert_eq!(salida.registro.estado, EntryState::Salio);
        let alerta = match salida.devolucion {
            DevolucionGafete::Perdido { alerta } => alerta,
            otra => panic!("se esperaba Perdido, llegó {otra:?}"),
        };
        assert_eq!(alerta.cedula, "8-1");
        assert_eq!(alerta.gafete_numero, "V-001");
        assert!(!alerta.resuelto);

        let gafete = mesa
            .gafetes
            .get("V-001", TipoPersona::Visita)
            .await
            .expect("consulta");
        assert_eq!(gafete.status, BadgeStatus::Perdido);
        assert_eq!(gafete.quien_perdio.as_deref(), Some("8-1"));

        let pendientes = mesa
            .alertas
            .pendientes_por_cedula("8-1")
            .await
            .expect("pendientes");
        assert_eq!(pendientes.len(), 1);
    }

    #[tokio::test]
    async fn test_salida_dos_veces_rechazada() {
        let mesa = mesa();
        con_gafete(&mesa, "V-001").await;
        let registro = mesa
            .ledger
            .crear(&visita("8-1"), "V-001", "op1", None)
            .await
            .expect("ingreso");
        mesa.ledger
            .registrar_salida(&registro.id, "op2", Some("V-001"), None)
            .await
            .expect("primera salida");

        let err = mesa
            .ledger
            .registrar_salida(&registro.id, "op2", Some("V-001"), None)
            .await
            .expect_err("segunda salida debe fallar");
        assert!(matches!(err, GaritaError::EntryAlreadyClosed { .. }));
    }

    #[tokio::test]
    async fn test_abierto_por_persona_y_por_gafete() {
        let mesa = mesa();
        con_gafete(&mesa, "V-001").await;
        let registro = mesa
            .ledger
            .crear(&visita("8-1"), "V-001", "op1", None)
            .await
            .expect("ingreso");

        let abierto = mesa
            .ledger
            .abierto_por_persona(&visita("8-1"))
            .await
            .expect("consulta")
            .expect("debe estar adentro");
        assert_eq!(abierto.id, registro.id);
        assert!(mesa
            .ledger
            .abierto_por_persona(&visita("9-9"))
            .await
            .expect("consulta")
            .is_none());

        mesa.ledger
            .registrar_salida(&registro.id, "op2", Some("V-001"), None)
            .await
            .expect("salida");
        let historial = mesa.ledger.por_gafete("V-001").await.expect("por gafete");
        assert_eq!(historial.len(), 1);
        assert!(mesa
            .ledger
            .abierto_por_persona(&visita("8-1"))
            .await
            .expect("consulta")
            .is_none());
    }

    #[tokio::test]
    async fn test_abierto_por_persona_recorta_la_cedula() {
        let mesa = mesa();
        con_gafete(&mesa, "V-001").await;
        let registro = mesa
            .ledger
            .crear(&visita("8-1"), "V-001", "op1", None)
            .await
            .expect("ingreso");

        let abierto = mesa
            .ledger
            .abierto_por_persona(&visita(" 8-1  "))
            .await
            .expect("consulta")
            .expect("la cédula con relleno debe hallar el registro");
        assert_eq!(abierto.id, registro.id);
    }

    #[test]
    fn test_salidas_en_dia_filtra_por_fecha_local() {
        let dia = NaiveDate::from_ymd_opt(2026, 3, 14).expect("fecha");
        let en_el_dia = Local
            .with_ymd_and_hms(2026, 3, 14, 10, 30, 0)
            .single()
            .expect("hora local")
            .with_timezone(&Utc);
        let otro_dia = Local
            .with_ymd_and_hms(2026, 3, 13, 23, 50, 0)
            .single()
            .expect("hora local")
            .with_timezone(&Utc);

        let plantilla = EntryRecord {
            id: "r-1".to_owned(),
            cedula: "8-1".to_owned(),
            tipo_persona: TipoPersona::Visita,
            gafete_numero: "V-001".to_owned(),
            fecha_entrada: otro_dia,
            fecha_salida: Some(en_el_dia),
            estado: EntryState::Salio,
            entrada_por: "op1".to_owned(),
            salida_por: Some("op2".to_owned()),
            observaciones: None,
        };
        let cerrado_ayer = EntryRecord {
            id: "r-2".to_owned(),
            fecha_salida: Some(otro_dia),
            ..plantilla.clone()
        };
        let abierto = EntryRecord {
            id: "r-3".to_owned(),
            fecha_salida: None,
            estado: EntryState::Adentro,
            salida_por: None,
            ..plantilla.clone()
        };

        let salidas = salidas_en_dia(vec![cerrado_ayer, abierto, plantilla], dia);
        assert_eq!(salidas.len(), 1);
        assert_eq!(salidas[0].id, "r-1");
    }
}
