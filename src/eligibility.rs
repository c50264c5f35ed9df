//! Eligibility validator: the admission gate.
//!
//! Checks run in a fixed order so the resulting `bloqueos` list is
//! deterministic for a given state snapshot. The gate fails closed: a
//! sub-check that cannot complete contributes a `sistema_no_disponible`
//! bloqueo instead of being skipped, so an unreachable blacklist can never
//! let someone in.

use chrono::{Local, NaiveDate};
use tracing::warn;

use crate::alerts::AlertManager;
use crate::blacklist::BlacklistRegistry;
use crate::occupancy::OccupancyLedger;
use crate::types::{EligibilityResult, EstadoPersona, MotivoBloqueo, Persona, TipoPersona};

/// Days ahead of an authorization expiry at which a warning is raised.
const DIAS_AVISO: i64 = 30;

/// The admission gate, composed over the three registries it consults.
#[derive(Clone)]
pub struct EligibilityValidator {
    blacklist: BlacklistRegistry,
    occupancy: OccupancyLedger,
    alertas: AlertManager,
}

impl EligibilityValidator {
    /// Build a validator over the registries.
    pub fn new(
        blacklist: BlacklistRegistry,
        occupancy: OccupancyLedger,
        alertas: AlertManager,
    ) -> Self {
        Self {
            blacklist,
            occupancy,
            alertas,
        }
    }

    /// Evaluate whether a person may enter right now.
    ///
    /// Check order is fixed: blacklist, open entry, person status,
    /// authorization, pending badge incidents. The verdict is computed per
    /// call and never stored. This method does not fail; sub-check errors
    /// become fail-closed bloqueos.
    pub async fn validar_ingreso(&self, persona: &Persona) -> EligibilityResult {
        let hoy = Local::now().date_naive();
        let mut bloqueos = Vec::new();
        let mut alertas = Vec::new();

        match self.blacklist.check_bloqueado(&persona.cedula).await {
            Ok(Some(entrada)) => bloqueos.push(MotivoBloqueo::ListaNegra {
                motivo: entrada
                    .motivo_actual()
                    .unwrap_or("sin motivo registrado")
                    .to_owned(),
            }),
            Ok(None) => {}
            Err(e) => {
                warn!(cedula = %persona.cedula, error = %e, "lista negra no disponible");
                bloqueos.push(MotivoBloqueo::SistemaNoDisponible {
                    servicio: "lista_negra".to_owned(),
                });
            }
        }

        match self
            .occupancy
            .abierto_por_persona(&persona.referencia())
            .await
        {
            Ok(Some(registro)) => bloqueos.push(MotivoBloqueo::IngresoActivo {
                registro_id: registro.id,
            }),
            Ok(None) => {}
            Err(e) => {
                warn!(cedula = %persona.cedula, error = %e, "registros de ingreso no disponibles");
                bloqueos.push(MotivoBloqueo::SistemaNoDisponible {
                    servicio: "registros_ingreso".to_owned(),
                });
            }
        }

        if persona.estado != EstadoPersona::Activo {
            bloqueos.push(MotivoBloqueo::EstadoInvalido {
                estado: persona.estado,
            });
        }

        let (mut bloqueos_aut, mut alertas_aut) = validar_autorizacion(persona, hoy);
        bloqueos.append(&mut bloqueos_aut);
        alertas.append(&mut alertas_aut);

        // Unresolved badge incidents are a hard block; they clear only
        // through resolver.
        match self.alertas.pendientes_por_cedula(&persona.cedula).await {
            Ok(pendientes) if !pendientes.is_empty() => {
                bloqueos.push(MotivoBloqueo::GafetesPendientes {
                    cantidad: u32::try_from(pendientes.len()).unwrap_or(u32::MAX),
                });
            }
            Ok(_) => {}
            Err(e) => {
                warn!(cedula = %persona.cedula, error = %e, "alertas de gafetes no disponibles");
                bloqueos.push(MotivoBloqueo::SistemaNoDisponible {
                    servicio: "alertas_gafetes".to_owned(),
                });
            }
        }

        let resultado = EligibilityResult::nuevo(bloqueos, alertas);
        if !resultado.puede_ingresar {
            warn!(
                cedula = %persona.cedula,
                bloqueos = resultado.bloqueos.len(),
                "persona no elegible para ingresar"
            );
        }
        resultado
    }
}

/// Authorization checks against an explicit `hoy`, so the expiry cutoffs
/// are testable without a clock.
///
/// PRAIND certification is mandatory for contratistas and validated when
/// present for everyone else. The expiry date is the last valid day.
fn validar_autorizacion(persona: &Persona, hoy: NaiveDate) -> (Vec<MotivoBloqueo>, Vec<String>) {
    let mut bloqueos = Vec::new();
    let mut alertas = Vec::new();

    match persona.fecha_vencimiento_praind {
        None if persona.tipo == TipoPersona::Contratista => {
            bloqueos.push(MotivoBloqueo::AutorizacionInvalida {
                motivo: "contratista sin fecha de vencimiento PRAIND".to_owned(),
            });
        }
        None => {}
        Some(vence) if vence < hoy => {
            bloqueos.push(MotivoBloqueo::AutorizacionInvalida {
                motivo: format!("PRAIND vencido el {vence}"),
            });
        }
        Some(vence) => {
            let dias = vence.signed_duration_since(hoy).num_days();
            if dias == 0 {
                alertas.push(format!("PRAIND vence hoy ({vence})"));
            } else if dias <= DIAS_AVISO {
                alertas.push(format!("PRAIND vence en {dias} días ({vence})"));
            }
        }
    }

    if let Some(aut) = &persona.autorizacion_excepcional {
        if aut.motivo.trim().is_empty() || aut.autorizado_por.trim().is_empty() {
            bloqueos.push(MotivoBloqueo::AutorizacionInvalida {
                motivo: "autorización excepcional incompleta".to_owned(),
            });
        } else if aut.vence < hoy {
            bloqueos.push(MotivoBloqueo::AutorizacionInvalida {
                motivo: format!("autorización excepcional vencida el {}", aut.vence),
            });
        } else {
            let dias = aut.vence.signed_duration_since(hoy).num_days();
            if dias <= DIAS_AVISO {
                alertas.push(format!(
                    "autorización excepcional vence en {dias} días ({})",
                    aut.vence
                ));
            }
        }
    }

    (bloqueos, alertas)
}
