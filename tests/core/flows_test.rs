//! End-to-end gate scenarios over the in-memory backend.

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};

use garita::audit::AuditLog;
use garita::backend::memory::MemoryBackend;
use garita::backend::Backend;
use garita::error::GaritaError;
use garita::occupancy::DevolucionGafete;
use garita::types::{
    BadgeStatus, EntryRecord, EntryState, EstadoPersona, MotivoBloqueo, Persona, TipoPersona,
};
use garita::workflow::{Garita, ResultadoIngreso};

fn garita() -> Garita {
    let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
    let audit = AuditLog::from_writer(Box::new(std::io::sink()));
    Garita::new(backend, audit)
}

fn visita(cedula: &str) -> Persona {
    Persona {
        cedula: cedula.to_owned(),
        nombre: "Ana".to_owned(),
        apellido: "Solís".to_owned(),
        tipo: TipoPersona::Visita,
        estado: EstadoPersona::Activo,
        fecha_vencimiento_praind: None,
        autorizacion_excepcional: None,
    }
}

fn contratista(cedula: &str, praind: Option<NaiveDate>) -> Persona {
    Persona {
        cedula: cedula.to_owned(),
        nombre: "Bruno".to_owned(),
        apellido: "Mora".to_owned(),
        tipo: TipoPersona::Contratista,
        estado: EstadoPersona::Activo,
        fecha_vencimiento_praind: praind,
        autorizacion_excepcional: None,
    }
}

async fn admitir(garita: &Garita, persona: &Persona, gafete: &str) -> EntryRecord {
    let resultado = garita
        .registrar_ingreso(persona, gafete, "garita1", None)
        .await
        .expect("el ingreso procede");
    match resultado {
        ResultadoIngreso::Admitido { registro, .. } => registro,
        ResultadoIngreso::Denegado { resultado } => {
            panic!("la persona debía entrar: {:?}", resultado.bloqueos)
        }
    }
}

#[tokio::test]
async fn visita_entra_y_sale_con_gafete_devuelto() {
    let garita = garita();
    garita
        .crear_gafete("V-001", TipoPersona::Visita, "rrhh")
        .await
        .expect("se crea el gafete");

    let persona = visita("8-111-222");
    let registro = admitir(&garita, &persona, "V-001").await;
    assert_eq!(registro.estado, EntryState::Adentro);

    let gafete = garita
        .gafetes()
        .get("V-001", TipoPersona::Visita)
        .await
        .expect("el gafete existe");
    assert_eq!(gafete.status, BadgeStatus::EnUso);
    assert_eq!(gafete.asignado_a.as_deref(), Some(registro.id.as_str()));

    let abiertos = garita
        .registros()
        .abiertos()
        .await
        .expect("se listan los abiertos");
    assert_eq!(abiertos.len(), 1);

    let salida = garita
        .registrar_salida(&registro.id, "garita2", Some("V-001"), None)
        .await
        .expect("la salida procede");
    assert_eq!(salida.registro.estado, EntryState::Salio);
    assert_eq!(salida.devolucion, DevolucionGafete::Devuelto);

    let gafete = garita
        .gafetes()
        .get("V-001", TipoPersona::Visita)
        .await
        .expect("el gafete existe");
    assert_eq!(gafete.status, BadgeStatus::Disponible);
    assert_eq!(gafete.asignado_a, None);

    let hoy = garita
        .registros()
        .salidas_del_dia()
        .await
        .expect("se listan las salidas del día");
    assert_eq!(hoy.len(), 1);
}

#[tokio::test]
async fn bloqueado_por_deuda_no_entra_y_nada_se_muta() {
    let garita = garita();
    garita
        .crear_gafete("V-001", TipoPersona::Visita, "rrhh")
        .await
        .expect("se crea el gafete");

    garita
        .bloquear(garita::blacklist::AltaBloqueo {
            cedula: "8-111-222".to_owned(),
            nombre: "Ana".to_owned(),
            apellido: "Solís".to_owned(),
            motivo: "deuda pendiente".to_owned(),
            actor: "cobros".to_owned(),
            es_bloqueo_permanente: false,
            observaciones: None,
        })
        .await
        .expect("se agrega el bloqueo");

    let resultado = garita
        .registrar_ingreso(&visita("8-111-222"), "V-001", "garita1", None)
        .await
        .expect("la denegación no es un error");
    let resultado = match resultado {
        ResultadoIngreso::Denegado { resultado } => resultado,
        ResultadoIngreso::Admitido { .. } => panic!("una persona bloqueada no puede entrar"),
    };
    assert!(matches!(
        resultado.bloqueos.first(),
        Some(MotivoBloqueo::ListaNegra { motivo }) if motivo == "deuda pendiente"
    ));

    let abiertos = garita
        .registros()
        .abiertos()
        .await
        .expect("se listan los abiertos");
    assert!(abiertos.is_empty());
    let gafete = garita
        .gafetes()
        .get("V-001", TipoPersona::Visita)
        .await
        .expect("el gafete existe");
    assert_eq!(gafete.status, BadgeStatus::Disponible);
}

#[tokio::test]
async fn contratista_con_praind_vencido_no_entra() {
    let garita = garita();
    garita
        .crear_gafete("C-001", TipoPersona::Contratista, "rrhh")
        .await
        .expect("se crea el gafete");

    let vencido = Local::now().date_naive() - Duration::days(1);
    let resultado = garita
        .registrar_ingreso(&contratista("8-333", Some(vencido)), "C-001", "garita1", None)
        .await
        .expect("la denegación no es un error");

    let resultado = match resultado {
        ResultadoIngreso::Denegado { resultado } => resultado,
        ResultadoIngreso::Admitido { .. } => panic!("el PRAIND vencido debía bloquear"),
    };
    assert!(matches!(
        resultado.bloqueos.first(),
        Some(MotivoBloqueo::AutorizacionInvalida { .. })
    ));
}

#[tokio::test]
async fn no_hay_doble_ingreso_para_la_misma_persona() {
    let garita = garita();
    garita
        .crear_gafete("V-001", TipoPersona::Visita, "rrhh")
        .await
        .expect("se crea el gafete");
    garita
        .crear_gafete("V-002", TipoPersona::Visita, "rrhh")
        .await
        .expect("se crea el gafete");

    let persona = visita("8-111-222");
    let registro = admitir(&garita, &persona, "V-001").await;

    let reintento = garita
        .registrar_ingreso(&persona, "V-002", "garita1", None)
        .await
        .expect("la denegación no es un error");
    let resultado = match reintento {
        ResultadoIngreso::Denegado { resultado } => resultado,
        ResultadoIngreso::Admitido { .. } => panic!("nadie entra dos veces sin salir"),
    };
    assert!(matches!(
        resultado.bloqueos.first(),
        Some(MotivoBloqueo::IngresoActivo { registro_id }) if *registro_id == registro.id
    ));
}

#[tokio::test]
async fn gafete_ajeno_en_uso_no_se_presta() {
    let garita = garita();
    garita
        .crear_gafete("V-001", TipoPersona::Visita, "rrhh")
        .await
        .expect("se crea el gafete");
    admitir(&garita, &visita("8-111-222"), "V-001").await;

    let err = garita
        .registrar_ingreso(&visita("8-999-000"), "V-001", "garita1", None)
        .await
        .expect_err("un gafete prestado no se vuelve a prestar");
    assert!(matches!(err, GaritaError::BadgeUnavailable { .. }));
}

#[tokio::test]
async fn salida_con_gafete_equivocado_no_cierra_el_registro() {
    let garita = garita();
    garita
        .crear_gafete("V-001", TipoPersona::Visita, "rrhh")
        .await
        .expect("se crea el gafete");
    garita
        .crear_gafete("V-002", TipoPersona::Visita, "rrhh")
        .await
        .expect("se crea el gafete");

    let registro = admitir(&garita, &visita("8-111-222"), "V-001").await;

    let err = garita
        .registrar_salida(&registro.id, "garita2", Some("V-002"), None)
        .await
        .expect_err("el gafete equivocado no cierra nada");
    assert!(matches!(err, GaritaError::BadgeMismatch { .. }));

    let registro = garita
        .registros()
        .get(&registro.id)
        .await
        .expect("el registro existe");
    assert_eq!(registro.estado, EntryState::Adentro);
    let gafete = garita
        .gafetes()
        .get("V-001", TipoPersona::Visita)
        .await
        .expect("el gafete existe");
    assert_eq!(gafete.status, BadgeStatus::EnUso);
}

#[tokio::test]
async fn gafete_no_devuelto_bloquea_el_reingreso_hasta_resolver() {
    let garita = garita();
    garita
        .crear_gafete("V-001", TipoPersona::Visita, "rrhh")
        .await
        .expect("se crea el gafete");

    let persona = visita("8-111-222");
    let registro = admitir(&garita, &persona, "V-001").await;

    let salida = garita
        .registrar_salida(&registro.id, "garita2", None, None)
        .await
        .expect("la salida procede aunque falte el gafete");
    assert_eq!(salida.registro.estado, EntryState::Salio);
    let alerta = match salida.devolucion {
        DevolucionGafete::Perdido { alerta } => alerta,
        otra => panic!("el gafete no presentado debía reportarse perdido: {otra:?}"),
    };
    assert_eq!(alerta.cedula, persona.cedula);

    let gafete = garita
        .gafetes()
        .get("V-001", TipoPersona::Visita)
        .await
        .expect("el gafete existe");
    assert_eq!(gafete.status, BadgeStatus::Perdido);

    garita
        .crear_gafete("V-002", TipoPersona::Visita, "rrhh")
        .await
        .expect("se crea el gafete");
    let reingreso = garita
        .registrar_ingreso(&persona, "V-002", "garita1", None)
        .await
        .expect("la denegación no es un error");
    let resultado = match reingreso {
        ResultadoIngreso::Denegado { resultado } => resultado,
        ResultadoIngreso::Admitido { .. } => panic!("la deuda de gafete debía bloquear"),
    };
    assert!(matches!(
        resultado.bloqueos.first(),
        Some(MotivoBloqueo::GafetesPendientes { cantidad: 1 })
    ));

    garita
        .resolver_alerta(&alerta.id, Some("gafete recuperado en caseta"), "supervisor")
        .await
        .expect("se resuelve la alerta");

    let reintento = garita
        .registrar_ingreso(&persona, "V-002", "garita1", None)
        .await
        .expect("el ingreso procede");
    assert!(matches!(reintento, ResultadoIngreso::Admitido { .. }));
}
