//! Audit trail integration: the JSONL file written by gate operations.

use std::fs;
use std::sync::Arc;

use garita::audit::AuditLog;
use garita::backend::memory::MemoryBackend;
use garita::backend::Backend;
use garita::types::{EstadoPersona, Persona, TipoPersona};
use garita::workflow::{Garita, ResultadoIngreso};

#[tokio::test]
async fn las_operaciones_del_dia_quedan_en_el_archivo() {
    let dir = tempfile::tempdir().expect("se crea el directorio temporal");
    let ruta = dir.path().join("garita-audit.jsonl");

    let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
    let audit = AuditLog::new(&ruta).expect("se abre la bitácora");
    let garita = Garita::new(backend, audit);

    garita
        .crear_gafete("V-001", TipoPersona::Visita, "rrhh")
        .await
        .expect("se crea el gafete");

    let persona = Persona {
        cedula: "8-111-222".to_owned(),
        nombre: "Ana".to_owned(),
        apellido: "Solís".to_owned(),
        tipo: TipoPersona::Visita,
        estado: EstadoPersona::Activo,
        fecha_vencimiento_praind: None,
        autorizacion_excepcional: None,
    };
    let admitido = garita
        .registrar_ingreso(&persona, "V-001", "garita1", None)
        .await
        .expect("el ingreso procede");
    let registro = match admitido {
        ResultadoIngreso::Admitido { registro, .. } => registro,
        ResultadoIngreso::Denegado { resultado } => {
            panic!("la visita debía entrar: {:?}", resultado.bloqueos)
        }
    };
    garita
        .registrar_salida(&registro.id, "garita2", Some("V-001"), None)
        .await
        .expect("la salida procede");

    let contenido = fs::read_to_string(&ruta).expect("la bitácora se lee");
    let lineas: Vec<serde_json::Value> = contenido
        .lines()
        .map(|linea| serde_json::from_str(linea).expect("cada línea es JSON válido"))
        .collect();

    assert_eq!(lineas.len(), 3);
    assert_eq!(lineas[0]["event"], "gafete_creado");
    assert_eq!(lineas[1]["event"], "ingreso_registrado");
    assert_eq!(lineas[2]["event"], "salida_registrada");
    assert_eq!(lineas[1]["actor"], "garita1");
    assert_eq!(lineas[1]["details"]["cedula"], "8-111-222");
    assert_eq!(lineas[2]["actor"], "garita2");
    assert_eq!(lineas[2]["details"]["gafete_devuelto"], true);
}

#[tokio::test]
async fn la_denegacion_queda_con_sus_bloqueos() {
    let dir = tempfile::tempdir().expect("se crea el directorio temporal");
    let ruta = dir.path().join("garita-audit.jsonl");

    let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
    let audit = AuditLog::new(&ruta).expect("se abre la bitácora");
    let garita = Garita::new(backend, audit);

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

    let persona = Persona {
        cedula: "8-111-222".to_owned(),
        nombre: "Ana".to_owned(),
        apellido: "Solís".to_owned(),
        tipo: TipoPersona::Visita,
        estado: EstadoPersona::Activo,
        fecha_vencimiento_praind: None,
        autorizacion_excepcional: None,
    };
    let resultado = garita
        .registrar_ingreso(&persona, "V-001", "garita1", None)
        .await
        .expect("la denegación no es un error");
    assert!(matches!(resultado, ResultadoIngreso::Denegado { .. }));

    let contenido = fs::read_to_string(&ruta).expect("la bitácora se lee");
    let ultima: serde_json::Value = contenido
        .lines()
        .last()
        .map(|linea| serde_json::from_str(linea).expect("la línea es JSON válido"))
        .expect("hay al menos una línea");

    assert_eq!(ultima["event"], "ingreso_denegado");
    assert_eq!(ultima["details"]["cedula"], "8-111-222");
    assert_eq!(ultima["details"]["bloqueos"][0]["tipo"], "lista_negra");
}
