//! Badge rack management through the workflow facade.

use std::sync::Arc;

use garita::audit::AuditLog;
use garita::backend::memory::MemoryBackend;
use garita::backend::Backend;
use garita::badges::RangoGafetes;
use garita::error::GaritaError;
use garita::types::{BadgeStatus, EstadoPersona, Persona, TipoPersona};
use garita::workflow::{Garita, ResultadoIngreso};

fn garita() -> Garita {
    let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
    let audit = AuditLog::from_writer(Box::new(std::io::sink()));
    Garita::new(backend, audit)
}

#[tokio::test]
async fn rango_se_crea_y_omite_los_existentes() {
    let garita = garita();
    garita
        .crear_gafete("V-002", TipoPersona::Visita, "rrhh")
        .await
        .expect("se crea el gafete suelto");

    let creacion = garita
        .crear_rango(
            &RangoGafetes {
                tipo: TipoPersona::Visita,
                prefijo: "V-".to_owned(),
                desde: 1,
                hasta: 5,
                ancho: 3,
            },
            "rrhh",
        )
        .await
        .expect("el rango procede");

    assert_eq!(creacion.creados.len(), 4);
    assert_eq!(creacion.omitidos, vec!["V-002".to_owned()]);

    let disponibles = garita
        .gafetes()
        .get_available(TipoPersona::Visita)
        .await
        .expect("se listan los disponibles");
    assert_eq!(disponibles.len(), 5);
    assert!(disponibles.iter().any(|g| g.numero == "V-001"));
    assert!(disponibles.iter().any(|g| g.numero == "V-005"));
}

#[tokio::test]
async fn gafete_danado_se_repara_y_vuelve_al_tablero() {
    let garita = garita();
    garita
        .crear_gafete("C-001", TipoPersona::Contratista, "rrhh")
        .await
        .expect("se crea el gafete");

    let gafete = garita
        .actualizar_gafete(
            "C-001",
            TipoPersona::Contratista,
            BadgeStatus::Danado,
            "garita1",
            Some("lector ilegible"),
        )
        .await
        .expect("se marca dañado");
    assert_eq!(gafete.status, BadgeStatus::Danado);

    let gafete = garita
        .actualizar_gafete(
            "C-001",
            TipoPersona::Contratista,
            BadgeStatus::Disponible,
            "taller",
            None,
        )
        .await
        .expect("se repara");
    assert_eq!(gafete.status, BadgeStatus::Disponible);
    assert_eq!(gafete.resuelto_por.as_deref(), Some("taller"));
}

#[tokio::test]
async fn gafete_prestado_no_se_da_de_baja() {
    let garita = garita();
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
    assert!(matches!(admitido, ResultadoIngreso::Admitido { .. }));

    let err = garita
        .eliminar_gafete("V-001", TipoPersona::Visita, "rrhh")
        .await
        .expect_err("un gafete prestado no se elimina");
    assert!(matches!(err, GaritaError::DeleteForbidden { .. }));
}

#[tokio::test]
async fn salto_de_estado_sin_transicion_es_rechazado() {
    let garita = garita();
    garita
        .crear_gafete("V-001", TipoPersona::Visita, "rrhh")
        .await
        .expect("se crea el gafete");

    let err = garita
        .actualizar_gafete(
            "V-001",
            TipoPersona::Visita,
            BadgeStatus::Extraviado,
            "garita1",
            None,
        )
        .await
        .expect_err("disponible no pasa a extraviado");
    assert!(matches!(err, GaritaError::InvalidTransition { .. }));
}
