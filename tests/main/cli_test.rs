//! CLI contract tests.

use std::fs;
use std::path::PathBuf;

fn main_source() -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src/main.rs");
    match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => panic!("main source should load from {}: {err}", path.display()),
    }
}

#[test]
fn main_defines_gate_subcommands() {
    let source = main_source();
    assert!(source.contains("Validar"));
    assert!(source.contains("Ingreso"));
    assert!(source.contains("Salida"));
    assert!(source.contains("Adentro"));
    assert!(source.contains("SalidasHoy"));
}

#[test]
fn main_defines_management_subcommands() {
    let source = main_source();
    assert!(source.contains("GafetesCommand"));
    assert!(source.contains("ListaNegraCommand"));
    assert!(source.contains("AlertasCommand"));
}

#[test]
fn mutating_subcommands_run_through_the_audited_facade() {
    let source = main_source();
    assert!(source.contains("armar_garita"));
    assert!(source.contains("registrar_ingreso"));
    assert!(source.contains("registrar_salida"));
}
