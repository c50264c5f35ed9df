//! Garita operator console.
//!
//! Provides the gate workflow (`validar`, `ingreso`, `salida`), the occupancy
//! queries (`adentro`, `salidas-hoy`) and management subcommands for the
//! badge rack, the blacklist and badge incidents. Mutating subcommands run
//! through the audited workflow facade; queries talk to the backend
//! read-only and leave no trace.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

use garita::alerts::AlertManager;
use garita::audit::AuditLog;
use garita::backend::http::HttpBackend;
use garita::backend::{ActualizacionBloqueo, Backend};
use garita::badges::{BadgeRegistry, RangoGafetes};
use garita::blacklist::{AltaBloqueo, BlacklistRegistry};
use garita::config::GaritaConfig;
use garita::eligibility::EligibilityValidator;
use garita::logging;
use garita::occupancy::{DevolucionGafete, OccupancyLedger};
use garita::types::{
    AutorizacionExcepcional, BadgeStatus, EligibilityResult, EstadoPersona, Persona, TipoPersona,
};
use garita::workflow::{Garita, ResultadoIngreso};

/// Operator console for the facility access gate.
#[derive(Parser)]
#[command(name = "garita", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Check whether a person could enter right now, without registering anything.
    Validar {
        /// Person under evaluation.
        #[command(flatten)]
        persona: PersonaArgs,
    },
    /// Validate a person, loan a badge and open an entry record.
    Ingreso {
        /// Person entering the facility.
        #[command(flatten)]
        persona: PersonaArgs,
        /// Number of the badge to loan.
        #[arg(long)]
        gafete: String,
        /// Operator registering the entry.
        #[arg(long)]
        operador: String,
        /// Free-form notes for the record.
        #[arg(long)]
        observaciones: Option<String>,
    },
    /// Close an open entry record and settle the badge.
    Salida {
        /// Identifier of the open entry record.
        registro_id: String,
        /// Operator registering the exit.
        #[arg(long)]
        operador: String,
        /// Badge number physically presented at the gate, if any.
        #[arg(long)]
        gafete: Option<String>,
        /// Free-form notes appended to the record.
        #[arg(long)]
        observaciones: Option<String>,
    },
    /// List everyone currently inside.
    Adentro,
    /// List today's exits (local calendar day).
    SalidasHoy,
    /// Manage the badge rack.
    Gafetes {
        /// Badge operation to perform.
        #[command(subcommand)]
        command: GafetesCommand,
    },
    /// Manage the blacklist.
    ListaNegra {
        /// Blacklist operation to perform.
        #[command(subcommand)]
        command: ListaNegraCommand,
    },
    /// Manage badge incident alerts.
    Alertas {
        /// Alert operation to perform.
        #[command(subcommand)]
        command: AlertasCommand,
    },
}

/// Person identity and authorization data, as presented at the gate.
#[derive(Args)]
struct PersonaArgs {
    /// Cedula of the person.
    #[arg(long)]
    cedula: String,
    /// Given name.
    #[arg(long)]
    nombre: String,
    /// Family name.
    #[arg(long)]
    apellido: String,
    /// Person category: contratista, proveedor or visita.
    #[arg(long)]
    tipo: TipoPersona,
    /// Administrative state: activo, inactivo or suspendido.
    #[arg(long, default_value = "activo")]
    estado: EstadoPersona,
    /// PRAIND expiry date (YYYY-MM-DD), when the person holds one.
    #[arg(long)]
    praind: Option<NaiveDate>,
    /// Reason attached to an exceptional authorization, if granted.
    #[arg(long)]
    autorizacion_motivo: Option<String>,
    /// Who granted the exceptional authorization.
    #[arg(long)]
    autorizacion_por: Option<String>,
    /// Expiry date (YYYY-MM-DD) of the exceptional authorization.
    #[arg(long)]
    autorizacion_vence: Option<NaiveDate>,
}

impl PersonaArgs {
    /// Assemble the domain `Persona` handed to the validator.
    fn into_persona(self) -> anyhow::Result<Persona> {
        let autorizacion_excepcional = match (
            self.autorizacion_motivo,
            self.autorizacion_por,
            self.autorizacion_vence,
        ) {
            (None, None, None) => None,
            (Some(motivo), Some(autorizado_por), Some(vence)) => Some(AutorizacionExcepcional {
                motivo,
                autorizado_por,
                vence,
            }),
            _ => anyhow::bail!(
                "la autorización excepcional requiere --autorizacion-motivo, \
                 --autorizacion-por y --autorizacion-vence juntos"
            ),
        };

        Ok(Persona {
            cedula: self.cedula,
            nombre: self.nombre,
            apellido: self.apellido,
            tipo: self.tipo,
            estado: self.estado,
            fecha_vencimiento_praind: self.praind,
            autorizacion_excepcional,
        })
    }
}

/// Badge rack operations.
#[derive(Subcommand)]
enum GafetesCommand {
    /// Register one badge.
    Crear {
        /// Printed badge number.
        numero: String,
        /// Badge category: contratista, proveedor or visita.
        #[arg(long)]
        tipo: TipoPersona,
        /// Operator provisioning the badge.
        #[arg(long)]
        operador: String,
    },
    /// Provision a numbered run of badges, e.g. V-001 through V-050.
    CrearRango {
        /// Badge category for the whole run.
        #[arg(long)]
        tipo: TipoPersona,
        /// Printed prefix, e.g. "V-".
        #[arg(long)]
        prefijo: String,
        /// First number, inclusive.
        #[arg(long)]
        desde: u32,
        /// Last number, inclusive.
        #[arg(long)]
        hasta: u32,
        /// Zero-padding width for the numeric part.
        #[arg(long, default_value_t = 3)]
        ancho: usize,
        /// Operator provisioning the run.
        #[arg(long)]
        operador: String,
    },
    /// List the badges of one category still on the rack.
    Disponibles {
        /// Badge category to query.
        tipo: TipoPersona,
    },
    /// Move a badge to a target status through its named transition.
    Estado {
        /// Printed badge number.
        numero: String,
        /// Badge category.
        #[arg(long)]
        tipo: TipoPersona,
        /// Target status: disponible, en_uso, perdido, danado or extraviado.
        #[arg(long)]
        hacia: BadgeStatus,
        /// Operator applying the change.
        #[arg(long)]
        operador: String,
        /// Reason recorded on the badge notes.
        #[arg(long)]
        motivo: Option<String>,
    },
    /// Retire a badge from the inventory.
    Baja {
        /// Printed badge number.
        numero: String,
        /// Badge category.
        #[arg(long)]
        tipo: TipoPersona,
        /// Operator retiring the badge.
        #[arg(long)]
        operador: String,
    },
}

/// Blacklist operations.
#[derive(Subcommand)]
enum ListaNegraCommand {
    /// Bar a person from entering.
    Agregar {
        /// Cedula of the person to bar.
        #[arg(long)]
        cedula: String,
        /// Given name.
        #[arg(long)]
        nombre: String,
        /// Family name.
        #[arg(long)]
        apellido: String,
        /// Why the person is barred.
        #[arg(long)]
        motivo: String,
        /// Operator placing the block.
        #[arg(long)]
        operador: String,
        /// Mark the bar as permanent.
        #[arg(long)]
        permanente: bool,
        /// Free-form notes.
        #[arg(long)]
        observaciones: Option<String>,
    },
    /// Lift an active bar.
    Quitar {
        /// Blacklist entry identifier.
        id: String,
        /// Why the bar is lifted.
        #[arg(long)]
        motivo: String,
        /// Operator lifting the block.
        #[arg(long)]
        operador: String,
        /// Replacement notes, if any.
        #[arg(long)]
        observaciones: Option<String>,
    },
    /// Re-activate a previously lifted bar.
    Reactivar {
        /// Blacklist entry identifier.
        id: String,
        /// Why the bar returns.
        #[arg(long)]
        motivo: String,
        /// Operator reinstating the block.
        #[arg(long)]
        operador: String,
        /// Replacement notes, if any.
        #[arg(long)]
        observaciones: Option<String>,
    },
    /// Edit an entry's notes or permanent flag without touching the bar.
    Actualizar {
        /// Blacklist entry identifier.
        id: String,
        /// New value for the permanent flag (true or false).
        #[arg(long)]
        permanente: Option<bool>,
        /// Replacement notes.
        #[arg(long)]
        observaciones: Option<String>,
        /// Operator making the edit.
        #[arg(long)]
        operador: String,
    },
    /// List blacklist entries.
    Listar {
        /// Only entries whose bar is currently active.
        #[arg(long)]
        activos: bool,
    },
    /// Look up the active bar for one cedula, if any.
    Consultar {
        /// Cedula to look up.
        cedula: String,
    },
}

/// Badge incident operations.
#[derive(Subcommand)]
enum AlertasCommand {
    /// List badge incident alerts.
    Listar {
        /// Only unresolved alerts.
        #[arg(long)]
        pendientes: bool,
    },
    /// Open an incident by hand against a person and badge.
    Crear {
        /// Cedula the incident is charged to.
        #[arg(long)]
        cedula: String,
        /// Badge number involved.
        #[arg(long)]
        gafete: String,
        /// Operator opening the incident.
        #[arg(long)]
        operador: String,
        /// Free-form notes.
        #[arg(long)]
        notas: Option<String>,
    },
    /// Resolve a pending alert.
    Resolver {
        /// Alert identifier.
        id: String,
        /// Operator resolving the alert.
        #[arg(long)]
        operador: String,
        /// Resolution notes.
        #[arg(long)]
        notas: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Precedence: env vars > ./garita.toml > defaults.
    let config = GaritaConfig::load().context("failed to load configuration")?;

    match cli.command {
        Command::Validar { persona } => handle_validar(&config, persona).await,
        Command::Ingreso {
            persona,
            gafete,
            operador,
            observaciones,
        } => handle_ingreso(&config, persona, &gafete, &operador, observaciones).await,
        Command::Salida {
            registro_id,
            operador,
            gafete,
            observaciones,
        } => {
            handle_salida(
                &config,
                &registro_id,
                &operador,
                gafete.as_deref(),
                observaciones,
            )
            .await
        }
        Command::Adentro => handle_adentro(&config).await,
        Command::SalidasHoy => handle_salidas_hoy(&config).await,
        Command::Gafetes { command } => handle_gafetes(&config, command).await,
        Command::ListaNegra { command } => handle_lista_negra(&config, command).await,
        Command::Alertas { command } => handle_alertas(&config, command).await,
    }
}

/// Connect to the backend authority.
fn conectar_backend(config: &GaritaConfig) -> anyhow::Result<Arc<dyn Backend>> {
    let backend =
        HttpBackend::new(&config.backend).context("failed to build the backend client")?;
    Ok(Arc::new(backend))
}

/// Assemble the audited workflow facade used by every mutating subcommand.
fn armar_garita(config: &GaritaConfig) -> anyhow::Result<Garita> {
    let backend = conectar_backend(config)?;
    let audit = AuditLog::new(&config.paths.audit_log)
        .with_context(|| format!("failed to open audit log {}", config.paths.audit_log))?;
    Ok(Garita::new(backend, audit))
}

/// Assemble the entry ledger for read-only queries.
fn armar_registros(backend: &Arc<dyn Backend>) -> OccupancyLedger {
    OccupancyLedger::new(
        Arc::clone(backend),
        BadgeRegistry::new(Arc::clone(backend)),
        AlertManager::new(Arc::clone(backend)),
    )
}

/// Print an eligibility verdict in gate-operator terms.
fn imprimir_veredicto(resultado: &EligibilityResult) {
    if resultado.puede_ingresar {
        println!("PUEDE INGRESAR");
    } else {
        println!("NO PUEDE INGRESAR");
        for bloqueo in &resultado.bloqueos {
            println!("  bloqueo: {bloqueo}");
        }
    }
    for aviso in &resultado.alertas {
        println!("  aviso: {aviso}");
    }
}

/// Run the eligibility checks for a person and print the verdict.
async fn handle_validar(config: &GaritaConfig, persona: PersonaArgs) -> anyhow::Result<()> {
    logging::init_cli(&config.core.log_level);

    let backend = conectar_backend(config)?;
    let validador = EligibilityValidator::new(
        BlacklistRegistry::new(Arc::clone(&backend)),
        armar_registros(&backend),
        AlertManager::new(Arc::clone(&backend)),
    );

    let persona = persona.into_persona()?;
    let resultado = validador.validar_ingreso(&persona).await;
    imprimir_veredicto(&resultado);
    Ok(())
}

/// Register an entry through the audited workflow.
async fn handle_ingreso(
    config: &GaritaConfig,
    persona: PersonaArgs,
    gafete: &str,
    operador: &str,
    observaciones: Option<String>,
) -> anyhow::Result<()> {
    let _logging_guard =
        logging::init_production(Path::new(&config.paths.logs_dir), &config.core.log_level)?;

    let garita = armar_garita(config)?;
    let persona = persona.into_persona()?;

    match garita
        .registrar_ingreso(&persona, gafete, operador, observaciones)
        .await?
    {
        ResultadoIngreso::Admitido {
            registro,
            resultado,
        } => {
            println!(
                "INGRESO REGISTRADO: {} adentro con gafete {} (registro {})",
                registro.cedula, registro.gafete_numero, registro.id
            );
            for aviso in &resultado.alertas {
                println!("  aviso: {aviso}");
            }
        }
        ResultadoIngreso::Denegado { resultado } => {
            println!("INGRESO DENEGADO");
            for bloqueo in &resultado.bloqueos {
                println!("  bloqueo: {bloqueo}");
            }
        }
    }
    Ok(())
}

/// Register an exit and report how the badge settled.
async fn handle_salida(
    config: &GaritaConfig,
    registro_id: &str,
    operador: &str,
    gafete: Option<&str>,
    observaciones: Option<String>,
) -> anyhow::Result<()> {
    let _logging_guard =
        logging::init_production(Path::new(&config.paths.logs_dir), &config.core.log_level)?;

    let garita = armar_garita(config)?;
    let salida = garita
        .registrar_salida(registro_id, operador, gafete, observaciones)
        .await?;

    println!(
        "SALIDA REGISTRADA: {} (registro {})",
        salida.registro.cedula, salida.registro.id
    );
    match &salida.devolucion {
        DevolucionGafete::Devuelto => {
            println!(
                "  gafete {} devuelto al tablero",
                salida.registro.gafete_numero
            );
        }
        DevolucionGafete::Perdido { alerta } => {
            println!(
                "  gafete {} NO devuelto: reportado como perdido, alerta {} abierta",
                salida.registro.gafete_numero, alerta.id
            );
        }
        DevolucionGafete::Fallo { detalle } => {
            println!(
                "  atención: la salida quedó registrada pero el gafete {} \
                 requiere revisión manual ({detalle})",
                salida.registro.gafete_numero
            );
        }
    }
    Ok(())
}

/// List the people currently inside.
async fn handle_adentro(config: &GaritaConfig) -> anyhow::Result<()> {
    logging::init_cli(&config.core.log_level);

    let backend = conectar_backend(config)?;
    let abiertos = armar_registros(&backend).abiertos().await?;

    if abiertos.is_empty() {
        println!("no hay nadie adentro");
        return Ok(());
    }
    println!("{} adentro:", abiertos.len());
    for registro in &abiertos {
        println!(
            "  {}  {} ({})  gafete {}  entró {}",
            registro.id,
            registro.cedula,
            registro.tipo_persona,
            registro.gafete_numero,
            registro
                .fecha_entrada
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

/// List the exits registered today, local calendar day.
async fn handle_salidas_hoy(config: &GaritaConfig) -> anyhow::Result<()> {
    logging::init_cli(&config.core.log_level);

    let backend = conectar_backend(config)?;
    let salidas = armar_registros(&backend).salidas_del_dia().await?;

    if salidas.is_empty() {
        println!("sin salidas hoy");
        return Ok(());
    }
    println!("{} salidas hoy:", salidas.len());
    for registro in &salidas {
        let hora = registro
            .fecha_salida
            .map(|f| f.with_timezone(&Local).format("%H:%M").to_string())
            .unwrap_or_default();
        println!(
            "  {}  {}  gafete {}  salió {}",
            registro.id, registro.cedula, registro.gafete_numero, hora
        );
    }
    Ok(())
}

/// Dispatch a badge rack operation.
async fn handle_gafetes(config: &GaritaConfig, command: GafetesCommand) -> anyhow::Result<()> {
    match command {
        GafetesCommand::Disponibles { tipo } => {
            logging::init_cli(&config.core.log_level);
            let gafetes = BadgeRegistry::new(conectar_backend(config)?);
            let disponibles = gafetes.get_available(tipo).await?;
            println!("{} gafetes {} disponibles:", disponibles.len(), tipo);
            for gafete in &disponibles {
                println!("  {}", gafete.numero);
            }
            Ok(())
        }
        GafetesCommand::Crear {
            numero,
            tipo,
            operador,
        } => {
            let _logging_guard = logging::init_production(
                Path::new(&config.paths.logs_dir),
                &config.core.log_level,
            )?;
            let garita = armar_garita(config)?;
            let gafete = garita.crear_gafete(&numero, tipo, &operador).await?;
            println!("gafete {} ({}) creado", gafete.numero, gafete.tipo);
            Ok(())
        }
        GafetesCommand::CrearRango {
            tipo,
            prefijo,
            desde,
            hasta,
            ancho,
            operador,
        } => {
            let _logging_guard = logging::init_production(
                Path::new(&config.paths.logs_dir),
                &config.core.log_level,
            )?;
            let garita = armar_garita(config)?;
            let rango = RangoGafetes {
                tipo,
                prefijo,
                desde,
                hasta,
                ancho,
            };
            let creacion = garita.crear_rango(&rango, &operador).await?;
            println!(
                "rango creado: {} gafetes nuevos, {} ya existían",
                creacion.creados.len(),
                creacion.omitidos.len()
            );
            for numero in &creacion.omitidos {
                println!("  omitido: {numero}");
            }
            Ok(())
        }
        GafetesCommand::Estado {
            numero,
            tipo,
            hacia,
            operador,
            motivo,
        } => {
            let _logging_guard = logging::init_production(
                Path::new(&config.paths.logs_dir),
                &config.core.log_level,
            )?;
            let garita = armar_garita(config)?;
            let gafete = garita
                .actualizar_gafete(&numero, tipo, hacia, &operador, motivo.as_deref())
                .await?;
            println!("gafete {} ahora {}", gafete.numero, gafete.status);
            Ok(())
        }
        GafetesCommand::Baja {
            numero,
            tipo,
            operador,
        } => {
            let _logging_guard = logging::init_production(
                Path::new(&config.paths.logs_dir),
                &config.core.log_level,
            )?;
            let garita = armar_garita(config)?;
            garita.eliminar_gafete(&numero, tipo, &operador).await?;
            println!("gafete {numero} dado de baja");
            Ok(())
        }
    }
}

/// Dispatch a blacklist operation.
async fn handle_lista_negra(
    config: &GaritaConfig,
    command: ListaNegraCommand,
) -> anyhow::Result<()> {
    match command {
        ListaNegraCommand::Agregar {
            cedula,
            nombre,
            apellido,
            motivo,
            operador,
            permanente,
            observaciones,
        } => {
            let _logging_guard = logging::init_production(
                Path::new(&config.paths.logs_dir),
                &config.core.log_level,
            )?;
            let garita = armar_garita(config)?;
            let entry = garita
                .bloquear(AltaBloqueo {
                    cedula,
                    nombre,
                    apellido,
                    motivo,
                    actor: operador,
                    es_bloqueo_permanente: permanente,
                    observaciones,
                })
                .await?;
            println!(
                "bloqueo {} agregado para {} {} ({})",
                entry.id, entry.nombre, entry.apellido, entry.cedula
            );
            Ok(())
        }
        ListaNegraCommand::Quitar {
            id,
            motivo,
            operador,
            observaciones,
        } => {
            let _logging_guard = logging::init_production(
                Path::new(&config.paths.logs_dir),
                &config.core.log_level,
            )?;
            let garita = armar_garita(config)?;
            let entry = garita
                .desbloquear(&id, &motivo, observaciones.as_deref(), &operador)
                .await?;
            println!("bloqueo {} levantado para {}", entry.id, entry.cedula);
            Ok(())
        }
        ListaNegraCommand::Reactivar {
            id,
            motivo,
            operador,
            observaciones,
        } => {
            let _logging_guard = logging::init_production(
                Path::new(&config.paths.logs_dir),
                &config.core.log_level,
            )?;
            let garita = armar_garita(config)?;
            let entry = garita
                .reactivar_bloqueo(&id, &motivo, observaciones.as_deref(), &operador)
                .await?;
            println!("bloqueo {} reactivado para {}", entry.id, entry.cedula);
            Ok(())
        }
        ListaNegraCommand::Actualizar {
            id,
            permanente,
            observaciones,
            operador,
        } => {
            let _logging_guard = logging::init_production(
                Path::new(&config.paths.logs_dir),
                &config.core.log_level,
            )?;
            let garita = armar_garita(config)?;
            let entry = garita
                .actualizar_bloqueo(
                    &id,
                    ActualizacionBloqueo {
                        es_bloqueo_permanente: permanente,
                        observaciones,
                    },
                    &operador,
                )
                .await?;
            println!("bloqueo {} editado", entry.id);
            Ok(())
        }
        ListaNegraCommand::Listar { activos } => {
            logging::init_cli(&config.core.log_level);
            let lista = BlacklistRegistry::new(conectar_backend(config)?);
            let entradas = if activos {
                lista.activos().await?
            } else {
                lista.list().await?
            };
            if entradas.is_empty() {
                println!("lista negra vacía");
                return Ok(());
            }
            for entry in &entradas {
                let estado = if entry.is_active() {
                    "ACTIVO"
                } else {
                    "levantado"
                };
                println!(
                    "  {}  {}  {} {} ({})  {}",
                    entry.id,
                    estado,
                    entry.nombre,
                    entry.apellido,
                    entry.cedula,
                    entry.motivo_actual().unwrap_or_default()
                );
            }
            Ok(())
        }
        ListaNegraCommand::Consultar { cedula } => {
            logging::init_cli(&config.core.log_level);
            let lista = BlacklistRegistry::new(conectar_backend(config)?);
            match lista.check_bloqueado(&cedula).await? {
                Some(entry) => {
                    println!(
                        "BLOQUEADO: {} {} ({})",
                        entry.nombre, entry.apellido, entry.cedula
                    );
                    if let Some(motivo) = entry.motivo_actual() {
                        println!("  motivo: {motivo}");
                    }
                    if entry.es_bloqueo_permanente {
                        println!("  bloqueo permanente");
                    }
                }
                None => println!("sin bloqueo activo para {cedula}"),
            }
            Ok(())
        }
    }
}

/// Dispatch a badge incident operation.
async fn handle_alertas(config: &GaritaConfig, command: AlertasCommand) -> anyhow::Result<()> {
    match command {
        AlertasCommand::Listar { pendientes } => {
            logging::init_cli(&config.core.log_level);
            let alertas = AlertManager::new(conectar_backend(config)?);
            let filtro = if pendientes { Some(false) } else { None };
            let todas = alertas.get_all(filtro).await?;
            if todas.is_empty() {
                println!("sin alertas");
                return Ok(());
            }
            for alerta in &todas {
                let estado = if alerta.resuelto {
                    "resuelta"
                } else {
                    "PENDIENTE"
                };
                println!(
                    "  {}  {}  cedula {}  gafete {}  abierta {}",
                    alerta.id,
                    estado,
                    alerta.cedula,
                    alerta.gafete_numero,
                    alerta.creada.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                );
            }
            Ok(())
        }
        AlertasCommand::Crear {
            cedula,
            gafete,
            operador,
            notas,
        } => {
            let _logging_guard = logging::init_production(
                Path::new(&config.paths.logs_dir),
                &config.core.log_level,
            )?;
            let garita = armar_garita(config)?;
            let alerta = garita
                .crear_alerta(&cedula, &gafete, notas.as_deref(), &operador)
                .await?;
            println!(
                "alerta {} abierta: cedula {} gafete {}",
                alerta.id, alerta.cedula, alerta.gafete_numero
            );
            Ok(())
        }
        AlertasCommand::Resolver {
            id,
            operador,
            notas,
        } => {
            let _logging_guard = logging::init_production(
                Path::new(&config.paths.logs_dir),
                &config.core.log_level,
            )?;
            let garita = armar_garita(config)?;
            let alerta = garita
                .resolver_alerta(&id, notas.as_deref(), &operador)
                .await?;
            println!("alerta {} resuelta", alerta.id);
            Ok(())
        }
    }
}
